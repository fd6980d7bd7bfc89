//! Canister logging
//!
//! Inside the canister every line goes to the replica debug log through
//! `ic_cdk::println!`. Native builds (unit tests) write to stdout instead,
//! since the system API is not available off-chain.

#[macro_export]
macro_rules! log {
    ($($arg:tt)*) => {
        $crate::infrastructure::logging::print(&format!($($arg)*))
    };
}

pub fn print(line: &str) {
    #[cfg(target_arch = "wasm32")]
    ic_cdk::println!("{}", line);

    #[cfg(not(target_arch = "wasm32"))]
    println!("{}", line);
}
