pub mod amm;
pub mod icrc;
pub mod requests;

pub use requests::*;
