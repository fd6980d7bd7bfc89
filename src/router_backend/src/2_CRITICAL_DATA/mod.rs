//! Critical Data - request validation and asset custody
//! Nothing leaves or enters router custody without passing through here

pub mod custody;
pub mod validation;

pub use custody::{share_balance, CustodyJournal};
