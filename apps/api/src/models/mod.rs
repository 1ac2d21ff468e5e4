pub mod assignment;
pub mod catalog;
pub mod exam;
pub mod ledger;
