pub mod alert;
pub mod badge;
pub mod stat;
