//! Backend for tournament team registration.
//!
//! Accepts two-player registration submissions from the public form, appends
//! each as a row to a shared Google spreadsheet (falling back to a local file
//! when the spreadsheet is unreachable), and serves a password-gated
//! dashboard on which the administrator records payment per player.

pub mod auth;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod registration;
pub mod sheet;
pub mod state;
pub mod template;
pub mod util_resp;
pub mod validation;
pub mod widgets;

#[cfg(test)]
pub mod test;
