//! The registration sheet, as a capability.
//!
//! Everything that persists or reads registrations goes through [`RowStore`],
//! so the handlers never know whether they are talking to the real Google
//! spreadsheet, the in-memory sheet used by the tests, or nothing at all
//! ([`OfflineSheet`], which stands in when credentials are missing and makes
//! every call degrade to the local fallback path).

use std::fmt;

use axum::async_trait;
use serde::{Deserialize, Serialize};

pub mod fallback;
pub mod remote;

/// Header row, in the exact column order rows are written in.
pub const HEADERS: [&str; 10] = [
    "Timestamp",
    "Player 1 Name",
    "Player 1 Age",
    "Player 1 Form",
    "Player 1 Payment Agreement",
    "Player 2 Name",
    "Player 2 Age",
    "Player 2 Form",
    "Player 2 Payment Agreement",
    "Team ID",
];

// 1-indexed columns, matching the sheet's own numbering.
pub const COL_P1_PAYMENT: usize = 5;
pub const COL_P2_PAYMENT: usize = 9;
pub const COL_TEAM_ID: usize = 10;

#[derive(Debug)]
pub enum SheetError {
    /// The service credential could not be loaded or parsed.
    Credentials(String),
    /// The credential was rejected when exchanged for an access token.
    Token(String),
    /// The Sheets API answered, but not with what we asked for.
    Api(String),
    Transport(reqwest::Error),
}

impl fmt::Display for SheetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SheetError::Credentials(msg) => {
                write!(f, "credential error: {msg}")
            }
            SheetError::Token(msg) => write!(f, "token exchange failed: {msg}"),
            SheetError::Api(msg) => write!(f, "sheets api error: {msg}"),
            SheetError::Transport(e) => write!(f, "transport error: {e}"),
        }
    }
}

impl std::error::Error for SheetError {}

impl From<reqwest::Error> for SheetError {
    fn from(e: reqwest::Error) -> Self {
        SheetError::Transport(e)
    }
}

/// One registration, keyed the way the spreadsheet's header row names the
/// columns (which is also the shape `/get-registrations` reports).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    #[serde(rename = "Timestamp")]
    pub timestamp: String,
    #[serde(rename = "Player 1 Name")]
    pub player1_name: String,
    #[serde(rename = "Player 1 Age")]
    pub player1_age: String,
    #[serde(rename = "Player 1 Form")]
    pub player1_form: String,
    #[serde(rename = "Player 1 Payment Agreement")]
    pub player1_payment: String,
    #[serde(rename = "Player 2 Name")]
    pub player2_name: String,
    #[serde(rename = "Player 2 Age")]
    pub player2_age: String,
    #[serde(rename = "Player 2 Form")]
    pub player2_form: String,
    #[serde(rename = "Player 2 Payment Agreement")]
    pub player2_payment: String,
    #[serde(rename = "Team ID")]
    pub team_id: String,
}

impl Registration {
    /// Maps a raw sheet row onto the record by position. Rows shorter than
    /// ten cells (the API drops trailing empty cells) read as empty strings.
    pub fn from_row(row: &[String]) -> Self {
        let cell = |i: usize| row.get(i).cloned().unwrap_or_default();

        Registration {
            timestamp: cell(0),
            player1_name: cell(1),
            player1_age: cell(2),
            player1_form: cell(3),
            player1_payment: cell(4),
            player2_name: cell(5),
            player2_age: cell(6),
            player2_form: cell(7),
            player2_payment: cell(8),
            team_id: cell(9),
        }
    }
}

/// The tabular store behind the registration flow.
///
/// Rows and columns are 1-indexed exactly as the spreadsheet numbers them:
/// the header occupies row 1, the first data row is row 2.
#[async_trait]
pub trait RowStore: Send + Sync {
    /// Appends one data row after the last non-empty row.
    async fn append_row(&self, row: &[String]) -> Result<(), SheetError>;

    /// Returns every data row (header excluded), in sheet order.
    async fn get_all_records(&self) -> Result<Vec<Registration>, SheetError>;

    /// Reads a single cell. Empty cells read as the empty string.
    async fn read_cell(
        &self,
        row: usize,
        col: usize,
    ) -> Result<String, SheetError>;

    /// Overwrites a single cell.
    async fn update_cell(
        &self,
        row: usize,
        col: usize,
        value: &str,
    ) -> Result<(), SheetError>;
}

/// Stand-in store used when the spreadsheet client could not be constructed
/// at startup. Every operation fails with the startup error, which sends
/// submissions down the local-fallback path and surfaces "unavailable" on
/// the read endpoints.
pub struct OfflineSheet {
    reason: String,
}

impl OfflineSheet {
    pub fn new(cause: SheetError) -> Self {
        OfflineSheet {
            reason: cause.to_string(),
        }
    }

    fn unavailable(&self) -> SheetError {
        SheetError::Credentials(self.reason.clone())
    }
}

#[async_trait]
impl RowStore for OfflineSheet {
    async fn append_row(&self, _row: &[String]) -> Result<(), SheetError> {
        Err(self.unavailable())
    }

    async fn get_all_records(&self) -> Result<Vec<Registration>, SheetError> {
        Err(self.unavailable())
    }

    async fn read_cell(
        &self,
        _row: usize,
        _col: usize,
    ) -> Result<String, SheetError> {
        Err(self.unavailable())
    }

    async fn update_cell(
        &self,
        _row: usize,
        _col: usize,
        _value: &str,
    ) -> Result<(), SheetError> {
        Err(self.unavailable())
    }
}
