//! The public side of the service: the registration form, the submission
//! endpoint, the health check, and the JSON dump of all registrations.

use std::sync::Mutex;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    response::Html,
};
use chrono::{Duration, Local, NaiveDateTime, Timelike};
use serde::Deserialize;
use serde_json::json;

use crate::{error::ApiError, state::AppState, validation};

/// Shown when the bundled form page is missing from disk (e.g. a bare
/// deployment that only uses the API).
const FALLBACK_HOME: &str = "\
<h1>Tournament Registration Backend</h1>
<p>Backend is running! Your form should submit to /submit-registration</p>
<p>Make sure the frontend points at this backend.</p>";

/// Issues `TEAM_<YYYYMMDD>_<HHMMSS>` identifiers. Two submissions inside
/// the same clock second would collide, so the generator remembers the last
/// second it issued and bumps forward past it; ids stay unique per process
/// without changing their shape.
#[derive(Default)]
pub struct TeamIdGenerator {
    last: Mutex<Option<NaiveDateTime>>,
}

impl TeamIdGenerator {
    pub fn next_id(&self, now: NaiveDateTime) -> String {
        let now = now.with_nanosecond(0).unwrap();

        let mut last = self.last.lock().unwrap();
        let stamp = match *last {
            Some(prev) if now <= prev => prev + Duration::seconds(1),
            _ => now,
        };
        *last = Some(stamp);

        format!("TEAM_{}", stamp.format("%Y%m%d_%H%M%S"))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerPayload {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub age: Option<serde_json::Value>,
    #[serde(default)]
    pub form_number: String,
    #[serde(default)]
    pub form_name: String,
    /// Accepted from the form and deliberately ignored: payment is recorded
    /// by the administrator, never self-declared.
    #[serde(default)]
    pub payment_agreement: Option<serde_json::Value>,
}

impl PlayerPayload {
    /// The "form" column: form number and name collapsed into one cell.
    fn form_cell(&self) -> String {
        format!("{} {}", self.form_number, self.form_name)
            .trim()
            .to_string()
    }
}

#[derive(Debug, Deserialize)]
pub struct RegistrationPayload {
    pub player1: Option<PlayerPayload>,
    pub player2: Option<PlayerPayload>,
}

fn iso_now() -> String {
    Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

pub async fn home() -> Html<String> {
    match tokio::fs::read_to_string("static/index.html").await {
        Ok(page) => Html(page),
        Err(_) => Html(FALLBACK_HOME.to_string()),
    }
}

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "healthy", "timestamp": iso_now() }))
}

pub async fn submit_registration(
    State(state): State<AppState>,
    payload: Result<Json<RegistrationPayload>, JsonRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Json(payload) = payload
        .map_err(|_| ApiError::Validation("No data received".to_string()))?;

    let player1 = payload.player1.ok_or_else(|| {
        ApiError::Validation("Missing player1 data".to_string())
    })?;
    let player2 = payload.player2.ok_or_else(|| {
        ApiError::Validation("Missing player2 data".to_string())
    })?;

    // Validate before anything is persisted: a rejected submission must
    // leave no row behind, in the sheet or the fallback file.
    let age1 = validation::parse_age(player1.age.as_ref(), 1)
        .map_err(ApiError::Validation)?;
    let age2 = validation::parse_age(player2.age.as_ref(), 2)
        .map_err(ApiError::Validation)?;

    let now = Local::now().naive_local();
    let team_id = state.team_ids.next_id(now);
    let row = build_row(now, &player1, age1, &player2, age2, &team_id);

    let saved_to_sheets = match state.store.append_row(&row).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(
                "spreadsheet unavailable, saving {team_id} locally: {e}"
            );
            if let Err(e) = state.fallback.append(&row) {
                // The submission still succeeds; losing the row entirely is
                // logged loudly and accepted.
                tracing::error!("fallback write for {team_id} failed: {e}");
            }
            false
        }
    };

    Ok(Json(json!({
        "success": true,
        "message": "Registration submitted successfully!",
        "team_id": team_id,
        "saved_to_sheets": saved_to_sheets,
        "timestamp": iso_now(),
    })))
}

/// The ten cells of a registration row, in header order. Both payment
/// cells are forced to "No" no matter what the client sent.
fn build_row(
    now: NaiveDateTime,
    player1: &PlayerPayload,
    age1: i64,
    player2: &PlayerPayload,
    age2: i64,
    team_id: &str,
) -> Vec<String> {
    vec![
        now.format("%Y-%m-%d %H:%M:%S").to_string(),
        player1.full_name.clone(),
        age1.to_string(),
        player1.form_cell(),
        "No".to_string(),
        player2.full_name.clone(),
        age2.to_string(),
        player2.form_cell(),
        "No".to_string(),
        team_id.to_string(),
    ]
}

pub async fn get_registrations(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let records = state.store.get_all_records().await.map_err(|e| {
        tracing::error!("cannot list registrations: {e}");
        ApiError::Storage("Cannot connect to Google Sheets".to_string())
    })?;

    Ok(Json(json!({
        "success": true,
        "count": records.len(),
        "registrations": records,
    })))
}
