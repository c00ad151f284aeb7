//! Updates one player's payment cell, located by team id.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    auth::AdminSession,
    error::ApiError,
    sheet::{COL_P1_PAYMENT, COL_P2_PAYMENT, COL_TEAM_ID, SheetError},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct UpdatePaymentPayload {
    #[serde(default)]
    pub team_id: Option<String>,
    #[serde(default)]
    pub player: Option<String>,
    #[serde(default)]
    pub payment_status: Option<String>,
}

fn storage_error(e: SheetError) -> ApiError {
    tracing::error!("payment update cannot reach the sheet: {e}");
    ApiError::Storage("Cannot connect to Google Sheets".to_string())
}

pub async fn update_payment(
    _session: AdminSession,
    State(state): State<AppState>,
    payload: Result<Json<UpdatePaymentPayload>, JsonRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Json(payload) = payload
        .map_err(|_| ApiError::Validation("No data received".to_string()))?;

    let team_id = match payload.team_id {
        Some(team_id) if !team_id.is_empty() => team_id,
        _ => {
            return Err(ApiError::Validation(
                "Missing team_id".to_string(),
            ));
        }
    };

    let column = match payload.player.as_deref() {
        Some("player1") => COL_P1_PAYMENT,
        Some("player2") => COL_P2_PAYMENT,
        _ => {
            return Err(ApiError::Validation(
                "Invalid player (must be player1 or player2)".to_string(),
            ));
        }
    };

    let status = match payload.payment_status.as_deref() {
        Some(status @ ("Yes" | "No")) => status.to_string(),
        _ => {
            return Err(ApiError::Validation(
                "Invalid payment_status (must be Yes or No)".to_string(),
            ));
        }
    };

    let records = state
        .store
        .get_all_records()
        .await
        .map_err(storage_error)?;

    // Linear scan, first match wins.
    let index = records
        .iter()
        .position(|record| record.team_id == team_id)
        .ok_or_else(|| {
            ApiError::NotFound("Team ID not found".to_string())
        })?;

    // The header occupies row 1 and rows are 1-indexed, so the record at
    // scan index i sits at sheet row i + 2.
    let row = index + 2;

    // The scan and the write are not transactional: re-read the team-id
    // cell and refuse to write if the row moved underneath us.
    let current = state
        .store
        .read_cell(row, COL_TEAM_ID)
        .await
        .map_err(storage_error)?;
    if current != team_id {
        tracing::warn!(
            "row {row} now holds {current:?}, expected {team_id:?}"
        );
        return Err(ApiError::Conflict(
            "Registrations changed while updating; try again".to_string(),
        ));
    }

    state
        .store
        .update_cell(row, column, &status)
        .await
        .map_err(|e| ApiError::Internal {
            error: "Failed to update payment status".to_string(),
            details: e.to_string(),
        })?;

    let player = payload.player.unwrap();
    tracing::info!("payment for {team_id}/{player} set to {status}");

    Ok(Json(json!({
        "success": true,
        "message": format!("Payment for {player} set to {status}"),
    })))
}
