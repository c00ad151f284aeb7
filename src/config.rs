//! Environment configuration and application assembly.

use std::{any::Any, path::PathBuf};

use axum::{
    Json,
    Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;
use tower_http::{
    catch_panic::CatchPanicLayer, services::ServeDir, trace::TraceLayer,
};

use crate::{
    auth::login::{do_login, do_logout, login_page},
    dashboard::{dashboard_page, payment::update_payment},
    registration::{get_registrations, health, home, submit_registration},
    state::AppState,
};

/// Cookie-key material must be at least this long for key derivation.
const MIN_SECRET_LEN: usize = 32;

// Development defaults. Every one of them is insecure on purpose; the
// deployment sets the real values through the environment.
const DEV_SECRET_KEY: &str =
    "development-secret-key-not-for-production-use-0000000000000000";
const DEV_ADMIN_PASSWORD: &str = "teacher123";

pub struct Config {
    /// Key material for the private (encrypted, signed) session cookie.
    pub secret_key: String,
    /// The single administrative password.
    pub admin_password: String,
    /// Identifier of the shared spreadsheet.
    pub sheet_id: String,
    /// Service-account key as inline JSON, if provided.
    pub credentials_json: Option<String>,
    /// Path of the service-account key file, used when no inline JSON is
    /// set.
    pub credentials_file: String,
    /// Where registrations land when the spreadsheet is unreachable.
    pub fallback_file: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        let secret_key = match std::env::var("SECRET_KEY") {
            Ok(secret) if secret.len() >= MIN_SECRET_LEN => secret,
            Ok(_) => {
                tracing::warn!(
                    "SECRET_KEY shorter than {MIN_SECRET_LEN} bytes, \
                     using the development key"
                );
                DEV_SECRET_KEY.to_string()
            }
            Err(_) => {
                tracing::warn!("SECRET_KEY not set, using the development key");
                DEV_SECRET_KEY.to_string()
            }
        };

        Config {
            secret_key,
            admin_password: env_or("TEACHER_PASSWORD", DEV_ADMIN_PASSWORD),
            sheet_id: env_or("GOOGLE_SHEET_ID", "YOUR_SHEET_ID_HERE"),
            credentials_json: std::env::var("GOOGLE_CREDENTIALS")
                .ok()
                .filter(|v| !v.is_empty()),
            credentials_file: env_or(
                "GOOGLE_CREDENTIALS_FILE",
                "credentials.json",
            ),
            fallback_file: PathBuf::from(env_or(
                "FALLBACK_FILE",
                "tournament_registrations.txt",
            )),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    match std::env::var(key) {
        Ok(value) if !value.is_empty() => value,
        _ => {
            tracing::warn!("{key} not set, using default: {default}");
            default.to_string()
        }
    }
}

/// A panic in a handler must not take the process down or leave the client
/// hanging; it becomes a generic 500 like any other unhandled failure.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let details = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    tracing::error!("handler panicked: {details}");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Internal server error", "details": details })),
    )
        .into_response()
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/health", get(health))
        .route("/submit-registration", post(submit_registration))
        .route("/get-registrations", get(get_registrations))
        .route("/teacher", get(dashboard_page))
        .route("/teacher/login", get(login_page).post(do_login))
        .route("/teacher/logout", get(do_logout))
        .route("/teacher/update-payment", post(update_payment))
        .nest_service("/static", ServeDir::new("static"))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(state)
}
