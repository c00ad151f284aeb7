//! The session gate in front of the administrative routes.
//!
//! There is exactly one administrative role and no user identity: a session
//! is an expiry instant inside an encrypted, signed cookie. Any handler
//! that takes [`AdminSession`] as an argument is gated; the extractor
//! rejects with a redirect to the login page for browser requests and with
//! 401 JSON for API requests.

use axum::{
    Json, async_trait,
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, header, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, Key},
};
use chrono::{Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

pub mod login;

pub const SESSION_COOKIE: &str = "teamsheet_admin";

/// Sessions outlive login by this long; there is no sliding refresh, the
/// administrator just logs in again.
pub const SESSION_HOURS: i64 = 12;

#[derive(Debug, Serialize, Deserialize)]
pub struct AdminSession {
    pub expiry: NaiveDateTime,
}

#[derive(Debug)]
pub enum AuthError {
    /// Browser request without a live session: send it to the login form.
    LoginRequired,
    /// API request without a live session.
    Unauthorized,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::LoginRequired => {
                Redirect::to("/teacher/login").into_response()
            }
            AuthError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Authentication required" })),
            )
                .into_response(),
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AdminSession
where
    S: Send + Sync,
    Key: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let is_api = parts
            .headers
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.starts_with("application/json"))
            .unwrap_or(false);
        let reject = || {
            if is_api {
                AuthError::Unauthorized
            } else {
                AuthError::LoginRequired
            }
        };

        let jar: PrivateCookieJar<Key> =
            PrivateCookieJar::from_request_parts(parts, state)
                .await
                .map_err(|_| reject())?;

        let cookie = match jar.get(SESSION_COOKIE) {
            Some(cookie) => cookie,
            None => return Err(reject()),
        };

        // An expired session is treated exactly like a missing one.
        match serde_json::from_str::<AdminSession>(cookie.value()) {
            Ok(session) if Utc::now().naive_utc() < session.expiry => {
                Ok(session)
            }
            _ => Err(reject()),
        }
    }
}

/// Creates a session and adds its cookie to the jar.
pub fn set_session_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    let session = AdminSession {
        expiry: Utc::now().naive_utc() + Duration::hours(SESSION_HOURS),
    };

    let mut cookie = Cookie::new(
        SESSION_COOKIE,
        serde_json::to_string(&session).unwrap(),
    );
    cookie.set_path("/");
    cookie.set_http_only(true);

    jar.add(cookie)
}

/// Destroys the session.
pub fn clear_session_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    let mut cookie = Cookie::from(SESSION_COOKIE);
    cookie.set_path("/");

    jar.remove(cookie)
}
