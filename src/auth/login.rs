use axum::{
    extract::{Form, Query, State},
    response::Redirect,
};
use axum_extra::extract::PrivateCookieJar;
use hypertext::prelude::*;
use serde::Deserialize;
use url::Url;

use crate::{
    auth::{AdminSession, clear_session_cookie, set_session_cookie},
    state::AppState,
    template::Page,
    util_resp::{FailureResponse, StandardResponse, see_other_ok, success},
    widgets::alert::ErrorAlert,
};

fn login_form(error: Option<&str>) -> Rendered<String> {
    Page::new()
        .body(maud! {
            div class="row justify-content-center" {
                div class="col-md-5" {
                    h1 { "Teacher login" }
                    @if let Some(msg) = error {
                        ErrorAlert msg=(msg);
                    }
                    form method="post" {
                        div class="mb-3" {
                            label for="password" class="form-label" {
                                "Password"
                            }
                            input type="password"
                                  class="form-control"
                                  id="password"
                                  name="password"
                                  placeholder="Password"
                                  required;
                        }
                        button type="submit" class="btn btn-primary" {
                            "Log in"
                        }
                    }
                }
            }
        })
        .render()
}

pub async fn login_page(session: Option<AdminSession>) -> StandardResponse {
    if session.is_some() {
        return see_other_ok(Redirect::to("/teacher"));
    }

    success(login_form(None))
}

#[derive(Deserialize)]
pub struct LoginForm {
    password: String,
}

#[derive(Deserialize)]
pub struct LoginQuery {
    next: Option<String>,
}

pub async fn do_login(
    State(state): State<AppState>,
    Query(query): Query<LoginQuery>,
    jar: PrivateCookieJar,
    Form(form): Form<LoginForm>,
) -> Result<(PrivateCookieJar, Redirect), FailureResponse> {
    if form.password != state.config.admin_password {
        // No lockout, no rate limit: the gate protects a single-event,
        // low-value dashboard.
        tracing::warn!("failed dashboard login attempt");
        return Err(FailureResponse::BadRequest(login_form(Some(
            "Incorrect password. Please try again.",
        ))));
    }

    let jar = set_session_cookie(jar);

    let redirect_to = if let Some(url) =
        query.next.and_then(|url| url.parse::<Url>().ok())
    {
        url.path().to_string()
    } else {
        "/teacher".to_string()
    };

    Ok((jar, Redirect::to(&redirect_to)))
}

pub async fn do_logout(
    jar: PrivateCookieJar,
) -> (PrivateCookieJar, Redirect) {
    (clear_session_cookie(jar), Redirect::to("/teacher/login"))
}
