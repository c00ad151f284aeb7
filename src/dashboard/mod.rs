//! The password-gated admin dashboard.

use axum::extract::State;
use hypertext::prelude::*;

use crate::{
    auth::AdminSession,
    sheet::Registration,
    state::AppState,
    template::Page,
    util_resp::{StandardResponse, server_error, success},
    widgets::{alert::ErrorAlert, badge::PaymentBadge, stat::StatCard},
};

pub mod payment;

/// The four aggregate counters shown above the table.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct PaymentStats {
    pub total: usize,
    /// Both players paid.
    pub full: usize,
    /// Exactly one player paid.
    pub partial: usize,
    /// Neither player paid.
    pub none: usize,
}

impl PaymentStats {
    pub fn from_records(records: &[Registration]) -> Self {
        let mut stats = PaymentStats::default();

        for record in records {
            stats.total += 1;
            let p1 = record.player1_payment == "Yes";
            let p2 = record.player2_payment == "Yes";
            match (p1, p2) {
                (true, true) => stats.full += 1,
                (false, false) => stats.none += 1,
                _ => stats.partial += 1,
            }
        }

        stats
    }
}

pub async fn dashboard_page(
    _session: AdminSession,
    State(state): State<AppState>,
) -> StandardResponse {
    let records = match state.store.get_all_records().await {
        Ok(records) => records,
        Err(e) => {
            tracing::error!("dashboard cannot read the sheet: {e}");
            return server_error(
                Page::new()
                    .admin(true)
                    .body(maud! {
                        ErrorAlert
                            msg = "Cannot connect to the registration
                                   spreadsheet. Try again in a moment.";
                    })
                    .render(),
            );
        }
    };

    let stats = PaymentStats::from_records(&records);

    success(
        Page::new()
            .admin(true)
            .body(maud! {
                h1 class="mb-4" { "Tournament registrations" }

                div class="row g-3 mb-4" {
                    StatCard label="Teams registered"
                             value=(stats.total)
                             tone="primary";
                    StatCard label="Fully paid"
                             value=(stats.full)
                             tone="success";
                    StatCard label="Partially paid"
                             value=(stats.partial)
                             tone="warning";
                    StatCard label="Not paid"
                             value=(stats.none)
                             tone="danger";
                }

                table class="table table-striped align-middle" {
                    thead {
                        tr {
                            th { "Team ID" }
                            th { "Registered" }
                            th { "Player 1" }
                            th { "Payment" }
                            th { "Player 2" }
                            th { "Payment" }
                            th { "Actions" }
                        }
                    }
                    tbody {
                        @for record in &records {
                            tr {
                                td { code { (record.team_id) } }
                                td { (record.timestamp) }
                                td {
                                    (record.player1_name)
                                    br;
                                    small class="text-muted" {
                                        "Age " (record.player1_age)
                                        ", form " (record.player1_form)
                                    }
                                }
                                td {
                                    PaymentBadge
                                        status=(&record.player1_payment);
                                }
                                td {
                                    (record.player2_name)
                                    br;
                                    small class="text-muted" {
                                        "Age " (record.player2_age)
                                        ", form " (record.player2_form)
                                    }
                                }
                                td {
                                    PaymentBadge
                                        status=(&record.player2_payment);
                                }
                                td {
                                    div class="btn-group btn-group-sm"
                                        role="group" {
                                        button type="button"
                                               class="btn btn-outline-success"
                                               data-team=(&record.team_id)
                                               data-player="player1"
                                               data-status="Yes" {
                                            "P1 paid"
                                        }
                                        button type="button"
                                               class="btn btn-outline-danger"
                                               data-team=(&record.team_id)
                                               data-player="player1"
                                               data-status="No" {
                                            "P1 unpaid"
                                        }
                                        button type="button"
                                               class="btn btn-outline-success"
                                               data-team=(&record.team_id)
                                               data-player="player2"
                                               data-status="Yes" {
                                            "P2 paid"
                                        }
                                        button type="button"
                                               class="btn btn-outline-danger"
                                               data-team=(&record.team_id)
                                               data-player="player2"
                                               data-status="No" {
                                            "P2 unpaid"
                                        }
                                    }
                                }
                            }
                        }
                        @if records.is_empty() {
                            tr {
                                td colspan="7"
                                   class="text-center text-muted" {
                                    "No registrations yet."
                                }
                            }
                        }
                    }
                }

                script src="/static/dashboard.js" {}
            })
            .render(),
    )
}
