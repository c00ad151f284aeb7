//! In-process test harness and end-to-end scenarios.
//!
//! The application is mounted on an `axum_test::TestServer` backed by an
//! in-memory sheet, which behaves like the remote adapter down to the
//! header row and the 1-indexed cell addressing, and can be switched
//! "offline" to drive the fallback path.

use std::{
    path::PathBuf,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use axum::{async_trait, http::StatusCode};
use axum_test::{TestServer, TestServerConfig};
use serde_json::{Value, json};

use crate::{
    config::{Config, create_app},
    sheet::{
        COL_P1_PAYMENT, COL_P2_PAYMENT, COL_TEAM_ID, HEADERS, Registration,
        RowStore, SheetError,
    },
    state::AppState,
};

const TEST_PASSWORD: &str = "letmein";

/// Behaves like the spreadsheet: row 1 is the header (written on first
/// use), data starts at row 2, cells are 1-indexed.
pub struct MemorySheet {
    rows: Mutex<Vec<Vec<String>>>,
    offline: AtomicBool,
}

impl MemorySheet {
    pub fn new() -> Arc<Self> {
        Arc::new(MemorySheet {
            rows: Mutex::new(Vec::new()),
            offline: AtomicBool::new(false),
        })
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Data rows only, header stripped.
    pub fn data_rows(&self) -> Vec<Vec<String>> {
        self.rows.lock().unwrap().iter().skip(1).cloned().collect()
    }

    pub fn cell(&self, row: usize, col: usize) -> String {
        self.rows.lock().unwrap()[row - 1][col - 1].clone()
    }

    fn guard(&self) -> Result<(), SheetError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(SheetError::Api("simulated outage".to_string()))
        } else {
            Ok(())
        }
    }

    fn ensure_header(rows: &mut Vec<Vec<String>>) {
        if rows.is_empty() {
            rows.push(HEADERS.map(str::to_string).to_vec());
        }
    }
}

#[async_trait]
impl RowStore for MemorySheet {
    async fn append_row(&self, row: &[String]) -> Result<(), SheetError> {
        self.guard()?;
        let mut rows = self.rows.lock().unwrap();
        Self::ensure_header(&mut rows);
        rows.push(row.to_vec());
        Ok(())
    }

    async fn get_all_records(&self) -> Result<Vec<Registration>, SheetError> {
        self.guard()?;
        let mut rows = self.rows.lock().unwrap();
        Self::ensure_header(&mut rows);
        Ok(rows
            .iter()
            .skip(1)
            .map(|row| Registration::from_row(row))
            .collect())
    }

    async fn read_cell(
        &self,
        row: usize,
        col: usize,
    ) -> Result<String, SheetError> {
        self.guard()?;
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .get(row - 1)
            .and_then(|row| row.get(col - 1))
            .cloned()
            .unwrap_or_default())
    }

    async fn update_cell(
        &self,
        row: usize,
        col: usize,
        value: &str,
    ) -> Result<(), SheetError> {
        self.guard()?;
        let mut rows = self.rows.lock().unwrap();
        rows[row - 1][col - 1] = value.to_string();
        Ok(())
    }
}

fn temp_fallback_path() -> PathBuf {
    static N: AtomicUsize = AtomicUsize::new(0);
    std::env::temp_dir().join(format!(
        "teamsheet-test-{}-{}.txt",
        std::process::id(),
        N.fetch_add(1, Ordering::Relaxed)
    ))
}

fn test_config(fallback_file: PathBuf) -> Config {
    Config {
        secret_key: "0".repeat(64),
        admin_password: TEST_PASSWORD.to_string(),
        sheet_id: "test-sheet".to_string(),
        credentials_json: None,
        credentials_file: "credentials.json".to_string(),
        fallback_file,
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub sheet: Arc<MemorySheet>,
    pub fallback_path: PathBuf,
}

fn server_with_store(
    store: Arc<dyn RowStore>,
    fallback_path: PathBuf,
) -> TestServer {
    let state = AppState::new(test_config(fallback_path), store);
    TestServer::new_with_config(
        create_app(state),
        TestServerConfig {
            save_cookies: true,
            ..TestServerConfig::default()
        },
    )
    .unwrap()
}

fn spawn_app() -> TestApp {
    let sheet = MemorySheet::new();
    let fallback_path = temp_fallback_path();
    let server = server_with_store(sheet.clone(), fallback_path.clone());

    TestApp {
        server,
        sheet,
        fallback_path,
    }
}

fn valid_payload() -> Value {
    json!({
        "player1": {
            "fullName": "A",
            "age": 12,
            "formNumber": "1",
            "formName": "F",
            "paymentAgreement": true,
        },
        "player2": {
            "fullName": "B",
            "age": 13,
            "formNumber": "2",
            "formName": "G",
            "paymentAgreement": true,
        },
    })
}

async fn login(server: &TestServer) {
    let res = server
        .post("/teacher/login")
        .form(&[("password", TEST_PASSWORD)])
        .await;
    assert_eq!(res.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(res.header("location"), "/teacher");
}

async fn submit(server: &TestServer, payload: &Value) -> Value {
    let res = server.post("/submit-registration").json(payload).await;
    assert_eq!(res.status_code(), StatusCode::OK);
    res.json::<Value>()
}

#[tokio::test]
async fn valid_submission_lands_in_the_sheet() {
    let app = spawn_app();

    let body = submit(&app.server, &valid_payload()).await;

    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Registration submitted successfully!");
    assert_eq!(body["saved_to_sheets"], true);
    assert!(body["timestamp"].is_string());

    let team_id_shape = regex::Regex::new(r"^TEAM_\d{8}_\d{6}$").unwrap();
    assert!(team_id_shape.is_match(body["team_id"].as_str().unwrap()));

    let rows = app.sheet.data_rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].len(), 10);
    assert_eq!(rows[0][1], "A");
    assert_eq!(rows[0][3], "1 F");
    assert_eq!(rows[0][5], "B");
    assert_eq!(rows[0][7], "2 G");
    assert_eq!(rows[0][9], body["team_id"].as_str().unwrap());
}

#[tokio::test]
async fn payment_agreement_from_the_client_is_discarded() {
    let app = spawn_app();

    submit(&app.server, &valid_payload()).await;

    // Both players claimed paymentAgreement: true; the stored row says No.
    let rows = app.sheet.data_rows();
    assert_eq!(rows[0][COL_P1_PAYMENT - 1], "No");
    assert_eq!(rows[0][COL_P2_PAYMENT - 1], "No");
}

#[tokio::test]
async fn out_of_range_age_is_rejected_without_persisting() {
    let app = spawn_app();

    let mut payload = valid_payload();
    payload["player1"]["age"] = json!(15);
    let res = app.server.post("/submit-registration").json(&payload).await;

    assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
    let body = res.json::<Value>();
    assert_eq!(body["error"], "Player 1 age must be between 11-14");
    assert!(app.sheet.data_rows().is_empty());

    let mut payload = valid_payload();
    payload["player2"]["age"] = json!(10);
    let res = app.server.post("/submit-registration").json(&payload).await;

    assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
    let body = res.json::<Value>();
    assert_eq!(body["error"], "Player 2 age must be between 11-14");
    assert!(app.sheet.data_rows().is_empty());
}

#[tokio::test]
async fn non_numeric_age_is_rejected() {
    let app = spawn_app();

    let mut payload = valid_payload();
    payload["player1"]["age"] = json!("fifteen");
    let res = app.server.post("/submit-registration").json(&payload).await;

    assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>()["error"], "Invalid age provided");
    assert!(app.sheet.data_rows().is_empty());
}

#[tokio::test]
async fn both_players_are_required() {
    let app = spawn_app();

    let mut payload = valid_payload();
    payload.as_object_mut().unwrap().remove("player2");
    let res = app.server.post("/submit-registration").json(&payload).await;
    assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>()["error"], "Missing player2 data");

    let mut payload = valid_payload();
    payload.as_object_mut().unwrap().remove("player1");
    let res = app.server.post("/submit-registration").json(&payload).await;
    assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>()["error"], "Missing player1 data");

    assert!(app.sheet.data_rows().is_empty());
}

#[tokio::test]
async fn empty_body_is_rejected() {
    let app = spawn_app();

    let res = app.server.post("/submit-registration").await;

    assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>()["error"], "No data received");
}

#[tokio::test]
async fn sheet_outage_degrades_to_the_fallback_file() {
    let app = spawn_app();
    app.sheet.set_offline(true);

    let body = submit(&app.server, &valid_payload()).await;

    assert_eq!(body["success"], true);
    assert_eq!(body["saved_to_sheets"], false);

    let contents = std::fs::read_to_string(&app.fallback_path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 1);

    let fields: Vec<&str> = lines[0].split('|').collect();
    assert_eq!(fields.len(), 10);
    assert_eq!(fields[1], "A");
    assert_eq!(fields[4], "No");
    assert_eq!(fields[8], "No");
    assert_eq!(fields[9], body["team_id"].as_str().unwrap());

    std::fs::remove_file(&app.fallback_path).ok();
}

#[tokio::test]
async fn health_reports_monotonic_timestamps() {
    let app = spawn_app();

    let first = app.server.get("/health").await.json::<Value>();
    let second = app.server.get("/health").await.json::<Value>();

    assert_eq!(first["status"], "healthy");
    assert_eq!(second["status"], "healthy");
    // ISO timestamps order lexicographically.
    assert!(
        first["timestamp"].as_str().unwrap()
            <= second["timestamp"].as_str().unwrap()
    );
}

#[tokio::test]
async fn dashboard_is_gated() {
    let app = spawn_app();

    let res = app.server.get("/teacher").await;
    assert_eq!(res.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(res.header("location"), "/teacher/login");
}

#[tokio::test]
async fn wrong_password_leaves_the_gate_closed() {
    let app = spawn_app();

    let res = app
        .server
        .post("/teacher/login")
        .form(&[("password", "not-the-password")])
        .await;
    assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
    assert!(res.text().contains("Incorrect password"));

    // Still anonymous.
    let res = app.server.get("/teacher").await;
    assert_eq!(res.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(res.header("location"), "/teacher/login");
}

#[tokio::test]
async fn login_logout_round_trip() {
    let app = spawn_app();
    submit(&app.server, &valid_payload()).await;

    login(&app.server).await;

    let res = app.server.get("/teacher").await;
    assert_eq!(res.status_code(), StatusCode::OK);
    let page = res.text();
    assert!(page.contains("Tournament registrations"));
    assert!(page.contains("TEAM_"));

    let res = app.server.get("/teacher/logout").await;
    assert_eq!(res.status_code(), StatusCode::SEE_OTHER);

    let res = app.server.get("/teacher").await;
    assert_eq!(res.status_code(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn update_payment_requires_a_session() {
    let app = spawn_app();
    submit(&app.server, &valid_payload()).await;
    let team_id = app.sheet.data_rows()[0][9].clone();

    let res = app
        .server
        .post("/teacher/update-payment")
        .json(&json!({
            "team_id": team_id,
            "player": "player1",
            "payment_status": "Yes",
        }))
        .await;

    assert_eq!(res.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(res.json::<Value>()["error"], "Authentication required");
    assert_eq!(app.sheet.cell(2, COL_P1_PAYMENT), "No");
}

#[tokio::test]
async fn all_four_payment_updates_hit_the_right_cell() {
    let app = spawn_app();
    submit(&app.server, &valid_payload()).await;
    let team_id = app.sheet.data_rows()[0][9].clone();

    login(&app.server).await;

    let cases = [
        ("player1", "Yes", COL_P1_PAYMENT),
        ("player2", "Yes", COL_P2_PAYMENT),
        ("player1", "No", COL_P1_PAYMENT),
        ("player2", "No", COL_P2_PAYMENT),
    ];

    for (player, status, col) in cases {
        let res = app
            .server
            .post("/teacher/update-payment")
            .json(&json!({
                "team_id": team_id,
                "player": player,
                "payment_status": status,
            }))
            .await;

        assert_eq!(res.status_code(), StatusCode::OK);
        assert_eq!(res.json::<Value>()["success"], true);
        assert_eq!(app.sheet.cell(2, col), status);
    }
}

#[tokio::test]
async fn invalid_update_requests_do_not_mutate_storage() {
    let app = spawn_app();
    submit(&app.server, &valid_payload()).await;
    let team_id = app.sheet.data_rows()[0][9].clone();

    login(&app.server).await;

    let bad_requests = [
        json!({ "player": "player1", "payment_status": "Yes" }),
        json!({ "team_id": team_id, "payment_status": "Yes" }),
        json!({ "team_id": team_id, "player": "player1" }),
        json!({
            "team_id": team_id,
            "player": "player3",
            "payment_status": "Yes",
        }),
        json!({
            "team_id": team_id,
            "player": "player1",
            "payment_status": "Maybe",
        }),
    ];

    for payload in &bad_requests {
        let res = app
            .server
            .post("/teacher/update-payment")
            .json(payload)
            .await;
        assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
    }

    assert_eq!(app.sheet.cell(2, COL_P1_PAYMENT), "No");
    assert_eq!(app.sheet.cell(2, COL_P2_PAYMENT), "No");
}

#[tokio::test]
async fn unknown_team_id_is_a_404() {
    let app = spawn_app();
    submit(&app.server, &valid_payload()).await;

    login(&app.server).await;

    let res = app
        .server
        .post("/teacher/update-payment")
        .json(&json!({
            "team_id": "TEAM_20990101_000000",
            "player": "player1",
            "payment_status": "Yes",
        }))
        .await;

    assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(res.json::<Value>()["error"], "Team ID not found");
}

/// Wraps the in-memory sheet but answers every single-cell read with a
/// foreign team id, as if rows had been shuffled between the scan and the
/// write.
struct MovedRowStore {
    inner: Arc<MemorySheet>,
}

#[async_trait]
impl RowStore for MovedRowStore {
    async fn append_row(&self, row: &[String]) -> Result<(), SheetError> {
        self.inner.append_row(row).await
    }

    async fn get_all_records(&self) -> Result<Vec<Registration>, SheetError> {
        self.inner.get_all_records().await
    }

    async fn read_cell(
        &self,
        _row: usize,
        _col: usize,
    ) -> Result<String, SheetError> {
        Ok("TEAM_19700101_000000".to_string())
    }

    async fn update_cell(
        &self,
        row: usize,
        col: usize,
        value: &str,
    ) -> Result<(), SheetError> {
        self.inner.update_cell(row, col, value).await
    }
}

#[tokio::test]
async fn moved_rows_are_detected_before_writing() {
    let sheet = MemorySheet::new();
    let server = server_with_store(
        Arc::new(MovedRowStore {
            inner: sheet.clone(),
        }),
        temp_fallback_path(),
    );

    let body = submit(&server, &valid_payload()).await;
    let team_id = body["team_id"].as_str().unwrap().to_string();

    login(&server).await;

    let res = server
        .post("/teacher/update-payment")
        .json(&json!({
            "team_id": team_id,
            "player": "player1",
            "payment_status": "Yes",
        }))
        .await;

    assert_eq!(res.status_code(), StatusCode::CONFLICT);
    assert_eq!(sheet.cell(2, COL_P1_PAYMENT), "No");
}

#[tokio::test]
async fn get_registrations_returns_every_row() {
    let app = spawn_app();

    submit(&app.server, &valid_payload()).await;
    let mut second = valid_payload();
    second["player1"]["fullName"] = json!("C");
    submit(&app.server, &second).await;

    let res = app.server.get("/get-registrations").await;
    assert_eq!(res.status_code(), StatusCode::OK);

    let body = res.json::<Value>();
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 2);

    let registrations = body["registrations"].as_array().unwrap();
    assert_eq!(registrations.len(), 2);
    assert_eq!(registrations[0]["Player 1 Name"], "A");
    assert_eq!(registrations[1]["Player 1 Name"], "C");
    assert_eq!(registrations[0]["Player 1 Payment Agreement"], "No");
    assert!(
        registrations[0]["Team ID"]
            .as_str()
            .unwrap()
            .starts_with("TEAM_")
    );
}

#[tokio::test]
async fn get_registrations_surfaces_an_outage() {
    let app = spawn_app();
    app.sheet.set_offline(true);

    let res = app.server.get("/get-registrations").await;

    assert_eq!(res.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        res.json::<Value>()["error"],
        "Cannot connect to Google Sheets"
    );
}

#[tokio::test]
async fn dashboard_counts_payment_buckets() {
    let app = spawn_app();

    for _ in 0..3 {
        submit(&app.server, &valid_payload()).await;
    }

    login(&app.server).await;

    // Row 2: both paid. Row 3: one paid. Row 4: untouched.
    app.sheet.update_cell(2, COL_P1_PAYMENT, "Yes").await.unwrap();
    app.sheet.update_cell(2, COL_P2_PAYMENT, "Yes").await.unwrap();
    app.sheet.update_cell(3, COL_P1_PAYMENT, "Yes").await.unwrap();

    let res = app.server.get("/teacher").await;
    assert_eq!(res.status_code(), StatusCode::OK);

    let page = res.text();
    assert!(page.contains("Teams registered"));
    assert!(page.contains("Fully paid"));
    assert!(page.contains("badge text-bg-success"));
    assert!(page.contains("badge text-bg-danger"));
}

#[tokio::test]
async fn home_serves_the_registration_form() {
    let app = spawn_app();

    let res = app.server.get("/").await;

    assert_eq!(res.status_code(), StatusCode::OK);
    assert!(res.text().contains("submit-registration"));
}

#[tokio::test]
async fn team_id_column_constant_matches_the_row_layout() {
    let app = spawn_app();
    let body = submit(&app.server, &valid_payload()).await;

    assert_eq!(
        app.sheet.cell(2, COL_TEAM_ID),
        body["team_id"].as_str().unwrap()
    );
}
