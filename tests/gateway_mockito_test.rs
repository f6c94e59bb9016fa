//! Google Sheets and Drive adapters against a mock HTTP server

use crm_reports::adapters::google::{self, GoogleDriveStorage, GoogleSheetsGateway, StaticToken};
use crm_reports::adapters::{FileStorage, SpreadsheetGateway, SPREADSHEET_MIME_TYPE};
use crm_reports::config::{GoogleConfig, RetryConfig};
use crm_reports::domain::{CellValue, RemoteError, ReportError};
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;
use std::sync::Arc;

const TOKEN: &str = "test-token";

fn config(server: &ServerGuard) -> GoogleConfig {
    GoogleConfig {
        sheets_base_url: format!("{}/v4", server.url()),
        drive_base_url: format!("{}/drive/v3", server.url()),
        timeout_seconds: 5,
        retry: RetryConfig {
            max_attempts: 3,
            initial_delay_ms: 1,
            max_delay_ms: 5,
            backoff_multiplier: 2.0,
        },
        ..GoogleConfig::default()
    }
}

fn connect(server: &ServerGuard) -> (GoogleSheetsGateway, GoogleDriveStorage) {
    google::connect(&config(server), Arc::new(StaticToken::new(TOKEN))).unwrap()
}

fn spreadsheet_json(id: &str) -> String {
    json!({
        "spreadsheetId": id,
        "spreadsheetUrl": format!("https://docs.google.com/spreadsheets/d/{id}/edit"),
        "sheets": [{ "properties": { "sheetId": 0, "title": "Sheet1" } }]
    })
    .to_string()
}

fn google_error(code: u16, reason: &str, message: &str) -> String {
    json!({
        "error": { "code": code, "message": message, "errors": [{ "reason": reason }] }
    })
    .to_string()
}

#[tokio::test]
async fn test_create_spreadsheet_sends_bearer_token() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v4/spreadsheets")
        .match_header("authorization", format!("Bearer {TOKEN}").as_str())
        .match_body(Matcher::PartialJson(json!({ "properties": { "title": "Quarterly" } })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(spreadsheet_json("abc"))
        .create_async()
        .await;

    let (sheets, _) = connect(&server);
    let created = sheets.create_spreadsheet("Quarterly").await.unwrap();

    assert_eq!(created.spreadsheet_id, "abc");
    assert_eq!(created.sheet_titles, vec!["Sheet1"]);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_write_then_read_range() {
    let mut server = Server::new_async().await;
    let write = server
        .mock("PUT", "/v4/spreadsheets/abc/values/A1:B2")
        .match_query(Matcher::UrlEncoded(
            "valueInputOption".into(),
            "USER_ENTERED".into(),
        ))
        .match_body(Matcher::Json(json!({
            "majorDimension": "ROWS",
            "values": [["a", 1], ["b", 2]]
        })))
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;
    let read = server
        .mock("GET", "/v4/spreadsheets/abc/values/A1:B2")
        .match_query(Matcher::UrlEncoded(
            "valueRenderOption".into(),
            "UNFORMATTED_VALUE".into(),
        ))
        .with_status(200)
        .with_body(json!({ "range": "Sheet1!A1:B2", "values": [["a", 1], ["b", 2]] }).to_string())
        .create_async()
        .await;

    let (sheets, _) = connect(&server);
    let values = vec![
        vec![CellValue::from("a"), CellValue::from(1_i64)],
        vec![CellValue::from("b"), CellValue::from(2_i64)],
    ];
    sheets.write_range("abc", "A1:B2", &values, None).await.unwrap();
    let read_back = sheets.read_range("abc", "A1:B2", None).await.unwrap();

    assert_eq!(read_back, values);
    write.assert_async().await;
    read.assert_async().await;
}

#[tokio::test]
async fn test_read_range_pads_ragged_rows() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/v4/spreadsheets/abc/values/A1:C2")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(json!({ "values": [["a", 1], ["b"]] }).to_string())
        .create_async()
        .await;

    let (sheets, _) = connect(&server);
    let values = sheets.read_range("abc", "A1:C2", None).await.unwrap();

    assert_eq!(
        values,
        vec![
            vec![CellValue::from("a"), CellValue::from(1_i64), CellValue::empty()],
            vec![CellValue::from("b"), CellValue::empty(), CellValue::empty()],
        ]
    );
}

#[tokio::test]
async fn test_read_of_empty_range_yields_empty_cells() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/v4/spreadsheets/abc/values/D4:E5")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(json!({ "range": "Sheet1!D4:E5" }).to_string())
        .create_async()
        .await;

    let (sheets, _) = connect(&server);
    let values = sheets.read_range("abc", "D4:E5", None).await.unwrap();
    assert_eq!(values, vec![vec![CellValue::empty(); 2]; 2]);
}

#[tokio::test]
async fn test_read_keeps_trailing_empty_rows_of_bounded_range() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/v4/spreadsheets/abc/values/A1:B3")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(json!({ "range": "Sheet1!A1:B3", "values": [["a", "b"]] }).to_string())
        .create_async()
        .await;

    let (sheets, _) = connect(&server);
    let values = sheets.read_range("abc", "A1:B3", None).await.unwrap();
    assert_eq!(
        values,
        vec![
            vec![CellValue::from("a"), CellValue::from("b")],
            vec![CellValue::empty(), CellValue::empty()],
            vec![CellValue::empty(), CellValue::empty()],
        ]
    );
}

#[tokio::test]
async fn test_write_rejects_matrix_larger_than_range() {
    let server = Server::new_async().await;
    let (sheets, _) = connect(&server);

    let values = vec![vec![CellValue::from("a"), CellValue::from("b"), CellValue::from("c")]];
    let err = sheets.write_range("abc", "A1:B1", &values, None).await.unwrap_err();
    assert!(matches!(err, ReportError::InvalidArgument(_)));
}

#[tokio::test]
async fn test_unknown_spreadsheet_is_not_found() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/v4/spreadsheets/missing/values/A1")
        .match_query(Matcher::Any)
        .with_status(404)
        .with_body(google_error(404, "notFound", "Requested entity was not found."))
        .create_async()
        .await;

    let (sheets, _) = connect(&server);
    let err = sheets.read_range("missing", "A1", None).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_unknown_sheet_is_not_found() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/v4/spreadsheets/abc/values/Nope!A1")
        .match_query(Matcher::Any)
        .with_status(400)
        .with_body(google_error(400, "badRequest", "Unable to parse range: Nope!A1"))
        .create_async()
        .await;

    let (sheets, _) = connect(&server);
    let err = sheets.read_range("abc", "Nope!A1", None).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_rate_limit_is_retried_until_success() {
    let mut server = Server::new_async().await;
    let throttled = server
        .mock("POST", "/v4/spreadsheets")
        .with_status(429)
        .with_body(google_error(429, "rateLimitExceeded", "Quota exceeded for quota metric"))
        .expect(2)
        .create_async()
        .await;
    let ok = server
        .mock("POST", "/v4/spreadsheets")
        .with_status(200)
        .with_body(spreadsheet_json("abc"))
        .expect(1)
        .create_async()
        .await;

    let (sheets, _) = connect(&server);
    let created = sheets.create_spreadsheet("Retry").await.unwrap();

    assert_eq!(created.spreadsheet_id, "abc");
    throttled.assert_async().await;
    ok.assert_async().await;
}

#[tokio::test]
async fn test_rate_limit_exhausts_attempts() {
    let mut server = Server::new_async().await;
    let throttled = server
        .mock("POST", "/v4/spreadsheets")
        .with_status(429)
        .with_body(google_error(429, "rateLimitExceeded", "slow down"))
        .expect(3)
        .create_async()
        .await;

    let (sheets, _) = connect(&server);
    match sheets.create_spreadsheet("Retry").await.unwrap_err() {
        ReportError::RateLimit { attempts, .. } => assert_eq!(attempts, 3),
        other => panic!("unexpected error: {other:?}"),
    }
    throttled.assert_async().await;
}

#[tokio::test]
async fn test_rejected_token_fails_without_retry() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v4/spreadsheets")
        .with_status(401)
        .with_body(google_error(401, "authError", "Invalid Credentials"))
        .expect(1)
        .create_async()
        .await;

    let (sheets, _) = connect(&server);
    let err = sheets.create_spreadsheet("x").await.unwrap_err();
    assert!(matches!(err, ReportError::Authentication { .. }));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_server_error_is_not_retried() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v4/spreadsheets")
        .with_status(503)
        .with_body("backend unavailable")
        .expect(1)
        .create_async()
        .await;

    let (sheets, _) = connect(&server);
    let err = sheets.create_spreadsheet("x").await.unwrap_err();
    assert!(matches!(
        err,
        ReportError::Remote(RemoteError::ServerError { status: 503, .. })
    ));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_storage_quota_is_reported() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/drive/v3/files")
        .match_query(Matcher::Any)
        .with_status(403)
        .with_body(google_error(
            403,
            "storageQuotaExceeded",
            "The user's Drive storage quota has been exceeded.",
        ))
        .expect(1)
        .create_async()
        .await;

    let (_, drive) = connect(&server);
    let err = drive
        .create_in_folder("Report", SPREADSHEET_MIME_TYPE, Some("F1"))
        .await
        .unwrap_err();
    assert!(matches!(err, ReportError::QuotaExceeded(_)));
    assert!(err.to_string().contains("OAuth client secret"));
}

#[tokio::test]
async fn test_header_format_resolves_sheet_id() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/v4/spreadsheets/abc")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(spreadsheet_json("abc"))
        .create_async()
        .await;
    let update = server
        .mock("POST", "/v4/spreadsheets/abc:batchUpdate")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#""repeatCell""#.to_string()),
            Matcher::Regex(r#""sheetId":0"#.to_string()),
            Matcher::Regex(r#""endRowIndex":1"#.to_string()),
            Matcher::Regex(r#""endColumnIndex":6"#.to_string()),
        ]))
        .with_status(200)
        .with_body(json!({ "spreadsheetId": "abc", "replies": [{}] }).to_string())
        .expect(1)
        .create_async()
        .await;

    let (sheets, _) = connect(&server);
    sheets
        .format_range_header(
            "abc",
            "Sheet1",
            crm_reports::domain::GridRange::header(6).unwrap(),
        )
        .await
        .unwrap();
    update.assert_async().await;
}

#[tokio::test]
async fn test_drive_listing_follows_pages_and_filters_prefix() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/drive/v3/files/F1")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(json!({ "id": "F1", "mimeType": "application/vnd.google-apps.folder", "trashed": false }).to_string())
        .create_async()
        .await;
    let first = server
        .mock("GET", "/drive/v3/files")
        .match_query(Matcher::UrlEncoded("orderBy".into(), "modifiedTime desc".into()))
        .with_status(200)
        .with_body(
            json!({
                "nextPageToken": "p2",
                "files": [
                    { "id": "2", "name": "CRM Report Deals 2026-01-02", "modifiedTime": "2026-01-02T00:00:00Z" },
                    { "id": "x", "name": "Copy of CRM Report Deals 2026-01-02" }
                ]
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;
    let second = server
        .mock("GET", "/drive/v3/files")
        .match_query(Matcher::UrlEncoded("pageToken".into(), "p2".into()))
        .with_status(200)
        .with_body(
            json!({
                "files": [
                    { "id": "1", "name": "CRM Report Deals 2026-01-01", "modifiedTime": "2026-01-01T00:00:00Z" }
                ]
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let (_, drive) = connect(&server);
    let ids: Vec<_> = drive
        .list("F1", "CRM Report Deals")
        .await
        .unwrap()
        .into_iter()
        .map(|f| f.id)
        .collect();

    assert_eq!(ids, vec!["2", "1"]);
    first.assert_async().await;
    second.assert_async().await;
}

#[tokio::test]
async fn test_listing_a_file_that_is_not_a_folder() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/drive/v3/files/abc")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(json!({ "id": "abc", "mimeType": SPREADSHEET_MIME_TYPE }).to_string())
        .create_async()
        .await;

    let (_, drive) = connect(&server);
    assert!(drive.list("abc", "CRM").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_move_replaces_parents() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/drive/v3/files/abc")
        .match_query(Matcher::UrlEncoded("fields".into(), "parents".into()))
        .with_status(200)
        .with_body(json!({ "parents": ["root-id"] }).to_string())
        .create_async()
        .await;
    let patch = server
        .mock("PATCH", "/drive/v3/files/abc")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("addParents".into(), "F1".into()),
            Matcher::UrlEncoded("removeParents".into(), "root-id".into()),
        ]))
        .with_status(200)
        .with_body(
            json!({ "id": "abc", "name": "CRM Report Tasks", "webViewLink": "https://drive.example/abc" })
                .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let (_, drive) = connect(&server);
    let moved = drive.move_to_folder("abc", "F1").await.unwrap();

    assert_eq!(moved.web_view_link.as_deref(), Some("https://drive.example/abc"));
    patch.assert_async().await;
}
