//! Integration tests for `SheetsRowSource` using wiremock HTTP mocks.

use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use donation_map::error::DonationMapError;
use donation_map::sheets::SheetsRowSource;
use donation_map::types::RowSource;

fn test_source(base_url: &str) -> SheetsRowSource {
    SheetsRowSource::with_base_url("test-token", "sheet-123", "Donations!A2:F100", 5, base_url)
        .expect("client construction should not fail")
}

#[tokio::test]
async fn fetch_rows_returns_cells_in_sheet_order() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "range": "Donations!A2:F100",
        "majorDimension": "ROWS",
        "values": [
            ["Jane Doe", "jane@x.com", "1 A St\nTown, ST 00000", "2020-01-01", "2", "book"],
            ["John Roe", "john@x.com", "2 B St\nTown, ST 00000", "2020-01-02", "1"]
        ]
    });

    Mock::given(method("GET"))
        .and(path("/v4/spreadsheets/sheet-123/values/Donations!A2:F100"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let source = test_source(&server.uri());
    let rows = source.fetch_rows().await.expect("should parse rows");

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0][0], "Jane Doe");
    assert_eq!(rows[1].len(), 5);
}

#[tokio::test]
async fn empty_range_yields_no_rows() {
    let server = MockServer::start().await;

    // The values key is omitted entirely for an empty range
    let body = serde_json::json!({
        "range": "Donations!A2:F100",
        "majorDimension": "ROWS"
    });

    Mock::given(method("GET"))
        .and(path("/v4/spreadsheets/sheet-123/values/Donations!A2:F100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let source = test_source(&server.uri());
    let rows = source.fetch_rows().await.unwrap();

    assert!(rows.is_empty());
}

#[tokio::test]
async fn auth_failure_surfaces_as_transport_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let source = test_source(&server.uri());
    let err = source.fetch_rows().await.unwrap_err();

    assert!(matches!(err, DonationMapError::Http(_)));
}
