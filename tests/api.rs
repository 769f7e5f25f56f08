//! HTTP-level tests against an in-memory library

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};

use zlibrary_api_server::config::Config;
use zlibrary_api_server::routes::books::DownloadResponse;
use zlibrary_api_server::routes::search::SearchResponse;
use zlibrary_api_server::state::AppState;
use zlibrary_api_server::zlib::{LibraryClient, Paginator, Record, UpstreamError};

/// Library double serving fixed pages
#[derive(Default)]
struct MockLibrary {
    pages: Vec<Vec<Record>>,
    books: HashMap<String, Record>,
    download_links: HashMap<String, String>,
    search_error: Option<String>,
    book_error: Option<String>,
    detail_error: Option<String>,
}

struct MockPaginator {
    pages: Vec<Vec<Record>>,
    index: usize,
}

#[async_trait]
impl Paginator for MockPaginator {
    fn result(&self) -> &[Record] {
        self.pages.get(self.index).map(Vec::as_slice).unwrap_or(&[])
    }

    fn total_pages(&self) -> u32 {
        self.pages.len() as u32
    }

    fn total_results(&self) -> Option<u64> {
        None
    }

    async fn next(&mut self) -> Result<Vec<Record>, UpstreamError> {
        self.index += 1;
        Ok(self.pages.get(self.index).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl LibraryClient for MockLibrary {
    async fn search(
        &self,
        _query: &str,
        _results_per_page: u32,
    ) -> Result<Box<dyn Paginator>, UpstreamError> {
        if let Some(message) = &self.search_error {
            return Err(UpstreamError::Rejected(message.clone()));
        }
        Ok(Box::new(MockPaginator {
            pages: self.pages.clone(),
            index: 0,
        }))
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Record>, UpstreamError> {
        if let Some(message) = &self.book_error {
            return Err(UpstreamError::Rejected(message.clone()));
        }
        Ok(self.books.get(id).cloned())
    }

    async fn fetch_detail(&self, record: &Record) -> Result<Record, UpstreamError> {
        if let Some(message) = &self.detail_error {
            return Err(UpstreamError::Rejected(message.clone()));
        }
        let mut detail = Record::new();
        if let Some(link) = record.id().and_then(|id| self.download_links.get(&id)) {
            detail.insert("download_url", link.clone());
        }
        Ok(detail)
    }
}

fn book(id: &str) -> Record {
    Record::from_value(json!({
        "id": id,
        "name": format!("Dune {}", id),
        "authors": ["Frank Herbert"],
        "extension": "epub"
    }))
    .unwrap()
}

fn pages_of(ranges: &[std::ops::RangeInclusive<u32>]) -> Vec<Vec<Record>> {
    ranges
        .iter()
        .map(|range| range.clone().map(|id| book(&id.to_string())).collect())
        .collect()
}

fn server_with(library: MockLibrary) -> TestServer {
    let state = AppState::new(Config::default(), Arc::new(library));
    TestServer::new(zlibrary_api_server::app(state)).unwrap()
}

#[tokio::test]
async fn test_search_then_download() {
    let mut download_links = HashMap::new();
    download_links.insert("3".to_string(), "https://dl.example/3.epub".to_string());
    let server = server_with(MockLibrary {
        pages: pages_of(&[1..=5]),
        download_links,
        ..Default::default()
    });

    let response = server
        .get("/api/search")
        .add_query_param("q", "dune")
        .add_query_param("page", 1)
        .add_query_param("count", 5)
        .await;
    response.assert_status_ok();

    let body: SearchResponse = response.json();
    assert_eq!(body.current_page, 1);
    assert_eq!(body.total_pages, 1);
    assert_eq!(body.results.len(), 5);
    let ids: Vec<_> = body.results.iter().filter_map(|r| r.id.clone()).collect();
    assert_eq!(ids, vec!["1", "2", "3", "4", "5"]);
    assert_eq!(body.results[0].authors, vec!["Frank Herbert"]);

    let response = server.get("/api/download/3").await;
    response.assert_status_ok();
    let download: DownloadResponse = response.json();
    assert_eq!(download.download_url, "https://dl.example/3.epub");
}

#[tokio::test]
async fn test_search_defaults_and_estimated_total() {
    let server = server_with(MockLibrary {
        pages: pages_of(&[1..=2, 3..=4, 5..=5]),
        ..Default::default()
    });

    let response = server.get("/api/search").add_query_param("q", "dune").await;
    response.assert_status_ok();

    let body: SearchResponse = response.json();
    assert_eq!(body.current_page, 1);
    assert_eq!(body.total_pages, 3);
    // No exact count upstream: pages times the default count of 10
    assert_eq!(body.total_results, 30);
}

#[tokio::test]
async fn test_search_later_page() {
    let server = server_with(MockLibrary {
        pages: pages_of(&[1..=2, 3..=4, 5..=6]),
        ..Default::default()
    });

    let body: SearchResponse = server
        .get("/api/search")
        .add_query_param("q", "dune")
        .add_query_param("page", 2)
        .add_query_param("count", 2)
        .await
        .json();

    assert_eq!(body.current_page, 2);
    assert_eq!(body.results[0].id.as_deref(), Some("3"));
}

#[tokio::test]
async fn test_search_beyond_last_page_returns_last_page() {
    let server = server_with(MockLibrary {
        pages: pages_of(&[1..=2, 3..=3]),
        ..Default::default()
    });

    let response = server
        .get("/api/search")
        .add_query_param("q", "dune")
        .add_query_param("page", 9)
        .add_query_param("count", 2)
        .await;
    response.assert_status_ok();

    let body: SearchResponse = response.json();
    assert_eq!(body.current_page, 9);
    assert_eq!(body.results.len(), 1);
    assert_eq!(body.results[0].id.as_deref(), Some("3"));
}

#[tokio::test]
async fn test_search_with_no_results() {
    let server = server_with(MockLibrary::default());

    let body: SearchResponse = server
        .get("/api/search")
        .add_query_param("q", "nothing matches")
        .await
        .json();

    assert!(body.results.is_empty());
    assert_eq!(body.total_pages, 0);
}

#[tokio::test]
async fn test_search_validation() {
    let server = server_with(MockLibrary::default());

    let response = server
        .get("/api/search")
        .add_query_param("q", "dune")
        .add_query_param("page", 0)
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["detail"], "page must be at least 1");

    let response = server
        .get("/api/search")
        .add_query_param("q", "dune")
        .add_query_param("count", 500)
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = server
        .get("/api/search")
        .add_query_param("q", "dune")
        .add_query_param("page", "abc")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["detail"].is_string());

    let response = server.get("/api/search").await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_search_upstream_failure_is_500_with_detail() {
    let server = server_with(MockLibrary {
        search_error: Some("Daily limit reached".to_string()),
        ..Default::default()
    });

    let response = server.get("/api/search").add_query_param("q", "dune").await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = response.json();
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .contains("Daily limit reached"));
}

#[tokio::test]
async fn test_book_found_returns_raw_record() {
    let raw = json!({"id": 42, "title": "Dune", "author": "Frank Herbert", "pages": 412});
    let mut books = HashMap::new();
    books.insert("42".to_string(), Record::from_value(raw.clone()).unwrap());
    let server = server_with(MockLibrary {
        books,
        ..Default::default()
    });

    let response = server.get("/api/book/42").await;
    response.assert_status_ok();
    response.assert_json(&raw);
}

#[tokio::test]
async fn test_book_not_found() {
    let server = server_with(MockLibrary::default());

    let response = server.get("/api/book/missing").await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["detail"], "Book not found");
}

#[tokio::test]
async fn test_book_upstream_failure_is_500_with_detail() {
    let server = server_with(MockLibrary {
        book_error: Some("Session expired".to_string()),
        ..Default::default()
    });

    let response = server.get("/api/book/42").await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = response.json();
    assert!(body["detail"].as_str().unwrap().contains("Session expired"));
}

#[tokio::test]
async fn test_download_unknown_book() {
    let server = server_with(MockLibrary {
        pages: pages_of(&[1..=3]),
        ..Default::default()
    });

    let response = server.get("/api/download/1").await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_download_without_url() {
    let server = server_with(MockLibrary {
        pages: pages_of(&[1..=3]),
        ..Default::default()
    });

    server
        .get("/api/search")
        .add_query_param("q", "dune")
        .await
        .assert_status_ok();

    let response = server.get("/api/download/2").await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["detail"], "Download URL not available");
}

#[tokio::test]
async fn test_download_upstream_failure_is_500_with_detail() {
    let server = server_with(MockLibrary {
        pages: pages_of(&[1..=3]),
        detail_error: Some("Download limit reached".to_string()),
        ..Default::default()
    });

    server
        .get("/api/search")
        .add_query_param("q", "dune")
        .await
        .assert_status_ok();

    let response = server.get("/api/download/2").await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = response.json();
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .contains("Download limit reached"));
}

#[tokio::test]
async fn test_health() {
    let server = server_with(MockLibrary::default());

    for path in ["/health", "/api/health"] {
        let response = server.get(path).await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["service"], "zlibrary-api-server");
        assert_eq!(body["cache"]["pages"], 0);
        assert_eq!(body["cache"]["capacity"], 64);
        assert_eq!(body["upstream"], "https://z-library.sk");
    }

    server
        .get("/api/search")
        .add_query_param("q", "dune")
        .await
        .assert_status_ok();

    let body: Value = server.get("/health").await.json();
    assert_eq!(body["cache"]["pages"], 1);
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let server = server_with(MockLibrary::default());

    let response = server
        .get("/health")
        .add_header(
            axum::http::header::ORIGIN,
            axum::http::HeaderValue::from_static("http://localhost:5173"),
        )
        .await;

    assert_eq!(
        response.header(axum::http::header::ACCESS_CONTROL_ALLOW_ORIGIN),
        "*"
    );
}

#[tokio::test]
async fn test_cors_preflight() {
    use axum::body::Body;
    use axum::http::{header, Method, Request};
    use tower::ServiceExt;

    let state = AppState::new(Config::default(), Arc::new(MockLibrary::default()));
    let app = zlibrary_api_server::app(state);

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/search")
        .header(header::ORIGIN, "http://localhost:5173")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}
