//! HTTP client for the library's JSON "eapi"
//!
//! Login happens once, in [`EapiClient::login`]; the resulting session
//! cookies are attached to every later request and never change.

use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder, Response, StatusCode};
use serde_json::Value;

use crate::config::{Credentials, UpstreamConfig};

use super::client::{LibraryClient, Paginator};
use super::types::{Record, UpstreamError};

/// Session cookies issued by the login endpoint
#[derive(Clone)]
struct Session {
    user_id: String,
    user_key: String,
}

impl Session {
    fn cookie(&self) -> String {
        format!(
            "remix_userid={}; remix_userkey={}",
            self.user_id, self.user_key
        )
    }
}

/// Authenticated library client
#[derive(Clone)]
pub struct EapiClient {
    http: Client,
    base_url: String,
    session: Session,
}

impl std::fmt::Debug for EapiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EapiClient")
            .field("base_url", &self.base_url)
            .field("user_id", &self.session.user_id)
            .finish_non_exhaustive()
    }
}

impl EapiClient {
    /// Log in and return a client bound to the new session
    pub async fn login(
        config: &UpstreamConfig,
        credentials: &Credentials,
    ) -> Result<Self, UpstreamError> {
        let http = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("zlibrary-api-server/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let url = format!("{}/eapi/user/login", config.base_url);
        let response = http
            .post(&url)
            .form(&[
                ("email", credentials.email.as_str()),
                ("password", credentials.password.as_str()),
            ])
            .send()
            .await?;

        let body = read_json(response).await?;
        let user = body
            .get("user")
            .ok_or_else(|| UpstreamError::Decode("login response has no user".to_string()))?;

        let user_id = scalar_string(user.get("id"))
            .ok_or_else(|| UpstreamError::Decode("login response has no user id".to_string()))?;
        let user_key = scalar_string(user.get("remix_userkey"))
            .ok_or_else(|| UpstreamError::Decode("login response has no user key".to_string()))?;

        tracing::info!("Logged in to {} as user {}", config.base_url, user_id);

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            session: Session { user_id, user_key },
        })
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.http
            .get(format!("{}{}", self.base_url, path))
            .header(header::COOKIE, self.session.cookie())
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.http
            .post(format!("{}{}", self.base_url, path))
            .header(header::COOKIE, self.session.cookie())
    }

    async fn fetch_search_page(
        &self,
        query: &str,
        limit: u32,
        page: u32,
    ) -> Result<SearchBatch, UpstreamError> {
        tracing::debug!("Fetching search page {} for {:?} (limit {})", page, query, limit);

        let limit = limit.to_string();
        let page = page.to_string();
        let response = self
            .post("/eapi/book/search")
            .form(&[
                ("message", query),
                ("limit", limit.as_str()),
                ("page", page.as_str()),
            ])
            .send()
            .await?;

        let body = read_json(response).await?;
        Ok(SearchBatch::from_body(body))
    }
}

#[async_trait]
impl LibraryClient for EapiClient {
    async fn search(
        &self,
        query: &str,
        results_per_page: u32,
    ) -> Result<Box<dyn Paginator>, UpstreamError> {
        let batch = self.fetch_search_page(query, results_per_page, 1).await?;

        // Results without pagination info still make one page
        let total_pages = if batch.total_pages == 0 && !batch.records.is_empty() {
            1
        } else {
            batch.total_pages
        };

        Ok(Box::new(EapiPaginator {
            client: self.clone(),
            query: query.to_string(),
            limit: results_per_page,
            page: 1,
            result: batch.records,
            total_pages,
            total_results: batch.total_results,
        }))
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Record>, UpstreamError> {
        let path = format!("/eapi/book/{}", urlencoding::encode(id));
        let response = self.get(&path).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            tracing::debug!("Book {} not found upstream", id);
            return Ok(None);
        }

        let body = read_json(response).await?;
        Ok(body
            .get("book")
            .cloned()
            .and_then(Record::from_value)
            .filter(|book| !book.is_empty()))
    }

    async fn fetch_detail(&self, record: &Record) -> Result<Record, UpstreamError> {
        let id = record
            .id()
            .ok_or_else(|| UpstreamError::Decode("record has no id".to_string()))?;

        let path = match record.scalar("hash") {
            Some(hash) => format!(
                "/eapi/book/{}/{}/file",
                urlencoding::encode(&id),
                urlencoding::encode(&hash)
            ),
            None => format!("/eapi/book/{}/file", urlencoding::encode(&id)),
        };

        let response = self.get(&path).send().await?;
        let body = read_json(response).await?;

        let mut detail = body
            .get("file")
            .cloned()
            .and_then(Record::from_value)
            .unwrap_or_default();

        if let Some(link) = detail.scalar("downloadLink").filter(|l| !l.is_empty()) {
            detail.insert("download_url", link);
        }

        Ok(detail)
    }
}

/// One page of search results as parsed from the upstream body
struct SearchBatch {
    records: Vec<Record>,
    total_pages: u32,
    total_results: Option<u64>,
}

impl SearchBatch {
    fn from_body(body: Value) -> Self {
        let records = match body.get("books") {
            Some(Value::Array(books)) => books
                .iter()
                .cloned()
                .filter_map(Record::from_value)
                .collect(),
            _ => Vec::new(),
        };

        let pagination = body.get("pagination");
        let total_pages = pagination
            .and_then(|p| p.get("total_pages"))
            .and_then(Value::as_u64)
            .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
            .unwrap_or(0);
        let total_results = pagination
            .and_then(|p| p.get("total_items"))
            .and_then(Value::as_u64);

        Self {
            records,
            total_pages,
            total_results,
        }
    }
}

/// Paginator over one eapi search
pub struct EapiPaginator {
    client: EapiClient,
    query: String,
    limit: u32,
    page: u32,
    result: Vec<Record>,
    total_pages: u32,
    total_results: Option<u64>,
}

#[async_trait]
impl Paginator for EapiPaginator {
    fn result(&self) -> &[Record] {
        &self.result
    }

    fn total_pages(&self) -> u32 {
        self.total_pages
    }

    fn total_results(&self) -> Option<u64> {
        self.total_results
    }

    async fn next(&mut self) -> Result<Vec<Record>, UpstreamError> {
        if self.page >= self.total_pages {
            return Ok(Vec::new());
        }

        let next_page = self.page + 1;
        let batch = self
            .client
            .fetch_search_page(&self.query, self.limit, next_page)
            .await?;

        self.page = next_page;
        self.result = batch.records.clone();
        if batch.total_pages > 0 {
            self.total_pages = batch.total_pages;
        }
        if batch.total_results.is_some() {
            self.total_results = batch.total_results;
        }

        Ok(batch.records)
    }
}

/// Decode a response body, turning HTTP and `success: 0` failures into errors
async fn read_json(response: Response) -> Result<Value, UpstreamError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(UpstreamError::Status {
            status: status.as_u16(),
            body,
        });
    }

    let body: Value = response
        .json()
        .await
        .map_err(|e| UpstreamError::Decode(e.to_string()))?;

    let failed = match body.get("success") {
        Some(Value::Bool(ok)) => !ok,
        Some(Value::Number(n)) => n.as_i64() == Some(0),
        _ => false,
    };
    if failed {
        let message = body
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("unknown error")
            .to_string();
        return Err(UpstreamError::Rejected(message));
    }

    Ok(body)
}

fn scalar_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
