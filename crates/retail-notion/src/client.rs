//! Notion REST API client.

use async_trait::async_trait;
use reqwest::{header, Method, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, trace, warn};

use crate::config::{DatabaseKind, NotionConfig};
use crate::error::{NotionError, Result};
use crate::filter::Query;
use crate::page::Page;
use crate::properties::Properties;
use crate::store::RecordStore;

/// Largest page size the query endpoint accepts.
pub const MAX_PAGE_SIZE: usize = 100;

/// One page of query results.
#[derive(Debug, Deserialize)]
struct QueryResponse {
    results: Vec<Page>,
    #[serde(default)]
    has_more: bool,
    next_cursor: Option<String>,
}

/// Error body returned by Notion.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

/// [`RecordStore`] backed by the Notion API.
#[derive(Clone)]
pub struct NotionClient {
    client: reqwest::Client,
    config: NotionConfig,
}

impl NotionClient {
    /// Creates a client after validating the configuration.
    pub fn new(config: NotionConfig) -> Result<Self> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .user_agent(concat!("retail-ops/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| NotionError::Config(format!("failed to build http client: {}", e)))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &NotionConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn send(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value> {
        let url = self.url(path);
        trace!(%method, %url, "Notion request");

        let mut request = self
            .client
            .request(method.clone(), &url)
            .bearer_auth(&self.config.token)
            .header("Notion-Version", &self.config.version);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let retry_after = response
            .headers()
            .get(header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());
        let text = response.text().await.unwrap_or_default();
        let err = map_error(status, retry_after, &text);
        warn!(%method, %url, status = status.as_u16(), error = %err, "Notion request failed");
        Err(err)
    }

    fn database_id(&self, database: DatabaseKind) -> &str {
        self.config.databases.get(database)
    }
}

/// Rows to request next: whatever the limit still allows, capped at
/// [`MAX_PAGE_SIZE`].
fn page_size(limit: Option<usize>, fetched: usize) -> usize {
    match limit {
        Some(limit) => limit.saturating_sub(fetched).clamp(1, MAX_PAGE_SIZE),
        None => MAX_PAGE_SIZE,
    }
}

/// Maps a non-success response to an error.
fn map_error(status: StatusCode, retry_after: Option<u64>, body: &str) -> NotionError {
    let parsed: Option<ErrorBody> = serde_json::from_str(body).ok();
    let (code, message) = match parsed {
        Some(b) => (b.code, b.message),
        None => (String::new(), body.to_string()),
    };

    match status {
        StatusCode::NOT_FOUND => NotionError::NotFound(message),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => NotionError::Unauthorized(message),
        StatusCode::TOO_MANY_REQUESTS => NotionError::RateLimited { retry_after },
        _ => NotionError::Api {
            status: status.as_u16(),
            code,
            message,
        },
    }
}

#[async_trait]
impl RecordStore for NotionClient {
    async fn query(&self, database: DatabaseKind, query: &Query) -> Result<Vec<Page>> {
        let path = format!("databases/{}/query", self.database_id(database));
        let mut pages = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let body = query.to_json(page_size(query.limit, pages.len()), cursor.as_deref());
            let value = self.send(Method::POST, &path, Some(body)).await?;
            let response: QueryResponse = serde_json::from_value(value)?;

            pages.extend(response.results.into_iter().filter(|p| !p.archived));

            if let Some(limit) = query.limit {
                if pages.len() >= limit {
                    pages.truncate(limit);
                    break;
                }
            }
            match (response.has_more, response.next_cursor) {
                (true, Some(next)) => cursor = Some(next),
                _ => break,
            }
        }

        debug!(database = %database, count = pages.len(), "Notion query");
        Ok(pages)
    }

    async fn get(&self, database: DatabaseKind, id: &str) -> Result<Page> {
        let value = self.send(Method::GET, &format!("pages/{}", id), None).await?;
        let page: Page = serde_json::from_value(value)?;

        let in_database = page
            .parent
            .database_id
            .as_deref()
            .and_then(|db| self.config.databases.kind_of(db))
            == Some(database);
        if page.archived || !in_database {
            return Err(NotionError::NotFound(id.to_string()));
        }
        Ok(page)
    }

    async fn create(&self, database: DatabaseKind, properties: Properties) -> Result<Page> {
        let body = json!({
            "parent": { "database_id": self.database_id(database) },
            "properties": properties,
        });
        let value = self.send(Method::POST, "pages", Some(body)).await?;
        let page: Page = serde_json::from_value(value)?;
        debug!(database = %database, page_id = %page.id, "Created page");
        Ok(page)
    }

    async fn update(&self, id: &str, properties: Properties) -> Result<Page> {
        let body = json!({ "properties": properties });
        let value = self
            .send(Method::PATCH, &format!("pages/{}", id), Some(body))
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn archive(&self, id: &str) -> Result<()> {
        let body = json!({ "archived": true });
        self.send(Method::PATCH, &format!("pages/{}", id), Some(body))
            .await?;
        debug!(page_id = %id, "Archived page");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseIds;

    fn config() -> NotionConfig {
        let ids = DatabaseIds {
            stores: "db-stores".into(),
            users: "db-users".into(),
            tasks: "db-tasks".into(),
            comments: "db-comments".into(),
            forms: "db-forms".into(),
            form_submissions: "db-submissions".into(),
            notifications: "db-notifications".into(),
            messages: "db-messages".into(),
            finance: "db-finance".into(),
        };
        NotionConfig::new("secret_token", ids)
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut bad = config();
        bad.token = String::new();
        assert!(matches!(NotionClient::new(bad), Err(NotionError::Config(_))));
    }

    #[test]
    fn test_url_building() {
        let client = NotionClient::new(config().with_base_url("http://localhost:9000/v1/")).unwrap();
        assert_eq!(client.url("pages/abc"), "http://localhost:9000/v1/pages/abc");
        assert_eq!(client.database_id(DatabaseKind::Finance), "db-finance");
    }

    #[test]
    fn test_map_error_statuses() {
        let body = r#"{"object":"error","status":404,"code":"object_not_found","message":"Could not find page"}"#;
        assert!(matches!(
            map_error(StatusCode::NOT_FOUND, None, body),
            NotionError::NotFound(m) if m == "Could not find page"
        ));
        assert!(matches!(
            map_error(StatusCode::UNAUTHORIZED, None, "{}"),
            NotionError::Unauthorized(_)
        ));
        assert!(matches!(
            map_error(StatusCode::TOO_MANY_REQUESTS, Some(3), ""),
            NotionError::RateLimited { retry_after: Some(3) }
        ));
    }

    #[test]
    fn test_map_error_api_with_unparseable_body() {
        match map_error(StatusCode::BAD_GATEWAY, None, "<html>oops</html>") {
            NotionError::Api { status, code, message } => {
                assert_eq!(status, 502);
                assert!(code.is_empty());
                assert_eq!(message, "<html>oops</html>");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_query_response_decode() {
        let raw = json!({
            "object": "list",
            "results": [{
                "id": "p1",
                "created_time": "2024-01-01T00:00:00.000Z",
                "last_edited_time": "2024-01-01T00:00:00.000Z",
                "properties": {}
            }],
            "has_more": true,
            "next_cursor": "c2"
        });
        let response: QueryResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(response.results.len(), 1);
        assert!(response.has_more);
        assert_eq!(response.next_cursor.as_deref(), Some("c2"));
    }

    #[test]
    fn test_page_size() {
        assert_eq!(page_size(None, 0), MAX_PAGE_SIZE);
        assert_eq!(page_size(None, 250), MAX_PAGE_SIZE);
        assert_eq!(page_size(Some(30), 0), 30);
        assert_eq!(page_size(Some(30), 28), 2);
        assert_eq!(page_size(Some(250), 100), MAX_PAGE_SIZE);
        assert_eq!(page_size(Some(5), 5), 1);
    }

    mod stub {
        use std::sync::{Arc, Mutex};

        use axum::{
            extract::{Path, State},
            http::{HeaderMap, StatusCode},
            routing::{get, post},
            Json, Router,
        };
        use serde_json::{json, Value};

        use super::config;
        use crate::client::NotionClient;

        /// Rows served by the stub database; `p3` is archived.
        pub const ROWS: usize = 5;
        /// The stub never returns more than this per request.
        const SERVER_PAGE: usize = 2;

        #[derive(Clone, Default)]
        pub struct Stub {
            pub requests: Arc<Mutex<Vec<Value>>>,
        }

        fn page(index: usize) -> Value {
            json!({
                "object": "page",
                "id": format!("p{}", index + 1),
                "created_time": "2024-01-01T00:00:00.000Z",
                "last_edited_time": "2024-01-01T00:00:00.000Z",
                "archived": index == 2,
                "parent": { "type": "database_id", "database_id": "db-tasks" },
                "properties": {}
            })
        }

        async fn query(
            State(stub): State<Stub>,
            Path(database): Path<String>,
            headers: HeaderMap,
            Json(body): Json<Value>,
        ) -> Json<Value> {
            let start = body["start_cursor"]
                .as_str()
                .and_then(|c| c.parse::<usize>().ok())
                .unwrap_or(0);
            let size = body["page_size"].as_u64().unwrap_or(0) as usize;
            let end = (start + size.min(SERVER_PAGE)).min(ROWS);
            let has_more = end < ROWS;

            stub.requests.lock().unwrap().push(json!({
                "database": database,
                "authorization": headers["authorization"].to_str().unwrap_or_default(),
                "version": headers["notion-version"].to_str().unwrap_or_default(),
                "body": body,
            }));

            Json(json!({
                "object": "list",
                "results": (start..end).map(page).collect::<Vec<_>>(),
                "has_more": has_more,
                "next_cursor": has_more.then(|| end.to_string()),
            }))
        }

        async fn get_page(Path(id): Path<String>) -> (StatusCode, Json<Value>) {
            match id.as_str() {
                "p1" => (StatusCode::OK, Json(page(0))),
                "p3" => (StatusCode::OK, Json(page(2))),
                _ => (
                    StatusCode::NOT_FOUND,
                    Json(json!({
                        "object": "error",
                        "status": 404,
                        "code": "object_not_found",
                        "message": "Could not find page"
                    })),
                ),
            }
        }

        pub async fn spawn() -> (NotionClient, Stub) {
            let stub = Stub::default();
            let app = Router::new()
                .route("/v1/databases/:id/query", post(query))
                .route("/v1/pages/:id", get(get_page))
                .with_state(stub.clone());

            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            tokio::spawn(async move {
                axum::serve(listener, app).await.unwrap();
            });

            let client =
                NotionClient::new(config().with_base_url(format!("http://{}/v1", addr))).unwrap();
            (client, stub)
        }
    }

    fn ids(pages: &[Page]) -> Vec<&str> {
        pages.iter().map(|p| p.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_query_follows_cursors() {
        let (client, stub) = stub::spawn().await;

        let pages = client.query(DatabaseKind::Tasks, &Query::new()).await.unwrap();
        assert_eq!(ids(&pages), ["p1", "p2", "p4", "p5"]);

        let requests = stub.requests.lock().unwrap();
        assert_eq!(requests.len(), 3);
        for request in requests.iter() {
            assert_eq!(request["database"], "db-tasks");
            assert_eq!(request["authorization"], "Bearer secret_token");
            assert_eq!(request["version"], crate::config::DEFAULT_NOTION_VERSION);
            assert_eq!(request["body"]["page_size"], MAX_PAGE_SIZE);
        }
        assert!(requests[0]["body"].get("start_cursor").is_none());
        assert_eq!(requests[1]["body"]["start_cursor"], "2");
        assert_eq!(requests[2]["body"]["start_cursor"], "4");
    }

    #[tokio::test]
    async fn test_query_stops_at_limit() {
        let (client, stub) = stub::spawn().await;

        let pages = client
            .query(DatabaseKind::Tasks, &Query::new().limit(3))
            .await
            .unwrap();
        // The archived row does not count towards the limit.
        assert_eq!(ids(&pages), ["p1", "p2", "p4"]);

        let sizes: Vec<Value> = stub
            .requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r["body"]["page_size"].clone())
            .collect();
        assert_eq!(sizes, [json!(3), json!(1), json!(1)]);
    }

    #[tokio::test]
    async fn test_get_over_http() {
        let (client, _stub) = stub::spawn().await;

        let page = client.get(DatabaseKind::Tasks, "p1").await.unwrap();
        assert_eq!(page.id, "p1");

        assert!(matches!(
            client.get(DatabaseKind::Users, "p1").await,
            Err(NotionError::NotFound(_))
        ));
        assert!(matches!(
            client.get(DatabaseKind::Tasks, "p3").await,
            Err(NotionError::NotFound(_))
        ));
        assert!(matches!(
            client.get(DatabaseKind::Tasks, "missing").await,
            Err(NotionError::NotFound(m)) if m == "Could not find page"
        ));
    }
}
