use super::tool::{Tool, ToolFuture};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{info, warn};

pub const DEFAULT_UNSPLASH_BASE_URL: &str = "https://api.unsplash.com";
const SEARCH_TIMEOUT: Duration = Duration::from_secs(10);
/// Page size the planner uses when it wants a handful of candidates
pub const DEFAULT_PER_PAGE: u32 = 5;

pub const MISSING_QUERY_MESSAGE: &str = "错误：请提供搜索关键词";
pub const NOT_FOUND_MESSAGE: &str = "未找到图片";

/// Parameters accepted by the image search tool
#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ImageSearchParams {
    /// 图片搜索关键词
    #[serde(default)]
    pub query: String,
}

/// One search hit, reduced to the fields the planner shows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Photo {
    pub id: Option<String>,
    pub url: Option<String>,
    pub thumb: Option<String>,
    pub description: Option<String>,
    pub photographer: Option<String>,
}

/// Photo search backed by the Unsplash API
#[derive(Debug, Clone)]
pub struct UnsplashTool {
    access_key: String,
    base_url: String,
    client: Client,
}

impl UnsplashTool {
    pub fn new(access_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            base_url: DEFAULT_UNSPLASH_BASE_URL.to_string(),
            client: Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Search photos. Failures are logged and reported as no results.
    pub async fn search_photos(&self, query: &str, per_page: u32) -> Vec<Photo> {
        match self.try_search_photos(query, per_page).await {
            Ok(photos) => photos,
            Err(err) => {
                warn!(target: "trip_agent::tools", query, error = %err, "Unsplash search failed");
                Vec::new()
            }
        }
    }

    /// URL of the best match for `query`, if any
    pub async fn get_photo_url(&self, query: &str) -> Option<String> {
        self.search_photos(query, 1)
            .await
            .into_iter()
            .next()
            .and_then(|photo| photo.url)
    }

    async fn try_search_photos(
        &self,
        query: &str,
        per_page: u32,
    ) -> Result<Vec<Photo>, crate::AgentError> {
        let url = format!("{}/search/photos", self.base_url.trim_end_matches('/'));
        let per_page = per_page.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("query", query),
                ("per_page", per_page.as_str()),
                ("client_id", self.access_key.as_str()),
            ])
            .timeout(SEARCH_TIMEOUT)
            .send()
            .await
            .map_err(|err| crate::AgentError::Http(format!("Failed to call Unsplash: {err}")))?;

        if !response.status().is_success() {
            return Err(crate::AgentError::Http(format!(
                "Unsplash returned status {}",
                response.status()
            )));
        }

        let body: Value = response.json().await.map_err(|err| {
            crate::AgentError::Http(format!("Failed to read Unsplash response: {err}"))
        })?;

        Ok(project_results(&body))
    }
}

impl Tool for UnsplashTool {
    fn name(&self) -> &'static str {
        "image_searcher"
    }

    fn description(&self) -> &'static str {
        "一个智能图片搜索引擎。根据输入的地点或食物或酒店名称自动搜索对应的图片。"
    }

    fn parameters_schema(&self) -> Value {
        let mut schema = serde_json::to_value(schemars::schema_for!(ImageSearchParams))
            .unwrap_or_else(|_| serde_json::json!({"type": "object"}));
        if let Some(object) = schema.as_object_mut() {
            object.remove("$schema");
            object.remove("title");
            object.insert("required".to_string(), serde_json::json!(["query"]));
        }
        schema
    }

    fn execute(&self, parameters: Value) -> ToolFuture<'_> {
        Box::pin(async move {
            let params: ImageSearchParams = serde_json::from_value(parameters).map_err(|err| {
                crate::AgentError::ToolExecution(format!("Invalid parameters: {}", err))
            })?;

            let query = params.query.as_str();
            if query.is_empty() {
                return Ok(Value::String(MISSING_QUERY_MESSAGE.to_string()));
            }

            info!(target: "trip_agent::tools", query, "searching photos");
            match self.get_photo_url(query).await {
                Some(url) => {
                    info!(target: "trip_agent::tools", %url, "photo found");
                    Ok(Value::String(url))
                }
                None => Ok(Value::String(NOT_FOUND_MESSAGE.to_string())),
            }
        })
    }
}

/// Reduce a `/search/photos` body to [`Photo`] records
fn project_results(body: &Value) -> Vec<Photo> {
    let text = |value: Option<&Value>| value.and_then(Value::as_str).map(str::to_string);

    body.get("results")
        .and_then(Value::as_array)
        .map(|results| {
            results
                .iter()
                .map(|photo| Photo {
                    id: text(photo.get("id")),
                    url: text(photo.pointer("/urls/regular")),
                    thumb: text(photo.pointer("/urls/thumb")),
                    description: text(photo.get("description"))
                        .or_else(|| text(photo.get("alt_description"))),
                    photographer: text(photo.pointer("/user/name")),
                })
                .collect()
        })
        .unwrap_or_default()
}
