//! Request and response bodies

use crate::crawler::{CrawlResult, Reachability};
use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Status for requests that cannot be served as given
pub const BAD_REQUEST: u16 = 400;

/// An incoming crawl or reachability request
///
/// Every field but `url` is optional and falls back to the configured
/// crawler defaults. Durations are in milliseconds.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRequest {
    pub url: Option<String>,

    pub max_pages: Option<usize>,

    /// Maximum link depth
    pub depth: Option<usize>,

    /// Crawl timeout
    pub timeout: Option<u64>,

    pub js_render: Option<bool>,

    /// Settle delay for rendered pages
    pub wait_time: Option<u64>,

    /// Only check that `url` answers a HEAD request
    #[serde(default)]
    pub test_only: bool,
}

impl ApiRequest {
    pub fn for_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    /// Parses a request from a JSON body
    ///
    /// # Arguments
    ///
    /// * `body` - JSON object with camelCase request fields
    ///
    /// # Returns
    ///
    /// * `Ok(ApiRequest)` - The parsed request, not yet validated
    /// * `Err(ConfigError)` - The body is not a valid request object
    pub fn from_json(body: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(body)?)
    }

    /// Reads and parses a request from a JSON file
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let body = std::fs::read_to_string(path)?;
        Self::from_json(&body)
    }
}

/// Body of an error response
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    pub error: String,

    /// Always false
    pub success: bool,

    /// Transport status code; not serialized
    #[serde(skip)]
    pub status: u16,
}

/// The response to an `ApiRequest`
///
/// Serializes as the bare payload of whichever variant it holds.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ApiResponse {
    Crawl(CrawlResult),
    Reachability(Reachability),
    Error(ErrorBody),
}

impl From<ConfigError> for ApiResponse {
    fn from(e: ConfigError) -> Self {
        Self::error(BAD_REQUEST, e.to_string())
    }
}

impl ApiResponse {
    pub fn error(status: u16, message: impl Into<String>) -> Self {
        Self::Error(ErrorBody {
            error: message.into(),
            success: false,
            status,
        })
    }

    /// Status code to report at the transport boundary
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Crawl(_) | Self::Reachability(_) => 200,
            Self::Error(body) => body.status,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_defaults() {
        let request: ApiRequest = serde_json::from_str(r#"{"url": "https://example.com"}"#).unwrap();
        assert_eq!(request, ApiRequest::for_url("https://example.com"));
        assert!(!request.test_only);
    }

    #[test]
    fn test_request_camel_case_fields() {
        let request: ApiRequest = serde_json::from_value(json!({
            "url": "https://example.com",
            "maxPages": 3,
            "depth": 1,
            "timeout": 5000,
            "jsRender": false,
            "waitTime": 0,
            "testOnly": true
        }))
        .unwrap();

        assert_eq!(request.max_pages, Some(3));
        assert_eq!(request.depth, Some(1));
        assert_eq!(request.timeout, Some(5000));
        assert_eq!(request.js_render, Some(false));
        assert_eq!(request.wait_time, Some(0));
        assert!(request.test_only);
    }

    #[test]
    fn test_malformed_body_becomes_error_response() {
        let err = ApiRequest::from_json(r#"{"url": "https://example.com", "maxPages": "#).unwrap_err();
        assert!(matches!(err, ConfigError::Request(_)));

        let response = ApiResponse::from(err);
        assert_eq!(response.status_code(), 400);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], false);
        assert!(json["error"]
            .as_str()
            .unwrap()
            .starts_with("Invalid request body"));
    }

    #[test]
    fn test_wrong_field_type_rejected() {
        let err = ApiRequest::from_json(r#"{"url": "https://example.com", "depth": "two"}"#);
        assert!(matches!(err, Err(ConfigError::Request(_))));
    }

    #[test]
    fn test_request_from_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"url": "https://example.com", "testOnly": true}"#)
            .unwrap();
        file.flush().unwrap();

        let request = ApiRequest::from_file(file.path()).unwrap();
        assert_eq!(request.url.as_deref(), Some("https://example.com"));
        assert!(request.test_only);
    }

    #[test]
    fn test_missing_request_file() {
        let err = ApiRequest::from_file(Path::new("/nonexistent/request.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
        assert_eq!(ApiResponse::from(err).status_code(), 400);
    }

    #[test]
    fn test_error_body_shape() {
        let response = ApiResponse::error(400, "URL is required");
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"error": "URL is required", "success": false})
        );
        assert_eq!(response.status_code(), 400);
    }

    #[test]
    fn test_reachability_shape() {
        let response = ApiResponse::Reachability(Reachability {
            success: true,
            status: 200,
            status_text: "OK".to_string(),
        });
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"success": true, "status": 200, "statusText": "OK"})
        );
    }

    #[test]
    fn test_crawl_shape() {
        let response = ApiResponse::Crawl(CrawlResult {
            content: String::new(),
            urls: vec!["https://example.com/".to_string()],
            metadata: vec![],
            timed_out: false,
        });
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "content": "",
                "urls": ["https://example.com/"],
                "metadata": [],
                "timedOut": false
            })
        );
        assert_eq!(response.status_code(), 200);
    }
}
