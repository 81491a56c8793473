//! HTTP client for the ORDS backend.
//!
//! Thin wrapper over `reqwest` that builds endpoint URLs from the
//! configured module base, attaches the `X-API-Token` header, and hands
//! back the raw status plus body so the handlers can run the envelope
//! normalization themselves.

use reqwest::{Method, StatusCode};
use serde_json::Value;
use std::time::Duration;

use crate::config::BackendConfig;

use super::OrdsError;

/// Header carrying the opaque session token on every authenticated call.
pub const TOKEN_HEADER: &str = "X-API-Token";

pub struct OrdsClient {
    base_url: String,
    http: reqwest::Client,
}

/// Raw result of a backend call: HTTP status plus the body text.
///
/// The body is kept as text because ORDS answers JSON, plain text, or a
/// full HTML error page depending on the deployment and the verb.
#[derive(Debug)]
pub struct OrdsResponse {
    pub status: StatusCode,
    pub body: String,
}

impl OrdsResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Parse the body as JSON, if it is JSON.
    pub fn json(&self) -> Option<Value> {
        serde_json::from_str(&self.body).ok()
    }

    /// Best error message for a failed call: the JSON `message`/`error`
    /// field, else the raw body, else the provided fallback.
    pub fn error_message(&self, fallback: &str) -> String {
        if let Some(data) = self.json() {
            for key in ["message", "error"] {
                if let Some(msg) = data.get(key).and_then(Value::as_str) {
                    if !msg.is_empty() {
                        return msg.to_string();
                    }
                }
            }
        }

        let raw = self.body.trim();
        if raw.is_empty() || super::response::looks_like_html(raw) {
            fallback.to_string()
        } else {
            raw.to_string()
        }
    }
}

impl OrdsClient {
    /// Build a client from config. Returns `None` when no base URL is
    /// configured; callers surface that as a config error per request.
    pub fn from_config(config: &BackendConfig) -> Result<Option<Self>, OrdsError> {
        let Some(base_url) = config.base_url.as_deref() else {
            return Ok(None);
        };

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Some(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        }))
    }

    /// Endpoint URL for a module path such as `/proyectos/5/activos`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> Result<OrdsResponse, OrdsError> {
        self.send(Method::GET, path, token, None).await
    }

    pub async fn post(
        &self,
        path: &str,
        token: Option<&str>,
        body: &Value,
    ) -> Result<OrdsResponse, OrdsError> {
        self.send(Method::POST, path, token, Some(body)).await
    }

    pub async fn put(
        &self,
        path: &str,
        token: Option<&str>,
        body: &Value,
    ) -> Result<OrdsResponse, OrdsError> {
        self.send(Method::PUT, path, token, Some(body)).await
    }

    /// DELETE carries no body and no `Content-Type`: ORDS rejects a JSON
    /// content type with an empty body (`Expected one of: <<{,[>>`).
    pub async fn delete(&self, path: &str, token: Option<&str>) -> Result<OrdsResponse, OrdsError> {
        self.send(Method::DELETE, path, token, None).await
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<&Value>,
    ) -> Result<OrdsResponse, OrdsError> {
        let url = self.endpoint(path);
        tracing::debug!(%method, %url, "ORDS request");

        let mut request = self.http.request(method, &url);
        if let Some(token) = token {
            request = request.header(TOKEN_HEADER, token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        tracing::debug!(%url, %status, bytes = body.len(), "ORDS response");

        Ok(OrdsResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_with_base(base: &str) -> OrdsClient {
        OrdsClient::from_config(&BackendConfig {
            base_url: Some(base.to_string()),
            timeout_secs: 5,
        })
        .unwrap()
        .unwrap()
    }

    #[test]
    fn test_trailing_slash_stripped() {
        let client = client_with_base("https://apps.example.com:8888/apex/ws_sator/vams/");
        assert_eq!(
            client.endpoint("/proyectos"),
            "https://apps.example.com:8888/apex/ws_sator/vams/proyectos"
        );
    }

    #[test]
    fn test_base_without_slash_unchanged() {
        let client = client_with_base("https://apps.example.com:8888/apex/ws_sator/vams");
        assert_eq!(
            client.endpoint("/proyectos/5/activos/9"),
            "https://apps.example.com:8888/apex/ws_sator/vams/proyectos/5/activos/9"
        );
    }

    #[test]
    fn test_missing_base_url_yields_none() {
        let client = OrdsClient::from_config(&BackendConfig::default()).unwrap();
        assert!(client.is_none());
    }

    #[test]
    fn test_error_message_prefers_json_message() {
        let response = OrdsResponse {
            status: StatusCode::BAD_REQUEST,
            body: r#"{"message": "ORA-02291: integrity constraint", "error": "otro"}"#.to_string(),
        };
        assert_eq!(
            response.error_message("Error genérico"),
            "ORA-02291: integrity constraint"
        );
    }

    #[test]
    fn test_error_message_falls_back_to_error_field() {
        let response = OrdsResponse {
            status: StatusCode::BAD_REQUEST,
            body: r#"{"error": "fila no encontrada"}"#.to_string(),
        };
        assert_eq!(response.error_message("Error genérico"), "fila no encontrada");
    }

    #[test]
    fn test_error_message_falls_back_to_raw_body() {
        let response = OrdsResponse {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: "ORA-06550: line 1".to_string(),
        };
        assert_eq!(response.error_message("Error genérico"), "ORA-06550: line 1");
    }

    #[test]
    fn test_error_message_generic_for_empty_or_html() {
        let empty = OrdsResponse {
            status: StatusCode::BAD_GATEWAY,
            body: "  ".to_string(),
        };
        assert_eq!(empty.error_message("Error genérico"), "Error genérico");

        let html = OrdsResponse {
            status: StatusCode::NOT_FOUND,
            body: "<!DOCTYPE html><html><body>404</body></html>".to_string(),
        };
        assert_eq!(html.error_message("Error genérico"), "Error genérico");
    }
}
