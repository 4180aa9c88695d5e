//! # HTTP Plumbing
//!
//! Thin wrapper over `reqwest` shared by every service: bearer auth, a
//! configured timeout, status classification and envelope extraction.
//!
//! ## Envelope Contract
//! The backend wraps successful payloads as `{"data": ...}`. Not uniformly,
//! though: a few list endpoints answer with a bare JSON array. [`take_data`]
//! accepts both (logging the bare-array case) and treats anything else as
//! "respuesta inesperada del backend".

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{classify_status, ClientError, ClientResult};
use crate::session::Session;

/// Per-request timeout. No retries anywhere in this layer.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Shared HTTP entry point, cloned into each service.
#[derive(Debug, Clone)]
pub struct Api {
    http: reqwest::Client,
    session: Session,
}

impl Api {
    /// Builds the client with the session injected at construction time.
    pub fn new(session: Session) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(ClientError::Transport)?;

        Ok(Api { http, session })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Joins the base URL with a path, tolerating stray slashes.
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.session.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// GET returning the parsed JSON body.
    pub async fn get(
        &self,
        path: &str,
        query: &[(&str, String)],
        not_found: &str,
    ) -> ClientResult<Value> {
        let req = self.http.get(self.url(path)).query(query);
        self.execute(req, path, not_found).await
    }

    /// POST with a JSON body, returning the parsed JSON body.
    pub async fn post(&self, path: &str, body: &Value, not_found: &str) -> ClientResult<Value> {
        let req = self.http.post(self.url(path)).json(body);
        self.execute(req, path, not_found).await
    }

    /// PUT with a JSON body; the response body is ignored.
    pub async fn put(&self, path: &str, body: &Value, not_found: &str) -> ClientResult<()> {
        let req = self.http.put(self.url(path)).json(body);
        self.execute_no_content(req, path, not_found).await
    }

    /// PATCH without a body; the response body is ignored.
    pub async fn patch(&self, path: &str, not_found: &str) -> ClientResult<()> {
        let req = self.http.patch(self.url(path));
        self.execute_no_content(req, path, not_found).await
    }

    /// DELETE; the response body is ignored.
    pub async fn delete(&self, path: &str, not_found: &str) -> ClientResult<()> {
        let req = self.http.delete(self.url(path));
        self.execute_no_content(req, path, not_found).await
    }

    /// Multipart POST (document upload), returning the parsed JSON body.
    pub async fn post_multipart(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
        not_found: &str,
    ) -> ClientResult<Value> {
        let req = self.http.post(self.url(path)).multipart(form);
        self.execute(req, path, not_found).await
    }

    /// GET returning the raw bytes plus the response content type; used for
    /// file downloads where the body is not JSON on the happy path.
    pub async fn get_bytes(
        &self,
        path: &str,
        not_found: &str,
    ) -> ClientResult<(Option<String>, Vec<u8>)> {
        debug!(path, "GET (bytes)");

        let resp = self
            .http
            .get(self.url(path))
            .bearer_auth(&self.session.token)
            .send()
            .await
            .map_err(ClientError::Transport)?;

        let status = resp.status().as_u16();
        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let bytes = resp.bytes().await.map_err(ClientError::Transport)?.to_vec();

        if !(200..300).contains(&status) {
            let body = String::from_utf8_lossy(&bytes);
            return Err(classify_status(status, &body, not_found));
        }

        Ok((content_type, bytes))
    }

    async fn execute(
        &self,
        req: reqwest::RequestBuilder,
        path: &str,
        not_found: &str,
    ) -> ClientResult<Value> {
        let text = self.send_checked(req, path, not_found).await?;
        serde_json::from_str(&text).map_err(|_| ClientError::UnexpectedEnvelope)
    }

    async fn execute_no_content(
        &self,
        req: reqwest::RequestBuilder,
        path: &str,
        not_found: &str,
    ) -> ClientResult<()> {
        self.send_checked(req, path, not_found).await.map(|_| ())
    }

    async fn send_checked(
        &self,
        req: reqwest::RequestBuilder,
        path: &str,
        not_found: &str,
    ) -> ClientResult<String> {
        debug!(path, "request");

        let resp = req
            .bearer_auth(&self.session.token)
            .send()
            .await
            .map_err(ClientError::Transport)?;

        let status = resp.status().as_u16();
        let text = resp.text().await.map_err(ClientError::Transport)?;

        if !(200..300).contains(&status) {
            return Err(classify_status(status, &text, not_found));
        }

        Ok(text)
    }
}

// =============================================================================
// Envelope Extraction
// =============================================================================

/// Unwraps the `{"data": ...}` envelope.
///
/// A bare array is tolerated (some list endpoints skip the envelope) and
/// logged; an object without `data`, or any other shape, is an error.
pub fn take_data(value: Value) -> ClientResult<Value> {
    match value {
        Value::Object(mut map) => map.remove("data").ok_or(ClientError::UnexpectedEnvelope),
        Value::Array(_) => {
            warn!("respuesta sin envoltorio data, se acepta el arreglo directo");
            Ok(value)
        }
        _ => Err(ClientError::UnexpectedEnvelope),
    }
}

/// Unwraps the envelope and deserializes the payload.
pub fn data_as<T: DeserializeOwned>(value: Value) -> ClientResult<T> {
    serde_json::from_value(take_data(value)?).map_err(|_| ClientError::UnexpectedEnvelope)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_session() -> Session {
        Session {
            base_url: "https://api.notaventa.cl/".to_string(),
            token: "tok".to_string(),
            company_id: 4,
            company_name: "Comercial Andes SpA".to_string(),
            connection_id: None,
        }
    }

    #[test]
    fn test_url_join_tolerates_slashes() {
        let api = Api::new(test_session()).unwrap();
        assert_eq!(
            api.url("/search-sale-by-folio/4"),
            "https://api.notaventa.cl/search-sale-by-folio/4"
        );
        assert_eq!(
            api.url("history-sale/4"),
            "https://api.notaventa.cl/history-sale/4"
        );
    }

    #[test]
    fn test_take_data_unwraps_envelope() {
        let value = json!({"data": {"id": 7}});
        assert_eq!(take_data(value).unwrap(), json!({"id": 7}));
    }

    #[test]
    fn test_missing_data_is_unexpected_envelope() {
        let err = take_data(json!({"id": 7})).unwrap_err();
        assert!(matches!(err, ClientError::UnexpectedEnvelope));
        assert_eq!(err.to_string(), "respuesta inesperada del backend");

        assert!(take_data(json!("texto")).is_err());
        assert!(take_data(json!(42)).is_err());
    }

    #[test]
    fn test_bare_array_is_tolerated() {
        let value = json!([{"id": 1}, {"id": 2}]);
        assert_eq!(take_data(value.clone()).unwrap(), value);
    }

    #[test]
    fn test_data_as_deserializes_payload() {
        #[derive(serde::Deserialize)]
        struct Row {
            id: i64,
        }

        let rows: Vec<Row> = data_as(json!({"data": [{"id": 1}, {"id": 2}]})).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].id, 2);
    }
}
