//! # HTTP Error Types
//!
//! Error classification for backend responses.
//!
//! ## Error Flow
//! ```text
//! reqwest failure ──────────────► ClientError::Transport
//! HTTP 401/403 ─────────────────► ClientError::PermissionDenied
//! HTTP 404 ─────────────────────► ClientError::NotFound (entity message)
//! HTTP 422 ─────────────────────► Validation / InsufficientStock
//! HTTP 500 (known substring) ───► MisconfiguredController
//! missing {data} envelope ──────► UnexpectedEnvelope
//! ```
//!
//! Classification happens ONCE, here. Callers match on variants, never on
//! message text.

use thiserror::Error;

/// Errors raised by the HTTP layer, carrying display-ready messages.
#[derive(Debug, Error)]
pub enum ClientError {
    /// No usable response from the backend (connect, timeout, body read).
    #[error("error de conexión con el servidor")]
    Transport(#[source] reqwest::Error),

    /// 401/403. Never triggers an automatic re-login from this layer.
    #[error("acceso denegado, revise sus permisos")]
    PermissionDenied,

    /// 404 with an entity-specific message supplied by the call site,
    /// e.g. "la nota de venta con folio 17 no fue encontrada".
    #[error("{0}")]
    NotFound(String),

    /// 422 with the backend-provided message where available.
    #[error("{0}")]
    Validation(String),

    /// Stock rejected at save time. The local availability figure is only
    /// a hint; this is the backend's authoritative refusal.
    #[error("stock insuficiente: {0}")]
    InsufficientStock(String),

    /// 500 whose body matches a known routing-failure substring.
    #[error("controlador mal configurado en el backend")]
    MisconfiguredController,

    /// Any other non-success status.
    #[error("error del servidor (HTTP {0})")]
    Server(u16),

    /// Response parsed but lacked the expected `data` envelope.
    #[error("respuesta inesperada del backend")]
    UnexpectedEnvelope,

    /// A document download did not return a PDF.
    #[error("el documento recibido no es un PDF ({0})")]
    NotAPdf(String),

    /// No session is configured for this machine.
    #[error("no hay una sesión configurada: {0}")]
    SessionMissing(String),

    /// The session file exists but cannot be used.
    #[error("archivo de sesión inválido: {0}")]
    SessionInvalid(String),
}

/// Classifies a non-success HTTP response.
///
/// `not_found` is the entity-specific message the call site wants shown for
/// a 404; everything else is derived from the status code and body.
pub fn classify_status(status: u16, body: &str, not_found: &str) -> ClientError {
    match status {
        401 | 403 => ClientError::PermissionDenied,
        404 => ClientError::NotFound(not_found.to_string()),
        422 => {
            let message = backend_message(body)
                .unwrap_or_else(|| "los datos enviados no son válidos".to_string());
            if message.to_lowercase().contains("stock") {
                ClientError::InsufficientStock(message)
            } else {
                ClientError::Validation(message)
            }
        }
        500 => {
            // Express-style routing failures ("Cannot GET /x") mean the
            // backend route table and this client disagree.
            if body.contains("Cannot GET")
                || body.contains("Cannot POST")
                || body.contains("Cannot PUT")
                || body.contains("Cannot PATCH")
                || body.contains("Cannot DELETE")
            {
                ClientError::MisconfiguredController
            } else {
                ClientError::Server(500)
            }
        }
        other => ClientError::Server(other),
    }
}

/// Pulls a human message out of a backend error body, which may be
/// `{"message": ...}`, `{"error": ...}` or plain text.
fn backend_message(body: &str) -> Option<String> {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error", "detail"] {
            if let Some(msg) = value.get(key).and_then(|m| m.as_str()) {
                return Some(msg.to_string());
            }
        }
        return None;
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Result type for HTTP-layer operations.
pub type ClientResult<T> = Result<T, ClientError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_denied_for_401_and_403() {
        assert!(matches!(
            classify_status(401, "", "x"),
            ClientError::PermissionDenied
        ));
        assert!(matches!(
            classify_status(403, "", "x"),
            ClientError::PermissionDenied
        ));
        assert_eq!(
            classify_status(401, "", "x").to_string(),
            "acceso denegado, revise sus permisos"
        );
    }

    #[test]
    fn test_404_carries_entity_specific_message() {
        let err = classify_status(
            404,
            "{}",
            "la nota de venta con folio 17 no fue encontrada",
        );
        assert!(err.to_string().contains("no fue encontrada"));
        assert!(err.to_string().contains("17"));
    }

    #[test]
    fn test_422_surfaces_backend_message_verbatim() {
        let err = classify_status(422, r#"{"message":"rut inválido"}"#, "x");
        match err {
            ClientError::Validation(msg) => assert_eq!(msg, "rut inválido"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_422_stock_rejection_is_first_class() {
        let err = classify_status(
            422,
            r#"{"message":"stock insuficiente para el producto 9"}"#,
            "x",
        );
        assert!(matches!(err, ClientError::InsufficientStock(_)));
        assert!(err.to_string().contains("stock insuficiente"));
    }

    #[test]
    fn test_500_routing_failure_detected_by_substring() {
        assert!(matches!(
            classify_status(500, "Cannot GET /history-sale/3", "x"),
            ClientError::MisconfiguredController
        ));
        assert!(matches!(
            classify_status(500, "boom", "x"),
            ClientError::Server(500)
        ));
    }

    #[test]
    fn test_backend_message_extraction() {
        assert_eq!(
            backend_message(r#"{"error":"sin permisos"}"#),
            Some("sin permisos".to_string())
        );
        assert_eq!(backend_message("plain text"), Some("plain text".to_string()));
        assert_eq!(backend_message(""), None);
        assert_eq!(backend_message(r#"{"other":1}"#), None);
    }
}
