//! # Session
//!
//! The authenticated session: bearer token plus the selected company and
//! marketplace connection. One explicit value, loaded once and injected
//! into every service at construction time — the single source of truth
//! for "current company/connection".
//!
//! ## Configuration Sources
//! ```text
//! 1. Environment variables (highest priority)
//!    NOTAVENTA_API_URL, NOTAVENTA_TOKEN, NOTAVENTA_COMPANY_ID,
//!    NOTAVENTA_COMPANY_NAME, NOTAVENTA_CONNECTION_ID
//! 2. TOML session file
//!    ~/.config/notaventa/session.toml (Linux)
//!    ~/Library/Application Support/cl.notaventa.notaventa (macOS)
//! ```
//!
//! There is no expiry handling here; an expired token shows up as a 401
//! and is classified as a permission error.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ClientError, ClientResult};

/// Session file name inside the platform config directory.
const SESSION_FILE: &str = "session.toml";

/// The authenticated session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Backend base URL, e.g. `https://api.notaventa.cl`.
    pub base_url: String,

    /// Bearer token sent on every request.
    pub token: String,

    /// Company the operator is working for; scopes warehouses, sales and
    /// documents.
    pub company_id: i64,

    /// Company display name, echoed into emission payloads.
    pub company_name: String,

    /// Selected marketplace connection, when one is active.
    #[serde(default)]
    pub connection_id: Option<String>,
}

impl Session {
    /// Loads the session: file first, then environment overrides.
    pub fn load() -> ClientResult<Self> {
        let mut session = match session_file_path() {
            Some(path) if path.exists() => Session::from_file(&path)?,
            _ => Session::from_env_only()?,
        };

        session.apply_env_overrides();
        session.validate()?;

        debug!(company_id = session.company_id, "sesión cargada");
        Ok(session)
    }

    /// Parses a session from a TOML file.
    pub fn from_file(path: &PathBuf) -> ClientResult<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ClientError::SessionInvalid(e.to_string()))?;
        Session::from_toml_str(&contents)
    }

    /// Parses a session from TOML text.
    pub fn from_toml_str(contents: &str) -> ClientResult<Self> {
        toml::from_str(contents).map_err(|e| ClientError::SessionInvalid(e.to_string()))
    }

    /// Serializes the session back to TOML.
    pub fn to_toml_string(&self) -> ClientResult<String> {
        toml::to_string_pretty(self).map_err(|e| ClientError::SessionInvalid(e.to_string()))
    }

    /// Persists the session to the platform config directory.
    pub fn save(&self) -> ClientResult<()> {
        let path = session_file_path().ok_or_else(|| {
            ClientError::SessionInvalid("no se pudo determinar el directorio de configuración".into())
        })?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ClientError::SessionInvalid(e.to_string()))?;
        }

        std::fs::write(&path, self.to_toml_string()?)
            .map_err(|e| ClientError::SessionInvalid(e.to_string()))?;

        debug!(?path, "sesión guardada");
        Ok(())
    }

    /// Builds a session purely from environment variables; used when no
    /// session file exists yet.
    fn from_env_only() -> ClientResult<Self> {
        let base_url = std::env::var("NOTAVENTA_API_URL").map_err(|_| {
            ClientError::SessionMissing(
                "defina NOTAVENTA_API_URL o cree el archivo session.toml".into(),
            )
        })?;
        let token = std::env::var("NOTAVENTA_TOKEN").map_err(|_| {
            ClientError::SessionMissing("defina NOTAVENTA_TOKEN".into())
        })?;
        let company_id = std::env::var("NOTAVENTA_COMPANY_ID")
            .ok()
            .and_then(|v| v.parse().ok())
            .ok_or_else(|| ClientError::SessionMissing("defina NOTAVENTA_COMPANY_ID".into()))?;
        let company_name = std::env::var("NOTAVENTA_COMPANY_NAME").unwrap_or_default();

        Ok(Session {
            base_url,
            token,
            company_id,
            company_name,
            connection_id: std::env::var("NOTAVENTA_CONNECTION_ID").ok(),
        })
    }

    /// Environment variables override individual file fields.
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("NOTAVENTA_API_URL") {
            self.base_url = url;
        }
        if let Ok(token) = std::env::var("NOTAVENTA_TOKEN") {
            self.token = token;
        }
        if let Ok(id) = std::env::var("NOTAVENTA_COMPANY_ID") {
            if let Ok(id) = id.parse() {
                self.company_id = id;
            }
        }
        if let Ok(name) = std::env::var("NOTAVENTA_COMPANY_NAME") {
            self.company_name = name;
        }
        if let Ok(conn) = std::env::var("NOTAVENTA_CONNECTION_ID") {
            self.connection_id = Some(conn);
        }
    }

    fn validate(&self) -> ClientResult<()> {
        if self.base_url.trim().is_empty() {
            return Err(ClientError::SessionInvalid("base_url vacío".into()));
        }
        if self.token.trim().is_empty() {
            return Err(ClientError::SessionInvalid("token vacío".into()));
        }
        if self.company_id <= 0 {
            return Err(ClientError::SessionInvalid("company_id inválido".into()));
        }
        Ok(())
    }
}

/// Platform-specific session file path.
fn session_file_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("cl", "notaventa", "notaventa")
        .map(|dirs| dirs.config_dir().join(SESSION_FILE))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_from_toml() {
        let toml_str = r#"
            base_url = "https://api.notaventa.cl"
            token = "abc123"
            company_id = 4
            company_name = "Comercial Andes SpA"
            connection_id = "ML-998877"
        "#;

        let session = Session::from_toml_str(toml_str).unwrap();
        assert_eq!(session.base_url, "https://api.notaventa.cl");
        assert_eq!(session.company_id, 4);
        assert_eq!(session.connection_id.as_deref(), Some("ML-998877"));
    }

    #[test]
    fn test_connection_id_is_optional() {
        let toml_str = r#"
            base_url = "https://api.notaventa.cl"
            token = "abc123"
            company_id = 4
            company_name = "Comercial Andes SpA"
        "#;

        let session = Session::from_toml_str(toml_str).unwrap();
        assert_eq!(session.connection_id, None);
    }

    #[test]
    fn test_toml_round_trip() {
        let session = Session {
            base_url: "https://api.notaventa.cl".to_string(),
            token: "tok".to_string(),
            company_id: 7,
            company_name: "Andes".to_string(),
            connection_id: None,
        };

        let rendered = session.to_toml_string().unwrap();
        let back = Session::from_toml_str(&rendered).unwrap();
        assert_eq!(back.base_url, session.base_url);
        assert_eq!(back.company_id, session.company_id);
    }

    #[test]
    fn test_malformed_toml_is_a_session_error() {
        let err = Session::from_toml_str("base_url = [").unwrap_err();
        assert!(matches!(err, ClientError::SessionInvalid(_)));
    }

    #[test]
    fn test_validate_rejects_blank_fields() {
        let session = Session {
            base_url: "  ".to_string(),
            token: "tok".to_string(),
            company_id: 7,
            company_name: String::new(),
            connection_id: None,
        };
        assert!(session.validate().is_err());
    }
}
