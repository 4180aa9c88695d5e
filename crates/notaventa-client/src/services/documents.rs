//! # Document Storage Service
//!
//! Upload, download and listing of emitted sale documents (PDF), keyed 1:1
//! by folio. PDF *generation* lives in notaventa-flow; this service only
//! moves bytes.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, info};

use notaventa_core::IssuedDocument;

use crate::error::{ClientError, ClientResult};
use crate::http::{data_as, Api};

// =============================================================================
// Wire Types
// =============================================================================

/// Backend acknowledgment for a stored document.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadReceipt {
    /// Server-assigned record id.
    pub id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct IssuedDocumentWire {
    id: i64,
    id_folio: i64,
    #[serde(default)]
    name_document: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<IssuedDocumentWire> for IssuedDocument {
    fn from(wire: IssuedDocumentWire) -> Self {
        IssuedDocument {
            id: wire.id,
            folio: wire.id_folio,
            file_name: wire.name_document,
            created_at: wire.created_at,
        }
    }
}

// =============================================================================
// Service
// =============================================================================

/// Emitted-document storage operations.
#[derive(Debug, Clone)]
pub struct DocumentService {
    api: Api,
}

impl DocumentService {
    pub fn new(api: Api) -> Self {
        DocumentService { api }
    }

    /// Uploads a generated PDF as multipart form data keyed by folio.
    ///
    /// A 422 here is a validation failure (bad folio, empty file) and is
    /// surfaced distinctly from other failures by the classifier.
    pub async fn upload(&self, folio: i64, pdf: Vec<u8>) -> ClientResult<UploadReceipt> {
        debug!(folio, bytes = pdf.len(), "subiendo documento");

        let part = reqwest::multipart::Part::bytes(pdf)
            .file_name(format!("venta-{folio}.pdf"))
            .mime_str("application/pdf")
            .map_err(ClientError::Transport)?;
        let form = reqwest::multipart::Form::new()
            .text("id_folio", folio.to_string())
            .part("documento", part);

        let not_found = format!("la venta con folio {folio} no fue encontrada");
        let body = self.api.post_multipart("document-sale", form, &not_found).await?;

        let receipt: UploadReceipt = data_as(body)?;
        info!(folio, record = receipt.id, "documento almacenado");
        Ok(receipt)
    }

    /// Pure URL constructor for the document download; no request is made.
    pub fn download_url(&self, folio: i64) -> String {
        self.api.url(&format!(
            "document-sale/{}/{}",
            self.api.session().company_id,
            folio
        ))
    }

    /// Downloads the stored PDF for a folio.
    ///
    /// The body is only treated as a file when the response content type is
    /// `application/pdf`; otherwise it is read as a JSON error.
    pub async fn download(&self, folio: i64) -> ClientResult<Vec<u8>> {
        let path = format!("document-sale/{}/{}", self.api.session().company_id, folio);
        let not_found = format!("el documento de la venta {folio} no fue encontrado");

        let (content_type, bytes) = self.api.get_bytes(&path, &not_found).await?;

        match content_type.as_deref() {
            Some(ct) if ct.starts_with("application/pdf") => Ok(bytes),
            other => {
                let body = String::from_utf8_lossy(&bytes);
                let detail = serde_json::from_str::<serde_json::Value>(&body)
                    .ok()
                    .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
                    .unwrap_or_else(|| other.unwrap_or("sin content-type").to_string());
                Err(ClientError::NotAPdf(detail))
            }
        }
    }

    /// Lists every emitted document for the session's company.
    pub async fn list_issued(&self) -> ClientResult<Vec<IssuedDocument>> {
        let path = format!("history-sale-issue/{}", self.api.session().company_id);
        let body = self
            .api
            .get(&path, &[], "el historial de documentos no fue encontrado")
            .await?;

        let wires: Vec<IssuedDocumentWire> = data_as(body)?;
        Ok(wires.into_iter().map(IssuedDocument::from).collect())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
