//! # Sale Lifecycle Controller
//!
//! Drives every user-triggered transition over the persistence layer:
//!
//! ```text
//! Borrador ──finalize──► Finalizado ──emit──► Emitido
//!     │                       │                  │
//!     │                       │                  ├── documento almacenado
//!     └───────cancel──────────┘                  └── PendingDocument
//!                                                    (retry_document_upload)
//! ```
//!
//! Each operation is a single await chain: no automatic retry, no
//! timeout-driven transitions. The guards in `notaventa_core::lifecycle`
//! run before any network call; the backend still re-validates and wins.

use std::fmt;

use tracing::{info, warn};

use notaventa_client::{
    Api, ClientService, DocumentService, SaleService, UploadReceipt,
};
use notaventa_core::{
    lifecycle, Client, DocumentType, FacturaData, SaleNote, SaleNoteBuilder, SaleStatus,
};

use crate::error::{FlowError, FlowResult};
use crate::pdf::DocumentRenderer;

// =============================================================================
// Emission Outcome
// =============================================================================

/// Result of the emission workflow.
///
/// Emission is two-phase on purpose: once the backend accepts the
/// mark-emitted call, a later PDF failure cannot be rolled back. That state
/// is explicit here rather than an undocumented inconsistency.
#[derive(Debug)]
pub enum EmissionOutcome {
    /// Mark-emitted, generation and upload all succeeded.
    Complete {
        folio: i64,
        receipt: UploadReceipt,
    },
    /// The backend records the sale as Emitido but no PDF was stored;
    /// recover with [`SaleWorkflow::retry_document_upload`].
    PendingDocument { folio: i64, cause: String },
}

impl EmissionOutcome {
    pub fn is_complete(&self) -> bool {
        matches!(self, EmissionOutcome::Complete { .. })
    }
}

impl fmt::Display for EmissionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmissionOutcome::Complete { folio, .. } => {
                write!(f, "venta {folio} emitida y documento almacenado")
            }
            EmissionOutcome::PendingDocument { folio, cause } => write!(
                f,
                "venta {folio} quedó emitida SIN documento almacenado ({cause}); \
                 reintente la subida del documento"
            ),
        }
    }
}

// =============================================================================
// Workflow
// =============================================================================

/// Orchestrates lifecycle transitions and document emission.
#[derive(Debug, Clone)]
pub struct SaleWorkflow {
    sales: SaleService,
    documents: DocumentService,
    clients: ClientService,
    renderer: DocumentRenderer,
    company_name: String,
}

impl SaleWorkflow {
    /// Wires the workflow from a shared [`Api`] and a font directory for
    /// document rendering.
    pub fn new(api: Api, fonts_dir: impl Into<std::path::PathBuf>) -> Self {
        let company_name = api.session().company_name.clone();
        SaleWorkflow {
            sales: SaleService::new(api.clone()),
            documents: DocumentService::new(api.clone()),
            clients: ClientService::new(api),
            renderer: DocumentRenderer::new(fonts_dir),
            company_name,
        }
    }

    pub fn sales(&self) -> &SaleService {
        &self.sales
    }

    pub fn documents(&self) -> &DocumentService {
        &self.documents
    }

    /// Persists the builder as a draft. The builder stays as-is: a draft
    /// remains editable.
    pub async fn save_draft(&self, builder: &SaleNoteBuilder) -> FlowResult<SaleNote> {
        let note = self.sales.create(builder, SaleStatus::Borrador).await?;
        info!(folio = note.folio, "borrador guardado");
        Ok(note)
    }

    /// Finalizes the builder: guards, persists as Finalizado, and resets
    /// the builder only after the backend accepted the sale.
    pub async fn finalize(&self, builder: &mut SaleNoteBuilder) -> FlowResult<SaleNote> {
        lifecycle::can_finalize(builder)?;

        let note = self.sales.create(builder, SaleStatus::Finalizado).await?;
        builder.reset();

        info!(folio = note.folio, total = %note.total, "venta finalizada");
        Ok(note)
    }

    /// Loads a persisted draft back into a builder for editing.
    ///
    /// A referenced client that no longer exists is warned about but does
    /// not block the edit.
    pub async fn load_draft(&self, folio: i64) -> FlowResult<SaleNoteBuilder> {
        let note = self.sales.get_by_folio(folio).await?;

        if !note.status.is_draft() {
            return Err(notaventa_core::CoreError::InvalidStatus {
                folio: note.folio,
                current: note.status,
                operation: "editar",
            }
            .into());
        }

        if let Some(client_id) = note.client_id {
            if self.clients.get(client_id).await.is_err() {
                warn!(
                    folio,
                    client_id, "el cliente referenciado ya no existe, la edición continúa"
                );
            }
        }

        Ok(SaleNoteBuilder::from_note(&note))
    }

    /// Cancels a note from Borrador or Finalizado.
    pub async fn cancel(&self, folio: i64) -> FlowResult<()> {
        let note = self.sales.get_by_folio(folio).await?;
        lifecycle::can_cancel(&note)?;

        self.sales.update_status(folio, SaleStatus::Cancelada).await?;
        Ok(())
    }

    /// Deletes a draft. Irreversible.
    pub async fn delete_draft(&self, folio: i64) -> FlowResult<()> {
        let note = self.sales.get_by_folio(folio).await?;
        lifecycle::can_delete(&note)?;

        self.sales.delete_draft(folio).await?;
        Ok(())
    }

    /// Emits the legal document for a finalized sale.
    ///
    /// ## Order of operations
    /// 1. validate the request (factura data) — before any network call
    /// 2. fetch the note and check `can_emit`
    /// 3. PUT mark-emitted
    /// 4. re-fetch the now-authoritative detail and render the PDF
    /// 5. upload the PDF keyed by folio
    ///
    /// Failures in 4-5 cannot undo 3; they yield
    /// [`EmissionOutcome::PendingDocument`] instead of an `Err`, because the
    /// transition itself did happen.
    pub async fn emit(
        &self,
        folio: i64,
        doc_type: DocumentType,
        factura: Option<FacturaData>,
    ) -> FlowResult<EmissionOutcome> {
        lifecycle::validate_emission_request(doc_type, factura.as_ref())?;

        let note = self.sales.get_by_folio(folio).await?;
        lifecycle::can_emit(&note)?;

        let client = self.fetch_buyer(&note).await;

        self.sales
            .mark_emitted(folio, doc_type, note.observation.as_deref())
            .await?;

        // Point of no return: the backend now says Emitido.
        let detail = match self.sales.get_by_folio(folio).await {
            Ok(detail) => detail,
            Err(e) => return Ok(self.pending(folio, e.to_string())),
        };

        let pdf = match self.renderer.render(
            &detail,
            doc_type,
            &self.company_name,
            client.as_ref(),
            factura.as_ref(),
        ) {
            Ok(pdf) => pdf,
            Err(e) => return Ok(self.pending(folio, e.to_string())),
        };

        match self.documents.upload(folio, pdf).await {
            Ok(receipt) => {
                info!(folio, "emisión completa");
                Ok(EmissionOutcome::Complete { folio, receipt })
            }
            Err(e) => Ok(self.pending(folio, e.to_string())),
        }
    }

    /// Regenerates and re-uploads the document for a sale the backend
    /// already marks Emitido. Idempotent: safe to run until it succeeds.
    pub async fn retry_document_upload(&self, folio: i64) -> FlowResult<UploadReceipt> {
        let note = self.sales.get_by_folio(folio).await?;
        lifecycle::can_retry_upload(&note)?;

        let doc_type = note
            .emission
            .ok_or(notaventa_core::CoreError::InvalidStatus {
                folio: note.folio,
                current: note.status,
                operation: "reintentar el documento",
            })?;

        let client = self.fetch_buyer(&note).await;

        // The factura block is rebuilt from the registry: the original
        // request's razon social/RUT are not persisted by the backend.
        let factura = match (doc_type, client.as_ref()) {
            (DocumentType::Factura, Some(client)) => Some(FacturaData {
                razon_social: client.name.clone(),
                rut: client.rut.clone(),
            }),
            _ => None,
        };

        let pdf = self.renderer.render(
            &note,
            doc_type,
            &self.company_name,
            client.as_ref(),
            factura.as_ref(),
        )?;

        let receipt = self.documents.upload(folio, pdf).await?;
        info!(folio, record = receipt.id, "documento re-subido");
        Ok(receipt)
    }

    /// The buyer is optional on the printed document; a lookup failure is
    /// logged, not fatal.
    async fn fetch_buyer(&self, note: &SaleNote) -> Option<Client> {
        let client_id = note.client_id?;
        match self.clients.get(client_id).await {
            Ok(client) => Some(client),
            Err(e) => {
                warn!(folio = note.folio, client_id, error = %e, "cliente no disponible para el documento");
                None
            }
        }
    }

    fn pending(&self, folio: i64, cause: String) -> EmissionOutcome {
        warn!(folio, %cause, "emisión incompleta: documento pendiente");
        EmissionOutcome::PendingDocument { folio, cause }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_display() {
        let pending = EmissionOutcome::PendingDocument {
            folio: 17,
            cause: "error de conexión con el servidor".to_string(),
        };
        assert!(!pending.is_complete());
        let message = pending.to_string();
        assert!(message.contains("17"));
        assert!(message.contains("SIN documento"));
    }
}
