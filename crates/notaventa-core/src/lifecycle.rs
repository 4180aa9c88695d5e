//! # Lifecycle Guards
//!
//! Pure status-transition guards for the sale note lifecycle.
//!
//! ```text
//! Borrador ──finalizar──► Finalizado ──emitir──► Emitido (terminal)
//!     │                        │
//!     └────────cancelar────────┘          Cancelada (terminal)
//! ```
//!
//! Every transition is user-triggered; these guards decide whether it is
//! admissible *before* any network call. The backend re-validates on its
//! side and its verdict wins.

use crate::builder::SaleNoteBuilder;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{DocumentType, FacturaData, SaleNote, SaleStatus};
use crate::validation::{validate_razon_social, validate_rut};

/// A draft can be persisted at any point; finalization is stricter:
/// at least one line, a buyer and a warehouse.
pub fn can_finalize(builder: &SaleNoteBuilder) -> CoreResult<()> {
    if builder.is_empty() {
        return Err(CoreError::EmptySale);
    }
    if builder.client_id.is_none() {
        return Err(CoreError::MissingClient);
    }
    if builder.warehouse_id.is_none() {
        return Err(CoreError::MissingWarehouse);
    }
    Ok(())
}

/// Emission is only permitted from `Finalizado` with no document yet.
/// Anything else leaves state unchanged and reports why.
pub fn can_emit(note: &SaleNote) -> CoreResult<()> {
    if note.status != SaleStatus::Finalizado {
        return Err(CoreError::InvalidStatus {
            folio: note.folio,
            current: note.status,
            operation: "emitir",
        });
    }
    if note.emission.is_some() {
        return Err(CoreError::AlreadyEmitted(note.folio));
    }
    Ok(())
}

/// A factura needs the buyer's razon social and a well-formed RUT; a boleta
/// needs nothing extra. Runs before any network I/O.
pub fn validate_emission_request(
    doc_type: DocumentType,
    factura: Option<&FacturaData>,
) -> Result<(), ValidationError> {
    match doc_type {
        DocumentType::Boleta => Ok(()),
        DocumentType::Factura => {
            let data = factura.ok_or(ValidationError::Required {
                field: "datos de factura",
            })?;
            validate_razon_social(&data.razon_social)?;
            validate_rut(&data.rut)?;
            Ok(())
        }
    }
}

/// Deletion is only permitted on drafts, and is irreversible.
pub fn can_delete(note: &SaleNote) -> CoreResult<()> {
    if !note.status.is_draft() {
        return Err(CoreError::InvalidStatus {
            folio: note.folio,
            current: note.status,
            operation: "eliminar",
        });
    }
    Ok(())
}

/// Cancellation is reachable from Borrador and Finalizado only.
pub fn can_cancel(note: &SaleNote) -> CoreResult<()> {
    if !note.status.can_cancel() {
        return Err(CoreError::InvalidStatus {
            folio: note.folio,
            current: note.status,
            operation: "cancelar",
        });
    }
    Ok(())
}

/// Re-uploading the document is a recovery path for notes the backend
/// already marks `Emitido` but whose PDF never landed.
pub fn can_retry_upload(note: &SaleNote) -> CoreResult<()> {
    if note.status != SaleStatus::Emitido {
        return Err(CoreError::InvalidStatus {
            folio: note.folio,
            current: note.status,
            operation: "reintentar el documento",
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::ProductAvailability;
    use chrono::Utc;

    fn note(status: SaleStatus, emission: Option<DocumentType>) -> SaleNote {
        SaleNote {
            folio: 17,
            warehouse_id: 3,
            client_id: Some(9),
            lines: vec![],
            amount_total_products: 2,
            subtotal: Money::from_pesos(2000),
            total: Money::from_pesos(2000),
            emission,
            observation: None,
            status,
            created_at: Utc::now(),
        }
    }

    fn full_builder() -> SaleNoteBuilder {
        let mut builder = SaleNoteBuilder::new();
        builder
            .add_item(&ProductAvailability {
                id: 1,
                title: "A".to_string(),
                available_quantity: 5,
                price: Some(Money::from_pesos(1000)),
                warehouse_name: None,
                company_name: None,
            })
            .unwrap();
        builder.set_client(Some(9));
        builder.set_warehouse(Some(3));
        builder
    }

    #[test]
    fn test_can_finalize_requires_items_client_and_warehouse() {
        assert!(can_finalize(&full_builder()).is_ok());

        let empty = SaleNoteBuilder::new();
        assert!(matches!(can_finalize(&empty), Err(CoreError::EmptySale)));

        let mut no_client = full_builder();
        no_client.set_client(None);
        assert!(matches!(can_finalize(&no_client), Err(CoreError::MissingClient)));

        let mut no_warehouse = full_builder();
        no_warehouse.set_warehouse(None);
        assert!(matches!(
            can_finalize(&no_warehouse),
            Err(CoreError::MissingWarehouse)
        ));
    }

    #[test]
    fn test_emit_only_from_finalizado_without_document() {
        assert!(can_emit(&note(SaleStatus::Finalizado, None)).is_ok());

        assert!(matches!(
            can_emit(&note(SaleStatus::Borrador, None)),
            Err(CoreError::InvalidStatus { .. })
        ));
        assert!(matches!(
            can_emit(&note(SaleStatus::Emitido, Some(DocumentType::Boleta))),
            Err(CoreError::InvalidStatus { .. })
        ));
        assert!(matches!(
            can_emit(&note(SaleStatus::Finalizado, Some(DocumentType::Boleta))),
            Err(CoreError::AlreadyEmitted(17))
        ));
    }

    #[test]
    fn test_factura_requires_razon_social_and_valid_rut() {
        assert!(validate_emission_request(DocumentType::Boleta, None).is_ok());

        assert!(validate_emission_request(DocumentType::Factura, None).is_err());

        let empty_rut = FacturaData {
            razon_social: "Comercial Andes SpA".to_string(),
            rut: "".to_string(),
        };
        assert!(validate_emission_request(DocumentType::Factura, Some(&empty_rut)).is_err());

        let ok = FacturaData {
            razon_social: "Comercial Andes SpA".to_string(),
            rut: "76123456-0".to_string(),
        };
        assert!(validate_emission_request(DocumentType::Factura, Some(&ok)).is_ok());
    }

    #[test]
    fn test_delete_only_on_drafts() {
        assert!(can_delete(&note(SaleStatus::Borrador, None)).is_ok());
        assert!(can_delete(&note(SaleStatus::Finalizado, None)).is_err());
        assert!(can_delete(&note(SaleStatus::Emitido, Some(DocumentType::Boleta))).is_err());
    }

    #[test]
    fn test_cancel_from_borrador_or_finalizado() {
        assert!(can_cancel(&note(SaleStatus::Borrador, None)).is_ok());
        assert!(can_cancel(&note(SaleStatus::Finalizado, None)).is_ok());
        assert!(can_cancel(&note(SaleStatus::Cancelada, None)).is_err());
    }

    #[test]
    fn test_retry_upload_only_for_emitted_notes() {
        assert!(can_retry_upload(&note(SaleStatus::Emitido, Some(DocumentType::Boleta))).is_ok());
        assert!(can_retry_upload(&note(SaleStatus::Finalizado, None)).is_err());
    }
}
