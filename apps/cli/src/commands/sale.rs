//! # Sale Commands
//!
//! The sale-note lifecycle from the terminal: create (draft or final),
//! inspect, list, finalize a draft, emit the legal document, retry a
//! pending document upload, cancel and delete.

use anyhow::{anyhow, bail, Context};
use chrono::NaiveDate;
use clap::{Subcommand, ValueEnum};
use tracing::warn;

use notaventa_client::{CatalogService, SaleFilters};
use notaventa_core::{CoreError, DocumentType, FacturaData, SaleNote, SaleNoteBuilder, SaleStatus};
use notaventa_flow::SaleWorkflow;

#[derive(Subcommand)]
pub enum VentaCommand {
    /// Crea una nota de venta nueva
    Nueva {
        /// Bodega que respalda el stock
        #[arg(long)]
        bodega: i64,

        /// Cliente comprador (requerido para finalizar)
        #[arg(long)]
        cliente: Option<i64>,

        /// Línea de producto, repetible
        #[arg(long = "item", value_name = "PRODUCTO:CANTIDAD")]
        items: Vec<String>,

        /// Observación de texto libre
        #[arg(long, default_value = "")]
        observacion: String,

        /// Guarda como borrador en lugar de finalizar
        #[arg(long)]
        borrador: bool,
    },

    /// Muestra una venta por folio
    Ver {
        #[arg(long)]
        folio: i64,
    },

    /// Lista ventas con filtros (se envían al backend sin modificar)
    Listar {
        #[arg(long, value_enum)]
        estado: Option<EstadoVenta>,

        /// Fecha inicial AAAA-MM-DD
        #[arg(long)]
        desde: Option<NaiveDate>,

        #[arg(long)]
        cliente: Option<i64>,

        /// Sin límite de filas
        #[arg(long)]
        todas: bool,
    },

    /// Carga un borrador y lo re-guarda como Finalizado
    Finalizar {
        #[arg(long)]
        folio: i64,
    },

    /// Emite el documento legal de una venta finalizada
    Emitir {
        #[arg(long)]
        folio: i64,

        #[arg(long, value_enum)]
        tipo: TipoDocumento,

        /// Razón social del comprador (factura)
        #[arg(long)]
        razon_social: Option<String>,

        /// RUT del comprador (factura)
        #[arg(long)]
        rut: Option<String>,
    },

    /// Vuelve a generar y subir el PDF de una venta ya emitida
    ReintentarDocumento {
        #[arg(long)]
        folio: i64,
    },

    /// Cancela una venta en Borrador o Finalizado
    Cancelar {
        #[arg(long)]
        folio: i64,
    },

    /// Elimina un borrador (irreversible)
    Eliminar {
        #[arg(long)]
        folio: i64,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TipoDocumento {
    Boleta,
    Factura,
}

impl From<TipoDocumento> for DocumentType {
    fn from(tipo: TipoDocumento) -> Self {
        match tipo {
            TipoDocumento::Boleta => DocumentType::Boleta,
            TipoDocumento::Factura => DocumentType::Factura,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum EstadoVenta {
    Borrador,
    Finalizado,
    Emitido,
    Cancelada,
}

impl From<EstadoVenta> for SaleStatus {
    fn from(estado: EstadoVenta) -> Self {
        match estado {
            EstadoVenta::Borrador => SaleStatus::Borrador,
            EstadoVenta::Finalizado => SaleStatus::Finalizado,
            EstadoVenta::Emitido => SaleStatus::Emitido,
            EstadoVenta::Cancelada => SaleStatus::Cancelada,
        }
    }
}

pub async fn run(
    action: VentaCommand,
    workflow: &SaleWorkflow,
    catalog: &CatalogService,
) -> anyhow::Result<()> {
    match action {
        VentaCommand::Nueva {
            bodega,
            cliente,
            items,
            observacion,
            borrador,
        } => nueva(workflow, catalog, bodega, cliente, &items, &observacion, borrador).await,

        VentaCommand::Ver { folio } => {
            let note = workflow.sales().get_by_folio(folio).await?;
            print_note(&note);
            Ok(())
        }

        VentaCommand::Listar {
            estado,
            desde,
            cliente,
            todas,
        } => {
            let filters = SaleFilters {
                client_id: cliente,
                date_start: desde,
                status: estado.map(SaleStatus::from),
                all_sales: todas,
            };
            let notes = workflow.sales().list(&filters).await?;

            if notes.is_empty() {
                println!("sin ventas para los filtros indicados");
                return Ok(());
            }
            for note in &notes {
                println!(
                    "{:>8}  {}  {:<10}  {:>12}  {}",
                    note.folio,
                    note.created_at.format("%d/%m/%Y"),
                    note.status,
                    note.total.to_string(),
                    note.emission.map(|e| e.as_str()).unwrap_or("-"),
                );
            }
            Ok(())
        }

        VentaCommand::Finalizar { folio } => {
            let mut builder = workflow.load_draft(folio).await?;
            let note = workflow.finalize(&mut builder).await?;
            println!("venta finalizada con folio {} (total {})", note.folio, note.total);
            Ok(())
        }

        VentaCommand::Emitir {
            folio,
            tipo,
            razon_social,
            rut,
        } => {
            let doc_type = DocumentType::from(tipo);
            let factura = match doc_type {
                DocumentType::Factura => Some(FacturaData {
                    razon_social: razon_social.unwrap_or_default(),
                    rut: rut.unwrap_or_default(),
                }),
                DocumentType::Boleta => None,
            };

            let outcome = workflow.emit(folio, doc_type, factura).await?;
            if outcome.is_complete() {
                println!("{outcome}");
                Ok(())
            } else {
                // The transition happened; the missing PDF still needs the
                // operator's attention.
                bail!("{outcome}")
            }
        }

        VentaCommand::ReintentarDocumento { folio } => {
            let receipt = workflow.retry_document_upload(folio).await?;
            println!(
                "documento de la venta {} almacenado (registro {})",
                folio, receipt.id
            );
            Ok(())
        }

        VentaCommand::Cancelar { folio } => {
            workflow.cancel(folio).await?;
            println!("venta {folio} cancelada");
            Ok(())
        }

        VentaCommand::Eliminar { folio } => {
            workflow.delete_draft(folio).await?;
            println!("borrador {folio} eliminado");
            Ok(())
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn nueva(
    workflow: &SaleWorkflow,
    catalog: &CatalogService,
    bodega: i64,
    cliente: Option<i64>,
    items: &[String],
    observacion: &str,
    borrador: bool,
) -> anyhow::Result<()> {
    let products = catalog.products_in_warehouse(bodega).await?;

    let mut builder = SaleNoteBuilder::new();
    builder.set_warehouse(Some(bodega));
    builder.set_client(cliente);
    builder.set_observations(observacion);

    for entry in items {
        let (product_id, quantity) = parse_item(entry)?;
        let product = products
            .iter()
            .find(|p| p.id == product_id)
            .ok_or_else(|| {
                anyhow!("el producto {product_id} no está disponible en la bodega {bodega}")
            })?;

        // Advisory only: the backend re-validates stock at save time.
        if !product.hint_covers(quantity) {
            warn!(
                product_id,
                disponible = product.available_quantity,
                solicitado = quantity,
                "la cantidad supera el stock informado"
            );
        }

        match builder.add_item(product) {
            Ok(()) => {
                let key = builder
                    .lines
                    .iter()
                    .find(|l| l.product_id == product_id)
                    .map(|l| l.key.clone())
                    .context("línea recién agregada no encontrada")?;
                builder.update_quantity(&key, quantity)?;
            }
            // Same surface behavior as the original flow: skipped, logged.
            Err(CoreError::PriceUnavailable(id)) => {
                warn!(product_id = id, "producto sin precio publicado, se omite");
            }
            Err(e) => return Err(e.into()),
        }
    }

    let note = if borrador {
        workflow.save_draft(&builder).await?
    } else {
        workflow.finalize(&mut builder).await?
    };

    println!(
        "nota de venta {} guardada como {} (total {})",
        note.folio, note.status, note.total
    );
    Ok(())
}

/// Parses a `producto:cantidad` argument.
fn parse_item(entry: &str) -> anyhow::Result<(i64, i64)> {
    let (product, quantity) = entry
        .split_once(':')
        .ok_or_else(|| anyhow!("formato de item inválido: '{entry}' (use PRODUCTO:CANTIDAD)"))?;

    let product: i64 = product
        .trim()
        .parse()
        .map_err(|_| anyhow!("identificador de producto inválido en '{entry}'"))?;
    let quantity: i64 = quantity
        .trim()
        .parse()
        .map_err(|_| anyhow!("cantidad inválida en '{entry}'"))?;

    if quantity <= 0 {
        bail!("la cantidad debe ser mayor que cero en '{entry}'");
    }

    Ok((product, quantity))
}

fn print_note(note: &SaleNote) {
    println!("folio:       {}", note.folio);
    println!("estado:      {}", note.status);
    println!(
        "emisión:     {}",
        note.emission.map(|e| e.as_str()).unwrap_or("-")
    );
    println!("fecha:       {}", note.created_at.format("%d/%m/%Y %H:%M"));
    println!(
        "cliente:     {}",
        note.client_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string())
    );
    if let Some(observation) = note.observation.as_deref().filter(|o| !o.is_empty()) {
        println!("observación: {observation}");
    }
    println!();
    for line in &note.lines {
        println!(
            "  {:<40} x{:<4} {:>12} {:>12}",
            line.name,
            line.quantity,
            line.unit_price.to_string(),
            line.total.to_string()
        );
    }
    println!();
    println!("subtotal: {}", note.subtotal);
    println!("total:    {}", note.total);
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_item() {
        assert_eq!(parse_item("12:3").unwrap(), (12, 3));
        assert_eq!(parse_item(" 7 : 1 ").unwrap(), (7, 1));

        assert!(parse_item("12").is_err());
        assert!(parse_item("a:3").is_err());
        assert!(parse_item("12:x").is_err());
        assert!(parse_item("12:0").is_err());
        assert!(parse_item("12:-2").is_err());
    }

    #[test]
    fn test_estado_maps_to_canonical_status() {
        assert_eq!(SaleStatus::from(EstadoVenta::Borrador), SaleStatus::Borrador);
        assert_eq!(
            SaleStatus::from(EstadoVenta::Finalizado),
            SaleStatus::Finalizado
        );
        assert_eq!(SaleStatus::from(EstadoVenta::Emitido), SaleStatus::Emitido);
        assert_eq!(
            SaleStatus::from(EstadoVenta::Cancelada),
            SaleStatus::Cancelada
        );
    }
}
