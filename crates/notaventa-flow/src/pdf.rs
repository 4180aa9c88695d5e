//! # Document Rendering
//!
//! Builds the boleta/factura PDF for an emitted sale: header with the
//! issuing company, document title with the folio, buyer block, line-item
//! table and totals footer. Pure function of its inputs apart from loading
//! the font files; no network.

use std::path::PathBuf;

use genpdf::{elements, style, Alignment, Element};
use tracing::debug;

use notaventa_core::{Client, DocumentType, FacturaData, SaleNote};

use crate::error::{FlowError, FlowResult};

/// Font family name expected inside the fonts directory
/// (`Roboto-Regular.ttf`, `Roboto-Bold.ttf`, ...).
const FONT_NAME: &str = "Roboto";

/// Renders sale documents from a configured font directory.
#[derive(Debug, Clone)]
pub struct DocumentRenderer {
    fonts_dir: PathBuf,
}

impl DocumentRenderer {
    pub fn new(fonts_dir: impl Into<PathBuf>) -> Self {
        DocumentRenderer {
            fonts_dir: fonts_dir.into(),
        }
    }

    /// Builds the PDF and returns its bytes.
    ///
    /// The buyer block prefers explicit factura data over the registry
    /// client; with neither, the document goes out to "Consumidor Final".
    pub fn render(
        &self,
        note: &SaleNote,
        doc_type: DocumentType,
        company_name: &str,
        client: Option<&Client>,
        factura: Option<&FacturaData>,
    ) -> FlowResult<Vec<u8>> {
        debug!(folio = note.folio, tipo = %doc_type, "generando documento");

        let font_family = genpdf::fonts::from_files(&self.fonts_dir, FONT_NAME, None)
            .map_err(|_| FlowError::FontNotFound(self.fonts_dir.display().to_string()))?;

        let mut doc = genpdf::Document::new(font_family);
        doc.set_title(document_title(doc_type, note.folio));
        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(10);
        doc.set_page_decorator(decorator);

        // Header: issuing company.
        doc.push(
            elements::Paragraph::new(company_name)
                .styled(style::Style::new().bold().with_font_size(18)),
        );
        doc.push(elements::Break::new(1.5));

        doc.push(
            elements::Paragraph::new(document_title(doc_type, note.folio))
                .styled(style::Style::new().bold().with_font_size(14)),
        );
        doc.push(elements::Paragraph::new(format!(
            "Fecha: {}",
            note.created_at.format("%d/%m/%Y")
        )));

        // Buyer block.
        for line in buyer_block(client, factura) {
            doc.push(elements::Paragraph::new(line));
        }

        if let Some(observation) = note.observation.as_deref().filter(|o| !o.is_empty()) {
            doc.push(elements::Paragraph::new(format!("Observación: {observation}")));
        }

        doc.push(elements::Break::new(2));

        // Line-item table. Column weights: name (4), qty (1), unit (2), total (2).
        let mut table = elements::TableLayout::new(vec![4, 1, 2, 2]);
        table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

        let header_style = style::Style::new().bold();
        table
            .row()
            .element(elements::Paragraph::new("Producto").styled(header_style))
            .element(elements::Paragraph::new("Cant.").styled(header_style))
            .element(elements::Paragraph::new("Unitario").styled(header_style))
            .element(elements::Paragraph::new("Total").styled(header_style))
            .push()
            .map_err(|e| FlowError::Render(e.to_string()))?;

        for line in &note.lines {
            table
                .row()
                .element(elements::Paragraph::new(line.name.clone()))
                .element(elements::Paragraph::new(line.quantity.to_string()))
                .element(elements::Paragraph::new(line.unit_price.to_string()))
                .element(elements::Paragraph::new(line.total.to_string()))
                .push()
                .map_err(|e| FlowError::Render(e.to_string()))?;
        }

        doc.push(table);
        doc.push(elements::Break::new(2));

        // Totals footer. Subtotal and total coincide: no tax model.
        let mut subtotal = elements::Paragraph::new(format!("Subtotal: {}", note.subtotal));
        subtotal.set_alignment(Alignment::Right);
        doc.push(subtotal);

        let mut total = elements::Paragraph::new(format!("TOTAL: {}", note.total));
        total.set_alignment(Alignment::Right);
        doc.push(total.styled(style::Style::new().bold().with_font_size(12)));

        let mut buffer = Vec::new();
        doc.render(&mut buffer)
            .map_err(|e| FlowError::Render(e.to_string()))?;

        Ok(buffer)
    }
}

/// "BOLETA ELECTRÓNICA N° 17" / "FACTURA ELECTRÓNICA N° 17".
fn document_title(doc_type: DocumentType, folio: i64) -> String {
    let kind = match doc_type {
        DocumentType::Boleta => "BOLETA ELECTRÓNICA",
        DocumentType::Factura => "FACTURA ELECTRÓNICA",
    };
    format!("{kind} N° {folio}")
}

/// Buyer identification lines: explicit factura data wins, then the
/// registry client, then the retail fallback.
fn buyer_block(client: Option<&Client>, factura: Option<&FacturaData>) -> Vec<String> {
    if let Some(data) = factura {
        return vec![
            format!("Señor(es): {}", data.razon_social),
            format!("RUT: {}", data.rut),
        ];
    }

    if let Some(client) = client {
        let mut lines = vec![
            format!("Cliente: {}", client.name),
            format!("RUT: {}", client.rut),
        ];
        if let Some(address) = client.address.as_deref() {
            lines.push(format!("Dirección: {address}"));
        }
        return lines;
    }

    vec!["Cliente: Consumidor Final".to_string()]
}

// =============================================================================
// Unit Tests
// =============================================================================
