//! # Sale Note Persistence Service
//!
//! Translates the in-memory builder into backend requests and backend rows
//! into domain `SaleNote` values. One HTTP call per operation, no retries;
//! every failure is classified in `crate::error`.
//!
//! ## Endpoints
//! ```text
//! POST   /generated-sale-note/{status}          create with initial status
//! GET    /search-sale-by-folio/{company}?folio= fetch one sale
//! GET    /history-sale/{connection}?...         filtered listing
//! PATCH  /sale-note-patch/{folio}/{status}      status-only update
//! PUT    /sale-note/{company}/{folio}           mark emitted
//! DELETE /delete-history-sale/{company}/{folio} delete a draft
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use notaventa_core::{
    DocumentType, Money, SaleLine, SaleNote, SaleNoteBuilder, SaleStatus,
};

use crate::error::{ClientError, ClientResult};
use crate::http::{data_as, Api};

// =============================================================================
// Filters
// =============================================================================

/// Listing filters, passed through to the backend unmodified. The client
/// never re-filters a listing silently.
#[derive(Debug, Clone, Default)]
pub struct SaleFilters {
    /// Restrict to one buyer.
    pub client_id: Option<i64>,
    /// Only sales created on or after this date.
    pub date_start: Option<NaiveDate>,
    /// Exact status match, canonical spelling.
    pub status: Option<SaleStatus>,
    /// Lift the backend's default row limit.
    pub all_sales: bool,
}

impl SaleFilters {
    /// Renders the query string pairs exactly as the backend expects them.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(client_id) = self.client_id {
            query.push(("client_id", client_id.to_string()));
        }
        if let Some(date_start) = self.date_start {
            query.push(("date_start", date_start.format("%Y-%m-%d").to_string()));
        }
        if let Some(status) = self.status {
            query.push(("status_sale", status.as_str().to_string()));
        }
        if self.all_sales {
            query.push(("all_sale", "true".to_string()));
        }
        query
    }
}

// =============================================================================
// Wire Types
// =============================================================================

/// Outbound line item, backend field names.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct LineWire {
    id_producto: i64,
    nombre: String,
    cantidad: i64,
    precio_unitario: i64,
    total: i64,
}

/// Outbound sale-note payload.
#[derive(Debug, Serialize)]
struct SaleNotePayload {
    id_client: Option<i64>,
    id_warehouse: Option<i64>,
    products: Vec<LineWire>,
    amount_total_products: i64,
    price_subtotal: i64,
    price_final: i64,
    observation: String,
}

impl SaleNotePayload {
    fn from_builder(builder: &SaleNoteBuilder) -> Self {
        SaleNotePayload {
            id_client: builder.client_id,
            id_warehouse: builder.warehouse_id,
            products: builder
                .lines
                .iter()
                .map(|l| LineWire {
                    id_producto: l.product_id,
                    nombre: l.name.clone(),
                    cantidad: l.quantity,
                    precio_unitario: l.unit_price.pesos(),
                    total: l.total.pesos(),
                })
                .collect(),
            amount_total_products: builder.total_units(),
            price_subtotal: builder.subtotal().pesos(),
            price_final: builder.total().pesos(),
            observation: builder.observations.clone(),
        }
    }
}

/// A persisted sale note as the backend returns it.
///
/// `products` arrives either as a JSON array or as a JSON-encoded string
/// (older rows were stored serialized); both are accepted here so the rest
/// of the workspace never sees the difference.
#[derive(Debug, Deserialize)]
struct SaleNoteWire {
    id: i64,
    warehouse_id: i64,
    client_id: Option<i64>,
    #[serde(deserialize_with = "lines_from_wire", default)]
    products: Vec<LineWire>,
    #[serde(default)]
    amount_total_products: i64,
    price_subtotal: i64,
    price_final: i64,
    type_emission: Option<String>,
    observation: Option<String>,
    status_sale: String,
    created_at: DateTime<Utc>,
}

fn lines_from_wire<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<LineWire>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Array(_) => serde_json::from_value(value).map_err(serde::de::Error::custom),
        Value::String(s) => serde_json::from_str(&s).map_err(serde::de::Error::custom),
        Value::Null => Ok(Vec::new()),
        other => Err(serde::de::Error::custom(format!(
            "formato de productos no reconocido: {other}"
        ))),
    }
}

impl TryFrom<SaleNoteWire> for SaleNote {
    type Error = ClientError;

    fn try_from(wire: SaleNoteWire) -> ClientResult<SaleNote> {
        let status = SaleStatus::from_backend_str(&wire.status_sale)
            .ok_or(ClientError::UnexpectedEnvelope)?;

        let emission = match wire.type_emission.as_deref() {
            None | Some("") => None,
            Some(raw) => Some(
                DocumentType::from_backend_str(raw).ok_or(ClientError::UnexpectedEnvelope)?,
            ),
        };

        Ok(SaleNote {
            folio: wire.id,
            warehouse_id: wire.warehouse_id,
            client_id: wire.client_id,
            lines: wire
                .products
                .into_iter()
                .map(|l| SaleLine {
                    product_id: l.id_producto,
                    name: l.nombre,
                    quantity: l.cantidad,
                    unit_price: Money::from_pesos(l.precio_unitario),
                    total: Money::from_pesos(l.total),
                })
                .collect(),
            amount_total_products: wire.amount_total_products,
            subtotal: Money::from_pesos(wire.price_subtotal),
            total: Money::from_pesos(wire.price_final),
            emission,
            observation: wire.observation,
            status,
            created_at: wire.created_at,
        })
    }
}

// =============================================================================
// Service
// =============================================================================

/// Sale note persistence operations.
#[derive(Debug, Clone)]
pub struct SaleService {
    api: Api,
}

impl SaleService {
    pub fn new(api: Api) -> Self {
        SaleService { api }
    }

    /// Persists the builder with the requested initial status.
    ///
    /// The backend re-validates stock at save time; its refusal arrives as
    /// `ClientError::InsufficientStock` regardless of what the local
    /// availability hints said.
    pub async fn create(
        &self,
        builder: &SaleNoteBuilder,
        status: SaleStatus,
    ) -> ClientResult<SaleNote> {
        let payload = serde_json::to_value(SaleNotePayload::from_builder(builder))
            .map_err(|_| ClientError::UnexpectedEnvelope)?;
        let path = format!("generated-sale-note/{}", status.as_str());

        debug!(%status, lines = builder.item_count(), "creando nota de venta");
        let body = self
            .api
            .post(&path, &payload, "la nota de venta no fue encontrada")
            .await?;

        let note: SaleNote = SaleNote::try_from(data_as::<SaleNoteWire>(body)?)?;
        info!(folio = note.folio, %status, "nota de venta guardada");
        Ok(note)
    }

    /// Fetches one sale by folio, scoped to the session's company.
    ///
    /// A 404 here means "no existe una venta con ese folio", surfaced as
    /// such — never as an empty result.
    pub async fn get_by_folio(&self, folio: i64) -> ClientResult<SaleNote> {
        let path = format!("search-sale-by-folio/{}", self.api.session().company_id);
        let not_found = format!("la nota de venta con folio {folio} no fue encontrada");

        let body = self
            .api
            .get(&path, &[("folio", folio.to_string())], &not_found)
            .await?;

        SaleNote::try_from(data_as::<SaleNoteWire>(body)?)
    }

    /// Filtered listing. An empty `data` array is a legitimate "no rows",
    /// distinct from a 404.
    pub async fn list(&self, filters: &SaleFilters) -> ClientResult<Vec<SaleNote>> {
        // The path segment is the marketplace connection the session has
        // selected; the company id stands in when none is active.
        let session = self.api.session();
        let scope = session
            .connection_id
            .clone()
            .unwrap_or_else(|| session.company_id.to_string());
        let path = format!("history-sale/{scope}");

        let body = self
            .api
            .get(&path, &filters.to_query(), "el historial de ventas no fue encontrado")
            .await?;

        let wires: Vec<SaleNoteWire> = data_as(body)?;
        wires.into_iter().map(SaleNote::try_from).collect()
    }

    /// Status-only update (cancel, re-open, ...).
    pub async fn update_status(&self, folio: i64, status: SaleStatus) -> ClientResult<()> {
        let path = format!("sale-note-patch/{}/{}", folio, status.as_str());
        let not_found = format!("la nota de venta con folio {folio} no fue encontrada");

        self.api.patch(&path, &not_found).await?;
        info!(folio, %status, "estado de venta actualizado");
        Ok(())
    }

    /// Marks the sale emitted with the chosen document type. Step one of
    /// the emission workflow; the PDF is generated and uploaded afterwards.
    pub async fn mark_emitted(
        &self,
        folio: i64,
        doc_type: DocumentType,
        observation: Option<&str>,
    ) -> ClientResult<()> {
        let session = self.api.session();
        let path = format!("sale-note/{}/{}", session.company_id, folio);
        let not_found = format!("la nota de venta con folio {folio} no fue encontrada");
        let body = serde_json::json!({
            "type_emission": doc_type.as_str(),
            "observation": observation,
            "name_companies": session.company_name,
        });

        self.api.put(&path, &body, &not_found).await?;
        info!(folio, tipo = %doc_type, "venta marcada como emitida");
        Ok(())
    }

    /// Deletes a draft. Irreversible; the lifecycle layer guards that only
    /// drafts reach this call.
    pub async fn delete_draft(&self, folio: i64) -> ClientResult<()> {
        let path = format!(
            "delete-history-sale/{}/{}",
            self.api.session().company_id,
            folio
        );
        let not_found = format!("la nota de venta con folio {folio} no fue encontrada");

        self.api.delete(&path, &not_found).await?;
        info!(folio, "borrador eliminado");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use notaventa_core::ProductAvailability;
    use serde_json::json;

    fn builder_with_two_lines() -> SaleNoteBuilder {
        let mut builder = SaleNoteBuilder::new();
        let p1 = ProductAvailability {
            id: 1,
            title: "A".to_string(),
            available_quantity: 10,
            price: Some(Money::from_pesos(1000)),
            warehouse_name: None,
            company_name: None,
        };
        builder.add_item(&p1).unwrap();
        builder.add_item(&p1).unwrap();
        builder.set_client(Some(9));
        builder.set_warehouse(Some(3));
        builder.set_observations("entrega en bodega");
        builder
    }

    #[test]
    fn test_payload_uses_backend_field_names() {
        let payload =
            serde_json::to_value(SaleNotePayload::from_builder(&builder_with_two_lines())).unwrap();

        assert_eq!(payload["id_client"], json!(9));
        assert_eq!(payload["id_warehouse"], json!(3));
        assert_eq!(payload["amount_total_products"], json!(2));
        assert_eq!(payload["price_subtotal"], json!(2000));
        assert_eq!(payload["price_final"], json!(2000));
        assert_eq!(payload["observation"], json!("entrega en bodega"));

        let line = &payload["products"][0];
        assert_eq!(line["id_producto"], json!(1));
        assert_eq!(line["cantidad"], json!(2));
        assert_eq!(line["precio_unitario"], json!(1000));
        assert_eq!(line["total"], json!(2000));
    }

    #[test]
    fn test_filters_pass_through_unmodified() {
        let filters = SaleFilters {
            client_id: Some(12),
            date_start: Some(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()),
            status: Some(SaleStatus::Finalizado),
            all_sales: true,
        };

        let query = filters.to_query();
        assert!(query.contains(&("client_id", "12".to_string())));
        assert!(query.contains(&("date_start", "2026-03-01".to_string())));
        assert!(query.contains(&("status_sale", "Finalizado".to_string())));
        assert!(query.contains(&("all_sale", "true".to_string())));
    }

    #[test]
    fn test_empty_filters_produce_no_query() {
        assert!(SaleFilters::default().to_query().is_empty());
    }

    fn sample_wire(products: Value) -> Value {
        json!({
            "id": 17,
            "warehouse_id": 3,
            "client_id": 9,
            "products": products,
            "amount_total_products": 2,
            "price_subtotal": 2000,
            "price_final": 2000,
            "type_emission": null,
            "observation": "entrega",
            "status_sale": "Finalizado",
            "created_at": "2026-03-01T12:00:00Z"
        })
    }

    #[test]
    fn test_wire_with_array_products() {
        let value = sample_wire(json!([{
            "id_producto": 1, "nombre": "A", "cantidad": 2,
            "precio_unitario": 1000, "total": 2000
        }]));

        let wire: SaleNoteWire = serde_json::from_value(value).unwrap();
        let note = SaleNote::try_from(wire).unwrap();

        assert_eq!(note.folio, 17);
        assert_eq!(note.status, SaleStatus::Finalizado);
        assert_eq!(note.emission, None);
        assert_eq!(note.lines.len(), 1);
        assert_eq!(note.lines[0].total.pesos(), 2000);
    }

    #[test]
    fn test_wire_with_serialized_string_products() {
        let value = sample_wire(json!(
            "[{\"id_producto\":1,\"nombre\":\"A\",\"cantidad\":2,\"precio_unitario\":1000,\"total\":2000}]"
        ));

        let wire: SaleNoteWire = serde_json::from_value(value).unwrap();
        assert_eq!(wire.products.len(), 1);
        assert_eq!(wire.products[0].cantidad, 2);
    }

    #[test]
    fn test_wire_legacy_status_spelling_folds_to_canonical() {
        let mut value = sample_wire(json!([]));
        value["status_sale"] = json!("pendiente");

        let note = SaleNote::try_from(serde_json::from_value::<SaleNoteWire>(value).unwrap()).unwrap();
        assert_eq!(note.status, SaleStatus::Borrador);
    }

    #[test]
    fn test_wire_unknown_status_is_an_error() {
        let mut value = sample_wire(json!([]));
        value["status_sale"] = json!("despachada");

        let wire: SaleNoteWire = serde_json::from_value(value).unwrap();
        assert!(matches!(
            SaleNote::try_from(wire),
            Err(ClientError::UnexpectedEnvelope)
        ));
    }

    #[test]
    fn test_wire_emission_type_parsed() {
        let mut value = sample_wire(json!([]));
        value["type_emission"] = json!("Boleta");
        value["status_sale"] = json!("Emitido");

        let note = SaleNote::try_from(serde_json::from_value::<SaleNoteWire>(value).unwrap()).unwrap();
        assert_eq!(note.emission, Some(DocumentType::Boleta));
        assert_eq!(note.status, SaleStatus::Emitido);
    }
}
