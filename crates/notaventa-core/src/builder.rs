//! # Sale Note Builder
//!
//! The in-memory cart for a sale note in progress. Pure state machine: all
//! mutations are synchronous, no I/O, and every mutation re-establishes the
//! totals invariant.
//!
//! ## Invariants
//! - no line ever survives a mutation with quantity ≤ 0
//! - `line.total == line.quantity × line.unit_price` after every mutation
//! - `subtotal == total == Σ line.total` (there is no tax model; if taxes
//!   are ever introduced they must be a pure function over the line list,
//!   never inlined here)
//! - adding a product already present merges into the existing line

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{ProductAvailability, SaleNote};

// =============================================================================
// Line Item
// =============================================================================

/// One product line in the builder.
///
/// The key is synthetic (`{product_id}-{added_at_millis}`) so that a
/// product removed and re-added later gets a distinct line identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    pub key: String,
    pub product_id: i64,
    pub name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub total: Money,
    pub added_at: DateTime<Utc>,
}

impl LineItem {
    fn new(product_id: i64, name: &str, unit_price: Money) -> Self {
        let added_at = Utc::now();
        LineItem {
            key: format!("{}-{}", product_id, added_at.timestamp_millis()),
            product_id,
            name: name.to_string(),
            quantity: 1,
            unit_price,
            total: unit_price,
            added_at,
        }
    }

    fn recompute_total(&mut self) {
        self.total = self.unit_price.multiply_quantity(self.quantity);
    }
}

// =============================================================================
// Sale Note Builder
// =============================================================================

/// The mutable sale note under construction.
///
/// Created empty on workflow entry, mutated exclusively through the
/// operations below, and reset after a successful finalization or an
/// explicit cancel.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SaleNoteBuilder {
    pub lines: Vec<LineItem>,
    pub client_id: Option<i64>,
    pub warehouse_id: Option<i64>,
    pub observations: String,
}

impl SaleNoteBuilder {
    /// Creates a new empty builder.
    pub fn new() -> Self {
        SaleNoteBuilder::default()
    }

    /// Rebuilds a builder from a persisted draft, for editing.
    ///
    /// Persisted lines get fresh keys; the original backend line identity
    /// is not meaningful locally.
    pub fn from_note(note: &SaleNote) -> Self {
        let mut builder = SaleNoteBuilder {
            lines: Vec::with_capacity(note.lines.len()),
            client_id: note.client_id,
            warehouse_id: Some(note.warehouse_id),
            observations: note.observation.clone().unwrap_or_default(),
        };

        for line in &note.lines {
            let mut item = LineItem::new(line.product_id, &line.name, line.unit_price);
            item.quantity = line.quantity.max(1);
            item.recompute_total();
            builder.lines.push(item);
        }

        builder
    }

    /// Adds one unit of a product.
    ///
    /// ## Behavior
    /// - product already present: quantity +1, line total recomputed
    /// - otherwise: a new line with quantity 1
    /// - product without a published price: `PriceUnavailable`, builder
    ///   unchanged (callers log and carry on)
    pub fn add_item(&mut self, product: &ProductAvailability) -> CoreResult<()> {
        let unit_price = product.price.ok_or(CoreError::PriceUnavailable(product.id))?;

        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product.id) {
            line.quantity += 1;
            line.recompute_total();
            return Ok(());
        }

        self.lines.push(LineItem::new(product.id, &product.title, unit_price));
        Ok(())
    }

    /// Sets the quantity of a line; quantities clamp to ≥ 0 and a line at 0
    /// is removed.
    pub fn update_quantity(&mut self, key: &str, quantity: i64) -> CoreResult<()> {
        let quantity = quantity.max(0);

        if quantity == 0 {
            return self.remove_item(key);
        }

        let line = self
            .lines
            .iter_mut()
            .find(|l| l.key == key)
            .ok_or_else(|| CoreError::LineNotFound(key.to_string()))?;

        line.quantity = quantity;
        line.recompute_total();
        Ok(())
    }

    /// Removes a line unconditionally.
    pub fn remove_item(&mut self, key: &str) -> CoreResult<()> {
        let before = self.lines.len();
        self.lines.retain(|l| l.key != key);

        if self.lines.len() == before {
            return Err(CoreError::LineNotFound(key.to_string()));
        }

        Ok(())
    }

    /// Attaches (or detaches) the buyer.
    pub fn set_client(&mut self, client_id: Option<i64>) {
        self.client_id = client_id;
    }

    /// Selects (or clears) the stock warehouse.
    pub fn set_warehouse(&mut self, warehouse_id: Option<i64>) {
        self.warehouse_id = warehouse_id;
    }

    /// Replaces the free-text observations.
    pub fn set_observations(&mut self, text: &str) {
        self.observations = text.to_string();
    }

    /// Sum of line totals.
    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(|l| l.total).sum()
    }

    /// Grand total. Always equals the subtotal: this system has no tax or
    /// discount model.
    pub fn total(&self) -> Money {
        self.subtotal()
    }

    /// Number of distinct lines.
    pub fn item_count(&self) -> usize {
        self.lines.len()
    }

    /// Total units across all lines.
    pub fn total_units(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Clears every field back to the initial empty state.
    pub fn reset(&mut self) {
        *self = SaleNoteBuilder::default();
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SaleLine, SaleStatus};

    fn product(id: i64, title: &str, price: Option<i64>) -> ProductAvailability {
        ProductAvailability {
            id,
            title: title.to_string(),
            available_quantity: 10,
            price: price.map(Money::from_pesos),
            warehouse_name: Some("Bodega Central".to_string()),
            company_name: Some("Comercial Andes".to_string()),
        }
    }

    #[test]
    fn test_add_same_product_twice_merges_line() {
        let mut builder = SaleNoteBuilder::new();
        let p = product(1, "A", Some(1000));

        builder.add_item(&p).unwrap();
        builder.add_item(&p).unwrap();

        assert_eq!(builder.item_count(), 1);
        let line = &builder.lines[0];
        assert_eq!(line.product_id, 1);
        assert_eq!(line.quantity, 2);
        assert_eq!(line.unit_price.pesos(), 1000);
        assert_eq!(line.total.pesos(), 2000);
        assert_eq!(builder.subtotal().pesos(), 2000);
        assert_eq!(builder.total().pesos(), 2000);
    }

    #[test]
    fn test_add_without_price_is_rejected_and_state_unchanged() {
        let mut builder = SaleNoteBuilder::new();

        let err = builder.add_item(&product(7, "Sin precio", None)).unwrap_err();
        assert!(matches!(err, CoreError::PriceUnavailable(7)));
        assert!(builder.is_empty());
    }

    #[test]
    fn test_update_quantity_zero_removes_line() {
        let mut builder = SaleNoteBuilder::new();
        builder.add_item(&product(1, "A", Some(500))).unwrap();
        let key = builder.lines[0].key.clone();

        builder.update_quantity(&key, 0).unwrap();
        assert!(builder.is_empty());
    }

    #[test]
    fn test_negative_quantity_behaves_like_zero() {
        let mut builder = SaleNoteBuilder::new();
        builder.add_item(&product(1, "A", Some(500))).unwrap();
        let key = builder.lines[0].key.clone();

        builder.update_quantity(&key, -5).unwrap();
        assert!(builder.is_empty());
    }

    #[test]
    fn test_update_quantity_recomputes_total() {
        let mut builder = SaleNoteBuilder::new();
        builder.add_item(&product(1, "A", Some(990))).unwrap();
        let key = builder.lines[0].key.clone();

        builder.update_quantity(&key, 4).unwrap();
        assert_eq!(builder.lines[0].total.pesos(), 3960);
        assert_eq!(builder.total().pesos(), 3960);
    }

    #[test]
    fn test_totals_invariant_under_mixed_mutations() {
        let mut builder = SaleNoteBuilder::new();
        builder.add_item(&product(1, "A", Some(1000))).unwrap();
        builder.add_item(&product(2, "B", Some(2500))).unwrap();
        builder.add_item(&product(1, "A", Some(1000))).unwrap();

        let key_b = builder
            .lines
            .iter()
            .find(|l| l.product_id == 2)
            .unwrap()
            .key
            .clone();
        builder.update_quantity(&key_b, 3).unwrap();

        let expected: i64 = builder
            .lines
            .iter()
            .map(|l| l.quantity * l.unit_price.pesos())
            .sum();
        assert_eq!(builder.total().pesos(), expected);
        assert_eq!(builder.subtotal(), builder.total());
        assert!(builder.lines.iter().all(|l| l.quantity > 0));

        let key_a = builder
            .lines
            .iter()
            .find(|l| l.product_id == 1)
            .unwrap()
            .key
            .clone();
        builder.remove_item(&key_a).unwrap();
        assert_eq!(builder.item_count(), 1);
        assert_eq!(builder.total().pesos(), 7500);
    }

    #[test]
    fn test_unknown_line_key_errors() {
        let mut builder = SaleNoteBuilder::new();
        assert!(matches!(
            builder.update_quantity("1-999", 2),
            Err(CoreError::LineNotFound(_))
        ));
        assert!(matches!(
            builder.remove_item("1-999"),
            Err(CoreError::LineNotFound(_))
        ));
    }

    #[test]
    fn test_reset_clears_all_fields() {
        let mut builder = SaleNoteBuilder::new();
        builder.add_item(&product(1, "A", Some(1000))).unwrap();
        builder.set_client(Some(9));
        builder.set_warehouse(Some(3));
        builder.set_observations("entrega parcial");

        builder.reset();

        assert!(builder.is_empty());
        assert_eq!(builder.client_id, None);
        assert_eq!(builder.warehouse_id, None);
        assert!(builder.observations.is_empty());
    }

    #[test]
    fn test_from_note_restores_lines_for_editing() {
        let note = SaleNote {
            folio: 12,
            warehouse_id: 3,
            client_id: Some(5),
            lines: vec![
                SaleLine {
                    product_id: 1,
                    name: "A".to_string(),
                    quantity: 2,
                    unit_price: Money::from_pesos(1000),
                    total: Money::from_pesos(2000),
                },
                SaleLine {
                    product_id: 2,
                    name: "B".to_string(),
                    quantity: 1,
                    unit_price: Money::from_pesos(990),
                    total: Money::from_pesos(990),
                },
            ],
            amount_total_products: 3,
            subtotal: Money::from_pesos(2990),
            total: Money::from_pesos(2990),
            emission: None,
            observation: Some("cliente frecuente".to_string()),
            status: SaleStatus::Borrador,
            created_at: Utc::now(),
        };

        let builder = SaleNoteBuilder::from_note(&note);

        assert_eq!(builder.item_count(), 2);
        assert_eq!(builder.client_id, Some(5));
        assert_eq!(builder.warehouse_id, Some(3));
        assert_eq!(builder.observations, "cliente frecuente");
        assert_eq!(builder.total().pesos(), 2990);
    }
}
