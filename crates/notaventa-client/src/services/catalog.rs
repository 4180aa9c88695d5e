//! # Catalog Lookups
//!
//! Read-only lookups: warehouses of the session's company and the sellable
//! products inside one warehouse. Availability figures are hints; nothing
//! is ever decremented locally.

use serde::Deserialize;

use notaventa_core::{Money, ProductAvailability, Warehouse};

use crate::error::ClientResult;
use crate::http::{data_as, Api};

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct WarehouseWire {
    id: i64,
    name: String,
    #[serde(default)]
    location: Option<String>,
    company_id: i64,
}

impl From<WarehouseWire> for Warehouse {
    fn from(wire: WarehouseWire) -> Self {
        Warehouse {
            id: wire.id,
            name: wire.name,
            location: wire.location,
            company_id: wire.company_id,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProductWire {
    id: i64,
    title: String,
    #[serde(default)]
    available_quantity: i64,
    /// Absent for unpublished items.
    #[serde(default)]
    price: Option<i64>,
    #[serde(default)]
    warehouse_name: Option<String>,
    #[serde(default)]
    company_name: Option<String>,
}

impl From<ProductWire> for ProductAvailability {
    fn from(wire: ProductWire) -> Self {
        ProductAvailability {
            id: wire.id,
            title: wire.title,
            available_quantity: wire.available_quantity,
            price: wire.price.map(Money::from_pesos),
            warehouse_name: wire.warehouse_name,
            company_name: wire.company_name,
        }
    }
}

// =============================================================================
// Service
// =============================================================================

/// Warehouse and product availability lookups.
#[derive(Debug, Clone)]
pub struct CatalogService {
    api: Api,
}

impl CatalogService {
    pub fn new(api: Api) -> Self {
        CatalogService { api }
    }

    /// Warehouses belonging to the session's company.
    pub async fn warehouses(&self) -> ClientResult<Vec<Warehouse>> {
        let path = format!("warehouse-company/{}", self.api.session().company_id);
        let body = self
            .api
            .get(&path, &[], "la lista de bodegas no fue encontrada")
            .await?;

        let wires: Vec<WarehouseWire> = data_as(body)?;
        Ok(wires.into_iter().map(Warehouse::from).collect())
    }

    /// Sellable products with stock and price inside one warehouse.
    pub async fn products_in_warehouse(
        &self,
        warehouse_id: i64,
    ) -> ClientResult<Vec<ProductAvailability>> {
        let path = format!(
            "products-warehouse/{}/{}",
            self.api.session().company_id,
            warehouse_id
        );
        let not_found = format!("la bodega {warehouse_id} no fue encontrada");
        let body = self.api.get(&path, &[], &not_found).await?;

        let wires: Vec<ProductWire> = data_as(body)?;
        Ok(wires.into_iter().map(ProductAvailability::from).collect())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
