//! # Domain Types
//!
//! Core domain types used throughout NotaVenta.
//!
//! ## Status Vocabulary
//! The backend and the legacy UI spell sale statuses several ways
//! ("Borrador", "pendiente", "pagada", ...). This module owns the ONE
//! canonical closed enum plus the single mapping table from every legacy
//! spelling; nothing else in the workspace string-matches a status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::money::Money;

// =============================================================================
// Sale Status
// =============================================================================

/// The status of a sale note.
///
/// ## Lifecycle
/// ```text
/// Borrador ──► Finalizado ──► Emitido (terminal)
///     │             │
///     └──────┬──────┘
///            ▼
///        Cancelada (terminal)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SaleStatus {
    /// Draft: mutable, editable from the list view, deletable.
    Borrador,
    /// Locked cart awaiting document emission.
    Finalizado,
    /// Legal document generated and stored. Terminal.
    Emitido,
    /// Cancelled from Borrador or Finalizado. Terminal.
    Cancelada,
}

impl SaleStatus {
    /// Canonical backend spelling.
    pub const fn as_str(&self) -> &'static str {
        match self {
            SaleStatus::Borrador => "Borrador",
            SaleStatus::Finalizado => "Finalizado",
            SaleStatus::Emitido => "Emitido",
            SaleStatus::Cancelada => "Cancelada",
        }
    }

    /// Folds any known backend/legacy spelling into the canonical enum.
    ///
    /// The historical data mixes casings and synonyms: "pendiente" for a
    /// draft, "pagada" for a finalized sale, "anulada" for a cancelled one.
    /// Case-insensitive on purpose.
    pub fn from_backend_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "borrador" | "pendiente" => Some(SaleStatus::Borrador),
            "finalizado" | "pagada" => Some(SaleStatus::Finalizado),
            "emitido" => Some(SaleStatus::Emitido),
            "cancelada" | "anulada" => Some(SaleStatus::Cancelada),
            _ => None,
        }
    }

    /// Whether the note can still be edited or deleted.
    pub const fn is_draft(&self) -> bool {
        matches!(self, SaleStatus::Borrador)
    }

    /// Whether the status admits cancellation.
    pub const fn can_cancel(&self) -> bool {
        matches!(self, SaleStatus::Borrador | SaleStatus::Finalizado)
    }
}

impl fmt::Display for SaleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Always serializes the canonical spelling.
impl Serialize for SaleStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Accepts any legacy spelling on the way in.
impl<'de> Deserialize<'de> for SaleStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        SaleStatus::from_backend_str(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("estado de venta desconocido: {s}")))
    }
}

// =============================================================================
// Document Type
// =============================================================================

/// Legal document types issuable once a sale is finalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentType {
    /// Retail receipt.
    Boleta,
    /// Tax invoice; requires the buyer's razon social and RUT.
    Factura,
}

impl DocumentType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Boleta => "Boleta",
            DocumentType::Factura => "Factura",
        }
    }

    pub fn from_backend_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "boleta" => Some(DocumentType::Boleta),
            "factura" => Some(DocumentType::Factura),
            _ => None,
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for DocumentType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DocumentType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        DocumentType::from_backend_str(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("tipo de documento desconocido: {s}")))
    }
}

/// Buyer identification required when emitting a factura.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacturaData {
    pub razon_social: String,
    pub rut: String,
}

// =============================================================================
// Client
// =============================================================================

/// Discriminates natural persons from companies (tipo_cliente_id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientKind {
    Company,
    Natural,
}

impl ClientKind {
    /// Backend discriminator: 1 = company, 2 = natural person.
    pub const fn as_id(&self) -> i64 {
        match self {
            ClientKind::Company => 1,
            ClientKind::Natural => 2,
        }
    }

    pub const fn from_id(id: i64) -> Option<Self> {
        match id {
            1 => Some(ClientKind::Company),
            2 => Some(ClientKind::Natural),
            _ => None,
        }
    }
}

/// A buyer attached to a sale note. Created through the client registry;
/// read-only from the sale workflow's perspective.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub id: i64,
    pub kind: ClientKind,
    /// Tax id. For foreign clients this is a passport or equivalent.
    pub rut: String,
    /// Person name or razon social, depending on `kind`.
    pub name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub foreign: bool,
}

// =============================================================================
// Warehouse
// =============================================================================

/// A stock location owned by a company. Read-only from the sale workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Warehouse {
    pub id: i64,
    pub name: String,
    pub location: Option<String>,
    pub company_id: i64,
}

// =============================================================================
// Product Availability
// =============================================================================

/// A sellable item as seen within one warehouse.
///
/// `available_quantity` is a point-in-time hint; the backend re-validates
/// stock at save time and its answer wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductAvailability {
    pub id: i64,
    pub title: String,
    pub available_quantity: i64,
    /// Missing for unpublished items; such products cannot enter a sale.
    pub price: Option<Money>,
    pub warehouse_name: Option<String>,
    pub company_name: Option<String>,
}

impl ProductAvailability {
    /// Whether the availability hint covers `qty`. Advisory only.
    pub const fn hint_covers(&self, qty: i64) -> bool {
        self.available_quantity >= qty
    }
}

// =============================================================================
// Persisted Sale Note
// =============================================================================

/// One product line as persisted by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleLine {
    pub product_id: i64,
    pub name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub total: Money,
}

/// A sale note as the backend stores it. The `folio` is the note's numeric
/// identifier, used as the external reference for emitted documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleNote {
    pub folio: i64,
    pub warehouse_id: i64,
    pub client_id: Option<i64>,
    pub lines: Vec<SaleLine>,
    /// Total number of units across lines.
    pub amount_total_products: i64,
    pub subtotal: Money,
    pub total: Money,
    /// `None` until a document has been emitted for this note.
    pub emission: Option<DocumentType>,
    pub observation: Option<String>,
    pub status: SaleStatus,
    pub created_at: DateTime<Utc>,
}

impl SaleNote {
    /// Finalized and still without an emitted document.
    pub fn awaits_emission(&self) -> bool {
        self.status == SaleStatus::Finalizado && self.emission.is_none()
    }
}

// =============================================================================
// Issued Document
// =============================================================================

/// A stored PDF tied 1:1 to a sale note by folio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedDocument {
    pub id: i64,
    pub folio: i64,
    pub file_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
