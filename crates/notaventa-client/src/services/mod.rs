//! # Backend Services
//!
//! One service per backend concern, each holding a cloned [`crate::http::Api`].

pub mod catalog;
pub mod clients;
pub mod documents;
pub mod sales;

pub use catalog::CatalogService;
pub use clients::{ClientPayload, ClientService};
pub use documents::{DocumentService, UploadReceipt};
pub use sales::{SaleFilters, SaleService};
