//! # notaventa-client: HTTP Layer for NotaVenta
//!
//! Every HTTP call against the backend lives in this crate. Services are
//! constructed from an explicit [`Session`] (token + selected company and
//! marketplace connection) and classify backend failures once, in
//! [`error`], into display-ready errors.
//!
//! ## Responsibilities
//! - request plumbing: bearer auth, timeouts, envelope extraction ([`http`])
//! - sale note persistence ([`services::sales`])
//! - document storage ([`services::documents`])
//! - buyer registry ([`services::clients`])
//! - warehouse/product lookups ([`services::catalog`])
//!
//! Not responsible for: business rules (notaventa-core), workflow
//! orchestration and PDF generation (notaventa-flow).

pub mod error;
pub mod http;
pub mod services;
pub mod session;

pub use error::{ClientError, ClientResult};
pub use http::Api;
pub use services::{
    CatalogService, ClientPayload, ClientService, DocumentService, SaleFilters, SaleService,
    UploadReceipt,
};
pub use session::Session;
