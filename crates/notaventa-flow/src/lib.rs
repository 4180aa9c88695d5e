//! # notaventa-flow: Lifecycle & Emission Workflow
//!
//! Orchestration layer between the pure core and the HTTP services:
//!
//! - [`controller`] - the sale lifecycle controller (draft/finalize/cancel/
//!   delete) and the two-phase emission workflow with its retry path
//! - [`pdf`] - boleta/factura PDF rendering
//! - [`error`] - the folded workflow error type

pub mod controller;
pub mod error;
pub mod pdf;

pub use controller::{EmissionOutcome, SaleWorkflow};
pub use error::{FlowError, FlowResult};
pub use pdf::DocumentRenderer;
