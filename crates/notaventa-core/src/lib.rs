//! # notaventa-core: Pure Business Logic for NotaVenta
//!
//! This crate is the heart of the sale-note workflow. It contains all
//! business logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                    apps/cli  (operation surface)              │
//! └──────────────────────────────┬────────────────────────────────┘
//!                                │
//! ┌──────────────────────────────▼────────────────────────────────┐
//! │      notaventa-flow  (lifecycle + emission orchestration)     │
//! └──────────────┬───────────────────────────────┬────────────────┘
//!                │                               │
//! ┌──────────────▼──────────────┐ ┌──────────────▼────────────────┐
//! │  notaventa-client (HTTP)    │ │  ★ notaventa-core (THIS) ★    │
//! │  backend REST services      │ │  money · builder · lifecycle  │
//! └─────────────────────────────┘ │  NO I/O · PURE FUNCTIONS      │
//!                                 └───────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Client, Warehouse, SaleNote, statuses)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`builder`] - The in-memory sale-note builder (cart)
//! - [`lifecycle`] - Status transition guards
//! - [`validation`] - Input validation rules
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: every function is deterministic
//! 2. **No I/O**: database, network and file system access are forbidden here
//! 3. **Integer Money**: monetary values are whole pesos (i64), never floats
//! 4. **Explicit Errors**: all errors are typed, never strings or panics

pub mod builder;
pub mod error;
pub mod lifecycle;
pub mod money;
pub mod types;
pub mod validation;

pub use builder::{LineItem, SaleNoteBuilder};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;
