//! # Lending Engine
//!
//! Reservation and availability engine for lending finite-quantity equipment
//! to people over date ranges without booking more than is on hand.
//!
//! ## Design Principles
//!
//! - **Explicit storage**: components receive their repositories at construction
//! - **All-or-nothing checkouts**: a cart is committed completely or not at all
//! - **Collected failures**: every rejected cart item is reported, not just the first
//! - **Name folding**: names match case-insensitively with German umlauts folded
//!
//! ## Example
//!
//! ```
//! use chrono::NaiveDate;
//! use lending_engine::{LendingEngine, ReservationCart};
//!
//! let mut engine = LendingEngine::new();
//! let tripod = engine.add_or_update_material("Stativ", "", 5).unwrap();
//!
//! let mut cart = ReservationCart::new();
//! let start = NaiveDate::from_ymd_opt(2024, 1, 1);
//! let end = NaiveDate::from_ymd_opt(2024, 1, 10);
//! engine.put_cart_entry(&mut cart, tripod.id, 3, start, end).unwrap();
//!
//! let outcome = engine.checkout("Anna", &mut cart).unwrap();
//! assert_eq!(outcome.code(), 0);
//! assert!(cart.is_empty());
//! ```

pub mod availability;
pub mod cart;
pub mod catalog;
pub mod command;
pub mod committer;
pub mod engine;
pub mod error;
pub mod model;
pub mod normalize;
pub mod registry;
pub mod store;

pub use availability::{counts_toward, Availability, AvailabilityChecker};
pub use cart::{ReservationCart, ReservationDraft};
pub use catalog::Catalog;
pub use command::{Command, CommandRecord};
pub use committer::{CheckoutOutcome, CheckoutStatus, TransactionCommitter};
pub use engine::{CheckoutSummary, LendingEngine};
pub use error::{EngineError, Result, StoreError, StoreResult, ValidationError};
pub use model::{
    Checkout, CheckoutId, Material, MaterialId, Person, PersonId, Reservation, ReservationId,
};
pub use normalize::normalize;
pub use registry::PersonRegistry;
pub use store::{
    CheckoutRepository, InMemoryStore, MaterialRepository, PersonRepository,
    ReservationRepository, Store,
};
