//! Lending domain records: materials, people, reservations and checkouts.
//!
//! Records refer to each other by typed id rather than by reference, so the
//! repositories in [`crate::store`] remain the single owner of every record.

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(
    /// Identity of a [`Material`].
    MaterialId
);
id_type!(
    /// Identity of a [`Person`].
    PersonId
);
id_type!(
    /// Identity of a [`Reservation`].
    ReservationId
);
id_type!(
    /// Identity of a [`Checkout`].
    CheckoutId
);

/// A reservable item type with a finite owned quantity.
///
/// # Invariants
///
/// - `total_quantity` is the number of units owned, not the number currently free
/// - `total_quantity` never goes negative; decreases clamp at zero
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Material {
    pub id: MaterialId,
    pub name: String,
    pub description: String,
    pub total_quantity: u32,
}

impl Material {
    /// Creates a material record. The id is assigned by the repository.
    pub fn new(id: MaterialId, name: &str, description: &str, total_quantity: u32) -> Self {
        Material {
            id,
            name: name.to_string(),
            description: description.to_string(),
            total_quantity,
        }
    }

    /// Adds `count` units to the owned quantity.
    pub fn increase_quantity(&mut self, count: u32) {
        self.total_quantity = self.total_quantity.saturating_add(count);
    }

    /// Removes `count` units from the owned quantity, stopping at zero.
    pub fn decrease_quantity(&mut self, count: u32) {
        self.total_quantity = self.total_quantity.saturating_sub(count);
    }

    /// Applies a signed quantity change. Never fails; negative results clamp to zero.
    pub fn adjust_quantity(&mut self, delta: i64) {
        let count = u32::try_from(delta.unsigned_abs()).unwrap_or(u32::MAX);
        if delta >= 0 {
            self.increase_quantity(count);
        } else {
            self.decrease_quantity(count);
        }
    }
}

/// Someone who borrows equipment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Person {
    pub id: PersonId,
    pub name: String,
}

/// One line item of a checkout: a quantity of one material over an inclusive
/// date interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reservation {
    pub id: ReservationId,
    pub material_id: MaterialId,
    pub quantity: u32,
    /// First day of the lending period (inclusive).
    pub start: NaiveDate,
    /// Last day of the lending period (inclusive). Never before `start`.
    pub end: NaiveDate,
    pub checkout_id: CheckoutId,
}

/// A transaction binding one person to one or more reservations.
///
/// A checkout with no reservations only exists while it is being built or
/// rolled back; it is never a committed state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Checkout {
    pub id: CheckoutId,
    /// Borrower. `None` only while the checkout is being built or torn down.
    pub person_id: Option<PersonId>,
    /// Line items in the order they were accepted.
    pub reservations: Vec<ReservationId>,
}

impl Checkout {
    /// Creates an empty checkout shell.
    pub fn empty(id: CheckoutId) -> Self {
        Checkout {
            id,
            person_id: None,
            reservations: Vec::new(),
        }
    }

    /// Returns `true` if this checkout is a valid committed checkout.
    pub fn is_committed(&self) -> bool {
        self.person_id.is_some() && !self.reservations.is_empty()
    }
}
