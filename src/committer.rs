//! All-or-nothing checkout of a reservation cart.
//!
//! A checkout moves through these phases:
//!
//! ```text
//! cart ──► person resolved ──► checkout created ──► items evaluated ──► committed
//!   │            │                                        │
//!   │            └─► rejected (status 3)                  └─► rolled back (status 7)
//!   └─► rejected (empty cart, status 9)
//! ```
//!
//! Every cart item is evaluated even after an earlier one failed, so a
//! rejected checkout reports all of its problems at once. Reservations are
//! written as items are accepted and removed again on rollback; a rolled back
//! checkout leaves no checkout or reservation behind and never touches
//! material quantities.

use crate::availability::AvailabilityChecker;
use crate::cart::{ReservationCart, ReservationDraft};
use crate::error::{EngineError, Result, StoreError, ValidationError};
use crate::model::{Checkout, CheckoutId, ReservationId};
use crate::registry::PersonRegistry;
use crate::store::Store;
use log::{debug, info, warn};
use std::fmt;

/// Terminal state of a checkout attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutStatus {
    /// All items were reserved and the checkout is persisted.
    Committed,
    /// The borrower name could not be resolved to a person.
    PersonUnresolved,
    /// At least one item failed; nothing from this attempt was kept.
    RolledBack,
    /// The cart was empty; nothing was attempted.
    EmptyCart,
}

impl CheckoutStatus {
    /// Numeric status code reported to callers.
    pub fn code(self) -> u8 {
        match self {
            CheckoutStatus::Committed => 0,
            CheckoutStatus::PersonUnresolved => 3,
            CheckoutStatus::RolledBack => 7,
            CheckoutStatus::EmptyCart => 9,
        }
    }

    pub fn is_committed(self) -> bool {
        self == CheckoutStatus::Committed
    }
}

impl fmt::Display for CheckoutStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CheckoutStatus::Committed => "committed",
            CheckoutStatus::PersonUnresolved => "person unresolved",
            CheckoutStatus::RolledBack => "rolled back",
            CheckoutStatus::EmptyCart => "empty cart",
        };
        write!(f, "{} ({})", label, self.code())
    }
}

/// Result of [`TransactionCommitter::checkout`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutOutcome {
    pub status: CheckoutStatus,
    /// Human-readable messages: one per failed item plus a summary line.
    pub messages: Vec<String>,
    /// Id of the persisted checkout, only set when committed.
    pub checkout_id: Option<CheckoutId>,
}

impl CheckoutOutcome {
    fn rejected(status: CheckoutStatus, message: String) -> Self {
        CheckoutOutcome {
            status,
            messages: vec![message],
            checkout_id: None,
        }
    }

    pub fn code(&self) -> u8 {
        self.status.code()
    }
}

enum ItemOutcome {
    Reserved(ReservationId),
    Rejected {
        message: String,
        corrected_quantity: Option<u32>,
    },
}

fn rejected(
    draft: &ReservationDraft,
    reason: String,
    corrected_quantity: Option<u32>,
) -> ItemOutcome {
    ItemOutcome::Rejected {
        message: format!(
            "Material '{}' could not be reserved: {}.",
            draft.material_name, reason
        ),
        corrected_quantity,
    }
}

/// Owns the checkout and reservation lifecycle.
pub struct TransactionCommitter<'s, S> {
    store: &'s mut S,
}

impl<'s, S: Store> TransactionCommitter<'s, S> {
    pub fn new(store: &'s mut S) -> Self {
        TransactionCommitter { store }
    }

    /// Checks out every draft in `cart` for the person named `person_name`.
    ///
    /// On [`CheckoutStatus::Committed`] the cart is cleared. On
    /// [`CheckoutStatus::RolledBack`] the cart is kept, with each draft that
    /// exceeded the remaining stock lowered to the quantity that would fit.
    ///
    /// # Errors
    ///
    /// Repository failures are returned as [`EngineError::Persistence`] after
    /// a best-effort rollback of whatever this attempt already wrote.
    pub fn checkout(
        &mut self,
        person_name: &str,
        cart: &mut ReservationCart,
    ) -> Result<CheckoutOutcome> {
        if cart.is_empty() {
            debug!("Checkout rejected: cart is empty");
            return Ok(CheckoutOutcome::rejected(
                CheckoutStatus::EmptyCart,
                format!("Checkout aborted: {}.", ValidationError::EmptyCart),
            ));
        }

        let person = match PersonRegistry::new(&mut *self.store).resolve_or_create(person_name) {
            Ok(person) => person,
            Err(EngineError::Validation(e)) => {
                warn!("Checkout rejected: person '{}' unresolved: {}", person_name, e);
                return Ok(CheckoutOutcome::rejected(
                    CheckoutStatus::PersonUnresolved,
                    format!("Checkout aborted: person could not be resolved, {}.", e),
                ));
            }
            Err(e) => return Err(e),
        };

        let mut checkout = self.store.create_empty_checkout()?;
        checkout.person_id = Some(person.id);

        let mut messages = Vec::new();
        let mut corrections = Vec::new();

        for draft in cart.list_all() {
            match self.evaluate(&draft, checkout.id) {
                Ok(ItemOutcome::Reserved(id)) => checkout.reservations.push(id),
                Ok(ItemOutcome::Rejected {
                    message,
                    corrected_quantity,
                }) => {
                    debug!("Checkout {}: {}", checkout.id, message);
                    messages.push(message);
                    if let Some(quantity) = corrected_quantity {
                        corrections.push((draft.material_id, quantity));
                    }
                }
                Err(e) => {
                    self.roll_back_after_failure(&mut checkout);
                    return Err(e);
                }
            }
        }

        if !messages.is_empty() {
            self.roll_back(&mut checkout)?;
            for (material_id, quantity) in corrections {
                cart.set_quantity(material_id, quantity);
            }

            warn!(
                "Checkout for '{}' rolled back: {} of {} item(s) failed",
                person.name,
                messages.len(),
                cart.len()
            );
            messages.push("Checkout was not successful; no items were reserved.".to_string());
            return Ok(CheckoutOutcome {
                status: CheckoutStatus::RolledBack,
                messages,
                checkout_id: None,
            });
        }

        if let Err(e) = self.store.merge_checkout(&checkout) {
            self.roll_back_after_failure(&mut checkout);
            return Err(e.into());
        }
        cart.clear();

        info!(
            "Checkout {} committed for '{}' with {} reservation(s)",
            checkout.id,
            person.name,
            checkout.reservations.len()
        );
        Ok(CheckoutOutcome {
            status: CheckoutStatus::Committed,
            messages: vec![format!(
                "Checkout {} for {} was successful with {} item(s).",
                checkout.id,
                person.name,
                checkout.reservations.len()
            )],
            checkout_id: Some(checkout.id),
        })
    }

    /// Deletes a committed checkout and all of its reservations, freeing the
    /// reserved stock. Returns the number of reservations removed.
    pub fn return_checkout(&mut self, id: CheckoutId) -> Result<usize> {
        if self.store.find_checkout(id)?.is_none() {
            return Err(StoreError::NotFound {
                entity: "checkout",
                id: id.0,
            }
            .into());
        }

        let removed = self.store.delete_reservations_by_checkout(id)?;
        self.store.delete_checkout(id)?;
        info!("Checkout {} returned, {} reservation(s) released", id, removed);
        Ok(removed)
    }

    fn evaluate(
        &mut self,
        draft: &ReservationDraft,
        checkout_id: CheckoutId,
    ) -> Result<ItemOutcome> {
        if self.store.find_material(draft.material_id)?.is_none() {
            return Ok(rejected(draft, "it no longer exists".to_string(), None));
        }

        let (start, end) = match draft.validate() {
            Ok(dates) => dates,
            Err(e) => return Ok(rejected(draft, e.to_string(), None)),
        };

        let availability = AvailabilityChecker::new(&*self.store).check_and_adjust(
            draft.material_id,
            draft.quantity,
            start,
            end,
        )?;

        if !availability.accepted {
            let reason = match availability.adjusted_quantity {
                0 => "no units are available in this period".to_string(),
                n => format!(
                    "only {} unit(s) are available in this period, the quantity was adjusted",
                    n
                ),
            };
            return Ok(rejected(draft, reason, Some(availability.adjusted_quantity)));
        }

        if draft.quantity == 0 {
            return Ok(rejected(draft, "no quantity was requested".to_string(), None));
        }

        let reservation = self.store.create_reservation(
            draft.material_id,
            draft.quantity,
            start,
            end,
            checkout_id,
        )?;
        Ok(ItemOutcome::Reserved(reservation.id))
    }

    fn roll_back(&mut self, checkout: &mut Checkout) -> Result<()> {
        checkout.person_id = None;
        checkout.reservations.clear();

        let removed = self.store.delete_reservations_by_checkout(checkout.id)?;
        self.store.delete_checkout(checkout.id)?;
        debug!(
            "Checkout {} rolled back, {} reservation(s) removed",
            checkout.id, removed
        );
        Ok(())
    }

    fn roll_back_after_failure(&mut self, checkout: &mut Checkout) {
        if let Err(e) = self.roll_back(checkout) {
            warn!("Rollback of checkout {} failed: {}", checkout.id, e);
        }
    }
}
