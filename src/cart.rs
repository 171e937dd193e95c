//! Session-local reservation cart.
//!
//! A cart collects pending reservation drafts, at most one per material,
//! until they are checked out or discarded. Nothing in a cart is persisted.

use crate::error::ValidationError;
use crate::model::{Material, MaterialId};
use chrono::NaiveDate;
use std::collections::HashMap;

/// A pending, unvalidated reservation of one material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationDraft {
    pub material_id: MaterialId,
    /// Material name at the time the draft was made, used in messages.
    pub material_name: String,
    pub quantity: u32,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl ReservationDraft {
    /// Checks the date pair and returns it.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::MissingDates`] if either date is absent
    /// - [`ValidationError::EndBeforeStart`] if `end < start`
    pub fn validate(&self) -> Result<(NaiveDate, NaiveDate), ValidationError> {
        let (Some(start), Some(end)) = (self.start, self.end) else {
            return Err(ValidationError::MissingDates);
        };

        if start > end {
            return Err(ValidationError::EndBeforeStart { start, end });
        }

        Ok((start, end))
    }
}

/// Pending drafts keyed by material id.
#[derive(Debug, Clone, Default)]
pub struct ReservationCart {
    entries: HashMap<MaterialId, ReservationDraft>,
}

impl ReservationCart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a draft for `material`, replacing any earlier draft for it.
    pub fn put(
        &mut self,
        material: &Material,
        quantity: u32,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) {
        self.entries.insert(
            material.id,
            ReservationDraft {
                material_id: material.id,
                material_name: material.name.clone(),
                quantity,
                start,
                end,
            },
        );
    }

    /// Removes the draft for a material, returning it if present.
    pub fn remove(&mut self, material_id: MaterialId) -> Option<ReservationDraft> {
        self.entries.remove(&material_id)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn get(&self, material_id: MaterialId) -> Option<&ReservationDraft> {
        self.entries.get(&material_id)
    }

    /// Overwrites the quantity of an existing draft. Returns `false` if the
    /// material has no draft.
    pub fn set_quantity(&mut self, material_id: MaterialId, quantity: u32) -> bool {
        match self.entries.get_mut(&material_id) {
            Some(draft) => {
                draft.quantity = quantity;
                true
            }
            None => false,
        }
    }

    /// Snapshot of all drafts, ordered by material id.
    pub fn list_all(&self) -> Vec<ReservationDraft> {
        let mut drafts: Vec<_> = self.entries.values().cloned().collect();
        drafts.sort_by_key(|d| d.material_id);
        drafts
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
