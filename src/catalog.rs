//! Material catalog: lookup, creation and total-quantity accounting.

use crate::error::{EngineError, Result, ValidationError};
use crate::model::{Material, MaterialId};
use crate::store::{MaterialRepository, ReservationRepository};
use log::{debug, warn};

/// Owns the lifecycle of [`Material`] records.
///
/// Name lookup is a linear scan in storage order; the first material whose
/// normalized name matches wins. Storage does not enforce name uniqueness, so
/// [`Catalog::create`] and renames through [`Catalog::update`] can introduce
/// duplicates; only the one with the lowest id is found by name.
pub struct Catalog<'s, S> {
    store: &'s mut S,
}

impl<'s, S> Catalog<'s, S>
where
    S: MaterialRepository + ReservationRepository,
{
    pub fn new(store: &'s mut S) -> Self {
        Catalog { store }
    }

    pub fn find_by_normalized_name(&self, name: &str) -> Result<Option<Material>> {
        Ok(self.store.find_material_by_normalized_name(name)?)
    }

    pub fn find_by_id(&self, id: MaterialId) -> Result<Option<Material>> {
        Ok(self.store.find_material(id)?)
    }

    pub fn list(&self) -> Result<Vec<Material>> {
        Ok(self.store.list_materials()?)
    }

    /// Creates a new material unconditionally. Callers check for an existing
    /// same-named material first.
    pub fn create(&mut self, name: &str, description: &str, quantity: u32) -> Result<Material> {
        if name.trim().is_empty() {
            return Err(ValidationError::BlankName.into());
        }

        let material = self.store.create_material(name, description, quantity)?;
        debug!(
            "Created material {} '{}' with quantity {}",
            material.id, material.name, material.total_quantity
        );
        Ok(material)
    }

    /// Adds stock under `name`.
    ///
    /// A new material is created if no material normalizes to `name`. Otherwise
    /// the existing material's quantity grows by `quantity`, and `description`
    /// is filled in only when the stored description is empty.
    pub fn upsert_by_name(
        &mut self,
        name: &str,
        description: &str,
        quantity: u32,
    ) -> Result<Material> {
        let Some(mut material) = self.find_by_normalized_name(name)? else {
            return self.create(name, description, quantity);
        };

        material.increase_quantity(quantity);
        if material.description.is_empty() {
            material.description = description.to_string();
        }
        self.store.merge_material(&material)?;

        debug!(
            "Added {} to material {} '{}', now {}",
            quantity, material.id, material.name, material.total_quantity
        );
        Ok(material)
    }

    /// Removes a material that no reservation references.
    ///
    /// # Errors
    ///
    /// - [`EngineError::UnknownMaterial`] if no such material exists
    /// - [`EngineError::InUse`] if any reservation still references it; the
    ///   material is left untouched
    pub fn delete(&mut self, id: MaterialId) -> Result<()> {
        if self.store.find_material(id)?.is_none() {
            return Err(EngineError::UnknownMaterial { id });
        }

        let references = self.store.list_reservations_by_material(id)?.len();
        if references > 0 {
            warn!(
                "Refusing to delete material {}: referenced by {} reservation(s)",
                id, references
            );
            return Err(EngineError::InUse {
                entity: "material",
                id: id.0,
                references,
            });
        }

        self.store.delete_material(id)?;
        debug!("Deleted material {}", id);
        Ok(())
    }

    /// Changes the owned quantity by `delta`. Decreases clamp at zero.
    pub fn adjust_quantity(&mut self, id: MaterialId, delta: i64) -> Result<Material> {
        let mut material = self
            .store
            .find_material(id)?
            .ok_or(EngineError::UnknownMaterial { id })?;

        material.adjust_quantity(delta);
        self.store.merge_material(&material)?;
        debug!(
            "Adjusted material {} by {}, now {}",
            id, delta, material.total_quantity
        );
        Ok(material)
    }

    /// Overwrites name, description and owned quantity of a material.
    ///
    /// Existing reservations are kept even if `quantity` drops below what
    /// they hold. Renaming onto a name another material already normalizes
    /// to is allowed; the two then share a lookup key.
    ///
    /// # Errors
    ///
    /// - [`EngineError::UnknownMaterial`] if no such material exists
    /// - [`ValidationError::BlankName`] if `name` is blank
    pub fn update(
        &mut self,
        id: MaterialId,
        name: &str,
        description: &str,
        quantity: u32,
    ) -> Result<Material> {
        if name.trim().is_empty() {
            return Err(ValidationError::BlankName.into());
        }

        let mut material = self
            .store
            .find_material(id)?
            .ok_or(EngineError::UnknownMaterial { id })?;

        if let Some(other) = self.find_by_normalized_name(name)? {
            if other.id != id {
                warn!(
                    "Material {} renamed to '{}', which also names material {}",
                    id, name, other.id
                );
            }
        }

        material.name = name.to_string();
        material.description = description.to_string();
        material.total_quantity = quantity;
        self.store.merge_material(&material)?;

        debug!(
            "Updated material {} to '{}' with quantity {}",
            id, material.name, material.total_quantity
        );
        Ok(material)
    }
}
