//! Person registry with normalized-name deduplication.

use crate::error::{EngineError, Result, ValidationError};
use crate::model::{Person, PersonId};
use crate::store::{CheckoutRepository, PersonRepository};
use log::{debug, warn};

/// Resolves borrower names to [`Person`] records.
///
/// Two names denote the same person when they normalize to the same key, so
/// "Müller" and "MUELLER" resolve to one record.
pub struct PersonRegistry<'s, S> {
    store: &'s mut S,
}

impl<'s, S> PersonRegistry<'s, S>
where
    S: PersonRepository + CheckoutRepository,
{
    pub fn new(store: &'s mut S) -> Self {
        PersonRegistry { store }
    }

    /// Returns the person whose name normalizes like `name`, creating one if
    /// none exists. An existing person is returned unchanged.
    ///
    /// # Errors
    ///
    /// [`ValidationError::BlankName`] if `name` is empty or whitespace only.
    pub fn resolve_or_create(&mut self, name: &str) -> Result<Person> {
        if name.trim().is_empty() {
            return Err(ValidationError::BlankName.into());
        }

        if let Some(existing) = self.find_by_name(name)? {
            return Ok(existing);
        }

        let person = self.store.create_person(name)?;
        debug!("Registered person {} '{}'", person.id, person.name);
        Ok(person)
    }

    pub fn find_by_name(&self, name: &str) -> Result<Option<Person>> {
        Ok(self.store.find_person_by_normalized_name(name)?)
    }

    pub fn find(&self, id: PersonId) -> Result<Option<Person>> {
        Ok(self.store.find_person(id)?)
    }

    pub fn list(&self) -> Result<Vec<Person>> {
        Ok(self.store.list_persons()?)
    }

    /// Removes a person. Refused while any checkout still belongs to them.
    pub fn delete(&mut self, id: PersonId) -> Result<()> {
        let references = self
            .store
            .list_checkouts()?
            .iter()
            .filter(|c| c.person_id == Some(id))
            .count();

        if references > 0 {
            warn!(
                "Refusing to delete person {}: owns {} checkout(s)",
                id, references
            );
            return Err(EngineError::InUse {
                entity: "person",
                id: id.0,
                references,
            });
        }

        self.store.delete_person(id)?;
        debug!("Deleted person {}", id);
        Ok(())
    }
}
