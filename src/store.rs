//! Repository interfaces and the in-memory reference backend.
//!
//! The lending components never own records directly: materials, people,
//! reservations and checkouts live behind these four traits, and the
//! components receive the backend explicitly at construction.
//!
//! Method names carry the entity so that a single backend type can
//! implement all four traits without call-site ambiguity.

use crate::error::{StoreError, StoreResult};
use crate::model::{
    Checkout, CheckoutId, Material, MaterialId, Person, PersonId, Reservation, ReservationId,
};
use crate::normalize::normalize;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Storage for [`Material`] records.
pub trait MaterialRepository {
    /// Persists a new material and returns it with its assigned id.
    fn create_material(
        &mut self,
        name: &str,
        description: &str,
        quantity: u32,
    ) -> StoreResult<Material>;

    fn find_material(&self, id: MaterialId) -> StoreResult<Option<Material>>;

    /// All materials in storage order.
    fn list_materials(&self) -> StoreResult<Vec<Material>>;

    fn delete_material(&mut self, id: MaterialId) -> StoreResult<()>;

    /// Writes back a modified material. Fails if it was never created.
    fn merge_material(&mut self, material: &Material) -> StoreResult<()>;

    /// Returns the first material, in storage order, whose normalized name
    /// equals the normalized `name`.
    fn find_material_by_normalized_name(&self, name: &str) -> StoreResult<Option<Material>> {
        let key = normalize(name);
        Ok(self
            .list_materials()?
            .into_iter()
            .find(|m| normalize(&m.name) == key))
    }
}

/// Storage for [`Person`] records.
pub trait PersonRepository {
    fn create_person(&mut self, name: &str) -> StoreResult<Person>;

    fn find_person(&self, id: PersonId) -> StoreResult<Option<Person>>;

    fn list_persons(&self) -> StoreResult<Vec<Person>>;

    fn delete_person(&mut self, id: PersonId) -> StoreResult<()>;

    fn merge_person(&mut self, person: &Person) -> StoreResult<()>;

    /// Returns the first person, in storage order, whose normalized name
    /// equals the normalized `name`.
    fn find_person_by_normalized_name(&self, name: &str) -> StoreResult<Option<Person>> {
        let key = normalize(name);
        Ok(self
            .list_persons()?
            .into_iter()
            .find(|p| normalize(&p.name) == key))
    }
}

/// Storage for [`Reservation`] line items.
pub trait ReservationRepository {
    fn create_reservation(
        &mut self,
        material_id: MaterialId,
        quantity: u32,
        start: NaiveDate,
        end: NaiveDate,
        checkout_id: CheckoutId,
    ) -> StoreResult<Reservation>;

    fn find_reservation(&self, id: ReservationId) -> StoreResult<Option<Reservation>>;

    fn list_reservations_by_material(
        &self,
        material_id: MaterialId,
    ) -> StoreResult<Vec<Reservation>>;

    fn list_reservations(&self) -> StoreResult<Vec<Reservation>>;

    /// Removes every reservation owned by the checkout, returning how many were removed.
    fn delete_reservations_by_checkout(&mut self, checkout_id: CheckoutId) -> StoreResult<usize>;
}

/// Storage for [`Checkout`] records.
pub trait CheckoutRepository {
    /// Persists a new checkout with no person and no reservations.
    fn create_empty_checkout(&mut self) -> StoreResult<Checkout>;

    fn find_checkout(&self, id: CheckoutId) -> StoreResult<Option<Checkout>>;

    fn list_checkouts(&self) -> StoreResult<Vec<Checkout>>;

    fn merge_checkout(&mut self, checkout: &Checkout) -> StoreResult<()>;

    fn delete_checkout(&mut self, id: CheckoutId) -> StoreResult<()>;
}

/// A backend providing all four repositories.
pub trait Store:
    MaterialRepository + PersonRepository + ReservationRepository + CheckoutRepository
{
}

impl<T> Store for T where
    T: MaterialRepository + PersonRepository + ReservationRepository + CheckoutRepository
{
}

/// Volatile backend keeping every record in ordered maps.
///
/// Ids are assigned from per-entity counters starting at 1, so storage order
/// equals creation order.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    materials: BTreeMap<MaterialId, Material>,
    persons: BTreeMap<PersonId, Person>,
    reservations: BTreeMap<ReservationId, Reservation>,
    checkouts: BTreeMap<CheckoutId, Checkout>,
    last_material: u64,
    last_person: u64,
    last_reservation: u64,
    last_checkout: u64,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn next_id(last: &mut u64) -> u64 {
    *last += 1;
    *last
}

fn not_found(entity: &'static str, id: u64) -> StoreError {
    StoreError::NotFound { entity, id }
}

impl MaterialRepository for InMemoryStore {
    fn create_material(
        &mut self,
        name: &str,
        description: &str,
        quantity: u32,
    ) -> StoreResult<Material> {
        let id = MaterialId(next_id(&mut self.last_material));
        let material = Material::new(id, name, description, quantity);
        self.materials.insert(id, material.clone());
        Ok(material)
    }

    fn find_material(&self, id: MaterialId) -> StoreResult<Option<Material>> {
        Ok(self.materials.get(&id).cloned())
    }

    fn list_materials(&self) -> StoreResult<Vec<Material>> {
        Ok(self.materials.values().cloned().collect())
    }

    fn delete_material(&mut self, id: MaterialId) -> StoreResult<()> {
        self.materials
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found("material", id.0))
    }

    fn merge_material(&mut self, material: &Material) -> StoreResult<()> {
        let slot = self
            .materials
            .get_mut(&material.id)
            .ok_or_else(|| not_found("material", material.id.0))?;
        *slot = material.clone();
        Ok(())
    }
}

impl PersonRepository for InMemoryStore {
    fn create_person(&mut self, name: &str) -> StoreResult<Person> {
        let id = PersonId(next_id(&mut self.last_person));
        let person = Person {
            id,
            name: name.to_string(),
        };
        self.persons.insert(id, person.clone());
        Ok(person)
    }

    fn find_person(&self, id: PersonId) -> StoreResult<Option<Person>> {
        Ok(self.persons.get(&id).cloned())
    }

    fn list_persons(&self) -> StoreResult<Vec<Person>> {
        Ok(self.persons.values().cloned().collect())
    }

    fn delete_person(&mut self, id: PersonId) -> StoreResult<()> {
        self.persons
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found("person", id.0))
    }

    fn merge_person(&mut self, person: &Person) -> StoreResult<()> {
        let slot = self
            .persons
            .get_mut(&person.id)
            .ok_or_else(|| not_found("person", person.id.0))?;
        *slot = person.clone();
        Ok(())
    }
}

impl ReservationRepository for InMemoryStore {
    fn create_reservation(
        &mut self,
        material_id: MaterialId,
        quantity: u32,
        start: NaiveDate,
        end: NaiveDate,
        checkout_id: CheckoutId,
    ) -> StoreResult<Reservation> {
        let id = ReservationId(next_id(&mut self.last_reservation));
        let reservation = Reservation {
            id,
            material_id,
            quantity,
            start,
            end,
            checkout_id,
        };
        self.reservations.insert(id, reservation.clone());
        Ok(reservation)
    }

    fn find_reservation(&self, id: ReservationId) -> StoreResult<Option<Reservation>> {
        Ok(self.reservations.get(&id).cloned())
    }

    fn list_reservations_by_material(
        &self,
        material_id: MaterialId,
    ) -> StoreResult<Vec<Reservation>> {
        Ok(self
            .reservations
            .values()
            .filter(|r| r.material_id == material_id)
            .cloned()
            .collect())
    }

    fn list_reservations(&self) -> StoreResult<Vec<Reservation>> {
        Ok(self.reservations.values().cloned().collect())
    }

    fn delete_reservations_by_checkout(&mut self, checkout_id: CheckoutId) -> StoreResult<usize> {
        let before = self.reservations.len();
        self.reservations.retain(|_, r| r.checkout_id != checkout_id);
        Ok(before - self.reservations.len())
    }
}

impl CheckoutRepository for InMemoryStore {
    fn create_empty_checkout(&mut self) -> StoreResult<Checkout> {
        let id = CheckoutId(next_id(&mut self.last_checkout));
        let checkout = Checkout::empty(id);
        self.checkouts.insert(id, checkout.clone());
        Ok(checkout)
    }

    fn find_checkout(&self, id: CheckoutId) -> StoreResult<Option<Checkout>> {
        Ok(self.checkouts.get(&id).cloned())
    }

    fn list_checkouts(&self) -> StoreResult<Vec<Checkout>> {
        Ok(self.checkouts.values().cloned().collect())
    }

    fn merge_checkout(&mut self, checkout: &Checkout) -> StoreResult<()> {
        let slot = self
            .checkouts
            .get_mut(&checkout.id)
            .ok_or_else(|| not_found("checkout", checkout.id.0))?;
        *slot = checkout.clone();
        Ok(())
    }

    fn delete_checkout(&mut self, id: CheckoutId) -> StoreResult<()> {
        self.checkouts
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found("checkout", id.0))
    }
}
