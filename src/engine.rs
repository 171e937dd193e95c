//! Lending engine facade.
//!
//! Bundles a storage backend with the catalog, registry, availability and
//! checkout components, and drives them from a stream of CSV commands.

use crate::availability::AvailabilityChecker;
use crate::cart::{ReservationCart, ReservationDraft};
use crate::catalog::Catalog;
use crate::command::{Command, CommandRecord};
use crate::committer::{CheckoutOutcome, TransactionCommitter};
use crate::error::{EngineError, Result, StoreError};
use crate::model::{
    Checkout, CheckoutId, Material, MaterialId, Person, PersonId, Reservation, ReservationId,
};
use crate::registry::PersonRegistry;
use crate::store::{InMemoryStore, Store};
use chrono::NaiveDate;
use csv::{ReaderBuilder, Trim};
use log::{debug, info, warn};
use std::io::{Read, Write};

/// Aggregate view of one checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSummary {
    pub checkout_id: CheckoutId,
    pub person: Option<Person>,
    /// Sum of all line item quantities.
    pub total_quantity: u64,
    pub earliest_start: Option<NaiveDate>,
    pub latest_end: Option<NaiveDate>,
    pub items: Vec<Reservation>,
}

/// The lending engine.
///
/// Every mutating operation takes `&mut self`, so an availability check and
/// the reservation writes that depend on it run under one exclusive borrow
/// of the store. Share an engine across threads behind a `Mutex`.
///
/// The engine also holds the cart of the command stream it processes; callers
/// driving the engine directly pass their own [`ReservationCart`] to
/// [`LendingEngine::checkout`].
pub struct LendingEngine<S = InMemoryStore> {
    store: S,
    cart: ReservationCart,
}

impl LendingEngine<InMemoryStore> {
    /// Creates an engine over an empty in-memory store.
    pub fn new() -> Self {
        Self::with_store(InMemoryStore::new())
    }
}

impl Default for LendingEngine<InMemoryStore> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Store> LendingEngine<S> {
    pub fn with_store(store: S) -> Self {
        LendingEngine {
            store,
            cart: ReservationCart::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The cart filled by `reserve` commands in [`LendingEngine::process_csv`].
    pub fn cart(&self) -> &ReservationCart {
        &self.cart
    }

    /// Checks out `cart` for `person_name`. See [`TransactionCommitter::checkout`].
    pub fn checkout(
        &mut self,
        person_name: &str,
        cart: &mut ReservationCart,
    ) -> Result<CheckoutOutcome> {
        TransactionCommitter::new(&mut self.store).checkout(person_name, cart)
    }

    /// Adds `quantity` units under `name`, creating the material if no
    /// material with that normalized name exists.
    pub fn add_or_update_material(
        &mut self,
        name: &str,
        description: &str,
        quantity: u32,
    ) -> Result<Material> {
        Catalog::new(&mut self.store).upsert_by_name(name, description, quantity)
    }

    /// Overwrites name, description and owned quantity of a material.
    /// See [`Catalog::update`].
    pub fn update_material(
        &mut self,
        id: MaterialId,
        name: &str,
        description: &str,
        quantity: u32,
    ) -> Result<Material> {
        Catalog::new(&mut self.store).update(id, name, description, quantity)
    }

    /// Deletes a material, refused with [`EngineError::InUse`] while any
    /// reservation references it.
    pub fn delete_material(&mut self, id: MaterialId) -> Result<()> {
        Catalog::new(&mut self.store).delete(id)
    }

    pub fn increase_quantity(&mut self, id: MaterialId, count: u32) -> Result<Material> {
        Catalog::new(&mut self.store).adjust_quantity(id, i64::from(count))
    }

    pub fn decrease_quantity(&mut self, id: MaterialId, count: u32) -> Result<Material> {
        Catalog::new(&mut self.store).adjust_quantity(id, -i64::from(count))
    }

    /// Units of a material not committed to reservations counting toward
    /// `[start, end]`. Negative if the material is overcommitted.
    pub fn available_quantity(
        &self,
        id: MaterialId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<i64> {
        AvailabilityChecker::new(&self.store)
            .available_quantity(id, start, end)?
            .ok_or(EngineError::UnknownMaterial { id })
    }

    /// Puts a draft for an existing material into `cart`, replacing any
    /// earlier draft for it. Dates are validated at checkout.
    pub fn put_cart_entry(
        &self,
        cart: &mut ReservationCart,
        id: MaterialId,
        quantity: u32,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<()> {
        let material = self.material(id)?.ok_or(EngineError::UnknownMaterial { id })?;
        cart.put(&material, quantity, start, end);
        Ok(())
    }

    pub fn remove_cart_entry(
        &self,
        cart: &mut ReservationCart,
        id: MaterialId,
    ) -> Option<ReservationDraft> {
        cart.remove(id)
    }

    pub fn clear_cart(&self, cart: &mut ReservationCart) {
        cart.clear();
    }

    /// Snapshot of the drafts in `cart`, ordered by material id.
    pub fn list_cart_entries(&self, cart: &ReservationCart) -> Vec<ReservationDraft> {
        cart.list_all()
    }

    pub fn material(&self, id: MaterialId) -> Result<Option<Material>> {
        Ok(self.store.find_material(id)?)
    }

    pub fn find_material_by_name(&self, name: &str) -> Result<Option<Material>> {
        Ok(self.store.find_material_by_normalized_name(name)?)
    }

    pub fn materials(&self) -> Result<Vec<Material>> {
        Ok(self.store.list_materials()?)
    }

    pub fn persons(&self) -> Result<Vec<Person>> {
        Ok(self.store.list_persons()?)
    }

    pub fn checkouts(&self) -> Result<Vec<Checkout>> {
        Ok(self.store.list_checkouts()?)
    }

    /// Looks up a borrower by name without creating one.
    pub fn find_person_by_name(&self, name: &str) -> Result<Option<Person>> {
        Ok(self.store.find_person_by_normalized_name(name)?)
    }

    /// Deletes a person, refused while they own a checkout.
    pub fn delete_person(&mut self, id: PersonId) -> Result<()> {
        PersonRegistry::new(&mut self.store).delete(id)
    }

    /// Ends a checkout, releasing all of its reservations.
    pub fn return_checkout(&mut self, id: CheckoutId) -> Result<usize> {
        TransactionCommitter::new(&mut self.store).return_checkout(id)
    }

    pub fn checkouts_for_person(&self, person_id: PersonId) -> Result<Vec<Checkout>> {
        Ok(self
            .store
            .list_checkouts()?
            .into_iter()
            .filter(|c| c.person_id == Some(person_id))
            .collect())
    }

    /// Total quantity across every reservation of every checkout the person owns.
    pub fn lent_quantity_for_person(&self, person_id: PersonId) -> Result<u64> {
        let mut total = 0;
        for checkout in self.checkouts_for_person(person_id)? {
            total += self.checkout_summary(checkout.id)?.total_quantity;
        }
        Ok(total)
    }

    pub fn checkout_summary(&self, id: CheckoutId) -> Result<CheckoutSummary> {
        let checkout = self
            .store
            .find_checkout(id)?
            .ok_or(StoreError::NotFound {
                entity: "checkout",
                id: id.0,
            })?;

        let person = match checkout.person_id {
            Some(person_id) => self.store.find_person(person_id)?,
            None => None,
        };

        let mut items = Vec::with_capacity(checkout.reservations.len());
        for reservation_id in &checkout.reservations {
            if let Some(reservation) = self.store.find_reservation(*reservation_id)? {
                items.push(reservation);
            }
        }

        Ok(CheckoutSummary {
            checkout_id: checkout.id,
            person,
            total_quantity: items.iter().map(|r| u64::from(r.quantity)).sum(),
            earliest_start: items.iter().map(|r| r.start).min(),
            latest_end: items.iter().map(|r| r.end).max(),
            items,
        })
    }

    /// Name of the person who borrowed the given reservation.
    pub fn lender_name(&self, reservation_id: ReservationId) -> Result<Option<String>> {
        let Some(reservation) = self.store.find_reservation(reservation_id)? else {
            return Ok(None);
        };
        let Some(checkout) = self.store.find_checkout(reservation.checkout_id)? else {
            return Ok(None);
        };
        let Some(person_id) = checkout.person_id else {
            return Ok(None);
        };

        Ok(self.store.find_person(person_id)?.map(|p| p.name))
    }

    /// Quantity of a material held by any reservation, regardless of dates.
    pub fn reserved_quantity(&self, id: MaterialId) -> Result<u64> {
        Ok(self
            .store
            .list_reservations_by_material(id)?
            .iter()
            .map(|r| u64::from(r.quantity))
            .sum())
    }

    /// Processes commands from a CSV reader in streaming fashion.
    ///
    /// Records are read one at a time. Invalid or failing records are logged
    /// at warn level and skipped.
    pub fn process_csv<R: Read>(&mut self, reader: R) -> Result<()> {
        let mut csv_reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(reader);

        for (row_idx, result) in csv_reader.deserialize::<CommandRecord>().enumerate() {
            let row_num = row_idx + 2; // 1-indexed, accounting for header row

            match result {
                Ok(record) => match record.parse(row_num) {
                    Ok(command) => {
                        if let Err(e) = self.execute(command, row_num) {
                            warn!("Row {}: {}", row_num, e);
                        }
                    }
                    Err(e) => warn!("{}", e),
                },
                Err(e) => {
                    warn!("Row {}: CSV parse error: {}", row_num, e);
                }
            }
        }

        Ok(())
    }

    /// Executes a single parsed command against the engine's own cart.
    fn execute(&mut self, command: Command, row: usize) -> Result<()> {
        match command {
            Command::Material {
                name,
                description,
                quantity,
            } => {
                let material = self.add_or_update_material(&name, &description, quantity)?;
                debug!(
                    "Row {}: Material {} '{}' now has {} unit(s)",
                    row, material.id, material.name, material.total_quantity
                );
            }
            Command::Edit {
                name,
                new_name,
                description,
                quantity,
            } => {
                let current = self.named_material(&name, row)?;
                let material = self.update_material(
                    current.id,
                    new_name.as_deref().unwrap_or(&current.name),
                    description.as_deref().unwrap_or(&current.description),
                    quantity.unwrap_or(current.total_quantity),
                )?;
                debug!(
                    "Row {}: Material {} edited, now '{}' with {} unit(s)",
                    row, material.id, material.name, material.total_quantity
                );
            }
            Command::Increase { name, quantity } => {
                let id = self.named_material(&name, row)?.id;
                self.increase_quantity(id, quantity)?;
            }
            Command::Decrease { name, quantity } => {
                let id = self.named_material(&name, row)?.id;
                self.decrease_quantity(id, quantity)?;
            }
            Command::Delete { name } => {
                let id = self.named_material(&name, row)?.id;
                self.delete_material(id)?;
                debug!("Row {}: Deleted material '{}'", row, name);
            }
            Command::Reserve {
                name,
                quantity,
                start,
                end,
            } => {
                let material = self.named_material(&name, row)?;
                self.cart.put(&material, quantity, start, end);
            }
            Command::Unreserve { name } => {
                let id = self.named_material(&name, row)?.id;
                if self.cart.remove(id).is_none() {
                    debug!("Row {}: '{}' was not in the cart", row, name);
                }
            }
            Command::Clear => self.cart.clear(),
            Command::Checkout { person } => {
                let outcome =
                    TransactionCommitter::new(&mut self.store).checkout(&person, &mut self.cart)?;
                info!("Row {}: Checkout for '{}' {}", row, person, outcome.status);
                for message in &outcome.messages {
                    info!("Row {}: {}", row, message);
                }
            }
        }

        Ok(())
    }

    fn named_material(&self, name: &str, row: usize) -> Result<Material> {
        self.find_material_by_name(name)?
            .ok_or_else(|| EngineError::InvalidRecord {
                row,
                message: format!("unknown material '{}'", name),
            })
    }

    /// Writes the inventory report to CSV.
    ///
    /// Output is sorted by material id. `reserved` is the quantity held by
    /// all committed reservations of the material.
    pub fn write_output<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["material", "name", "description", "total", "reserved"])?;

        for material in self.materials()? {
            csv_writer.write_record([
                material.id.to_string(),
                material.name.clone(),
                material.description.clone(),
                material.total_quantity.to_string(),
                self.reserved_quantity(material.id)?.to_string(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(())
    }
}
