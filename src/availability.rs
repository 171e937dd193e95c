//! Stock availability over date intervals.
//!
//! The committed quantity of a material for a requested interval is the sum
//! of every existing reservation of that material that [`counts_toward`] the
//! interval. The remaining stock is the owned quantity minus that sum.

use crate::error::Result;
use crate::model::MaterialId;
use crate::store::{MaterialRepository, ReservationRepository};
use chrono::NaiveDate;
use log::debug;

/// Outcome of an availability check.
///
/// A rejection is not an error: `adjusted_quantity` carries the largest
/// quantity that would have fit, which the caller may offer instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Availability {
    /// `true` if the requested quantity fits into the remaining stock.
    pub accepted: bool,
    /// The requested quantity if accepted, otherwise the remaining stock
    /// floored at zero.
    pub adjusted_quantity: u32,
}

impl Availability {
    fn accept(quantity: u32) -> Self {
        Availability {
            accepted: true,
            adjusted_quantity: quantity,
        }
    }

    fn reject(in_stock: i64) -> Self {
        Availability {
            accepted: false,
            adjusted_quantity: u32::try_from(in_stock.max(0)).unwrap_or(u32::MAX),
        }
    }
}

/// Returns `true` if an existing reservation over `[existing_start, existing_end]`
/// is counted against a request for `[start, end]`.
///
/// The test is the union of four cases:
///
/// 1. the existing start lies strictly inside the request,
/// 2. the existing end lies strictly inside the request,
/// 3. the request lies strictly inside the existing interval,
/// 4. both intervals are identical.
///
/// This is not the symmetric interval-overlap relation. Intervals that only
/// share an endpoint are not counted, and neither is a request that shares
/// one boundary with a longer reservation enclosing it.
pub fn counts_toward(
    existing_start: NaiveDate,
    existing_end: NaiveDate,
    start: NaiveDate,
    end: NaiveDate,
) -> bool {
    let start_inside = existing_start > start && existing_start < end;
    let end_inside = existing_end > start && existing_end < end;
    let request_inside = existing_start < start && existing_end > end;
    let exact_match = existing_start == start && existing_end == end;

    start_inside || end_inside || request_inside || exact_match
}

/// Computes committed and remaining stock from the catalog and the
/// reservation history.
pub struct AvailabilityChecker<'s, S> {
    store: &'s S,
}

impl<'s, S> AvailabilityChecker<'s, S>
where
    S: MaterialRepository + ReservationRepository,
{
    pub fn new(store: &'s S) -> Self {
        AvailabilityChecker { store }
    }

    /// Sums the quantity of every reservation of `material_id` that counts
    /// toward `[start, end]`.
    pub fn committed_quantity(
        &self,
        material_id: MaterialId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<u64> {
        let committed = self
            .store
            .list_reservations_by_material(material_id)?
            .iter()
            .filter(|r| counts_toward(r.start, r.end, start, end))
            .map(|r| u64::from(r.quantity))
            .sum();

        Ok(committed)
    }

    /// Owned quantity minus committed quantity. Negative when the owned
    /// quantity was reduced below what is already reserved; `None` if the
    /// material does not exist.
    pub fn available_quantity(
        &self,
        material_id: MaterialId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Option<i64>> {
        let Some(material) = self.store.find_material(material_id)? else {
            return Ok(None);
        };

        let committed = self.committed_quantity(material_id, start, end)?;
        Ok(Some(
            i64::from(material.total_quantity) - i64::try_from(committed).unwrap_or(i64::MAX),
        ))
    }

    /// Decides whether `requested` units of a material fit into `[start, end]`.
    ///
    /// An unknown material is rejected with an adjusted quantity of zero.
    pub fn check_and_adjust(
        &self,
        material_id: MaterialId,
        requested: u32,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Availability> {
        let Some(in_stock) = self.available_quantity(material_id, start, end)? else {
            debug!("Material {} not found, rejecting request", material_id);
            return Ok(Availability::reject(0));
        };

        if i64::from(requested) <= in_stock {
            Ok(Availability::accept(requested))
        } else {
            debug!(
                "Material {}: requested {} over {}..={}, only {} in stock",
                material_id, requested, start, end, in_stock
            );
            Ok(Availability::reject(in_stock))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CheckoutId;
    use crate::store::InMemoryStore;

    fn jan(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    /// "Stativ" with 5 units, 3 of them reserved over Jan 1..=10.
    fn tripod_store() -> (InMemoryStore, MaterialId) {
        let mut store = InMemoryStore::new();
        let material = store.create_material("Stativ", "", 5).unwrap();
        store
            .create_reservation(material.id, 3, jan(1), jan(10), CheckoutId(100))
            .unwrap();
        (store, material.id)
    }

    #[test]
    fn test_existing_start_inside_request() {
        assert!(counts_toward(jan(5), jan(20), jan(1), jan(10)));
    }

    #[test]
    fn test_existing_end_inside_request() {
        assert!(counts_toward(jan(1), jan(10), jan(5), jan(15)));
    }

    #[test]
    fn test_request_strictly_inside_existing() {
        assert!(counts_toward(jan(1), jan(20), jan(5), jan(10)));
    }

    #[test]
    fn test_exact_match() {
        assert!(counts_toward(jan(1), jan(10), jan(1), jan(10)));
        assert!(counts_toward(jan(3), jan(3), jan(3), jan(3)));
    }

    #[test]
    fn test_request_containing_existing_is_caught_by_boundaries() {
        assert!(counts_toward(jan(5), jan(8), jan(1), jan(10)));
    }

    #[test]
    fn test_disjoint_intervals() {
        assert!(!counts_toward(jan(1), jan(5), jan(10), jan(15)));
        assert!(!counts_toward(jan(10), jan(15), jan(1), jan(5)));
    }

    #[test]
    fn test_shared_endpoint_only_is_not_counted() {
        assert!(!counts_toward(jan(1), jan(10), jan(10), jan(15)));
        assert!(!counts_toward(jan(10), jan(15), jan(1), jan(10)));
    }

    #[test]
    fn test_one_shared_boundary_with_containment_is_not_counted() {
        assert!(!counts_toward(jan(1), jan(10), jan(1), jan(5)));
        assert!(!counts_toward(jan(1), jan(10), jan(5), jan(10)));
        assert!(!counts_toward(jan(1), jan(1), jan(1), jan(10)));
    }

    #[test]
    fn test_tripod_example_accepts_remaining_stock() {
        let (store, id) = tripod_store();
        let checker = AvailabilityChecker::new(&store);

        assert_eq!(checker.committed_quantity(id, jan(5), jan(15)).unwrap(), 3);

        let result = checker.check_and_adjust(id, 2, jan(5), jan(15)).unwrap();
        assert_eq!(
            result,
            Availability {
                accepted: true,
                adjusted_quantity: 2
            }
        );
    }

    #[test]
    fn test_tripod_example_rejects_and_clamps() {
        let (store, id) = tripod_store();
        let checker = AvailabilityChecker::new(&store);

        let result = checker.check_and_adjust(id, 3, jan(5), jan(15)).unwrap();
        assert!(!result.accepted);
        assert_eq!(result.adjusted_quantity, 2);
    }

    #[test]
    fn test_non_overlapping_period_sees_full_stock() {
        let (store, id) = tripod_store();
        let checker = AvailabilityChecker::new(&store);

        assert_eq!(
            checker.available_quantity(id, jan(11), jan(20)).unwrap(),
            Some(5)
        );
        assert!(checker.check_and_adjust(id, 5, jan(11), jan(20)).unwrap().accepted);
    }

    #[test]
    fn test_overcommitted_material_clamps_to_zero() {
        let (mut store, id) = tripod_store();
        let mut material = store.find_material(id).unwrap().unwrap();
        material.decrease_quantity(4);
        store.merge_material(&material).unwrap();

        let checker = AvailabilityChecker::new(&store);
        assert_eq!(
            checker.available_quantity(id, jan(1), jan(10)).unwrap(),
            Some(-2)
        );

        let result = checker.check_and_adjust(id, 1, jan(1), jan(10)).unwrap();
        assert!(!result.accepted);
        assert_eq!(result.adjusted_quantity, 0);
    }

    #[test]
    fn test_unknown_material_is_rejected() {
        let store = InMemoryStore::new();
        let checker = AvailabilityChecker::new(&store);

        let result = checker
            .check_and_adjust(MaterialId(9), 1, jan(1), jan(2))
            .unwrap();
        assert_eq!(
            result,
            Availability {
                accepted: false,
                adjusted_quantity: 0
            }
        );
        assert_eq!(checker.available_quantity(MaterialId(9), jan(1), jan(2)).unwrap(), None);
    }

    #[test]
    fn test_other_materials_are_ignored() {
        let (mut store, id) = tripod_store();
        let other = store.create_material("Kabel", "", 1).unwrap();
        store
            .create_reservation(other.id, 1, jan(1), jan(10), CheckoutId(101))
            .unwrap();

        let checker = AvailabilityChecker::new(&store);
        assert_eq!(checker.committed_quantity(id, jan(1), jan(10)).unwrap(), 3);
    }

    #[test]
    fn test_zero_request_is_always_accepted() {
        let (store, id) = tripod_store();
        let checker = AvailabilityChecker::new(&store);
        assert!(checker.check_and_adjust(id, 0, jan(1), jan(10)).unwrap().accepted);
    }
}
