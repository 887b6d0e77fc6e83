//! Driver selection for the configured supplier to retailer leg.
//!
//! Every located driver is scored in one reduction that tracks two running
//! bests at once: the lowest-scoring capacity-eligible driver and the driver
//! with the shortest total distance. The second one is only used when nobody
//! is eligible.

use rayon::prelude::*;
use tracing::{debug, info};

use crate::error::DispatchError;
use crate::model::{Driver, ShipmentContext};
use crate::traits::{DistanceProvider, DriverStore};

#[derive(Debug, Clone)]
pub struct SelectOptions {
    /// Largest spare capacity a driver may have and still be eligible.
    ///
    /// There is no lower bound: a driver that cannot carry the shipment at all
    /// still passes.
    pub max_headroom: f64,
    /// Weight applied to the total distance (meters) in the score.
    pub distance_weight: f64,
    /// Weight applied to the driver's environment score.
    pub environment_weight: f64,
}

impl Default for SelectOptions {
    fn default() -> Self {
        Self {
            max_headroom: 500.0,
            distance_weight: 4.0,
            environment_weight: 3.0,
        }
    }
}

/// Which rule picked the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionBasis {
    /// Lowest score among capacity-eligible drivers.
    Optimal,
    /// No driver was eligible; shortest total distance among located drivers.
    ClosestFallback,
}

#[derive(Debug, Clone)]
pub struct Selection<'a> {
    pub driver: &'a Driver,
    pub score: f64,
    /// Driver to supplier plus supplier to retailer, in the metric's unit.
    pub total_distance: f64,
    pub basis: SelectionBasis,
}

/// Owned form of a [`Selection`], detached from the snapshot it came from.
#[derive(Debug, Clone)]
pub struct Recommendation {
    pub driver: Driver,
    pub score: f64,
    pub total_distance: f64,
    pub basis: SelectionBasis,
}

impl From<Selection<'_>> for Recommendation {
    fn from(selection: Selection<'_>) -> Self {
        Self {
            driver: selection.driver.clone(),
            score: selection.score,
            total_distance: selection.total_distance,
            basis: selection.basis,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    index: usize,
    score: f64,
    total_distance: f64,
}

#[derive(Debug, Clone, Copy, Default)]
struct Scan {
    eligible: Option<Candidate>,
    closest: Option<Candidate>,
}

impl Scan {
    /// Combine two partial scans. Lower key wins, equal keys fall back to the
    /// lower listing index so the result does not depend on how the work was split.
    fn merge(self, other: Self) -> Self {
        Self {
            eligible: pick(self.eligible, other.eligible, |c| c.score),
            closest: pick(self.closest, other.closest, |c| c.total_distance),
        }
    }
}

fn pick(a: Option<Candidate>, b: Option<Candidate>, key: fn(&Candidate) -> f64) -> Option<Candidate> {
    match (a, b) {
        (Some(a), Some(b)) => {
            let (ka, kb) = (key(&a), key(&b));
            if kb < ka || (kb == ka && b.index < a.index) {
                Some(b)
            } else {
                Some(a)
            }
        }
        (a, None) => a,
        (None, b) => b,
    }
}

fn evaluate<M: DistanceProvider>(
    index: usize,
    driver: &Driver,
    leg_distance: f64,
    shipment: &ShipmentContext,
    options: &SelectOptions,
    metric: &M,
) -> Scan {
    let Some(location) = driver.location else {
        debug!(driver = %driver.id, "skipping driver without a reported location");
        return Scan::default();
    };

    let total_distance = metric.distance(location, shipment.supplier) + leg_distance;
    if total_distance.is_nan() {
        debug!(driver = %driver.id, "skipping driver with unusable coordinates");
        return Scan::default();
    }

    let score = options.distance_weight * total_distance
        + options.environment_weight * driver.environment_score;
    let candidate = Candidate {
        index,
        score,
        total_distance,
    };

    let eligible = driver.headroom(shipment.current_weight) <= options.max_headroom && !score.is_nan();

    Scan {
        eligible: eligible.then_some(candidate),
        closest: Some(candidate),
    }
}

/// Choose the driver to dispatch from a snapshot.
///
/// Returns None when no driver has a location.
pub fn select<'a, M>(
    drivers: &'a [Driver],
    shipment: &ShipmentContext,
    options: &SelectOptions,
    metric: &M,
) -> Option<Selection<'a>>
where
    M: DistanceProvider,
{
    let leg_distance = metric.distance(shipment.supplier, shipment.retailer);

    let scan = drivers
        .par_iter()
        .enumerate()
        .map(|(index, driver)| evaluate(index, driver, leg_distance, shipment, options, metric))
        .reduce(Scan::default, Scan::merge);

    let (best, basis) = match (scan.eligible, scan.closest) {
        (Some(best), _) => (best, SelectionBasis::Optimal),
        (None, Some(closest)) => (closest, SelectionBasis::ClosestFallback),
        (None, None) => return None,
    };

    Some(Selection {
        driver: &drivers[best.index],
        score: best.score,
        total_distance: best.total_distance,
        basis,
    })
}

/// Read one snapshot from the store and select from it.
pub fn recommend<S, M>(
    store: &S,
    shipment: &ShipmentContext,
    options: &SelectOptions,
    metric: &M,
) -> Result<Recommendation, DispatchError>
where
    S: DriverStore + ?Sized,
    M: DistanceProvider,
{
    let drivers = store.list_all()?;
    debug!(drivers = drivers.len(), "evaluating driver snapshot");

    let selection = select(&drivers, shipment, options, metric)
        .ok_or_else(|| DispatchError::NotFound("No suitable drivers found".to_string()))?;

    if selection.basis == SelectionBasis::ClosestFallback {
        info!(
            driver = %selection.driver.id,
            "no capacity-eligible driver, falling back to the closest one"
        );
    }

    Ok(selection.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::haversine::Haversine;
    use crate::model::Coordinates;

    /// Flat metric: |dlat| + |dlng|.
    struct MockMetric;

    impl DistanceProvider for MockMetric {
        fn distance(&self, from: Coordinates, to: Coordinates) -> f64 {
            (from.latitude - to.latitude).abs() + (from.longitude - to.longitude).abs()
        }
    }

    fn driver(id: &str, max_weight: f64, env: f64, location: Option<(f64, f64)>) -> Driver {
        Driver {
            id: id.to_string(),
            location: location.map(|(lat, lng)| Coordinates::new(lat, lng)),
            max_weight,
            environment_score: env,
        }
    }

    fn flat_shipment(current_weight: f64) -> ShipmentContext {
        ShipmentContext {
            supplier: Coordinates::new(0.0, 0.0),
            retailer: Coordinates::new(0.0, 10.0),
            current_weight,
        }
    }

    #[test]
    fn test_reference_scenario_picks_a() {
        let drivers = vec![
            driver("A", 1600.0, 2.0, Some((46.0, 43.0))),
            driver("B", 2000.0, 5.0, Some((26.0, 43.0))),
        ];
        let shipment = ShipmentContext::default();

        let selection = select(&drivers, &shipment, &SelectOptions::default(), &Haversine::default())
            .expect("a driver is selected");

        assert_eq!(selection.driver.id, "A");
        assert_eq!(selection.basis, SelectionBasis::Optimal);
    }

    #[test]
    fn test_score_formula() {
        let drivers = vec![driver("A", 1200.0, 2.5, Some((3.0, 0.0)))];
        let selection = select(&drivers, &flat_shipment(1200.0), &SelectOptions::default(), &MockMetric).unwrap();

        // total = 3 (to supplier) + 10 (leg)
        assert_eq!(selection.total_distance, 13.0);
        assert_eq!(selection.score, 4.0 * 13.0 + 3.0 * 2.5);
    }

    #[test]
    fn test_ineligible_closer_driver_loses_to_eligible() {
        let drivers = vec![
            driver("near-but-roomy", 5000.0, 0.0, Some((0.0, 0.0))),
            driver("far", 1300.0, 0.0, Some((50.0, 0.0))),
        ];
        let selection = select(&drivers, &flat_shipment(1200.0), &SelectOptions::default(), &MockMetric).unwrap();
        assert_eq!(selection.driver.id, "far");
    }

    #[test]
    fn test_headroom_boundary_is_inclusive() {
        let drivers = vec![driver("edge", 1700.0, 0.0, Some((1.0, 0.0)))];
        let selection = select(&drivers, &flat_shipment(1200.0), &SelectOptions::default(), &MockMetric).unwrap();
        assert_eq!(selection.basis, SelectionBasis::Optimal);
    }

    /// The eligibility rule only caps spare capacity. A driver that cannot
    /// carry the shipment at all is still treated as eligible.
    #[test]
    fn test_insufficient_capacity_is_still_eligible() {
        let drivers = vec![
            driver("too-small", 100.0, 0.0, Some((5.0, 0.0))),
            driver("roomy", 9000.0, 0.0, Some((1.0, 0.0))),
        ];
        let selection = select(&drivers, &flat_shipment(1200.0), &SelectOptions::default(), &MockMetric).unwrap();
        assert_eq!(selection.driver.id, "too-small");
        assert_eq!(selection.basis, SelectionBasis::Optimal);
    }

    #[test]
    fn test_fallback_to_closest_with_score() {
        let drivers = vec![
            driver("far", 9000.0, 1.0, Some((40.0, 0.0))),
            driver("near", 9000.0, 7.0, Some((2.0, 0.0))),
            driver("mid", 9000.0, 0.0, Some((5.0, 0.0))),
        ];
        let selection = select(&drivers, &flat_shipment(1200.0), &SelectOptions::default(), &MockMetric).unwrap();

        assert_eq!(selection.driver.id, "near");
        assert_eq!(selection.basis, SelectionBasis::ClosestFallback);
        assert_eq!(selection.score, 4.0 * 12.0 + 3.0 * 7.0);
    }

    #[test]
    fn test_fallback_ties_keep_first_seen() {
        let drivers = vec![
            driver("first", 9000.0, 9.0, Some((2.0, 0.0))),
            driver("second", 9000.0, 0.0, Some((-2.0, 0.0))),
        ];
        let selection = select(&drivers, &flat_shipment(1200.0), &SelectOptions::default(), &MockMetric).unwrap();
        assert_eq!(selection.driver.id, "first");
    }

    #[test]
    fn test_score_ties_keep_first_seen() {
        let drivers = vec![
            driver("first", 1200.0, 1.0, Some((2.0, 0.0))),
            driver("second", 1200.0, 1.0, Some((0.0, -2.0))),
        ];
        let selection = select(&drivers, &flat_shipment(1200.0), &SelectOptions::default(), &MockMetric).unwrap();
        assert_eq!(selection.driver.id, "first");
    }

    #[test]
    fn test_ties_stable_across_large_snapshot() {
        let drivers: Vec<Driver> = (0..10_000)
            .map(|i| driver(&format!("d{}", i), 1200.0, 1.0, Some((1.0, 0.0))))
            .collect();
        let selection = select(&drivers, &flat_shipment(1200.0), &SelectOptions::default(), &MockMetric).unwrap();
        assert_eq!(selection.driver.id, "d0");
    }

    #[test]
    fn test_unlocated_drivers_are_never_selected() {
        let drivers = vec![
            driver("ghost", 1200.0, 0.0, None),
            driver("ghost-roomy", 9000.0, 0.0, None),
            driver("real", 9000.0, 50.0, Some((30.0, 0.0))),
        ];
        let selection = select(&drivers, &flat_shipment(1200.0), &SelectOptions::default(), &MockMetric).unwrap();
        assert_eq!(selection.driver.id, "real");
        assert_eq!(selection.basis, SelectionBasis::ClosestFallback);
    }

    #[test]
    fn test_empty_snapshot() {
        let drivers: Vec<Driver> = Vec::new();
        assert!(select(&drivers, &flat_shipment(1200.0), &SelectOptions::default(), &MockMetric).is_none());
    }

    #[test]
    fn test_no_located_drivers() {
        let drivers = vec![driver("ghost", 1200.0, 0.0, None)];
        assert!(select(&drivers, &flat_shipment(1200.0), &SelectOptions::default(), &MockMetric).is_none());
    }

    #[test]
    fn test_nan_coordinates_never_win() {
        let drivers = vec![
            driver("broken", 1200.0, 0.0, Some((f64::NAN, 0.0))),
            driver("ok", 1200.0, 0.0, Some((9.0, 0.0))),
        ];
        let selection = select(&drivers, &flat_shipment(1200.0), &SelectOptions::default(), &MockMetric).unwrap();
        assert_eq!(selection.driver.id, "ok");
    }

    #[test]
    fn test_nan_location_never_wins_with_haversine() {
        let drivers = vec![
            driver("broken", 1200.0, 0.0, Some((f64::NAN, 43.2))),
            driver("ok", 1200.0, 0.0, Some((40.0, 43.0))),
        ];
        let selection = select(&drivers, &ShipmentContext::default(), &SelectOptions::default(), &Haversine::default())
            .unwrap();
        assert_eq!(selection.driver.id, "ok");
        assert!(selection.total_distance.is_finite());
    }

    #[test]
    fn test_only_nan_located_drivers() {
        let drivers = vec![driver("broken", 1200.0, 0.0, Some((45.0, f64::NAN)))];
        let selection = select(&drivers, &ShipmentContext::default(), &SelectOptions::default(), &Haversine::default());
        assert!(selection.is_none());
    }

    #[test]
    fn test_custom_weights() {
        let options = SelectOptions {
            max_headroom: 500.0,
            distance_weight: 0.0,
            environment_weight: 1.0,
        };
        let drivers = vec![
            driver("close-dirty", 1200.0, 10.0, Some((1.0, 0.0))),
            driver("far-clean", 1200.0, 1.0, Some((60.0, 0.0))),
        ];
        let selection = select(&drivers, &flat_shipment(1200.0), &options, &MockMetric).unwrap();
        assert_eq!(selection.driver.id, "far-clean");
    }
}
