//! Fleet snapshots and revenue splits supplied by the caller

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Category key -> unit count for a single year
pub type UnitCounts = BTreeMap<String, u32>;

/// Unit counts by projection year and category key
///
/// Years or categories that are absent read as zero units. Counts are
/// unsigned, so negative input has to be resolved before it gets here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FleetSnapshot {
    years: BTreeMap<u32, UnitCounts>,
}

impl FleetSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from (year, [(category, units)]) rows
    pub fn from_rows(rows: &[(u32, &[(&str, u32)])]) -> Self {
        let mut fleet = Self::new();
        for (year, counts) in rows {
            for (key, units) in counts.iter() {
                fleet.set_units(*year, key, *units);
            }
        }
        fleet
    }

    /// Compound a base-year fleet forward at a flat growth rate
    ///
    /// Year index `t` (0 for the first year) gets `floor(base * (1 + g)^t)`
    /// units per category.
    pub fn from_growth(base: &UnitCounts, years: &[u32], growth_rate: f64) -> Self {
        let mut fleet = Self::new();
        for (t, &year) in years.iter().enumerate() {
            let factor = (1.0 + growth_rate).powi(t as i32);
            let counts = base
                .iter()
                .map(|(key, &units)| {
                    let grown = (units as f64 * factor).floor();
                    let grown = if grown.is_finite() && grown > 0.0 {
                        grown.min(u32::MAX as f64) as u32
                    } else {
                        0
                    };
                    (key.clone(), grown)
                })
                .collect();
            fleet.insert_year(year, counts);
        }
        fleet
    }

    /// Replace all counts for a year
    pub fn insert_year(&mut self, year: u32, counts: UnitCounts) {
        self.years.insert(year, counts);
    }

    pub fn set_units(&mut self, year: u32, key: &str, units: u32) {
        self.years
            .entry(year)
            .or_default()
            .insert(key.to_string(), units);
    }

    /// Unit count for a year and category (0 when missing)
    pub fn units(&self, year: u32, key: &str) -> u32 {
        self.years
            .get(&year)
            .and_then(|counts| counts.get(key))
            .copied()
            .unwrap_or(0)
    }

    /// Counts for one year, if any were supplied
    pub fn year(&self, year: u32) -> Option<&UnitCounts> {
        self.years.get(&year)
    }

    /// Years that have an entry, ascending
    pub fn years(&self) -> impl Iterator<Item = u32> + '_ {
        self.years.keys().copied()
    }

    /// Every category key mentioned in any year
    pub fn category_keys(&self) -> BTreeSet<&str> {
        self.years
            .values()
            .flat_map(|counts| counts.keys().map(String::as_str))
            .collect()
    }

    pub fn total_units(&self, year: u32) -> u64 {
        self.year(year)
            .map(|counts| counts.values().map(|&u| u as u64).sum())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.years.values().all(|counts| counts.values().all(|&u| u == 0))
    }
}

/// Percentages of fleet value routed to rental, lease and sale
///
/// The three parts are expected to sum to 100 but this is not enforced:
/// other sums simply scale the output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RevenueSplit {
    pub rental: f64,
    pub lease: f64,
    pub sale: f64,
}

impl RevenueSplit {
    pub fn new(rental: f64, lease: f64, sale: f64) -> Self {
        Self { rental, lease, sale }
    }

    pub fn total(&self) -> f64 {
        self.rental + self.lease + self.sale
    }

    /// Whether the parts add up to 100 percent
    pub fn is_normalized(&self) -> bool {
        (self.total() - 100.0).abs() < 1e-9
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_entries_read_as_zero() {
        let mut fleet = FleetSnapshot::new();
        fleet.set_units(2025, "chassis", 12);

        assert_eq!(fleet.units(2025, "chassis"), 12);
        assert_eq!(fleet.units(2025, "reefer"), 0);
        assert_eq!(fleet.units(2031, "chassis"), 0);
        assert!(fleet.year(2031).is_none());
    }

    #[test]
    fn test_growth_compounds_and_floors() {
        let base: UnitCounts = [("chassis".to_string(), 60), ("reefer".to_string(), 7)]
            .into_iter()
            .collect();
        let fleet = FleetSnapshot::from_growth(&base, &[2025, 2026, 2027], 0.10);

        assert_eq!(fleet.units(2025, "chassis"), 60);
        assert_eq!(fleet.units(2026, "chassis"), 66);
        // 7 * 1.21 = 8.47
        assert_eq!(fleet.units(2027, "reefer"), 8);
    }

    #[test]
    fn test_growth_with_total_decline_clamps_at_zero() {
        let base: UnitCounts = [("chassis".to_string(), 10)].into_iter().collect();
        let fleet = FleetSnapshot::from_growth(&base, &[2025, 2026], -1.5);
        assert_eq!(fleet.units(2026, "chassis"), 0);
    }

    #[test]
    fn test_split_normalization_check() {
        assert!(RevenueSplit::new(70.0, 20.0, 10.0).is_normalized());
        assert!(!RevenueSplit::new(70.0, 20.0, 40.0).is_normalized());
    }

    #[test]
    fn test_snapshot_json_uses_year_keys() {
        let fleet = FleetSnapshot::from_rows(&[(2025, &[("chassis", 3)])]);
        let json = serde_json::to_string(&fleet).unwrap();
        assert_eq!(json, r#"{"2025":{"chassis":3}}"#);
        let back: FleetSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, fleet);
    }

    #[test]
    fn test_category_keys_and_totals() {
        let fleet = FleetSnapshot::from_rows(&[
            (2025, &[("chassis", 3), ("reefer", 2)]),
            (2026, &[("flatbed", 1)]),
        ]);
        let keys: Vec<&str> = fleet.category_keys().into_iter().collect();
        assert_eq!(keys, vec!["chassis", "flatbed", "reefer"]);
        assert_eq!(fleet.years().collect::<Vec<_>>(), vec![2025, 2026]);
        assert_eq!(fleet.total_units(2025), 5);
        assert!(!fleet.is_empty());
    }
}
