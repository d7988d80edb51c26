//! Rental division configuration: categories, disposal rate and cost buckets
//!
//! A division is data, not code. Adding a new one means supplying another
//! `DivisionConfig` value; the engine has no per-division branches.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::category::AssetCategory;
use crate::error::{ProjectionError, Result};
use crate::fleet::{FleetSnapshot, RevenueSplit, UnitCounts};
use crate::scenario::ScenarioTable;

/// Default lease pricing: 2% of asset value per month
pub const DEFAULT_LEASE_MONTHLY_RATE: f64 = 0.02;

/// Cost bucket name -> fraction of the base amount (revenue or principal)
pub type CostSchedule = BTreeMap<String, f64>;

fn default_lease_monthly_rate() -> f64 {
    DEFAULT_LEASE_MONTHLY_RATE
}

/// Build a cost schedule from (bucket, fraction) pairs
pub fn cost_schedule(buckets: &[(&str, f64)]) -> CostSchedule {
    buckets
        .iter()
        .map(|(name, fraction)| (name.to_string(), *fraction))
        .collect()
}

/// Configuration for one rental division
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DivisionConfig {
    /// Division name, e.g. "transport"
    pub name: String,

    /// Asset categories in display order
    pub categories: Vec<AssetCategory>,

    /// Fraction of fleet value monetized through outright sale each year
    pub disposal_rate: f64,

    /// Lease price as a monthly fraction of purchase price
    #[serde(default = "default_lease_monthly_rate")]
    pub lease_monthly_rate: f64,

    /// Operating cost buckets as fractions of revenue
    pub costs: CostSchedule,

    /// Default fleet used when the caller supplies none
    #[serde(default)]
    pub default_fleet: FleetSnapshot,

    /// Default revenue split
    pub default_split: RevenueSplit,
}

impl DivisionConfig {
    /// Look up a category by key
    pub fn category(&self, key: &str) -> Option<&AssetCategory> {
        self.categories.iter().find(|c| c.key == key)
    }

    /// Distinct group tags in first-seen order
    pub fn groups(&self) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        self.categories
            .iter()
            .filter_map(|c| c.group.as_deref())
            .filter(|g| seen.insert(*g))
            .collect()
    }

    /// (category key, purchase price) pairs for capital calculations
    pub fn unit_prices(&self) -> Vec<(&str, f64)> {
        self.categories
            .iter()
            .map(|c| (c.key.as_str(), c.purchase_price))
            .collect()
    }

    /// Reject fleets that mention categories this division does not define
    pub fn check_fleet(&self, fleet: &FleetSnapshot) -> Result<()> {
        for key in fleet.category_keys() {
            if self.category(key).is_none() {
                return Err(ProjectionError::UnknownCategory {
                    division: self.name.clone(),
                    category: key.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Structural checks run when configuration is loaded
    pub fn validate(&self) -> Result<()> {
        let mut keys = BTreeSet::new();
        for category in &self.categories {
            if !keys.insert(category.key.as_str()) {
                return Err(ProjectionError::invalid_config(format!(
                    "duplicate category '{}' in division '{}'",
                    category.key, self.name
                )));
            }
            let numbers = [
                category.monthly_rental_rate,
                category.purchase_price,
                category.depreciation_rate,
            ];
            if numbers.iter().any(|v| !v.is_finite() || *v < 0.0) {
                return Err(ProjectionError::invalid_config(format!(
                    "category '{}' in division '{}' has a negative or non-finite rate",
                    category.key, self.name
                )));
            }
        }
        if self.costs.values().any(|f| !f.is_finite()) {
            return Err(ProjectionError::invalid_config(format!(
                "non-finite cost fraction in division '{}'",
                self.name
            )));
        }
        self.check_fleet(&self.default_fleet)
    }

    /// Truck and trailer rental division
    pub fn transport() -> Self {
        let util = |c, m, a| ScenarioTable::standard(c, m, a);
        Self {
            name: "transport".to_string(),
            categories: vec![
                AssetCategory::new("chassis", "Chassis", 2500.0, 45000.0, util(0.85, 0.90, 0.95), 0.15),
                AssetCategory::new("dryVan", "Dry Van", 1800.0, 35000.0, util(0.85, 0.92, 1.00), 0.12),
                AssetCategory::new("flatbed", "Flatbed Trailer", 1600.0, 32000.0, util(0.85, 0.90, 0.95), 0.12),
                AssetCategory::new("reefer", "Refrigerated Trailer", 2200.0, 55000.0, util(0.85, 0.90, 0.95), 0.18),
            ],
            disposal_rate: 0.10,
            lease_monthly_rate: DEFAULT_LEASE_MONTHLY_RATE,
            costs: cost_schedule(&[
                ("maintenance", 0.08),
                ("insurance", 0.03),
                ("storage", 0.02),
                ("administrative", 0.05),
            ]),
            default_fleet: FleetSnapshot::from_rows(&[
                (2025, &[("chassis", 60), ("dryVan", 180), ("flatbed", 50), ("reefer", 60)]),
                (2026, &[("chassis", 80), ("dryVan", 240), ("flatbed", 70), ("reefer", 80)]),
                (2027, &[("chassis", 100), ("dryVan", 300), ("flatbed", 85), ("reefer", 100)]),
                (2028, &[("chassis", 120), ("dryVan", 360), ("flatbed", 100), ("reefer", 120)]),
                (2029, &[("chassis", 140), ("dryVan", 420), ("flatbed", 115), ("reefer", 140)]),
                (2030, &[("chassis", 160), ("dryVan", 480), ("flatbed", 130), ("reefer", 160)]),
            ]),
            default_split: RevenueSplit::new(70.0, 20.0, 10.0),
        }
    }

    /// Multi-brand construction equipment rental division
    pub fn construction() -> Self {
        let std_util = || ScenarioTable::standard(0.70, 0.80, 0.90);
        Self {
            name: "construction".to_string(),
            categories: vec![
                AssetCategory::new("sdlg_excavators", "SDLG Excavators", 12000.0, 180000.0, std_util(), 0.15).in_group("sdlg"),
                AssetCategory::new("sdlg_loaders", "SDLG Wheel Loaders", 10000.0, 150000.0, std_util(), 0.15).in_group("sdlg"),
                AssetCategory::new("sdlg_dozers", "SDLG Dozers", 15000.0, 250000.0, std_util(), 0.15).in_group("sdlg"),
                AssetCategory::new("chl_loaders", "CHL Loaders", 9000.0, 140000.0, std_util(), 0.15).in_group("chl"),
                AssetCategory::new("chl_backhoes", "CHL Backhoes", 8000.0, 120000.0, std_util(), 0.15).in_group("chl"),
                AssetCategory::new("xcmg_cranes", "XCMG Cranes", 30000.0, 600000.0, ScenarioTable::standard(0.75, 0.85, 0.95), 0.12).in_group("xcmg"),
                AssetCategory::new("xcmg_roadMachinery", "XCMG Road Machinery", 18000.0, 350000.0, std_util(), 0.15).in_group("xcmg"),
            ],
            disposal_rate: 0.08,
            lease_monthly_rate: DEFAULT_LEASE_MONTHLY_RATE,
            costs: cost_schedule(&[
                ("maintenance", 0.12),
                ("insurance", 0.04),
                ("storage", 0.03),
                ("administrative", 0.06),
            ]),
            default_fleet: construction_fleet(),
            default_split: RevenueSplit::new(60.0, 25.0, 15.0),
        }
    }
}

fn construction_fleet() -> FleetSnapshot {
    let keys = [
        "sdlg_excavators",
        "sdlg_loaders",
        "sdlg_dozers",
        "chl_loaders",
        "chl_backhoes",
        "xcmg_cranes",
        "xcmg_roadMachinery",
    ];
    let rows: [(u32, [u32; 7]); 6] = [
        (2025, [8, 6, 4, 5, 6, 3, 5]),
        (2026, [12, 9, 6, 8, 9, 5, 8]),
        (2027, [16, 12, 8, 11, 12, 7, 11]),
        (2028, [20, 15, 10, 14, 15, 9, 14]),
        (2029, [24, 18, 12, 17, 18, 11, 17]),
        (2030, [28, 21, 14, 20, 21, 13, 20]),
    ];

    let mut fleet = FleetSnapshot::new();
    for (year, units) in rows {
        let counts: UnitCounts = keys
            .iter()
            .zip(units)
            .map(|(k, u)| (k.to_string(), u))
            .collect();
        fleet.insert_year(year, counts);
    }
    fleet
}
