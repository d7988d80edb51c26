//! Asset category reference data: rental rate, purchase price, utilization

use serde::{Deserialize, Serialize};

use crate::error::{ProjectionError, Result};
use crate::scenario::{Scenario, ScenarioTable};

/// One equipment class in a rental division
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetCategory {
    /// Unique key within the division (fleet snapshots refer to this)
    pub key: String,

    /// Display name
    pub name: String,

    /// Optional brand or group tag used for sub-totals
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,

    /// Rental rate per unit per month
    pub monthly_rental_rate: f64,

    /// Purchase price per unit
    pub purchase_price: f64,

    /// Utilization fraction by scenario
    pub utilization: ScenarioTable<f64>,

    /// Annual depreciation rate applied to gross purchase price
    pub depreciation_rate: f64,
}

impl AssetCategory {
    pub fn new(
        key: &str,
        name: &str,
        monthly_rental_rate: f64,
        purchase_price: f64,
        utilization: ScenarioTable<f64>,
        depreciation_rate: f64,
    ) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            group: None,
            monthly_rental_rate,
            purchase_price,
            utilization,
            depreciation_rate,
        }
    }

    /// Tag the category with a brand/group
    pub fn in_group(mut self, group: &str) -> Self {
        self.group = Some(group.to_string());
        self
    }

    /// Utilization fraction for a scenario
    ///
    /// Fails when the category has no entry for the scenario rather than
    /// letting a missing value leak into revenue figures.
    pub fn utilization(&self, scenario: Scenario) -> Result<f64> {
        self.utilization
            .get(scenario)
            .copied()
            .ok_or_else(|| ProjectionError::UtilizationNotConfigured {
                category: self.key.clone(),
                scenario: scenario.to_string(),
            })
    }

    /// Annual depreciation for a unit count
    pub fn annual_depreciation(&self, units: u32) -> f64 {
        self.purchase_price * units as f64 * self.depreciation_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chassis() -> AssetCategory {
        AssetCategory::new(
            "chassis",
            "Chassis",
            2500.0,
            45000.0,
            ScenarioTable::standard(0.85, 0.90, 0.95),
            0.15,
        )
    }

    #[test]
    fn test_utilization_lookup() {
        let category = chassis();
        assert!((category.utilization(Scenario::Aggressive).unwrap() - 0.95).abs() < 1e-12);
    }

    #[test]
    fn test_unconfigured_scenario_is_error() {
        let category = chassis();
        match category.utilization(Scenario::Custom) {
            Err(ProjectionError::UtilizationNotConfigured { category, scenario }) => {
                assert_eq!(category, "chassis");
                assert_eq!(scenario, "custom");
            }
            other => panic!("expected utilization error, got {:?}", other),
        }
    }

    #[test]
    fn test_annual_depreciation() {
        // 10 units * 45,000 * 15%
        assert!((chassis().annual_depreciation(10) - 67_500.0).abs() < 1e-9);
    }
}
