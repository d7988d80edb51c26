//! Projection assumptions: years, financial constants, scenarios, divisions

mod category;
mod division;
mod finance;
pub mod loader;

pub use category::AssetCategory;
pub use division::{cost_schedule, CostSchedule, DivisionConfig, DEFAULT_LEASE_MONTHLY_RATE};
pub use finance::{FinanceConfig, LoanProduct};

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ProjectionError, Result};
use crate::scenario::{Scenario, ScenarioTable};

/// Corporate-level financial constants used by cash flow and valuation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialAssumptions {
    /// Flat corporate tax rate applied to EBIT
    pub tax_rate: f64,

    /// Discount rate for NPV
    pub discount_rate: f64,

    /// Exit multiple applied to final-year EBITDA for terminal value
    pub ebitda_multiple: f64,
}

impl Default for FinancialAssumptions {
    fn default() -> Self {
        Self {
            tax_rate: 0.27,
            discount_rate: 0.12,
            ebitda_multiple: 8.0,
        }
    }
}

/// Growth assumptions attached to a scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioParameters {
    pub description: String,
    /// Annual fleet growth rate used when generating fleets
    pub growth_rate: f64,
}

impl ScenarioParameters {
    fn new(description: &str, growth_rate: f64) -> Self {
        Self {
            description: description.to_string(),
            growth_rate,
        }
    }
}

/// Container for all projection assumptions
///
/// Immutable once built; the engine receives it by value and never reads
/// configuration from anywhere else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assumptions {
    /// Contiguous ascending projection years
    pub years: Vec<u32>,

    pub financial: FinancialAssumptions,

    pub scenarios: ScenarioTable<ScenarioParameters>,

    /// Rental divisions combined into the fleet business
    pub divisions: Vec<DivisionConfig>,

    /// Lending portfolio
    pub finance: FinanceConfig,
}

impl Assumptions {
    /// Create assumptions with the built-in default values
    pub fn default_pricing() -> Self {
        Self {
            years: (2025..=2030).collect(),
            financial: FinancialAssumptions::default(),
            scenarios: ScenarioTable {
                conservative: Some(ScenarioParameters::new("Lower growth, higher stability", 0.10)),
                moderate: Some(ScenarioParameters::new("Balanced growth and risk", 0.15)),
                aggressive: Some(ScenarioParameters::new("High growth, higher risk", 0.25)),
                custom: Some(ScenarioParameters::new("User-defined parameters", 0.15)),
            },
            divisions: vec![DivisionConfig::transport(), DivisionConfig::construction()],
            finance: FinanceConfig::equipment_finance(),
        }
    }

    /// Load and validate assumptions from a JSON file
    pub fn from_json_path(path: &Path) -> Result<Self> {
        let assumptions = loader::load_assumptions(path)?;
        assumptions.validate()?;
        Ok(assumptions)
    }

    /// Structural checks: year sequence, unique keys, finite rates
    pub fn validate(&self) -> Result<()> {
        validate_years(&self.years)?;

        let fin = &self.financial;
        if [fin.tax_rate, fin.discount_rate, fin.ebitda_multiple]
            .iter()
            .any(|v| !v.is_finite())
        {
            return Err(ProjectionError::invalid_config("non-finite financial assumption"));
        }

        for (i, division) in self.divisions.iter().enumerate() {
            if self.divisions[..i].iter().any(|d| d.name == division.name) {
                return Err(ProjectionError::invalid_config(format!(
                    "duplicate division '{}'",
                    division.name
                )));
            }
            division.validate()?;
        }
        self.finance.validate()
    }

    /// Look up a rental division by name
    pub fn division(&self, name: &str) -> Result<&DivisionConfig> {
        self.divisions
            .iter()
            .find(|d| d.name == name)
            .ok_or_else(|| ProjectionError::UnknownDivision(name.to_string()))
    }

    /// Growth parameters for a scenario
    pub fn scenario_parameters(&self, scenario: Scenario) -> Result<&ScenarioParameters> {
        self.scenarios
            .get(scenario)
            .ok_or_else(|| ProjectionError::ScenarioNotConfigured(scenario.to_string()))
    }

    pub fn first_year(&self) -> Result<u32> {
        self.years
            .first()
            .copied()
            .ok_or_else(|| ProjectionError::InvalidYears("no projection years".to_string()))
    }
}

impl Default for Assumptions {
    fn default() -> Self {
        Self::default_pricing()
    }
}

/// Years must be non-empty, ascending and step by exactly one
pub fn validate_years(years: &[u32]) -> Result<()> {
    if years.is_empty() {
        return Err(ProjectionError::InvalidYears("no projection years".to_string()));
    }
    for pair in years.windows(2) {
        if pair[0].checked_add(1) != Some(pair[1]) {
            return Err(ProjectionError::InvalidYears(format!(
                "{} is followed by {}",
                pair[0], pair[1]
            )));
        }
    }
    Ok(())
}
