//! Growth scenarios and the scenario runner for batch projections
//!
//! Pre-loads assumptions once, then runs the engine for as many scenarios as
//! needed without re-reading configuration files.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use log::info;
use serde::{Deserialize, Serialize};

use crate::assumptions::Assumptions;
use crate::error::{ProjectionError, Result};
use crate::fleet::FleetSnapshot;
use crate::projection::{
    CombinedProjectionResult, DivisionInput, PortfolioInput, ProjectionConfig, ProjectionEngine,
    ProjectionResult,
};

/// Named assumption set selecting utilization and growth parameters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    Conservative,
    #[default]
    Moderate,
    Aggressive,
    Custom,
}

impl Scenario {
    /// Every scenario in display order
    pub const ALL: [Scenario; 4] = [
        Scenario::Conservative,
        Scenario::Moderate,
        Scenario::Aggressive,
        Scenario::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Scenario::Conservative => "conservative",
            Scenario::Moderate => "moderate",
            Scenario::Aggressive => "aggressive",
            Scenario::Custom => "custom",
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scenario {
    type Err = ProjectionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "conservative" => Ok(Scenario::Conservative),
            "moderate" => Ok(Scenario::Moderate),
            "aggressive" => Ok(Scenario::Aggressive),
            "custom" => Ok(Scenario::Custom),
            _ => Err(ProjectionError::UnknownScenario(s.to_string())),
        }
    }
}

/// Per-scenario values where any scenario may be left unconfigured
///
/// Lookups return `None` for a missing entry; callers turn that into an
/// error instead of substituting a default. Missing JSON fields read as
/// `None`, so `T` needs no `Default`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioTable<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conservative: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moderate: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggressive: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom: Option<T>,
}

impl<T> ScenarioTable<T> {
    /// Table with the three standard scenarios set and `custom` left empty
    pub fn standard(conservative: T, moderate: T, aggressive: T) -> Self {
        Self {
            conservative: Some(conservative),
            moderate: Some(moderate),
            aggressive: Some(aggressive),
            custom: None,
        }
    }

    pub fn get(&self, scenario: Scenario) -> Option<&T> {
        match scenario {
            Scenario::Conservative => self.conservative.as_ref(),
            Scenario::Moderate => self.moderate.as_ref(),
            Scenario::Aggressive => self.aggressive.as_ref(),
            Scenario::Custom => self.custom.as_ref(),
        }
    }

    pub fn set(&mut self, scenario: Scenario, value: T) {
        let slot = match scenario {
            Scenario::Conservative => &mut self.conservative,
            Scenario::Moderate => &mut self.moderate,
            Scenario::Aggressive => &mut self.aggressive,
            Scenario::Custom => &mut self.custom,
        };
        *slot = Some(value);
    }

    /// Scenarios that have a value, in display order
    pub fn configured(&self) -> Vec<Scenario> {
        Scenario::ALL
            .iter()
            .copied()
            .filter(|s| self.get(*s).is_some())
            .collect()
    }
}

impl<T> Default for ScenarioTable<T> {
    fn default() -> Self {
        Self {
            conservative: None,
            moderate: None,
            aggressive: None,
            custom: None,
        }
    }
}

/// Where the runner takes fleet unit counts from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FleetSource {
    /// Each division's configured default fleet
    #[default]
    Configured,
    /// Base year of the default fleet compounded at the scenario growth rate
    ScenarioGrowth,
}

/// Pre-loaded scenario runner for batch projections
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::new();
///
/// for scenario in [Scenario::Conservative, Scenario::Aggressive] {
///     let result = runner.run_fleet(scenario, FleetSource::Configured)?;
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    /// Pre-loaded base assumptions
    base_assumptions: Assumptions,

    /// Engine configuration shared by every run
    config: ProjectionConfig,
}

impl ScenarioRunner {
    /// Create runner with the built-in default assumptions
    pub fn new() -> Self {
        Self::with_assumptions(Assumptions::default_pricing())
    }

    /// Create runner by loading assumptions from a JSON file
    pub fn from_json_path(path: &Path) -> Result<Self> {
        Ok(Self::with_assumptions(Assumptions::from_json_path(path)?))
    }

    /// Create runner with pre-built assumptions
    pub fn with_assumptions(assumptions: Assumptions) -> Self {
        Self {
            base_assumptions: assumptions,
            config: ProjectionConfig::default(),
        }
    }

    /// Replace the engine configuration used by later runs
    pub fn with_config(mut self, config: ProjectionConfig) -> Self {
        self.config = config;
        self
    }

    fn engine(&self) -> ProjectionEngine {
        ProjectionEngine::new(self.base_assumptions.clone(), self.config.clone())
    }

    /// Fleets for every configured division under the given source
    pub fn fleets(&self, scenario: Scenario, source: FleetSource) -> Result<Vec<FleetSnapshot>> {
        let assumptions = &self.base_assumptions;
        match source {
            FleetSource::Configured => Ok(assumptions
                .divisions
                .iter()
                .map(|d| d.default_fleet.clone())
                .collect()),
            FleetSource::ScenarioGrowth => {
                let growth = assumptions.scenario_parameters(scenario)?.growth_rate;
                let base_year = assumptions.first_year()?;
                Ok(assumptions
                    .divisions
                    .iter()
                    .map(|d| {
                        let base = d.default_fleet.year(base_year).cloned().unwrap_or_default();
                        FleetSnapshot::from_growth(&base, &assumptions.years, growth)
                    })
                    .collect())
            }
        }
    }

    /// Run the combined projection of all configured divisions
    pub fn run_fleet(&self, scenario: Scenario, source: FleetSource) -> Result<CombinedProjectionResult> {
        let fleets = self.fleets(scenario, source)?;
        let inputs: Vec<DivisionInput<'_>> = self
            .base_assumptions
            .divisions
            .iter()
            .zip(fleets.iter())
            .map(|(division, fleet)| DivisionInput::new(division, fleet, division.default_split))
            .collect();

        let result = self.engine().project_combined(&inputs, scenario)?;
        info!(
            "scenario {}: combined revenue {:.2}, NPV {:.2}",
            scenario, result.combined.totals.revenue, result.combined.valuation.npv
        );
        Ok(result)
    }

    /// Run the lending portfolio projection on the configured default portfolio
    pub fn run_portfolio(&self, scenario: Scenario) -> Result<ProjectionResult> {
        let finance = &self.base_assumptions.finance;
        let input = PortfolioInput::new(finance, &finance.default_portfolio);
        self.engine().project_portfolio(&input, scenario)
    }

    /// Run the combined fleet projection for several scenarios
    pub fn run_scenarios(
        &self,
        scenarios: &[Scenario],
        source: FleetSource,
    ) -> Vec<(Scenario, Result<CombinedProjectionResult>)> {
        scenarios
            .iter()
            .map(|&scenario| (scenario, self.run_fleet(scenario, source)))
            .collect()
    }

    /// Get reference to base assumptions for inspection
    pub fn assumptions(&self) -> &Assumptions {
        &self.base_assumptions
    }

    /// Get mutable reference to base assumptions for customization
    pub fn assumptions_mut(&mut self) -> &mut Assumptions {
        &mut self.base_assumptions
    }
}

impl Default for ScenarioRunner {
    fn default() -> Self {
        Self::new()
    }
}
