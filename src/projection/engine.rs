//! Core projection engine for yearly division, combined and portfolio projections

use std::collections::BTreeMap;

use log::{debug, warn};

use super::capital::{capital_requirements, CapitalBaseline};
use super::cashflows::{
    CombinedProjectionResult, FreeCashFlow, OperatingExpenses, ProjectionResult, ProjectionTotals,
    RevenueBreakdown, YearlyProjection,
};
use super::depreciation::depreciation_schedule;
use super::ebitda::Ebitda;
use super::irr::IrrOptions;
use super::opex::operating_expenses;
use super::portfolio::portfolio_year;
use super::revenue::division_year_revenue;
use super::valuation::calculate_valuation;
use crate::assumptions::{validate_years, Assumptions, CostSchedule, DivisionConfig, FinanceConfig};
use crate::error::Result;
use crate::fleet::{FleetSnapshot, RevenueSplit};
use crate::scenario::Scenario;

/// Label of the summed result in a combined projection
pub const COMBINED_LABEL: &str = "combined";

/// Configuration for a projection run
#[derive(Debug, Clone)]
pub struct ProjectionConfig {
    /// Newton-Raphson settings for the valuation IRR
    pub irr: IrrOptions,

    /// Whether to keep per-category rows on each year
    pub detailed_output: bool,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            irr: IrrOptions::default(),
            detailed_output: true,
        }
    }
}

/// Everything needed to project one rental division
#[derive(Debug, Clone)]
pub struct DivisionInput<'a> {
    pub division: &'a DivisionConfig,
    pub fleet: &'a FleetSnapshot,
    pub split: RevenueSplit,
    /// Replacement fractions for individual cost buckets
    pub cost_overrides: CostSchedule,
    pub baseline: CapitalBaseline,
    /// Working capital change by year, 0 when absent
    pub working_capital: BTreeMap<u32, f64>,
}

impl<'a> DivisionInput<'a> {
    pub fn new(division: &'a DivisionConfig, fleet: &'a FleetSnapshot, split: RevenueSplit) -> Self {
        Self {
            division,
            fleet,
            split,
            cost_overrides: CostSchedule::new(),
            baseline: CapitalBaseline::Empty,
            working_capital: BTreeMap::new(),
        }
    }

    pub fn with_cost_overrides(mut self, overrides: CostSchedule) -> Self {
        self.cost_overrides = overrides;
        self
    }

    pub fn with_baseline(mut self, baseline: CapitalBaseline) -> Self {
        self.baseline = baseline;
        self
    }

    pub fn with_working_capital(mut self, working_capital: BTreeMap<u32, f64>) -> Self {
        self.working_capital = working_capital;
        self
    }
}

/// Everything needed to project a lending portfolio
#[derive(Debug, Clone)]
pub struct PortfolioInput<'a> {
    pub finance: &'a FinanceConfig,
    /// Contract counts by year and product key
    pub portfolio: &'a FleetSnapshot,
    pub baseline: CapitalBaseline,
    pub working_capital: BTreeMap<u32, f64>,
}

impl<'a> PortfolioInput<'a> {
    pub fn new(finance: &'a FinanceConfig, portfolio: &'a FleetSnapshot) -> Self {
        Self {
            finance,
            portfolio,
            baseline: CapitalBaseline::Empty,
            working_capital: BTreeMap::new(),
        }
    }

    pub fn with_baseline(mut self, baseline: CapitalBaseline) -> Self {
        self.baseline = baseline;
        self
    }

    pub fn with_working_capital(mut self, working_capital: BTreeMap<u32, f64>) -> Self {
        self.working_capital = working_capital;
        self
    }
}

/// Main projection engine
///
/// Stateless apart from its immutable assumptions: every call builds a fresh
/// result from its inputs.
pub struct ProjectionEngine {
    assumptions: Assumptions,
    config: ProjectionConfig,
}

impl ProjectionEngine {
    /// Create a new projection engine with given assumptions and config
    pub fn new(assumptions: Assumptions, config: ProjectionConfig) -> Self {
        Self { assumptions, config }
    }

    pub fn assumptions(&self) -> &Assumptions {
        &self.assumptions
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Run projection for a single rental division
    pub fn project_division(&self, input: &DivisionInput<'_>, scenario: Scenario) -> Result<ProjectionResult> {
        let division = input.division;
        let years = &self.assumptions.years;
        validate_years(years)?;
        division.check_fleet(input.fleet)?;

        if !input.split.is_normalized() {
            warn!(
                "{} revenue split sums to {} rather than 100; revenue scales accordingly",
                division.name,
                input.split.total()
            );
        }

        let depreciation = depreciation_schedule(division, input.fleet, years);
        let capital = capital_requirements(&division.unit_prices(), input.fleet, years, &input.baseline);

        let mut rows = Vec::with_capacity(years.len());
        for (i, &year) in years.iter().enumerate() {
            let revenue = division_year_revenue(division, input.fleet.year(year), &input.split, scenario)?;
            let opex = operating_expenses(
                revenue.total.total,
                &division.costs,
                &input.cost_overrides,
                &division.name,
            )?;
            let working_capital = input.working_capital.get(&year).copied().unwrap_or(0.0);

            let mut row = self.year_row(year, revenue.total, opex, depreciation[i], capital[i], working_capital);
            row.categories = revenue.categories;
            debug!(
                "{} {}: revenue {:.2}, EBITDA {:.2}, FCF {:.2}",
                division.name, year, row.revenue.total, row.ebitda.value, row.cash_flow.fcf
            );
            rows.push(row);
        }

        let (by_category, by_group) = aggregate_categories(&rows);
        Ok(self.finish(&division.name, scenario, rows, by_category, by_group))
    }

    /// Run every division under one scenario and sum them year by year
    ///
    /// EBITDA, FCF and valuation of the combined result are computed from the
    /// summed revenue, costs, depreciation and capital, not by adding the
    /// divisions' valuations.
    pub fn project_combined(
        &self,
        inputs: &[DivisionInput<'_>],
        scenario: Scenario,
    ) -> Result<CombinedProjectionResult> {
        let divisions = inputs
            .iter()
            .map(|input| self.project_division(input, scenario))
            .collect::<Result<Vec<_>>>()?;

        let years = &self.assumptions.years;
        let mut rows = Vec::with_capacity(years.len());
        for (i, &year) in years.iter().enumerate() {
            let mut revenue = RevenueBreakdown::default();
            let mut opex = OperatingExpenses::default();
            let mut depreciation = 0.0;
            let mut capital = 0.0;
            let mut working_capital = 0.0;
            let mut categories = Vec::new();

            for division in &divisions {
                let d = &division.years[i];
                revenue.add(&d.revenue);
                opex.merge(&d.operating_expenses);
                depreciation += d.depreciation;
                capital += d.capital_requirement;
                working_capital += d.cash_flow.working_capital_change;
                categories.extend(d.categories.iter().cloned());
            }

            let mut row = self.year_row(year, revenue, opex, depreciation, capital, working_capital);
            row.categories = categories;
            rows.push(row);
        }

        let mut by_category = BTreeMap::new();
        let mut by_group = BTreeMap::new();
        for division in &divisions {
            merge_totals(&mut by_category, &division.revenue_by_category);
            merge_totals(&mut by_group, &division.revenue_by_group);
        }

        let combined = self.finish(COMBINED_LABEL, scenario, rows, by_category, by_group);
        Ok(CombinedProjectionResult { combined, divisions })
    }

    /// Run projection for a lending portfolio
    ///
    /// Interest replaces the rental streams, there is no depreciation, and
    /// capital is the principal of net new contracts.
    pub fn project_portfolio(&self, input: &PortfolioInput<'_>, scenario: Scenario) -> Result<ProjectionResult> {
        let finance = input.finance;
        let years = &self.assumptions.years;
        validate_years(years)?;
        self.assumptions.scenario_parameters(scenario)?;
        finance.check_portfolio(input.portfolio)?;

        let capital = capital_requirements(&finance.unit_prices(), input.portfolio, years, &input.baseline);

        let mut rows = Vec::with_capacity(years.len());
        for (i, &year) in years.iter().enumerate() {
            let book = portfolio_year(finance, input.portfolio.year(year))?;
            let working_capital = input.working_capital.get(&year).copied().unwrap_or(0.0);

            let mut row = self.year_row(year, book.revenue, book.operating_expenses, 0.0, capital[i], working_capital);
            row.categories = book.products;
            debug!(
                "{} {}: interest {:.2}, EBITDA {:.2}, FCF {:.2}",
                finance.name, year, row.revenue.total, row.ebitda.value, row.cash_flow.fcf
            );
            rows.push(row);
        }

        let (by_category, by_group) = aggregate_categories(&rows);
        Ok(self.finish(&finance.name, scenario, rows, by_category, by_group))
    }

    /// Derive EBITDA and free cash flow for one year
    fn year_row(
        &self,
        year: u32,
        revenue: RevenueBreakdown,
        operating_expenses: OperatingExpenses,
        depreciation: f64,
        capital_requirement: f64,
        working_capital_change: f64,
    ) -> YearlyProjection {
        let ebitda = Ebitda::calculate(revenue.total, operating_expenses.total);
        let cash_flow = FreeCashFlow::calculate(
            ebitda.value,
            depreciation,
            self.assumptions.financial.tax_rate,
            capital_requirement,
            working_capital_change,
        );

        YearlyProjection {
            year,
            revenue,
            categories: Vec::new(),
            operating_expenses,
            ebitda,
            depreciation,
            capital_requirement,
            cash_flow,
        }
    }

    fn finish(
        &self,
        label: &str,
        scenario: Scenario,
        mut years: Vec<YearlyProjection>,
        revenue_by_category: BTreeMap<String, f64>,
        revenue_by_group: BTreeMap<String, f64>,
    ) -> ProjectionResult {
        let totals = ProjectionTotals::from_years(&years);
        let valuation = calculate_valuation(&years, &self.assumptions.financial, &self.config.irr);

        if !self.config.detailed_output {
            for year in &mut years {
                year.categories.clear();
            }
        }

        ProjectionResult {
            label: label.to_string(),
            scenario,
            years,
            totals,
            revenue_by_category,
            revenue_by_group,
            valuation,
        }
    }
}

/// Whole-run revenue by category key and by group tag
fn aggregate_categories(years: &[YearlyProjection]) -> (BTreeMap<String, f64>, BTreeMap<String, f64>) {
    let mut by_category = BTreeMap::new();
    let mut by_group = BTreeMap::new();

    for category in years.iter().flat_map(|y| y.categories.iter()) {
        *by_category.entry(category.key.clone()).or_insert(0.0) += category.revenue.total;
        if let Some(group) = &category.group {
            *by_group.entry(group.clone()).or_insert(0.0) += category.revenue.total;
        }
    }

    (by_category, by_group)
}

fn merge_totals(into: &mut BTreeMap<String, f64>, from: &BTreeMap<String, f64>) {
    for (key, value) in from {
        *into.entry(key.clone()).or_insert(0.0) += value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::cost_schedule;
    use crate::error::ProjectionError;
    use crate::fleet::UnitCounts;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    const TRANSPORT_KEYS: [&str; 4] = ["chassis", "dryVan", "flatbed", "reefer"];

    fn engine() -> ProjectionEngine {
        ProjectionEngine::new(Assumptions::default_pricing(), ProjectionConfig::default())
    }

    fn transport_fleet(counts: &[Vec<u32>]) -> FleetSnapshot {
        let mut fleet = FleetSnapshot::new();
        for (year, row) in (2025u32..).zip(counts) {
            let units: UnitCounts = TRANSPORT_KEYS
                .iter()
                .zip(row)
                .map(|(k, u)| (k.to_string(), *u))
                .collect();
            fleet.insert_year(year, units);
        }
        fleet
    }

    #[test]
    fn test_default_transport_projection() {
        let engine = engine();
        let division = DivisionConfig::transport();
        let input = DivisionInput::new(&division, &division.default_fleet, division.default_split);
        let result = engine.project_division(&input, Scenario::Moderate).unwrap();

        assert_eq!(result.label, "transport");
        assert_eq!(result.years.len(), 6);
        assert_eq!(result.years[0].categories.len(), 4);

        // First year buys the whole fleet
        let first = &result.years[0];
        let expected_capital = 45_000.0 * 60.0 + 35_000.0 * 180.0 + 32_000.0 * 50.0 + 55_000.0 * 60.0;
        assert_relative_eq!(first.capital_requirement, expected_capital, max_relative = 1e-12);

        // Opex is 18% of revenue for transport
        assert_relative_eq!(
            first.operating_expenses.total,
            first.revenue.total * 0.18,
            max_relative = 1e-12
        );
        assert_relative_eq!(result.valuation.terminal_value, result.years[5].ebitda.value * 8.0);
        assert!(result.revenue_cagr() > 0.0);
    }

    #[test]
    fn test_combined_is_sum_of_divisions() {
        let engine = engine();
        let transport = DivisionConfig::transport();
        let construction = DivisionConfig::construction();
        let inputs = [
            DivisionInput::new(&transport, &transport.default_fleet, transport.default_split),
            DivisionInput::new(&construction, &construction.default_fleet, construction.default_split),
        ];
        let result = engine.project_combined(&inputs, Scenario::Aggressive).unwrap();

        assert_eq!(result.combined.label, COMBINED_LABEL);
        assert_eq!(result.divisions.len(), 2);
        let t = result.division("transport").unwrap();
        let c = result.division("construction").unwrap();

        for (i, year) in result.combined.years.iter().enumerate() {
            assert_relative_eq!(
                year.revenue.total,
                t.years[i].revenue.total + c.years[i].revenue.total,
                max_relative = 1e-12
            );
            assert_relative_eq!(
                year.depreciation,
                t.years[i].depreciation + c.years[i].depreciation,
                max_relative = 1e-12
            );
            assert_relative_eq!(
                year.capital_requirement,
                t.years[i].capital_requirement + c.years[i].capital_requirement,
                max_relative = 1e-12
            );
            assert_relative_eq!(
                year.cash_flow.fcf,
                t.years[i].cash_flow.fcf + c.years[i].cash_flow.fcf,
                max_relative = 1e-9
            );
        }

        // Brand totals come from construction only
        assert!(result.combined.revenue_by_group.contains_key("sdlg"));
        assert_eq!(result.combined.revenue_by_category.len(), 11);
    }

    #[test]
    fn test_summary_output_keeps_aggregates() {
        let config = ProjectionConfig {
            detailed_output: false,
            ..ProjectionConfig::default()
        };
        let engine = ProjectionEngine::new(Assumptions::default_pricing(), config);
        let division = DivisionConfig::construction();
        let input = DivisionInput::new(&division, &division.default_fleet, division.default_split);
        let result = engine.project_division(&input, Scenario::Conservative).unwrap();

        assert!(result.years.iter().all(|y| y.categories.is_empty()));
        let by_category: f64 = result.revenue_by_category.values().sum();
        assert_relative_eq!(by_category, result.totals.revenue, max_relative = 1e-9);
        let by_group: f64 = result.revenue_by_group.values().sum();
        assert_relative_eq!(by_group, result.totals.revenue, max_relative = 1e-9);
    }

    #[test]
    fn test_working_capital_and_baseline() {
        let engine = engine();
        let division = DivisionConfig::transport();
        let plain = DivisionInput::new(&division, &division.default_fleet, division.default_split);
        let base = engine.project_division(&plain, Scenario::Moderate).unwrap();

        let existing = division.default_fleet.year(2025).cloned().unwrap_or_default();
        let adjusted = DivisionInput::new(&division, &division.default_fleet, division.default_split)
            .with_baseline(CapitalBaseline::Units(existing))
            .with_working_capital([(2026, 10_000.0)].into_iter().collect());
        let result = engine.project_division(&adjusted, Scenario::Moderate).unwrap();

        assert_eq!(result.years[0].capital_requirement, 0.0);
        assert_relative_eq!(
            result.years[1].cash_flow.fcf,
            base.years[1].cash_flow.fcf - 10_000.0,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_unknown_fleet_category_rejected() {
        let engine = engine();
        let division = DivisionConfig::transport();
        let fleet = FleetSnapshot::from_rows(&[(2025, &[("excavator", 3)])]);
        let input = DivisionInput::new(&division, &fleet, division.default_split);
        let err = engine.project_division(&input, Scenario::Moderate).unwrap_err();
        assert!(matches!(err, ProjectionError::UnknownCategory { .. }));
    }

    #[test]
    fn test_cost_overrides() {
        let engine = engine();
        let division = DivisionConfig::transport();
        let input = DivisionInput::new(&division, &division.default_fleet, division.default_split)
            .with_cost_overrides(cost_schedule(&[("maintenance", 0.0)]));
        let result = engine.project_division(&input, Scenario::Moderate).unwrap();
        let first = &result.years[0];
        assert_relative_eq!(first.operating_expenses.total, first.revenue.total * 0.10, max_relative = 1e-12);

        let bad = DivisionInput::new(&division, &division.default_fleet, division.default_split)
            .with_cost_overrides(cost_schedule(&[("fuel", 0.1)]));
        let err = engine.project_division(&bad, Scenario::Moderate).unwrap_err();
        assert!(matches!(err, ProjectionError::UnknownCostBucket { .. }));
    }

    #[test]
    fn test_portfolio_projection() {
        let engine = engine();
        let finance = FinanceConfig::equipment_finance();
        let input = PortfolioInput::new(&finance, &finance.default_portfolio);
        let result = engine.project_portfolio(&input, Scenario::Moderate).unwrap();

        assert_eq!(result.label, "finance");
        assert!(result.years.iter().all(|y| y.depreciation == 0.0));
        // 100 contracts at 200k in the first year
        assert_relative_eq!(result.years[0].capital_requirement, 20_000_000.0, max_relative = 1e-12);
        assert_eq!(result.years[0].categories.len(), 3);
        assert_eq!(result.years[0].revenue.total, result.years[0].revenue.interest);
    }

    #[test]
    fn test_json_round_trip() {
        let engine = engine();
        let division = DivisionConfig::construction();
        let input = DivisionInput::new(&division, &division.default_fleet, division.default_split);
        let result = engine.project_division(&input, Scenario::Moderate).unwrap();

        let json = serde_json::to_string(&result).unwrap();
        let back: ProjectionResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }

    proptest! {
        #[test]
        fn prop_zero_fleet_is_all_zero(
            rental in 0.0f64..150.0,
            lease in 0.0f64..150.0,
            sale in 0.0f64..150.0,
            scenario in prop::sample::select(vec![
                Scenario::Conservative,
                Scenario::Moderate,
                Scenario::Aggressive,
            ]),
        ) {
            let engine = engine();
            let division = DivisionConfig::transport();
            let fleet = transport_fleet(&vec![vec![0; 4]; 6]);
            let input = DivisionInput::new(&division, &fleet, RevenueSplit::new(rental, lease, sale));
            let result = engine.project_division(&input, scenario).unwrap();

            for year in &result.years {
                prop_assert_eq!(year.revenue.total, 0.0);
                prop_assert_eq!(year.ebitda.value, 0.0);
                prop_assert_eq!(year.depreciation, 0.0);
                prop_assert_eq!(year.capital_requirement, 0.0);
            }
        }

        #[test]
        fn prop_contraction_needs_no_capital(
            first in prop::collection::vec(0u32..400, 4),
            shrink in prop::collection::vec(0u32..400, 4),
        ) {
            let second: Vec<u32> = first.iter().zip(&shrink).map(|(f, s)| f.saturating_sub(*s)).collect();
            let engine = engine();
            let division = DivisionConfig::transport();
            let fleet = transport_fleet(&[first, second]);
            let input = DivisionInput::new(&division, &fleet, division.default_split);
            let result = engine.project_division(&input, Scenario::Moderate).unwrap();

            prop_assert_eq!(result.years[1].capital_requirement, 0.0);
        }

        #[test]
        fn prop_ebitda_identity(counts in prop::collection::vec(prop::collection::vec(0u32..1000, 4), 6)) {
            let engine = engine();
            let transport = DivisionConfig::transport();
            let construction = DivisionConfig::construction();
            let fleet = transport_fleet(&counts);
            let inputs = [
                DivisionInput::new(&transport, &fleet, transport.default_split),
                DivisionInput::new(&construction, &construction.default_fleet, construction.default_split),
            ];
            let result = engine.project_combined(&inputs, Scenario::Moderate).unwrap();

            let all = result.divisions.iter().chain(std::iter::once(&result.combined));
            for projection in all {
                for year in &projection.years {
                    prop_assert_eq!(year.ebitda.value, year.revenue.total - year.operating_expenses.total);
                }
            }
        }
    }
}
