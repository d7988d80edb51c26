//! Yearly projection engine: revenue, costs, cash flow and valuation

mod capital;
mod cashflows;
mod depreciation;
mod ebitda;
mod engine;
pub mod irr;
mod opex;
mod portfolio;
mod revenue;
mod valuation;

pub use capital::{capital_requirements, year_capital, CapitalBaseline};
pub use cashflows::{
    CategoryRevenue, CombinedProjectionResult, FreeCashFlow, OperatingExpenses, ProjectionResult,
    ProjectionTotals, RevenueBreakdown, YearlyProjection,
};
pub use depreciation::{depreciation_schedule, year_depreciation};
pub use ebitda::Ebitda;
pub use engine::{DivisionInput, PortfolioInput, ProjectionConfig, ProjectionEngine, COMBINED_LABEL};
pub use irr::{calculate_cagr, calculate_irr, calculate_npv, IrrOptions, IrrSolution};
pub use opex::operating_expenses;
pub use portfolio::{portfolio_year, PortfolioYear};
pub use revenue::{category_revenue, division_year_revenue, YearRevenue};
pub use valuation::{calculate_valuation, valuation_cash_flows, Valuation};
