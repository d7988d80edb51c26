//! Business Projections - multi-year financial projection engine for asset rental and lending businesses
//!
//! This library provides:
//! - Rental, lease and sale revenue from fleet unit counts under named scenarios
//! - Operating expenses, EBITDA, depreciation and capital requirements
//! - Free cash flow, NPV, IRR and exit-multiple valuation
//! - Combined multi-division projections and lending portfolio projections
//! - Multi-scenario runs and CSV/JSON export

pub mod assumptions;
pub mod error;
pub mod fleet;
pub mod projection;
pub mod report;
pub mod scenario;

// Re-export commonly used types
pub use assumptions::{Assumptions, DivisionConfig, FinanceConfig};
pub use error::{ProjectionError, Result};
pub use fleet::{FleetSnapshot, RevenueSplit};
pub use projection::{
    CombinedProjectionResult, DivisionInput, PortfolioInput, ProjectionConfig, ProjectionEngine,
    ProjectionResult,
};
pub use scenario::{FleetSource, Scenario, ScenarioRunner};
