pub mod analysis;
pub mod comparator;
pub mod input;
pub mod investment;

pub use analysis::{analyze_financing, ComparisonRow, FinancingAnalysis};
pub use comparator::{
    build_schedule, compute_summary, FinancingSummary, InstallmentPeriod, InstallmentSchedule,
    Recommendation,
};
pub use input::{FinancingInput, MAX_INSTALLMENTS, RECOMMENDED_MAX_RATE};
pub use investment::{simulate_investment, InvestmentOutcome, InvestmentPeriod, InvestmentSimulation};
