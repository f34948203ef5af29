pub mod chart;
pub mod transactions;

pub use chart::DonutChartViewModel;
pub use transactions::{TransactionsEvent, TransactionsState, TransactionsViewModel};
