use crate::model::SpendingCategory;
use crate::viewmodel::TransactionsState;

/// Messages from the background runtime to the UI thread.
#[derive(Debug, Clone)]
pub enum AppEvent {
    ConfigReload,
    CategoriesLoaded(Vec<SpendingCategory>),
    TransactionsChanged(TransactionsState),
}
