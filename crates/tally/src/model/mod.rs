pub mod category;
pub mod transaction;

pub use category::{
    CategoryId, FakeSpendingCategoryRepository, SpendingCategory, SpendingCategoryRepository,
};
pub use transaction::{
    FakeTransactionRepository, Page, PageKey, Transaction, TransactionId, TransactionRepository,
};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RepositoryError {
    #[error("category '{0}' not found")]
    CategoryNotFound(CategoryId),
    #[error("page size must be at least 1")]
    InvalidPageSize,
    #[error("{0} is not supported by this repository")]
    Unsupported(&'static str),
    #[error("{0}")]
    Fetch(String),
}
