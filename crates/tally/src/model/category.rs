use super::RepositoryError;
use crate::config;
use derive_more::{AsRef, Deref, Display, From, Into};
use palette::Srgba;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct CategoryId(String);

donut::impl_string_newtype!(CategoryId);

#[derive(Debug, Clone, PartialEq)]
pub struct SpendingCategory {
    pub id: CategoryId,
    pub name: String,
    pub total_amount: f64,
    pub color: Srgba<f64>,
}

pub trait SpendingCategoryRepository {
    fn spending_categories(
        &self,
    ) -> impl Future<Output = Result<Vec<SpendingCategory>, RepositoryError>> + Send;

    fn update_spending_category(
        &self,
        category: SpendingCategory,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}

/// In-memory categories, seeded from config or a built-in sample set.
#[derive(Debug)]
pub struct FakeSpendingCategoryRepository {
    categories: RwLock<Vec<SpendingCategory>>,
}

impl FakeSpendingCategoryRepository {
    pub fn new(categories: Vec<SpendingCategory>) -> Self {
        Self {
            categories: RwLock::new(categories),
        }
    }

    /// Uses `categories` unless it is empty.
    pub fn seeded(categories: Vec<SpendingCategory>) -> Self {
        if categories.is_empty() {
            Self::default()
        } else {
            Self::new(categories)
        }
    }
}

impl Default for FakeSpendingCategoryRepository {
    fn default() -> Self {
        Self::new(sample_categories())
    }
}

/// The categories shipped in the bundled default config.
fn sample_categories() -> Vec<SpendingCategory> {
    match config::parse_config(config::DEFAULT_CONFIG) {
        Ok(config) => config.spending_categories(),
        Err(e) => {
            log::error!("Bundled config is invalid: {}", e);
            Vec::new()
        }
    }
}

impl SpendingCategoryRepository for FakeSpendingCategoryRepository {
    async fn spending_categories(&self) -> Result<Vec<SpendingCategory>, RepositoryError> {
        Ok(self.categories.read().clone())
    }

    async fn update_spending_category(
        &self,
        category: SpendingCategory,
    ) -> Result<(), RepositoryError> {
        let mut categories = self.categories.write();
        let slot = categories
            .iter_mut()
            .find(|c| c.id == category.id)
            .ok_or_else(|| RepositoryError::CategoryNotFound(category.id.clone()))?;
        *slot = category;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sample_categories() {
        let repo = FakeSpendingCategoryRepository::default();
        let categories = repo.spending_categories().await.unwrap();
        assert_eq!(categories.len(), 4);
        assert_eq!(categories[3].id.as_str(), "income");
        assert!((categories[0].color.red - 0x79 as f64 / 255.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_update_category() {
        let repo = FakeSpendingCategoryRepository::default();
        let mut transport = repo.spending_categories().await.unwrap()[2].clone();
        transport.total_amount = 75.0;
        repo.update_spending_category(transport).await.unwrap();
        assert_eq!(repo.spending_categories().await.unwrap()[2].total_amount, 75.0);

        let missing = SpendingCategory {
            id: CategoryId::from("travel"),
            name: "Travel".into(),
            total_amount: 1.0,
            color: Srgba::new(0.0, 0.0, 0.0, 1.0),
        };
        assert_eq!(
            repo.update_spending_category(missing).await,
            Err(RepositoryError::CategoryNotFound(CategoryId::from("travel")))
        );
    }

    #[test]
    fn test_samples_match_bundled_config() {
        let bundled = config::parse_config(config::DEFAULT_CONFIG).unwrap();
        assert_eq!(sample_categories(), bundled.spending_categories());
        assert_eq!(sample_categories()[1].name, "Entertainment");
        assert_eq!(sample_categories()[3].total_amount, 3000.0);
    }

    #[test]
    fn test_seeded_falls_back_to_samples() {
        let repo = FakeSpendingCategoryRepository::seeded(Vec::new());
        assert_eq!(repo.categories.read().len(), 4);
    }
}
