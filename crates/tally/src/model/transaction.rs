use super::{CategoryId, RepositoryError};
use derive_more::{AsRef, Deref, Display, From, Into};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;
const HISTORY_DAYS: i64 = 300;

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct TransactionId(String);

donut::impl_string_newtype!(TransactionId);

/// Opaque forward-only cursor handed out with each page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Deref, From, Into, AsRef)]
pub struct PageKey(String);

donut::impl_string_newtype!(PageKey);

impl PageKey {
    fn from_offset(offset: usize) -> Self {
        Self(offset.to_string())
    }

    fn offset(&self) -> Option<usize> {
        self.0.parse().ok()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: TransactionId,
    pub timestamp_ms: i64,
    /// Negative for spending.
    pub amount: f64,
    pub description: String,
    pub category: Option<CategoryId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub has_more: bool,
    pub next_key: Option<PageKey>,
}

pub trait TransactionRepository {
    fn fetch_page(
        &self,
        page_size: usize,
        page_key: Option<&PageKey>,
    ) -> impl Future<Output = Result<Page<Transaction>, RepositoryError>> + Send;

    fn add(
        &self,
        transaction: Transaction,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    fn delete(
        &self,
        transaction: &Transaction,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}

/// Generated transaction history, newest first, served with an artificial delay.
#[derive(Debug, Clone)]
pub struct FakeTransactionRepository {
    transactions: Vec<Transaction>,
    delay: Duration,
}

impl FakeTransactionRepository {
    pub fn new(now_ms: i64, delay: Duration) -> Self {
        Self {
            transactions: generate_history(now_ms),
            delay,
        }
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

/// A salary plus recurring groceries, outings and commutes over the last
/// `HISTORY_DAYS` days. Amounts vary with the day but never randomly.
fn generate_history(now_ms: i64) -> Vec<Transaction> {
    let spend = |id: String, at: i64, amount: f64, description: &str, category: &str| Transaction {
        id: TransactionId::new(id),
        timestamp_ms: at,
        amount,
        description: description.to_string(),
        category: Some(CategoryId::from(category)),
    };
    let jitter = |days_ago: i64, salt: i64| ((days_ago * 7 + salt) % 10) as f64;

    let mut history = vec![spend(
        "income_1".into(),
        now_ms,
        3000.0,
        "Monthly Salary",
        "income",
    )];

    for days_ago in 0..=HISTORY_DAYS {
        let at = now_ms - days_ago * DAY_MS;

        if days_ago % 4 == 0 {
            history.push(spend(
                format!("groceries_{days_ago}"),
                at,
                -45.0 - jitter(days_ago, 1) * 30.0,
                "Grocery Shopping",
                "groceries",
            ));
        }

        if days_ago % 7 == 0 || days_ago % 7 == 3 {
            let description = if days_ago % 2 == 0 {
                "Movie Night"
            } else {
                "Restaurant"
            };
            history.push(spend(
                format!("entertainment_{days_ago}"),
                at,
                -25.0 - jitter(days_ago, 3) * 20.0,
                description,
                "entertainment",
            ));
        }

        if days_ago % 2 == 0 {
            history.push(spend(
                format!("transport_{days_ago}"),
                at,
                -10.0 - jitter(days_ago, 5) * 5.0,
                "Public Transport",
                "transport",
            ));
        }
    }

    history.sort_by(|a, b| b.timestamp_ms.cmp(&a.timestamp_ms));
    history
}

impl TransactionRepository for FakeTransactionRepository {
    async fn fetch_page(
        &self,
        page_size: usize,
        page_key: Option<&PageKey>,
    ) -> Result<Page<Transaction>, RepositoryError> {
        if page_size == 0 {
            return Err(RepositoryError::InvalidPageSize);
        }

        tokio::time::sleep(self.delay).await;

        let start = match page_key {
            Some(key) => key.offset().unwrap_or_else(|| {
                log::warn!("Unreadable page key '{}', starting over", key);
                0
            }),
            None => 0,
        }
        .min(self.transactions.len());
        let end = (start + page_size).min(self.transactions.len());
        let has_more = end < self.transactions.len();

        log::debug!("serving transactions {}..{} of {}", start, end, self.len());

        Ok(Page {
            items: self.transactions[start..end].to_vec(),
            has_more,
            next_key: has_more.then(|| PageKey::from_offset(end)),
        })
    }

    async fn add(&self, _transaction: Transaction) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unsupported("adding transactions"))
    }

    async fn delete(&self, _transaction: &Transaction) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unsupported("deleting transactions"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const NOW: i64 = 1_700_000_000_000;

    #[test]
    fn test_history_is_newest_first_and_unique() {
        let repo = FakeTransactionRepository::new(NOW, Duration::ZERO);
        assert_eq!(repo.len(), 1 + 76 + 86 + 151);
        assert_eq!(repo.transactions[0].id.as_str(), "income_1");

        assert!(
            repo.transactions
                .windows(2)
                .all(|w| w[0].timestamp_ms >= w[1].timestamp_ms)
        );
        let ids: HashSet<_> = repo.transactions.iter().map(|t| &t.id).collect();
        assert_eq!(ids.len(), repo.len());
    }

    #[tokio::test]
    async fn test_pages_walk_whole_history() {
        let repo = FakeTransactionRepository::new(NOW, Duration::ZERO);

        let first = repo.fetch_page(20, None).await.unwrap();
        assert_eq!(first.items.len(), 20);
        assert!(first.has_more);
        assert_eq!(first.next_key, Some(PageKey::from("20")));

        let mut seen = first.items.len();
        let mut key = first.next_key;
        while let Some(k) = key {
            let page = repo.fetch_page(50, Some(&k)).await.unwrap();
            seen += page.items.len();
            assert_eq!(page.has_more, page.next_key.is_some());
            key = page.next_key;
        }
        assert_eq!(seen, repo.len());
    }

    #[tokio::test]
    async fn test_last_page_has_no_key() {
        let repo = FakeTransactionRepository::new(NOW, Duration::ZERO);
        let key = PageKey::from_offset(repo.len() - 3);
        let page = repo.fetch_page(20, Some(&key)).await.unwrap();
        assert_eq!(page.items.len(), 3);
        assert!(!page.has_more);
        assert_eq!(page.next_key, None);
    }

    #[tokio::test]
    async fn test_bad_requests() {
        let repo = FakeTransactionRepository::new(NOW, Duration::ZERO);
        assert_eq!(
            repo.fetch_page(0, None).await,
            Err(RepositoryError::InvalidPageSize)
        );

        let restarted = repo
            .fetch_page(5, Some(&PageKey::from("not-a-number")))
            .await
            .unwrap();
        assert_eq!(restarted.items[0].id.as_str(), "income_1");

        let tx = restarted.items[0].clone();
        assert!(matches!(
            repo.delete(&tx).await,
            Err(RepositoryError::Unsupported(_))
        ));
        assert!(matches!(
            repo.add(tx).await,
            Err(RepositoryError::Unsupported(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_waits_for_delay() {
        let repo = FakeTransactionRepository::new(NOW, Duration::from_millis(500));
        let started = tokio::time::Instant::now();
        repo.fetch_page(10, None).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(500));
    }
}
