use crate::model::{PageKey, Transaction, TransactionRepository};
use strum::IntoStaticStr;
use tokio::sync::watch;

#[derive(Debug, Clone, PartialEq)]
pub struct TransactionsState {
    pub transactions: Vec<Transaction>,
    pub is_loading: bool,
    pub is_loading_more: bool,
    pub error: Option<String>,
    pub has_more: bool,
}

impl Default for TransactionsState {
    fn default() -> Self {
        Self {
            transactions: Vec::new(),
            is_loading: false,
            is_loading_more: false,
            error: None,
            has_more: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, IntoStaticStr)]
pub enum TransactionsEvent {
    Clicked(Transaction),
    Load,
    LoadMore,
    Delete(Transaction),
}

/// Paged list of recent transactions. Every state change is published on a
/// watch channel; the latest value is all a view ever needs.
#[derive(Debug)]
pub struct TransactionsViewModel<R> {
    repository: R,
    page_size: usize,
    next_key: Option<PageKey>,
    state: watch::Sender<TransactionsState>,
}

impl<R: TransactionRepository> TransactionsViewModel<R> {
    pub fn new(repository: R, page_size: usize) -> Self {
        Self {
            repository,
            page_size,
            next_key: None,
            state: watch::Sender::new(TransactionsState::default()),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<TransactionsState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> TransactionsState {
        self.state.borrow().clone()
    }

    pub async fn on_event(&mut self, event: TransactionsEvent) {
        log::debug!("transactions event: {}", <&'static str>::from(&event));

        match event {
            TransactionsEvent::Clicked(transaction) => {
                log::info!(
                    "Transaction {} selected: {} {:.2}",
                    transaction.id,
                    transaction.description,
                    transaction.amount
                );
            }
            TransactionsEvent::Load => self.load().await,
            TransactionsEvent::LoadMore => self.load_more().await,
            TransactionsEvent::Delete(transaction) => self.delete(&transaction).await,
        }
    }

    /// Replaces the list with the first page.
    pub async fn load(&mut self) {
        self.state.send_modify(|s| {
            s.is_loading = true;
            s.error = None;
        });

        match self.repository.fetch_page(self.page_size, None).await {
            Ok(page) => {
                self.next_key = page.next_key;
                self.state.send_modify(|s| {
                    s.transactions = page.items;
                    s.is_loading = false;
                    s.has_more = page.has_more;
                    s.error = None;
                });
            }
            Err(e) => {
                log::warn!("Failed to load transactions: {}", e);
                self.state.send_modify(|s| {
                    s.error = Some(e.to_string());
                    s.is_loading = false;
                });
            }
        }
    }

    /// Appends the next page. Does nothing while a page is already on its
    /// way or when the history is exhausted.
    pub async fn load_more(&mut self) {
        {
            let state = self.state.borrow();
            if state.is_loading_more || !state.has_more {
                return;
            }
        }

        self.state.send_modify(|s| s.is_loading_more = true);

        match self
            .repository
            .fetch_page(self.page_size, self.next_key.as_ref())
            .await
        {
            Ok(page) => {
                self.next_key = page.next_key;
                self.state.send_modify(|s| {
                    s.transactions.extend(page.items);
                    s.has_more = page.has_more;
                    s.is_loading_more = false;
                });
            }
            Err(e) => {
                log::warn!("Failed to load more transactions: {}", e);
                self.state.send_modify(|s| {
                    s.error = Some(format!("Failed to load more transactions: {e}"));
                    s.is_loading_more = false;
                });
            }
        }
    }

    pub async fn delete(&mut self, transaction: &Transaction) {
        match self.repository.delete(transaction).await {
            Ok(()) => self.load().await,
            Err(e) => {
                log::warn!("Failed to delete transaction {}: {}", transaction.id, e);
                self.state.send_modify(|s| {
                    s.error = Some(format!("Failed to delete transaction: {e}"));
                });
            }
        }
    }
}
