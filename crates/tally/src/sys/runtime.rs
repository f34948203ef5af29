use crate::config::Config;
use crate::events::AppEvent;
use crate::model::{
    FakeSpendingCategoryRepository, FakeTransactionRepository, SpendingCategoryRepository,
    TransactionRepository,
};
use crate::viewmodel::{TransactionsEvent, TransactionsViewModel};
use async_channel::{Receiver, Sender};
use std::thread;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::runtime::Runtime;

/// Spawns the tokio runtime thread and returns the channel that drives the
/// transactions list.
pub fn start_background_services(
    config: &Config,
    tx: Sender<AppEvent>,
) -> Sender<TransactionsEvent> {
    let (commands_tx, commands_rx) = async_channel::bounded(32);

    let categories = FakeSpendingCategoryRepository::seeded(config.spending_categories());
    let transactions = FakeTransactionRepository::new(now_ms(), config.transactions.fetch_delay());
    let page_size = config.transactions.page_size;

    thread::spawn(move || {
        let rt = Runtime::new().expect("Failed to create Tokio runtime");

        rt.block_on(async {
            {
                let tx = tx.clone();
                tokio::spawn(async move {
                    crate::config::run_async_watcher(tx).await;
                });
            }

            {
                let tx = tx.clone();
                tokio::spawn(async move {
                    load_categories(&categories, &tx).await;
                });
            }

            {
                let tx = tx.clone();
                let view_model = TransactionsViewModel::new(transactions, page_size);
                tokio::spawn(async move {
                    run_transactions_worker(view_model, commands_rx, tx).await;
                });
            }

            std::future::pending::<()>().await;
        });
    });

    commands_tx
}

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}

pub async fn load_categories<R: SpendingCategoryRepository>(
    repository: &R,
    tx: &Sender<AppEvent>,
) {
    match repository.spending_categories().await {
        Ok(categories) => {
            log::debug!("Loaded {} spending categories", categories.len());
            let _ = tx.send(AppEvent::CategoriesLoaded(categories)).await;
        }
        Err(e) => log::error!("Failed to load spending categories: {}", e),
    }
}

/// Loads the first page, then applies commands until either channel closes.
/// Every state change, including the loading flags, is forwarded to the UI.
pub async fn run_transactions_worker<R>(
    mut view_model: TransactionsViewModel<R>,
    commands: Receiver<TransactionsEvent>,
    tx: Sender<AppEvent>,
) where
    R: TransactionRepository + Send + 'static,
{
    let mut updates = view_model.subscribe();
    let forward = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let state = updates.borrow_and_update().clone();
            if tx.send(AppEvent::TransactionsChanged(state)).await.is_err() {
                break;
            }
        }
    });

    view_model.load().await;

    while let Ok(event) = commands.recv().await {
        if forward.is_finished() {
            break;
        }
        view_model.on_event(event).await;
    }

    log::debug!("Transactions worker stopped");
}
