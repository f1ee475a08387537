use std::{
    collections::{HashSet, VecDeque},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex, PoisonError,
    },
};

use tracing::{debug, info, warn};

use crate::{
    constants::FINALIZED_TRANSACTION_CAPACITY,
    domain::{
        entities::{
            iap_transaction::{IapTransaction, IapTransactionState},
            iap_update_notification::{IapUpdateNotification, PurchaseFailureReason},
        },
        platform::payment_queue::{PaymentQueue, TransactionQueueListener},
        repositories::purchased_product_ledger::PurchasedProductLedger,
    },
    errors::PlatformError,
    workflow::iap_events::IapEvents,
};

/// Reacts to transaction updates from the payment queue: grants content
/// through the ledger, raises notifications and finalizes terminal
/// transactions.
///
/// Every terminal transaction (purchased, failed, or restored with a
/// resolvable product) is finalized exactly once. Redeliveries of a
/// transaction that was already finalized are ignored, as long as its id is
/// still among the most recent [`FINALIZED_TRANSACTION_CAPACITY`] finalized
/// ids.
///
/// Content is granted before the transaction is finalized, but a ledger that
/// fails to persist the grant does not hold finalization back. See
/// [`PurchasedProductLedger`].
pub struct TransactionObserver<L: PurchasedProductLedger> {
    ledger: Arc<L>,
    events: IapEvents,
    finalized: Mutex<FinalizedTransactionIds>,
    restored_since_last_restore_callback: AtomicUsize,
}

/// Ids of recently finalized transactions, oldest evicted first.
struct FinalizedTransactionIds {
    ids: HashSet<String>,
    order: VecDeque<String>,
    capacity: usize,
}

impl FinalizedTransactionIds {
    fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            ids: HashSet::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Returns false if `id` is already present.
    fn insert(&mut self, id: &str) -> bool {
        if self.ids.contains(id) {
            return false;
        }
        if self.order.len() == self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.ids.remove(&oldest);
            }
        }
        self.ids.insert(id.to_owned());
        self.order.push_back(id.to_owned());
        true
    }
}

impl<L: PurchasedProductLedger> TransactionObserver<L> {
    pub fn new(ledger: Arc<L>, events: IapEvents) -> Self {
        Self::with_finalized_capacity(ledger, events, FINALIZED_TRANSACTION_CAPACITY)
    }

    fn with_finalized_capacity(ledger: Arc<L>, events: IapEvents, capacity: usize) -> Self {
        Self {
            ledger,
            events,
            finalized: Mutex::new(FinalizedTransactionIds::new(capacity)),
            restored_since_last_restore_callback: AtomicUsize::new(0),
        }
    }

    fn handle_transaction(&self, queue: &dyn PaymentQueue, transaction: &IapTransaction) {
        match transaction.state {
            IapTransactionState::Purchased => {
                if !self.claim_finalization(transaction) {
                    return;
                }
                info!(
                    transaction_id = %transaction.id,
                    product_id = %transaction.product_id(),
                    "purchase completed"
                );
                self.ledger.mark_purchased(transaction.product_id());
                self.events.emit(IapUpdateNotification::ProductPurchased {
                    transaction: transaction.clone(),
                });
                queue.finish_transaction(transaction);
            }
            IapTransactionState::Failed => {
                if !self.claim_finalization(transaction) {
                    return;
                }
                warn!(
                    transaction_id = %transaction.id,
                    error = ?transaction.error,
                    "purchase failed"
                );
                self.events.emit(IapUpdateNotification::PurchaseFailed {
                    transaction: Some(transaction.clone()),
                    reason: PurchaseFailureReason::TransactionFailed,
                });
                queue.finish_transaction(transaction);
            }
            IapTransactionState::Restored => {
                let Some(product_id) = transaction.restored_product_id() else {
                    debug!(
                        transaction_id = %transaction.id,
                        "restored transaction has no product; ignoring"
                    );
                    return;
                };
                if !self.claim_finalization(transaction) {
                    return;
                }
                info!(
                    transaction_id = %transaction.id,
                    product_id = %product_id,
                    "purchase restored"
                );
                self.restored_since_last_restore_callback
                    .fetch_add(1, Ordering::SeqCst);
                self.ledger.mark_purchased(product_id);
                self.events.emit(IapUpdateNotification::ProductRestored {
                    transaction: transaction.clone(),
                });
                queue.finish_transaction(transaction);
            }
            IapTransactionState::Deferred | IapTransactionState::Purchasing => {
                debug!(
                    transaction_id = %transaction.id,
                    state = ?transaction.state,
                    "transaction pending"
                );
            }
        }
    }

    /// Returns false if the transaction was already finalized.
    fn claim_finalization(&self, transaction: &IapTransaction) -> bool {
        let claimed = self
            .finalized
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(&transaction.id);
        if !claimed {
            debug!(
                transaction_id = %transaction.id,
                "transaction already finalized; ignoring redelivery"
            );
        }
        claimed
    }
}

impl<L: PurchasedProductLedger> TransactionQueueListener for TransactionObserver<L> {
    fn updated_transactions(&self, queue: &dyn PaymentQueue, transactions: &[IapTransaction]) {
        for transaction in transactions {
            self.handle_transaction(queue, transaction);
        }
    }

    fn restore_completed_transactions_finished(&self, _queue: &dyn PaymentQueue) {
        let restored = self
            .restored_since_last_restore_callback
            .swap(0, Ordering::SeqCst);
        info!(restored, "restore finished");
        if restored == 0 {
            self.events.emit(IapUpdateNotification::PurchaseFailed {
                transaction: None,
                reason: PurchaseFailureReason::NothingToRestore,
            });
        }
    }

    fn restore_completed_transactions_failed(
        &self,
        _queue: &dyn PaymentQueue,
        error: PlatformError,
    ) {
        self.restored_since_last_restore_callback
            .store(0, Ordering::SeqCst);
        warn!(error = %error, "restore failed");
        self.events.emit(IapUpdateNotification::PurchaseFailed {
            transaction: None,
            reason: PurchaseFailureReason::RestoreFailed {
                details: error.message,
            },
        });
    }
}
