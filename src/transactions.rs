//! Transaction lifecycle: checkout, payment confirmation, void.
//!
//! The book owns the local transaction list and treats the spreadsheet as
//! the source of truth: every mutation is sent remotely first, and the
//! whole list is re-fetched after a commit instead of patching locally.
//! That costs a round trip but keeps local and remote state honest, which
//! is the only cross-client safeguard this single-terminal design has.

use std::sync::Arc;

use chrono::Utc;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::cart::Cart;
use crate::error::{PosError, Result};
use crate::models::{PaymentMethod, Transaction, TransactionStatus};
use crate::remote::RemoteStore;

pub struct TransactionBook {
    store: Arc<dyn RemoteStore>,
    transactions: Vec<Transaction>,
}

impl TransactionBook {
    /// Create an empty book. Call [`TransactionBook::reload`] to load the
    /// persisted history.
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        TransactionBook {
            store,
            transactions: Vec::new(),
        }
    }

    /// Replace the local list with the remote one.
    pub async fn reload(&mut self) -> Result<()> {
        let resp = self
            .store
            .call("getTransactions", Value::Null)
            .await?
            .into_success()?;
        self.transactions = resp.data_as()?;
        Ok(())
    }

    pub fn all(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn get(&self, id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    // -----------------------------------------------------------------------
    // Checkout
    // -----------------------------------------------------------------------

    /// Convert the cart into a persisted transaction.
    ///
    /// `initial_status` is the checkout intent: [`TransactionStatus::Lunas`]
    /// for immediate full payment, [`TransactionStatus::Pending`] for "save
    /// for later". Creation directly into DIBATALKAN is rejected.
    ///
    /// The cart is cleared only after the remote store acknowledges the
    /// record; an abandoned or failed checkout never leaves a partial
    /// transaction behind.
    pub async fn checkout(
        &mut self,
        cart: &mut Cart,
        payment_method: PaymentMethod,
        initial_status: TransactionStatus,
    ) -> Result<Transaction> {
        if cart.is_empty() {
            return Err(PosError::EmptyCart);
        }
        if initial_status == TransactionStatus::Dibatalkan {
            return Err(PosError::InvalidInitialStatus(initial_status));
        }

        let transaction = Transaction {
            id: Uuid::new_v4().to_string(),
            date: Utc::now(),
            items: cart.items().to_vec(),
            total: cart.total(),
            payment_method,
            status: initial_status,
        };

        self.store
            .call("createTransaction", json!({ "transaction": &transaction }))
            .await?
            .into_success()?;
        info!(
            transaction_id = %transaction.id,
            total = transaction.total,
            status = %transaction.status,
            method = %payment_method,
            "transaction created"
        );

        cart.clear();
        self.reload().await?;
        Ok(transaction)
    }

    // -----------------------------------------------------------------------
    // Status transitions
    // -----------------------------------------------------------------------

    /// Confirm payment of a PENDING transaction.
    pub async fn mark_paid(&mut self, id: &str) -> Result<()> {
        self.transition(id, TransactionStatus::Lunas).await
    }

    /// Void a PENDING or LUNAS transaction. DIBATALKAN is terminal.
    pub async fn void(&mut self, id: &str) -> Result<()> {
        self.transition(id, TransactionStatus::Dibatalkan).await
    }

    async fn transition(&mut self, id: &str, to: TransactionStatus) -> Result<()> {
        let current = self
            .get(id)
            .ok_or_else(|| PosError::UnknownTransaction(id.to_string()))?
            .status;
        if !current.can_transition_to(to) {
            return Err(PosError::InvalidTransition { from: current, to });
        }

        let resp = self
            .store
            .call("updateTransactionStatus", json!({ "id": id, "status": to }))
            .await?;
        if !resp.success {
            // The remote row no longer matches (changed or removed by
            // another client). The caller must reload before retrying.
            return Err(PosError::StaleState {
                id: id.to_string(),
                message: resp
                    .message
                    .unwrap_or_else(|| "no matching transaction".to_string()),
            });
        }
        info!(transaction_id = %id, from = %current, to = %to, "transaction status updated");

        self.reload().await
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Product;
    use crate::remote::fake::FakeSheet;

    fn product(id: &str, price: i64, cost: i64, stock: u32) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Produk {id}"),
            category: "Minuman".to_string(),
            price,
            cost,
            stock,
        }
    }

    fn cart_with_items() -> Cart {
        let mut cart = Cart::new();
        let p1 = product("1", 18_000, 6_000, 50);
        let p2 = product("2", 25_000, 12_000, 24);
        cart.add(&p1);
        cart.add(&p1);
        cart.add(&p2);
        cart
    }

    #[tokio::test]
    async fn test_checkout_persists_and_clears_cart() {
        let sheet = Arc::new(FakeSheet::default());
        let mut book = TransactionBook::new(sheet.clone());
        let mut cart = cart_with_items();

        let tx = book
            .checkout(&mut cart, PaymentMethod::Tunai, TransactionStatus::Lunas)
            .await
            .unwrap();
        assert_eq!(tx.total, 61_000);
        assert_eq!(tx.status, TransactionStatus::Lunas);
        assert_eq!(tx.items.len(), 2);
        assert!(cart.is_empty());

        // Local list was reloaded from the sheet, not patched.
        assert_eq!(book.all().len(), 1);
        assert_eq!(book.get(&tx.id).unwrap().total, 61_000);
        let calls = sheet.calls.lock().unwrap().clone();
        assert_eq!(calls, ["createTransaction", "getTransactions"]);
    }

    #[tokio::test]
    async fn test_checkout_empty_cart_is_rejected_locally() {
        let sheet = Arc::new(FakeSheet::default());
        let mut book = TransactionBook::new(sheet.clone());
        let mut cart = Cart::new();

        let err = book
            .checkout(&mut cart, PaymentMethod::Qris, TransactionStatus::Lunas)
            .await
            .unwrap_err();
        assert!(matches!(err, PosError::EmptyCart));
        assert!(err.is_validation());
        assert!(sheet.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_checkout_into_cancelled_is_rejected() {
        let sheet = Arc::new(FakeSheet::default());
        let mut book = TransactionBook::new(sheet);
        let mut cart = cart_with_items();

        let err = book
            .checkout(&mut cart, PaymentMethod::Tunai, TransactionStatus::Dibatalkan)
            .await
            .unwrap_err();
        assert!(matches!(err, PosError::InvalidInitialStatus(_)));
        // Failed checkout leaves the cart intact.
        assert_eq!(cart.count(), 3);
    }

    #[tokio::test]
    async fn test_checkout_remote_failure_leaves_cart_and_list_unchanged() {
        let sheet = Arc::new(FakeSheet::default());
        sheet.fail_action("createTransaction", "sheet offline");
        let mut book = TransactionBook::new(sheet);
        let mut cart = cart_with_items();

        let err = book
            .checkout(&mut cart, PaymentMethod::Tunai, TransactionStatus::Lunas)
            .await
            .unwrap_err();
        assert!(matches!(err, PosError::Remote(_)));
        assert_eq!(cart.count(), 3);
        assert!(book.all().is_empty());
    }

    #[tokio::test]
    async fn test_pending_to_paid_to_void() {
        let sheet = Arc::new(FakeSheet::default());
        let mut book = TransactionBook::new(sheet);
        let mut cart = cart_with_items();

        let tx = book
            .checkout(&mut cart, PaymentMethod::Qris, TransactionStatus::Pending)
            .await
            .unwrap();

        book.mark_paid(&tx.id).await.unwrap();
        assert_eq!(book.get(&tx.id).unwrap().status, TransactionStatus::Lunas);

        // A paid transaction can still be voided.
        book.void(&tx.id).await.unwrap();
        assert_eq!(
            book.get(&tx.id).unwrap().status,
            TransactionStatus::Dibatalkan
        );

        // DIBATALKAN is terminal: nothing transitions out of it.
        let err = book.mark_paid(&tx.id).await.unwrap_err();
        assert!(matches!(err, PosError::InvalidTransition { .. }));
        let err = book.void(&tx.id).await.unwrap_err();
        assert!(matches!(
            err,
            PosError::InvalidTransition {
                from: TransactionStatus::Dibatalkan,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_mark_paid_requires_pending() {
        let sheet = Arc::new(FakeSheet::default());
        let mut book = TransactionBook::new(sheet);
        let mut cart = cart_with_items();
        let tx = book
            .checkout(&mut cart, PaymentMethod::Tunai, TransactionStatus::Lunas)
            .await
            .unwrap();

        let err = book.mark_paid(&tx.id).await.unwrap_err();
        assert!(matches!(
            err,
            PosError::InvalidTransition {
                from: TransactionStatus::Lunas,
                to: TransactionStatus::Lunas,
            }
        ));
    }

    #[tokio::test]
    async fn test_unknown_transaction() {
        let sheet = Arc::new(FakeSheet::default());
        let mut book = TransactionBook::new(sheet);
        let err = book.mark_paid("nope").await.unwrap_err();
        assert!(matches!(err, PosError::UnknownTransaction(_)));
    }

    #[tokio::test]
    async fn test_remote_mismatch_surfaces_stale_state() {
        let sheet = Arc::new(FakeSheet::default());
        let mut book = TransactionBook::new(sheet.clone());
        let mut cart = cart_with_items();
        let tx = book
            .checkout(&mut cart, PaymentMethod::Tunai, TransactionStatus::Pending)
            .await
            .unwrap();

        // Another client removed the row; the local copy is now stale.
        sheet.transactions.lock().unwrap().clear();
        let err = book.mark_paid(&tx.id).await.unwrap_err();
        assert!(matches!(err, PosError::StaleState { .. }));
        assert!(!err.is_validation());

        // Local state was not optimistically flipped.
        assert_eq!(book.get(&tx.id).unwrap().status, TransactionStatus::Pending);
    }

    #[tokio::test]
    async fn test_reload_replaces_local_list() {
        let sheet = Arc::new(FakeSheet::default());
        let mut book = TransactionBook::new(sheet.clone());
        let mut cart = cart_with_items();
        book.checkout(&mut cart, PaymentMethod::Tunai, TransactionStatus::Lunas)
            .await
            .unwrap();

        sheet.transactions.lock().unwrap().clear();
        book.reload().await.unwrap();
        assert!(book.all().is_empty());
    }
}
