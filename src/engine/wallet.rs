use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::wallet::{TransactionDirection, Wallet, WalletOwner, WalletTransaction};

/// Result of a credit call. `applied` is false when the idempotency key
/// matched a transaction that already exists, in which case that transaction
/// is returned and the balance was not touched.
#[derive(Debug, Clone)]
pub struct CreditOutcome {
    pub transaction: WalletTransaction,
    pub applied: bool,
}

/// Per-account balances backed by an append-only transaction log. Every
/// credit runs as one atomic unit under the wallet's entry lock: read or
/// create the wallet, bump the balance, append the transaction. The balance
/// can never drift from the signed sum of the log.
pub struct WalletLedger {
    wallets: DashMap<WalletOwner, Wallet>,
}

impl WalletLedger {
    pub fn new() -> Self {
        WalletLedger {
            wallets: DashMap::new(),
        }
    }

    /// Credits a wallet, creating it with a zero balance if absent.
    ///
    /// When `order_id` is given it doubles as an idempotency key: a second
    /// credit for the same (owner, order) pair returns the transaction that
    /// already applied and leaves the balance untouched, so a replayed
    /// delivery side effect cannot pay a partner twice.
    pub fn credit(
        &self,
        owner: WalletOwner,
        amount: f64,
        description: impl Into<String>,
        order_id: Option<Uuid>,
    ) -> Result<CreditOutcome, AppError> {
        if amount <= 0.0 || !amount.is_finite() {
            return Err(AppError::BadRequest(
                "credit amount must be positive".to_string(),
            ));
        }

        let mut wallet = self
            .wallets
            .entry(owner)
            .or_insert_with(|| Wallet::empty(owner));

        if let Some(order_id) = order_id {
            let applied = wallet.transactions.iter().find(|txn| {
                txn.order_id == Some(order_id) && txn.direction == TransactionDirection::Credit
            });
            if let Some(existing) = applied {
                return Ok(CreditOutcome {
                    transaction: existing.clone(),
                    applied: false,
                });
            }
        }

        let txn = WalletTransaction {
            id: Uuid::new_v4(),
            amount,
            direction: TransactionDirection::Credit,
            description: description.into(),
            order_id,
            created_at: Utc::now(),
        };

        wallet.balance += amount;
        wallet.transactions.push(txn.clone());
        Ok(CreditOutcome {
            transaction: txn,
            applied: true,
        })
    }

    /// Wallet view, materializing an empty wallet on first read.
    pub fn wallet(&self, owner: WalletOwner) -> Wallet {
        self.wallets
            .entry(owner)
            .or_insert_with(|| Wallet::empty(owner))
            .value()
            .clone()
    }

    pub fn balance(&self, owner: WalletOwner) -> f64 {
        self.wallets
            .get(&owner)
            .map(|wallet| wallet.balance)
            .unwrap_or(0.0)
    }
}

impl Default for WalletLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::WalletLedger;
    use crate::models::wallet::WalletOwner;

    #[test]
    fn balance_equals_signed_ledger_sum() {
        let ledger = WalletLedger::new();
        let owner = WalletOwner::DeliveryPartner(Uuid::new_v4());

        ledger.credit(owner, 40.0, "Delivery fee", Some(Uuid::new_v4())).unwrap();
        ledger.credit(owner, 32.5, "Delivery fee", Some(Uuid::new_v4())).unwrap();
        ledger.credit(owner, 100.0, "Bonus payout", None).unwrap();

        let wallet = ledger.wallet(owner);
        assert_eq!(wallet.transactions.len(), 3);
        assert!((wallet.balance - wallet.ledger_sum()).abs() < 1e-9);
        assert!((wallet.balance - 172.5).abs() < 1e-9);
    }

    #[test]
    fn credit_for_the_same_order_applies_once() {
        let ledger = WalletLedger::new();
        let owner = WalletOwner::DeliveryPartner(Uuid::new_v4());
        let order_id = Uuid::new_v4();

        let first = ledger.credit(owner, 40.0, "Delivery fee", Some(order_id)).unwrap();
        let replay = ledger.credit(owner, 40.0, "Delivery fee", Some(order_id)).unwrap();

        assert!(first.applied);
        assert!(!replay.applied);
        assert_eq!(first.transaction.id, replay.transaction.id);
        let wallet = ledger.wallet(owner);
        assert_eq!(wallet.transactions.len(), 1);
        assert!((wallet.balance - 40.0).abs() < 1e-9);
    }

    #[test]
    fn non_positive_amounts_are_rejected() {
        let ledger = WalletLedger::new();
        let owner = WalletOwner::Customer(Uuid::new_v4());

        assert!(ledger.credit(owner, 0.0, "nothing", None).is_err());
        assert!(ledger.credit(owner, -5.0, "refund", None).is_err());
        assert!((ledger.balance(owner) - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn wallets_are_isolated_per_owner() {
        let ledger = WalletLedger::new();
        let id = Uuid::new_v4();
        let as_partner = WalletOwner::DeliveryPartner(id);
        let as_customer = WalletOwner::Customer(id);

        ledger.credit(as_partner, 40.0, "Delivery fee", None).unwrap();

        assert!((ledger.balance(as_partner) - 40.0).abs() < 1e-9);
        assert!((ledger.balance(as_customer) - 0.0).abs() < f64::EPSILON);
    }
}
