use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::actor::ActorRole;

/// A wallet belongs to exactly one account holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "role", content = "id", rename_all = "kebab-case")]
pub enum WalletOwner {
    Customer(Uuid),
    Restaurant(Uuid),
    DeliveryPartner(Uuid),
}

impl WalletOwner {
    pub fn new(role: ActorRole, id: Uuid) -> Self {
        match role {
            ActorRole::Customer => WalletOwner::Customer(id),
            ActorRole::Restaurant => WalletOwner::Restaurant(id),
            ActorRole::DeliveryPartner => WalletOwner::DeliveryPartner(id),
        }
    }

    pub fn holder_id(self) -> Uuid {
        match self {
            WalletOwner::Customer(id)
            | WalletOwner::Restaurant(id)
            | WalletOwner::DeliveryPartner(id) => id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionDirection {
    Credit,
    Debit,
}

impl TransactionDirection {
    /// Signs an amount for summing the ledger.
    pub fn signed(self, amount: f64) -> f64 {
        match self {
            TransactionDirection::Credit => amount,
            TransactionDirection::Debit => -amount,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletTransaction {
    pub id: Uuid,
    pub amount: f64,
    pub direction: TransactionDirection,
    pub description: String,
    pub order_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// The transaction log is the source of truth; `balance` is a cached
/// projection updated in the same atomic unit as every append.
#[derive(Debug, Clone, Serialize)]
pub struct Wallet {
    pub owner: WalletOwner,
    pub balance: f64,
    pub transactions: Vec<WalletTransaction>,
}

impl Wallet {
    pub fn empty(owner: WalletOwner) -> Self {
        Wallet {
            owner,
            balance: 0.0,
            transactions: Vec::new(),
        }
    }

    /// Signed sum of the ledger, for checking the balance projection.
    pub fn ledger_sum(&self) -> f64 {
        self.transactions
            .iter()
            .map(|txn| txn.direction.signed(txn.amount))
            .sum()
    }
}
