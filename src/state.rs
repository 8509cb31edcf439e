use dashmap::DashMap;
use uuid::Uuid;

use crate::broadcast::Broadcaster;
use crate::config::Config;
use crate::engine::presence::PartnerRegistry;
use crate::engine::queue::DispatchQueue;
use crate::engine::wallet::WalletLedger;
use crate::models::partner::PartnerProfile;
use crate::observability::metrics::Metrics;
use crate::store::OrderStore;

pub struct AppState {
    pub orders: OrderStore,
    pub dispatch_queue: DispatchQueue,
    pub presence: PartnerRegistry,
    pub wallets: WalletLedger,
    pub partners: DashMap<Uuid, PartnerProfile>,
    pub broadcaster: Broadcaster,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            orders: OrderStore::new(),
            dispatch_queue: DispatchQueue::new(config.queue_ttl_secs),
            presence: PartnerRegistry::new(config.presence_ttl_secs),
            wallets: WalletLedger::new(),
            partners: DashMap::new(),
            broadcaster: Broadcaster::new(config.event_buffer_size),
            metrics: Metrics::new(),
        }
    }
}
