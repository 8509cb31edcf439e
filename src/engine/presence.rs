use chrono::{Duration, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use crate::models::partner::{GeoPoint, PartnerPresence};

/// Tracks which delivery partners are currently online. A partner who stops
/// refreshing drops out of listings once the liveness TTL elapses; nobody is
/// notified of the timeout.
pub struct PartnerRegistry {
    partners: DashMap<Uuid, PartnerPresence>,
    ttl: Duration,
}

impl PartnerRegistry {
    pub fn new(ttl_secs: i64) -> Self {
        PartnerRegistry {
            partners: DashMap::new(),
            ttl: Duration::seconds(ttl_secs),
        }
    }

    /// Marks a partner online and available, refreshing liveness. Called on
    /// go-online and on every location ping. A ping without a location keeps
    /// the previously known one.
    pub fn register(&self, partner_id: Uuid, location: Option<GeoPoint>) -> PartnerPresence {
        let mut entry = self
            .partners
            .entry(partner_id)
            .or_insert_with(|| PartnerPresence {
                partner_id,
                available: true,
                location: None,
                last_seen: Utc::now(),
            });

        entry.available = true;
        entry.last_seen = Utc::now();
        if location.is_some() {
            entry.location = location;
        }
        entry.value().clone()
    }

    pub fn unregister(&self, partner_id: &Uuid) {
        self.partners.remove(partner_id);
    }

    /// Presence for one partner, None if unknown or expired.
    pub fn presence(&self, partner_id: &Uuid) -> Option<PartnerPresence> {
        let cutoff = Utc::now() - self.ttl;
        self.partners
            .get(partner_id)
            .filter(|entry| entry.last_seen > cutoff)
            .map(|entry| entry.value().clone())
    }

    pub fn is_online(&self, partner_id: &Uuid) -> bool {
        self.presence(partner_id).is_some()
    }

    pub fn list_online(&self) -> Vec<Uuid> {
        let cutoff = Utc::now() - self.ttl;
        self.partners
            .iter()
            .filter(|entry| entry.last_seen > cutoff)
            .map(|entry| entry.partner_id)
            .collect()
    }

    pub fn online_count(&self) -> usize {
        self.list_online().len()
    }
}
