use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::order::OrderStatus;
use crate::models::partner::{GeoPoint, PartnerSummary};
use crate::models::wallet::WalletOwner;

/// Role-scoped delivery channel. `AllPartners` fans out to every connected
/// delivery partner, the way new-order announcements reach whoever is online.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    Customer(Uuid),
    Restaurant(Uuid),
    Partner(Uuid),
    AllPartners,
}

impl Topic {
    pub fn matches(&self, subscription: &Topic) -> bool {
        match (self, subscription) {
            (Topic::AllPartners, Topic::Partner(_)) => true,
            _ => self == subscription,
        }
    }
}

impl From<WalletOwner> for Topic {
    fn from(owner: WalletOwner) -> Self {
        match owner {
            WalletOwner::Customer(id) => Topic::Customer(id),
            WalletOwner::Restaurant(id) => Topic::Restaurant(id),
            WalletOwner::DeliveryPartner(id) => Topic::Partner(id),
        }
    }
}

/// Domain events published to the outbound broadcast channel. Serialized with
/// a `type` tag so clients can dispatch on it.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum OrderEvent {
    #[serde(rename = "ORDER_CREATED")]
    OrderCreated {
        order_id: Uuid,
        order_number: String,
        status: OrderStatus,
        customer_id: Uuid,
        restaurant_id: Uuid,
        total_price: f64,
        message: String,
        timestamp: DateTime<Utc>,
    },

    #[serde(rename = "STATUS_UPDATED")]
    StatusUpdated {
        order_id: Uuid,
        order_number: String,
        status: OrderStatus,
        customer_id: Uuid,
        restaurant_id: Uuid,
        delivery_partner_id: Option<Uuid>,
        message: String,
        live_location_enabled: bool,
        rating_prompt: bool,
        timestamp: DateTime<Utc>,
    },

    #[serde(rename = "ORDER_ASSIGNED")]
    OrderAssigned {
        order_id: Uuid,
        order_number: String,
        status: OrderStatus,
        customer_id: Uuid,
        restaurant_id: Uuid,
        delivery_partner_id: Uuid,
        partner: PartnerSummary,
        message: String,
        live_location_enabled: bool,
        timestamp: DateTime<Utc>,
    },

    #[serde(rename = "NEW_ORDER_READY")]
    NewOrderReady {
        order_id: Uuid,
        order_number: String,
        restaurant_id: Uuid,
        customer_id: Uuid,
        total_price: f64,
        delivery_fee: f64,
        message: String,
        timestamp: DateTime<Utc>,
    },

    #[serde(rename = "WALLET_UPDATED")]
    WalletUpdated {
        owner: WalletOwner,
        order_id: Option<Uuid>,
        order_number: Option<String>,
        amount: f64,
        new_balance: f64,
        timestamp: DateTime<Utc>,
    },

    #[serde(rename = "LOCATION_UPDATE")]
    LocationUpdate {
        order_id: Uuid,
        order_number: String,
        status: OrderStatus,
        customer_id: Uuid,
        restaurant_id: Uuid,
        delivery_partner_id: Uuid,
        location: GeoPoint,
        timestamp: DateTime<Utc>,
    },
}

impl OrderEvent {
    /// Channels this event fans out to.
    pub fn topics(&self) -> Vec<Topic> {
        match self {
            OrderEvent::OrderCreated {
                customer_id,
                restaurant_id,
                ..
            } => vec![Topic::Customer(*customer_id), Topic::Restaurant(*restaurant_id)],

            OrderEvent::StatusUpdated {
                customer_id,
                restaurant_id,
                delivery_partner_id,
                ..
            } => {
                let mut topics = vec![
                    Topic::Customer(*customer_id),
                    Topic::Restaurant(*restaurant_id),
                ];
                if let Some(partner_id) = delivery_partner_id {
                    topics.push(Topic::Partner(*partner_id));
                }
                topics
            }

            OrderEvent::OrderAssigned {
                customer_id,
                restaurant_id,
                delivery_partner_id,
                ..
            } => vec![
                Topic::Customer(*customer_id),
                Topic::Restaurant(*restaurant_id),
                Topic::Partner(*delivery_partner_id),
            ],

            OrderEvent::NewOrderReady { .. } => vec![Topic::AllPartners],

            OrderEvent::WalletUpdated { owner, .. } => vec![Topic::from(*owner)],

            OrderEvent::LocationUpdate {
                customer_id,
                restaurant_id,
                ..
            } => vec![Topic::Customer(*customer_id), Topic::Restaurant(*restaurant_id)],
        }
    }

    pub fn delivers_to(&self, subscription: &Topic) -> bool {
        self.topics()
            .iter()
            .any(|topic| topic.matches(subscription))
    }
}
