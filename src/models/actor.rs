use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The three parties that drive the order lifecycle. Loose role strings from
/// older clients ("user", "restaurant-owner") are normalized here once, on
/// ingress; the core never compares raw strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActorRole {
    #[serde(alias = "user")]
    Customer,
    #[serde(alias = "restaurant-owner")]
    Restaurant,
    DeliveryPartner,
}

impl ActorRole {
    pub fn as_str(self) -> &'static str {
        match self {
            ActorRole::Customer => "customer",
            ActorRole::Restaurant => "restaurant",
            ActorRole::DeliveryPartner => "delivery-partner",
        }
    }
}

impl std::fmt::Display for ActorRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub role: ActorRole,
    pub id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::ActorRole;

    #[test]
    fn legacy_role_strings_normalize_on_ingress() {
        let customer: ActorRole = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(customer, ActorRole::Customer);

        let restaurant: ActorRole = serde_json::from_str("\"restaurant-owner\"").unwrap();
        assert_eq!(restaurant, ActorRole::Restaurant);

        let partner: ActorRole = serde_json::from_str("\"delivery-partner\"").unwrap();
        assert_eq!(partner, ActorRole::DeliveryPartner);
    }
}
