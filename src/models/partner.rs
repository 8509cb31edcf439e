use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// Directory entry for a delivery partner. Account management lives outside
/// the core; this is the slice the dispatch path needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartnerProfile {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub rating: f64,
    pub total_ratings: u32,
    pub vehicle_type: Option<String>,
    pub vehicle_number: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// The partner summary embedded in assignment events so the customer and
/// restaurant can see who is coming.
#[derive(Debug, Clone, Serialize)]
pub struct PartnerSummary {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub rating: f64,
    pub total_ratings: u32,
    pub vehicle_type: Option<String>,
    pub vehicle_number: Option<String>,
}

impl From<&PartnerProfile> for PartnerSummary {
    fn from(profile: &PartnerProfile) -> Self {
        PartnerSummary {
            id: profile.id,
            name: profile.name.clone(),
            phone: profile.phone.clone(),
            rating: profile.rating,
            total_ratings: profile.total_ratings,
            vehicle_type: profile.vehicle_type.clone(),
            vehicle_number: profile.vehicle_number.clone(),
        }
    }
}

/// Liveness record owned by the partner registry. Created or refreshed on a
/// go-online call or a location ping, dropped on explicit go-offline, and
/// silently excluded from listings once `last_seen` exceeds the liveness TTL.
#[derive(Debug, Clone, Serialize)]
pub struct PartnerPresence {
    pub partner_id: Uuid,
    pub available: bool,
    pub location: Option<GeoPoint>,
    pub last_seen: DateTime<Utc>,
}
