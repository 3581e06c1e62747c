use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A bookable room. Prices are whole rupees per hour; the workflow snapshots
/// them into bookings at creation time and never reads them back for an
/// existing booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: Uuid,
    pub name: String,
    pub capacity: i32,
    pub price_per_hour: i64,
    pub image_url: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl Room {
    pub fn new(name: &str, capacity: i32, price_per_hour: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            capacity,
            price_per_hour,
            image_url: None,
            latitude: None,
            longitude: None,
            created_at: Utc::now(),
        }
    }
}
