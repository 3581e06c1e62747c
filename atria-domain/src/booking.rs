use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Room lifecycle status. `Confirmed` covers both a live paid booking and a
/// provisional hold awaiting payment; the sweeper flips abandoned holds to
/// `Cancelled`. Bookings are never deleted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "confirmed" => Some(BookingStatus::Confirmed),
            "cancelled" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(PaymentStatus::Pending),
            "paid" => Some(PaymentStatus::Paid),
            _ => None,
        }
    }
}

/// A reservation of a room over the half-open interval
/// `[start_time, end_time)`. `total_price` is snapshotted from the room's
/// hourly price at creation and never recomputed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub room_id: Uuid,
    pub user_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub total_price: i64,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    pub fn duration_hours(&self) -> i64 {
        (self.end_time - self.start_time).num_hours()
    }

    /// Standard half-open overlap test: `[a, b)` and `[c, d)` intersect iff
    /// `a < d && c < b`. Adjacent intervals do not overlap.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start_time < end && start < self.end_time
    }

    /// An unpaid hold older than `grace` no longer reserves its slot.
    pub fn is_expired(&self, now: DateTime<Utc>, grace: Duration) -> bool {
        self.status == BookingStatus::Confirmed
            && self.payment_status == PaymentStatus::Pending
            && now - self.created_at > grace
    }

    /// Live bookings are the ones availability is judged against.
    pub fn is_live(&self, now: DateTime<Utc>, grace: Duration) -> bool {
        self.status == BookingStatus::Confirmed && !self.is_expired(now, grace)
    }
}
