use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::booking::Booking;
use crate::room::Room;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    /// The mutation lost to a concurrent writer (overlapping hold insert,
    /// or a paid flip that raced another verification).
    #[error("conflicting booking state")]
    Conflict,

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Read access to the room catalog. Catalog editing is outside the
/// workflow; `insert_room` exists for seeding and tests.
#[async_trait]
pub trait RoomStore: Send + Sync {
    async fn get_room(&self, id: Uuid) -> Result<Option<Room>, StoreError>;

    async fn list_rooms(&self) -> Result<Vec<Room>, StoreError>;

    async fn insert_room(&self, room: &Room) -> Result<(), StoreError>;
}

#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Insert a provisional hold. The implementation must reject an insert
    /// that overlaps an existing confirmed booking for the same room with
    /// `StoreError::Conflict`, atomically with respect to concurrent
    /// inserts.
    async fn insert_hold(&self, booking: &Booking) -> Result<(), StoreError>;

    async fn get_booking(&self, id: Uuid) -> Result<Option<Booking>, StoreError>;

    /// Confirmed bookings for `room_id` overlapping `[start, end)`.
    /// Includes expired-but-unswept holds; callers filter liveness.
    async fn overlapping_confirmed(
        &self,
        room_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Booking>, StoreError>;

    /// A user's bookings, most recent start first.
    async fn bookings_for_user(&self, user_id: &str) -> Result<Vec<Booking>, StoreError>;

    /// Confirmed bookings for a room starting within `[from, to)`.
    async fn bookings_for_room_between(
        &self,
        room_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Booking>, StoreError>;

    /// Cancel every confirmed, unpaid booking created before `cutoff`.
    /// Returns the number of holds reclaimed. Must be idempotent and safe
    /// under concurrent invocation.
    async fn cancel_expired_pending(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError>;

    /// Flip `payment_status` to `paid`, constrained to the owning user and
    /// the `confirmed`/`pending` state. Returns the updated booking, or
    /// `StoreError::Conflict` if no row matched the predicate.
    async fn mark_paid(&self, id: Uuid, user_id: &str) -> Result<Booking, StoreError>;
}
