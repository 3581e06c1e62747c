use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::info;
use uuid::Uuid;

use atria_domain::{Booking, BookingStatus, BookingStore, PaymentStatus, RoomStore, StoreError};

use crate::error::WorkflowError;

/// Validation limits for hold creation. Defaults match the product rules:
/// 60 seconds of clock-skew tolerance and whole-hour durations of
/// 1-5 or 8 hours.
#[derive(Debug, Clone)]
pub struct HoldRules {
    pub clock_skew: Duration,
    pub allowed_durations_hours: Vec<i64>,
}

impl Default for HoldRules {
    fn default() -> Self {
        Self {
            clock_skew: Duration::seconds(60),
            allowed_durations_hours: vec![1, 2, 3, 4, 5, 8],
        }
    }
}

/// Creates provisional holds: bookings in `confirmed`/`pending` state that
/// reserve a slot until payment completes or the hold expires.
pub struct HoldService {
    rooms: Arc<dyn RoomStore>,
    bookings: Arc<dyn BookingStore>,
    rules: HoldRules,
}

impl HoldService {
    pub fn new(rooms: Arc<dyn RoomStore>, bookings: Arc<dyn BookingStore>, rules: HoldRules) -> Self {
        Self { rooms, bookings, rules }
    }

    /// Create a hold for `[start, end)`.
    ///
    /// The price is snapshotted from the room's current hourly rate and is
    /// immutable for the life of the booking. Exclusivity is enforced by
    /// the store's insert; losing a race surfaces as `RoomUnavailable`.
    pub async fn create_hold(
        &self,
        room_id: Uuid,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Booking, WorkflowError> {
        // 1. Interval sanity
        if start >= end {
            return Err(WorkflowError::validation(
                "Start time must be before end time.",
            ));
        }

        let now = Utc::now();
        if start < now - self.rules.clock_skew {
            return Err(WorkflowError::validation("Cannot book a time in the past."));
        }

        // 2. Duration must be a whole hour from the allowed set
        let span = end - start;
        let hours = span.num_hours();
        if span != Duration::hours(hours) || !self.rules.allowed_durations_hours.contains(&hours) {
            return Err(WorkflowError::validation(format!(
                "Booking duration must be one of {:?} whole hours.",
                self.rules.allowed_durations_hours
            )));
        }

        // 3. Snapshot the price from the room's current rate
        let room = self
            .rooms
            .get_room(room_id)
            .await?
            .ok_or(WorkflowError::NotFound("Room"))?;
        let total_price = room.price_per_hour * hours;

        let booking = Booking {
            id: Uuid::new_v4(),
            room_id,
            user_id: user_id.to_string(),
            start_time: start,
            end_time: end,
            total_price,
            status: BookingStatus::Confirmed,
            payment_status: PaymentStatus::Pending,
            created_at: now,
        };

        // 4. Insert; the store rejects overlapping confirmed bookings
        match self.bookings.insert_hold(&booking).await {
            Ok(()) => {
                info!(
                    booking_id = %booking.id,
                    room_id = %room_id,
                    total_price,
                    "hold created"
                );
                Ok(booking)
            }
            Err(StoreError::Conflict) => Err(WorkflowError::RoomUnavailable),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atria_domain::Room;
    use atria_store::MemoryStore;
    use chrono::TimeZone;

    fn slot(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2031, 6, 1, h, 0, 0).unwrap()
    }

    async fn service() -> (HoldService, Uuid, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let room = Room::new("Boardroom", 8, 500);
        let room_id = room.id;
        store.insert_room(&room).await.unwrap();
        let svc = HoldService::new(store.clone(), store.clone(), HoldRules::default());
        (svc, room_id, store)
    }

    #[tokio::test]
    async fn creates_pending_hold_with_price_snapshot() {
        let (svc, room_id, _store) = service().await;
        let booking = svc
            .create_hold(room_id, "user-1", slot(9), slot(11))
            .await
            .unwrap();

        assert_eq!(booking.total_price, 1000);
        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert_eq!(booking.payment_status, PaymentStatus::Pending);
        assert_eq!(booking.duration_hours(), 2);
    }

    #[tokio::test]
    async fn price_snapshot_survives_room_reprice() {
        let (svc, room_id, store) = service().await;
        let booking = svc
            .create_hold(room_id, "user-1", slot(9), slot(11))
            .await
            .unwrap();
        assert_eq!(booking.total_price, 1000);

        // Reprice the room to 800/hr; the existing booking keeps 1000.
        let mut room = store.get_room(room_id).await.unwrap().unwrap();
        room.price_per_hour = 800;
        store.insert_room(&room).await.unwrap();

        let stored = store.get_booking(booking.id).await.unwrap().unwrap();
        assert_eq!(stored.total_price, 1000);

        // A fresh hold sees the new rate.
        let later = svc
            .create_hold(room_id, "user-1", slot(12), slot(14))
            .await
            .unwrap();
        assert_eq!(later.total_price, 1600);
    }

    #[tokio::test]
    async fn past_start_is_rejected() {
        let (svc, room_id, _store) = service().await;
        let start = Utc::now() - Duration::minutes(10);
        let err = svc
            .create_hold(room_id, "user-1", start, start + Duration::hours(1))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));
    }

    #[tokio::test]
    async fn slight_clock_skew_is_tolerated() {
        let (svc, room_id, _store) = service().await;
        let start = Utc::now() - Duration::seconds(30);
        svc.create_hold(room_id, "user-1", start, start + Duration::hours(1))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn disallowed_durations_are_rejected() {
        let (svc, room_id, _store) = service().await;
        // 6 hours is not in the allowed set
        let err = svc
            .create_hold(room_id, "user-1", slot(9), slot(15))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));

        // Neither is a fractional duration
        let err = svc
            .create_hold(room_id, "user-1", slot(9), slot(10) + Duration::minutes(30))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));
    }

    #[tokio::test]
    async fn unknown_room_is_not_found() {
        let (svc, _room_id, _store) = service().await;
        let err = svc
            .create_hold(Uuid::new_v4(), "user-1", slot(9), slot(10))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::NotFound(_)));
    }

    #[tokio::test]
    async fn overlapping_hold_is_unavailable() {
        let (svc, room_id, _store) = service().await;
        svc.create_hold(room_id, "user-1", slot(9), slot(10))
            .await
            .unwrap();

        let err = svc
            .create_hold(room_id, "user-2", slot(9), slot(10))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::RoomUnavailable));
    }

    #[tokio::test]
    async fn adjacent_holds_coexist_but_straddle_fails() {
        let (svc, room_id, _store) = service().await;
        svc.create_hold(room_id, "user-1", slot(9), slot(10))
            .await
            .unwrap();
        svc.create_hold(room_id, "user-2", slot(10), slot(11))
            .await
            .unwrap();

        // 09:30-10:30 overlaps both neighbors
        let err = svc
            .create_hold(
                room_id,
                "user-3",
                slot(9) + Duration::minutes(30),
                slot(10) + Duration::minutes(30),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::RoomUnavailable));
    }
}
