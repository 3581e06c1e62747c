use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use atria_domain::BookingStore;

use crate::error::WorkflowError;

/// Decide whether `[start, end)` is free for `room_id`.
///
/// Only live confirmed bookings count: an unpaid hold past its grace window
/// is ignored here even if the sweeper has not cancelled it yet. Callers
/// are still expected to sweep first so stale holds get reclaimed rather
/// than merely skipped.
pub async fn is_available(
    store: &dyn BookingStore,
    room_id: Uuid,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    grace: Duration,
) -> Result<bool, WorkflowError> {
    if start >= end {
        return Err(WorkflowError::validation(
            "Start time must be before end time.",
        ));
    }

    let now = Utc::now();
    let overlapping = store.overlapping_confirmed(room_id, start, end).await?;

    Ok(!overlapping.iter().any(|b| b.is_live(now, grace)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use atria_domain::{Booking, BookingStatus, PaymentStatus, Room, RoomStore};
    use atria_store::MemoryStore;
    use chrono::TimeZone;

    fn grace() -> Duration {
        Duration::minutes(15)
    }

    fn slot(h: u32) -> DateTime<Utc> {
        // Far enough in the future that nothing reads as past-dated.
        Utc.with_ymd_and_hms(2031, 6, 1, h, 0, 0).unwrap()
    }

    async fn seeded_store() -> (MemoryStore, Uuid) {
        let store = MemoryStore::new();
        let room = Room::new("Boardroom", 8, 500);
        let room_id = room.id;
        store.insert_room(&room).await.unwrap();
        (store, room_id)
    }

    fn hold(room_id: Uuid, start: DateTime<Utc>, end: DateTime<Utc>) -> Booking {
        Booking {
            id: Uuid::new_v4(),
            room_id,
            user_id: "user-1".to_string(),
            start_time: start,
            end_time: end,
            total_price: 500,
            status: BookingStatus::Confirmed,
            payment_status: PaymentStatus::Pending,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn empty_room_is_available() {
        let (store, room_id) = seeded_store().await;
        assert!(is_available(&store, room_id, slot(9), slot(10), grace())
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn overlapping_booking_blocks_slot() {
        let (store, room_id) = seeded_store().await;
        store.insert_hold(&hold(room_id, slot(9), slot(10))).await.unwrap();

        assert!(!is_available(&store, room_id, slot(9), slot(10), grace())
            .await
            .unwrap());
        // Partial overlaps on either edge
        let half = Duration::minutes(30);
        assert!(
            !is_available(&store, room_id, slot(9) + half, slot(10) + half, grace())
                .await
                .unwrap()
        );
        assert!(
            !is_available(&store, room_id, slot(9) - half, slot(10) - half, grace())
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn adjacent_booking_leaves_slot_available() {
        let (store, room_id) = seeded_store().await;
        store.insert_hold(&hold(room_id, slot(9), slot(10))).await.unwrap();

        assert!(is_available(&store, room_id, slot(10), slot(11), grace())
            .await
            .unwrap());
        assert!(is_available(&store, room_id, slot(8), slot(9), grace())
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn other_rooms_do_not_interfere() {
        let (store, room_id) = seeded_store().await;
        let other = Room::new("Studio", 4, 800);
        store.insert_room(&other).await.unwrap();
        store.insert_hold(&hold(other.id, slot(9), slot(10))).await.unwrap();

        assert!(is_available(&store, room_id, slot(9), slot(10), grace())
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn expired_unswept_hold_does_not_block() {
        let (store, room_id) = seeded_store().await;
        let mut stale = hold(room_id, slot(9), slot(10));
        stale.created_at = Utc::now() - Duration::minutes(20);
        store.insert_hold(&stale).await.unwrap();

        assert!(is_available(&store, room_id, slot(9), slot(10), grace())
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn inverted_interval_is_rejected() {
        let (store, room_id) = seeded_store().await;
        let err = is_available(&store, room_id, slot(10), slot(9), grace())
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));
    }
}
