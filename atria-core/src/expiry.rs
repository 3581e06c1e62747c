use chrono::{Duration, Utc};
use tracing::info;

use atria_domain::BookingStore;

use crate::error::WorkflowError;

/// Cancel every unpaid hold older than `grace`, releasing its slot back to
/// the availability pool. Returns the number of holds reclaimed.
///
/// The whole sweep is one predicated mutation, so calling it twice, or from
/// two clients at once, cancels each hold exactly once. Request handlers
/// run it best-effort before availability checks and payment operations; a
/// background worker runs it on an interval for liveness.
pub async fn sweep_expired(store: &dyn BookingStore, grace: Duration) -> Result<u64, WorkflowError> {
    let cutoff = Utc::now() - grace;
    let reclaimed = store.cancel_expired_pending(cutoff).await?;
    if reclaimed > 0 {
        info!(reclaimed, "expired unpaid holds cancelled");
    }
    Ok(reclaimed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use atria_domain::{Booking, BookingStatus, PaymentStatus, Room, RoomStore};
    use atria_store::MemoryStore;
    use chrono::{DateTime, TimeZone};
    use uuid::Uuid;

    fn slot(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2031, 6, 1, h, 0, 0).unwrap()
    }

    fn hold_created(room_id: Uuid, start_h: u32, age: Duration) -> Booking {
        Booking {
            id: Uuid::new_v4(),
            room_id,
            user_id: "user-1".to_string(),
            start_time: slot(start_h),
            end_time: slot(start_h + 1),
            total_price: 500,
            status: BookingStatus::Confirmed,
            payment_status: PaymentStatus::Pending,
            created_at: Utc::now() - age,
        }
    }

    async fn store_with_room() -> (MemoryStore, Uuid) {
        let store = MemoryStore::new();
        let room = Room::new("Boardroom", 8, 500);
        let id = room.id;
        store.insert_room(&room).await.unwrap();
        (store, id)
    }

    #[tokio::test]
    async fn stale_hold_is_cancelled_and_slot_released() {
        let (store, room_id) = store_with_room().await;
        let stale = hold_created(room_id, 9, Duration::minutes(16));
        store.insert_hold(&stale).await.unwrap();

        let reclaimed = sweep_expired(&store, Duration::minutes(15)).await.unwrap();
        assert_eq!(reclaimed, 1);

        let booking = store.get_booking(stale.id).await.unwrap().unwrap();
        assert_eq!(booking.status, BookingStatus::Cancelled);
        // Kept as audit history, not deleted
        assert_eq!(booking.payment_status, PaymentStatus::Pending);

        // The slot is insertable again
        let fresh = hold_created(room_id, 9, Duration::zero());
        store.insert_hold(&fresh).await.unwrap();
    }

    #[tokio::test]
    async fn hold_inside_grace_window_survives() {
        let (store, room_id) = store_with_room().await;
        let young = hold_created(room_id, 9, Duration::minutes(14) + Duration::seconds(59));
        store.insert_hold(&young).await.unwrap();

        let reclaimed = sweep_expired(&store, Duration::minutes(15)).await.unwrap();
        assert_eq!(reclaimed, 0);
        let booking = store.get_booking(young.id).await.unwrap().unwrap();
        assert_eq!(booking.status, BookingStatus::Confirmed);
    }

    #[tokio::test]
    async fn paid_bookings_are_never_swept() {
        let (store, room_id) = store_with_room().await;
        let mut paid = hold_created(room_id, 9, Duration::hours(24));
        paid.payment_status = PaymentStatus::Paid;
        store.insert_hold(&paid).await.unwrap();

        let reclaimed = sweep_expired(&store, Duration::minutes(15)).await.unwrap();
        assert_eq!(reclaimed, 0);
        let booking = store.get_booking(paid.id).await.unwrap().unwrap();
        assert_eq!(booking.status, BookingStatus::Confirmed);
    }

    #[tokio::test]
    async fn sweep_is_idempotent() {
        let (store, room_id) = store_with_room().await;
        store
            .insert_hold(&hold_created(room_id, 9, Duration::minutes(30)))
            .await
            .unwrap();
        store
            .insert_hold(&hold_created(room_id, 11, Duration::minutes(45)))
            .await
            .unwrap();

        assert_eq!(sweep_expired(&store, Duration::minutes(15)).await.unwrap(), 2);
        assert_eq!(sweep_expired(&store, Duration::minutes(15)).await.unwrap(), 0);
    }
}
