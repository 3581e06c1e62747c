use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use atria_domain::{Booking, BookingStatus, BookingStore, PaymentStatus, Room, RoomStore, StoreError};

/// Process-local store backing development and tests. Hold insertion does
/// its overlap check and the insert under one write lock, which gives the
/// same exclusivity guarantee the Postgres exclusion constraint provides.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    rooms: HashMap<Uuid, Room>,
    bookings: HashMap<Uuid, Booking>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(_: impl std::fmt::Debug) -> StoreError {
    StoreError::Backend("store lock poisoned".to_string())
}

#[async_trait]
impl RoomStore for MemoryStore {
    async fn get_room(&self, id: Uuid) -> Result<Option<Room>, StoreError> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner.rooms.get(&id).cloned())
    }

    async fn list_rooms(&self) -> Result<Vec<Room>, StoreError> {
        let inner = self.inner.read().map_err(poisoned)?;
        let mut rooms: Vec<Room> = inner.rooms.values().cloned().collect();
        rooms.sort_by_key(|r| r.created_at);
        Ok(rooms)
    }

    async fn insert_room(&self, room: &Room) -> Result<(), StoreError> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        inner.rooms.insert(room.id, room.clone());
        Ok(())
    }
}

#[async_trait]
impl BookingStore for MemoryStore {
    async fn insert_hold(&self, booking: &Booking) -> Result<(), StoreError> {
        let mut inner = self.inner.write().map_err(poisoned)?;

        let clash = inner.bookings.values().any(|b| {
            b.room_id == booking.room_id
                && b.status == BookingStatus::Confirmed
                && b.overlaps(booking.start_time, booking.end_time)
        });
        if clash {
            return Err(StoreError::Conflict);
        }

        inner.bookings.insert(booking.id, booking.clone());
        Ok(())
    }

    async fn get_booking(&self, id: Uuid) -> Result<Option<Booking>, StoreError> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner.bookings.get(&id).cloned())
    }

    async fn overlapping_confirmed(
        &self,
        room_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Booking>, StoreError> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner
            .bookings
            .values()
            .filter(|b| {
                b.room_id == room_id
                    && b.status == BookingStatus::Confirmed
                    && b.overlaps(start, end)
            })
            .cloned()
            .collect())
    }

    async fn bookings_for_user(&self, user_id: &str) -> Result<Vec<Booking>, StoreError> {
        let inner = self.inner.read().map_err(poisoned)?;
        let mut bookings: Vec<Booking> = inner
            .bookings
            .values()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect();
        bookings.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        Ok(bookings)
    }

    async fn bookings_for_room_between(
        &self,
        room_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Booking>, StoreError> {
        let inner = self.inner.read().map_err(poisoned)?;
        let mut bookings: Vec<Booking> = inner
            .bookings
            .values()
            .filter(|b| {
                b.room_id == room_id
                    && b.status == BookingStatus::Confirmed
                    && b.start_time >= from
                    && b.start_time < to
            })
            .cloned()
            .collect();
        bookings.sort_by_key(|b| b.start_time);
        Ok(bookings)
    }

    async fn cancel_expired_pending(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        let mut reclaimed = 0;
        for booking in inner.bookings.values_mut() {
            if booking.status == BookingStatus::Confirmed
                && booking.payment_status == PaymentStatus::Pending
                && booking.created_at < cutoff
            {
                booking.status = BookingStatus::Cancelled;
                reclaimed += 1;
            }
        }
        Ok(reclaimed)
    }

    async fn mark_paid(&self, id: Uuid, user_id: &str) -> Result<Booking, StoreError> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        let booking = inner.bookings.get_mut(&id).ok_or(StoreError::NotFound)?;

        if booking.user_id != user_id
            || booking.status != BookingStatus::Confirmed
            || booking.payment_status != PaymentStatus::Pending
        {
            return Err(StoreError::Conflict);
        }

        booking.payment_status = PaymentStatus::Paid;
        Ok(booking.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn slot(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2031, 6, 1, h, 0, 0).unwrap()
    }

    fn hold(room_id: Uuid, user: &str, start_h: u32, end_h: u32) -> Booking {
        Booking {
            id: Uuid::new_v4(),
            room_id,
            user_id: user.to_string(),
            start_time: slot(start_h),
            end_time: slot(end_h),
            total_price: 500,
            status: BookingStatus::Confirmed,
            payment_status: PaymentStatus::Pending,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn overlapping_insert_conflicts() {
        let store = MemoryStore::new();
        let room = Uuid::new_v4();
        store.insert_hold(&hold(room, "a", 9, 10)).await.unwrap();

        let err = store.insert_hold(&hold(room, "b", 9, 10)).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict));

        // Adjacent is fine
        store.insert_hold(&hold(room, "b", 10, 11)).await.unwrap();
    }

    #[tokio::test]
    async fn cancelled_rows_do_not_block_inserts() {
        let store = MemoryStore::new();
        let room = Uuid::new_v4();
        let first = hold(room, "a", 9, 10);
        store.insert_hold(&first).await.unwrap();
        store
            .cancel_expired_pending(Utc::now() + Duration::seconds(1))
            .await
            .unwrap();

        store.insert_hold(&hold(room, "b", 9, 10)).await.unwrap();
    }

    #[tokio::test]
    async fn mark_paid_is_predicated_on_owner_and_state() {
        let store = MemoryStore::new();
        let room = Uuid::new_v4();
        let booking = hold(room, "a", 9, 10);
        store.insert_hold(&booking).await.unwrap();

        // Wrong owner
        assert!(matches!(
            store.mark_paid(booking.id, "b").await.unwrap_err(),
            StoreError::Conflict
        ));

        // Right owner flips it once
        let paid = store.mark_paid(booking.id, "a").await.unwrap();
        assert_eq!(paid.payment_status, PaymentStatus::Paid);

        // Second flip finds no pending row
        assert!(matches!(
            store.mark_paid(booking.id, "a").await.unwrap_err(),
            StoreError::Conflict
        ));
    }

    #[tokio::test]
    async fn user_history_is_most_recent_first() {
        let store = MemoryStore::new();
        let room = Uuid::new_v4();
        store.insert_hold(&hold(room, "a", 9, 10)).await.unwrap();
        store.insert_hold(&hold(room, "a", 14, 15)).await.unwrap();
        store.insert_hold(&hold(room, "b", 11, 12)).await.unwrap();

        let mine = store.bookings_for_user("a").await.unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine[0].start_time > mine[1].start_time);
    }

    #[tokio::test]
    async fn day_window_filters_by_start_time() {
        let store = MemoryStore::new();
        let room = Uuid::new_v4();
        store.insert_hold(&hold(room, "a", 9, 10)).await.unwrap();
        store.insert_hold(&hold(room, "a", 20, 21)).await.unwrap();

        let day = store
            .bookings_for_room_between(room, slot(0), slot(12))
            .await
            .unwrap();
        assert_eq!(day.len(), 1);
        assert_eq!(day[0].start_time, slot(9));
    }
}
