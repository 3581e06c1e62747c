use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use atria_domain::{
    Booking, BookingStatus, BookingStore, PaymentStatus, Room, RoomStore, StoreError,
};

/// Postgres-backed store. Slot exclusivity lives in the
/// `bookings_no_overlap` exclusion constraint, so correctness does not
/// depend on the transaction isolation level; READ COMMITTED is enough.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// SQLSTATE 23P01 is an exclusion violation, 23505 a unique violation.
fn map_db_err(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db) = e {
        if matches!(db.code().as_deref(), Some("23P01") | Some("23505")) {
            return StoreError::Conflict;
        }
    }
    StoreError::Backend(e.to_string())
}

#[derive(sqlx::FromRow)]
struct RoomRow {
    id: Uuid,
    name: String,
    capacity: i32,
    price_per_hour: i64,
    image_url: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    created_at: DateTime<Utc>,
}

impl From<RoomRow> for Room {
    fn from(r: RoomRow) -> Self {
        Room {
            id: r.id,
            name: r.name,
            capacity: r.capacity,
            price_per_hour: r.price_per_hour,
            image_url: r.image_url,
            latitude: r.latitude,
            longitude: r.longitude,
            created_at: r.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    room_id: Uuid,
    user_id: String,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    total_price: i64,
    status: String,
    payment_status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = StoreError;

    fn try_from(r: BookingRow) -> Result<Self, StoreError> {
        let status = BookingStatus::parse(&r.status)
            .ok_or_else(|| StoreError::Backend(format!("unknown booking status {:?}", r.status)))?;
        let payment_status = PaymentStatus::parse(&r.payment_status).ok_or_else(|| {
            StoreError::Backend(format!("unknown payment status {:?}", r.payment_status))
        })?;
        Ok(Booking {
            id: r.id,
            room_id: r.room_id,
            user_id: r.user_id,
            start_time: r.start_time,
            end_time: r.end_time,
            total_price: r.total_price,
            status,
            payment_status,
            created_at: r.created_at,
        })
    }
}

const BOOKING_COLUMNS: &str =
    "id, room_id, user_id, start_time, end_time, total_price, status, payment_status, created_at";

#[async_trait]
impl RoomStore for PgStore {
    async fn get_room(&self, id: Uuid) -> Result<Option<Room>, StoreError> {
        let row: Option<RoomRow> = sqlx::query_as(
            "SELECT id, name, capacity, price_per_hour, image_url, latitude, longitude, created_at \
             FROM rooms WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_err)?;

        Ok(row.map(Room::from))
    }

    async fn list_rooms(&self) -> Result<Vec<Room>, StoreError> {
        let rows: Vec<RoomRow> = sqlx::query_as(
            "SELECT id, name, capacity, price_per_hour, image_url, latitude, longitude, created_at \
             FROM rooms ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;

        Ok(rows.into_iter().map(Room::from).collect())
    }

    async fn insert_room(&self, room: &Room) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO rooms (id, name, capacity, price_per_hour, image_url, latitude, longitude, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             ON CONFLICT (id) DO UPDATE SET \
                 name = EXCLUDED.name, \
                 capacity = EXCLUDED.capacity, \
                 price_per_hour = EXCLUDED.price_per_hour, \
                 image_url = EXCLUDED.image_url, \
                 latitude = EXCLUDED.latitude, \
                 longitude = EXCLUDED.longitude",
        )
        .bind(room.id)
        .bind(&room.name)
        .bind(room.capacity)
        .bind(room.price_per_hour)
        .bind(&room.image_url)
        .bind(room.latitude)
        .bind(room.longitude)
        .bind(room.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;

        Ok(())
    }
}

#[async_trait]
impl BookingStore for PgStore {
    async fn insert_hold(&self, booking: &Booking) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO bookings \
                 (id, room_id, user_id, start_time, end_time, total_price, status, payment_status, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(booking.id)
        .bind(booking.room_id)
        .bind(&booking.user_id)
        .bind(booking.start_time)
        .bind(booking.end_time)
        .bind(booking.total_price)
        .bind(booking.status.as_str())
        .bind(booking.payment_status.as_str())
        .bind(booking.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;

        Ok(())
    }

    async fn get_booking(&self, id: Uuid) -> Result<Option<Booking>, StoreError> {
        let row: Option<BookingRow> = sqlx::query_as(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_err)?;

        row.map(Booking::try_from).transpose()
    }

    async fn overlapping_confirmed(
        &self,
        room_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Booking>, StoreError> {
        let rows: Vec<BookingRow> = sqlx::query_as(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings \
             WHERE room_id = $1 AND status = 'confirmed' \
               AND start_time < $3 AND $2 < end_time"
        ))
        .bind(room_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;

        rows.into_iter().map(Booking::try_from).collect()
    }

    async fn bookings_for_user(&self, user_id: &str) -> Result<Vec<Booking>, StoreError> {
        let rows: Vec<BookingRow> = sqlx::query_as(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings \
             WHERE user_id = $1 ORDER BY start_time DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;

        rows.into_iter().map(Booking::try_from).collect()
    }

    async fn bookings_for_room_between(
        &self,
        room_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Booking>, StoreError> {
        let rows: Vec<BookingRow> = sqlx::query_as(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings \
             WHERE room_id = $1 AND status = 'confirmed' \
               AND start_time >= $2 AND start_time < $3 \
             ORDER BY start_time ASC"
        ))
        .bind(room_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;

        rows.into_iter().map(Booking::try_from).collect()
    }

    async fn cancel_expired_pending(&self, cutoff: DateTime<Utc>) -> Result<u64, StoreError> {
        let result = sqlx::query(
            "UPDATE bookings SET status = 'cancelled' \
             WHERE status = 'confirmed' AND payment_status = 'pending' AND created_at < $1",
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;

        Ok(result.rows_affected())
    }

    async fn mark_paid(&self, id: Uuid, user_id: &str) -> Result<Booking, StoreError> {
        let row: Option<BookingRow> = sqlx::query_as(&format!(
            "UPDATE bookings SET payment_status = 'paid' \
             WHERE id = $1 AND user_id = $2 \
               AND status = 'confirmed' AND payment_status = 'pending' \
             RETURNING {BOOKING_COLUMNS}"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_err)?;

        match row {
            Some(r) => Booking::try_from(r),
            None => Err(StoreError::Conflict),
        }
    }
}
