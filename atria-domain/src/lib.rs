pub mod booking;
pub mod repository;
pub mod room;

pub use booking::{Booking, BookingStatus, PaymentStatus};
pub use repository::{BookingStore, RoomStore, StoreError};
pub use room::Room;
