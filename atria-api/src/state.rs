use std::sync::Arc;

use atria_core::holds::HoldService;
use atria_core::payments::PaymentService;
use atria_domain::{BookingStore, RoomStore};
use atria_store::app_config::BusinessRules;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub rooms: Arc<dyn RoomStore>,
    pub bookings: Arc<dyn BookingStore>,
    pub holds: Arc<HoldService>,
    pub payments: Arc<PaymentService>,
    pub auth: AuthConfig,
    pub rules: BusinessRules,
}

impl AppState {
    /// Grace window after which an unpaid hold stops reserving its slot.
    pub fn grace(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.rules.hold_grace_minutes)
    }
}
