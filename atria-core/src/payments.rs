use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use atria_domain::{Booking, BookingStatus, BookingStore, PaymentStatus, RoomStore, StoreError};

use crate::error::WorkflowError;
use crate::gateway::{GatewayOrder, PaymentGateway};
use crate::signature;

/// Proof a client forwards after the gateway's checkout completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentProof {
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
}

/// Server-side payment authority: creates gateway orders with amounts the
/// client never influences, and flips a booking to `paid` only behind a
/// verified signature.
///
/// `key_secret: None` puts the service in test mode: orders come from the
/// mock gateway and signature verification is skipped. The mode is fixed at
/// construction from configuration.
pub struct PaymentService {
    rooms: Arc<dyn RoomStore>,
    bookings: Arc<dyn BookingStore>,
    gateway: Arc<dyn PaymentGateway>,
    key_secret: Option<String>,
    currency: String,
}

impl PaymentService {
    pub fn new(
        rooms: Arc<dyn RoomStore>,
        bookings: Arc<dyn BookingStore>,
        gateway: Arc<dyn PaymentGateway>,
        key_secret: Option<String>,
        currency: String,
    ) -> Self {
        Self {
            rooms,
            bookings,
            gateway,
            key_secret,
            currency,
        }
    }

    pub fn test_mode(&self) -> bool {
        self.key_secret.is_none()
    }

    async fn owned_booking(&self, booking_id: Uuid, caller: &str) -> Result<Booking, WorkflowError> {
        let booking = self
            .bookings
            .get_booking(booking_id)
            .await?
            .ok_or(WorkflowError::NotFound("Booking"))?;

        if booking.user_id != caller {
            return Err(WorkflowError::unauthorized("Unauthorized access to booking"));
        }
        Ok(booking)
    }

    /// Mint a gateway order for a booking the caller owns.
    ///
    /// The amount is recomputed here from the room's hourly rate and the
    /// booking's duration; a client-supplied amount is never read.
    pub async fn create_order(
        &self,
        booking_id: Uuid,
        caller: &str,
    ) -> Result<GatewayOrder, WorkflowError> {
        let booking = self.owned_booking(booking_id, caller).await?;

        if booking.status == BookingStatus::Cancelled {
            return Err(WorkflowError::validation(
                "Booking has expired. Please book again.",
            ));
        }
        if booking.payment_status == PaymentStatus::Paid {
            return Err(WorkflowError::validation("Booking is already paid."));
        }

        let room = self
            .rooms
            .get_room(booking.room_id)
            .await?
            .ok_or(WorkflowError::NotFound("Room"))?;

        // Amount in paise, from the room's current rate
        let amount = room.price_per_hour * booking.duration_hours() * 100;

        let mut notes = HashMap::new();
        notes.insert("booking_id".to_string(), booking.id.to_string());
        notes.insert("user_id".to_string(), caller.to_string());

        let order = self
            .gateway
            .create_order(amount, &self.currency, &booking.id.to_string(), notes)
            .await
            .map_err(|e| WorkflowError::Upstream(e.to_string()))?;

        info!(booking_id = %booking.id, order_id = %order.id, amount, "payment order created");
        Ok(order)
    }

    /// Validate a payment proof and flip the booking to `paid`.
    ///
    /// The signature gate is the single authority against forged
    /// confirmations; on mismatch the booking is left untouched.
    /// Re-verifying an already-paid booking is a no-op.
    pub async fn verify_payment(
        &self,
        booking_id: Uuid,
        proof: &PaymentProof,
        caller: &str,
    ) -> Result<Booking, WorkflowError> {
        // 1. Required fields
        if proof.order_id.is_empty() || proof.payment_id.is_empty() || proof.signature.is_empty() {
            return Err(WorkflowError::validation("Missing payment details"));
        }

        // 2. Ownership
        let booking = self.owned_booking(booking_id, caller).await?;

        // 3. Terminal states
        if booking.payment_status == PaymentStatus::Paid {
            info!(booking_id = %booking.id, "verification retried on paid booking");
            return Ok(booking);
        }
        if booking.status == BookingStatus::Cancelled {
            return Err(WorkflowError::validation(
                "Booking has expired. Please book again.",
            ));
        }

        // 4. Signature gate
        match &self.key_secret {
            Some(secret) => {
                if !signature::verify(&proof.order_id, &proof.payment_id, secret, &proof.signature)
                {
                    return Err(WorkflowError::InvalidSignature);
                }
            }
            None => {
                warn!("test mode: skipping signature verification");
            }
        }

        // 5. Atomic flip, still constrained to owner + pending state
        match self.bookings.mark_paid(booking_id, caller).await {
            Ok(updated) => {
                info!(booking_id = %updated.id, "payment confirmed");
                Ok(updated)
            }
            Err(StoreError::Conflict) => {
                // A concurrent verification may have won; treat a booking
                // that ended up paid as success.
                let current = self
                    .bookings
                    .get_booking(booking_id)
                    .await?
                    .ok_or(WorkflowError::NotFound("Booking"))?;
                if current.payment_status == PaymentStatus::Paid {
                    Ok(current)
                } else {
                    Err(StoreError::Conflict.into())
                }
            }
            Err(e) => Err(e.into()),
        }
    }
}
