use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Hex-encoded HMAC-SHA256 over `order_id + "|" + payment_id`, the proof
/// the payment gateway hands back alongside a completed payment.
pub fn compute(order_id: &str, payment_id: &str, secret: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Constant-time check of a client-supplied signature. Anything that is
/// not valid hex of the right length fails without further inspection.
pub fn verify(order_id: &str, payment_id: &str, secret: &str, supplied: &str) -> bool {
    let supplied_bytes = match hex::decode(supplied) {
        Ok(b) => b,
        Err(_) => return false,
    };

    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());

    // Mac::verify_slice compares in constant time.
    mac.verify_slice(&supplied_bytes).is_ok()
}
