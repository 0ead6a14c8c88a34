use chrono::{DateTime, Months, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

string_enum! {
    PaymentState ("payment state") {
        Created => "created",
        Pending => "pending",
        Success => "success",
        Failed => "failed",
        Refunded => "refunded",
    }
}

type HmacSha256 = Hmac<Sha256>;

fn signature_payload(order_id: &str, payment_id: &str) -> String {
    format!("{order_id}|{payment_id}")
}

/// Hex HMAC-SHA256 of `order_id|payment_id`, as the gateway signs callbacks.
pub fn sign(secret: &str, order_id: &str, payment_id: &str) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(signature_payload(order_id, payment_id).as_bytes());
    Some(hex::encode(mac.finalize().into_bytes()))
}

/// Constant-time check of a callback signature.
pub fn verify_signature(secret: &str, order_id: &str, payment_id: &str, signature: &str) -> bool {
    let Ok(expected) = hex::decode(signature.trim()) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(signature_payload(order_id, payment_id).as_bytes());
    mac.verify_slice(&expected).is_ok()
}

/// Subscription validity starting at `now` and lasting one calendar month.
pub fn validity_window(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let until = now
        .checked_add_months(Months::new(1))
        .unwrap_or(now + chrono::Duration::days(30));
    (now, until)
}

pub fn receipt_id(now: DateTime<Utc>) -> String {
    format!("receipt_{}", now.timestamp_millis())
}
