use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::shop::Language;

string_enum! {
    MessageType ("message type") {
        OrderConfirmation => "order_confirmation",
        Campaign => "campaign",
        Reminder => "reminder",
        Offer => "offer",
        Custom => "custom",
    }
}

string_enum! {
    MessageStatus ("message status") {
        Queued => "queued",
        Sent => "sent",
        Delivered => "delivered",
        Read => "read",
        Failed => "failed",
    }
}

pub const MAX_MESSAGE_LEN: usize = 1000;

impl MessageStatus {
    /// Status only moves forward along queued, sent, delivered, read.
    /// `failed` is reachable from any non-failed state and is final.
    pub fn can_advance_to(&self, next: MessageStatus) -> bool {
        fn rank(status: MessageStatus) -> u8 {
            match status {
                MessageStatus::Queued => 0,
                MessageStatus::Sent => 1,
                MessageStatus::Delivered => 2,
                MessageStatus::Read => 3,
                MessageStatus::Failed => u8::MAX,
            }
        }
        match (self, next) {
            (MessageStatus::Failed, _) => false,
            (_, MessageStatus::Failed) => true,
            (current, next) => rank(next) > rank(*current),
        }
    }
}

pub struct OrderConfirmation<'a> {
    pub order_number: &'a str,
    pub customer_name: &'a str,
    pub total: Decimal,
    pub delivery_date: Option<NaiveDate>,
    pub shop_name: &'a str,
}

/// Renders the WhatsApp order confirmation in the shop's language.
pub fn format_order_confirmation(order: &OrderConfirmation<'_>, language: Language) -> String {
    let mut text = String::new();
    match language {
        Language::Hi => {
            text.push_str(&format!("🎉 नमस्ते {}!\n\n", order.customer_name));
            text.push_str(&format!(
                "आपका ऑर्डर #{} कन्फर्म हो गया है।\n\n",
                order.order_number
            ));
            text.push_str(&format!("💰 कुल रकम: ₹{}\n", order.total));
            if let Some(date) = order.delivery_date {
                text.push_str(&format!("📅 डिलीवरी: {}\n", date.format("%d/%m/%Y")));
            }
            text.push_str(&format!(
                "\n{} में खरीदारी के लिए धन्यवाद! 🙏",
                order.shop_name
            ));
        }
        Language::En => {
            text.push_str(&format!("🎉 Hello {}!\n\n", order.customer_name));
            text.push_str(&format!(
                "Your order #{} has been confirmed.\n\n",
                order.order_number
            ));
            text.push_str(&format!("💰 Total: ₹{}\n", order.total));
            if let Some(date) = order.delivery_date {
                text.push_str(&format!("📅 Delivery: {}\n", date.format("%d/%m/%Y")));
            }
            text.push_str(&format!(
                "\nThank you for shopping at {}! 🙏",
                order.shop_name
            ));
        }
    }
    text
}
