use std::borrow::Cow;

use rust_decimal::Decimal;
use validator::ValidationError;

fn digits_of_len(value: &str, len: usize) -> bool {
    value.len() == len && value.bytes().all(|b| b.is_ascii_digit())
}

pub fn is_valid_phone(value: &str) -> bool {
    digits_of_len(value, 10)
}

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

pub fn validate_phone(value: &str) -> Result<(), ValidationError> {
    if is_valid_phone(value) {
        Ok(())
    } else {
        Err(invalid(
            "phone",
            "Please provide a valid 10-digit phone number",
        ))
    }
}

pub fn validate_pincode(value: &str) -> Result<(), ValidationError> {
    if digits_of_len(value, 6) {
        Ok(())
    } else {
        Err(invalid("pincode", "Please provide a valid 6-digit pincode"))
    }
}

pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(invalid("blank", "must not be blank"))
    } else {
        Ok(())
    }
}

pub fn validate_non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        Err(invalid("range", "cannot be negative"))
    } else {
        Ok(())
    }
}

/// International form used by the messaging provider (India, `91` prefix).
pub fn whatsapp_recipient(phone: &str) -> String {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    if digits.len() == 12 && digits.starts_with("91") {
        digits
    } else {
        let last_ten = &digits[digits.len().saturating_sub(10)..];
        format!("91{last_ten}")
    }
}
