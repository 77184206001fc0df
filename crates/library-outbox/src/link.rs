//! WhatsApp deep links.

use crate::{OutboxError, OutboxResult};

const WHATSAPP_BASE: &str = "https://wa.me";

/// Strips everything but digits and prefixes `country_code` to bare
/// 10-digit numbers. Returns `None` if no digits remain.
pub fn format_number(mobile: &str, country_code: &str) -> Option<String> {
    let digits: String = mobile.chars().filter(|c| c.is_ascii_digit()).collect();
    match digits.len() {
        0 => None,
        10 => Some(format!("{country_code}{digits}")),
        _ => Some(digits),
    }
}

/// `https://wa.me/<number>?text=<percent-encoded message>`
pub fn whatsapp_link(mobile: &str, message: &str, country_code: &str) -> OutboxResult<String> {
    let number = format_number(mobile, country_code)
        .ok_or_else(|| OutboxError::InvalidNumber(mobile.to_string()))?;
    Ok(format!(
        "{WHATSAPP_BASE}/{number}?text={}",
        urlencoding::encode(message)
    ))
}
