use crate::models::inbound::WHATSAPP_PREFIX;

/// Checks the E.164 shape: a `+` followed by 8 to 15 digits. A leading
/// `whatsapp:` channel prefix is allowed.
pub fn is_valid_phone_number(phone: &str) -> bool {
    let number = phone.strip_prefix(WHATSAPP_PREFIX).unwrap_or(phone);
    let Some(digits) = number.strip_prefix('+') else {
        return false;
    };

    (8..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit())
}

/// Masks all but the last four digits for logging, keeping any `+` and
/// channel prefix visible.
pub fn mask_phone_number(phone: &str) -> String {
    let (prefix, number) = match phone.strip_prefix(WHATSAPP_PREFIX) {
        Some(rest) => (WHATSAPP_PREFIX, rest),
        None => ("", phone),
    };
    let (plus, digits) = match number.strip_prefix('+') {
        Some(rest) => ("+", rest),
        None => ("", number),
    };

    let len = digits.chars().count();
    if len <= 4 {
        return format!("{prefix}{plus}{}", "*".repeat(len));
    }
    let last: String = digits.chars().skip(len - 4).collect();
    format!("{prefix}{plus}{}{last}", "*".repeat(len - 4))
}
