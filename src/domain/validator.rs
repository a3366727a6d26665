use crate::error::ValidationError;

/// Removes every whitespace character from a card number as typed by a user
/// (`"4111 1111 1111 1111"` becomes `"4111111111111111"`).
pub fn normalize_number(pan: &str) -> String {
    pan.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Validates a card number with the Luhn checksum.
///
/// Whitespace is ignored. Any other non-digit character, or a number with no
/// digits at all, is rejected.
pub fn validate_number(pan: &str) -> Result<(), ValidationError> {
    let digits = normalize_number(pan);
    if digits.is_empty() {
        return Err(ValidationError::InvalidCardNumber);
    }

    let mut sum = 0u64;
    for (distance_from_end, c) in digits.chars().rev().enumerate() {
        let mut digit = c.to_digit(10).ok_or(ValidationError::InvalidCardNumber)?;
        if distance_from_end % 2 == 1 {
            digit *= 2;
            if digit > 9 {
                digit -= 9;
            }
        }
        sum += u64::from(digit);
    }

    if sum % 10 == 0 {
        Ok(())
    } else {
        Err(ValidationError::InvalidCardNumber)
    }
}

/// Validates an expiry of the exact form `MM/YY` with a month in `01..=12`.
///
/// Only the format is checked: an expiry in the past is accepted.
pub fn validate_expiry(expiry: &str) -> Result<(), ValidationError> {
    let bytes = expiry.as_bytes();
    if bytes.len() != 5 || bytes[2] != b'/' {
        return Err(ValidationError::InvalidExpiry);
    }
    if ![0, 1, 3, 4].iter().all(|&i| bytes[i].is_ascii_digit()) {
        return Err(ValidationError::InvalidExpiry);
    }

    let month = (bytes[0] - b'0') * 10 + (bytes[1] - b'0');
    if (1..=12).contains(&month) {
        Ok(())
    } else {
        Err(ValidationError::InvalidExpiry)
    }
}
