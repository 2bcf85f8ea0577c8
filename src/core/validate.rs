//! Amount and currency pair validation

use thiserror::Error;

pub const MAX_AMOUNT: f64 = 999_999_999.0;

/// Rules are listed in the order they are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter an amount to convert")]
    Empty,
    #[error("Special characters or letters are not allowed")]
    DisallowedCharacters,
    #[error("Please enter a valid number")]
    NotANumber,
    #[error("Amount cannot be negative")]
    Negative,
    #[error("Amount must be greater than zero")]
    Zero,
    #[error("Amount is too large. Please enter a smaller number")]
    TooLarge,
    #[error("Please select different currencies to convert")]
    SameCurrency,
}

/// A submission that passed every rule.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRequest {
    pub amount: f64,
    pub from: String,
    pub to: String,
}

pub fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

fn is_allowed(c: char) -> bool {
    c.is_ascii_digit() || c == '.'
}

/// Checks the raw form fields, first failing rule wins.
pub fn validate(amount: &str, from: &str, to: &str) -> Result<ConversionRequest, ValidationError> {
    let input = amount.trim();
    if input.is_empty() {
        return Err(ValidationError::Empty);
    }

    // A single leading minus is a sign, so negative input reaches its own rule.
    let unsigned = input.strip_prefix('-').unwrap_or(input);
    if !unsigned.chars().all(is_allowed) {
        return Err(ValidationError::DisallowedCharacters);
    }

    let amount: f64 = input.parse().map_err(|_| ValidationError::NotANumber)?;
    if amount < 0.0 {
        return Err(ValidationError::Negative);
    }
    if amount == 0.0 {
        return Err(ValidationError::Zero);
    }
    if amount > MAX_AMOUNT {
        return Err(ValidationError::TooLarge);
    }

    let from = normalize_code(from);
    let to = normalize_code(to);
    if from == to {
        return Err(ValidationError::SameCurrency);
    }

    Ok(ConversionRequest { amount, from, to })
}

/// Cleans the amount field while it is being typed.
///
/// Drops characters outside `[0-9.]` (a leading `-` is kept) and keeps only
/// the first decimal point.
pub fn sanitize_amount_input(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut seen_point = false;
    for c in raw.chars() {
        match c {
            '-' if out.is_empty() => out.push(c),
            '.' if !seen_point => {
                seen_point = true;
                out.push(c);
            }
            c if c.is_ascii_digit() => out.push(c),
            _ => {}
        }
    }
    out
}
