//! Parsers turning raw prompt text into typed booking input.
//!
//! Each returns a result instead of failing; the driver re-prompts on error.
//! Range checks belong to the booking workflow, not to these functions.

use crate::{
    error::ValidationError,
    models::{AcTier, TicketClass, TierChoice},
};

/// Parse an age as a non-negative integer.
pub fn parse_age(raw: &str) -> Result<u32, ValidationError> {
    raw.trim().parse::<u32>().map_err(|_| malformed("age", raw))
}

/// Parse a fare amount. Non-finite values are rejected as malformed.
pub fn parse_fare(raw: &str) -> Result<f64, ValidationError> {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(malformed("fare", raw)),
    }
}

/// Parse the ticket type menu choice: `1`/`sleeper` or `2`/`ac`.
pub fn parse_class_choice(raw: &str) -> Result<TicketClass, ValidationError> {
    let choice = raw.trim();
    match choice.to_ascii_lowercase().as_str() {
        "1" | "sleeper" => Ok(TicketClass::Sleeper),
        "2" | "ac" => Ok(TicketClass::Ac),
        _ => Err(ValidationError::InvalidTicketClass(choice.to_string())),
    }
}

/// Parse the AC tier menu choice. Digits `1`-`3` and codes `1A`-`3A` are
/// recognized; anything else is kept for the workflow to default.
pub fn parse_tier_choice(raw: &str) -> TierChoice {
    let choice = raw.trim();
    let tier = match choice {
        "1" => Some(AcTier::First),
        "2" => Some(AcTier::Second),
        "3" => Some(AcTier::Third),
        code => AcTier::from_code(code),
    };
    match tier {
        Some(tier) => TierChoice::Tier(tier),
        None => TierChoice::Unrecognized(choice.to_string()),
    }
}

/// Trim a ticket id prompt, rejecting blank input.
pub fn parse_ticket_id(raw: &str) -> Result<String, ValidationError> {
    let id = raw.trim();
    if id.is_empty() {
        Err(ValidationError::EmptyTicketId)
    } else {
        Ok(id.to_string())
    }
}

fn malformed(field: &'static str, raw: &str) -> ValidationError {
    ValidationError::Malformed {
        field,
        input: raw.trim().to_string(),
    }
}
