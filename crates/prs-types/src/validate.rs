//! Custom garde rules shared by review and feedback payloads.
//!
//! Each rule reports its [`ValidationKind`] code as the garde message, so a
//! failed report converts back into a typed [`crate::ValidationError`].

use serde_json::Number;

use crate::error::ValidationKind;

pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 5;

/// Rating submitted as a JSON number must be a whole number in `MIN_RATING..=MAX_RATING`.
///
/// `2.0` is rejected as non-integral even though its magnitude is fine.
pub fn check_rating(value: Option<&Number>) -> Result<i64, ValidationKind> {
    let number = value.ok_or(ValidationKind::Presence)?;
    let rating = match number.as_i64() {
        Some(rating) => rating,
        // whole number beyond i64
        None if number.as_u64().is_some() => return Err(ValidationKind::Range),
        None => return Err(ValidationKind::Integer),
    };
    if (MIN_RATING..=MAX_RATING).contains(&rating) {
        Ok(rating)
    } else {
        Err(ValidationKind::Range)
    }
}

pub fn whole_rating(value: &Option<Number>, _ctx: &()) -> garde::Result {
    check_rating(value.as_ref())
        .map(|_| ())
        .map_err(ValidationKind::to_garde)
}

pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

pub fn presence(value: &str, _ctx: &()) -> garde::Result {
    if is_blank(value) {
        Err(ValidationKind::Presence.to_garde())
    } else {
        Ok(())
    }
}

pub fn required_text(value: &Option<String>, _ctx: &()) -> garde::Result {
    match value {
        Some(text) if !is_blank(text) => Ok(()),
        _ => Err(ValidationKind::Presence.to_garde()),
    }
}
