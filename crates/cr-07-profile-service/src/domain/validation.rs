//! Profile field rules.

use shared_types::{CommandError, ProfileFields, ProfileUpdate};

const PHONE_MIN_DIGITS: usize = 10;
const PHONE_MAX_DIGITS: usize = 15;

/// Check the fields of a new profile.
pub fn validate_fields(fields: &ProfileFields) -> Result<(), CommandError> {
    require_text("name", &fields.name)?;
    require_text("surname", &fields.surname)?;
    require_text("address", &fields.address)?;
    validate_phone(&fields.phone_number)
}

/// Check the fields present in an update.
pub fn validate_update(update: &ProfileUpdate) -> Result<(), CommandError> {
    if let Some(name) = &update.name {
        require_text("name", name)?;
    }
    if let Some(surname) = &update.surname {
        require_text("surname", surname)?;
    }
    if let Some(address) = &update.address {
        require_text("address", address)?;
    }
    if let Some(phone) = &update.phone_number {
        validate_phone(phone)?;
    }
    Ok(())
}

fn require_text(field: &str, value: &str) -> Result<(), CommandError> {
    if value.trim().is_empty() {
        return Err(CommandError::validation(format!("{field} must not be empty")));
    }
    Ok(())
}

/// 10 to 15 digits, optionally prefixed with `+`.
fn validate_phone(phone: &str) -> Result<(), CommandError> {
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    let well_formed = digits.chars().all(|c| c.is_ascii_digit())
        && (PHONE_MIN_DIGITS..=PHONE_MAX_DIGITS).contains(&digits.len());
    if !well_formed {
        return Err(CommandError::validation(format!(
            "phone_number must be {PHONE_MIN_DIGITS}-{PHONE_MAX_DIGITS} digits with an optional leading '+'"
        )));
    }
    Ok(())
}
