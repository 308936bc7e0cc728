//! Credential rules.

use shared_types::CommandError;
use subtle::ConstantTimeEq;

pub const PASSWORD_MIN_LEN: usize = 8;
pub const PASSWORD_MAX_LEN: usize = 16;

/// `local@domain`, both parts non-empty, no whitespace.
pub fn validate_email(email: &str) -> Result<(), CommandError> {
    let well_formed = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !domain.contains('@') && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if !well_formed {
        return Err(CommandError::validation("email must be a valid email address"));
    }
    Ok(())
}

pub fn validate_login(login: &str) -> Result<(), CommandError> {
    if login.trim().is_empty() {
        return Err(CommandError::validation("login must not be empty"));
    }
    Ok(())
}

/// Length in characters, not bytes.
pub fn validate_password(password: &str) -> Result<(), CommandError> {
    let len = password.chars().count();
    if !(PASSWORD_MIN_LEN..=PASSWORD_MAX_LEN).contains(&len) {
        return Err(CommandError::validation(format!(
            "password must be {PASSWORD_MIN_LEN} to {PASSWORD_MAX_LEN} characters"
        )));
    }
    Ok(())
}

/// Constant-time string equality.
pub fn credential_matches(provided: &str, expected: &str) -> bool {
    let max_len = provided.len().max(expected.len());

    // Different pad bytes so unequal lengths never compare equal
    let mut a = vec![0u8; max_len];
    let mut b = vec![0xFFu8; max_len];
    a[..provided.len()].copy_from_slice(provided.as_bytes());
    b[..expected.len()].copy_from_slice(expected.as_bytes());

    let lengths_equal = provided.len().ct_eq(&expected.len());
    let contents_equal = a.ct_eq(&b);
    (lengths_equal & contents_equal).into()
}
