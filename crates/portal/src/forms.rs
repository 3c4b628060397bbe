//! Form validation and user-facing error text for the auth screens.

use devgate_core::{DomainError, DomainResult};
use devgate_session::{ProviderError, SignUpRequest};

const MIN_PASSWORD_LEN: usize = 6;
const MIN_NAME_LEN: usize = 2;

pub fn validate_email(email: &str) -> DomainResult<()> {
    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(DomainError::validation("invalid email address"));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> DomainResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(DomainError::validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

pub fn validate_full_name(full_name: &str) -> DomainResult<()> {
    if full_name.trim().chars().count() < MIN_NAME_LEN {
        return Err(DomainError::validation(format!(
            "name must be at least {MIN_NAME_LEN} characters"
        )));
    }
    Ok(())
}

/// Validate a registration form before it reaches the provider.
pub fn validate_sign_up(request: &SignUpRequest) -> DomainResult<()> {
    validate_email(&request.email)?;
    validate_password(&request.password)?;
    validate_full_name(&request.full_name)
}

/// Validate a sign-in form before it reaches the provider.
pub fn validate_sign_in(email: &str, password: &str) -> DomainResult<()> {
    validate_email(email)?;
    validate_password(password)
}

/// Advisory text shown when registration fails.
pub fn sign_up_error_message(error: &ProviderError) -> String {
    match error {
        ProviderError::AlreadyRegistered => {
            "This email is already registered. Please sign in instead.".to_string()
        }
        ProviderError::InvalidCredentials | ProviderError::EmailNotConfirmed => {
            "Something went wrong during registration.".to_string()
        }
        ProviderError::Unavailable(_) => {
            "Registration is temporarily unavailable. Please try again later.".to_string()
        }
    }
}

/// Advisory text shown when sign-in fails.
pub fn sign_in_error_message(error: &ProviderError) -> String {
    match error {
        ProviderError::InvalidCredentials => "Incorrect email or password.".to_string(),
        ProviderError::EmailNotConfirmed => {
            "This email has not been confirmed yet.".to_string()
        }
        ProviderError::AlreadyRegistered | ProviderError::Unavailable(_) => {
            "Something went wrong during sign-in.".to_string()
        }
    }
}
