use rustrict::CensorStr;
use validator::Validate;

use crate::{ServiceError, ServiceResult};

/// bcrypt only looks at the first 72 bytes of a password.
pub const MAX_PASSWORD_BYTES: usize = 72;

#[derive(Validate)]
struct CredentialsValidator {
    #[validate(length(
        min = 3,
        max = 20,
        message = "Username must be between 3 and 20 characters"
    ))]
    username: String,
    #[validate(length(
        min = 6,
        max = 72,
        message = "Password must be between 6 and 72 characters"
    ))]
    password: String,
}

pub fn validate_credentials(username: &str, password: &str) -> ServiceResult<()> {
    let validator = CredentialsValidator {
        username: username.to_string(),
        password: password.to_string(),
    };
    if let Err(errors) = validator.validate() {
        let field_errors = errors.field_errors();
        for field in ["username", "password"] {
            if let Some(message) = field_errors
                .get(field)
                .and_then(|errs| errs.first())
                .and_then(|err| err.message.as_ref())
            {
                return ServiceError::bad_request(message.to_string());
            }
        }
        return ServiceError::bad_request(format!("Invalid credentials: {}", errors));
    }
    if password.len() > MAX_PASSWORD_BYTES {
        return ServiceError::bad_request("Password is too long");
    }
    validate_username(username)
}

fn validate_username(username: &str) -> ServiceResult<()> {
    if username
        .chars()
        .next()
        .is_none_or(|c| !c.is_ascii_alphabetic())
    {
        return ServiceError::bad_request("Username must start with a letter");
    }
    if username
        .chars()
        .any(|c| !c.is_ascii_alphanumeric() && c != '_')
    {
        return ServiceError::bad_request("Username must be alphanumeric");
    }
    if username.is_inappropriate() {
        return ServiceError::bad_request("Username contains inappropriate content");
    }
    Ok(())
}
