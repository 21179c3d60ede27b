//! SMTP credentials from the environment.

use std::env;

use crate::core::types::Credentials;
use crate::error::RunnerError;

/// Environment variable holding the SMTP login (also the sender address).
pub const LOGIN_VAR: &str = "LOGIN_MAIL";
/// Environment variable holding the SMTP password.
pub const PASSWORD_VAR: &str = "PASSWORD_MAIL";

/// Read credentials from the process environment.
///
/// A `.env` file in the working directory is loaded first when present,
/// without overriding variables that are already set.
pub fn resolve() -> Result<Credentials, RunnerError> {
    dotenvy::dotenv().ok();
    resolve_from(|name| env::var(name).ok())
}

/// Credential lookup against an arbitrary source, the seam used by tests.
pub fn resolve_from(
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Credentials, RunnerError> {
    let login = lookup(LOGIN_VAR).ok_or_else(|| RunnerError::MissingCredential {
        name: LOGIN_VAR.to_string(),
    })?;
    let password = lookup(PASSWORD_VAR).ok_or_else(|| RunnerError::MissingCredential {
        name: PASSWORD_VAR.to_string(),
    })?;
    Ok(Credentials { login, password })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_both_variables() {
        let credentials = resolve_from(|name| match name {
            LOGIN_VAR => Some("runner@example.com".to_string()),
            PASSWORD_VAR => Some("hunter2".to_string()),
            _ => None,
        })
        .expect("credentials");

        assert_eq!(credentials.login, "runner@example.com");
        assert_eq!(credentials.password, "hunter2");
    }

    #[test]
    fn missing_login_is_named() {
        let err = resolve_from(|name| {
            (name == PASSWORD_VAR).then(|| "hunter2".to_string())
        })
        .unwrap_err();

        assert!(matches!(err, RunnerError::MissingCredential { ref name } if name == LOGIN_VAR));
    }

    #[test]
    fn missing_password_is_named() {
        let err = resolve_from(|name| {
            (name == LOGIN_VAR).then(|| "runner@example.com".to_string())
        })
        .unwrap_err();

        assert!(matches!(err, RunnerError::MissingCredential { ref name } if name == PASSWORD_VAR));
    }
}
