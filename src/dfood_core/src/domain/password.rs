use secrecy::{ExposeSecret, Secret};

use crate::domain::user::UserError;

/// Shortest password accepted for a new or changed credential.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// A plaintext password candidate.
///
/// Parsing only rejects empty input, so that login attempts with credentials
/// created under an older policy are still checked against the stored hash.
/// Call [`Password::check_policy`] before persisting a new password.
#[derive(Debug, Clone)]
pub struct Password(Secret<String>);

impl Password {
    pub fn check_policy(&self) -> Result<(), UserError> {
        if self.0.expose_secret().chars().count() < MIN_PASSWORD_LENGTH {
            return Err(UserError::PasswordTooShort);
        }
        Ok(())
    }
}

impl AsRef<Secret<String>> for Password {
    fn as_ref(&self) -> &Secret<String> {
        &self.0
    }
}

impl TryFrom<Secret<String>> for Password {
    type Error = UserError;

    fn try_from(value: Secret<String>) -> Result<Self, Self::Error> {
        if value.expose_secret().is_empty() {
            return Err(UserError::MissingPassword);
        }
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    fn parse(s: &str) -> Result<Password, UserError> {
        Password::try_from(Secret::from(s.to_owned()))
    }

    #[test]
    fn empty_password_is_rejected() {
        assert!(matches!(parse(""), Err(UserError::MissingPassword)));
    }

    #[test]
    fn short_password_parses_but_fails_policy() {
        let password = parse("abc").unwrap();
        assert_eq!(password.check_policy(), Err(UserError::PasswordTooShort));
    }

    #[test]
    fn policy_counts_characters_not_bytes() {
        let password = parse("ééééé").unwrap();
        assert_eq!(password.check_policy(), Err(UserError::PasswordTooShort));
        assert!(parse("éééééé").unwrap().check_policy().is_ok());
    }

    #[quickcheck]
    fn policy_matches_minimum_length(input: String) -> bool {
        match parse(&input) {
            Ok(password) => {
                password.check_policy().is_ok() == (input.chars().count() >= MIN_PASSWORD_LENGTH)
            }
            Err(_) => input.is_empty(),
        }
    }
}
