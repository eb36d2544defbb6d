use secrecy::{ExposeSecret, Secret};

/// One-way hash of a password in PHC string format.
///
/// Only the credential store and the password hasher ever see this value; it
/// is stripped before a user leaves the orchestrator.
#[derive(Debug, Clone)]
pub struct HashedPassword(Secret<String>);

impl HashedPassword {
    pub fn new(phc: Secret<String>) -> Self {
        Self(phc)
    }

    pub fn as_str(&self) -> &str {
        self.0.expose_secret()
    }
}

impl AsRef<Secret<String>> for HashedPassword {
    fn as_ref(&self) -> &Secret<String> {
        &self.0
    }
}
