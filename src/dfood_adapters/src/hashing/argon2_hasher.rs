use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordVerifier, Version,
    password_hash::{self, PasswordHasher as _, SaltString, rand_core},
};
use dfood_core::{HashedPassword, Password, PasswordHashError, PasswordHasher};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct HashingParams {
    #[serde(default = "default_memory_kib")]
    pub memory_kib: u32,
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
}

impl Default for HashingParams {
    fn default() -> Self {
        Self {
            memory_kib: default_memory_kib(),
            iterations: default_iterations(),
            parallelism: default_parallelism(),
        }
    }
}

fn default_memory_kib() -> u32 {
    15000
}

fn default_iterations() -> u32 {
    2
}

fn default_parallelism() -> u32 {
    1
}

#[derive(Debug, Clone)]
pub struct Argon2PasswordHasher {
    params: Params,
}

impl Argon2PasswordHasher {
    pub fn new(params: HashingParams) -> Result<Self, PasswordHashError> {
        let params = Params::new(
            params.memory_kib,
            params.iterations,
            params.parallelism,
            None,
        )
        .map_err(|e| PasswordHashError::Unexpected(e.to_string()))?;

        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

#[async_trait::async_trait]
impl PasswordHasher for Argon2PasswordHasher {
    #[tracing::instrument(name = "Computing password hash", skip_all)]
    async fn hash(&self, password: &Password) -> Result<HashedPassword, PasswordHashError> {
        let current_span: tracing::Span = tracing::Span::current();
        let hasher = self.argon2();
        let password: Secret<String> = password.as_ref().clone();

        tokio::task::spawn_blocking(move || {
            current_span.in_scope(move || {
                let salt: SaltString = SaltString::generate(rand_core::OsRng);
                hasher
                    .hash_password(password.expose_secret().as_bytes(), &salt)
                    .map(|h| HashedPassword::new(Secret::from(h.to_string())))
                    .map_err(|e| PasswordHashError::Unexpected(e.to_string()))
            })
        })
        .await
        .map_err(|e| PasswordHashError::Unexpected(e.to_string()))?
    }

    #[tracing::instrument(name = "Verify password hash", skip_all)]
    async fn verify(
        &self,
        hash: &HashedPassword,
        candidate: &Password,
    ) -> Result<bool, PasswordHashError> {
        let current_span: tracing::Span = tracing::Span::current();
        let verifier = self.argon2();
        let expected: Secret<String> = hash.as_ref().clone();
        let candidate: Secret<String> = candidate.as_ref().clone();

        tokio::task::spawn_blocking(move || {
            current_span.in_scope(move || {
                let expected = PasswordHash::new(expected.expose_secret())
                    .map_err(|e| PasswordHashError::MalformedHash(e.to_string()))?;

                match verifier.verify_password(candidate.expose_secret().as_bytes(), &expected) {
                    Ok(()) => Ok(true),
                    Err(password_hash::Error::Password) => Ok(false),
                    Err(e) => Err(PasswordHashError::Unexpected(e.to_string())),
                }
            })
        })
        .await
        .map_err(|e| PasswordHashError::Unexpected(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap_hasher() -> Argon2PasswordHasher {
        Argon2PasswordHasher::new(HashingParams {
            memory_kib: 64,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap()
    }

    fn password(s: &str) -> Password {
        Password::try_from(Secret::from(s.to_owned())).unwrap()
    }

    #[tokio::test]
    async fn hash_is_argon2id_phc_string() {
        let hash = cheap_hasher().hash(&password("secret1")).await.unwrap();
        assert!(hash.as_str().starts_with("$argon2id$v=19$"));
        assert!(!hash.as_str().contains("secret1"));
    }

    #[tokio::test]
    async fn verifies_matching_password_only() {
        let hasher = cheap_hasher();
        let hash = hasher.hash(&password("secret1")).await.unwrap();

        assert!(hasher.verify(&hash, &password("secret1")).await.unwrap());
        assert!(!hasher.verify(&hash, &password("secret2")).await.unwrap());
    }

    #[tokio::test]
    async fn same_password_gets_distinct_salts() {
        let hasher = cheap_hasher();
        let first = hasher.hash(&password("secret1")).await.unwrap();
        let second = hasher.hash(&password("secret1")).await.unwrap();

        assert_ne!(first.as_str(), second.as_str());
    }

    #[tokio::test]
    async fn malformed_stored_hash_is_an_error() {
        let result = cheap_hasher()
            .verify(
                &HashedPassword::new(Secret::from("not-a-phc-string".to_owned())),
                &password("secret1"),
            )
            .await;

        assert!(matches!(result, Err(PasswordHashError::MalformedHash(_))));
    }

    #[test]
    fn default_params_match_production_cost() {
        let params = HashingParams::default();
        assert_eq!(
            (params.memory_kib, params.iterations, params.parallelism),
            (15000, 2, 1)
        );
    }
}
