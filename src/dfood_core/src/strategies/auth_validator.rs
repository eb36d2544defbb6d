use async_trait::async_trait;

/// Admits or rejects an inbound request by the session token it carries.
///
/// Validators see only the request parts (headers, URI, extensions), never
/// the body, so they can run in middleware ahead of any extractor.
#[async_trait]
pub trait AuthValidator: Clone + Send + Sync + 'static {
    /// What a successful validation hands to downstream handlers.
    type Claims: Clone + Send + Sync + 'static;

    /// Typically `http::request::Parts`.
    type RequestParts;

    type Error: std::error::Error + Send + Sync + 'static;

    /// Locate the token in `parts` and verify it.
    ///
    /// # Errors
    ///
    /// Fails when no token is present, when verification rejects it, or when
    /// the revocation store cannot be consulted.
    async fn validate(&self, parts: &Self::RequestParts) -> Result<Self::Claims, Self::Error>;
}
