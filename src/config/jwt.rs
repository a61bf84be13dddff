use secrecy::SecretString;
use serde::Deserialize;

/// Verification settings for tokens issued by the identity provider.
#[derive(Debug, Deserialize)]
pub struct JwtSettings {
    pub secret: SecretString,
    /// When set, the `iss` claim must match.
    pub issuer: Option<String>,
}

impl JwtSettings {
    pub fn new(secret: String, issuer: Option<String>) -> Self {
        Self {
            secret: SecretString::new(secret.into_boxed_str()),
            issuer,
        }
    }
}
