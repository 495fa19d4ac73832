//! Error types.

use crate::secrets::SecretStoreError;

/// Error enumerates the possible solver error states.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Returned when the startup configuration can't produce a working solver, e.g. when
    /// `GROUP_NAME` is unset, the cluster access configuration is incomplete, or a
    /// [`Solver`][crate::solver::Solver] is used before it has been initialized.
    #[error("configuration error: {0}")]
    Config(String),

    /// Returned when the per-issuer solver config attached to a challenge doesn't match the
    /// expected `{"apiKeySecretRef": {"name": ..., "key": ...}}` shape.
    #[error("error decoding solver config: {0}")]
    Decode(#[source] serde_json::Error),

    /// Returned when the secret holding the provider API key can't be fetched.
    #[error("error fetching API key secret: {0}")]
    SecretLookup(#[from] SecretStoreError),

    /// Returned when the API key secret exists but doesn't hold the configured field.
    #[error("key \"{key}\" not found in secret \"{namespace}/{name}\"")]
    SecretKey {
        key: String,
        namespace: String,
        name: String,
    },

    /// Returned when the Openprovider API couldn't be reached (DNS, connect or TLS failure).
    #[error("error reaching the DNS provider")]
    Transport(#[from] reqwest::Error),

    /// Returned when the Openprovider API answers a zone update with anything but HTTP 200.
    #[error("invalid status {status} while updating zone")]
    ProviderApi { status: u16 },

    /// Returned when a webhook request names a group, version or solver this process doesn't
    /// serve.
    #[error("no solver \"{solver}\" registered for \"{group}/{version}\"")]
    UnknownSolver {
        group: String,
        version: String,
        solver: String,
    },

    /// Returned when a webhook `ChallengePayload` carries no `request`.
    #[error("challenge payload has no request")]
    MissingChallengeRequest,

    /// Returned when a generic IO error occurs.
    #[error("an IO error occurred")]
    IO(#[from] std::io::Error),

    /// Returned when reading JSON from disk, or writing a request body, fails.
    #[error("invalid JSON")]
    InvalidJSON(#[from] serde_json::Error),
}

impl Error {
    /// A short machine-readable reason, reported back to the webhook caller alongside the
    /// error message.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Error::Config(_) | Error::IO(_) => "ConfigError",
            Error::Decode(_) | Error::InvalidJSON(_) => "DecodeError",
            Error::SecretLookup(_) => "SecretLookupError",
            Error::SecretKey { .. } => "SecretKeyError",
            Error::Transport(_) => "TransportError",
            Error::ProviderApi { .. } => "ProviderAPIError",
            Error::UnknownSolver { .. } => "NotFound",
            Error::MissingChallengeRequest => "BadRequest",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_key_message_names_the_secret() {
        let err = Error::SecretKey {
            key: "api-key".to_string(),
            namespace: "default".to_string(),
            name: "op-creds".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "key \"api-key\" not found in secret \"default/op-creds\""
        );
        assert_eq!(err.reason(), "SecretKeyError");
    }

    #[test]
    fn provider_api_error_carries_status() {
        let err = Error::ProviderApi { status: 403 };
        assert_eq!(err.to_string(), "invalid status 403 while updating zone");
        assert_eq!(err.reason(), "ProviderAPIError");
    }
}
