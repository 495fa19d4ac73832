use crate::error::Error;
use serde::Deserialize;
use serde_json::Value;

/// Per-issuer solver configuration, e.g.
///
/// ```json
/// { "apiKeySecretRef": { "name": "op-creds", "key": "api-key" } }
/// ```
///
/// Credentials are never part of the config itself, only a reference to the secret holding them.
#[derive(Deserialize, Debug, Clone, Default, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    pub api_key_secret_ref: SecretKeySelector,
}

/// Selects one field of a secret in the challenge's namespace.
#[derive(Deserialize, Debug, Clone, Default, Eq, PartialEq)]
pub struct SecretKeySelector {
    pub name: String,
    pub key: String,
}

impl ProviderConfig {
    /// Decode the raw config attached to a challenge. No config at all (absent or `null`) is
    /// the zero value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the config is present but doesn't have the expected shape.
    pub fn decode(raw: Option<&Value>) -> Result<Self, Error> {
        match raw {
            None | Some(Value::Null) => Ok(Self::default()),
            Some(raw) => Self::deserialize(raw).map_err(Error::Decode),
        }
    }
}
