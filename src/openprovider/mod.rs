//! Openprovider DNS zone API client.
//!
//! Only one call is needed: `PUT /v1beta/dns/zones/{zone}` with a [`model::ZoneUpdateRequest`]
//! describing the records to add or remove. The provider answers HTTP 200 when the update was
//! applied; anything else is reported as [`Error::ProviderApi`].

pub mod model;

use crate::error::Error;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;

pub use model::{build, Operation, RecordType, ZoneRecord, ZoneUpdateRequest};

pub const DEFAULT_BASE_URL: &str = "https://api.openprovider.eu";

const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// A handle to the zone API. Cheap to share; holds no per-call state.
#[derive(Debug, Clone)]
pub struct ZoneClient {
    client: reqwest::Client,
    base_url: String,
}

impl ZoneClient {
    /// Create a client for the API rooted at `base_url`, giving up on requests that take longer
    /// than `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the HTTP client can't be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| Error::Config(format!("failed to create HTTP client: {err}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Apply `update` to its zone, authenticating with `api_key`. A single attempt is made.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the API can't be reached, and [`Error::ProviderApi`] if it
    /// answers with a status other than 200.
    pub async fn update_zone(
        &self,
        api_key: &SecretString,
        update: &ZoneUpdateRequest,
    ) -> Result<(), Error> {
        let url = format!("{}/v1beta/dns/zones/{}", self.base_url, update.name);
        let body = serde_json::to_vec(update)?;

        let resp = self
            .client
            .put(&url)
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .bearer_auth(api_key.expose_secret())
            .body(body)
            .send()
            .await?;

        match resp.status() {
            StatusCode::OK => Ok(()),
            status => {
                tracing::debug!(zone = %update.name, %status, "zone update rejected");
                Err(Error::ProviderApi {
                    status: status.as_u16(),
                })
            }
        }
    }
}
