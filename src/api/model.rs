use crate::error::Error;
use crate::solver::ChallengeRequest;
use serde::{Deserialize, Serialize};

/// The `apiVersion` of webhook payloads, and the version path segment they are posted to.
pub(super) const API_VERSION: &str = "v1alpha1";

const PAYLOAD_KIND: &str = "ChallengePayload";

/// The envelope cert-manager posts to a webhook solver, and gets back with `response` filled in.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(super) struct ChallengePayload {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<ChallengeRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<ChallengeResponse>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, Eq, PartialEq)]
pub(super) struct ChallengeResponse {
    pub uid: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
}

/// A Kubernetes `metav1.Status` style failure description.
#[derive(Serialize, Deserialize, Debug, Clone, Default, Eq, PartialEq)]
pub(super) struct Status {
    pub status: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
}

impl ChallengePayload {
    /// Wrap the outcome of solving `request` into a response payload.
    pub fn response_for(request: &ChallengeRequest, result: &Result<(), Error>) -> Self {
        let status = match result {
            Ok(()) => None,
            Err(err) => Some(Status {
                status: "Failure".to_string(),
                message: err.to_string(),
                reason: err.reason().to_string(),
                code: match err {
                    Error::ProviderApi { status } => Some(*status),
                    _ => None,
                },
            }),
        };
        Self {
            api_version: format!("webhook.acme.cert-manager.io/{API_VERSION}"),
            kind: PAYLOAD_KIND.to_string(),
            request: None,
            response: Some(ChallengeResponse {
                uid: request.uid.clone(),
                success: result.is_ok(),
                status,
            }),
        }
    }
}
