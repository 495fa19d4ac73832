//! HTTP API cert-manager calls to solve DNS-01 challenges.
//!
//! # API Endpoints
//!
//! ## `/healthcheck` (GET)
//!
//!   Returns HTTP 200 (OK) and the JSON body `{"ok":"healthy"}` when the service is operational.
//!
//! ## `/apis/{group}/v1alpha1/{solver}` (POST)
//!
//!   Expects a `ChallengePayload` JSON request body of the form:
//!
//!   ```json
//!   {
//!     "apiVersion": "webhook.acme.cert-manager.io/v1alpha1",
//!     "kind": "ChallengePayload",
//!     "request": {
//!       "uid": "6b1a...",
//!       "action": "Present",
//!       "key": "LPsIwTo7o8BoG0-vjCyGQGBWSVIPxI-i_X336eUOQZo",
//!       "resourceNamespace": "default",
//!       "resolvedFQDN": "_acme-challenge.example.com.",
//!       "resolvedZone": "example.com.",
//!       "config": { "apiKeySecretRef": { "name": "op-creds", "key": "api-key" } }
//!     }
//!   }
//!   ```
//!
//!  `group` must match the `GROUP_NAME` the webhook was started with and `solver` the name of
//!  the registered [`Solver`][crate::solver::Solver], otherwise HTTP 404 (Not Found) is
//!  returned. `action` is either `Present` or `CleanUp`.
//!
//!  Once dispatched, the endpoint always answers HTTP 200 (OK). Whether the challenge was solved
//!  is reported in the body:
//!
//!  ```json
//!  {
//!    "apiVersion": "webhook.acme.cert-manager.io/v1alpha1",
//!    "kind": "ChallengePayload",
//!    "response": {
//!      "uid": "6b1a...",
//!      "success": false,
//!      "status": {
//!        "status": "Failure",
//!        "message": "invalid status 403 while updating zone",
//!        "reason": "ProviderAPIError",
//!        "code": 403
//!      }
//!    }
//!  }
//!  ```

mod api_error;
mod model;
mod routes;
pub mod server;

pub use server::new;
