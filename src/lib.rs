//! Openprovider Webhook
//!
//! A [cert-manager] ACME webhook solver that answers [RFC-8555][RFC-8555] [DNS-01] challenges by
//! publishing TXT records in zones hosted at [Openprovider].
//!
//! Each challenge is a single zone update: the solver reads the Openprovider API key from the
//! Kubernetes secret referenced by the issuer's config, then adds (or removes) exactly one TXT
//! record through the Openprovider DNS API. Nothing is cached between challenges.
//!
//! [cert-manager]: https://cert-manager.io
//! [Openprovider]: https://www.openprovider.com
//! [RFC-8555]: https://www.rfc-editor.org/rfc/rfc8555
//! [DNS-01]: https://www.rfc-editor.org/rfc/rfc8555#section-8.4
//!
#![warn(clippy::pedantic)]

pub mod api;
pub mod config;
pub mod error;
pub mod openprovider;
pub mod secrets;
pub mod solver;

pub use api::new as new_http;
pub use config::{Config, SharedConfig};
pub use solver::{OpenproviderSolver, Solver};
