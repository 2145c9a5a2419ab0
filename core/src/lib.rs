//! Blocking client for the Grist document API.
//!
//! # Overview
//! Record-level CRUD and SQL passthrough against
//! `{root_url}/api/docs/{doc_id}/...`, with every non-2xx response surfaced
//! as `GristError::Http`.
//!
//! # Design
//! - `Endpoints` builds `HttpRequest` values and parses `HttpResponse`
//!   values without touching the network (host-does-IO pattern).
//! - `GristClient` pairs a `ClientConfig` with a `Transport` and runs one
//!   round trip per call. `UreqTransport` is the default transport.
//! - Cell values stay `serde_json::Value`; no table schema is modelled.

pub mod client;
pub mod config;
pub mod dates;
pub mod endpoints;
pub mod error;
pub mod http;
#[cfg(feature = "ureq")]
pub mod transport;
pub mod types;

pub use client::GristClient;
pub use config::ClientConfig;
pub use dates::timestamp_to_date;
pub use endpoints::Endpoints;
pub use error::{GristError, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
#[cfg(feature = "ureq")]
pub use transport::UreqTransport;
pub use types::{Fields, Filter, Record};
