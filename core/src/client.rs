//! Blocking client for one Grist document.
//!
//! # Design
//! `GristClient` owns an immutable `ClientConfig` and a `Transport`. Every
//! operation builds its request with `Endpoints`, executes it exactly once,
//! and parses the response. There is no retry and no state between calls,
//! so a client can be shared across threads whenever its transport can.

use std::time::Duration;

use serde_json::Value;

use crate::config::ClientConfig;
use crate::endpoints::Endpoints;
use crate::error::{GristError, Result};
use crate::http::{HttpRequest, HttpResponse, Transport};
use crate::types::{Fields, Filter, Record};

#[cfg(feature = "ureq")]
use crate::transport::UreqTransport;

#[cfg(feature = "ureq")]
pub struct GristClient<T: Transport = UreqTransport> {
    config: ClientConfig,
    transport: T,
}

#[cfg(not(feature = "ureq"))]
pub struct GristClient<T: Transport> {
    config: ClientConfig,
    transport: T,
}

#[cfg(feature = "ureq")]
impl GristClient<UreqTransport> {
    /// Performs no network I/O.
    pub fn new(root_url: &str, api_key: impl Into<String>, doc_id: &str, timeout: Option<Duration>) -> Self {
        let mut config = ClientConfig::new(root_url, api_key, doc_id);
        if let Some(timeout) = timeout {
            config = config.with_timeout(timeout);
        }
        let transport = UreqTransport::new(config.timeout());
        Self { config, transport }
    }
}

impl<T: Transport> GristClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn endpoints(&self) -> Endpoints<'_> {
        Endpoints::new(&self.config)
    }

    fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        tracing::debug!(
            method = %request.method,
            url = %request.url,
            query_params = request.query.len(),
            "grist request"
        );
        let response = self
            .transport
            .execute(request)
            .map_err(GristError::transport)?;
        tracing::debug!(status = response.status, "grist response");
        Ok(response)
    }

    /// Rows of `table_id`, optionally restricted by `filter`.
    pub fn get_records(&self, table_id: &str, filter: Option<&Filter>) -> Result<Vec<Record>> {
        let endpoints = self.endpoints();
        let response = self.execute(endpoints.build_get_records(table_id, filter)?)?;
        endpoints.parse_get_records(response)
    }

    /// Update the given columns of existing rows. An empty `data` sends
    /// nothing.
    pub fn patch_records(&self, table_id: &str, data: &[(i64, Fields)], noparse: bool) -> Result<()> {
        if data.is_empty() {
            tracing::debug!(table_id, "patch_records: nothing to send");
            return Ok(());
        }
        let endpoints = self.endpoints();
        let response = self.execute(endpoints.build_patch_records(table_id, data, noparse)?)?;
        endpoints.parse_patch_records(response)
    }

    /// Append rows and return their new ids in input order. An empty `data`
    /// sends nothing and returns no ids.
    pub fn add_records(&self, table_id: &str, data: &[Fields], noparse: bool) -> Result<Vec<i64>> {
        if data.is_empty() {
            tracing::debug!(table_id, "add_records: nothing to send");
            return Ok(Vec::new());
        }
        let endpoints = self.endpoints();
        let response = self.execute(endpoints.build_add_records(table_id, data, noparse)?)?;
        endpoints.parse_add_records(response)
    }

    /// Remove rows by id. An empty `ids` is still sent.
    pub fn delete_records(&self, table_id: &str, ids: &[i64]) -> Result<()> {
        let endpoints = self.endpoints();
        let response = self.execute(endpoints.build_delete_records(table_id, ids)?)?;
        endpoints.parse_delete_records(response)
    }

    /// Run a read-only SQL query against the document.
    ///
    /// `timeout` is a server-side limit on query execution, separate from the
    /// transport timeout in `ClientConfig`.
    pub fn sql(&self, query: &str, args: Option<&Value>, timeout: Option<Duration>) -> Result<Vec<Fields>> {
        let endpoints = self.endpoints();
        let response = self.execute(endpoints.build_sql(query, args, timeout)?)?;
        endpoints.parse_sql(response)
    }
}
