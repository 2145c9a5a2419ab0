//! Request builder and response parser for the Grist document API.
//!
//! # Design
//! `Endpoints` borrows a `ClientConfig` and carries no other state. Each
//! operation is split into a `build_*` method that produces an `HttpRequest`
//! and a `parse_*` method that consumes an `HttpResponse`. Nothing here
//! touches the network, so every path, query and body can be checked
//! against plain data.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::{GristError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{
    Fields, Filter, NewRecord, Record, RecordId, RecordUpdate, RecordsBody, SqlRecord, SqlRequest,
};

const ACCEPT: &str = "application/json; charset=utf-8";

#[derive(Debug, Clone, Copy)]
pub struct Endpoints<'a> {
    config: &'a ClientConfig,
}

impl<'a> Endpoints<'a> {
    pub fn new(config: &'a ClientConfig) -> Self {
        Self { config }
    }

    pub fn build_get_records(&self, table_id: &str, filter: Option<&Filter>) -> Result<HttpRequest> {
        let mut query = Vec::new();
        if let Some(filter) = filter.filter(|f| !f.is_empty()) {
            query.push(("filter".to_string(), to_json(filter)?));
        }
        Ok(self.request(HttpMethod::Get, &self.records_path(table_id), query, None))
    }

    pub fn build_patch_records(
        &self,
        table_id: &str,
        data: &[(i64, Fields)],
        noparse: bool,
    ) -> Result<HttpRequest> {
        let body = RecordsBody {
            records: data
                .iter()
                .map(|(id, fields)| RecordUpdate { id: *id, fields })
                .collect(),
        };
        Ok(self.request(
            HttpMethod::Patch,
            &self.records_path(table_id),
            noparse_query(noparse),
            Some(to_json(&body)?),
        ))
    }

    pub fn build_add_records(&self, table_id: &str, data: &[Fields], noparse: bool) -> Result<HttpRequest> {
        let body = RecordsBody {
            records: data.iter().map(|fields| NewRecord { fields }).collect(),
        };
        Ok(self.request(
            HttpMethod::Post,
            &self.records_path(table_id),
            noparse_query(noparse),
            Some(to_json(&body)?),
        ))
    }

    pub fn build_delete_records(&self, table_id: &str, ids: &[i64]) -> Result<HttpRequest> {
        let path = format!("/docs/{}/tables/{table_id}/data/delete", self.config.doc_id());
        Ok(self.request(HttpMethod::Post, &path, Vec::new(), Some(to_json(&ids)?)))
    }

    /// `timeout` is sent to the server in milliseconds, rounded up so a
    /// sub-millisecond limit never becomes `0`.
    pub fn build_sql(&self, query: &str, args: Option<&Value>, timeout: Option<Duration>) -> Result<HttpRequest> {
        let body = SqlRequest {
            sql: query,
            args,
            timeout: timeout.map(|t| u64::try_from(t.as_nanos().div_ceil(1_000_000)).unwrap_or(u64::MAX)),
        };
        let path = format!("/docs/{}/sql", self.config.doc_id());
        Ok(self.request(HttpMethod::Post, &path, Vec::new(), Some(to_json(&body)?)))
    }

    pub fn parse_get_records(&self, response: HttpResponse) -> Result<Vec<Record>> {
        let body: RecordsBody<Record> = parse_json(response)?;
        Ok(body.records)
    }

    pub fn parse_patch_records(&self, response: HttpResponse) -> Result<()> {
        check_status(&response)
    }

    pub fn parse_add_records(&self, response: HttpResponse) -> Result<Vec<i64>> {
        let body: RecordsBody<RecordId> = parse_json(response)?;
        Ok(body.records.into_iter().map(|r| r.id).collect())
    }

    pub fn parse_delete_records(&self, response: HttpResponse) -> Result<()> {
        check_status(&response)
    }

    pub fn parse_sql(&self, response: HttpResponse) -> Result<Vec<Fields>> {
        let body: RecordsBody<SqlRecord> = parse_json(response)?;
        Ok(body.records.into_iter().map(|r| r.fields).collect())
    }

    fn records_path(&self, table_id: &str) -> String {
        format!("/docs/{}/tables/{table_id}/records", self.config.doc_id())
    }

    fn request(
        &self,
        method: HttpMethod,
        path: &str,
        query: Vec<(String, String)>,
        body: Option<String>,
    ) -> HttpRequest {
        let mut headers = vec![
            ("Accept".to_string(), ACCEPT.to_string()),
            ("Authorization".to_string(), self.config.bearer()),
        ];
        if body.is_some() {
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
        }
        HttpRequest {
            method,
            url: self.config.api_url(path),
            query,
            headers,
            body,
            timeout: self.config.timeout(),
        }
    }
}

fn noparse_query(noparse: bool) -> Vec<(String, String)> {
    vec![("noparse".to_string(), noparse.to_string())]
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(GristError::Serialization)
}

fn parse_json<T: DeserializeOwned>(response: HttpResponse) -> Result<T> {
    check_status(&response)?;
    serde_json::from_str(&response.body).map_err(GristError::Deserialization)
}

/// Map any status outside `200..300` to `GristError::Http`.
fn check_status(response: &HttpResponse) -> Result<()> {
    if response.is_success() {
        return Ok(());
    }
    tracing::warn!(status = response.status, "grist request failed");
    Err(GristError::Http {
        status_code: response.status,
        message: response.body.clone(),
    })
}
