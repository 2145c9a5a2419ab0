//! Blocking `Transport` backed by ureq.

use std::time::Duration;

use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};

/// Executes requests with a single `ureq::Agent`.
///
/// The agent is configured so 4xx/5xx responses come back as data rather
/// than `Err`, leaving status interpretation to the endpoint parsers.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    /// `timeout` bounds each whole request, connect through body read. A
    /// request's own `timeout` takes precedence.
    pub fn new(timeout: Option<Duration>) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(timeout)
            .build()
            .new_agent();
        Self { agent }
    }

    pub fn from_agent(agent: ureq::Agent) -> Self {
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Transport for UreqTransport {
    type Error = ureq::Error;

    fn execute(&self, req: HttpRequest) -> Result<HttpResponse, ureq::Error> {
        let HttpRequest {
            method,
            url,
            query,
            headers,
            body,
            timeout,
        } = req;

        let mut response = match method {
            HttpMethod::Get => with_parts(self.agent.get(&url), &query, &headers, timeout).call(),
            HttpMethod::Post => send(with_parts(self.agent.post(&url), &query, &headers, timeout), body),
            HttpMethod::Patch => send(with_parts(self.agent.patch(&url), &query, &headers, timeout), body),
        }?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        // Whole-table reads routinely exceed ureq's 10 MiB default.
        let body = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_string()?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn with_parts<B>(
    mut builder: ureq::RequestBuilder<B>,
    query: &[(String, String)],
    headers: &[(String, String)],
    timeout: Option<Duration>,
) -> ureq::RequestBuilder<B> {
    if let Some(timeout) = timeout {
        builder = builder.config().timeout_global(Some(timeout)).build();
    }
    for (key, value) in query {
        builder = builder.query(key.as_str(), value.as_str());
    }
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn send(
    builder: ureq::RequestBuilder<ureq::typestate::WithBody>,
    body: Option<String>,
) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    match body {
        Some(body) => builder.send(body.as_bytes()),
        None => builder.send_empty(),
    }
}
