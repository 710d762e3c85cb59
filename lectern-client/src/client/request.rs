use std::collections::BTreeMap;

use serde_json::{Map, Value as JsonValue};

use crate::error::ClientError;
use crate::http::HttpRequestParts;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

/// One logical request. Resent unchanged on every retry.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    endpoint: String,
    headers: BTreeMap<String, String>,
    body: Option<Map<String, JsonValue>>,
}

impl ApiRequest {
    pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            headers: BTreeMap::new(),
            body: None,
        }
    }

    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(Method::Get, endpoint)
    }

    pub fn post(endpoint: impl Into<String>, body: Map<String, JsonValue>) -> Self {
        Self::new(Method::Post, endpoint).with_body(body)
    }

    pub fn with_body(mut self, body: Map<String, JsonValue>) -> Self {
        self.body = Some(body);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn body(&self) -> Option<&Map<String, JsonValue>> {
        self.body.as_ref()
    }

    /// Resolve against `base` and serialize once.
    pub(crate) fn to_parts(
        &self,
        base: &url::Url,
        default_headers: &BTreeMap<String, String>,
    ) -> Result<HttpRequestParts, ClientError> {
        let url = join_endpoint(base, &self.endpoint).map_err(|e| {
            ClientError::Transport(format!("invalid endpoint {}: {e}", self.endpoint))
        })?;

        let mut headers = default_headers.clone();
        let mut body = Vec::new();
        if let Some(map) = &self.body {
            body = serde_json::to_vec(map)
                .map_err(|e| ClientError::Transport(format!("failed to encode request body: {e}")))?;
            headers.insert("Content-Type".to_string(), "application/json".to_string());
        }
        headers.extend(self.headers.iter().map(|(k, v)| (k.clone(), v.clone())));

        Ok(HttpRequestParts {
            method: self.method.as_str().to_string(),
            url,
            headers,
            body,
        })
    }
}

pub fn join_endpoint(base: &url::Url, endpoint: &str) -> Result<url::Url, url::ParseError> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(endpoint.trim_start_matches('/'))
}
