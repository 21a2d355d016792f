//! In-memory transport for tests.
//!
//! Replies are keyed by JSON-RPC method name; IRCC posts are keyed by
//! [`IRCC_ROUTE`]. Every request is recorded, including the ones that
//! fail.

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard, PoisonError},
};

use serde_json::Value;

use crate::{
    errors::BraviaError,
    transport::{HttpReply, HttpRequest, Transport},
};

pub const IRCC_ROUTE: &str = "X_SendIRCC";

#[derive(Debug, Default)]
pub struct MockTransport {
    replies: Mutex<HashMap<String, HttpReply>>,
    requests: Mutex<Vec<HttpRequest>>,
    offline: Mutex<bool>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// A device that never answers.
    pub fn offline() -> Self {
        let mock = Self::default();
        mock.set_offline(true);
        mock
    }

    pub fn set_offline(&self, offline: bool) {
        *lock(&self.offline) = offline;
    }

    /// Answers `method` with `{"result": result, "id": 0}`.
    pub fn with_result(self, method: &str, result: Value) -> Self {
        self.set_result(method, result);
        self
    }

    pub fn set_result(&self, method: &str, result: Value) {
        let body = serde_json::json!({ "result": result, "id": 0 }).to_string();
        self.set_reply(method, 200, &body);
    }

    pub fn set_reply(&self, route: &str, status: u16, body: &str) {
        lock(&self.replies).insert(
            route.to_string(),
            HttpReply {
                status,
                body: body.to_string(),
            },
        );
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        lock(&self.requests).clone()
    }

    /// Routes of every recorded request, in order.
    pub fn routes(&self) -> Vec<String> {
        self.requests().iter().map(route_of).collect()
    }

    /// JSON bodies sent for `method`, in order.
    pub fn bodies_for(&self, method: &str) -> Vec<Value> {
        self.requests()
            .iter()
            .filter(|request| route_of(request) == method)
            .filter_map(|request| serde_json::from_str(&request.body).ok())
            .collect()
    }

    /// IRCC codes sent, in order.
    pub fn ircc_codes(&self) -> Vec<String> {
        self.requests()
            .iter()
            .filter(|request| route_of(request) == IRCC_ROUTE)
            .map(|request| extract_ircc_code(&request.body))
            .collect()
    }

    pub fn clear_requests(&self) {
        lock(&self.requests).clear();
    }
}

fn route_of(request: &HttpRequest) -> String {
    if request.url.ends_with("/IRCC") {
        return IRCC_ROUTE.to_string();
    }
    serde_json::from_str::<Value>(&request.body)
        .ok()
        .and_then(|body| body.get("method").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_default()
}

fn extract_ircc_code(body: &str) -> String {
    let open = "<IRCCCode>";
    match (body.find(open), body.find("</IRCCCode>")) {
        (Some(start), Some(end)) if end >= start + open.len() => {
            body[start + open.len()..end].to_string()
        }
        _ => String::new(),
    }
}

impl Transport for MockTransport {
    fn post(&self, request: &HttpRequest) -> Result<HttpReply, BraviaError> {
        lock(&self.requests).push(request.clone());

        if *lock(&self.offline) {
            return Err(BraviaError::transport(&request.url, "connection refused"));
        }

        let route = route_of(request);
        match lock(&self.replies).get(&route) {
            Some(reply) => Ok(reply.clone()),
            // Commands the test did not script still succeed.
            None => Ok(HttpReply {
                status: 200,
                body: r#"{"result": [], "id": 0}"#.to_string(),
            }),
        }
    }
}
