//! Scripted transport for tests and offline runs.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use super::transport::{ApiRequest, ApiResponse, Transport, TransportFuture};
use crate::types::errors::TransportError;

/// A configurable reply for one request.
#[derive(Clone, Debug)]
pub enum MockReply {
    /// Respond with `status` and `body`.
    Respond { status: u16, body: String },
    /// Fail before any response arrives.
    NetworkError(String),
}

impl MockReply {
    /// 200 with a JSON body.
    pub fn ok(body: serde_json::Value) -> Self {
        MockReply::Respond {
            status: 200,
            body: body.to_string(),
        }
    }

    pub fn status(status: u16) -> Self {
        MockReply::Respond {
            status,
            body: String::new(),
        }
    }
}

#[derive(Default)]
struct Route {
    /// Popped front-first; the last reply repeats once the queue is drained.
    replies: Vec<MockReply>,
    delay: Option<Duration>,
}

/// A hand-rolled [`Transport`] keyed by request path.
///
/// Supports per-path reply sequences, per-path latency, and a log of every
/// request it received. Paths with no route answer 404.
#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<String, Route>>,
    log: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always answer `path` with `reply`.
    pub fn with_reply(self, path: &str, reply: MockReply) -> Self {
        self.with_sequence(path, vec![reply])
    }

    /// Answer `path` with `replies` in order, repeating the last one.
    pub fn with_sequence(self, path: &str, replies: Vec<MockReply>) -> Self {
        if let Ok(mut routes) = self.routes.lock() {
            routes.entry(path.to_string()).or_default().replies = replies;
        }
        self
    }

    /// Delay every reply on `path` by `delay`.
    pub fn with_delay(self, path: &str, delay: Duration) -> Self {
        if let Ok(mut routes) = self.routes.lock() {
            routes.entry(path.to_string()).or_default().delay = Some(delay);
        }
        self
    }

    /// Every request received so far, in arrival order.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.log.lock().map(|log| log.clone()).unwrap_or_default()
    }

    /// Requests whose path equals `path`.
    pub fn requests_for(&self, path: &str) -> Vec<ApiRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path() == path)
            .collect()
    }

    fn next_reply(&self, path: &str) -> (Option<MockReply>, Option<Duration>) {
        let Ok(mut routes) = self.routes.lock() else {
            return (None, None);
        };
        match routes.get_mut(path) {
            Some(route) => {
                let reply = if route.replies.len() > 1 {
                    Some(route.replies.remove(0))
                } else {
                    route.replies.first().cloned()
                };
                (reply, route.delay)
            }
            None => (None, None),
        }
    }
}

impl Transport for MockTransport {
    fn get<'a>(&'a self, request: &'a ApiRequest) -> TransportFuture<'a> {
        Box::pin(async move {
            if let Ok(mut log) = self.log.lock() {
                log.push(request.clone());
            }
            let (reply, delay) = self.next_reply(&request.path());
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            match reply {
                Some(MockReply::Respond { status, body }) => Ok(ApiResponse { status, body }),
                Some(MockReply::NetworkError(msg)) => Err(TransportError::Network(msg)),
                None => Ok(ApiResponse {
                    status: 404,
                    body: String::new(),
                }),
            }
        })
    }
}
