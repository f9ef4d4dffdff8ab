//! Waiting for network responses triggered by page actions
//!
//! The waiter subscribes to CDP network events when it is registered, so it
//! must be created before the click that fires the request.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chromiumoxide::cdp::browser_protocol::network::{
    EventLoadingFailed, EventLoadingFinished, EventRequestWillBeSent, EventResponseReceived,
    GetResponseBodyParams, RequestId,
};
use chromiumoxide::Page;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::error::{E2eError, E2eResult};

/// Which request's response to wait for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseMatcher {
    pub url_contains: String,
    pub method: String,
}

impl ResponseMatcher {
    pub fn new(url_contains: &str, method: &str) -> Self {
        Self {
            url_contains: url_contains.to_string(),
            method: method.to_string(),
        }
    }

    pub fn post(url_contains: &str) -> Self {
        Self::new(url_contains, "POST")
    }

    pub fn matches(&self, url: &str, method: &str) -> bool {
        url.contains(&self.url_contains) && method.eq_ignore_ascii_case(&self.method)
    }

    fn describe(&self) -> String {
        format!("{} *{}*", self.method, self.url_contains)
    }
}

/// A fully received response
#[derive(Debug, Clone)]
pub struct CapturedResponse {
    pub url: String,
    pub method: String,
    pub status: u16,
    pub body: Vec<u8>,
}

impl CapturedResponse {
    pub fn json<T: DeserializeOwned>(&self) -> E2eResult<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn expect_status(&self, expected: u16) -> E2eResult<()> {
        if self.status != expected {
            return Err(E2eError::UnexpectedStatus {
                url: self.url.clone(),
                status: self.status,
                body: self.text(),
            });
        }
        Ok(())
    }
}

struct ResponseHead {
    request_id: RequestId,
    url: String,
    method: String,
    status: u16,
}

/// Pending wait for the first response matching a [`ResponseMatcher`]
pub struct ResponseWaiter {
    matcher: ResponseMatcher,
    timeout: Duration,
    handle: JoinHandle<E2eResult<CapturedResponse>>,
}

impl ResponseWaiter {
    pub async fn register(
        page: &Page,
        matcher: ResponseMatcher,
        timeout: Duration,
    ) -> E2eResult<Self> {
        let mut requests = page.event_listener::<EventRequestWillBeSent>().await?;
        let mut responses = page.event_listener::<EventResponseReceived>().await?;
        let mut finished = page.event_listener::<EventLoadingFinished>().await?;
        let mut failed = page.event_listener::<EventLoadingFailed>().await?;

        debug!("Waiting for response to {}", matcher.describe());

        let page = page.clone();
        let task_matcher = matcher.clone();
        let handle = tokio::spawn(async move {
            // request id -> method, for requests that match
            let mut candidates: HashMap<String, String> = HashMap::new();
            let mut head: Option<ResponseHead> = None;

            loop {
                // The handler dispatches events in protocol order, so polling the
                // streams in this order sees a request before its response.
                tokio::select! {
                    biased;
                    Some(event) = requests.next() => {
                        if task_matcher.matches(&event.request.url, &event.request.method) {
                            candidates.insert(
                                event.request_id.inner().clone(),
                                event.request.method.clone(),
                            );
                        }
                    }
                    Some(event) = responses.next() => {
                        if head.is_none() {
                            if let Some(method) = candidates.get(event.request_id.inner()) {
                                head = Some(ResponseHead {
                                    request_id: event.request_id.clone(),
                                    url: event.response.url.clone(),
                                    method: method.clone(),
                                    status: event.response.status as u16,
                                });
                            }
                        }
                    }
                    Some(event) = finished.next() => {
                        if let Some(h) = head.take() {
                            if h.request_id.inner() == event.request_id.inner() {
                                let body = fetch_body(&page, &h.request_id).await?;
                                return Ok(CapturedResponse {
                                    url: h.url,
                                    method: h.method,
                                    status: h.status,
                                    body,
                                });
                            }
                            head = Some(h);
                        }
                    }
                    Some(event) = failed.next() => {
                        if candidates.contains_key(event.request_id.inner()) {
                            return Err(E2eError::StepFailed {
                                step: format!("response to {}", task_matcher.describe()),
                                reason: format!("request failed: {}", event.error_text),
                            });
                        }
                    }
                    else => {
                        return Err(E2eError::StepFailed {
                            step: format!("response to {}", task_matcher.describe()),
                            reason: "network event streams closed".to_string(),
                        });
                    }
                }
            }
        });

        Ok(Self {
            matcher,
            timeout,
            handle,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Resolve with the matching response once its body has been received
    pub async fn wait(mut self) -> E2eResult<CapturedResponse> {
        match tokio::time::timeout(self.timeout, &mut self.handle).await {
            Ok(Ok(result)) => {
                let response = result?;
                info!(
                    "{} {} -> {}",
                    response.method, response.url, response.status
                );
                Ok(response)
            }
            Ok(Err(join_error)) => Err(E2eError::StepFailed {
                step: format!("response to {}", self.matcher.describe()),
                reason: join_error.to_string(),
            }),
            Err(_) => Err(E2eError::Timeout {
                what: "network response".to_string(),
                expected: self.matcher.describe(),
                last_observed: "no matching response".to_string(),
                timeout_ms: self.timeout.as_millis() as u64,
            }),
        }
    }
}

impl Drop for ResponseWaiter {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn fetch_body(page: &Page, request_id: &RequestId) -> E2eResult<Vec<u8>> {
    let response = page
        .execute(GetResponseBodyParams::new(request_id.clone()))
        .await?;
    decode_body(&response.result.body, response.result.base64_encoded)
}

fn decode_body(body: &str, base64_encoded: bool) -> E2eResult<Vec<u8>> {
    if base64_encoded {
        Ok(BASE64.decode(body)?)
    } else {
        Ok(body.as_bytes().to_vec())
    }
}
