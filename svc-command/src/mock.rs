//! In-memory client for tests and examples
//!
//! Serves queued responses in FIFO order and records every request it
//! completes.

use crate::client::{Client, Dispatch};
use crate::http::{Request, Response};
use std::collections::VecDeque;
use std::sync::Mutex;

/// A [`Client`] that answers from a response queue
#[derive(Debug, Default)]
pub struct MockClient {
    inner: Mutex<MockInner>,
}

#[derive(Debug, Default)]
struct MockInner {
    responses: VecDeque<Response>,
    sent: Vec<Request>,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for the next dispatched command
    pub fn push_response(&self, response: Response) {
        self.lock().responses.push_back(response);
    }

    /// Number of queued responses not yet served
    pub fn remaining(&self) -> usize {
        self.lock().responses.len()
    }

    /// Requests completed so far, in dispatch order
    pub fn sent_requests(&self) -> Vec<Request> {
        self.lock().sent.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockInner> {
        // Poisoning is ignored; the queue stays usable after a failed test
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Client for MockClient {
    fn execute(&self, command: &mut dyn Dispatch) -> anyhow::Result<()> {
        let name = command.name().to_string();
        let request = command.prepare_request()?;
        request.begin_transfer();

        let mut inner = self.lock();
        let Some(response) = inner.responses.pop_front() else {
            request.fail();
            anyhow::bail!("No queued response for command '{}'", name);
        };

        tracing::trace!(command = %name, status = response.status(), "Serving mock response");
        request.complete(response);
        inner.sent.push(request.clone());
        Ok(())
    }
}
