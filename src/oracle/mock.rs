use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::client::Oracle;
use super::error::{OracleError, OracleResult};

type Responder = Box<dyn Fn(&str) -> OracleResult<String> + Send + Sync>;

/// In-process oracle for tests.
///
/// Answers come from a closure over the prompt (or a scripted queue). Every prompt is recorded
/// and the peak number of concurrent calls is tracked so tests can assert the concurrency cap.
pub struct MockOracle {
    responder: Responder,
    script: Mutex<VecDeque<OracleResult<String>>>,
    delay: Duration,
    calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl MockOracle {
    /// Creates a mock answering each prompt with `responder(prompt)`.
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&str) -> OracleResult<String> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            script: Mutex::new(VecDeque::new()),
            delay: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    /// Creates a mock that replays `responses` in call order, then fails with
    /// [`OracleError::EmptyResponse`].
    pub fn scripted(responses: Vec<OracleResult<String>>) -> Self {
        let mock = Self::new(|_| Err(OracleError::EmptyResponse));
        *mock.script.lock() = responses.into();
        mock
    }

    /// Creates a mock that always returns `text`.
    pub fn constant(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::new(move |_| Ok(text.clone()))
    }

    /// Makes every call sleep for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Prompts received so far, in arrival order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    /// Number of calls received.
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Highest number of calls observed in flight at once.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Oracle for MockOracle {
    async fn complete(&self, prompt: &str) -> OracleResult<String> {
        self.calls.lock().push(prompt.to_string());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let scripted = self.script.lock().pop_front();
        let result = match scripted {
            Some(result) => result,
            None => (self.responder)(prompt),
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    fn model(&self) -> &str {
        "mock"
    }
}
