//! Shared test doubles for gateway integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;

use wst_core::traits::{ByteSink, RemoteConnector, RemoteSession, RemoteStreams};
use wst_core::{RemoteError, StreamError};

/// Upper bound for anything a test waits on
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    Healthy,
    RejectInput,
    PanicInput,
    Hang,
}

/// In-memory stand-in for an SSH shell
pub struct FakeRemote {
    mode: Mode,
    fail_with: Option<RemoteError>,
    connects: AtomicUsize,
    closes: Arc<AtomicUsize>,
    sinks: Mutex<Option<(Box<dyn ByteSink>, Box<dyn ByteSink>)>>,
    input_tx: mpsc::UnboundedSender<Vec<u8>>,
    input_rx: Mutex<mpsc::UnboundedReceiver<Vec<u8>>>,
    terminated: CancellationToken,
}

impl FakeRemote {
    fn with_mode(mode: Mode, fail_with: Option<RemoteError>) -> Arc<Self> {
        let (input_tx, input_rx) = mpsc::unbounded_channel();
        Arc::new(Self {
            mode,
            fail_with,
            connects: AtomicUsize::new(0),
            closes: Arc::new(AtomicUsize::new(0)),
            sinks: Mutex::new(None),
            input_tx,
            input_rx: Mutex::new(input_rx),
            terminated: CancellationToken::new(),
        })
    }

    /// A shell that accepts input and produces whatever the test emits
    pub fn healthy() -> Arc<Self> {
        Self::with_mode(Mode::Healthy, None)
    }

    /// A host whose connect attempt fails
    pub fn failing(error: RemoteError) -> Arc<Self> {
        Self::with_mode(Mode::Healthy, Some(error))
    }

    /// A shell whose stdin refuses every write
    pub fn rejecting_input() -> Arc<Self> {
        Self::with_mode(Mode::RejectInput, None)
    }

    /// A shell whose stdin write panics
    pub fn panicking_input() -> Arc<Self> {
        Self::with_mode(Mode::PanicInput, None)
    }

    /// A host that never finishes connecting
    pub fn hanging() -> Arc<Self> {
        Self::with_mode(Mode::Hang, None)
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    /// Simulate the shell writing to stdout
    pub async fn emit_stdout(&self, data: &[u8]) -> Result<(), StreamError> {
        let mut sinks = self.sinks.lock().await;
        let (stdout, _) = sinks.as_mut().expect("remote not connected");
        stdout.write(data).await
    }

    /// Simulate the shell writing to stderr
    pub async fn emit_stderr(&self, data: &[u8]) -> Result<(), StreamError> {
        let mut sinks = self.sinks.lock().await;
        let (_, stderr) = sinks.as_mut().expect("remote not connected");
        stderr.write(data).await
    }

    /// Next chunk written to the shell's stdin
    pub async fn next_input(&self) -> Vec<u8> {
        let mut rx = self.input_rx.lock().await;
        tokio::time::timeout(TEST_TIMEOUT, rx.recv())
            .await
            .expect("timed out waiting for remote input")
            .expect("input channel closed")
    }

    /// Whether no stdin write arrives within `window`
    pub async fn no_input_within(&self, window: Duration) -> bool {
        let mut rx = self.input_rx.lock().await;
        tokio::time::timeout(window, rx.recv()).await.is_err()
    }

    /// Simulate the remote shell exiting
    pub fn terminate(&self) {
        self.terminated.cancel();
    }
}

#[async_trait]
impl RemoteConnector for FakeRemote {
    async fn connect(
        &self,
        output: Box<dyn ByteSink>,
        error: Box<dyn ByteSink>,
    ) -> Result<RemoteStreams, RemoteError> {
        self.connects.fetch_add(1, Ordering::SeqCst);

        if self.mode == Mode::Hang {
            std::future::pending::<()>().await;
        }
        if let Some(e) = &self.fail_with {
            return Err(e.clone());
        }

        *self.sinks.lock().await = Some((output, error));

        Ok(RemoteStreams {
            input: Box::new(FakeInput {
                tx: self.input_tx.clone(),
                mode: self.mode,
            }),
            session: Box::new(FakeSession {
                terminated: self.terminated.clone(),
                closes: Arc::clone(&self.closes),
                closed: false,
            }),
        })
    }
}

struct FakeInput {
    tx: mpsc::UnboundedSender<Vec<u8>>,
    mode: Mode,
}

#[async_trait]
impl ByteSink for FakeInput {
    async fn write(&mut self, data: &[u8]) -> Result<(), StreamError> {
        match self.mode {
            Mode::RejectInput => return Err(StreamError::Failed("stdin closed".into())),
            Mode::PanicInput => panic!("stdin writer crashed"),
            _ => {}
        }
        self.tx
            .send(data.to_vec())
            .map_err(|_| StreamError::Closed)
    }
}

struct FakeSession {
    terminated: CancellationToken,
    closes: Arc<AtomicUsize>,
    closed: bool,
}

#[async_trait]
impl RemoteSession for FakeSession {
    async fn terminated(&mut self) {
        self.terminated.cancelled().await;
    }

    async fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.closes.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Poll `condition` until it holds or the test timeout expires
pub async fn eventually<F>(mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + TEST_TIMEOUT;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}
