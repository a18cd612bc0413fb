//! Shared operation lifecycle: create -> sign -> broadcast -> poll-until-terminal
//!
//! Every operation kind (transfer, trade, contract invocation, staking,
//! deployment) reduces to the same shape; the wait loop lives here once
//! instead of being reimplemented per kind. One wait call owns one loop
//! instance, and reloads are issued strictly one at a time.

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::error::{Error, Result};
use crate::tx::signer::TransactionSigner;

/// Polling parameters for the wait loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    pub interval: Duration,
    pub timeout: Duration,
}

impl WaitOptions {
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(200),
            timeout: Duration::from_secs(10),
        }
    }
}

/// An operation that can be polled to a terminal state.
///
/// `reload` refreshes state from the server; nothing else mutates an
/// operation once it has been created. `wait` is the single shared polling
/// primitive: it bounds total wall-clock time by `options.timeout`, checking
/// the deadline before each sleep so the last iteration is cut short rather
/// than overslept.
#[async_trait]
pub trait ManagedOperation: Send {
    /// Refresh the operation's envelope(s) from the server.
    async fn reload(&mut self) -> Result<()>;

    /// True when every envelope has reached COMPLETE or FAILED.
    fn is_terminal(&self) -> bool;

    /// Poll `reload` at a fixed interval until the operation is terminal.
    ///
    /// A timeout is a `WaitTimeout` error carrying the elapsed duration; the
    /// server-side operation is not cancelled and may still complete later.
    /// Waiting on an already-terminal operation returns immediately.
    async fn wait(&mut self, options: WaitOptions) -> Result<()> {
        let started = Instant::now();
        loop {
            if self.is_terminal() {
                return Ok(());
            }
            let elapsed = started.elapsed();
            if elapsed >= options.timeout {
                return Err(Error::WaitTimeout { elapsed });
            }
            tokio::time::sleep(options.interval).await;
            self.reload().await?;
        }
    }
}

/// An operation whose envelopes can be signed locally and broadcast.
#[async_trait]
pub trait Broadcastable: ManagedOperation {
    /// Sign every pending envelope with the given signer.
    async fn sign(&mut self, signer: &dyn TransactionSigner) -> Result<()>;

    /// Submit the signed payload(s) for broadcast.
    async fn broadcast(&mut self) -> Result<()>;
}

/// Drive a freshly created operation to its terminal state.
///
/// With a local signer, each envelope is signed and broadcast before
/// polling. Without one, signing and broadcast happen server-side and the
/// loop goes straight to polling. The returned operation may be FAILED -
/// that is a final observed state, not an error; only a timeout is.
pub async fn run_to_terminal<Op>(
    mut operation: Op,
    signer: Option<&dyn TransactionSigner>,
    options: WaitOptions,
) -> Result<Op>
where
    Op: Broadcastable,
{
    if let Some(signer) = signer {
        operation.sign(signer).await?;
        operation.broadcast().await?;
    }
    operation.wait(options).await?;
    Ok(operation)
}
