//! Daemon readiness probe.
//!
//! Polls the daemon's control port with plain TCP connects until it
//! accepts, or until the configured overall budget is exhausted. No
//! payload is exchanged; an accepted connection is dropped immediately.
//!
//! The two failure modes are deliberately distinct:
//! - a connect attempt that *times out* at the socket level fails the
//!   probe immediately (nothing is answering at all -- a SYN black hole is
//!   a misconfiguration, not a slow start), while
//! - a connect that is *refused* means the daemon is not listening yet;
//!   the probe sleeps one second, recomputes the remaining budget, and
//!   tries again.
//!
//! This bounds the worst-case wait to the configured timeout regardless
//! of polling granularity, instead of a fixed sleep-then-assume-ready.

use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time::Instant;
use tracing::{debug, error, info};

use scangate_core::metrics as m;

use crate::error::ProbeError;

/// Fixed pause between failed (refused) connect attempts.
const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Waits until the daemon control port accepts a TCP connection.
///
/// The per-attempt connect budget is always the *remaining* overall
/// budget, so the loop can never overshoot the configured timeout.
///
/// # Errors
///
/// Returns [`ProbeError::ConnectTimeout`] when the port never accepts
/// within the budget, or when a single attempt times out at the socket
/// level.
pub async fn wait_until_ready(
    host: &str,
    port: u16,
    timeout: Duration,
) -> Result<(), ProbeError> {
    let started = Instant::now();
    let mut remaining = timeout;

    loop {
        metrics::counter!(m::PROBE_ATTEMPTS_TOTAL).increment(1);

        match tokio::time::timeout(remaining, TcpStream::connect((host, port))).await {
            Ok(Ok(stream)) => {
                drop(stream);
                info!(
                    host,
                    port,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "daemon control port is accepting connections"
                );
                return Ok(());
            }
            Ok(Err(e)) => {
                // Not listening yet; wait and retry with what is left.
                debug!(host, port, error = %e, "daemon not ready yet");
                tokio::time::sleep(POLL_INTERVAL).await;
                let elapsed = started.elapsed();
                if elapsed >= timeout {
                    error!(
                        host,
                        port,
                        timeout_secs = timeout.as_secs(),
                        "daemon never became reachable within the budget"
                    );
                    return Err(ProbeError::ConnectTimeout {
                        host: host.to_owned(),
                        port,
                        timeout_secs: timeout.as_secs(),
                    });
                }
                remaining = timeout - elapsed;
            }
            Err(_) => {
                // The attempt itself timed out: nothing answered the SYN.
                error!(
                    host,
                    port,
                    timeout_secs = timeout.as_secs(),
                    "connect attempt timed out at the socket level"
                );
                return Err(ProbeError::ConnectTimeout {
                    host: host.to_owned(),
                    port,
                    timeout_secs: timeout.as_secs(),
                });
            }
        }
    }
}
