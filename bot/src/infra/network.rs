//! Network infrastructure — implements `LivenessProbe` with a tokio TCP connect.

use std::future::Future;
use std::io;
use std::time::Duration;

use spotcraft_common::Liveness;
use tokio::net::TcpStream;

use crate::application::ports::LivenessProbe;

/// Production probe: opens a TCP connection and closes it immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpLivenessProbe;

impl LivenessProbe for TcpLivenessProbe {
    async fn probe(&self, address: &str, port: u16, timeout: Duration) -> Liveness {
        let liveness = probe_with(TcpStream::connect((address, port)), timeout).await;
        tracing::debug!(address, port, %liveness, "liveness probe");
        liveness
    }
}

/// Classify a connection attempt bounded by `timeout`.
///
/// Elapsed timeouts and refusals are `Offline`; any other failure (DNS,
/// unreachable network, permission) is `Unknown`. The connection, if made,
/// is dropped without any protocol exchange.
pub async fn probe_with<F, S>(connect: F, timeout: Duration) -> Liveness
where
    F: Future<Output = io::Result<S>>,
{
    match tokio::time::timeout(timeout, connect).await {
        Ok(Ok(_stream)) => Liveness::Online,
        Ok(Err(e)) => classify_io_error(&e),
        Err(_elapsed) => Liveness::Offline,
    }
}

fn classify_io_error(e: &io::Error) -> Liveness {
    match e.kind() {
        io::ErrorKind::ConnectionRefused | io::ErrorKind::TimedOut => Liveness::Offline,
        _ => {
            tracing::debug!(error = %e, "liveness probe failed indeterminately");
            Liveness::Unknown
        }
    }
}
