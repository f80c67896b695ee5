use crate::utils::{ProbeError, Result};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::error::Elapsed;
use tokio::time::timeout;

pub mod icmp;
pub mod latency;
pub mod tcp;

pub use icmp::*;
pub use latency::*;
pub use tcp::*;

/// Ports a domain controller is expected to serve: DNS, Kerberos, LDAP,
/// SMB and LDAPS.
pub const DOMAIN_CONTROLLER_PORTS: [u16; 5] = [53, 88, 389, 445, 636];

/// Opens a TCP connection to `host:port`, bounded by `limit`.
///
/// The host is resolved by the platform resolver as part of the connect.
/// The stream is returned to the caller, who decides how long to keep it.
pub(crate) async fn connect(host: &str, port: u16, limit: Duration) -> Result<TcpStream> {
    classify(timeout(limit, TcpStream::connect((host, port))).await)
}

/// Maps a bounded connect attempt onto the probe taxonomy. An elapsed
/// deadline and an active refusal are kept apart here; callers that report
/// "closed" merge them through [`ProbeError::is_closed`].
pub(crate) fn classify<T>(
    attempt: std::result::Result<std::io::Result<T>, Elapsed>,
) -> Result<T> {
    match attempt {
        Err(_) => Err(ProbeError::ConnectionTimeout),
        Ok(Err(e)) if e.kind() == std::io::ErrorKind::ConnectionRefused => {
            Err(ProbeError::ConnectionRefused)
        }
        Ok(Err(e)) => Err(ProbeError::Unknown(e.to_string())),
        Ok(Ok(value)) => Ok(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[test]
    fn test_domain_controller_port_order() {
        assert_eq!(DOMAIN_CONTROLLER_PORTS, [53, 88, 389, 445, 636]);
    }

    #[tokio::test]
    async fn test_connect_open_port() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let stream = connect("127.0.0.1", port, Duration::from_secs(2)).await;
        assert!(stream.is_ok());
    }

    #[tokio::test]
    async fn test_connect_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let err = connect("127.0.0.1", port, Duration::from_secs(2))
            .await
            .unwrap_err();
        assert!(matches!(err, ProbeError::ConnectionRefused));
    }

    #[tokio::test]
    async fn test_elapsed_deadline_is_timeout() {
        let attempt = timeout(
            Duration::ZERO,
            std::future::pending::<std::io::Result<()>>(),
        )
        .await;

        let err = classify(attempt).unwrap_err();
        assert!(matches!(err, ProbeError::ConnectionTimeout));
        assert!(err.is_closed());
    }

    #[test]
    fn test_classify_io_errors() {
        let refused: std::io::Result<()> =
            Err(std::io::Error::from(std::io::ErrorKind::ConnectionRefused));
        assert!(matches!(
            classify(Ok(refused)),
            Err(ProbeError::ConnectionRefused)
        ));

        let other: std::io::Result<()> =
            Err(std::io::Error::new(std::io::ErrorKind::Other, "no route"));
        assert!(matches!(
            classify(Ok(other)),
            Err(ProbeError::Unknown(ref text)) if text == "no route"
        ));

        assert_eq!(classify(Ok(Ok(7u16))).unwrap(), 7);
    }

    #[tokio::test]
    async fn test_connect_unresolvable() {
        let err = connect("nonexistent.invalid", 445, Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, ProbeError::Unknown(_)));
    }
}
