//! Discovery of the port the local client is listening on.
//!
//! The desktop client binds the first free port of a small range, so the
//! only way to find it is to try each one in order until a request gets
//! through.

use std::future::Future;
use std::ops::RangeInclusive;

use tracing::debug;

use super::RemoteError;

/// Default first port tried.
pub const DEFAULT_PORT_START: u16 = 4370;

/// Default last port tried (inclusive).
pub const DEFAULT_PORT_END: u16 = 4379;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortLocator {
    start: u16,
    end: u16,
}

impl Default for PortLocator {
    fn default() -> Self {
        Self::new(DEFAULT_PORT_START, DEFAULT_PORT_END)
    }
}

impl PortLocator {
    pub fn new(start: u16, end: u16) -> Self {
        Self { start, end }
    }

    pub fn ports(&self) -> RangeInclusive<u16> {
        self.start..=self.end
    }

    /// Run `attempt` against each port in turn until one connects.
    ///
    /// A `RemoteError::Connection` from `attempt` moves on to the next port;
    /// any other error stops the scan and is returned as-is. On success the
    /// port is returned together with whatever the attempt produced.
    pub async fn locate<T, F, Fut>(&self, mut attempt: F) -> Result<(u16, T), RemoteError>
    where
        F: FnMut(u16) -> Fut,
        Fut: Future<Output = Result<T, RemoteError>>,
    {
        for port in self.ports() {
            debug!(port, "Trying port");
            match attempt(port).await {
                Ok(value) => {
                    debug!(port, "Port answered");
                    return Ok((port, value));
                }
                Err(e) if e.is_connection() => {
                    debug!(port, error = %e, "Nothing listening");
                }
                Err(e) => return Err(e),
            }
        }

        Err(RemoteError::Connection {
            start: self.start,
            end: self.end,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn refused(port: u16) -> RemoteError {
        RemoteError::Connection { start: port, end: port }
    }

    #[tokio::test]
    async fn test_lands_on_listening_port() {
        let locator = PortLocator::default();

        for listening in DEFAULT_PORT_START..DEFAULT_PORT_END {
            let mut tried = Vec::new();
            let (port, body) = locator
                .locate(|port| {
                    tried.push(port);
                    async move {
                        if port == listening {
                            Ok("ok")
                        } else {
                            Err(refused(port))
                        }
                    }
                })
                .await
                .expect("port should be found");

            assert_eq!(port, listening);
            assert_eq!(body, "ok");
            // Sequential from the start, stopping at the first hit
            let expected: Vec<u16> = (DEFAULT_PORT_START..=listening).collect();
            assert_eq!(tried, expected);
        }
    }

    #[tokio::test]
    async fn test_exhausted_range_tries_every_port_once() {
        let locator = PortLocator::new(4370, 4379);
        let mut attempts = 0;

        let result: Result<(u16, ()), _> = locator
            .locate(|port| {
                attempts += 1;
                async move { Err(refused(port)) }
            })
            .await;

        assert!(matches!(
            result,
            Err(RemoteError::Connection { start: 4370, end: 4379 })
        ));
        assert_eq!(attempts, 10);
    }

    #[tokio::test]
    async fn test_other_errors_stop_the_scan() {
        let locator = PortLocator::new(4370, 4379);
        let mut attempts = 0;

        let result: Result<(u16, ()), _> = locator
            .locate(|_| {
                attempts += 1;
                async move { Err(RemoteError::Decode("garbage".to_string())) }
            })
            .await;

        assert!(matches!(result, Err(RemoteError::Decode(_))));
        assert_eq!(attempts, 1);
    }

    #[tokio::test]
    async fn test_empty_range() {
        let locator = PortLocator::new(4379, 4370);
        let mut attempts = 0;

        let result: Result<(u16, ()), _> = locator
            .locate(|_| {
                attempts += 1;
                async move { Ok(()) }
            })
            .await;

        assert!(matches!(result, Err(RemoteError::Connection { .. })));
        assert_eq!(attempts, 0);
    }

    #[tokio::test]
    async fn test_top_of_port_space() {
        let locator = PortLocator::new(65534, 65535);
        let (port, _) = locator
            .locate(|port| async move {
                if port == 65535 {
                    Ok(())
                } else {
                    Err(refused(port))
                }
            })
            .await
            .expect("last port should be reachable");
        assert_eq!(port, 65535);
    }
}
