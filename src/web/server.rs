use log::info;
use std::convert::Infallible;
use std::net::{Ipv4Addr, SocketAddr};
use warp::http::StatusCode;
use warp::Filter;

use crate::error::{Error, Result};

/// Liveness responder: every GET, on any path, answers `200 OK` with body `OK`.
pub struct HealthServer {
    addr: SocketAddr,
}

impl HealthServer {
    pub fn new(port: u16) -> Self {
        Self {
            addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)),
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn routes() -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
        warp::get().and_then(health_check)
    }

    /// Binds and serves until the process exits.
    pub async fn run(self) -> Result<()> {
        let (addr, server) = warp::serve(Self::routes())
            .try_bind_ephemeral(self.addr)
            .map_err(|e| Error::ServerError(format!("failed to bind {}: {}", self.addr, e)))?;
        info!("Health endpoint listening on {}", addr);
        server.await;
        Ok(())
    }
}

async fn health_check() -> std::result::Result<impl warp::Reply, Infallible> {
    Ok(warp::reply::with_status("OK", StatusCode::OK))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_check_any_path() {
        for path in ["/", "/health", "/some/deep/path?x=1"] {
            let response = warp::test::request()
                .method("GET")
                .path(path)
                .reply(&HealthServer::routes())
                .await;
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(response.body().as_ref(), b"OK");
        }
    }

    #[tokio::test]
    async fn test_non_get_rejected() {
        let response = warp::test::request()
            .method("POST")
            .path("/")
            .reply(&HealthServer::routes())
            .await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[test]
    fn test_binds_all_interfaces() {
        let server = HealthServer::new(8000);
        assert_eq!(server.addr().to_string(), "0.0.0.0:8000");
    }
}
