//! Network probing for live API endpoints.
//!
//! A probe checks a fixed list of ports on one host with a plain TCP
//! connect, then sends a GET to a few well-known paths on every open port.
//! Responses with status 200, 401 or 403 count as an API being present.

use std::net::{Ipv6Addr, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use tracing::debug;

use super::{CollaboratorError, CollaboratorErrorKind};

/// Ports probed when the request does not name any.
pub const DEFAULT_PORTS: [u16; 8] = [80, 443, 8080, 8000, 3000, 5000, 5001, 9000];

/// Paths requested on every open port when the request does not name any.
pub const DEFAULT_PATHS: [&str; 5] = ["/", "/api", "/v1", "/swagger", "/docs"];

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_TIMEOUT: Duration = Duration::from_millis(1000);
const API_STATUSES: [u16; 3] = [200, 401, 403];

/// Probe parameters. Every field falls back to a default.
#[derive(Debug, Clone, Default)]
pub struct ProbeRequest {
    pub host: Option<String>,
    pub ports: Option<Vec<u16>>,
    pub paths: Option<Vec<String>>,
    /// Applies to each TCP connect and each HTTP request.
    pub timeout: Option<Duration>,
}

/// A path that answered like an API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbedEndpoint {
    pub path: String,
    pub status_code: u16,
    pub content_type: String,
    pub has_json: bool,
}

/// An open port and whatever answered on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbedService {
    pub host: String,
    pub port: u16,
    pub base_url: String,
    pub endpoints: Vec<ProbedEndpoint>,
}

impl ProbedService {
    /// Whether any probe path answered with an API-like status.
    pub fn is_potential_api(&self) -> bool {
        !self.endpoints.is_empty()
    }

    /// Whether any endpoint returned JSON.
    pub fn speaks_json(&self) -> bool {
        self.endpoints.iter().any(|e| e.has_json)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeResponse {
    pub host: String,
    pub scanned_ports: Vec<u16>,
    /// Open ports, in scan order.
    pub services: Vec<ProbedService>,
}

impl ProbeResponse {
    /// Services where at least one path looked like an API.
    pub fn api_services(&self) -> impl Iterator<Item = &ProbedService> {
        self.services.iter().filter(|s| s.is_potential_api())
    }
}

/// Scans a host for HTTP APIs.
#[derive(Debug, Default, Clone, Copy)]
pub struct NetworkProbe;

impl NetworkProbe {
    pub fn new() -> Self {
        Self
    }

    /// Run the probe.
    ///
    /// Closed ports and failed requests are not errors; only an unresolvable
    /// host or an HTTP client that cannot be built fail the probe.
    pub fn probe(&self, request: &ProbeRequest) -> Result<ProbeResponse, CollaboratorError> {
        let host = request.host.as_deref().unwrap_or(DEFAULT_HOST).to_string();
        let ports = request
            .ports
            .clone()
            .unwrap_or_else(|| DEFAULT_PORTS.to_vec());
        let paths = request
            .paths
            .clone()
            .unwrap_or_else(|| DEFAULT_PATHS.iter().map(|p| p.to_string()).collect());
        let timeout = request.timeout.unwrap_or(DEFAULT_TIMEOUT);

        if host.trim().is_empty() {
            return Err(CollaboratorError::validation("probe host must not be empty"));
        }

        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            CollaboratorError::new(
                CollaboratorErrorKind::Network,
                format!("failed to build HTTP client: {}", e),
            )
        })?;

        let mut services = Vec::new();
        for &port in &ports {
            let addr = resolve(&host, port)?;
            if TcpStream::connect_timeout(&addr, timeout).is_err() {
                debug!("{}:{} closed", host, port);
                continue;
            }

            let base_url = base_url(&host, port);
            let endpoints = paths
                .iter()
                .filter_map(|path| probe_path(&client, &base_url, path))
                .collect();

            services.push(ProbedService {
                host: host.clone(),
                port,
                base_url,
                endpoints,
            });
        }

        Ok(ProbeResponse {
            host,
            scanned_ports: ports,
            services,
        })
    }
}

fn resolve(host: &str, port: u16) -> Result<SocketAddr, CollaboratorError> {
    let not_found = || {
        CollaboratorError::new(
            CollaboratorErrorKind::Network,
            format!("could not resolve host '{}'", host),
        )
    };
    let bare = host.trim_start_matches('[').trim_end_matches(']');
    (bare, port)
        .to_socket_addrs()
        .map_err(|_| not_found())?
        .next()
        .ok_or_else(not_found)
}

/// IPv6 literals are bracketed unless the caller already did so.
fn base_url(host: &str, port: u16) -> String {
    let scheme = if port == 443 { "https" } else { "http" };
    if host.parse::<Ipv6Addr>().is_ok() {
        format!("{}://[{}]:{}", scheme, host, port)
    } else {
        format!("{}://{}:{}", scheme, host, port)
    }
}

fn probe_path(client: &Client, base_url: &str, path: &str) -> Option<ProbedEndpoint> {
    let url = format!("{}{}", base_url, path);
    let response = match client.get(&url).send() {
        Ok(response) => response,
        Err(e) => {
            debug!("GET {} failed: {}", url, e);
            return None;
        }
    };

    let status_code = response.status().as_u16();
    if !API_STATUSES.contains(&status_code) {
        return None;
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    Some(ProbedEndpoint {
        path: path.to_string(),
        status_code,
        has_json: content_type.contains("application/json"),
        content_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn request_for(server: &MockServer, paths: &[&str]) -> ProbeRequest {
        ProbeRequest {
            host: Some("127.0.0.1".to_string()),
            ports: Some(vec![server.port()]),
            paths: Some(paths.iter().map(|p| p.to_string()).collect()),
            timeout: Some(Duration::from_secs(2)),
        }
    }

    #[test]
    fn keeps_api_like_statuses() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api");
            then.status(200)
                .header("content-type", "application/json")
                .body("{}");
        });
        server.mock(|when, then| {
            when.method(GET).path("/v1");
            then.status(401);
        });
        server.mock(|when, then| {
            when.method(GET).path("/docs");
            then.status(404);
        });

        let response = NetworkProbe::new()
            .probe(&request_for(&server, &["/api", "/v1", "/docs"]))
            .unwrap();

        assert_eq!(response.services.len(), 1);
        let service = &response.services[0];
        assert_eq!(service.port, server.port());
        assert!(service.base_url.starts_with("http://"));

        let paths: Vec<_> = service.endpoints.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["/api", "/v1"]);
        assert!(service.endpoints[0].has_json);
        assert_eq!(service.endpoints[1].status_code, 401);
        assert!(service.speaks_json());
    }

    #[test]
    fn open_port_without_api_is_not_potential_api() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/");
            then.status(500);
        });

        let response = NetworkProbe::new()
            .probe(&request_for(&server, &["/"]))
            .unwrap();

        assert_eq!(response.services.len(), 1);
        assert_eq!(response.api_services().count(), 0);
    }

    #[test]
    fn closed_port_is_skipped() {
        // Bind then drop to get a port nothing listens on.
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();

        let response = NetworkProbe::new()
            .probe(&ProbeRequest {
                host: Some("127.0.0.1".to_string()),
                ports: Some(vec![port]),
                paths: None,
                timeout: Some(Duration::from_millis(200)),
            })
            .unwrap();

        assert!(response.services.is_empty());
        assert_eq!(response.scanned_ports, vec![port]);
    }

    #[test]
    fn empty_host_is_rejected() {
        let err = NetworkProbe::new()
            .probe(&ProbeRequest {
                host: Some("  ".to_string()),
                ..Default::default()
            })
            .unwrap_err();
        assert_eq!(err.kind, CollaboratorErrorKind::Validation);
    }

    #[test]
    fn https_is_used_on_443() {
        assert_eq!(base_url("10.0.0.2", 443), "https://10.0.0.2:443");
        assert_eq!(base_url("10.0.0.2", 8080), "http://10.0.0.2:8080");
    }

    #[test]
    fn ipv6_hosts_are_bracketed() {
        assert_eq!(base_url("::1", 8080), "http://[::1]:8080");
        assert_eq!(base_url("[::1]", 8080), "http://[::1]:8080");
        assert_eq!(base_url("fe80::2", 443), "https://[fe80::2]:443");
        assert_eq!(base_url("api.internal", 80), "http://api.internal:80");
    }

    /// Answer every request on `listener` with an empty JSON object.
    fn serve_json(listener: std::net::TcpListener) {
        use std::io::{Read, Write};

        std::thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { continue };
                let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut buf) {
                        Ok(0) | Err(_) => break,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }
                if request.is_empty() {
                    continue;
                }
                let _ = stream.write_all(
                    b"HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 2\r\nconnection: close\r\n\r\n{}",
                );
            }
        });
    }

    #[test]
    fn ipv6_loopback_service_is_reachable() {
        // Hosts without IPv6 loopback have nothing to test.
        let Ok(listener) = std::net::TcpListener::bind("[::1]:0") else {
            return;
        };
        let port = listener.local_addr().unwrap().port();
        serve_json(listener);

        for host in ["::1", "[::1]"] {
            let response = NetworkProbe::new()
                .probe(&ProbeRequest {
                    host: Some(host.to_string()),
                    ports: Some(vec![port]),
                    paths: Some(vec!["/api".to_string()]),
                    timeout: Some(Duration::from_secs(2)),
                })
                .unwrap();

            assert_eq!(response.services.len(), 1);
            let service = &response.services[0];
            assert_eq!(service.base_url, format!("http://[::1]:{}", port));
            assert_eq!(service.endpoints.len(), 1);
            assert!(service.speaks_json());
        }
    }
}
