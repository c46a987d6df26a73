//! CIM-XML over HTTPS using a blocking reqwest client.

use std::cell::Cell;
use std::str::FromStr;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use url::Url;

use super::xml::{enumerate_instances_request, parse_enumerate_response};
use super::{CimClient, CimInstance, NAMESPACE};
use crate::error::{ProbeError, Result};

/// Default CIM-XML over HTTPS port.
pub const DEFAULT_CIM_PORT: u16 = 5989;

/// Minimum TLS version forced with `--sslproto`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsVersion {
    Tls10,
    Tls11,
    Tls12,
    Tls13,
}

impl TlsVersion {
    fn to_reqwest(self) -> reqwest::tls::Version {
        match self {
            TlsVersion::Tls10 => reqwest::tls::Version::TLS_1_0,
            TlsVersion::Tls11 => reqwest::tls::Version::TLS_1_1,
            TlsVersion::Tls12 => reqwest::tls::Version::TLS_1_2,
            TlsVersion::Tls13 => reqwest::tls::Version::TLS_1_3,
        }
    }

    /// rustls handles TLS 1.2 and later; the native backend cannot pin a
    /// TLS 1.3 minimum and is kept for the older versions.
    fn needs_rustls(self) -> bool {
        matches!(self, TlsVersion::Tls12 | TlsVersion::Tls13)
    }
}

impl FromStr for TlsVersion {
    type Err = ProbeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tlsv1" => Ok(TlsVersion::Tls10),
            "tlsv1.1" => Ok(TlsVersion::Tls11),
            "tlsv1.2" => Ok(TlsVersion::Tls12),
            "tlsv1.3" => Ok(TlsVersion::Tls13),
            "sslv2" | "sslv3" => Err(ProbeError::config(format!(
                "SSL protocol {} is not supported by the TLS backend",
                s
            ))),
            _ => Err(ProbeError::config(format!(
                "Invalid SSL protocol version given: {} (expected TLSv1, TLSv1.1, TLSv1.2 or TLSv1.3)",
                s
            ))),
        }
    }
}

/// Where and how to reach the CIMOM.
#[derive(Debug, Clone)]
pub struct WbemEndpoint {
    pub url: Url,
    pub user: String,
    pub password: String,
    pub min_tls: Option<TlsVersion>,
    pub timeout: Option<Duration>,
}

impl WbemEndpoint {
    /// Build the `/cimom` URL from a host (with or without `https://`)
    /// and an optional port.
    pub fn cimom_url(host: &str, port: Option<u16>) -> Result<Url> {
        let host = host.trim().to_lowercase();
        if host.is_empty() {
            return Err(ProbeError::config("host must not be empty"));
        }

        let base = if host.starts_with("https://") {
            host
        } else {
            format!("https://{}", host)
        };

        let mut url = Url::parse(&base)
            .map_err(|e| ProbeError::config(format!("invalid host '{}': {}", base, e)))?;
        if url.host_str().is_none() {
            return Err(ProbeError::config(format!("invalid host '{}'", base)));
        }

        url.set_port(Some(port.unwrap_or(DEFAULT_CIM_PORT)))
            .map_err(|_| ProbeError::config(format!("cannot set port on '{}'", base)))?;
        url.set_path("/cimom");
        Ok(url)
    }
}

/// Blocking CIM client for a single host.
pub struct WbemClient {
    http: Client,
    endpoint: WbemEndpoint,
    next_message_id: Cell<u32>,
}

impl WbemClient {
    pub fn new(endpoint: WbemEndpoint) -> Result<Self> {
        // ESXi hosts ship self-signed certificates
        let mut builder = Client::builder()
            .danger_accept_invalid_certs(true)
            .user_agent(concat!("esxprobe/", env!("CARGO_PKG_VERSION")));

        if let Some(version) = endpoint.min_tls {
            if version.needs_rustls() {
                builder = builder.use_rustls_tls();
            }
            builder = builder.min_tls_version(version.to_reqwest());
        }
        if let Some(timeout) = endpoint.timeout {
            builder = builder.timeout(timeout);
        }

        let http = builder
            .build()
            .map_err(|e| ProbeError::config(format!("failed to set up HTTPS client: {}", e)))?;

        Ok(Self {
            http,
            endpoint,
            next_message_id: Cell::new(1001),
        })
    }

    pub fn endpoint(&self) -> &WbemEndpoint {
        &self.endpoint
    }

    fn message_id(&self) -> u32 {
        let id = self.next_message_id.get();
        self.next_message_id.set(id.wrapping_add(1));
        id
    }
}

impl CimClient for WbemClient {
    fn enumerate_instances(&self, class_name: &str) -> Result<Vec<CimInstance>> {
        let body = enumerate_instances_request(self.message_id(), class_name);

        let response = self
            .http
            .post(self.endpoint.url.clone())
            .basic_auth(&self.endpoint.user, Some(&self.endpoint.password))
            .header("Content-Type", "application/xml; charset=\"utf-8\"")
            .header("CIMOperation", "MethodCall")
            .header("CIMMethod", "EnumerateInstances")
            .header("CIMObject", NAMESPACE.replace('/', "%2F"))
            .body(body)
            .send()
            .map_err(|e| ProbeError::transport(format!("Connection error: {}", e)))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ProbeError::Auth);
        }
        if !status.is_success() {
            return Err(ProbeError::transport(format!(
                "HTTP error {} from {}",
                status, self.endpoint.url
            )));
        }

        let text = response
            .text()
            .map_err(|e| ProbeError::transport(format!("Failed to read CIM response: {}", e)))?;

        parse_enumerate_response(&text)
    }
}
