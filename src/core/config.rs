use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::core::cim::{TlsVersion, WbemEndpoint};
use crate::core::ignore::{IgnoreRules, FIRMWARE_QUIRKS, INTRUSION_ELEMENTS, LCD_ELEMENTS};
use crate::core::sensor::CategoryFilter;
use crate::core::vendor::{StatusScheme, Vendor, VendorChoice};
use crate::error::{ProbeError, Result};

const FILE_PREFIX: &str = "file:";

/// How the verdict is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    String,
    Json,
}

impl FromStr for OutputFormat {
    type Err = ProbeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "string" => Ok(OutputFormat::String),
            "json" => Ok(OutputFormat::Json),
            other => Err(ProbeError::config(format!(
                "invalid output format '{}' (expected string or json)",
                other
            ))),
        }
    }
}

/// Everything a single check run needs.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub host: String,
    pub port: Option<u16>,
    pub user: String,
    pub password: String,
    pub ssl_proto: Option<TlsVersion>,
    pub vendor: VendorChoice,
    pub verbose: bool,
    pub perfdata: bool,
    /// Two-letter country code for support links (`-I XX`).
    pub country: Option<String>,
    /// Whole-run budget in seconds.
    pub timeout: Option<u64>,
    pub ignore: Vec<String>,
    pub regex: bool,
    pub categories: CategoryFilter,
    pub lcd: bool,
    pub intrusion: bool,
    pub output: OutputFormat,
    pub pretty: bool,
}

impl ProbeConfig {
    pub fn new(
        host: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port: None,
            user: user.into(),
            password: password.into(),
            ssl_proto: None,
            vendor: VendorChoice::default(),
            verbose: false,
            perfdata: false,
            country: None,
            timeout: None,
            ignore: Vec::new(),
            regex: false,
            categories: CategoryFilter::default(),
            lcd: true,
            intrusion: true,
            output: OutputFormat::default(),
            pretty: false,
        }
    }

    /// Replace `file:` credentials with the contents of the named file.
    pub fn resolve_credentials(&mut self) -> Result<()> {
        let (user, password) = resolve_credentials(&self.user, &self.password)?;
        self.user = user;
        self.password = password;
        Ok(())
    }

    /// Connection parameters for the CIM client.
    pub fn endpoint(&self) -> Result<WbemEndpoint> {
        Ok(WbemEndpoint {
            url: WbemEndpoint::cimom_url(&self.host, self.port)?,
            user: self.user.clone(),
            password: self.password.clone(),
            min_tls: self.ssl_proto,
            timeout: self.timeout.filter(|&t| t > 0).map(Duration::from_secs),
        })
    }

    /// Ignore rules for a run against `vendor`: the user's list, the
    /// `--no-lcd`/`--no-intrusion` element names, and the firmware quirks of
    /// OperationalStatus vendors.
    pub fn ignore_rules(&self, vendor: Vendor) -> Result<IgnoreRules> {
        let mut rules = IgnoreRules::new(&self.ignore, self.regex)?;
        if !self.lcd {
            rules.extend(LCD_ELEMENTS.iter().copied())?;
        }
        if !self.intrusion {
            rules.extend(INTRUSION_ELEMENTS.iter().copied())?;
        }
        if vendor.scheme() == StatusScheme::OperationalStatus {
            rules.extend(FIRMWARE_QUIRKS.iter().copied())?;
        }
        Ok(rules)
    }
}

fn first_line_tokens(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path).map_err(|e| {
        ProbeError::config(format!("cannot read credentials file {}: {}", path.display(), e))
    })?;
    Ok(content
        .lines()
        .next()
        .unwrap_or_default()
        .split_whitespace()
        .map(str::to_string)
        .collect())
}

/// Resolve `file:<path>` credentials.
///
/// A `file:` user reads user and password from the first line of the file.
/// Otherwise a `file:` password reads only the password.
pub fn resolve_credentials(user: &str, password: &str) -> Result<(String, String)> {
    if let Some(path) = user.strip_prefix(FILE_PREFIX) {
        let tokens = first_line_tokens(Path::new(path))?;
        return match tokens.as_slice() {
            [user, password, ..] => Ok((user.clone(), password.clone())),
            _ => Err(ProbeError::config(format!(
                "credentials file {} must hold user and password on its first line",
                path
            ))),
        };
    }

    if let Some(path) = password.strip_prefix(FILE_PREFIX) {
        let tokens = first_line_tokens(Path::new(path))?;
        return match tokens.first() {
            Some(password) => Ok((user.to_string(), password.clone())),
            None => Err(ProbeError::config(format!(
                "credentials file {} holds no password",
                path
            ))),
        };
    }

    Ok((user.to_string(), password.to_string()))
}
