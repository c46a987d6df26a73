//! Hardware vendors and the status scheme each one reports with.

use std::fmt;
use std::str::FromStr;

use crate::error::ProbeError;

/// Server vendor, fixed once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Vendor {
    Dell,
    Hp,
    Ibm,
    Intel,
    #[default]
    Unknown,
}

/// Vendor as requested on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VendorChoice {
    /// Read the chassis manufacturer before checking anything else.
    Auto,
    Fixed(Vendor),
}

impl Default for VendorChoice {
    fn default() -> Self {
        VendorChoice::Fixed(Vendor::Unknown)
    }
}

/// Which status property is read and how its codes are mapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusScheme {
    /// First entry of `OperationalStatus`, 21 known codes.
    OperationalStatus,
    /// `HealthState`, 7 known codes.
    HealthState,
}

impl StatusScheme {
    pub fn property(self) -> &'static str {
        match self {
            StatusScheme::OperationalStatus => "OperationalStatus",
            StatusScheme::HealthState => "HealthState",
        }
    }
}

impl Vendor {
    pub fn as_str(self) -> &'static str {
        match self {
            Vendor::Dell => "dell",
            Vendor::Hp => "hp",
            Vendor::Ibm => "ibm",
            Vendor::Intel => "intel",
            Vendor::Unknown => "unknown",
        }
    }

    pub fn scheme(self) -> StatusScheme {
        match self {
            Vendor::Hp => StatusScheme::HealthState,
            Vendor::Dell | Vendor::Ibm | Vendor::Intel | Vendor::Unknown => {
                StatusScheme::OperationalStatus
            }
        }
    }

    /// Map a chassis manufacturer string to a vendor. Matching is a
    /// case-sensitive prefix test.
    pub fn from_manufacturer(manufacturer: &str) -> Vendor {
        const PREFIXES: [(&str, Vendor); 4] = [
            ("Dell", Vendor::Dell),
            ("HP", Vendor::Hp),
            ("IBM", Vendor::Ibm),
            ("Intel", Vendor::Intel),
        ];

        PREFIXES
            .iter()
            .find(|(prefix, _)| manufacturer.starts_with(prefix))
            .map(|&(_, vendor)| vendor)
            .unwrap_or(Vendor::Unknown)
    }
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VendorChoice {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let choice = match s.to_lowercase().as_str() {
            "auto" => VendorChoice::Auto,
            "dell" => VendorChoice::Fixed(Vendor::Dell),
            "hp" => VendorChoice::Fixed(Vendor::Hp),
            "ibm" => VendorChoice::Fixed(Vendor::Ibm),
            "intel" => VendorChoice::Fixed(Vendor::Intel),
            "unknown" => VendorChoice::Fixed(Vendor::Unknown),
            other => {
                return Err(ProbeError::config(format!(
                    "invalid vendor '{}' (expected auto, dell, hp, ibm, intel or unknown)",
                    other
                )))
            }
        };
        Ok(choice)
    }
}
