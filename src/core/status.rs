//! Vendor status code interpretation.
//!
//! Both tables are closed: a code outside the table is reported as an error
//! instead of being treated as healthy.

use crate::core::cim::CimInstance;
use crate::core::severity::Severity;
use crate::core::vendor::StatusScheme;
use crate::error::{ProbeError, Result};

/// Severity for a CIM `OperationalStatus` value.
///
/// Codes 1 (Other) and 19 (DMTF Reserved) map to CRITICAL and OK
/// respectively; existing alerting depends on both.
pub fn operational_status(code: i64) -> Option<Severity> {
    let severity = match code {
        0 => Severity::Ok,        // Unknown
        1 => Severity::Critical,  // Other
        2 => Severity::Ok,        // OK
        3 => Severity::Warning,   // Degraded
        4 => Severity::Warning,   // Stressed
        5 => Severity::Warning,   // Predictive Failure
        6 => Severity::Critical,  // Error
        7 => Severity::Critical,  // Non-Recoverable Error
        8 => Severity::Warning,   // Starting
        9 => Severity::Warning,   // Stopping
        10 => Severity::Critical, // Stopped
        11 => Severity::Ok,       // In Service
        12 => Severity::Warning,  // No Contact
        13 => Severity::Critical, // Lost Communication
        14 => Severity::Critical, // Aborted
        15 => Severity::Ok,       // Dormant
        16 => Severity::Critical, // Supporting Entity in Error
        17 => Severity::Ok,       // Completed
        18 => Severity::Ok,       // Power Mode
        19 => Severity::Ok,       // DMTF Reserved
        20 => Severity::Ok,       // Vendor Reserved
        _ => return None,
    };
    Some(severity)
}

/// Severity for a CIM `HealthState` value.
pub fn health_state(code: i64) -> Option<Severity> {
    let severity = match code {
        0 => Severity::Ok,        // Unknown
        5 => Severity::Ok,        // OK
        10 => Severity::Warning,  // Degraded
        15 => Severity::Warning,  // Minor
        20 => Severity::Critical, // Major
        25 => Severity::Critical, // Critical
        30 => Severity::Critical, // Non-recoverable Error
        _ => return None,
    };
    Some(severity)
}

/// Reads and maps the status property of one scheme.
#[derive(Debug, Clone, Copy)]
pub struct StatusInterpreter {
    scheme: StatusScheme,
}

impl StatusInterpreter {
    pub fn new(scheme: StatusScheme) -> Self {
        Self { scheme }
    }

    pub fn scheme(&self) -> StatusScheme {
        self.scheme
    }

    /// Map a raw code. Unknown codes are an error naming the element.
    pub fn interpret_code(&self, code: i64, element: &str) -> Result<Severity> {
        let mapped = match self.scheme {
            StatusScheme::OperationalStatus => operational_status(code),
            StatusScheme::HealthState => health_state(code),
        };

        mapped.ok_or_else(|| ProbeError::UnrecognizedStatus {
            scheme: self.scheme.property(),
            code,
            element: element.to_string(),
        })
    }

    /// Severity of an instance, or `None` when it carries no status.
    pub fn interpret(&self, instance: &CimInstance, element: &str) -> Result<Option<Severity>> {
        let code = match self.scheme {
            StatusScheme::OperationalStatus => instance.first_integer("OperationalStatus"),
            StatusScheme::HealthState => instance.integer("HealthState"),
        };

        match code {
            Some(code) => {
                log::debug!("    Element {} = {}", self.scheme.property(), code);
                self.interpret_code(code, element).map(Some)
            }
            None => Ok(None),
        }
    }
}
