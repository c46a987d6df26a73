use std::io;

use serde::Serialize;
use serde_json::ser::{Formatter, PrettyFormatter, Serializer};
use serde_json::{Map, Value};

use crate::core::config::{OutputFormat, ProbeConfig};
use crate::core::probe::ProbeReport;
use crate::core::severity::Severity;
use crate::error::{ProbeError, Result};

/// Single-line JSON with `", "` and `": "` separators.
struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }
}

/// The plugin output line for a finished run.
pub fn format_status_line(report: &ProbeReport, country: Option<&str>) -> String {
    let identity = &report.identity;
    let server_info = identity.display_server_info(report.vendor, country);
    let serial = identity.display_serial(report.vendor, country);
    let bios = identity.bios_info.as_deref().unwrap_or_default();
    let perf = report.perfdata();

    match report.severity {
        Severity::Ok => format!("OK - Server: {} s/n: {} {}{}", server_info, serial, bios, perf),
        Severity::Unknown => format!("UNKNOWN: {}", report.message),
        Severity::Warning | Severity::Critical => format!(
            "{} - Server:  {} s/n: {} {}{}",
            report.message, server_info, serial, bios, perf
        ),
    }
}

/// Output line for a run that ended in an error.
pub fn format_error_line(error: &ProbeError) -> String {
    format!("UNKNOWN: {}", error)
}

/// JSON number for a scaled value, kept integral when it was scaled by a
/// non-negative power of ten.
fn json_number(value: f64, whole: bool) -> Value {
    if whole && value.fract() == 0.0 && value.abs() < (1u64 << 53) as f64 {
        Value::from(value as i64)
    } else {
        Value::from(value)
    }
}

/// Identity, sensor readings and the exit code as a key-sorted JSON object.
pub fn json_document(report: &ProbeReport) -> Value {
    let mut doc = Map::new();
    let identity = &report.identity;

    if let Some(bios) = &identity.bios_info {
        doc.insert("Bios Info".to_string(), Value::from(bios.as_str()));
    }
    if report.elements_seen {
        doc.insert(
            "SerialNumber".to_string(),
            Value::from(identity.serial_number.as_str()),
        );
    }
    if !identity.server_info.is_empty() {
        doc.insert(
            "Server Info".to_string(),
            Value::from(identity.server_info.as_str()),
        );
    }

    for reading in &report.readings {
        let mut sensor = Map::new();
        if let Some(unit) = reading.category.unit() {
            sensor.insert("Unit".to_string(), Value::from(unit));
        }
        let whole = reading.whole;
        sensor.insert("Value".to_string(), json_number(reading.value, whole.value));
        sensor.insert("warn".to_string(), json_number(reading.warn, whole.warn));
        sensor.insert("crit".to_string(), json_number(reading.crit, whole.crit));
        doc.insert(reading.label.clone(), Value::Object(sensor));
    }

    doc.insert(
        "GlobalStatus".to_string(),
        Value::from(report.severity.exit_code()),
    );
    Value::Object(doc)
}

/// Serialize `value`, indented by four spaces when `pretty` is set.
pub fn format_json(value: &Value, pretty: bool) -> Result<String> {
    let mut out = Vec::new();
    if pretty {
        let mut ser = Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
        value.serialize(&mut ser).map_err(io::Error::from)?;
    } else {
        let mut ser = Serializer::with_formatter(&mut out, SpacedFormatter);
        value.serialize(&mut ser).map_err(io::Error::from)?;
    }
    String::from_utf8(out)
        .map_err(|e| ProbeError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
}

/// Render a report in the configured output format.
pub fn format_report(report: &ProbeReport, config: &ProbeConfig) -> Result<String> {
    match config.output {
        OutputFormat::String => Ok(format_status_line(report, config.country.as_deref())),
        OutputFormat::Json => format_json(&json_document(report), config.pretty),
    }
}
