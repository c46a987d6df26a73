//! Numeric sensor readings.
//!
//! `CIM_NumericSensor` instances carry a raw reading plus a power-of-ten
//! `UnitModifier`. The scaled reading and upper thresholds become one
//! performance-data entry, grouped into one of six categories.

use serde::Serialize;

use crate::core::cim::CimInstance;
use crate::error::{ProbeError, Result};

const SENSOR_TYPE_TEMPERATURE: i64 = 2;
const SENSOR_TYPE_VOLTAGE: i64 = 3;
const SENSOR_TYPE_CURRENT: i64 = 4;
const SENSOR_TYPE_TACHOMETER: i64 = 5;

const BASE_UNITS_AMPS: i64 = 6;
const BASE_UNITS_WATTS: i64 = 7;
const BASE_UNITS_PERCENT: i64 = 65;

/// Display name of a CIM `SensorType` code.
pub fn sensor_type_name(code: i64) -> &'static str {
    match code {
        0 => "unknown",
        1 => "Other",
        2 => "Temperature",
        3 => "Voltage",
        4 => "Current",
        5 => "Tachometer",
        6 => "Counter",
        7 => "Switch",
        8 => "Lock",
        9 => "Humidity",
        10 => "Smoke Detection",
        11 => "Presence",
        12 => "Air Flow",
        13 => "Power Consumption",
        14 => "Power Production",
        15 => "Pressure",
        16 => "Intrusion",
        32768 => "DMTF Reserved",
        65535 => "Vendor Reserved",
        _ => "Unknown",
    }
}

/// Performance-data group of a sensor. The discriminant is the group's
/// position in the rendered output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum SensorCategory {
    Power = 1,
    Voltage = 2,
    Current = 3,
    Temperature = 4,
    Fan = 5,
    FanPercent = 6,
}

impl SensorCategory {
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    /// Short tag used in perf labels.
    pub fn prefix(self) -> &'static str {
        match self {
            SensorCategory::Power => "Pow",
            SensorCategory::Voltage => "Vol",
            SensorCategory::Current => "Cur",
            SensorCategory::Temperature => "Tem",
            SensorCategory::Fan => "Fan",
            SensorCategory::FanPercent => "FanP",
        }
    }

    /// Unit reported in JSON output, if any.
    pub fn unit(self) -> Option<&'static str> {
        match self {
            SensorCategory::Power => Some("Watt"),
            SensorCategory::Current => Some("Ampere"),
            SensorCategory::Voltage => Some("Volt"),
            SensorCategory::FanPercent => Some("%"),
            SensorCategory::Temperature | SensorCategory::Fan => None,
        }
    }

    /// Category for a `SensorType`/`BaseUnits` pair. Sensor types without
    /// a category produce no performance data.
    pub fn classify(sensor_type: i64, base_units: Option<i64>) -> Option<SensorCategory> {
        match (sensor_type, base_units) {
            (SENSOR_TYPE_CURRENT, Some(BASE_UNITS_WATTS)) => Some(SensorCategory::Power),
            (SENSOR_TYPE_CURRENT, Some(BASE_UNITS_AMPS)) => Some(SensorCategory::Current),
            (SENSOR_TYPE_CURRENT, _) => None,
            (SENSOR_TYPE_VOLTAGE, _) => Some(SensorCategory::Voltage),
            (SENSOR_TYPE_TEMPERATURE, _) => Some(SensorCategory::Temperature),
            (SENSOR_TYPE_TACHOMETER, Some(BASE_UNITS_PERCENT)) => {
                Some(SensorCategory::FanPercent)
            }
            (SENSOR_TYPE_TACHOMETER, _) => Some(SensorCategory::Fan),
            _ => None,
        }
    }
}

/// Per-category switches for performance data collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryFilter {
    pub power: bool,
    pub volts: bool,
    pub current: bool,
    pub temp: bool,
    pub fan: bool,
}

impl Default for CategoryFilter {
    fn default() -> Self {
        Self {
            power: true,
            volts: true,
            current: true,
            temp: true,
            fan: true,
        }
    }
}

impl CategoryFilter {
    pub fn allows(&self, category: SensorCategory) -> bool {
        match category {
            SensorCategory::Power => self.power,
            SensorCategory::Voltage => self.volts,
            SensorCategory::Current => self.current,
            SensorCategory::Temperature => self.temp,
            SensorCategory::Fan | SensorCategory::FanPercent => self.fan,
        }
    }
}

/// Scaled thresholds; absent ones read as 0.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Thresholds {
    pub lower_non_critical: f64,
    pub upper_non_critical: f64,
    pub lower_critical: f64,
    pub upper_critical: f64,
}

/// Which reported fields are whole numbers: anything scaled by a
/// non-negative modifier, and thresholds the sensor did not report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WholeFields {
    pub value: bool,
    pub warn: bool,
    pub crit: bool,
}

/// Scaled values of one `CIM_NumericSensor` instance.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericSensor {
    pub sensor_type: Option<i64>,
    pub base_units: Option<i64>,
    pub reading: f64,
    pub thresholds: Thresholds,
    pub whole: WholeFields,
}

/// Multiply by `10^modifier`. Negative modifiers divide so that decimal
/// readings such as 25000 * 10^-3 come out exact.
fn apply_modifier(value: f64, modifier: i32) -> f64 {
    if modifier >= 0 {
        value * 10f64.powi(modifier)
    } else {
        value / 10f64.powi(-modifier)
    }
}

impl NumericSensor {
    /// Read and scale a sensor instance. The current reading is truncated
    /// to an integer before scaling; thresholds are scaled as-is.
    pub fn from_instance(instance: &CimInstance) -> Result<Self> {
        let modifier = instance
            .integer("UnitModifier")
            .unwrap_or(0)
            .clamp(i32::MIN as i64, i32::MAX as i64) as i32;

        let raw = instance.number("CurrentReading").ok_or_else(|| {
            ProbeError::malformed(format!(
                "sensor '{}' has no CurrentReading",
                instance.element_name()
            ))
        })?;

        let threshold = |name: &str| {
            instance
                .number(name)
                .map(|v| apply_modifier(v, modifier))
                .unwrap_or(0.0)
        };

        let exact = modifier >= 0;
        let sensor = Self {
            sensor_type: instance.integer("SensorType"),
            base_units: instance.integer("BaseUnits"),
            reading: apply_modifier(raw.trunc(), modifier),
            whole: WholeFields {
                value: exact,
                warn: exact || instance.number("UpperThresholdNonCritical").is_none(),
                crit: exact || instance.number("UpperThresholdCritical").is_none(),
            },
            thresholds: Thresholds {
                lower_non_critical: threshold("LowerThresholdNonCritical"),
                upper_non_critical: threshold("UpperThresholdNonCritical"),
                lower_critical: threshold("LowerThresholdCritical"),
                upper_critical: threshold("UpperThresholdCritical"),
            },
        };

        if let Some(code) = sensor.sensor_type {
            log::debug!("    sensorType = {} - {}", code, sensor_type_name(code));
        }
        if let Some(units) = sensor.base_units {
            log::debug!("    BaseUnits = {}", units);
        }
        log::debug!("    Scaled by = 10^{}", modifier);
        log::debug!("    Current Reading = {}", sensor.reading);
        log::debug!("    Thresholds = {:?}", sensor.thresholds);

        Ok(sensor)
    }

    pub fn category(&self) -> Option<SensorCategory> {
        self.sensor_type
            .and_then(|t| SensorCategory::classify(t, self.base_units))
    }

    /// Turn this sensor into a performance reading labelled after its element.
    pub fn reading_for(&self, element_name: &str) -> Option<SensorReading> {
        let category = self.category()?;
        Some(SensorReading {
            label: element_name.replace(' ', "_"),
            category,
            value: self.reading,
            warn: self.thresholds.upper_non_critical,
            crit: self.thresholds.upper_critical,
            whole: self.whole,
        })
    }
}

/// One performance-data entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorReading {
    pub label: String,
    pub category: SensorCategory,
    pub value: f64,
    pub warn: f64,
    pub crit: f64,
    #[serde(skip)]
    pub whole: WholeFields,
}

impl SensorReading {
    /// `label=value;warn;crit ` with a `%` after fan percentages.
    pub fn render(&self) -> String {
        let unit = if self.category == SensorCategory::FanPercent {
            "%"
        } else {
            ""
        };
        format!(
            "{}={}{};{};{} ",
            self.label,
            format_g(self.value),
            unit,
            format_g(self.warn),
            format_g(self.crit)
        )
    }
}

fn trim_fraction(mut digits: String) -> String {
    if digits.contains('.') {
        while digits.ends_with('0') {
            digits.pop();
        }
        if digits.ends_with('.') {
            digits.pop();
        }
    }
    digits
}

/// Format like C's `%g`: six significant digits, trailing zeros removed,
/// exponent form below 1e-4 and from 1e6.
pub fn format_g(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }

    let scientific = format!("{:.5e}", value);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((m, e)) => (m.to_string(), e.parse::<i32>().unwrap_or(0)),
        None => return scientific,
    };

    if (-4..6).contains(&exponent) {
        let decimals = (5 - exponent) as usize;
        trim_fraction(format!("{:.*}", decimals, value))
    } else {
        format!(
            "{}e{}{:02}",
            trim_fraction(mantissa),
            if exponent < 0 { '-' } else { '+' },
            exponent.abs()
        )
    }
}
