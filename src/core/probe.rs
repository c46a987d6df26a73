//! The check run: enumerate every hardware class, interpret each element's
//! status and fold it into one verdict.

use crate::core::cim::{CimClient, CimInstance};
use crate::core::config::ProbeConfig;
use crate::core::identity::{ServerIdentity, BIOS_ELEMENT, BLADE_ELEMENT, CHASSIS_ELEMENT};
use crate::core::ignore::IgnoreRules;
use crate::core::perfdata;
use crate::core::sensor::{format_g, NumericSensor, SensorReading};
use crate::core::severity::Severity;
use crate::core::status::StatusInterpreter;
use crate::core::vendor::{StatusScheme, Vendor, VendorChoice};
use crate::error::Result;

pub const CHASSIS_CLASS: &str = "CIM_Chassis";
pub const NUMERIC_SENSOR_CLASS: &str = "CIM_NumericSensor";
pub const PROCESSOR_CLASS: &str = "CIM_Processor";

/// Classes checked on every run, in request order.
pub const CLASSES_TO_CHECK: [&str; 16] = [
    "OMC_SMASHFirmwareIdentity",
    CHASSIS_CLASS,
    "CIM_Card",
    "CIM_ComputerSystem",
    NUMERIC_SENSOR_CLASS,
    "CIM_Memory",
    PROCESSOR_CLASS,
    "CIM_RecordLog",
    "OMC_DiscreteSensor",
    "OMC_Fan",
    "OMC_PowerSupply",
    "VMware_StorageExtent",
    "VMware_Controller",
    "VMware_StorageVolume",
    "VMware_Battery",
    "VMware_SASSATAPort",
];

/// Running totals of one check.
#[derive(Debug, Default)]
pub struct AggregationState {
    pub severity: Severity,
    pub message: String,
    pub identity: ServerIdentity,
    pub readings: Vec<SensorReading>,
    /// Whether any element got past the ignore rules.
    pub elements_seen: bool,
}

impl AggregationState {
    /// Fold one element's verdict in. Bad verdicts are annotated in the
    /// message even when they do not change the running severity.
    pub fn record(&mut self, candidate: Severity, label: &str) {
        match candidate {
            Severity::Critical => {
                log::debug!("Global exit set to CRITICAL");
                self.message.push_str(&format!(" CRITICAL : {} ", label));
            }
            Severity::Warning => {
                if self.severity != Severity::Critical {
                    log::debug!("Global exit set to WARNING");
                }
                self.message.push_str(&format!(" WARNING : {} ", label));
            }
            Severity::Ok | Severity::Unknown => {}
        }
        self.severity = self.severity.fold(candidate);
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone)]
pub struct ProbeReport {
    pub vendor: Vendor,
    pub severity: Severity,
    pub message: String,
    pub identity: ServerIdentity,
    pub readings: Vec<SensorReading>,
    pub elements_seen: bool,
}

impl ProbeReport {
    /// Ordered performance data, `|`-prefixed, or empty.
    pub fn perfdata(&self) -> String {
        perfdata::render(&self.readings)
    }
}

/// Ask the chassis who built the server. Non-fatal errors and empty
/// answers leave the vendor unknown.
pub fn detect_vendor<C: CimClient>(client: &C) -> Result<Vendor> {
    match client.enumerate_instances(CHASSIS_CLASS) {
        Ok(chassis) => {
            let manufacturer = chassis.first().and_then(|c| c.string("Manufacturer"));
            let vendor = manufacturer
                .map(Vendor::from_manufacturer)
                .unwrap_or_default();
            log::debug!("Detected vendor {} from {:?}", vendor, manufacturer);
            Ok(vendor)
        }
        Err(e) if e.is_fatal() => Err(e),
        Err(e) => {
            log::info!("Unknown CIM Error: {}", e);
            Ok(Vendor::Unknown)
        }
    }
}

/// Single check run against one host.
pub struct Probe<'a, C> {
    config: &'a ProbeConfig,
    client: C,
    vendor: Vendor,
    interpreter: StatusInterpreter,
    ignore: IgnoreRules,
    state: AggregationState,
}

impl<'a, C: CimClient> Probe<'a, C> {
    /// Fix the vendor (asking the server when configured as auto) and
    /// build the ignore rules for it.
    pub fn new(config: &'a ProbeConfig, client: C) -> Result<Self> {
        let vendor = match config.vendor {
            VendorChoice::Fixed(vendor) => vendor,
            VendorChoice::Auto => detect_vendor(&client)?,
        };
        log::debug!("Using vendor {}", vendor);

        Ok(Self {
            config,
            interpreter: StatusInterpreter::new(vendor.scheme()),
            ignore: config.ignore_rules(vendor)?,
            client,
            vendor,
            state: AggregationState::default(),
        })
    }

    pub fn vendor(&self) -> Vendor {
        self.vendor
    }

    /// Walk every class. Transport and authentication failures end the run
    /// at once; other CIM errors skip the class.
    pub fn run(mut self) -> Result<ProbeReport> {
        for class in CLASSES_TO_CHECK {
            log::debug!("Checking class {}", class);

            let instances = match self.client.enumerate_instances(class) {
                Ok(instances) => instances,
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    log::info!("Unknown CIM Error: {}", e);
                    continue;
                }
            };

            for instance in &instances {
                self.process_instance(class, instance)?;
            }
        }

        Ok(ProbeReport {
            vendor: self.vendor,
            severity: self.state.severity,
            message: self.state.message,
            identity: self.state.identity,
            readings: self.state.readings,
            elements_seen: self.state.elements_seen,
        })
    }

    fn process_instance(&mut self, class: &str, instance: &CimInstance) -> Result<()> {
        let name = instance.element_name();
        log::debug!("  Element Name = {}", name);

        if self.ignore.is_ignored(name) {
            log::debug!("    (ignored)");
            return Ok(());
        }

        let identity = &mut self.state.identity;
        match name {
            BIOS_ELEMENT => identity.capture_bios(instance),
            CHASSIS_ELEMENT => identity.capture_chassis(instance, self.vendor),
            BLADE_ELEMENT => identity.capture_blade(instance),
            _ => {}
        }
        self.state.elements_seen = true;

        let mut label = name.to_string();
        if class == NUMERIC_SENSOR_CLASS {
            match NumericSensor::from_instance(instance) {
                Ok(sensor) => {
                    label = format!("{}: {}", name, format_g(sensor.reading));
                    if self.config.perfdata {
                        if let Some(reading) = sensor.reading_for(name) {
                            if self.config.categories.allows(reading.category) {
                                self.state.readings.push(reading);
                            }
                        }
                    }
                }
                Err(e) => log::debug!("    {}", e),
            }
        } else if class == PROCESSOR_CLASS {
            if let Some(family) = instance.integer("Family") {
                log::debug!("    Family = {}", family);
            }
            if let Some(speed) = instance.integer("CurrentClockSpeed") {
                log::debug!("    CurrentClockSpeed = {}MHz", speed);
            }
        }

        if let Some(severity) = self.interpreter.interpret(instance, name)? {
            self.state.record(severity, &label);
        }

        if self.interpreter.scheme() == StatusScheme::OperationalStatus && name == BLADE_ELEMENT {
            self.state.identity.trim_blade_serial();
        }

        Ok(())
    }
}

/// Run a full check with `client`.
pub fn run<C: CimClient>(config: &ProbeConfig, client: C) -> Result<ProbeReport> {
    Probe::new(config, client)?.run()
}
