// Scripted CIM server shared by the integration tests

use std::cell::RefCell;
use std::collections::HashMap;

use esxprobe::core::cim::{CimClient, CimInstance, CimValue};
use esxprobe::error::{ProbeError, Result};

/// What the fake server answers for one class.
pub enum Reply {
    Instances(Vec<CimInstance>),
    Transport,
    Auth,
    CimError(u32, &'static str),
}

#[derive(Default)]
pub struct ScriptedClient {
    replies: HashMap<String, Reply>,
    calls: RefCell<Vec<String>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, class: &str, reply: Reply) -> Self {
        self.replies.insert(class.to_string(), reply);
        self
    }

    pub fn instances(self, class: &str, instances: Vec<CimInstance>) -> Self {
        self.reply(class, Reply::Instances(instances))
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl CimClient for ScriptedClient {
    fn enumerate_instances(&self, class_name: &str) -> Result<Vec<CimInstance>> {
        self.calls.borrow_mut().push(class_name.to_string());
        match self.replies.get(class_name) {
            None => Ok(Vec::new()),
            Some(Reply::Instances(instances)) => Ok(instances.clone()),
            Some(Reply::Transport) => Err(ProbeError::transport("Connection refused")),
            Some(Reply::Auth) => Err(ProbeError::Auth),
            Some(Reply::CimError(code, description)) => Err(ProbeError::cim(*code, *description)),
        }
    }
}

pub fn text(value: &str) -> CimValue {
    CimValue::String(value.to_string())
}

/// Element reporting an OperationalStatus code.
pub fn op_element(class: &str, name: &str, code: i64) -> CimInstance {
    CimInstance::new(class)
        .with("ElementName", text(name))
        .with("OperationalStatus", CimValue::Array(vec![CimValue::Integer(code)]))
}

/// Element reporting a HealthState code.
pub fn health_element(class: &str, name: &str, code: i64) -> CimInstance {
    CimInstance::new(class)
        .with("ElementName", text(name))
        .with("HealthState", CimValue::Integer(code))
}

pub fn chassis(manufacturer: &str, model: &str, serial: &str) -> CimInstance {
    op_element("CIM_Chassis", "Chassis", 2)
        .with("Manufacturer", text(manufacturer))
        .with("Model", text(model))
        .with("SerialNumber", text(serial))
}

pub fn bios(name: &str, version: &str, release: &str) -> CimInstance {
    op_element("OMC_SMASHFirmwareIdentity", "System BIOS", 2)
        .with("Name", text(name))
        .with("VersionString", text(version))
        .with("ReleaseDate", CimValue::DateTime(release.to_string()))
}

pub fn numeric_sensor(
    name: &str,
    sensor_type: i64,
    base_units: i64,
    modifier: i64,
    reading: i64,
    code: i64,
) -> CimInstance {
    op_element("CIM_NumericSensor", name, code)
        .with("SensorType", CimValue::Integer(sensor_type))
        .with("BaseUnits", CimValue::Integer(base_units))
        .with("UnitModifier", CimValue::Integer(modifier))
        .with("CurrentReading", CimValue::Integer(reading))
}
