//! CIM object model and the client seam used by the probe.

mod wbem;
pub mod xml;

use std::collections::HashMap;

use crate::error::Result;

pub use wbem::{TlsVersion, WbemClient, WbemEndpoint};

/// Namespace every hardware class is enumerated in.
pub const NAMESPACE: &str = "root/cimv2";

/// A single property value from a CIM instance.
#[derive(Debug, Clone, PartialEq)]
pub enum CimValue {
    /// Property present but without a value.
    Null,
    Integer(i64),
    Real(f64),
    Boolean(bool),
    String(String),
    /// CIM datetime literal, e.g. `20210315000000.000000+000`.
    DateTime(String),
    Array(Vec<CimValue>),
}

impl CimValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CimValue::String(s) | CimValue::DateTime(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CimValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CimValue::Integer(v) => Some(*v as f64),
            CimValue::Real(v) => Some(*v),
            _ => None,
        }
    }
}

/// One instance returned by `EnumerateInstances`.
///
/// Property names are case-insensitive in CIM, so lookups are too.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CimInstance {
    class_name: String,
    properties: HashMap<String, CimValue>,
}

impl CimInstance {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            properties: HashMap::new(),
        }
    }

    /// Builder-style property setter.
    pub fn with(mut self, name: &str, value: CimValue) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: &str, value: CimValue) {
        self.properties.insert(name.to_lowercase(), value);
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Raw property, `None` when absent or null.
    pub fn get(&self, name: &str) -> Option<&CimValue> {
        match self.properties.get(&name.to_lowercase()) {
            None | Some(CimValue::Null) => None,
            Some(value) => Some(value),
        }
    }

    pub fn string(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(CimValue::as_str)
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(CimValue::as_i64)
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(CimValue::as_f64)
    }

    /// First element of an integer array property. A scalar is accepted
    /// as a one-element array.
    pub fn first_integer(&self, name: &str) -> Option<i64> {
        match self.get(name)? {
            CimValue::Array(values) => values.first().and_then(CimValue::as_i64),
            other => other.as_i64(),
        }
    }

    /// `ElementName`, or the literal "Unknown" when the server sent none.
    pub fn element_name(&self) -> &str {
        self.string("ElementName").unwrap_or("Unknown")
    }
}

/// Synchronous access to a CIM object manager.
pub trait CimClient {
    /// Enumerate all instances of `class_name` in [`NAMESPACE`].
    fn enumerate_instances(&self, class_name: &str) -> Result<Vec<CimInstance>>;
}

impl<C: CimClient + ?Sized> CimClient for &C {
    fn enumerate_instances(&self, class_name: &str) -> Result<Vec<CimInstance>> {
        (**self).enumerate_instances(class_name)
    }
}
