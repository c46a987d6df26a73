// Core check logic

pub mod cim;
pub mod config;
pub mod identity;
pub mod ignore;
pub mod perfdata;
pub mod probe;
pub mod sensor;
pub mod severity;
pub mod status;
pub mod vendor;

// Re-export commonly used items
pub use config::{OutputFormat, ProbeConfig};
pub use identity::ServerIdentity;
pub use probe::{run, Probe, ProbeReport};
pub use sensor::{SensorCategory, SensorReading, WholeFields};
pub use severity::Severity;
pub use vendor::{Vendor, VendorChoice};
