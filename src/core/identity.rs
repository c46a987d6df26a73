//! Server identity harvested from the BIOS, chassis and blade elements.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::cim::CimInstance;
use crate::core::vendor::Vendor;

pub const BIOS_ELEMENT: &str = "System BIOS";
pub const CHASSIS_ELEMENT: &str = "Chassis";
pub const BLADE_ELEMENT: &str = "Server Blade";

const UNKNOWN_MANUFACTURER: &str = "Unknown Manufacturer";

const DELL_SUPPORT_SITE: &str = "http://www.dell.com/support/home/";
const DELL_SERVICE_TAG_SUFFIX: &str = "19/product-support/servicetag/";
const DELL_PRODUCT_SUFFIX: &str = "04/product-support/product/poweredge-";

static POWEREDGE_MODEL: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^(.*)PowerEdge (.*) (.*)").ok());

/// Everything the final line says about the machine itself.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServerIdentity {
    /// `"<manufacturer> <model>"`, empty until the chassis is seen.
    pub server_info: String,
    pub bios_info: Option<String>,
    pub serial_number: String,
    pub serial_chassis: String,
    pub is_blade: bool,
}

/// Date part of a CIM datetime (`yyyymmddHHMMSS.mmmmmm+UUU`) as `YYYY-MM-DD`.
pub fn cim_date(datetime: &str) -> Option<String> {
    let digits = datetime.get(..8)?;
    NaiveDate::parse_from_str(digits, "%Y%m%d")
        .ok()
        .map(|date| date.format("%Y-%m-%d").to_string())
}

impl ServerIdentity {
    /// Record `"<Name>: <VersionString> <date>"` from the BIOS element.
    pub fn capture_bios(&mut self, instance: &CimInstance) {
        let name = instance.string("Name").unwrap_or_default();
        let version = instance.string("VersionString").unwrap_or_default();
        log::debug!("    VersionString = {}", version);

        let mut bios = format!("{}: {}", name, version);
        match instance.string("ReleaseDate").and_then(cim_date) {
            Some(date) => {
                bios.push(' ');
                bios.push_str(&date);
            }
            None => log::debug!("    ReleaseDate missing or unreadable"),
        }
        self.bios_info = Some(bios);
    }

    /// Record manufacturer, model and serial from the chassis element.
    /// Intel chassis report a meaningless model, so it is left out.
    pub fn capture_chassis(&mut self, instance: &CimInstance, vendor: Vendor) {
        let manufacturer = instance.string("Manufacturer").unwrap_or(UNKNOWN_MANUFACTURER);
        log::debug!("    Manufacturer = {}", manufacturer);

        let serial = instance.string("SerialNumber").unwrap_or_default();
        if !serial.is_empty() {
            log::debug!("    SerialNumber = {}", serial);
        }
        self.serial_number = serial.to_string();
        self.serial_chassis = serial.to_string();

        self.server_info = format!("{} ", manufacturer);
        if vendor != Vendor::Intel {
            if let Some(model) = instance.string("Model").filter(|m| !m.is_empty()) {
                log::debug!("    Model = {}", model);
                self.server_info.push_str(model);
            }
        }
    }

    /// A blade reports its own serial; the chassis serial is kept aside.
    pub fn capture_blade(&mut self, instance: &CimInstance) {
        if let Some(serial) = instance.string("SerialNumber").filter(|s| !s.is_empty()) {
            log::debug!("    SerialNumber = {}", serial);
            self.serial_number = serial.to_string();
            self.is_blade = true;
        }
    }

    /// Blade serials of the form `<prefix>.<tag>[.<rest>]` keep only `<tag>`.
    pub fn trim_blade_serial(&mut self) {
        if self.serial_number.contains('.') {
            if let Some(tag) = self.serial_number.split('.').nth(1) {
                self.serial_number = tag.to_string();
            }
        }
    }

    /// Serial as printed: optionally linked to the vendor support page and
    /// followed by the chassis serial on blades.
    pub fn display_serial(&self, vendor: Vendor, country: Option<&str>) -> String {
        let mut serial = match country {
            Some(country) => urlised_serial(vendor, country, &self.serial_number),
            None => self.serial_number.clone(),
        };
        if self.is_blade {
            serial.push_str(&format!(" Chassis S/N: {} ", self.serial_chassis));
        }
        serial
    }

    pub fn display_server_info(&self, vendor: Vendor, country: Option<&str>) -> String {
        match country {
            Some(country) => urlised_server_info(vendor, country, &self.server_info),
            None => self.server_info.clone(),
        }
    }
}

/// Dell support site locale path for a two-letter country code.
pub fn dell_locale(country: &str) -> &'static str {
    match country {
        "at" => "at/de/",
        "be" => "be/nl/",
        "cz" => "cz/cs/",
        "de" => "de/de/",
        "dk" => "dk/da/",
        "es" => "es/es/",
        "fi" => "fi/fi/",
        "fr" => "fr/fr/",
        "gr" => "gr/en/",
        "it" => "it/it/",
        "il" => "il/en/",
        "me" => "me/en/",
        "no" => "no/no/",
        "nl" => "nl/nl/",
        "pl" => "pl/pl/",
        "pt" => "pt/en/",
        "ru" => "ru/ru/",
        "se" => "se/sv/",
        "uk" => "uk/en/",
        "za" => "za/en/",
        "br" => "br/pt/",
        "ca" => "ca/en/",
        "mx" => "mx/es/",
        "us" => "us/en/",
        "au" => "au/en/",
        "cn" => "cn/zh/",
        "in" => "in/en/",
        _ => "en/us/",
    }
}

fn urlised_serial(vendor: Vendor, country: &str, serial: &str) -> String {
    if vendor != Vendor::Dell {
        return serial.to_string();
    }
    format!(
        "<a href=\"{}{}{}{}\">{}</a>",
        DELL_SUPPORT_SITE,
        dell_locale(country),
        DELL_SERVICE_TAG_SUFFIX,
        serial,
        serial
    )
}

fn urlised_server_info(vendor: Vendor, country: &str, server_info: &str) -> String {
    if vendor != Vendor::Dell {
        return server_info.to_string();
    }
    let Some(captures) = POWEREDGE_MODEL.as_ref().and_then(|re| re.captures(server_info)) else {
        return server_info.to_string();
    };

    let model = &captures[2];
    let slug = if model == "R210 II" {
        "r210-2".to_string()
    } else {
        model.to_lowercase()
    };

    format!(
        "{}<a href=\"{}{}{}{}/\">PowerEdge {}</a> {}",
        &captures[1],
        DELL_SUPPORT_SITE,
        dell_locale(country),
        DELL_PRODUCT_SUFFIX,
        slug,
        model,
        &captures[3]
    )
}
