//! CIM-XML encoding of `EnumerateInstances` (DSP0201/DSP0200).

use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::{CimInstance, CimValue, NAMESPACE};
use crate::error::{ProbeError, Result};

/// Build the request body for one `EnumerateInstances` call.
pub fn enumerate_instances_request(message_id: u32, class_name: &str) -> String {
    let namespace: String = NAMESPACE
        .split('/')
        .map(|part| format!("<NAMESPACE NAME=\"{}\"/>", escape(part)))
        .collect();

    format!(
        concat!(
            "<?xml version=\"1.0\" encoding=\"utf-8\" ?>\n",
            "<CIM CIMVERSION=\"2.0\" DTDVERSION=\"2.0\">",
            "<MESSAGE ID=\"{id}\" PROTOCOLVERSION=\"1.0\">",
            "<SIMPLEREQ>",
            "<IMETHODCALL NAME=\"EnumerateInstances\">",
            "<LOCALNAMESPACEPATH>{ns}</LOCALNAMESPACEPATH>",
            "<IPARAMVALUE NAME=\"ClassName\"><CLASSNAME NAME=\"{class}\"/></IPARAMVALUE>",
            "<IPARAMVALUE NAME=\"LocalOnly\"><VALUE>FALSE</VALUE></IPARAMVALUE>",
            "<IPARAMVALUE NAME=\"IncludeQualifiers\"><VALUE>FALSE</VALUE></IPARAMVALUE>",
            "</IMETHODCALL>",
            "</SIMPLEREQ>",
            "</MESSAGE>",
            "</CIM>"
        ),
        id = message_id,
        ns = namespace,
        class = escape(class_name),
    )
}

/// Property being assembled while its `VALUE` children stream by.
struct PendingProperty {
    name: String,
    cim_type: String,
    is_array: bool,
    scalar: Option<String>,
    items: Vec<Option<String>>,
}

impl PendingProperty {
    fn into_value(self) -> CimValue {
        if self.is_array {
            if self.items.is_empty() && self.scalar.is_none() {
                // PROPERTY.ARRAY without VALUE.ARRAY is a null array
                return CimValue::Null;
            }
            let values = self
                .items
                .iter()
                .map(|item| match item {
                    Some(raw) => typed_value(&self.cim_type, raw),
                    None => CimValue::Null,
                })
                .collect();
            return CimValue::Array(values);
        }

        match &self.scalar {
            Some(raw) => typed_value(&self.cim_type, raw),
            None => CimValue::Null,
        }
    }
}

fn typed_value(cim_type: &str, raw: &str) -> CimValue {
    let trimmed = raw.trim();
    match cim_type {
        "boolean" => CimValue::Boolean(trimmed.eq_ignore_ascii_case("true")),
        "uint8" | "uint16" | "uint32" | "uint64" | "sint8" | "sint16" | "sint32" | "sint64" => {
            match trimmed.parse::<i64>() {
                Ok(v) => CimValue::Integer(v),
                // uint64 beyond i64::MAX
                Err(_) => trimmed
                    .parse::<f64>()
                    .map(CimValue::Real)
                    .unwrap_or_else(|_| CimValue::String(raw.to_string())),
            }
        }
        "real32" | "real64" => trimmed
            .parse::<f64>()
            .map(CimValue::Real)
            .unwrap_or_else(|_| CimValue::String(raw.to_string())),
        "datetime" => CimValue::DateTime(trimmed.to_string()),
        _ => CimValue::String(raw.to_string()),
    }
}

fn attribute(element: &BytesStart, key: &[u8]) -> Result<Option<String>> {
    for attr in element.attributes() {
        let attr = attr.map_err(|e| ProbeError::xml(e.to_string()))?;
        if attr.key.as_ref() == key {
            let value = attr
                .unescape_value()
                .map_err(|e| ProbeError::xml(e.to_string()))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn cim_error(element: &BytesStart) -> Result<ProbeError> {
    let code = attribute(element, b"CODE")?
        .and_then(|c| c.trim().parse::<u32>().ok())
        .unwrap_or(0);
    let description = attribute(element, b"DESCRIPTION")?.unwrap_or_default();
    Ok(ProbeError::cim(code, description))
}

/// Parse an `EnumerateInstances` response into instances.
///
/// A CIM `ERROR` in the response is returned as the matching
/// [`ProbeError`]; a body without a method response is an XML error.
pub fn parse_enumerate_response(body: &str) -> Result<Vec<CimInstance>> {
    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);

    let mut instances = Vec::new();
    let mut current: Option<CimInstance> = None;
    let mut property: Option<PendingProperty> = None;
    let mut value_text: Option<String> = None;
    let mut qualifier_depth = 0usize;
    let mut saw_response = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| ProbeError::xml(format!("at byte {}: {}", reader.buffer_position(), e)))?;

        match event {
            Event::Start(e) => match e.name().as_ref() {
                b"IMETHODRESPONSE" => saw_response = true,
                b"ERROR" => return Err(cim_error(&e)?),
                b"QUALIFIER" => qualifier_depth += 1,
                b"INSTANCE" if current.is_none() => {
                    let class_name = attribute(&e, b"CLASSNAME")?.unwrap_or_default();
                    current = Some(CimInstance::new(class_name));
                }
                name @ (b"PROPERTY" | b"PROPERTY.ARRAY") if current.is_some() => {
                    let prop_name = attribute(&e, b"NAME")?
                        .ok_or_else(|| ProbeError::xml("PROPERTY without NAME"))?;
                    property = Some(PendingProperty {
                        name: prop_name,
                        cim_type: attribute(&e, b"TYPE")?.unwrap_or_else(|| "string".into()),
                        is_array: name == b"PROPERTY.ARRAY",
                        scalar: None,
                        items: Vec::new(),
                    });
                }
                b"VALUE" if property.is_some() && qualifier_depth == 0 => {
                    value_text = Some(String::new());
                }
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"IMETHODRESPONSE" => saw_response = true,
                b"ERROR" => return Err(cim_error(&e)?),
                b"INSTANCE" if current.is_none() => {
                    let class_name = attribute(&e, b"CLASSNAME")?.unwrap_or_default();
                    instances.push(CimInstance::new(class_name));
                }
                b"PROPERTY" | b"PROPERTY.ARRAY" => {
                    if let (Some(instance), Some(name)) =
                        (current.as_mut(), attribute(&e, b"NAME")?)
                    {
                        instance.set(&name, CimValue::Null);
                    }
                }
                b"VALUE" if qualifier_depth == 0 => {
                    if let Some(prop) = property.as_mut() {
                        push_value(prop, String::new());
                    }
                }
                b"VALUE.NULL" if qualifier_depth == 0 => {
                    if let Some(prop) = property.as_mut() {
                        prop.items.push(None);
                    }
                }
                _ => {}
            },
            Event::Text(t) => {
                if let Some(text) = value_text.as_mut() {
                    let unescaped = t.unescape().map_err(|e| ProbeError::xml(e.to_string()))?;
                    text.push_str(&unescaped);
                }
            }
            Event::CData(c) => {
                if let Some(text) = value_text.as_mut() {
                    text.push_str(&String::from_utf8_lossy(&c));
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"QUALIFIER" => qualifier_depth = qualifier_depth.saturating_sub(1),
                b"VALUE" => {
                    if let (Some(prop), Some(text)) = (property.as_mut(), value_text.take()) {
                        push_value(prop, text);
                    }
                }
                b"PROPERTY" | b"PROPERTY.ARRAY" => {
                    if let (Some(instance), Some(prop)) = (current.as_mut(), property.take()) {
                        let name = prop.name.clone();
                        instance.set(&name, prop.into_value());
                    }
                }
                b"INSTANCE" => {
                    if let Some(instance) = current.take() {
                        instances.push(instance);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_response {
        return Err(ProbeError::xml("no IMETHODRESPONSE in CIM-XML reply"));
    }

    Ok(instances)
}

fn push_value(prop: &mut PendingProperty, text: String) {
    if prop.is_array {
        prop.items.push(Some(text));
    } else {
        prop.scalar = Some(text);
    }
}
