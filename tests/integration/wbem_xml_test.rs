use esxprobe::core::cim::xml::parse_enumerate_response;
use esxprobe::core::probe;
use esxprobe::core::{ProbeConfig, Severity, Vendor, VendorChoice};
use esxprobe::error::ProbeError;

use super::support::ScriptedClient;

const SENSOR_RESPONSE: &str = r#"<?xml version="1.0" encoding="utf-8" ?>
<CIM CIMVERSION="2.0" DTDVERSION="2.0">
  <MESSAGE ID="1005" PROTOCOLVERSION="1.0">
    <SIMPLERSP>
      <IMETHODRESPONSE NAME="EnumerateInstances">
        <IRETURNVALUE>
          <VALUE.NAMEDINSTANCE>
            <INSTANCENAME CLASSNAME="OMC_NumericSensor">
              <KEYBINDING NAME="DeviceID"><KEYVALUE VALUETYPE="string">0.0.32.0</KEYVALUE></KEYBINDING>
            </INSTANCENAME>
            <INSTANCE CLASSNAME="OMC_NumericSensor">
              <QUALIFIER NAME="Description" TYPE="string"><VALUE>Ignored text</VALUE></QUALIFIER>
              <PROPERTY NAME="ElementName" TYPE="string"><VALUE>System Board 1 Inlet Temp</VALUE></PROPERTY>
              <PROPERTY NAME="SensorType" TYPE="uint16"><VALUE>2</VALUE></PROPERTY>
              <PROPERTY NAME="BaseUnits" TYPE="uint16"><VALUE>2</VALUE></PROPERTY>
              <PROPERTY NAME="UnitModifier" TYPE="sint32"><VALUE>-2</VALUE></PROPERTY>
              <PROPERTY NAME="CurrentReading" TYPE="sint32"><VALUE>2300</VALUE></PROPERTY>
              <PROPERTY NAME="UpperThresholdNonCritical" TYPE="sint32"><VALUE>4200</VALUE></PROPERTY>
              <PROPERTY NAME="UpperThresholdCritical" TYPE="sint32"><VALUE>4700</VALUE></PROPERTY>
              <PROPERTY NAME="LowerThresholdCritical" TYPE="sint32"></PROPERTY>
              <PROPERTY.ARRAY NAME="OperationalStatus" TYPE="uint16">
                <VALUE.ARRAY><VALUE>2</VALUE></VALUE.ARRAY>
              </PROPERTY.ARRAY>
            </INSTANCE>
          </VALUE.NAMEDINSTANCE>
          <VALUE.NAMEDINSTANCE>
            <INSTANCENAME CLASSNAME="OMC_NumericSensor"/>
            <INSTANCE CLASSNAME="OMC_NumericSensor">
              <PROPERTY NAME="ElementName" TYPE="string"><VALUE>Power Supply 1 Current 1</VALUE></PROPERTY>
              <PROPERTY NAME="SensorType" TYPE="uint16"><VALUE>4</VALUE></PROPERTY>
              <PROPERTY NAME="BaseUnits" TYPE="uint16"><VALUE>6</VALUE></PROPERTY>
              <PROPERTY NAME="UnitModifier" TYPE="sint32"><VALUE>-1</VALUE></PROPERTY>
              <PROPERTY NAME="CurrentReading" TYPE="sint32"><VALUE>6</VALUE></PROPERTY>
              <PROPERTY.ARRAY NAME="OperationalStatus" TYPE="uint16">
                <VALUE.ARRAY><VALUE>5</VALUE><VALUE>2</VALUE></VALUE.ARRAY>
              </PROPERTY.ARRAY>
            </INSTANCE>
          </VALUE.NAMEDINSTANCE>
        </IRETURNVALUE>
      </IMETHODRESPONSE>
    </SIMPLERSP>
  </MESSAGE>
</CIM>"#;

#[test]
fn test_decoded_sensors_drive_a_run() {
    let instances = parse_enumerate_response(SENSOR_RESPONSE).unwrap();
    assert_eq!(instances.len(), 2);
    assert_eq!(instances[0].element_name(), "System Board 1 Inlet Temp");
    assert_eq!(instances[0].integer("UnitModifier"), Some(-2));
    assert_eq!(instances[0].get("LowerThresholdCritical"), None);
    assert_eq!(instances[1].first_integer("OperationalStatus"), Some(5));

    let mut config = ProbeConfig::new("esx01", "root", "secret");
    config.vendor = VendorChoice::Fixed(Vendor::Dell);
    config.perfdata = true;

    let client = ScriptedClient::new().instances("CIM_NumericSensor", instances);
    let report = probe::run(&config, &client).unwrap();

    assert_eq!(report.severity, Severity::Warning);
    assert_eq!(report.message, " WARNING : Power Supply 1 Current 1: 0.6 ");
    assert_eq!(
        report.perfdata(),
        "|P3Cur_0_Power_Supply_1_Current_1=0.6;0;0 P4Tem_0_System_Board_1_Inlet_Temp=23;42;47 "
    );
}

#[test]
fn test_thread_pool_error_is_fatal() {
    let body = r#"<?xml version="1.0" encoding="utf-8" ?>
<CIM CIMVERSION="2.0" DTDVERSION="2.0">
  <MESSAGE ID="1001" PROTOCOLVERSION="1.0">
    <SIMPLERSP>
      <IMETHODRESPONSE NAME="EnumerateInstances">
        <ERROR CODE="1" DESCRIPTION="ThreadPool --- Failed to enqueue request. Too many queued requests already"/>
      </IMETHODRESPONSE>
    </SIMPLERSP>
  </MESSAGE>
</CIM>"#;

    let err = parse_enumerate_response(body).unwrap_err();
    assert!(matches!(err, ProbeError::Transport(_)));
}

#[test]
fn test_invalid_class_error_is_not_fatal() {
    let body = r#"<CIM><MESSAGE><SIMPLERSP><IMETHODRESPONSE NAME="EnumerateInstances">
        <ERROR CODE="5" DESCRIPTION="CIM_ERR_INVALID_CLASS"/>
    </IMETHODRESPONSE></SIMPLERSP></MESSAGE></CIM>"#;

    let err = parse_enumerate_response(body).unwrap_err();
    assert!(!err.is_fatal());
    assert!(matches!(err, ProbeError::Protocol { code: 5, .. }));
}
