use esxprobe::core::cim::CimValue;
use esxprobe::core::probe::{self, CLASSES_TO_CHECK};
use esxprobe::core::{ProbeConfig, Severity, SensorCategory, Vendor, VendorChoice};
use esxprobe::error::ProbeError;

use super::support::*;

fn config(vendor: Vendor) -> ProbeConfig {
    let mut config = ProbeConfig::new("esx01.example.com", "root", "secret");
    config.vendor = VendorChoice::Fixed(vendor);
    config
}

#[test]
fn test_healthy_dell_server() {
    let client = ScriptedClient::new()
        .instances(
            "OMC_SMASHFirmwareIdentity",
            vec![bios("Dell Inc. BIOS", "2.11.0", "20210315000000.000000+000")],
        )
        .instances("CIM_Chassis", vec![chassis("Dell Inc.", "PowerEdge R640", "ABC1234")])
        .instances("OMC_Fan", vec![op_element("OMC_Fan", "Fan 1", 2)]);

    let report = probe::run(&config(Vendor::Dell), &client).unwrap();

    assert_eq!(report.severity, Severity::Ok);
    assert!(report.message.is_empty());
    assert_eq!(report.identity.server_info, "Dell Inc. PowerEdge R640");
    assert_eq!(report.identity.serial_number, "ABC1234");
    assert_eq!(
        report.identity.bios_info.as_deref(),
        Some("Dell Inc. BIOS: 2.11.0 2021-03-15")
    );
    assert_eq!(client.calls(), CLASSES_TO_CHECK.to_vec());
}

#[test]
fn test_bad_elements_accumulate_in_encounter_order() {
    let client = ScriptedClient::new()
        .instances(
            "CIM_Memory",
            vec![
                op_element("CIM_Memory", "DIMM A1", 2),
                op_element("CIM_Memory", "DIMM A2", 5),
            ],
        )
        .instances("OMC_Fan", vec![op_element("OMC_Fan", "Fan 3", 6)])
        .instances("OMC_PowerSupply", vec![op_element("OMC_PowerSupply", "PSU 1", 2)]);

    let report = probe::run(&config(Vendor::Dell), &client).unwrap();

    assert_eq!(report.severity, Severity::Critical);
    assert_eq!(report.message, " WARNING : DIMM A2  CRITICAL : Fan 3 ");
}

#[test]
fn test_no_elements_means_unknown() {
    let client = ScriptedClient::new();
    let report = probe::run(&config(Vendor::Unknown), &client).unwrap();
    assert_eq!(report.severity, Severity::Unknown);
    assert!(!report.elements_seen);
}

#[test]
fn test_transport_error_halts_remaining_classes() {
    let mut cfg = config(Vendor::Dell);
    cfg.perfdata = true;

    let client = ScriptedClient::new()
        .instances(
            "CIM_Card",
            vec![op_element("CIM_Card", "Riser 1", 6)],
        )
        .reply("CIM_NumericSensor", Reply::Transport)
        .instances("OMC_Fan", vec![op_element("OMC_Fan", "Fan 1", 2)]);

    let err = probe::run(&cfg, &client).unwrap_err();

    assert!(matches!(err, ProbeError::Transport(_)));
    assert_eq!(err.severity().exit_code(), 3);
    assert_eq!(client.calls(), CLASSES_TO_CHECK[..5].to_vec());
}

#[test]
fn test_auth_error_is_fatal() {
    let client = ScriptedClient::new().reply("OMC_SMASHFirmwareIdentity", Reply::Auth);
    let err = probe::run(&config(Vendor::Dell), &client).unwrap_err();
    assert!(matches!(err, ProbeError::Auth));
    assert_eq!(client.calls().len(), 1);
}

#[test]
fn test_socket_cim_error_is_fatal() {
    let client = ScriptedClient::new().reply(
        "CIM_Card",
        Reply::CimError(1, "Socket error: connection reset"),
    );
    let err = probe::run(&config(Vendor::Dell), &client).unwrap_err();
    assert!(err.is_fatal());
    assert_eq!(client.calls().len(), 3);
}

#[test]
fn test_other_cim_errors_skip_the_class() {
    let client = ScriptedClient::new()
        .reply("CIM_Card", Reply::CimError(5, "Invalid class"))
        .instances("OMC_Fan", vec![op_element("OMC_Fan", "Fan 1", 2)]);

    let report = probe::run(&config(Vendor::Dell), &client).unwrap();

    assert_eq!(report.severity, Severity::Ok);
    assert_eq!(client.calls().len(), 16);
}

#[test]
fn test_hp_reads_health_state() {
    let client = ScriptedClient::new().instances(
        "OMC_PowerSupply",
        vec![
            // OperationalStatus is not consulted for HP
            health_element("OMC_PowerSupply", "Power Supply 1", 5)
                .with("OperationalStatus", CimValue::Array(vec![CimValue::Integer(6)])),
            health_element("OMC_PowerSupply", "Power Supply 2", 15),
        ],
    );

    let report = probe::run(&config(Vendor::Hp), &client).unwrap();

    assert_eq!(report.severity, Severity::Warning);
    assert_eq!(report.message, " WARNING : Power Supply 2 ");
}

#[test]
fn test_unrecognized_status_aborts() {
    let client = ScriptedClient::new()
        .instances("OMC_Fan", vec![op_element("OMC_Fan", "Fan 1", 42)])
        .instances("OMC_PowerSupply", vec![op_element("OMC_PowerSupply", "PSU 1", 2)]);

    let err = probe::run(&config(Vendor::Dell), &client).unwrap_err();

    match &err {
        ProbeError::UnrecognizedStatus { code, element, .. } => {
            assert_eq!(*code, 42);
            assert_eq!(element, "Fan 1");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.severity(), Severity::Unknown);
    assert!(!client.calls().contains(&"OMC_PowerSupply".to_string()));
}

#[test]
fn test_elements_without_status_are_skipped() {
    let client = ScriptedClient::new().instances(
        "CIM_RecordLog",
        vec![
            esxprobe::core::cim::CimInstance::new("CIM_RecordLog")
                .with("ElementName", text("IPMI SEL")),
            op_element("CIM_RecordLog", "System Event Log", 2),
        ],
    );
    let report = probe::run(&config(Vendor::Ibm), &client).unwrap();
    assert_eq!(report.severity, Severity::Ok);
}

#[test]
fn test_auto_detects_vendor_from_chassis() {
    let mut cfg = config(Vendor::Unknown);
    cfg.vendor = VendorChoice::Auto;

    let client = ScriptedClient::new()
        .instances("CIM_Chassis", vec![chassis("HP", "ProLiant DL380", "CZ1")])
        .instances("OMC_Fan", vec![health_element("OMC_Fan", "Fan 1", 25)]);

    let report = probe::run(&cfg, &client).unwrap();

    assert_eq!(report.vendor, Vendor::Hp);
    assert_eq!(report.severity, Severity::Critical);
    let calls = client.calls();
    assert_eq!(calls.len(), 17);
    assert_eq!(calls[0], "CIM_Chassis");
}

#[test]
fn test_auto_detect_falls_back_to_unknown() {
    let mut cfg = config(Vendor::Unknown);
    cfg.vendor = VendorChoice::Auto;

    let client = ScriptedClient::new().instances(
        "CIM_Chassis",
        vec![chassis("Supermicro", "X11", "SM1")],
    );
    assert_eq!(probe::run(&cfg, &client).unwrap().vendor, Vendor::Unknown);

    let empty = ScriptedClient::new().instances("CIM_Chassis", Vec::new());
    assert_eq!(probe::run(&cfg, &empty).unwrap().vendor, Vendor::Unknown);

    let broken = ScriptedClient::new().reply("CIM_Chassis", Reply::CimError(6, "Not found"));
    assert_eq!(probe::run(&cfg, &broken).unwrap().vendor, Vendor::Unknown);
}

#[test]
fn test_auto_detect_auth_failure_is_fatal() {
    let mut cfg = config(Vendor::Unknown);
    cfg.vendor = VendorChoice::Auto;

    let client = ScriptedClient::new().reply("CIM_Chassis", Reply::Auth);
    assert!(matches!(probe::run(&cfg, &client), Err(ProbeError::Auth)));
    assert_eq!(client.calls().len(), 1);
}

#[test]
fn test_regex_ignore_excludes_matching_elements() {
    let mut cfg = config(Vendor::Dell);
    cfg.ignore = vec!["fan".to_string()];
    cfg.regex = true;

    let client = ScriptedClient::new().instances(
        "OMC_Fan",
        vec![
            op_element("OMC_Fan", "System Fan 1: Failure", 6),
            op_element("OMC_Fan", "System Fan 1: Failure", 6),
            op_element("OMC_Fan", "Power Meter", 2),
        ],
    );

    let report = probe::run(&cfg, &client).unwrap();
    assert_eq!(report.severity, Severity::Ok);
    assert!(report.message.is_empty());
}

#[test]
fn test_exact_ignore_needs_whole_name() {
    let mut cfg = config(Vendor::Dell);
    cfg.ignore = vec!["Fan".to_string()];

    let client = ScriptedClient::new().instances(
        "OMC_Fan",
        vec![op_element("OMC_Fan", "System Fan 1: Failure", 6)],
    );

    let report = probe::run(&cfg, &client).unwrap();
    assert_eq!(report.severity, Severity::Critical);
}

#[test]
fn test_ignored_chassis_contributes_nothing() {
    let mut cfg = config(Vendor::Dell);
    cfg.ignore = vec!["Chassis".to_string()];

    let client = ScriptedClient::new().instances(
        "CIM_Chassis",
        vec![op_element("CIM_Chassis", "Chassis", 6)
            .with("Manufacturer", text("Dell Inc."))
            .with("SerialNumber", text("ABC1234"))],
    );

    let report = probe::run(&cfg, &client).unwrap();
    assert_eq!(report.severity, Severity::Unknown);
    assert!(report.identity.server_info.is_empty());
    assert!(report.identity.serial_number.is_empty());
}

#[test]
fn test_firmware_quirks_are_ignored_for_operational_status_vendors() {
    let client = ScriptedClient::new().instances(
        "OMC_DiscreteSensor",
        vec![
            op_element("OMC_DiscreteSensor", "System Board 1 Riser Config Err 0: Connected", 6),
            op_element("OMC_DiscreteSensor", "Drive 0", 2),
        ],
    );
    let report = probe::run(&config(Vendor::Dell), &client).unwrap();
    assert_eq!(report.severity, Severity::Ok);
}

#[test]
fn test_no_lcd_ignores_cable_elements() {
    let mut cfg = config(Vendor::Hp);
    cfg.lcd = false;

    let client = ScriptedClient::new().instances(
        "OMC_DiscreteSensor",
        vec![health_element(
            "OMC_DiscreteSensor",
            "Front Panel Board 1 FP LCD Cable 0: Config Error",
            25,
        )],
    );
    let report = probe::run(&cfg, &client).unwrap();
    assert_eq!(report.severity, Severity::Unknown);
}

#[test]
fn test_blade_serial_for_dell() {
    let client = ScriptedClient::new()
        .instances("CIM_Chassis", vec![chassis("Dell Inc.", "PowerEdge M630", "CHS0001")])
        .instances(
            "CIM_ComputerSystem",
            vec![op_element("CIM_ComputerSystem", "Server Blade", 2)
                .with("SerialNumber", text("CN7475.BLD5678.A01"))],
        );

    let report = probe::run(&config(Vendor::Dell), &client).unwrap();

    assert!(report.identity.is_blade);
    assert_eq!(report.identity.serial_number, "BLD5678");
    assert_eq!(report.identity.serial_chassis, "CHS0001");
}

#[test]
fn test_blade_serial_kept_whole_for_hp() {
    let client = ScriptedClient::new().instances(
        "CIM_ComputerSystem",
        vec![health_element("CIM_ComputerSystem", "Server Blade", 5)
            .with("SerialNumber", text("CN7475.BLD5678"))],
    );

    let report = probe::run(&config(Vendor::Hp), &client).unwrap();
    assert_eq!(report.identity.serial_number, "CN7475.BLD5678");
}

#[test]
fn test_sensor_readings_need_perfdata() {
    let sensors = vec![numeric_sensor("Ambient Temp", 2, 2, -3, 25000, 2)];

    let client = ScriptedClient::new().instances("CIM_NumericSensor", sensors.clone());
    let report = probe::run(&config(Vendor::Dell), &client).unwrap();
    assert!(report.readings.is_empty());
    assert_eq!(report.perfdata(), "");

    let mut cfg = config(Vendor::Dell);
    cfg.perfdata = true;
    let client = ScriptedClient::new().instances("CIM_NumericSensor", sensors);
    let report = probe::run(&cfg, &client).unwrap();
    assert_eq!(report.readings.len(), 1);
    assert_eq!(report.readings[0].category, SensorCategory::Temperature);
    assert_eq!(report.perfdata(), "|P4Tem_0_Ambient_Temp=25;0;0 ");
}

#[test]
fn test_suppressed_category_still_folds_status() {
    let mut cfg = config(Vendor::Dell);
    cfg.perfdata = true;
    cfg.categories.temp = false;

    let client = ScriptedClient::new().instances(
        "CIM_NumericSensor",
        vec![
            numeric_sensor("Inlet Temp", 2, 2, 0, 48, 3),
            numeric_sensor("PSU 1 Power", 4, 7, 0, 220, 2),
        ],
    );

    let report = probe::run(&cfg, &client).unwrap();

    assert_eq!(report.severity, Severity::Warning);
    assert_eq!(report.message, " WARNING : Inlet Temp: 48 ");
    assert_eq!(report.readings.len(), 1);
    assert_eq!(report.readings[0].category, SensorCategory::Power);
}
