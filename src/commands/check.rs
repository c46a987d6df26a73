use anyhow::{Context, Result};
use clap::builder::PossibleValuesParser;
use clap::{Arg, ArgAction, ArgMatches, Command};

use crate::core::cim::{TlsVersion, WbemClient};
use crate::core::config::{OutputFormat, ProbeConfig};
use crate::core::ignore::IgnoreRules;
use crate::core::probe;
use crate::core::sensor::CategoryFilter;
use crate::core::vendor::VendorChoice;
use crate::platform;
use crate::ui;

/// Exit status for bad invocations, distinct from the four verdicts.
pub const CONFIG_ERROR_EXIT: i32 = 255;

pub fn cli() -> Command {
    Command::new("esxprobe")
        .about("Check the hardware health of a VMware ESXi host over CIM")
        .disable_version_flag(true)
        .arg(
            Arg::new("version")
                .long("version")
                .help("Print version information")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("host")
                .short('H')
                .long("host")
                .value_name("HOST")
                .help("Report on HOST (https:// prefix optional)")
                .required_unless_present("version"),
        )
        .arg(
            Arg::new("user")
                .short('U')
                .long("user")
                .value_name("USER")
                .help("User name, or file:<path> holding user and password")
                .required_unless_present("version"),
        )
        .arg(
            Arg::new("pass")
                .short('P')
                .long("pass")
                .value_name("PASS")
                .help("Password, or file:<path> holding the password")
                .required_unless_present("version"),
        )
        .arg(
            Arg::new("cimport")
                .short('C')
                .long("cimport")
                .value_name("PORT")
                .help("CIM port (default 5989)")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new("sslproto")
                .short('S')
                .long("sslproto")
                .value_name("VERSION")
                .help("Minimum TLS version: TLSv1, TLSv1.1, TLSv1.2 or TLSv1.3"),
        )
        .arg(
            Arg::new("vendor")
                .short('V')
                .long("vendor")
                .value_name("VENDOR")
                .help("Vendor of the server")
                .value_parser(PossibleValuesParser::new([
                    "auto", "dell", "hp", "ibm", "intel", "unknown",
                ]))
                .default_value("unknown"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Print per-element diagnostics on stderr")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("perfdata")
                .short('p')
                .long("perfdata")
                .help("Collect performance data")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("html")
                .short('I')
                .long("html")
                .value_name("XX")
                .help("Generate support links for country XX"),
        )
        .arg(
            Arg::new("timeout")
                .short('t')
                .long("timeout")
                .value_name("SECONDS")
                .help("Abort with UNKNOWN after SECONDS")
                .value_parser(clap::value_parser!(u64))
                .default_value("0"),
        )
        .arg(
            Arg::new("ignore")
                .short('i')
                .long("ignore")
                .value_name("LIST")
                .help("Comma-separated element names to ignore")
                .default_value(""),
        )
        .arg(
            Arg::new("regex")
                .short('r')
                .long("regex")
                .help("Treat ignore entries as case-insensitive patterns")
                .action(ArgAction::SetTrue),
        )
        .arg(no_flag("no-power", "Don't collect power performance data"))
        .arg(no_flag("no-volts", "Don't collect voltage performance data"))
        .arg(no_flag("no-current", "Don't collect current performance data"))
        .arg(no_flag("no-temp", "Don't collect temperature performance data"))
        .arg(no_flag("no-fan", "Don't collect fan performance data"))
        .arg(no_flag("no-lcd", "Ignore front panel LCD elements"))
        .arg(no_flag("no-intrusion", "Ignore chassis intrusion elements"))
        .arg(
            Arg::new("outputformat")
                .long("outputformat")
                .value_name("FORMAT")
                .help("Output format")
                .value_parser(PossibleValuesParser::new(["string", "json"]))
                .default_value("string"),
        )
        .arg(
            Arg::new("pretty")
                .long("pretty")
                .help("Indent JSON output")
                .action(ArgAction::SetTrue),
        )
}

fn no_flag(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).help(help).action(ArgAction::SetTrue)
}

fn string_arg(matches: &ArgMatches, id: &str) -> Option<String> {
    matches.get_one::<String>(id).cloned()
}

/// Build the run configuration from parsed arguments, resolving
/// credential files.
pub fn config_from_matches(matches: &ArgMatches) -> Result<ProbeConfig> {
    let host = string_arg(matches, "host").context("mandatory option 'host' not defined")?;
    let user = string_arg(matches, "user").context("mandatory option 'user' not defined")?;
    let pass = string_arg(matches, "pass").context("mandatory option 'pass' not defined")?;

    let mut config = ProbeConfig::new(host, user, pass);
    config.resolve_credentials()?;

    config.port = matches.get_one::<u16>("cimport").copied();
    config.ssl_proto = string_arg(matches, "sslproto")
        .map(|proto| proto.parse::<TlsVersion>())
        .transpose()?;
    config.vendor = string_arg(matches, "vendor")
        .map(|vendor| vendor.parse::<VendorChoice>())
        .transpose()?
        .unwrap_or_default();
    config.verbose = matches.get_flag("verbose");
    config.perfdata = matches.get_flag("perfdata");
    config.country = string_arg(matches, "html")
        .map(|country| country.to_lowercase())
        .filter(|country| !country.is_empty());
    config.timeout = matches.get_one::<u64>("timeout").copied().filter(|&t| t > 0);
    config.ignore = string_arg(matches, "ignore")
        .map(|list| list.split(',').map(str::to_string).collect())
        .unwrap_or_default();
    config.regex = matches.get_flag("regex");
    // Reject bad patterns before any request is sent
    IgnoreRules::new(&config.ignore, config.regex)?;
    config.categories = CategoryFilter {
        power: !matches.get_flag("no-power"),
        volts: !matches.get_flag("no-volts"),
        current: !matches.get_flag("no-current"),
        temp: !matches.get_flag("no-temp"),
        fan: !matches.get_flag("no-fan"),
    };
    config.lcd = !matches.get_flag("no-lcd");
    config.intrusion = !matches.get_flag("no-intrusion");
    config.output = string_arg(matches, "outputformat")
        .map(|format| format.parse::<OutputFormat>())
        .transpose()?
        .unwrap_or_default();
    config.pretty = matches.get_flag("pretty");

    Ok(config)
}

/// Run one check and print its verdict. Returns the process exit code;
/// errors are configuration problems found before any request was sent.
pub fn execute(matches: &ArgMatches) -> Result<i32> {
    let config = config_from_matches(matches)?;
    let endpoint = config.endpoint()?;
    log::debug!("Connection to {}", endpoint.url);
    let client = WbemClient::new(endpoint)?;

    if let Some(seconds) = config.timeout {
        platform::install_timeout(seconds);
    }
    let outcome = probe::run(&config, &client);
    platform::cancel_timeout();

    let report = match outcome {
        Ok(report) => report,
        Err(e) => {
            log::debug!("Check aborted: {:?}", e);
            println!("{}", ui::format_error_line(&e));
            return Ok(e.severity().exit_code());
        }
    };

    match ui::format_report(&report, &config) {
        Ok(line) => {
            println!("{}", line);
            Ok(report.severity.exit_code())
        }
        Err(e) => {
            println!("{}", ui::format_error_line(&e));
            Ok(e.severity().exit_code())
        }
    }
}
