use clap::error::ErrorKind;

use esxprobe::commands;
use esxprobe::commands::check::CONFIG_ERROR_EXIT;

fn main() {
    let matches = match commands::check::cli().try_get_matches() {
        Ok(matches) => matches,
        Err(e) => {
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => CONFIG_ERROR_EXIT,
            };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    esxprobe::init_logging(matches.get_flag("verbose"));

    if matches.get_flag("version") {
        commands::version();
        return;
    }

    match commands::check(&matches) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}\n", e);
            let _ = commands::check::cli().print_help();
            std::process::exit(CONFIG_ERROR_EXIT);
        }
    }
}
