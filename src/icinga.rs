//! Icinga2 `CheckCommand` configuration generated from the plugin's own
//! command line definition.

use std::env;
use std::process;

#[derive(Debug, thiserror::Error)]
pub enum IcingaConfigError {
    #[error("invalid executable path")]
    InvalidExecutablePath,
    #[error("argument without a long option cannot be exported")]
    MissingLongOption,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Prints the `CheckCommand` object for this plugin and exits 0 when the
/// `GENERATE_ICINGA_COMMAND` environment variable is set. Returns without
/// output otherwise.
pub fn print_command_config_if_requested(
    name: &str,
    cmd: &clap::Command,
) -> Result<(), IcingaConfigError> {
    if env::var_os("GENERATE_ICINGA_COMMAND").is_none() {
        return Ok(());
    }

    let exe = env::current_exe()?;
    let exe = exe
        .to_str()
        .ok_or(IcingaConfigError::InvalidExecutablePath)?;

    println!("{}", command_config(name, cmd, exe)?.trim());
    process::exit(0);
}

fn command_config(
    name: &str,
    cmd: &clap::Command,
    exe: &str,
) -> Result<String, IcingaConfigError> {
    let mut out = format!("object CheckCommand \"{name}\" {{\n");
    out.push_str(&format!("  command = [ \"{exe}\" ]\n"));
    out.push_str("  arguments = {\n");

    for arg in cmd.get_arguments() {
        let long = arg
            .get_long()
            .ok_or(IcingaConfigError::MissingLongOption)?;
        if matches!(long, "help" | "version") {
            continue;
        }

        let var = long.replace('-', "_");
        out.push_str(&format!("    \"--{long}\" = {{\n"));
        out.push_str(&format!("      value = \"${var}$\"\n"));
        if let Some(help) = arg.get_help() {
            let help = help.to_string();
            if let Some(line) = help.lines().next() {
                out.push_str(&format!("      description = \"{}\"\n", escape(line)));
            }
        }
        out.push_str("    }\n");
    }

    out.push_str("  }\n");
    out.push_str("}\n");
    Ok(out)
}

fn escape(s: &str) -> String {
    s.replace('"', "\\\"").replace('$', "\\$")
}
