use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use check_comsys_ups::checks;
use check_comsys_ups::cli::Cli;
use check_comsys_ups::icinga;
use check_comsys_ups::{Runner, ServiceState};

fn main() {
    // Diagnostics go to stderr; stdout is reserved for the status line.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = icinga::print_command_config_if_requested("check_comsys_ups", &Cli::command())
    {
        eprintln!("could not generate the Icinga command configuration: {err}");
        std::process::exit(ServiceState::Unknown.exit_code());
    }

    let cli = Cli::parse();
    Runner::new().safe_run(|| checks::run(&cli)).print_and_exit()
}
