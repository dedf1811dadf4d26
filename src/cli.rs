use clap::Parser;

/// Command line of the plugin.
///
/// `mode` and `submode` stay free-form strings on purpose: out-of-range
/// values surface as an UNKNOWN result from the dispatcher instead of a
/// usage error, so a misconfigured service definition still produces a
/// status line.
#[derive(Debug, Parser)]
#[command(
    name = "check_comsys_ups",
    version,
    about = "Monitor Comsys UPS metrics over the device's XML status export."
)]
pub struct Cli {
    /// Hostname or IP of the UPS web server.
    #[arg(short = 'H', long)]
    pub host: String,

    /// Metric group: system, load, battery or input.
    #[arg(short, long)]
    pub mode: String,

    /// Metric within the group.
    ///
    /// system:  site, time, uptime, sw_ver
    /// load:    voltage, current, power, percent
    /// battery: battery_1, battery_2, battery_3
    /// input:   acdc, solar, total
    #[arg(short, long, verbatim_doc_comment)]
    pub submode: String,

    /// Warning threshold, applied to load metrics.
    #[arg(short, long)]
    pub warning: Option<String>,

    /// Critical threshold, applied to load metrics.
    #[arg(short, long)]
    pub critical: Option<String>,
}
