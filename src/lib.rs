//! Check plugin for Comsys UPS devices.
//!
//! The device publishes its telemetry as an XML document served from
//! `http://<host>/openxml.cgi`. Each invocation fetches that document,
//! extracts the metric (or metric group) selected by `--mode`/`--submode`,
//! optionally applies warning/critical thresholds and prints a single
//! status line with performance data:
//!
//! ```text
//! OK: Load voltage is: 230.2V | voltage=230.2V
//! ```
//!
//! The exit code follows the usual plugin convention: 0 = OK, 1 = WARNING,
//! 2 = CRITICAL, 3 = UNKNOWN. Every failure along the way, from an
//! unreachable device to a half-written document, is reported as UNKNOWN
//! instead of aborting without a status line.

use std::fmt;
use std::process;

pub mod checks;
pub mod cli;
pub mod document;
pub mod fetch;
pub mod icinga;

mod runner;
pub use crate::runner::{Runner, RunnerResult};

/// A service state as the monitoring scheduler understands it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ServiceState {
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl ServiceState {
    /// Returns the exit code which signals this state to the scheduler.
    pub fn exit_code(self) -> i32 {
        match self {
            ServiceState::Ok => 0,
            ServiceState::Warning => 1,
            ServiceState::Critical => 2,
            ServiceState::Unknown => 3,
        }
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ServiceState::Ok => "OK",
            ServiceState::Warning => "WARNING",
            ServiceState::Critical => "CRITICAL",
            ServiceState::Unknown => "UNKNOWN",
        })
    }
}

/// Physical unit of a reading. The unit is appended to the value for the
/// status line and the perfdata segment; values themselves stay strings and
/// are never parsed back into numbers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Unit {
    None,
    Volts,
    Amperes,
    Kilowatts,
    KilowattHours,
    Celsius,
    Percent,
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Unit::None => "",
            Unit::Volts => "V",
            Unit::Amperes => "A",
            Unit::Kilowatts => "kW",
            Unit::KilowattHours => "kWh",
            Unit::Celsius => "C",
            Unit::Percent => "%",
        })
    }
}

/// A single extracted reading: a cleaned value string plus its unit.
#[derive(Clone, Debug)]
pub struct Metric {
    name: String,
    value: String,
    unit: Unit,
}

impl Metric {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Metric {
            name: name.into(),
            value: value.into(),
            unit: Unit::None,
        }
    }

    pub fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = unit;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The value with its display unit appended, e.g. `230.2V`.
    pub fn display_value(&self) -> String {
        format!("{}{}", self.value, self.unit)
    }

    fn perf_string(&self) -> String {
        format!("{}={}", self.name, self.display_value())
    }
}

/// Warning/critical bounds as given on the command line.
///
/// Bounds are compared against the cleaned value using plain string
/// ordering, not numeric ordering. The two diverge once digit counts
/// differ: `"100"` sorts below `"20"`.
#[derive(Clone, Debug, Default)]
pub struct Thresholds {
    warning: Option<String>,
    critical: Option<String>,
}

impl Thresholds {
    pub fn new(warning: Option<String>, critical: Option<String>) -> Self {
        Thresholds { warning, critical }
    }

    /// Derives the service state for a cleaned metric value. The critical
    /// bound wins over the warning bound; without any bound the state is
    /// always [`ServiceState::Ok`].
    pub fn evaluate(&self, value: &str) -> ServiceState {
        if let Some(critical) = self.critical.as_deref() {
            if value >= critical {
                return ServiceState::Critical;
            }
        }
        if let Some(warning) = self.warning.as_deref() {
            if value >= warning {
                return ServiceState::Warning;
            }
        }
        ServiceState::Ok
    }
}

/// The terminal result of a check: a state, a human readable description
/// and the perfdata metrics backing it.
#[derive(Debug)]
pub struct Resource {
    state: ServiceState,
    description: String,
    metrics: Vec<Metric>,
}

impl Resource {
    /// Creates a resource in the [`ServiceState::Ok`] state.
    pub fn new(description: impl Into<String>) -> Self {
        Resource {
            state: ServiceState::Ok,
            description: description.into(),
            metrics: Vec::new(),
        }
    }

    pub fn with_state(mut self, state: ServiceState) -> Self {
        self.state = state;
        self
    }

    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metrics.push(metric);
        self
    }

    pub fn state(&self) -> ServiceState {
        self.state
    }

    /// Renders the one-line plugin output, e.g.
    /// `OK: Load voltage is: 230.2V | voltage=230.2V`.
    pub fn to_status_line(&self) -> String {
        let mut line = format!("{}: {}", self.state, self.description);

        if !self.metrics.is_empty() {
            line.push_str(" |");
            for metric in &self.metrics {
                line.push(' ');
                line.push_str(&metric.perf_string());
            }
        }

        line
    }

    /// Prints the status line and terminates with the state's exit code.
    pub fn print_and_exit(&self) -> ! {
        println!("{}", self.to_status_line());
        process::exit(self.state.exit_code())
    }
}
