//! Mode/submode dispatch: maps a request onto the decoded status document
//! and builds the resulting [`Resource`].

use tracing::debug;

use crate::cli::Cli;
use crate::document::{DocumentError, StatusDocument};
use crate::fetch::{self, FetchError};
use crate::{Metric, Resource, Thresholds, Unit};

#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error("Invalid mode \"{0}\"")]
    UnknownMode(String),
    #[error("Invalid sub mode \"{submode}\" for mode {mode}")]
    UnknownSubmode {
        mode: &'static str,
        submode: String,
    },
}

impl CheckError {
    fn unknown_submode(mode: &'static str, submode: &str) -> Self {
        CheckError::UnknownSubmode {
            mode,
            submode: submode.to_owned(),
        }
    }
}

/// Fetches the device's status document and evaluates the requested check.
pub fn run(cli: &Cli) -> Result<Resource, CheckError> {
    debug!(mode = %cli.mode, submode = %cli.submode, "running check");

    let body = fetch::retrieve(&cli.host)?;
    let document = StatusDocument::parse(&body)?;
    let thresholds = Thresholds::new(cli.warning.clone(), cli.critical.clone());

    evaluate(&cli.mode, &cli.submode, &thresholds, &document)
}

/// Maps mode and submode onto the document. Thresholds apply to load
/// metrics only; every other mode reports OK whenever its readings are
/// present.
pub fn evaluate(
    mode: &str,
    submode: &str,
    thresholds: &Thresholds,
    document: &StatusDocument,
) -> Result<Resource, CheckError> {
    match mode {
        "system" => system_status(submode, document),
        "load" => load_status(submode, thresholds, document),
        "battery" => battery_status(submode, document),
        "input" => input_status(submode, document),
        other => Err(CheckError::UnknownMode(other.to_owned())),
    }
}

fn system_status(submode: &str, document: &StatusDocument) -> Result<Resource, CheckError> {
    let (label, key, value) = match submode {
        "site" => ("System site is", "site", document.system()?.site),
        "time" => ("System time is", "time", document.system()?.time),
        "uptime" => ("System uptime is", "uptime", document.system()?.uptime),
        "sw_ver" => (
            "System software version is",
            "sw_ver",
            document.system()?.sw_ver,
        ),
        other => return Err(CheckError::unknown_submode("system", other)),
    };

    let metric = Metric::new(key, value);
    Ok(Resource::new(format!("{label}: {}", metric.display_value())).with_metric(metric))
}

fn load_status(
    submode: &str,
    thresholds: &Thresholds,
    document: &StatusDocument,
) -> Result<Resource, CheckError> {
    let (label, value, unit) = match submode {
        "voltage" => ("Load voltage is", document.load()?.voltage, Unit::Volts),
        "current" => ("Load current is", document.load()?.current, Unit::Amperes),
        "power" => ("Load power is", document.load()?.power, Unit::Kilowatts),
        "percent" => ("Load percent is", document.load()?.percent, Unit::Percent),
        other => return Err(CheckError::unknown_submode("load", other)),
    };

    let state = thresholds.evaluate(&value);
    let metric = Metric::new(submode, value).with_unit(unit);
    Ok(
        Resource::new(format!("{label}: {}", metric.display_value()))
            .with_state(state)
            .with_metric(metric),
    )
}

fn battery_status(submode: &str, document: &StatusDocument) -> Result<Resource, CheckError> {
    let bank = match submode {
        "battery_1" => 0,
        "battery_2" => 1,
        "battery_3" => 2,
        other => return Err(CheckError::unknown_submode("battery", other)),
    };
    let readings = document.battery(bank)?;

    let top = Metric::new("top", readings.top).with_unit(Unit::Volts);
    let mid = Metric::new("mid", readings.mid).with_unit(Unit::Volts);
    let symm = Metric::new("symm", readings.symm);
    let temp = readings
        .temp
        .map(|temp| Metric::new("temp", temp).with_unit(Unit::Celsius));

    let mut description = format!(
        "Battery {} is: Top: {} Mid: {} Symm: {}",
        bank + 1,
        top.display_value(),
        mid.display_value(),
        symm.display_value()
    );
    if let Some(ref temp) = temp {
        description.push_str(&format!(" Temp: {}", temp.display_value()));
    }

    let mut resource = Resource::new(description)
        .with_metric(top)
        .with_metric(mid)
        .with_metric(symm);
    if let Some(temp) = temp {
        resource = resource.with_metric(temp);
    }
    Ok(resource)
}

fn input_status(submode: &str, document: &StatusDocument) -> Result<Resource, CheckError> {
    let (feed, label) = match submode {
        "acdc" => (0, "Input AC/DC is"),
        "solar" => (1, "Input solar is"),
        "total" => (2, "Input total is"),
        other => return Err(CheckError::unknown_submode("input", other)),
    };
    let readings = document.input(feed)?;

    let voltage = readings
        .voltage
        .map(|voltage| Metric::new("voltage", voltage).with_unit(Unit::Volts));
    let current = Metric::new("current", readings.current).with_unit(Unit::Amperes);
    let power = Metric::new("power", readings.power).with_unit(Unit::Kilowatts);
    let energy = Metric::new("energy", readings.energy).with_unit(Unit::KilowattHours);

    let mut description = format!("{label}:");
    if let Some(ref voltage) = voltage {
        description.push_str(&format!(" Voltage: {}", voltage.display_value()));
    }
    description.push_str(&format!(
        " Current: {} Power: {} Energy: {}",
        current.display_value(),
        power.display_value(),
        energy.display_value()
    ));

    let mut resource = Resource::new(description);
    if let Some(voltage) = voltage {
        resource = resource.with_metric(voltage);
    }
    Ok(resource
        .with_metric(current)
        .with_metric(power)
        .with_metric(energy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ServiceState;

    const SAMPLE: &str = include_str!("../tests/fixtures/comsys.xml");

    fn sample() -> StatusDocument<'static> {
        StatusDocument::parse(SAMPLE).unwrap()
    }

    #[test]
    fn test_dispatch_table() {
        let expected = [
            (
                "system",
                "site",
                "OK: System site is: STHLM-SOUTH | site=STHLM-SOUTH",
            ),
            (
                "system",
                "time",
                "OK: System time is: 2021-05-05 12:00:00 | time=2021-05-05 12:00:00",
            ),
            (
                "system",
                "uptime",
                "OK: System uptime is: 126 days | uptime=126 days",
            ),
            (
                "system",
                "sw_ver",
                "OK: System software version is: 4.1.2 | sw_ver=4.1.2",
            ),
            ("load", "voltage", "OK: Load voltage is: 230.2V | voltage=230.2V"),
            ("load", "current", "OK: Load current is: 10.4A | current=10.4A"),
            ("load", "power", "OK: Load power is: 2.4kW | power=2.4kW"),
            ("load", "percent", "OK: Load percent is: 42% | percent=42%"),
            (
                "battery",
                "battery_1",
                "OK: Battery 1 is: Top: 231.5V Mid: 115.2V Symm: 0.4 Temp: 21.5C \
                 | top=231.5V mid=115.2V symm=0.4 temp=21.5C",
            ),
            (
                "battery",
                "battery_2",
                "OK: Battery 2 is: Top: 229.8V Mid: 114.6V Symm: 0.6 Temp: 22.0C \
                 | top=229.8V mid=114.6V symm=0.6 temp=22.0C",
            ),
            (
                "battery",
                "battery_3",
                "OK: Battery 3 is: Top: 230.9V Mid: 115.0V Symm: 0.9 \
                 | top=230.9V mid=115.0V symm=0.9",
            ),
            (
                "input",
                "acdc",
                "OK: Input AC/DC is: Voltage: 233.1V Current: 12.1A Power: 2.8kW Energy: 10452.7kWh \
                 | voltage=233.1V current=12.1A power=2.8kW energy=10452.7kWh",
            ),
            (
                "input",
                "solar",
                "OK: Input solar is: Voltage: 180.4V Current: 3.2A Power: 0.6kW Energy: 3911.0kWh \
                 | voltage=180.4V current=3.2A power=0.6kW energy=3911.0kWh",
            ),
            (
                "input",
                "total",
                "OK: Input total is: Current: 15.3A Power: 3.4kW Energy: 14363.7kWh \
                 | current=15.3A power=3.4kW energy=14363.7kWh",
            ),
        ];

        let document = sample();
        for (mode, submode, line) in expected {
            let resource = evaluate(mode, submode, &Thresholds::default(), &document).unwrap();
            assert_eq!(resource.to_status_line(), line, "{mode}/{submode}");
            assert_eq!(resource.state(), ServiceState::Ok, "{mode}/{submode}");

            // Identical input, identical output.
            let again = evaluate(mode, submode, &Thresholds::default(), &document).unwrap();
            assert_eq!(again.to_status_line(), line, "{mode}/{submode}");
        }
    }

    #[test]
    fn test_load_thresholds_change_the_state() {
        let document = sample();

        let resource = evaluate(
            "load",
            "voltage",
            &Thresholds::new(Some("200".into()), Some("220".into())),
            &document,
        )
        .unwrap();
        assert_eq!(resource.state(), ServiceState::Critical);
        assert_eq!(
            resource.to_status_line(),
            "CRITICAL: Load voltage is: 230.2V | voltage=230.2V"
        );

        let resource = evaluate(
            "load",
            "voltage",
            &Thresholds::new(Some("230".into()), Some("240".into())),
            &document,
        )
        .unwrap();
        assert_eq!(resource.state(), ServiceState::Warning);

        let resource = evaluate(
            "load",
            "voltage",
            &Thresholds::new(Some("240".into()), Some("250".into())),
            &document,
        )
        .unwrap();
        assert_eq!(resource.state(), ServiceState::Ok);
    }

    #[test]
    fn test_load_threshold_comparison_is_string_ordered() {
        // "230.2" sorts below "99", so the numerically exceeded bound
        // still reports OK.
        let resource = evaluate(
            "load",
            "voltage",
            &Thresholds::new(None, Some("99".into())),
            &sample(),
        )
        .unwrap();
        assert_eq!(resource.state(), ServiceState::Ok);
    }

    #[test]
    fn test_only_load_metrics_honor_thresholds() {
        let document = sample();
        // Every reading in the sample sorts above these bounds.
        let tight = Thresholds::new(Some("0".into()), Some("1".into()));

        let combos = [
            ("system", "site"),
            ("battery", "battery_1"),
            ("battery", "battery_3"),
            ("input", "acdc"),
            ("input", "total"),
        ];
        for (mode, submode) in combos {
            let resource = evaluate(mode, submode, &tight, &document).unwrap();
            assert_eq!(resource.state(), ServiceState::Ok, "{mode}/{submode}");
        }
    }

    #[test]
    fn test_unknown_mode() {
        let err = evaluate("cooling", "site", &Thresholds::default(), &sample()).unwrap_err();
        assert!(matches!(err, CheckError::UnknownMode(_)));
        assert_eq!(err.to_string(), "Invalid mode \"cooling\"");
    }

    #[test]
    fn test_unknown_submodes() {
        let document = sample();

        let err =
            evaluate("load", "frequency", &Thresholds::default(), &document).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid sub mode \"frequency\" for mode load"
        );

        for (mode, submode) in [
            ("system", "serial"),
            ("battery", "battery_4"),
            ("input", "wind"),
        ] {
            let err = evaluate(mode, submode, &Thresholds::default(), &document).unwrap_err();
            assert!(
                matches!(err, CheckError::UnknownSubmode { .. }),
                "{mode}/{submode}"
            );
        }
    }

    #[test]
    fn test_missing_readings_surface_as_document_errors() {
        let document =
            StatusDocument::parse("<openxml><system><unit><site>X</site></unit></system></openxml>")
                .unwrap();
        let err = evaluate("system", "site", &Thresholds::default(), &document).unwrap_err();
        assert!(matches!(err, CheckError::Document(_)));
    }
}
