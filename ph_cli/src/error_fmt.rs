//! Human-readable error descriptions and structured JSON error formatting.

use ph_core::error::{BuildError, PhError};

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingProbe | BuildError::MissingPumps | BuildError::MissingSink => format!(
                "What happened: The control loop could not be assembled ({be}).\nLikely causes: Hardware failed to initialize.\nHow to fix: Run `self-check` and inspect the log for the failing device."
            ),
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun."
            ),
        };
    }

    if let Some(pe) = err.downcast_ref::<PhError>() {
        return match pe {
            PhError::Config(msg) => {
                if msg.contains("calibration CSV must have headers") {
                    return "What happened: Invalid headers in calibration CSV.\nHow to fix: The first line must be exactly 'voltage,ph'.".to_string();
                }
                format!(
                    "What happened: Configuration is invalid ({msg}).\nLikely causes: Missing or out-of-range values in the TOML or calibration CSV.\nHow to fix: Edit the file and try again."
                )
            }
            PhError::Hardware(msg) => format!(
                "What happened: Hardware error ({msg}).\nLikely causes: ADC not wired to SPI0/CE0, wrong [adc] channel, wrong [pins], or missing GPIO/SPI permissions.\nHow to fix: Check wiring and the config, then run `self-check`."
            ),
            PhError::Io(msg) => format!(
                "What happened: Could not write telemetry ({msg}).\nLikely causes: The consumer of stdout went away.\nHow to fix: Restart the pipeline reading the controller output."
            ),
        };
    }

    // Generic fallback
    let msg = format!("{err:#}");
    format!(
        "Something went wrong.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail. Original: {msg}"
    )
}

/// Stable exit codes: 2 config, 3 hardware, 1 anything else.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if err.downcast_ref::<BuildError>().is_some() {
        return 2;
    }
    match err.downcast_ref::<PhError>() {
        Some(PhError::Config(_)) => 2,
        Some(PhError::Hardware(_)) => 3,
        Some(PhError::Io(_)) | None => 1,
    }
}

fn reason_name(err: &eyre::Report) -> &'static str {
    if err.downcast_ref::<BuildError>().is_some() {
        return "Config";
    }
    match err.downcast_ref::<PhError>() {
        Some(PhError::Config(_)) => "Config",
        Some(PhError::Hardware(_)) => "Hardware",
        Some(PhError::Io(_)) => "Io",
        None => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;
    json!({
        "reason": reason_name(err),
        "exit_code": exit_code_for_error(err),
        "message": humanize(err),
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use eyre::WrapErr;

    #[test]
    fn hardware_errors_survive_context() {
        let err: eyre::Result<()> = Err(PhError::Hardware("spi timeout".into())).wrap_err("read probe");
        let err = err.unwrap_err();
        assert_eq!(exit_code_for_error(&err), 3);
        assert!(humanize(&err).contains("spi timeout"));
    }

    #[test]
    fn csv_header_hint() {
        let err = eyre::Report::new(PhError::Config(
            "calibration CSV must have headers 'voltage,ph', got: a,b".into(),
        ));
        assert!(humanize(&err).contains("'voltage,ph'"));
        assert_eq!(exit_code_for_error(&err), 2);
    }

    #[test]
    fn json_error_shape() {
        let err = eyre::Report::new(BuildError::InvalidConfig("filter.ma_size must be >= 1"));
        let v: serde_json::Value = serde_json::from_str(&format_error_json(&err)).unwrap();
        assert_eq!(v["reason"], "Config");
        assert_eq!(v["exit_code"], 2);
        assert!(v["message"].as_str().unwrap().contains("ma_size"));
    }

    #[test]
    fn unknown_errors_fall_back() {
        let err = eyre::eyre!("boom");
        assert_eq!(exit_code_for_error(&err), 1);
        assert!(humanize(&err).contains("boom"));
    }
}
