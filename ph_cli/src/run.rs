//! Hardware assembly and command execution.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use eyre::WrapErr;
use ph_core::error::PhError;
use ph_core::{ControlLoop, ControllerCfg, JsonLineSink};
use ph_traits::{Probe, Pumps};

pub type Hardware = (Box<dyn Probe>, Box<dyn Pumps>);

/// Real probe and pumps on the Raspberry Pi.
#[cfg(all(feature = "hardware", target_os = "linux"))]
pub fn make_hardware(cfg: &ph_config::Config) -> eyre::Result<Hardware> {
    let probe = ph_hardware::Mcp3008::new(cfg.adc.channel)
        .map_err(|e| PhError::Hardware(e.to_string()))
        .wrap_err("open mcp3008")?;
    let p = &cfg.pins;
    let pumps = ph_hardware::HBridgePumps::new(p.base_in1, p.base_in2, p.acid_in3, p.acid_in4)
        .map_err(|e| PhError::Hardware(e.to_string()))
        .wrap_err("open pump pins")?;
    Ok((Box::new(probe), Box::new(pumps)))
}

/// Simulated vessel. `PH_SIM_RAW` pins the probe to a fixed raw value and
/// `PH_SIM_FAIL` makes every probe read fail.
#[cfg(not(all(feature = "hardware", target_os = "linux")))]
pub fn make_hardware(cfg: &ph_config::Config) -> eyre::Result<Hardware> {
    use ph_hardware::{SimParams, SimulatedProbe, SimulatedPumps, SimulatedVessel};

    if std::env::var_os("PH_SIM_FAIL").is_some() {
        return Ok((
            Box::new(ph_core::mocks::FailingProbe),
            Box::new(SimulatedPumps::detached()),
        ));
    }
    if let Ok(raw) = std::env::var("PH_SIM_RAW") {
        let raw: u16 = raw
            .trim()
            .parse()
            .map_err(|e| PhError::Config(format!("PH_SIM_RAW: {e}")))?;
        tracing::info!(raw, "simulated probe pinned");
        return Ok((
            Box::new(SimulatedProbe::fixed(raw)),
            Box::new(SimulatedPumps::detached()),
        ));
    }

    let vessel = SimulatedVessel::new(SimParams {
        max_raw: cfg.adc.max_raw,
        vref: cfg.adc.vref,
        ..SimParams::default()
    });
    tracing::info!(start_voltage = vessel.voltage(), "simulated vessel");
    Ok((Box::new(vessel.probe()), Box::new(vessel.pumps())))
}

fn build_loop(cfg: &ControllerCfg, hw: Hardware) -> eyre::Result<ControlLoop> {
    let (probe, pumps) = hw;
    let cl = ControlLoop::builder()
        .with_probe(probe)
        .with_pumps(pumps)
        .with_sink(JsonLineSink::stdout())
        .with_config(cfg.clone())
        .build()?;
    Ok(cl)
}

fn print_report(cl: &ControlLoop, json: bool) {
    let report = cl.calibration_report();
    report.log();
    if !json {
        println!("{report}");
    }
}

/// `run`: startup diagnostic, then the loop until `cycles` or Ctrl-C.
pub fn run_loop(
    cfg: &ControllerCfg,
    hw: Hardware,
    cycles: Option<u64>,
    json: bool,
    shutdown: Arc<AtomicBool>,
) -> eyre::Result<u64> {
    let mut cl = build_loop(cfg, hw)?;
    print_report(&cl, json);
    tracing::info!(
        cadence_ms = cfg.cadence.cadence_ms,
        burst_ms = cfg.dosing.burst_ms,
        min_gap_ms = cfg.dosing.min_gap_ms,
        ma_size = cfg.filter.ma_size,
        "control loop start"
    );
    let n = cl.run(cycles, &shutdown)?;
    tracing::info!(cycles = n, "control loop stopped");
    Ok(n)
}

/// `calibration`: fit and print, touching no hardware.
pub fn calibration(cfg: &ControllerCfg) {
    let model = ph_core::CalibrationModel::fit(&cfg.calibration);
    let report = ph_core::CalibrationReport::new(cfg.calibration, model);
    report.log();
    println!("{report}");
}

/// `self-check`: stop pumps, read one sample, report it.
pub fn self_check(cfg: &ControllerCfg, hw: Hardware) -> eyre::Result<()> {
    let (mut probe, mut pumps) = hw;
    pumps
        .stop_all()
        .map_err(|e| PhError::Hardware(e.to_string()))
        .wrap_err("stop pumps")?;
    let raw = probe
        .read_raw()
        .map_err(|e| PhError::Hardware(e.to_string()))
        .wrap_err("read probe")?;
    let voltage = ph_core::util::raw_to_voltage(raw, &cfg.adc);
    let ph = ph_core::CalibrationModel::fit(&cfg.calibration).apply(voltage);
    tracing::info!(raw, voltage, ph, "self-check");
    println!("self-check ok: raw={raw} voltage={voltage:.3} pH={ph:.2}");
    Ok(())
}
