#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parse and validation errors are fine; panics are not.
    let Ok(cfg) = ph_config::load_toml(data) else {
        return;
    };
    if cfg.validate().is_err() {
        return;
    }
    // A validated config must convert and produce an in-range reading.
    let ctl = ph_core::ControllerCfg::try_from(&cfg).expect("validated config converts");
    let model = ph_core::CalibrationModel::fit(&ctl.calibration);
    for v in [0.0, ctl.adc.vref / 2.0, ctl.adc.vref] {
        let ph = model.apply(v);
        assert!((0.0..=14.0).contains(&ph));
    }
});
