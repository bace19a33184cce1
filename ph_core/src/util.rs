//! Unit helpers shared by the loop and the hardware layer.

use crate::config::AdcCfg;

/// Convert raw ADC counts to volts: `raw * (vref / max_raw)`.
/// - `max_raw` of 0 is treated as 1 to avoid division by zero.
#[inline]
pub fn raw_to_voltage(raw: u16, adc: &AdcCfg) -> f32 {
    f32::from(raw) * (adc.vref / f32::from(adc.max_raw.max(1)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_scale_is_vref() {
        let adc = AdcCfg::default();
        assert!((raw_to_voltage(1023, &adc) - 5.0).abs() < 1e-6);
        assert_eq!(raw_to_voltage(0, &adc), 0.0);
    }

    #[test]
    fn zero_max_raw_does_not_divide_by_zero() {
        let adc = AdcCfg {
            max_raw: 0,
            vref: 5.0,
        };
        assert!((raw_to_voltage(1, &adc) - 5.0).abs() < 1e-6);
    }
}
