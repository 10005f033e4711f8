//! Sample value to converter code conversion

use crate::config::DacConfig;

/// Linear map from `[range_min, range_max]` onto codes `0..=255`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CodeScaler {
    range_min: f32,
    range_max: f32,
    prevent_overflow: bool,
}

impl CodeScaler {
    pub fn new(range_min: f32, range_max: f32, prevent_overflow: bool) -> Self {
        Self {
            range_min,
            range_max,
            prevent_overflow,
        }
    }

    pub fn from_config(config: &DacConfig, prevent_overflow: bool) -> Self {
        Self::new(config.range_min, config.range_max, prevent_overflow)
    }

    /// Convert one sample to a code word
    ///
    /// With overflow prevention the value is clamped into the input range
    /// before scaling. Either way the scaled result saturates at the code
    /// limits instead of wrapping.
    #[inline]
    pub fn encode(&self, value: f32) -> u8 {
        let value = if self.prevent_overflow {
            value.clamp(self.range_min, self.range_max)
        } else {
            value
        };
        let scaled = (value - self.range_min) / (self.range_max - self.range_min) * 255.0;
        // NaN saturates to 0
        scaled.round().clamp(0.0, 255.0) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_range_mapping() {
        let scaler = CodeScaler::new(0.0, 3.3, true);
        assert_eq!(scaler.encode(0.0), 0);
        assert_eq!(scaler.encode(3.3), 255);
        assert_eq!(scaler.encode(1.0), 77);
    }

    #[test]
    fn test_overflow_clamped() {
        let scaler = CodeScaler::new(0.0, 3.3, true);
        assert_eq!(scaler.encode(10.0), 255);
        assert_eq!(scaler.encode(-4.0), 0);
    }

    #[test]
    fn test_unclamped_saturates_instead_of_wrapping() {
        let scaler = CodeScaler::new(-1.0, 1.0, false);
        assert_eq!(scaler.encode(1.5), 255);
        assert_eq!(scaler.encode(-3.0), 0);
        assert_eq!(scaler.encode(0.0), 128);
        assert_eq!(scaler.encode(f32::NAN), 0);
    }
}
