//! Wireless payload decoding

use super::{HidError, HidResult, PAYLOAD_MIN_LEN};
use crate::report_parser::ReportParser;

pub use paddle_calibration::ADC_MAX;

/// One pair of raw paddle readings, already clamped to 12 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawSample {
    pub left_raw: u16,
    pub right_raw: u16,
}

impl RawSample {
    pub fn new(left_raw: u16, right_raw: u16) -> Self {
        Self {
            left_raw: clamp_adc(left_raw),
            right_raw: clamp_adc(right_raw),
        }
    }

    /// Decodes the first four bytes of `payload`.
    ///
    /// The 16-bit fields can carry values above 4095; they are clamped, never
    /// rejected.
    pub fn decode(payload: &[u8]) -> HidResult<Self> {
        if payload.len() < PAYLOAD_MIN_LEN {
            return Err(HidError::InvalidSize {
                expected: PAYLOAD_MIN_LEN,
                actual: payload.len(),
            });
        }

        let mut parser = ReportParser::new(payload);
        let left = parser.read_u16_le()?;
        let right = parser.read_u16_le()?;

        Ok(Self::new(left, right))
    }

    /// Encodes the sample the way the paddle transmitter does.
    pub fn to_payload(self) -> [u8; PAYLOAD_MIN_LEN] {
        let [l0, l1] = self.left_raw.to_le_bytes();
        let [r0, r1] = self.right_raw.to_le_bytes();
        [l0, l1, r0, r1]
    }
}

pub fn clamp_adc(value: u16) -> u16 {
    value.min(ADC_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adc_limit_matches_calibration() {
        assert_eq!(ADC_MAX, paddle_calibration::ADC_MAX);
        assert_eq!(clamp_adc(u16::MAX), paddle_calibration::ADC_MAX);
    }

    #[test]
    fn test_decode() -> Result<(), Box<dyn std::error::Error>> {
        let sample = RawSample::decode(&[0x01, 0x00, 0xFF, 0x0F])?;
        assert_eq!(sample.left_raw, 1);
        assert_eq!(sample.right_raw, 4095);
        Ok(())
    }

    #[test]
    fn test_decode_clamps_full_scale() -> Result<(), Box<dyn std::error::Error>> {
        let sample = RawSample::decode(&[0xFF, 0xFF, 0x00, 0x10])?;
        assert_eq!(sample.left_raw, 4095);
        assert_eq!(sample.right_raw, 4095);
        Ok(())
    }

    #[test]
    fn test_decode_ignores_trailing_bytes() -> Result<(), Box<dyn std::error::Error>> {
        let sample = RawSample::decode(&[0x10, 0x00, 0x20, 0x00, 0xDE, 0xAD, 0xBE, 0xEF])?;
        assert_eq!(sample, RawSample::new(0x10, 0x20));
        Ok(())
    }

    #[test]
    fn test_decode_short_payload() {
        for len in 0..PAYLOAD_MIN_LEN {
            let data = vec![0u8; len];
            assert_eq!(
                RawSample::decode(&data),
                Err(HidError::InvalidSize {
                    expected: 4,
                    actual: len
                })
            );
        }
    }

    #[test]
    fn test_new_clamps() {
        let sample = RawSample::new(u16::MAX, 4096);
        assert_eq!(sample, RawSample::new(4095, 4095));
    }

    #[test]
    fn test_to_payload() {
        assert_eq!(RawSample::new(1, 4095).to_payload(), [0x01, 0x00, 0xFF, 0x0F]);
    }
}
