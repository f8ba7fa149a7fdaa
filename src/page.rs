//! Data page decoding and per-sample calibration
//!
//! A page's payload is a single 3600-character ASCII line: 300 consecutive
//! records of 12 hex characters each. One record packs five fields into 48
//! bits (MSB first):
//!
//! ```text
//! bits [0,12)   X axis    (two's-complement signed 12-bit)
//! bits [12,24)  Y axis    (two's-complement signed 12-bit)
//! bits [24,36)  Z axis    (two's-complement signed 12-bit)
//! bits [36,46)  light     (unsigned 10-bit)
//! bit  46       button
//! bit  47       reserved
//! ```
//!
//! Extraction is plain shifting and masking; no textual binary intermediate.

use chrono::{NaiveDateTime, TimeDelta};

use crate::calibration::Calibration;
use crate::error::{GeneActivError, Result};

/// Exact length of a page's data payload line
pub const PAGE_LINE_LEN: usize = 3600;
/// Packed records per page
pub const RECORDS_PER_PAGE: usize = 300;
/// Hex characters per packed record
pub const RECORD_HEX_LEN: usize = 12;

/// One packed 48-bit record, decoded but not yet calibrated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawRecord {
    /// X axis (sign-extended 12-bit)
    pub x: i16,
    /// Y axis (sign-extended 12-bit)
    pub y: i16,
    /// Z axis (sign-extended 12-bit)
    pub z: i16,
    /// Light level (10-bit)
    pub lux: u16,
    /// Button pressed flag
    pub button: bool,
    /// Unused trailing bit
    pub reserved: bool,
}

/// One calibrated, timestamped sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibratedSample {
    pub timestamp: NaiveDateTime,
    /// Acceleration in g
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Illuminance in lux
    pub lux: f64,
    /// Page temperature in °C, shared by all 300 samples of a page
    pub temperature: f64,
    pub button: bool,
    /// Signal Magnitude Vector, |sqrt(x²+y²+z²) − 1|
    pub svm: f64,
}

/// Signal Magnitude Vector: deviation of the instantaneous acceleration
/// magnitude from 1 g, used as a motion-intensity proxy
pub fn svm(x: f64, y: f64, z: f64) -> f64 {
    ((x * x + y * y + z * z).sqrt() - 1.0).abs()
}

/// Per-page sample time offsets: entry i is i / rate_hz seconds
pub(crate) fn sample_offsets(rate_hz: f64) -> Vec<TimeDelta> {
    (0..RECORDS_PER_PAGE)
        .map(|i| TimeDelta::nanoseconds((i as f64 * 1e9 / rate_hz).round() as i64))
        .collect()
}

/// Unpack one 48-bit value into its five fields
pub fn unpack(packed: u64) -> RawRecord {
    RawRecord {
        x: sign_extend_12(((packed >> 36) & 0xFFF) as u16),
        y: sign_extend_12(((packed >> 24) & 0xFFF) as u16),
        z: sign_extend_12(((packed >> 12) & 0xFFF) as u16),
        lux: ((packed >> 2) & 0x3FF) as u16,
        button: (packed >> 1) & 1 == 1,
        reserved: packed & 1 == 1,
    }
}

/// Interpret the low 12 bits as a two's-complement signed value
fn sign_extend_12(raw: u16) -> i16 {
    ((raw << 4) as i16) >> 4
}

/// Per-axis linear calibration, rounded to 4 decimal places
fn calibrate_axis(raw: i16, gain: i64, offset: i64) -> f64 {
    round_4dp((raw as f64 * 100.0 - offset as f64) / gain as f64)
}

fn round_4dp(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Decode a full payload line into 300 calibrated samples, appended to `out`
/// in index order
///
/// The payload must be exactly [`PAGE_LINE_LEN`] ASCII hex characters; any
/// non-hex chunk aborts the file with `MalformedPage`, since the format has
/// no recovery point inside a corrupted page.
pub(crate) fn decode_page(
    payload: &str,
    cal: &Calibration,
    offsets: &[TimeDelta],
    page_time: NaiveDateTime,
    temperature: f64,
    out: &mut Vec<CalibratedSample>,
) -> Result<()> {
    debug_assert_eq!(payload.len(), PAGE_LINE_LEN);
    if !payload.is_ascii() {
        return Err(GeneActivError::MalformedPage(
            "payload contains non-ASCII characters".to_string(),
        ));
    }

    out.reserve(RECORDS_PER_PAGE);
    for (i, offset) in offsets.iter().enumerate() {
        let chunk = &payload[i * RECORD_HEX_LEN..(i + 1) * RECORD_HEX_LEN];
        let packed = u64::from_str_radix(chunk, 16).map_err(|_| {
            GeneActivError::MalformedPage(format!(
                "record {i} is not valid hexadecimal: {chunk:?}"
            ))
        })?;
        let raw = unpack(packed);

        let x = calibrate_axis(raw.x, cal.x_gain, cal.x_offset);
        let y = calibrate_axis(raw.y, cal.y_gain, cal.y_offset);
        let z = calibrate_axis(raw.z, cal.z_gain, cal.z_offset);
        let lux = raw.lux as f64 * cal.lux as f64 / cal.volts as f64;

        let timestamp = page_time.checked_add_signed(*offset).ok_or_else(|| {
            GeneActivError::MalformedTimestamp(format!(
                "sample timestamp out of range at record {i}"
            ))
        })?;

        out.push(CalibratedSample {
            timestamp,
            x,
            y,
            z,
            lux,
            temperature,
            button: raw.button,
            svm: svm(x, y, z),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Re-pack the five fields into 48 bits (test-only; the crate never
    /// re-encodes the format)
    fn pack(x: i16, y: i16, z: i16, lux: u16, button: bool, reserved: bool) -> u64 {
        ((x as u64 & 0xFFF) << 36)
            | ((y as u64 & 0xFFF) << 24)
            | ((z as u64 & 0xFFF) << 12)
            | ((lux as u64 & 0x3FF) << 2)
            | ((button as u64) << 1)
            | (reserved as u64)
    }

    #[test]
    fn test_sign_extend_boundaries() {
        assert_eq!(sign_extend_12(0x000), 0);
        assert_eq!(sign_extend_12(0x001), 1);
        assert_eq!(sign_extend_12(0x7FF), 2047);
        assert_eq!(sign_extend_12(0x800), -2048);
        assert_eq!(sign_extend_12(0xFFF), -1);
    }

    #[test]
    fn test_unpack_field_positions() {
        // X=1, others zero: bit 36 set
        let rec = unpack(1u64 << 36);
        assert_eq!(rec.x, 1);
        assert_eq!(rec.y, 0);
        assert_eq!(rec.z, 0);
        assert_eq!(rec.lux, 0);
        assert!(!rec.button);

        // Button only: bit 1 set
        let rec = unpack(1u64 << 1);
        assert_eq!((rec.x, rec.y, rec.z, rec.lux), (0, 0, 0, 0));
        assert!(rec.button);
        assert!(!rec.reserved);
    }

    #[test]
    fn test_pack_unpack_round_trip() {
        let cases = [
            (0i16, 0i16, 0i16, 0u16, false, false),
            (1, -1, 2047, 1023, true, false),
            (-2048, 2047, -1, 512, false, true),
            (123, -456, 789, 5, true, true),
        ];
        for (x, y, z, lux, button, reserved) in cases {
            let packed = pack(x, y, z, lux, button, reserved);
            let rec = unpack(packed);
            assert_eq!((rec.x, rec.y, rec.z, rec.lux), (x, y, z, lux));
            assert_eq!((rec.button, rec.reserved), (button, reserved));
            // and back again
            let repacked = pack(rec.x, rec.y, rec.z, rec.lux, rec.button, rec.reserved);
            assert_eq!(repacked, packed);
        }
    }

    #[test]
    fn test_svm_gravity_baseline() {
        assert_eq!(svm(0.0, 0.0, 1.0), 0.0);
        assert_eq!(svm(0.0, 1.0, 0.0), 0.0);
    }

    #[test]
    fn test_svm_identity() {
        let cases: [(f64, f64, f64); 3] = [(0.3, -1.2, 0.5), (0.0, 0.0, 0.0), (2.0, 2.0, 2.0)];
        for (x, y, z) in cases {
            let expected = (x * x + y * y + z * z).sqrt() - 1.0;
            assert_eq!(svm(x, y, z), expected.abs());
        }
    }

    #[test]
    fn test_axis_calibration() {
        // raw 1, gain 100, offset 0 -> (1*100 - 0)/100 = 1.0
        assert_eq!(calibrate_axis(1, 100, 0), 1.0);
        // raw -1, gain 100, offset 0 -> -1.0
        assert_eq!(calibrate_axis(-1, 100, 0), -1.0);
        // rounding to 4 decimal places: (100 + 563) / 25889 = 0.02561...
        assert_eq!(calibrate_axis(1, 25889, -563), 0.0256);
    }

    #[test]
    fn test_sample_offsets() {
        let offsets = sample_offsets(1.0);
        assert_eq!(offsets.len(), RECORDS_PER_PAGE);
        assert_eq!(offsets[0], TimeDelta::zero());
        assert_eq!(offsets[7], TimeDelta::seconds(7));
        assert_eq!(offsets[299], TimeDelta::seconds(299));

        let offsets = sample_offsets(100.0);
        assert_eq!(offsets[1], TimeDelta::milliseconds(10));
        assert_eq!(offsets[299], TimeDelta::milliseconds(2990));
    }

    #[test]
    fn test_malformed_hex_is_fatal() {
        let cal = Calibration {
            x_gain: 100,
            x_offset: 0,
            y_gain: 100,
            y_offset: 0,
            z_gain: 100,
            z_offset: 0,
            volts: 300,
            lux: 1031,
            sample_rate_hz: 100.0,
        };
        let offsets = sample_offsets(cal.sample_rate_hz);
        let mut payload = "0".repeat(PAGE_LINE_LEN);
        payload.replace_range(13..14, "g");
        let page_time = NaiveDateTime::parse_from_str(
            "2019-01-01 10:00:00:000000",
            "%Y-%m-%d %H:%M:%S:%6f",
        )
        .unwrap();

        let mut out = Vec::new();
        let err = decode_page(&payload, &cal, &offsets, page_time, 21.5, &mut out).unwrap_err();
        assert!(matches!(err, GeneActivError::MalformedPage(_)));
        assert!(out.len() <= 1); // nothing past the corrupt record
    }
}
