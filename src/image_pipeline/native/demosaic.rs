//! CPU demosaicing of Bayer CFA data for the rawloader backend.
//!
//! rawloader hands back one sample per photosite. The gateway contract wants
//! three interleaved 16-bit channels, so 2x2 Bayer mosaics are interpolated
//! with the `bayer` crate, then black/white levels and the as-shot white
//! balance are applied. Other mosaics (X-Trans and friends) are left alone.

use std::io::Cursor;

use bayer::{BayerDepth, CFA, Demosaic, RasterDepth, RasterMut};
use tracing::{debug, instrument};

const RGB_CHANNELS: usize = 3;
const BYTES_PER_SAMPLE: usize = 2;

/// Sensor levels applied after interpolation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Levels {
    pub black: u16,
    pub white: u16,
    /// Per-channel gains relative to green
    pub wb: [f32; 3],
}

impl Levels {
    /// Levels that leave samples untouched.
    pub fn identity() -> Self {
        Self {
            black: 0,
            white: u16::MAX,
            wb: [1.0; 3],
        }
    }

    /// Takes the first black/white level and normalizes the rawloader
    /// `[r, g, b, e]` coefficients to green. Missing or non-finite
    /// coefficients fall back to unit gains, and a white level at or below
    /// black falls back to the full u16 range.
    pub fn from_sensor(
        blacklevels: &[u16; 4],
        whitelevels: &[u16; 4],
        wb_coeffs: &[f32; 4],
    ) -> Self {
        let [r, g, b, _] = *wb_coeffs;
        let wb = if [r, g, b].iter().all(|c| c.is_finite() && *c > 0.0) {
            [r / g, 1.0, b / g]
        } else {
            [1.0; 3]
        };

        let (black, white) = match (blacklevels[0], whitelevels[0]) {
            (black, white) if white > black => (black, white),
            _ => (0, u16::MAX),
        };

        Self { black, white, wb }
    }

    fn apply(&self, value: u16, channel: usize) -> u16 {
        let black = f32::from(self.black);
        let range = (f32::from(self.white) - black).max(1.0);
        let normalized = ((f32::from(value) - black).max(0.0) / range) * self.wb[channel];
        (normalized * f32::from(u16::MAX))
            .round()
            .clamp(0.0, f32::from(u16::MAX)) as u16
    }
}

/// The 2x2 Bayer layout of a rawloader CFA, read from its top-left corner.
pub(crate) fn bayer_pattern(cfa: &rawloader::CFA) -> Option<CFA> {
    if cfa.width != 2 || cfa.height != 2 {
        return None;
    }

    // rawloader colors: 0 = red, 1 = green, 2 = blue
    let corner = (
        cfa.color_at(0, 0),
        cfa.color_at(0, 1),
        cfa.color_at(1, 0),
        cfa.color_at(1, 1),
    );
    match corner {
        (0, 1, 1, 2) => Some(CFA::RGGB),
        (2, 1, 1, 0) => Some(CFA::BGGR),
        (1, 0, 2, 1) => Some(CFA::GRBG),
        (1, 2, 0, 1) => Some(CFA::GBRG),
        _ => None,
    }
}

/// Interpolates a `width x height` mosaic into interleaved RGB samples.
///
/// Returns `None` when `samples` does not cover the mosaic or the
/// interpolation itself fails.
#[instrument(skip(samples, pattern, levels))]
pub(crate) fn demosaic(
    samples: &[u16],
    width: usize,
    height: usize,
    pattern: CFA,
    levels: &Levels,
) -> Option<Vec<u16>> {
    if width.checked_mul(height) != Some(samples.len()) {
        debug!(samples = samples.len(), "Mosaic does not match its geometry");
        return None;
    }

    let bayer_bytes: Vec<u8> = samples.iter().flat_map(|&val| val.to_le_bytes()).collect();
    let mut output_buf = vec![0u8; samples.len() * RGB_CHANNELS * BYTES_PER_SAMPLE];

    {
        let mut cursor = Cursor::new(&bayer_bytes[..]);
        let mut output_raster = RasterMut::new(width, height, RasterDepth::Depth16, &mut output_buf);
        if let Err(e) = bayer::run_demosaic(
            &mut cursor,
            BayerDepth::Depth16LE,
            pattern,
            Demosaic::Linear,
            &mut output_raster,
        ) {
            debug!(error = ?e, "Demosaic failed");
            return None;
        }
    }

    let rgb = output_buf
        .chunks_exact(BYTES_PER_SAMPLE)
        .enumerate()
        .map(|(i, bytes)| levels.apply(u16::from_le_bytes([bytes[0], bytes[1]]), i % RGB_CHANNELS))
        .collect();
    Some(rgb)
}
