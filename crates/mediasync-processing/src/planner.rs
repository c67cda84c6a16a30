//! Compression planning: decide how aggressively to downscale, from the
//! source file size alone.

/// Smallest scale factor ever applied, regardless of input size.
pub const MIN_SCALE_FACTOR: f64 = 0.2;
/// Largest scale factor; at this value transcoding is skipped entirely.
pub const MAX_SCALE_FACTOR: f64 = 0.9;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;
const LOG_DIVISOR: f64 = 3.8;

/// Resize plan derived solely from the scratch-file size. Not persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressionPlan {
    /// Multiplicative resize ratio for both dimensions, in [0.2, 0.9],
    /// rounded to two decimals.
    pub scale_factor: f64,
    /// Whether invoking the transcoder is worthwhile at all.
    pub needed: bool,
}

impl CompressionPlan {
    /// `scale = 1.0 - log10(size_mb) / 3.8`, clamped to [0.2, 0.9] and
    /// rounded to two decimals. Near-empty files get the maximum scale
    /// (the logarithm is undefined at zero), very large files bottom out at
    /// the fixed floor. `needed` is true exactly when the rounded factor is
    /// below the maximum.
    pub fn for_size(file_size_bytes: u64) -> Self {
        let size_mb = file_size_bytes as f64 / BYTES_PER_MB;

        let raw = if size_mb <= 0.0 {
            MAX_SCALE_FACTOR
        } else {
            (1.0 - size_mb.log10() / LOG_DIVISOR).clamp(MIN_SCALE_FACTOR, MAX_SCALE_FACTOR)
        };
        let scale_factor = (raw * 100.0).round() / 100.0;

        CompressionPlan {
            scale_factor,
            needed: scale_factor < MAX_SCALE_FACTOR,
        }
    }
}
