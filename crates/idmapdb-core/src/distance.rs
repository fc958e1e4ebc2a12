//! Distance kernel for the flat engine.
//!
//! The flat engine ranks candidates by squared Euclidean distance: cheap to
//! compute (no square root), and monotonic with true Euclidean distance, so
//! nearest-neighbor ordering is identical. An exact self-match scores 0.

/// Computes the squared Euclidean distance between two vectors.
///
/// # Panics
///
/// Debug builds assert that both slices have the same length; the engine
/// guarantees this for stored entries and the index validates queries.
#[must_use]
#[inline]
pub fn squared_euclidean(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());

    // Four independent accumulators so the loop auto-vectorizes.
    let mut sums = [0.0f32; 4];
    let chunks = a.len() / 4;
    for i in 0..chunks {
        let base = i * 4;
        for lane in 0..4 {
            let d = a[base + lane] - b[base + lane];
            sums[lane] += d * d;
        }
    }
    let mut total = sums.iter().sum::<f32>();
    for i in chunks * 4..a.len() {
        let d = a[i] - b[i];
        total += d * d;
    }
    total
}
