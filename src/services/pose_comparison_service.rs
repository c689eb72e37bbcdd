/// Pose Comparison Service
///
/// Measures how far a live pose is from a reference pose:
/// - Only the first detected body of each pose is used
/// - Each landmark is reduced to its (x, y, z) position
/// - The two joint sequences are aligned with dynamic time warping, using
///   cosine distance (1 - cosine similarity) as the per-joint cost
///
/// The returned value is the cumulative DTW cost, not normalized by path
/// length. Score thresholds elsewhere are calibrated against this exact value.
/// Every failure (no body, joint count mismatch, zero-length vector) yields
/// `None` so callers can hold over their previous distance.

use ndarray::Array2;

use crate::models::pose::{LandmarkSet, Pose};

type Point3 = [f64; 3];

/// Vectors shorter than this are treated as degenerate
const MIN_NORM: f64 = 1e-12;

/// Distance between the first bodies of two poses, or `None` when they cannot be compared
pub fn compare_distance(live: &Pose, reference: &Pose) -> Option<f64> {
    let live_body = live.first_body()?;
    let reference_body = reference.first_body()?;

    if live_body.is_empty() || live_body.len() != reference_body.len() {
        tracing::debug!(
            "Skipping comparison: {} live joints vs {} reference joints",
            live_body.len(),
            reference_body.len()
        );
        return None;
    }

    let live_points = positions(live_body);
    let reference_points = positions(reference_body);

    dtw_distance(&live_points, &reference_points, cosine_distance)
}

fn positions(body: &LandmarkSet) -> Vec<Point3> {
    body.iter().map(|landmark| landmark.position()).collect()
}

/// 1 - cosine similarity of two 3-vectors, `None` if either has zero length
pub fn cosine_distance(a: &Point3, b: &Point3) -> Option<f64> {
    let dot = a[0] * b[0] + a[1] * b[1] + a[2] * b[2];
    let norm_a = (a[0] * a[0] + a[1] * a[1] + a[2] * a[2]).sqrt();
    let norm_b = (b[0] * b[0] + b[1] * b[1] + b[2] * b[2]).sqrt();

    if norm_a < MIN_NORM || norm_b < MIN_NORM {
        return None;
    }

    let similarity = (dot / (norm_a * norm_b)).clamp(-1.0, 1.0);
    let distance = 1.0 - similarity;

    distance.is_finite().then_some(distance)
}

/// Cumulative cost of the cheapest monotone alignment between two sequences.
///
/// `cost` returning `None` for any pair aborts the whole computation.
pub fn dtw_distance<T, F>(a: &[T], b: &[T], cost: F) -> Option<f64>
where
    F: Fn(&T, &T) -> Option<f64>,
{
    if a.is_empty() || b.is_empty() {
        return None;
    }

    let rows = a.len();
    let cols = b.len();
    let mut accumulated = Array2::<f64>::from_elem((rows + 1, cols + 1), f64::INFINITY);
    accumulated[[0, 0]] = 0.0;

    for i in 1..=rows {
        for j in 1..=cols {
            let local = cost(&a[i - 1], &b[j - 1])?;
            let best_previous = accumulated[[i - 1, j - 1]]
                .min(accumulated[[i - 1, j]])
                .min(accumulated[[i, j - 1]]);
            accumulated[[i, j]] = local + best_previous;
        }
    }

    let total = accumulated[[rows, cols]];
    total.is_finite().then(|| total.max(0.0))
}
