// Distance kernels for embedding comparison.
// Scalar code with two accumulators so the compiler can pipeline the adds.

/// Squared Euclidean distance. Monotone in the true distance, so the
/// matching engine ranks on this and only takes the root for reporting.
#[inline]
pub fn l2_squared(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());

    let mut sum0 = 0.0f32;
    let mut sum1 = 0.0f32;

    let chunks = a.chunks_exact(4);
    let remainder = chunks.remainder();
    let b_chunks = b.chunks_exact(4);

    for (a_chunk, b_chunk) in chunks.zip(b_chunks) {
        let d0 = a_chunk[0] - b_chunk[0];
        let d1 = a_chunk[1] - b_chunk[1];
        let d2 = a_chunk[2] - b_chunk[2];
        let d3 = a_chunk[3] - b_chunk[3];

        sum0 += d0 * d0 + d1 * d1;
        sum1 += d2 * d2 + d3 * d3;
    }

    for i in (a.len() - remainder.len())..a.len() {
        let diff = a[i] - b[i];
        sum0 += diff * diff;
    }

    sum0 + sum1
}

/// Dot product
#[inline]
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());

    let mut sum0 = 0.0f32;
    let mut sum1 = 0.0f32;

    let chunks = a.chunks_exact(2);
    let remainder = chunks.remainder();
    let b_chunks = b.chunks_exact(2);
    for (a_chunk, b_chunk) in chunks.zip(b_chunks) {
        sum0 += a_chunk[0] * b_chunk[0];
        sum1 += a_chunk[1] * b_chunk[1];
    }
    for i in (a.len() - remainder.len())..a.len() {
        sum0 += a[i] * b[i];
    }

    sum0 + sum1
}

/// `1 - cos(a, b)`; a zero vector is treated as maximally distant
#[inline]
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let norm_a = norm_squared(a).sqrt();
    let norm_b = norm_squared(b).sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    1.0 - dot(a, b) / (norm_a * norm_b)
}

/// Squared L2 norm
#[inline]
pub fn norm_squared(v: &[f32]) -> f32 {
    let mut sum0 = 0.0f32;
    let mut sum1 = 0.0f32;

    let chunks = v.chunks_exact(2);
    let remainder = chunks.remainder();
    for chunk in chunks {
        sum0 += chunk[0] * chunk[0];
        sum1 += chunk[1] * chunk[1];
    }
    for x in remainder {
        sum0 += x * x;
    }

    sum0 + sum1
}
