// Dense vector math over f32 slices
// Two accumulators in the dot product keep the loop pipelined

/// Dot product; 0.0 on length mismatch
#[inline]
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let mut sum1 = 0.0f32;
    let mut sum2 = 0.0f32;
    let chunks = a.len() / 2;
    for i in 0..chunks {
        sum1 += a[2 * i] * b[2 * i];
        sum2 += a[2 * i + 1] * b[2 * i + 1];
    }
    if a.len() % 2 == 1 {
        let last = a.len() - 1;
        sum1 += a[last] * b[last];
    }
    sum1 + sum2
}

#[inline]
pub fn norm(a: &[f32]) -> f32 {
    dot(a, a).sqrt()
}

/// Cosine similarity; 0.0 when either vector has zero norm
#[inline]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let norm_a = norm(a);
    let norm_b = norm(b);
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot(a, b) / (norm_a * norm_b)
}

/// Cosine similarity with precomputed norms
#[inline]
pub(crate) fn cosine_with_norms(a: &[f32], norm_a: f32, b: &[f32], norm_b: f32) -> f32 {
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot(a, b) / (norm_a * norm_b)
}

/// Euclidean (L2) distance; infinity on length mismatch
#[inline]
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return f32::INFINITY;
    }
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum::<f32>()
        .sqrt()
}

/// Unit-length copy; zero vectors are returned unchanged
#[inline]
pub fn normalized(a: &[f32]) -> Vec<f32> {
    let n = norm(a);
    if n > f32::EPSILON {
        let inv = 1.0 / n;
        a.iter().map(|x| x * inv).collect()
    } else {
        a.to_vec()
    }
}
