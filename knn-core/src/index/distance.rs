#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

/// L2 Square Distance (Euclidean)
/// Automatically selects best SIMD implementation based on CPU features.
///
/// # Panics
/// Panics if the slices differ in length.
pub fn l2_distance(v1: &[f32], v2: &[f32]) -> f32 {
    assert_eq!(v1.len(), v2.len(), "l2_distance on vectors of different length");

    #[cfg(target_arch = "x86_64")]
    {
        if is_x86_feature_detected!("avx2") {
            // SAFETY: AVX2 availability checked above, lengths checked on entry.
            return unsafe { l2_distance_avx2(v1, v2) };
        }
    }

    // Fallback: Scalar implementation
    l2_distance_scalar(v1, v2)
}

pub fn l2_distance_scalar(v1: &[f32], v2: &[f32]) -> f32 {
    v1.iter().zip(v2.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
unsafe fn l2_distance_avx2(v1: &[f32], v2: &[f32]) -> f32 {
    let mut sum_vec = _mm256_setzero_ps();
    let n = v1.len();
    let n_simd = n - (n % 8);

    for i in (0..n_simd).step_by(8) {
        let x = _mm256_loadu_ps(v1.as_ptr().add(i));
        let y = _mm256_loadu_ps(v2.as_ptr().add(i));
        let diff = _mm256_sub_ps(x, y);
        let sq = _mm256_mul_ps(diff, diff);
        sum_vec = _mm256_add_ps(sum_vec, sq);
    }

    let mut lanes = [0.0f32; 8];
    _mm256_storeu_ps(lanes.as_mut_ptr(), sum_vec);

    let mut sum = lanes.iter().sum::<f32>();

    // Tail
    for i in n_simd..n {
        sum += (v1[i] - v2[i]) * (v1[i] - v2[i]);
    }

    sum
}
