//! SIMD kernels for NNUE evaluation.
//!
//! Provides vectorized implementations for:
//! - Accumulator updates (wrapping add/subtract of i16 rows)
//! - `ReLU` activation fused with the output dot product
//!
//! Every backend produces bit-identical results. Row updates wrap on
//! overflow so that the order in which features are applied never matters,
//! and the dot product sums exact i32 products modulo 2^32.
//!
//! Supports:
//! - `x86_64`: `SSE2` (8 i16 lanes), `AVX2` (16 i16 lanes) and `AVX-512BW` (32 i16 lanes)
//! - aarch64: NEON (8 i16 lanes)
//! - Fallback: scalar loops

use std::fmt;
use std::sync::LazyLock;

use super::network::HIDDEN_SIZE;

/// One hidden-layer row of i16 values.
pub type Row = [i16; HIDDEN_SIZE];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Kind {
    Scalar,
    #[cfg(target_arch = "x86_64")]
    Sse2,
    #[cfg(target_arch = "x86_64")]
    Avx2,
    #[cfg(target_arch = "x86_64")]
    Avx512,
    #[cfg(target_arch = "aarch64")]
    Neon,
}

/// A vector instruction set the kernels can run on.
///
/// Values other than [`SimdBackend::SCALAR`] can only be obtained from
/// [`SimdBackend::available`] or [`SimdBackend::detect`], which probe the CPU
/// first, so dispatching to a backend is always sound.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct SimdBackend(Kind);

static ACTIVE: LazyLock<SimdBackend> = LazyLock::new(|| {
    let backend = SimdBackend::detect();
    log::debug!("NNUE kernels use the {backend} backend");
    backend
});

impl SimdBackend {
    /// Portable fallback, available everywhere.
    pub const SCALAR: SimdBackend = SimdBackend(Kind::Scalar);

    /// All backends the running CPU supports, widest last.
    #[must_use]
    pub fn available() -> Vec<SimdBackend> {
        #[allow(unused_mut)]
        let mut backends = vec![Self::SCALAR];

        #[cfg(target_arch = "x86_64")]
        {
            if is_x86_feature_detected!("sse2") {
                backends.push(SimdBackend(Kind::Sse2));
            }
            if is_x86_feature_detected!("avx2") {
                backends.push(SimdBackend(Kind::Avx2));
            }
            if is_x86_feature_detected!("avx512f") && is_x86_feature_detected!("avx512bw") {
                backends.push(SimdBackend(Kind::Avx512));
            }
        }

        #[cfg(target_arch = "aarch64")]
        {
            if std::arch::is_aarch64_feature_detected!("neon") {
                backends.push(SimdBackend(Kind::Neon));
            }
        }

        backends
    }

    /// Widest backend the running CPU supports.
    #[must_use]
    pub fn detect() -> SimdBackend {
        Self::available().last().copied().unwrap_or(Self::SCALAR)
    }

    /// Backend chosen once for the whole process.
    #[must_use]
    pub fn active() -> SimdBackend {
        *ACTIVE
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self.0 {
            Kind::Scalar => "scalar",
            #[cfg(target_arch = "x86_64")]
            Kind::Sse2 => "sse2",
            #[cfg(target_arch = "x86_64")]
            Kind::Avx2 => "avx2",
            #[cfg(target_arch = "x86_64")]
            Kind::Avx512 => "avx512",
            #[cfg(target_arch = "aarch64")]
            Kind::Neon => "neon",
        }
    }

    /// `acc += row`, wrapping per lane.
    #[inline]
    pub fn add_row(self, acc: &mut Row, row: &Row) {
        match self.0 {
            Kind::Scalar => add_row_scalar(acc, row),
            // SAFETY: the variant only exists after the CPU feature was detected
            #[cfg(target_arch = "x86_64")]
            Kind::Sse2 => unsafe { add_row_sse2(acc, row) },
            #[cfg(target_arch = "x86_64")]
            Kind::Avx2 => unsafe { add_row_avx2(acc, row) },
            #[cfg(target_arch = "x86_64")]
            Kind::Avx512 => unsafe { add_row_avx512(acc, row) },
            #[cfg(target_arch = "aarch64")]
            Kind::Neon => unsafe { add_row_neon(acc, row) },
        }
    }

    /// `acc -= row`, wrapping per lane.
    #[inline]
    pub fn sub_row(self, acc: &mut Row, row: &Row) {
        match self.0 {
            Kind::Scalar => sub_row_scalar(acc, row),
            // SAFETY: the variant only exists after the CPU feature was detected
            #[cfg(target_arch = "x86_64")]
            Kind::Sse2 => unsafe { sub_row_sse2(acc, row) },
            #[cfg(target_arch = "x86_64")]
            Kind::Avx2 => unsafe { sub_row_avx2(acc, row) },
            #[cfg(target_arch = "x86_64")]
            Kind::Avx512 => unsafe { sub_row_avx512(acc, row) },
            #[cfg(target_arch = "aarch64")]
            Kind::Neon => unsafe { sub_row_neon(acc, row) },
        }
    }

    /// Sum of `max(stm[i], 0) * w_stm[i] + max(xstm[i], 0) * w_xstm[i]`,
    /// accumulated in wrapping i32.
    #[inline]
    #[must_use]
    pub fn relu_dot(self, stm: &Row, xstm: &Row, w_stm: &Row, w_xstm: &Row) -> i32 {
        match self.0 {
            Kind::Scalar => relu_dot_scalar(stm, xstm, w_stm, w_xstm),
            // SAFETY: the variant only exists after the CPU feature was detected
            #[cfg(target_arch = "x86_64")]
            Kind::Sse2 => unsafe { relu_dot_sse2(stm, xstm, w_stm, w_xstm) },
            #[cfg(target_arch = "x86_64")]
            Kind::Avx2 => unsafe { relu_dot_avx2(stm, xstm, w_stm, w_xstm) },
            #[cfg(target_arch = "x86_64")]
            Kind::Avx512 => unsafe { relu_dot_avx512(stm, xstm, w_stm, w_xstm) },
            #[cfg(target_arch = "aarch64")]
            Kind::Neon => unsafe { relu_dot_neon(stm, xstm, w_stm, w_xstm) },
        }
    }
}

impl fmt::Debug for SimdBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SimdBackend({})", self.name())
    }
}

impl fmt::Display for SimdBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Scalar implementations
// ============================================================================

#[inline]
fn add_row_scalar(acc: &mut Row, row: &Row) {
    for (a, &w) in acc.iter_mut().zip(row) {
        *a = a.wrapping_add(w);
    }
}

#[inline]
fn sub_row_scalar(acc: &mut Row, row: &Row) {
    for (a, &w) in acc.iter_mut().zip(row) {
        *a = a.wrapping_sub(w);
    }
}

#[inline]
fn relu_dot_scalar(stm: &Row, xstm: &Row, w_stm: &Row, w_xstm: &Row) -> i32 {
    let mut sum = 0i32;
    for i in 0..HIDDEN_SIZE {
        // |i16 * i16| < 2^31, so only the running sum can wrap
        sum = sum.wrapping_add(i32::from(stm[i].max(0)) * i32::from(w_stm[i]));
        sum = sum.wrapping_add(i32::from(xstm[i].max(0)) * i32::from(w_xstm[i]));
    }
    sum
}

// ============================================================================
// SSE2 implementations (x86_64 baseline)
// ============================================================================

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "sse2")]
unsafe fn add_row_sse2(acc: &mut Row, row: &Row) {
    use std::arch::x86_64::*;

    let acc_ptr = acc.as_mut_ptr();
    let row_ptr = row.as_ptr();

    for i in (0..HIDDEN_SIZE).step_by(8) {
        let a = _mm_loadu_si128(acc_ptr.add(i) as *const __m128i);
        let w = _mm_loadu_si128(row_ptr.add(i) as *const __m128i);
        _mm_storeu_si128(acc_ptr.add(i) as *mut __m128i, _mm_add_epi16(a, w));
    }
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "sse2")]
unsafe fn sub_row_sse2(acc: &mut Row, row: &Row) {
    use std::arch::x86_64::*;

    let acc_ptr = acc.as_mut_ptr();
    let row_ptr = row.as_ptr();

    for i in (0..HIDDEN_SIZE).step_by(8) {
        let a = _mm_loadu_si128(acc_ptr.add(i) as *const __m128i);
        let w = _mm_loadu_si128(row_ptr.add(i) as *const __m128i);
        _mm_storeu_si128(acc_ptr.add(i) as *mut __m128i, _mm_sub_epi16(a, w));
    }
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "sse2")]
unsafe fn relu_dot_sse2(stm: &Row, xstm: &Row, w_stm: &Row, w_xstm: &Row) -> i32 {
    use std::arch::x86_64::*;

    let zero = _mm_setzero_si128();
    let mut sum = _mm_setzero_si128();

    for (acc, weights) in [(stm, w_stm), (xstm, w_xstm)] {
        let acc_ptr = acc.as_ptr();
        let weights_ptr = weights.as_ptr();
        for i in (0..HIDDEN_SIZE).step_by(8) {
            let a = _mm_loadu_si128(acc_ptr.add(i) as *const __m128i);
            let w = _mm_loadu_si128(weights_ptr.add(i) as *const __m128i);
            // Activations are non-negative, so each pair sum fits in i32
            let prod = _mm_madd_epi16(_mm_max_epi16(a, zero), w);
            sum = _mm_add_epi32(sum, prod);
        }
    }

    let mut lanes = [0i32; 4];
    _mm_storeu_si128(lanes.as_mut_ptr() as *mut __m128i, sum);
    lanes.iter().fold(0i32, |total, &lane| total.wrapping_add(lane))
}

// ============================================================================
// AVX2 implementations (x86_64)
// ============================================================================

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
unsafe fn add_row_avx2(acc: &mut Row, row: &Row) {
    use std::arch::x86_64::*;

    let acc_ptr = acc.as_mut_ptr();
    let row_ptr = row.as_ptr();

    for i in (0..HIDDEN_SIZE).step_by(16) {
        let a = _mm256_loadu_si256(acc_ptr.add(i) as *const __m256i);
        let w = _mm256_loadu_si256(row_ptr.add(i) as *const __m256i);
        _mm256_storeu_si256(acc_ptr.add(i) as *mut __m256i, _mm256_add_epi16(a, w));
    }
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
unsafe fn sub_row_avx2(acc: &mut Row, row: &Row) {
    use std::arch::x86_64::*;

    let acc_ptr = acc.as_mut_ptr();
    let row_ptr = row.as_ptr();

    for i in (0..HIDDEN_SIZE).step_by(16) {
        let a = _mm256_loadu_si256(acc_ptr.add(i) as *const __m256i);
        let w = _mm256_loadu_si256(row_ptr.add(i) as *const __m256i);
        _mm256_storeu_si256(acc_ptr.add(i) as *mut __m256i, _mm256_sub_epi16(a, w));
    }
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
unsafe fn relu_dot_avx2(stm: &Row, xstm: &Row, w_stm: &Row, w_xstm: &Row) -> i32 {
    use std::arch::x86_64::*;

    let zero = _mm256_setzero_si256();
    let mut sum = _mm256_setzero_si256();

    for (acc, weights) in [(stm, w_stm), (xstm, w_xstm)] {
        let acc_ptr = acc.as_ptr();
        let weights_ptr = weights.as_ptr();
        for i in (0..HIDDEN_SIZE).step_by(16) {
            let a = _mm256_loadu_si256(acc_ptr.add(i) as *const __m256i);
            let w = _mm256_loadu_si256(weights_ptr.add(i) as *const __m256i);
            let prod = _mm256_madd_epi16(_mm256_max_epi16(a, zero), w);
            sum = _mm256_add_epi32(sum, prod);
        }
    }

    let mut lanes = [0i32; 8];
    _mm256_storeu_si256(lanes.as_mut_ptr() as *mut __m256i, sum);
    lanes.iter().fold(0i32, |total, &lane| total.wrapping_add(lane))
}

// ============================================================================
// AVX-512 implementations (x86_64)
// ============================================================================

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx512f,avx512bw")]
unsafe fn add_row_avx512(acc: &mut Row, row: &Row) {
    use std::arch::x86_64::*;

    let acc_ptr = acc.as_mut_ptr();
    let row_ptr = row.as_ptr();

    for i in (0..HIDDEN_SIZE).step_by(32) {
        let a = _mm512_loadu_epi16(acc_ptr.add(i));
        let w = _mm512_loadu_epi16(row_ptr.add(i));
        _mm512_storeu_epi16(acc_ptr.add(i), _mm512_add_epi16(a, w));
    }
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx512f,avx512bw")]
unsafe fn sub_row_avx512(acc: &mut Row, row: &Row) {
    use std::arch::x86_64::*;

    let acc_ptr = acc.as_mut_ptr();
    let row_ptr = row.as_ptr();

    for i in (0..HIDDEN_SIZE).step_by(32) {
        let a = _mm512_loadu_epi16(acc_ptr.add(i));
        let w = _mm512_loadu_epi16(row_ptr.add(i));
        _mm512_storeu_epi16(acc_ptr.add(i), _mm512_sub_epi16(a, w));
    }
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx512f,avx512bw")]
unsafe fn relu_dot_avx512(stm: &Row, xstm: &Row, w_stm: &Row, w_xstm: &Row) -> i32 {
    use std::arch::x86_64::*;

    let zero = _mm512_setzero_si512();
    let mut sum = _mm512_setzero_si512();

    for (acc, weights) in [(stm, w_stm), (xstm, w_xstm)] {
        let acc_ptr = acc.as_ptr();
        let weights_ptr = weights.as_ptr();
        for i in (0..HIDDEN_SIZE).step_by(32) {
            let a = _mm512_loadu_epi16(acc_ptr.add(i));
            let w = _mm512_loadu_epi16(weights_ptr.add(i));
            let prod = _mm512_madd_epi16(_mm512_max_epi16(a, zero), w);
            sum = _mm512_add_epi32(sum, prod);
        }
    }

    let mut lanes = [0i32; 16];
    _mm512_storeu_epi32(lanes.as_mut_ptr(), sum);
    lanes.iter().fold(0i32, |total, &lane| total.wrapping_add(lane))
}

// ============================================================================
// NEON implementations (aarch64)
// ============================================================================

#[cfg(target_arch = "aarch64")]
#[target_feature(enable = "neon")]
unsafe fn add_row_neon(acc: &mut Row, row: &Row) {
    use std::arch::aarch64::{vaddq_s16, vld1q_s16, vst1q_s16};

    let acc_ptr = acc.as_mut_ptr();
    let row_ptr = row.as_ptr();

    for i in (0..HIDDEN_SIZE).step_by(8) {
        let a = vld1q_s16(acc_ptr.add(i));
        let w = vld1q_s16(row_ptr.add(i));
        vst1q_s16(acc_ptr.add(i), vaddq_s16(a, w));
    }
}

#[cfg(target_arch = "aarch64")]
#[target_feature(enable = "neon")]
unsafe fn sub_row_neon(acc: &mut Row, row: &Row) {
    use std::arch::aarch64::{vld1q_s16, vst1q_s16, vsubq_s16};

    let acc_ptr = acc.as_mut_ptr();
    let row_ptr = row.as_ptr();

    for i in (0..HIDDEN_SIZE).step_by(8) {
        let a = vld1q_s16(acc_ptr.add(i));
        let w = vld1q_s16(row_ptr.add(i));
        vst1q_s16(acc_ptr.add(i), vsubq_s16(a, w));
    }
}

#[cfg(target_arch = "aarch64")]
#[target_feature(enable = "neon")]
unsafe fn relu_dot_neon(stm: &Row, xstm: &Row, w_stm: &Row, w_xstm: &Row) -> i32 {
    use std::arch::aarch64::{
        vaddvq_s32, vdupq_n_s16, vdupq_n_s32, vget_low_s16, vld1q_s16, vmaxq_s16,
        vmlal_high_s16, vmlal_s16,
    };

    let zero = vdupq_n_s16(0);
    let mut sum = vdupq_n_s32(0);

    for (acc, weights) in [(stm, w_stm), (xstm, w_xstm)] {
        let acc_ptr = acc.as_ptr();
        let weights_ptr = weights.as_ptr();
        for i in (0..HIDDEN_SIZE).step_by(8) {
            let a = vmaxq_s16(vld1q_s16(acc_ptr.add(i)), zero);
            let w = vld1q_s16(weights_ptr.add(i));
            sum = vmlal_s16(sum, vget_low_s16(a), vget_low_s16(w));
            sum = vmlal_high_s16(sum, a, w);
        }
    }

    vaddvq_s32(sum)
}
