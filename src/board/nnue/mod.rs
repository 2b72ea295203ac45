//! NNUE (Efficiently Updatable Neural Network) evaluation.
//!
//! Provides neural network based position evaluation with:
//! - King-bucketed, horizontally folded input features
//! - Incremental accumulator updates kept per search ply
//! - SIMD kernels (SSE2/AVX2/NEON) that agree bit for bit with scalar code
//!
//! Architecture: (1536 -> 256) x 2 perspectives -> 1

pub mod accumulator;
pub mod features;
pub mod network;
pub mod simd;

pub use accumulator::{Accumulator, AccumulatorHistory, PieceSquare, UpdateRecord};
pub use features::{feature_index, king_bucket, king_bucket_changed, N_FEATURES};
pub use network::{MagicPolicy, NnueNetwork, HIDDEN_SIZE, NETWORK_BYTES, NETWORK_MAGIC};
pub use simd::SimdBackend;

/// Quantization precision of feature weights and biases
pub const QUANT_IN: i32 = 32;

/// Quantization precision of output weights and bias
pub const QUANT_OUT: i32 = 512;
