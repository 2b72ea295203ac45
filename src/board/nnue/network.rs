//! NNUE network weights, loading and inference.
//!
//! Implements a 1536 -> 256 -> 1 architecture with:
//! - One shared feature transformer applied to both perspectives
//! - Incremental accumulator updates driven by [`UpdateRecord`]s
//! - `ReLU` activation fused into the output layer
//!
//! # Weight file layout
//! A 4-byte magic tag, an 8-byte little-endian hash, then little-endian f32
//! values in this order: feature weights (feature-major), feature biases,
//! output weights (side to move half first), output bias.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::accumulator::{Accumulator, UpdateRecord};
use super::features::{feature_index, N_FEATURES};
use super::simd::{Row, SimdBackend};
use super::{QUANT_IN, QUANT_OUT};
use crate::board::error::NetworkError;
use crate::board::{Board, Color, Square};

/// Hidden layer size (must match trained network)
pub const HIDDEN_SIZE: usize = 256;

/// Tag expected at the start of every weight file.
pub const NETWORK_MAGIC: [u8; 4] = *b"BRKR";

const HEADER_BYTES: usize = 12;

/// Number of f32 values following the header.
pub const NETWORK_FLOATS: usize = N_FEATURES * HIDDEN_SIZE + HIDDEN_SIZE + 2 * HIDDEN_SIZE + 1;

/// Exact size of a complete weight file.
pub const NETWORK_BYTES: usize = HEADER_BYTES + 4 * NETWORK_FLOATS;

/// What to do when a weight file starts with the wrong tag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MagicPolicy {
    /// Log a warning and keep loading.
    #[default]
    Warn,
    /// Refuse the file with [`NetworkError::BadMagic`].
    Strict,
}

/// Quantized NNUE network weights
#[derive(Clone, PartialEq, Eq)]
pub struct NnueNetwork {
    /// Feature transformer weights `[N_FEATURES][HIDDEN_SIZE]`
    pub(crate) feature_weights: Box<[Row]>,
    /// Feature transformer biases
    pub(crate) feature_bias: Row,
    /// Output weights; `[0]` applies to the side to move
    pub(crate) output_weights: [Row; 2],
    /// Output bias, quantized at the output precision
    pub(crate) output_bias: i32,
    hash: u64,
    magic_ok: bool,
}

struct BlobReader<R> {
    inner: R,
    consumed: usize,
}

impl<R: Read> BlobReader<R> {
    fn fill(&mut self, buf: &mut [u8]) -> Result<(), NetworkError> {
        match self.inner.read_exact(buf) {
            Ok(()) => {
                self.consumed += buf.len();
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => {
                Err(NetworkError::Truncated {
                    expected: NETWORK_BYTES,
                    found: self.consumed,
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    fn next_f32(&mut self) -> Result<f32, NetworkError> {
        let mut buf = [0u8; 4];
        self.fill(&mut buf)?;
        Ok(f32::from_le_bytes(buf))
    }

    fn next_row(&mut self, precision: i32) -> Result<Row, NetworkError> {
        let mut row = [0i16; HIDDEN_SIZE];
        for elem in &mut row {
            *elem = quantize(self.next_f32()?, precision);
        }
        Ok(row)
    }
}

/// `round(value * precision)`, rounding half away from zero.
#[inline]
fn quantize(value: f32, precision: i32) -> i16 {
    (value * precision as f32).round() as i16
}

impl NnueNetwork {
    /// Load network from a weight file
    pub fn load<P: AsRef<Path>>(path: P, policy: MagicPolicy) -> Result<Self, NetworkError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let network = Self::from_reader(BufReader::new(file), policy)?;
        log::info!(
            "Loaded NNUE network {} (hash {:016x})",
            path.display(),
            network.hash
        );
        Ok(network)
    }

    /// Load network from a byte slice
    pub fn from_bytes(data: &[u8], policy: MagicPolicy) -> Result<Self, NetworkError> {
        Self::from_reader(data, policy)
    }

    /// Load network from any reader
    pub fn from_reader<R: Read>(reader: R, policy: MagicPolicy) -> Result<Self, NetworkError> {
        let mut blob = BlobReader {
            inner: reader,
            consumed: 0,
        };

        let mut magic = [0u8; 4];
        blob.fill(&mut magic)?;
        let magic_ok = magic == NETWORK_MAGIC;
        if !magic_ok {
            match policy {
                MagicPolicy::Strict => return Err(NetworkError::BadMagic { found: magic }),
                MagicPolicy::Warn => log::warn!(
                    "NNUE magic mismatch: expected {:?}, found {:?}; loading anyway",
                    String::from_utf8_lossy(&NETWORK_MAGIC),
                    String::from_utf8_lossy(&magic)
                ),
            }
        }

        let mut hash = [0u8; 8];
        blob.fill(&mut hash)?;
        let hash = u64::from_le_bytes(hash);

        let mut feature_weights = Vec::with_capacity(N_FEATURES);
        for _ in 0..N_FEATURES {
            feature_weights.push(blob.next_row(QUANT_IN)?);
        }
        let feature_bias = blob.next_row(QUANT_IN)?;
        let output_weights = [blob.next_row(QUANT_OUT)?, blob.next_row(QUANT_OUT)?];
        let output_bias = (blob.next_f32()? * QUANT_OUT as f32).round() as i32;

        Ok(Self {
            feature_weights: feature_weights.into_boxed_slice(),
            feature_bias,
            output_weights,
            output_bias,
            hash,
            magic_ok,
        })
    }

    /// Serialized weight file with deterministic pseudo-random weights.
    ///
    /// Used when no weight file is configured and by tests and benchmarks.
    #[must_use]
    pub fn synthetic_blob(seed: u64) -> Vec<u8> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut blob = Vec::with_capacity(NETWORK_BYTES);
        blob.extend_from_slice(&NETWORK_MAGIC);
        blob.extend_from_slice(&seed.to_le_bytes());

        let mut push = |blob: &mut Vec<u8>, count: usize, range: f32| {
            for _ in 0..count {
                let value: f32 = rng.gen_range(-range..range);
                blob.extend_from_slice(&value.to_le_bytes());
            }
        };
        push(&mut blob, N_FEATURES * HIDDEN_SIZE, 1.0);
        push(&mut blob, HIDDEN_SIZE, 2.0);
        push(&mut blob, 2 * HIDDEN_SIZE, 1.0);
        push(&mut blob, 1, 0.5);

        debug_assert_eq!(blob.len(), NETWORK_BYTES);
        blob
    }

    /// Network built from [`NnueNetwork::synthetic_blob`].
    pub fn synthetic(seed: u64) -> Result<Self, NetworkError> {
        Self::from_bytes(&Self::synthetic_blob(seed), MagicPolicy::Strict)
    }

    /// Hash stored in the weight file header.
    #[must_use]
    pub const fn hash(&self) -> u64 {
        self.hash
    }

    /// False when the file was accepted despite a wrong magic tag.
    #[must_use]
    pub const fn magic_ok(&self) -> bool {
        self.magic_ok
    }

    /// Accumulator for `perspective` computed from scratch.
    #[must_use]
    pub fn refresh(&self, board: &Board, perspective: Color) -> Accumulator {
        let backend = SimdBackend::active();
        let king = board.king_square(perspective);
        let mut acc = Accumulator(self.feature_bias);
        for (color, piece, sq) in board.piece_squares() {
            let idx = feature_index(perspective, color, piece, sq, king);
            backend.add_row(&mut acc.0, &self.feature_weights[idx]);
        }
        acc
    }

    /// Derive `out` from `prev` by applying `record`.
    ///
    /// A record without removals is a null move and copies `prev` verbatim.
    pub fn apply_update(
        &self,
        prev: &Accumulator,
        out: &mut Accumulator,
        record: &UpdateRecord,
        perspective: Color,
        king: Square,
    ) {
        out.0 = prev.0;
        if record.removals().is_empty() {
            return;
        }
        let backend = SimdBackend::active();
        for r in record.removals() {
            let idx = feature_index(perspective, r.color, r.piece, r.square, king);
            backend.sub_row(&mut out.0, &self.feature_weights[idx]);
        }
        for a in record.additions() {
            let idx = feature_index(perspective, a.color, a.piece, a.square, king);
            backend.add_row(&mut out.0, &self.feature_weights[idx]);
        }
    }

    /// Score in centipawns for the side owning `stm`.
    #[inline]
    #[must_use]
    pub fn forward(&self, stm: &Accumulator, xstm: &Accumulator) -> i32 {
        self.forward_with(SimdBackend::active(), stm, xstm)
    }

    /// [`NnueNetwork::forward`] on an explicit backend.
    #[must_use]
    pub fn forward_with(&self, backend: SimdBackend, stm: &Accumulator, xstm: &Accumulator) -> i32 {
        let dot = backend.relu_dot(
            &stm.0,
            &xstm.0,
            &self.output_weights[0],
            &self.output_weights[1],
        );
        let result = self.output_bias.wrapping_mul(QUANT_IN).wrapping_add(dot);
        result / QUANT_IN / QUANT_OUT
    }

    /// Evaluate a position from scratch, side-to-move relative.
    #[must_use]
    pub fn predict(&self, board: &Board) -> i32 {
        let stm = board.side_to_move();
        let us = self.refresh(board, stm);
        let them = self.refresh(board, stm.opponent());
        self.forward(&us, &them)
    }
}

impl std::fmt::Debug for NnueNetwork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NnueNetwork")
            .field("hash", &format_args!("{:016x}", self.hash))
            .field("magic_ok", &self.magic_ok)
            .field("output_bias", &self.output_bias)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_blob_has_exact_size() {
        assert_eq!(NnueNetwork::synthetic_blob(7).len(), NETWORK_BYTES);
    }

    #[test]
    fn test_loading_blob_matches_synthetic() {
        let blob = NnueNetwork::synthetic_blob(11);
        let loaded = NnueNetwork::from_bytes(&blob, MagicPolicy::Warn).unwrap();
        let synthetic = NnueNetwork::synthetic(11).unwrap();
        assert!(loaded == synthetic);
        assert_eq!(loaded.hash(), 11);
        assert!(loaded.magic_ok());
    }

    #[test]
    fn test_quantization_rounds_half_away_from_zero() {
        assert_eq!(quantize(0.5 / 32.0, 32), 1);
        assert_eq!(quantize(-0.5 / 32.0, 32), -1);
        assert_eq!(quantize(0.49 / 32.0, 32), 0);
        assert_eq!(quantize(1.0, 512), 512);
    }

    #[test]
    fn test_strict_policy_rejects_bad_magic() {
        let mut blob = NnueNetwork::synthetic_blob(3);
        blob[..4].copy_from_slice(b"XXXX");
        match NnueNetwork::from_bytes(&blob, MagicPolicy::Strict) {
            Err(NetworkError::BadMagic { found }) => assert_eq!(&found, b"XXXX"),
            other => panic!("expected BadMagic, got {other:?}"),
        }
    }

    #[test]
    fn test_warn_policy_loads_bad_magic() {
        let mut blob = NnueNetwork::synthetic_blob(3);
        blob[..4].copy_from_slice(b"XXXX");
        let network = NnueNetwork::from_bytes(&blob, MagicPolicy::Warn).unwrap();
        assert!(!network.magic_ok());
        let reference = NnueNetwork::synthetic(3).unwrap();
        assert!(network.feature_weights == reference.feature_weights);
        assert_eq!(network.output_bias, reference.output_bias);
    }

    #[test]
    fn test_truncated_blob_is_an_error() {
        let blob = NnueNetwork::synthetic_blob(5);
        let short = &blob[..blob.len() - 3];
        match NnueNetwork::from_bytes(short, MagicPolicy::Warn) {
            Err(NetworkError::Truncated { expected, found }) => {
                assert_eq!(expected, NETWORK_BYTES);
                assert!(found < NETWORK_BYTES);
            }
            other => panic!("expected Truncated, got {other:?}"),
        }
        assert!(matches!(
            NnueNetwork::from_bytes(&blob[..6], MagicPolicy::Warn),
            Err(NetworkError::Truncated { .. })
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = NnueNetwork::load("/nonexistent/dir/net.nnue", MagicPolicy::Warn);
        assert!(matches!(result, Err(NetworkError::Io(_))));
    }

    #[test]
    fn test_forward_truncates_toward_zero() {
        let mut network = NnueNetwork::synthetic(1).unwrap();
        network.output_weights = [[0; HIDDEN_SIZE]; 2];
        let zero = Accumulator([0; HIDDEN_SIZE]);

        network.output_bias = QUANT_OUT + QUANT_OUT / 2;
        assert_eq!(network.forward(&zero, &zero), 1);
        network.output_bias = -(QUANT_OUT + QUANT_OUT / 2);
        assert_eq!(network.forward(&zero, &zero), -1);
    }

    #[test]
    fn test_forward_backends_agree() {
        let network = NnueNetwork::synthetic(9).unwrap();
        let board = Board::new();
        let us = network.refresh(&board, Color::White);
        let them = network.refresh(&board, Color::Black);
        let expected = network.forward_with(SimdBackend::SCALAR, &us, &them);
        for backend in SimdBackend::available() {
            assert_eq!(network.forward_with(backend, &us, &them), expected);
        }
    }
}
