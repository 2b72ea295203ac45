//! Engine controller owning the options and the shared network.

use std::path::Path;
use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;

use super::options::{parse_setoption, EngineOptions, OptionAction};
use crate::board::{evaluate, Board, NetworkError, NnueNetwork};

/// Weight files tried, in order, when no `EvalFile` is configured.
const DEFAULT_NNUE_PATHS: &[&str] = &["default.nnue", "nets/default.nnue"];

/// Seed of the stand-in network used when no weight file can be found.
pub const SYNTHETIC_NETWORK_SEED: u64 = 0x5eed;

/// Engine controller managing options and the network shared by workers.
///
/// Workers receive `Arc` clones of the network. Replacing it needs
/// `&mut self`, so no reload can happen while a worker scope borrows the
/// controller.
pub struct EngineController {
    options: EngineOptions,
    network: Arc<NnueNetwork>,
}

impl EngineController {
    /// Create a controller and load the network `options` point to.
    ///
    /// Without an `EvalFile` the default paths are tried, then a synthetic
    /// network is used.
    pub fn new(options: EngineOptions) -> Result<Self, NetworkError> {
        let network = Self::load_network(&options)?;
        Ok(EngineController {
            options,
            network: Arc::new(network),
        })
    }

    /// Create a controller around an already loaded network.
    #[must_use]
    pub fn with_network(options: EngineOptions, network: NnueNetwork) -> Self {
        EngineController {
            options,
            network: Arc::new(network),
        }
    }

    fn load_network(options: &EngineOptions) -> Result<NnueNetwork, NetworkError> {
        if let Some(path) = &options.eval_file {
            return NnueNetwork::load(path, options.magic_policy);
        }
        for path in DEFAULT_NNUE_PATHS {
            if Path::new(path).exists() {
                match NnueNetwork::load(path, options.magic_policy) {
                    Ok(network) => return Ok(network),
                    Err(err) => log::warn!("Skipping {path}: {err}"),
                }
            }
        }
        log::warn!("No EvalFile configured; using synthetic network weights");
        NnueNetwork::synthetic(SYNTHETIC_NETWORK_SEED)
    }

    #[must_use]
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// A handle to the current network for a worker thread.
    #[must_use]
    pub fn network(&self) -> Arc<NnueNetwork> {
        Arc::clone(&self.network)
    }

    /// Reload the network from the configured file.
    ///
    /// On failure the previous network stays in use.
    pub fn reload_network(&mut self) -> Result<(), NetworkError> {
        let network = Self::load_network(&self.options)?;
        self.network = Arc::new(network);
        Ok(())
    }

    /// Apply one option and reload the network if it requires it.
    pub fn setoption(&mut self, name: &str, value: Option<&str>) -> Result<(), NetworkError> {
        match self.options.apply_setoption(name, value) {
            Some(OptionAction::ReloadNetwork) => self.reload_network(),
            None => Ok(()),
        }
    }

    /// Handle a raw `setoption name ... value ...` line.
    ///
    /// Returns `Ok(false)` when the line is not a well-formed `setoption`.
    pub fn handle_setoption_line(&mut self, line: &str) -> Result<bool, NetworkError> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some((name, value)) = parse_setoption(&parts) else {
            return Ok(false);
        };
        self.setoption(&name, value.as_deref())?;
        Ok(true)
    }

    /// Configure `board` for a search from its current side to move.
    ///
    /// Contempt favors the side to move at the root. Cached accumulators
    /// are dropped since they may come from another network.
    pub fn prepare_board(&self, board: &mut Board) {
        let root = board.side_to_move();
        board.set_contempt(self.options.contempt, root);
        board.set_chess960(self.options.chess960);
        board.reset_accumulators();
    }

    /// Evaluate one position with the current network.
    pub fn evaluate(&self, board: &mut Board) -> i32 {
        evaluate(board, &self.network)
    }

    /// Evaluate `boards` on up to `threads` scoped workers.
    ///
    /// Scores are returned in input order.
    pub fn evaluate_parallel(&self, boards: &mut [Board], threads: usize) -> Vec<i32> {
        if boards.is_empty() {
            return Vec::new();
        }
        let threads = threads.clamp(1, boards.len());
        let chunk_size = boards.len().div_ceil(threads);
        let results = Mutex::new(vec![0; boards.len()]);

        thread::scope(|scope| {
            for (chunk_index, chunk) in boards.chunks_mut(chunk_size).enumerate() {
                let network = self.network();
                let results = &results;
                scope.spawn(move || {
                    let scores: Vec<i32> = chunk
                        .iter_mut()
                        .map(|board| evaluate(board, &network))
                        .collect();
                    let start = chunk_index * chunk_size;
                    results.lock()[start..start + scores.len()].copy_from_slice(&scores);
                });
            }
        });

        results.into_inner()
    }
}

impl std::fmt::Debug for EngineController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineController")
            .field("options", &self.options)
            .field("network", &self.network)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Color, MagicPolicy};

    fn controller() -> EngineController {
        EngineController::with_network(EngineOptions::new(), NnueNetwork::synthetic(3).unwrap())
    }

    #[test]
    fn test_prepare_board_applies_options() {
        let mut controller = controller();
        controller.setoption("Contempt", Some("20")).unwrap();
        controller.setoption("UCI_Chess960", Some("true")).unwrap();

        let mut board = Board::from_fen("4k3/8/8/8/8/8/4P3/4K3 b - - 0 1");
        controller.prepare_board(&mut board);
        assert_eq!(board.contempt_for(Color::Black), 20);
        assert_eq!(board.contempt_for(Color::White), -20);
        assert!(board.is_chess960());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let controller = controller();
        let fens = [
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "8/8/8/3k4/8/3K4/8/R7 b - - 0 1",
            "4k3/8/8/8/8/8/8/4KN2 w - - 0 1",
            "r1bq1rk1/pp2bppp/2n1pn2/3p4/2PP4/2N1PN2/PP3PPP/R2QKB1R b KQ - 0 8",
        ];
        let mut boards: Vec<Board> = fens.iter().map(|f| Board::from_fen(f)).collect();
        let expected: Vec<i32> = fens
            .iter()
            .map(|f| controller.evaluate(&mut Board::from_fen(f)))
            .collect();

        for threads in [1, 2, 3, 8] {
            assert_eq!(controller.evaluate_parallel(&mut boards, threads), expected);
        }
        assert!(controller.evaluate_parallel(&mut [], 4).is_empty());
    }

    #[test]
    fn test_failed_reload_keeps_previous_network() {
        let mut controller = controller();
        let before = controller.network();
        let result = controller.setoption("EvalFile", Some("/nonexistent/net.nnue"));
        assert!(matches!(result, Err(NetworkError::Io(_))));
        assert!(Arc::ptr_eq(&before, &controller.network()));
    }

    #[test]
    fn test_reload_from_file() {
        let path = std::env::temp_dir()
            .join(format!("chess_eval_reload_{}.nnue", std::process::id()));
        std::fs::write(&path, NnueNetwork::synthetic_blob(41)).unwrap();

        let mut controller = controller();
        let line = format!("setoption name EvalFile value {}", path.display());
        assert!(controller.handle_setoption_line(&line).unwrap());
        assert_eq!(controller.network().hash(), 41);
        assert!(!controller.handle_setoption_line("isready").unwrap());

        std::fs::write(&path, b"XXXX").unwrap();
        assert!(controller.setoption("StrictNetMagic", Some("true")).is_err());
        assert_eq!(controller.options().magic_policy, MagicPolicy::Strict);
        assert_eq!(controller.network().hash(), 41);
        let _ = std::fs::remove_file(&path);
    }
}
