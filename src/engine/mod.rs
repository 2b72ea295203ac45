//! Engine shell: evaluation options and the network shared by worker threads.

mod controller;
mod options;

pub use controller::{EngineController, SYNTHETIC_NETWORK_SEED};
pub use options::{parse_setoption, EngineOptions, OptionAction, CONTEMPT_RANGE};
