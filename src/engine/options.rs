//! UCI-style engine options that affect evaluation.

use std::path::PathBuf;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::board::MagicPolicy;

/// Bounds for the `Contempt` option, in centipawns.
pub const CONTEMPT_RANGE: (i32, i32) = (-100, 100);

/// Follow-up work an option change requires from the controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OptionAction {
    /// The weight file or its loading policy changed.
    ReloadNetwork,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EngineOptions {
    /// Bonus for the side the engine plays, applied to every evaluation.
    pub contempt: i32,
    /// Positions come from shuffled starting setups.
    pub chess960: bool,
    /// Weight file; `None` falls back to the default search paths.
    pub eval_file: Option<PathBuf>,
    pub magic_policy: MagicPolicy,
}

impl EngineOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The `option name ...` lines announced in reply to `uci`.
    #[must_use]
    pub fn describe(&self) -> Vec<String> {
        let (min, max) = CONTEMPT_RANGE;
        vec![
            format!(
                "option name Contempt type spin default {} min {min} max {max}",
                self.contempt
            ),
            format!(
                "option name UCI_Chess960 type check default {}",
                self.chess960
            ),
            format!(
                "option name EvalFile type string default {}",
                self.eval_file
                    .as_ref()
                    .map_or_else(|| "<empty>".to_string(), |p| p.display().to_string())
            ),
            format!(
                "option name StrictNetMagic type check default {}",
                self.magic_policy == MagicPolicy::Strict
            ),
        ]
    }

    /// Apply one `setoption`. Unknown names and unparsable values are ignored.
    pub fn apply_setoption(&mut self, name: &str, value: Option<&str>) -> Option<OptionAction> {
        let normalized = name.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "contempt" => {
                if let Some(v) = value.and_then(|v| v.trim().parse::<i32>().ok()) {
                    self.contempt = v.clamp(CONTEMPT_RANGE.0, CONTEMPT_RANGE.1);
                }
            }
            "uci_chess960" => {
                if let Some(v) = value {
                    self.chess960 = parse_check(v);
                }
            }
            "evalfile" => {
                let path = value
                    .map(str::trim)
                    .filter(|v| !v.is_empty() && *v != "<empty>")
                    .map(PathBuf::from);
                if path != self.eval_file {
                    self.eval_file = path;
                    return Some(OptionAction::ReloadNetwork);
                }
            }
            "strictnetmagic" => {
                if let Some(v) = value {
                    let policy = if parse_check(v) {
                        MagicPolicy::Strict
                    } else {
                        MagicPolicy::Warn
                    };
                    if policy != self.magic_policy {
                        self.magic_policy = policy;
                        return Some(OptionAction::ReloadNetwork);
                    }
                }
            }
            _ => log::debug!("ignoring unknown option {name:?}"),
        }
        None
    }
}

fn parse_check(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1")
}

/// Split `setoption name <name> value <value>` into its name and value.
#[must_use]
pub fn parse_setoption(parts: &[&str]) -> Option<(String, Option<String>)> {
    if parts.is_empty() || parts[0] != "setoption" {
        return None;
    }

    let mut name_parts: Vec<&str> = Vec::new();
    let mut value_parts: Vec<&str> = Vec::new();
    let mut mode = "";

    for part in parts.iter().skip(1) {
        match *part {
            "name" => mode = "name",
            "value" => mode = "value",
            _ => match mode {
                "name" => name_parts.push(part),
                "value" => value_parts.push(part),
                _ => {}
            },
        }
    }

    if name_parts.is_empty() {
        return None;
    }

    let name = name_parts.join(" ");
    let value = if value_parts.is_empty() {
        None
    } else {
        Some(value_parts.join(" "))
    };

    Some((name, value))
}
