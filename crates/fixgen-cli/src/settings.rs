use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fixgen_generate::GenerateOptions;

use crate::CliError;

/// File looked up in the working directory when `--settings` is absent.
pub const DEFAULT_SETTINGS_FILE: &str = "fixgen.toml";

/// Optional defaults read from `fixgen.toml`; command-line flags win.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixgenSettings {
    pub rows: Option<usize>,
    pub seed: Option<u64>,
    pub anchor: Option<DateTime<Utc>>,
    pub quote: Option<char>,
    pub max_levels: Option<usize>,
    pub strict: Option<bool>,
    pub log_file: Option<PathBuf>,
}

impl FixgenSettings {
    pub fn apply(&self, options: &mut GenerateOptions) {
        if let Some(rows) = self.rows {
            options.rows = rows;
        }
        if let Some(seed) = self.seed {
            options.seed = seed;
        }
        if let Some(anchor) = self.anchor {
            options.anchor = Some(anchor);
        }
        if let Some(quote) = self.quote {
            options.quote = quote;
        }
        if let Some(max_levels) = self.max_levels {
            options.max_levels = max_levels;
        }
        if let Some(strict) = self.strict {
            options.strict = strict;
        }
    }
}

/// Read the explicit settings file, or `fixgen.toml` when present.
pub fn load_settings(explicit: Option<&Path>) -> Result<FixgenSettings, CliError> {
    let path = match explicit {
        Some(path) if !path.is_file() => {
            return Err(CliError::InvalidArgs(format!(
                "settings file not found: {}",
                path.display()
            )));
        }
        Some(path) => path.to_path_buf(),
        None => {
            let fallback = PathBuf::from(DEFAULT_SETTINGS_FILE);
            if !fallback.is_file() {
                return Ok(FixgenSettings::default());
            }
            fallback
        }
    };

    let content = std::fs::read_to_string(&path)?;
    parse_settings(&content)
}

pub fn parse_settings(content: &str) -> Result<FixgenSettings, CliError> {
    Ok(toml::from_str(content)?)
}
