//! Runtime configuration, read from the environment.

use std::path::PathBuf;

const DEFAULT_INPUT_DIR: &str = "boards";
const DEFAULT_OUTPUT_DIR: &str = "generated";

/// Where to read definitions from and where to put artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory scanned for `*.json` definitions when no manifest is given
    pub input_dir: PathBuf,
    /// Directory artifacts are written to
    pub output_dir: PathBuf,
    /// Optional JSON manifest mapping board names to definition files
    pub manifest: Option<PathBuf>,
    /// Optional path for the JSON run report
    pub report: Option<PathBuf>,
    /// Board names to generate; empty means all
    pub only: Vec<String>,
}

impl Config {
    /// Read `BOARDGEN_*` variables and take board names from the command line
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok(), std::env::args().skip(1))
    }

    fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
        args: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            input_dir: lookup("BOARDGEN_INPUT_DIR")
                .unwrap_or_else(|| DEFAULT_INPUT_DIR.into())
                .into(),
            output_dir: lookup("BOARDGEN_OUTPUT_DIR")
                .unwrap_or_else(|| DEFAULT_OUTPUT_DIR.into())
                .into(),
            manifest: lookup("BOARDGEN_MANIFEST").map(PathBuf::from),
            report: lookup("BOARDGEN_REPORT").map(PathBuf::from),
            only: args.into_iter().filter(|a| !a.is_empty()).collect(),
        }
    }
}
