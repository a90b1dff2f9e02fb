use std::path::PathBuf;

use clap::builder::BoolishValueParser;
use clap::{ArgAction, Args};

use crate::engine::ChildOrdering;

/// Operator tool settings. Each flag falls back to its `BEDRATE_*` environment variable.
#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct Config {
    /// Price-list document to read and update
    #[arg(long, env = "BEDRATE_FILE", default_value = "./pricelist.json", global = true)]
    pub file: PathBuf,
    /// Price every ordering of the children separately
    #[arg(
        long,
        env = "BEDRATE_PERMUTATIONS",
        value_parser = BoolishValueParser::new(),
        global = true
    )]
    pub permutations: bool,
    /// Pretty-print JSON written to stdout and to the document
    #[arg(
        long,
        env = "BEDRATE_PRETTY",
        default_value_t = true,
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new(),
        global = true
    )]
    pub pretty: bool,
}

impl Config {
    pub fn ordering(&self) -> ChildOrdering {
        if self.permutations {
            ChildOrdering::Permutations
        } else {
            ChildOrdering::Combinations
        }
    }
}
