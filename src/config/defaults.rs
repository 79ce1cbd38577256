//! Default value functions for configuration.

use std::path::PathBuf;

pub fn default_port() -> u16 {
    6667
}

pub fn default_max_lines() -> usize {
    5
}

pub fn default_max_line_len() -> usize {
    factbot_proto::MAX_LINE_LEN
}

pub fn default_factoid_path() -> PathBuf {
    PathBuf::from("factoids.json")
}

pub fn default_prefix() -> String {
    "!".to_string()
}
