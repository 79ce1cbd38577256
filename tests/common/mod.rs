//! Integration test common infrastructure.
//!
//! Provides a fake IRC server for the bot to connect to and helpers for
//! building test configurations.

pub mod server;

#[allow(unused_imports)]
pub use server::{FakeServer, Peer};

use factbot::Config;
use std::path::Path;

/// Configuration pointing at a local server, with factoids in `factoids`.
#[allow(dead_code)]
pub fn config(port: u16, factoids: &Path) -> Config {
    Config::parse(&format!(
        r##"
channels = ["#test"]

[server]
host = "127.0.0.1"
port = {port}

[identity]
nick = "factbot"

[reply]
max_lines = 5

[factoids]
path = {path:?}

[[triggers]]
pattern = "(?i)\\bhello factbot\\b"
reply = "hello, {{nick}}"
"##,
        path = factoids.display().to_string(),
    ))
    .expect("test config is valid")
}
