//! Plugins bundled with the bot.

pub mod builtin;
pub mod factoids;
pub mod triggers;

pub use builtin::CorePlugin;
pub use factoids::FactoidPlugin;
pub use triggers::TriggerPlugin;
