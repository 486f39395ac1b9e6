//! Post-tag command support
//!
//! After the tag exists, a user configured shell command (`posttagaction`)
//! can run with the tag's values available as placeholders and environment.

pub mod executor;
pub mod lifecycle;

pub use executor::{CommandExecutor, CommandOutput};
pub use lifecycle::HookContext;
