#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]

pub const CODEQUEST_VERSION: &str = env!("CARGO_PKG_VERSION");

// Interpreter and level state
pub mod completion;
pub mod error;
pub mod events;
pub mod exec;
pub mod grammar;
pub mod schedule;
pub mod session;
pub mod variables;
pub mod world;

// Progression, configuration and front end
pub mod campaign;
pub mod command;
mod data_paths;
pub mod loader;
pub mod repl;
pub mod settings;
pub mod style;
pub mod view;

// Re-exports for convenience
pub use campaign::{Campaign, Progress};
pub use error::{ExecError, SessionError};
pub use events::{EventSink, LevelEvent};
pub use grammar::LevelGrammar;
pub use loader::{builtin_catalog, load_catalog};
pub use repl::run_repl;
pub use session::{LevelSession, LevelStatus, RunReport, RunStep, RunTicket};
pub use settings::EngineSettings;
pub use world::{WorldSnapshot, WorldState};
