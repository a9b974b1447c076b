//! Open the EDITOR. Write some code. Have it executed.
//!
//! `runc` picks a language, seeds a scratch file with the last code run in
//! that language (or a starter snippet), opens the user's editor on it, and
//! once the editor closes compiles or interprets the file and shows what the
//! program printed.
//!
//! The entry point is [`session::run`]. Languages and the way each one is
//! built live in [`registry`]; the process pipelines that run them are in
//! [`strategy`].

pub mod editor;
pub mod env;
pub mod error;
pub mod external;
pub mod history;
pub mod logging;
pub mod picker;
pub mod registry;
pub mod render;
pub mod session;
pub mod snippets;
pub mod strategy;

pub use env::Environment;
pub use error::{RuncError, Status};
pub use external::RunResult;
pub use history::HistoryStore;
pub use session::SessionOptions;
