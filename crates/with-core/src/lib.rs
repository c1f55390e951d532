//! With Core - Command resolution and invocation for the `with` launcher
//!
//! Contexts are plain shell scripts (`<name>.sh`) discovered on a search
//! path. The resolver maps a name to a script; the invoker launches it
//! through the intermediary launcher and tracks nesting depth across
//! re-entrant invocations.

pub mod completion;
pub mod config;
pub mod context;
pub mod depth;
pub mod error;
pub mod invoker;
pub mod paths;
pub mod privilege;
pub mod resolver;

pub use config::Config;
pub use context::ContextToken;
pub use depth::DepthCounter;
pub use error::{Result, WithError};
pub use invoker::{ArgMode, Invoker, LaunchPlan, Launcher};
pub use paths::Paths;
pub use resolver::{Command, Resolver, SearchPath};
