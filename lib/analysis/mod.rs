//! Bit-level use/set analysis.
//!
//! The analysis answers, for every bit of every wire in a hierarchical
//! design, whether that bit is ever read and whether it is ever driven. It
//! runs in two passes over an externally supplied dependency order: pass 1
//! walks leaf modules first and builds a per-module [`BitDatabase`] from the
//! module's own constructs and the finished databases of its submodules;
//! pass 2 walks the exact reverse order and pushes used/set-from-above
//! facts recorded as [`Note`]s down into submodule databases. Classification
//! then folds each bit's flags into a diagnostic.
//!
//! Nothing a malformed module does halts the analysis. Anything that cannot
//! be handled degrades to a [`Warning`] attached to the module.

mod classify;
mod database;
mod driver;
mod flags;
mod mark;
mod resolve;
mod warning;

pub use self::classify::UseClass;
pub use self::database::{BitDatabase, DatabaseTable};
pub use self::driver::{use_set_analysis, UseSetAnalysis};
pub use self::flags::UseSet;
pub use self::mark::Marker;
pub use self::resolve::Note;
pub(crate) use self::resolve::resolve_instance;
pub use self::warning::{Warning, WarningKind};
