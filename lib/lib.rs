//! Netuse is a bit-level use/set analysis for hierarchical hardware designs.
//!
//! For every individual bit of every wire in every module, netuse determines
//! whether the bit is ever read ("used"), ever driven ("set"), and whether
//! declared port directions are honored across module-instance boundaries.
//!
//! The crate is split into two halves:
//!
//! * [`il`] defines the hardware-design intermediate representation the
//!   analysis consumes: modules, ports, declarations, expressions, statements,
//!   gate and module instances, and the wire alists that expand multi-bit
//!   wires into ordered lists of per-bit identifiers.
//! * [`analysis`] implements the analysis itself: the per-bit flag set, the
//!   per-module bit database, the marking engine, the port/instance resolver,
//!   the two-pass dependency-ordered driver, and the classifier that turns
//!   final databases into diagnostics.
//!
//! The analysis is syntactic and best-effort. It can be fooled by pathological
//! constructs (`assign foo = foo;` looks both used and set), and it degrades
//! locally with warnings rather than aborting when collaborator data is
//! missing or malformed. A single malformed module never aborts the analysis
//! of the rest of the design.

pub mod analysis;
pub mod il;

mod error;
#[cfg(test)]
mod tests;

pub use crate::error::Error;
