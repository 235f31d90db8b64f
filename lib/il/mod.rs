//! The hardware-design intermediate representation consumed by the analysis.
//!
//! The IR is produced by external collaborators: a parser builds the module
//! structure, a declaration expander builds each module's [`WireAlist`], and
//! an elaborator resolves named instance connections and gate argument
//! directions. The analysis consumes the result read-only.
//!
//! # Components
//!
//! * [`Bit`] is one bit of one wire, the unit of analysis. Identity only.
//! * [`WireAlist`] maps a wire name to its msb-first bit list, per module.
//! * [`Expression`] covers assignment sides, conditions, and connections.
//!   The analysis only asks which bits an expression reads
//!   ([`Expression::source_bits`]) and, for lvalues, which bits it addresses
//!   ([`Expression::lvalue_bits`]).
//! * [`Statement`] and [`Procedural`] form the procedural subset the marking
//!   engine walks.
//! * [`Gate`] and [`Instance`] are primitive gates with resolved argument
//!   directions and submodule instances with ordered connections.
//! * [`Module`] and [`Design`] are the per-module container and the
//!   design-wide collection.
//!
//! Everything here is plain data with accessor methods; no IR type performs
//! analysis on its own.

mod bit;
mod declaration;
mod design;
mod expression;
mod gate;
mod instance;
mod module;
mod port;
mod statement;
mod wire;

pub use self::bit::Bit;
pub use self::declaration::{NetDeclaration, NetKind, PortDeclaration};
pub use self::design::Design;
pub use self::expression::{BinaryOp, Expression, UnaryOp};
pub use self::gate::{Gate, GateArg, GateArgDirection, GateKind};
pub use self::instance::{Connection, Instance};
pub use self::module::Module;
pub use self::port::{Direction, Port};
pub use self::statement::{Assign, CaseArm, Procedural, Statement};
pub use self::wire::WireAlist;

/// A convenience function to create a whole-wire expression.
pub fn expr_wire<S>(name: S) -> Expression
where
    S: Into<String>,
{
    Expression::wire(name)
}

/// A convenience function to create a constant expression.
pub fn expr_const(value: u64, bits: usize) -> Expression {
    Expression::constant(value, bits)
}
