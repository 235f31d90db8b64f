use crate::il::Expression;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A primitive gate kind.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum GateKind {
    And,
    Nand,
    Or,
    Nor,
    Xor,
    Xnor,
    Not,
    Buf,
    Bufif0,
    Bufif1,
}

impl fmt::Display for GateKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            GateKind::And => "and",
            GateKind::Nand => "nand",
            GateKind::Or => "or",
            GateKind::Nor => "nor",
            GateKind::Xor => "xor",
            GateKind::Xnor => "xnor",
            GateKind::Not => "not",
            GateKind::Buf => "buf",
            GateKind::Bufif0 => "bufif0",
            GateKind::Bufif1 => "bufif1",
        };
        write!(f, "{}", name)
    }
}

/// The resolved direction of one gate argument.
///
/// Gate argument directions are resolved by the front end from the gate
/// kind and argument position. `Unknown` survives when that resolution
/// failed; the analysis conservatively treats such an argument as both
/// used and set, with a warning.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum GateArgDirection {
    Input,
    Output,
    Unknown,
}

/// One positional argument of a gate instance.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct GateArg {
    expression: Expression,
    direction: GateArgDirection,
}

impl GateArg {
    pub fn new(expression: Expression, direction: GateArgDirection) -> GateArg {
        GateArg {
            expression,
            direction,
        }
    }

    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    pub fn direction(&self) -> GateArgDirection {
        self.direction
    }
}

/// A primitive gate instance.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Gate {
    kind: GateKind,
    name: Option<String>,
    args: Vec<GateArg>,
}

impl Gate {
    pub fn new(kind: GateKind, args: Vec<GateArg>) -> Gate {
        Gate {
            kind,
            name: None,
            args,
        }
    }

    pub fn with_name<S>(mut self, name: S) -> Gate
    where
        S: Into<String>,
    {
        self.name = Some(name.into());
        self
    }

    pub fn kind(&self) -> GateKind {
        self.kind
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn args(&self) -> &[GateArg] {
        &self.args
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} {}", self.kind, name),
            None => write!(f, "{}", self.kind),
        }
    }
}
