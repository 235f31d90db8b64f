use crate::il::Direction;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of a net or variable declaration.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum NetKind {
    Wire,
    Reg,
    Tri,
    /// A net tied to ground. Its bits count as driven.
    Supply0,
    /// A net tied to power. Its bits count as driven.
    Supply1,
}

impl NetKind {
    /// Supply nets are driven by their declaration alone.
    pub fn is_supply(&self) -> bool {
        matches!(self, NetKind::Supply0 | NetKind::Supply1)
    }
}

impl fmt::Display for NetKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            NetKind::Wire => write!(f, "wire"),
            NetKind::Reg => write!(f, "reg"),
            NetKind::Tri => write!(f, "tri"),
            NetKind::Supply0 => write!(f, "supply0"),
            NetKind::Supply1 => write!(f, "supply1"),
        }
    }
}

/// A net or variable declaration within a module.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct NetDeclaration {
    name: String,
    kind: NetKind,
}

impl NetDeclaration {
    pub fn new<S>(name: S, kind: NetKind) -> NetDeclaration
    where
        S: Into<String>,
    {
        NetDeclaration {
            name: name.into(),
            kind,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> NetKind {
        self.kind
    }
}

impl fmt::Display for NetDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.name)
    }
}

/// A port direction declaration, binding a declared direction to a wire.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct PortDeclaration {
    name: String,
    direction: Direction,
}

impl PortDeclaration {
    pub fn new<S>(name: S, direction: Direction) -> PortDeclaration
    where
        S: Into<String>,
    {
        PortDeclaration {
            name: name.into(),
            direction,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }
}

impl fmt::Display for PortDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.direction, self.name)
    }
}
