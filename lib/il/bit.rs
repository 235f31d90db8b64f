use serde::{Deserialize, Serialize};
use std::fmt;

/// One bit of one wire within a module.
///
/// Bits are the unit of analysis. They are produced by wire-alist expansion
/// of multi-bit declarations, and they are compared by identity only: two
/// bits are the same bit exactly when their wire name and position agree.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Bit {
    wire: String,
    index: usize,
}

impl Bit {
    pub fn new<S>(wire: S, index: usize) -> Bit
    where
        S: Into<String>,
    {
        Bit {
            wire: wire.into(),
            index,
        }
    }

    /// The name of the wire this bit belongs to.
    pub fn wire(&self) -> &str {
        &self.wire
    }

    /// The position of this bit within its wire's declared range.
    pub fn index(&self) -> usize {
        self.index
    }

    /// An identifier uniquely identifying this bit in the form `wire[index]`.
    pub fn identifier(&self) -> String {
        format!("{}[{}]", self.wire, self.index)
    }
}

impl fmt::Display for Bit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.identifier())
    }
}
