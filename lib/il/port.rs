use serde::{Deserialize, Serialize};
use std::fmt;

/// The declared direction of a port.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Direction {
    Input,
    Output,
    Inout,
}

impl Direction {
    /// True for `input` and `inout`: directions which imply the module
    /// should read the port.
    pub fn is_input_like(&self) -> bool {
        matches!(self, Direction::Input | Direction::Inout)
    }

    /// True for `output` and `inout`: directions which imply the module
    /// should drive the port.
    pub fn is_output_like(&self) -> bool {
        matches!(self, Direction::Output | Direction::Inout)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Direction::Input => write!(f, "input"),
            Direction::Output => write!(f, "output"),
            Direction::Inout => write!(f, "inout"),
        }
    }
}

/// One entry of a module's port list.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Port {
    name: String,
    direction: Direction,
}

impl Port {
    pub fn new<S>(name: S, direction: Direction) -> Port
    where
        S: Into<String>,
    {
        Port {
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

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.direction, self.name)
    }
}
