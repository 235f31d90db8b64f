use crate::il::Expression;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One port connection of a module instance.
///
/// Named connections are normally resolved to ordered connections by the
/// front end; a `Named` connection surviving to analysis means that
/// resolution failed, and the instance is skipped with a warning.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Connection {
    Ordered(Expression),
    Named { port: String, expression: Expression },
}

impl Connection {
    pub fn expression(&self) -> &Expression {
        match self {
            Connection::Ordered(expression) => expression,
            Connection::Named { expression, .. } => expression,
        }
    }

    pub fn is_named(&self) -> bool {
        matches!(self, Connection::Named { .. })
    }
}

/// An instance of a submodule.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Instance {
    name: String,
    module: String,
    range: Option<(usize, usize)>,
    parameters: Vec<Expression>,
    connections: Vec<Connection>,
}

impl Instance {
    pub fn new<S, M>(name: S, module: M, connections: Vec<Connection>) -> Instance
    where
        S: Into<String>,
        M: Into<String>,
    {
        Instance {
            name: name.into(),
            module: module.into(),
            range: None,
            parameters: Vec::new(),
            connections,
        }
    }

    /// A convenience constructor for the common case of purely ordered
    /// connections.
    pub fn ordered<S, M>(name: S, module: M, connections: Vec<Expression>) -> Instance
    where
        S: Into<String>,
        M: Into<String>,
    {
        Instance::new(
            name,
            module,
            connections.into_iter().map(Connection::Ordered).collect(),
        )
    }

    pub fn with_range(mut self, msb: usize, lsb: usize) -> Instance {
        self.range = Some((msb, lsb));
        self
    }

    pub fn with_parameters(mut self, parameters: Vec<Expression>) -> Instance {
        self.parameters = parameters;
        self
    }

    /// The instance name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The name of the instantiated submodule.
    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn range(&self) -> Option<(usize, usize)> {
        self.range
    }

    pub fn parameters(&self) -> &[Expression] {
        &self.parameters
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn has_named_connections(&self) -> bool {
        self.connections.iter().any(|c| c.is_named())
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.module, self.name)
    }
}
