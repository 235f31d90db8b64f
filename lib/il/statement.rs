use crate::il::{Expression, NetDeclaration};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An assignment of an expression to an lvalue.
///
/// The same shape serves continuous assignments at module level and
/// procedural assignments inside `always`/`initial` blocks; the analysis
/// treats them identically.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Assign {
    lhs: Expression,
    rhs: Expression,
}

impl Assign {
    pub fn new(lhs: Expression, rhs: Expression) -> Assign {
        Assign { lhs, rhs }
    }

    pub fn lhs(&self) -> &Expression {
        &self.lhs
    }

    pub fn rhs(&self) -> &Expression {
        &self.rhs
    }
}

impl fmt::Display for Assign {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} = {}", self.lhs, self.rhs)
    }
}

/// One arm of a `case` statement.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct CaseArm {
    labels: Vec<Expression>,
    body: Statement,
}

impl CaseArm {
    pub fn new(labels: Vec<Expression>, body: Statement) -> CaseArm {
        CaseArm { labels, body }
    }

    pub fn labels(&self) -> &[Expression] {
        &self.labels
    }

    pub fn body(&self) -> &Statement {
        &self.body
    }
}

/// A procedural statement.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Statement {
    Assign(Assign),
    /// A `begin`/`end` block. Blocks carrying their own local declarations
    /// are not analyzed; see the marking engine.
    Block {
        declarations: Vec<NetDeclaration>,
        statements: Vec<Statement>,
    },
    If {
        condition: Expression,
        then_branch: Box<Statement>,
        else_branch: Option<Box<Statement>>,
    },
    Case {
        subject: Expression,
        arms: Vec<CaseArm>,
        default: Option<Box<Statement>>,
    },
    For {
        init: Assign,
        test: Expression,
        step: Assign,
        body: Box<Statement>,
    },
    While {
        condition: Expression,
        body: Box<Statement>,
    },
    Repeat {
        count: Expression,
        body: Box<Statement>,
    },
    Wait {
        condition: Expression,
        body: Box<Statement>,
    },
    /// An `@(...)` event control wrapping a statement.
    EventControl {
        triggers: Vec<Expression>,
        body: Box<Statement>,
    },
    /// A `#delay` control wrapping a statement.
    DelayControl {
        delay: Expression,
        body: Box<Statement>,
    },
    /// A task or function enable. Not analyzed; see the marking engine.
    TaskEnable {
        name: String,
        arguments: Vec<Expression>,
    },
    Null,
}

impl Statement {
    pub fn assign(lhs: Expression, rhs: Expression) -> Statement {
        Statement::Assign(Assign::new(lhs, rhs))
    }

    pub fn block(statements: Vec<Statement>) -> Statement {
        Statement::Block {
            declarations: Vec::new(),
            statements,
        }
    }

    pub fn block_with_declarations(
        declarations: Vec<NetDeclaration>,
        statements: Vec<Statement>,
    ) -> Statement {
        Statement::Block {
            declarations,
            statements,
        }
    }

    pub fn if_(condition: Expression, then_branch: Statement) -> Statement {
        Statement::If {
            condition,
            then_branch: Box::new(then_branch),
            else_branch: None,
        }
    }

    pub fn if_else(
        condition: Expression,
        then_branch: Statement,
        else_branch: Statement,
    ) -> Statement {
        Statement::If {
            condition,
            then_branch: Box::new(then_branch),
            else_branch: Some(Box::new(else_branch)),
        }
    }

    pub fn case(subject: Expression, arms: Vec<CaseArm>, default: Option<Statement>) -> Statement {
        Statement::Case {
            subject,
            arms,
            default: default.map(Box::new),
        }
    }

    pub fn for_(init: Assign, test: Expression, step: Assign, body: Statement) -> Statement {
        Statement::For {
            init,
            test,
            step,
            body: Box::new(body),
        }
    }

    pub fn while_(condition: Expression, body: Statement) -> Statement {
        Statement::While {
            condition,
            body: Box::new(body),
        }
    }

    pub fn repeat(count: Expression, body: Statement) -> Statement {
        Statement::Repeat {
            count,
            body: Box::new(body),
        }
    }

    pub fn wait(condition: Expression, body: Statement) -> Statement {
        Statement::Wait {
            condition,
            body: Box::new(body),
        }
    }

    pub fn event_control(triggers: Vec<Expression>, body: Statement) -> Statement {
        Statement::EventControl {
            triggers,
            body: Box::new(body),
        }
    }

    pub fn delay_control(delay: Expression, body: Statement) -> Statement {
        Statement::DelayControl {
            delay,
            body: Box::new(body),
        }
    }

    pub fn task_enable<S>(name: S, arguments: Vec<Expression>) -> Statement
    where
        S: Into<String>,
    {
        Statement::TaskEnable {
            name: name.into(),
            arguments,
        }
    }
}

/// A procedural block at module level.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Procedural {
    Always(Statement),
    Initial(Statement),
}

impl Procedural {
    pub fn statement(&self) -> &Statement {
        match self {
            Procedural::Always(statement) | Procedural::Initial(statement) => statement,
        }
    }
}
