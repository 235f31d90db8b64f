use serde::{Deserialize, Serialize};
use std::fmt;

/// The taxonomy of analysis warnings.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum WarningKind {
    /// Expected collaborator data was missing or a construct is not
    /// supported; the analysis applied the safest default and continued.
    Fudging,
    /// A port is driven from both the instantiating side and the submodule
    /// side simultaneously.
    Trainwreck,
    /// A port would be driven from both sides once the submodule starts
    /// driving it: declared output/inout, currently undriven.
    FutureTrainwreck,
    /// A width or arity mismatch, or a port pattern that could not be
    /// generated. Inference was abandoned for the affected construct only.
    Structural,
    /// A use/set classification diagnostic produced by the reporter.
    UseSet,
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            WarningKind::Fudging => write!(f, "fudging"),
            WarningKind::Trainwreck => write!(f, "trainwreck"),
            WarningKind::FutureTrainwreck => write!(f, "future trainwreck"),
            WarningKind::Structural => write!(f, "structural"),
            WarningKind::UseSet => write!(f, "use-set"),
        }
    }
}

/// One warning attached to the module that caused it.
///
/// Warnings never halt processing. A `fatal` warning records that inference
/// was abandoned for its construct or module; everything else in the design
/// is still analyzed.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Warning {
    kind: WarningKind,
    message: String,
    context: Option<String>,
    fatal: bool,
}

impl Warning {
    pub fn new<S>(kind: WarningKind, message: S) -> Warning
    where
        S: Into<String>,
    {
        Warning {
            kind,
            message: message.into(),
            context: None,
            fatal: false,
        }
    }

    pub fn fudging<S>(message: S) -> Warning
    where
        S: Into<String>,
    {
        Warning::new(WarningKind::Fudging, message)
    }

    pub fn trainwreck<S>(message: S) -> Warning
    where
        S: Into<String>,
    {
        Warning::new(WarningKind::Trainwreck, message)
    }

    pub fn future_trainwreck<S>(message: S) -> Warning
    where
        S: Into<String>,
    {
        Warning::new(WarningKind::FutureTrainwreck, message)
    }

    /// Structural warnings are fatal for their construct.
    pub fn structural<S>(message: S) -> Warning
    where
        S: Into<String>,
    {
        let mut warning = Warning::new(WarningKind::Structural, message);
        warning.fatal = true;
        warning
    }

    pub fn use_set<S>(message: S) -> Warning
    where
        S: Into<String>,
    {
        Warning::new(WarningKind::UseSet, message)
    }

    /// Attach the statement, expression, or instance this warning is about.
    pub fn with_context<S>(mut self, context: S) -> Warning
    where
        S: Into<String>,
    {
        self.context = Some(context.into());
        self
    }

    pub fn kind(&self) -> WarningKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    pub fn is_fatal(&self) -> bool {
        self.fatal
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)?;
        if let Some(context) = &self.context {
            write!(f, " ({})", context)?;
        }
        if self.fatal {
            write!(f, " [fatal]")?;
        }
        Ok(())
    }
}
