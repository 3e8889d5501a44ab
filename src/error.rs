use {
    std::{ffi::OsString, io},
    thiserror::Error,
};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// The argument vector didn't even hold the program name
    #[error("invalid command")]
    InvalidCommand,
    /// A process argument that isn't valid UTF-8
    #[error("argument is not valid unicode: {0:?}")]
    NotUnicode(OsString),
    /// Only the program name was given
    #[error("no command line arguments")]
    NoArguments,
    /// The option's value isn't one of the five built-in kinds
    #[error("unhandled option type: {0}")]
    UnknownOptionType(String),
    #[error("cannot convert {value:?} to {target}")]
    Conversion {
        value: String,
        target: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error(transparent)]
    Flag(#[from] FlagError),
    #[error("{command} expects {expected} argument(s), found {found}")]
    Operands {
        command: String,
        expected: u16,
        found: usize,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Failures reported by a node's `FlagSet`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlagError {
    #[error("flag provided but not defined: -{0}")]
    Undefined(String),
    #[error("flag needs an argument: -{0}")]
    MissingValue(String),
    #[error("invalid value {value:?} for flag -{name}: {reason}")]
    InvalidValue {
        name: String,
        value: String,
        reason: String,
    },
    #[error("bad flag syntax: {0}")]
    Syntax(String),
    /// `-h` or `-help` was given without being defined
    #[error("help requested")]
    Help,
}
