//! The single-level flag parser each command owns.
//!
//! It knows nothing about subcommands or aliases; by the time tokens
//! reach it they're scoped to one command and already rewritten to
//! canonical names.

use {
    crate::{opt::Opt, FlagError},
    std::{
        collections::{BTreeMap, BTreeSet},
        fmt,
    },
};

/// An application-defined option value.
///
/// The `Display` output is used as the value's default in help text.
pub trait Value: fmt::Display {
    /// Stores an option-argument, or says why it was rejected
    fn set(&mut self, raw: &str) -> Result<(), String>;
    fn type_name(&self) -> &'static str;
    /// Bool flags don't consume the following token
    fn is_bool_flag(&self) -> bool {
        false
    }
}

/// What a command does when its flags fail to parse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Return the error from `Router::parse`
    Continue,
    /// Write the error and the command's usage, then report exit
    /// status 2 (0 for an undefined `-h`/`-help`)
    #[default]
    Exit,
    /// Panic with the error
    Panic,
}

#[derive(Debug)]
pub struct Flag {
    pub name: String,
    pub usage: String,
    /// The value at definition time, as text
    pub default: String,
    pub value: Opt,
}

#[derive(Debug, Default)]
pub struct FlagSet {
    name: String,
    policy: ErrorPolicy,
    flags: BTreeMap<String, Flag>,
    set: BTreeSet<String>,
    args: Vec<String>,
}

impl FlagSet {
    pub fn new(name: impl Into<String>, policy: ErrorPolicy) -> Self {
        Self {
            name: name.into(),
            policy,
            ..Self::default()
        }
    }
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }
    #[inline]
    pub fn policy(&self) -> ErrorPolicy {
        self.policy
    }
    /// Declares a flag.
    ///
    /// # Panics
    /// If a flag with the same name was already declared
    pub fn define(&mut self, name: &str, value: Opt, usage: &str) {
        if self.flags.contains_key(name) {
            panic!("{} flag redefined: {}", self.name, name);
        }
        self.flags.insert(
            name.to_owned(),
            Flag {
                name: name.to_owned(),
                usage: usage.to_owned(),
                default: value.display(),
                value,
            },
        );
    }
    pub fn lookup(&self, name: &str) -> Option<&Flag> {
        self.flags.get(name)
    }
    /// Every declared flag, in lexicographical order
    pub fn flags(&self) -> impl Iterator<Item = &Flag> {
        self.flags.values()
    }
    /// Whether the flag appeared during the last parse
    pub fn is_set(&self, name: &str) -> bool {
        self.set.contains(name)
    }
    /// Positional arguments left over from the last parse
    #[inline]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Consumes flags from the front of `tokens` and returns what's
    /// left. Parsing stops at the first token that isn't a flag, or
    /// right after a `--` terminator.
    pub fn parse(
        &mut self,
        tokens: &[String],
    ) -> Result<Vec<String>, FlagError> {
        self.set.clear();
        let mut found = Vec::new();
        let mut i = 0;

        while i < tokens.len() {
            let arg = &tokens[i];
            // A lone '-' (stdin) is an operand
            if arg.len() < 2 || !arg.starts_with('-') {
                break;
            }
            let mut dashes = 1;
            if arg.as_bytes()[1] == b'-' {
                if arg.len() == 2 {
                    // Terminator
                    i += 1;
                    break;
                }
                dashes = 2;
            }
            let name = &arg[dashes..];
            if name.starts_with('-') || name.starts_with('=') {
                return Err(FlagError::Syntax(arg.clone()));
            }
            i += 1;

            #[cfg(feature = "eq-separator")]
            let (name, inline) = match name.find('=') {
                Some(eq) => (&name[..eq], Some(&name[eq + 1..])),
                None => (name, None),
            };
            #[cfg(not(feature = "eq-separator"))]
            let inline: Option<&str> = None;

            let flag = match self.flags.get(name) {
                Some(f) => f,
                None if name == "help" || name == "h" => {
                    return Err(FlagError::Help)
                }
                None => return Err(FlagError::Undefined(name.to_owned())),
            };

            let value = match inline {
                Some(v) => v.to_owned(),
                None if flag.value.is_bool_flag() => "true".to_owned(),
                None => match tokens.get(i) {
                    Some(v) => {
                        i += 1;
                        v.clone()
                    }
                    None => {
                        return Err(FlagError::MissingValue(name.to_owned()))
                    }
                },
            };
            flag.value.set(&value).map_err(|reason| {
                FlagError::InvalidValue {
                    name: name.to_owned(),
                    value: value.clone(),
                    reason,
                }
            })?;
            found.push(name.to_owned());
        }

        self.set.extend(found);
        self.args = tokens[i..].to_vec();
        Ok(self.args.clone())
    }
}
