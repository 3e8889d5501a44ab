use {
    crate::{flag::Value, Error, Result},
    std::{cell::RefCell, fmt, rc::Rc},
};

/// A live view of an option's current value.
///
/// Registration hands one of these back to the caller, and the
/// `FlagSet` that owns the option writes through it while parsing.
/// Reading it after `Router::parse` returns the parsed value.
pub struct Handle<T>(Rc<RefCell<T>>);
impl<T> Handle<T> {
    pub fn new(value: T) -> Self {
        Self(Rc::new(RefCell::new(value)))
    }
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.0.borrow())
    }
    pub(crate) fn set(&self, value: T) {
        *self.0.borrow_mut() = value;
    }
}
impl<T: Clone> Handle<T> {
    #[inline]
    pub fn get(&self) -> T {
        self.0.borrow().clone()
    }
}
impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}
impl<T: fmt::Debug> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Handle").field(&self.0.borrow()).finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptKind {
    Bool,
    Int,
    Uint,
    Float,
    Str,
    /// An application-defined `Value`, tagged with its type name
    Other(&'static str),
}
impl fmt::Display for OptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match *self {
            OptKind::Bool => "bool",
            OptKind::Int => "int",
            OptKind::Uint => "uint",
            OptKind::Float => "float",
            OptKind::Str => "string",
            OptKind::Other(name) => name,
        })
    }
}

/// A typed option value that converts on demand to any of the
/// other representations
#[derive(Clone)]
pub enum Opt {
    Bool(Handle<bool>),
    Int(Handle<i64>),
    Uint(Handle<u64>),
    Float(Handle<f64>),
    Str(Handle<String>),
    Custom(Rc<RefCell<dyn Value>>),
}

impl Opt {
    pub fn kind(&self) -> OptKind {
        match self {
            Opt::Bool(_) => OptKind::Bool,
            Opt::Int(_) => OptKind::Int,
            Opt::Uint(_) => OptKind::Uint,
            Opt::Float(_) => OptKind::Float,
            Opt::Str(_) => OptKind::Str,
            Opt::Custom(v) => OptKind::Other(v.borrow().type_name()),
        }
    }

    fn unhandled(&self) -> Error {
        Error::UnknownOptionType(self.kind().to_string())
    }

    /// Strings are true when non-empty, so `"false"` is `true`
    /// unless the `literal-bool-strings` feature is enabled
    pub fn as_bool(&self) -> Result<bool> {
        Ok(match self {
            Opt::Bool(v) => v.get(),
            Opt::Int(v) => v.get() != 0,
            Opt::Uint(v) => v.get() != 0,
            Opt::Float(v) => v.get() != 0.0,
            Opt::Str(v) => v.with(|s| string_truth(s)),
            Opt::Custom(_) => return Err(self.unhandled()),
        })
    }

    /// Floats round half away from zero. Uints above `i64::MAX` wrap.
    pub fn as_int(&self) -> Result<i64> {
        Ok(match self {
            Opt::Bool(v) => v.get() as i64,
            Opt::Int(v) => v.get(),
            Opt::Uint(v) => v.get() as i64,
            Opt::Float(v) => v.get().round() as i64,
            Opt::Str(v) => v.with(|s| parse_number::<i64>(s, "int"))?,
            Opt::Custom(_) => return Err(self.unhandled()),
        })
    }

    /// Negative ints wrap (`-1` becomes `u64::MAX`), negative floats
    /// become 0.
    pub fn as_uint(&self) -> Result<u64> {
        Ok(match self {
            Opt::Bool(v) => v.get() as u64,
            Opt::Int(v) => v.get() as u64,
            Opt::Uint(v) => v.get(),
            Opt::Float(v) => {
                let f = v.get();
                if f > 0.0 {
                    f.round() as u64
                } else {
                    0
                }
            }
            Opt::Str(v) => v.with(|s| parse_number::<u64>(s, "uint"))?,
            Opt::Custom(_) => return Err(self.unhandled()),
        })
    }

    pub fn as_float(&self) -> Result<f64> {
        Ok(match self {
            Opt::Bool(v) => {
                if v.get() {
                    1.0
                } else {
                    0.0
                }
            }
            Opt::Int(v) => v.get() as f64,
            Opt::Uint(v) => v.get() as f64,
            Opt::Float(v) => v.get(),
            Opt::Str(v) => v.with(|s| parse_number::<f64>(s, "float"))?,
            Opt::Custom(_) => return Err(self.unhandled()),
        })
    }

    pub fn as_string(&self) -> Result<String> {
        match self {
            Opt::Custom(_) => Err(self.unhandled()),
            _ => Ok(self.display()),
        }
    }

    /// The value as the help text shows it. Unlike `as_string`
    /// this also covers custom values.
    pub(crate) fn display(&self) -> String {
        match self {
            Opt::Bool(v) => v.get().to_string(),
            Opt::Int(v) => v.get().to_string(),
            Opt::Uint(v) => v.get().to_string(),
            // `Display` for f64 is the shortest string that parses
            // back to the same value, without exponent notation
            Opt::Float(v) => v.get().to_string(),
            Opt::Str(v) => v.get(),
            Opt::Custom(v) => v.borrow().to_string(),
        }
    }

    pub(crate) fn is_bool_flag(&self) -> bool {
        match self {
            Opt::Bool(_) => true,
            Opt::Custom(v) => v.borrow().is_bool_flag(),
            _ => false,
        }
    }

    /// Stores an option-argument. The error is the reason the
    /// value was rejected.
    pub(crate) fn set(&self, raw: &str) -> std::result::Result<(), String> {
        match self {
            Opt::Bool(v) => v.set(parse_bool(raw)?),
            Opt::Int(v) => {
                v.set(raw.parse::<i64>().map_err(|e| e.to_string())?)
            }
            Opt::Uint(v) => {
                v.set(raw.parse::<u64>().map_err(|e| e.to_string())?)
            }
            Opt::Float(v) => {
                v.set(raw.parse::<f64>().map_err(|e| e.to_string())?)
            }
            Opt::Str(v) => v.set(raw.to_owned()),
            Opt::Custom(v) => v.borrow_mut().set(raw)?,
        }
        Ok(())
    }
}

impl fmt::Debug for Opt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Opt({}: {:?})", self.kind(), self.display())
    }
}

fn parse_number<T>(s: &str, target: &'static str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    s.parse::<T>().map_err(|e| Error::Conversion {
        value: s.to_owned(),
        target,
        source: Box::new(e),
    })
}

#[cfg(not(feature = "literal-bool-strings"))]
fn string_truth(s: &str) -> bool {
    !s.is_empty()
}
#[cfg(feature = "literal-bool-strings")]
fn string_truth(s: &str) -> bool {
    if s.eq_ignore_ascii_case("false") {
        return false;
    }
    !s.is_empty()
}

/// The literals a bool flag accepts after an '='
pub(crate) fn parse_bool(raw: &str) -> std::result::Result<bool, String> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(format!("invalid boolean {raw:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Level(u8);
    impl fmt::Display for Level {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.0)
        }
    }
    impl Value for Level {
        fn set(&mut self, raw: &str) -> std::result::Result<(), String> {
            self.0 = raw.len() as u8;
            Ok(())
        }
        fn type_name(&self) -> &'static str {
            "level"
        }
    }

    #[test]
    fn should_convert_bools_to_every_kind() {
        let o = Opt::Bool(Handle::new(true));
        assert!(o.as_bool().unwrap());
        assert_eq!(o.as_int().unwrap(), 1);
        assert_eq!(o.as_uint().unwrap(), 1);
        assert_eq!(o.as_float().unwrap(), 1.0);
        assert_eq!(o.as_string().unwrap(), "true");

        let o = Opt::Bool(Handle::new(false));
        assert_eq!(o.as_int().unwrap(), 0);
        assert_eq!(o.as_string().unwrap(), "false");
    }
    #[test]
    fn should_convert_ints_to_every_kind() {
        let o = Opt::Int(Handle::new(-3));
        assert!(o.as_bool().unwrap());
        assert_eq!(o.as_float().unwrap(), -3.0);
        assert_eq!(o.as_string().unwrap(), "-3");
        // Wraps instead of clamping
        assert_eq!(o.as_uint().unwrap(), (-3i64) as u64);
        assert!(!Opt::Int(Handle::new(0)).as_bool().unwrap());
    }
    #[test]
    fn should_convert_uints_to_every_kind() {
        let o = Opt::Uint(Handle::new(42));
        assert!(o.as_bool().unwrap());
        assert_eq!(o.as_int().unwrap(), 42);
        assert_eq!(o.as_float().unwrap(), 42.0);
        assert_eq!(o.as_string().unwrap(), "42");
    }
    #[test]
    fn should_wrap_uints_above_the_int_range() {
        let max = Opt::Uint(Handle::new(i64::MAX as u64));
        assert_eq!(max.as_int().unwrap(), i64::MAX);
        let over = Opt::Uint(Handle::new(i64::MAX as u64 + 1));
        assert_eq!(over.as_int().unwrap(), i64::MIN);
        assert_eq!(Opt::Uint(Handle::new(u64::MAX)).as_int().unwrap(), -1);
    }
    #[test]
    fn should_round_floats_half_away_from_zero() {
        assert_eq!(Opt::Float(Handle::new(2.5)).as_int().unwrap(), 3);
        assert_eq!(Opt::Float(Handle::new(-2.5)).as_int().unwrap(), -3);
        assert_eq!(Opt::Float(Handle::new(1.4)).as_uint().unwrap(), 1);
        assert_eq!(Opt::Float(Handle::new(-7.9)).as_uint().unwrap(), 0);
        assert!(!Opt::Float(Handle::new(0.0)).as_bool().unwrap());
    }
    #[test]
    fn should_write_floats_without_padding() {
        assert_eq!(Opt::Float(Handle::new(1.1)).as_string().unwrap(), "1.1");
        assert_eq!(Opt::Float(Handle::new(3.0)).as_string().unwrap(), "3");
        assert_eq!(
            Opt::Float(Handle::new(0.000125)).as_string().unwrap(),
            "0.000125"
        );
    }
    #[test]
    fn should_parse_numbers_from_strings() {
        let o = Opt::Str(Handle::new("17".to_string()));
        assert_eq!(o.as_int().unwrap(), 17);
        assert_eq!(o.as_uint().unwrap(), 17);
        assert_eq!(o.as_float().unwrap(), 17.0);

        let o = Opt::Str(Handle::new("seventeen".to_string()));
        match o.as_int() {
            Err(Error::Conversion { value, target, .. }) => {
                assert_eq!(value, "seventeen");
                assert_eq!(target, "int");
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(Opt::Str(Handle::new("-1".into())).as_uint().is_err());
    }
    #[test]
    fn should_treat_non_empty_strings_as_true() {
        assert!(!Opt::Str(Handle::new(String::new())).as_bool().unwrap());
        assert!(Opt::Str(Handle::new("yes".into())).as_bool().unwrap());

        let literal = Opt::Str(Handle::new("false".into()));
        #[cfg(not(feature = "literal-bool-strings"))]
        assert!(literal.as_bool().unwrap());
        #[cfg(feature = "literal-bool-strings")]
        assert!(!literal.as_bool().unwrap());
    }
    #[test]
    fn should_reproduce_integer_strings_through_int() {
        for x in ["0", "7", "-12", "9223372036854775807", "-40000"] {
            let s = Opt::Str(Handle::new(x.to_string()));
            let n = Opt::Int(Handle::new(s.as_int().unwrap()));
            assert_eq!(n.as_string().unwrap(), x);
        }
    }
    #[test]
    fn should_reject_unknown_option_types() {
        let o = Opt::Custom(Rc::new(RefCell::new(Level(2))));
        assert_eq!(o.kind(), OptKind::Other("level"));
        for err in [
            o.as_bool().map(|_| ()),
            o.as_int().map(|_| ()),
            o.as_uint().map(|_| ()),
            o.as_float().map(|_| ()),
            o.as_string().map(|_| ()),
        ] {
            match err {
                Err(Error::UnknownOptionType(name)) => {
                    assert_eq!(name, "level")
                }
                other => panic!("unexpected {:?}", other),
            }
        }
        assert_eq!(o.display(), "2");
    }
    #[test]
    fn should_write_through_shared_handles() {
        let h = Handle::new(0i64);
        let o = Opt::Int(h.clone());
        o.set("12").unwrap();
        assert_eq!(h.get(), 12);
        assert!(o.set("twelve").is_err());
        assert_eq!(h.get(), 12);
    }
}
