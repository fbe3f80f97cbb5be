use std::collections::HashMap;
use std::str::FromStr;

use thiserror::Error;

use crate::constant::EXIT_DATA;
use crate::model::ValueSource;

/// A matched value could not be converted to the requested type.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Conversion error: cannot convert '{value}' for '{name}' into {type_name}.")]
pub struct InvalidConversion {
    /// The argument name.
    pub name: String,
    /// The raw value.
    pub value: String,
    /// The requested type.
    pub type_name: &'static str,
}

impl InvalidConversion {
    /// The process exit status for this failure (data error).
    pub fn exit_code(&self) -> i32 {
        EXIT_DATA
    }
}

/// The resolved outcome of one argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgMatch {
    pub(crate) name: String,
    pub(crate) values: Vec<String>,
    pub(crate) occurrences: usize,
    pub(crate) source: ValueSource,
    pub(crate) inherited: bool,
}

impl ArgMatch {
    pub(crate) fn new(
        name: impl Into<String>,
        values: Vec<String>,
        occurrences: usize,
        source: ValueSource,
    ) -> Self {
        Self {
            name: name.into(),
            values,
            occurrences,
            source,
            inherited: false,
        }
    }

    /// The argument name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The resolved values, in order.
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// How many times the argument occurred (`0` for defaults).
    pub fn occurrences(&self) -> usize {
        self.occurrences
    }

    /// Which layer supplied the values.
    pub fn source(&self) -> ValueSource {
        self.source
    }

    /// Whether the values were carried over from a parent command (global arguments).
    pub fn is_inherited(&self) -> bool {
        self.inherited
    }
}

/// The parse result for one command invocation.
///
/// Subcommand results nest: see [`Matches::subcommand`].
///
/// ### Example
/// ```
/// # use argtree_builder as argtree;
/// use argtree::{Argument, Command, ValueSource};
///
/// let parser = Command::new("program")
///     .add(Argument::option("threads").default_value("4"))
///     .add(Argument::flag("dry-run"))
///     .build()
///     .unwrap();
///
/// let matches = parser.parse_tokens(&["--dry-run"]).unwrap().matches().unwrap();
/// assert_eq!(matches.get::<u8>("threads").unwrap(), Some(4));
/// assert_eq!(matches.source("threads"), Some(ValueSource::Default));
/// assert!(matches.get_flag("dry-run"));
/// assert!(!matches.is_present("threads"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Matches {
    pub(crate) args: HashMap<String, ArgMatch>,
    pub(crate) subcommand: Option<(String, Box<Matches>)>,
    pub(crate) external: Option<Vec<String>>,
    pub(crate) warnings: Vec<String>,
}

impl Matches {
    /// The first value of `name`, converted to `T`.
    /// Returns `Ok(None)` when the argument has no value.
    pub fn get<T: FromStr>(&self, name: &str) -> Result<Option<T>, InvalidConversion> {
        match self.value_of(name) {
            Some(value) => convert(name, value).map(Some),
            None => Ok(None),
        }
    }

    /// Every value of `name`, converted to `T`.
    /// Returns an empty list when the argument has no value.
    pub fn get_many<T: FromStr>(&self, name: &str) -> Result<Vec<T>, InvalidConversion> {
        self.values_of(name)
            .unwrap_or_default()
            .iter()
            .map(|value| convert(name, value))
            .collect()
    }

    /// Whether the flag `name` resolved to `true`.
    pub fn get_flag(&self, name: &str) -> bool {
        self.value_of(name) == Some("true")
    }

    /// The count recorded for a [`Count`](crate::Action::Count) argument (`0` when absent).
    pub fn get_count(&self, name: &str) -> usize {
        self.value_of(name)
            .and_then(|value| value.parse().ok())
            .unwrap_or_default()
    }

    /// The first raw value of `name`.
    pub fn value_of(&self, name: &str) -> Option<&str> {
        self.args
            .get(name)
            .and_then(|arg| arg.values.first())
            .map(String::as_str)
    }

    /// Every raw value of `name`.
    pub fn values_of(&self, name: &str) -> Option<&[String]> {
        self.args.get(name).map(|arg| arg.values.as_slice())
    }

    /// The full record of `name`.
    pub fn arg(&self, name: &str) -> Option<&ArgMatch> {
        self.args.get(name)
    }

    /// Which layer supplied the value of `name`.
    pub fn source(&self, name: &str) -> Option<ValueSource> {
        self.args.get(name).map(|arg| arg.source)
    }

    /// How many times `name` occurred.
    pub fn occurrences(&self, name: &str) -> usize {
        self.args.get(name).map_or(0, |arg| arg.occurrences)
    }

    /// Whether `name` has any record at all (including defaults).
    pub fn contains(&self, name: &str) -> bool {
        self.args.contains_key(name)
    }

    /// Whether `name` was supplied by a non-default source.
    pub fn is_present(&self, name: &str) -> bool {
        self.occurrences(name) > 0
    }

    /// The matched subcommand and its results.
    pub fn subcommand(&self) -> Option<(&str, &Matches)> {
        self.subcommand
            .as_ref()
            .map(|(name, matches)| (name.as_str(), matches.as_ref()))
    }

    /// The matched subcommand name.
    pub fn subcommand_name(&self) -> Option<&str> {
        self.subcommand.as_ref().map(|(name, _)| name.as_str())
    }

    /// The raw tokens following an external subcommand name.
    pub fn external_args(&self) -> Option<&[String]> {
        self.external.as_deref()
    }

    /// Whether the matched subcommand is external.
    pub fn is_external(&self) -> bool {
        self.external.is_some()
    }

    /// The deprecation warnings raised while parsing this command.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// The deprecation warnings raised while parsing this command and every nested subcommand.
    pub fn all_warnings(&self) -> Vec<String> {
        let mut out = self.warnings.clone();

        if let Some((_, child)) = &self.subcommand {
            out.extend(child.all_warnings());
        }

        out
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut ArgMatch> {
        self.args.get_mut(name)
    }

    pub(crate) fn insert(&mut self, arg: ArgMatch) {
        self.args.insert(arg.name.clone(), arg);
    }

    /// Record `arg` unless a higher precedence source already supplied a value.
    pub(crate) fn offer(&mut self, arg: ArgMatch) -> bool {
        match self.args.get(&arg.name) {
            Some(existing) if existing.source > arg.source => false,
            _ => {
                self.insert(arg);
                true
            }
        }
    }
}

fn convert<T: FromStr>(name: &str, value: &str) -> Result<T, InvalidConversion> {
    T::from_str(value).map_err(|_| InvalidConversion {
        name: name.to_string(),
        value: value.to_string(),
        type_name: std::any::type_name::<T>(),
    })
}
