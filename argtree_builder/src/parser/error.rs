use std::path::PathBuf;

use thiserror::Error;

use crate::constant::{EXIT_CONFIG, EXIT_USAGE};
use crate::matcher::CloseError;
use crate::model::ErrorMode;

/// A misconfigured command tree, reported by [`Command::build`](crate::Command::build).
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Config error: {0}")]
pub struct ConfigError(pub(crate) String);

/// Why a parse failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum ParseError {
    #[error("Parse error: missing required argument '{name}'.")]
    MissingRequiredArgument { name: String },

    #[error("Parse error: '{name}' expects at least {expected} value(s), but {provided} were provided.")]
    MissingValue {
        name: String,
        expected: usize,
        provided: usize,
    },

    #[error("Parse error: '{name}' does not take a value, but '{value}' was provided.")]
    UnexpectedValue { name: String, value: String },

    #[error("Parse error: '{name}' expects at most {expected} value(s), but {provided} were provided.")]
    TooManyValues {
        name: String,
        expected: usize,
        provided: usize,
    },

    #[error("Parse error: invalid value '{value}' for '{name}' (choose from {}).{}", .choices.join(", "), did_you_mean(.suggestions))]
    InvalidValue {
        name: String,
        value: String,
        choices: Vec<String>,
        suggestions: Vec<String>,
    },

    #[error("Parse error: invalid value '{value}' for '{name}': {message}.")]
    ValidationFailed {
        name: String,
        value: String,
        message: String,
    },

    #[error("Parse error: unknown argument '{token}'.{}", did_you_mean(.suggestions))]
    UnknownArgument {
        token: String,
        suggestions: Vec<String>,
    },

    #[error("Parse error: unknown subcommand '{token}'.{}", did_you_mean(.suggestions))]
    UnknownSubcommand {
        token: String,
        suggestions: Vec<String>,
    },

    #[error("Parse error: unexpected positional argument '{token}'.")]
    TooManyPositionalArguments { token: String },

    #[error("Parse error: '{name}' cannot be used more than once.")]
    ArgumentRepeated { name: String },

    #[error("Parse error: '{name}' cannot be used more than {max} time(s).")]
    TooManyOccurrences { name: String, max: usize },

    #[error("Parse error: '{name}' cannot be used with '{other}'.")]
    Conflict { name: String, other: String },

    #[error("Parse error: '{name}' requires '{required}'.")]
    DependencyUnsatisfied { name: String, required: String },

    #[error("Parse error: only one of group '{group}' may be used, but found {}.", quoted(.present))]
    MutuallyExclusive { group: String, present: Vec<String> },

    #[error("Parse error: group '{group}' must be used all together (provided {}, missing {}).", quoted(.present), quoted(.missing))]
    RequiredTogether {
        group: String,
        present: Vec<String>,
        missing: Vec<String>,
    },

    #[error("Parse error: at least one of group '{group}' is required ({}).", quoted(.members))]
    AtLeastOne { group: String, members: Vec<String> },

    #[error("Parse error: '{command}' requires a subcommand (available: {}).", .available.join(", "))]
    MissingSubcommand {
        command: String,
        available: Vec<String>,
    },

    #[error("Config file error: '{}': {reason}.", .path.display())]
    ConfigFile { path: PathBuf, reason: String },

    #[error("Parse error: {checkpoint} check for '{command}' failed: {message}.")]
    HookFailed {
        command: String,
        checkpoint: &'static str,
        message: String,
    },

    #[error("{}", .0.iter().map(ToString::to_string).collect::<Vec<String>>().join("\n"))]
    Aggregate(Vec<ParseError>),
}

impl ParseError {
    /// The process exit status for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            ParseError::ConfigFile { .. } => EXIT_CONFIG,
            ParseError::Aggregate(errors) => errors
                .iter()
                .map(ParseError::exit_code)
                .max()
                .unwrap_or(EXIT_USAGE),
            _ => EXIT_USAGE,
        }
    }

    /// The individual violations (a single error yields itself).
    pub fn violations(&self) -> Vec<&ParseError> {
        match self {
            ParseError::Aggregate(errors) => errors.iter().collect(),
            single => vec![single],
        }
    }
}

impl From<CloseError> for ParseError {
    fn from(error: CloseError) -> Self {
        match error {
            CloseError::TooFewValues {
                name,
                provided,
                expected,
            } => ParseError::MissingValue {
                name,
                expected,
                provided,
            },
            CloseError::TooManyValues {
                name,
                provided,
                expected,
            } => ParseError::TooManyValues {
                name,
                expected,
                provided,
            },
        }
    }
}

fn did_you_mean(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        return String::default();
    }

    let mut out = "\nDid you mean:".to_string();

    for suggestion in suggestions {
        out.push_str(&format!("\n  * {suggestion}"));
    }

    out
}

fn quoted(names: &[String]) -> String {
    names
        .iter()
        .map(|name| format!("'{name}'"))
        .collect::<Vec<String>>()
        .join(", ")
}

/// Routes validation violations per the [`ErrorMode`].
#[derive(Debug)]
pub(crate) struct Violations {
    mode: ErrorMode,
    errors: Vec<ParseError>,
}

impl Violations {
    pub(crate) fn new(mode: ErrorMode) -> Self {
        Self {
            mode,
            errors: Vec::default(),
        }
    }

    /// Fails immediately in `FirstError` mode, otherwise records the violation.
    pub(crate) fn push(&mut self, error: ParseError) -> Result<(), ParseError> {
        match self.mode {
            ErrorMode::FirstError => Err(error),
            ErrorMode::Aggregate => {
                self.errors.push(error);
                Ok(())
            }
        }
    }

    pub(crate) fn finish(mut self) -> Result<(), ParseError> {
        match self.errors.len() {
            0 => Ok(()),
            1 => Err(self.errors.remove(0)),
            _ => Err(ParseError::Aggregate(self.errors)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn render_suggestions() {
        let error = ParseError::UnknownArgument {
            token: "--verbos".to_string(),
            suggestions: vec!["--verbose".to_string(), "--version".to_string()],
        };

        assert_eq!(
            error.to_string(),
            "Parse error: unknown argument '--verbos'.\nDid you mean:\n  * --verbose\n  * --version"
        );
    }

    #[test]
    fn render_no_suggestions() {
        let error = ParseError::UnknownSubcommand {
            token: "xyz".to_string(),
            suggestions: Vec::default(),
        };

        assert_eq!(error.to_string(), "Parse error: unknown subcommand 'xyz'.");
    }

    #[test]
    fn render_required_together() {
        let error = ParseError::RequiredTogether {
            group: "login".to_string(),
            present: vec!["cluster".to_string()],
            missing: vec!["user".to_string()],
        };

        assert_eq!(
            error.to_string(),
            "Parse error: group 'login' must be used all together (provided 'cluster', missing 'user')."
        );
    }

    #[test]
    fn render_aggregate() {
        let error = ParseError::Aggregate(vec![
            ParseError::MissingRequiredArgument {
                name: "--a".to_string(),
            },
            ParseError::MissingRequiredArgument {
                name: "--b".to_string(),
            },
        ]);

        assert_eq!(
            error.to_string(),
            "Parse error: missing required argument '--a'.\nParse error: missing required argument '--b'."
        );
        assert_eq!(error.violations().len(), 2);
    }

    #[rstest]
    #[case(ParseError::MissingRequiredArgument { name: "a".to_string() }, 1)]
    #[case(ParseError::ConfigFile { path: PathBuf::from("/x.toml"), reason: "not found".to_string() }, 78)]
    #[case(ParseError::Aggregate(vec![
        ParseError::MissingRequiredArgument { name: "a".to_string() },
        ParseError::ConfigFile { path: PathBuf::from("/x.toml"), reason: "not found".to_string() },
    ]), 78)]
    fn exit_code(#[case] error: ParseError, #[case] expected: i32) {
        assert_eq!(error.exit_code(), expected);
    }

    #[test]
    fn from_close_error() {
        assert_eq!(
            ParseError::from(CloseError::TooFewValues {
                name: "--point".to_string(),
                provided: 1,
                expected: 2,
            }),
            ParseError::MissingValue {
                name: "--point".to_string(),
                expected: 2,
                provided: 1,
            }
        );
    }

    #[test]
    fn violations_first_error() {
        let mut violations = Violations::new(ErrorMode::FirstError);
        let error = ParseError::TooManyPositionalArguments {
            token: "x".to_string(),
        };

        assert_eq!(violations.push(error.clone()).unwrap_err(), error);
        violations.finish().unwrap();
    }

    #[test]
    fn violations_aggregate() {
        let violations = Violations::new(ErrorMode::Aggregate);
        violations.finish().unwrap();

        let mut violations = Violations::new(ErrorMode::Aggregate);
        violations
            .push(ParseError::ArgumentRepeated {
                name: "a".to_string(),
            })
            .unwrap();
        assert_matches!(
            violations.finish().unwrap_err(),
            ParseError::ArgumentRepeated { .. }
        );

        let mut violations = Violations::new(ErrorMode::Aggregate);
        for name in ["a", "b", "c"] {
            violations
                .push(ParseError::ArgumentRepeated {
                    name: name.to_string(),
                })
                .unwrap();
        }
        assert_matches!(violations.finish().unwrap_err(), ParseError::Aggregate(errors) if errors.len() == 3);
    }
}
