use std::path::{Path, PathBuf};

use tracing::debug;

use crate::api::{Argument, Command, ConfigSource};
use crate::constant::MAX_SUGGESTIONS;
use crate::matcher::{ArgMatch, Matches};
use crate::model::{Action, ValueSource};
use crate::parser::scope::{Policy, Scope};
use crate::parser::{suggest, ParseError};
use crate::source::{ConfigLayer, ConfigReadError, ConfigReader, Environment};

const TRUTHY: [&str; 4] = ["true", "yes", "on", "1"];
const FALSY: [&str; 4] = ["false", "no", "off", "0"];

/// Merge every config layer of the root command, lowest priority first.
pub(crate) fn load_config(
    command: &Command,
    tokens: &[String],
    environment: &dyn Environment,
    reader: &dyn ConfigReader,
) -> Result<ConfigLayer, ParseError> {
    let mut merged = ConfigLayer::new("config");

    for source in &command.config.sources {
        match source {
            ConfigSource::Layer(layer) => {
                debug!("Merging config layer '{}'.", layer.origin());
                merged.merge(layer.clone());
            }
            ConfigSource::File { path, required } => {
                if let Some(layer) = read_file(reader, path, *required)? {
                    merged.merge(layer);
                }
            }
        }
    }

    if let Some((path, required)) = top_config_file(command, tokens, environment) {
        if let Some(layer) = read_file(reader, &path, required)? {
            merged.merge(layer);
        }
    }

    Ok(merged)
}

fn read_file(
    reader: &dyn ConfigReader,
    path: &Path,
    required: bool,
) -> Result<Option<ConfigLayer>, ParseError> {
    match reader.read(path) {
        Ok(layer) => {
            debug!("Read {} key(s) from '{}'.", layer.len(), path.display());
            Ok(Some(layer))
        }
        Err(ConfigReadError::NotFound(_)) if !required => {
            debug!("Skipping optional config file '{}'.", path.display());
            Ok(None)
        }
        Err(error) => {
            let reason = match error {
                ConfigReadError::NotFound(_) => "file not found".to_string(),
                ConfigReadError::Unreadable { message, .. } => message,
                ConfigReadError::Malformed { message, .. } => format!("malformed ({message})"),
            };
            Err(ParseError::ConfigFile {
                path: path.to_path_buf(),
                reason,
            })
        }
    }
}

/// The top config file: the config argument, else the config variable, else the default path.
/// Only the default path is optional.
fn top_config_file(
    command: &Command,
    tokens: &[String],
    environment: &dyn Environment,
) -> Option<(PathBuf, bool)> {
    let from_arg = command
        .config
        .config_arg
        .as_ref()
        .and_then(|name| command.argument(name))
        .and_then(|argument| prescan(argument, tokens));

    if let Some(path) = from_arg {
        return Some((PathBuf::from(path), true));
    }

    let from_env = command
        .config
        .config_env
        .as_ref()
        .and_then(|variable| environment.var(variable))
        .filter(|value| !value.is_empty());

    if let Some(path) = from_env {
        return Some((PathBuf::from(path), true));
    }

    command
        .config
        .default_file
        .as_ref()
        .map(|path| (path.clone(), false))
}

/// Find the last value given to `argument` on the command line, ahead of token dispatch.
fn prescan(argument: &Argument, tokens: &[String]) -> Option<String> {
    let long = argument.long.as_ref().map(|long| format!("--{long}"));
    let short = argument.short.map(|short| format!("-{short}"));
    let mut found = None;
    let mut iter = tokens.iter().take_while(|token| token.as_str() != "--");

    while let Some(token) = iter.next() {
        for flag in long.iter().chain(short.iter()) {
            if token == flag {
                found = iter.next().cloned();
            } else if let Some(value) = token
                .strip_prefix(flag.as_str())
                .and_then(|rest| rest.strip_prefix('='))
            {
                found = Some(value.to_string());
            }
        }
    }

    found
}

/// Canonical environment variable form of a name: uppercase, with `-` and `.` as `_`.
pub(crate) fn canonical(name: &str) -> String {
    name.to_ascii_uppercase().replace(['-', '.'], "_")
}

fn env_candidates(argument: &Argument, policy: &Policy) -> Vec<String> {
    let canonical_name = canonical(&argument.name);
    let mut candidates = Vec::default();

    if let Some(variable) = &argument.env {
        candidates.push(variable.clone());
    }

    if let Some(prefix) = &argument.env_prefix {
        candidates.push(format!("{prefix}_{canonical_name}"));
    }

    if let Some(prefix) = &policy.env_prefix {
        candidates.push(format!("{prefix}_{canonical_name}"));
    }

    candidates
}

fn config_keys(argument: &Argument, scope: &Scope) -> Vec<String> {
    let mut names = vec![argument.name.clone()];

    if let Some(long) = &argument.long {
        if long != &argument.name {
            names.push(long.clone());
        }
    }

    match scope.config_prefix() {
        None => names,
        Some(prefix) => {
            let mut keys: Vec<String> = names
                .iter()
                .map(|name| format!("{prefix}.{name}"))
                .collect();

            if scope.is_global(&argument.name) {
                keys.extend(names);
            }

            keys
        }
    }
}

/// Seed the matches of a command from the config layers, then the environment.
pub(crate) fn seed(
    scope: &Scope,
    matches: &mut Matches,
    config: &ConfigLayer,
    environment: &dyn Environment,
) -> Result<(), ParseError> {
    for argument in scope.arguments.iter().copied() {
        if argument.action.is_signal() {
            continue;
        }

        let from_config = config_keys(argument, scope)
            .into_iter()
            .find_map(|key| config.get(&key).map(|value| (key, value.values())));

        if let Some((key, raw)) = from_config {
            debug!("Config key '{key}' supplies '{}'.", argument.name);
            let values = external_values(argument, raw, &scope.policy)?;
            matches.offer(ArgMatch::new(
                &argument.name,
                values,
                1,
                ValueSource::ConfigFile,
            ));
        }

        let from_env = env_candidates(argument, &scope.policy)
            .into_iter()
            .find_map(|variable| {
                environment
                    .var(&variable)
                    .filter(|value| !value.is_empty())
                    .map(|value| (variable, value))
            });

        if let Some((variable, raw)) = from_env {
            debug!("Environment variable '{variable}' supplies '{}'.", argument.name);
            let values = external_values(argument, vec![raw], &scope.policy)?;
            matches.offer(ArgMatch::new(
                &argument.name,
                values,
                1,
                ValueSource::Environment,
            ));
        }
    }

    Ok(())
}

/// Normalize values supplied by a config layer or the environment.
fn external_values(
    argument: &Argument,
    raw: Vec<String>,
    policy: &Policy,
) -> Result<Vec<String>, ParseError> {
    match argument.action {
        Action::StoreTrue | Action::StoreFalse => {
            let value = single(argument, raw)?;
            let lowered = value.to_ascii_lowercase();

            if TRUTHY.contains(&lowered.as_str()) {
                Ok(vec!["true".to_string()])
            } else if FALSY.contains(&lowered.as_str()) {
                Ok(vec!["false".to_string()])
            } else {
                Err(ParseError::InvalidValue {
                    name: argument.display(),
                    value,
                    choices: vec!["true".to_string(), "false".to_string()],
                    suggestions: Vec::default(),
                })
            }
        }
        Action::Count => {
            let value = single(argument, raw)?;

            match value.parse::<usize>() {
                Ok(count) => Ok(vec![count.to_string()]),
                Err(_) => Err(ParseError::ValidationFailed {
                    name: argument.display(),
                    value,
                    message: "expected a non-negative count".to_string(),
                }),
            }
        }
        _ => {
            let values = split(argument, raw);
            let arity = argument.get_arity();

            if values.len() < arity.min {
                return Err(ParseError::MissingValue {
                    name: argument.display(),
                    expected: arity.min,
                    provided: values.len(),
                });
            }

            if let Some(max) = arity.max {
                if argument.action != Action::Append && values.len() > max {
                    return Err(ParseError::TooManyValues {
                        name: argument.display(),
                        expected: max,
                        provided: values.len(),
                    });
                }
            }

            pipeline(argument, values, policy)
        }
    }
}

fn single(argument: &Argument, raw: Vec<String>) -> Result<String, ParseError> {
    let provided = raw.len();
    let mut iter = raw.into_iter();

    match (iter.next(), iter.next()) {
        (Some(value), None) => Ok(value),
        _ => Err(ParseError::TooManyValues {
            name: argument.display(),
            expected: 1,
            provided,
        }),
    }
}

/// Split every value on the argument's delimiter.
pub(crate) fn split(argument: &Argument, values: Vec<String>) -> Vec<String> {
    match argument.delimiter {
        Some(delimiter) => values
            .iter()
            .flat_map(|value| value.split(delimiter).map(str::to_string))
            .collect(),
        None => values,
    }
}

/// Run every value through the transformers, then the choices check, then the validators.
pub(crate) fn pipeline(
    argument: &Argument,
    values: Vec<String>,
    policy: &Policy,
) -> Result<Vec<String>, ParseError> {
    values
        .into_iter()
        .map(|value| {
            let value = argument
                .transformers
                .iter()
                .fold(value, |value, transformer| transformer.apply(&value));

            if !argument.choices.is_empty() && !argument.choices.contains(&value) {
                return Err(ParseError::InvalidValue {
                    name: argument.display(),
                    suggestions: suggest(
                        &value,
                        &argument.choices,
                        policy.suggest_threshold,
                        MAX_SUGGESTIONS,
                    ),
                    value,
                    choices: argument.choices.clone(),
                });
            }

            for validator in &argument.validators {
                if let Err(message) = validator.check(&value) {
                    return Err(ParseError::ValidationFailed {
                        name: argument.display(),
                        value,
                        message,
                    });
                }
            }

            Ok(value)
        })
        .collect()
}

/// Fill every unset argument with its conditional or static default.
pub(crate) fn apply_defaults(scope: &Scope, matches: &mut Matches) {
    let (unconditional, conditional): (Vec<&Argument>, Vec<&Argument>) = scope
        .arguments
        .iter()
        .copied()
        .filter(|a| !a.action.is_signal())
        .partition(|a| a.default_value_if.is_empty());

    for argument in unconditional.into_iter().chain(conditional) {
        if matches.contains(&argument.name) {
            continue;
        }

        let triggered = argument
            .default_value_if
            .iter()
            .find(|(peer, value, _)| {
                matches
                    .values_of(peer)
                    .map_or(false, |values| values.contains(value))
            })
            .map(|(_, _, default)| vec![default.clone()]);

        let values = match triggered {
            Some(values) => values,
            None if !argument.defaults.is_empty() => argument.defaults.clone(),
            None => match argument.action {
                Action::StoreTrue => vec!["false".to_string()],
                Action::StoreFalse => vec!["true".to_string()],
                _ => continue,
            },
        };

        matches.insert(ArgMatch::new(
            &argument.name,
            values,
            0,
            ValueSource::Default,
        ));
    }
}
