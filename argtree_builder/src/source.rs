use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Read access to environment variables.
///
/// The parser never reads the process environment directly; pass a [`MapEnvironment`] for hermetic parsing.
pub trait Environment {
    /// The value of `name`, or `None` when it is unset.
    fn var(&self, name: &str) -> Option<String>;
}

/// The real process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// An in-memory environment.
///
/// ### Example
/// ```
/// # use argtree_builder as argtree;
/// use argtree::{Environment, MapEnvironment};
///
/// let environment = MapEnvironment::default().with("APP_PORT", "8080");
/// assert_eq!(environment.var("APP_PORT"), Some("8080".to_string()));
/// assert_eq!(environment.var("APP_HOST"), None);
/// ```
#[derive(Debug, Default, Clone)]
pub struct MapEnvironment(HashMap<String, String>);

impl MapEnvironment {
    /// Set a variable.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapEnvironment {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl Environment for MapEnvironment {
    fn var(&self, name: &str) -> Option<String> {
        self.0.get(name).cloned()
    }
}

/// A single configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValue {
    /// A scalar, already rendered as a string.
    Single(String),
    /// A list of scalars.
    List(Vec<String>),
}

impl ConfigValue {
    /// The value(s) as raw strings.
    pub fn values(&self) -> Vec<String> {
        match self {
            ConfigValue::Single(value) => vec![value.clone()],
            ConfigValue::List(values) => values.clone(),
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        ConfigValue::Single(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        ConfigValue::Single(value)
    }
}

impl From<Vec<&str>> for ConfigValue {
    fn from(values: Vec<&str>) -> Self {
        ConfigValue::List(values.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<String>> for ConfigValue {
    fn from(values: Vec<String>) -> Self {
        ConfigValue::List(values)
    }
}

/// One configuration layer: flat dotted keys to values.
/// Later layers override earlier ones key by key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigLayer {
    origin: String,
    values: HashMap<String, ConfigValue>,
}

impl ConfigLayer {
    /// Create an empty layer, labelled by `origin` in diagnostics.
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            values: HashMap::default(),
        }
    }

    /// Set a key.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Set a key in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ConfigValue>) {
        self.values.insert(key.into(), value.into());
    }

    /// Look up a key.
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.values.get(key)
    }

    /// Where this layer came from.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// The number of keys.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the layer has no keys.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub(crate) fn merge(&mut self, other: ConfigLayer) {
        self.values.extend(other.values);
    }
}

/// A failure to produce a [`ConfigLayer`] from a file.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigReadError {
    /// The file does not exist.
    #[error("config file '{}' not found", .0.display())]
    NotFound(PathBuf),
    /// The file exists but cannot be read.
    #[error("config file '{}' could not be read: {message}", .path.display())]
    Unreadable {
        /// The file path.
        path: PathBuf,
        /// The underlying cause.
        message: String,
    },
    /// The file contents cannot be parsed.
    #[error("config file '{}' is malformed: {message}", .path.display())]
    Malformed {
        /// The file path.
        path: PathBuf,
        /// The underlying cause.
        message: String,
    },
}

/// Turns a file path into a [`ConfigLayer`].
pub trait ConfigReader {
    /// Read and flatten the file at `path`.
    fn read(&self, path: &Path) -> Result<ConfigLayer, ConfigReadError>;
}

/// Reads TOML files from disk, flattening nested tables into dotted keys.
///
/// ```toml
/// threads = 4
///
/// [remote.add]
/// url = "https://example.com"
/// ```
/// yields the keys `threads` and `remote.add.url`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TomlReader;

impl TomlReader {
    /// Flatten TOML `content` into a layer labelled `origin`.
    pub fn parse(origin: impl Into<String>, content: &str) -> Result<ConfigLayer, String> {
        let table = content
            .parse::<toml::Table>()
            .map_err(|error| error.to_string())?;
        let mut layer = ConfigLayer::new(origin);
        flatten(&mut layer, None, &table);
        Ok(layer)
    }
}

impl ConfigReader for TomlReader {
    fn read(&self, path: &Path) -> Result<ConfigLayer, ConfigReadError> {
        if !path.exists() {
            return Err(ConfigReadError::NotFound(path.to_path_buf()));
        }

        let content =
            std::fs::read_to_string(path).map_err(|error| ConfigReadError::Unreadable {
                path: path.to_path_buf(),
                message: error.to_string(),
            })?;

        TomlReader::parse(path.display().to_string(), &content).map_err(|message| {
            ConfigReadError::Malformed {
                path: path.to_path_buf(),
                message,
            }
        })
    }
}

/// Serves TOML documents from memory, keyed by path.
#[derive(Debug, Default, Clone)]
pub struct InMemoryReader(HashMap<PathBuf, String>);

impl InMemoryReader {
    /// Register a TOML document under `path`.
    pub fn with(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.0.insert(path.into(), content.into());
        self
    }
}

impl ConfigReader for InMemoryReader {
    fn read(&self, path: &Path) -> Result<ConfigLayer, ConfigReadError> {
        let content = self
            .0
            .get(path)
            .ok_or_else(|| ConfigReadError::NotFound(path.to_path_buf()))?;

        TomlReader::parse(path.display().to_string(), content).map_err(|message| {
            ConfigReadError::Malformed {
                path: path.to_path_buf(),
                message,
            }
        })
    }
}

fn flatten(layer: &mut ConfigLayer, prefix: Option<&str>, table: &toml::Table) {
    for (key, value) in table {
        let key = match prefix {
            Some(prefix) => format!("{prefix}.{key}"),
            None => key.clone(),
        };

        match value {
            toml::Value::Table(inner) => flatten(layer, Some(&key), inner),
            toml::Value::Array(items) => {
                layer.insert(key, items.iter().map(scalar).collect::<Vec<String>>());
            }
            other => layer.insert(key, scalar(other)),
        }
    }
}

fn scalar(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        toml::Value::Integer(i) => i.to_string(),
        toml::Value::Float(f) => f.to_string(),
        toml::Value::Boolean(b) => b.to_string(),
        toml::Value::Datetime(d) => d.to_string(),
        nested => nested.to_string(),
    }
}
