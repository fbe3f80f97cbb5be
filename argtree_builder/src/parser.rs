mod dispatch;
mod error;
mod interface;
mod middleware;
mod printer;
mod resolve;
mod scope;
mod suggest;
mod validate;

pub use error::{ConfigError, ParseError};
pub(crate) use error::Violations;
pub use interface::{ConsoleInterface, UserInterface};
pub use middleware::{Outcome, Parser};
pub use printer::ErrorContext;
pub use suggest::{damerau_levenshtein, suggest};

#[cfg(test)]
pub(crate) use interface::util;
