//! Builder module for `argtree`.
//! See [documentation root](https://docs.rs/argtree/latest/argtree/index.html) for full details.
#![deny(missing_docs)]
mod api;
mod constant;
mod matcher;
mod model;
mod parser;
mod source;

pub use api::*;
pub use constant::{EXIT_CONFIG, EXIT_DATA, EXIT_SUCCESS, EXIT_USAGE};
pub use matcher::{ArgMatch, InvalidConversion, Matches};
pub use model::*;
pub use parser::{
    damerau_levenshtein, suggest, ConfigError, ConsoleInterface, ErrorContext, Outcome, ParseError,
    Parser, UserInterface,
};
pub use source::*;

#[cfg(test)]
#[macro_use]
extern crate assert_matches;

#[cfg(test)]
pub(crate) mod test {
    macro_rules! assert_contains {
        ($base:expr, $sub:expr) => {{
            let base = &$base;
            let sub = $sub;
            assert!(base.contains(sub), "'{base}' does not contain '{sub}'");
        }};
    }

    pub(crate) use assert_contains;
}
