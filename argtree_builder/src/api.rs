mod argument;
mod command;
mod group;

pub(crate) use argument::LongForm;
pub use argument::*;
pub(crate) use command::{ConfigSource, Settings};
pub use command::*;
pub use group::*;
