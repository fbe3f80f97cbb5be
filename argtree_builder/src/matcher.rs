mod matches;
mod model;

pub use matches::*;
pub(crate) use model::*;
