/// The cardinality shorthand for an argument/option.
///
/// Inspired by argparse: <https://docs.python.org/3/library/argparse.html#nargs>
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nargs {
    /// `N`: Precisely `N` values.
    Precisely(usize),
    /// `?`: Zero or one value.
    Optional,
    /// `*`: May be any number of values, including `0`.
    Any,
    /// `+`: At least one value must be specified.
    AtLeastOne,
}

impl std::fmt::Display for Nargs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// The `{min, max}` bound on how many values one occurrence of an argument consumes.
/// A `max` of `None` is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Arity {
    pub(crate) min: usize,
    pub(crate) max: Option<usize>,
}

impl Arity {
    /// A bounded arity `[min, max]`.
    pub const fn range(min: usize, max: usize) -> Self {
        Self {
            min,
            max: Some(max),
        }
    }

    /// An unbounded arity `[min, ∞)`.
    pub const fn at_least(min: usize) -> Self {
        Self { min, max: None }
    }

    /// Precisely `n` values.
    pub const fn exactly(n: usize) -> Self {
        Self::range(n, n)
    }

    /// The minimum number of values.
    pub fn min(&self) -> usize {
        self.min
    }

    /// The maximum number of values (`None` when unbounded).
    pub fn max(&self) -> Option<usize> {
        self.max
    }

    /// Whether the arity accepts any values at all.
    pub fn takes_values(&self) -> bool {
        self.max != Some(0)
    }

    /// Whether the arity accepts more than one value per occurrence.
    pub fn is_variadic(&self) -> bool {
        match self.max {
            Some(n) => n > 1,
            None => true,
        }
    }

    pub(crate) fn is_valid(&self) -> bool {
        match self.max {
            Some(n) => self.min <= n,
            None => true,
        }
    }
}

impl From<Nargs> for Arity {
    fn from(value: Nargs) -> Self {
        match value {
            Nargs::Precisely(n) => Arity::exactly(n),
            Nargs::Optional => Arity::range(0, 1),
            Nargs::Any => Arity::at_least(0),
            Nargs::AtLeastOne => Arity::at_least(1),
        }
    }
}

impl std::fmt::Display for Arity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.max {
            Some(max) if max == self.min => write!(f, "[{}]", self.min),
            Some(max) => write!(f, "[{}, {}]", self.min, max),
            None => write!(f, "[{}, ∞)", self.min),
        }
    }
}

/// What the parser does when an argument is matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Record the value(s) of the occurrence.
    Store,
    /// Record `true`; takes no values.
    StoreTrue,
    /// Record `false`; takes no values.
    StoreFalse,
    /// Accumulate the values of every occurrence.
    Append,
    /// Count the occurrences; takes no values.
    Count,
    /// Stop parsing and produce the help message.
    Help,
    /// Stop parsing and produce the version string.
    Version,
    /// Stop parsing and produce a completion script.
    Completion,
}

impl Action {
    /// The arity this action implies when none is configured explicitly.
    pub fn default_arity(&self) -> Arity {
        match self {
            Action::Store | Action::Append => Arity::exactly(1),
            Action::StoreTrue
            | Action::StoreFalse
            | Action::Count
            | Action::Help
            | Action::Version => Arity::exactly(0),
            Action::Completion => Arity::range(0, 1),
        }
    }

    /// Whether this action is a control signal that short-circuits the parse.
    pub fn is_signal(&self) -> bool {
        matches!(self, Action::Help | Action::Version | Action::Completion)
    }

    pub(crate) fn is_flag(&self) -> bool {
        matches!(self, Action::StoreTrue | Action::StoreFalse)
    }
}

/// How repeated command line occurrences of the same single-valued argument are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConflictMode {
    /// A repeated single-valued argument is an error.
    #[default]
    Error,
    /// Every new occurrence clears and replaces the previous value(s).
    LastWins,
    /// Later occurrences are consumed but ignored.
    FirstWins,
}

/// How validation violations are surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ErrorMode {
    /// Fail on the first violation.
    #[default]
    FirstError,
    /// Collect every validation violation and report them together.
    Aggregate,
}

/// The constraint kind of an [`ArgGroup`](crate::ArgGroup).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GroupKind {
    /// Display grouping only (when marked required, at least one member must be present).
    #[default]
    Normal,
    /// At most one member may be present.
    MutuallyExclusive,
    /// Either all members are present, or none.
    RequiredTogether,
    /// When the group is required, at least one member must be present.
    AtLeastOne,
}

/// Which layer last supplied an argument's value, ordered lowest precedence first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ValueSource {
    /// The static or conditional default.
    Default,
    /// A configuration file layer.
    ConfigFile,
    /// An environment variable.
    Environment,
    /// The command line tokens.
    CommandLine,
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ValueSource::Default => "default",
            ValueSource::ConfigFile => "config file",
            ValueSource::Environment => "environment",
            ValueSource::CommandLine => "command line",
        };
        write!(f, "{label}")
    }
}
