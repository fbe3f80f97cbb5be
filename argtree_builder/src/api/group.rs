use crate::model::GroupKind;

/// A named set of arguments with a membership constraint.
/// Used with [`Command::group`](./struct.Command.html#method.group).
///
/// Group names may also be referenced from [`Argument::conflicts_with`](crate::Argument::conflicts_with)
/// and [`Argument::requires`](crate::Argument::requires).
///
/// ### Example
/// ```
/// # use argtree_builder as argtree;
/// use argtree::{ArgGroup, Argument, Command, ParseError};
///
/// let parser = Command::new("program")
///     .add(Argument::flag("json"))
///     .add(Argument::flag("yaml"))
///     .group(ArgGroup::mutually_exclusive("format").members(vec!["json", "yaml"]))
///     .build()
///     .unwrap();
///
/// let error = parser.parse_tokens(&["--json", "--yaml"]).unwrap_err();
/// assert!(matches!(error, ParseError::MutuallyExclusive { .. }));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgGroup {
    pub(crate) name: String,
    pub(crate) members: Vec<String>,
    pub(crate) kind: GroupKind,
    pub(crate) required: bool,
}

impl ArgGroup {
    /// Create a display-only group.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::default(),
            kind: GroupKind::Normal,
            required: false,
        }
    }

    /// Create a group in which at most one member may be present.
    pub fn mutually_exclusive(name: impl Into<String>) -> Self {
        Self::new(name).kind(GroupKind::MutuallyExclusive)
    }

    /// Create a group whose members must be present all together, or not at all.
    pub fn required_together(name: impl Into<String>) -> Self {
        Self::new(name).kind(GroupKind::RequiredTogether)
    }

    /// Create a required group in which at least one member must be present.
    pub fn at_least_one(name: impl Into<String>) -> Self {
        Self::new(name).kind(GroupKind::AtLeastOne).required(true)
    }

    /// Set the constraint kind.
    pub fn kind(mut self, kind: GroupKind) -> Self {
        self.kind = kind;
        self
    }

    /// Add a member by argument name.
    pub fn member(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.members.contains(&name) {
            self.members.push(name);
        }
        self
    }

    /// Add several members by argument name.
    pub fn members(self, names: Vec<impl Into<String>>) -> Self {
        names.into_iter().fold(self, |group, name| group.member(name))
    }

    /// Require at least one member to be present.
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// The group name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The member argument names, in insertion order.
    pub fn get_members(&self) -> &[String] {
        &self.members
    }

    /// The constraint kind.
    pub fn get_kind(&self) -> GroupKind {
        self.kind
    }
}
