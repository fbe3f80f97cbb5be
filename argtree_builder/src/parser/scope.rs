use crate::api::{Argument, Command, Settings};
use crate::constant::DEFAULT_SUGGEST_THRESHOLD;
use crate::model::{ConflictMode, ErrorMode};

/// The concrete tree policies in effect for one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Policy {
    pub(crate) conflict_mode: ConflictMode,
    pub(crate) error_mode: ErrorMode,
    pub(crate) allow_partial_matching: bool,
    pub(crate) allow_hyphen_values: bool,
    pub(crate) allow_negative_numbers: bool,
    pub(crate) env_prefix: Option<String>,
    pub(crate) suggest_threshold: usize,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            conflict_mode: ConflictMode::default(),
            error_mode: ErrorMode::default(),
            allow_partial_matching: false,
            allow_hyphen_values: false,
            allow_negative_numbers: false,
            env_prefix: None,
            suggest_threshold: DEFAULT_SUGGEST_THRESHOLD,
        }
    }
}

impl Policy {
    pub(crate) fn inherit(&self, settings: &Settings) -> Policy {
        Policy {
            conflict_mode: settings.conflict_mode.unwrap_or(self.conflict_mode),
            error_mode: settings.error_mode.unwrap_or(self.error_mode),
            allow_partial_matching: settings
                .allow_partial_matching
                .unwrap_or(self.allow_partial_matching),
            allow_hyphen_values: settings
                .allow_hyphen_values
                .unwrap_or(self.allow_hyphen_values),
            allow_negative_numbers: settings
                .allow_negative_numbers
                .unwrap_or(self.allow_negative_numbers),
            env_prefix: settings
                .env_prefix
                .clone()
                .or_else(|| self.env_prefix.clone()),
            suggest_threshold: settings
                .suggest_threshold
                .unwrap_or(self.suggest_threshold),
        }
    }
}

/// A command as seen during a parse: its own arguments plus the globals of its ancestors.
#[derive(Debug)]
pub(crate) struct Scope<'a> {
    pub(crate) command: &'a Command,
    pub(crate) arguments: Vec<&'a Argument>,
    /// Global arguments visible here, which also flow to every descendant.
    pub(crate) globals: Vec<&'a Argument>,
    pub(crate) policy: Policy,
    path: Vec<&'a str>,
}

impl<'a> Scope<'a> {
    pub(crate) fn root(command: &'a Command) -> Self {
        Self::new(command, Vec::default(), Policy::default(), vec![&command.name])
    }

    pub(crate) fn child(&self, command: &'a Command) -> Scope<'a> {
        let mut path = self.path.clone();
        path.push(&command.name);
        Self::new(command, self.globals.clone(), self.policy.clone(), path)
    }

    fn new(
        command: &'a Command,
        inherited_globals: Vec<&'a Argument>,
        parent_policy: Policy,
        path: Vec<&'a str>,
    ) -> Self {
        // A local argument shadows an inherited global of the same name.
        let inherited: Vec<&'a Argument> = inherited_globals
            .into_iter()
            .filter(|g| command.argument(&g.name).is_none())
            .collect();
        let mut arguments: Vec<&'a Argument> = command.arguments.iter().collect();
        arguments.extend(inherited.iter().copied());
        let mut globals = inherited;
        globals.extend(command.arguments.iter().filter(|a| a.global));

        Self {
            command,
            arguments,
            globals,
            policy: parent_policy.inherit(&command.settings),
            path,
        }
    }

    pub(crate) fn argument(&self, name: &str) -> Option<&'a Argument> {
        self.arguments.iter().copied().find(|a| a.name == name)
    }

    pub(crate) fn is_global(&self, name: &str) -> bool {
        self.globals.iter().any(|g| g.name == name)
    }

    /// Positional slots, ordered by position, explicit indices first, then insertion order.
    pub(crate) fn positionals(&self) -> Vec<&'a Argument> {
        let mut positionals: Vec<((usize, bool, usize), &'a Argument)> = self
            .arguments
            .iter()
            .copied()
            .filter(|a| a.positional)
            .enumerate()
            .map(|(i, a)| ((a.index.unwrap_or(i), a.index.is_none(), i), a))
            .collect();
        positionals.sort_by_key(|(order, _)| *order);
        positionals.into_iter().map(|(_, a)| a).collect()
    }

    /// The dotted config section of this command (`None` at the root).
    pub(crate) fn config_prefix(&self) -> Option<String> {
        if self.path.len() > 1 {
            Some(self.path[1..].join("."))
        } else {
            None
        }
    }

    /// The invocation prefix shown in usage strings (`program sub`).
    pub(crate) fn program(&self) -> String {
        self.path.join(" ")
    }

    /// The root command name.
    pub(crate) fn binary(&self) -> &'a str {
        self.path[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_inherit() {
        let parent = Policy::default().inherit(&Settings {
            conflict_mode: Some(ConflictMode::LastWins),
            env_prefix: Some("APP".to_string()),
            suggest_threshold: Some(1),
            ..Settings::default()
        });
        let child = parent.inherit(&Settings {
            error_mode: Some(ErrorMode::Aggregate),
            suggest_threshold: Some(2),
            ..Settings::default()
        });

        assert_eq!(child.conflict_mode, ConflictMode::LastWins);
        assert_eq!(child.error_mode, ErrorMode::Aggregate);
        assert_eq!(child.env_prefix, Some("APP".to_string()));
        assert_eq!(child.suggest_threshold, 2);
        assert!(!child.allow_partial_matching);
    }

    #[test]
    fn child_globals() {
        let command = Command::new("program")
            .add(Argument::flag("verbose").global(true))
            .add(Argument::flag("local"))
            .subcommand(
                Command::new("a")
                    .add(Argument::option("config").global(true))
                    .subcommand(Command::new("b").add(Argument::option("verbose"))),
            );
        let root = Scope::root(&command);
        let a = root.child(command.find_subcommand("a").unwrap());
        let b = a.child(a.command.find_subcommand("b").unwrap());

        assert_eq!(root.program(), "program");
        assert_eq!(root.config_prefix(), None);
        assert!(root.is_global("verbose"));
        assert!(!root.is_global("local"));

        assert_eq!(a.program(), "program a");
        assert_eq!(a.binary(), "program");
        assert_eq!(a.config_prefix(), Some("a".to_string()));
        assert!(a.argument("verbose").is_some());
        assert!(a.argument("local").is_none());
        assert!(a.is_global("config"));

        assert_eq!(b.config_prefix(), Some("a.b".to_string()));
        assert!(b.argument("config").is_some());
        // Shadowed by the local option.
        assert!(!b.argument("verbose").unwrap().global);
        assert!(!b.is_global("verbose"));
    }

    #[test]
    fn positional_order() {
        let command = Command::new("program")
            .add(Argument::positional("a"))
            .add(Argument::flag("flag"))
            .add(Argument::positional("b"))
            .add(Argument::positional("c").index(0));
        let scope = Scope::root(&command);

        let names: Vec<&str> = scope.positionals().iter().map(|a| a.name()).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }

    #[test]
    fn positional_order_explicit() {
        let command = Command::new("program")
            .add(Argument::positional("a"))
            .add(Argument::positional("b"))
            .add(Argument::positional("c").index(1))
            .add(Argument::positional("d").index(5));
        let scope = Scope::root(&command);

        let names: Vec<&str> = scope.positionals().iter().map(|a| a.name()).collect();
        assert_eq!(names, vec!["a", "c", "b", "d"]);
    }
}
