use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use crate::api::{ArgGroup, Argument};
use crate::constant::*;
use crate::matcher::Matches;
use crate::model::{Action, ConflictMode, ErrorMode, GroupKind};
use crate::parser::{ConfigError, ConsoleInterface, Parser, UserInterface};
use crate::source::ConfigLayer;

/// Callbacks invoked at the named checkpoints of a command's parse.
///
/// Every checkpoint defaults to a no-op; returning `Err(message)` fails the parse with
/// [`ParseError::HookFailed`](crate::ParseError::HookFailed).
///
/// ### Example
/// ```
/// # use argtree_builder as argtree;
/// use argtree::{Argument, Command, Matches, ParseError, ParseHook};
///
/// struct NoRoot;
///
/// impl ParseHook for NoRoot {
///     fn post_validation(&self, _: &Command, matches: &Matches) -> Result<(), String> {
///         match matches.value_of("user") {
///             Some("root") => Err("refusing to run as root".to_string()),
///             _ => Ok(()),
///         }
///     }
/// }
///
/// let parser = Command::new("program")
///     .add(Argument::option("user"))
///     .hook(NoRoot)
///     .build()
///     .unwrap();
///
/// let error = parser.parse_tokens(&["--user", "root"]).unwrap_err();
/// assert!(matches!(error, ParseError::HookFailed { .. }));
/// ```
pub trait ParseHook {
    /// Runs before any token of this command is dispatched; sees the command's remaining tokens.
    fn pre_dispatch(&self, _command: &Command, _tokens: &[String]) -> Result<(), String> {
        Ok(())
    }

    /// Runs after the tokens of this command (and any subcommand) have been dispatched.
    fn post_dispatch(&self, _command: &Command, _matches: &Matches) -> Result<(), String> {
        Ok(())
    }

    /// Runs after validation and defaults, with the final matches of this command.
    fn post_validation(&self, _command: &Command, _matches: &Matches) -> Result<(), String> {
        Ok(())
    }
}

/// Tree policies which a command inherits from its parent unless set locally.
#[derive(Debug, Clone, Default)]
pub(crate) struct Settings {
    pub(crate) conflict_mode: Option<ConflictMode>,
    pub(crate) error_mode: Option<ErrorMode>,
    pub(crate) allow_partial_matching: Option<bool>,
    pub(crate) allow_hyphen_values: Option<bool>,
    pub(crate) allow_negative_numbers: Option<bool>,
    pub(crate) env_prefix: Option<String>,
    pub(crate) suggest_threshold: Option<usize>,
}

#[derive(Debug, Clone)]
pub(crate) enum ConfigSource {
    Layer(ConfigLayer),
    File { path: PathBuf, required: bool },
}

#[derive(Debug, Clone, Default)]
pub(crate) struct ConfigSetup {
    pub(crate) sources: Vec<ConfigSource>,
    pub(crate) config_arg: Option<String>,
    pub(crate) config_env: Option<String>,
    pub(crate) default_file: Option<PathBuf>,
}

impl ConfigSetup {
    fn is_empty(&self) -> bool {
        self.sources.is_empty()
            && self.config_arg.is_none()
            && self.config_env.is_none()
            && self.default_file.is_none()
    }
}

/// One node in the command tree.
///
/// ### Example
/// ```
/// # use argtree_builder as argtree;
/// use argtree::{Argument, Command};
///
/// let parser = Command::new("git")
///     .subcommand(
///         Command::new("remote")
///             .subcommand(
///                 Command::new("add")
///                     .add(Argument::positional("name"))
///                     .add(Argument::positional("url")),
///             )
///             .subcommand(
///                 Command::new("remove")
///                     .alias("rm")
///                     .add(Argument::positional("name")),
///             ),
///     )
///     .build()
///     .unwrap();
///
/// let matches = parser
///     .parse_tokens(&["remote", "rm", "origin"])
///     .unwrap()
///     .matches()
///     .unwrap();
/// let (name, remote) = matches.subcommand().unwrap();
/// assert_eq!(name, "remote");
/// let (name, remove) = remote.subcommand().unwrap();
/// assert_eq!(name, "remove");
/// assert_eq!(remove.value_of("name"), Some("origin"));
/// ```
#[derive(Clone)]
pub struct Command {
    pub(crate) name: String,
    pub(crate) about: Option<String>,
    pub(crate) version: Option<String>,
    pub(crate) aliases: Vec<String>,
    pub(crate) visible_aliases: Vec<String>,
    pub(crate) hidden: bool,
    pub(crate) arguments: Vec<Argument>,
    pub(crate) commands: Vec<Command>,
    pub(crate) groups: Vec<ArgGroup>,
    pub(crate) settings: Settings,
    pub(crate) subcommand_required: bool,
    pub(crate) allow_external_subcommands: bool,
    pub(crate) allow_subcommand_prefix: bool,
    pub(crate) trailing: Option<String>,
    pub(crate) propagate_version: bool,
    pub(crate) disable_help_flag: bool,
    pub(crate) config: ConfigSetup,
    pub(crate) hooks: Vec<Arc<dyn ParseHook>>,
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("arguments", &self.arguments)
            .field("commands", &self.commands)
            .field("groups", &self.groups)
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

impl Command {
    /// Create a command named `name` (the program name, for the root).
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            about: None,
            version: None,
            aliases: Vec::default(),
            visible_aliases: Vec::default(),
            hidden: false,
            arguments: Vec::default(),
            commands: Vec::default(),
            groups: Vec::default(),
            settings: Settings::default(),
            subcommand_required: false,
            allow_external_subcommands: false,
            allow_subcommand_prefix: false,
            trailing: None,
            propagate_version: false,
            disable_help_flag: false,
            config: ConfigSetup::default(),
            hooks: Vec::default(),
        }
    }

    /// Document what the command does.
    pub fn about(mut self, about: impl Into<String>) -> Self {
        self.about = Some(about.into());
        self
    }

    /// Set the version string; also enables `--version`/`-V`.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Add a hidden alias for this command.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Add an alias which is shown in help and offered as a suggestion.
    pub fn visible_alias(mut self, alias: impl Into<String>) -> Self {
        self.visible_aliases.push(alias.into());
        self
    }

    /// Hide the command from help and suggestions.
    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    /// Add an argument.
    pub fn add(mut self, argument: Argument) -> Self {
        self.arguments.push(argument);
        self
    }

    /// Add a child command.
    pub fn subcommand(mut self, command: Command) -> Self {
        self.commands.push(command);
        self
    }

    /// Add an argument group.
    pub fn group(mut self, group: ArgGroup) -> Self {
        self.groups.push(group);
        self
    }

    /// How repeated command line occurrences are resolved.
    pub fn conflict_mode(mut self, mode: ConflictMode) -> Self {
        self.settings.conflict_mode = Some(mode);
        self
    }

    /// Whether validation fails fast or aggregates every violation.
    pub fn error_mode(mut self, mode: ErrorMode) -> Self {
        self.settings.error_mode = Some(mode);
        self
    }

    /// Accept unambiguous prefixes of long option names.
    pub fn allow_partial_matching(mut self, allow: bool) -> Self {
        self.settings.allow_partial_matching = Some(allow);
        self
    }

    /// Accept values that start with a hyphen for every argument.
    pub fn allow_hyphen_values(mut self, allow: bool) -> Self {
        self.settings.allow_hyphen_values = Some(allow);
        self
    }

    /// Treat tokens such as `-5` or `-0.5` as values rather than short options.
    pub fn allow_negative_numbers(mut self, allow: bool) -> Self {
        self.settings.allow_negative_numbers = Some(allow);
        self
    }

    /// Read argument values from `<prefix>_<NAME>` environment variables.
    pub fn env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.settings.env_prefix = Some(prefix.into());
        self
    }

    /// The maximum edit distance for suggestions.
    pub fn suggest_threshold(mut self, threshold: usize) -> Self {
        self.settings.suggest_threshold = Some(threshold);
        self
    }

    /// Fail when none of the child commands is invoked.
    pub fn subcommand_required(mut self, required: bool) -> Self {
        self.subcommand_required = required;
        self
    }

    /// Accept an unknown first positional as an external subcommand, capturing every following token.
    pub fn allow_external_subcommands(mut self, allow: bool) -> Self {
        self.allow_external_subcommands = allow;
        self
    }

    /// Accept unambiguous prefixes of child command names.
    pub fn allow_subcommand_prefix(mut self, allow: bool) -> Self {
        self.allow_subcommand_prefix = allow;
        self
    }

    /// Capture every remaining token under `name` once the positional slots are exhausted.
    pub fn trailing_var_arg(mut self, name: impl Into<String>) -> Self {
        self.trailing = Some(name.into());
        self
    }

    /// Copy this command's version to every descendant that lacks one.
    pub fn propagate_version(mut self, propagate: bool) -> Self {
        self.propagate_version = propagate;
        self
    }

    /// Do not add the `--help`/`-h` flag.
    pub fn disable_help_flag(mut self, disable: bool) -> Self {
        self.disable_help_flag = disable;
        self
    }

    /// Add an in-memory config layer (later layers override earlier ones).
    pub fn config_layer(mut self, layer: ConfigLayer) -> Self {
        self.config.sources.push(ConfigSource::Layer(layer));
        self
    }

    /// Add a config file layer; a `required` file which cannot be read fails the parse.
    pub fn config_file(mut self, path: impl Into<PathBuf>, required: bool) -> Self {
        self.config.sources.push(ConfigSource::File {
            path: path.into(),
            required,
        });
        self
    }

    /// Name the argument whose value is the path of the top config file.
    pub fn config_arg(mut self, argument: impl Into<String>) -> Self {
        self.config.config_arg = Some(argument.into());
        self
    }

    /// Name the environment variable holding the path of the top config file.
    pub fn config_env(mut self, variable: impl Into<String>) -> Self {
        self.config.config_env = Some(variable.into());
        self
    }

    /// The top config file used when neither the config argument nor the config variable is given.
    pub fn default_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.default_file = Some(path.into());
        self
    }

    /// Register a checkpoint hook.
    pub fn hook(mut self, hook: impl ParseHook + 'static) -> Self {
        self.hooks.push(Arc::new(hook));
        self
    }

    /// Build the parser, printing through the console.
    pub fn build(self) -> Result<Parser, ConfigError> {
        self.build_with(ConsoleInterface::default())
    }

    /// Build the parser, printing through `user_interface`.
    pub fn build_with(
        mut self,
        user_interface: impl UserInterface + 'static,
    ) -> Result<Parser, ConfigError> {
        self.finalize(true, None, false, &[])?;
        Ok(Parser::new(self, Box::new(user_interface)))
    }
}

// Read-only accessors for help/usage/completion consumers.
#[allow(missing_docs)]
impl Command {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get_about(&self) -> Option<&str> {
        self.about.as_deref()
    }

    pub fn get_version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn get_aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn get_visible_aliases(&self) -> &[String] {
        &self.visible_aliases
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn get_arguments(&self) -> &[Argument] {
        &self.arguments
    }

    pub fn get_subcommands(&self) -> &[Command] {
        &self.commands
    }

    pub fn get_groups(&self) -> &[ArgGroup] {
        &self.groups
    }

    pub fn find_subcommand(&self, name: &str) -> Option<&Command> {
        self.commands.iter().find(|c| c.matches_name(name))
    }
}

impl Command {
    pub(crate) fn matches_name(&self, token: &str) -> bool {
        self.name == token
            || self.aliases.iter().any(|a| a == token)
            || self.visible_aliases.iter().any(|a| a == token)
    }

    /// Names which subcommand prefix matching and suggestions may offer.
    pub(crate) fn visible_names(&self) -> Vec<&str> {
        if self.hidden {
            return Vec::default();
        }

        std::iter::once(&self.name)
            .chain(self.visible_aliases.iter())
            .map(String::as_str)
            .collect()
    }

    pub(crate) fn argument(&self, name: &str) -> Option<&Argument> {
        self.arguments.iter().find(|a| a.name == name)
    }

    fn group_mut(&mut self, name: &str) -> Option<&mut ArgGroup> {
        self.groups.iter_mut().find(|g| g.name == name)
    }

    fn finalize(
        &mut self,
        is_root: bool,
        inherited_version: Option<&str>,
        propagate: bool,
        ancestor_globals: &[Argument],
    ) -> Result<(), ConfigError> {
        if !is_root && !self.config.is_empty() {
            return Err(ConfigError(format!(
                "config sources may only be declared on the root command, not '{}'.",
                self.name
            )));
        }

        if propagate && self.version.is_none() {
            self.version = inherited_version.map(str::to_string);
        }

        self.fold_groups();
        self.add_builtins();

        let globals: Vec<&Argument> = ancestor_globals
            .iter()
            .filter(|g| self.argument(&g.name).is_none())
            .collect();
        self.check_arguments(&globals)?;
        self.check_references(&globals)?;
        self.check_commands()?;

        let mut descendant_globals: Vec<Argument> =
            globals.into_iter().cloned().collect::<Vec<Argument>>();
        descendant_globals.extend(self.arguments.iter().filter(|a| a.global).cloned());
        let version = self.version.clone();
        let propagate = propagate || self.propagate_version;

        for command in self.commands.iter_mut() {
            command.finalize(false, version.as_deref(), propagate, &descendant_globals)?;
        }

        Ok(())
    }

    fn fold_groups(&mut self) {
        let tags: Vec<(String, String, GroupKind)> = self
            .arguments
            .iter()
            .flat_map(|a| {
                let group = a
                    .group
                    .as_ref()
                    .map(|g| (g.clone(), a.name.clone(), GroupKind::Normal));
                let exclusive = a
                    .exclusive_group
                    .as_ref()
                    .map(|g| (g.clone(), a.name.clone(), GroupKind::MutuallyExclusive));
                group.into_iter().chain(exclusive)
            })
            .collect();

        for (group, member, kind) in tags {
            match self.group_mut(&group) {
                Some(existing) => {
                    if !existing.members.contains(&member) {
                        existing.members.push(member);
                    }
                }
                None => self.groups.push(ArgGroup::new(group).kind(kind).member(member)),
            }
        }
    }

    fn add_builtins(&mut self) {
        if !self.disable_help_flag && self.argument(HELP_NAME).is_none() {
            let short_taken = self.arguments.iter().any(|a| a.short == Some(HELP_SHORT));
            let mut help = Argument::flag(HELP_NAME)
                .action(Action::Help)
                .help(HELP_MESSAGE);

            if !short_taken {
                help = help.short(HELP_SHORT);
            }

            self.arguments.push(help);
        }

        if self.version.is_some() && self.argument(VERSION_NAME).is_none() {
            let short_taken = self
                .arguments
                .iter()
                .any(|a| a.short == Some(VERSION_SHORT));
            let mut version = Argument::flag(VERSION_NAME)
                .action(Action::Version)
                .help(VERSION_MESSAGE);

            if !short_taken {
                version = version.short(VERSION_SHORT);
            }

            self.arguments.push(version);
        }
    }

    fn check_arguments(&self, globals: &[&Argument]) -> Result<(), ConfigError> {
        let mut names = HashSet::new();
        let mut shorts = HashSet::new();
        let mut longs = HashSet::new();

        for argument in self.arguments.iter().chain(globals.iter().copied()) {
            if !names.insert(argument.name.as_str()) {
                return Err(ConfigError(format!(
                    "argument '{}' is defined more than once in command '{}'.",
                    argument.name, self.name
                )));
            }

            if let Some(short) = argument.short {
                if !shorts.insert(short) {
                    return Err(ConfigError(format!(
                        "short flag '-{short}' is used more than once in command '{}'.",
                        self.name
                    )));
                }
            }

            let negated = match (&argument.long, argument.negatable) {
                (Some(long), true) => Some(format!("{NEGATION_PREFIX}{long}")),
                _ => None,
            };

            for long in argument
                .long
                .iter()
                .chain(argument.aliases.iter())
                .chain(argument.visible_aliases.iter())
                .chain(argument.renamed_from.iter())
                .chain(negated.iter())
            {
                if !longs.insert(long.clone()) {
                    return Err(ConfigError(format!(
                        "long flag '--{long}' is used more than once in command '{}'.",
                        self.name
                    )));
                }
            }

            let arity = argument.get_arity();

            if !arity.is_valid() {
                return Err(ConfigError(format!(
                    "argument '{}' has an invalid arity {arity}.",
                    argument.name
                )));
            }

            if argument.action == Action::Append && !arity.takes_values() {
                return Err(ConfigError(format!(
                    "append argument '{}' must accept at least one value.",
                    argument.name
                )));
            }

            if (argument.action.is_flag() || argument.action == Action::Count)
                && arity.takes_values()
            {
                return Err(ConfigError(format!(
                    "{:?} argument '{}' cannot take values.",
                    argument.action, argument.name
                )));
            }

            if argument.positional
                && argument.action != Action::Store
                && argument.action != Action::Append
            {
                return Err(ConfigError(format!(
                    "positional argument '{}' must store or append its values.",
                    argument.name
                )));
            }
        }

        if let Some(trailing) = &self.trailing {
            if names.contains(trailing.as_str()) {
                return Err(ConfigError(format!(
                    "trailing capture '{trailing}' collides with an argument of command '{}'.",
                    self.name
                )));
            }
        }

        if let Some(config_arg) = &self.config.config_arg {
            match self.argument(config_arg) {
                Some(argument) if argument.action == Action::Store => {}
                _ => {
                    return Err(ConfigError(format!(
                        "config argument '{config_arg}' must be a store argument of command '{}'.",
                        self.name
                    )))
                }
            }
        }

        Ok(())
    }

    fn check_references(&self, globals: &[&Argument]) -> Result<(), ConfigError> {
        let is_argument = |name: &str| {
            self.argument(name).is_some() || globals.iter().any(|g| g.name == name)
        };
        let is_group = |name: &str| self.groups.iter().any(|g| g.name == name);
        let unknown = |owner: &str, reference: &str| {
            ConfigError(format!(
                "argument '{owner}' references unknown argument '{reference}' in command '{}'.",
                self.name
            ))
        };

        for argument in &self.arguments {
            for peer in argument.conflicts_with.iter().chain(argument.requires.iter()) {
                if !is_argument(peer) && !is_group(peer) {
                    return Err(unknown(&argument.name, peer));
                }
            }

            let peers = argument
                .required_unless
                .iter()
                .chain(argument.required_if_eq.iter().map(|(peer, _)| peer))
                .chain(argument.requires_if.iter().map(|(peer, _)| peer))
                .chain(argument.default_value_if.iter().map(|(peer, _, _)| peer));

            for peer in peers {
                if !is_argument(peer) {
                    return Err(unknown(&argument.name, peer));
                }
            }
        }

        let mut group_names = HashSet::new();

        for group in &self.groups {
            if !group_names.insert(group.name.as_str()) {
                return Err(ConfigError(format!(
                    "group '{}' is defined more than once in command '{}'.",
                    group.name, self.name
                )));
            }

            if is_argument(&group.name) {
                return Err(ConfigError(format!(
                    "group '{}' collides with an argument of command '{}'.",
                    group.name, self.name
                )));
            }

            for member in &group.members {
                if !is_argument(member) {
                    return Err(ConfigError(format!(
                        "group '{}' references unknown argument '{member}' in command '{}'.",
                        group.name, self.name
                    )));
                }
            }
        }

        Ok(())
    }

    fn check_commands(&self) -> Result<(), ConfigError> {
        let mut names = HashSet::new();

        for command in &self.commands {
            for name in std::iter::once(&command.name)
                .chain(command.aliases.iter())
                .chain(command.visible_aliases.iter())
            {
                if !names.insert(name.as_str()) {
                    return Err(ConfigError(format!(
                        "subcommand '{name}' is defined more than once in command '{}'.",
                        self.name
                    )));
                }
            }
        }

        Ok(())
    }
}
