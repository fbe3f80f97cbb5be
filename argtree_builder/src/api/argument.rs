use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;

use crate::constant::NEGATION_PREFIX;
use crate::model::{Action, Arity};

/// A value check run on every collected value, after transformers and the choices check.
///
/// The first validator to reject a value fails the parse with its message.
#[derive(Clone)]
pub struct Validator(Arc<dyn Fn(&str) -> Result<(), String> + Send + Sync>);

impl Validator {
    /// Create a validator from a function.
    ///
    /// ### Example
    /// ```
    /// # use argtree_builder as argtree;
    /// use argtree::Validator;
    ///
    /// let even = Validator::new(|value| match value.parse::<u32>() {
    ///     Ok(n) if n % 2 == 0 => Ok(()),
    ///     _ => Err(format!("'{value}' is not an even number")),
    /// });
    /// assert!(even.check("4").is_ok());
    /// assert!(even.check("5").is_err());
    /// ```
    pub fn new(check: impl Fn(&str) -> Result<(), String> + Send + Sync + 'static) -> Self {
        Self(Arc::new(check))
    }

    /// Accept values that parse as `T` and fall within `[low, high]`.
    pub fn range<T>(low: T, high: T) -> Self
    where
        T: FromStr + PartialOrd + Display + Send + Sync + 'static,
    {
        Self::new(move |value| match T::from_str(value) {
            Ok(parsed) if parsed >= low && parsed <= high => Ok(()),
            Ok(_) => Err(format!("'{value}' is not in {low}..={high}")),
            Err(_) => Err(format!(
                "'{value}' is not a valid {}",
                std::any::type_name::<T>()
            )),
        })
    }

    /// Reject the empty string.
    pub fn non_empty() -> Self {
        Self::new(|value| {
            if value.is_empty() {
                Err("value must not be empty".to_string())
            } else {
                Ok(())
            }
        })
    }

    /// Accept only the listed values.
    ///
    /// Unlike [`Argument::choices`], the allowed values are not offered as suggestions or shown in help.
    pub fn one_of(allowed: Vec<impl Into<String>>) -> Self {
        let allowed: Vec<String> = allowed.into_iter().map(Into::into).collect();
        Self::new(move |value| {
            if allowed.iter().any(|a| a == value) {
                Ok(())
            } else {
                Err(format!("expected one of {}", allowed.join(", ")))
            }
        })
    }

    /// Accept values for which `predicate` holds, otherwise fail with `message`.
    pub fn predicate(
        message: impl Into<String>,
        predicate: impl Fn(&str) -> bool + Send + Sync + 'static,
    ) -> Self {
        let message = message.into();
        Self::new(move |value| {
            if predicate(value) {
                Ok(())
            } else {
                Err(message.clone())
            }
        })
    }

    /// Run the validator against a value.
    pub fn check(&self, value: &str) -> Result<(), String> {
        (self.0)(value)
    }
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Validator(..)")
    }
}

/// A value rewrite run on every collected value, before the choices check.
#[derive(Clone)]
pub struct Transformer(Arc<dyn Fn(&str) -> String + Send + Sync>);

impl Transformer {
    /// Create a transformer from a function.
    pub fn new(transform: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        Self(Arc::new(transform))
    }

    /// Strip leading and trailing whitespace.
    pub fn trim() -> Self {
        Self::new(|value| value.trim().to_string())
    }

    /// Lowercase the value.
    pub fn lowercase() -> Self {
        Self::new(|value| value.to_lowercase())
    }

    /// Uppercase the value.
    pub fn uppercase() -> Self {
        Self::new(|value| value.to_uppercase())
    }

    /// Run the transformer against a value.
    pub fn apply(&self, value: &str) -> String {
        (self.0)(value)
    }
}

impl std::fmt::Debug for Transformer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Transformer(..)")
    }
}

/// How a long token resolved onto an argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LongForm {
    Canonical,
    Negated,
    Legacy,
}

/// An argument/option for the command parser.
/// Used with [`Command::add`](./struct.Command.html#method.add).
///
/// The `name` is the stable key under which the argument's values appear in [`Matches`](crate::Matches).
#[derive(Debug, Clone)]
pub struct Argument {
    pub(crate) name: String,
    pub(crate) short: Option<char>,
    pub(crate) long: Option<String>,
    pub(crate) aliases: Vec<String>,
    pub(crate) visible_aliases: Vec<String>,
    pub(crate) renamed_from: Option<String>,
    pub(crate) positional: bool,
    pub(crate) index: Option<usize>,
    pub(crate) arity: Option<Arity>,
    pub(crate) action: Action,
    pub(crate) defaults: Vec<String>,
    pub(crate) default_missing: Option<String>,
    pub(crate) delimiter: Option<char>,
    pub(crate) implicit: Option<String>,
    pub(crate) terminator: Option<String>,
    pub(crate) negatable: bool,
    pub(crate) env: Option<String>,
    pub(crate) env_prefix: Option<String>,
    pub(crate) required: bool,
    pub(crate) required_unless: Vec<String>,
    pub(crate) required_if_eq: Vec<(String, String)>,
    pub(crate) conflicts_with: Vec<String>,
    pub(crate) requires: Vec<String>,
    pub(crate) requires_if: Vec<(String, String)>,
    pub(crate) default_value_if: Vec<(String, String, String)>,
    pub(crate) group: Option<String>,
    pub(crate) exclusive_group: Option<String>,
    pub(crate) max_occurrences: usize,
    pub(crate) choices: Vec<String>,
    pub(crate) deprecated: Option<String>,
    pub(crate) hidden: bool,
    pub(crate) global: bool,
    pub(crate) last_wins: bool,
    pub(crate) allow_hyphen_values: bool,
    pub(crate) help: Option<String>,
    pub(crate) value_name: Option<String>,
    pub(crate) transformers: Vec<Transformer>,
    pub(crate) validators: Vec<Validator>,
}

impl Argument {
    fn base(name: String, action: Action, positional: bool) -> Self {
        let long = if positional { None } else { Some(name.clone()) };
        Self {
            name,
            short: None,
            long,
            aliases: Vec::default(),
            visible_aliases: Vec::default(),
            renamed_from: None,
            positional,
            index: None,
            arity: None,
            action,
            defaults: Vec::default(),
            default_missing: None,
            delimiter: None,
            implicit: None,
            terminator: None,
            negatable: false,
            env: None,
            env_prefix: None,
            required: false,
            required_unless: Vec::default(),
            required_if_eq: Vec::default(),
            conflicts_with: Vec::default(),
            requires: Vec::default(),
            requires_if: Vec::default(),
            default_value_if: Vec::default(),
            group: None,
            exclusive_group: None,
            max_occurrences: 0,
            choices: Vec::default(),
            deprecated: None,
            hidden: false,
            global: false,
            last_wins: false,
            allow_hyphen_values: false,
            help: None,
            value_name: None,
            transformers: Vec::default(),
            validators: Vec::default(),
        }
    }

    /// Create an option which stores its value(s) (`--name VALUE`).
    /// The long form defaults to the name.
    ///
    /// ### Example
    /// ```
    /// # use argtree_builder as argtree;
    /// use argtree::{Argument, Command};
    ///
    /// let parser = Command::new("program")
    ///     .add(Argument::option("port").short('p'))
    ///     .build()
    ///     .unwrap();
    ///
    /// let matches = parser.parse_tokens(&["-p", "8080"]).unwrap().matches().unwrap();
    /// assert_eq!(matches.get::<u16>("port").unwrap(), Some(8080));
    /// ```
    pub fn option(name: impl Into<String>) -> Self {
        Self::base(name.into(), Action::Store, false)
    }

    /// Create a no-value option which stores `true` when present (`--name`).
    ///
    /// ### Example
    /// ```
    /// # use argtree_builder as argtree;
    /// use argtree::{Argument, Command};
    ///
    /// let parser = Command::new("program")
    ///     .add(Argument::flag("verbose").short('v'))
    ///     .build()
    ///     .unwrap();
    ///
    /// let matches = parser.parse_tokens(&["-v"]).unwrap().matches().unwrap();
    /// assert!(matches.get_flag("verbose"));
    /// ```
    pub fn flag(name: impl Into<String>) -> Self {
        Self::base(name.into(), Action::StoreTrue, false)
    }

    /// Create a positional argument.
    /// The order positionals are added corresponds to their positional order during parsing,
    /// unless an explicit [`Argument::index`] is given.
    ///
    /// ### Example
    /// ```
    /// # use argtree_builder as argtree;
    /// use argtree::{Argument, Command};
    ///
    /// let parser = Command::new("program")
    ///     .add(Argument::positional("source"))
    ///     .add(Argument::positional("target"))
    ///     .build()
    ///     .unwrap();
    ///
    /// let matches = parser.parse_tokens(&["a.txt", "b.txt"]).unwrap().matches().unwrap();
    /// assert_eq!(matches.value_of("target"), Some("b.txt"));
    /// ```
    pub fn positional(name: impl Into<String>) -> Self {
        Self::base(name.into(), Action::Store, true)
    }

    /// Set the single character short form (`-s`).
    pub fn short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    /// Set the long form (`--long`), replacing the name-derived default.
    pub fn long(mut self, long: impl Into<String>) -> Self {
        self.long = Some(long.into());
        self
    }

    /// Add a hidden long alias.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Add a long alias which is shown in help and offered as a suggestion.
    pub fn visible_alias(mut self, alias: impl Into<String>) -> Self {
        self.visible_aliases.push(alias.into());
        self
    }

    /// Accept a legacy long name, warning whenever it is used.
    pub fn renamed_from(mut self, legacy: impl Into<String>) -> Self {
        self.renamed_from = Some(legacy.into());
        self
    }

    /// Pin this positional to an explicit slot (slots sort by index, then insertion order).
    pub fn index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    /// Set the action taken when the argument is matched.
    /// Unless configured explicitly, the arity follows from the action.
    pub fn action(mut self, action: Action) -> Self {
        self.action = action;
        self
    }

    /// Set the value arity of a single occurrence.
    ///
    /// ### Example
    /// ```
    /// # use argtree_builder as argtree;
    /// use argtree::{Argument, Arity, Command, Nargs};
    ///
    /// let parser = Command::new("program")
    ///     .add(Argument::option("point").arity(Nargs::Precisely(2)))
    ///     .add(Argument::positional("files").arity(Arity::at_least(1)))
    ///     .build()
    ///     .unwrap();
    ///
    /// let matches = parser
    ///     .parse_tokens(&["--point", "1", "2", "a", "b"])
    ///     .unwrap()
    ///     .matches()
    ///     .unwrap();
    /// assert_eq!(matches.get_many::<u32>("point").unwrap(), vec![1, 2]);
    /// assert_eq!(matches.values_of("files").unwrap(), ["a", "b"]);
    /// ```
    pub fn arity(mut self, arity: impl Into<Arity>) -> Self {
        self.arity = Some(arity.into());
        self
    }

    /// Set the static default value.
    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.defaults = vec![value.into()];
        self
    }

    /// Set a multi-valued static default.
    pub fn default_values(mut self, values: Vec<impl Into<String>>) -> Self {
        self.defaults = values.into_iter().map(Into::into).collect();
        self
    }

    /// Document the value a bare occurrence stands for (display only).
    pub fn default_missing_value(mut self, value: impl Into<String>) -> Self {
        self.default_missing = Some(value.into());
        self
    }

    /// Split every collected value on `delimiter`.
    pub fn value_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Use `value` when the option occurs without any value.
    pub fn implicit_value(mut self, value: impl Into<String>) -> Self {
        self.implicit = Some(value.into());
        self
    }

    /// Stop collecting values at `terminator` (which is consumed).
    pub fn value_terminator(mut self, terminator: impl Into<String>) -> Self {
        self.terminator = Some(terminator.into());
        self
    }

    /// Also accept `--no-<long>`, which records the negated flag value.
    pub fn negatable(mut self, negatable: bool) -> Self {
        self.negatable = negatable;
        self
    }

    /// Read the value from this environment variable when absent on the command line.
    pub fn env(mut self, variable: impl Into<String>) -> Self {
        self.env = Some(variable.into());
        self
    }

    /// Read the value from `<prefix>_<NAME>` when absent on the command line.
    pub fn env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Require the argument to be present (or to have a default).
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Require the argument unless `other` is present.
    pub fn required_unless(mut self, other: impl Into<String>) -> Self {
        self.required_unless.push(other.into());
        self
    }

    /// Require the argument if `other` resolved to `value`.
    pub fn required_if_eq(mut self, other: impl Into<String>, value: impl Into<String>) -> Self {
        self.required_if_eq.push((other.into(), value.into()));
        self
    }

    /// Forbid `other` (an argument or group name) alongside this argument.
    pub fn conflicts_with(mut self, other: impl Into<String>) -> Self {
        self.conflicts_with.push(other.into());
        self
    }

    /// Require `other` (an argument or group name) whenever this argument is present.
    pub fn requires(mut self, other: impl Into<String>) -> Self {
        self.requires.push(other.into());
        self
    }

    /// Require `other` whenever this argument resolved to `value`.
    pub fn requires_if(mut self, other: impl Into<String>, value: impl Into<String>) -> Self {
        self.requires_if.push((other.into(), value.into()));
        self
    }

    /// Default to `default` when `other` resolved to `value` (checked before the static default).
    pub fn default_value_if(
        mut self,
        other: impl Into<String>,
        value: impl Into<String>,
        default: impl Into<String>,
    ) -> Self {
        self.default_value_if
            .push((other.into(), value.into(), default.into()));
        self
    }

    /// Place the argument in a named group.
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Tag the argument as mutually exclusive with every other argument sharing the tag.
    pub fn exclusive_group(mut self, tag: impl Into<String>) -> Self {
        self.exclusive_group = Some(tag.into());
        self
    }

    /// Limit the number of command line occurrences (`0` is unbounded).
    pub fn max_occurrences(mut self, max: usize) -> Self {
        self.max_occurrences = max;
        self
    }

    /// Restrict accepted values to the literal members of `choices`.
    pub fn choices(mut self, choices: Vec<impl Into<String>>) -> Self {
        self.choices = choices.into_iter().map(Into::into).collect();
        self
    }

    /// Mark the argument deprecated; every use warns with `message`.
    pub fn deprecated(mut self, message: impl Into<String>) -> Self {
        self.deprecated = Some(message.into());
        self
    }

    /// Hide the argument from help and suggestions.
    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    /// Make the argument resolvable in every descendant command.
    pub fn global(mut self, global: bool) -> Self {
        self.global = global;
        self
    }

    /// Let every repeated occurrence clear and replace the previous value(s).
    pub fn last_wins(mut self, last_wins: bool) -> Self {
        self.last_wins = last_wins;
        self
    }

    /// Accept values which start with a hyphen.
    pub fn allow_hyphen_values(mut self, allow: bool) -> Self {
        self.allow_hyphen_values = allow;
        self
    }

    /// Document the help message for this argument.
    /// If repeated, only the final message will apply to the argument.
    pub fn help(mut self, description: impl Into<String>) -> Self {
        self.help = Some(description.into());
        self
    }

    /// Name the value placeholder shown in usage strings.
    pub fn value_name(mut self, value_name: impl Into<String>) -> Self {
        self.value_name = Some(value_name.into());
        self
    }

    /// Append a transformer to the value pipeline.
    pub fn transform(mut self, transformer: Transformer) -> Self {
        self.transformers.push(transformer);
        self
    }

    /// Append a validator to the value pipeline.
    ///
    /// ### Example
    /// ```
    /// # use argtree_builder as argtree;
    /// use argtree::{Argument, Command, ParseError, Validator};
    ///
    /// let parser = Command::new("program")
    ///     .add(Argument::option("port").validate(Validator::range(1u32, 65535)))
    ///     .build()
    ///     .unwrap();
    ///
    /// let error = parser.parse_tokens(&["--port", "99999"]).unwrap_err();
    /// assert!(matches!(error, ParseError::ValidationFailed { .. }));
    /// ```
    pub fn validate(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }
}

// Read-only accessors for help/usage/completion consumers.
#[allow(missing_docs)]
impl Argument {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get_short(&self) -> Option<char> {
        self.short
    }

    pub fn get_long(&self) -> Option<&str> {
        self.long.as_deref()
    }

    pub fn get_aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn get_visible_aliases(&self) -> &[String] {
        &self.visible_aliases
    }

    pub fn is_positional(&self) -> bool {
        self.positional
    }

    pub fn get_action(&self) -> Action {
        self.action
    }

    pub fn get_arity(&self) -> Arity {
        self.arity.unwrap_or_else(|| self.action.default_arity())
    }

    pub fn get_defaults(&self) -> &[String] {
        &self.defaults
    }

    pub fn get_default_missing(&self) -> Option<&str> {
        self.default_missing.as_deref()
    }

    pub fn get_env(&self) -> Option<&str> {
        self.env.as_deref()
    }

    pub fn get_choices(&self) -> &[String] {
        &self.choices
    }

    pub fn get_group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    pub fn get_help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    pub fn get_value_name(&self) -> Option<&str> {
        self.value_name.as_deref()
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn is_global(&self) -> bool {
        self.global
    }

    pub fn is_deprecated(&self) -> bool {
        self.deprecated.is_some()
    }
}

impl Argument {
    /// The form used to refer to the argument in messages (`--long`, `-s`, or `NAME`).
    pub(crate) fn display(&self) -> String {
        if self.positional {
            self.placeholder()
        } else if let Some(long) = &self.long {
            format!("--{long}")
        } else if let Some(short) = self.short {
            format!("-{short}")
        } else {
            self.name.clone()
        }
    }

    pub(crate) fn placeholder(&self) -> String {
        match &self.value_name {
            Some(value_name) => value_name.clone(),
            None => self.name.to_ascii_uppercase().replace('-', "_"),
        }
    }

    pub(crate) fn match_long(&self, token: &str) -> Option<LongForm> {
        if self.positional {
            return None;
        }

        if self.long.as_deref() == Some(token)
            || self.aliases.iter().any(|a| a == token)
            || self.visible_aliases.iter().any(|a| a == token)
        {
            return Some(LongForm::Canonical);
        }

        if self.negatable {
            if let (Some(long), Some(rest)) = (&self.long, token.strip_prefix(NEGATION_PREFIX)) {
                if long == rest {
                    return Some(LongForm::Negated);
                }
            }
        }

        if self.renamed_from.as_deref() == Some(token) {
            return Some(LongForm::Legacy);
        }

        None
    }

    /// Long names which partial matching and suggestions may offer.
    pub(crate) fn visible_longs(&self) -> Vec<&str> {
        if self.positional || self.hidden {
            return Vec::default();
        }

        self.long
            .iter()
            .chain(self.visible_aliases.iter())
            .map(String::as_str)
            .collect()
    }

    /// The value recorded for a no-value occurrence of a flag action.
    pub(crate) fn flag_value(&self, form: LongForm) -> &'static str {
        let negated = form == LongForm::Negated;
        match (self.action, negated) {
            (Action::StoreFalse, false) | (Action::StoreTrue, true) => "false",
            (Action::StoreFalse, true) | (Action::StoreTrue, false) => "true",
            (_, true) => "false",
            (_, false) => "true",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Nargs;
    use rstest::rstest;

    #[test]
    fn option() {
        let option = Argument::option("port");

        assert_eq!(option.name, "port");
        assert_eq!(option.long, Some("port".to_string()));
        assert_eq!(option.short, None);
        assert!(!option.positional);
        assert_eq!(option.action, Action::Store);
        assert_eq!(option.get_arity(), Arity::exactly(1));
        assert_eq!(option.help, None);
    }

    #[test]
    fn option_short_long() {
        let option = Argument::option("port").short('p').long("listen-port");

        assert_eq!(option.short, Some('p'));
        assert_eq!(option.long, Some("listen-port".to_string()));
        assert_eq!(option.display(), "--listen-port");
    }

    #[test]
    fn flag() {
        let flag = Argument::flag("verbose").help("help message");

        assert_eq!(flag.action, Action::StoreTrue);
        assert_eq!(flag.get_arity(), Arity::exactly(0));
        assert_eq!(flag.help, Some("help message".to_string()));
    }

    #[test]
    fn positional() {
        let positional = Argument::positional("source-file");

        assert!(positional.positional);
        assert_eq!(positional.long, None);
        assert_eq!(positional.display(), "SOURCE_FILE");
        assert_eq!(positional.value_name("SRC").display(), "SRC");
    }

    #[test]
    fn arity_overrides_action() {
        let argument = Argument::option("item")
            .action(Action::Append)
            .arity(Nargs::AtLeastOne);

        assert_eq!(argument.get_arity(), Arity::at_least(1));
    }

    #[rstest]
    #[case("color", Some(LongForm::Canonical))]
    #[case("colour", Some(LongForm::Canonical))]
    #[case("colr", Some(LongForm::Canonical))]
    #[case("no-color", Some(LongForm::Negated))]
    #[case("paint", Some(LongForm::Legacy))]
    #[case("no-colour", None)]
    #[case("colors", None)]
    fn match_long(#[case] token: &str, #[case] expected: Option<LongForm>) {
        let argument = Argument::flag("color")
            .visible_alias("colour")
            .alias("colr")
            .negatable(true)
            .renamed_from("paint");

        assert_eq!(argument.match_long(token), expected);
    }

    #[test]
    fn match_long_positional() {
        let argument = Argument::positional("color");
        assert_eq!(argument.match_long("color"), None);
    }

    #[test]
    fn visible_longs() {
        let argument = Argument::option("color")
            .visible_alias("colour")
            .alias("colr");
        assert_eq!(argument.visible_longs(), vec!["color", "colour"]);
        assert!(argument.hidden(true).visible_longs().is_empty());
    }

    #[rstest]
    #[case(Action::StoreTrue, LongForm::Canonical, "true")]
    #[case(Action::StoreTrue, LongForm::Negated, "false")]
    #[case(Action::StoreFalse, LongForm::Canonical, "false")]
    #[case(Action::StoreFalse, LongForm::Negated, "true")]
    fn flag_value(#[case] action: Action, #[case] form: LongForm, #[case] expected: &str) {
        let argument = Argument::flag("cache").action(action);
        assert_eq!(argument.flag_value(form), expected);
    }

    #[rstest]
    #[case("1", true)]
    #[case("65535", true)]
    #[case("0", false)]
    #[case("99999", false)]
    #[case("abc", false)]
    fn validator_range(#[case] value: &str, #[case] ok: bool) {
        let validator = Validator::range(1u32, 65535);
        assert_eq!(validator.check(value).is_ok(), ok);
    }

    #[test]
    fn validator_messages() {
        assert_eq!(
            Validator::range(1u32, 10).check("11").unwrap_err(),
            "'11' is not in 1..=10"
        );
        assert_eq!(
            Validator::non_empty().check("").unwrap_err(),
            "value must not be empty"
        );
        assert_eq!(
            Validator::predicate("must be lowercase", |v| v == v.to_lowercase())
                .check("ABC")
                .unwrap_err(),
            "must be lowercase"
        );
        assert_eq!(
            Validator::one_of(vec!["tcp", "udp"]).check("icmp").unwrap_err(),
            "expected one of tcp, udp"
        );
        assert!(Validator::one_of(vec!["tcp", "udp"]).check("udp").is_ok());
    }

    #[test]
    fn transformers() {
        assert_eq!(Transformer::trim().apply("  a b "), "a b");
        assert_eq!(Transformer::lowercase().apply("AbC"), "abc");
        assert_eq!(Transformer::uppercase().apply("AbC"), "ABC");
    }
}
