use crate::api::{Argument, Command};
use crate::constant::{MAX_SUGGESTIONS, NEGATION_PREFIX};
use crate::model::Arity;
use crate::parser::interface::ColumnRenderer;
use crate::parser::scope::Scope;
use crate::parser::{suggest, ParseError};

const PADDING_WIDTH: usize = 3;
const MAIN_INDENT: usize = 1;
const SHELLS: [&str; 3] = ["bash", "zsh", "fish"];

/// The usage grammar for `arity` values of `placeholder`.
pub(crate) fn grammar(placeholder: &str, arity: Arity) -> String {
    let mut parts: Vec<String> = (0..arity.min).map(|_| placeholder.to_string()).collect();

    match arity.max {
        Some(max) if max == arity.min => {}
        Some(max) if max == arity.min + 1 => parts.push(format!("[{placeholder}]")),
        _ if arity.min > 0 => parts.push("[...]".to_string()),
        _ => parts.push(format!("[{placeholder} ...]")),
    }

    parts.join(" ")
}

fn with_grammar(flag: String, argument: &Argument) -> String {
    let grammar = grammar(&argument.placeholder(), argument.get_arity());

    if grammar.is_empty() {
        flag
    } else {
        format!("{flag} {grammar}")
    }
}

fn long_flag(argument: &Argument, long: &str) -> String {
    if argument.negatable && argument.long.as_deref() == Some(long) {
        format!("--[{NEGATION_PREFIX}]{long}")
    } else {
        format!("--{long}")
    }
}

fn summary(argument: &Argument) -> String {
    if argument.positional {
        return grammar(&argument.placeholder(), argument.get_arity());
    }

    let flag = match (argument.short, &argument.long) {
        (Some(short), _) => format!("-{short}"),
        (None, Some(long)) => long_flag(argument, long),
        (None, None) => argument.display(),
    };
    let usage = with_grammar(flag, argument);

    if argument.required {
        usage
    } else {
        format!("[{usage}]")
    }
}

fn flags(argument: &Argument) -> String {
    if argument.positional {
        return grammar(&argument.placeholder(), argument.get_arity());
    }

    argument
        .short
        .iter()
        .map(|short| format!("-{short}"))
        .chain(
            argument
                .visible_longs()
                .into_iter()
                .map(|long| long_flag(argument, long)),
        )
        .map(|flag| with_grammar(flag, argument))
        .collect::<Vec<String>>()
        .join(", ")
}

fn description(argument: &Argument) -> String {
    let mut parts = Vec::default();

    if !argument.choices.is_empty() {
        parts.push(format!("{{{}}}", argument.choices.join(", ")));
    }

    if let Some(help) = &argument.help {
        parts.push(help.clone());
    }

    if !argument.defaults.is_empty() {
        parts.push(format!("[default: {}]", argument.defaults.join(", ")));
    }

    if let Some(env) = &argument.env {
        parts.push(format!("[env: {env}]"));
    }

    parts.join(" ")
}

fn visible_commands<'a>(command: &'a Command) -> impl Iterator<Item = &'a Command> {
    command.commands.iter().filter(|c| !c.hidden)
}

/// Render the help text of the scope's command.
pub(crate) fn help(scope: &Scope, terminal_width: Option<usize>) -> String {
    let visible: Vec<&Argument> = scope.arguments.iter().copied().filter(|a| !a.hidden).collect();
    let options: Vec<&Argument> = visible.iter().copied().filter(|a| !a.positional).collect();
    let positionals: Vec<&Argument> = scope
        .positionals()
        .into_iter()
        .filter(|a| !a.hidden)
        .collect();
    let commands: Vec<&Command> = visible_commands(scope.command).collect();

    let mut summary_parts: Vec<String> = options
        .iter()
        .chain(positionals.iter())
        .map(|a| summary(a))
        .collect();

    if !commands.is_empty() {
        let names: Vec<&str> = commands.iter().map(|c| c.name.as_str()).collect();
        summary_parts.push(format!("{{{}}}", names.join(",")));
    }

    if let Some(trailing) = &scope.command.trailing {
        summary_parts.push(format!("[{} ...]", trailing.to_ascii_uppercase()));
    }

    let positional_rows: Vec<(String, String)> = positionals
        .iter()
        .map(|a| (flags(a), description(a)))
        .collect();
    let option_rows: Vec<(String, String)> = options
        .iter()
        .map(|a| (flags(a), description(a)))
        .collect();
    let command_rows: Vec<(String, String)> = commands
        .iter()
        .map(|c| {
            let names: Vec<&str> = c.visible_names();
            (names.join(", "), c.about.clone().unwrap_or_default())
        })
        .collect();

    let left_width = positional_rows
        .iter()
        .chain(option_rows.iter())
        .chain(command_rows.iter())
        .map(|(left, _)| left.len())
        .max()
        .unwrap_or_default();
    let renderer = match terminal_width {
        Some(total) => ColumnRenderer::guided(PADDING_WIDTH, left_width, MAIN_INDENT, total),
        None => ColumnRenderer::unbounded(PADDING_WIDTH, left_width),
    };

    let mut lines = vec![
        format!("usage: {} {}", scope.program(), summary_parts.join(" "))
            .trim_end()
            .to_string(),
    ];

    if let Some(about) = &scope.command.about {
        lines.push(String::default());
        lines.push(about.clone());
    }

    for (heading, rows) in [
        ("positional arguments:", positional_rows),
        ("options:", option_rows),
        ("commands:", command_rows),
    ] {
        if rows.is_empty() {
            continue;
        }

        lines.push(String::default());
        lines.push(heading.to_string());

        for (left, middle) in rows {
            lines.extend(renderer.render(MAIN_INDENT, &left, &middle));
        }
    }

    lines.join("\n")
}

/// Render the version line of the scope's command.
pub(crate) fn version(scope: &Scope) -> String {
    match &scope.command.version {
        Some(version) => format!("{} {version}", scope.program()),
        None => scope.program(),
    }
}

/// Render a completion script offering the scope's flags and subcommands.
pub(crate) fn completion(
    scope: &Scope,
    argument: &Argument,
    shell: Option<&str>,
) -> Result<String, ParseError> {
    let binary = scope.binary();
    let function = format!(
        "_{}",
        binary
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect::<String>()
    );

    match shell.unwrap_or(SHELLS[0]) {
        "bash" => Ok(format!(
            "{function}() {{\n    local cur=\"${{COMP_WORDS[COMP_CWORD]}}\"\n    COMPREPLY=($(compgen -W \"{words}\" -- \"$cur\"))\n}}\ncomplete -F {function} {binary}",
            words = words(scope).join(" "),
        )),
        "zsh" => Ok(format!(
            "#compdef {binary}\n{function}() {{\n    compadd -- {words}\n}}\ncompdef {function} {binary}",
            words = words(scope).join(" "),
        )),
        "fish" => Ok(fish(scope, binary)),
        other => Err(ParseError::InvalidValue {
            name: argument.display(),
            value: other.to_string(),
            choices: SHELLS.iter().map(|s| s.to_string()).collect(),
            suggestions: suggest(
                other,
                &SHELLS,
                scope.policy.suggest_threshold,
                MAX_SUGGESTIONS,
            ),
        }),
    }
}

fn words(scope: &Scope) -> Vec<String> {
    let mut words = Vec::default();

    for argument in scope.arguments.iter().filter(|a| !a.hidden && !a.positional) {
        for long in argument.visible_longs() {
            words.push(format!("--{long}"));
        }

        if let (true, Some(long)) = (argument.negatable, &argument.long) {
            words.push(format!("--{NEGATION_PREFIX}{long}"));
        }

        if let Some(short) = argument.short {
            words.push(format!("-{short}"));
        }
    }

    for command in visible_commands(scope.command) {
        words.extend(command.visible_names().into_iter().map(str::to_string));
    }

    words
}

fn fish(scope: &Scope, binary: &str) -> String {
    let quote = |text: &str| format!("'{}'", text.replace('\'', "\\'"));
    let mut lines = Vec::default();

    for argument in scope.arguments.iter().filter(|a| !a.hidden && !a.positional) {
        let mut line = format!("complete -c {binary}");

        if let Some(long) = &argument.long {
            line.push_str(&format!(" -l {long}"));
        }

        if let Some(short) = argument.short {
            line.push_str(&format!(" -s {short}"));
        }

        if let Some(help) = &argument.help {
            line.push_str(&format!(" -d {}", quote(help)));
        }

        lines.push(line);
    }

    for command in visible_commands(scope.command) {
        let mut line = format!("complete -c {binary} -f -a {}", command.name);

        if let Some(about) = &command.about {
            line.push_str(&format!(" -d {}", quote(about)));
        }

        lines.push(line);
    }

    lines.join("\n")
}

/// Where in the command line a parse error occurred.
///
/// Renders the tokens on one line with a caret under the offending token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    offset: usize,
    tokens: Vec<String>,
}

impl ErrorContext {
    /// Point at the token with index `offset` (one past the end points after the last token).
    pub fn new(offset: usize, tokens: &[impl AsRef<str>]) -> Self {
        Self {
            offset,
            tokens: tokens.iter().map(|t| t.as_ref().to_string()).collect(),
        }
    }

    /// The index of the offending token.
    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl std::fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let projection = self.tokens.join(" ");
        let column: usize = self
            .tokens
            .iter()
            .take(self.offset)
            .map(|t| t.chars().count() + 1)
            .sum();
        // Past the end, point just after the last token.
        let column = if self.offset >= self.tokens.len() {
            projection.chars().count()
        } else {
            column
        };

        write!(f, "{projection}\n{:column$}^", "")
    }
}
