use std::collections::HashMap;

use tracing::{debug, warn};

use crate::api::{Argument, Command, LongForm};
use crate::constant::MAX_SUGGESTIONS;
use crate::matcher::{ArgMatch, MatchBuffer, Matches};
use crate::model::{Action, ConflictMode, ValueSource};
use crate::parser::scope::Scope;
use crate::parser::{printer, resolve, suggest, validate, Outcome, ParseError};
use crate::source::{ConfigLayer, Environment};

/// A parse failure, located at the offending token when one is known.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Failure {
    pub(crate) offset: Option<usize>,
    pub(crate) error: ParseError,
}

impl Failure {
    fn or_at(self, offset: usize) -> Self {
        Self {
            offset: self.offset.or(Some(offset)),
            error: self.error,
        }
    }
}

impl From<ParseError> for Failure {
    fn from(error: ParseError) -> Self {
        Self {
            offset: None,
            error,
        }
    }
}

/// Everything a parse reads besides the command tree.
pub(crate) struct Context<'c> {
    pub(crate) tokens: &'c [String],
    pub(crate) environment: &'c dyn Environment,
    pub(crate) config: ConfigLayer,
    pub(crate) terminal_width: Option<usize>,
}

pub(crate) fn dispatch(command: &Command, context: &Context) -> Result<Outcome, Failure> {
    Dispatcher::new(Scope::root(command), context, 0).run(Vec::default())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Terminator,
    Long,
    Short,
    Positional,
}

/// The reading of a token ahead of the cursor.
enum Lookahead<'a> {
    Value,
    Standalone,
    Consuming(&'a Argument),
}

fn is_number(token: &str) -> bool {
    let body = token.strip_prefix('-').unwrap_or(token);
    body.starts_with(|c: char| c.is_ascii_digit() || c == '.') && body.parse::<f64>().is_ok()
}

fn looks_like_option(token: &str) -> bool {
    token.len() > 1 && token.starts_with('-')
}

struct Dispatcher<'a, 'c> {
    scope: Scope<'a>,
    context: &'c Context<'c>,
    cursor: usize,
    positionals: Vec<&'a Argument>,
    slot: usize,
    slot_buffer: Option<MatchBuffer>,
    positionals_only: bool,
    // Command line occurrences within this command only.
    seen: HashMap<String, usize>,
    matches: Matches,
}

impl<'a, 'c> Dispatcher<'a, 'c> {
    fn new(scope: Scope<'a>, context: &'c Context<'c>, cursor: usize) -> Self {
        let positionals = scope.positionals();
        Self {
            scope,
            context,
            cursor,
            positionals,
            slot: 0,
            slot_buffer: None,
            positionals_only: false,
            seen: HashMap::default(),
            matches: Matches::default(),
        }
    }

    fn run(mut self, inherited: Vec<ArgMatch>) -> Result<Outcome, Failure> {
        let command = self.scope.command;
        let tokens = self.context.tokens;

        for hook in &command.hooks {
            hook.pre_dispatch(command, &tokens[self.cursor..])
                .map_err(|message| self.hook_failed("pre-dispatch", message))?;
        }

        resolve::seed(
            &self.scope,
            &mut self.matches,
            &self.context.config,
            self.context.environment,
        )?;

        for mut arg in inherited {
            arg.inherited = true;
            self.matches.offer(arg);
        }

        while self.cursor < tokens.len() {
            let index = self.cursor;
            let token = tokens[index].as_str();
            let kind = self.classify(token);
            debug!("Token '{token}' at {index} classified as {kind:?}.");

            let step = match kind {
                TokenKind::Terminator => {
                    self.positionals_only = true;
                    self.cursor += 1;
                    Ok(None)
                }
                TokenKind::Long => self.long(token),
                TokenKind::Short => self.short(token),
                TokenKind::Positional => self.positional(token),
            };

            if let Some(outcome) = step.map_err(|failure| failure.or_at(index))? {
                return Ok(outcome);
            }
        }

        self.finish()
    }

    fn classify(&self, token: &str) -> TokenKind {
        if self.positionals_only || self.capturing() {
            return TokenKind::Positional;
        }

        if token == "--" {
            return TokenKind::Terminator;
        }

        if token.starts_with("--") {
            return TokenKind::Long;
        }

        if looks_like_option(token) {
            if self.scope.policy.allow_negative_numbers && is_number(token) {
                return TokenKind::Positional;
            }

            let known = token[1..]
                .chars()
                .next()
                .map_or(false, |c| self.short_argument(c).is_some());

            if !known && self.hyphen_positional() {
                return TokenKind::Positional;
            }

            return TokenKind::Short;
        }

        TokenKind::Positional
    }

    /// Whether the declared positional slots are exhausted and the trailing capture takes over.
    fn capturing(&self) -> bool {
        self.scope.command.trailing.is_some()
            && !self.positionals.is_empty()
            && self.slot >= self.positionals.len()
    }

    /// Whether an unmatched hyphenated token may be taken as a positional value.
    fn hyphen_positional(&self) -> bool {
        self.scope.policy.allow_hyphen_values
            || self
                .positionals
                .get(self.slot)
                .map_or(false, |a| a.allow_hyphen_values)
    }

    fn short_argument(&self, short: char) -> Option<&'a Argument> {
        self.scope
            .arguments
            .iter()
            .copied()
            .find(|a| !a.positional && a.short == Some(short))
    }

    fn resolve_long(&self, name: &str) -> Result<Option<(&'a Argument, LongForm)>, ParseError> {
        for form in [LongForm::Canonical, LongForm::Negated, LongForm::Legacy] {
            let found = self
                .scope
                .arguments
                .iter()
                .copied()
                .find(|a| a.match_long(name) == Some(form));

            if let Some(argument) = found {
                return Ok(Some((argument, form)));
            }
        }

        if self.scope.policy.allow_partial_matching && !name.is_empty() {
            let candidates: Vec<&'a Argument> = self
                .scope
                .arguments
                .iter()
                .copied()
                .filter(|a| a.visible_longs().iter().any(|long| long.starts_with(name)))
                .collect();

            match candidates.as_slice() {
                [] => {}
                [argument] => {
                    debug!("Partial '--{name}' resolved to '{}'.", argument.name);
                    return Ok(Some((*argument, LongForm::Canonical)));
                }
                _ => {
                    return Err(ParseError::UnknownArgument {
                        token: format!("--{name}"),
                        suggestions: candidates.iter().map(|a| a.display()).collect(),
                    })
                }
            }
        }

        Ok(None)
    }

    fn suggest_longs(&self, input: &str) -> Vec<String> {
        let candidates: Vec<&str> = self
            .scope
            .arguments
            .iter()
            .flat_map(|a| a.visible_longs())
            .collect();

        suggest(
            input,
            &candidates,
            self.scope.policy.suggest_threshold,
            MAX_SUGGESTIONS,
        )
        .into_iter()
        .map(|long| format!("--{long}"))
        .collect()
    }

    fn long(&mut self, token: &'c str) -> Result<Option<Outcome>, Failure> {
        let body = &token[2..];
        let (name, inline) = match body.split_once('=') {
            Some((name, value)) => (name, Some(value.to_string())),
            None => (body, None),
        };

        match self.resolve_long(name)? {
            Some((argument, form)) => {
                if form == LongForm::Legacy {
                    self.warn(format!(
                        "'--{name}' is deprecated, use '{}' instead.",
                        argument.display()
                    ));
                }

                self.cursor += 1;
                self.occurrence(argument, form, inline)
            }
            None if self.hyphen_positional() => self.positional(token),
            None => Err(ParseError::UnknownArgument {
                token: format!("--{name}"),
                suggestions: self.suggest_longs(name),
            }
            .into()),
        }
    }

    fn short(&mut self, token: &'c str) -> Result<Option<Outcome>, Failure> {
        let body = &token[1..];

        for (i, c) in body.char_indices() {
            let argument = match self.short_argument(c) {
                Some(argument) => argument,
                None => {
                    return Err(ParseError::UnknownArgument {
                        token: format!("-{c}"),
                        suggestions: self.suggest_longs(body),
                    }
                    .into())
                }
            };

            if argument.get_arity().takes_values() {
                let rest = &body[i + c.len_utf8()..];
                let inline = if rest.is_empty() {
                    None
                } else {
                    Some(rest.strip_prefix('=').unwrap_or(rest).to_string())
                };
                self.cursor += 1;
                return self.occurrence(argument, LongForm::Canonical, inline);
            }

            if let Some(outcome) = self.occurrence(argument, LongForm::Canonical, None)? {
                return Ok(Some(outcome));
            }
        }

        self.cursor += 1;
        Ok(None)
    }

    fn occurrence(
        &mut self,
        argument: &'a Argument,
        form: LongForm,
        inline: Option<String>,
    ) -> Result<Option<Outcome>, Failure> {
        match argument.action {
            Action::Help => Ok(Some(Outcome::Help(printer::help(
                &self.scope,
                self.context.terminal_width,
            )))),
            Action::Version => Ok(Some(Outcome::Version(printer::version(&self.scope)))),
            Action::Completion => {
                let shell = match inline {
                    Some(shell) => Some(shell),
                    None => self.next_value(argument),
                };
                let script = printer::completion(&self.scope, argument, shell.as_deref())?;
                Ok(Some(Outcome::Completion(script)))
            }
            Action::StoreTrue | Action::StoreFalse | Action::Count => {
                if let Some(value) = inline {
                    return Err(ParseError::UnexpectedValue {
                        name: argument.display(),
                        value,
                    }
                    .into());
                }

                let values = if argument.action == Action::Count {
                    Vec::default()
                } else {
                    vec![argument.flag_value(form).to_string()]
                };
                self.commit(argument, values)?;
                Ok(None)
            }
            Action::Store | Action::Append => {
                let values = self.collect(argument, inline)?;
                let values = resolve::pipeline(argument, values, &self.scope.policy)?;
                self.commit(argument, values)?;
                Ok(None)
            }
        }
    }

    fn next_value(&mut self, argument: &Argument) -> Option<String> {
        let token = self.context.tokens.get(self.cursor)?;

        if self.stops_collection(token, argument) {
            return None;
        }

        self.cursor += 1;
        Some(token.clone())
    }

    fn stops_collection(&self, token: &str, argument: &Argument) -> bool {
        if token == "--" {
            return true;
        }

        if !looks_like_option(token) {
            return false;
        }

        if self.scope.policy.allow_negative_numbers && is_number(token) {
            return false;
        }

        if argument.allow_hyphen_values || self.scope.policy.allow_hyphen_values {
            // Still stop at anything that names a known option.
            return match token.strip_prefix("--") {
                Some(body) => {
                    let name = body.split_once('=').map_or(body, |(name, _)| name);
                    self.scope
                        .arguments
                        .iter()
                        .any(|a| a.match_long(name).is_some())
                }
                None => token[1..]
                    .chars()
                    .next()
                    .map_or(false, |c| self.short_argument(c).is_some()),
            };
        }

        true
    }

    /// Gather the values of one option occurrence, honouring the arity, delimiter and terminator.
    fn collect(
        &mut self,
        argument: &Argument,
        inline: Option<String>,
    ) -> Result<Vec<String>, ParseError> {
        let arity = argument.get_arity();
        let mut buffer = MatchBuffer::new(argument.display(), arity);

        match inline {
            Some(value) => {
                for piece in resolve::split(argument, vec![value]) {
                    buffer.push(piece);
                }
            }
            None => {
                let tokens = self.context.tokens;

                while buffer.is_open() && self.cursor < tokens.len() {
                    let token = &tokens[self.cursor];

                    if argument.terminator.as_deref() == Some(token.as_str()) {
                        self.cursor += 1;
                        break;
                    }

                    if self.stops_collection(token, argument) {
                        break;
                    }

                    let pieces = resolve::split(argument, vec![token.clone()]);
                    let overflows = arity
                        .max
                        .map_or(false, |max| buffer.len() + pieces.len() > max);

                    if overflows && buffer.len() > 0 {
                        break;
                    }

                    for piece in pieces {
                        buffer.push(piece);
                    }

                    self.cursor += 1;
                }
            }
        }

        if buffer.len() == 0 {
            if let Some(implicit) = &argument.implicit {
                return Ok(vec![implicit.clone()]);
            }
        }

        Ok(buffer.close()?)
    }

    /// Record one command line occurrence, resolving repeats through the conflict mode.
    fn commit(&mut self, argument: &Argument, values: Vec<String>) -> Result<(), ParseError> {
        let name = argument.name.as_str();
        let seen = {
            let count = self.seen.entry(name.to_string()).or_insert(0);
            *count += 1;
            *count
        };

        if argument.max_occurrences > 0 && seen > argument.max_occurrences {
            return Err(ParseError::TooManyOccurrences {
                name: argument.display(),
                max: argument.max_occurrences,
            });
        }

        if let Some(message) = &argument.deprecated {
            self.warn(format!("'{}' is deprecated: {message}", argument.display()));
        }

        if seen == 1 {
            // The first local occurrence replaces config, environment and parent values.
            let (count, occurrences) = match self.matches.arg(name) {
                Some(existing) if existing.inherited && argument.action == Action::Count => (
                    existing
                        .values
                        .first()
                        .and_then(|v| v.parse::<usize>().ok())
                        .unwrap_or_default(),
                    existing.occurrences,
                ),
                _ => (0, 0),
            };
            let values = if argument.action == Action::Count {
                vec![(count + 1).to_string()]
            } else {
                values
            };
            self.matches.insert(ArgMatch::new(
                name,
                values,
                occurrences + 1,
                ValueSource::CommandLine,
            ));
            return Ok(());
        }

        let mode = if argument.last_wins {
            ConflictMode::LastWins
        } else {
            self.scope.policy.conflict_mode
        };
        let existing = match self.matches.get_mut(name) {
            Some(existing) => existing,
            None => unreachable!("internal error - a repeated occurrence must already be recorded."),
        };
        existing.occurrences += 1;

        match (argument.action, mode) {
            (Action::Count, _) => {
                let count = existing
                    .values
                    .first()
                    .and_then(|v| v.parse::<usize>().ok())
                    .unwrap_or_default();
                existing.values = vec![(count + 1).to_string()];
            }
            (_, ConflictMode::FirstWins) => {}
            (_, ConflictMode::LastWins) => existing.values = values,
            (Action::Append, ConflictMode::Error) => existing.values.extend(values),
            (_, ConflictMode::Error) => {
                return Err(ParseError::ArgumentRepeated {
                    name: argument.display(),
                })
            }
        }

        Ok(())
    }

    fn positional(&mut self, token: &'c str) -> Result<Option<Outcome>, Failure> {
        let command = self.scope.command;

        if !self.positionals_only && !self.capturing() {
            if let Some(child) = self.match_subcommand(token)? {
                return self.descend(child).map(Some);
            }

            if command.allow_external_subcommands && !command.commands.is_empty() {
                return self.external(token).map(Some);
            }
        }

        if let Some(capture) = &command.trailing {
            if self.slot >= self.positionals.len() {
                let tokens = self.context.tokens;
                let values = tokens[self.cursor..].to_vec();
                debug!("Capturing {} trailing token(s) as '{capture}'.", values.len());
                self.matches.insert(ArgMatch::new(
                    capture.as_str(),
                    values,
                    1,
                    ValueSource::CommandLine,
                ));
                self.cursor = tokens.len();
                return Ok(None);
            }
        }

        if self.accept_positional(token)? {
            self.cursor += 1;
            return Ok(None);
        }

        let suggestions = if self.positionals_only {
            Vec::default()
        } else {
            let names: Vec<&str> = command
                .commands
                .iter()
                .flat_map(|c| c.visible_names())
                .collect();
            suggest(
                token,
                &names,
                self.scope.policy.suggest_threshold,
                MAX_SUGGESTIONS,
            )
        };

        let unknown_subcommand = !suggestions.is_empty()
            || (!self.positionals_only
                && self.positionals.is_empty()
                && !command.commands.is_empty());

        if unknown_subcommand {
            Err(ParseError::UnknownSubcommand {
                token: token.to_string(),
                suggestions,
            }
            .into())
        } else {
            Err(ParseError::TooManyPositionalArguments {
                token: token.to_string(),
            }
            .into())
        }
    }

    /// Route a value into the positional slots, returning false when no slot can take it.
    fn accept_positional(&mut self, token: &str) -> Result<bool, ParseError> {
        loop {
            let argument = match self.positionals.get(self.slot) {
                Some(argument) => *argument,
                None => return Ok(false),
            };
            // Values the later slots need at minimum.
            let reserved: usize = self.positionals[self.slot + 1..]
                .iter()
                .map(|a| a.get_arity().min)
                .sum();
            let remaining = self.remaining_positionals();
            let buffer = self
                .slot_buffer
                .get_or_insert_with(|| MatchBuffer::new(argument.display(), argument.get_arity()));

            if !buffer.is_open() || (buffer.can_close() && remaining <= reserved) {
                self.close_slot()?;
                continue;
            }

            buffer.push(token);

            if !buffer.is_open() {
                self.close_slot()?;
            }

            return Ok(true);
        }
    }

    /// The tokens from the cursor onward which would be read as positional values.
    fn remaining_positionals(&self) -> usize {
        let tokens = self.context.tokens;
        let mut only = self.positionals_only;
        let mut count = 0;
        let mut index = self.cursor;

        while index < tokens.len() {
            let token = tokens[index].as_str();
            index += 1;

            if only {
                count += 1;
                continue;
            }

            if token == "--" {
                only = true;
                continue;
            }

            match self.lookahead(token) {
                Lookahead::Value => {
                    if self.scope.command.commands.iter().any(|c| c.matches_name(token)) {
                        break;
                    }

                    count += 1;
                }
                Lookahead::Standalone => {}
                Lookahead::Consuming(argument) => {
                    index += self.lookahead_values(argument, &tokens[index..]);
                }
            }
        }

        count
    }

    /// How a later token would be read, following `classify`.
    fn lookahead(&self, token: &str) -> Lookahead<'a> {
        if let Some(body) = token.strip_prefix("--") {
            let (name, inline) = match body.split_once('=') {
                Some((name, _)) => (name, true),
                None => (body, false),
            };

            return match self.resolve_long(name) {
                Ok(Some((argument, _))) if !inline => Lookahead::Consuming(argument),
                Ok(Some(_)) | Err(_) => Lookahead::Standalone,
                Ok(None) if self.hyphen_positional() => Lookahead::Value,
                Ok(None) => Lookahead::Standalone,
            };
        }

        if !looks_like_option(token) {
            return Lookahead::Value;
        }

        if self.scope.policy.allow_negative_numbers && is_number(token) {
            return Lookahead::Value;
        }

        let body = &token[1..];
        let known = body
            .chars()
            .next()
            .map_or(false, |c| self.short_argument(c).is_some());

        if !known && self.hyphen_positional() {
            return Lookahead::Value;
        }

        for (i, c) in body.char_indices() {
            match self.short_argument(c) {
                Some(argument) if argument.get_arity().takes_values() => {
                    return if body.len() > i + c.len_utf8() {
                        Lookahead::Standalone
                    } else {
                        Lookahead::Consuming(argument)
                    };
                }
                Some(_) => {}
                None => break,
            }
        }

        Lookahead::Standalone
    }

    /// The number of tokens in `rest` one occurrence of `argument` would consume, following `collect`.
    fn lookahead_values(&self, argument: &Argument, rest: &[String]) -> usize {
        if !matches!(argument.action, Action::Store | Action::Append) {
            return 0;
        }

        let max = argument.get_arity().max;
        let mut values = 0;
        let mut consumed = 0;

        for token in rest {
            if max.map_or(false, |max| values >= max) {
                break;
            }

            if argument.terminator.as_deref() == Some(token.as_str()) {
                consumed += 1;
                break;
            }

            if self.stops_collection(token, argument) {
                break;
            }

            let pieces = resolve::split(argument, vec![token.clone()]).len();

            if max.map_or(false, |max| values + pieces > max) && values > 0 {
                break;
            }

            values += pieces;
            consumed += 1;
        }

        consumed
    }

    fn close_slot(&mut self) -> Result<(), ParseError> {
        if let Some(buffer) = self.slot_buffer.take() {
            let argument = self.positionals[self.slot];
            self.slot += 1;

            if buffer.len() > 0 {
                let values = resolve::split(argument, buffer.close()?);

                if let Some(max) = argument.get_arity().max {
                    if values.len() > max {
                        return Err(ParseError::TooManyValues {
                            name: argument.display(),
                            expected: max,
                            provided: values.len(),
                        });
                    }
                }

                let values = resolve::pipeline(argument, values, &self.scope.policy)?;
                self.commit(argument, values)?;
            }
        }

        Ok(())
    }

    fn match_subcommand(&self, token: &str) -> Result<Option<&'a Command>, ParseError> {
        let command: &'a Command = self.scope.command;

        if let Some(child) = command.commands.iter().find(|c| c.matches_name(token)) {
            return Ok(Some(child));
        }

        if command.allow_subcommand_prefix && !token.is_empty() {
            let candidates: Vec<&'a Command> = command
                .commands
                .iter()
                .filter(|c| c.visible_names().iter().any(|n| n.starts_with(token)))
                .collect();

            match candidates.as_slice() {
                [] => {}
                [child] => return Ok(Some(*child)),
                _ => {
                    return Err(ParseError::UnknownSubcommand {
                        token: token.to_string(),
                        suggestions: candidates.iter().map(|c| c.name.clone()).collect(),
                    })
                }
            }
        }

        Ok(None)
    }

    fn descend(&mut self, child: &'a Command) -> Result<Outcome, Failure> {
        self.close_slot()?;
        debug!("Descending into subcommand '{}'.", child.name);
        let scope = self.scope.child(child);
        // Globals which are not shadowed by the child.
        let shared: Vec<String> = scope
            .globals
            .iter()
            .filter(|g| self.scope.is_global(&g.name))
            .map(|g| g.name.clone())
            .collect();
        let inherited: Vec<ArgMatch> = shared
            .iter()
            .filter_map(|name| self.matches.arg(name))
            .filter(|arg| arg.source > ValueSource::Default)
            .cloned()
            .collect();

        match Dispatcher::new(scope, self.context, self.cursor + 1).run(inherited)? {
            Outcome::Complete(child_matches) => {
                for name in &shared {
                    if let Some(arg) = child_matches.arg(name) {
                        if !arg.inherited && arg.source > ValueSource::Default {
                            self.matches.offer(arg.clone());
                        }
                    }
                }

                self.matches.subcommand = Some((child.name.clone(), Box::new(child_matches)));
                self.cursor = self.context.tokens.len();
                self.finish()
            }
            signal => Ok(signal),
        }
    }

    fn external(&mut self, token: &str) -> Result<Outcome, Failure> {
        self.close_slot()?;
        let tokens = self.context.tokens;
        let rest = tokens[self.cursor + 1..].to_vec();
        debug!(
            "Capturing external subcommand '{token}' with {} token(s).",
            rest.len()
        );
        self.matches.external = Some(rest);
        self.matches.subcommand = Some((token.to_string(), Box::default()));
        self.cursor = tokens.len();
        self.finish()
    }

    fn finish(&mut self) -> Result<Outcome, Failure> {
        self.close_slot()?;
        let command = self.scope.command;

        for hook in &command.hooks {
            hook.post_dispatch(command, &self.matches)
                .map_err(|message| self.hook_failed("post-dispatch", message))?;
        }

        validate::validate(&self.scope, &self.matches)?;
        resolve::apply_defaults(&self.scope, &mut self.matches);

        for hook in &command.hooks {
            hook.post_validation(command, &self.matches)
                .map_err(|message| self.hook_failed("post-validation", message))?;
        }

        Ok(Outcome::Complete(std::mem::take(&mut self.matches)))
    }

    fn hook_failed(&self, checkpoint: &'static str, message: String) -> ParseError {
        ParseError::HookFailed {
            command: self.scope.program(),
            checkpoint,
            message,
        }
    }

    fn warn(&mut self, message: String) {
        warn!("{message}");
        self.matches.warnings.push(message);
    }
}
