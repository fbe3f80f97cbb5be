use std::env;

use terminal_size::{terminal_size, Width};
use tracing::debug;

use crate::api::Command;
use crate::constant::EXIT_SUCCESS;
use crate::matcher::Matches;
use crate::parser::dispatch::{dispatch, Context, Failure};
use crate::parser::{resolve, ErrorContext, ParseError, UserInterface};
use crate::source::{ConfigReader, Environment, ProcessEnvironment, TomlReader};

/// The successful result of a parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Every token was consumed and the command tree validated.
    Complete(Matches),
    /// A help flag was given; carries the help text.
    Help(String),
    /// A version flag was given; carries the version line.
    Version(String),
    /// A completion argument was given; carries the completion script.
    Completion(String),
}

impl Outcome {
    /// The matches of a completed parse (`None` for the control signals).
    pub fn matches(self) -> Option<Matches> {
        match self {
            Outcome::Complete(matches) => Some(matches),
            _ => None,
        }
    }

    /// The text of a control signal (`None` for a completed parse).
    pub fn message(&self) -> Option<&str> {
        match self {
            Outcome::Complete(_) => None,
            Outcome::Help(message) | Outcome::Version(message) | Outcome::Completion(message) => {
                Some(message)
            }
        }
    }
}

/// The configured command line parser.
/// Built via [`Command::build`] or [`Command::build_with`].
pub struct Parser {
    command: Command,
    user_interface: Box<dyn UserInterface>,
    terminal_width: Option<usize>,
}

impl std::fmt::Debug for Parser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parser")
            .field("command", &self.command)
            .field("terminal_width", &self.terminal_width)
            .finish()
    }
}

impl Parser {
    pub(crate) fn new(command: Command, user_interface: Box<dyn UserInterface>) -> Self {
        let terminal_width = terminal_size().map(|(Width(width), _)| width as usize);

        Self {
            command,
            user_interface,
            terminal_width,
        }
    }

    /// The finalized command tree, including the generated help/version arguments.
    pub fn command(&self) -> &Command {
        &self.command
    }

    /// Parse `tokens` against the command tree, reading the process environment and TOML config files.
    ///
    /// Nothing is printed: the caller decides what to do with the [`Outcome`] or [`ParseError`].
    ///
    /// ### Example
    /// ```
    /// # use argtree_builder as argtree;
    /// use argtree::{Argument, Command, Outcome};
    ///
    /// let parser = Command::new("program")
    ///     .version("1.0")
    ///     .add(Argument::flag("verbose"))
    ///     .build()
    ///     .unwrap();
    ///
    /// let outcome = parser.parse_tokens(&["--version"]).unwrap();
    /// assert_eq!(outcome, Outcome::Version("program 1.0".to_string()));
    /// ```
    pub fn parse_tokens(&self, tokens: &[&str]) -> Result<Outcome, ParseError> {
        self.parse_tokens_with(tokens, &ProcessEnvironment, &TomlReader)
    }

    /// Parse `tokens` with an explicit environment and config reader.
    ///
    /// ### Example
    /// ```
    /// # use argtree_builder as argtree;
    /// use argtree::{Argument, Command, InMemoryReader, MapEnvironment, ValueSource};
    ///
    /// let parser = Command::new("fileutil")
    ///     .add(Argument::option("threads"))
    ///     .config_env("FILEUTIL_CONFIG")
    ///     .build()
    ///     .unwrap();
    /// let environment = MapEnvironment::default().with("FILEUTIL_CONFIG", "/etc/fileutil.toml");
    /// let reader = InMemoryReader::default().with("/etc/fileutil.toml", "threads = 8");
    ///
    /// let matches = parser
    ///     .parse_tokens_with(&[], &environment, &reader)
    ///     .unwrap()
    ///     .matches()
    ///     .unwrap();
    /// assert_eq!(matches.get::<u8>("threads").unwrap(), Some(8));
    /// assert_eq!(matches.source("threads"), Some(ValueSource::ConfigFile));
    /// ```
    pub fn parse_tokens_with(
        &self,
        tokens: &[&str],
        environment: &dyn Environment,
        reader: &dyn ConfigReader,
    ) -> Result<Outcome, ParseError> {
        let tokens: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();
        self.invoke(&tokens, environment, reader)
            .map_err(|failure| failure.error)
    }

    /// Parse `tokens`, printing through the user interface.
    ///
    /// Warnings are printed on success.
    /// Help, version and completion text is printed and reported as `Err(0)`.
    /// Errors are printed along with where they occurred, and reported as `Err(exit_code)`.
    pub fn run_tokens(&self, tokens: &[&str]) -> Result<Matches, i32> {
        self.run_tokens_with(tokens, &ProcessEnvironment, &TomlReader)
    }

    /// Like [`Parser::run_tokens`], with an explicit environment and config reader.
    pub fn run_tokens_with(
        &self,
        tokens: &[&str],
        environment: &dyn Environment,
        reader: &dyn ConfigReader,
    ) -> Result<Matches, i32> {
        let tokens: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();

        match self.invoke(&tokens, environment, reader) {
            Ok(Outcome::Complete(matches)) => {
                for warning in matches.all_warnings() {
                    self.user_interface.print_warning(warning);
                }

                Ok(matches)
            }
            Ok(Outcome::Help(message))
            | Ok(Outcome::Version(message))
            | Ok(Outcome::Completion(message)) => {
                self.user_interface.print(message);
                Err(EXIT_SUCCESS)
            }
            Err(Failure { offset, error }) => {
                let exit_code = error.exit_code();
                self.user_interface.print_error(error);
                self.user_interface.print_error_context(ErrorContext::new(
                    offset.unwrap_or(tokens.len()),
                    tokens.as_slice(),
                ));
                Err(exit_code)
            }
        }
    }

    /// Run the parser against the command line arguments ([`env::args`]).
    ///
    /// Exits the process (via [`std::process::exit`]) on help, version, completion, or error,
    /// with the matching exit status.
    pub fn parse(&self) -> Matches {
        let command_input: Vec<String> = env::args().skip(1).collect();
        let tokens: Vec<&str> = command_input.iter().map(String::as_str).collect();

        match self.run_tokens(&tokens) {
            Ok(matches) => matches,
            Err(exit_code) => std::process::exit(exit_code),
        }
    }

    fn invoke(
        &self,
        tokens: &[String],
        environment: &dyn Environment,
        reader: &dyn ConfigReader,
    ) -> Result<Outcome, Failure> {
        debug!("Parsing {} tokens for '{}'.", tokens.len(), self.command.name);
        let config = resolve::load_config(&self.command, tokens, environment, reader)?;
        let context = Context {
            tokens,
            environment,
            config,
            terminal_width: self.terminal_width,
        };

        dispatch(&self.command, &context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Argument;
    use crate::constant::{EXIT_CONFIG, EXIT_USAGE};
    use crate::model::ValueSource;
    use crate::parser::util::InMemoryInterface;
    use crate::source::{InMemoryReader, MapEnvironment};
    use crate::test::assert_contains;

    fn program() -> Command {
        Command::new("program")
            .version("0.1")
            .add(Argument::option("port").short('p'))
            .add(Argument::option("old").deprecated("use --port"))
            .add(Argument::flag("verbose"))
    }

    fn parser(command: Command) -> (Parser, InMemoryInterface) {
        let interface = InMemoryInterface::default();
        let parser = command.build_with(interface.clone()).unwrap();
        (parser, interface)
    }

    #[test]
    fn outcome_accessors() {
        let outcome = Outcome::Help("usage".to_string());
        assert_eq!(outcome.message(), Some("usage"));
        assert_eq!(outcome.matches(), None);

        let outcome = Outcome::Complete(Matches::default());
        assert_eq!(outcome.message(), None);
        assert_eq!(outcome.matches(), Some(Matches::default()));
    }

    #[test]
    fn parse_tokens_empty() {
        // Setup
        let (parser, interface) = parser(program());

        // Execute
        let matches = parser
            .parse_tokens_with(&[], &MapEnvironment::default(), &InMemoryReader::default())
            .unwrap()
            .matches()
            .unwrap();

        // Verify
        assert!(!matches.is_present("port"));
        assert!(!matches.get_flag("verbose"));
        assert_eq!(interface.consume(), (None, None, None));
    }

    #[test]
    fn parse_tokens_error() {
        let (parser, interface) = parser(program());

        let error = parser
            .parse_tokens_with(
                &["--prot", "1"],
                &MapEnvironment::default(),
                &InMemoryReader::default(),
            )
            .unwrap_err();

        assert_matches!(error, ParseError::UnknownArgument { ref suggestions, .. } if suggestions.contains(&"--port".to_string()));
        // Nothing is printed by parse_tokens.
        assert_eq!(interface.consume(), (None, None, None));
    }

    #[test]
    fn run_tokens_complete() {
        // Setup
        let (parser, interface) = parser(program());

        // Execute
        let matches = parser
            .run_tokens_with(
                &["--old", "1", "-p", "2"],
                &MapEnvironment::default(),
                &InMemoryReader::default(),
            )
            .unwrap();

        // Verify
        assert_eq!(matches.get::<u16>("port").unwrap(), Some(2));
        assert_eq!(
            interface.warnings(),
            vec!["'--old' is deprecated: use --port".to_string()]
        );
        assert_eq!(interface.consume(), (None, None, None));
    }

    #[test]
    fn run_tokens_signal() {
        let (parser, interface) = parser(program());

        let exit_code = parser
            .run_tokens_with(&["-V"], &MapEnvironment::default(), &InMemoryReader::default())
            .unwrap_err();

        assert_eq!(exit_code, 0);
        assert_eq!(interface.consume_message(), "program 0.1");
    }

    #[test]
    fn run_tokens_help() {
        let (parser, interface) = parser(program());

        let exit_code = parser
            .run_tokens_with(&["--help"], &MapEnvironment::default(), &InMemoryReader::default())
            .unwrap_err();

        assert_eq!(exit_code, 0);
        let message = interface.consume_message();
        assert_contains!(message, "usage: program");
        assert_contains!(message, "-p PORT, --port PORT");
    }

    #[test]
    fn run_tokens_error_context() {
        // Setup
        let (parser, interface) = parser(program());

        // Execute
        let exit_code = parser
            .run_tokens_with(
                &["--verbose", "--bogus", "x"],
                &MapEnvironment::default(),
                &InMemoryReader::default(),
            )
            .unwrap_err();

        // Verify
        assert_eq!(exit_code, EXIT_USAGE);
        let (message, error, error_context) = interface.consume();
        assert_eq!(message, None);
        assert_contains!(error.unwrap(), "unknown argument '--bogus'");
        assert_eq!(
            error_context,
            Some(ErrorContext::new(1, &["--verbose", "--bogus", "x"]))
        );
    }

    #[test]
    fn run_tokens_config_error() {
        let (parser, interface) = parser(program().config_env("PROGRAM_CONFIG"));

        let exit_code = parser
            .run_tokens_with(
                &[],
                &MapEnvironment::default().with("PROGRAM_CONFIG", "/missing.toml"),
                &InMemoryReader::default(),
            )
            .unwrap_err();

        assert_eq!(exit_code, EXIT_CONFIG);
        let (_, error, error_context) = interface.consume();
        assert_contains!(error.unwrap(), "/missing.toml");
        let tokens: &[&str] = &[];
        assert_eq!(error_context, Some(ErrorContext::new(0, tokens)));
    }

    #[test]
    fn sources() {
        let (parser, _) = parser(
            Command::new("program")
                .add(Argument::option("threads"))
                .add(Argument::option("level").env("LEVEL").default_value("info"))
                .config_file("/etc/program.toml", false),
        );
        let reader = InMemoryReader::default().with("/etc/program.toml", "threads = 4\nlevel = \"warn\"");
        let environment = MapEnvironment::default().with("LEVEL", "debug");

        let matches = parser
            .parse_tokens_with(&["--threads", "2"], &environment, &reader)
            .unwrap()
            .matches()
            .unwrap();

        assert_eq!(matches.get::<u8>("threads").unwrap(), Some(2));
        assert_eq!(matches.source("threads"), Some(ValueSource::CommandLine));
        assert_eq!(matches.value_of("level"), Some("debug"));
        assert_eq!(matches.source("level"), Some(ValueSource::Environment));
    }
}
