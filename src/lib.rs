//! `argtree` is a declarative command line parser for Rust.
//!
//! A program is described as a tree of [`Command`]s, each holding [`Argument`]s, [`ArgGroup`]s and child commands.
//! Parsing a token list against the tree yields a tree of [`Matches`], one per matched command.
//! `argtree` attempts to prioritize the following design concerns:
//! * *Explicit provenance*:
//! Every value records which source supplied it ([`ValueSource`]).
//! Values come from the command line, the environment, config files or defaults, with a fixed precedence between them.
//! * *Recursive subcommands*:
//! Subcommands nest to any depth, and global arguments flow from a command to all of its descendants.
//! * *Declared constraints*:
//! Requirements, conflicts, dependencies and groups are declared on the tree and checked after dispatch, rather than by the program.
//! * *Helpful failures*:
//! Unknown arguments and subcommands come with ranked "did you mean" suggestions, and every failure maps onto a POSIX style exit code.
//!
//! # Usage
//! ```no_run
#![doc = include_str!("../demos/remote.rs")]
//! ```
//!
//! ```console
//! $ remote-tool remote rm origin
//! Removing remote 'origin'.
//!
//! $ remote-tool remote add origin https://example.com --port 99999
//! Parse error: invalid value '99999' for '--port': '99999' is not in 1..=65535.
//! remote add origin https://example.com --port 99999
//!                                       ^
//!
//! $ remote-tool remote ad origin https://example.com
//! Parse error: unknown subcommand 'ad'.
//! Did you mean:
//!   * add
//!   * rm
//! remote ad origin https://example.com
//!        ^
//! ```
//!
//! # Value sources
//! Each argument may be supplied by up to four sources.
//! A higher source always replaces a lower one, whatever the order they are read in:
//!
//! `CommandLine` > `Environment` > `ConfigFile` > `Default`
//!
//! * *Config files* are declared on the root command ([`Command::config_file`], [`Command::config_layer`]).
//! A single "top" config file may also be named by an argument ([`Command::config_arg`]), an environment variable ([`Command::config_env`]), or a default path ([`Command::default_config_file`]).
//! Keys of subcommand arguments are qualified with the command path, for example `remote.add.url`.
//! * *Environment variables* are looked up by the explicit [`Argument::env`] name, then by the argument/command prefixes ([`Argument::env_prefix`], [`Command::env_prefix`]).
//! * *Defaults* are applied last, and never overwrite a supplied value ([`Argument::default_value`], [`Argument::default_value_if`]).
//!
//! ```no_run
#![doc = include_str!("../demos/fileutil.rs")]
//! ```
//!
//! ```console
//! $ FILEUTIL_THREADS=8 fileutil a b
//! threads: 8 (from environment)
//! log level: 0
//! dry run: false
//! paths: ["a", "b"]
//!
//! $ FILEUTIL_THREADS=8 fileutil -j 2 -ll a b
//! threads: 2 (from command line)
//! log level: 2
//! dry run: false
//! paths: ["a", "b"]
//! ```
//!
//! # Dispatch
//! Tokens are read left to right:
//! * `--name`, `--name=value`, `--no-name` (negatable flags) and, when enabled, unambiguous prefixes of long names.
//! * `-n`, `-nvalue`, `-n=value` and bundled short flags (`-abc`).
//! * `--` ends option processing; every later token is positional.
//! * Any other token is a subcommand name (or alias), or a value for the next positional slot.
//!
//! Repeated occurrences of single valued options are resolved by the [`ConflictMode`].
//! Constraint violations are reported one at a time, or all together, per the [`ErrorMode`].
//!
//! # Signals
//! `--help`/`-h` is generated on every command, and `--version`/`-V` on every command with a version.
//! An argument with [`Action::Completion`] emits a completion script (`bash`, `zsh` or `fish`).
//! These short circuit the parse with an [`Outcome`] other than [`Outcome::Complete`].
//!
//! # Exit codes
//! [`Parser::parse`] prints through a [`UserInterface`] and exits with:
//! * [`EXIT_SUCCESS`] for help, version and completion requests.
//! * [`EXIT_USAGE`] for command line usage errors.
//! * [`EXIT_DATA`] for values which fail to convert in [`Matches::get`].
//! * [`EXIT_CONFIG`] for bad or missing required config files.
pub use argtree_builder::*;
