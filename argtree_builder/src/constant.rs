pub(crate) const HELP_NAME: &str = "help";
pub(crate) const HELP_SHORT: char = 'h';
pub(crate) const HELP_MESSAGE: &str = "Show this help message and exit.";
pub(crate) const VERSION_NAME: &str = "version";
pub(crate) const VERSION_SHORT: char = 'V';
pub(crate) const VERSION_MESSAGE: &str = "Show the version and exit.";

pub(crate) const NEGATION_PREFIX: &str = "no-";
pub(crate) const DEFAULT_SUGGEST_THRESHOLD: usize = 3;
pub(crate) const MAX_SUGGESTIONS: usize = 3;

/// Exit status for a successful run (including help/version/completion requests).
pub const EXIT_SUCCESS: i32 = 0;
/// Exit status for a command line usage error.
pub const EXIT_USAGE: i32 = 1;
/// Exit status for a value that cannot be converted to its requested type.
pub const EXIT_DATA: i32 = 65;
/// Exit status for a bad or missing required configuration file.
pub const EXIT_CONFIG: i32 = 78;
