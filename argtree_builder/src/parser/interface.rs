use tracing::debug;

use crate::parser::{ErrorContext, ParseError};

// Target 95% of the total width, so rendering never uses the full line.
const TARGET_TOTAL_FACTOR: f64 = 0.95;

// Room for three average (5 letter) words with a space between them.
pub(crate) const MINIMUM_MIDDLE_WIDTH: usize = 17;

/// Lays out two column rows: a fixed-width left column and a wrapping middle column.
#[derive(Debug)]
pub(crate) struct ColumnRenderer {
    padding: usize,
    left: usize,
    middle: Option<usize>,
}

impl ColumnRenderer {
    /// A renderer which never wraps the middle column.
    pub(crate) fn unbounded(padding: usize, left: usize) -> Self {
        Self {
            padding,
            left,
            middle: None,
        }
    }

    /// A renderer whose middle column is sized to fit the terminal, but never below the minimum.
    pub(crate) fn guided(padding: usize, left: usize, indent: usize, total_width: usize) -> Self {
        let non_middle = indent + left + padding;
        let target_total_width = (total_width as f64 * TARGET_TOTAL_FACTOR) as usize;
        let middle = if non_middle + MINIMUM_MIDDLE_WIDTH <= target_total_width {
            target_total_width - non_middle
        } else {
            MINIMUM_MIDDLE_WIDTH
        };
        debug!("Columns {non_middle} against total {total_width}.  Selecting middle: {middle}.");

        Self {
            padding,
            left,
            middle: Some(middle),
        }
    }

    pub(crate) fn render(&self, indent: usize, left: &str, middle: &str) -> Vec<String> {
        let left_width = std::cmp::max(self.left, left.len());
        let parts = match self.middle {
            Some(width) => chunk(middle, width),
            None if middle.is_empty() => Vec::default(),
            None => vec![middle.to_string()],
        };

        if parts.is_empty() {
            return vec![format!("{:indent$}{left}", "")];
        }

        let padding = self.padding;
        parts
            .iter()
            .enumerate()
            .map(|(i, part)| {
                let left = if i == 0 { left } else { "" };
                format!("{:indent$}{left:left_width$}{:padding$}{part}", "", "")
            })
            .collect()
    }
}

pub(crate) fn chunk(paragraph: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::default();
    let mut current = String::default();

    for word in paragraph.split(' ').filter(|w| !w.is_empty()) {
        if current.is_empty() {
            hyphenate(width, &mut lines, &mut current, word);
        } else if current.len() + word.len() < width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            hyphenate(width, &mut lines, &mut current, word);
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

// Splits a word wider than the column across lines, ending each piece with '-'.
fn hyphenate(width: usize, lines: &mut Vec<String>, current: &mut String, word: &str) {
    let characters: Vec<char> = word.chars().collect();
    let increment = std::cmp::max(width, 2) - 1;
    let mut start = 0;

    while characters.len() - start > width {
        let piece: String = characters[start..start + increment].iter().collect();
        lines.push(format!("{piece}-"));
        start += increment;
    }

    current.extend(&characters[start..]);
}

/// The output seam of a [`Parser`](crate::Parser).
///
/// [`ConsoleInterface`] writes to stdout/stderr; tests and embedders may capture output instead.
pub trait UserInterface {
    /// Print a regular message (help, version, completion) to the user.
    fn print(&self, message: String);
    /// Print a parse error to the user.
    fn print_error(&self, error: ParseError);
    /// Print where in the command line a parse error occurred.
    fn print_error_context(&self, error_context: ErrorContext);
    /// Print a warning, such as a deprecated argument being used.
    fn print_warning(&self, message: String);
}

/// Prints messages to stdout, and errors and warnings to stderr.
#[derive(Debug, Default)]
pub struct ConsoleInterface {}

impl UserInterface for ConsoleInterface {
    fn print(&self, message: String) {
        println!("{message}");
    }

    fn print_error(&self, error: ParseError) {
        eprintln!("{error}");
    }

    fn print_error_context(&self, error_context: ErrorContext) {
        eprintln!("{error_context}");
    }

    fn print_warning(&self, message: String) {
        eprintln!("Warning: {message}");
    }
}

#[cfg(test)]
pub(crate) mod util {
    use crate::parser::{ErrorContext, ParseError, UserInterface};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Default)]
    struct Captured {
        messages: Vec<String>,
        error: Option<String>,
        error_context: Option<ErrorContext>,
        warnings: Vec<String>,
    }

    /// Captures everything printed, shared between clones.
    #[derive(Debug, Clone, Default)]
    pub(crate) struct InMemoryInterface {
        captured: Rc<RefCell<Captured>>,
    }

    impl UserInterface for InMemoryInterface {
        fn print(&self, message: String) {
            self.captured.borrow_mut().messages.push(message);
        }

        fn print_error(&self, error: ParseError) {
            // Assumes print_error() is only ever called once.
            self.captured.borrow_mut().error.replace(error.to_string());
        }

        fn print_error_context(&self, error_context: ErrorContext) {
            self.captured
                .borrow_mut()
                .error_context
                .replace(error_context);
        }

        fn print_warning(&self, message: String) {
            self.captured.borrow_mut().warnings.push(message);
        }
    }

    impl InMemoryInterface {
        pub(crate) fn consume(&self) -> (Option<String>, Option<String>, Option<ErrorContext>) {
            let mut captured = self.captured.borrow_mut();
            let messages = std::mem::take(&mut captured.messages);
            let message = if messages.is_empty() {
                None
            } else {
                Some(messages.join("\n"))
            };

            (message, captured.error.take(), captured.error_context.take())
        }

        pub(crate) fn consume_message(&self) -> String {
            let (message, error, error_context) = self.consume();
            assert_eq!(error, None);
            assert_eq!(error_context, None);
            message.unwrap()
        }

        pub(crate) fn warnings(&self) -> Vec<String> {
            self.captured.borrow().warnings.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", 5, vec![])]
    #[case("abc", 5, vec!["abc"])]
    #[case("abc def", 7, vec!["abc def"])]
    #[case("abc def", 6, vec!["abc", "def"])]
    #[case("  abc   def ", 10, vec!["abc def"])]
    #[case("abcdefgh", 4, vec!["abc-", "def-", "gh"])]
    #[case("ab abcdef", 4, vec!["ab", "abc-", "def"])]
    #[case("abcd", 4, vec!["abcd"])]
    fn chunk_paragraph(#[case] paragraph: &str, #[case] width: usize, #[case] expected: Vec<&str>) {
        assert_eq!(chunk(paragraph, width), expected);
    }

    #[test]
    fn chunk_fits_width() {
        let paragraph = (0..40)
            .map(|_| {
                let length = rand::random::<usize>() % 12 + 1;
                "x".repeat(length)
            })
            .collect::<Vec<String>>()
            .join(" ");

        for width in 2..20 {
            for line in chunk(&paragraph, width) {
                assert!(line.len() <= width, "'{line}' exceeds {width}");
            }
        }
    }

    #[test]
    fn render_unbounded() {
        let renderer = ColumnRenderer::unbounded(3, 6);

        assert_eq!(
            renderer.render(1, "--a", "some long help message"),
            vec![" --a      some long help message"]
        );
        assert_eq!(renderer.render(1, "--flag", ""), vec![" --flag"]);
        // A left cell wider than the column pushes the middle out.
        assert_eq!(renderer.render(0, "--longer", "x"), vec!["--longer   x"]);
    }

    #[test]
    fn render_guided() {
        let renderer = ColumnRenderer::guided(1, 4, 0, 20);

        // 95% of 20 is 19, minus 5 leaves 14 which is below the minimum.
        assert_eq!(renderer.middle, Some(MINIMUM_MIDDLE_WIDTH));

        let renderer = ColumnRenderer::guided(1, 4, 0, 40);
        assert_eq!(renderer.middle, Some(33));
        assert_eq!(
            renderer.render(0, "-a", &"word ".repeat(8)),
            vec![
                "-a   word word word word word word",
                "     word word",
            ]
        );
    }

    #[test]
    fn in_memory_interface() {
        let interface = util::InMemoryInterface::default();
        let shared = interface.clone();

        shared.print("a".to_string());
        shared.print("b".to_string());
        shared.print_warning("careful".to_string());

        assert_eq!(interface.warnings(), vec!["careful".to_string()]);
        assert_eq!(interface.consume_message(), "a\nb");
        assert_eq!(interface.consume(), (None, None, None));
    }
}
