use std::cell::RefCell;

use crate::parser::ErrorContext;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

#[derive(Debug, Clone, Copy)]
pub(crate) struct TotalWidth(pub usize);

// We'll target 95% of the total width, to ensure the renderer doesn't literally use the full space.
const TARGET_TOTAL_FACTOR: f64 = 0.95;
// Let's assume the average word length is 5.
// Then 17 is a good minimum, because it allows precisely 3 words with a space between them.
pub(crate) const MINIMUM_RIGHT_WIDTH: usize = 17;
const PADDING: usize = 3;
// A left column wider than this moves its help onto the following line.
const MAXIMUM_LEFT_WIDTH: usize = 32;

/// Lays out "left  right" help rows, wrapping the right column.
#[derive(Debug)]
pub(crate) struct ColumnRenderer {
    left: usize,
    right: usize,
}

impl ColumnRenderer {
    /// Choose the column widths from the widest cells and the available total width.
    pub(crate) fn guided(left: usize, right: usize, total: Option<TotalWidth>) -> Self {
        let left = std::cmp::min(left, MAXIMUM_LEFT_WIDTH);

        let right = match total {
            Some(TotalWidth(total)) => {
                let target = (total as f64 * TARGET_TOTAL_FACTOR) as usize;
                let available = target.saturating_sub(left + PADDING);
                let chosen = std::cmp::max(std::cmp::min(right, available), MINIMUM_RIGHT_WIDTH);

                #[cfg(feature = "tracing_debug")]
                {
                    debug!("Left column {left} within target {target}.  Selecting right: {chosen}.");
                }

                chosen
            }
            None => std::cmp::max(right, MINIMUM_RIGHT_WIDTH),
        };

        Self { left, right }
    }

    /// Render one row; `indent` shifts the left cell without moving the right column.
    pub(crate) fn render(&self, indent: usize, left: &str, right: &str) -> Vec<String> {
        let cell = self.left.saturating_sub(indent);
        let column = self.left;
        let padding = " ".repeat(PADDING);
        let mut lines = chunk(right, self.right).into_iter();
        let mut out = Vec::default();

        if left.len() > cell {
            // Too wide to share a row; the help starts on the next line.
            out.push(format!("{:indent$}{left}", ""));
        } else {
            match lines.next() {
                Some(first) => out.push(format!("{:indent$}{left:cell$}{padding}{first}", "")),
                None => out.push(format!("{:indent$}{left}", "")),
            }
        }

        out.extend(lines.map(|line| format!("{:column$}{padding}{line}", "")));
        out
    }
}

fn chunk(paragraph: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::default();
    let mut current = String::default();

    for word in paragraph.split_whitespace() {
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

// Split a word wider than the column over several lines.
fn hyphenate(width: usize, lines: &mut Vec<String>, current: &mut String, word: &str) {
    let characters: Vec<char> = word.chars().collect();
    let mut rest = &characters[..];

    while rest.len() > width {
        let (head, tail) = rest.split_at(width - 1);
        lines.push(format!("{}-", head.iter().collect::<String>()));
        rest = tail;
    }

    current.extend(rest.iter());
}

/// Where the parser sends its output.
/// Replace it to capture help and error output instead of writing to the process's stdio.
pub trait UserInterface {
    /// Print one line of regular output (help).
    fn print(&self, message: String);

    /// Print one line of error output.
    fn print_error(&self, message: String);

    /// Print the token context of a parse error.
    fn print_error_context(&self, error_context: ErrorContext);
}

/// Writes to stdout and stderr.
#[derive(Debug, Default)]
pub struct ConsoleInterface {}

impl UserInterface for ConsoleInterface {
    fn print(&self, message: String) {
        println!("{message}");
    }

    fn print_error(&self, message: String) {
        eprintln!("{message}");
    }

    fn print_error_context(&self, error_context: ErrorContext) {
        eprintln!("{error_context}");
    }
}

/// Captures everything in memory.
#[derive(Debug, Default)]
pub struct InMemoryInterface {
    messages: RefCell<Vec<String>>,
    errors: RefCell<Vec<String>>,
    error_context: RefCell<Option<ErrorContext>>,
}

impl UserInterface for InMemoryInterface {
    fn print(&self, message: String) {
        self.messages.borrow_mut().push(message);
    }

    fn print_error(&self, message: String) {
        self.errors.borrow_mut().push(message);
    }

    fn print_error_context(&self, error_context: ErrorContext) {
        self.error_context.borrow_mut().replace(error_context);
    }
}

impl InMemoryInterface {
    /// Everything printed, one line per `print`.
    pub fn output(&self) -> String {
        self.messages.borrow().join("\n")
    }

    /// Everything printed to the error channel, one line per `print_error`.
    pub fn errors(&self) -> String {
        self.errors.borrow().join("\n")
    }

    /// The context of the last reported parse error.
    pub fn error_context(&self) -> Option<String> {
        self.error_context.borrow().as_ref().map(|c| c.to_string())
    }

    /// Forget everything captured so far.
    pub fn clear(&self) {
        self.messages.borrow_mut().clear();
        self.errors.borrow_mut().clear();
        self.error_context.borrow_mut().take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", 5, vec![])]
    #[case("a", 5, vec!["a"])]
    #[case("a b c", 5, vec!["a b c"])]
    #[case("a b c d", 5, vec!["a b c", "d"])]
    #[case("abcdefgh", 5, vec!["abcd-", "efgh"])]
    #[case("ab abcdefghij", 5, vec!["ab", "abcd-", "efgh-", "ij"])]
    #[case("  spaced   out ", 20, vec!["spaced out"])]
    fn chunks(#[case] paragraph: &str, #[case] width: usize, #[case] expected: Vec<&str>) {
        assert_eq!(chunk(paragraph, width), expected);
    }

    #[test]
    fn render_simple() {
        // Setup
        let renderer = ColumnRenderer::guided(5, 20, None);

        // Execute
        let lines = renderer.render(1, "-a", "some help text");

        // Verify
        assert_eq!(lines, vec![" -a     some help text"]);
    }

    #[test]
    fn render_no_help() {
        let renderer = ColumnRenderer::guided(5, 20, None);
        assert_eq!(renderer.render(1, "-a", ""), vec![" -a"]);
    }

    #[test]
    fn render_wraps() {
        // Setup
        let renderer = ColumnRenderer::guided(4, 17, None);

        // Execute
        let lines = renderer.render(0, "abc", "one two three four five six");

        // Verify
        assert_eq!(
            lines,
            vec!["abc    one two three", "       four five six"]
        );
    }

    #[test]
    fn render_left_overflow() {
        // Setup
        let long = "x".repeat(MAXIMUM_LEFT_WIDTH + 1);
        let renderer = ColumnRenderer::guided(long.len(), 20, None);

        // Execute
        let lines = renderer.render(1, &long, "help");

        // Verify
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], format!(" {long}"));
        assert_eq!(
            lines[1],
            format!("{:width$}   help", "", width = MAXIMUM_LEFT_WIDTH)
        );
    }

    #[rstest]
    #[case(Some(TotalWidth(200)), 60)]
    #[case(Some(TotalWidth(40)), 25)]
    #[case(Some(TotalWidth(10)), MINIMUM_RIGHT_WIDTH)]
    #[case(None, 60)]
    fn guided_right(#[case] total: Option<TotalWidth>, #[case] expected: usize) {
        let renderer = ColumnRenderer::guided(10, 60, total);
        assert_eq!(renderer.right, expected);
    }

    #[test]
    fn in_memory() {
        // Setup
        let interface = InMemoryInterface::default();

        // Execute
        interface.print("a".to_string());
        interface.print("b".to_string());
        interface.print_error("c".to_string());
        interface.print_error_context(ErrorContext::new(0, &["x"]));

        // Verify
        assert_eq!(interface.output(), "a\nb");
        assert_eq!(interface.errors(), "c");
        assert_eq!(interface.error_context().unwrap(), "x\n^");
        interface.clear();
        assert_eq!(interface.output(), "");
        assert_eq!(interface.error_context(), None);
    }
}
