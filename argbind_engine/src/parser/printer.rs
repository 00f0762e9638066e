use terminal_size::{terminal_size, Width};

use crate::constant::*;
use crate::model::Nargs;
use crate::parser::interface::UserInterface;
use crate::parser::{ColumnRenderer, TotalWidth};

const MAIN_INDENT: usize = 1;
const CHOICE_INDENT: usize = 2;

#[derive(Debug)]
enum Shape {
    Option { long: String, short: Option<char> },
    Argument { name: String },
    Branch,
}

/// The help facing description of one rule.
#[derive(Debug)]
pub(crate) struct Entry {
    shape: Shape,
    nargs: Nargs,
    help: Option<String>,
    display: Option<String>,
    choices: Vec<(String, String)>,
}

impl Entry {
    pub(crate) fn option(
        long: impl Into<String>,
        short: Option<char>,
        nargs: Nargs,
        help: Option<String>,
        display: Option<String>,
        choices: Vec<String>,
    ) -> Self {
        Self {
            shape: Shape::Option {
                long: long.into(),
                short,
            },
            nargs,
            help,
            display,
            choices: undescribed(choices),
        }
    }

    pub(crate) fn argument(
        name: impl Into<String>,
        nargs: Nargs,
        help: Option<String>,
        display: Option<String>,
        choices: Vec<String>,
    ) -> Self {
        Self {
            shape: Shape::Argument { name: name.into() },
            nargs,
            help,
            display,
            choices: undescribed(choices),
        }
    }

    /// The sub-command selector, listing each variant with its description.
    pub(crate) fn branch(display: impl Into<String>, variants: Vec<(String, String)>) -> Self {
        Self {
            shape: Shape::Branch,
            nargs: Nargs::Precisely(1),
            help: None,
            display: Some(display.into()),
            choices: variants,
        }
    }

    fn metavar(&self) -> String {
        match (&self.display, &self.shape) {
            (Some(display), _) => display.clone(),
            (None, Shape::Option { long, .. }) => long.to_ascii_uppercase().replace('-', "_"),
            (None, Shape::Argument { name }) => name.to_ascii_uppercase().replace('-', "_"),
            (None, Shape::Branch) => "COMMAND".to_string(),
        }
    }

    // The value grammar, ex: "X", "[X]", "[X ...]".
    fn grammar(&self) -> String {
        let metavar = self.metavar();

        match self.nargs {
            Nargs::Precisely(n) => vec![metavar; n as usize].join(" "),
            Nargs::AtMostOne => format!("[{metavar}]"),
            Nargs::Any => format!("[{metavar} ...]"),
            Nargs::AtLeastOne => format!("{metavar} [...]"),
        }
    }

    fn summary(&self) -> String {
        let grammar = self.grammar();

        match &self.shape {
            Shape::Option { long, short } => {
                let flag = match short {
                    Some(short) => format!("-{short}"),
                    None => format!("--{long}"),
                };

                if grammar.is_empty() {
                    format!("[{flag}]")
                } else {
                    format!("[{flag} {grammar}]")
                }
            }
            Shape::Argument { .. } => grammar,
            Shape::Branch => format!("{grammar} ..."),
        }
    }

    fn left(&self) -> String {
        let grammar = self.grammar();
        let suffix = if grammar.is_empty() {
            String::default()
        } else {
            format!(" {grammar}")
        };

        match &self.shape {
            Shape::Option {
                long,
                short: Some(short),
            } => format!("-{short}{suffix}, --{long}{suffix}"),
            Shape::Option { long, short: None } => format!("--{long}{suffix}"),
            Shape::Argument { .. } | Shape::Branch => grammar,
        }
    }

    fn right(&self) -> String {
        let mut right = String::default();

        if !self.choices.is_empty() {
            let names: Vec<&str> = self.choices.iter().map(|(c, _)| c.as_str()).collect();
            right.push_str(&format!("{{{}}}", names.join(", ")));
        }

        if let Some(help) = &self.help {
            if !right.is_empty() {
                right.push(' ');
            }

            right.push_str(help);
        }

        right
    }

    fn is_option(&self) -> bool {
        matches!(self.shape, Shape::Option { .. })
    }

    fn described_choices(&self) -> impl Iterator<Item = &(String, String)> {
        self.choices
            .iter()
            .filter(|_| self.choices.iter().any(|(_, d)| !d.is_empty()))
    }
}

fn undescribed(choices: Vec<String>) -> Vec<(String, String)> {
    choices
        .into_iter()
        .map(|choice| (choice, String::default()))
        .collect()
}

pub(crate) struct Printer {
    about: Option<String>,
    entries: Vec<Entry>,
    terminal_width: Option<usize>,
    help: bool,
}

impl Printer {
    #[cfg(test)]
    pub(crate) fn empty() -> Self {
        Self::new(None, Vec::default(), None)
    }

    pub(crate) fn terminal(about: Option<String>, entries: Vec<Entry>) -> Self {
        let terminal_width = terminal_size().map(|(Width(width), _)| width as usize);
        Self::new(about, entries, terminal_width)
    }

    pub(crate) fn new(about: Option<String>, entries: Vec<Entry>, terminal_width: Option<usize>) -> Self {
        Self {
            about,
            entries,
            terminal_width,
            help: true,
        }
    }

    /// Leave the help switch out of the usage and help.
    pub(crate) fn without_help(mut self) -> Self {
        self.help = false;
        self
    }

    pub(crate) fn usage(&self, program: &str) -> String {
        let mut summary = Vec::default();

        if self.help {
            summary.push(format!("[-{HELP_SHORT}]"));
        }

        let (options, arguments): (Vec<&Entry>, Vec<&Entry>) =
            self.entries.iter().partition(|entry| entry.is_option());
        summary.extend(options.iter().map(|entry| entry.summary()));
        summary.extend(arguments.iter().map(|entry| entry.summary()));
        match summary.is_empty() {
            true => format!("usage: {program}"),
            false => format!("usage: {program} {}", summary.join(" ")),
        }
    }

    pub(crate) fn print_help(&self, program: &str, user_interface: &(impl UserInterface + ?Sized)) {
        let help_flags = format!("-{HELP_SHORT}, --{HELP_NAME}");
        let (mut left_width, mut right_width) = match self.help {
            true => (help_flags.len() + MAIN_INDENT, HELP_MESSAGE.len()),
            false => (MAIN_INDENT, 0),
        };

        for entry in &self.entries {
            left_width = left_width.max(entry.left().len() + MAIN_INDENT);
            right_width = right_width.max(entry.right().len());

            for (choice, description) in entry.described_choices() {
                left_width = left_width.max(choice.len() + MAIN_INDENT + CHOICE_INDENT);
                right_width = right_width.max(description.len());
            }
        }

        let renderer = ColumnRenderer::guided(
            left_width,
            right_width,
            self.terminal_width.map(TotalWidth),
        );

        user_interface.print(self.usage(program));

        if let Some(about) = &self.about {
            user_interface.print(String::default());
            user_interface.print(about.clone());
        }

        let (options, arguments): (Vec<&Entry>, Vec<&Entry>) =
            self.entries.iter().partition(|entry| entry.is_option());

        if !arguments.is_empty() {
            user_interface.print(String::default());
            user_interface.print("positional arguments:".to_string());

            for entry in arguments {
                print_entry(&renderer, entry, user_interface);
            }
        }

        if !self.help && options.is_empty() {
            return;
        }

        user_interface.print(String::default());
        user_interface.print("options:".to_string());

        if self.help {
            for line in renderer.render(MAIN_INDENT, &help_flags, HELP_MESSAGE) {
                user_interface.print(line);
            }
        }

        for entry in options {
            print_entry(&renderer, entry, user_interface);
        }
    }
}

fn print_entry(
    renderer: &ColumnRenderer,
    entry: &Entry,
    user_interface: &(impl UserInterface + ?Sized),
) {
    for line in renderer.render(MAIN_INDENT, &entry.left(), &entry.right()) {
        user_interface.print(line);
    }

    for (choice, description) in entry.described_choices() {
        for line in renderer.render(MAIN_INDENT + CHOICE_INDENT, choice, description) {
            user_interface.print(line);
        }
    }
}

/// The tokens of a failed parse, with a caret under the offending position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    offset: usize,
    tokens: Vec<String>,
}

impl ErrorContext {
    pub(crate) fn new(offset: usize, tokens: &[&str]) -> Self {
        Self {
            offset,
            tokens: tokens.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl std::fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The offset counts token characters only, so add one column per separating space passed.
        let mut characters = 0;
        let mut spaces = 0;

        for (i, token) in self.tokens.iter().enumerate() {
            characters += token.len();

            if i + 1 < self.tokens.len() && characters <= self.offset {
                spaces += 1;
            }
        }

        let caret = std::cmp::min(self.offset, characters.saturating_sub(1)) + spaces;
        write!(f, "{}\n{:caret$}^", self.tokens.join(" "), "")
    }
}
