use std::path::Path;

const FALLBACK_PROGRAM: &str = "program";

/// Programmatic configuration of a dispatch.
///
/// ### Example
/// ```
/// use argbind::Config;
///
/// let config = Config::new("tool")
///     .about("Does the thing.")
///     .suppress_errors(true);
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub(crate) program: String,
    pub(crate) about: Option<String>,
    pub(crate) suppress_errors: bool,
    pub(crate) lenient: bool,
    pub(crate) greedy: bool,
}

impl Default for Config {
    /// The program is named after the running executable.
    fn default() -> Self {
        let program = std::env::args()
            .next()
            .as_deref()
            .and_then(|path| Path::new(path).file_name())
            .and_then(|name| name.to_str())
            .map(str::to_string)
            .unwrap_or_else(|| FALLBACK_PROGRAM.to_string());

        Config::new(program)
    }
}

impl Config {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            about: None,
            suppress_errors: false,
            lenient: false,
            greedy: false,
        }
    }

    /// The about message of the help; defaults to the entity's own description.
    pub fn about(mut self, description: impl Into<String>) -> Self {
        self.about.replace(description.into());
        self
    }

    /// Accumulate parse errors on the [`crate::Namespace`] instead of failing.
    pub fn suppress_errors(mut self, suppress: bool) -> Self {
        self.suppress_errors = suppress;
        self
    }

    /// Tolerate unrecognized tokens, keeping them on the [`crate::Namespace`].
    pub fn lenient(mut self, lenient: bool) -> Self {
        self.lenient = lenient;
        self
    }

    /// Return lazy results untouched, rather than collecting them into a list.
    pub fn greedy(mut self, greedy: bool) -> Self {
        self.greedy = greedy;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}
