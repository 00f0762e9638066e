use std::fmt;

use crate::error::ConfigError;
use crate::{Converter, Value};

/// How a parameter shows up on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Kind {
    /// A bare value, matched by position.
    #[default]
    Positional,
    /// A named value: `--name VALUE`.
    Option,
    /// A boolean switch: `--name`.
    Flag,
}

/// Everything the command line needs to know about one parameter, beyond its name and default.
///
/// ### Example
/// ```
/// use argbind::{convert, Metadata};
///
/// let metadata = Metadata::option()
///     .short("c")
///     .help("How many times (default {default}).")
///     .convert(convert::integer());
/// ```
#[derive(Clone, Default)]
pub struct Metadata {
    pub(crate) kind: Kind,
    pub(crate) help: Option<String>,
    pub(crate) short: Option<String>,
    pub(crate) converter: Option<Converter>,
    pub(crate) choices: Vec<Value>,
    pub(crate) display: Option<String>,
    pub(crate) default: Option<Value>,
}

impl fmt::Debug for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Metadata")
            .field("kind", &self.kind)
            .field("help", &self.help)
            .field("short", &self.short)
            .field("choices", &self.choices)
            .field("display", &self.display)
            .field("default", &self.default)
            .finish()
    }
}

impl Metadata {
    fn of(kind: Kind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    pub fn positional() -> Self {
        Metadata::of(Kind::Positional)
    }

    pub fn option() -> Self {
        Metadata::of(Kind::Option)
    }

    pub fn flag() -> Self {
        Metadata::of(Kind::Flag)
    }

    /// Document the parameter.
    /// A `{default}` placeholder is replaced by the parameter's default, when it has one.
    pub fn help(mut self, description: impl Into<String>) -> Self {
        self.help.replace(description.into());
        self
    }

    /// Also accept `-<alias>`.
    /// Checked when the grammar is built: it must be a single character, and is not allowed on positionals.
    pub fn short(mut self, alias: impl Into<String>) -> Self {
        self.short.replace(alias.into());
        self
    }

    /// Convert each token before it reaches the callable.
    pub fn convert(mut self, converter: Converter) -> Self {
        self.converter.replace(converter);
        self
    }

    /// Restrict the accepted (converted) values.
    pub fn choices<V: Into<Value>>(mut self, choices: impl IntoIterator<Item = V>) -> Self {
        self.choices = choices.into_iter().map(Into::into).collect();
        self
    }

    /// The label used for the value in the usage and help.
    pub fn display(mut self, name: impl Into<String>) -> Self {
        self.display.replace(name.into());
        self
    }

    /// A fallback default, used only when the declared parameter has none of its own.
    pub fn fallback(mut self, value: impl Into<Value>) -> Self {
        self.default.replace(value.into());
        self
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn help_text(&self) -> Option<&str> {
        self.help.as_deref()
    }

    pub fn choice_values(&self) -> &[Value] {
        &self.choices
    }

    /// Check the metadata of `name`, given the parameter's effective default.
    pub(crate) fn validate(&self, name: &str, default: Option<&Value>) -> Result<Option<char>, ConfigError> {
        if self.kind == Kind::Flag {
            match default {
                None | Some(Value::Bool(false)) => {}
                Some(other) => {
                    return Err(ConfigError::FlagDefault {
                        name: name.to_string(),
                        default: other.clone(),
                    });
                }
            }
        }

        match &self.short {
            None => Ok(None),
            Some(_) if self.kind == Kind::Positional => {
                Err(ConfigError::PositionalShort(name.to_string()))
            }
            Some(short) => {
                let mut characters = short.chars();

                match (characters.next(), characters.next()) {
                    (Some(single), None) => Ok(Some(single)),
                    _ => Err(ConfigError::ShortLength {
                        name: name.to_string(),
                        short: short.clone(),
                    }),
                }
            }
        }
    }

    /// The help text shown for the parameter: `{default}` substituted, or synthesized as `[<default>]`.
    pub(crate) fn describe(&self, default: Option<&Value>) -> Option<String> {
        match (default, &self.help) {
            (Some(default), Some(help)) => Some(help.replace("{default}", &default.to_string())),
            (Some(default), None) if self.kind != Kind::Flag => Some(format!("[{default}]")),
            (_, help) => help.clone(),
        }
    }
}
