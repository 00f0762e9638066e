use thiserror::Error;

use crate::Value;

/// A mistake in how a callable declares its parameters, detected while building its grammar.
/// Never suppressed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Flag '{name}' must default to false, found '{default}'.")]
    FlagDefault { name: String, default: Value },

    #[error("Positional '{0}' cannot have a short alias.")]
    PositionalShort(String),

    #[error("Short alias '{short}' of '{name}' must be exactly one character.")]
    ShortLength { name: String, short: String },

    #[error("Cannot annotate the non-existing parameter '{0}'.")]
    UnknownTarget(String),

    #[error("Cannot declare the parameter '{0}' more than once.")]
    Duplicate(String),

    #[error("Constructor of '{0}' cannot declare variadic parameters.")]
    VariadicConstructor(String),

    #[error("Command prefix '{0}' clashes with the option prefix '-'.")]
    CommandPrefix(String),

    #[error(transparent)]
    Parser(#[from] argbind_engine::ConfigError),
}

/// The shape of a callable could not be determined.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("Could not determine the signature of '{0}'.")]
    Undetermined(String),
}

/// The command named on the command line could not be resolved.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("No command '{0}'.")]
    NotFound(String),

    #[error("Ambiguous command '{token}': matching {matches:?}.")]
    Ambiguous { token: String, matches: Vec<String> },
}

/// A reconstructed call does not fit a typed parameter struct.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BindError {
    #[error("Missing value for '{0}'.")]
    Missing(String),

    #[error("Invalid value for '{name}': expected {expected}, found {found}.")]
    Mismatch {
        name: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// Everything that can go wrong between the tokens and the result of the call.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Signature error: {0}")]
    Signature(#[from] SignatureError),

    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("Bind error: {0}")]
    Bind(#[from] BindError),

    /// The parsing engine already reported the outcome (help, or a parse error) and asks to exit.
    #[error("Exit with status {0}.")]
    Exit(i32),

    #[error(transparent)]
    Invocation(#[from] anyhow::Error),
}

impl Error {
    /// The process exit status matching this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Exit(code) => *code,
            Error::Dispatch(_) => argbind_engine::ERROR_EXIT_CODE,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Error::Exit(0), 0)]
    #[case(Error::Exit(2), 2)]
    #[case(Error::Dispatch(DispatchError::NotFound("x".to_string())), 2)]
    #[case(Error::Config(ConfigError::Duplicate("x".to_string())), 1)]
    #[case(Error::Invocation(anyhow::anyhow!("boom")), 1)]
    fn exit_code(#[case] error: Error, #[case] expected: i32) {
        assert_eq!(error.exit_code(), expected);
    }

    #[test]
    fn ambiguous_message() {
        let error = DispatchError::Ambiguous {
            token: "se".to_string(),
            matches: vec!["search".to_string(), "select".to_string()],
        };
        assert_eq!(
            error.to_string(),
            "Ambiguous command 'se': matching [\"search\", \"select\"]."
        );
    }
}
