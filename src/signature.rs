use std::collections::{HashMap, HashSet};

use crate::callable::Callable;
use crate::error::{ConfigError, Error, SignatureError};
use crate::metadata::Metadata;
use crate::Value;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// The declared parameter list of a callable, in call order.
///
/// ### Example
/// ```
/// use argbind::{Metadata, Parameters, Value};
///
/// let parameters = Parameters::new()
///     .required("source")
///     .optional("depth", Value::Int(1))
///     .varargs("rest")
///     .annotate("depth", Metadata::option().short("d"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Parameters {
    named: Vec<(String, Option<Value>)>,
    varargs: Option<String>,
    varkw: Option<String>,
    metadata: Vec<(String, Metadata)>,
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a parameter without a default.
    pub fn required(mut self, name: impl Into<String>) -> Self {
        self.named.push((name.into(), None));
        self
    }

    /// Declare a parameter with a default.
    /// `Value::Null` is a legitimate default.
    pub fn optional(mut self, name: impl Into<String>, default: impl Into<Value>) -> Self {
        self.named.push((name.into(), Some(default.into())));
        self
    }

    /// Declare the collector of any remaining bare tokens.
    pub fn varargs(mut self, name: impl Into<String>) -> Self {
        self.varargs.replace(name.into());
        self
    }

    /// Declare the collector of remaining `name=value` tokens.
    pub fn varkw(mut self, name: impl Into<String>) -> Self {
        self.varkw.replace(name.into());
        self
    }

    /// Attach metadata to a declared parameter (including the variadic collectors).
    /// If repeated, only the final metadata applies.
    pub fn annotate(mut self, name: impl Into<String>, metadata: Metadata) -> Self {
        self.metadata.push((name.into(), metadata));
        self
    }

    /// The number of named (non-variadic) parameters.
    pub(crate) fn arity(&self) -> usize {
        self.named.len()
    }
}

/// The extracted, checked shape of a callable.
#[derive(Debug, Clone)]
pub struct Signature {
    names: Vec<String>,
    defaults: Vec<Option<Value>>,
    varargs: Option<String>,
    varkw: Option<String>,
    metadata: HashMap<String, Metadata>,
}

impl Signature {
    /// Read the signature out of a callable.
    ///
    /// Fails with a [`SignatureError`] when the callable declares no parameter list, and with a
    /// [`ConfigError`] when the declaration is inconsistent (repeated names, metadata for an unknown name).
    pub fn extract(callable: &(impl Callable + ?Sized)) -> Result<Signature, Error> {
        match callable.parameters() {
            Some(parameters) => Ok(Signature::try_from(parameters)?),
            None => Err(SignatureError::Undetermined(callable.name().to_string()).into()),
        }
    }

    /// The parameter names, in call order (excluding the variadic collectors).
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// The parameters paired with their effective defaults, in call order.
    pub fn parameters(&self) -> impl Iterator<Item = (&str, Option<&Value>)> {
        self.names
            .iter()
            .zip(self.defaults.iter())
            .map(|(name, default)| (name.as_str(), default.as_ref()))
    }

    pub fn varargs(&self) -> Option<&str> {
        self.varargs.as_deref()
    }

    pub fn varkw(&self) -> Option<&str> {
        self.varkw.as_deref()
    }

    /// The metadata of a parameter; a bare positional unless annotated.
    pub fn metadata(&self, name: &str) -> &Metadata {
        self.metadata
            .get(name)
            .expect("internal error - every declared name carries metadata")
    }

    pub(crate) fn is_variadic(&self) -> bool {
        self.varargs.is_some() || self.varkw.is_some()
    }
}

impl TryFrom<Parameters> for Signature {
    type Error = ConfigError;

    fn try_from(value: Parameters) -> Result<Self, Self::Error> {
        let Parameters {
            named,
            varargs,
            varkw,
            metadata: annotations,
        } = value;
        let mut seen = HashSet::new();

        for name in named
            .iter()
            .map(|(name, _)| name)
            .chain(varargs.iter())
            .chain(varkw.iter())
        {
            if !seen.insert(name.clone()) {
                return Err(ConfigError::Duplicate(name.clone()));
            }
        }

        let mut metadata: HashMap<String, Metadata> = seen
            .iter()
            .map(|name| (name.clone(), Metadata::default()))
            .collect();

        for (name, annotation) in annotations {
            match metadata.get_mut(&name) {
                Some(existing) => *existing = annotation,
                None => return Err(ConfigError::UnknownTarget(name)),
            }
        }

        let (names, defaults): (Vec<String>, Vec<Option<Value>>) = named
            .into_iter()
            .map(|(name, default)| {
                let default = default.or_else(|| metadata[&name].default.clone());
                (name, default)
            })
            .unzip();

        #[cfg(feature = "tracing_debug")]
        {
            debug!("Extracted {names:?} (varargs {varargs:?}, varkw {varkw:?}).");
        }

        Ok(Signature {
            names,
            defaults,
            varargs,
            varkw,
            metadata,
        })
    }
}
