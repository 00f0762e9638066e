use thiserror::Error;

use crate::matcher::api::*;

#[derive(Debug, PartialEq, Eq, Hash)]
pub(crate) struct MatchTokens {
    pub name: String,
    pub values: Vec<OffsetValue>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum CloseError {
    #[error("'{name}' expects at least {minimum} value(s), received {received}.")]
    TooFew {
        name: String,
        received: usize,
        minimum: u8,
    },
    #[error("'{name}' expects at most {maximum} value(s), received {received}.")]
    TooMany {
        name: String,
        received: usize,
        maximum: u8,
    },
}

/// The slot currently receiving tokens (an argument, or an option awaiting its values).
#[derive(Debug)]
pub(crate) struct Slot {
    name: String,
    bound: Bound,
    values: Vec<OffsetValue>,
}

impl Slot {
    pub(crate) fn new(name: impl Into<String>, bound: Bound) -> Self {
        Self {
            name: name.into(),
            bound,
            values: Vec::default(),
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn push(&mut self, offset: usize, value: impl Into<String>) {
        self.values.push((offset, value.into()));
    }

    /// Whether another value may still be pushed.
    pub(crate) fn accepting(&self) -> bool {
        self.bound.admits(self.values.len())
    }

    /// Whether enough values have been pushed to close.
    pub(crate) fn satisfied(&self) -> bool {
        self.values.len() >= self.bound.minimum() as usize
    }

    pub(crate) fn close(self) -> Result<MatchTokens, CloseError> {
        let Slot {
            name,
            bound,
            values,
        } = self;

        if values.len() < bound.minimum() as usize {
            return Err(CloseError::TooFew {
                name,
                received: values.len(),
                minimum: bound.minimum(),
            });
        }

        if let Bound::Range(_, maximum) = bound {
            if values.len() > maximum as usize {
                return Err(CloseError::TooMany {
                    name,
                    received: values.len(),
                    maximum,
                });
            }
        }

        Ok(MatchTokens { name, values })
    }
}
