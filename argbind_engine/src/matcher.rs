mod api;
mod core;
mod model;

pub(crate) use self::api::*;
pub(crate) use self::core::*;
pub(crate) use self::model::MatchTokens;
