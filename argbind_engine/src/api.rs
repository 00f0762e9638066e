mod core;
mod rule;

pub use self::core::*;
pub use self::rule::*;
