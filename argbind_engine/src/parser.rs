mod base;
mod interface;
mod middleware;
mod printer;

pub(crate) use self::base::*;
pub use self::base::ConfigError;
pub use self::interface::{ConsoleInterface, InMemoryInterface, UserInterface};
pub(crate) use self::interface::{ColumnRenderer, TotalWidth};
pub(crate) use self::middleware::ParseUnit;
pub use self::middleware::{GeneralParser, Parsed, Selection};
pub use self::printer::ErrorContext;
pub(crate) use self::printer::{Entry, Printer};
