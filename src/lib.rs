//! `argbind` turns callables into command line programs.
//!
//! Rather than configuring a parser by hand, the user declares what a callable takes, and `argbind` derives
//! the command line from that declaration.
//! Specifically, `argbind` is built around the following concerns:
//! * *The signature is the configuration*:
//! Each declared parameter becomes a command line parameter, in declaration order.
//! Parameters with a default become optional.
//! * *Metadata refines, never replaces*:
//! A parameter may be annotated as an option (`--name VALUE`) or a flag (`--name`), given help, a short
//! alias, a converter, a set of allowed values, or a display name.
//! * *Commands are callables too*:
//! A [`Module`] of functions, or a [`Registry`] over a [`CommandSet`] type, dispatches its first bare
//! token to one of its commands (by exact name, or by unique prefix).
//! * *Fail before parsing*:
//! Inconsistent declarations are configuration errors, detected while building the grammar.
//!
//! # Usage
//! A single function:
//! ```no_run
#![doc = include_str!("../demos/demo_function.rs")]
//! ```
//!
//! This generates the following Cli program:
//! ```console
//! $ demo_function -h
//! usage: demo_function [-h] [-r] [--separator SEPARATOR] [WORD ...]
//!
//! Join words together.
//! ...
//!
//! $ demo_function a b c -r --separator +
//! c+b+a
//! ```
//!
//! Commands over a shared instance, constructed once per distinct constructor argument tuple:
//! ```no_run
#![doc = include_str!("../demos/demo_commands.rs")]
//! ```
//!
//! Typed parameters, via the [derive Api](./derive/index.html):
//! ```no_run
#![doc = include_str!("../demos/demo_derive.rs")]
//! ```
//!
//! # Dispatch
//! [`call`] (or [`Dispatcher::call`]) parses tokens against an entity and invokes the selected callable.
//! The values are reconstructed into a [`Call`] in declaration order: the named values, then the variadic
//! values, then the keyword values.
//! With commands, the constructor values come first and the keyword values of the command win.
//!
//! [`run`] (or [`Dispatcher::run`]) does the same for the process's own arguments, exiting on failure.
//! Help exits with `0`, parse and dispatch errors with `2`.
//!
//! # Wizard
//! A [`Wizard`] asks a [`Prompt`] for the parameters not supplied on the command line, then dispatches the
//! answers as if they were given directly.
//! ```no_run
#![doc = include_str!("../demos/demo_wizard.rs")]
//! ```
extern crate self as argbind;

mod binding;
mod callable;
mod config;
pub mod derive;
mod dispatch;
mod error;
mod grammar;
mod metadata;
mod module;
mod naming;
mod registry;
mod signature;
mod wizard;

pub use argbind_engine::{
    convert, ConsoleInterface, Converter, InMemoryInterface, UserInterface, Value, Values,
};
pub use binding::{Arguments, Binder, FromValue};
pub use callable::{Call, Callable, Case, Commands, Entity, Function, Output};
pub use config::Config;
pub use dispatch::{call, run, Dispatcher, Namespace};
pub use error::{BindError, ConfigError, DispatchError, Error, SignatureError};
pub use grammar::Grammar;
pub use metadata::{Kind, Metadata};
pub use module::Module;
pub use registry::{BoundCommand, CommandSet, Registry};
pub use signature::{Parameters, Signature};
pub use wizard::{wizard_call, Prompt, Wizard};

pub use argbind_derive::Arguments;

#[cfg(test)]
#[macro_use]
extern crate assert_matches;
