//! Command dispatch core.
//!
//! The terminal is a registry-based dispatch system. Each command implements
//! the `Command` trait and is keyed by its `CommandKind`. The registry is
//! built in two phases (base handlers, then handlers derived from them) and
//! is immutable afterwards. The dispatcher splits an argument vector, resolves
//! the command name, and reports every outcome through an `OutputSink`.

mod commands;
mod file_commands;
mod interpreter;
mod kind;
mod network_commands;
mod sink;
mod system_commands;
#[cfg(test)]
mod test_utils;

/// Register all base commands into a builder.
pub use commands::register_builtins;
/// Add commands composed from already-registered ones.
pub use commands::register_derived;
/// Build the full command table (base + derived).
pub use commands::standard_registry;
/// A single executable command trait.
pub use interpreter::Command;
/// Immutable name -> handler table with dispatch.
pub use interpreter::CommandRegistry;
/// Second construction phase: derived entries only.
pub use interpreter::Derivation;
/// Per-invocation context handed to every command.
pub use interpreter::Environment;
/// First construction phase: base entries.
pub use interpreter::RegistryBuilder;
/// Usage line printed when no command is given.
pub use interpreter::USAGE;
/// Every command the shell knows, with its underlying syscall.
pub use kind::CommandKind;
/// Output sink trait and implementations.
pub use sink::{BufferSink, OutputSink, StdoutSink};
