//! Command trait, two-phase registry, and dispatch logic.

use std::collections::HashMap;
use std::io;
use std::rc::Rc;

use sysh_types::config::ShellConfig;
use sysh_types::error::{Result, SyshError};

use crate::kind::CommandKind;
use crate::sink::OutputSink;

/// Printed when the invocation names no command.
pub const USAGE: &str = "Usage: <command> [args...]\n";

/// Per-invocation context passed to every command.
pub struct Environment<'a> {
    /// Where all user-facing text goes.
    pub sink: &'a mut dyn OutputSink,
    /// Handler tunables.
    pub config: &'a ShellConfig,
}

impl Environment<'_> {
    /// Emit text through the sink.
    pub fn emit(&mut self, text: &str) -> Result<()> {
        self.sink.emit(text)?;
        Ok(())
    }

    /// Emit raw bytes through the sink.
    pub fn emit_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.sink.emit_bytes(data)?;
        Ok(())
    }
}

/// A single executable command.
pub trait Command {
    /// Which command this is.
    fn kind(&self) -> CommandKind;

    /// The command name (what the user types).
    fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// One-line description for `help`.
    fn description(&self) -> &str;

    /// Usage string (e.g. "mv <src> <dst>").
    fn usage(&self) -> &str;

    /// Minimum number of arguments before the operation is attempted.
    fn arity(&self) -> usize {
        0
    }

    /// Perform the operation. Arguments have already passed the arity check.
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<()>;

    /// Validate arity, then execute.
    ///
    /// Too few arguments is a user error: it is reported through the sink
    /// and the command still succeeds.
    fn run(&self, args: &[&str], env: &mut Environment<'_>) -> Result<()> {
        if args.len() < self.arity() {
            return env.emit(&format!("{}: Not enough arguments provided\n", self.name()));
        }
        self.execute(args, env)
    }
}

type Table = HashMap<CommandKind, Rc<dyn Command>>;

/// First construction phase: base commands.
pub struct RegistryBuilder {
    commands: Table,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self {
            commands: HashMap::new(),
        }
    }

    /// Register a command. Replaces any existing command of the same kind.
    pub fn register(&mut self, cmd: Box<dyn Command>) {
        let kind = cmd.kind();
        if self.commands.insert(kind, Rc::from(cmd)).is_some() {
            log::warn!("command {} registered twice, keeping the later one", kind.name());
        }
    }

    /// Close the base phase. Only derived commands can be added afterwards.
    pub fn into_derivation(self) -> Derivation {
        log::debug!("base registry closed with {} commands", self.commands.len());
        Derivation {
            commands: self.commands,
        }
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Second construction phase: commands composed from registered ones.
pub struct Derivation {
    commands: Table,
}

impl Derivation {
    /// Add a command built on top of `base`.
    ///
    /// Fails if `base` is not registered or the composed command's name is
    /// already taken.
    pub fn derive<F>(&mut self, base: CommandKind, compose: F) -> Result<()>
    where
        F: FnOnce(Rc<dyn Command>) -> Box<dyn Command>,
    {
        let base_cmd = self.commands.get(&base).map(Rc::clone).ok_or_else(|| {
            SyshError::Command(format!(
                "cannot derive from unregistered command: {}",
                base.name()
            ))
        })?;
        log::debug!("deriving from {}", base.name());
        self.insert(compose(base_cmd))
    }

    /// Add a command that sees every entry registered so far, sorted by name.
    pub fn derive_from_all<F>(&mut self, compose: F) -> Result<()>
    where
        F: FnOnce(Vec<Rc<dyn Command>>) -> Box<dyn Command>,
    {
        let mut all: Vec<Rc<dyn Command>> = self.commands.values().map(Rc::clone).collect();
        all.sort_by_key(|cmd| cmd.name());
        self.insert(compose(all))
    }

    fn insert(&mut self, derived: Box<dyn Command>) -> Result<()> {
        let kind = derived.kind();
        if self.commands.contains_key(&kind) {
            return Err(SyshError::Command(format!(
                "derived command {} collides with an existing entry",
                kind.name()
            )));
        }
        log::debug!("derived {}", kind.name());
        self.commands.insert(kind, Rc::from(derived));
        Ok(())
    }

    /// Freeze the table.
    pub fn build(self) -> CommandRegistry {
        CommandRegistry {
            commands: self.commands,
        }
    }
}

/// Immutable kind -> handler table with dispatch.
pub struct CommandRegistry {
    commands: Table,
}

impl CommandRegistry {
    /// The handler registered for `kind`, if any.
    pub fn get(&self, kind: CommandKind) -> Option<&dyn Command> {
        self.commands.get(&kind).map(|cmd| cmd.as_ref())
    }

    /// Exact, case-sensitive lookup by typed name.
    pub fn lookup(&self, name: &str) -> Option<&dyn Command> {
        CommandKind::from_name(name).and_then(|kind| self.get(kind))
    }

    /// All commands, sorted by name.
    pub fn commands(&self) -> Vec<&dyn Command> {
        let mut cmds: Vec<&dyn Command> = self.commands.values().map(|c| c.as_ref()).collect();
        cmds.sort_by_key(|c| c.name());
        cmds
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Run one invocation: `argv[0]` is the program, `argv[1]` the command.
    ///
    /// Missing command, unknown command, and handler failures are all
    /// reported through the sink. The only error returned is a sink failure.
    pub fn dispatch(&self, argv: &[&str], env: &mut Environment<'_>) -> io::Result<()> {
        let Some((&name, args)) = argv.get(1..).and_then(<[&str]>::split_first) else {
            return env.sink.emit(USAGE);
        };

        let Some(cmd) = CommandKind::from_name(name).and_then(|kind| self.get(kind)) else {
            log::debug!("unknown command {name:?}");
            return env.sink.emit(&format!("Unknown command: {name}\n"));
        };

        log::debug!("dispatching {name} with {} argument(s)", args.len());
        match cmd.run(args, env) {
            Ok(()) => Ok(()),
            Err(e) => {
                log::warn!("{name} failed: {e}");
                env.sink.emit(&format!("Error: {name}: {e}\n"))
            },
        }
    }
}
