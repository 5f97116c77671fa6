//! Built-in commands: table assembly plus the core filesystem and text commands.

use std::fs::{self, DirBuilder, File, OpenOptions};
use std::io::{ErrorKind, Read};
use std::os::unix::ffi::{OsStrExt, OsStringExt};
use std::os::unix::fs::DirBuilderExt;
use std::rc::Rc;

use sysh_types::config::{MAX_READ_CHUNK, MIN_READ_CHUNK};
use sysh_types::error::{Result, SyshError};

use crate::file_commands::{ChmodCmd, ChownCmd, StatCmd};
use crate::interpreter::{Command, CommandRegistry, Derivation, Environment, RegistryBuilder};
use crate::kind::CommandKind;
use crate::network_commands::GetIpCmd;
use crate::system_commands::{GetpidCmd, GetppidCmd, GettimeofdayCmd, KillCmd, TimeCmd, WhoamiCmd};

/// The base handler for `kind`, or `None` for kinds composed during
/// derivation. Adding a kind without wiring it here fails to compile.
pub(crate) fn base_handler(kind: CommandKind) -> Option<Box<dyn Command>> {
    let cmd: Box<dyn Command> = match kind {
        CommandKind::Cd => Box::new(CdCmd),
        CommandKind::Pwd => Box::new(PwdCmd),
        CommandKind::Cat => Box::new(CatCmd),
        CommandKind::Mkdir => Box::new(MkdirCmd),
        CommandKind::Rm => Box::new(RmCmd),
        CommandKind::Rmdir => Box::new(RmdirCmd),
        CommandKind::Touch => Box::new(TouchCmd),
        CommandKind::Ls => Box::new(LsCmd),
        CommandKind::Mv => Box::new(MvCmd),
        CommandKind::Echo => Box::new(EchoCmd),
        // Metadata and ownership.
        CommandKind::Stat | CommandKind::Fstat | CommandKind::Lstat => {
            Box::new(StatCmd::new(kind))
        },
        CommandKind::Chmod => Box::new(ChmodCmd),
        CommandKind::Chown => Box::new(ChownCmd),
        // Users, processes, clocks.
        CommandKind::Whoami => Box::new(WhoamiCmd),
        CommandKind::Getpid => Box::new(GetpidCmd),
        CommandKind::Getppid => Box::new(GetppidCmd),
        CommandKind::Kill => Box::new(KillCmd),
        CommandKind::Time => Box::new(TimeCmd),
        CommandKind::Gettimeofday => Box::new(GettimeofdayCmd),
        // Socket probing.
        CommandKind::GetIp => Box::new(GetIpCmd),
        // Built in `register_derived`.
        CommandKind::Netstat | CommandKind::Help => return None,
    };
    Some(cmd)
}

/// Register every base command into a builder.
pub fn register_builtins(reg: &mut RegistryBuilder) {
    for kind in CommandKind::ALL {
        if let Some(cmd) = base_handler(kind) {
            reg.register(cmd);
        }
    }
}

/// Add the commands composed from base ones. Must run after `register_builtins`.
pub fn register_derived(derivation: &mut Derivation) -> Result<()> {
    crate::network_commands::register_netstat(derivation)?;
    // Last, so the listing covers every other entry.
    derivation.derive_from_all(|table| Box::new(HelpCmd { table }))
}

/// Build the complete, frozen command table.
pub fn standard_registry() -> Result<CommandRegistry> {
    let mut builder = RegistryBuilder::new();
    register_builtins(&mut builder);
    let mut derivation = builder.into_derivation();
    register_derived(&mut derivation)?;
    Ok(derivation.build())
}

// ---------------------------------------------------------------------------
// help
// ---------------------------------------------------------------------------

struct HelpCmd {
    table: Vec<Rc<dyn Command>>,
}

impl Command for HelpCmd {
    fn kind(&self) -> CommandKind {
        CommandKind::Help
    }
    fn description(&self) -> &str {
        "List commands and the syscall each maps to"
    }
    fn usage(&self) -> &str {
        "help"
    }
    fn execute(&self, _args: &[&str], env: &mut Environment<'_>) -> Result<()> {
        let mut rows: Vec<(&str, &str, &str)> = self
            .table
            .iter()
            .map(|cmd| (cmd.usage(), cmd.kind().syscall(), cmd.description()))
            .collect();
        rows.push((self.usage(), self.kind().syscall(), self.description()));
        rows.sort_unstable();

        let mut text = format!("Commands ({}):\n", rows.len());
        for (usage, syscall, description) in rows {
            text.push_str(&format!("  {usage:<36}{syscall:<24}{description}\n"));
        }
        env.emit(&text)
    }
}

// ---------------------------------------------------------------------------
// cd
// ---------------------------------------------------------------------------

struct CdCmd;
impl Command for CdCmd {
    fn kind(&self) -> CommandKind {
        CommandKind::Cd
    }
    fn description(&self) -> &str {
        "Change the process working directory"
    }
    fn usage(&self) -> &str {
        "cd <path>"
    }
    fn arity(&self) -> usize {
        1
    }
    fn execute(&self, args: &[&str], _env: &mut Environment<'_>) -> Result<()> {
        std::env::set_current_dir(args[0])?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// pwd
// ---------------------------------------------------------------------------

struct PwdCmd;
impl Command for PwdCmd {
    fn kind(&self) -> CommandKind {
        CommandKind::Pwd
    }
    fn description(&self) -> &str {
        "Print working directory"
    }
    fn usage(&self) -> &str {
        "pwd"
    }
    fn execute(&self, _args: &[&str], env: &mut Environment<'_>) -> Result<()> {
        let cwd = match std::env::current_dir() {
            Ok(cwd) => cwd,
            Err(e) => return env.emit(&format!("pwd: {}\n", SyshError::from(e))),
        };
        let limit = env.config.cwd_max_len;
        if cwd.as_os_str().as_bytes().len() > limit {
            return env.emit(&format!("pwd: working directory exceeds {limit} bytes\n"));
        }
        let mut line = cwd.into_os_string().into_vec();
        line.push(b'\n');
        env.emit_bytes(&line)
    }
}

// ---------------------------------------------------------------------------
// cat
// ---------------------------------------------------------------------------

struct CatCmd;
impl Command for CatCmd {
    fn kind(&self) -> CommandKind {
        CommandKind::Cat
    }
    fn description(&self) -> &str {
        "Print file contents"
    }
    fn usage(&self) -> &str {
        "cat <file...>"
    }
    fn arity(&self) -> usize {
        1
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<()> {
        let chunk = env.config.read_chunk_size.clamp(MIN_READ_CHUNK, MAX_READ_CHUNK);
        let mut buf = vec![0u8; chunk];
        for path in args {
            // Each file is closed when `file` drops, before the next is opened.
            let mut file = match File::open(path) {
                Ok(f) => f,
                Err(e) => {
                    log::debug!("cat: open {path}: {e}");
                    return env.emit("Invalid path");
                },
            };
            loop {
                let n = match file.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => n,
                    Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                    Err(e) => return env.emit(&format!("cat: {}\n", SyshError::from(e))),
                };
                env.emit_bytes(&buf[..n])?;
            }
            env.emit("\n")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// mkdir
// ---------------------------------------------------------------------------

struct MkdirCmd;
impl Command for MkdirCmd {
    fn kind(&self) -> CommandKind {
        CommandKind::Mkdir
    }
    fn description(&self) -> &str {
        "Create a directory"
    }
    fn usage(&self) -> &str {
        "mkdir <path>"
    }
    fn arity(&self) -> usize {
        1
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<()> {
        DirBuilder::new()
            .mode(env.config.dir_mode)
            .create(args[0])?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// rm
// ---------------------------------------------------------------------------

struct RmCmd;
impl Command for RmCmd {
    fn kind(&self) -> CommandKind {
        CommandKind::Rm
    }
    fn description(&self) -> &str {
        "Remove a file"
    }
    fn usage(&self) -> &str {
        "rm <path>"
    }
    fn arity(&self) -> usize {
        1
    }
    fn execute(&self, args: &[&str], _env: &mut Environment<'_>) -> Result<()> {
        fs::remove_file(args[0])?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// rmdir
// ---------------------------------------------------------------------------

struct RmdirCmd;
impl Command for RmdirCmd {
    fn kind(&self) -> CommandKind {
        CommandKind::Rmdir
    }
    fn description(&self) -> &str {
        "Remove an empty directory"
    }
    fn usage(&self) -> &str {
        "rmdir <path>"
    }
    fn arity(&self) -> usize {
        1
    }
    fn execute(&self, args: &[&str], _env: &mut Environment<'_>) -> Result<()> {
        fs::remove_dir(args[0])?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// touch
// ---------------------------------------------------------------------------

struct TouchCmd;
impl Command for TouchCmd {
    fn kind(&self) -> CommandKind {
        CommandKind::Touch
    }
    fn description(&self) -> &str {
        "Create a file if it does not exist"
    }
    fn usage(&self) -> &str {
        "touch <file>"
    }
    fn arity(&self) -> usize {
        1
    }
    fn execute(&self, args: &[&str], _env: &mut Environment<'_>) -> Result<()> {
        OpenOptions::new().append(true).create(true).open(args[0])?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ls
// ---------------------------------------------------------------------------

struct LsCmd;
impl Command for LsCmd {
    fn kind(&self) -> CommandKind {
        CommandKind::Ls
    }
    fn description(&self) -> &str {
        "List one directory"
    }
    fn usage(&self) -> &str {
        "ls [path]"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<()> {
        let dir = args.first().copied().unwrap_or(".");
        let mut names = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let suffix = if entry.file_type()?.is_dir() { "/" } else { "" };
            names.push(format!("{}{suffix}", entry.file_name().to_string_lossy()));
        }
        if names.is_empty() {
            return Ok(());
        }
        names.sort();
        let mut text = names.join("\n");
        text.push('\n');
        env.emit(&text)
    }
}

// ---------------------------------------------------------------------------
// mv
// ---------------------------------------------------------------------------

struct MvCmd;
impl Command for MvCmd {
    fn kind(&self) -> CommandKind {
        CommandKind::Mv
    }
    fn description(&self) -> &str {
        "Rename a file or directory"
    }
    fn usage(&self) -> &str {
        "mv <src> <dst>"
    }
    fn arity(&self) -> usize {
        2
    }
    fn execute(&self, args: &[&str], _env: &mut Environment<'_>) -> Result<()> {
        fs::rename(args[0], args[1])?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// echo
// ---------------------------------------------------------------------------

struct EchoCmd;
impl Command for EchoCmd {
    fn kind(&self) -> CommandKind {
        CommandKind::Echo
    }
    fn description(&self) -> &str {
        "Print arguments"
    }
    fn usage(&self) -> &str {
        "echo [text...]"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<()> {
        env.emit(&echo_line(args))
    }
}

/// Every token is followed by one space, then a newline ends the line.
fn echo_line(args: &[&str]) -> String {
    let mut line = String::new();
    for arg in args {
        line.push_str(arg);
        line.push(' ');
    }
    line.push('\n');
    line
}

#[cfg(test)]
mod tests {
    use std::ffi::OsStr;
    use std::os::unix::fs::PermissionsExt;

    use proptest::prelude::*;
    use sysh_types::config::ShellConfig;

    use super::*;
    use crate::test_utils::{cwd_lock, path_str, run, run_with};

    #[test]
    fn registry_has_every_kind() {
        let reg = standard_registry().unwrap();
        for kind in CommandKind::ALL {
            let cmd = reg.lookup(kind.name()).expect(kind.name());
            assert_eq!(cmd.kind(), kind);
        }
        assert_eq!(reg.len(), CommandKind::ALL.len());
    }

    #[test]
    fn base_handlers_cover_all_but_derived() {
        for kind in CommandKind::ALL {
            match base_handler(kind) {
                Some(cmd) => assert_eq!(cmd.kind(), kind),
                None => assert!(matches!(kind, CommandKind::Netstat | CommandKind::Help)),
            }
        }
    }

    #[test]
    fn unknown_command() {
        assert_eq!(run(&["foo"]), "Unknown command: foo\n");
    }

    #[test]
    fn missing_args_reported_for_each_command() {
        let reg = standard_registry().unwrap();
        for cmd in reg.commands() {
            if cmd.arity() == 0 {
                continue;
            }
            let out = run(&[cmd.name()]);
            assert_eq!(
                out,
                format!("{}: Not enough arguments provided\n", cmd.name())
            );
        }
    }

    #[test]
    fn help_lists_every_command_with_syscall() {
        let out = run(&["help"]);
        assert!(out.starts_with(&format!("Commands ({}):\n", CommandKind::ALL.len())));
        assert_eq!(out.lines().count(), CommandKind::ALL.len() + 1);
        let rm = out.lines().find(|l| l.trim_start().starts_with("rm <path>")).unwrap();
        assert!(rm.contains("unlink"));
        assert!(out.contains("netstat"));
    }

    // -- echo --

    #[test]
    fn echo_keeps_trailing_space() {
        assert_eq!(run(&["echo", "a", "b", "c"]), "a b c \n");
    }

    #[test]
    fn echo_without_args_is_newline() {
        assert_eq!(run(&["echo"]), "\n");
    }

    proptest! {
        #[test]
        fn echo_join_policy(words in proptest::collection::vec("[a-z]{1,8}", 0..6)) {
            let refs: Vec<&str> = words.iter().map(String::as_str).collect();
            let line = echo_line(&refs);
            prop_assert!(line.ends_with('\n'));
            prop_assert_eq!(line.len(), words.iter().map(|w| w.len() + 1).sum::<usize>() + 1);
            for word in &words {
                let needle = format!("{word} ");
                prop_assert!(line.contains(&needle));
            }
        }
    }

    // -- cd / pwd --

    #[test]
    fn cd_then_pwd() {
        let _guard = cwd_lock();
        let original = std::env::current_dir().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let canonical = dir.path().canonicalize().unwrap();

        assert_eq!(run(&["cd", path_str(&canonical)]), "");
        assert_eq!(run(&["pwd"]), format!("{}\n", canonical.display()));

        std::env::set_current_dir(original).unwrap();
    }

    #[test]
    fn cd_missing_dir_is_error() {
        let _guard = cwd_lock();
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert_eq!(
            run(&["cd", path_str(&missing)]),
            "Error: cd: No such file or directory\n"
        );
    }

    #[test]
    fn pwd_is_single_line() {
        let _guard = cwd_lock();
        let out = run(&["pwd"]);
        assert!(out.starts_with('/'));
        assert!(out.ends_with('\n'));
        assert_eq!(out.lines().count(), 1);
    }

    #[test]
    fn pwd_over_limit_reports_once() {
        let _guard = cwd_lock();
        let original = std::env::current_dir().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let mut deep = dir.path().to_path_buf();
        for _ in 0..6 {
            deep.push("d".repeat(100));
        }
        fs::create_dir_all(&deep).unwrap();
        std::env::set_current_dir(&deep).unwrap();

        let config = ShellConfig::default();
        let tight = ShellConfig {
            cwd_max_len: 512,
            ..config
        };
        let sink = run_with(&tight, &["pwd"]);
        std::env::set_current_dir(original).unwrap();

        assert_eq!(sink.writes().len(), 1);
        assert_eq!(sink.output(), "pwd: working directory exceeds 512 bytes\n");
    }

    #[test]
    fn pwd_keeps_non_utf8_bytes() {
        let _guard = cwd_lock();
        let original = std::env::current_dir().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let odd = dir
            .path()
            .canonicalize()
            .unwrap()
            .join(OsStr::from_bytes(b"caf\xe9"));
        fs::create_dir(&odd).unwrap();
        std::env::set_current_dir(&odd).unwrap();

        let sink = run_with(&ShellConfig::default(), &["pwd"]);
        std::env::set_current_dir(original).unwrap();

        let mut expected = odd.as_os_str().as_bytes().to_vec();
        expected.push(b'\n');
        assert_eq!(sink.writes(), [expected]);
    }

    // -- cat --

    #[test]
    fn cat_prints_contents_with_trailing_newline() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        fs::write(&a, "alpha").unwrap();
        fs::write(&b, "beta").unwrap();
        assert_eq!(run(&["cat", path_str(&a), path_str(&b)]), "alpha\nbeta\n");
    }

    #[test]
    fn cat_missing_file_is_invalid_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        let sink = run_with(&ShellConfig::default(), &["cat", path_str(&missing)]);
        assert_eq!(sink.output(), "Invalid path");
        assert_eq!(sink.writes().len(), 1);
    }

    #[test]
    fn cat_stops_at_first_bad_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        let good = dir.path().join("good.txt");
        fs::write(&good, "never printed").unwrap();
        assert_eq!(
            run(&["cat", path_str(&missing), path_str(&good)]),
            "Invalid path"
        );
    }

    #[test]
    fn cat_emits_files_before_failure() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.txt");
        let missing = dir.path().join("missing");
        fs::write(&good, "first").unwrap();
        assert_eq!(
            run(&["cat", path_str(&good), path_str(&missing)]),
            "first\nInvalid path"
        );
    }

    #[test]
    fn cat_reads_in_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let big = dir.path().join("big.bin");
        let data = vec![b'x'; 10_000];
        fs::write(&big, &data).unwrap();
        let sink = run_with(&ShellConfig::default(), &["cat", path_str(&big)]);
        // 4096 + 4096 + 1808, then the newline.
        let sizes: Vec<usize> = sink.writes().iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![4096, 4096, 1808, 1]);
    }

    #[test]
    fn cat_survives_oversized_chunk_config() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("f.txt");
        fs::write(&file, "small").unwrap();

        let parsed = ShellConfig::from_toml_str("read_chunk_size = 9223372036854775807").unwrap();
        assert_eq!(run_with(&parsed, &["cat", path_str(&file)]).output(), "small\n");

        let raw = ShellConfig {
            read_chunk_size: usize::MAX,
            ..ShellConfig::default()
        };
        assert_eq!(run_with(&raw, &["cat", path_str(&file)]).output(), "small\n");
    }

    #[test]
    fn cat_directory_reports_read_error() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            run(&["cat", path_str(dir.path())]),
            "cat: Is a directory\n"
        );
    }

    // -- mkdir / rmdir --

    #[test]
    fn mkdir_uses_fixed_mode() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("made");
        assert_eq!(run(&["mkdir", path_str(&target)]), "");
        let meta = fs::metadata(&target).unwrap();
        assert!(meta.is_dir());
        let mode = meta.permissions().mode() & 0o777;
        assert_eq!(mode & !0o755, 0, "mode {mode:o} exceeds 0755");
        assert_eq!(mode & 0o700, 0o700);
    }

    #[test]
    fn mkdir_existing_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            run(&["mkdir", path_str(dir.path())]),
            "Error: mkdir: File exists\n"
        );
    }

    #[test]
    fn rmdir_removes_empty_dir_only() {
        let dir = tempfile::tempdir().unwrap();
        let empty = dir.path().join("empty");
        fs::create_dir(&empty).unwrap();
        assert_eq!(run(&["rmdir", path_str(&empty)]), "");
        assert!(!empty.exists());

        fs::write(dir.path().join("f"), "x").unwrap();
        assert_eq!(
            run(&["rmdir", path_str(dir.path())]),
            "Error: rmdir: Directory not empty\n"
        );
    }

    // -- rm / touch --

    #[test]
    fn rm_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("f");
        fs::write(&file, "x").unwrap();
        assert_eq!(run(&["rm", path_str(&file)]), "");
        assert!(!file.exists());
    }

    #[test]
    fn rm_refuses_directory() {
        let dir = tempfile::tempdir().unwrap();
        let out = run(&["rm", path_str(dir.path())]);
        assert!(out.starts_with("Error: rm: "), "{out}");
        assert!(dir.path().exists());
    }

    #[test]
    fn touch_creates_without_truncating() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("t");
        assert_eq!(run(&["touch", path_str(&file)]), "");
        assert!(file.exists());
        fs::write(&file, "keep").unwrap();
        run(&["touch", path_str(&file)]);
        assert_eq!(fs::read_to_string(&file).unwrap(), "keep");
    }

    // -- ls --

    #[test]
    fn ls_lists_sorted_with_dir_suffix() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.txt"), "").unwrap();
        fs::create_dir(dir.path().join("a")).unwrap();
        assert_eq!(run(&["ls", path_str(dir.path())]), "a/\nb.txt\n");
    }

    #[test]
    fn ls_empty_dir_prints_nothing() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(run(&["ls", path_str(dir.path())]), "");
    }

    // -- mv --

    #[test]
    fn mv_moves_contents() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        let dst = dir.path().join("dst");
        fs::write(&src, "payload").unwrap();
        assert_eq!(run(&["mv", path_str(&src), path_str(&dst)]), "");
        assert!(!src.exists());
        assert_eq!(fs::read_to_string(&dst).unwrap(), "payload");
    }

    #[test]
    fn mv_with_one_arg_changes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        fs::write(&src, "payload").unwrap();
        assert_eq!(
            run(&["mv", path_str(&src)]),
            "mv: Not enough arguments provided\n"
        );
        assert_eq!(fs::read_to_string(&src).unwrap(), "payload");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn mv_missing_source_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("nope");
        let dst = dir.path().join("dst");
        assert_eq!(
            run(&["mv", path_str(&src), path_str(&dst)]),
            "Error: mv: No such file or directory\n"
        );
    }
}
