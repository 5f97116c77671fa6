//! Command kinds and the descriptive command -> syscall table.

/// Every command the shell knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CommandKind {
    Cd,
    Mkdir,
    Rm,
    Rmdir,
    Touch,
    Ls,
    Cat,
    Echo,
    Whoami,
    Chmod,
    Chown,
    Stat,
    Fstat,
    Lstat,
    Mv,
    Pwd,
    Getpid,
    Getppid,
    Kill,
    GetIp,
    Time,
    Gettimeofday,
    Netstat,
    Help,
}

impl CommandKind {
    /// All kinds, in table order.
    pub const ALL: [CommandKind; 24] = [
        Self::Cd,
        Self::Mkdir,
        Self::Rm,
        Self::Rmdir,
        Self::Touch,
        Self::Ls,
        Self::Cat,
        Self::Echo,
        Self::Whoami,
        Self::Chmod,
        Self::Chown,
        Self::Stat,
        Self::Fstat,
        Self::Lstat,
        Self::Mv,
        Self::Pwd,
        Self::Getpid,
        Self::Getppid,
        Self::Kill,
        Self::GetIp,
        Self::Time,
        Self::Gettimeofday,
        Self::Netstat,
        Self::Help,
    ];

    /// The name typed on the command line. Case-sensitive.
    pub fn name(self) -> &'static str {
        match self {
            Self::Cd => "cd",
            Self::Mkdir => "mkdir",
            Self::Rm => "rm",
            Self::Rmdir => "rmdir",
            Self::Touch => "touch",
            Self::Ls => "ls",
            Self::Cat => "cat",
            Self::Echo => "echo",
            Self::Whoami => "whoami",
            Self::Chmod => "chmod",
            Self::Chown => "chown",
            Self::Stat => "stat",
            Self::Fstat => "fstat",
            Self::Lstat => "lstat",
            Self::Mv => "mv",
            Self::Pwd => "pwd",
            Self::Getpid => "getpid",
            Self::Getppid => "getppid",
            Self::Kill => "kill",
            Self::GetIp => "getIP",
            Self::Time => "time",
            Self::Gettimeofday => "gettimeofday",
            Self::Netstat => "netstat",
            Self::Help => "help",
        }
    }

    /// Resolve a typed name. Exact match only.
    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name {
            "cd" => Self::Cd,
            "mkdir" => Self::Mkdir,
            "rm" => Self::Rm,
            "rmdir" => Self::Rmdir,
            "touch" => Self::Touch,
            "ls" => Self::Ls,
            "cat" => Self::Cat,
            "echo" => Self::Echo,
            "whoami" => Self::Whoami,
            "chmod" => Self::Chmod,
            "chown" => Self::Chown,
            "stat" => Self::Stat,
            "fstat" => Self::Fstat,
            "lstat" => Self::Lstat,
            "mv" => Self::Mv,
            "pwd" => Self::Pwd,
            "getpid" => Self::Getpid,
            "getppid" => Self::Getppid,
            "kill" => Self::Kill,
            "getIP" => Self::GetIp,
            "time" => Self::Time,
            "gettimeofday" => Self::Gettimeofday,
            "netstat" => Self::Netstat,
            "help" => Self::Help,
            _ => return None,
        };
        Some(kind)
    }

    /// The operating-system facility the command maps onto. Display only.
    pub fn syscall(self) -> &'static str {
        match self {
            Self::Cd => "chdir",
            Self::Mkdir => "mkdir",
            Self::Rm => "unlink",
            Self::Rmdir => "rmdir",
            Self::Touch => "open",
            Self::Ls => "getdents",
            Self::Cat => "read",
            Self::Echo => "write",
            Self::Whoami => "getuid",
            Self::Chmod => "chmod",
            Self::Chown => "chown",
            Self::Stat => "stat",
            Self::Fstat => "fstat",
            Self::Lstat => "lstat",
            Self::Mv => "rename",
            Self::Pwd => "getcwd",
            Self::Getpid => "getpid",
            Self::Getppid => "getppid",
            Self::Kill => "kill",
            Self::GetIp => "connect + getsockname",
            Self::Time => "time",
            Self::Gettimeofday => "gettimeofday",
            Self::Netstat => "read (tcp table)",
            Self::Help => "-",
        }
    }
}
