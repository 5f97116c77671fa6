//! Network commands: getIP and netstat.

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};
use std::rc::Rc;

use sysh_types::error::{Result, SyshError};

use crate::interpreter::{Command, Derivation, Environment};
use crate::kind::CommandKind;

/// Add `netstat`, composed from the registered `cat`.
pub fn register_netstat(derivation: &mut Derivation) -> Result<()> {
    derivation.derive(CommandKind::Cat, |cat| Box::new(NetstatCmd { cat }))
}

// ---------------------------------------------------------------------------
// getIP
// ---------------------------------------------------------------------------

pub(crate) struct GetIpCmd;
impl Command for GetIpCmd {
    fn kind(&self) -> CommandKind {
        CommandKind::GetIp
    }
    fn description(&self) -> &str {
        "Print the local address used for outbound traffic"
    }
    fn usage(&self) -> &str {
        "getIP"
    }
    fn execute(&self, _args: &[&str], env: &mut Environment<'_>) -> Result<()> {
        let target: SocketAddr = env.config.ip_probe_addr.parse().map_err(|e| {
            SyshError::Command(format!(
                "invalid probe address {}: {e}",
                env.config.ip_probe_addr
            ))
        })?;
        let local = outbound_addr(target)?;
        env.emit(&format!("{}\n", local.ip()))
    }
}

/// Connect a UDP socket to `target` and read back the address the kernel
/// picked. Connecting a datagram socket sends nothing on the wire.
fn outbound_addr(target: SocketAddr) -> Result<SocketAddr> {
    let bind: SocketAddr = if target.is_ipv4() {
        (Ipv4Addr::UNSPECIFIED, 0).into()
    } else {
        (Ipv6Addr::UNSPECIFIED, 0).into()
    };
    let socket = UdpSocket::bind(bind)?;
    socket.connect(target)?;
    Ok(socket.local_addr()?)
}

// ---------------------------------------------------------------------------
// netstat
// ---------------------------------------------------------------------------

/// `cat` pointed at the kernel TCP table.
struct NetstatCmd {
    cat: Rc<dyn Command>,
}

impl Command for NetstatCmd {
    fn kind(&self) -> CommandKind {
        CommandKind::Netstat
    }
    fn description(&self) -> &str {
        "Print the kernel TCP connection table"
    }
    fn usage(&self) -> &str {
        "netstat"
    }
    fn execute(&self, _args: &[&str], env: &mut Environment<'_>) -> Result<()> {
        let config = env.config;
        self.cat.run(&[config.netstat_path.as_str()], env)
    }
}
