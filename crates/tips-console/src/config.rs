//! Console launch configuration
//!
//! Mirrors the option table of the `tips-console` binary. Options left unset
//! are not passed, so the console's own defaults apply.

use crate::error::{ConsoleError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tips_console_transport::ProcessConfig;

/// Environment variable overriding the console program
pub const ENV_CONSOLE_BIN: &str = "TIPS_CONSOLE_BIN";

/// Environment variable selecting the network protocol
pub const ENV_NET_PROT: &str = "TIPS_CONSOLE_NET_PROT";

/// IPC capacities the console is built for
pub const SUPPORTED_IPC_CAPACITIES: [u32; 6] = [4, 8, 16, 64, 128, 256];

/// Network protocol the console uses to reach the bus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetProt {
    /// TCP based multicast emulation (console default)
    Tcpcast,
    /// UDP multicast
    Udpcast,
    /// Reliable multicast
    Rmcast,
    /// netmap
    Netmap,
    /// Reliable netmap
    Rnetmap,
}

impl NetProt {
    /// Name as the console's `--netProt` option expects it
    pub fn as_str(&self) -> &'static str {
        match self {
            NetProt::Tcpcast => "tcpcast",
            NetProt::Udpcast => "udpcast",
            NetProt::Rmcast => "rmcast",
            NetProt::Netmap => "netmap",
            NetProt::Rnetmap => "rnetmap",
        }
    }
}

impl fmt::Display for NetProt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NetProt {
    type Err = ConsoleError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "tcpcast" => Ok(NetProt::Tcpcast),
            "udpcast" => Ok(NetProt::Udpcast),
            "rmcast" => Ok(NetProt::Rmcast),
            "netmap" => Ok(NetProt::Netmap),
            "rnetmap" => Ok(NetProt::Rnetmap),
            other => Err(ConsoleError::Config(format!(
                "unknown netProt {:?}, expected one of tcpcast udpcast rmcast netmap rnetmap",
                other
            ))),
        }
    }
}

/// How to launch and stop a console session
#[derive(Debug, Clone, PartialEq)]
pub struct ConsoleConfig {
    /// Console executable
    pub program: String,

    /// `--netProt`
    pub net_prot: Option<NetProt>,

    /// `--ifaceAddr`, NIC address for IO (non-netmap protocols)
    pub iface_addr: Option<String>,

    /// `--netmapPort`, netmap device for rnetmap
    pub netmap_port: Option<String>,

    /// `--ipcCapacity`, must match the monitored system
    pub ipc_capacity: Option<u32>,

    /// `--bufWidth`, largest message the console handles (excluding attachment)
    pub buf_width: Option<usize>,

    /// `--logLevel`
    pub log_level: Option<u8>,

    /// `--cfg`, console configuration file
    pub cfg_file: Option<PathBuf>,

    /// Raw arguments appended after the options above
    pub extra_args: Vec<String>,

    /// Environment variables set for the console
    pub env: HashMap<String, String>,

    /// Start the console with only `env` instead of inheriting ours
    pub clear_env: bool,

    /// Grace period for each shutdown step
    pub shutdown_timeout: Duration,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            program: "tips-console".to_string(),
            net_prot: None,
            iface_addr: None,
            netmap_port: None,
            ipc_capacity: None,
            buf_width: None,
            log_level: None,
            cfg_file: None,
            extra_args: Vec::new(),
            env: HashMap::new(),
            clear_env: false,
            shutdown_timeout: Duration::from_secs(5),
        }
    }
}

impl ConsoleConfig {
    /// Create a config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `TIPS_CONSOLE_BIN` and `TIPS_CONSOLE_NET_PROT`
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Ok(program) = std::env::var(ENV_CONSOLE_BIN) {
            config.program = program;
        }
        if let Ok(net_prot) = std::env::var(ENV_NET_PROT) {
            config.net_prot = Some(net_prot.parse()?);
        }
        Ok(config)
    }

    /// Set the console executable
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Set the network protocol
    pub fn with_net_prot(mut self, net_prot: NetProt) -> Self {
        self.net_prot = Some(net_prot);
        self
    }

    /// Set the interface address
    pub fn with_iface_addr(mut self, addr: impl Into<String>) -> Self {
        self.iface_addr = Some(addr.into());
        self
    }

    /// Set the netmap device
    pub fn with_netmap_port(mut self, port: impl Into<String>) -> Self {
        self.netmap_port = Some(port.into());
        self
    }

    /// Set the IPC capacity
    pub fn with_ipc_capacity(mut self, capacity: u32) -> Self {
        self.ipc_capacity = Some(capacity);
        self
    }

    /// Set the largest message size
    pub fn with_buf_width(mut self, width: usize) -> Self {
        self.buf_width = Some(width);
        self
    }

    /// Set the console's log level
    pub fn with_log_level(mut self, level: u8) -> Self {
        self.log_level = Some(level);
        self
    }

    /// Point the console at a configuration file
    pub fn with_cfg_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.cfg_file = Some(path.into());
        self
    }

    /// Append a raw argument
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.extra_args.push(arg.into());
        self
    }

    /// Set an environment variable for the console
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Isolate the console from our environment
    pub fn with_clear_env(mut self, clear: bool) -> Self {
        self.clear_env = clear;
        self
    }

    /// Set the shutdown grace period
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Check option values against what the console accepts
    pub fn validate(&self) -> Result<()> {
        if self.program.trim().is_empty() {
            return Err(ConsoleError::Config("console program is empty".to_string()));
        }
        if let Some(capacity) = self.ipc_capacity {
            if !SUPPORTED_IPC_CAPACITIES.contains(&capacity) {
                return Err(ConsoleError::Config(format!(
                    "ipcCapacity {} not supported, expected one of {:?}",
                    capacity, SUPPORTED_IPC_CAPACITIES
                )));
            }
        }
        if self.buf_width == Some(0) {
            return Err(ConsoleError::Config("bufWidth must be positive".to_string()));
        }
        if self.net_prot == Some(NetProt::Rnetmap) && self.netmap_port.is_none() {
            return Err(ConsoleError::Config(
                "rnetmap requires a netmapPort".to_string(),
            ));
        }
        Ok(())
    }

    /// Command line arguments for the console, options first
    pub fn args(&self) -> Vec<String> {
        let mut args = Vec::new();
        let mut push = |name: &str, value: String| {
            args.push(format!("--{}", name));
            args.push(value);
        };

        if let Some(net_prot) = self.net_prot {
            push("netProt", net_prot.to_string());
        }
        if let Some(addr) = &self.iface_addr {
            push("ifaceAddr", addr.clone());
        }
        if let Some(port) = &self.netmap_port {
            push("netmapPort", port.clone());
        }
        if let Some(capacity) = self.ipc_capacity {
            push("ipcCapacity", capacity.to_string());
        }
        if let Some(width) = self.buf_width {
            push("bufWidth", width.to_string());
        }
        if let Some(level) = self.log_level {
            push("logLevel", level.to_string());
        }
        if let Some(cfg) = &self.cfg_file {
            push("cfg", cfg.to_string_lossy().into_owned());
        }

        args.extend(self.extra_args.iter().cloned());
        args
    }

    /// Validate and convert into a transport process config
    pub fn to_process_config(&self) -> Result<ProcessConfig> {
        self.validate()?;
        let mut process = ProcessConfig::new(self.program.clone())
            .with_args(self.args())
            .with_clear_env(self.clear_env)
            .with_terminate_timeout(self.shutdown_timeout);
        for (key, value) in &self.env {
            process = process.with_env(key.clone(), value.clone());
        }
        Ok(process)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_default_config() {
        let config = ConsoleConfig::default();
        assert_eq!(config.program, "tips-console");
        assert!(config.args().is_empty());
        assert_eq!(config.shutdown_timeout, Duration::from_secs(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder_renders_options() {
        let config = ConsoleConfig::new()
            .with_program("./tips-console")
            .with_net_prot(NetProt::Rmcast)
            .with_iface_addr("127.0.0.1")
            .with_ipc_capacity(64)
            .with_buf_width(1000)
            .with_log_level(3)
            .with_arg("--help");

        assert_eq!(
            config.args(),
            vec![
                "--netProt",
                "rmcast",
                "--ifaceAddr",
                "127.0.0.1",
                "--ipcCapacity",
                "64",
                "--bufWidth",
                "1000",
                "--logLevel",
                "3",
                "--help",
            ]
        );
    }

    #[test]
    fn test_netmap_port_and_cfg_file_render() {
        let config = ConsoleConfig::new()
            .with_net_prot(NetProt::Rnetmap)
            .with_netmap_port("netmap:eth0")
            .with_cfg_file("/etc/tips/console.cfg");

        assert_eq!(
            config.args(),
            vec![
                "--netProt",
                "rnetmap",
                "--netmapPort",
                "netmap:eth0",
                "--cfg",
                "/etc/tips/console.cfg",
            ]
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_to_process_config() {
        let process = ConsoleConfig::new()
            .with_program("/opt/tips/tips-console")
            .with_net_prot(NetProt::Tcpcast)
            .with_env("LD_LIBRARY_PATH", "/opt/tips/lib")
            .with_shutdown_timeout(Duration::from_millis(500))
            .with_clear_env(true)
            .to_process_config()
            .unwrap();

        assert_eq!(process.program, "/opt/tips/tips-console");
        assert_eq!(process.args, vec!["--netProt", "tcpcast"]);
        assert_eq!(
            process.env.get("LD_LIBRARY_PATH").map(String::as_str),
            Some("/opt/tips/lib")
        );
        assert_eq!(process.terminate_timeout, Duration::from_millis(500));
        assert!(process.clear_env);
    }

    #[rstest]
    #[case(ConsoleConfig::new().with_program("  "))]
    #[case(ConsoleConfig::new().with_ipc_capacity(32))]
    #[case(ConsoleConfig::new().with_buf_width(0))]
    #[case(ConsoleConfig::new().with_net_prot(NetProt::Rnetmap))]
    fn test_validate_rejects(#[case] config: ConsoleConfig) {
        assert!(matches!(config.validate(), Err(ConsoleError::Config(_))));
        assert!(config.to_process_config().is_err());
    }

    #[rstest]
    #[case("tcpcast", NetProt::Tcpcast)]
    #[case("udpcast", NetProt::Udpcast)]
    #[case("rmcast", NetProt::Rmcast)]
    #[case(" netmap ", NetProt::Netmap)]
    #[case("rnetmap", NetProt::Rnetmap)]
    fn test_net_prot_parse(#[case] input: &str, #[case] expected: NetProt) {
        assert_eq!(input.parse::<NetProt>().unwrap(), expected);
        assert_eq!(expected.to_string(), input.trim());
    }

    #[test]
    fn test_net_prot_parse_unknown() {
        assert!("carrier-pigeon".parse::<NetProt>().is_err());
    }

    #[test]
    fn test_from_env_overrides() {
        temp_env::with_vars(
            [
                (ENV_CONSOLE_BIN, Some("/usr/local/bin/tips-console")),
                (ENV_NET_PROT, Some("rmcast")),
            ],
            || {
                let config = ConsoleConfig::from_env().unwrap();
                assert_eq!(config.program, "/usr/local/bin/tips-console");
                assert_eq!(config.net_prot, Some(NetProt::Rmcast));
            },
        );
    }

    #[test]
    fn test_from_env_defaults_when_unset() {
        temp_env::with_vars_unset([ENV_CONSOLE_BIN, ENV_NET_PROT], || {
            let config = ConsoleConfig::from_env().unwrap();
            assert_eq!(config, ConsoleConfig::default());
        });
    }

    #[test]
    fn test_from_env_rejects_bad_protocol() {
        temp_env::with_var(ENV_NET_PROT, Some("bogus"), || {
            assert!(ConsoleConfig::from_env().is_err());
        });
    }
}
