//! `bitgrid` — the command-line front end for serving a Program over BGCF
//! and for driving a running server as a client.

#![warn(missing_docs)]

mod client;
mod serve;

use std::process;

use bitgrid_server::LinkForward;
use clap::{Parser, Subcommand, ValueEnum};

/// bitgrid — serve or drive a BitGrid program over the BGCF wire protocol.
#[derive(Parser, Debug)]
#[command(name = "bitgrid", version, about = "BitGrid emulator server and client")]
pub struct Cli {
    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve a Program over BGCF until a client sends SHUTDOWN.
    Serve(ServeArgs),
    /// Open one connection to a running server and issue a single action.
    Client(ClientArgs),
}

/// Arguments for the `bitgrid serve` subcommand.
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Path to the Program JSON file to load.
    #[arg(long)]
    pub program: String,

    /// Address to bind.
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Port to bind.
    #[arg(long)]
    pub port: u16,

    /// Optional bitstream file to preload onto the program at startup.
    #[arg(long)]
    pub bitstream: Option<String>,

    /// How outbound seam links forward subcycle outputs to their peers.
    #[arg(long, value_enum, default_value_t = LinkForwardArg::Both)]
    pub link_forward: LinkForwardArg,

    /// Log connection lifecycle and per-frame dispatch to stderr.
    #[arg(short, long)]
    pub verbose: bool,
}

/// CLI spelling of [`bitgrid_server::LinkForward`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LinkForwardArg {
    /// Send the full lane value every subcycle.
    Both,
    /// Send only the lanes whose phase just became active.
    Phase,
    /// Send the full value only on B (odd) subcycles.
    Cycle,
    /// Alias for `cycle`, matching the original tool's flag spelling.
    Bonly,
}

impl From<LinkForwardArg> for LinkForward {
    fn from(value: LinkForwardArg) -> Self {
        match value {
            LinkForwardArg::Both => LinkForward::Both,
            LinkForwardArg::Phase => LinkForward::Phase,
            LinkForwardArg::Cycle | LinkForwardArg::Bonly => LinkForward::Cycle,
        }
    }
}

/// Arguments for the `bitgrid client` subcommand.
#[derive(Parser, Debug)]
pub struct ClientArgs {
    /// Server address to connect to.
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Server port to connect to.
    #[arg(long)]
    pub port: u16,

    /// Which action to issue over the connection.
    #[command(subcommand)]
    pub action: ClientAction,
}

/// One BGCF action a client invocation can issue.
#[derive(Subcommand, Debug)]
pub enum ClientAction {
    /// Send HELLO and print the server's grid dimensions.
    Hello,
    /// Chunk-upload a bitstream file and APPLY it.
    Load {
        /// Path to the bitstream file to upload.
        #[arg(long)]
        path: String,
        /// Maximum bytes per LOAD_CHUNK frame.
        #[arg(long, default_value_t = 4096)]
        chunk_size: usize,
    },
    /// Merge `name=value` pairs into the server's current input latch.
    SetInputs {
        /// One or more `name=value` assignments (value as decimal or `0x`-hex).
        #[arg(required = true, num_args = 1..)]
        assignments: Vec<String>,
    },
    /// Advance the emulator by some number of subcycles.
    Step {
        /// Subcycles to advance.
        #[arg(long, default_value_t = 1)]
        cycles: u32,
    },
    /// Request and print a sampled output snapshot.
    GetOutputs,
    /// Establish an outbound seam link to a peer server.
    Link {
        /// Local edge direction the seam sits on.
        #[arg(long, value_enum)]
        direction: DirectionArg,
        /// Local output bus feeding the seam.
        #[arg(long)]
        local_out: String,
        /// Peer input bus the seam drives.
        #[arg(long)]
        remote_in: String,
        /// Peer host to connect to.
        #[arg(long)]
        peer_host: String,
        /// Peer port to connect to.
        #[arg(long)]
        peer_port: u16,
        /// Requested lane count (0 = auto-negotiate).
        #[arg(long, default_value_t = 0)]
        lanes: u16,
    },
    /// Tear down every seam link.
    Unlink,
    /// Close this connection.
    Quit,
    /// Ask the server to stop its listener and exit.
    Shutdown,
}

/// CLI spelling of [`bitgrid_common::Direction`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum DirectionArg {
    /// North.
    N,
    /// East.
    E,
    /// South.
    S,
    /// West.
    W,
}

impl From<DirectionArg> for bitgrid_common::Direction {
    fn from(value: DirectionArg) -> Self {
        match value {
            DirectionArg::N => bitgrid_common::Direction::N,
            DirectionArg::E => bitgrid_common::Direction::E,
            DirectionArg::S => bitgrid_common::Direction::S,
            DirectionArg::W => bitgrid_common::Direction::W,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Serve(args) => serve::run(&args),
        Command::Client(args) => client::run(&args),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parse_serve_defaults() {
        let cli = Cli::parse_from(["bitgrid", "serve", "--program", "p.json", "--port", "9000"]);
        match cli.command {
            Command::Serve(args) => {
                assert_eq!(args.program, "p.json");
                assert_eq!(args.host, "0.0.0.0");
                assert_eq!(args.port, 9000);
                assert!(args.bitstream.is_none());
                assert_eq!(args.link_forward, LinkForwardArg::Both);
                assert!(!args.verbose);
            }
            _ => panic!("expected Serve command"),
        }
    }

    #[test]
    fn parse_serve_with_link_forward_and_bitstream() {
        let cli = Cli::parse_from([
            "bitgrid",
            "serve",
            "--program",
            "p.json",
            "--port",
            "9000",
            "--bitstream",
            "p.bgbs",
            "--link-forward",
            "bonly",
            "--verbose",
        ]);
        match cli.command {
            Command::Serve(args) => {
                assert_eq!(args.bitstream.as_deref(), Some("p.bgbs"));
                assert_eq!(args.link_forward, LinkForwardArg::Bonly);
                assert!(args.verbose);
            }
            _ => panic!("expected Serve command"),
        }
    }

    #[test]
    fn parse_client_set_inputs() {
        let cli = Cli::parse_from([
            "bitgrid",
            "client",
            "--port",
            "9000",
            "set-inputs",
            "west=0x148",
            "east=0",
        ]);
        match cli.command {
            Command::Client(args) => {
                assert_eq!(args.host, "127.0.0.1");
                match args.action {
                    ClientAction::SetInputs { assignments } => {
                        assert_eq!(assignments, vec!["west=0x148", "east=0"]);
                    }
                    _ => panic!("expected SetInputs action"),
                }
            }
            _ => panic!("expected Client command"),
        }
    }

    #[test]
    fn parse_client_link() {
        let cli = Cli::parse_from([
            "bitgrid",
            "client",
            "--port",
            "9000",
            "link",
            "--direction",
            "e",
            "--local-out",
            "east",
            "--remote-in",
            "west",
            "--peer-host",
            "10.0.0.2",
            "--peer-port",
            "9001",
        ]);
        match cli.command {
            Command::Client(args) => match args.action {
                ClientAction::Link {
                    direction,
                    local_out,
                    remote_in,
                    peer_host,
                    peer_port,
                    lanes,
                } => {
                    assert_eq!(direction, DirectionArg::E);
                    assert_eq!(local_out, "east");
                    assert_eq!(remote_in, "west");
                    assert_eq!(peer_host, "10.0.0.2");
                    assert_eq!(peer_port, 9001);
                    assert_eq!(lanes, 0);
                }
                _ => panic!("expected Link action"),
            },
            _ => panic!("expected Client command"),
        }
    }

    #[test]
    fn parse_client_shutdown() {
        let cli = Cli::parse_from(["bitgrid", "client", "--port", "9000", "shutdown"]);
        match cli.command {
            Command::Client(args) => assert!(matches!(args.action, ClientAction::Shutdown)),
            _ => panic!("expected Client command"),
        }
    }
}
