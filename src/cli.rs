use clap::Parser;
use std::path::PathBuf;
use tracing::Level;

use dns_inspect::codec::{Framing, MAX_MESSAGE_SIZE};

#[derive(Parser, Debug)]
#[command(name = "dns-inspect")]
#[command(about = "Decode raw DNS messages and print them", long_about = None)]
pub struct Args {
    /// Files holding raw DNS messages; reads stdin when none are given
    pub files: Vec<PathBuf>,

    /// Treat input as a stream of messages, each with a two-byte length prefix
    #[arg(short, long)]
    pub framed: bool,

    /// Reject messages larger than this many bytes without decoding them
    #[arg(long, default_value_t = MAX_MESSAGE_SIZE)]
    pub max_size: usize,

    /// Log level, one of <trace|debug|info|warn|error>
    #[arg(short, long, default_value = "warn", value_parser = parse_level)]
    pub log_level: Level,
}

fn parse_level(s: &str) -> Result<Level, String> {
    s.parse::<Level>().map_err(|_| {
        format!(
            "Invalid log level: '{}'. Expected one of trace, debug, info, warn, error",
            s
        )
    })
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn framing(&self) -> Framing {
        if self.framed {
            Framing::LengthPrefixed
        } else {
            Framing::Datagram
        }
    }
}
