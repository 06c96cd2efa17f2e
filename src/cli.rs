use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "srvmon")]
#[command(author = "Anurag Ambuj")]
#[command(version)]
#[command(about = "A terminal dashboard for remote server status endpoints", long_about = None)]
pub struct Cli {
    #[arg(short, long, help = "Connect to the server with this id, skipping the picker")]
    pub server: Option<String>,

    #[arg(
        short,
        long,
        help = "Poll this status URL directly instead of a configured server",
        conflicts_with = "server"
    )]
    pub url: Option<String>,

    #[arg(
        short = 'i',
        long,
        help = "Polling interval (e.g. 5s, 10s, 1m)",
        value_parser = parse_duration
    )]
    pub interval: Option<Duration>,

    #[arg(long, help = "Number of samples kept per chart")]
    pub history: Option<usize>,

    #[arg(
        short = 'c',
        long,
        help = "Path to the server list file",
        env = "SRVMON_CONFIG"
    )]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Write logs to this file", env = "SRVMON_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

fn parse_duration(s: &str) -> Result<Duration, humantime::DurationError> {
    humantime::parse_duration(s)
}
