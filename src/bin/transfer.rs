//! transfer - 단일 TCP 연결 파일/테스트 데이터 전송
//!
//! 송신자가 포트를 열고 기다리면 수신자가 접속해서 받아 간다.
//!
//! 사용법:
//!   cargo run --release --bin transfer -- [GLOBAL] <send|receive> ...
//!
//! 예시:
//!   # 파일 보내기 (아무 수신자나 허용)
//!   transfer send file report.pdf to anyone
//!
//!   # 받기 (헤더의 파일 이름으로 저장)
//!   transfer receive file from 192.168.1.10
//!
//!   # 처리율 측정: 100 MiB 반복 송신, 최대 10초 수신
//!   transfer send --repeat test --size 100 to anyone
//!   transfer receive test --max-time 10 from 192.168.1.10

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use tracing::level_filters::LevelFilter;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use transfer::{
    humanize, Config, Receiver, Sender, DEFAULT_RECEIVE_FILE_NAME, DEFAULT_TEST_SIZE_MIB, MIB,
};

/// 출력 상세 수준
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Verbosity {
    Quiet,
    Minimal,
    Normal,
    Detailed,
    Diagnostic,
}

impl Verbosity {
    fn level(self) -> LevelFilter {
        match self {
            Verbosity::Quiet => LevelFilter::ERROR,
            Verbosity::Minimal => LevelFilter::WARN,
            Verbosity::Normal => LevelFilter::INFO,
            Verbosity::Detailed => LevelFilter::DEBUG,
            Verbosity::Diagnostic => LevelFilter::TRACE,
        }
    }
}

/// Simple transfer app
#[derive(Debug, Parser)]
#[command(name = "transfer", version, about = "Send or receive a file or test data over TCP")]
struct Cli {
    /// Level of detail in output messages
    #[arg(short, long, global = true, value_enum, default_value_t = Verbosity::Normal)]
    verbosity: Verbosity,

    /// Timeout in seconds for establishing the connection, or 0 for no timeout
    #[arg(short, long, global = true, default_value_t = 30)]
    timeout: u64,

    /// Set false to not show timing and performance data
    #[arg(short, long, global = true, default_value_t = true, action = ArgAction::Set)]
    measured: bool,

    /// Port to listen or send on
    #[arg(short, long, global = true, default_value_t = transfer::DEFAULT_PORT)]
    port: u16,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Send a file or test data
    #[command(alias = "s")]
    Send {
        /// Repeat the send operation forever
        #[arg(short, long)]
        repeat: bool,

        #[command(subcommand)]
        what: SendCommand,
    },

    /// Receive a file or test data
    #[command(alias = "r")]
    Receive {
        #[command(subcommand)]
        what: ReceiveCommand,
    },
}

#[derive(Debug, Subcommand)]
enum SendCommand {
    /// Send a file
    #[command(alias = "f")]
    File {
        /// The file to send
        file: PathBuf,

        /// Set false to send raw data with no "filename:name\n" header
        #[arg(short = 'f', long, default_value_t = true, action = ArgAction::Set)]
        include_filename: bool,

        #[command(subcommand)]
        to: ToPeer,
    },

    /// Send test data
    #[command(alias = "t")]
    Test {
        /// Test data size in MiB (1 to 1024)
        #[arg(short, long, default_value_t = DEFAULT_TEST_SIZE_MIB)]
        size: u32,

        #[command(subcommand)]
        to: ToPeer,
    },
}

#[derive(Debug, Subcommand)]
enum ReceiveCommand {
    /// Receive a file
    #[command(alias = "f")]
    File {
        /// The name of the file to receive into
        #[arg(default_value = DEFAULT_RECEIVE_FILE_NAME)]
        file_name: PathBuf,

        #[command(subcommand)]
        from: FromPeer,
    },

    /// Receive test data
    #[command(alias = "t")]
    Test {
        /// Maximum amount of data to receive in MiB, or 0 for all sent data
        #[arg(long, default_value_t = 0)]
        max_size: u64,

        /// Maximum time to receive for in seconds, or 0 for all sent data
        #[arg(long, default_value_t = 0)]
        max_time: u64,

        #[command(subcommand)]
        from: FromPeer,
    },
}

#[derive(Debug, Subcommand)]
enum ToPeer {
    /// The recipient of the file or test data
    To {
        /// Recipient machine, IP address, or "anyone" to allow any client to connect
        recipient: String,
    },
}

#[derive(Debug, Subcommand)]
enum FromPeer {
    /// The sender of the file or test data
    From {
        /// Sender machine or IP address
        sender: String,
    },
}

fn init_logging(verbosity: Verbosity) -> Result<(), Box<dyn std::error::Error>> {
    // RUST_LOG가 있으면 우선
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.level().to_string()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}

fn flag(on: bool, what: &str) -> String {
    format!("{}{}", if on { "" } else { "not " }, what)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbosity) {
        eprintln!("logging setup failed: {}", e);
        return ExitCode::FAILURE;
    }

    let config = Config::new()
        .with_port(cli.port)
        .with_timeout_secs(cli.timeout)
        .with_measured(cli.measured);
    let settings = format!("(log level: {:?}; {})", cli.verbosity, config.summary());

    let (what, result) = match cli.command {
        Command::Send { repeat, what } => {
            let sender = Sender::new(config, repeat);
            match what {
                SendCommand::File {
                    file,
                    include_filename,
                    to: ToPeer::To { recipient },
                } => {
                    info!(
                        "Sending file {} to {} {} ({}; {}):",
                        file.display(),
                        recipient,
                        settings,
                        flag(repeat, "repeating"),
                        flag(include_filename, "including file name"),
                    );
                    let result = sender.send_file(&file, include_filename, &recipient).await;
                    ("File send", result.map(|_| ()))
                }
                SendCommand::Test {
                    size,
                    to: ToPeer::To { recipient },
                } => {
                    info!(
                        "Sending test of {} to {} {} ({})",
                        humanize::size(size as u64 * MIB),
                        recipient,
                        settings,
                        flag(repeat, "repeating"),
                    );
                    let result = sender.send_test(size, &recipient).await;
                    ("Test send", result.map(|_| ()))
                }
            }
        }
        Command::Receive { what } => {
            let receiver = Receiver::new(config);
            match what {
                ReceiveCommand::File {
                    file_name,
                    from: FromPeer::From { sender },
                } => {
                    info!("Receiving file from {} {}...", sender, settings);
                    let result = receiver.receive_file(&file_name, &sender).await;
                    ("File receive", result.map(|_| ()))
                }
                ReceiveCommand::Test {
                    max_size,
                    max_time,
                    from: FromPeer::From { sender },
                } => {
                    info!(
                        "Receiving {}test data {}from {} {}...",
                        if max_size > 0 { format!("up to {} MiB of ", max_size) } else { String::new() },
                        if max_time > 0 { format!("for up to {} seconds ", max_time) } else { String::new() },
                        sender,
                        settings,
                    );
                    let result = receiver.receive_test(max_size, max_time, &sender).await;
                    ("Test receive", result.map(|_| ()))
                }
            }
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{} failed due to: {}", what, e);
            ExitCode::FAILURE
        }
    }
}
