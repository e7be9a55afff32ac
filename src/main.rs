//! resplink - command-line client
//!
//! Sends a single command given on the command line, or reads commands from
//! stdin one per line when none is given.

use anyhow::Context;
use resplink::connection::{connect, ConnectOptions, ExecutionError, TcpExecutor};
use resplink::RespObject;
use std::io::{self, BufRead, Write};
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Client configuration
#[derive(Debug, PartialEq)]
struct Config {
    /// Host to connect to
    host: String,
    /// Port to connect to
    port: u16,
    /// Read/write timeout in seconds, if any
    timeout: Option<u64>,
    /// Log connection details to stderr
    verbose: bool,
    /// Print help and exit
    help: bool,
    /// Print version and exit
    version: bool,
    /// Command and arguments to run once; empty means interactive mode
    command: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: resplink::DEFAULT_HOST.to_string(),
            port: resplink::DEFAULT_PORT,
            timeout: None,
            verbose: false,
            help: false,
            version: false,
            command: Vec::new(),
        }
    }
}

impl Config {
    /// Parse configuration from command-line arguments
    fn from_args() -> Self {
        let args: Vec<String> = std::env::args().skip(1).collect();
        Self::parse(&args).unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            print_help();
            std::process::exit(1);
        })
    }

    /// Parses flags up to the first positional argument; everything from
    /// there on is the command.
    fn parse(args: &[String]) -> Result<Self, String> {
        let mut config = Config::default();

        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--host" | "-h" => {
                    config.host = args
                        .get(i + 1)
                        .ok_or("--host requires a value")?
                        .clone();
                    i += 2;
                }
                "--port" | "-p" => {
                    let value = args.get(i + 1).ok_or("--port requires a value")?;
                    config.port = value
                        .parse()
                        .map_err(|_| format!("invalid port number: {}", value))?;
                    i += 2;
                }
                "--timeout" | "-t" => {
                    let value = args.get(i + 1).ok_or("--timeout requires a value")?;
                    let secs: u64 = value
                        .parse()
                        .map_err(|_| format!("invalid timeout: {}", value))?;
                    config.timeout = (secs > 0).then_some(secs);
                    i += 2;
                }
                "--verbose" => {
                    config.verbose = true;
                    i += 1;
                }
                "--help" => {
                    config.help = true;
                    i += 1;
                }
                "--version" | "-v" => {
                    config.version = true;
                    i += 1;
                }
                flag if flag.starts_with('-') => {
                    return Err(format!("unknown argument: {}", flag));
                }
                _ => {
                    config.command = args[i..].to_vec();
                    break;
                }
            }
        }

        Ok(config)
    }

    fn connect_options(&self) -> ConnectOptions {
        ConnectOptions::new(self.host.clone(), self.port)
            .with_io_timeout(self.timeout.map(Duration::from_secs))
    }
}

fn print_help() {
    println!(
        r#"
resplink - RESP command-line client

USAGE:
    resplink [OPTIONS] [COMMAND [ARG ...]]

OPTIONS:
    -h, --host <HOST>       Server host (default: 127.0.0.1)
    -p, --port <PORT>       Server port (default: 6379)
    -t, --timeout <SECS>    Read/write timeout in seconds (default: none)
        --verbose           Log connection details to stderr
    -v, --version           Print version information
        --help              Print this help message

EXAMPLES:
    resplink SET name Ariz         # Run one command and exit
    resplink -p 6380 GET name      # Talk to another port
    resplink                       # Interactive mode, one command per line

Arguments are split on whitespace in interactive mode; quoting is not
supported.
"#
    );
}

/// Prints a reply the way redis-cli does.
fn print_reply(reply: &RespObject) {
    println!("{}", reply);
}

/// Runs one command. Server errors are printed; anything else is fatal.
fn run_command(executor: &mut TcpExecutor, words: &[&str]) -> anyhow::Result<bool> {
    let Some((name, args)) = words.split_first() else {
        return Ok(true);
    };

    match executor.execute(name, args) {
        Ok(reply) => {
            print_reply(&reply);
            Ok(true)
        }
        Err(ExecutionError::Server { kind, message }) => {
            println!("(error) {} {}", kind, message);
            Ok(false)
        }
        Err(e) => Err(e).with_context(|| format!("command {} failed", name)),
    }
}

/// Reads commands from stdin until EOF or `quit`.
fn interactive(executor: &mut TcpExecutor, prompt: &str) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{}> ", prompt);
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            println!();
            return Ok(());
        }

        let words: Vec<&str> = line.split_whitespace().collect();
        match words.first() {
            Some(word) if word.eq_ignore_ascii_case("quit") || word.eq_ignore_ascii_case("exit") => {
                return Ok(());
            }
            _ => {
                run_command(executor, &words)?;
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    let config = Config::from_args();

    if config.help {
        print_help();
        return Ok(());
    }
    if config.version {
        println!("resplink version {}", resplink::VERSION);
        return Ok(());
    }

    // Set up logging; RUST_LOG overrides --verbose
    let default_level = if config.verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let options = config.connect_options();
    debug!(?options, "Connecting");
    let mut executor =
        connect(&options).with_context(|| format!("could not connect to {}", options.address()))?;

    if config.command.is_empty() {
        interactive(&mut executor, &options.address())?;
    } else {
        let words: Vec<&str> = config.command.iter().map(String::as_str).collect();
        if !run_command(&mut executor, &words)? {
            std::process::exit(1);
        }
    }

    let stats = executor.stats();
    info!(
        commands = stats.commands_sent,
        bytes = stats.bytes_written,
        server_errors = stats.server_errors,
        "Session finished"
    );
    Ok(())
}
