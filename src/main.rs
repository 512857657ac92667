//! llama-bridge command-line entry point.
//!
//! Exercises the bridge outside a host app:
//!
//! - `llama-bridge infer` - One-shot generation (open, generate, close)
//! - `llama-bridge preflight` - Model file checks
//! - `llama-bridge checksum` - SHA-256 print / verify
//! - `llama-bridge config` - Show, list defaults, validate

use std::process::ExitCode;

use llama_bridge::cli::{config_cmd, model_cmd, parse_int_arg, EXIT_USAGE};

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("help");

    match command {
        "infer" => {
            let (Some(model), Some(prompt)) = (args.get(2), args.get(3)) else {
                print_command_help("infer");
                return exit(EXIT_USAGE);
            };
            let max_tokens = match parse_int_arg(args.get(4), 0) {
                Ok(n) => n,
                Err(e) => {
                    eprintln!("Invalid max_tokens: {}", e);
                    return exit(EXIT_USAGE);
                }
            };
            config_cmd::init_cli_logging();
            exit(model_cmd::run_infer(model, prompt, max_tokens))
        }
        "preflight" => {
            let Some(model) = args.get(2) else {
                print_command_help("preflight");
                return exit(EXIT_USAGE);
            };
            config_cmd::init_cli_logging();
            exit(model_cmd::run_preflight(model))
        }
        "checksum" => {
            let Some(model) = args.get(2) else {
                print_command_help("checksum");
                return exit(EXIT_USAGE);
            };
            exit(model_cmd::run_checksum(model, args.get(3).map(|s| s.as_str())))
        }
        "config" => {
            let subcommand = args.get(2).map(|s| s.as_str()).unwrap_or("show");
            match subcommand {
                "show" => {
                    let json = args.get(3).map(|s| s.as_str()) == Some("--json");
                    exit(config_cmd::run_show(json))
                }
                "defaults" => {
                    config_cmd::run_defaults();
                    ExitCode::SUCCESS
                }
                "validate" => exit(config_cmd::run_validate()),
                _ => {
                    eprintln!("Unknown config subcommand: {}", subcommand);
                    print_command_help("config");
                    exit(EXIT_USAGE)
                }
            }
        }
        "help" | "--help" | "-h" => {
            if let Some(subcommand) = args.get(2) {
                print_command_help(subcommand);
            } else {
                print_usage();
            }
            ExitCode::SUCCESS
        }
        "version" | "--version" | "-V" => {
            println!("llama-bridge {}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            exit(EXIT_USAGE)
        }
    }
}

fn exit(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}

fn print_usage() {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!(
        "llama-bridge v{}

USAGE:
    llama-bridge [COMMAND] [ARGS]

COMMANDS:
    infer        Open a model, generate once, close it
    preflight    Check that a model file exists and is readable
    checksum     Print or verify a model's SHA-256
    config       Show, list defaults, or validate configuration
    version      Show version information
    help         Show this help message

ENVIRONMENT:
    LLAMA_BRIDGE_CONFIG      TOML config file
    LLAMA_BRIDGE_N_CTX       Default context size (2048)
    LLAMA_BRIDGE_MAX_TOKENS  Default generation limit (128)
    LLAMA_BRIDGE_LOG_LEVEL   tracing filter (info)
    LLAMA_BRIDGE_LOG_FORMAT  json | pretty

EXIT CODES:
    0  Success
    1  Failure
    2  Usage error
",
        version
    );
}

/// Print detailed help for a specific command.
fn print_command_help(command: &str) {
    match command {
        "infer" => eprintln!(
            "llama-bridge infer - One-shot generation

USAGE:
    llama-bridge infer <model> <prompt> [max_tokens]

DESCRIPTION:
    Opens the model under a fresh handle, generates at most max_tokens
    (0 or omitted: LLAMA_BRIDGE_MAX_TOKENS), then closes the handle.
"
        ),
        "preflight" => eprintln!(
            "llama-bridge preflight - Model file checks

USAGE:
    llama-bridge preflight <model>

DESCRIPTION:
    Fails if the file is missing or unreadable; warns if it is smaller
    than LLAMA_BRIDGE_MIN_MODEL_BYTES.
"
        ),
        "checksum" => eprintln!(
            "llama-bridge checksum - SHA-256 of a model file

USAGE:
    llama-bridge checksum <model> [expected_sha256]
"
        ),
        "config" => eprintln!(
            "llama-bridge config - Configuration

USAGE:
    llama-bridge config show [--json]
    llama-bridge config defaults
    llama-bridge config validate
"
        ),
        _ => print_usage(),
    }
}
