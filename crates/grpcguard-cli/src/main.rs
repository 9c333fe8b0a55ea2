use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use grpcguard_core::config::{load_config, Config, DEFAULT_CONFIG_TOML};
use grpcguard_core::orchestrator::{analyze_file, AnalysisOutput};
use grpcguard_diagnostics::diagnostic::Severity;
use grpcguard_diagnostics::human::format_human;

#[derive(Parser)]
#[command(name = "grpcguard")]
#[command(about = "Nil-response analyzer for gRPC servers")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze bridge IR for nil-response issues
    Check {
        /// Path to the bridge IR file (JSON)
        input: PathBuf,
        /// Output format: human, json
        #[arg(long, default_value = "human")]
        format: String,
        /// Severity threshold: info, warning, error, critical
        #[arg(long)]
        severity: Option<String>,
        /// Max diagnostics to report (0 = unlimited)
        #[arg(long)]
        max_diagnostics: Option<usize>,
        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },
    /// Explain a rule in detail
    Explain {
        /// Rule code (e.g., RESP001)
        rule: String,
    },
    /// Write a default grpcguard.toml in the current directory
    Init,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Log to stderr so stdout stays clean for machine output
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Check {
            input,
            format,
            severity,
            max_diagnostics,
            no_color,
        } => run_check(&input, &format, severity.as_deref(), max_diagnostics, no_color),
        Commands::Explain { rule } => run_explain(&rule),
        Commands::Init => run_init(),
    }
}

fn run_check(
    input: &PathBuf,
    format: &str,
    severity_override: Option<&str>,
    max_diagnostics: Option<usize>,
    no_color: bool,
) -> ExitCode {
    let mut config: Config = load_config(&std::env::current_dir().unwrap_or_default());
    if let Some(severity) = severity_override {
        if Severity::parse(severity).is_none() {
            eprintln!("unknown severity: {severity}");
            return ExitCode::from(2);
        }
        config.grpcguard.severity_threshold = severity.to_string();
    }
    if let Some(cap) = max_diagnostics {
        config.grpcguard.max_diagnostics = cap;
    }

    let output = match analyze_file(input, &config) {
        Ok(output) => output,
        Err(err) => {
            eprintln!("grpcguard: {err}");
            return ExitCode::from(2);
        }
    };

    match format {
        "json" => match serde_json::to_string_pretty(&output.diagnostics) {
            Ok(json) => println!("{json}"),
            Err(err) => {
                eprintln!("grpcguard: failed to serialize diagnostics: {err}");
                return ExitCode::from(2);
            }
        },
        _ => print!("{}", format_human(&output.diagnostics, !no_color)),
    }

    exit_code_for(&output, &config)
}

fn exit_code_for(output: &AnalysisOutput, config: &Config) -> ExitCode {
    let threshold =
        Severity::parse(&config.grpcguard.severity_threshold).unwrap_or(Severity::Warning);
    if output.summary.has_issues_above(threshold) {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}

fn run_explain(rule: &str) -> ExitCode {
    let text = match rule {
        "RESP001" => {
            "RESP001: potential nil field in gRPC response\n\n\
             A value that is not provably non-nil is assigned to a non-optional\n\
             message-pointer field of a response. Clients deserializing the\n\
             response will observe a missing required sub-message.\n\n\
             Fix: assign a freshly constructed sub-message, or make the field\n\
             optional (oneof) if absence is a legal state.\n"
        }
        "RESP002" => {
            "RESP002: potential nil element in gRPC response slice\n\n\
             A maybe-nil value is stored into an element of a repeated message\n\
             field. Nil elements serialize as empty messages or fail downstream\n\
             consumers that index the list.\n\n\
             Fix: filter nil values before appending, or construct elements\n\
             unconditionally.\n"
        }
        "RESP003" => {
            "RESP003: implicit nil field in gRPC response\n\n\
             A freshly allocated response is returned without ever assigning a\n\
             non-optional message-pointer field, so the field is nil by\n\
             construction.\n\n\
             Fix: populate every required sub-message before returning.\n"
        }
        _ => {
            eprintln!("unknown rule: {rule}");
            return ExitCode::from(2);
        }
    };
    print!("{text}");
    ExitCode::SUCCESS
}

fn run_init() -> ExitCode {
    let path = PathBuf::from("grpcguard.toml");
    if path.exists() {
        eprintln!("grpcguard.toml already exists");
        return ExitCode::from(2);
    }
    match std::fs::write(&path, DEFAULT_CONFIG_TOML) {
        Ok(()) => {
            println!("wrote grpcguard.toml");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("grpcguard: failed to write grpcguard.toml: {err}");
            ExitCode::from(2)
        }
    }
}
