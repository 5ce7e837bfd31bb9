//! Command-line interface for the vrml importer
//!
//! Usage:
//!   vrml execute `<path>` [--format `<format>`] [--config `<file>`]  - Parse and print a document
//!   vrml check `<path>`                                            - Parse only; report the first error
//!   vrml list-formats                                              - List available output formats
//!
//! Logging goes to stderr and is controlled with `RUST_LOG` (default `vrml_import=warn`).

use clap::{Arg, ArgMatches, Command};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use vrml_import::vrml::ast::format_source_context;
use vrml_import::vrml::config::{Loader, VrmlConfig};
use vrml_import::vrml::processor::{
    available_formats, parse_file, process_file, ProcessingError, ProcessingSpec,
};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("vrml_import=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let matches = Command::new("vrml")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A tool for inspecting VRML97-style scene descriptions")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .help("Configuration file layered over the built-in defaults"),
        )
        .subcommand(
            Command::new("execute")
                .about("Parse a document and print it in the requested format")
                .arg(
                    Arg::new("path")
                        .help("Path to the scene file")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .help("Output format (e.g. 'scene-treeviz', 'token-json')"),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Parse a document and report the first error, if any")
                .arg(
                    Arg::new("path")
                        .help("Path to the scene file")
                        .required(true)
                        .index(1),
                ),
        )
        .subcommand(Command::new("list-formats").about("List available output formats"))
        .get_matches();

    let config = match load_config(&matches) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match matches.subcommand() {
        Some(("execute", execute_matches)) => {
            let path = required(execute_matches, "path");
            let format = execute_matches
                .get_one::<String>("format")
                .cloned()
                .unwrap_or_else(|| config.output.default_format.clone());
            handle_execute_command(path, &format, &config)
        }
        Some(("check", check_matches)) => {
            handle_check_command(required(check_matches, "path"), &config)
        }
        Some(("list-formats", _)) => {
            handle_list_formats_command();
            ExitCode::SUCCESS
        }
        _ => ExitCode::FAILURE,
    }
}

fn required<'a>(matches: &'a ArgMatches, id: &str) -> &'a str {
    matches
        .get_one::<String>(id)
        .map(String::as_str)
        .unwrap_or_default()
}

fn load_config(matches: &ArgMatches) -> Result<VrmlConfig, config::ConfigError> {
    let loader = Loader::new();
    let loader = match matches.get_one::<String>("config") {
        Some(path) => loader.with_file(path),
        None => loader,
    };
    loader.build()
}

/// Handle the execute command
fn handle_execute_command(path: &str, format: &str, config: &VrmlConfig) -> ExitCode {
    let spec = match ProcessingSpec::from_string(format) {
        Ok(spec) => spec,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Available formats: {}", available_formats().join(", "));
            return ExitCode::FAILURE;
        }
    };

    match process_file(path, &spec, config) {
        Ok(output) => {
            print!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            report(path, &e);
            ExitCode::FAILURE
        }
    }
}

/// Handle the check command
fn handle_check_command(path: &str, config: &VrmlConfig) -> ExitCode {
    match parse_file(path, config) {
        Ok(scene) => {
            println!("{}: ok ({} nodes)", path, scene.node_count() - 1);
            ExitCode::SUCCESS
        }
        Err(e) => {
            report(path, &e);
            ExitCode::FAILURE
        }
    }
}

/// Handle the list-formats command
fn handle_list_formats_command() {
    println!("Available formats:\n");
    for format in available_formats() {
        println!("  {}", format);
    }
}

fn report(path: &str, error: &ProcessingError) {
    eprintln!("{}: {}", path, error);
    if let ProcessingError::Parse(parse) = error {
        if let Ok(source) = std::fs::read_to_string(path) {
            eprint!("{}", format_source_context(&source, parse.position));
        }
    }
}
