use clap::{Parser, Subcommand, ValueEnum};
use flowdef::prelude::*;
use std::fs;

/// A multi-format flowchart parsing and conversion CLI
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Detect which diagram format a file is written in
    Detect {
        /// Path to the diagram file
        path: String,
    },
    /// Parse a diagram and re-serialize it in another format
    Convert {
        /// Path to the diagram file
        path: String,
        /// Output format
        #[arg(short, long, value_enum)]
        to: TargetFormat,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Validate a diagram file, printing errors and warnings
    Validate {
        /// Path to the diagram file
        path: String,
    },
    /// Parse a diagram and print structural information
    Inspect {
        /// Path to the diagram file
        path: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TargetFormat {
    Json,
    Dot,
    Mermaid,
    Plantuml,
}

impl TargetFormat {
    fn id(self) -> &'static str {
        match self {
            TargetFormat::Json => "json",
            TargetFormat::Dot => "dot",
            TargetFormat::Mermaid => "mermaid",
            TargetFormat::Plantuml => "plantuml",
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let registry = FormatRegistry::with_builtin_formats();

    match cli.command {
        Command::Detect { path } => {
            let source = read_source(&path);
            let detection = registry.detect_format(&source);
            if detection.is_unknown() {
                println!("No registered format matched '{}'", path);
                std::process::exit(1);
            }
            println!(
                "{} (confidence {:.2})",
                detection.format, detection.confidence
            );
        }

        Command::Convert { path, to, output } => {
            let source = read_source(&path);
            let document = registry
                .parse(&source)
                .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse '{}': {}", path, e)));
            print_warnings(&document.warnings);

            let rendered = match registry.format_as(&document.flow, to.id()) {
                Some(Ok(text)) => text,
                Some(Err(e)) => exit_with_error(&format!("Failed to serialize flow: {}", e)),
                None => exit_with_error(&format!("Format '{}' is not registered", to.id())),
            };

            match output {
                Some(out_path) => {
                    fs::write(&out_path, rendered).unwrap_or_else(|e| {
                        exit_with_error(&format!("Could not write '{}': {}", out_path, e))
                    });
                    println!("Wrote {} to '{}'", to.id(), out_path);
                }
                None => print!("{}", rendered),
            }
        }

        Command::Validate { path } => {
            let source = read_source(&path);
            let report = registry.validate(&source);
            print_warnings(&report.warnings);
            if report.is_valid {
                println!("'{}' is valid", path);
            } else {
                for error in &report.errors {
                    eprintln!("Error: {}", error);
                }
                std::process::exit(1);
            }
        }

        Command::Inspect { path } => {
            let source = read_source(&path);
            let document = registry
                .parse(&source)
                .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse '{}': {}", path, e)));
            print_warnings(&document.warnings);

            let flow = &document.flow;
            println!("Format:     {}", document.format);
            println!("Title:      {}", flow.title);
            println!("Nodes:      {}", flow.node_count());
            println!("Edges:      {}", flow.edge_count());
            println!("Start node: {}", flow.start_node_id);
            let terminals = flow.terminal_nodes();
            println!(
                "Terminals:  {}",
                terminals
                    .iter()
                    .map(|n| n.id.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
    }
}

fn read_source(path: &str) -> String {
    fs::read_to_string(path)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to read file '{}': {}", path, e)))
}

fn print_warnings(warnings: &[String]) {
    for warning in warnings {
        eprintln!("Warning: {}", warning);
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
