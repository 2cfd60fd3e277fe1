use flowdef::FormatRegistry;
use std::env;
use std::fs;

fn main() {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: cargo run -- <path/to/diagram>");
        std::process::exit(1);
    }

    let diagram_path = &args[1];
    println!("Loading diagram from: {}", diagram_path);

    let source = match fs::read_to_string(diagram_path) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Failed to read diagram file '{}': {}", diagram_path, e);
            std::process::exit(1);
        }
    };

    let registry = FormatRegistry::with_builtin_formats();

    let detection = registry.detect_format(&source);
    println!(
        "Detected format: {} (confidence {:.2})",
        detection.format, detection.confidence
    );

    let document = match registry.parse(&source) {
        Ok(document) => document,
        Err(e) => {
            eprintln!("Parsing failed: {}", e);
            std::process::exit(1);
        }
    };

    for warning in &document.warnings {
        eprintln!("Warning: {}", warning);
    }

    println!(
        "Parsed flow: {} nodes, {} edges, start node '{}'",
        document.flow.node_count(),
        document.flow.edge_count(),
        document.flow.start_node_id
    );

    // Emit the canonical JSON form on stdout.
    match registry.format_as(&document.flow, "json") {
        Some(Ok(json)) => println!("{}", json),
        Some(Err(e)) => {
            eprintln!("Failed to serialize flow: {}", e);
            std::process::exit(1);
        }
        None => unreachable!("json is a builtin format"),
    }
}
