// Harpy: Harbour source parser and pretty-printer

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser as ClapParser;

use harpy::render::Render;
use harpy::{Lexer, Parser};

#[derive(ClapParser)]
#[command(name = "harpy")]
#[command(version)]
#[command(about = "Harpy: parse Harbour source and print it back", long_about = None)]
struct Cli {
    /// Source file (.prg or .ch)
    input: PathBuf,

    /// Destination file [default: INPUT with a .fmt extension, .json with --ast]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Dump the syntax tree as JSON instead of source text
    #[arg(long)]
    ast: bool,

    /// Print to stdout instead of writing a file
    #[arg(long)]
    stdout: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if !cli.input.exists() {
        eprintln!("Error: File '{}' not found", cli.input.display());
        std::process::exit(1);
    }
    if !has_source_extension(&cli.input) {
        eprintln!(
            "Error: '{}' is not a .prg or .ch file",
            cli.input.display()
        );
        std::process::exit(1);
    }

    let source = fs::read_to_string(&cli.input)?;

    eprintln!("Parsing {}...", cli.input.display());
    let mut parser = Parser::new(Lexer::new(&source));
    let root = match parser.parse() {
        Ok(root) => root,
        Err(e) => {
            eprintln!("Parse error: {}", e);
            std::process::exit(1);
        }
    };

    eprintln!(
        "Parsed successfully. Found {} top-level nodes.",
        root.nodes.len()
    );

    let text = if cli.ast {
        serde_json::to_string_pretty(&root)?
    } else {
        root.render()
    };

    if cli.stdout {
        print!("{}", text);
        return Ok(());
    }

    let destination = cli
        .output
        .unwrap_or_else(|| cli.input.with_extension(if cli.ast { "json" } else { "fmt" }));
    fs::write(&destination, text)?;
    eprintln!("Wrote {}", destination.display());

    Ok(())
}

fn has_source_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("prg") || ext.eq_ignore_ascii_case("ch"))
}
