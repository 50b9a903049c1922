//! Family Tree CLI
//!
//! Usage:
//!   family-tree [OPTIONS] [FILE]
//!
//! Options:
//!   -s, --stylesheet <FILE>  Stylesheet file for color palette (TOML format)
//!   -d, --debug              Log every pipeline stage and the computed grid
//!       --dump               Print the plain-text layout instead of SVG
//!       --lint               Report layout defects on stderr
//!   -h, --help               Print help

use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use family_tree_layout::{
    layout_document, render_with_lint, RenderConfig, RenderError, Stylesheet,
};

#[derive(Parser)]
#[command(name = "family-tree")]
#[command(about = "Lay out a family tree document and render it as SVG")]
struct Cli {
    /// Input file (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Stylesheet file for color palette (TOML format)
    #[arg(short, long)]
    stylesheet: Option<PathBuf>,

    /// Debug mode: log pipeline stages and the computed grid
    #[arg(short, long)]
    debug: bool,

    /// Print the plain-text layout dump instead of SVG
    #[arg(long)]
    dump: bool,

    /// Report layout defects on stderr
    #[arg(long)]
    lint: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug);

    // If no input file and stdin is a terminal (interactive), show intro help
    if cli.input.is_none() && io::stdin().is_terminal() {
        print_intro();
        return;
    }

    let stylesheet = match &cli.stylesheet {
        Some(path) => match Stylesheet::from_file(path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Error loading stylesheet '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => Stylesheet::default(),
    };

    let (source, filename) = match &cli.input {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => (content, path.display().to_string()),
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => (buffer, "<stdin>".to_string()),
                Err(e) => {
                    eprintln!("Error reading from stdin: {}", e);
                    std::process::exit(1);
                }
            }
        }
    };

    let config = RenderConfig::new()
        .with_stylesheet(stylesheet)
        .with_debug(cli.debug);

    if cli.dump {
        match layout_document(&source, &config.layout) {
            Ok(laid_out) => println!("{}", laid_out.layout.describe()),
            Err(e) => fail(e, &source, &filename),
        }
        return;
    }

    match render_with_lint(&source, config) {
        Ok((svg, warnings)) => {
            if cli.lint {
                for warning in &warnings {
                    eprintln!("warning[{}]: {}", warning.category, warning.message);
                }
            }
            println!("{}", svg);
        }
        Err(e) => fail(e, &source, &filename),
    }
}

fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn fail(error: RenderError, source: &str, filename: &str) -> ! {
    match &error {
        RenderError::Parse(e) => eprint!("{}", e.format(source, filename)),
        RenderError::Validation(_) => eprintln!("Error: {}", error),
    }
    std::process::exit(1);
}

fn print_intro() {
    println!(
        r#"Family Tree - lay out a family tree and render it as SVG

USAGE:
    family-tree [OPTIONS] [FILE]
    cat family.toml | family-tree

OPTIONS:
    -s, --stylesheet   Custom color palette (TOML file)
    -d, --debug        Log pipeline stages and the computed grid
    --dump             Print the plain-text layout instead of SVG
    --lint             Report layout defects on stderr
    -h, --help         Print help

DOCUMENT:
    [[person]]
    id = "me"
    name = "Alice"
    relation = "self"

    [[person]]
    id = "kid"
    father = "me"
    age = 12

    [[partnership]]
    a = "me"
    b = "dan"
    kind = "current-spouse"   # former-spouse | partner"#
    );
}
