use std::path::{Path, PathBuf};

use clap::Parser;

use cfgnorm::grammar::Grammar;
use cfgnorm::transform::{chomsky, greibach, Limits};
use cfgnorm::{error_handling, parser, writer};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// File containing the grammar (extension `.general`)
    pub file: PathBuf,
}

fn write_result(input: &Path, extension: &str, grammar: &Grammar) {
    let path = input.with_extension(extension);
    if let Err(error) = std::fs::write(&path, writer::write_grammar(grammar)) {
        eprintln!("Could not write `{}`: {}", path.display(), error);
        std::process::exit(1);
    }
}

fn main() {
    let args = Cli::parse();

    if args.file.extension().and_then(|e| e.to_str()) != Some("general") {
        eprintln!("`{}` does not have the `.general` extension", args.file.display());
        std::process::exit(1);
    }

    let grammar_res = parser::parse_file(&args.file);
    if let Err(errors) = grammar_res {
        error_handling::report(&errors);
        std::process::exit(1);
    }
    let grammar = grammar_res.unwrap();

    let limits = Limits::default();
    let chomsky = chomsky::convert(&grammar, &limits).unwrap_or_else(|error| {
        eprintln!("{}", error);
        std::process::exit(1);
    });
    let greibach = greibach::convert(&grammar, &limits).unwrap_or_else(|error| {
        eprintln!("{}", error);
        std::process::exit(1);
    });

    write_result(&args.file, "chomsky", &chomsky);
    write_result(&args.file, "greibach", &greibach);
}
