use std::path::PathBuf;

use clap::Parser;

use cfgnorm::{error_handling, generator, parser};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Maximum length of the generated words
    pub length: usize,

    /// File containing the grammar
    pub file: PathBuf,
}

fn main() {
    let args = Cli::parse();

    let grammar_res = parser::parse_file(&args.file);
    if let Err(errors) = grammar_res {
        error_handling::report(&errors);
        std::process::exit(1);
    }
    let grammar = grammar_res.unwrap();

    let words = generator::words(&grammar, args.length);
    if words.is_empty() {
        eprintln!("No words of length at most {} are derivable", args.length);
    }
    for word in words {
        println!("{}", word);
    }
}
