//! `strand resolve`: parse a file and fetch every import it contains.

use std::time::Duration;

use crate::cli::ResolveArgs;

use super::input::{read_bytes, root_fetchable};

pub fn run(args: ResolveArgs, verbose: bool) {
    let source = read_bytes(&args.file);
    let filename = args.file.display().to_string();

    let parse_options = strand_parser::ParseOptions {
        memoize: args.memoize,
        debug: verbose,
        ..strand_parser::ParseOptions::default()
    };

    let parsed = match strand_parser::parse(&filename, &source, parse_options) {
        Ok(output) => output.expr,
        Err(diagnostics) => {
            let mut printer = diagnostics.printer().path(&filename);
            if let Ok(text) = std::str::from_utf8(&source) {
                printer = printer.source(text);
            }
            eprint!("{}", printer.render());
            std::process::exit(1);
        }
    };

    let options = strand_resolve::ResolveOptions {
        max_depth: args.max_depth,
        fetch_timeout: Duration::from_secs(args.fetch_timeout),
        root: Some(root_fetchable(&args.file)),
        ..strand_resolve::ResolveOptions::default()
    };

    match strand_resolve::resolve(parsed, options) {
        Ok(resolved) => println!("{:#?}", resolved),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}
