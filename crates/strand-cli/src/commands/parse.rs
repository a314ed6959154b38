//! `strand parse`: parse a file and print its AST, without touching any import.

use crate::cli::ParseArgs;

use super::input::read_bytes;

pub fn run(args: ParseArgs, verbose: bool) {
    let source = read_bytes(&args.file);
    let filename = args.file.display().to_string();

    let options = strand_parser::ParseOptions {
        memoize: args.memoize,
        debug: verbose,
        ..strand_parser::ParseOptions::default()
    };

    match strand_parser::parse(&filename, &source, options) {
        Ok(output) => println!("{:#?}", output.expr),
        Err(diagnostics) => {
            let mut printer = diagnostics.printer().path(&filename);
            if let Ok(text) = std::str::from_utf8(&source) {
                printer = printer.source(text);
            }
            eprint!("{}", printer.render());
            std::process::exit(1);
        }
    }
}
