use anyhow::{Context, Result};
use clap::Parser;

use entry_formatter::record_parser::flat_record_parser;
use entry_formatter::utils::files::open_sin;
use entry_formatter::Dialect;

/// Print the FASTA projection of every record in a stream
fn main() -> Result<()> {
    let args = Cli::parse();

    let parser = flat_record_parser(open_sin(), args.db_type, args.threads);
    for entry in parser {
        let record = entry.context("Error reading record from input stream")?;
        print!("{}", record.fasta());
    }

    Ok(())
}

#[derive(Parser, Debug)]
struct Cli {
    #[clap(value_enum, short = 't', long, default_value = "uniprot")]
    db_type: Dialect,
    // One thread keeps the output in input order.
    #[clap(long, default_value_t = 1)]
    threads: usize,
}
