use std::io::Read;

use anyhow::{Context, Result};
use clap::Parser;

use entry_formatter::decoders::omim;
use entry_formatter::record::Record;
use entry_formatter::record_parser::flat_record_parser;
use entry_formatter::utils::files::open_sin;
use entry_formatter::Dialect;

fn main() -> Result<()> {
    let args = Cli::parse();

    match args.db_type {
        SourceDb::Uniprot => stream_records(Dialect::Uniprot, args.threads),
        SourceDb::Embl => stream_records(Dialect::Embl, args.threads),
        SourceDb::Omim => write_omim_sections(),
    }
}

/// Parse a record stream from stdin and write one summary row per record
fn stream_records(dialect: Dialect, threads: usize) -> Result<()> {
    write_header();

    let parser = flat_record_parser(open_sin(), dialect, threads);
    for entry in parser {
        let record = entry.context("Error reading record from input stream")?;
        write_entry(&record);
    }

    Ok(())
}

fn write_header() {
    let fields: [&str; 6] = [
        "Entry",
        "Accession",
        "Protein names",
        "Length",
        "Features",
        "Segments",
    ];
    println!("{}", fields.join("\t"));
}

fn write_entry(record: &Record) {
    if record.entry.primary_accession.is_empty() {
        eprintln!("Could not find an accession for entry {}", record.entry.entry_name);
    }

    println!(
        "{}\t{}\t{}\t{}\t{}\t{}",
        record.entry.entry_name,
        record.entry.primary_accession,
        record.description.display_name(),
        record.sequence.chars().count(),
        record.features.len(),
        record.segmentation.segments.len(),
    )
}

/// OMIM records are not tag-line streams; format the sections of a single
/// record read from stdin
fn write_omim_sections() -> Result<()> {
    let mut text = String::new();
    open_sin()
        .read_to_string(&mut text)
        .context("Error reading OMIM record from stdin")?;

    for section in omim::parse(&text).sections {
        println!("{}", section.label);
        println!("{}", section.text.trim_end());
        println!();
    }

    Ok(())
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum SourceDb {
    Uniprot,
    Embl,
    Omim,
}

#[derive(Parser, Debug)]
struct Cli {
    #[clap(value_enum, short = 't', long, default_value = "uniprot")]
    db_type: SourceDb,
    #[clap(long, default_value_t = 0)]
    threads: usize,
}
