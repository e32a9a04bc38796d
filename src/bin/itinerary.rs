use std::{io, path::PathBuf};

use anyhow::{bail, Context as _};
use clap::Parser;
use itinerary::{load_lookup, process_files, Columns, Mode, Options};
use tracing::Level;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Prettify itineraries: replace airport codes and ISO-8601 timestamps with readable text",
    after_help = "EXAMPLE: itinerary ./input.txt ./output.txt ./airport-lookup.csv"
)]
struct Args {
    /// Itinerary to read
    #[arg(value_name = "INPUT", required_unless_present = "dump_lookup")]
    input: Option<PathBuf>,
    /// Where the prettified itinerary is written
    #[arg(value_name = "OUTPUT", required_unless_present = "dump_lookup")]
    output: Option<PathBuf>,
    /// Airport lookup CSV (name,iso_country,municipality,icao_code,iata_code,coordinates)
    #[arg(value_name = "LOOKUP", required_unless_present = "dump_lookup")]
    lookup: Option<PathBuf>,
    /// Enable bonus mode: *#/*## city tokens, whitespace squeezing, echo result
    #[arg(short, long)]
    bonus: bool,
    /// Lookup column indices as NAME,CITY,IATA,ICAO
    #[arg(long, value_name = "NAME,CITY,IATA,ICAO", default_value_t = Columns::default())]
    columns: Columns,
    /// Print the given airport lookup as JSON instead of processing an itinerary
    #[arg(long, value_name = "LOOKUP", conflicts_with_all = ["input", "output", "lookup"])]
    dump_lookup: Option<PathBuf>,
    /// Increase log verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(level)
        .init();

    if let Some(path) = &args.dump_lookup {
        let table = load_lookup(path, args.columns).context("failed to load airport lookup")?;
        println!("{}", serde_json::to_string(&table)?);
        return Ok(());
    }

    let (Some(input), Some(output), Some(lookup)) = (&args.input, &args.output, &args.lookup)
    else {
        bail!("expected INPUT, OUTPUT and LOOKUP paths");
    };

    let options = Options {
        mode: if args.bonus {
            Mode::Extended
        } else {
            Mode::Standard
        },
        columns: args.columns,
    };

    let rendered = process_files(input, output, lookup, &options)
        .context("failed to process itinerary")?;

    if options.mode == Mode::Extended {
        println!("{rendered}");
    }
    println!("Itinerary processed successfully.");

    Ok(())
}
