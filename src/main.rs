use csv::{ReaderBuilder, Trim};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod split;

/// The size of the channel for feeding entries to the roster.
const CHANNEL_SIZE: usize = 100;

/// One line of the settlement report.
#[derive(Serialize)]
struct ReportRow<'a> {
    group: &'a str,
    from: &'a str,
    to: &'a str,
    amount: String,
}

/// Builds the usage line, falling back to the crate name when argv is empty.
fn usage(args: &[String]) -> String {
    let program = args.first().map_or("fairsplit", String::as_str);
    format!("Usage: {program} <input_csv_file> [decimals]")
}

#[tokio::main]
async fn main() {
    // Logs go to stderr so stdout stays a clean CSV report.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = std::env::args().collect::<Vec<_>>();
    if args.len() < 2 || args.len() > 3 {
        eprintln!("{}", usage(&args));
        std::process::exit(1);
    }
    let input_file = &args[1];
    let config = match args.get(2).map(|raw| raw.trim().parse::<f64>()) {
        None => split::SplitConfig::default(),
        Some(Ok(decimals)) => split::SplitConfig::new(decimals),
        Some(Err(err)) => {
            eprintln!("Invalid decimals {:?}: {err}", args[2]);
            std::process::exit(1);
        }
    };
    info!(
        input = %input_file,
        decimal_places = config.get_decimal_places(),
        "Splitting expenses"
    );

    let mut reader = match ReaderBuilder::new().trim(Trim::All).from_path(input_file) {
        Ok(reader) => reader,
        Err(err) => {
            error!("Failed to read CSV file {input_file}: {err}");
            std::process::exit(1);
        }
    };

    let (sender, receiver) = mpsc::channel(CHANNEL_SIZE);
    let mut roster = split::Roster::new(receiver);

    let handle = tokio::spawn(async move {
        roster.run().await;
        roster
    });

    for entry in reader.deserialize::<split::Entry>() {
        match entry {
            Ok(entry) => {
                if let Err(err) = sender.send(entry).await {
                    error!("Error sending entry: {err}");
                }
            }
            Err(err) => warn!("Skipping malformed row: {err}"),
        }
    }

    drop(sender); // Close the sender to signal no more entries will be sent
    let roster = match handle.await {
        Ok(roster) => roster,
        Err(err) => {
            error!("Failed to join the roster task: {err}");
            std::process::exit(1);
        }
    };

    let mut failed = false;
    let mut writer = csv::Writer::from_writer(std::io::stdout());
    for (group, outcome) in roster.settle_all(&config) {
        let result = match outcome {
            Ok(result) => result,
            Err(err) => {
                error!(group, "Invalid input: {err}");
                failed = true;
                continue;
            }
        };
        info!(
            group,
            total = result.get_total_amount(),
            total_units = result.get_total_units(),
            average = result.get_average_amount(),
            transfers = result.get_settlements().len(),
            "Settled group"
        );
        for settlement in result.get_settlements() {
            debug!(
                group,
                from = settlement.get_from(),
                to = settlement.get_to(),
                amount = settlement.get_amount(),
                "Transfer"
            );
            let row = ReportRow {
                group,
                from: settlement.get_from(),
                to: settlement.get_to(),
                amount: config.format_units(settlement.get_amount_units()),
            };
            if let Err(err) = writer.serialize(row) {
                error!("Error writing settlement: {err}");
            }
        }
    }
    if let Err(err) = writer.flush() {
        error!("Error flushing output: {err}");
    }

    if failed {
        std::process::exit(2);
    }
}
