//! # Reelprint CLI
//!
//! Command-line interface for roll labels and packing slips.
//!
//! ## Usage
//!
//! ```bash
//! # Normalise a scanned code
//! reelprint parse "cr_08001" --year 25
//!
//! # Render a label from a roll record
//! reelprint label roll.json -o label.pdf
//!
//! # Render a packing slip from a dispatch record
//! reelprint --config mill.json slip dispatch.json
//!
//! # Save a barcode as PNG
//! reelprint barcode CR_08001-25 --png code.png
//!
//! # Run the print service
//! reelprint serve --listen 0.0.0.0:8080
//! ```

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use reelprint::{
    ReelprintConfig, ReelprintError,
    assets::HttpFileLoader,
    barcode::render_barcode_with,
    document::{Document, generate_label, generate_packing_slip},
    logging,
    model::{ScanResult, Shipment},
    scan::{parse_qr_code_data, with_year_suffix},
    server,
};

/// Reelprint - paper roll labels and packing slips
#[derive(Parser, Debug)]
#[command(name = "reelprint")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Normalise and validate a scanned code
    Parse {
        /// Raw scanner output
        input: String,

        /// Two-digit year to append when the code has none
        #[arg(long)]
        year: Option<String>,
    },

    /// Render a roll label PDF
    Label {
        /// Roll record (ScanResult JSON)
        roll: PathBuf,

        /// Output file (defaults to label_{reel}.pdf)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Render a packing slip PDF
    Slip {
        /// Dispatch record (Shipment JSON)
        shipment: PathBuf,

        /// Output file (defaults to packing_slip_{dispatch}_{date}.pdf)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Render a Code128 barcode to PNG
    Barcode {
        /// Value to encode
        value: String,

        /// Output PNG file
        #[arg(long, value_name = "FILE")]
        png: PathBuf,
    },

    /// Run the HTTP print service
    Serve {
        /// Address to listen on (overrides the config file)
        #[arg(long)]
        listen: Option<String>,
    },
}

fn main() {
    logging::init();
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), ReelprintError> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => ReelprintConfig::load(path)?,
        None => ReelprintConfig::default(),
    };

    match cli.command {
        Commands::Parse { input, year } => {
            let mut scan = parse_qr_code_data(&input);
            if scan.is_valid
                && let Some(year) = &year
            {
                scan.code = with_year_suffix(&scan.code, year);
            }
            println!("{}", serde_json::to_string_pretty(&scan)?);
            if !scan.is_valid {
                return Err(ReelprintError::InvalidInput(format!("not a valid code: {:?}", input)));
            }
            Ok(())
        }
        Commands::Label { roll, output } => {
            let roll: ScanResult = read_json(&roll)?;
            let document = runtime()?.block_on(async {
                let loader = HttpFileLoader::new()?;
                generate_label(&loader, &roll, &config, today()).await
            })?;
            write_document(&document, output)
        }
        Commands::Slip { shipment, output } => {
            let shipment: Shipment = read_json(&shipment)?;
            let document = runtime()?.block_on(async {
                let loader = HttpFileLoader::new()?;
                generate_packing_slip(&loader, &shipment, &config, today()).await
            })?;
            write_document(&document, output)
        }
        Commands::Barcode { value, png } => {
            let style = config.label.barcode_style();
            let raster = render_barcode_with(&value, &style, &reelprint::barcode::Code128Encoder);
            if raster.fallback {
                tracing::warn!(value = %value, "value cannot be encoded, wrote a text placeholder");
            }
            let bytes = raster
                .to_png()
                .map_err(|e| ReelprintError::Generation(format!("PNG encode failed: {}", e)))?;
            std::fs::write(&png, bytes)?;
            println!("Saved {}x{} barcode to {}", raster.width(), raster.height(), png.display());
            Ok(())
        }
        Commands::Serve { listen } => {
            let mut config = config;
            if let Some(listen) = listen {
                config.server.listen_addr = listen;
            }
            runtime()?.block_on(server::serve(config))
        }
    }
}

fn runtime() -> Result<tokio::runtime::Runtime, ReelprintError> {
    tokio::runtime::Runtime::new().map_err(ReelprintError::Io)
}

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ReelprintError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| ReelprintError::InvalidInput(format!("{}: {}", path.display(), e)))?;
    Ok(serde_json::from_str(&text)?)
}

fn write_document(document: &Document, output: Option<PathBuf>) -> Result<(), ReelprintError> {
    let path = output.unwrap_or_else(|| PathBuf::from(&document.filename));
    std::fs::write(&path, &document.bytes)?;
    println!(
        "Saved {} ({} page{}) to {}",
        document.filename,
        document.page_count,
        if document.page_count == 1 { "" } else { "s" },
        path.display()
    );
    Ok(())
}
