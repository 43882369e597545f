use std::path::PathBuf;

use clap::Parser;

/// Register a ride taken outside the platform.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "ride_wizard_cli")]
pub struct CliArgs {
    /// Driver the ride belongs to. Defaults to the last one used.
    #[arg(long, value_name = "ID")]
    pub driver: Option<String>,

    /// Vehicle used for the ride. Defaults to the last one used.
    #[arg(long, value_name = "ID")]
    pub vehicle: Option<String>,

    /// Text recognized from a receipt screenshot, used to prefill the form.
    #[arg(long, value_name = "FILE")]
    pub prefill: Option<PathBuf>,

    /// Receipt text files to register in one go instead of walking the
    /// wizard. Values the receipts lack are asked once for the whole batch.
    #[arg(long = "import", value_name = "FILE", num_args = 1.., conflicts_with = "prefill")]
    pub import: Vec<PathBuf>,

    /// Directory holding the config and the stored rides.
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Print build information and exit.
    #[arg(long)]
    pub version: bool,
}
