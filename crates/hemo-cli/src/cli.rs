use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "hemo",
    about = "Hemolink — donor matching, inventory, and a tamper-evident donation ledger",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a TOML bank configuration file.
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the full donation scenario: request, match, notify, commit, verify
    Demo(DemoArgs),
    /// Mine a chain of donation blocks, optionally tamper with one, and verify
    Verify(VerifyArgs),
}

#[derive(Args)]
pub struct DemoArgs {
    /// How many donors to register around the request site.
    #[arg(long, default_value = "4")]
    pub donors: usize,
    /// Units the demo request asks for.
    #[arg(long, default_value = "2")]
    pub units: u32,
}

#[derive(Args)]
pub struct VerifyArgs {
    /// How many donation blocks to mine.
    #[arg(short = 'n', long, default_value = "5")]
    pub blocks: u32,
    /// Tamper with the payload at this block index before verifying.
    #[arg(long)]
    pub tamper: Option<u64>,
}
