use clap::Parser;

use citycanopy::cli::{self, Cli};
use citycanopy::init_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    cli::run(cli).await
}
