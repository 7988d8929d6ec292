use clap::Parser;
use jma_processor::cli::{run, Cli};
use jma_processor::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli).await
}
