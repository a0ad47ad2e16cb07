use anyhow::Result;
use clap::Parser;

use citegraph::cli::{Cli, Commands};
use citegraph::commands::{
    run_enrich, run_export, run_generate, run_import_corpus, run_reset, run_stats, run_strip,
};

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Commands::ImportCorpus(args) => {
            run_import_corpus(args)?;
        }
        Commands::Generate(args) => {
            run_generate(args)?;
        }
        Commands::Enrich(args) => {
            run_enrich(args)?;
        }
        Commands::Strip(args) => {
            run_strip(args)?;
        }
        Commands::Stats(args) => {
            run_stats(args)?;
        }
        Commands::Reset(args) => {
            run_reset(args)?;
        }
        Commands::Export(args) => {
            run_export(args)?;
        }
    }

    Ok(())
}
