//! dub-fetch CLI
//!
//! Downloads every dubbed language of a video as its own file.

use clap::Parser;
use colored::Colorize;
use dub_fetch::cli::{
    args::{Cli, Commands},
    commands::{
        check,
        fetch::{self, FetchOptions},
        formats, name,
    },
};
use dub_fetch::models::config::{load_config, Config};
use dub_fetch::preflight;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "[ERROR]".bold().red(), e);
        let code = e
            .downcast_ref::<dub_fetch::Error>()
            .map(|e| e.class().exit_code())
            .unwrap_or(1);
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config();

    if cli.command.uses_tool() && !cli.skip_preflight {
        let quiet = matches!(cli.command, Commands::Fetch { json: true, .. });
        run_preflight_checks(&config, quiet)?;
    }

    match cli.command {
        Commands::Fetch {
            item,
            dir,
            video_code,
            audio_code,
            langs,
            alt_video,
            yes,
            json,
        } => {
            let options = FetchOptions {
                item,
                dir,
                video_code,
                audio_code,
                langs,
                alt_video,
                yes,
                json,
            };
            fetch::fetch(options, &config).await?;
        }

        Commands::Formats { item, from_file } => {
            formats::formats(&item, from_file.as_deref(), &config).await?;
        }

        Commands::Check { dir } => {
            check::check(dir.as_deref(), &config).await?;
        }

        Commands::Name { filename } => {
            name::name(&filename).await?;
        }
    }

    Ok(())
}

/// Initialize logging.
fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("dub_fetch=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("dub_fetch=info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Run preflight checks and stop if any fail.
fn run_preflight_checks(config: &Config, quiet: bool) -> anyhow::Result<()> {
    let results = preflight::run_preflight_checks(config);

    if !quiet || !preflight::all_passed(&results) {
        println!("{}", "Running preflight checks...".bold());
        println!();
        preflight::print_results(&results);
        println!();
    }

    if !preflight::all_passed(&results) {
        anyhow::bail!("Preflight checks failed. Fix the issues above and try again.");
    }

    Ok(())
}
