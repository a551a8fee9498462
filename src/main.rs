use clap::{error::ErrorKind, Parser};
use tracing_subscriber::EnvFilter;
use xchess::{Cli, Shell};

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,

        // Edge case: `--help` and `--version` are both "error" cases according to Clap
        Err(e)
            if matches!(e.kind(), ErrorKind::DisplayHelp)
                || matches!(e.kind(), ErrorKind::DisplayVersion) =>
        {
            println!("{e}");
            return;
        }

        Err(e) => e.exit(),
    };

    // Logs go to stderr so stdout only carries command output
    let filter = match &cli.log {
        Some(filter) => EnvFilter::new(filter),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(&cli) {
        eprintln!("{} encountered an error: {e:#}", env!("CARGO_PKG_NAME"));
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let game = cli.game()?;
    Shell::new(game).run()
}
