use crate::report::{run_analyze, run_compare, AnalyzeArgs, CompareArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use eco_intellect::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "EcoIntellect",
    about = "Estimate delivery carbon footprints and serve the EcoIntellect API",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Analyze a single order and print its footprint, alternatives and projection
    Analyze(AnalyzeArgs),
    /// Print every transport and packaging combination for a distance
    Compare(CompareArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Analyze(args) => run_analyze(args).await,
        Command::Compare(args) => run_compare(args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use eco_intellect::footprint::TransportMode;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn serve_is_the_default() {
        let cli = Cli::try_parse_from(["eco-intellect-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn analyze_accepts_named_modes() {
        let cli = Cli::try_parse_from([
            "eco-intellect-api",
            "analyze",
            "--distance-km",
            "4.5",
            "--transport",
            "electric_vehicle",
            "--packaging",
            "paper",
            "--order-value",
            "220",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Analyze(args)) => {
                assert_eq!(args.transport, TransportMode::ElectricVehicle);
                assert_eq!(args.frequency, 1);
                assert!(args.user.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn analyze_rejects_unknown_packaging() {
        let result = Cli::try_parse_from([
            "eco-intellect-api",
            "analyze",
            "--distance-km",
            "2",
            "--transport",
            "car",
            "--packaging",
            "styrofoam",
            "--order-value",
            "90",
        ]);
        assert!(result.is_err());
    }
}
