use crate::demo::{run_analyze, run_demo, run_quick, AnalyzeArgs, DemoArgs, QuickArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use rehab_offer::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Rehab Offer Estimator",
    about = "Estimate rehab costs and acquisition offers from the command line or over HTTP",
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
    /// Print a quick rehab estimate and offers for manually entered attributes
    Quick(QuickArgs),
    /// Look up an address with the property data provider and print the analysis
    Analyze(AnalyzeArgs),
    /// Walk through a worked quick and detailed analysis offline
    Demo(DemoArgs),
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
        Command::Quick(args) => run_quick(args),
        Command::Analyze(args) => run_analyze(args).await,
        Command::Demo(args) => run_demo(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rehab_offer::estimation::RehabLevel;

    #[test]
    fn no_subcommand_defaults_to_serve() {
        let cli = Cli::try_parse_from(["rehab-offer-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn quick_accepts_formatted_amounts_and_level_aliases() {
        let cli = Cli::try_parse_from([
            "rehab-offer-api",
            "quick",
            "--sqft",
            "2817",
            "--baths",
            "3",
            "--year-built",
            "1979",
            "--arv",
            "$675,000",
            "--level",
            "medium",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Quick(args)) => {
                assert_eq!(args.arv, Some(675_000.0));
                assert_eq!(args.level, RehabLevel::Mid);
                assert_eq!(args.year_built, Some(1979));
            }
            other => panic!("expected quick command, got {other:?}"),
        }
    }

    #[test]
    fn analyze_requires_address() {
        assert!(Cli::try_parse_from(["rehab-offer-api", "analyze"]).is_err());

        let cli = Cli::try_parse_from([
            "rehab-offer-api",
            "analyze",
            "--address",
            "123 Main St",
            "--comps",
        ])
        .expect("parses");
        match cli.command {
            Some(Command::Analyze(args)) => {
                assert!(args.comps);
                assert_eq!(args.level, RehabLevel::Mid);
            }
            other => panic!("expected analyze command, got {other:?}"),
        }
    }
}
