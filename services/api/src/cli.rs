use crate::demo::{
    run_catalogue_validate, run_demo, run_generate, run_list_scenarios, CatalogueValidateArgs,
    DemoArgs, GenerateArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use closing_checklist::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "closing-checklist",
    about = "Build, schedule and serve scenario-driven home closing checklists",
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
    /// Generate or inspect a checklist
    Checklist {
        #[command(subcommand)]
        command: ChecklistCommand,
    },
    /// Work with the scenario catalogue
    Catalogue {
        #[command(subcommand)]
        command: CatalogueCommand,
    },
    /// Walk through a sample purchase from offer to keys
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum ChecklistCommand {
    /// Merge, schedule and print a checklist for the given scenarios
    Generate(GenerateArgs),
    /// List scenario keys by group
    Scenarios,
}

#[derive(Subcommand, Debug)]
enum CatalogueCommand {
    /// Check a catalogue document for authoring mistakes
    Validate(CatalogueValidateArgs),
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
        Command::Checklist {
            command: ChecklistCommand::Generate(args),
        } => run_generate(args),
        Command::Checklist {
            command: ChecklistCommand::Scenarios,
        } => run_list_scenarios(),
        Command::Catalogue {
            command: CatalogueCommand::Validate(args),
        } => run_catalogue_validate(args),
        Command::Demo(args) => run_demo(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_arguments_means_serve() {
        let cli = Cli::try_parse_from(["closing-checklist"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn generate_accepts_repeated_and_comma_separated_scenarios() {
        let cli = Cli::try_parse_from([
            "closing-checklist",
            "checklist",
            "generate",
            "--scenario",
            "fha,condo",
            "--scenario",
            "pre_1978",
            "--closing",
            "2025-03-20",
            "--format",
            "csv",
        ])
        .expect("parses");

        let Some(Command::Checklist {
            command: ChecklistCommand::Generate(args),
        }) = cli.command
        else {
            panic!("expected checklist generate");
        };
        assert_eq!(args.scenarios, vec!["fha", "condo", "pre_1978"]);
        assert!(args.closing.is_some());
    }

    #[test]
    fn malformed_dates_are_rejected() {
        let result = Cli::try_parse_from([
            "closing-checklist",
            "checklist",
            "generate",
            "--accepted",
            "next tuesday",
        ]);
        assert!(result.is_err());
    }
}
