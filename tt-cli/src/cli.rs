use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "tt")]
#[command(version, about = "Load and review hours in the time tracker portal")]
pub struct Cli {
    /// Config file with credentials and default options [default: ~/.timetracker/config.toml]
    #[arg(short, long, global = true, env = "TT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log every request and workflow step to stderr
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Load hours for one day
    Load(LoadArgs),
    /// Show the hours loaded over a date range
    Show(ShowArgs),
    /// Load one entry per row of a CSV file
    Batch(BatchArgs),
}

// `-h` is taken by --hours, so help is long only.
#[derive(Debug, Args)]
#[command(disable_help_flag = true)]
pub struct LoadArgs {
    /// What you did
    #[arg(short, long)]
    pub text: Option<String>,

    /// Day to load, e.g. "today", "yesterday", "monday" or dd/mm/yyyy
    #[arg(short, long, default_value = "today")]
    pub date: String,

    /// Amount of hours, falls back to `hours` in the config file
    #[arg(short = 'h', long)]
    pub hours: Option<String>,

    /// Load the day as PTO
    #[arg(short, long, conflicts_with = "vacations")]
    pub pto: bool,

    /// Load the day as vacations
    #[arg(short, long)]
    pub vacations: bool,

    /// Print help
    #[arg(long, action = ArgAction::Help)]
    pub help: Option<bool>,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// First day of the report, defaults to the first day of the month
    #[arg(short, long)]
    pub start: Option<String>,

    /// Last day of the report, defaults to today
    #[arg(short, long)]
    pub end: Option<String>,

    /// Show hours, project and assignment type, plus the total
    #[arg(short, long)]
    pub full: bool,

    /// Show the day of the week of every entry
    #[arg(short, long)]
    pub weekday: bool,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct BatchArgs {
    /// CSV file with the columns date, hours, text, kind and optionally project,
    /// category, task and focal
    pub file: PathBuf,

    /// Only check the rows, load nothing
    #[arg(long)]
    pub dry_run: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_uses_short_h_for_hours() {
        let cli = Cli::try_parse_from(["tt", "load", "-t", "Code review", "-h", "3.5", "-d", "yesterday"]).unwrap();

        match cli.command {
            Commands::Load(args) => {
                assert_eq!(args.text.as_deref(), Some("Code review"));
                assert_eq!(args.hours.as_deref(), Some("3.5"));
                assert_eq!(args.date, "yesterday");
                assert!(!args.pto);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn load_date_defaults_to_today() {
        let cli = Cli::try_parse_from(["tt", "load", "--pto"]).unwrap();

        match cli.command {
            Commands::Load(args) => {
                assert_eq!(args.date, "today");
                assert!(args.pto);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn pto_and_vacations_are_exclusive() {
        assert!(Cli::try_parse_from(["tt", "load", "-p", "-v"]).is_err());
    }

    #[test]
    fn show_flags_and_global_config() {
        let cli = Cli::try_parse_from(["tt", "show", "-f", "-w", "-s", "01/10/2026", "--config", "tt.toml"]).unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("tt.toml")));
        match cli.command {
            Commands::Show(args) => {
                assert!(args.full && args.weekday && !args.json);
                assert_eq!(args.start.as_deref(), Some("01/10/2026"));
                assert_eq!(args.end, None);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
