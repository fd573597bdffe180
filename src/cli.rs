use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "gizi")]
#[command(author, version, about = "Nutrition facts from server-rendered nutrition pages", long_about = None)]
#[command(after_help = r#"Examples:
  gizi facts "bakso daging sapi"          Nutrition facts per default serving
  gizi portions "nasi goreng"             Facts for every known serving size
  gizi search "sate" --limit 5            Search listing with parsed nutrition
  gizi facts tempe --json                 Raw record as JSON

Logging:
  GIZI_LOG=gizi=debug gizi facts tahu     Log filter (default gizi=warn)
  LOG_FORMAT=json gizi -v facts tahu      JSON log lines on stderr
"#)]
pub struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show nutrition facts for a food at its default serving
    Facts {
        /// Food name, e.g. "bakso daging sapi"
        #[arg(value_name = "NAME")]
        name: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show nutrition facts for every known serving size of a food
    Portions {
        /// Food name
        #[arg(value_name = "NAME")]
        name: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Search foods and show nutrition parsed from the listing
    Search {
        /// Search query
        #[arg(value_name = "QUERY")]
        query: String,

        /// Show at most this many results
        #[arg(long, short = 'n')]
        limit: Option<usize>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Inspect or create the configuration file
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the config file location
    Path,
    /// Print the effective configuration
    Show,
    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_args() {
        let cli = Cli::try_parse_from(["gizi", "-v", "search", "sate ayam", "-n", "3"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Search { query, limit, json } => {
                assert_eq!(query, "sate ayam");
                assert_eq!(limit, Some(3));
                assert!(!json);
            }
            _ => panic!("expected search command"),
        }
    }

    #[test]
    fn test_parse_config_init() {
        let cli = Cli::try_parse_from(["gizi", "config", "init", "--force"]).unwrap();
        assert!(matches!(cli.command, Commands::Config(ConfigCommands::Init { force: true })));
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
