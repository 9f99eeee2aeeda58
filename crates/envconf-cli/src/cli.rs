//! CLI argument parsing using clap derive

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// envconf - Environment-aware configuration and secrets for services
#[derive(Parser, Debug)]
#[command(name = "envconf")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the project manifest
    #[arg(short, long, global = true, default_value = ".envconfig.yml")]
    pub manifest: String,

    /// Environment to resolve for
    #[arg(short, long, global = true, env = "APP_ENV")]
    pub env: Option<String>,

    /// Extra ambient context entries
    #[arg(short, long, global = true, value_name = "KEY=VALUE")]
    pub context: Vec<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Resolve a configuration value
    ///
    /// Prints the resolved value as JSON, after context selection and
    /// template substitution.
    ///
    /// Examples:
    ///   envconf get system                    # whole category
    ///   envconf get system api                # one section
    ///   envconf get system api timeout        # one key
    ///   envconf get system api timeout -d 30  # with a fallback
    Get {
        /// Category to read
        category: String,

        /// Section within the category
        section: Option<String>,

        /// Key within the section
        key: Option<String>,

        /// Value returned when the section or key is missing
        #[arg(short, long)]
        default: Option<String>,
    },

    /// Print resolved configuration as flat dotted paths
    Dump {
        /// Restrict output to one category
        #[arg(long)]
        category: Option<String>,
    },

    /// Validate declared environment variables
    Vars {
        /// Print the declaration listing instead of resolved values
        #[arg(long)]
        usage: bool,
    },

    /// Verify the manifest against the configuration store
    Check,

    /// Generate shell completions
    ///
    /// Examples:
    ///   envconf completions bash > ~/.local/share/bash-completion/completions/envconf
    ///   envconf completions zsh > ~/.zfunc/_envconf
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        // Verify the CLI is valid
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_no_args() {
        let cli = Cli::parse_from(["envconf"]);
        assert!(!cli.verbose);
        assert!(cli.command.is_none());
        assert_eq!(cli.manifest, ".envconfig.yml");
    }

    #[test]
    fn parse_verbose_flag() {
        let cli = Cli::parse_from(["envconf", "--verbose"]);
        assert!(cli.verbose);
        assert!(cli.command.is_none());
    }

    #[test]
    fn parse_env_flag() {
        let cli = Cli::parse_from(["envconf", "--env", "staging", "check"]);
        assert_eq!(cli.env, Some("staging".to_string()));
        assert!(matches!(cli.command, Some(Commands::Check)));
    }

    #[test]
    fn parse_manifest_flag() {
        let cli = Cli::parse_from(["envconf", "-m", "conf/.envconfig.yml", "check"]);
        assert_eq!(cli.manifest, "conf/.envconfig.yml");
    }

    #[test]
    fn parse_context_pairs() {
        let cli = Cli::parse_from([
            "envconf", "get", "system", "-c", "region=eu", "-c", "replicas=2",
        ]);
        assert_eq!(cli.context, vec!["region=eu", "replicas=2"]);
    }

    #[test]
    fn parse_get_command() {
        let cli = Cli::parse_from(["envconf", "get", "system", "api", "timeout"]);
        match cli.command {
            Some(Commands::Get {
                category,
                section,
                key,
                default,
            }) => {
                assert_eq!(category, "system");
                assert_eq!(section, Some("api".to_string()));
                assert_eq!(key, Some("timeout".to_string()));
                assert_eq!(default, None);
            }
            _ => panic!("Expected Get command"),
        }
    }

    #[test]
    fn parse_get_command_category_only() {
        let cli = Cli::parse_from(["envconf", "get", "system"]);
        match cli.command {
            Some(Commands::Get {
                category,
                section,
                key,
                ..
            }) => {
                assert_eq!(category, "system");
                assert_eq!(section, None);
                assert_eq!(key, None);
            }
            _ => panic!("Expected Get command"),
        }
    }

    #[test]
    fn parse_get_command_with_default() {
        let cli = Cli::parse_from(["envconf", "get", "system", "api", "timeout", "--default", "30"]);
        match cli.command {
            Some(Commands::Get { default, .. }) => {
                assert_eq!(default, Some("30".to_string()));
            }
            _ => panic!("Expected Get command"),
        }
    }

    #[test]
    fn parse_dump_command() {
        let cli = Cli::parse_from(["envconf", "dump"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Dump { category: None })
        ));
    }

    #[test]
    fn parse_dump_command_with_category() {
        let cli = Cli::parse_from(["envconf", "dump", "--category", "system"]);
        match cli.command {
            Some(Commands::Dump { category }) => {
                assert_eq!(category, Some("system".to_string()));
            }
            _ => panic!("Expected Dump command"),
        }
    }

    #[test]
    fn parse_vars_command() {
        let cli = Cli::parse_from(["envconf", "vars"]);
        assert!(matches!(cli.command, Some(Commands::Vars { usage: false })));
    }

    #[test]
    fn parse_vars_command_usage() {
        let cli = Cli::parse_from(["envconf", "vars", "--usage"]);
        assert!(matches!(cli.command, Some(Commands::Vars { usage: true })));
    }

    #[test]
    fn parse_check_command() {
        let cli = Cli::parse_from(["envconf", "check"]);
        assert!(matches!(cli.command, Some(Commands::Check)));
    }

    #[test]
    fn parse_completions_command() {
        let cli = Cli::parse_from(["envconf", "completions", "bash"]);
        assert!(matches!(cli.command, Some(Commands::Completions { .. })));
    }

    #[test]
    fn verbose_flag_works_with_commands() {
        let cli = Cli::parse_from(["envconf", "-v", "check"]);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Some(Commands::Check)));

        let cli = Cli::parse_from(["envconf", "check", "--verbose"]);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Some(Commands::Check)));
    }
}
