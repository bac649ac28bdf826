use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use std::path::PathBuf;

use tessera_config::{ConfigLoader, LoggingConfig, TesseraConfig};

mod serve;
mod skills;

/// Tessera: role-aware skill registry for conversational agents
#[derive(Parser, Debug)]
#[command(name = "tessera", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to tessera.toml config file
    #[arg(short, long, global = true, env = "TESSERA_CONFIG")]
    config: Option<PathBuf>,

    /// Log level override (e.g. debug, info, warn, error)
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all log output (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage skills (SKILL.md directories)
    Skills {
        /// User skills directory (overrides skills.user_dir)
        #[arg(long, global = true)]
        skills_dir: Option<PathBuf>,

        #[command(subcommand)]
        action: SkillsAction,
    },
    /// Start the HTTP API server
    Serve {
        /// Address to listen on (overrides server.listen)
        #[arg(short = 'L', long)]
        listen: Option<String>,
    },
    /// Show the effective configuration
    Config {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show version and build info
    Version,
    /// Generate shell completions for bash, zsh, or fish
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand, Debug)]
enum SkillsAction {
    /// List skills from every configured root
    List {
        /// Only show skills visible to this role
        #[arg(short, long, value_enum, default_value_t = RoleFilter::All)]
        role: RoleFilter,
    },
    /// Show a skill's SKILL.md and helper files
    Show { name: String },
    /// Validate a skill directory without modifying it
    Validate { path: PathBuf },
    /// Scaffold a new skill in the user skills directory
    New {
        /// Skill name (normalized to kebab-case)
        name: String,
        /// One-line description
        #[arg(short, long)]
        description: String,
        /// Restrict the skill to the developer role
        #[arg(long)]
        developer_only: bool,
        /// Allowed tool (repeatable)
        #[arg(short, long = "tool")]
        tools: Vec<String>,
        /// Markdown body (defaults to a heading and placeholder notes)
        #[arg(long)]
        body: Option<String>,
    },
    /// Delete a user skill (built-ins are protected)
    Delete {
        name: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Manage helper files inside a skill directory
    Files {
        #[command(subcommand)]
        action: FilesAction,
    },
}

#[derive(Subcommand, Debug)]
enum FilesAction {
    /// List helper files
    List { skill: String },
    /// Print a helper file
    Show { skill: String, file: String },
    /// Add a helper file from --content, stdin, or a starter template
    Add {
        skill: String,
        file: String,
        /// File content (reads stdin when piped, else uses a template)
        #[arg(long)]
        content: Option<String>,
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
    /// Remove a helper file
    Remove { skill: String, file: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum RoleFilter {
    All,
    Developer,
    User,
}

impl RoleFilter {
    fn role(self) -> Option<tessera_core::Role> {
        match self {
            RoleFilter::All => None,
            RoleFilter::Developer => Some(tessera_core::Role::Developer),
            RoleFilter::User => Some(tessera_core::Role::User),
        }
    }
}

impl Cli {
    pub async fn run(self) -> tessera_core::Result<()> {
        // Load config first so we can use it for log format
        let config_loader = ConfigLoader::load(self.config.as_deref())?;
        let config = config_loader.get();

        init_tracing(
            &config.logging,
            self.verbose,
            self.quiet,
            self.log_level.as_deref(),
        );

        match self.command {
            Commands::Skills { skills_dir, action } => {
                let mut skills = config.skills.clone();
                if let Some(dir) = skills_dir {
                    skills.user_dir = dir;
                }
                skills::cmd_skills(&skills, action)
            }
            Commands::Serve { listen } => serve::cmd_serve(config, listen).await,
            Commands::Config { json } => Self::cmd_config(&config, json),
            Commands::Version => Self::cmd_version(),
            Commands::Completions { shell } => Self::cmd_completions(shell),
        }
    }

    fn cmd_config(config: &TesseraConfig, json: bool) -> tessera_core::Result<()> {
        if json {
            println!("{}", serde_json::to_string_pretty(config)?);
        } else {
            println!(
                "{}",
                toml::to_string_pretty(config)
                    .map_err(|e| tessera_core::TesseraError::Config(e.to_string()))?
            );
        }
        Ok(())
    }

    fn cmd_version() -> tessera_core::Result<()> {
        println!("Tessera v{}", env!("CARGO_PKG_VERSION"));
        println!("   Target: {}", std::env::consts::ARCH);
        println!("   OS: {}", std::env::consts::OS);
        #[cfg(debug_assertions)]
        println!("   Profile: debug");
        #[cfg(not(debug_assertions))]
        println!("   Profile: release");
        Ok(())
    }

    fn cmd_completions(shell: Shell) -> tessera_core::Result<()> {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "tessera", &mut std::io::stdout());
        Ok(())
    }
}

/// Resolve the log level: --verbose > --quiet > --log-level > config.
fn resolve_log_level<'a>(
    logging: &'a LoggingConfig,
    verbose: bool,
    quiet: bool,
    log_level: Option<&'a str>,
) -> &'a str {
    if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        log_level.unwrap_or(logging.level.as_str())
    }
}

/// `RUST_LOG` wins over everything when set.
fn init_tracing(logging: &LoggingConfig, verbose: bool, quiet: bool, log_level: Option<&str>) {
    let level = resolve_log_level(logging, verbose, quiet, log_level);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    // Already initialised (e.g. when embedded); keep the existing subscriber.
    let _ = match logging.format.as_str() {
        "json" => builder.json().with_target(true).try_init(),
        "compact" => builder.compact().with_target(false).try_init(),
        _ => builder.with_target(false).try_init(),
    };
}
