mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "gitvss",
    version,
    about = "Synchronize a git repository with a Visual SourceSafe project",
    long_about = "gitvss keeps authoritative history in git while mirroring file state\n\
        into a Visual SourceSafe project through the ss command-line client.\n\n\
        Configure once per repository:\n  \
        git config gitvss.repository-path //server/vss\n  \
        git config gitvss.project-path $/Project\n\n\
        Then:\n  \
        gitvss push\n  \
        gitvss pull"
)]
struct Cli {
    /// Enable verbose logging (set log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the git repository (default: current directory)
    #[arg(short = 'C', long = "repo", global = true)]
    repo: Option<String>,

    /// Path to the ss executable (default: `ss` on PATH)
    #[arg(long, global = true)]
    ss_path: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Push the git tree onto the VSS project
    ///
    /// Requires a clean working tree. Checks the VSS project out, overlays
    /// the committed git tree, checks it back in, applies structural
    /// additions and removals, and moves the marker tag.
    ///
    /// Examples:
    ///   gitvss push
    ///   gitvss push --ref v1.4
    Push {
        /// Revision to push instead of HEAD; the current branch is restored
        /// afterwards
        #[arg(long)]
        r#ref: Option<String>,

        /// VSS database path (overrides gitvss.repository-path)
        #[arg(long)]
        repository_path: Option<String>,

        /// VSS project path, e.g. $/Project (overrides gitvss.project-path)
        #[arg(long)]
        project_path: Option<String>,
    },
    /// Pull the VSS project state into the git repository
    ///
    /// Fetches the project onto an isolated branch rooted at the last
    /// synced commit and merges it back; conflicts surface through git's
    /// normal merge machinery.
    Pull {
        /// VSS database path (overrides gitvss.repository-path)
        #[arg(long)]
        repository_path: Option<String>,

        /// VSS project path, e.g. $/Project (overrides gitvss.project-path)
        #[arg(long)]
        project_path: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let repo_dir = match cli.repo {
        Some(p) => std::path::PathBuf::from(p),
        None => std::env::current_dir()?,
    };
    let ss_path = cli.ss_path.as_deref();

    match cli.command {
        Commands::Push {
            r#ref,
            repository_path,
            project_path,
        } => commands::push::run(
            &repo_dir,
            r#ref.as_deref(),
            repository_path,
            project_path,
            ss_path,
            cli.verbose,
        ),
        Commands::Pull {
            repository_path,
            project_path,
        } => commands::pull::run(&repo_dir, repository_path, project_path, ss_path, cli.verbose),
    }
}
