mod commands;
mod core;

use clap::{Args, Parser, Subcommand};
use crate::core::error::{BumpError, print_error};

/// Bump package recipes/ports to new upstream versions, from branch to PR
#[derive(Parser)]
#[command(name = "portbump")]
#[command(version, about, long_about = None)]
#[command(styles = get_styles())]
struct Cli {
  #[command(subcommand)]
  command: Commands,
}

/// Workflow options shared by both ecosystem commands
#[derive(Args)]
struct WorkflowArgs {
  /// Branch prefix (default: jr)
  #[arg(long)]
  prefix: Option<String>,
  /// Explicit branch name (default: {prefix}/{package}-{version})
  #[arg(long)]
  branch: Option<String>,
  /// Trunk branch to sync before branching (default: master)
  #[arg(long)]
  trunk: Option<String>,
  /// Remote to push the bump branch to (default: origin)
  #[arg(long)]
  push_remote: Option<String>,
  /// Remote to rebase the trunk against (default: upstream)
  #[arg(long)]
  rebase_remote: Option<String>,
  /// Skip the local build verification step
  #[arg(long)]
  no_build: bool,
  /// Skip pull-request creation
  #[arg(long)]
  no_pr: bool,
}

#[derive(Subcommand)]
enum Commands {
  /// Bump a Conan-style recipe to a new upstream version
  Conan {
    /// Recipe directory under recipes/, e.g. cpptrace
    recipe: String,
    /// New version, e.g. 1.0.1
    version: String,
    /// Override the base repository URL if inference fails
    #[arg(long)]
    repo_url: Option<String>,
    #[command(flatten)]
    workflow: WorkflowArgs,
  },

  /// Bump a Vcpkg-style port to a new upstream version
  Vcpkg {
    /// Port directory under ports/, e.g. cpptrace
    port: String,
    /// New version, e.g. 1.0.1
    version: String,
    #[command(flatten)]
    workflow: WorkflowArgs,
  },

  /// Check out an external contributor's PR branch for local edits
  CheckoutPr {
    /// GitHub username of the contributor (used as the remote name)
    user: String,
    /// Branch name on the contributor's fork
    branch: String,
    /// Local branch name (default: {user}-{branch})
    #[arg(long)]
    local: Option<String>,
    /// Push local HEAD back to the contributor's branch
    #[arg(long)]
    push: bool,
    /// Remove the temporary branch and remote
    #[arg(long)]
    cleanup: bool,
  },
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

fn main() {
  let cli = Cli::parse();

  let result = match cli.command {
    Commands::Conan {
      recipe,
      version,
      repo_url,
      workflow,
    } => commands::run_conan(commands::ConanArgs {
      recipe,
      version,
      repo_url,
      prefix: workflow.prefix,
      branch: workflow.branch,
      trunk: workflow.trunk,
      push_remote: workflow.push_remote,
      rebase_remote: workflow.rebase_remote,
      no_build: workflow.no_build,
      no_pr: workflow.no_pr,
    }),

    Commands::Vcpkg {
      port,
      version,
      workflow,
    } => commands::run_vcpkg(commands::VcpkgArgs {
      port,
      version,
      prefix: workflow.prefix,
      branch: workflow.branch,
      trunk: workflow.trunk,
      push_remote: workflow.push_remote,
      rebase_remote: workflow.rebase_remote,
      no_build: workflow.no_build,
      no_pr: workflow.no_pr,
    }),

    Commands::CheckoutPr {
      user,
      branch,
      local,
      push,
      cleanup,
    } => commands::run_checkout_pr(commands::CheckoutPrArgs {
      user,
      branch,
      local,
      push,
      cleanup,
    }),
  };

  if let Err(err) = result {
    handle_error(err);
  }
}

fn handle_error(err: BumpError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
