//! Developer tasks for the kubestack workspace.
//!
//! `cargo xtask ci` is what the pipeline runs. The other tasks are its
//! individual stages plus two helpers that exercise the binary offline.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use xshell::{cmd, Shell};

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Developer tasks for kubestack")]
struct Cli {
    #[command(subcommand)]
    task: Task,
}

#[derive(Subcommand)]
enum Task {
    /// Compile the workspace
    Build {
        #[arg(long)]
        release: bool,
    },
    /// Run unit and integration tests, optionally filtered by name
    Test { filter: Option<String> },
    /// rustfmt and clippy; `--fix` rewrites instead of failing
    Lint {
        #[arg(long)]
        fix: bool,
    },
    /// Declare the whole stack against the in-memory provider
    Preview {
        #[arg(long)]
        config_file: Option<String>,
    },
    /// Write the rendered web app manifests to dist/
    Manifests {
        #[arg(long)]
        certificate_arn: Option<String>,
    },
    /// lint, test, then preview the default stack
    Ci,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let sh = Shell::new()?;
    let root = workspace_root()?;
    sh.change_dir(&root);

    match cli.task {
        Task::Build { release } => build(&sh, release),
        Task::Test { filter } => test(&sh, filter.as_deref()),
        Task::Lint { fix } => lint(&sh, fix),
        Task::Preview { config_file } => preview(&sh, config_file.as_deref()),
        Task::Manifests { certificate_arn } => {
            manifests(&sh, &root, certificate_arn.as_deref())
        }
        Task::Ci => ci(&sh),
    }
}

fn stage(name: &str) {
    println!("==> {}", name);
}

fn build(sh: &Shell, release: bool) -> Result<()> {
    stage(if release { "build (release)" } else { "build" });
    let profile: &[&str] = if release { &["--release"] } else { &[] };
    cmd!(sh, "cargo build --workspace {profile...}").run()?;
    Ok(())
}

fn test(sh: &Shell, filter: Option<&str>) -> Result<()> {
    stage("test");
    let filter: Vec<&str> = filter.into_iter().collect();
    cmd!(sh, "cargo test --workspace {filter...}").run()?;
    Ok(())
}

fn lint(sh: &Shell, fix: bool) -> Result<()> {
    stage("rustfmt");
    if fix {
        cmd!(sh, "cargo fmt --all").run()?;
    } else {
        cmd!(sh, "cargo fmt --all -- --check")
            .run()
            .context("run `cargo xtask lint --fix` to reformat")?;
    }

    stage("clippy");
    let fix_args: &[&str] = if fix { &["--fix", "--allow-dirty"] } else { &[] };
    cmd!(sh, "cargo clippy --workspace --all-targets {fix_args...} -- -D warnings").run()?;
    Ok(())
}

/// Runs the kubestack binary and captures its stdout.
fn kubestack(sh: &Shell, args: &[&str]) -> Result<String> {
    let output = cmd!(sh, "cargo run --quiet --bin kubestack -- {args...}")
        .read()
        .with_context(|| format!("kubestack {} failed", args.join(" ")))?;
    Ok(output)
}

fn preview(sh: &Shell, config_file: Option<&str>) -> Result<()> {
    stage("preview");
    let mut args = vec!["preview"];
    if let Some(path) = config_file {
        args.extend(["--config-file", path]);
    }
    println!("{}", kubestack(sh, &args)?);
    Ok(())
}

fn manifests(sh: &Shell, root: &Path, certificate_arn: Option<&str>) -> Result<()> {
    stage("manifests");
    let mut args = vec!["render"];
    if let Some(arn) = certificate_arn {
        args.extend(["--certificate-arn", arn]);
    }
    let rendered = kubestack(sh, &args)?;
    if rendered.trim().is_empty() {
        bail!("render produced no manifests");
    }

    let dist = root.join("dist");
    sh.create_dir(&dist)?;
    let path = dist.join("manifests.yaml");
    sh.write_file(&path, rendered + "\n")?;
    println!("wrote {}", path.display());
    Ok(())
}

fn ci(sh: &Shell) -> Result<()> {
    lint(sh, false)?;
    test(sh, None)?;
    preview(sh, None)?;
    println!("ci ok");
    Ok(())
}

fn workspace_root() -> Result<PathBuf> {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .map(Path::to_path_buf)
        .context("xtask must live one level below the workspace root")
}
