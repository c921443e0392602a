//! Inkpress CLI - static blog build and deploy pipeline
//!
//! Usage: inkpress <COMMAND>
//!
//! Commands:
//!   build   Generate the site into a clean output directory
//!   watch   Serve the site locally with drafts included
//!   deploy  Build, then publish the output to the deploy repository
//!   posts   List content items and their front-matter

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

use inkpress::error::InkpressError;

/// Inkpress - static blog build and deploy pipeline
#[derive(Parser, Debug)]
#[command(name = "inkpress")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Output NDJSON events for CI
    #[arg(long, default_value = "false")]
    json: bool,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate the site into a clean output directory
    Build {
        /// Path to the blog root
        #[arg(short, long, default_value = ".")]
        root: PathBuf,

        /// Include draft posts
        #[arg(long)]
        drafts: bool,
    },

    /// Serve the site locally with drafts included
    Watch {
        /// Path to the blog root
        #[arg(short, long, default_value = ".")]
        root: PathBuf,

        /// Exclude draft posts
        #[arg(long)]
        no_drafts: bool,
    },

    /// Build, then publish the output to the deploy repository
    Deploy {
        /// Path to the blog root
        #[arg(short, long, default_value = ".")]
        root: PathBuf,

        /// Build and report, but skip the publish steps
        #[arg(long)]
        dry_run: bool,
    },

    /// List content items and their front-matter
    Posts {
        /// Path to the blog root
        #[arg(short, long, default_value = ".")]
        root: PathBuf,

        /// Only show drafts
        #[arg(long)]
        drafts: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Build { ref root, drafts } => cmd_build(root, drafts, cli.json, cli.verbose),
        Commands::Watch { ref root, no_drafts } => cmd_watch(root, !no_drafts, cli.json),
        Commands::Deploy { ref root, dry_run } => {
            cmd_deploy(root, dry_run, cli.json, cli.verbose)
        }
        Commands::Posts { ref root, drafts } => cmd_posts(root, drafts, cli.json),
    };

    if let Err(err) = result {
        eprintln!("✗ {err:#}");
        std::process::exit(exit_code(&err));
    }
}

/// The first non-zero exit status from an underlying command wins;
/// everything else is a plain failure.
fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<InkpressError>()
        .map(InkpressError::exit_code)
        .unwrap_or(1)
}

fn load_config(root: &Path, json: bool) -> Result<inkpress::Config> {
    let (config, warnings) = inkpress::Config::load_with_warnings(root)?;
    if !json {
        for warning in &warnings {
            eprintln!("⚠ {warning}");
        }
    }
    Ok(config)
}

fn cmd_build(root: &Path, drafts: bool, json: bool, verbose: u8) -> Result<()> {
    use inkpress::generate::{build_site, generator_command, BuildOptions};

    let root = std::fs::canonicalize(root)?;
    let config = load_config(&root, json)?;
    let options = BuildOptions { drafts };

    if !json {
        println!("🔨 Inkpress Build");
        println!("Root: {}", root.display());
        if drafts {
            println!("Mode: Drafts included");
        }
        if verbose > 0 {
            println!("Generator: {}", generator_command(&config, &options).join(" "));
        }
    }

    let summary = build_site(&root, &config, &options)?;

    if json {
        let output = serde_json::json!({
            "event": "build",
            "status": "success",
            "output_dir": summary.output_dir.display().to_string(),
            "files": summary.files,
        });
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!(
            "\n✓ Generated {} files into {}",
            summary.files,
            summary.output_dir.display()
        );
    }

    Ok(())
}

fn cmd_watch(root: &Path, drafts: bool, json: bool) -> Result<()> {
    use inkpress::watcher::{watch, WatchEvent, WatchOptions};

    let root = std::fs::canonicalize(root)?;
    let config = load_config(&root, json)?;

    // Set up Ctrl+C handler
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = running.clone();

    ctrlc::set_handler(move || {
        running_clone.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl+C handler");

    if !json {
        println!("👀 Inkpress Watch");
        println!("Root: {}", root.display());
        if drafts {
            println!("Mode: Drafts included");
        }
        println!("Press Ctrl+C to stop\n");
    }

    let options = WatchOptions {
        root,
        config,
        drafts,
    };

    watch(options, running, |event| {
        if json {
            println!("{}", event.to_json());
        } else {
            match event {
                WatchEvent::ServerStarted { command } => {
                    println!("🌐 Serving via: {}", command);
                }
                WatchEvent::Watching { dirs } => {
                    println!("📂 Watching: {}", dirs.join(", "));
                }
                WatchEvent::FileChanged { path } => {
                    println!("📝 Changed: {}", path);
                }
                WatchEvent::BuildStarted => {
                    println!("🔄 Rebuilding...");
                }
                WatchEvent::BuildComplete { files } => {
                    println!("✓ Build: {} files", files);
                }
                WatchEvent::Error { message } => {
                    eprintln!("✗ Error: {}", message);
                }
                WatchEvent::Shutdown => {
                    println!("\n👋 Shutting down...");
                }
            }
        }
    })?;

    Ok(())
}

fn cmd_deploy(root: &Path, dry_run: bool, json: bool, verbose: u8) -> Result<()> {
    use inkpress::generate::{build_site, generator_command, BuildOptions};
    use inkpress::publish::publish;

    let root = std::fs::canonicalize(root)?;
    let config = load_config(&root, json)?;
    let options = BuildOptions::default();

    if !json {
        println!("🚀 Inkpress Deploy");
        println!("Root: {}", root.display());
        if dry_run {
            println!("Mode: Dry run");
        }
        if verbose > 0 {
            println!("Generator: {}", generator_command(&config, &options).join(" "));
            println!("Target: {}", config.target_dir(&root).display());
        }
    }

    // Ctrl+C aborts the pipeline between steps
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = running.clone();

    ctrlc::set_handler(move || {
        running_clone.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl+C handler");

    let build = build_site(&root, &config, &options)?;

    if !json {
        println!(
            "✓ Generated {} files into {}",
            build.files,
            build.output_dir.display()
        );
    }

    if dry_run {
        if json {
            let output = serde_json::json!({
                "event": "deploy",
                "status": "dry_run",
                "files": build.files,
                "target_dir": config.target_dir(&root).display().to_string(),
            });
            println!("{}", serde_json::to_string(&output)?);
        } else {
            println!(
                "\nDry run: skipping publish to {}",
                config.target_dir(&root).display()
            );
        }
        return Ok(());
    }

    let summary = publish(&root, &config, &build.output_dir, &running)?;

    if json {
        let output = serde_json::json!({
            "event": "deploy",
            "status": "success",
            "target_dir": summary.target_dir.display().to_string(),
            "files": summary.files,
            "message": summary.message,
        });
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!(
            "✓ Published {} files to {}",
            summary.files,
            summary.target_dir.display()
        );
        println!("  Commit: {}", summary.message);
    }

    Ok(())
}

fn cmd_posts(root: &Path, drafts_only: bool, json: bool) -> Result<()> {
    let root = std::fs::canonicalize(root)?;
    let config = load_config(&root, json)?;

    let posts = inkpress::content::scan_posts(&config.content_dir(&root))?;
    let posts: Vec<_> = posts
        .into_iter()
        .filter(|p| !drafts_only || p.is_draft())
        .collect();

    if json {
        for post in &posts {
            let output = serde_json::json!({
                "event": "post",
                "id": post.id,
                "title": post.front_matter.title,
                "date": post.front_matter.date.map(|d| d.to_string()),
                "draft": post.is_draft(),
                "categories": post.front_matter.categories,
                "path": post.source_path.display().to_string(),
            });
            println!("{}", serde_json::to_string(&output)?);
        }
    } else {
        println!("Found {} posts:\n", posts.len());
        for post in &posts {
            let marker = if post.is_draft() { " [draft]" } else { "" };
            println!("┌─ {}{}", post.front_matter.title, marker);
            if let Some(date) = post.front_matter.date {
                println!("│  Date: {}", date);
            }
            if !post.front_matter.categories.is_empty() {
                println!("│  Categories: {}", post.front_matter.categories.join(", "));
            }
            if !post.front_matter.tags.is_empty() {
                println!("│  Tags: {}", post.front_matter.tags.join(", "));
            }
            println!("│  Path: {}", post.source_path.display());
            println!("└─");
        }
    }

    Ok(())
}
