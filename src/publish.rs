//! Publisher: mirror the build output into the deploy repository
//!
//! Clone-once, then on every publish: drop all tracked files, copy the
//! fresh output in, commit with a UTC timestamp, push. Strictly sequential;
//! each git step checks its exit status and the first failure aborts the
//! pipeline with that status. Re-running after a failure converges, since
//! the remove + copy pair always rebuilds the full mirror.
//!
//! Every git child runs with its working directory pinned to the clone;
//! the inkpress process itself never changes directory, so an interrupt
//! needs no directory restoration.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;

use crate::config::Config;
use crate::error::{InkpressError, InkpressResult};
use crate::fsutil;

/// Commit message timestamp, UTC and lexically sortable
const TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%S";

/// Result of a successful publish
#[derive(Debug, Clone)]
pub struct PublishSummary {
    pub target_dir: PathBuf,
    /// Commit message, timestamp included
    pub message: String,
    pub files: usize,
}

/// A git working copy addressed without changing the process directory
struct GitRepo {
    workdir: PathBuf,
}

impl GitRepo {
    fn new(workdir: PathBuf) -> Self {
        Self { workdir }
    }

    fn run(&self, op: &str, args: &[&str]) -> InkpressResult<()> {
        let status = Command::new("git")
            .arg(op)
            .args(args)
            .current_dir(&self.workdir)
            .status()
            .map_err(|source| InkpressError::Spawn {
                program: "git".to_string(),
                source,
            })?;

        if !status.success() {
            return Err(InkpressError::Git {
                op: op.to_string(),
                code: status.code().unwrap_or(1),
            });
        }
        Ok(())
    }
}

/// Format the current UTC time for a deploy commit message.
pub fn deploy_timestamp() -> String {
    Utc::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Ensure the deploy target exists locally: reuse an existing clone, clone
/// once if absent.
pub fn ensure_target(root: &Path, config: &Config) -> InkpressResult<PathBuf> {
    let target = config.target_dir(root);
    if target.join(".git").exists() {
        return Ok(target);
    }
    if target.exists() {
        return Err(InkpressError::TargetNotARepo { path: target });
    }

    let repo = config
        .deploy
        .repo
        .as_deref()
        .ok_or_else(|| InkpressError::MissingDeployRepo {
            path: target.clone(),
        })?;

    let status = Command::new("git")
        .arg("clone")
        .arg(repo)
        .arg(&target)
        .current_dir(root)
        .status()
        .map_err(|source| InkpressError::Spawn {
            program: "git".to_string(),
            source,
        })?;

    if !status.success() {
        return Err(InkpressError::Git {
            op: "clone".to_string(),
            code: status.code().unwrap_or(1),
        });
    }
    Ok(target)
}

/// Mirror `output_dir` into the deploy target, commit, push.
///
/// `running` is the interrupt flag; once it goes false the publisher
/// aborts before its next step. An in-flight git child is left to finish
/// rather than being killed mid-write.
pub fn publish(
    root: &Path,
    config: &Config,
    output_dir: &Path,
    running: &AtomicBool,
) -> InkpressResult<PublishSummary> {
    check_interrupt(running)?;
    let target_dir = ensure_target(root, config)?;
    let repo = GitRepo::new(target_dir.clone());

    check_interrupt(running)?;
    repo.run("rm", &["-r", "-f", "-q", "--ignore-unmatch", "."])?;

    check_interrupt(running)?;
    let files = fsutil::copy_tree(output_dir, &target_dir)?;

    check_interrupt(running)?;
    repo.run("add", &["--all"])?;

    check_interrupt(running)?;
    let message = format!("{} {}", config.deploy.message_prefix, deploy_timestamp());
    // a no-change re-deploy still commits; only the timestamp moves
    repo.run("commit", &["--allow-empty", "-m", &message])?;

    check_interrupt(running)?;
    repo.run(
        "push",
        &[config.deploy.remote.as_str(), config.deploy.branch.as_str()],
    )?;

    Ok(PublishSummary {
        target_dir,
        message,
        files,
    })
}

fn check_interrupt(running: &AtomicBool) -> InkpressResult<()> {
    if running.load(Ordering::SeqCst) {
        Ok(())
    } else {
        Err(InkpressError::Interrupted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_deploy_timestamp_is_utc_sortable() {
        let stamp = deploy_timestamp();
        assert_eq!(stamp.len(), 15);
        let (date, time) = stamp.split_at(8);
        assert!(date.chars().all(|c| c.is_ascii_digit()));
        assert_eq!(&time[..1], "T");
        assert!(time[1..].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_ensure_target_rejects_non_repo_directory() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("blog");
        fs::create_dir_all(&root).unwrap();
        fs::create_dir_all(dir.path().join("deploy")).unwrap();

        let config = Config::default();
        let err = ensure_target(&root, &config).unwrap_err();

        assert!(matches!(err, InkpressError::TargetNotARepo { .. }));
    }

    #[test]
    fn test_ensure_target_requires_repo_url_for_clone() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("blog");
        fs::create_dir_all(&root).unwrap();

        let config = Config::default();
        let err = ensure_target(&root, &config).unwrap_err();

        assert!(matches!(err, InkpressError::MissingDeployRepo { .. }));
    }

    #[test]
    fn test_publish_aborts_immediately_when_interrupted() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("blog");
        fs::create_dir_all(&root).unwrap();
        let running = AtomicBool::new(false);

        let err = publish(&root, &Config::default(), &root, &running).unwrap_err();

        assert!(matches!(err, InkpressError::Interrupted));
        assert_eq!(err.exit_code(), 130);
        // Nothing was cloned or created
        assert!(!dir.path().join("deploy").exists());
    }
}
