#![allow(dead_code)]

//! Common test utilities for Inkpress CLI tests.
//!
//! Provides `TestBlog`: an isolated blog root with a stub generator script,
//! plus helpers to run the inkpress binary and drive local git remotes.
//! Everything lives under one temp directory:
//!
//!   <tmp>/blog       the blog root (config, content, CNAME, stub generator)
//!   <tmp>/site.git   bare repository standing in for the hosting remote
//!   <tmp>/deploy     the deploy clone inkpress creates on first deploy

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Stub generator: mirrors each post into an html file plus a home page,
/// and records its arguments for flag-forwarding assertions.
const FAKE_GENERATOR: &str = r#"#!/bin/sh
set -e
mkdir -p public
printf '%s' '<html>home</html>' > public/index.html
for f in source/_posts/*.md; do
  [ -e "$f" ] || continue
  base=$(basename "$f" .md)
  cp "$f" "public/$base.html"
done
echo "$@" > last-args.txt
"#;

const DEFAULT_CONFIG: &str = r#"[build]
command = ["sh", "fake-gen.sh"]

[deploy]
target_dir = "../deploy"
repo = "../site.git"
branch = "main"
"#;

/// Result of running an inkpress CLI command
#[derive(Debug)]
pub struct TestResult {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl TestResult {
    pub fn combined_output(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }

    /// Panic with the captured output unless the command succeeded.
    pub fn assert_success(&self) {
        assert!(
            self.success,
            "command failed (exit {}):\n{}",
            self.exit_code,
            self.combined_output()
        );
    }

    /// Parse the final stdout line as JSON.
    ///
    /// Spawned tools (git, the generator) share the process stdout, so the
    /// inkpress event is the last line, not necessarily the only one.
    pub fn last_json_line(&self) -> serde_json::Value {
        let line = self
            .stdout
            .lines()
            .filter(|l| !l.trim().is_empty())
            .last()
            .unwrap_or_else(|| panic!("no stdout produced:\n{}", self.combined_output()));
        serde_json::from_str(line).unwrap_or_else(|e| panic!("invalid JSON '{line}': {e}"))
    }
}

/// Isolated blog environment for driving the inkpress binary.
pub struct TestBlog {
    dir: TempDir,
}

impl TestBlog {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let blog = Self { dir };

        std::fs::create_dir_all(blog.root().join("source/_posts")).expect("create content dir");
        std::fs::write(blog.root().join("fake-gen.sh"), FAKE_GENERATOR).expect("write generator");
        std::fs::write(blog.root().join("CNAME"), "blog.example.com\n").expect("write CNAME");
        blog.write_config(DEFAULT_CONFIG);

        blog
    }

    pub fn root(&self) -> PathBuf {
        self.dir.path().join("blog")
    }

    pub fn deploy_dir(&self) -> PathBuf {
        self.dir.path().join("deploy")
    }

    pub fn remote_dir(&self) -> PathBuf {
        self.dir.path().join("site.git")
    }

    pub fn write_config(&self, content: &str) {
        std::fs::write(self.root().join("inkpress.toml"), content).expect("write config");
    }

    /// Add a post under `source/_posts`.
    pub fn add_post(&self, name: &str, front_matter: &str, body: &str) {
        let path = self.root().join("source/_posts").join(name);
        let content = format!("---\n{}---\n{}", front_matter, body);
        std::fs::write(path, content).expect("write post");
    }

    pub fn remove_post(&self, name: &str) {
        std::fs::remove_file(self.root().join("source/_posts").join(name))
            .expect("remove post");
    }

    /// Create the bare hosting remote with `main` as its default branch.
    pub fn init_remote(&self) {
        git_in(self.dir.path(), &["init", "--bare", "-q", "site.git"]);
        git_in(
            &self.remote_dir(),
            &["symbolic-ref", "HEAD", "refs/heads/main"],
        );
    }

    /// Run the inkpress binary from the blog root.
    pub fn run(&self, args: &[&str]) -> TestResult {
        let bin = env!("CARGO_BIN_EXE_inkpress");

        let output = Command::new(bin)
            .current_dir(self.root())
            .args(args)
            .env("GIT_AUTHOR_NAME", "Inkpress Test")
            .env("GIT_AUTHOR_EMAIL", "test@example.com")
            .env("GIT_COMMITTER_NAME", "Inkpress Test")
            .env("GIT_COMMITTER_EMAIL", "test@example.com")
            .output()
            .expect("failed to execute inkpress");

        TestResult {
            success: output.status.success(),
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }

    /// Tracked file set of the deploy clone, sorted.
    pub fn tracked_files(&self) -> Vec<String> {
        let mut files: Vec<String> = git_stdout(&self.deploy_dir(), &["ls-files"])
            .lines()
            .map(|l| l.to_string())
            .collect();
        files.sort();
        files
    }

    /// Commit count on a branch of the given repository.
    pub fn commit_count(&self, repo: &Path, branch: &str) -> usize {
        git_stdout(repo, &["rev-list", "--count", branch])
            .trim()
            .parse()
            .expect("parse rev-list count")
    }

    /// Subject line of the latest commit in the deploy clone.
    pub fn last_commit_message(&self) -> String {
        git_stdout(&self.deploy_dir(), &["log", "-1", "--format=%s"])
            .trim()
            .to_string()
    }
}

/// Run git in `dir`, panicking on failure.
pub fn git_in(dir: &Path, args: &[&str]) -> Output {
    let output = git_raw(dir, args);
    assert!(
        output.status.success(),
        "git {:?} failed in {}:\n{}",
        args,
        dir.display(),
        String::from_utf8_lossy(&output.stderr)
    );
    output
}

/// Run git in `dir` without asserting success.
pub fn git_raw(dir: &Path, args: &[&str]) -> Output {
    Command::new("git")
        .current_dir(dir)
        .args(args)
        .env("GIT_AUTHOR_NAME", "Inkpress Test")
        .env("GIT_AUTHOR_EMAIL", "test@example.com")
        .env("GIT_COMMITTER_NAME", "Inkpress Test")
        .env("GIT_COMMITTER_EMAIL", "test@example.com")
        .output()
        .expect("failed to execute git")
}

/// Stdout of a git command, panicking on failure.
pub fn git_stdout(dir: &Path, args: &[&str]) -> String {
    let output = git_in(dir, args);
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Git-dependent tests skip quietly when no git binary is on PATH.
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}
