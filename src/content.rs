//! Content scanning and front-matter parsing
//!
//! Handles extraction and parsing of YAML front-matter from Markdown posts.
//! Content files are read-only inputs to the build; nothing here writes.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;
use serde_yaml_ng as serde_yaml;

use crate::error::{InkpressError, InkpressResult};

/// Delimiter for front-matter sections
const FRONT_MATTER_DELIMITER: &str = "---";

/// Date formats accepted in front-matter, tried in order
const DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Structured metadata block prefacing a content file
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FrontMatter {
    pub title: String,

    #[serde(default, deserialize_with = "deserialize_date")]
    pub date: Option<NaiveDateTime>,

    #[serde(default)]
    pub draft: bool,

    #[serde(default, deserialize_with = "deserialize_list")]
    pub categories: Vec<String>,

    #[serde(default, deserialize_with = "deserialize_list")]
    pub tags: Vec<String>,
}

/// A parsed content item
#[derive(Debug, Clone)]
pub struct Post {
    /// Identifier derived from the file name
    pub id: String,
    /// Path relative to the content directory
    pub source_path: PathBuf,
    pub front_matter: FrontMatter,
}

impl Post {
    /// Draft posts carry `draft: true` or live under a `_drafts` directory.
    pub fn is_draft(&self) -> bool {
        self.front_matter.draft
            || self
                .source_path
                .components()
                .any(|c| c.as_os_str() == "_drafts")
    }
}

/// Raw front-matter block split out of a content file
#[derive(Debug, Clone, PartialEq)]
pub struct RawFrontMatter {
    /// The YAML between the delimiters
    pub yaml: String,
    /// 1-indexed line where the block ends (for error reporting)
    pub end_line: usize,
}

/// Extract the front-matter block from file content.
///
/// The block must be at the start of the file, delimited by `---` lines.
pub fn extract_front_matter(content: &str, file: &Path) -> InkpressResult<RawFrontMatter> {
    let lines: Vec<&str> = content.lines().collect();

    if lines.is_empty() || lines[0].trim() != FRONT_MATTER_DELIMITER {
        return Err(InkpressError::NoFrontMatter {
            file: file.to_path_buf(),
        });
    }

    let closing_line = lines
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, line)| line.trim() == FRONT_MATTER_DELIMITER)
        .map(|(i, _)| i)
        .ok_or_else(|| InkpressError::UnclosedFrontMatter {
            file: file.to_path_buf(),
        })?;

    Ok(RawFrontMatter {
        yaml: lines[1..closing_line].join("\n"),
        end_line: closing_line + 1,
    })
}

/// Parse front-matter YAML into a [`FrontMatter`].
pub fn parse_front_matter(yaml: &str, file: &Path) -> InkpressResult<FrontMatter> {
    serde_yaml::from_str(yaml).map_err(|e| InkpressError::InvalidFrontMatter {
        file: file.to_path_buf(),
        message: e.to_string(),
    })
}

/// Parse a single content file into a [`Post`].
pub fn parse_post(path: &Path) -> InkpressResult<Post> {
    let content = fs::read_to_string(path)?;
    let raw = extract_front_matter(&content, path)?;
    let front_matter = parse_front_matter(&raw.yaml, path)?;

    let id = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown")
        .to_string();

    Ok(Post {
        id,
        source_path: path.to_path_buf(),
        front_matter,
    })
}

/// Scan a content directory for Markdown posts, newest first.
///
/// Hidden and ignored files are skipped; undated posts sort last, ties
/// break on id for deterministic output.
pub fn scan_posts(dir: &Path) -> InkpressResult<Vec<Post>> {
    if !dir.is_dir() {
        return Err(InkpressError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let mut posts = Vec::new();
    for entry in ignore::WalkBuilder::new(dir).build() {
        let entry = entry.map_err(|e| {
            InkpressError::Io(std::io::Error::new(std::io::ErrorKind::Other, e))
        })?;
        let path = entry.path();
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        if path.extension().map(|e| e == "md").unwrap_or(false) {
            let mut post = parse_post(path)?;
            if let Ok(relative) = path.strip_prefix(dir) {
                post.source_path = relative.to_path_buf();
            }
            posts.push(post);
        }
    }

    posts.sort_by(|a, b| {
        b.front_matter
            .date
            .cmp(&a.front_matter.date)
            .then_with(|| a.id.cmp(&b.id))
    });

    Ok(posts)
}

fn parse_date(raw: &str) -> Result<NaiveDateTime, String> {
    let trimmed = raw.trim();
    for format in DATE_TIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(datetime);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN));
    }
    Err(format!("unrecognized date '{trimmed}'"))
}

fn deserialize_date<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) => parse_date(&raw).map(Some).map_err(serde::de::Error::custom),
    }
}

/// Hexo-style front-matter allows `categories: foo` as well as a list.
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn deserialize_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(value)) => vec![value],
        Some(OneOrMany::Many(values)) => values,
    })
}
