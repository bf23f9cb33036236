//! Git repository analysis.
//!
//! Lists the tracked files of a local repository, picks out the ones that
//! look like API definitions (OpenAPI or Swagger documents) or route tables,
//! and reports the active branch and the most recent commits. All git access
//! goes through the `git` binary.

use std::path::{Path, PathBuf};
use std::process::Output;

use serde::Serialize;
use serde_yaml::Value;
use tracing::debug;

use super::{CollaboratorError, CollaboratorErrorKind};

/// How many commits `recent_commits` holds at most.
pub const RECENT_COMMITS: usize = 5;

const MAX_MESSAGE_CHARS: usize = 100;
const DEFINITION_MARKERS: [&str; 2] = ["openapi", "swagger"];
const ROUTE_MARKERS: [&str; 2] = ["routes", "endpoints"];
const DOCUMENT_EXTENSIONS: [&str; 3] = ["json", "yaml", "yml"];

/// Analysis parameters.
#[derive(Debug, Clone, Default)]
pub struct RepoAnalysisRequest {
    /// Repository to analyze. Defaults to the current directory.
    pub repo_path: Option<PathBuf>,
}

/// What an API-related file appears to contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiFileKind {
    /// An OpenAPI or Swagger document.
    Definition,
    /// Source code declaring routes or endpoints.
    Routes,
}

/// A tracked file that relates to an API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiFile {
    /// Path relative to the repository root.
    pub path: String,
    pub kind: ApiFileKind,
    /// `info.title` of a readable definition document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// `info.version` of a readable definition document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// First `servers[].url` of a readable definition document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
}

impl ApiFile {
    /// File name without directories or extension.
    pub fn stem(&self) -> &str {
        Path::new(&self.path)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitSummary {
    /// First eight characters of the commit hash.
    pub sha: String,
    pub author: String,
    /// Committer date, ISO 8601.
    pub date: String,
    /// Subject line, cut to 100 characters.
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoAnalysis {
    pub repository: PathBuf,
    /// Branch name, `detached at <sha>`, or `unknown` when HEAD cannot be read.
    pub branch: String,
    pub file_count: usize,
    pub commit_count: usize,
    pub api_files: Vec<ApiFile>,
    /// Newest first.
    pub recent_commits: Vec<CommitSummary>,
}

impl RepoAnalysis {
    /// Files classified as API definition documents.
    pub fn definitions(&self) -> impl Iterator<Item = &ApiFile> {
        self.api_files
            .iter()
            .filter(|f| f.kind == ApiFileKind::Definition)
    }
}

/// Inspects a local git repository for API sources.
#[derive(Debug, Default, Clone, Copy)]
pub struct RepositoryAnalyzer;

impl RepositoryAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Analyze the repository at `request.repo_path`.
    ///
    /// A missing path or a directory outside any work tree is a validation
    /// error. A missing `git` binary is reported as unsupported. An empty
    /// history is not an error.
    pub fn analyze(&self, request: &RepoAnalysisRequest) -> Result<RepoAnalysis, CollaboratorError> {
        let path = request
            .repo_path
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));

        if !path.is_dir() {
            return Err(CollaboratorError::validation(format!(
                "repository path does not exist: {}",
                path.display()
            )));
        }

        let toplevel = git(&path, &["rev-parse", "--show-toplevel"])?;
        if !toplevel.status.success() {
            return Err(CollaboratorError::validation(format!(
                "not a git repository: {}",
                path.display()
            )));
        }
        let root = PathBuf::from(stdout_of(&toplevel).trim());

        let listing = git(&root, &["ls-files", "-z"])?;
        if !listing.status.success() {
            return Err(CollaboratorError::new(
                CollaboratorErrorKind::Parse,
                format!(
                    "git ls-files failed: {}",
                    String::from_utf8_lossy(&listing.stderr).trim()
                ),
            ));
        }
        let tracked = stdout_of(&listing);
        let files: Vec<&str> = tracked.split('\0').filter(|f| !f.is_empty()).collect();

        let api_files = files
            .iter()
            .filter_map(|file| classify(file).map(|kind| read_api_file(&root, file, kind)))
            .collect();

        Ok(RepoAnalysis {
            branch: active_branch(&root)?,
            file_count: files.len(),
            commit_count: commit_count(&root)?,
            recent_commits: recent_commits(&root)?,
            repository: root,
            api_files,
        })
    }
}

fn git(dir: &Path, args: &[&str]) -> Result<Output, CollaboratorError> {
    std::process::Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .map_err(|e| {
            CollaboratorError::new(
                CollaboratorErrorKind::Unsupported,
                format!("could not run git: {}", e),
            )
        })
}

fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn active_branch(root: &Path) -> Result<String, CollaboratorError> {
    let symbolic = git(root, &["symbolic-ref", "--short", "-q", "HEAD"])?;
    if symbolic.status.success() {
        return Ok(stdout_of(&symbolic).trim().to_string());
    }

    let head = git(root, &["rev-parse", "--short=8", "HEAD"])?;
    if head.status.success() {
        Ok(format!("detached at {}", stdout_of(&head).trim()))
    } else {
        Ok("unknown".to_string())
    }
}

fn commit_count(root: &Path) -> Result<usize, CollaboratorError> {
    let output = git(root, &["rev-list", "--count", "HEAD"])?;
    if !output.status.success() {
        return Ok(0);
    }
    Ok(stdout_of(&output).trim().parse().unwrap_or(0))
}

fn recent_commits(root: &Path) -> Result<Vec<CommitSummary>, CollaboratorError> {
    let limit = format!("--max-count={}", RECENT_COMMITS);
    let output = git(root, &["log", &limit, "--format=%H%x1f%an%x1f%cI%x1f%s"])?;
    if !output.status.success() {
        debug!("no commits in {}", root.display());
        return Ok(Vec::new());
    }

    Ok(stdout_of(&output).lines().filter_map(parse_commit).collect())
}

fn parse_commit(line: &str) -> Option<CommitSummary> {
    let mut fields = line.split('\u{1f}');
    let sha = fields.next()?;
    let author = fields.next()?;
    let date = fields.next()?;
    let message = fields.next().unwrap_or_default();
    Some(CommitSummary {
        sha: sha.chars().take(8).collect(),
        author: author.to_string(),
        date: date.to_string(),
        message: message.trim().chars().take(MAX_MESSAGE_CHARS).collect(),
    })
}

/// Classify a tracked path by its file name.
fn classify(path: &str) -> Option<ApiFileKind> {
    let name = Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path)
        .to_lowercase();

    if DEFINITION_MARKERS.iter().any(|m| name.contains(m)) {
        Some(ApiFileKind::Definition)
    } else if ROUTE_MARKERS.iter().any(|m| name.contains(m)) {
        Some(ApiFileKind::Routes)
    } else {
        None
    }
}

fn read_api_file(root: &Path, path: &str, kind: ApiFileKind) -> ApiFile {
    let mut file = ApiFile {
        path: path.to_string(),
        kind,
        title: None,
        version: None,
        server: None,
    };
    if kind != ApiFileKind::Definition || !is_document(path) {
        return file;
    }

    // JSON documents parse as YAML too.
    let document = std::fs::read_to_string(root.join(path))
        .ok()
        .and_then(|content| serde_yaml::from_str::<Value>(&content).ok());
    match document {
        Some(document) => {
            file.title = scalar(&document["info"]["title"]);
            file.version = scalar(&document["info"]["version"]);
            file.server = scalar(&document["servers"][0]["url"]);
        }
        None => debug!("{} is not a readable definition", path),
    }
    file
}

fn is_document(path: &str) -> bool {
    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| DOCUMENT_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
