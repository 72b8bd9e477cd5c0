//! Commit-ancestry version gating for host checkouts.
//!
//! Each host application declares a supported revision window as a pair of
//! commit ids. Compatibility is decided by ancestry in the host's commit
//! graph, never by tag or lexical ordering: a checkout is too old when the
//! oldest supported commit is not among its ancestors, and too new when it
//! has moved past the latest known-supported commit.
//!
//! This module only classifies. Whether a violation aborts the run or is
//! waved through after a confirmation is the orchestrator's policy.

use std::path::Path;

use anyhow::{Context as _, Result};
use git2::{Oid, Repository};

use crate::logging::Log;

/// A supported revision window in a host repository's commit graph.
///
/// `latest` may be absent, meaning no declared upper bound for this check.
#[derive(Debug, Clone, Copy)]
pub struct VersionRange<'a> {
    /// Oldest supported commit id.
    pub oldest: &'a str,
    /// Latest known-supported commit id, if any.
    pub latest: Option<&'a str>,
}

impl<'a> VersionRange<'a> {
    /// Declare a range from its bounds.
    #[must_use]
    pub const fn new(oldest: &'a str, latest: Option<&'a str>) -> Self {
        Self { oldest, latest }
    }
}

/// Outcome of a host version check.
#[derive(Debug, Clone)]
pub enum CompatStatus {
    /// The host is not installed (repository path absent); nothing to check.
    Skipped,
    /// The host repository was inspected.
    Checked(CompatReport),
}

/// Classification of a host checkout against its supported range.
///
/// Both violation flags can be set at once and must then both be reported.
#[derive(Debug, Clone)]
pub struct CompatReport {
    /// Abbreviated id of the checkout's current commit.
    pub head: String,
    /// The oldest supported commit is not an ancestor of the checkout.
    pub too_old: bool,
    /// The checkout has moved past the latest known-supported commit.
    pub too_new: bool,
}

impl CompatReport {
    /// `true` when the checkout is inside the supported window.
    #[must_use]
    pub const fn is_compatible(&self) -> bool {
        !self.too_old && !self.too_new
    }
}

/// Classify the checkout at `repo_path` against `range`.
///
/// A missing `repo_path` yields [`CompatStatus::Skipped`]; the host simply
/// is not installed. An unresolvable `oldest` counts as not-an-ancestor
/// (too old); an unresolvable `latest` skips the upper-bound check with a
/// warning, since absence of information is not a violation.
///
/// # Errors
///
/// Returns an error if the directory exists but cannot be inspected as a
/// git repository (corrupt or not a checkout).
pub fn check(repo_path: &Path, range: &VersionRange<'_>, log: &dyn Log) -> Result<CompatStatus> {
    if !repo_path.exists() {
        return Ok(CompatStatus::Skipped);
    }

    let repo = Repository::open(repo_path)
        .with_context(|| format!("opening host repository {}", repo_path.display()))?;
    let head = repo
        .head()
        .and_then(|h| h.peel_to_commit())
        .with_context(|| format!("resolving HEAD in {}", repo_path.display()))?
        .id();

    let too_old = match resolve(&repo, range.oldest) {
        Some(oldest) => !is_ancestor(&repo, oldest, head)?,
        None => {
            log.debug(&format!(
                "oldest supported commit {} not present in {}",
                range.oldest,
                repo_path.display()
            ));
            true
        }
    };

    let too_new = match range.latest {
        None => false,
        Some(spec) => match resolve(&repo, spec) {
            Some(latest) => !is_ancestor(&repo, head, latest)?,
            None => {
                log.warn(&format!(
                    "latest supported commit {spec} not present in {}; skipping upper-bound check",
                    repo_path.display()
                ));
                false
            }
        },
    };

    Ok(CompatStatus::Checked(CompatReport {
        head: short_id(head),
        too_old,
        too_new,
    }))
}

/// Resolve `spec` to a commit id, or `None` if it is not present locally.
fn resolve(repo: &Repository, spec: &str) -> Option<Oid> {
    repo.revparse_single(spec)
        .ok()
        .and_then(|obj| obj.peel_to_commit().ok())
        .map(|commit| commit.id())
}

/// `true` when `ancestor` reaches `descendant` in the commit graph
/// (a commit counts as its own ancestor).
fn is_ancestor(repo: &Repository, ancestor: Oid, descendant: Oid) -> Result<bool> {
    if ancestor == descendant {
        return Ok(true);
    }
    repo.graph_descendant_of(descendant, ancestor)
        .context("walking commit graph")
}

fn short_id(oid: Oid) -> String {
    let full = oid.to_string();
    full.chars().take(12).collect()
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::logging::Logger;
    use git2::Signature;

    fn sig() -> Signature<'static> {
        Signature::now("test", "test@example.com").unwrap()
    }

    fn init_repo(dir: &Path) -> Repository {
        Repository::init(dir).unwrap()
    }

    /// Append a commit touching `file` to HEAD and return its id.
    fn commit(repo: &Repository, file: &str, content: &str, msg: &str) -> Oid {
        let workdir = repo.workdir().unwrap();
        std::fs::write(workdir.join(file), content).unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(Path::new(file)).unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let parent = repo
            .head()
            .ok()
            .and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<_> = parent.iter().collect();
        repo.commit(Some("HEAD"), &sig(), &sig(), msg, &tree, &parents)
            .unwrap()
    }

    /// Build a linear history a -> b -> c and return the three ids.
    fn linear_repo(dir: &Path) -> (Repository, Oid, Oid, Oid) {
        let repo = init_repo(dir);
        let a = commit(&repo, "f.txt", "a", "a");
        let b = commit(&repo, "f.txt", "b", "b");
        let c = commit(&repo, "f.txt", "c", "c");
        (repo, a, b, c)
    }

    #[test]
    fn missing_repo_path_is_skipped() {
        let log = Logger::new("test");
        let range = VersionRange::new("0000000000000000000000000000000000000000", None);
        let status = check(Path::new("/nonexistent/host"), &range, &log).unwrap();
        assert!(matches!(status, CompatStatus::Skipped));
    }

    #[test]
    fn head_inside_range_is_compatible() {
        let tmp = tempfile::tempdir().unwrap();
        let (_repo, a, _b, c) = linear_repo(tmp.path());
        let latest = c.to_string();
        let oldest = a.to_string();
        let range = VersionRange::new(&oldest, Some(&latest));
        let log = Logger::new("test");

        let status = check(tmp.path(), &range, &log).unwrap();
        let CompatStatus::Checked(report) = status else {
            panic!("expected a checked report");
        };
        assert!(report.is_compatible(), "{report:?}");
        assert!(!report.too_old);
        assert!(!report.too_new);
    }

    #[test]
    fn head_before_oldest_is_too_old() {
        let tmp = tempfile::tempdir().unwrap();
        let (repo, a, _b, c) = linear_repo(tmp.path());
        // Rewind the checkout to the first commit.
        repo.set_head_detached(a).unwrap();
        let oldest = c.to_string();
        let range = VersionRange::new(&oldest, None);
        let log = Logger::new("test");

        let status = check(tmp.path(), &range, &log).unwrap();
        let CompatStatus::Checked(report) = status else {
            panic!("expected a checked report");
        };
        assert!(report.too_old);
        assert!(!report.too_new);
    }

    #[test]
    fn head_past_latest_is_too_new() {
        let tmp = tempfile::tempdir().unwrap();
        let (_repo, a, b, _c) = linear_repo(tmp.path());
        let oldest = a.to_string();
        let latest = b.to_string();
        let range = VersionRange::new(&oldest, Some(&latest));
        let log = Logger::new("test");

        let status = check(tmp.path(), &range, &log).unwrap();
        let CompatStatus::Checked(report) = status else {
            panic!("expected a checked report");
        };
        assert!(!report.too_old);
        assert!(report.too_new);
    }

    #[test]
    fn head_equal_to_latest_is_compatible() {
        let tmp = tempfile::tempdir().unwrap();
        let (_repo, a, _b, c) = linear_repo(tmp.path());
        let oldest = a.to_string();
        let latest = c.to_string();
        let range = VersionRange::new(&oldest, Some(&latest));
        let log = Logger::new("test");

        let status = check(tmp.path(), &range, &log).unwrap();
        let CompatStatus::Checked(report) = status else {
            panic!("expected a checked report");
        };
        assert!(report.is_compatible());
    }

    #[test]
    fn unresolvable_latest_skips_upper_bound() {
        let tmp = tempfile::tempdir().unwrap();
        let (_repo, a, _b, _c) = linear_repo(tmp.path());
        let oldest = a.to_string();
        // A commit id that exists nowhere in this repository.
        let range = VersionRange::new(&oldest, Some("1234567890123456789012345678901234567890"));
        let log = Logger::new("test");

        let status = check(tmp.path(), &range, &log).unwrap();
        let CompatStatus::Checked(report) = status else {
            panic!("expected a checked report");
        };
        assert!(!report.too_new, "absent upper bound must not be a violation");
        assert!(report.is_compatible());
    }

    #[test]
    fn both_violations_reported_together() {
        let tmp = tempfile::tempdir().unwrap();
        let (_repo, a, _b, _c) = linear_repo(tmp.path());
        let latest = a.to_string();
        // Unresolvable oldest counts as not-an-ancestor; HEAD (c) has also
        // moved past latest (a).
        let range = VersionRange::new("1234567890123456789012345678901234567890", Some(&latest));
        let log = Logger::new("test");

        let status = check(tmp.path(), &range, &log).unwrap();
        let CompatStatus::Checked(report) = status else {
            panic!("expected a checked report");
        };
        assert!(report.too_old);
        assert!(report.too_new);
    }

    #[test]
    fn report_carries_abbreviated_head() {
        let tmp = tempfile::tempdir().unwrap();
        let (_repo, a, _b, c) = linear_repo(tmp.path());
        let oldest = a.to_string();
        let range = VersionRange::new(&oldest, None);
        let log = Logger::new("test");

        let status = check(tmp.path(), &range, &log).unwrap();
        let CompatStatus::Checked(report) = status else {
            panic!("expected a checked report");
        };
        assert_eq!(report.head.len(), 12);
        assert!(c.to_string().starts_with(&report.head));
    }
}
