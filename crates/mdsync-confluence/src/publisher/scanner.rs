//! Documentation tree discovery.
//!
//! The scanner walks the docs directory once, before anything is published,
//! and produces an ordered list of [`ScanEntry`] values: each directory is
//! announced as a [`Namespace`] before its files and subdirectories. Bodies
//! are not read at this stage.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use glob::Pattern;
use mdsync_config::{PublishConfig, UnsupportedFiles};
use tracing::{debug, warn};

use super::error::PublishError;

/// Stem of the file that publishes onto its directory's page.
const INDEX_STEM: &str = "index";

/// Page standing for a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    /// Page title.
    pub title: String,
    /// Titles of enclosing namespaces, root-most first.
    pub ancestors: Vec<String>,
}

impl Namespace {
    /// Ancestor titles followed by this namespace's own title.
    pub fn chain(&self) -> impl Iterator<Item = &str> {
        self.ancestors
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.title.as_str()))
    }

    fn child(&self, title: String) -> Self {
        Self {
            title,
            ancestors: self.chain().map(str::to_owned).collect(),
        }
    }
}

/// A publishable document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentNode {
    /// Absolute (or root-joined) file path.
    pub path: PathBuf,
    /// Path relative to the docs directory.
    pub relative_path: PathBuf,
    /// Enclosing namespace, if any.
    pub namespace: Option<Namespace>,
    /// Page title.
    pub title: String,
    /// Relative path of an earlier document that already claimed `title`.
    pub duplicate_of: Option<PathBuf>,
}

impl DocumentNode {
    /// Read the markdown body.
    pub fn read_body(&self) -> Result<String, PublishError> {
        fs::read_to_string(&self.path).map_err(|source| PublishError::LocalIo {
            path: self.path.clone(),
            source,
        })
    }

    /// Directory that relative asset paths resolve against.
    pub fn directory(&self) -> &Path {
        self.path.parent().unwrap_or(Path::new("."))
    }

    /// Whether this document is its namespace's index page.
    pub fn is_index(&self) -> bool {
        self.namespace
            .as_ref()
            .is_some_and(|ns| ns.title == self.title)
    }
}

/// Item produced by a scan, in publish order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEntry {
    /// A directory is entered.
    Namespace(Namespace),
    /// A document inside the most recently entered directory.
    Document(DocumentNode),
}

/// Result of scanning a docs tree.
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Namespaces and documents in publish order.
    pub entries: Vec<ScanEntry>,
    /// Unsupported files skipped in lenient mode and unreadable directories.
    pub skipped: Vec<PathBuf>,
    /// Document titles seen so far, with the document that claimed each.
    claimed: HashMap<String, PathBuf>,
    /// Canonical directories already walked, for symlink cycles.
    visited: HashSet<PathBuf>,
}

impl ScanResult {
    /// Documents only, in publish order.
    pub fn documents(&self) -> impl Iterator<Item = &DocumentNode> {
        self.entries.iter().filter_map(|entry| match entry {
            ScanEntry::Document(doc) => Some(doc),
            ScanEntry::Namespace(_) => None,
        })
    }
}

/// Walks a docs directory according to the publish configuration.
pub struct Scanner<'a> {
    config: &'a PublishConfig,
    ignore: Vec<Pattern>,
}

impl<'a> Scanner<'a> {
    /// Create a scanner. Ignore patterns are validated with the configuration.
    pub fn new(config: &'a PublishConfig) -> Self {
        let ignore = config
            .ignore
            .iter()
            .filter_map(|p| Pattern::new(p).ok())
            .collect();
        Self { config, ignore }
    }

    /// Scan the tree rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::LocalIo`] if `root` cannot be read and
    /// [`PublishError::UnsupportedDocument`] for the first unsupported file
    /// in strict mode.
    pub fn scan(&self, root: &Path) -> Result<ScanResult, PublishError> {
        let mut result = ScanResult::default();

        let root_namespace = self.config.parent_page.as_ref().map(|title| Namespace {
            title: title.clone(),
            ancestors: Vec::new(),
        });
        if let Some(ns) = &root_namespace {
            result.entries.push(ScanEntry::Namespace(ns.clone()));
        }

        let entries = read_sorted(root).map_err(|source| PublishError::LocalIo {
            path: root.to_path_buf(),
            source,
        })?;
        if let Ok(canonical) = root.canonicalize() {
            result.visited.insert(canonical);
        }
        self.scan_entries(root, entries, root_namespace.as_ref(), &mut result)?;
        Ok(result)
    }

    fn scan_directory(
        &self,
        root: &Path,
        dir: &Path,
        namespace: &Namespace,
        result: &mut ScanResult,
    ) -> Result<(), PublishError> {
        if let Ok(canonical) = dir.canonicalize()
            && !result.visited.insert(canonical)
        {
            warn!("Skipping {}: directory already scanned", dir.display());
            result.skipped.push(dir.to_path_buf());
            return Ok(());
        }
        match read_sorted(dir) {
            Ok(entries) => self.scan_entries(root, entries, Some(namespace), result),
            Err(e) => {
                warn!("Skipping unreadable directory {}: {}", dir.display(), e);
                result.skipped.push(dir.to_path_buf());
                Ok(())
            }
        }
    }

    fn scan_entries(
        &self,
        root: &Path,
        entries: Vec<(PathBuf, bool)>,
        namespace: Option<&Namespace>,
        result: &mut ScanResult,
    ) -> Result<(), PublishError> {
        let (dirs, files): (Vec<_>, Vec<_>) = entries.into_iter().partition(|(_, is_dir)| *is_dir);

        for (path, _) in files {
            let name = file_name(&path);
            if self.ignore.iter().any(|p| p.matches(&name)) {
                debug!("Ignoring {}", path.display());
                continue;
            }
            if !self.is_document(&path) {
                match self.config.unsupported_files {
                    UnsupportedFiles::Strict => {
                        return Err(PublishError::UnsupportedDocument { path });
                    }
                    UnsupportedFiles::Lenient => {
                        warn!("Skipping unsupported file {}", path.display());
                        result.skipped.push(path);
                        continue;
                    }
                }
            }

            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let title = match namespace {
                Some(ns) if stem.eq_ignore_ascii_case(INDEX_STEM) => ns.title.clone(),
                _ => self.title_for(&stem),
            };
            let relative_path = path.strip_prefix(root).unwrap_or(&path).to_path_buf();
            let duplicate_of = result.claimed.get(&title).cloned();
            if let Some(first) = &duplicate_of {
                warn!(
                    "{} has the same title '{}' as {}",
                    relative_path.display(),
                    title,
                    first.display()
                );
            } else {
                result.claimed.insert(title.clone(), relative_path.clone());
            }
            result.entries.push(ScanEntry::Document(DocumentNode {
                path,
                relative_path,
                namespace: namespace.cloned(),
                title,
                duplicate_of,
            }));
        }

        for (path, _) in dirs {
            let title = self.title_for(&file_name(&path));
            let child = match namespace {
                Some(parent) => parent.child(title),
                None => Namespace {
                    title,
                    ancestors: Vec::new(),
                },
            };
            result.entries.push(ScanEntry::Namespace(child.clone()));
            self.scan_directory(root, &path, &child, result)?;
        }

        Ok(())
    }

    fn is_document(&self, path: &Path) -> bool {
        path.extension().is_some_and(|ext| {
            let ext = ext.to_string_lossy();
            self.config
                .extensions
                .iter()
                .any(|e| e.trim_start_matches('.').eq_ignore_ascii_case(&ext))
        })
    }

    fn title_for(&self, name: &str) -> String {
        format!(
            "{}{}",
            self.config.title_prefix,
            self.config.title_case.apply(name)
        )
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Non-hidden directory entries sorted by name, with a directory flag.
///
/// Symlinks are followed. Entries whose target cannot be read (dangling
/// links) are left out.
fn read_sorted(dir: &Path) -> std::io::Result<Vec<(PathBuf, bool)>> {
    let mut entries: Vec<_> = fs::read_dir(dir)?
        .filter_map(Result::ok)
        .filter(|e| !e.file_name().to_string_lossy().starts_with('.'))
        .filter_map(|e| {
            let path = e.path();
            match fs::metadata(&path) {
                Ok(meta) => Some((path, meta.is_dir())),
                Err(err) => {
                    debug!("Skipping {}: {}", path.display(), err);
                    None
                }
            }
        })
        .collect();
    entries.sort_by(|a, b| a.0.file_name().cmp(&b.0.file_name()));
    Ok(entries)
}
