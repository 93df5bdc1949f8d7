//! Gitignore-style exclusion rules.
//!
//! An [`IgnoreSpec`] holds the rules declared by one ignore file and
//! is scoped to the directory that declares it. The walker keeps the
//! specs of every ancestor directory in an [`IgnoreChain`]; a path is
//! excluded if any rule of any spec in the chain matches it.
//!
//! Pattern syntax is gitignore's, matched by the `ignore` crate.
//! Negation (`!`) lines are skipped: under "excluded if any rule
//! matches" nothing can be re-included.

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Rules declared by one ignore file, scoped to its directory
#[derive(Debug, Clone)]
pub struct IgnoreSpec {
    /// Declaring directory, relative to the walk root
    base: PathBuf,
    matcher: Gitignore,
}

impl Default for IgnoreSpec {
    fn default() -> Self {
        Self::empty(PathBuf::new())
    }
}

impl IgnoreSpec {
    /// Spec with no rules (include everything)
    pub fn empty(base: impl Into<PathBuf>) -> Self {
        Self {
            base: base.into(),
            matcher: Gitignore::empty(),
        }
    }

    /// Compile ignore-file text. Malformed lines are logged and
    /// skipped; the remaining rules still apply.
    pub fn parse(base: impl Into<PathBuf>, contents: &str) -> Self {
        let base = base.into();
        let mut builder = GitignoreBuilder::new(&base);

        for (lineno, line) in contents.lines().enumerate() {
            if line.starts_with('!') {
                tracing::debug!("Skipping unsupported negation rule: {}", line);
                continue;
            }
            if let Err(e) = builder.add_line(None, line) {
                tracing::warn!(
                    "Skipping malformed ignore pattern {:?} (line {} in {:?}): {}",
                    line,
                    lineno + 1,
                    base,
                    e
                );
            }
        }

        let matcher = builder.build().unwrap_or_else(|e| {
            tracing::warn!("Failed to compile ignore rules in {:?}: {}", base, e);
            Gitignore::empty()
        });

        Self { base, matcher }
    }

    /// Build a spec from a list of patterns
    pub fn from_patterns<S: AsRef<str>>(base: impl Into<PathBuf>, patterns: &[S]) -> Self {
        let text = patterns
            .iter()
            .map(|p| p.as_ref())
            .collect::<Vec<_>>()
            .join("\n");
        Self::parse(base, &text)
    }

    /// Load `file_name` from `dir`. A missing file yields an empty
    /// spec; an unreadable one is logged and treated as empty.
    pub fn load(dir: &Path, base: impl Into<PathBuf>, file_name: &str) -> Self {
        let base = base.into();
        let path = dir.join(file_name);

        match fs::read_to_string(&path) {
            Ok(contents) => {
                let spec = Self::parse(base, &contents);
                tracing::debug!("Loaded {} ignore rules from {:?}", spec.len(), path);
                spec
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Self::empty(base),
            Err(e) => {
                tracing::warn!("Failed to read ignore file {:?}: {}", path, e);
                Self::empty(base)
            }
        }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn len(&self) -> usize {
        self.matcher.num_ignores() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.matcher.is_empty()
    }

    /// Test a path relative to the walk root. Paths outside this
    /// spec's directory never match.
    pub fn matches(&self, path: &Path, is_dir: bool) -> bool {
        match path.strip_prefix(&self.base) {
            Ok(relative) if !relative.as_os_str().is_empty() => {}
            _ => return false,
        }
        // The matcher strips `base` itself
        self.matcher.matched(path, is_dir).is_ignore()
    }
}

/// Stack of ignore specs from the walk root down to the directory
/// currently being scanned.
///
/// Each frame records its scope: the depth of the entries it applies
/// to (one more than the depth of the directory declaring it).
/// Entering an entry at depth `d` pops every frame scoped deeper than
/// `d`, which releases the rules of a finished sibling subtree before
/// the next one is scanned.
#[derive(Debug, Clone, Default)]
pub struct IgnoreChain {
    frames: Vec<(usize, IgnoreSpec)>,
}

impl IgnoreChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a spec applying to entries at `scope` depth and below
    pub fn push(&mut self, scope: usize, spec: IgnoreSpec) {
        self.enter(scope);
        self.frames.push((scope, spec));
    }

    /// Keep only the frames of the ancestors of an entry at `depth`
    pub fn enter(&mut self, depth: usize) {
        while self.frames.last().is_some_and(|(scope, _)| *scope > depth) {
            self.frames.pop();
        }
    }

    /// Excluded if any rule of any spec in the chain matches
    pub fn is_ignored(&self, path: &Path, is_dir: bool) -> bool {
        self.frames
            .iter()
            .any(|(_, spec)| spec.matches(path, is_dir))
    }
}

/// Per-entry include/exclude decisions for a walk.
#[derive(Debug, Clone)]
pub struct PathFilter {
    /// Ignore file looked up in every directory (e.g. `.gitignore`)
    ignore_file_name: String,

    /// Rules applied at the root before any ignore file. Always
    /// excludes the ignore files themselves.
    builtin: IgnoreSpec,

    /// Extensions without the leading dot; empty accepts all
    allowed_extensions: Vec<String>,

    /// Skip entries whose name starts with '.'
    skip_hidden: bool,
}

impl PathFilter {
    pub fn new(
        ignore_file_name: impl Into<String>,
        builtin_patterns: &[String],
        allowed_extensions: &[String],
        skip_hidden: bool,
    ) -> Self {
        let ignore_file_name = ignore_file_name.into();
        let mut patterns = builtin_patterns.to_vec();
        patterns.push(ignore_file_name.clone());

        Self {
            ignore_file_name,
            builtin: IgnoreSpec::from_patterns(PathBuf::new(), &patterns),
            allowed_extensions: allowed_extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
            skip_hidden,
        }
    }

    pub fn ignore_file_name(&self) -> &str {
        &self.ignore_file_name
    }

    /// Root frame of the chain: built-in rules
    pub fn builtin_spec(&self) -> IgnoreSpec {
        self.builtin.clone()
    }

    /// Load the ignore file declared in `dir`
    pub fn load_spec(&self, dir: &Path, relative: &Path) -> IgnoreSpec {
        IgnoreSpec::load(dir, relative, &self.ignore_file_name)
    }

    /// Decide whether to descend into a directory
    pub fn includes_dir(&self, chain: &IgnoreChain, relative: &Path) -> bool {
        if self.skip_hidden && is_hidden(relative) {
            return false;
        }
        !chain.is_ignored(relative, true)
    }

    /// Decide whether a file is eligible for processing
    pub fn includes_file(&self, chain: &IgnoreChain, relative: &Path) -> bool {
        if self.skip_hidden && is_hidden(relative) {
            return false;
        }
        !chain.is_ignored(relative, false) && self.matches_extension(relative)
    }

    /// Check the extension allow-list
    pub fn matches_extension(&self, path: &Path) -> bool {
        if self.allowed_extensions.is_empty() {
            return true;
        }
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| {
                let e = e.to_ascii_lowercase();
                self.allowed_extensions.iter().any(|a| *a == e)
            })
            .unwrap_or(false)
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('.'))
        .unwrap_or(false)
}
