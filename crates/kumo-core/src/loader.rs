//! URL loaders
//!
//! Loaders turn resolved URLs into source text. Failures are reported as
//! `LoadError` values that the analysis context converts into
//! `could-not-load` warnings; they never abort an analysis.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::urls::ResolvedUrl;

#[derive(Debug, Clone, thiserror::Error)]
pub enum LoadError {
    #[error("no loader can load {0}")]
    NotLoadable(ResolvedUrl),
    #[error("{url}: {message}")]
    Io { url: ResolvedUrl, message: String },
}

#[async_trait]
pub trait UrlLoader: Send + Sync {
    fn can_load(&self, url: &ResolvedUrl) -> bool;

    async fn load(&self, url: &ResolvedUrl) -> Result<String, LoadError>;

    /// Directory listing used for editor completions. Optional.
    async fn get_completions(&self, _dirname: &ResolvedUrl) -> Result<Vec<String>, LoadError> {
        Ok(Vec::new())
    }
}

/// Loads `file:` URLs from under a root directory. Paths that escape the
/// root are rejected before any filesystem access.
pub struct FsUrlLoader {
    root: PathBuf,
}

impl FsUrlLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn url_to_path(&self, url: &ResolvedUrl) -> Option<PathBuf> {
        if url.scheme() != "file" {
            return None;
        }
        if matches!(url.as_url().host_str(), Some(host) if !host.is_empty()) {
            return None;
        }
        let path = url.as_url().to_file_path().ok()?;
        if !contained_in(&path, &self.root) {
            return None;
        }
        Some(path)
    }
}

/// Lexical containment check; `..` segments are rejected outright so that a
/// symlinked parent cannot smuggle a path back inside.
fn contained_in(path: &Path, root: &Path) -> bool {
    if path.components().any(|c| matches!(c, Component::ParentDir)) {
        return false;
    }
    path.starts_with(root)
}

#[async_trait]
impl UrlLoader for FsUrlLoader {
    fn can_load(&self, url: &ResolvedUrl) -> bool {
        self.url_to_path(url).is_some()
    }

    async fn load(&self, url: &ResolvedUrl) -> Result<String, LoadError> {
        let path = self
            .url_to_path(url)
            .ok_or_else(|| LoadError::NotLoadable(url.clone()))?;
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| LoadError::Io {
                url: url.clone(),
                message: e.to_string(),
            })
    }

    async fn get_completions(&self, dirname: &ResolvedUrl) -> Result<Vec<String>, LoadError> {
        let path = self
            .url_to_path(dirname)
            .ok_or_else(|| LoadError::NotLoadable(dirname.clone()))?;
        let mut entries = tokio::fs::read_dir(&path).await.map_err(|e| LoadError::Io {
            url: dirname.clone(),
            message: e.to_string(),
        })?;
        let mut names = Vec::new();
        while let Ok(Some(entry)) = entries.next_entry().await.map_err(|e| LoadError::Io {
            url: dirname.clone(),
            message: e.to_string(),
        }) {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }
}

/// Serves documents from a URL-keyed map. Used by tests and by editors
/// feeding synthetic sources.
#[derive(Default)]
pub struct InMemoryUrlLoader {
    files: HashMap<ResolvedUrl, Arc<str>>,
}

impl InMemoryUrlLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, url: ResolvedUrl, contents: impl Into<Arc<str>>) {
        self.files.insert(url, contents.into());
    }
}

#[async_trait]
impl UrlLoader for InMemoryUrlLoader {
    fn can_load(&self, url: &ResolvedUrl) -> bool {
        self.files.contains_key(url)
    }

    async fn load(&self, url: &ResolvedUrl) -> Result<String, LoadError> {
        self.files
            .get(url)
            .map(|text| text.to_string())
            .ok_or_else(|| LoadError::NotLoadable(url.clone()))
    }
}

/// Layers mutable in-memory contents (e.g. unsaved editor buffers) over a
/// fallback loader.
pub struct OverlayUrlLoader {
    overlay: RwLock<HashMap<ResolvedUrl, Arc<str>>>,
    fallback: Arc<dyn UrlLoader>,
}

impl OverlayUrlLoader {
    pub fn new(fallback: Arc<dyn UrlLoader>) -> Self {
        Self {
            overlay: RwLock::new(HashMap::new()),
            fallback,
        }
    }

    pub async fn set(&self, url: ResolvedUrl, contents: impl Into<Arc<str>>) {
        self.overlay.write().await.insert(url, contents.into());
    }

    pub async fn clear(&self, url: &ResolvedUrl) {
        self.overlay.write().await.remove(url);
    }
}

#[async_trait]
impl UrlLoader for OverlayUrlLoader {
    fn can_load(&self, url: &ResolvedUrl) -> bool {
        // The overlay is consulted at load time; claim whatever the fallback
        // can load plus anything currently overlaid.
        self.fallback.can_load(url) || self.overlay.try_read().map_or(false, |o| o.contains_key(url))
    }

    async fn load(&self, url: &ResolvedUrl) -> Result<String, LoadError> {
        if let Some(text) = self.overlay.read().await.get(url) {
            return Ok(text.to_string());
        }
        self.fallback.load(url).await
    }

    async fn get_completions(&self, dirname: &ResolvedUrl) -> Result<Vec<String>, LoadError> {
        self.fallback.get_completions(dirname).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> ResolvedUrl {
        ResolvedUrl::parse(s).unwrap()
    }

    #[tokio::test]
    async fn fs_loader_reads_files_under_root() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.html");
        std::fs::write(&file, "<div></div>").unwrap();

        let loader = FsUrlLoader::new(dir.path());
        let file_url = ResolvedUrl::from_url(url::Url::from_file_path(&file).unwrap());
        assert!(loader.can_load(&file_url));
        assert_eq!(loader.load(&file_url).await.unwrap(), "<div></div>");
    }

    #[tokio::test]
    async fn fs_loader_rejects_foreign_scheme() {
        let dir = tempfile::tempdir().unwrap();
        let loader = FsUrlLoader::new(dir.path());
        assert!(!loader.can_load(&url("https://example.com/a.html")));
    }

    #[tokio::test]
    async fn fs_loader_rejects_escaping_paths() {
        let dir = tempfile::tempdir().unwrap();
        let loader = FsUrlLoader::new(dir.path().join("pkg"));
        let outside = ResolvedUrl::from_url(
            url::Url::from_file_path(dir.path().join("secret.txt")).unwrap(),
        );
        assert!(!loader.can_load(&outside));
        assert!(loader.load(&outside).await.is_err());
    }

    #[tokio::test]
    async fn fs_loader_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let loader = FsUrlLoader::new(dir.path());
        let missing =
            ResolvedUrl::from_url(url::Url::from_file_path(dir.path().join("no.html")).unwrap());
        assert!(matches!(
            loader.load(&missing).await,
            Err(LoadError::Io { .. })
        ));
    }

    #[tokio::test]
    async fn fs_loader_lists_completions() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.html"), "").unwrap();
        std::fs::write(dir.path().join("b.html"), "").unwrap();

        let loader = FsUrlLoader::new(dir.path());
        let dir_url = ResolvedUrl::from_url(url::Url::from_directory_path(dir.path()).unwrap());
        let names = loader.get_completions(&dir_url).await.unwrap();
        assert_eq!(names, vec!["a.html", "b.html"]);
    }

    #[tokio::test]
    async fn in_memory_loader_serves_added_files() {
        let mut loader = InMemoryUrlLoader::new();
        loader.add(url("file:///p/a.html"), "hello");
        assert!(loader.can_load(&url("file:///p/a.html")));
        assert_eq!(loader.load(&url("file:///p/a.html")).await.unwrap(), "hello");
        assert!(loader.load(&url("file:///p/b.html")).await.is_err());
    }

    #[tokio::test]
    async fn overlay_shadows_fallback() {
        let mut inner = InMemoryUrlLoader::new();
        inner.add(url("file:///p/a.html"), "disk");
        let overlay = OverlayUrlLoader::new(Arc::new(inner));

        assert_eq!(overlay.load(&url("file:///p/a.html")).await.unwrap(), "disk");

        overlay.set(url("file:///p/a.html"), "buffer").await;
        assert_eq!(
            overlay.load(&url("file:///p/a.html")).await.unwrap(),
            "buffer"
        );

        overlay.clear(&url("file:///p/a.html")).await;
        assert_eq!(overlay.load(&url("file:///p/a.html")).await.unwrap(), "disk");
    }
}
