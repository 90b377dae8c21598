//! URL model and package-aware resolution
//!
//! Three URL flavors move through the analyzer and are deliberately not
//! interchangeable: `PackageRelativeUrl` (as authored in an import),
//! `FileRelativeUrl` (relative to a specific resolved document), and
//! `ResolvedUrl` (absolute, loadable). The `PackageUrlResolver` converts
//! between them and redirects imports that escape the package root by one
//! level into the configured components directory.

use std::fmt;
use std::path::{Path, PathBuf};

use url::Url;

pub const DEFAULT_COMPONENT_DIR: &str = "bower_components";

/// Characters that make an authored URL unparseable rather than encodable.
const FORBIDDEN_URL_CHARS: &[char] = &['<', '>', '{', '}', '|', '\\', '^', '`', '"'];

/// A URL as authored in an import, relative to the package root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageRelativeUrl(String);

impl PackageRelativeUrl {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PackageRelativeUrl {
    fn from(url: &str) -> Self {
        Self(url.to_string())
    }
}

impl fmt::Display for PackageRelativeUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A URL relative to a specific resolved document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileRelativeUrl(String);

impl FileRelativeUrl {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FileRelativeUrl {
    fn from(url: &str) -> Self {
        Self(url.to_string())
    }
}

impl fmt::Display for FileRelativeUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An absolute URL usable with a loader.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedUrl(Url);

impl ResolvedUrl {
    pub fn parse(input: &str) -> Result<Self, url::ParseError> {
        Url::parse(input).map(Self)
    }

    pub fn from_url(url: Url) -> Self {
        Self(url)
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn scheme(&self) -> &str {
        self.0.scheme()
    }

    pub fn path(&self) -> &str {
        self.0.path()
    }

    /// URL for an inline document embedded in this one, e.g.
    /// `file:///p/a.html#inline-script-2`.
    pub fn inline(&self, tag: &str, ordinal: usize) -> ResolvedUrl {
        let mut inner = self.0.clone();
        inner.set_fragment(Some(&format!("inline-{tag}-{ordinal}")));
        Self(inner)
    }
}

impl fmt::Display for ResolvedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl serde::Serialize for ResolvedUrl {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.0.as_str())
    }
}

#[derive(Debug, Clone, Default)]
pub struct PackageUrlResolverOptions {
    /// Filesystem directory of the package root. Defaults to the current
    /// directory when unset.
    pub package_dir: Option<PathBuf>,
    /// Sibling directory out-of-package imports are redirected into.
    pub component_dir: Option<String>,
    /// Hostname treated as referring to this package.
    pub host: Option<String>,
}

/// Resolves authored URLs against a package root.
#[derive(Debug, Clone)]
pub struct PackageUrlResolver {
    package_url: Url,
    component_dir: String,
    host: Option<String>,
}

impl PackageUrlResolver {
    pub fn new(options: PackageUrlResolverOptions) -> Self {
        let dir = options
            .package_dir
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("/"));
        let package_url = Url::from_directory_path(absolutize(&dir))
            .unwrap_or_else(|_| Url::parse("file:///").expect("literal url"));
        Self {
            package_url,
            component_dir: options
                .component_dir
                .unwrap_or_else(|| DEFAULT_COMPONENT_DIR.to_string()),
            host: options.host,
        }
    }

    pub fn package_url(&self) -> ResolvedUrl {
        ResolvedUrl(self.package_url.clone())
    }

    pub fn component_dir(&self) -> &str {
        &self.component_dir
    }

    /// Resolve a package-relative URL against the package root.
    pub fn resolve(&self, url: &PackageRelativeUrl) -> Option<ResolvedUrl> {
        let base = self.package_url.clone();
        self.resolve_impl(url.as_str(), &base)
    }

    /// Resolve a file-relative URL against the document it was authored in.
    pub fn resolve_from(&self, url: &FileRelativeUrl, base: &ResolvedUrl) -> Option<ResolvedUrl> {
        self.resolve_impl(url.as_str(), base.as_url())
    }

    fn resolve_impl(&self, input: &str, base: &Url) -> Option<ResolvedUrl> {
        if input.contains(FORBIDDEN_URL_CHARS) {
            return None;
        }

        // Absolute URLs with a foreign scheme or host pass through unchanged.
        if let Ok(absolute) = Url::parse(input) {
            if absolute.cannot_be_a_base() {
                return None;
            }
            let matches_package_host = match (absolute.host_str(), self.host.as_deref()) {
                (Some(h), Some(configured)) => h == configured,
                _ => false,
            };
            if !matches_package_host {
                return Some(ResolvedUrl(absolute));
            }
            // A URL naming the package host is really package-root-relative.
            let path = absolute.path().trim_start_matches('/').to_string();
            let rebased = self.package_url.join(&path).ok()?;
            return Some(self.contain(rebased));
        }

        // A leading `/` is package-root absolute.
        let joined = if let Some(rooted) = input.strip_prefix('/') {
            self.package_url.join(rooted).ok()?
        } else {
            base.join(input).ok()?
        };

        Some(self.contain(joined))
    }

    /// Keep a joined URL inside the package where possible: a URL resolving
    /// to the package root's immediate parent is redirected into the
    /// components directory; anything further up is left alone.
    fn contain(&self, joined: Url) -> ResolvedUrl {
        if joined.scheme() != self.package_url.scheme()
            || joined.host_str() != self.package_url.host_str()
        {
            return ResolvedUrl(joined);
        }

        let package_path = self.package_url.path();
        let path = joined.path().to_string();
        if path.starts_with(package_path) {
            return ResolvedUrl(joined);
        }

        let parent = parent_dir(package_path);
        if path.starts_with(&parent) {
            let rest = &path[parent.len()..];
            let redirected = format!("{package_path}{}/{rest}", self.component_dir);
            let mut contained = joined.clone();
            contained.set_path(&redirected);
            return ResolvedUrl(contained);
        }

        ResolvedUrl(joined)
    }

    /// Compute a file-relative URL from one resolved URL to another. Pure
    /// string transform; `to` passes through unchanged when it lives under a
    /// different scheme, host, or authority.
    pub fn relative(&self, from: &ResolvedUrl, to: &ResolvedUrl) -> FileRelativeUrl {
        let (f, t) = (from.as_url(), to.as_url());
        if f.scheme() != t.scheme()
            || f.host_str() != t.host_str()
            || f.port() != t.port()
            || f.username() != t.username()
            || f.password() != t.password()
        {
            return FileRelativeUrl(t.as_str().to_string());
        }

        let from_dir = parent_dir(f.path());
        let mut rel = path_relative(&from_dir, t.path());
        if rel.is_empty() {
            rel = file_name(t.path()).to_string();
        }
        if t.path().ends_with('/') && !rel.ends_with('/') {
            rel.push('/');
        }
        if let Some(query) = t.query() {
            rel.push('?');
            rel.push_str(query);
        }
        if let Some(fragment) = t.fragment() {
            rel.push('#');
            rel.push_str(fragment);
        }
        FileRelativeUrl(rel)
    }
}

impl Default for PackageUrlResolver {
    fn default() -> Self {
        Self::new(PackageUrlResolverOptions::default())
    }
}

fn absolutize(dir: &Path) -> PathBuf {
    if dir.is_absolute() {
        dir.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(dir))
            .unwrap_or_else(|_| dir.to_path_buf())
    }
}

/// Directory portion of a URL path, always `/`-terminated.
fn parent_dir(path: &str) -> String {
    match path.trim_end_matches('/').rfind('/') {
        Some(idx) => path[..=idx].to_string(),
        None => "/".to_string(),
    }
}

fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// POSIX path-relative computation between a `/`-terminated directory and a
/// target path under the same root.
fn path_relative(from_dir: &str, to_path: &str) -> String {
    let from_segs: Vec<&str> = from_dir.split('/').filter(|s| !s.is_empty()).collect();
    let to_segs: Vec<&str> = to_path.split('/').filter(|s| !s.is_empty()).collect();

    let common = from_segs
        .iter()
        .zip(to_segs.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut out: Vec<String> = Vec::new();
    for _ in common..from_segs.len() {
        out.push("..".to_string());
    }
    for seg in &to_segs[common..] {
        out.push((*seg).to_string());
    }
    out.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver_at(dir: &str) -> PackageUrlResolver {
        PackageUrlResolver::new(PackageUrlResolverOptions {
            package_dir: Some(PathBuf::from(dir)),
            ..Default::default()
        })
    }

    #[test]
    fn resolves_simple_package_relative() {
        let r = resolver_at("/1/2");
        let resolved = r.resolve(&"foo/foo.html".into()).unwrap();
        assert_eq!(resolved.as_str(), "file:///1/2/foo/foo.html");
    }

    #[test]
    fn resolves_dot_slash() {
        let r = resolver_at("/1/2");
        let resolved = r.resolve(&"./foo.html".into()).unwrap();
        assert_eq!(resolved.as_str(), "file:///1/2/foo.html");
    }

    #[test]
    fn unparseable_url_is_none() {
        let r = resolver_at("/1/2");
        assert!(r.resolve(&"%><><%=".into()).is_none());
    }

    #[test]
    fn encodes_spaces() {
        let r = resolver_at("/1/2");
        let resolved = r.resolve(&"spaced name.html".into()).unwrap();
        assert_eq!(resolved.as_str(), "file:///1/2/spaced%20name.html");
    }

    #[test]
    fn one_level_escape_redirects_into_component_dir() {
        let r = resolver_at("/1/2");
        let base = ResolvedUrl::parse("file:///1/2/").unwrap();
        let resolved = r.resolve_from(&"../foo/foo.html".into(), &base).unwrap();
        assert_eq!(
            resolved.as_str(),
            "file:///1/2/bower_components/foo/foo.html"
        );
    }

    #[test]
    fn two_level_escape_stays_external() {
        let r = resolver_at("/1/2");
        let base = ResolvedUrl::parse("file:///1/2/").unwrap();
        let resolved = r.resolve_from(&"../../foo/foo.html".into(), &base).unwrap();
        assert_eq!(resolved.as_str(), "file:///foo/foo.html");
    }

    #[test]
    fn redirect_applies_from_nested_document() {
        let r = resolver_at("/1/2");
        let base = ResolvedUrl::parse("file:///1/2/sub/doc.html").unwrap();
        let resolved = r
            .resolve_from(&"../../polymer/polymer.html".into(), &base)
            .unwrap();
        assert_eq!(
            resolved.as_str(),
            "file:///1/2/bower_components/polymer/polymer.html"
        );
    }

    #[test]
    fn foreign_scheme_passes_through() {
        let r = resolver_at("/1/2");
        let resolved = r.resolve(&"https://cdn.example.com/x.js".into()).unwrap();
        assert_eq!(resolved.as_str(), "https://cdn.example.com/x.js");
    }

    #[test]
    fn leading_slash_is_package_root_absolute() {
        let r = resolver_at("/1/2");
        let resolved = r.resolve(&"/app/app.html".into()).unwrap();
        assert_eq!(resolved.as_str(), "file:///1/2/app/app.html");
    }

    #[test]
    fn fragment_only_url_keeps_base_path() {
        let r = resolver_at("/1/2");
        let base = ResolvedUrl::parse("file:///1/2/a.html?q=1").unwrap();
        let resolved = r.resolve_from(&"#frag".into(), &base).unwrap();
        assert_eq!(resolved.as_str(), "file:///1/2/a.html?q=1#frag");
    }

    #[test]
    fn query_only_url_replaces_query() {
        let r = resolver_at("/1/2");
        let base = ResolvedUrl::parse("file:///1/2/a.html?old=1").unwrap();
        let resolved = r.resolve_from(&"?new=2".into(), &base).unwrap();
        assert_eq!(resolved.as_str(), "file:///1/2/a.html?new=2");
    }

    #[test]
    fn relative_between_siblings() {
        let r = resolver_at("/1/2");
        let from = ResolvedUrl::parse("file:///1/2/a.html").unwrap();
        let to = ResolvedUrl::parse("file:///1/2/b.html").unwrap();
        assert_eq!(r.relative(&from, &to).as_str(), "b.html");
    }

    #[test]
    fn relative_walks_up() {
        let r = resolver_at("/1/2");
        let from = ResolvedUrl::parse("file:///1/2/deep/nested/a.html").unwrap();
        let to = ResolvedUrl::parse("file:///1/2/b.html").unwrap();
        assert_eq!(r.relative(&from, &to).as_str(), "../../b.html");
    }

    #[test]
    fn relative_preserves_trailing_slash() {
        let r = resolver_at("/1/2");
        let from = ResolvedUrl::parse("file:///1/2/a.html").unwrap();
        let to = ResolvedUrl::parse("file:///1/2/dir/").unwrap();
        assert_eq!(r.relative(&from, &to).as_str(), "dir/");
    }

    #[test]
    fn relative_to_foreign_host_passes_through() {
        let r = resolver_at("/1/2");
        let from = ResolvedUrl::parse("file:///1/2/a.html").unwrap();
        let to = ResolvedUrl::parse("https://example.com/b.html").unwrap();
        assert_eq!(r.relative(&from, &to).as_str(), "https://example.com/b.html");
    }

    #[test]
    fn relative_is_right_inverse_of_resolve() {
        let r = resolver_at("/1/2");
        let cases = [
            ("file:///1/2/a.html", "file:///1/2/b.html"),
            ("file:///1/2/x/a.html", "file:///1/2/y/z/b.html"),
            ("file:///1/2/a.html", "file:///1/2/a.html"),
            ("file:///1/2/a.html", "file:///1/2/c.html?q=1#f"),
        ];
        for (from, to) in cases {
            let from = ResolvedUrl::parse(from).unwrap();
            let to = ResolvedUrl::parse(to).unwrap();
            let rel = r.relative(&from, &to);
            let round = r.resolve_from(&rel, &from).unwrap();
            assert_eq!(round, to, "round-trip failed for {rel}");
        }
    }

    #[test]
    fn inline_url_carries_tag_and_ordinal() {
        let url = ResolvedUrl::parse("file:///p/a.html").unwrap();
        assert_eq!(
            url.inline("script", 2).as_str(),
            "file:///p/a.html#inline-script-2"
        );
    }
}
