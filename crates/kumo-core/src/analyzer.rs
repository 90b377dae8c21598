//! Public analysis API
//!
//! `Analyzer` is the entry point: it resolves a package-relative URL,
//! loads, parses, and scans it and everything it transitively imports, then
//! resolves the scanned documents into a queryable `Analysis`. Analyses are
//! immutable snapshots; `files_changed` invalidates the shared scan cache
//! for subsequent calls.

use std::path::Path;
use std::sync::Arc;

use crate::context::AnalysisContext;
use crate::document::{DocumentGraph, DocumentRef};
use crate::features::{DocumentId, Feature, FeatureId};
use crate::loader::{FsUrlLoader, UrlLoader};
use crate::urls::{PackageRelativeUrl, PackageUrlResolver, PackageUrlResolverOptions, ResolvedUrl};
use crate::warnings::Warning;

#[derive(Debug, thiserror::Error)]
pub enum AnalyzerError {
    #[error("could not resolve entry URL '{0}'")]
    UnresolvableUrl(PackageRelativeUrl),
}

pub struct AnalyzerOptions {
    pub loader: Arc<dyn UrlLoader>,
    pub url_resolver: PackageUrlResolver,
}

pub struct Analyzer {
    context: Arc<AnalysisContext>,
}

impl Analyzer {
    pub fn new(options: AnalyzerOptions) -> Self {
        Self {
            context: Arc::new(AnalysisContext::new(options.url_resolver, options.loader)),
        }
    }

    /// An analyzer over a package rooted at a filesystem directory.
    pub fn for_package_root(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self::new(AnalyzerOptions {
            loader: Arc::new(FsUrlLoader::new(root)),
            url_resolver: PackageUrlResolver::new(PackageUrlResolverOptions {
                package_dir: Some(root.to_path_buf()),
                ..Default::default()
            }),
        })
    }

    /// Analyze a package-relative URL and everything it reaches.
    pub async fn analyze(&self, url: &PackageRelativeUrl) -> Result<Analysis, AnalyzerError> {
        let entry = self
            .context
            .url_resolver
            .resolve(url)
            .ok_or_else(|| AnalyzerError::UnresolvableUrl(url.clone()))?;
        tracing::debug!(entry = %entry, "starting analysis");

        let (graph, order) = AnalysisContext::analyze(&self.context, &entry).await;
        let entry_id = order.first().copied().expect("entry document allocated");
        Ok(Analysis {
            graph,
            order,
            entry: entry_id,
        })
    }

    /// Invalidate cache entries for the given URLs and for every URL
    /// transitively importing them.
    pub fn files_changed(&self, urls: &[ResolvedUrl]) {
        self.context.files_changed(urls);
    }
}

/// An immutable, queryable analysis result.
pub struct Analysis {
    graph: DocumentGraph,
    order: Vec<DocumentId>,
    entry: DocumentId,
}

impl Analysis {
    pub fn get_document(&self, url: &ResolvedUrl) -> Option<DocumentRef<'_>> {
        self.graph.get(url)
    }

    pub fn entry_document(&self) -> DocumentRef<'_> {
        self.graph.by_id(self.entry)
    }

    /// All analyzed documents, in discovery order.
    pub fn documents(&self) -> impl Iterator<Item = DocumentRef<'_>> {
        self.order.iter().map(|&id| self.graph.by_id(id))
    }

    pub fn feature(&self, id: FeatureId) -> &Feature {
        self.graph.feature(id)
    }

    /// Warnings across every analyzed document.
    pub fn all_warnings(&self) -> Vec<&Warning> {
        let mut out = Vec::new();
        for document in self.documents() {
            out.extend(document.get_warnings(false));
        }
        out
    }
}
