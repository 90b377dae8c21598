//! Documents and the queryable feature graph
//!
//! A `ScannedDocument` is the per-URL product of the scan phase; exactly one
//! exists per resolved URL per analysis. The resolve phase turns the set of
//! scanned documents into arena-allocated `Document` nodes whose features
//! hold cross-document targets by arena index, so cyclic import graphs need
//! no ownership cycles. Queries run over a `DocumentRef` handle and traverse
//! local features first, then imports in declaration order, with a visited
//! set cutting cycles.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use id_arena::Arena;
use once_cell::sync::OnceCell;

use crate::features::{DocumentId, Feature, FeatureId, ScannedFeature, ScannedImport};
use crate::parser::ParsedDocument;
use crate::urls::ResolvedUrl;
use crate::warnings::Warning;

/// A parsed document plus its ordered scanned features and warnings. May
/// contain nested documents for inline scripts and styles.
#[derive(Debug)]
pub struct ScannedDocument {
    pub parsed: ParsedDocument,
    pub features: Vec<ScannedFeature>,
    pub warnings: Vec<Warning>,
    pub inline_documents: Vec<Arc<ScannedDocument>>,
}

impl ScannedDocument {
    pub fn url(&self) -> &ResolvedUrl {
        self.parsed.url()
    }

    /// All imports declared by this document and its inline children, in
    /// document order.
    pub fn imports(&self) -> Vec<&ScannedImport> {
        let mut out = Vec::new();
        self.collect_imports(&mut out);
        out
    }

    fn collect_imports<'a>(&'a self, out: &mut Vec<&'a ScannedImport>) {
        for feature in &self.features {
            if let ScannedFeature::Import(import) = feature {
                out.push(import);
            }
        }
        for inline in &self.inline_documents {
            inline.collect_imports(out);
        }
    }
}

/// Lazily-built lookup tables over a document's local features. Never built
/// before resolution completes; a partial view must not be captured.
#[derive(Debug, Default)]
struct DocumentIndex {
    by_kind: HashMap<&'static str, Vec<usize>>,
    by_kind_and_id: HashMap<(String, String), Vec<usize>>,
}

impl DocumentIndex {
    fn build(features: &[Feature]) -> Self {
        let mut index = DocumentIndex::default();
        for (idx, feature) in features.iter().enumerate() {
            for kind in feature.kinds() {
                index.by_kind.entry(kind).or_default().push(idx);
                for id in feature.identifiers() {
                    index
                        .by_kind_and_id
                        .entry((kind.to_string(), id))
                        .or_default()
                        .push(idx);
                }
            }
        }
        index
    }
}

#[derive(Debug)]
pub struct Document {
    pub id: DocumentId,
    pub url: ResolvedUrl,
    pub scanned: Arc<ScannedDocument>,
    /// Locally-added resolved features, in resolution (source) order. The
    /// document itself appears here as a feature of kind `document`.
    pub(crate) features: Vec<Feature>,
    /// Lives under the package's components directory.
    pub(crate) external: bool,
    /// Resolution lifecycle; `begun` cuts cycles, features are immutable
    /// once `done`.
    pub(crate) begun: bool,
    pub(crate) done: bool,
    index: OnceCell<DocumentIndex>,
}

impl Document {
    pub(crate) fn new(
        id: DocumentId,
        url: ResolvedUrl,
        scanned: Arc<ScannedDocument>,
        external: bool,
    ) -> Self {
        Self {
            id,
            url,
            scanned,
            features: Vec::new(),
            external,
            begun: false,
            done: false,
            index: OnceCell::new(),
        }
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn local_features(&self) -> &[Feature] {
        &self.features
    }

    fn index(&self) -> &DocumentIndex {
        debug_assert!(self.done, "index queried before resolution completed");
        self.index.get_or_init(|| DocumentIndex::build(&self.features))
    }

    /// Indices of local features matching `kind` (and `id`, when given).
    /// Backed by the index once resolution is done, by a linear scan before.
    fn local_matches(&self, kind: &str, id: Option<&str>) -> Vec<usize> {
        if self.done {
            let index = self.index();
            return match id {
                Some(id) => index
                    .by_kind_and_id
                    .get(&(kind.to_string(), id.to_string()))
                    .cloned()
                    .unwrap_or_default(),
                None => index.by_kind.get(kind).cloned().unwrap_or_default(),
            };
        }
        self.features
            .iter()
            .enumerate()
            .filter(|(_, f)| {
                f.has_kind(kind) && id.map_or(true, |wanted| f.has_identifier(wanted))
            })
            .map(|(i, _)| i)
            .collect()
    }
}

/// Options for `DocumentRef::get_features`.
#[derive(Debug, Clone, Default)]
pub struct FeatureQuery<'q> {
    pub kind: Option<&'q str>,
    pub id: Option<&'q str>,
    /// Include features reachable through imports and inline documents.
    pub imported: bool,
    /// Include features from documents under the components directory.
    pub external_packages: bool,
}

impl<'q> FeatureQuery<'q> {
    pub fn kind(kind: &'q str) -> Self {
        Self {
            kind: Some(kind),
            imported: true,
            ..Default::default()
        }
    }

    pub fn kind_and_id(kind: &'q str, id: &'q str) -> Self {
        Self {
            kind: Some(kind),
            id: Some(id),
            imported: true,
            ..Default::default()
        }
    }
}

/// The resolved document graph: arena plus URL keying.
#[derive(Debug, Default)]
pub struct DocumentGraph {
    pub(crate) arena: Arena<Document>,
    pub(crate) by_url: HashMap<ResolvedUrl, DocumentId>,
}

impl DocumentGraph {
    pub fn get(&self, url: &ResolvedUrl) -> Option<DocumentRef<'_>> {
        self.by_url.get(url).map(|&id| DocumentRef { graph: self, id })
    }

    pub fn by_id(&self, id: DocumentId) -> DocumentRef<'_> {
        DocumentRef { graph: self, id }
    }

    pub fn document(&self, id: DocumentId) -> &Document {
        &self.arena[id]
    }

    pub fn feature(&self, id: FeatureId) -> &Feature {
        &self.arena[id.document].features[id.index]
    }

    pub fn urls(&self) -> impl Iterator<Item = &ResolvedUrl> {
        self.by_url.keys()
    }

    pub fn len(&self) -> usize {
        self.by_url.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_url.is_empty()
    }
}

/// Borrowing handle pairing a document with its graph, so queries can
/// dereference import targets through the arena.
#[derive(Debug, Clone, Copy)]
pub struct DocumentRef<'a> {
    graph: &'a DocumentGraph,
    id: DocumentId,
}

impl<'a> DocumentRef<'a> {
    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn url(&self) -> &'a ResolvedUrl {
        &self.graph.arena[self.id].url
    }

    pub fn document(&self) -> &'a Document {
        &self.graph.arena[self.id]
    }

    pub fn scanned(&self) -> &'a ScannedDocument {
        &self.graph.arena[self.id].scanned
    }

    /// Every feature of the given kind reachable from this document.
    pub fn get_by_kind(&self, kind: &str) -> Vec<&'a Feature> {
        self.get_features(&FeatureQuery::kind(kind))
    }

    /// Every feature of the given kind and identifier reachable from this
    /// document.
    pub fn get_by_id(&self, kind: &str, id: &str) -> Vec<&'a Feature> {
        self.get_features(&FeatureQuery::kind_and_id(kind, id))
    }

    /// Exactly-one lookup; `None` when missing or ambiguous.
    pub fn get_only_at_id(&self, kind: &str, id: &str) -> Option<&'a Feature> {
        let matches = self.get_by_id(kind, id);
        (matches.len() == 1).then(|| matches[0])
    }

    pub fn get_features(&self, query: &FeatureQuery<'_>) -> Vec<&'a Feature> {
        self.get_features_with_ids(query)
            .into_iter()
            .map(|(_, f)| f)
            .collect()
    }

    pub fn get_features_with_ids(
        &self,
        query: &FeatureQuery<'_>,
    ) -> Vec<(FeatureId, &'a Feature)> {
        let mut out = Vec::new();
        let mut visited = HashSet::new();
        collect_features(self.graph, self.id, query, &mut visited, &mut out);
        out
    }

    /// Warnings of this document; `deep` includes every reachable document.
    pub fn get_warnings(&self, deep: bool) -> Vec<&'a Warning> {
        let mut out = Vec::new();
        let mut visited = HashSet::new();
        collect_warnings(self.graph, self.id, deep, &mut visited, &mut out);
        out
    }
}

fn collect_features<'a>(
    graph: &'a DocumentGraph,
    id: DocumentId,
    query: &FeatureQuery<'_>,
    visited: &mut HashSet<DocumentId>,
    out: &mut Vec<(FeatureId, &'a Feature)>,
) {
    if !visited.insert(id) {
        return;
    }
    let doc = &graph.arena[id];

    // Local features first, in insertion order.
    match query.kind {
        Some(kind) => {
            for idx in doc.local_matches(kind, query.id) {
                out.push((FeatureId { document: id, index: idx }, &doc.features[idx]));
            }
        }
        None => {
            for (idx, feature) in doc.features.iter().enumerate() {
                if query.id.map_or(true, |wanted| feature.has_identifier(wanted)) {
                    out.push((FeatureId { document: id, index: idx }, feature));
                }
            }
        }
    }

    if !query.imported {
        return;
    }

    // Then reachable documents in declaration order: import targets and
    // inline children.
    for feature in &doc.features {
        let target = match feature {
            Feature::Import(import) => import.document,
            Feature::Document(child) if child.document != id => Some(child.document),
            _ => None,
        };
        let Some(target) = target else { continue };
        if graph.arena[target].external && !query.external_packages {
            continue;
        }
        collect_features(graph, target, query, visited, out);
    }
}

fn collect_warnings<'a>(
    graph: &'a DocumentGraph,
    id: DocumentId,
    deep: bool,
    visited: &mut HashSet<DocumentId>,
    out: &mut Vec<&'a Warning>,
) {
    if !visited.insert(id) {
        return;
    }
    let doc = &graph.arena[id];
    out.extend(doc.scanned.warnings.iter());
    for feature in &doc.features {
        out.extend(feature.warnings().iter());
        out.extend(feature.reference_warnings());
    }
    if !deep {
        return;
    }
    for feature in &doc.features {
        let target = match feature {
            Feature::Import(import) => import.document,
            Feature::Document(child) if child.document != id => Some(child.document),
            _ => None,
        };
        if let Some(target) = target {
            collect_warnings(graph, target, deep, visited, out);
        }
    }
}
