//! Analysis context
//!
//! Orchestrates load → parse → scan → resolve. One `ScannedDocument` exists
//! per resolved URL: concurrent requests for the same URL share a single
//! in-flight future, and finished documents are cached until invalidated.
//! Parsing and scanning are synchronous; the only suspension points are
//! loader calls and waiting on a shared in-flight scan.

use std::collections::{HashMap, HashSet};
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use futures::future::{FutureExt, Shared};
use futures::Future;

use crate::document::{DocumentGraph, ScannedDocument};
use crate::features::DocumentId;
use crate::loader::UrlLoader;
use crate::parser::ParserRegistry;
use crate::resolver::{self, ResolveInput};
use crate::scanners;
use crate::urls::{PackageUrlResolver, ResolvedUrl};
use crate::warnings::{codes, Warning};

type ScanResult = Result<Arc<ScannedDocument>, String>;
type SharedScan = Shared<Pin<Box<dyn Future<Output = ScanResult> + Send>>>;

#[derive(Default)]
struct Cache {
    in_flight: HashMap<ResolvedUrl, SharedScan>,
    scanned: HashMap<ResolvedUrl, Arc<ScannedDocument>>,
    failures: HashMap<ResolvedUrl, String>,
    /// Import edges from the last build: target URL → URLs importing it.
    dependants: HashMap<ResolvedUrl, HashSet<ResolvedUrl>>,
}

pub(crate) struct AnalysisContext {
    pub(crate) url_resolver: PackageUrlResolver,
    loader: Arc<dyn UrlLoader>,
    parsers: ParserRegistry,
    cache: Mutex<Cache>,
}

impl AnalysisContext {
    pub(crate) fn new(url_resolver: PackageUrlResolver, loader: Arc<dyn UrlLoader>) -> Self {
        Self {
            url_resolver,
            loader,
            parsers: ParserRegistry::new(),
            cache: Mutex::new(Cache::default()),
        }
    }

    /// Crawl from `entry`, then resolve everything reachable. Returns the
    /// graph plus the allocation order (entry first, discovery order after).
    pub(crate) async fn analyze(
        ctx: &Arc<Self>,
        entry: &ResolvedUrl,
    ) -> (DocumentGraph, Vec<DocumentId>) {
        let documents = Self::crawl(ctx, entry).await;
        let this = ctx.as_ref();

        let failures = this.cache.lock().expect("cache lock").failures.clone();

        let mut graph = DocumentGraph::default();
        let mut order = Vec::new();

        if !documents.iter().any(|(url, _)| url == entry) {
            // The entry itself failed to load; analysis still produces a
            // document so the failure has somewhere to live.
            let detail = failures
                .get(entry)
                .cloned()
                .unwrap_or_else(|| "target was not loaded".to_string());
            let (parsed, mut warnings) = this.parsers.parse(entry, "", None);
            warnings.push(Warning::warning(
                codes::COULD_NOT_LOAD,
                format!("could not load {entry}: {detail}"),
                parsed.full_range(),
            ));
            let synthetic = Arc::new(ScannedDocument {
                parsed,
                features: Vec::new(),
                warnings,
                inline_documents: Vec::new(),
            });
            this.alloc_document(&mut graph, synthetic, &mut order);
        }

        for (_, scanned) in documents {
            this.alloc_document(&mut graph, scanned, &mut order);
        }

        let input = ResolveInput {
            url_resolver: &this.url_resolver,
            load_failures: &failures,
        };
        resolver::resolve_all(&mut graph, &input, &order);

        (graph, order)
    }

    /// Breadth-first crawl over the import graph. Each wave's loads run
    /// concurrently; per-URL dedup is handled by `scan_url`.
    async fn crawl(
        ctx: &Arc<Self>,
        entry: &ResolvedUrl,
    ) -> Vec<(ResolvedUrl, Arc<ScannedDocument>)> {
        let mut seen: HashSet<ResolvedUrl> = HashSet::new();
        seen.insert(entry.clone());
        let mut results: Vec<(ResolvedUrl, Arc<ScannedDocument>)> = Vec::new();
        let mut edges: Vec<(ResolvedUrl, ResolvedUrl)> = Vec::new();

        let mut wave = vec![entry.clone()];
        while !wave.is_empty() {
            let scans = futures::future::join_all(
                wave.iter().map(|url| Self::scan_url(ctx, url.clone())),
            )
            .await;

            let mut next = Vec::new();
            for (url, outcome) in wave.into_iter().zip(scans) {
                let Ok(document) = outcome else {
                    // Failure already recorded; the importing document gets
                    // the warning during resolution.
                    continue;
                };
                for import in document.imports() {
                    let Some(resolved) = ctx.url_resolver.resolve_from(&import.url, &url)
                    else {
                        continue;
                    };
                    edges.push((resolved.clone(), url.clone()));
                    if seen.insert(resolved.clone()) {
                        next.push(resolved);
                    }
                }
                results.push((url, document));
            }
            wave = next;
        }

        let mut cache = ctx.cache.lock().expect("cache lock");
        cache.dependants.clear();
        for (target, importer) in edges {
            cache.dependants.entry(target).or_default().insert(importer);
        }

        results
    }

    /// The deduplicating scan entry point: one in-flight future per URL.
    fn scan_url(ctx: &Arc<Self>, url: ResolvedUrl) -> SharedScan {
        let mut cache = ctx.cache.lock().expect("cache lock");
        if let Some(in_flight) = cache.in_flight.get(&url) {
            return in_flight.clone();
        }

        let context = Arc::clone(ctx);
        let target = url.clone();
        let future: Pin<Box<dyn Future<Output = ScanResult> + Send>> =
            Box::pin(async move { context.load_parse_scan(target).await });
        let shared = future.shared();
        cache.in_flight.insert(url, shared.clone());
        shared
    }

    async fn load_parse_scan(self: Arc<Self>, url: ResolvedUrl) -> ScanResult {
        if let Some(done) = self
            .cache
            .lock()
            .expect("cache lock")
            .scanned
            .get(&url)
            .cloned()
        {
            return Ok(done);
        }

        let loaded = if self.loader.can_load(&url) {
            self.loader.load(&url).await.map_err(|e| e.to_string())
        } else {
            Err(format!("no loader can load {url}"))
        };

        match loaded {
            Ok(text) => {
                let (parsed, warnings) = self.parsers.parse(&url, &text, None);
                let scanned = Arc::new(self.scan_into_document(parsed, warnings));
                let mut cache = self.cache.lock().expect("cache lock");
                cache.in_flight.remove(&url);
                cache.failures.remove(&url);
                cache.scanned.insert(url, scanned.clone());
                Ok(scanned)
            }
            Err(message) => {
                let mut cache = self.cache.lock().expect("cache lock");
                cache.in_flight.remove(&url);
                cache.failures.insert(url, message.clone());
                Err(message)
            }
        }
    }

    /// Scan a parsed document and, recursively, every inline document the
    /// scanners discovered.
    fn scan_into_document(
        &self,
        parsed: crate::parser::ParsedDocument,
        mut warnings: Vec<Warning>,
    ) -> ScannedDocument {
        let output = scanners::scan_parsed(&parsed);
        warnings.extend(output.warnings);

        let mut ordinals: HashMap<&'static str, usize> = HashMap::new();
        let mut inline_documents = Vec::new();
        for inline in output.inline {
            let ordinal = {
                let counter = ordinals.entry(inline.tag).or_insert(0);
                let current = *counter;
                *counter += 1;
                current
            };
            let (child_parsed, child_warnings) = self.parsers.parse_inline(
                parsed.url(),
                inline.language,
                inline.tag,
                ordinal,
                &inline.text,
                inline.offset,
            );
            inline_documents.push(Arc::new(
                self.scan_into_document(child_parsed, child_warnings),
            ));
        }

        ScannedDocument {
            parsed,
            features: output.features,
            warnings,
            inline_documents,
        }
    }

    fn alloc_document(
        &self,
        graph: &mut DocumentGraph,
        scanned: Arc<ScannedDocument>,
        order: &mut Vec<DocumentId>,
    ) {
        let url = scanned.url().clone();
        if graph.by_url.contains_key(&url) {
            return;
        }
        let external = self.is_external(&url);
        let id = graph.arena.alloc_with_id(|id| {
            crate::document::Document::new(id, url.clone(), Arc::clone(&scanned), external)
        });
        graph.by_url.insert(url, id);
        order.push(id);

        for inline in &scanned.inline_documents {
            self.alloc_document(graph, Arc::clone(inline), order);
        }
    }

    fn is_external(&self, url: &ResolvedUrl) -> bool {
        url.path()
            .contains(&format!("/{}/", self.url_resolver.component_dir()))
    }

    /// Drop cache entries for the given URLs and for everything transitively
    /// importing them, per the import graph of the last build.
    pub(crate) fn files_changed(&self, urls: &[ResolvedUrl]) {
        let mut cache = self.cache.lock().expect("cache lock");

        let mut dirty: Vec<ResolvedUrl> = urls.to_vec();
        let mut invalid: HashSet<ResolvedUrl> = HashSet::new();
        while let Some(url) = dirty.pop() {
            if !invalid.insert(url.clone()) {
                continue;
            }
            if let Some(importers) = cache.dependants.get(&url) {
                dirty.extend(importers.iter().cloned());
            }
        }

        for url in &invalid {
            cache.scanned.remove(url);
            cache.in_flight.remove(url);
            cache.failures.remove(url);
        }
    }
}
