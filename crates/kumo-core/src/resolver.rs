//! Resolution
//!
//! The resolve pass turns the set of scanned documents into the resolved
//! document graph. All `Document` shells are allocated before any resolve
//! step; resolving an import recurses into its target first, and the
//! `begun` flag cuts cycles so resolution always terminates. References are
//! resolved document-locally first, then by transitive `(kind, identifier)`
//! lookup with deterministic tie-breaking; failures are warnings, never
//! errors.

use std::collections::HashMap;

use crate::document::{DocumentGraph, FeatureQuery};
use crate::features::{
    kinds, Behavior, DocumentFeature, DocumentId, DomModule, Element, ElementMixin,
    ElementReference, Feature, Function, Import, Namespace, PolymerCoreFeature, Reference,
    ScannedElement, ScannedFeature, ScannedReference, Slot,
};
use crate::urls::{PackageUrlResolver, ResolvedUrl};
use crate::warnings::{codes, Warning};

pub(crate) struct ResolveInput<'a> {
    pub url_resolver: &'a PackageUrlResolver,
    /// Load failures from the crawl, keyed by the URL that failed.
    pub load_failures: &'a HashMap<ResolvedUrl, String>,
}

/// Resolve every allocated document, in allocation order. Import recursion
/// means dependencies finish before their dependents except across cycles.
pub(crate) fn resolve_all(
    graph: &mut DocumentGraph,
    input: &ResolveInput<'_>,
    order: &[DocumentId],
) {
    for &id in order {
        resolve_document(graph, input, id, id);
    }
}

/// `scope` is the document used for reference lookups; inline documents
/// resolve their features in the enclosing document's scope.
fn resolve_document(
    graph: &mut DocumentGraph,
    input: &ResolveInput<'_>,
    id: DocumentId,
    scope: DocumentId,
) {
    if graph.arena[id].begun {
        return;
    }
    graph.arena[id].begun = true;
    tracing::debug!(url = %graph.arena[id].url, "resolving document");

    let scanned = graph.arena[id].scanned.clone();
    let url = graph.arena[id].url.clone();

    // The document itself is its first local feature.
    let self_feature = Feature::Document(DocumentFeature {
        document: id,
        url: url.clone(),
        range: scanned.parsed.full_range(),
    });
    graph.arena[id].features.push(self_feature);

    for feature in &scanned.features {
        let resolved = match feature {
            ScannedFeature::Import(import) => {
                Some(resolve_import(graph, input, import, &url))
            }
            ScannedFeature::Element(element) => {
                Some(Feature::Element(resolve_element(graph, scope, element)))
            }
            ScannedFeature::ElementMixin(mixin) => Some(Feature::ElementMixin(ElementMixin {
                name: mixin.name.clone(),
                members: mixin.members.clone(),
                description: mixin.description.clone(),
                summary: mixin.summary.clone(),
                privacy: mixin.privacy,
                range: mixin.range.clone(),
                warnings: mixin.warnings.clone(),
            })),
            ScannedFeature::Namespace(ns) => Some(Feature::Namespace(Namespace {
                name: ns.name.clone(),
                description: ns.description.clone(),
                summary: ns.summary.clone(),
                range: ns.range.clone(),
                warnings: ns.warnings.clone(),
            })),
            ScannedFeature::Function(func) => Some(Feature::Function(Function {
                name: func.name.clone(),
                params: func.params.clone(),
                return_type: func.return_type.clone(),
                return_description: func.return_description.clone(),
                description: func.description.clone(),
                summary: func.summary.clone(),
                privacy: func.privacy,
                range: func.range.clone(),
                warnings: func.warnings.clone(),
            })),
            ScannedFeature::Behavior(behavior) => Some(Feature::Behavior(Behavior {
                name: behavior.name.clone(),
                members: behavior.members.clone(),
                description: behavior.description.clone(),
                summary: behavior.summary.clone(),
                range: behavior.range.clone(),
                warnings: behavior.warnings.clone(),
            })),
            ScannedFeature::DomModule(module) => Some(Feature::DomModule(DomModule {
                id: module.id.clone(),
                slots: module.slots.clone(),
                range: module.range.clone(),
                warnings: module.warnings.clone(),
            })),
            ScannedFeature::Databinding(binding) => {
                Some(Feature::Databinding(binding.clone()))
            }
            ScannedFeature::Reference(reference) => Some(Feature::Reference(
                resolve_reference(graph, scope, reference),
            )),
            ScannedFeature::PolymerCoreFeature(core) => {
                Some(Feature::PolymerCoreFeature(PolymerCoreFeature {
                    description: core.description.clone(),
                    members: core.members.clone(),
                    range: core.range.clone(),
                    warnings: core.warnings.clone(),
                }))
            }
            ScannedFeature::ElementReference(reference) => {
                Some(Feature::ElementReference(ElementReference {
                    tag_name: reference.tag_name.clone(),
                    attributes: reference.attributes.clone(),
                    range: reference.range.clone(),
                    warnings: reference.warnings.clone(),
                }))
            }
        };
        if let Some(resolved) = resolved {
            graph.arena[id].features.push(resolved);
        }
    }

    // Inline children become document features and resolve in this
    // document's scope, after its own features.
    for inline in &scanned.inline_documents {
        let Some(&child) = graph.by_url.get(inline.url()) else {
            continue;
        };
        let child_feature = Feature::Document(DocumentFeature {
            document: child,
            url: inline.url().clone(),
            range: inline.parsed.full_range(),
        });
        graph.arena[id].features.push(child_feature);
        resolve_document(graph, input, child, scope);
    }

    graph.arena[id].done = true;
}

fn resolve_import(
    graph: &mut DocumentGraph,
    input: &ResolveInput<'_>,
    import: &crate::features::ScannedImport,
    base: &ResolvedUrl,
) -> Feature {
    let mut warnings = import.warnings.clone();
    let resolved_url = input.url_resolver.resolve_from(&import.url, base);

    let document = match &resolved_url {
        Some(resolved) => {
            let target = graph.by_url.get(resolved).copied();
            match target {
                Some(target) => {
                    // Resolve the dependency before the features that follow
                    // this import; `begun` stops cyclic recursion.
                    resolve_document(graph, input, target, target);
                    Some(target)
                }
                None => {
                    let detail = input
                        .load_failures
                        .get(resolved)
                        .cloned()
                        .unwrap_or_else(|| "target was not loaded".to_string());
                    warnings.push(Warning::warning(
                        codes::COULD_NOT_LOAD,
                        format!("could not load {}: {detail}", import.url),
                        import.range.clone(),
                    ));
                    None
                }
            }
        }
        None => {
            warnings.push(Warning::warning(
                codes::COULD_NOT_LOAD,
                format!("could not resolve import URL {}", import.url),
                import.range.clone(),
            ));
            None
        }
    };

    Feature::Import(Import {
        kind: import.kind,
        url: import.url.clone(),
        resolved_url,
        document,
        lazy: import.lazy,
        range: import.range.clone(),
        warnings,
    })
}

fn resolve_element(graph: &DocumentGraph, scope: DocumentId, element: &ScannedElement) -> Element {
    let superclass = element
        .superclass
        .as_ref()
        .map(|r| resolve_reference(graph, scope, r));
    let mixins = element
        .mixins
        .iter()
        .map(|r| resolve_reference(graph, scope, r))
        .collect();
    let behaviors = element
        .behaviors
        .iter()
        .map(|r| resolve_reference(graph, scope, r))
        .collect();

    let slots = element
        .tag_name
        .as_deref()
        .map(|tag| dom_module_slots(graph, scope, tag))
        .unwrap_or_default();

    Element {
        tag_name: element.tag_name.clone(),
        class_name: element.class_name.clone(),
        superclass,
        mixins,
        behaviors,
        members: element.members.clone(),
        slots,
        demos: element.demos.clone(),
        description: element.description.clone(),
        summary: element.summary.clone(),
        privacy: element.privacy,
        pseudo: element.pseudo,
        range: element.range.clone(),
        warnings: element.warnings.clone(),
    }
}

fn dom_module_slots(graph: &DocumentGraph, scope: DocumentId, tag: &str) -> Vec<Slot> {
    let query = FeatureQuery {
        kind: Some(kinds::DOM_MODULE),
        id: Some(tag),
        imported: true,
        external_packages: true,
    };
    let matches = graph.by_id(scope).get_features(&query);
    match matches.first() {
        Some(Feature::DomModule(module)) => module.slots.clone(),
        _ => Vec::new(),
    }
}

/// Map a scanned reference to its target: document-local declarations win,
/// then the transitive feature set by `(kind, identifier)`. Missing targets
/// warn; ambiguous ones warn and take the first in traversal order.
pub(crate) fn resolve_reference(
    graph: &DocumentGraph,
    scope: DocumentId,
    scanned: &ScannedReference,
) -> Reference {
    let mut warnings = scanned.warnings.clone();

    // Local declarations resolved so far.
    let local: Vec<usize> = graph.arena[scope]
        .local_features_matching(scanned.kind, &scanned.identifier);
    if local.len() == 1 {
        return Reference {
            kind: scanned.kind,
            identifier: scanned.identifier.clone(),
            target: Some(crate::features::FeatureId {
                document: scope,
                index: local[0],
            }),
            range: scanned.range.clone(),
            warnings,
        };
    }

    // Global lookup over the transitive closure.
    let query = FeatureQuery {
        kind: Some(scanned.kind),
        id: Some(&scanned.identifier),
        imported: true,
        external_packages: true,
    };
    let matches = graph.by_id(scope).get_features_with_ids(&query);

    let target = match matches.len() {
        0 => {
            let hint = if scanned.kind == kinds::BEHAVIOR {
                " Is it annotated with @polymerBehavior?"
            } else {
                ""
            };
            warnings.push(Warning::warning(
                codes::COULD_NOT_RESOLVE_REFERENCE,
                format!(
                    "could not resolve reference to {} '{}'.{hint}",
                    scanned.kind, scanned.identifier
                ),
                scanned.range.clone(),
            ));
            None
        }
        1 => Some(matches[0].0),
        _ => {
            warnings.push(Warning::warning(
                codes::MULTIPLE_GLOBAL_DECLARATIONS,
                format!(
                    "multiple global declarations of {} '{}'",
                    scanned.kind, scanned.identifier
                ),
                scanned.range.clone(),
            ));
            Some(matches[0].0)
        }
    };

    Reference {
        kind: scanned.kind,
        identifier: scanned.identifier.clone(),
        target,
        range: scanned.range.clone(),
        warnings,
    }
}

impl crate::document::Document {
    /// Indices of already-resolved local features matching kind and
    /// identifier.
    pub(crate) fn local_features_matching(&self, kind: &str, identifier: &str) -> Vec<usize> {
        self.local_features()
            .iter()
            .enumerate()
            .filter(|(_, f)| f.has_kind(kind) && f.has_identifier(identifier))
            .map(|(idx, _)| idx)
            .collect()
    }
}
