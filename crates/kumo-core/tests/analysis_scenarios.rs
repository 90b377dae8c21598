//! End-to-end analysis scenarios over in-memory packages.

use std::path::PathBuf;
use std::sync::Arc;

use kumo_core::analyzer::{Analyzer, AnalyzerOptions};
use kumo_core::features::{kinds, Feature};
use kumo_core::loader::InMemoryUrlLoader;
use kumo_core::urls::{PackageUrlResolver, PackageUrlResolverOptions, ResolvedUrl};
use kumo_core::warnings::Severity;

fn url(path: &str) -> ResolvedUrl {
    ResolvedUrl::parse(&format!("file:///pkg/{path}")).unwrap()
}

fn analyzer_with(files: &[(&str, &str)]) -> Analyzer {
    let mut loader = InMemoryUrlLoader::new();
    for (path, contents) in files {
        loader.add(url(path), *contents);
    }
    Analyzer::new(AnalyzerOptions {
        loader: Arc::new(loader),
        url_resolver: PackageUrlResolver::new(PackageUrlResolverOptions {
            package_dir: Some(PathBuf::from("/pkg")),
            ..Default::default()
        }),
    })
}

#[tokio::test]
async fn inline_element_is_reachable_from_the_entry() {
    let analyzer = analyzer_with(&[
        (
            "index.html",
            r#"<link rel="import" href="./a.html">
<link rel="import" href="./b.html">"#,
        ),
        (
            "a.html",
            r#"<script>
class El extends HTMLElement {
  static get is() { return 'x-el'; }
}
</script>"#,
        ),
        ("b.html", ""),
    ]);

    let analysis = analyzer.analyze(&"index.html".into()).await.unwrap();
    let entry = analysis.entry_document();

    let element = entry
        .get_only_at_id(kinds::ELEMENT, "x-el")
        .expect("exactly one x-el");
    match element {
        Feature::Element(e) => {
            assert_eq!(e.class_name.as_deref(), Some("El"));
        }
        other => panic!("expected element, got {other:?}"),
    }
    assert_eq!(entry.get_by_kind(kinds::ELEMENT).len(), 1);
}

#[tokio::test]
async fn namespace_members_extend_the_namespace_tree() {
    let analyzer = analyzer_with(&[(
        "a.js",
        "/** @namespace */ var Foo = {};\nFoo.Bar = { baz: 1 };",
    )]);

    let analysis = analyzer.analyze(&"a.js".into()).await.unwrap();
    let entry = analysis.entry_document();

    let namespaces = entry.get_by_kind(kinds::NAMESPACE);
    let names: Vec<_> = namespaces
        .iter()
        .filter_map(|f| match f {
            Feature::Namespace(n) => Some(n.name.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(names, vec!["Foo", "Foo.Bar"]);
    assert!(entry.get_warnings(true).is_empty());
}

#[tokio::test]
async fn dynamic_namespace_target_warns() {
    let analyzer = analyzer_with(&[("a.js", "DynamicNamespace[baz] = { foo: 'bar' };")]);

    let analysis = analyzer.analyze(&"a.js".into()).await.unwrap();
    let warnings = analysis.entry_document().get_warnings(true);
    assert!(warnings
        .iter()
        .any(|w| w.message.contains("Unable to determine name for @namespace")));
}

#[tokio::test]
async fn dom_bind_template_yields_one_databinding() {
    let analyzer = analyzer_with(&[(
        "index.html",
        r#"<template is="dom-bind">Hello {{name}}!</template>"#,
    )]);

    let analysis = analyzer.analyze(&"index.html".into()).await.unwrap();
    let entry = analysis.entry_document();

    let bindings = entry.get_by_kind(kinds::DATABINDING);
    assert_eq!(bindings.len(), 1);
    match bindings[0] {
        Feature::Databinding(binding) => {
            assert_eq!(binding.expression_text, "name");
            assert_eq!(
                binding.into,
                kumo_core::features::DatabindingInto::StringInterpolation
            );
            assert_eq!(
                binding.direction,
                kumo_core::features::BindingDirection::TwoWay
            );
        }
        other => panic!("expected databinding, got {other:?}"),
    }
}

#[tokio::test]
async fn circular_imports_resolve_without_overflow() {
    let analyzer = analyzer_with(&[
        ("a.html", r#"<link rel="import" href="./b.html">"#),
        ("b.html", r#"<link rel="import" href="./a.html">"#),
    ]);

    let analysis = analyzer.analyze(&"a.html".into()).await.unwrap();
    let a = analysis.get_document(&url("a.html")).unwrap();
    let b = analysis.get_document(&url("b.html")).unwrap();

    assert!(a.document().is_done());
    assert!(b.document().is_done());
    assert_eq!(a.get_by_kind(kinds::DOCUMENT).len(), 2);
    assert_eq!(b.get_by_kind(kinds::DOCUMENT).len(), 2);

    // Neither side accumulated recursion warnings.
    assert!(a.get_warnings(true).is_empty());
}

#[tokio::test]
async fn import_of_missing_file_warns_on_the_import() {
    let analyzer = analyzer_with(&[(
        "index.html",
        r#"<link rel="import" href="./gone.html">"#,
    )]);

    let analysis = analyzer.analyze(&"index.html".into()).await.unwrap();
    let entry = analysis.entry_document();

    let imports = entry.get_by_kind(kinds::IMPORT);
    assert_eq!(imports.len(), 1);
    match imports[0] {
        Feature::Import(import) => {
            assert!(import.document.is_none());
            assert!(import
                .warnings
                .iter()
                .any(|w| w.code == "could-not-load"));
        }
        other => panic!("expected import, got {other:?}"),
    }
}

#[tokio::test]
async fn behavior_reference_resolves_across_imports() {
    let analyzer = analyzer_with(&[
        (
            "element.html",
            r#"<link rel="import" href="./behavior.html">
<script>
Polymer({
  is: 'x-uses-behavior',
  behaviors: [My.HighlightBehavior]
});
</script>"#,
        ),
        (
            "behavior.html",
            r#"<script>
/** @polymerBehavior */
My.HighlightBehavior = { highlight: function() {} };
</script>"#,
        ),
    ]);

    let analysis = analyzer.analyze(&"element.html".into()).await.unwrap();
    let entry = analysis.entry_document();

    let element = entry
        .get_only_at_id(kinds::ELEMENT, "x-uses-behavior")
        .unwrap();
    match element {
        Feature::Element(e) => {
            assert_eq!(e.behaviors.len(), 1);
            let target = e.behaviors[0].target.expect("behavior resolved");
            match analysis.feature(target) {
                Feature::Behavior(b) => assert_eq!(b.name, "My.HighlightBehavior"),
                other => panic!("expected behavior, got {other:?}"),
            }
            assert!(e.behaviors[0].warnings.is_empty());
        }
        other => panic!("expected element, got {other:?}"),
    }
}

#[tokio::test]
async fn unresolved_behavior_reference_warns_with_hint() {
    let analyzer = analyzer_with(&[(
        "element.html",
        r#"<script>
Polymer({
  is: 'x-dangling',
  behaviors: [Missing.Behavior]
});
</script>"#,
    )]);

    let analysis = analyzer.analyze(&"element.html".into()).await.unwrap();
    let entry = analysis.entry_document();

    let warnings = entry.get_warnings(true);
    let warning = warnings
        .iter()
        .find(|w| w.code == "could-not-resolve-reference")
        .expect("resolution warning");
    assert!(warning.message.contains("@polymerBehavior"));
    assert_eq!(warning.severity, Severity::Warning);
}

#[tokio::test]
async fn dom_module_binds_slots_to_the_element() {
    let analyzer = analyzer_with(&[(
        "card.html",
        r#"<dom-module id="x-card">
  <template>
    <slot name="header"></slot>
    <slot></slot>
  </template>
</dom-module>
<script>
Polymer({ is: 'x-card' });
</script>"#,
    )]);

    let analysis = analyzer.analyze(&"card.html".into()).await.unwrap();
    let entry = analysis.entry_document();

    let element = entry.get_only_at_id(kinds::ELEMENT, "x-card").unwrap();
    match element {
        Feature::Element(e) => {
            assert_eq!(e.slots.len(), 2);
            assert_eq!(e.slots[0].name.as_deref(), Some("header"));
            assert!(e.slots[1].name.is_none());
        }
        other => panic!("expected element, got {other:?}"),
    }
}

#[tokio::test]
async fn element_references_in_markup_are_indexed() {
    let analyzer = analyzer_with(&[(
        "index.html",
        r#"<x-card elevation="2"></x-card>
<x-card></x-card>"#,
    )]);

    let analysis = analyzer.analyze(&"index.html".into()).await.unwrap();
    let entry = analysis.entry_document();
    assert_eq!(entry.get_by_kind(kinds::ELEMENT_REFERENCE).len(), 2);
    assert_eq!(
        entry.get_by_id(kinds::ELEMENT_REFERENCE, "x-card").len(),
        2
    );
}

#[tokio::test]
async fn component_dir_documents_are_external() {
    let analyzer = analyzer_with(&[
        (
            "index.html",
            r#"<link rel="import" href="../polymer/polymer.html">
<script>
class El extends HTMLElement { static get is() { return 'x-local'; } }
</script>"#,
        ),
        (
            "bower_components/polymer/polymer.html",
            r#"<script>
class External extends HTMLElement { static get is() { return 'x-external'; } }
</script>"#,
        ),
    ]);

    let analysis = analyzer.analyze(&"index.html".into()).await.unwrap();
    let entry = analysis.entry_document();

    // By default external-package features are excluded from queries.
    let local = entry.get_by_kind(kinds::ELEMENT);
    let tags: Vec<_> = local
        .iter()
        .filter_map(|f| match f {
            Feature::Element(e) => e.tag_name.as_deref(),
            _ => None,
        })
        .collect();
    assert_eq!(tags, vec!["x-local"]);

    let all = entry.get_features(&kumo_core::FeatureQuery {
        kind: Some(kinds::ELEMENT),
        imported: true,
        external_packages: true,
        ..Default::default()
    });
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn ambiguous_global_reference_warns_and_picks_first() {
    let analyzer = analyzer_with(&[
        (
            "index.html",
            r#"<link rel="import" href="./first.html">
<link rel="import" href="./second.html">
<script>
Polymer({
  is: 'x-ambiguous',
  behaviors: [Shared.Behavior]
});
</script>"#,
        ),
        (
            "first.html",
            "<script>/** @polymerBehavior */ Shared.Behavior = { from: 'first' };</script>",
        ),
        (
            "second.html",
            "<script>/** @polymerBehavior */ Shared.Behavior = { from: 'second' };</script>",
        ),
    ]);

    let analysis = analyzer.analyze(&"index.html".into()).await.unwrap();
    let entry = analysis.entry_document();

    let element = entry
        .get_only_at_id(kinds::ELEMENT, "x-ambiguous")
        .unwrap();
    match element {
        Feature::Element(e) => {
            let reference = &e.behaviors[0];
            assert!(reference
                .warnings
                .iter()
                .any(|w| w.code == "multiple-global-declarations"));
            // Deterministic pick: first import in declaration order.
            let target = reference.target.expect("a target is still chosen");
            let range = analysis.feature(target).source_range();
            assert!(range.file.as_str().ends_with("first.html"));
        }
        other => panic!("expected element, got {other:?}"),
    }
}

#[tokio::test]
async fn external_scripts_are_crawled_as_imports() {
    let analyzer = analyzer_with(&[
        (
            "index.html",
            r#"<script src="./lib.js"></script>"#,
        ),
        (
            "lib.js",
            "/** @namespace */ var Lib = {};",
        ),
    ]);

    let analysis = analyzer.analyze(&"index.html".into()).await.unwrap();
    let entry = analysis.entry_document();

    assert!(analysis.get_document(&url("lib.js")).is_some());
    let namespaces = entry.get_by_kind(kinds::NAMESPACE);
    assert_eq!(namespaces.len(), 1);
}

#[tokio::test]
async fn parse_error_surfaces_as_document_warning() {
    let analyzer = analyzer_with(&[("broken.js", "const = ;")]);
    let analysis = analyzer.analyze(&"broken.js".into()).await.unwrap();
    let warnings = analysis.entry_document().get_warnings(false);
    assert!(warnings.iter().any(|w| w.code == "parse-error"));
}

#[tokio::test]
async fn inline_document_appears_with_fragment_url() {
    let analyzer = analyzer_with(&[(
        "a.html",
        "<script>var one = 1;</script>\n<script>var two = 2;</script>",
    )]);

    let analysis = analyzer.analyze(&"a.html".into()).await.unwrap();
    assert!(analysis
        .get_document(&url("a.html#inline-script-0"))
        .is_some());
    assert!(analysis
        .get_document(&url("a.html#inline-script-1"))
        .is_some());

    // The entry sees three documents: itself plus two inline children.
    let entry = analysis.entry_document();
    assert_eq!(entry.get_by_kind(kinds::DOCUMENT).len(), 3);
}
