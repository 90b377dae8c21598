//! Analysis-format exporter
//!
//! Serializes a resolved package into the stable analysis schema. The
//! emitted document's `schema_version` matches `1.x.x`; `validate` checks
//! an arbitrary JSON value against the shape this tool relies on.

use kumo_core::document::DocumentRef;
use kumo_core::features::{kinds, Feature};
use kumo_core::warnings::SourceRange;
use serde::Serialize;

pub const SCHEMA_VERSION: &str = "1.0.0";

#[derive(Serialize, Default)]
pub struct AnalysisExport {
    pub schema_version: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub namespaces: Vec<NamespaceExport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub elements: Vec<ElementExport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub mixins: Vec<MixinExport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub functions: Vec<FunctionExport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

#[derive(Serialize)]
pub struct Metadata {
    pub generator: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct ElementExport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tagname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub superclass: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub mixins: Vec<String>,
    pub attributes: Vec<AttributeExport>,
    pub properties: Vec<PropertyExport>,
    pub methods: Vec<MethodExport>,
    pub events: Vec<EventExport>,
    pub demos: Vec<DemoExport>,
    pub slots: Vec<SlotExport>,
    pub styling: StylingExport,
    #[serde(rename = "sourceRange")]
    pub source_range: SourceRange,
    pub privacy: String,
    pub description: String,
    pub summary: String,
}

#[derive(Serialize)]
pub struct NamespaceExport {
    pub name: String,
    pub description: String,
    pub summary: String,
    #[serde(rename = "sourceRange")]
    pub source_range: SourceRange,
}

#[derive(Serialize)]
pub struct MixinExport {
    pub name: String,
    pub properties: Vec<PropertyExport>,
    pub methods: Vec<MethodExport>,
    #[serde(rename = "sourceRange")]
    pub source_range: SourceRange,
    pub privacy: String,
    pub description: String,
    pub summary: String,
}

#[derive(Serialize)]
pub struct FunctionExport {
    pub name: String,
    pub params: Vec<ParamExport>,
    #[serde(rename = "return", skip_serializing_if = "Option::is_none")]
    pub return_: Option<ReturnExport>,
    #[serde(rename = "sourceRange")]
    pub source_range: SourceRange,
    pub privacy: String,
    pub description: String,
    pub summary: String,
}

#[derive(Serialize)]
pub struct AttributeExport {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Serialize)]
pub struct PropertyExport {
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub privacy: String,
}

#[derive(Serialize)]
pub struct MethodExport {
    pub name: String,
    pub params: Vec<ParamExport>,
    #[serde(rename = "return", skip_serializing_if = "Option::is_none")]
    pub return_: Option<ReturnExport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub privacy: String,
}

#[derive(Serialize)]
pub struct ParamExport {
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Serialize)]
pub struct ReturnExport {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Serialize)]
pub struct EventExport {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Serialize)]
pub struct DemoExport {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Serialize)]
pub struct SlotExport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Serialize, Default)]
pub struct StylingExport {
    #[serde(rename = "cssVariables")]
    pub css_variables: Vec<String>,
    pub selectors: Vec<String>,
}

/// Export every feature reachable from the given document.
pub fn export(document: DocumentRef<'_>) -> AnalysisExport {
    let mut out = AnalysisExport {
        schema_version: SCHEMA_VERSION.to_string(),
        metadata: Some(Metadata {
            generator: "kumo",
            version: env!("CARGO_PKG_VERSION"),
        }),
        ..Default::default()
    };

    for feature in document.get_by_kind(kinds::ELEMENT) {
        if let Feature::Element(element) = feature {
            out.elements.push(ElementExport {
                tagname: element.tag_name.clone(),
                classname: element.class_name.clone(),
                superclass: element.superclass.as_ref().map(|r| r.identifier.clone()),
                mixins: element
                    .mixins
                    .iter()
                    .map(|m| m.identifier.clone())
                    .collect(),
                attributes: element
                    .members
                    .attributes
                    .iter()
                    .map(|a| AttributeExport {
                        name: a.name.clone(),
                        description: a.description.clone(),
                    })
                    .collect(),
                properties: element.members.properties.iter().map(property).collect(),
                methods: element.members.methods.iter().map(method).collect(),
                events: element
                    .members
                    .events
                    .iter()
                    .map(|e| EventExport {
                        name: e.name.clone(),
                        description: e.description.clone(),
                    })
                    .collect(),
                demos: element
                    .demos
                    .iter()
                    .map(|d| DemoExport {
                        url: d.url.clone(),
                        description: d.description.clone(),
                    })
                    .collect(),
                slots: element
                    .slots
                    .iter()
                    .map(|s| SlotExport {
                        name: s.name.clone(),
                    })
                    .collect(),
                styling: StylingExport::default(),
                source_range: element.range.clone(),
                privacy: element.privacy.as_str().to_string(),
                description: element.description.clone(),
                summary: element.summary.clone(),
            });
        }
    }

    for feature in document.get_by_kind(kinds::NAMESPACE) {
        if let Feature::Namespace(ns) = feature {
            out.namespaces.push(NamespaceExport {
                name: ns.name.clone(),
                description: ns.description.clone(),
                summary: ns.summary.clone(),
                source_range: ns.range.clone(),
            });
        }
    }

    for feature in document.get_by_kind(kinds::ELEMENT_MIXIN) {
        if let Feature::ElementMixin(mixin) = feature {
            out.mixins.push(MixinExport {
                name: mixin.name.clone(),
                properties: mixin.members.properties.iter().map(property).collect(),
                methods: mixin.members.methods.iter().map(method).collect(),
                source_range: mixin.range.clone(),
                privacy: mixin.privacy.as_str().to_string(),
                description: mixin.description.clone(),
                summary: mixin.summary.clone(),
            });
        }
    }

    for feature in document.get_by_kind(kinds::FUNCTION) {
        if let Feature::Function(func) = feature {
            out.functions.push(FunctionExport {
                name: func.name.clone(),
                params: func.params.iter().map(param).collect(),
                return_: return_export(&func.return_type, &func.return_description),
                source_range: func.range.clone(),
                privacy: func.privacy.as_str().to_string(),
                description: func.description.clone(),
                summary: func.summary.clone(),
            });
        }
    }

    out
}

fn property(p: &kumo_core::features::Property) -> PropertyExport {
    PropertyExport {
        name: p.name.clone(),
        type_: p.type_.clone(),
        description: p.description.clone(),
        privacy: p.privacy.as_str().to_string(),
    }
}

fn method(m: &kumo_core::features::Method) -> MethodExport {
    MethodExport {
        name: m.name.clone(),
        params: m.params.iter().map(param).collect(),
        return_: return_export(&m.return_type, &m.return_description),
        description: m.description.clone(),
        privacy: m.privacy.as_str().to_string(),
    }
}

fn param(p: &kumo_core::features::MethodParam) -> ParamExport {
    ParamExport {
        name: p.name.clone(),
        type_: p.type_.clone(),
        description: p.description.clone(),
    }
}

fn return_export(
    type_: &Option<String>,
    description: &Option<String>,
) -> Option<ReturnExport> {
    if type_.is_none() && description.is_none() {
        return None;
    }
    Some(ReturnExport {
        type_: type_.clone(),
        description: description.clone(),
    })
}

/// Validate an exported document against the shape consumers rely on.
/// Returns the list of violations; empty means valid.
pub fn validate(value: &serde_json::Value) -> Vec<String> {
    let mut errors = Vec::new();

    let Some(object) = value.as_object() else {
        return vec!["analysis must be a JSON object".to_string()];
    };

    match object.get("schema_version").and_then(|v| v.as_str()) {
        Some(version) => {
            let parts: Vec<&str> = version.split('.').collect();
            let ok = parts.len() == 3
                && parts[0] == "1"
                && parts[1..].iter().all(|p| p.parse::<u64>().is_ok());
            if !ok {
                errors.push(format!("schema_version '{version}' does not match 1.x.x"));
            }
        }
        None => errors.push("missing schema_version".to_string()),
    }

    if let Some(elements) = object.get("elements") {
        match elements.as_array() {
            Some(elements) => {
                for (idx, element) in elements.iter().enumerate() {
                    let Some(element) = element.as_object() else {
                        errors.push(format!("elements[{idx}] must be an object"));
                        continue;
                    };
                    for key in ["attributes", "properties", "methods", "slots"] {
                        if !element.get(key).map(|v| v.is_array()).unwrap_or(false) {
                            errors.push(format!("elements[{idx}].{key} must be an array"));
                        }
                    }
                    if !element
                        .get("sourceRange")
                        .map(|v| v.is_object())
                        .unwrap_or(false)
                    {
                        errors.push(format!("elements[{idx}].sourceRange must be an object"));
                    }
                }
            }
            None => errors.push("elements must be an array".to_string()),
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use kumo_core::analyzer::{Analyzer, AnalyzerOptions};
    use kumo_core::loader::InMemoryUrlLoader;
    use kumo_core::urls::{
        PackageUrlResolver, PackageUrlResolverOptions, ResolvedUrl,
    };
    use std::path::PathBuf;
    use std::sync::Arc;

    async fn analyze(files: &[(&str, &str)], entry: &str) -> kumo_core::Analysis {
        let mut loader = InMemoryUrlLoader::new();
        for (path, contents) in files {
            loader.add(
                ResolvedUrl::parse(&format!("file:///pkg/{path}")).unwrap(),
                *contents,
            );
        }
        let analyzer = Analyzer::new(AnalyzerOptions {
            loader: Arc::new(loader),
            url_resolver: PackageUrlResolver::new(PackageUrlResolverOptions {
                package_dir: Some(PathBuf::from("/pkg")),
                ..Default::default()
            }),
        });
        analyzer.analyze(&entry.into()).await.unwrap()
    }

    #[tokio::test]
    async fn exported_analysis_validates() {
        let analysis = analyze(
            &[(
                "el.html",
                r#"<script>
/**
 * A fancy element.
 * @customElement
 */
class El extends HTMLElement {
  static get is() { return 'x-el'; }
  static get properties() { return { label: String }; }
  render() {}
}
</script>"#,
            )],
            "el.html",
        )
        .await;

        let export = export(analysis.entry_document());
        let value = serde_json::to_value(&export).unwrap();

        assert!(validate(&value).is_empty(), "violations: {:?}", validate(&value));
        assert_eq!(value["schema_version"], "1.0.0");
        assert_eq!(value["elements"][0]["tagname"], "x-el");
        assert_eq!(value["elements"][0]["classname"], "El");
        assert_eq!(value["elements"][0]["properties"][0]["name"], "label");
        assert_eq!(value["elements"][0]["methods"][0]["name"], "render");
        assert_eq!(value["elements"][0]["privacy"], "public");
    }

    #[tokio::test]
    async fn namespaces_and_functions_are_exported() {
        let analysis = analyze(
            &[(
                "lib.js",
                r#"/** @namespace */ var Foo = {};
/**
 * @memberof Foo
 * @param {number} x input
 * @return {number} doubled
 */
function double(x) { return 2 * x; }"#,
            )],
            "lib.js",
        )
        .await;

        let export = export(analysis.entry_document());
        let value = serde_json::to_value(&export).unwrap();

        assert_eq!(value["namespaces"][0]["name"], "Foo");
        assert_eq!(value["functions"][0]["name"], "Foo.double");
        assert_eq!(value["functions"][0]["params"][0]["type"], "number");
        assert_eq!(value["functions"][0]["return"]["type"], "number");
    }

    #[test]
    fn validate_rejects_bad_schema_version() {
        let value = serde_json::json!({ "schema_version": "2.0.0" });
        assert!(!validate(&value).is_empty());

        let value = serde_json::json!({ "schema_version": "1.2.3" });
        assert!(validate(&value).is_empty());
    }

    #[test]
    fn validate_rejects_missing_version() {
        let value = serde_json::json!({ "elements": [] });
        assert!(validate(&value)
            .iter()
            .any(|e| e.contains("schema_version")));
    }

    #[test]
    fn validate_checks_element_shape() {
        let value = serde_json::json!({
            "schema_version": "1.0.0",
            "elements": [{ "tagname": "x-el" }]
        });
        let errors = validate(&value);
        assert!(errors.iter().any(|e| e.contains("attributes")));
    }
}
