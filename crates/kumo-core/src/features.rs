//! Scanned and resolved features
//!
//! Features are tagged variants over concrete payloads. A `ScannedFeature`
//! is document-local and names cross-document targets only by identifier; a
//! `Feature` is the post-resolution form where references hold their
//! targets. One feature can answer to several kinds (a polymer element is
//! both `element` and `polymer-element`) and several identifiers (tag name
//! and class name).

use id_arena::Id;

use crate::urls::{FileRelativeUrl, ResolvedUrl};
use crate::warnings::{SourceRange, Warning};

pub type DocumentId = Id<crate::document::Document>;

/// Stable kind tags.
pub mod kinds {
    pub const DOCUMENT: &str = "document";
    pub const IMPORT: &str = "import";
    pub const HTML_IMPORT: &str = "html-import";
    pub const HTML_SCRIPT: &str = "html-script";
    pub const HTML_STYLE: &str = "html-style";
    pub const ELEMENT: &str = "element";
    pub const POLYMER_ELEMENT: &str = "polymer-element";
    pub const PSEUDO_ELEMENT: &str = "pseudo-element";
    pub const ELEMENT_MIXIN: &str = "element-mixin";
    pub const NAMESPACE: &str = "namespace";
    pub const FUNCTION: &str = "function";
    pub const BEHAVIOR: &str = "behavior";
    pub const DOM_MODULE: &str = "dom-module";
    pub const DATABINDING: &str = "databinding";
    pub const REFERENCE: &str = "reference";
    pub const ELEMENT_REFERENCE: &str = "element-reference";
    pub const POLYMER_CORE_FEATURE: &str = "polymer-core-feature";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Privacy {
    #[default]
    Public,
    Protected,
    Private,
}

impl Privacy {
    /// Polymer naming convention: a leading or trailing underscore marks a
    /// private member.
    pub fn from_name(name: &str) -> Self {
        if name.starts_with('_') || name.ends_with('_') {
            Privacy::Private
        } else {
            Privacy::Public
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Privacy::Public => "public",
            Privacy::Protected => "protected",
            Privacy::Private => "private",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: String,
    pub description: Option<String>,
    pub range: SourceRange,
}

#[derive(Debug, Clone)]
pub struct Property {
    pub name: String,
    pub type_: Option<String>,
    pub description: Option<String>,
    pub privacy: Privacy,
    pub range: SourceRange,
}

#[derive(Debug, Clone)]
pub struct MethodParam {
    pub name: String,
    pub type_: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Method {
    pub name: String,
    pub params: Vec<MethodParam>,
    pub return_type: Option<String>,
    pub return_description: Option<String>,
    pub description: Option<String>,
    pub privacy: Privacy,
    pub range: SourceRange,
}

#[derive(Debug, Clone)]
pub struct Event {
    pub name: String,
    pub description: Option<String>,
    pub range: SourceRange,
}

#[derive(Debug, Clone)]
pub struct Demo {
    pub url: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Slot {
    pub name: Option<String>,
    pub range: SourceRange,
}

// ---------------------------------------------------------------------------
// Scanned features
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ScannedImport {
    /// `html-import`, `html-script`, or `html-style`.
    pub kind: &'static str,
    pub url: FileRelativeUrl,
    pub lazy: bool,
    pub range: SourceRange,
    pub warnings: Vec<Warning>,
}

/// Weakly names a target feature by kind and identifier; becomes a concrete
/// `Reference` during resolution.
#[derive(Debug, Clone)]
pub struct ScannedReference {
    pub kind: &'static str,
    pub identifier: String,
    pub range: SourceRange,
    pub warnings: Vec<Warning>,
}

impl ScannedReference {
    pub fn new(kind: &'static str, identifier: impl Into<String>, range: SourceRange) -> Self {
        Self {
            kind,
            identifier: identifier.into(),
            range,
            warnings: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ElementMembers {
    pub attributes: Vec<Attribute>,
    pub properties: Vec<Property>,
    pub methods: Vec<Method>,
    pub events: Vec<Event>,
}

#[derive(Debug, Clone)]
pub struct ScannedElement {
    pub tag_name: Option<String>,
    pub class_name: Option<String>,
    pub superclass: Option<ScannedReference>,
    pub mixins: Vec<ScannedReference>,
    pub behaviors: Vec<ScannedReference>,
    pub members: ElementMembers,
    pub demos: Vec<Demo>,
    pub description: String,
    pub summary: String,
    pub privacy: Privacy,
    pub pseudo: bool,
    pub range: SourceRange,
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Clone)]
pub struct ScannedElementMixin {
    pub name: String,
    pub members: ElementMembers,
    pub description: String,
    pub summary: String,
    pub privacy: Privacy,
    pub range: SourceRange,
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Clone)]
pub struct ScannedNamespace {
    pub name: String,
    pub description: String,
    pub summary: String,
    pub range: SourceRange,
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Clone)]
pub struct ScannedFunction {
    /// Namespaced name, e.g. `Foo.Utils.frobnicate`.
    pub name: String,
    pub params: Vec<MethodParam>,
    pub return_type: Option<String>,
    pub return_description: Option<String>,
    pub description: String,
    pub summary: String,
    pub privacy: Privacy,
    pub range: SourceRange,
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Clone)]
pub struct ScannedBehavior {
    pub name: String,
    pub members: ElementMembers,
    pub description: String,
    pub summary: String,
    pub range: SourceRange,
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Clone)]
pub struct ScannedDomModule {
    pub id: Option<String>,
    pub slots: Vec<Slot>,
    pub range: SourceRange,
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingDirection {
    /// `[[expr]]`
    OneWay,
    /// `{{expr}}`
    TwoWay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabindingInto {
    /// The binding spans an entire attribute value.
    Attribute,
    /// The binding is part of a longer string or a text node.
    StringInterpolation,
}

#[derive(Debug, Clone)]
pub struct ScannedDatabinding {
    pub expression_text: String,
    pub direction: BindingDirection,
    /// `{{prop::event}}` two-way bindings may name a change event.
    pub event_name: Option<String>,
    pub into: DatabindingInto,
    pub range: SourceRange,
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Clone)]
pub struct ScannedPolymerCoreFeature {
    pub description: String,
    pub members: ElementMembers,
    pub range: SourceRange,
    pub warnings: Vec<Warning>,
}

/// A use of a custom element in markup.
#[derive(Debug, Clone)]
pub struct ScannedElementReference {
    pub tag_name: String,
    pub attributes: Vec<Attribute>,
    pub range: SourceRange,
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Clone)]
pub enum ScannedFeature {
    Import(ScannedImport),
    Element(ScannedElement),
    ElementMixin(ScannedElementMixin),
    Namespace(ScannedNamespace),
    Function(ScannedFunction),
    Behavior(ScannedBehavior),
    DomModule(ScannedDomModule),
    Databinding(ScannedDatabinding),
    Reference(ScannedReference),
    PolymerCoreFeature(ScannedPolymerCoreFeature),
    ElementReference(ScannedElementReference),
}

impl ScannedFeature {
    pub fn source_range(&self) -> &SourceRange {
        match self {
            ScannedFeature::Import(f) => &f.range,
            ScannedFeature::Element(f) => &f.range,
            ScannedFeature::ElementMixin(f) => &f.range,
            ScannedFeature::Namespace(f) => &f.range,
            ScannedFeature::Function(f) => &f.range,
            ScannedFeature::Behavior(f) => &f.range,
            ScannedFeature::DomModule(f) => &f.range,
            ScannedFeature::Databinding(f) => &f.range,
            ScannedFeature::Reference(f) => &f.range,
            ScannedFeature::PolymerCoreFeature(f) => &f.range,
            ScannedFeature::ElementReference(f) => &f.range,
        }
    }

    pub fn warnings(&self) -> &[Warning] {
        match self {
            ScannedFeature::Import(f) => &f.warnings,
            ScannedFeature::Element(f) => &f.warnings,
            ScannedFeature::ElementMixin(f) => &f.warnings,
            ScannedFeature::Namespace(f) => &f.warnings,
            ScannedFeature::Function(f) => &f.warnings,
            ScannedFeature::Behavior(f) => &f.warnings,
            ScannedFeature::DomModule(f) => &f.warnings,
            ScannedFeature::Databinding(f) => &f.warnings,
            ScannedFeature::Reference(f) => &f.warnings,
            ScannedFeature::PolymerCoreFeature(f) => &f.warnings,
            ScannedFeature::ElementReference(f) => &f.warnings,
        }
    }
}

// ---------------------------------------------------------------------------
// Resolved features
// ---------------------------------------------------------------------------

/// Arena-indexed handle to a resolved feature: the owning document plus the
/// feature's position in that document's local feature list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FeatureId {
    pub document: DocumentId,
    pub index: usize,
}

/// A resolved cross-document reference. `target` is `None` when resolution
/// failed; the warnings say why.
#[derive(Debug, Clone)]
pub struct Reference {
    pub kind: &'static str,
    pub identifier: String,
    pub target: Option<FeatureId>,
    pub range: SourceRange,
    pub warnings: Vec<Warning>,
}

/// The document itself, as a feature of kind `document`.
#[derive(Debug, Clone)]
pub struct DocumentFeature {
    pub document: DocumentId,
    pub url: ResolvedUrl,
    pub range: SourceRange,
}

#[derive(Debug, Clone)]
pub struct Import {
    pub kind: &'static str,
    pub url: FileRelativeUrl,
    pub resolved_url: Option<ResolvedUrl>,
    /// Target document; present even for not-yet-`done` targets in cyclic
    /// graphs, absent when the target failed to load.
    pub document: Option<DocumentId>,
    pub lazy: bool,
    pub range: SourceRange,
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Clone)]
pub struct Element {
    pub tag_name: Option<String>,
    pub class_name: Option<String>,
    pub superclass: Option<Reference>,
    pub mixins: Vec<Reference>,
    pub behaviors: Vec<Reference>,
    pub members: ElementMembers,
    pub slots: Vec<Slot>,
    pub demos: Vec<Demo>,
    pub description: String,
    pub summary: String,
    pub privacy: Privacy,
    pub pseudo: bool,
    pub range: SourceRange,
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Clone)]
pub struct ElementMixin {
    pub name: String,
    pub members: ElementMembers,
    pub description: String,
    pub summary: String,
    pub privacy: Privacy,
    pub range: SourceRange,
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Clone)]
pub struct Namespace {
    pub name: String,
    pub description: String,
    pub summary: String,
    pub range: SourceRange,
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Clone)]
pub struct Function {
    pub name: String,
    pub params: Vec<MethodParam>,
    pub return_type: Option<String>,
    pub return_description: Option<String>,
    pub description: String,
    pub summary: String,
    pub privacy: Privacy,
    pub range: SourceRange,
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Clone)]
pub struct Behavior {
    pub name: String,
    pub members: ElementMembers,
    pub description: String,
    pub summary: String,
    pub range: SourceRange,
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Clone)]
pub struct DomModule {
    pub id: Option<String>,
    pub slots: Vec<Slot>,
    pub range: SourceRange,
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Clone)]
pub struct PolymerCoreFeature {
    pub description: String,
    pub members: ElementMembers,
    pub range: SourceRange,
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Clone)]
pub struct ElementReference {
    pub tag_name: String,
    pub attributes: Vec<Attribute>,
    pub range: SourceRange,
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Clone)]
pub enum Feature {
    Document(DocumentFeature),
    Import(Import),
    Element(Element),
    ElementMixin(ElementMixin),
    Namespace(Namespace),
    Function(Function),
    Behavior(Behavior),
    DomModule(DomModule),
    Databinding(ScannedDatabinding),
    Reference(Reference),
    PolymerCoreFeature(PolymerCoreFeature),
    ElementReference(ElementReference),
}

impl Feature {
    /// The set of kind tags this feature answers to.
    pub fn kinds(&self) -> Vec<&'static str> {
        match self {
            Feature::Document(_) => vec![kinds::DOCUMENT],
            Feature::Import(i) => vec![kinds::IMPORT, i.kind],
            Feature::Element(e) => {
                let mut k = vec![kinds::ELEMENT, kinds::POLYMER_ELEMENT];
                if e.pseudo {
                    k.push(kinds::PSEUDO_ELEMENT);
                }
                k
            }
            Feature::ElementMixin(_) => vec![kinds::ELEMENT_MIXIN],
            Feature::Namespace(_) => vec![kinds::NAMESPACE],
            Feature::Function(_) => vec![kinds::FUNCTION],
            Feature::Behavior(_) => vec![kinds::BEHAVIOR],
            Feature::DomModule(_) => vec![kinds::DOM_MODULE],
            Feature::Databinding(_) => vec![kinds::DATABINDING],
            Feature::Reference(_) => vec![kinds::REFERENCE],
            Feature::PolymerCoreFeature(_) => vec![kinds::POLYMER_CORE_FEATURE],
            Feature::ElementReference(_) => vec![kinds::ELEMENT_REFERENCE],
        }
    }

    /// The identifiers this feature can be looked up by.
    pub fn identifiers(&self) -> Vec<String> {
        match self {
            Feature::Document(d) => vec![d.url.as_str().to_string()],
            Feature::Import(_) => Vec::new(),
            Feature::Element(e) => {
                let mut ids = Vec::new();
                if let Some(tag) = &e.tag_name {
                    ids.push(tag.clone());
                }
                if let Some(class) = &e.class_name {
                    ids.push(class.clone());
                }
                ids
            }
            Feature::ElementMixin(m) => vec![m.name.clone()],
            Feature::Namespace(n) => vec![n.name.clone()],
            Feature::Function(f) => vec![f.name.clone()],
            Feature::Behavior(b) => vec![b.name.clone()],
            Feature::DomModule(m) => m.id.clone().into_iter().collect(),
            Feature::Databinding(_) => Vec::new(),
            Feature::Reference(r) => vec![r.identifier.clone()],
            Feature::PolymerCoreFeature(_) => Vec::new(),
            Feature::ElementReference(r) => vec![r.tag_name.clone()],
        }
    }

    pub fn has_kind(&self, kind: &str) -> bool {
        self.kinds().contains(&kind)
    }

    pub fn has_identifier(&self, id: &str) -> bool {
        self.identifiers().iter().any(|i| i == id)
    }

    pub fn source_range(&self) -> &SourceRange {
        match self {
            Feature::Document(f) => &f.range,
            Feature::Import(f) => &f.range,
            Feature::Element(f) => &f.range,
            Feature::ElementMixin(f) => &f.range,
            Feature::Namespace(f) => &f.range,
            Feature::Function(f) => &f.range,
            Feature::Behavior(f) => &f.range,
            Feature::DomModule(f) => &f.range,
            Feature::Databinding(f) => &f.range,
            Feature::Reference(f) => &f.range,
            Feature::PolymerCoreFeature(f) => &f.range,
            Feature::ElementReference(f) => &f.range,
        }
    }

    pub fn warnings(&self) -> &[Warning] {
        match self {
            Feature::Document(_) => &[],
            Feature::Import(f) => &f.warnings,
            Feature::Element(f) => &f.warnings,
            Feature::ElementMixin(f) => &f.warnings,
            Feature::Namespace(f) => &f.warnings,
            Feature::Function(f) => &f.warnings,
            Feature::Behavior(f) => &f.warnings,
            Feature::DomModule(f) => &f.warnings,
            Feature::Databinding(f) => &f.warnings,
            Feature::Reference(f) => &f.warnings,
            Feature::PolymerCoreFeature(f) => &f.warnings,
            Feature::ElementReference(f) => &f.warnings,
        }
    }

    /// Nested references whose warnings count toward the owning document.
    pub fn reference_warnings(&self) -> Vec<&Warning> {
        let mut out = Vec::new();
        if let Feature::Element(e) = self {
            if let Some(s) = &e.superclass {
                out.extend(s.warnings.iter());
            }
            for m in &e.mixins {
                out.extend(m.warnings.iter());
            }
            for b in &e.behaviors {
                out.extend(b.warnings.iter());
            }
        }
        out
    }
}
