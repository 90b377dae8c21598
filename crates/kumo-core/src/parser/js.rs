//! Script parsing
//!
//! Wraps swc for the ECMAScript side of the analyzer. Every parse uses a
//! fresh `SourceMap`, so swc's 1-indexed `BytePos` maps to byte offsets by
//! subtracting one. Parse failures never escape: the registry converts them
//! into `parse-error` warnings and a synthetic empty document.

use std::sync::Arc;

use swc_common::comments::{CommentKind, SingleThreadedComments};
use swc_common::sync::Lrc;
use swc_common::{FileName, SourceMap, Spanned};
use swc_ecma_ast::{EsVersion, Program};
use swc_ecma_parser::{parse_file_as_program, EsSyntax, Syntax};

use crate::text::{LineIndex, LocationOffset};
use crate::urls::ResolvedUrl;
use crate::warnings::SourceRange;

/// A comment extracted from the parse, with byte offsets into the source.
#[derive(Debug, Clone)]
pub struct JsComment {
    pub block: bool,
    pub start: usize,
    pub end: usize,
    /// Comment text without the `//` or `/* */` markers.
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct JsParseError {
    pub message: String,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug)]
pub struct JsDocument {
    /// Identity of this document; inline documents carry an
    /// `#inline-script-<n>` fragment.
    pub url: ResolvedUrl,
    /// URL source ranges point into. For inline documents this is the
    /// containing document.
    pub source_url: ResolvedUrl,
    pub source: Arc<str>,
    pub program: Program,
    /// All comments, sorted by start offset.
    pub comments: Vec<JsComment>,
    pub line_index: LineIndex,
    /// Offset of this document's content inside `source_url`.
    pub offset: LocationOffset,
    pub is_inline: bool,
}

impl JsDocument {
    /// A fresh per-parse `SourceMap` makes `BytePos` 1-indexed, so byte
    /// offsets are `pos - 1`.
    pub fn span_offsets(&self, span: swc_common::Span) -> (usize, usize) {
        (
            (span.lo.0 as usize).saturating_sub(1),
            (span.hi.0 as usize).saturating_sub(1),
        )
    }

    pub fn range_of_span(&self, span: swc_common::Span) -> SourceRange {
        let (lo, hi) = self.span_offsets(span);
        self.range_of_offsets(lo, hi)
    }

    pub fn range_of_offsets(&self, start: usize, end: usize) -> SourceRange {
        SourceRange::new(
            self.source_url.clone(),
            self.offset.translate(self.line_index.position(start)),
            self.offset.translate(self.line_index.position(end)),
        )
    }

    pub fn text_of_span(&self, span: swc_common::Span) -> &str {
        let (lo, hi) = self.span_offsets(span);
        &self.source[lo.min(self.source.len())..hi.min(self.source.len())]
    }

    /// The block comment attached to a node starting at `offset`: the nearest
    /// preceding block comment with only whitespace in between.
    pub fn attached_comment(&self, offset: usize) -> Option<&JsComment> {
        let candidate = self
            .comments
            .iter()
            .take_while(|c| c.end <= offset)
            .filter(|c| c.block)
            .last()?;
        let between = &self.source[candidate.end..offset];
        between.chars().all(char::is_whitespace).then_some(candidate)
    }
}

pub struct JsParseOutcome {
    pub document: JsDocument,
    pub errors: Vec<JsParseError>,
}

/// Parse script source, recovering where possible. On a fatal parse error
/// the outcome carries a synthetic empty program plus the error.
pub fn parse_js(
    url: ResolvedUrl,
    source_url: ResolvedUrl,
    text: &str,
    offset: LocationOffset,
    is_inline: bool,
) -> JsParseOutcome {
    let source_map: Lrc<SourceMap> = Default::default();
    let fm = source_map.new_source_file(
        FileName::Custom(url.as_str().to_string()).into(),
        text.to_string(),
    );
    let comments = SingleThreadedComments::default();
    let syntax = Syntax::Es(EsSyntax::default());

    let mut recovered = Vec::new();
    let result = parse_file_as_program(
        &fm,
        syntax,
        EsVersion::latest(),
        Some(&comments),
        &mut recovered,
    );

    let mut errors: Vec<JsParseError> = recovered
        .into_iter()
        .map(|e| to_parse_error(&e))
        .collect();

    let program = match result {
        Ok(program) => program,
        Err(e) => {
            errors.push(to_parse_error(&e));
            Program::Script(swc_ecma_ast::Script {
                span: swc_common::DUMMY_SP,
                body: Vec::new(),
                shebang: None,
            })
        }
    };

    let document = JsDocument {
        url,
        source_url,
        source: Arc::from(text),
        program,
        comments: collect_comments(&comments),
        line_index: LineIndex::new(text),
        offset,
        is_inline,
    };

    JsParseOutcome { document, errors }
}

/// Parse a databinding expression: the source is wrapped as `0||(EXPR)` to
/// get an expression-level entry point out of the statement parser.
pub fn parse_expression(text: &str) -> Result<(), String> {
    let source_map: Lrc<SourceMap> = Default::default();
    let fm = source_map.new_source_file(
        FileName::Custom("expression".into()).into(),
        format!("0||({text}\n)"),
    );
    let mut recovered = Vec::new();
    let result = parse_file_as_program(
        &fm,
        Syntax::Es(EsSyntax::default()),
        EsVersion::latest(),
        None,
        &mut recovered,
    );
    match result {
        Ok(_) if recovered.is_empty() => Ok(()),
        Ok(_) => Err(recovered
            .first()
            .map(|e| e.kind().msg().to_string())
            .unwrap_or_else(|| "invalid expression".to_string())),
        Err(e) => Err(e.kind().msg().to_string()),
    }
}

fn to_parse_error(e: &swc_ecma_parser::error::Error) -> JsParseError {
    let span = e.span();
    JsParseError {
        message: e.kind().msg().to_string(),
        start: (span.lo.0 as usize).saturating_sub(1),
        end: (span.hi.0 as usize).saturating_sub(1),
    }
}

fn collect_comments(comments: &SingleThreadedComments) -> Vec<JsComment> {
    let mut all = Vec::new();
    let (leading, trailing) = comments.borrow_all();
    for list in leading.values().chain(trailing.values()) {
        for c in list {
            all.push(JsComment {
                block: c.kind == CommentKind::Block,
                start: (c.span.lo.0 as usize).saturating_sub(1),
                end: (c.span.hi.0 as usize).saturating_sub(1),
                text: c.text.to_string(),
            });
        }
    }
    all.sort_by_key(|c| (c.start, c.end));
    all.dedup_by_key(|c| (c.start, c.end));
    all
}
