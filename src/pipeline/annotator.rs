//! Annotator: replace a text leaf with ruby-annotated tokens
//!
//! For one scanned unit: check relevance, tokenize, decide per token whether
//! it gets a reading, and splice the result into the tree in place of the
//! original text node. The concatenated base texts always equal the
//! original text.

use serde::{Deserialize, Serialize};

use crate::dom::{Document, NodeId};
use crate::pipeline::scanner::TextUnit;
use crate::romaji::Romanizer;
use crate::script::{is_japanese, is_kana, PageScript};
use crate::tokenizer::{reconstructs, Token, Tokenizer};

// =============================================================================
// Types
// =============================================================================

/// One piece of an annotated unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AnnotatedSpan {
    /// Token with no meaningful reading, kept as bare text
    Plain { text: String },
    /// `<ruby>base<rt>reading</rt></ruby>`
    Ruby { base: String, reading: String },
}

impl AnnotatedSpan {
    /// Text as it appears in the page
    pub fn base(&self) -> &str {
        match self {
            AnnotatedSpan::Plain { text } => text,
            AnnotatedSpan::Ruby { base, .. } => base,
        }
    }

    pub fn is_ruby(&self) -> bool {
        matches!(self, AnnotatedSpan::Ruby { .. })
    }
}

/// Why a unit was left untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SkipReason {
    /// No script this page annotates
    NotEligible,
    /// Tokenizer returned nothing
    NoTokens,
    /// Tokens do not reproduce the text
    TokenMismatch,
    /// Annotation was turned off while tokenizing
    Disabled,
    /// Node is gone, detached or no longer holds the scanned text
    Stale,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotateOutcome {
    Skipped(SkipReason),
    Annotated {
        spans: Vec<AnnotatedSpan>,
        /// Nodes now occupying the unit's old position
        nodes: Vec<NodeId>,
    },
}

// =============================================================================
// Annotator
// =============================================================================

pub struct Annotator {
    tokenizer: Box<dyn Tokenizer>,
    romanizer: Box<dyn Romanizer>,
    annotation_class: String,
}

impl Annotator {
    pub fn new(
        tokenizer: Box<dyn Tokenizer>,
        romanizer: Box<dyn Romanizer>,
        annotation_class: impl Into<String>,
    ) -> Self {
        Self {
            tokenizer,
            romanizer,
            annotation_class: annotation_class.into(),
        }
    }

    pub fn annotation_class(&self) -> &str {
        &self.annotation_class
    }

    /// Decide how one token renders
    pub fn span_for(&self, token: &Token) -> AnnotatedSpan {
        let pronunciation = token.pronunciation_str();
        let reads_as_kana = is_kana(pronunciation);
        if reads_as_kana || is_japanese(&token.surface_form) {
            let source = if reads_as_kana {
                pronunciation
            } else {
                token.surface_form.as_str()
            };
            AnnotatedSpan::Ruby {
                base: token.surface_form.clone(),
                reading: self.romanizer.romanize(source),
            }
        } else {
            AnnotatedSpan::Plain {
                text: token.surface_form.clone(),
            }
        }
    }

    /// Tokenize `text` and decide every span, without touching any tree.
    ///
    /// Returns `Err` when the tokenizer yields nothing or tokens that do not
    /// reproduce `text`.
    pub fn plan(&self, text: &str) -> Result<Vec<AnnotatedSpan>, SkipReason> {
        let tokens = self.tokenizer.tokenize(text);
        if tokens.is_empty() {
            return Err(SkipReason::NoTokens);
        }
        if !reconstructs(text, &tokens) {
            log::warn!(
                "tokenizer output does not reproduce {:?}; leaving it untouched",
                text
            );
            return Err(SkipReason::TokenMismatch);
        }
        Ok(tokens
            .iter()
            .filter(|t| !t.surface_form.is_empty())
            .map(|t| self.span_for(t))
            .collect())
    }

    /// Annotate one unit in place.
    ///
    /// `is_enabled` is consulted after tokenizing and right before the tree
    /// is touched, so a disable that lands mid-way wins.
    pub fn annotate(
        &self,
        doc: &mut Document,
        unit: &TextUnit,
        page: PageScript,
        is_enabled: impl Fn() -> bool,
    ) -> AnnotateOutcome {
        if !page.is_eligible(&unit.text) {
            return AnnotateOutcome::Skipped(SkipReason::NotEligible);
        }
        let spans = match self.plan(&unit.text) {
            Ok(spans) => spans,
            Err(reason) => return AnnotateOutcome::Skipped(reason),
        };
        if !is_enabled() {
            return AnnotateOutcome::Skipped(SkipReason::Disabled);
        }
        if doc.text(unit.node) != Some(unit.text.as_str()) {
            return AnnotateOutcome::Skipped(SkipReason::Stale);
        }
        let Some(parent) = doc.parent(unit.node) else {
            return AnnotateOutcome::Skipped(SkipReason::Stale);
        };

        doc.begin_internal();
        let nodes = self.splice(doc, parent, unit.node, &spans);
        doc.end_internal();

        AnnotateOutcome::Annotated { spans, nodes }
    }

    fn splice(
        &self,
        doc: &mut Document,
        parent: NodeId,
        original: NodeId,
        spans: &[AnnotatedSpan],
    ) -> Vec<NodeId> {
        let mut nodes = Vec::with_capacity(spans.len());
        let mut previous = original;

        for (i, span) in spans.iter().enumerate() {
            let node = self.build(doc, span);
            if i == 0 {
                doc.replace_child(parent, node, original);
            } else {
                doc.insert_after(previous, node);
            }
            nodes.push(node);
            previous = node;
        }
        doc.drop_subtree(original);
        nodes
    }

    fn build(&self, doc: &mut Document, span: &AnnotatedSpan) -> NodeId {
        match span {
            AnnotatedSpan::Plain { text } => doc.create_text(text),
            AnnotatedSpan::Ruby { base, reading } => {
                let ruby = doc.create_element("ruby");
                doc.add_class(ruby, &self.annotation_class);
                doc.append_text(ruby, base);
                let rt = doc.append_element(ruby, "rt");
                doc.append_text(rt, reading);
                ruby
            }
        }
    }
}

/// Concatenated base text of `spans`
pub fn base_text(spans: &[AnnotatedSpan]) -> String {
    spans.iter().map(AnnotatedSpan::base).collect()
}

// =============================================================================
// Tests
// =============================================================================
