use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::attributes::AttributeSet;
use crate::markup::MarkupVisitor;
use crate::parser::error::ParseError;
use crate::parser::resolve;
use crate::region::Region;

/// `#name rest...` inside an opening marker comment.
static OPENING_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#([A-Za-z0-9_-]+)((?s).*)").unwrap());

// ---------------------------------------------------------------------------
// Scan state
// ---------------------------------------------------------------------------

/// Everything one pass over a document accumulates.
pub(crate) struct ScanState<'a> {
    source: &'a str,
    file_id: usize,
    /// Element nesting from start/end tags. Diagnostic only.
    markup_depth: isize,
    /// Region nesting: opening markers seen minus closing markers seen.
    region_depth: usize,
    /// Open regions. Innermost = last.
    stack: Vec<RegionBuilder>,
    /// Closed regions in closing order.
    closed: Vec<Region>,
}

struct RegionBuilder {
    name: String,
    attributes: AttributeSet,
    depth: usize,
    start_marker: Range<usize>,
}

impl<'a> ScanState<'a> {
    pub(crate) fn new(source: &'a str, file_id: usize) -> Self {
        ScanState {
            source,
            file_id,
            markup_depth: 0,
            region_depth: 0,
            stack: Vec::new(),
            closed: Vec::new(),
        }
    }

    fn open_region(&mut self, text: &str, span: Range<usize>) {
        self.region_depth += 1;

        // A `#` comment without a valid name still counts toward the depth,
        // so the next closing marker will not match anything.
        let Some(caps) = OPENING_MARKER.captures(text) else {
            debug!(marker = text, depth = self.region_depth, "unnamed opening marker");
            return;
        };

        let name = caps[1].to_string();
        debug!(name = %name, depth = self.region_depth, "region opened");
        self.stack.push(RegionBuilder {
            name,
            attributes: AttributeSet::parse(&caps[2]),
            depth: self.region_depth,
            start_marker: span,
        });
    }

    fn close_region(&mut self, text: &str, span: Range<usize>) -> Result<(), ParseError> {
        let Some(builder) = self.stack.pop() else {
            return Err(ParseError::error(
                "closing region marker without an open region",
                span,
                self.file_id,
            )
            .with_note(format!("`{}` has no matching opening marker", text.trim())));
        };

        if builder.depth != self.region_depth {
            return Err(ParseError::error("mismatched closing region marker", span, self.file_id)
                .with_related(
                    builder.start_marker.clone(),
                    format!("region `{}` opened here", builder.name),
                )
                .with_note(format!(
                    "region `{}` was opened at depth {} but closed at depth {}",
                    builder.name, builder.depth, self.region_depth
                )));
        }

        let content = builder.start_marker.end..span.start;
        let children = resolve::children_of(&self.closed, builder.depth, &content);
        let resolved_content =
            resolve::splice(&self.source[content.clone()], content.start, &children);

        debug!(
            name = %builder.name,
            depth = builder.depth,
            children = children.len(),
            "region closed"
        );

        self.closed.push(Region {
            name: builder.name,
            attributes: builder.attributes,
            depth: builder.depth,
            start_marker: builder.start_marker,
            content,
            end_marker: span,
            resolved_content,
        });
        self.region_depth -= 1;
        Ok(())
    }

    pub(crate) fn finalize(self) -> Vec<Region> {
        for open in &self.stack {
            warn!(
                name = %open.name,
                offset = open.start_marker.start,
                "region never closed; dropping it"
            );
        }
        if self.markup_depth != 0 {
            debug!(depth = self.markup_depth, "unbalanced element tags at end of document");
        }
        self.closed
    }
}

// ---------------------------------------------------------------------------
// Tokenizer events
// ---------------------------------------------------------------------------

impl MarkupVisitor for ScanState<'_> {
    type Error = ParseError;

    fn start_tag(&mut self, _name: &str, unary: bool, _span: Range<usize>) -> Result<(), ParseError> {
        if !unary {
            self.markup_depth += 1;
        }
        Ok(())
    }

    fn end_tag(&mut self, name: &str, span: Range<usize>) -> Result<(), ParseError> {
        self.markup_depth -= 1;
        if self.markup_depth < 0 {
            debug!(tag = name, offset = span.start, "end tag without matching start tag");
        }
        Ok(())
    }

    fn comment(&mut self, text: &str, span: Range<usize>) -> Result<(), ParseError> {
        if text.starts_with('#') {
            self.open_region(text, span);
        } else if text.starts_with("/#") {
            self.close_region(text, span)?;
        }
        Ok(())
    }
}
