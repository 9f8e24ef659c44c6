use std::ops::Range;

use crate::attributes::AttributeSet;

/// A named span of the document delimited by `<!--#name ...-->` and
/// `<!--/#name-->`.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    /// Name from the opening marker.
    pub name: String,
    pub attributes: AttributeSet,
    /// Region nesting depth; root regions are 1.
    pub depth: usize,
    /// Byte span of the opening marker, comment delimiters included.
    pub start_marker: Range<usize>,
    /// Raw inner text: end of the opening marker to start of the closing one.
    pub content: Range<usize>,
    /// Byte span of the closing marker, comment delimiters included.
    pub end_marker: Range<usize>,
    /// Inner text with every child region spliced in or cut out.
    pub resolved_content: String,
}

impl Region {
    /// Everything from the opening marker's `<` to the closing marker's `>`.
    pub fn outer_span(&self) -> Range<usize> {
        self.start_marker.start..self.end_marker.end
    }
}
