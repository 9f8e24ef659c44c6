use std::ops::Range;

use crate::region::Region;

/// Closed regions directly inside a region at `depth` spanning `content`,
/// in document order.
pub(crate) fn children_of<'r>(
    closed: &'r [Region],
    depth: usize,
    content: &Range<usize>,
) -> Vec<&'r Region> {
    let mut children: Vec<&Region> = closed
        .iter()
        .filter(|r| {
            r.depth == depth + 1 && r.content.start >= content.start && r.content.end <= content.end
        })
        .collect();
    children.sort_by_key(|r| r.start_marker.start);
    children
}

/// Splice each child's resolved content into `raw`, or cut the child out
/// entirely when it is marked `alone`.
///
/// `raw` is the parent's inner text, which begins at byte `start` of the
/// document. Child spans are in document coordinates; `origin` maps them onto
/// the working string as it shrinks.
pub(crate) fn splice(raw: &str, start: usize, children: &[&Region]) -> String {
    let mut working = raw.to_string();
    let mut origin = start;

    for child in children {
        let span = child.outer_span();
        let local = span.start - origin..span.end - origin;
        let replacement = if child.attributes.is_alone() {
            ""
        } else {
            child.resolved_content.as_str()
        };

        let before = working.len();
        working.replace_range(local, replacement);
        // A child's resolved text is always shorter than its marked span.
        origin += before - working.len();
    }

    working
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::AttributeSet;

    fn region(depth: usize, outer: Range<usize>, marker_len: usize, resolved: &str, attrs: &str) -> Region {
        Region {
            name: "r".to_string(),
            attributes: AttributeSet::parse(attrs),
            depth,
            start_marker: outer.start..outer.start + marker_len,
            content: outer.start + marker_len..outer.end - marker_len,
            end_marker: outer.end - marker_len..outer.end,
            resolved_content: resolved.to_string(),
        }
    }

    #[test]
    fn children_are_filtered_by_depth_and_range_then_sorted() {
        let closed = vec![
            region(2, 40..60, 5, "b", ""),
            region(3, 12..20, 2, "deep", ""),
            region(2, 10..30, 5, "a", ""),
            region(2, 200..220, 5, "outside", ""),
        ];
        let kids = children_of(&closed, 1, &(5..100));
        let resolved: Vec<&str> = kids.iter().map(|r| r.resolved_content.as_str()).collect();
        assert_eq!(resolved, vec!["a", "b"]);
    }

    #[test]
    fn splice_replaces_and_removes_without_drift() {
        // Document positions 100.. hold: "A[xx1xx]B[yy2yy]C"
        let raw = "A[xx1xx]B[yy2yy]C";
        let first = region(2, 101..108, 3, "1", "");
        let second = region(2, 109..116, 3, "2", "alone");
        assert_eq!(splice(raw, 100, &[&first, &second]), "A1BC");
    }
}
