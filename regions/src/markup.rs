//! Minimal HTML-like tokenizer.
//!
//! Walks a template and reports start tags, end tags and comments with their
//! byte spans to a [`MarkupVisitor`]. It does not build a tree, check nesting
//! or look at attributes; the marker scanner only needs comment positions and
//! a rough element depth.

use std::ops::Range;

/// Elements that never have a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Elements whose content is not markup.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea"];

/// Receives tokenizer events in document order.
///
/// Returning an error from any method stops tokenizing and is passed back
/// out of [`tokenize`].
pub trait MarkupVisitor {
    type Error;

    /// `unary` is true for `<x/>` and for void elements.
    fn start_tag(&mut self, name: &str, unary: bool, span: Range<usize>) -> Result<(), Self::Error>;

    fn end_tag(&mut self, name: &str, span: Range<usize>) -> Result<(), Self::Error>;

    /// `text` is everything between `<!--` and `-->`, untrimmed.
    fn comment(&mut self, text: &str, span: Range<usize>) -> Result<(), Self::Error>;
}

/// Tokenize `source`, feeding every event to `visitor`.
pub fn tokenize<V: MarkupVisitor>(source: &str, visitor: &mut V) -> Result<(), V::Error> {
    let bytes = source.as_bytes();
    let mut pos = 0;

    while let Some(found) = source[pos..].find('<') {
        let lt = pos + found;
        let rest = &source[lt..];

        if rest.starts_with("<!--") {
            let Some(close) = source[lt + 4..].find("-->") else {
                // Unterminated comment swallows the rest of the document.
                return Ok(());
            };
            let text_end = lt + 4 + close;
            visitor.comment(&source[lt + 4..text_end], lt..text_end + 3)?;
            pos = text_end + 3;
        } else if rest.starts_with("<!") || rest.starts_with("<?") {
            pos = match source[lt..].find('>') {
                Some(gt) => lt + gt + 1,
                None => return Ok(()),
            };
        } else if rest.starts_with("</") && bytes.get(lt + 2).is_some_and(u8::is_ascii_alphabetic) {
            let name_end = tag_name_end(source, lt + 2);
            let Some(gt) = source[name_end..].find('>') else {
                return Ok(());
            };
            let end = name_end + gt + 1;
            visitor.end_tag(&source[lt + 2..name_end], lt..end)?;
            pos = end;
        } else if bytes.get(lt + 1).is_some_and(u8::is_ascii_alphabetic) {
            let name_end = tag_name_end(source, lt + 1);
            let Some(end) = start_tag_end(source, name_end) else {
                return Ok(());
            };
            let name = &source[lt + 1..name_end];
            let lower = name.to_ascii_lowercase();
            let self_closing = source[..end - 1].ends_with('/');
            let unary = self_closing || VOID_ELEMENTS.contains(&lower.as_str());
            visitor.start_tag(name, unary, lt..end)?;
            pos = end;

            if !unary && RAW_TEXT_ELEMENTS.contains(&lower.as_str()) {
                // Jump to the closing tag; it is reported on the next pass.
                let needle = format!("</{}", lower);
                match source[pos..].to_ascii_lowercase().find(&needle) {
                    Some(offset) => pos += offset,
                    None => return Ok(()),
                }
            }
        } else {
            pos = lt + 1;
        }
    }

    Ok(())
}

fn tag_name_end(source: &str, from: usize) -> usize {
    source[from..]
        .find(|c: char| c.is_whitespace() || c == '/' || c == '>')
        .map_or(source.len(), |i| from + i)
}

/// Position just past the `>` closing a start tag, skipping quoted values.
fn start_tag_end(source: &str, from: usize) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, c) in source[from..].char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '>') => return Some(from + i + 1),
            (None, _) => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    enum Ev {
        Start(String, bool, Range<usize>),
        End(String, Range<usize>),
        Comment(String, Range<usize>),
    }

    #[derive(Default)]
    struct Recorder(Vec<Ev>);

    impl MarkupVisitor for Recorder {
        type Error = ();

        fn start_tag(&mut self, name: &str, unary: bool, span: Range<usize>) -> Result<(), ()> {
            self.0.push(Ev::Start(name.to_string(), unary, span));
            Ok(())
        }

        fn end_tag(&mut self, name: &str, span: Range<usize>) -> Result<(), ()> {
            self.0.push(Ev::End(name.to_string(), span));
            Ok(())
        }

        fn comment(&mut self, text: &str, span: Range<usize>) -> Result<(), ()> {
            self.0.push(Ev::Comment(text.to_string(), span));
            Ok(())
        }
    }

    fn events(source: &str) -> Vec<Ev> {
        let mut rec = Recorder::default();
        tokenize(source, &mut rec).unwrap();
        rec.0
    }

    #[test]
    fn tags_and_comments_with_spans() {
        let evs = events("<div><!--#a x--><br></div>");
        assert_eq!(
            evs,
            vec![
                Ev::Start("div".into(), false, 0..5),
                Ev::Comment("#a x".into(), 5..16),
                Ev::Start("br".into(), true, 16..20),
                Ev::End("div".into(), 20..26),
            ]
        );
    }

    #[test]
    fn self_closing_and_quoted_gt() {
        let evs = events(r#"<my-comp :a="x > 1" /><p title='>'>"#);
        assert_eq!(
            evs,
            vec![
                Ev::Start("my-comp".into(), true, 0..22),
                Ev::Start("p".into(), false, 22..35),
            ]
        );
    }

    #[test]
    fn script_content_is_opaque() {
        let evs = events("<script>if (a < b) {} // <!--#x--></script><!--y-->");
        assert_eq!(
            evs,
            vec![
                Ev::Start("script".into(), false, 0..8),
                Ev::End("script".into(), 34..43),
                Ev::Comment("y".into(), 43..51),
            ]
        );
    }

    #[test]
    fn doctype_and_stray_lt_are_text() {
        let evs = events("<!DOCTYPE html>a < b<!---->");
        assert_eq!(evs, vec![Ev::Comment(String::new(), 20..27)]);
    }

    #[test]
    fn unterminated_comment_stops() {
        let evs = events("<p><!-- open");
        assert_eq!(evs, vec![Ev::Start("p".into(), false, 0..3)]);
    }
}
