/// Trim blank edge lines and re-base indentation on the first non-blank line.
///
/// Every kept line loses up to as many leading spaces/tabs as the first
/// non-blank line starts with. Lines indented less than that are only
/// stripped of what they have; deeper lines keep the excess.
pub fn adjust_indent(content: &str) -> String {
    let content = content.replace('\r', "");
    let mut kept: Vec<&str> = Vec::new();
    let mut pending: Vec<&str> = Vec::new();

    for line in content.split('\n') {
        if line.trim().is_empty() {
            // Interior blank lines survive only once more content follows.
            if !kept.is_empty() {
                pending.push(line);
            }
        } else {
            kept.append(&mut pending);
            kept.push(line);
        }
    }

    let Some(first) = kept.first() else {
        return String::new();
    };
    let width = leading_indent(first);

    kept.iter()
        .map(|line| &line[leading_indent(line).min(width)..])
        .collect::<Vec<_>>()
        .join("\n")
}

/// Byte length of the leading run of spaces and tabs.
fn leading_indent(line: &str) -> usize {
    line.len() - line.trim_start_matches([' ', '\t']).len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_blank_edges_and_rebases() {
        let input = "\n   \n  foo\n    bar\n\n\t\n";
        assert_eq!(adjust_indent(input), "foo\n  bar");
    }

    #[test]
    fn idempotent() {
        let once = adjust_indent("\n\n  foo\n    bar\n\n");
        assert_eq!(adjust_indent(&once), once);
    }

    #[test]
    fn keeps_interior_blank_lines() {
        assert_eq!(adjust_indent("  a\n\n  b"), "a\n\nb");
    }

    #[test]
    fn only_first_line_indent_is_removed() {
        // Lines shallower than the first keep nothing extra to strip.
        assert_eq!(adjust_indent("    a\n  b\n      c"), "a\nb\n  c");
    }

    #[test]
    fn mixed_tabs_and_spaces_count_as_characters() {
        assert_eq!(adjust_indent("\t\tx\n \t y"), "x\n y");
    }

    #[test]
    fn strips_carriage_returns() {
        assert_eq!(adjust_indent("  a\r\n  b\r\n"), "a\nb");
    }

    #[test]
    fn all_blank_is_empty() {
        assert_eq!(adjust_indent(" \n\t\n"), "");
        assert_eq!(adjust_indent(""), "");
    }
}
