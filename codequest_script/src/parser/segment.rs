//! Splitting comment-free script text into logical units.

/// Block keywords that open a braced unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Keyword {
    If,
    For,
}

impl Keyword {
    fn text(self) -> &'static str {
        match self {
            Keyword::If => "if",
            Keyword::For => "for",
        }
    }
}

/// One logical unit of script text. Offsets are byte positions in the stripped source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Unit<'a> {
    /// A single statement ending at `;` or the end of the line.
    Simple { text: &'a str, offset: usize },
    /// `header { body }` with balanced braces.
    Block {
        keyword: Keyword,
        header: &'a str,
        body: &'a str,
        body_offset: usize,
        text: &'a str,
        offset: usize,
    },
    /// A block header whose closing brace never arrives. Covers the header
    /// through its `{`; the lines after it are split as usual.
    Unterminated { text: &'a str, offset: usize },
}

impl Unit<'_> {
    pub(super) fn text(&self) -> &str {
        match self {
            Unit::Simple { text, .. } | Unit::Block { text, .. } | Unit::Unterminated { text, .. } => text,
        }
    }

    pub(super) fn offset(&self) -> usize {
        match self {
            Unit::Simple { offset, .. } | Unit::Block { offset, .. } | Unit::Unterminated { offset, .. } => *offset,
        }
    }
}

/// Remove `//` comments up to the end of each line. Line structure is preserved.
pub fn strip_comments(source: &str) -> String {
    source
        .lines()
        .map(|line| line.find("//").map_or(line, |idx| &line[..idx]))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Split `text` into units. `base` is the offset of `text` within the full stripped source.
pub(super) fn split_units(text: &str, base: usize) -> Vec<Unit<'_>> {
    let mut units = Vec::new();
    let mut pos = 0usize;

    while pos < text.len() {
        let rest = &text[pos..];
        let trimmed = rest.trim_start();
        if trimmed.is_empty() {
            break;
        }
        pos += rest.len() - trimmed.len();
        let rest = &text[pos..];

        if let Some(keyword) = block_keyword(rest)
            && let Some(open) = rest.find('{')
            && plausible_header(keyword, &rest[..open])
        {
            if let Some(close) = matching_brace(rest, open) {
                units.push(Unit::Block {
                    keyword,
                    header: rest[..open].trim(),
                    body: &rest[open + 1..close],
                    body_offset: base + pos + open + 1,
                    text: &rest[..=close],
                    offset: base + pos,
                });
                pos += close + 1;
                continue;
            }
            units.push(Unit::Unterminated {
                text: &rest[..=open],
                offset: base + pos,
            });
            pos += open + 1;
            continue;
        }

        let end = match rest.find([';', '\n']) {
            Some(idx) if rest.as_bytes()[idx] == b';' => idx + 1,
            Some(idx) => idx,
            None => rest.len(),
        };
        units.push(Unit::Simple {
            text: rest[..end].trim_end(),
            offset: base + pos,
        });
        pos += end;
    }

    units
}

fn block_keyword(text: &str) -> Option<Keyword> {
    [Keyword::If, Keyword::For].into_iter().find(|keyword| {
        text.strip_prefix(keyword.text())
            .is_some_and(|after| !after.starts_with(|c: char| c.is_ascii_alphanumeric() || c == '_'))
    })
}

/// A header that already contains statement punctuation belongs to a
/// brace-less line, not to a brace found further down the script.
fn plausible_header(keyword: Keyword, header: &str) -> bool {
    if header.contains('}') {
        return false;
    }
    let semicolons = header.matches(';').count();
    match keyword {
        Keyword::If => semicolons == 0,
        Keyword::For => semicolons <= 2,
    }
}

fn matching_brace(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (idx, byte) in text.bytes().enumerate().skip(open) {
        match byte {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(idx);
                }
            },
            _ => {},
        }
    }
    None
}

/// Maps byte offsets to 1-based line numbers.
pub(super) struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub(super) fn new(source: &str) -> Self {
        let mut starts = vec![0usize];
        for (i, ch) in source.char_indices() {
            if ch == '\n' {
                starts.push(i + 1);
            }
        }
        Self { line_starts: starts }
    }

    pub(super) fn line_of(&self, offset: usize) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(i) => i + 1,
            Err(i) => i,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts<'a>(units: &'a [Unit<'a>]) -> Vec<&'a str> {
        units.iter().map(Unit::text).collect()
    }

    #[test]
    fn comments_are_removed_but_lines_kept() {
        let stripped = strip_comments("a = 1; // set a\n// whole line\nb();");
        assert_eq!(stripped, "a = 1; \n\nb();");
    }

    #[test]
    fn simple_units_split_on_semicolons_and_newlines() {
        let units = split_units("moveLeft(); jump();\nspee d= 10\n\n  moveRight();", 0);
        assert_eq!(texts(&units), vec!["moveLeft();", "jump();", "spee d= 10", "moveRight();"]);
    }

    #[test]
    fn blocks_span_lines_until_matching_brace() {
        let src = "if (enemyNear) {\n  moveBack();\n}\nmoveRight();";
        let units = split_units(src, 0);
        assert_eq!(units.len(), 2);
        match &units[0] {
            Unit::Block { keyword, header, body, .. } => {
                assert_eq!(*keyword, Keyword::If);
                assert_eq!(*header, "if (enemyNear)");
                assert_eq!(body.trim(), "moveBack();");
            },
            other => panic!("expected block, got {other:?}"),
        }
        assert_eq!(units[1].text(), "moveRight();");
    }

    #[test]
    fn for_header_semicolons_do_not_split_the_block() {
        let units = split_units("for (int i = 0; i < 3; i++) { shoot(); }", 0);
        assert!(matches!(units.as_slice(), [Unit::Block { keyword: Keyword::For, .. }]));
    }

    #[test]
    fn identifiers_starting_with_keywords_are_not_blocks() {
        let units = split_units("iffy = 2;\nformat = 3;", 0);
        assert!(units.iter().all(|unit| matches!(unit, Unit::Simple { .. })));
    }

    #[test]
    fn braceless_if_line_stays_a_simple_unit() {
        let units = split_units("if (enemyNear) moveBack();\nfor (int i = 0; i < 2; i++) { shoot(); }", 0);
        assert_eq!(units.len(), 2);
        assert!(matches!(units[0], Unit::Simple { .. }));
        assert!(matches!(units[1], Unit::Block { .. }));
    }

    #[test]
    fn unclosed_block_covers_only_its_header() {
        let units = split_units("moveRight();\nif (enemyNear) {\n moveBack();\njump();\n", 0);
        assert_eq!(texts(&units), vec!["moveRight();", "if (enemyNear) {", "moveBack();", "jump();"]);
        assert!(matches!(units[1], Unit::Unterminated { .. }));
        assert!(matches!(units[2], Unit::Simple { .. }));
    }

    #[test]
    fn offsets_map_to_line_numbers() {
        let src = "jump();\n\nif (enemyNear) {\n  moveBack();\n}";
        let index = LineIndex::new(src);
        let units = split_units(src, 0);
        let lines: Vec<_> = units.iter().map(|unit| index.line_of(unit.offset())).collect();
        assert_eq!(lines, vec![1, 3]);
        if let Unit::Block { body, body_offset, .. } = &units[1] {
            let inner = split_units(body, *body_offset);
            assert_eq!(index.line_of(inner[0].offset()), 4);
        }
    }
}
