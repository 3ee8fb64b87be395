//! Light inline markup in phase descriptions: blank lines separate
//! paragraphs and `**` pairs on one line mark bold spans.

const BOLD_MARKER: &str = "**";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emphasis {
    Plain,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span<'a> {
    pub text: &'a str,
    pub emphasis: Emphasis,
}

impl<'a> Span<'a> {
    fn plain(text: &'a str) -> Self {
        Self {
            text,
            emphasis: Emphasis::Plain,
        }
    }

    fn bold(text: &'a str) -> Self {
        Self {
            text,
            emphasis: Emphasis::Bold,
        }
    }
}

pub type Paragraph<'a> = Vec<Span<'a>>;

pub fn paragraphs(body: &str) -> Vec<Paragraph<'_>> {
    body.split("\n\n").map(spans).collect()
}

/// Splits one paragraph. A marker with no closing partner on the same
/// line stays in the text, and empty spans are dropped.
pub fn spans(paragraph: &str) -> Paragraph<'_> {
    let mut result = Vec::new();
    let mut rest = paragraph;
    let mut plain_start = 0;
    let mut cursor = 0;
    while let Some(open) = rest.find(BOLD_MARKER) {
        let inner_start = open + BOLD_MARKER.len();
        let closing = rest[inner_start..]
            .find(BOLD_MARKER)
            .filter(|close| !rest[inner_start..inner_start + close].contains('\n'));
        match closing {
            Some(close) => {
                let inner = &rest[inner_start..inner_start + close];
                push_plain(&mut result, &paragraph[plain_start..cursor + open]);
                if !inner.is_empty() {
                    result.push(Span::bold(inner));
                }
                let consumed = inner_start + close + BOLD_MARKER.len();
                cursor += consumed;
                plain_start = cursor;
                rest = &rest[consumed..];
            }
            None => {
                // Not a bold opener; step past its first star only.
                cursor += open + 1;
                rest = &rest[open + 1..];
            }
        }
    }
    push_plain(&mut result, &paragraph[plain_start..]);
    result
}

fn push_plain<'a>(result: &mut Paragraph<'a>, text: &'a str) {
    if !text.is_empty() {
        result.push(Span::plain(text));
    }
}

/// The paragraph text with markers removed.
pub fn plain_text(paragraph: &[Span<'_>]) -> String {
    paragraph.iter().map(|span| span.text).collect()
}
