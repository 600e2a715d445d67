/// Opening and closing marker of a code block.
const FENCE: &str = "```";

/// Marker around strong emphasis.
const STRONG: &str = "**";

/// A formatted fragment of assistant text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Literal text, never interpreted any further.
    Text(String),

    /// `**strong**` emphasis. Never spans lines.
    Strong(String),

    LineBreak,

    /// A fenced code block. The code is kept verbatim, minus the newline
    /// before the closing fence.
    CodeBlock {
        language: Option<String>,
        code: String,
    },
}

/// Parse assistant text into formatted nodes.
///
/// An unterminated fence, an unmatched `**` or any other markup is kept as
/// literal text. Adjacent text is merged into a single [`Node::Text`].
#[must_use]
pub fn parse(input: &str) -> Vec<Node> {
    let input = input.replace("\r\n", "\n");
    let mut nodes = Nodes::default();
    let mut rest = input.as_str();

    while let Some((before, block, after)) = next_code_block(rest) {
        // The block starts and ends its own line.
        nodes.inline(before.strip_suffix('\n').unwrap_or(before));
        nodes.0.push(block);
        rest = after.strip_prefix('\n').unwrap_or(after);
    }

    nodes.inline(rest);
    nodes.0
}

/// Split `s` around its first complete code block.
fn next_code_block(s: &str) -> Option<(&str, Node, &str)> {
    let start = s.find(FENCE)?;
    let (info, body) = s[start + FENCE.len()..].split_once('\n')?;
    let end = body.find(FENCE)?;

    let code = &body[..end];
    let code = code.strip_suffix('\n').unwrap_or(code);

    let block = Node::CodeBlock {
        language: language(info),
        code: code.to_owned(),
    };

    Some((&s[..start], block, &body[end + FENCE.len()..]))
}

/// The language tag of a fence info line, if it looks like one.
fn language(info: &str) -> Option<String> {
    info.split_whitespace()
        .next()
        .filter(|tag| {
            tag.chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '_' | '#' | '.'))
        })
        .map(str::to_owned)
}

#[derive(Default)]
struct Nodes(Vec<Node>);

impl Nodes {
    fn inline(&mut self, text: &str) {
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                self.0.push(Node::LineBreak);
            }

            self.line(line);
        }
    }

    fn line(&mut self, mut line: &str) {
        while let Some(start) = line.find(STRONG) {
            let inner = &line[start + STRONG.len()..];

            match inner.find(STRONG) {
                Some(end) if !inner[..end].trim().is_empty() => {
                    self.text(&line[..start]);
                    self.0.push(Node::Strong(inner[..end].to_owned()));
                    line = &inner[end + STRONG.len()..];
                }
                _ => {
                    self.text(&line[..start + STRONG.len()]);
                    line = inner;
                }
            }
        }

        self.text(line);
    }

    fn text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }

        match self.0.last_mut() {
            Some(Node::Text(prev)) => prev.push_str(text),
            _ => self.0.push(Node::Text(text.to_owned())),
        }
    }
}

#[cfg(test)]
#[path = "format_tests.rs"]
mod tests;
