//! Documentation comment rendering.
//!
//! Option descriptions are free-form markdown written for a manual. They are
//! reflowed into `///` lines that fit the generated file: prose paragraphs are
//! re-wrapped, while fenced code blocks and list items keep their line
//! structure.

use std::fmt::Write as _;

/// Column limit for generated documentation, prefix included.
pub const DOC_WIDTH: usize = 80;

#[derive(Debug, PartialEq)]
enum Block {
    Paragraph(String),
    Verbatim(Vec<String>),
    Break,
}

/// Normalize a line for use in a `///` comment.
pub fn sanitize_doc_line(line: &str) -> String {
    let line = line.replace('\t', "    ");
    line.trim_end().to_string()
}

fn is_list_item(line: &str) -> bool {
    let line = line.trim_start();
    if line.starts_with("- ") || line.starts_with("* ") {
        return true;
    }
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    digits > 0 && line[digits..].starts_with(". ")
}

fn split_blocks(description: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut paragraph = String::new();
    let mut fence: Option<Vec<String>> = None;

    let flush = |paragraph: &mut String, blocks: &mut Vec<Block>| {
        if !paragraph.is_empty() {
            blocks.push(Block::Paragraph(std::mem::take(paragraph)));
        }
    };

    for raw in description.lines() {
        let line = sanitize_doc_line(raw);
        let trimmed = line.trim_start();

        if let Some(code) = fence.as_mut() {
            code.push(line.clone());
            if trimmed.starts_with("```") {
                if let Some(code) = fence.take() {
                    blocks.push(Block::Verbatim(code));
                }
            }
            continue;
        }

        if trimmed.starts_with("```") {
            flush(&mut paragraph, &mut blocks);
            fence = Some(vec![trimmed.to_string()]);
        } else if trimmed.is_empty() {
            flush(&mut paragraph, &mut blocks);
            if !matches!(blocks.last(), None | Some(Block::Break)) {
                blocks.push(Block::Break);
            }
        } else if is_list_item(trimmed) {
            // Every item starts its own paragraph; continuation lines join it.
            flush(&mut paragraph, &mut blocks);
            paragraph.push_str(trimmed);
        } else {
            if !paragraph.is_empty() {
                paragraph.push(' ');
            }
            paragraph.push_str(trimmed);
        }
    }

    flush(&mut paragraph, &mut blocks);
    // An unterminated fence is kept as written.
    if let Some(code) = fence {
        blocks.push(Block::Verbatim(code));
    }
    while matches!(blocks.last(), Some(Block::Break)) {
        blocks.pop();
    }
    blocks
}

/// Greedy word wrap; a word longer than `width` gets a line of its own.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        if !line.is_empty() && line.chars().count() + 1 + word.chars().count() > width {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Reflow `description` into comment lines (without the `///` prefix).
///
/// Empty strings separate paragraphs.
pub fn reflow(description: &str, width: usize) -> Vec<String> {
    let width = width.max(20);
    let mut out = Vec::new();
    for block in split_blocks(description) {
        match block {
            Block::Paragraph(text) => out.extend(wrap(&text, width)),
            Block::Verbatim(lines) => out.extend(lines),
            Block::Break => out.push(String::new()),
        }
    }
    out
}

/// Write a sanitized doc comment line with proper prefix
pub fn write_doc_line(buf: &mut String, text: &str, indent: &str) -> std::fmt::Result {
    let text = sanitize_doc_line(text);
    if text.is_empty() {
        writeln!(buf, "{indent}///")
    } else {
        writeln!(buf, "{indent}/// {text}")
    }
}

/// Write `description` as a reflowed `///` comment; empty descriptions write nothing.
pub fn write_doc_comment(buf: &mut String, description: &str, indent: &str) -> std::fmt::Result {
    let width = DOC_WIDTH.saturating_sub(indent.len() + 4);
    for line in reflow(description, width) {
        write_doc_line(buf, &line, indent)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraphs_are_rewrapped() {
        let text = "Whether to\nenable the service.\n\n\nSecond   paragraph.";
        assert_eq!(
            reflow(text, 76),
            vec!["Whether to enable the service.", "", "Second paragraph."]
        );
    }

    #[test]
    fn test_long_paragraph_wraps() {
        let text = "alpha beta gamma delta epsilon zeta eta theta iota kappa";
        for line in reflow(text, 20) {
            assert!(line.len() <= 20, "{line:?} is too long");
        }
    }

    #[test]
    fn test_code_fences_are_verbatim() {
        let text = "Example:\n```nix\n{\n  enable = true;\n}\n```\nDone.";
        assert_eq!(
            reflow(text, 76),
            vec!["Example:", "```nix", "{", "  enable = true;", "}", "```", "Done."]
        );
    }

    #[test]
    fn test_list_items_keep_their_lines() {
        let text = "Modes:\n- `fast`: quick\n  and dirty\n- `slow`: careful\n1. first";
        assert_eq!(
            reflow(text, 76),
            vec!["Modes:", "- `fast`: quick and dirty", "- `slow`: careful", "1. first"]
        );
    }

    #[test]
    fn test_write_doc_comment() {
        let mut buf = String::new();
        write_doc_comment(&mut buf, "A submodule.", "    ").expect("fmt");
        assert_eq!(buf, "    /// A submodule.\n");

        let mut empty = String::new();
        write_doc_comment(&mut empty, "  \n\n", "").expect("fmt");
        assert!(empty.is_empty());
    }
}
