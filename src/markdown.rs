// Markdown to HTML rendering for AI responses
//
// Renders the small Markdown subset the text-generation endpoint is asked to
// produce: `##`/`###` headings, `**bold**`, `* ` bullet lists, `---` rules and
// blank-line separated paragraphs. This is not a general Markdown engine.
//
// Pass order is fixed: headings and bold first, then list items and rules,
// then list runs are wrapped, and only then is the text split into
// paragraphs. Running the paragraph pass earlier wraps headings and lists in
// `<p>` tags.

use regex::Regex;
use std::sync::LazyLock;

static HEADING_3: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^### (.*)$").expect("valid h3 pattern"));

static HEADING_2: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^## (.*)$").expect("valid h2 pattern"));

static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*([^*]+)\*\*").expect("valid bold pattern"));

static LIST_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\* (.*)$").expect("valid list item pattern"));

static RULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^-{3,}[ \t]*$").expect("valid rule pattern"));

static BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t]*\n\s*").expect("valid block separator pattern"));

/// Render a Markdown response as an HTML fragment
///
/// Total: malformed or unexpected input never fails, it simply comes out as
/// escaped text inside a paragraph.
///
/// Input is HTML-escaped before any substitution, so plain text comes back
/// verbatim inside `<p>` only when it holds none of `& < > " '`; those come
/// back as entities (`it's` renders as `<p>it&#39;s</p>`).
///
/// # Example
/// ```
/// let html = matcha::markdown::render("### Dinner\n\n* rice\n* miso soup");
/// assert_eq!(html, "<h3>Dinner</h3><ul><li>rice</li><li>miso soup</li></ul>");
/// ```
pub fn render(markdown: &str) -> String {
    let text = escape_html(&markdown.replace("\r\n", "\n"));

    let text = HEADING_3.replace_all(&text, "<h3>$1</h3>");
    let text = HEADING_2.replace_all(&text, "<h2>$1</h2>");
    let text = BOLD.replace_all(&text, "<strong>$1</strong>");
    let text = LIST_ITEM.replace_all(&text, "<li>$1</li>");
    let text = RULE.replace_all(&text, "<hr>");

    let text = wrap_list_runs(&text);

    let html: String = BLANK_LINES
        .split(&text)
        .map(|block| block.trim_matches('\n'))
        .filter(|block| !block.trim().is_empty())
        .map(group_block)
        .collect();

    html.replace('\n', "<br>")
}

/// Escape the characters that would otherwise be interpreted as markup
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Wrap each run of consecutive `<li>` lines in a single `<ul>`
///
/// The run collapses onto one line so no `<br>` lands between items.
fn wrap_list_runs(text: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut run: Vec<&str> = Vec::new();

    for line in text.split('\n') {
        if line.starts_with("<li>") {
            run.push(line);
            continue;
        }
        if !run.is_empty() {
            lines.push(format!("<ul>{}</ul>", run.concat()));
            run.clear();
        }
        lines.push(line.to_string());
    }
    if !run.is_empty() {
        lines.push(format!("<ul>{}</ul>", run.concat()));
    }

    lines.join("\n")
}

fn is_block_line(line: &str) -> bool {
    ["<h2>", "<h3>", "<ul>", "<hr>"]
        .iter()
        .any(|tag| line.starts_with(tag))
}

/// Turn one blank-line separated block into HTML
///
/// Heading, list and rule lines pass through untouched; the remaining lines
/// are grouped into paragraphs, keeping their single newlines for `<br>`.
fn group_block(block: &str) -> String {
    let mut out = String::new();
    let mut paragraph: Vec<&str> = Vec::new();

    for line in block.split('\n') {
        if is_block_line(line) {
            flush_paragraph(&mut out, &mut paragraph);
            out.push_str(line);
        } else {
            paragraph.push(line);
        }
    }
    flush_paragraph(&mut out, &mut paragraph);

    out
}

fn flush_paragraph(out: &mut String, paragraph: &mut Vec<&str>) {
    if paragraph.iter().any(|line| !line.trim().is_empty()) {
        out.push_str("<p>");
        out.push_str(&paragraph.join("\n"));
        out.push_str("</p>");
    }
    paragraph.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_becomes_single_paragraph() {
        assert_eq!(render("hello world"), "<p>hello world</p>");
        assert_eq!(
            render("first line\nsecond line\nthird"),
            "<p>first line<br>second line<br>third</p>"
        );
    }

    #[test]
    fn test_heading_followed_by_list() {
        let html = render("### A\n\n* one\n* two");
        assert_eq!(html, "<h3>A</h3><ul><li>one</li><li>two</li></ul>");
        assert_eq!(html.matches("<ul>").count(), 1);
        assert_eq!(html.matches("<li>").count(), 2);
        assert!(!html.contains("<p>"));
    }

    #[test]
    fn test_heading_directly_above_list() {
        let html = render("## Menu\n* rice\n* soup");
        assert_eq!(html, "<h2>Menu</h2><ul><li>rice</li><li>soup</li></ul>");
    }

    #[test]
    fn test_bold_span() {
        let html = render("**bold**");
        assert_eq!(html, "<p><strong>bold</strong></p>");
        assert_eq!(html.matches("<strong>").count(), 1);
        assert!(!html.contains('*'));
    }

    #[test]
    fn test_bold_is_non_greedy() {
        let html = render("**a** and **b**");
        assert_eq!(html, "<p><strong>a</strong> and <strong>b</strong></p>");
    }

    #[test]
    fn test_unmatched_bold_left_as_text() {
        assert_eq!(render("**open only"), "<p>**open only</p>");
    }

    #[test]
    fn test_horizontal_rule_not_wrapped() {
        let html = render("above\n\n---\n\nbelow");
        assert_eq!(html, "<p>above</p><hr><p>below</p>");
    }

    #[test]
    fn test_separate_runs_get_separate_lists() {
        let html = render("* a\n* b\n\n* c");
        assert_eq!(html, "<ul><li>a</li><li>b</li></ul><ul><li>c</li></ul>");
    }

    #[test]
    fn test_text_line_before_list_in_same_block() {
        let html = render("Try these:\n* udon\n* soba");
        assert_eq!(html, "<p>Try these:</p><ul><li>udon</li><li>soba</li></ul>");
    }

    #[test]
    fn test_bold_inside_heading_and_list() {
        let html = render("### **Plan 1**\n\n* **Overview**: stir fry");
        assert_eq!(
            html,
            "<h3><strong>Plan 1</strong></h3><ul><li><strong>Overview</strong>: stir fry</li></ul>"
        );
    }

    #[test]
    fn test_markup_in_input_is_escaped() {
        let html = render("<script>alert(1)</script>");
        assert_eq!(html, "<p>&lt;script&gt;alert(1)&lt;/script&gt;</p>");
    }

    #[test]
    fn test_crlf_and_extra_blank_lines() {
        let html = render("one\r\n\r\n\r\ntwo\r\n");
        assert_eq!(html, "<p>one</p><p>two</p>");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(render(""), "");
        assert_eq!(render("\n\n\n"), "");
    }

    #[test]
    fn test_mid_line_markers_stay_inline() {
        assert_eq!(render("a * b ### c"), "<p>a * b ### c</p>");
    }
}
