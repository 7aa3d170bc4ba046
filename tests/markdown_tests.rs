// Markdown renderer behavior through the public API

use matcha::markdown::render;

#[test]
fn test_plain_text_is_one_paragraph_with_breaks() {
    for input in ["hello", "first line\nsecond line", "a\nb\nc"] {
        let expected = format!("<p>{}</p>", input.replace('\n', "<br>"));
        assert_eq!(render(input), expected, "input: {:?}", input);
    }
}

#[test]
fn test_plain_text_with_markup_characters_comes_back_as_entities() {
    assert_eq!(render("it's"), "<p>it&#39;s</p>");
    assert_eq!(
        render("salt & pepper\n\"a\" < b > c"),
        "<p>salt &amp; pepper<br>&quot;a&quot; &lt; b &gt; c</p>"
    );
}

#[test]
fn test_heading_then_single_list() {
    let html = render("### A\n\n* one\n* two");

    assert_eq!(html, "<h3>A</h3><ul><li>one</li><li>two</li></ul>");
    assert_eq!(html.matches("<ul>").count(), 1);
    assert_eq!(html.matches("<li>").count(), 2);
    assert!(!html.contains("<p>"));
}

#[test]
fn test_bold_only() {
    let html = render("**bold**");

    assert_eq!(html.matches("<strong>bold</strong>").count(), 1);
    assert!(!html.contains('*'));
}

#[test]
fn test_meal_plan_shaped_answer() {
    let answer = "## Plan 1: Ginger pork\n\
                  **Overview**: quick and filling\n\n\
                  * cabbage\n\
                  * eggs\n\n\
                  ---\n\n\
                  ## Plan 2: Okonomiyaki\n\
                  Kids love it.";

    let html = render(answer);

    assert!(html.starts_with("<h2>Plan 1: Ginger pork</h2>"));
    assert!(html.contains("<p><strong>Overview</strong>: quick and filling</p>"));
    assert!(html.contains("<ul><li>cabbage</li><li>eggs</li></ul>"));
    assert!(html.contains("<hr>"));
    assert!(html.ends_with("<h2>Plan 2: Okonomiyaki</h2><p>Kids love it.</p>"));
}

#[test]
fn test_markup_in_answer_is_escaped() {
    let html = render("<img src=x onerror=alert(1)>");
    assert!(!html.contains("<img"));
    assert!(html.contains("&lt;img"));
}
