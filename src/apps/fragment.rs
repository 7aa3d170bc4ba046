// Inert HTML fragments with named regions
//
// A region is delimited by `<!--region:NAME-->` and `<!--/region:NAME-->`
// comments. Actions never touch markup outside the region they target.

use std::fmt;

/// Region every app reserves for action results
pub const RESULT_REGION: &str = "result";

/// Markup for an empty-or-default region
pub fn region(name: &str, content: &str) -> String {
    format!("<!--region:{name}-->{content}<!--/region:{name}-->")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    html: String,
}

impl Fragment {
    pub fn new(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.html
    }

    pub fn into_html(self) -> String {
        self.html
    }

    fn region_bounds(&self, name: &str) -> Option<(usize, usize)> {
        let open = format!("<!--region:{name}-->");
        let close = format!("<!--/region:{name}-->");
        let start = self.html.find(&open)? + open.len();
        let end = start + self.html[start..].find(&close)?;
        Some((start, end))
    }

    /// Current content of a region
    pub fn region(&self, name: &str) -> Option<&str> {
        self.region_bounds(name)
            .map(|(start, end)| &self.html[start..end])
    }

    /// Replace a region's content; false when the fragment has no such region
    pub fn fill_region(&mut self, name: &str, content: &str) -> bool {
        match self.region_bounds(name) {
            Some((start, end)) => {
                self.html.replace_range(start..end, content);
                true
            }
            None => false,
        }
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_roundtrip() {
        let html = format!("<div>{}</div>", region(RESULT_REGION, "<p>placeholder</p>"));
        let mut fragment = Fragment::new(html);

        assert_eq!(fragment.region(RESULT_REGION), Some("<p>placeholder</p>"));
        assert!(fragment.fill_region(RESULT_REGION, "<h3>Plan</h3>"));
        assert_eq!(fragment.region(RESULT_REGION), Some("<h3>Plan</h3>"));
        assert_eq!(
            fragment.as_str(),
            "<div><!--region:result--><h3>Plan</h3><!--/region:result--></div>"
        );
    }

    #[test]
    fn test_missing_region() {
        let mut fragment = Fragment::new("<div>no regions</div>");
        assert_eq!(fragment.region(RESULT_REGION), None);
        assert!(!fragment.fill_region(RESULT_REGION, "x"));
        assert_eq!(fragment.as_str(), "<div>no regions</div>");
    }

    #[test]
    fn test_regions_are_independent() {
        let html = format!("{}{}", region("status", "idle"), region(RESULT_REGION, ""));
        let mut fragment = Fragment::new(html);

        fragment.fill_region(RESULT_REGION, "done");
        assert_eq!(fragment.region("status"), Some("idle"));
        assert_eq!(fragment.region(RESULT_REGION), Some("done"));
    }
}
