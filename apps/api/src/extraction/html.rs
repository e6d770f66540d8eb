//! HTML → dense plain text for job posting pages.

use scraper::{ElementRef, Html};

/// Elements whose whole subtree is page chrome or code rather than readable content.
const SKIPPED_ELEMENTS: [&str; 5] = ["script", "style", "header", "footer", "nav"];

/// Elements that end a line of text, so adjacent blocks never run together.
const BLOCK_ELEMENTS: [&str; 22] = [
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "h1", "h2",
    "h3", "h4", "h5", "h6", "li", "main", "ol", "p", "section", "tr", "ul",
];

/// Parses `html` and returns its readable text.
///
/// Skipped subtrees contribute nothing. Remaining text nodes are concatenated in
/// document order, with a line break after each block element, and then run
/// through [`collapse_whitespace`].
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut raw = String::new();
    collect_text(document.root_element(), &mut raw);
    collapse_whitespace(&raw)
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            let name = child_element.value().name();
            if SKIPPED_ELEMENTS.contains(&name) {
                continue;
            }
            collect_text(child_element, out);
            if BLOCK_ELEMENTS.contains(&name) {
                out.push('\n');
            }
        } else if let Some(text) = child.value().as_text() {
            out.push_str(text);
        }
    }
}

/// Trims every line, splits lines on double-space runs, and keeps only the
/// non-empty phrases, one per line.
pub fn collapse_whitespace(raw: &str) -> String {
    raw.lines()
        .map(str::trim)
        .flat_map(|line| line.split("  "))
        .map(str::trim)
        .filter(|phrase| !phrase.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_excluded_paragraph_kept() {
        let html = r#"<html><body>
            <script>var tracking = "do-not-keep";</script>
            <p>Requires Go and Redis.</p>
        </body></html>"#;
        let text = html_to_text(html);
        assert!(text.contains("Requires Go and Redis."));
        assert!(!text.contains("do-not-keep"));
    }

    #[test]
    fn test_chrome_elements_are_dropped() {
        let html = r#"<html><head><style>.x { color: red; }</style></head><body>
            <header>Sign in | Jobs</header>
            <nav><a href="/">Home</a><a href="/jobs">Careers</a></nav>
            <main><h1>Backend Engineer</h1><p>Kubernetes and Terraform.</p></main>
            <footer>Copyright 2024</footer>
        </body></html>"#;
        let text = html_to_text(html);
        assert_eq!(text, "Backend Engineer\nKubernetes and Terraform.");
    }

    #[test]
    fn test_nested_skipped_element_inside_content() {
        let html = "<div><p>Keep this</p><div><nav>drop this</nav><span>and this stays</span></div></div>";
        let text = html_to_text(html);
        assert_eq!(text, "Keep this\nand this stays");
    }

    #[test]
    fn test_collapse_blank_lines_and_double_spaces() {
        let raw = "  Senior Engineer  \n\n\n   Rust    Tokio  \n \t\nPostgres";
        assert_eq!(collapse_whitespace(raw), "Senior Engineer\nRust\nTokio\nPostgres");
    }

    #[test]
    fn test_inline_markup_stays_on_one_line() {
        let html = "<ul><li>Experience with <b>Go</b> and <em>Redis</em></li><li>Docker</li></ul>";
        assert_eq!(html_to_text(html), "Experience with Go and Redis\nDocker");
    }

    #[test]
    fn test_single_spaces_are_preserved() {
        assert_eq!(collapse_whitespace("Build REST APIs in Go"), "Build REST APIs in Go");
    }

    #[test]
    fn test_page_without_content_is_empty() {
        let html = "<html><body><script>render()</script><nav>Menu</nav></body></html>";
        assert!(html_to_text(html).is_empty());
    }
}
