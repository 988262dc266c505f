use gist_core::{Config, Result, TextExtractor};
use scraper::{ElementRef, Html, Selector};

/// Subtrees that never hold article text.
const SKIPPED_TAGS: &[&str] = &[
    "head", "script", "style", "noscript", "template", "nav", "header", "footer", "aside",
    "form", "svg", "iframe", "button",
];

const BLOCK_TAGS: &[&str] = &[
    "address", "article", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption", "figure",
    "h1", "h2", "h3", "h4", "h5", "h6", "hr", "li", "main", "ol", "p", "pre", "section",
    "table", "td", "th", "tr", "ul",
];

/// Most specific container first.
const CONTENT_ROOTS: &[&str] = &["article", "main", "body"];

/// HTML to plain text: one paragraph per block element, wrapped at a fixed width.
#[derive(Debug, Clone)]
pub struct HtmlTextExtractor {
    wrap_width: usize,
}

impl HtmlTextExtractor {
    pub fn new(wrap_width: usize) -> Self {
        Self {
            wrap_width: wrap_width.max(1),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.wrap_width)
    }
}

impl TextExtractor for HtmlTextExtractor {
    fn extract(&self, html: &str) -> Result<String> {
        let document = Html::parse_document(html);
        let root = CONTENT_ROOTS
            .iter()
            .find_map(|tag| {
                Selector::parse(tag)
                    .ok()
                    .and_then(|selector| document.select(&selector).next())
            })
            .unwrap_or_else(|| document.root_element());

        let mut blocks = Vec::new();
        let mut current = String::new();
        collect_blocks(root, &mut current, &mut blocks);
        flush(&mut current, &mut blocks);

        Ok(blocks
            .iter()
            .map(|block| wrap(block, self.wrap_width))
            .collect::<Vec<_>>()
            .join("\n\n"))
    }
}

fn collect_blocks(element: ElementRef<'_>, current: &mut String, blocks: &mut Vec<String>) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            current.push_str(text);
        } else if let Some(child_element) = ElementRef::wrap(child) {
            let name = child_element.value().name();
            if SKIPPED_TAGS.contains(&name) {
                continue;
            }
            let is_block = BLOCK_TAGS.contains(&name);
            if is_block {
                flush(current, blocks);
            }
            collect_blocks(child_element, current, blocks);
            if is_block {
                flush(current, blocks);
            }
        }
    }
}

fn flush(current: &mut String, blocks: &mut Vec<String>) {
    let block = current.split_whitespace().collect::<Vec<_>>().join(" ");
    if !block.is_empty() {
        blocks.push(block);
    }
    current.clear();
}

/// Greedy word wrap. Words longer than `width` get a line of their own.
fn wrap(text: &str, width: usize) -> String {
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut line_len = 0;

    for word in text.split_whitespace() {
        let len = word.chars().count();
        if line_len > 0 && line_len + 1 + len > width {
            lines.push(std::mem::take(&mut line));
            line_len = 0;
        }
        if line_len > 0 {
            line.push(' ');
            line_len += 1;
        }
        line.push_str(word);
        line_len += len;
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html>
          <head><title>Ignored title</title><style>p { color: red; }</style></head>
          <body>
            <nav><a href="/">Home</a> <a href="/world">World</a></nav>
            <article>
              <h1>Budget   approved</h1>
              <p>The council <b>approved</b> the budget on Tuesday.</p>
              <script>trackPageView();</script>
              <p>Spending rises by 4&nbsp;percent &amp; taxes stay flat.</p>
              <aside>Related: other stories</aside>
            </article>
            <footer>Copyright 2024</footer>
          </body>
        </html>
    "#;

    #[test]
    fn test_extracts_article_blocks() {
        let text = HtmlTextExtractor::new(80).extract(PAGE).unwrap();
        assert_eq!(
            text,
            "Budget approved\n\n\
             The council approved the budget on Tuesday.\n\n\
             Spending rises by 4 percent & taxes stay flat."
        );
    }

    #[test]
    fn test_skips_boilerplate() {
        let text = HtmlTextExtractor::new(80).extract(PAGE).unwrap();
        for noise in ["Home", "trackPageView", "Copyright", "Related", "color: red", "Ignored"] {
            assert!(!text.contains(noise), "found {:?} in {:?}", noise, text);
        }
    }

    #[test]
    fn test_falls_back_to_body() {
        let html = "<html><body><div>First</div><div>Second <i>part</i></div></body></html>";
        let text = HtmlTextExtractor::new(80).extract(html).unwrap();
        assert_eq!(text, "First\n\nSecond part");
    }

    #[test]
    fn test_wraps_at_width() {
        let html = "<p>one two three four five six seven</p>";
        let text = HtmlTextExtractor::new(10).extract(html).unwrap();
        assert_eq!(text, "one two\nthree four\nfive six\nseven");
        assert!(text.lines().all(|line| line.chars().count() <= 10));
    }

    #[test]
    fn test_long_word_not_split() {
        assert_eq!(wrap("a incomprehensibilities b", 5), "a\nincomprehensibilities\nb");
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(HtmlTextExtractor::new(80).extract("").unwrap(), "");
    }
}
