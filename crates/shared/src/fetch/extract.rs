use scraper::{ElementRef, Html, Selector};

const MAIN_CONTENT_SELECTOR: &str =
    "div.content, div.main, div.article, div#content, div#main, div#article";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedPage {
    pub title: String,
    pub content: String,
}

/// Pulls readable text out of an HTML document.
///
/// The body is scanned in passes: paragraphs, headings (`[h2] text`), list
/// items (`- text`), tables (a `[table]` marker then one `a | b` line per
/// row), articles, and common main-content containers. Non-empty parts are
/// joined with blank lines. Text that appears in more than one pass (a
/// paragraph inside an article) is kept each time.
pub fn extract_page_text(html: &str) -> ExtractedPage {
    let document = Html::parse_document(html);

    let title = selector("title")
        .and_then(|title| document.select(&title).next())
        .map(element_text)
        .unwrap_or_default();

    let mut parts = Vec::new();
    if let Some(body) = selector("body").and_then(|body| document.select(&body).next()) {
        collect_text(&body, "p", &mut parts, |text, _| text);
        collect_text(&body, "h1, h2, h3, h4, h5, h6", &mut parts, |text, element| {
            format!("[{}] {text}", element.value().name())
        });
        collect_text(&body, "li", &mut parts, |text, _| format!("- {text}"));
        collect_tables(&body, &mut parts);
        collect_text(&body, "article", &mut parts, |text, _| text);
        collect_text(&body, MAIN_CONTENT_SELECTOR, &mut parts, |text, _| text);
    }

    ExtractedPage {
        title,
        content: parts.join("\n\n"),
    }
}

fn collect_text<F>(root: &ElementRef<'_>, css: &str, parts: &mut Vec<String>, format: F)
where
    F: Fn(String, &ElementRef<'_>) -> String,
{
    let Some(selector) = selector(css) else {
        return;
    };
    for element in root.select(&selector) {
        let text = element_text(element);
        if !text.is_empty() {
            parts.push(format(text, &element));
        }
    }
}

fn collect_tables(root: &ElementRef<'_>, parts: &mut Vec<String>) {
    let (Some(table), Some(row), Some(cell)) =
        (selector("table"), selector("tr"), selector("td, th"))
    else {
        return;
    };

    for table in root.select(&table) {
        parts.push("[table]".to_string());
        for row in table.select(&row) {
            let cells = row
                .select(&cell)
                .map(element_text)
                .filter(|text| !text.is_empty())
                .collect::<Vec<_>>();
            if !cells.is_empty() {
                parts.push(cells.join(" | "));
            }
        }
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}
