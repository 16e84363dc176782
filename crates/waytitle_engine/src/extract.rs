use scraper::{Html, Selector};

/// Pull the document's `<title>` text, trimmed. `None` when the element is
/// missing or its text is empty.
pub fn extract_title(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    let title_sel = Selector::parse("title").ok()?;

    doc.select(&title_sel)
        .next()
        .map(|node| node.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
}
