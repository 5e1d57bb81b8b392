//! HTML parser for extracting ranked item names
//!
//! A listing page holds one container element; the ranked items are the
//! elements inside it matching the item selector, in document order.

use scraper::{Html, Selector};

/// Extracts the ordered item names from a listing page
///
/// A page without the container is a page past the end of the listing and
/// yields no names. Items whose text is blank are skipped.
///
/// # Example
///
/// ```
/// use rank_ripple::crawler::extract_names;
///
/// let html = r#"<div class="col-md-8"><span class="server-name">Alpha</span></div>"#;
/// let names = extract_names(html, "div.col-md-8", "span.server-name").unwrap();
/// assert_eq!(names, vec!["Alpha"]);
/// ```
pub fn extract_names(
    html: &str,
    container_selector: &str,
    item_selector: &str,
) -> Result<Vec<String>, String> {
    let container_sel = Selector::parse(container_selector)
        .map_err(|e| format!("invalid container selector '{}': {:?}", container_selector, e))?;
    let item_sel = Selector::parse(item_selector)
        .map_err(|e| format!("invalid item selector '{}': {:?}", item_selector, e))?;

    let document = Html::parse_document(html);

    let Some(container) = document.select(&container_sel).next() else {
        return Ok(Vec::new());
    };

    let names = container
        .select(&item_sel)
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|name| !name.is_empty())
        .collect();

    Ok(names)
}
