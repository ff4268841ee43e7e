//! XML preprocessing applied before deserialization

use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

/// Strip inline formatting tags from EFetch XML
///
/// Titles, abstracts and affiliations may contain `<i>`, `<sup>`, `<sub>`,
/// `<b>` and similar markup. quick-xml's serde deserializer splits mixed
/// content around such tags, so they are removed while their text is kept.
///
/// ```ignore
/// let cleaned = strip_inline_html_tags("<AbstractText>CO<sup>2</sup> levels</AbstractText>");
/// assert_eq!(cleaned, "<AbstractText>CO2 levels</AbstractText>");
/// ```
pub(crate) fn strip_inline_html_tags(xml: &str) -> String {
    static INLINE_TAG_REGEX: OnceLock<Regex> = OnceLock::new();
    let re = INLINE_TAG_REGEX.get_or_init(|| {
        Regex::new(r"</?(?:i|b|u|sup|sub|em|strong|italic|bold)(?:\s[^>]*)?>")
            .expect("inline tag pattern is valid")
    });

    let cleaned = re.replace_all(xml, "");

    if cleaned.len() != xml.len() {
        debug!(
            original_bytes = xml.len(),
            cleaned_bytes = cleaned.len(),
            "Stripped inline HTML tags"
        );
    }

    cleaned.into_owned()
}
