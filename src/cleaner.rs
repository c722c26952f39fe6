//! Regex-based HTML noise removal for the LLM fallback path.
//!
//! The goal is not a faithful DOM walk: it is to bound the size and noise
//! of the text handed to the completion service. Rules run in a fixed
//! order over the raw markup, then entities are decoded, whitespace is
//! collapsed, and the result is truncated to the configured budget.

use html_escape::decode_html_entities;
use regex::Regex;
use std::sync::LazyLock;

/// Script/style/noscript blocks, contents included.
static SCRIPT_BLOCKS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(script|style|noscript)\b[^>]*>.*?</(script|style|noscript)>")
        .expect("invalid script-block regex")
});

/// Containers whose id/class marks them as comments, sidebars, ads, or
/// social chrome. Non-greedy, so nested noise containers may leave inner
/// fragments behind; the tag-strip pass removes whatever markup remains.
static NOISE_CONTAINERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?is)<(div|section|aside|ul|ol|form)\b[^>]*(?:id|class)\s*=\s*["'][^"']*(?:comment|review|respond|sidebar|related|recommended|advert|ads\b|\bad\b|-ad-|sponsor|promo|share|social)[^"']*["'][^>]*>.*?</(div|section|aside|ul|ol|form)>"#,
    )
    .expect("invalid noise-container regex")
});

/// Page chrome wrappers.
static CHROME_WRAPPERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(header|footer|nav)\b[^>]*>.*?</(header|footer|nav)>")
        .expect("invalid chrome-wrapper regex")
});

/// Any remaining tag.
static ANY_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]+>").expect("invalid tag regex"));

/// Strip noise from raw page markup and return plain text, truncated to
/// `max_chars` characters.
pub fn clean_html(html: &str, max_chars: usize) -> String {
    let text = SCRIPT_BLOCKS.replace_all(html, " ");
    let text = NOISE_CONTAINERS.replace_all(&text, " ");
    let text = CHROME_WRAPPERS.replace_all(&text, " ");
    let text = ANY_TAG.replace_all(&text, " ");
    let text = decode_html_entities(&text);

    let collapsed = text.split_whitespace().collect::<Vec<&str>>().join(" ");
    truncate_chars(&collapsed, max_chars)
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
