//! Shared text utilities used by the source parsers.

use scraper::Html;

const POST_TEXT_LIMIT: usize = 500;

/// Keyword -> emoji pairs matched case-insensitively against event titles.
/// First hit wins.
const EMOJI_KEYWORDS: &[(&str, &str)] = &[
    ("концерт", "🎵"),
    ("спектакль", "🎭"),
    ("театр", "🎭"),
    ("выставк", "🖼"),
    ("музе", "🖼"),
    ("лекци", "📚"),
    ("кино", "🎬"),
    ("фильм", "🎬"),
    ("фестиваль", "🎪"),
    ("детск", "🧸"),
    ("спорт", "⚽"),
    ("шоу", "🎉"),
];

/// Drop all markup from an HTML fragment, keeping only its text content.
pub fn remove_html_tags(input: &str) -> String {
    let fragment = Html::parse_fragment(input);
    fragment.root_element().text().collect()
}

/// Prefix a title with an emoji when it mentions a known event kind.
pub fn add_emoji(title: &str) -> String {
    let lower = title.to_lowercase();
    for (keyword, emoji) in EMOJI_KEYWORDS {
        if lower.contains(keyword) {
            return format!("{emoji} {title}");
        }
    }
    title.to_string()
}

/// Shorten a full description into a post-sized excerpt, cutting at a word
/// boundary and marking the truncation with an ellipsis.
pub fn prepare_post_text(full_text: &str) -> String {
    if full_text.chars().count() <= POST_TEXT_LIMIT {
        return full_text.to_string();
    }
    let cut: String = full_text.chars().take(POST_TEXT_LIMIT).collect();
    let cut = match cut.rfind(char::is_whitespace) {
        Some(idx) => &cut[..idx],
        None => cut.as_str(),
    };
    format!("{}...", cut.trim_end())
}
