//! Removal of the wiki markup found in vote comments.

use once_cell::sync::Lazy;
use regex::Regex;

// The rules are applied in this order. Order matters: internal links are removed
// before piped links are looked at, so the piped link rule only sees leftovers.
static RULES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        // internal links: [[WP:NETPOS]]
        (r"\[\[.*?\]\]", ""),
        // html entities: &nbsp; &#8211;
        (r"&[a-zA-Z]+;|&#[0-9]+;", ""),
        // bold
        (r"'''(.*?)'''", "${1}"),
        // italic
        (r"''(.*?)''", "${1}"),
        // html tags
        (r"<.*?>", ""),
        // piped links
        (r"\[\[.*?\|([^\]]*?)\]\]", "${1}"),
        // external links
        (r"\[http[^\]]*?\]", ""),
        // templates
        (r"\{\{.*?\}\}", ""),
        // headers, twice for nested ones
        (r"==([^=]+)==", "${1}"),
        (r"==([^=]+)==", "${1}"),
        (r"--", " "),
    ]
    .into_iter()
    .map(|(pattern, replacement)| {
        // The patterns are constants.
        (Regex::new(pattern).unwrap(), replacement)
    })
    .collect()
});

/// Strips the wiki markup from a comment: links, entities, emphasis, html,
/// templates and headers.
pub fn strip_wiki_markup(txt: &str) -> String {
    let mut res = txt.to_string();
    for (re, replacement) in RULES.iter() {
        res = re.replace_all(&res, *replacement).into_owned();
    }
    res
}
