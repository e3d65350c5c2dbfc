//! HTML-to-text reduction.
//!
//! Posts arrive either as plain text or as rich-text HTML produced by an
//! editor. Shingling must see the same words for both, so markup is reduced
//! to text before any other normalization step:
//!
//! 1. `<script>`/`<style>` elements and HTML comments are removed with their
//!    contents.
//! 2. Every remaining tag is replaced by a single space, so block boundaries
//!    (`</p><p>`) never glue two words together.
//! 3. Named and numeric character entities are decoded.
//!
//! This is a tolerant scanner, not an HTML parser: malformed markup degrades
//! to "slightly noisier text", never to an error.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

static RE_HIDDEN_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>|<!--.*?-->")
        .expect("hidden block pattern is valid")
});

// A tag must start with a letter, `/` or `!`, so "a < b" and "x<3" survive.
static RE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"</?[A-Za-z!][^<>]*>").expect("tag pattern is valid")
});

static RE_ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9A-Fa-f]{1,6}|[A-Za-z]{2,8});")
        .expect("entity pattern is valid")
});

/// Reduce HTML markup to plain text.
///
/// Input without any `<` or `&` is returned borrowed.
///
/// ```rust
/// use canonical::strip_markup;
///
/// let text = strip_markup("<p>Fish &amp; chips</p><p>daily</p>");
/// assert_eq!(text.split_whitespace().collect::<Vec<_>>(), ["Fish", "&", "chips", "daily"]);
/// ```
pub fn strip_markup(input: &str) -> Cow<'_, str> {
    if !input.contains(['<', '&']) {
        return Cow::Borrowed(input);
    }

    let without_hidden = RE_HIDDEN_BLOCK.replace_all(input, " ");
    let without_tags = RE_TAG.replace_all(&without_hidden, " ");
    let decoded = RE_ENTITY.replace_all(&without_tags, decode_entity);
    Cow::Owned(decoded.into_owned())
}

fn decode_entity(caps: &Captures<'_>) -> String {
    let body = &caps[1];
    let decoded = if let Some(num) = body.strip_prefix("#x").or_else(|| body.strip_prefix("#X")) {
        u32::from_str_radix(num, 16).ok().and_then(char::from_u32)
    } else if let Some(num) = body.strip_prefix('#') {
        num.parse::<u32>().ok().and_then(char::from_u32)
    } else {
        named_entity(body)
    };

    match decoded {
        Some(ch) => ch.to_string(),
        // Unknown entities are kept verbatim.
        None => caps[0].to_string(),
    }
}

fn named_entity(name: &str) -> Option<char> {
    let ch = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{00A0}',
        "ndash" => '\u{2013}',
        "mdash" => '\u{2014}',
        "hellip" => '\u{2026}',
        "lsquo" => '\u{2018}',
        "rsquo" => '\u{2019}',
        "ldquo" => '\u{201C}',
        "rdquo" => '\u{201D}',
        "copy" => '\u{00A9}',
        "reg" => '\u{00AE}',
        _ => return None,
    };
    Some(ch)
}
