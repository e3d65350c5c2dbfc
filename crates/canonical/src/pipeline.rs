use std::borrow::Cow;

use unicode_categories::UnicodeCategories;
use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

use crate::config::CanonicalizeConfig;
use crate::markup::strip_markup;
use crate::token::Token;

/// Normalize a raw post body with the default configuration.
///
/// Never fails: malformed markup, empty input or input made only of
/// punctuation all produce an empty (or shorter) string.
///
/// ```rust
/// use canonical::normalize;
///
/// assert_eq!(normalize("<p>Hello,   <b>World</b>!</p>"), "hello world");
/// assert_eq!(normalize("   "), "");
/// ```
pub fn normalize(input: &str) -> String {
    normalize_with(input, &CanonicalizeConfig::default())
}

/// Normalize a raw post body with an explicit configuration.
///
/// The config version is not checked here; use [`CanonicalizeConfig::validate`]
/// when loading configuration.
pub fn normalize_with(input: &str, cfg: &CanonicalizeConfig) -> String {
    normalize_with_tokens(input, cfg).0
}

/// Like [`normalize_with`], also returning the words of the normalized text
/// with their byte offsets.
///
/// ```rust
/// use canonical::{normalize_with_tokens, CanonicalizeConfig};
///
/// let cfg = CanonicalizeConfig::default();
/// let (text, tokens) = normalize_with_tokens("Breaking <b>news</b>!", &cfg);
/// assert_eq!(text, "breaking news");
/// assert_eq!((tokens[1].start, tokens[1].end), (9, 13));
/// ```
pub fn normalize_with_tokens(input: &str, cfg: &CanonicalizeConfig) -> (String, Vec<Token>) {
    let plain: Cow<str> = if cfg.strip_markup {
        strip_markup(input)
    } else {
        Cow::Borrowed(input)
    };

    // Unicode normalization comes before tokenization, as it can affect
    // character boundaries.
    let normalized_text: Cow<str> = if cfg.normalize_unicode {
        Cow::Owned(plain.nfkc().collect::<String>())
    } else {
        plain
    };

    let mut state = TokenState {
        canonical_text: String::with_capacity(normalized_text.len()),
        tokens: Vec::with_capacity((normalized_text.len() / 4).saturating_add(1)),
        pending_space: false,
        current_token_start: None,
    };

    for grapheme in normalized_text.graphemes(true) {
        // Lowercasing can expand a single character into multiple (e.g. İ).
        if cfg.lowercase {
            for lower in grapheme.to_lowercase().chars() {
                state.dispatch_char(lower, cfg);
            }
        } else {
            for ch in grapheme.chars() {
                state.dispatch_char(ch, cfg);
            }
        }
    }

    // The last token needs to be finalized after the loop.
    state.finalize_token();
    (state.canonical_text, state.tokens)
}

struct TokenState {
    canonical_text: String,
    tokens: Vec<Token>,
    pending_space: bool,
    current_token_start: Option<usize>,
}

impl TokenState {
    /// Decides whether a character is part of a token, a delimiter, or dropped.
    fn dispatch_char(&mut self, ch: char, cfg: &CanonicalizeConfig) {
        if ch.is_whitespace() {
            self.finalize_token();
            // A space is only emitted once the next token starts.
            if !self.canonical_text.is_empty() {
                self.pending_space = true;
            }
        } else if (cfg.strip_punctuation && is_strippable(ch)) || ch.is_control() {
            // Dropped without closing the current token.
        } else {
            self.append_char(ch);
        }
    }

    fn append_char(&mut self, ch: char) {
        if self.pending_space {
            self.canonical_text.push(' ');
            self.pending_space = false;
            self.current_token_start = Some(self.canonical_text.len());
        } else if self.current_token_start.is_none() {
            self.current_token_start = Some(self.canonical_text.len());
        }
        self.canonical_text.push(ch);
    }

    fn finalize_token(&mut self) {
        if let Some(start) = self.current_token_start.take() {
            if start < self.canonical_text.len() {
                let end = self.canonical_text.len();
                self.tokens.push(Token {
                    text: self.canonical_text[start..end].to_string(),
                    start,
                    end,
                });
            }
        }
    }
}

fn is_strippable(ch: char) -> bool {
    ch.is_punctuation() || ch.is_symbol_math() || ch.is_symbol_currency() || ch.is_symbol_modifier()
}
