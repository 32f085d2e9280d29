//! Sanitization of user-supplied text (titles, descriptions, artist names, comments).
//!
//! Input goes through two layers. Known-dangerous constructs (script blocks,
//! embedding tags, script URL schemes, inline event handlers, CSS escapes) are
//! removed first. Whatever markup remains is then rebuilt from an allow-list:
//! only a handful of formatting tags survive, always without attributes, and
//! all other text is entity-encoded.

use regex::{Captures, Regex};

/// Default minimum share of the original characters a sanitized value must keep.
pub const DEFAULT_MIN_RETAINED_RATIO: f64 = 0.5;

pub const TITLE_MAX_LENGTH: usize = 100;
pub const DESCRIPTION_MAX_LENGTH: usize = 1000;
pub const ARTIST_NAME_MAX_LENGTH: usize = 50;
pub const COMMENT_MAX_LENGTH: usize = 1000;

/// Formatting tags kept when `allow_basic_formatting` is set.
const ALLOWED_TAGS: &[&str] = &["b", "i", "em", "strong", "br", "p"];

/// Removal passes before input that keeps re-forming dangerous constructs
/// is dropped altogether.
const MAX_REMOVAL_PASSES: usize = 8;

/// A denylisted construct.
struct DangerousPattern {
    name: &'static str,
    regex: Regex,
    replacement: &'static str,
}

impl DangerousPattern {
    fn new(name: &'static str, pattern: &str) -> Self {
        Self {
            name,
            regex: Regex::new(pattern).expect("invalid dangerous content pattern"),
            replacement: "",
        }
    }

    /// Pattern whose group 1 is the surrounding context, kept on removal.
    fn in_context(name: &'static str, pattern: &str) -> Self {
        Self {
            replacement: "${1}",
            ..Self::new(name, pattern)
        }
    }
}

/// Patterns removed from every input, in order. Block patterns come before
/// their stray-tag counterparts so the enclosed content goes with the block.
static DANGEROUS_PATTERNS: std::sync::LazyLock<Vec<DangerousPattern>> =
    std::sync::LazyLock::new(|| {
        vec![
            DangerousPattern::new("script", r"(?is)<script\b[^>]*>.*?</script\s*>"),
            DangerousPattern::new("script", r"(?i)</?script\b[^>]*>?"),
            DangerousPattern::new("iframe", r"(?is)<iframe\b[^>]*>.*?</iframe\s*>"),
            DangerousPattern::new("iframe", r"(?i)</?iframe\b[^>]*>?"),
            DangerousPattern::new("object", r"(?is)<object\b[^>]*>.*?</object\s*>"),
            DangerousPattern::new("object", r"(?i)</?object\b[^>]*>?"),
            DangerousPattern::new("embed", r"(?i)</?embed\b[^>]*>?"),
            DangerousPattern::new("link", r"(?i)</?link\b[^>]*>?"),
            DangerousPattern::new("meta", r"(?i)</?meta\b[^>]*>?"),
            DangerousPattern::new("style", r"(?is)<style\b[^>]*>.*?</style\s*>"),
            DangerousPattern::new("style", r"(?i)</?style\b[^>]*>?"),
            DangerousPattern::new("javascript_scheme", r"(?i)\bjavascript\s*:"),
            DangerousPattern::new("vbscript_scheme", r"(?i)\bvbscript\s*:"),
            DangerousPattern::new("data_scheme", r"(?i)\bdata\s*:\s*[a-z]+/[a-z0-9.+\-]+"),
            // CSS functions only count as a property or attribute value.
            DangerousPattern::in_context(
                "css_expression",
                r#"(?i)([:=]\s*["']?\s*)expression\([^)]*\)?"#,
            ),
            DangerousPattern::in_context(
                "css_url",
                r#"(?i)([:=,]\s*["']?\s*)url\([^)]*\)?"#,
            ),
            DangerousPattern::new("css_import", r"(?i)@import\b[^;\n]*;?"),
        ]
    });

/// Event-handler attribute inside a (possibly unterminated) tag. Group 1 is
/// the tag prefix that is kept.
static EVENT_HANDLER: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
    Regex::new(r#"(?i)(<[^>]*?)\s+on[a-z]+\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>]*)"#)
        .expect("invalid event handler pattern")
});

static MARKUP_COMMENT: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
    Regex::new(r"(?s)<!--.*?(?:-->|$)|<[!?][^>]*>").expect("invalid markup comment pattern")
});

static TAG: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
    Regex::new(r"<(/?)([a-zA-Z][a-zA-Z0-9]*)\b[^>]*>").expect("invalid tag pattern")
});

/// Options controlling [`sanitize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SanitizeOptions {
    pub allow_basic_formatting: bool,
    /// Maximum length in characters of the sanitized output
    pub max_length: usize,
    pub preserve_line_breaks: bool,
}

impl Default for SanitizeOptions {
    fn default() -> Self {
        Self {
            allow_basic_formatting: false,
            max_length: DESCRIPTION_MAX_LENGTH,
            preserve_line_breaks: false,
        }
    }
}

/// Sanitize free text according to `options`.
///
/// The result never contains a `<script` sequence, never contains attributes
/// on any tag, and is at most `options.max_length` characters long. Input
/// that keeps forming dangerous constructs after a bounded number of removal
/// passes sanitizes to the empty string.
pub fn sanitize(input: &str, options: SanitizeOptions) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let Some(stripped) = remove_dangerous_content(trimmed) else {
        return String::new();
    };
    let rebuilt = rebuild_markup(&stripped, options.allow_basic_formatting);

    let rebuilt = if options.preserve_line_breaks {
        rebuilt.replace("\r\n", "\n").replace('\n', "<br>")
    } else {
        rebuilt
    };

    truncate_markup(&rebuilt, options.max_length)
        .trim()
        .to_string()
}

/// Titles: plain text, at most 100 characters.
pub fn sanitize_artwork_title(title: &str) -> String {
    sanitize(
        title,
        SanitizeOptions {
            allow_basic_formatting: false,
            max_length: TITLE_MAX_LENGTH,
            preserve_line_breaks: false,
        },
    )
}

/// Descriptions: basic formatting and line breaks, at most 1000 characters.
pub fn sanitize_artwork_description(description: &str) -> String {
    sanitize(
        description,
        SanitizeOptions {
            allow_basic_formatting: true,
            max_length: DESCRIPTION_MAX_LENGTH,
            preserve_line_breaks: true,
        },
    )
}

/// Artist names: plain text, at most 50 characters.
pub fn sanitize_artist_name(name: &str) -> String {
    sanitize(
        name,
        SanitizeOptions {
            allow_basic_formatting: false,
            max_length: ARTIST_NAME_MAX_LENGTH,
            preserve_line_breaks: false,
        },
    )
}

/// Comments follow the description rules.
pub fn sanitize_comment(body: &str) -> String {
    sanitize(
        body,
        SanitizeOptions {
            allow_basic_formatting: true,
            max_length: COMMENT_MAX_LENGTH,
            preserve_line_breaks: true,
        },
    )
}

/// Whether sanitization kept enough of the original to be meaningful,
/// using [`DEFAULT_MIN_RETAINED_RATIO`].
pub fn is_valid_sanitized_input(original: &str, sanitized: &str) -> bool {
    is_valid_sanitized_input_with_ratio(original, sanitized, DEFAULT_MIN_RETAINED_RATIO)
}

/// False when `sanitized` is empty or has fewer than `ratio` times the
/// characters of `original`.
pub fn is_valid_sanitized_input_with_ratio(original: &str, sanitized: &str, ratio: f64) -> bool {
    if sanitized.is_empty() {
        return false;
    }
    let original_len = original.chars().count() as f64;
    let sanitized_len = sanitized.chars().count() as f64;
    sanitized_len >= original_len * ratio
}

/// Detector counterpart of the removal step: does `input` contain any
/// denylisted construct?
pub fn contains_dangerous_content(input: &str) -> bool {
    !matched_dangerous_patterns(input).is_empty()
}

/// Names of the denylisted constructs found in `input`, deduplicated.
pub fn matched_dangerous_patterns(input: &str) -> Vec<&'static str> {
    let mut names: Vec<&'static str> = Vec::new();
    for pattern in DANGEROUS_PATTERNS.iter() {
        if pattern.regex.is_match(input) && !names.contains(&pattern.name) {
            names.push(pattern.name);
        }
    }
    if EVENT_HANDLER.is_match(input) {
        names.push("event_handler");
    }
    names
}

/// `None` when removal would not settle within [`MAX_REMOVAL_PASSES`].
fn remove_dangerous_content(input: &str) -> Option<String> {
    let mut output = input.to_string();

    // Removing one construct can splice a new one together ("<scr<script>ipt>").
    for _ in 0..MAX_REMOVAL_PASSES {
        if !contains_dangerous_content(&output) {
            return Some(output);
        }
        for pattern in DANGEROUS_PATTERNS.iter() {
            output = pattern
                .regex
                .replace_all(&output, pattern.replacement)
                .into_owned();
        }

        // Each pass removes one handler per tag.
        let mut handler_passes = 0;
        while EVENT_HANDLER.is_match(&output) && handler_passes < 32 {
            output = EVENT_HANDLER.replace_all(&output, "${1}").into_owned();
            handler_passes += 1;
        }
    }

    (!contains_dangerous_content(&output)).then_some(output)
}

/// Re-emit allowed tags canonically, drop every other tag, encode text.
fn rebuild_markup(input: &str, allow_formatting: bool) -> String {
    let input: &str = &MARKUP_COMMENT.replace_all(input, "");
    let mut output = String::with_capacity(input.len());
    let mut open: Vec<String> = Vec::new();
    let mut last = 0;

    for caps in TAG.captures_iter(&input) {
        let Some(whole) = caps.get(0) else { continue };
        encode_into(&input[last..whole.start()], &mut output);
        last = whole.end();

        if allow_formatting {
            emit_allowed_tag(&caps, &mut open, &mut output);
        }
    }
    encode_into(&input[last..], &mut output);

    while let Some(tag) = open.pop() {
        output.push_str(&format!("</{}>", tag));
    }
    output
}

fn emit_allowed_tag(caps: &Captures<'_>, open: &mut Vec<String>, output: &mut String) {
    let closing = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
    let name = match caps.get(2) {
        Some(m) => m.as_str().to_ascii_lowercase(),
        None => return,
    };
    if !ALLOWED_TAGS.contains(&name.as_str()) {
        return;
    }

    if name == "br" {
        if !closing {
            output.push_str("<br>");
        }
        return;
    }

    if closing {
        // Stray closers are dropped; a matching closer also closes anything nested inside it.
        if let Some(pos) = open.iter().rposition(|t| *t == name) {
            while open.len() > pos {
                if let Some(tag) = open.pop() {
                    output.push_str(&format!("</{}>", tag));
                }
            }
        }
    } else {
        output.push_str(&format!("<{}>", name));
        open.push(name);
    }
}

fn encode_into(text: &str, output: &mut String) {
    for c in text.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '"' => output.push_str("&quot;"),
            '\'' => output.push_str("&#x27;"),
            '/' => output.push_str("&#x2F;"),
            _ => output.push(c),
        }
    }
}

/// Truncate to `max_chars` characters without leaving half an entity or tag at the end.
fn truncate_markup(input: &str, max_chars: usize) -> String {
    let Some((cut, _)) = input.char_indices().nth(max_chars) else {
        return input.to_string();
    };
    let mut truncated = &input[..cut];

    if let Some(amp) = truncated.rfind('&') {
        if !truncated[amp..].contains(';') {
            truncated = &truncated[..amp];
        }
    }
    if let Some(lt) = truncated.rfind('<') {
        if !truncated[lt..].contains('>') {
            truncated = &truncated[..lt];
        }
    }
    truncated.to_string()
}
