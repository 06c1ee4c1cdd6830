//! Response normalization and format compliance

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// Whitespace hugging a tag delimiter, e.g. `< think >` or `</ think>`.
static TAG_SPACING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*([<>/])\s*").expect("tag spacing pattern"));

/// `<think>..</think>` followed by a boxed answer, matched against the whole text.
static THINK_THEN_BOXED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\A(?s:.*<think>.*</think>.*\\boxed\{.*\}.*)\z").expect("format pattern")
});

/// Collapse whitespace around `<`, `>` and `/`.
///
/// Some detokenizers emit `< think >` / `</ think>`; graders and the format
/// check expect the tight form. Returns the input unchanged (borrowed) when
/// there is nothing to collapse.
pub fn normalize_response(text: &str) -> Cow<'_, str> {
    TAG_SPACING.replace_all(text, "$1")
}

/// Full-string format check: a think block followed by a `\boxed{}` answer.
pub fn is_format_compliant(text: &str) -> bool {
    THINK_THEN_BOXED.is_match(text)
}

/// 1.0 if [`is_format_compliant`], else 0.0.
pub fn format_reward(text: &str) -> f64 {
    if is_format_compliant(text) {
        1.0
    } else {
        0.0
    }
}
