//! Answer extraction and grading
//!
//! The [`Grader`] trait is the seam to whatever decides correctness. The
//! bundled [`MathGrader`] extracts the last `\boxed{..}` answer and compares it
//! with the ground truth after light LaTeX normalization, falling back to a
//! numeric comparison.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::GradeError;

/// Decides whether a (normalized) response answers the ground truth.
///
/// Implementations must be reentrant: the scorer calls `grade` through `&self`
/// and may be shared across threads scoring independent batches.
pub trait Grader: Send + Sync {
    fn grade(&self, response: &str, ground_truth: &str) -> Result<bool, GradeError>;
}

impl<F> Grader for F
where
    F: Fn(&str, &str) -> Result<bool, GradeError> + Send + Sync,
{
    fn grade(&self, response: &str, ground_truth: &str) -> Result<bool, GradeError> {
        self(response, ground_truth)
    }
}

/// Boxed-answer grader for math style tasks.
#[derive(Debug, Clone, Copy, Default)]
pub struct MathGrader;

impl Grader for MathGrader {
    fn grade(&self, response: &str, ground_truth: &str) -> Result<bool, GradeError> {
        Ok(extract_boxed_content(response)
            .map(|answer| grade_answer(&answer, ground_truth))
            .unwrap_or(false))
    }
}

/// 1.0 when the grader accepts the response, else 0.0.
pub fn accuracy_reward<G: Grader + ?Sized>(
    grader: &G,
    response: &str,
    ground_truth: &str,
) -> Result<f64, GradeError> {
    Ok(if grader.grade(response, ground_truth)? { 1.0 } else { 0.0 })
}

const BOXED: &str = "\\boxed{";

/// Content of the last `\boxed{..}` in `text`, honouring nested braces.
///
/// Returns `None` when there is no box or its braces never close.
pub fn extract_boxed_content(text: &str) -> Option<String> {
    let start = text.rfind(BOXED)? + BOXED.len();
    let mut depth = 1usize;
    for (offset, ch) in text[start..].char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(text[start..start + offset].to_string());
                }
            }
            _ => {}
        }
    }
    None
}

static TEXT_WRAPPER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\(?:text|textbf|mathrm|mbox)\{([^{}]*)\}").expect("text wrapper pattern")
});

static FRAC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(-?)\\frac\{(-?[0-9.]+)\}\{(-?[0-9.]+)\}$").expect("frac pattern")
});

static SLASH_FRAC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(-?[0-9.]+)/(-?[0-9.]+)$").expect("slash frac pattern"));

static THOUSANDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d{1,3}(,\d{3})+(\.\d+)?$").expect("thousands pattern"));

/// Tokens dropped outright during normalization.
const DROPPED: &[&str] = &[
    "\\left", "\\right", "\\!", "\\,", "\\;", "\\:", "\\quad", "$", "^\\circ", "^{\\circ}",
    "\\%", "\\displaystyle",
];

/// Canonical comparison form of an answer string.
pub fn normalize_answer(answer: &str) -> String {
    let mut s = TEXT_WRAPPER.replace_all(answer.trim(), "$1").into_owned();
    for token in DROPPED {
        s = s.replace(token, "");
    }
    s = s.replace("\\dfrac", "\\frac").replace("\\tfrac", "\\frac");
    s.retain(|c| !c.is_whitespace());

    // "x=5" grades the same as "5"
    if let Some((lhs, rhs)) = s.split_once('=') {
        if lhs.chars().count() == 1 && lhs.chars().all(char::is_alphabetic) && !rhs.is_empty() {
            s = rhs.to_string();
        }
    }

    while s.ends_with('.') {
        s.pop();
    }
    s.to_lowercase()
}

/// Parse a normalized answer as a number, if it is one.
fn parse_number(s: &str) -> Option<f64> {
    let plain = if THOUSANDS.is_match(s) {
        s.replace(',', "")
    } else {
        s.to_string()
    };
    if let Ok(value) = plain.parse::<f64>() {
        return value.is_finite().then_some(value);
    }

    let (sign, num, den) = if let Some(caps) = FRAC.captures(s) {
        let sign = if caps.get(1).is_some_and(|m| !m.as_str().is_empty()) { -1.0 } else { 1.0 };
        (sign, caps[2].parse::<f64>().ok()?, caps[3].parse::<f64>().ok()?)
    } else if let Some(caps) = SLASH_FRAC.captures(s) {
        (1.0, caps[1].parse::<f64>().ok()?, caps[2].parse::<f64>().ok()?)
    } else {
        return None;
    };

    if den == 0.0 {
        return None;
    }
    Some(sign * num / den)
}

/// Whether `candidate` is an acceptable answer for `ground_truth`.
pub fn grade_answer(candidate: &str, ground_truth: &str) -> bool {
    let candidate = normalize_answer(candidate);
    let truth = normalize_answer(ground_truth);
    if candidate.is_empty() || truth.is_empty() {
        return false;
    }
    if candidate == truth {
        return true;
    }

    match (parse_number(&candidate), parse_number(&truth)) {
        (Some(a), Some(b)) => {
            let scale = a.abs().max(b.abs()).max(1.0);
            (a - b).abs() <= 1e-9 * scale
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_last_box() {
        assert_eq!(
            extract_boxed_content("first \\boxed{1} then \\boxed{2}").as_deref(),
            Some("2")
        );
    }

    #[test]
    fn test_extract_nested_braces() {
        assert_eq!(
            extract_boxed_content("\\boxed{\\frac{1}{2}} done").as_deref(),
            Some("\\frac{1}{2}")
        );
    }

    #[test]
    fn test_extract_missing_or_unclosed() {
        assert_eq!(extract_boxed_content("no answer here"), None);
        assert_eq!(extract_boxed_content("\\boxed{3"), None);
    }

    #[test]
    fn test_grade_string_forms() {
        assert!(grade_answer("\\text{Paris}", "paris"));
        assert!(grade_answer("x = 5", "5"));
        assert!(grade_answer("\\dfrac{1}{2}", "\\frac{1}{2}"));
        assert!(grade_answer("90^\\circ", "90"));
        assert!(!grade_answer("6", "5"));
    }

    #[test]
    fn test_grade_numeric_forms() {
        assert!(grade_answer("0.5", "\\frac{1}{2}"));
        assert!(grade_answer("1/4", "0.25"));
        assert!(grade_answer("1,000", "1000"));
        assert!(grade_answer("-\\frac{3}{4}", "-0.75"));
        assert!(grade_answer("2.0", "2"));
        assert!(!grade_answer("1/0", "0"));
    }

    #[test]
    fn test_grade_empty_never_matches() {
        assert!(!grade_answer("", ""));
        assert!(!grade_answer("  ", "1"));
    }

    #[test]
    fn test_math_grader() {
        let grader = MathGrader;
        assert!(grader.grade("<think>2+2</think> \\boxed{4}", "4").unwrap());
        assert!(!grader.grade("the answer is 4", "4").unwrap());
        assert_eq!(accuracy_reward(&grader, "\\boxed{4}", "4").unwrap(), 1.0);
        assert_eq!(accuracy_reward(&grader, "\\boxed{5}", "4").unwrap(), 0.0);
    }

    #[test]
    fn test_closure_grader() {
        let failing = |_: &str, _: &str| -> Result<bool, GradeError> {
            Err(GradeError::Collaborator("offline".into()))
        };
        assert!(accuracy_reward(&failing, "a", "b").is_err());
    }
}
