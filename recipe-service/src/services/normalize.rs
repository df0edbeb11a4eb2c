//! Repairs for known formatting defects in model replies, applied before
//! JSON parsing.

use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::OnceLock;

static QUANTITY_FRACTION: OnceLock<Regex> = OnceLock::new();

fn quantity_fraction() -> &'static Regex {
    QUANTITY_FRACTION.get_or_init(|| {
        Regex::new(
            r#"(?P<key>"quantity"\s*:\s*)(?P<open>"?)\s*(?:(?P<whole>\d+)\s+)?(?P<num>\d+)\s*/\s*(?P<den>\d+)(?:\s*(?P<close>"))?(?P<tail>\s*(?:[,}\]]|$))"#,
        )
        .expect("quantity fraction pattern is valid")
    })
}

/// Rewrites `quantity` values written as fractions into JSON numbers.
///
/// Handles `a/b`, mixed numbers `w a/b`, and either form wrapped in
/// quotes. The fraction must end the value (next is `,`, `}`, `]` or end of
/// text), so `6/2.5` or `3/4e2` are never half-rewritten. A zero
/// denominator or an unbalanced quote leaves the match as it was, so the
/// reply fails parsing instead of carrying a made-up amount.
/// Returns the input unchanged (borrowed) when nothing matched.
pub fn normalize_fractions(text: &str) -> Cow<'_, str> {
    quantity_fraction().replace_all(text, |caps: &Captures| {
        let original = caps[0].to_string();

        let close = caps.name("close").map_or("", |m| m.as_str());
        if &caps["open"] != close {
            return original;
        }

        let (Ok(numerator), Ok(denominator)) =
            (caps["num"].parse::<f64>(), caps["den"].parse::<f64>())
        else {
            return original;
        };
        if denominator == 0.0 {
            return original;
        }

        let whole = match caps.name("whole") {
            Some(w) => match w.as_str().parse::<f64>() {
                Ok(w) => w,
                Err(_) => return original,
            },
            None => 0.0,
        };

        let value = whole + numerator / denominator;
        if !value.is_finite() {
            return original;
        }

        format!("{}{}{}", &caps["key"], value, &caps["tail"])
    })
}
