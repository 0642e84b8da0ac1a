//! Reviewer response parsing.
//!
//! The reviewer answers in free text whose first line is the verdict token
//! and whose remaining lines are feedback:
//!
//! ```text
//! FAIL
//! Problem: the date of the Battle of Hastings is wrong.
//! ```
//!
//! Only a first line equal to `PASS` (ignoring case and surrounding
//! whitespace) is an acceptance. Everything else, including an empty
//! response, is a rejection.

use tutorflow_types::ReviewVerdict;

/// Feedback used when the reviewer returned nothing at all.
pub const UNPARSEABLE_FEEDBACK: &str = "unable to parse review result";

const PASS_TOKEN: &str = "PASS";

/// Parse a raw reviewer response into a [`ReviewVerdict`].
pub fn parse_review(raw: &str) -> ReviewVerdict {
    let raw = raw.trim();
    if raw.is_empty() {
        return ReviewVerdict::fail(UNPARSEABLE_FEEDBACK);
    }

    let (token, rest) = match raw.split_once('\n') {
        Some((token, rest)) => (token, rest),
        None => (raw, ""),
    };
    let feedback = rest.trim();

    if token.trim().eq_ignore_ascii_case(PASS_TOKEN) {
        ReviewVerdict::pass(feedback)
    } else {
        ReviewVerdict::fail(feedback)
    }
}
