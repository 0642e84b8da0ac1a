//! Review stage verdicts.

use serde::{Deserialize, Serialize};

/// Parsed outcome of one review call.
///
/// When `passed` is true the feedback is advisory. When it is false the
/// feedback is replayed into the next generation attempt, so it should name
/// the problem specifically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewVerdict {
    /// Whether the reviewer accepted the content.
    pub passed: bool,

    /// Free-text feedback following the verdict line.
    pub feedback: String,
}

impl ReviewVerdict {
    /// An accepting verdict.
    pub fn pass(feedback: impl Into<String>) -> Self {
        Self {
            passed: true,
            feedback: feedback.into(),
        }
    }

    /// A rejecting verdict.
    pub fn fail(feedback: impl Into<String>) -> Self {
        Self {
            passed: false,
            feedback: feedback.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors() {
        assert_eq!(
            ReviewVerdict::pass("ok"),
            ReviewVerdict {
                passed: true,
                feedback: "ok".into()
            }
        );
        assert!(!ReviewVerdict::fail("wrong year").passed);
    }
}
