//! Email address format check
//!
//! Approximates the common-case grammar of RFC 5322: a dot-atom or quoted
//! local part, and a dot-atom or bracketed-literal domain. This is a sanity
//! filter for logging, not a deliverability test.

use regex::Regex;
use std::sync::OnceLock;

const EMAIL_PATTERN: &str = r#"^(?:[-!#-'*+/-9=?A-Z^-~]+(?:\.[-!#-'*+/-9=?A-Z^-~]+)*|"(?:[\]!#-\[^-~ \t]|\\[\t -~])+")@(?:[-!#-'*+/-9=?A-Z^-~]+(?:\.[-!#-'*+/-9=?A-Z^-~]+)*|\[[\t -Z^-~]*\])$"#;

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern is a valid regex"))
}

/// Returns true if the whole of `email` matches the address pattern
pub fn is_email_valid(email: &str) -> bool {
    email_regex().is_match(email)
}
