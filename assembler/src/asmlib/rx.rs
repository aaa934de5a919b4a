use std::ops::Deref;
use std::sync::OnceLock;

use regex::Regex;

/// A regular expression which is compiled the first time it is used.
/// Patterns are fixed strings in this crate, so a pattern which fails
/// to compile is a bug.
pub(crate) struct LazyRegex {
    pattern: &'static str,
    compiled: OnceLock<Regex>,
}

impl LazyRegex {
    pub(crate) const fn new(pattern: &'static str) -> LazyRegex {
        LazyRegex {
            pattern,
            compiled: OnceLock::new(),
        }
    }
}

impl Deref for LazyRegex {
    type Target = Regex;

    fn deref(&self) -> &Regex {
        self.compiled
            .get_or_init(|| match Regex::new(self.pattern) {
                Ok(rx) => rx,
                Err(e) => panic!("invalid built-in regular expression {:?}: {e}", self.pattern),
            })
    }
}
