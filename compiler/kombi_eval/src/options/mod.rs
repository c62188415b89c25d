//! Evaluator configuration.
//!
//! Options are plain data. [`EvalOptions::from_env`] reads them from the
//! process environment:
//!
//! | variable              | option            | default |
//! |-----------------------|-------------------|---------|
//! | `KOMBI_CATCH_PANICS`  | `catch_panics`    | on      |
//! | `KOMBI_CHECK_RESULTS` | `check_results`   | off     |
//!
//! `0`, `false`, `off` and `no` (any case) disable an option; any other
//! value enables it.

pub const CATCH_PANICS_VAR: &str = "KOMBI_CATCH_PANICS";
pub const CHECK_RESULTS_VAR: &str = "KOMBI_CHECK_RESULTS";

/// How the evaluator treats combinator bodies.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct EvalOptions {
    /// Convert a panic inside a body into a foreign-error exception
    /// instead of unwinding through the reduction.
    pub catch_panics: bool,
    /// Check every body result against the type of its closure.
    pub check_results: bool,
}

impl Default for EvalOptions {
    fn default() -> Self {
        EvalOptions {
            catch_panics: true,
            check_results: false,
        }
    }
}

impl EvalOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_catch_panics(mut self, enabled: bool) -> Self {
        self.catch_panics = enabled;
        self
    }

    #[must_use]
    pub fn with_check_results(mut self, enabled: bool) -> Self {
        self.check_results = enabled;
        self
    }

    /// Defaults overridden by `KOMBI_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        EvalOptions {
            catch_panics: lookup(CATCH_PANICS_VAR).map_or(defaults.catch_panics, |v| flag(&v)),
            check_results: lookup(CHECK_RESULTS_VAR).map_or(defaults.check_results, |v| flag(&v)),
        }
    }
}

fn flag(value: &str) -> bool {
    let value = value.trim();
    !["0", "false", "off", "no"]
        .iter()
        .any(|off| value.eq_ignore_ascii_case(off))
}
