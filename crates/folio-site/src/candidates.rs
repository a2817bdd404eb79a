//! Alias forms tried when resolving a page.

/// Ordered content-type prefixes inserted between the language prefix and the alias.
///
/// The first prefix is always empty, so the bare alias is tried first. With the
/// default `["", "/pages"]`, `/featured` in `en` is tried as `en/featured` and
/// then, once, as `en/pages/featured`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CandidatePaths {
    type_prefixes: Vec<String>,
}

impl CandidatePaths {
    /// Build from configured prefixes. An empty first prefix is inserted if missing.
    #[must_use]
    pub fn new<I, S>(type_prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut type_prefixes: Vec<String> = type_prefixes.into_iter().map(Into::into).collect();
        if type_prefixes.first().is_none_or(|first| !first.is_empty()) {
            type_prefixes.insert(0, String::new());
        }
        Self { type_prefixes }
    }

    #[must_use]
    pub fn type_prefixes(&self) -> &[String] {
        &self.type_prefixes
    }

    /// Candidate store paths for `alias`, in the order they are tried.
    #[must_use]
    pub fn paths(&self, language_prefix: &str, alias: &str) -> Vec<String> {
        self.type_prefixes
            .iter()
            .map(|prefix| format!("{language_prefix}{prefix}{alias}"))
            .collect()
    }
}

impl Default for CandidatePaths {
    fn default() -> Self {
        Self::new(["", "/pages"])
    }
}
