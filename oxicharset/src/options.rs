//! Search configuration.

/// How entry names are checked once an archive has been opened.
///
/// Both policies give the same verdict. They differ in how many names are
/// inspected, and therefore in which rejected names get logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationPolicy {
    /// Stop at the first name that is not round-trip stable.
    #[default]
    ShortCircuit,
    /// Check every name, logging each rejected one, then AND the results.
    FullScan,
}

/// Options shared by a collection's search operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchOptions {
    policy: ValidationPolicy,
}

impl SearchOptions {
    /// Default options (short-circuit validation).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the validation policy.
    pub fn with_policy(mut self, policy: ValidationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The validation policy.
    pub fn policy(&self) -> ValidationPolicy {
        self.policy
    }
}
