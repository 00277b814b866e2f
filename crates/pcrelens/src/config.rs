//! The configuration-bearing facade's option table (`spec.md` §6).
//!
//! Options are a small closed record (§9, "Enumerated configuration");
//! unknown or out-of-range values are rejected by [`Config::validate`]
//! before any parsing, tokenizing, or analysis begins.

use crate::error::{Error, Result};

/// Target PCRE2 feature-gating version, e.g. `10.42`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PcreVersion {
    pub major: u16,
    pub minor: u16,
}

impl PcreVersion {
    pub const fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }

    /// The version this crate was written against.
    pub const CURRENT: PcreVersion = PcreVersion::new(10, 45);
}

impl Default for PcreVersion {
    fn default() -> Self {
        PcreVersion::CURRENT
    }
}

/// Recognized configuration options (§6's option table).
#[derive(Debug, Clone)]
pub struct Config {
    pub max_pattern_length: u32,
    pub max_lookbehind_length: u32,
    pub max_recursion_depth: u32,
    pub redos_ignored_patterns: Vec<String>,
    pub runtime_pcre_validation: bool,
    pub target_pcre_version: PcreVersion,
    pub max_nfa_states: u32,
    pub max_dfa_states: u32,
    pub max_transitions_processed: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_pattern_length: 100_000,
            max_lookbehind_length: 255,
            max_recursion_depth: 1024,
            redos_ignored_patterns: Vec::new(),
            runtime_pcre_validation: false,
            target_pcre_version: PcreVersion::CURRENT,
            max_nfa_states: 5_000,
            max_dfa_states: 10_000,
            max_transitions_processed: 2_000_000,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.max_pattern_length == 0 {
            return Err(Error::InvalidOption {
                option: "maxPatternLength".into(),
                reason: "must be greater than zero".into(),
            });
        }
        if self.max_recursion_depth == 0 {
            return Err(Error::InvalidOption {
                option: "maxRecursionDepth".into(),
                reason: "must be greater than zero".into(),
            });
        }
        if self.max_lookbehind_length == 0 {
            return Err(Error::InvalidOption {
                option: "maxLookbehindLength".into(),
                reason: "must be greater than zero".into(),
            });
        }
        if self.max_nfa_states == 0 || self.max_dfa_states == 0 {
            return Err(Error::InvalidOption {
                option: "maxNfaStates/maxDfaStates".into(),
                reason: "must be greater than zero".into(),
            });
        }
        Ok(())
    }

    pub fn builder() -> ConfigBuilder {
        ConfigBuilder(Config::default())
    }
}

/// Builder for [`Config`], following the teacher's builder-pattern structs
/// (e.g. `DiagnosticsPrinter`'s chained setters).
#[derive(Debug, Clone)]
pub struct ConfigBuilder(Config);

impl ConfigBuilder {
    pub fn max_pattern_length(mut self, v: u32) -> Self {
        self.0.max_pattern_length = v;
        self
    }

    pub fn max_lookbehind_length(mut self, v: u32) -> Self {
        self.0.max_lookbehind_length = v;
        self
    }

    pub fn max_recursion_depth(mut self, v: u32) -> Self {
        self.0.max_recursion_depth = v;
        self
    }

    pub fn redos_ignored_patterns(mut self, v: Vec<String>) -> Self {
        self.0.redos_ignored_patterns = v;
        self
    }

    pub fn runtime_pcre_validation(mut self, v: bool) -> Self {
        self.0.runtime_pcre_validation = v;
        self
    }

    pub fn target_pcre_version(mut self, v: PcreVersion) -> Self {
        self.0.target_pcre_version = v;
        self
    }

    pub fn max_nfa_states(mut self, v: u32) -> Self {
        self.0.max_nfa_states = v;
        self
    }

    pub fn max_dfa_states(mut self, v: u32) -> Self {
        self.0.max_dfa_states = v;
        self
    }

    pub fn max_transitions_processed(mut self, v: u64) -> Self {
        self.0.max_transitions_processed = v;
        self
    }

    pub fn build(self) -> Result<Config> {
        self.0.validate()?;
        Ok(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn zero_pattern_length_is_rejected() {
        let err = Config::builder().max_pattern_length(0).build();
        assert!(matches!(err, Err(Error::InvalidOption { .. })));
    }
}
