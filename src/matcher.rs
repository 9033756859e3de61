//! Two-pass signature matching for classes whose digests are unknown.
//!
//! 1. Exact pass: every [`ExactMatchRule`] claims at most one method whose
//!    opcode stream equals its pattern. A version survives only if every
//!    rule naming it claimed a method.
//! 2. Partial pass: for each surviving version, every [`PartialMatchRule`]
//!    of its [`VersionSignature`] must claim a distinct method. Each version
//!    starts from a fresh claim set, independent of the exact pass.
//!
//! Candidates are tried in priority order (signature table order, then
//! versions only named by exact rules) and the first confirmed one wins.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info};

use crate::classfile::MethodBytecode;
use crate::signatures::{
    EXACT_MATCHES, ExactMatchRule, PartialMatchRule, VERSION_SIGNATURES, VersionSignature,
};

/// Method indices already claimed by a rule within one matching pass.
#[derive(Debug, Clone, Default)]
pub struct ClaimedMethods {
    claimed: HashSet<usize>,
}

impl ClaimedMethods {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the first unclaimed method satisfying `pred` and return its index.
    pub fn claim_first<F>(&mut self, methods: &[MethodBytecode], mut pred: F) -> Option<usize>
    where
        F: FnMut(&[u8]) -> bool,
    {
        let index = methods
            .iter()
            .enumerate()
            .find(|(i, method)| !self.claimed.contains(i) && pred(method.as_slice()))
            .map(|(i, _)| i)?;
        self.claimed.insert(index);
        Some(index)
    }
}

/// Outcome of one matching attempt, kept for auditing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchReport {
    /// Versions whose exact rules all matched, in priority order.
    pub exact_satisfied: Vec<&'static str>,
    /// Subset of `exact_satisfied` whose partial rules also matched.
    pub confirmed: Vec<&'static str>,
}

impl MatchReport {
    pub fn best(&self) -> Option<&'static str> {
        self.confirmed.first().copied()
    }

    pub fn is_ambiguous(&self) -> bool {
        self.confirmed.len() > 1
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SignatureMatcher {
    exact: &'static [ExactMatchRule],
    signatures: &'static [VersionSignature],
}

impl Default for SignatureMatcher {
    fn default() -> Self {
        Self::builtin()
    }
}

impl SignatureMatcher {
    pub const fn new(
        exact: &'static [ExactMatchRule],
        signatures: &'static [VersionSignature],
    ) -> Self {
        Self { exact, signatures }
    }

    pub const fn builtin() -> Self {
        Self::new(EXACT_MATCHES, VERSION_SIGNATURES)
    }

    pub fn priority_order(&self) -> Vec<&'static str> {
        let mut order: Vec<&'static str> = self.signatures.iter().map(|s| s.version).collect();
        for rule in self.exact {
            for version in rule.versions {
                if !order.contains(version) {
                    order.push(*version);
                }
            }
        }
        order
    }

    pub fn exact_satisfied(&self, methods: &[MethodBytecode]) -> Vec<&'static str> {
        let mut claims = ClaimedMethods::new();
        let mut satisfied: HashMap<&'static str, bool> = HashMap::new();

        for rule in self.exact {
            let matched = claims.claim_first(methods, |m| rule.matches(m)).is_some();
            for version in rule.versions {
                *satisfied.entry(*version).or_insert(true) &= matched;
            }
        }

        self.priority_order()
            .into_iter()
            .filter(|version| satisfied.get(version).copied().unwrap_or(false))
            .collect()
    }

    fn partial_rules(&self, version: &str) -> &'static [PartialMatchRule] {
        self.signatures
            .iter()
            .find(|s| s.version == version)
            .map(|s| s.partial_matches)
            .unwrap_or(&[])
    }

    /// True when every partial rule of `version` claims its own method.
    pub fn confirms(&self, version: &str, methods: &[MethodBytecode]) -> bool {
        let mut claims = ClaimedMethods::new();
        self.partial_rules(version)
            .iter()
            .all(|rule| claims.claim_first(methods, |m| rule.matches(m)).is_some())
    }

    pub fn report(&self, methods: &[MethodBytecode]) -> MatchReport {
        let exact_satisfied = self.exact_satisfied(methods);
        let confirmed: Vec<&'static str> = exact_satisfied
            .iter()
            .copied()
            .filter(|version| self.confirms(version, methods))
            .collect();

        let report = MatchReport {
            exact_satisfied,
            confirmed,
        };
        if report.is_ambiguous() {
            info!(
                confirmed = ?report.confirmed,
                selected = ?report.best(),
                "several versions match the class signatures"
            );
        } else {
            debug!(
                methods = methods.len(),
                exact_satisfied = ?report.exact_satisfied,
                confirmed = ?report.confirmed,
                "signature match"
            );
        }
        report
    }

    pub fn match_signatures(&self, methods: &[MethodBytecode]) -> Option<&'static str> {
        self.report(methods).best()
    }
}
