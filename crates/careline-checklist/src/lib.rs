//! Triage checklist evaluation for assistant replies.
//!
//! A reply is scored against five fixed heuristics ([`CheckKey`]). Each
//! heuristic is a [`Rule`] from a locale-specific [`RuleSet`]; the scoring
//! itself ([`ChecklistResult`]) does not depend on the rule set in use.
//!
//! - [`Checklist`] — Evaluator bound to one rule set
//! - [`RuleSet`] — Ordered, validated list of rules (`pt-BR`, `en`)
//! - [`ChecklistResult`] — Per-key booleans plus the derived verdict
//! - [`reported_check`] — Fenced JSON block an assistant may append to its reply
//!
//! # Example
//!
//! ```rust
//! use careline_checklist::{CheckKey, Checklist};
//!
//! let checklist = Checklist::for_locale("pt-BR").unwrap();
//! let result = checklist.evaluate("Estou aqui. Sou uma IA de apoio.");
//!
//! assert!(result.passed(CheckKey::ReassuringTone));
//! assert!(!result.approved());
//! ```

mod rules;

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

pub use rules::{Matcher, Rule, RuleSet};

/// Minimum number of passing checks for a reply to be approved.
pub const PASS_THRESHOLD: usize = 4;

/// Errors raised while building a rule set.
#[derive(Error, Debug)]
pub enum RuleSetError {
    #[error("Invalid pattern for '{key}': {source}")]
    Pattern {
        key: CheckKey,
        #[source]
        source: regex::Error,
    },

    #[error("Rule set '{set}' has no rule for '{key}'")]
    MissingKey { set: String, key: CheckKey },

    #[error("Rule set '{set}' has more than one rule for '{key}'")]
    DuplicateKey { set: String, key: CheckKey },

    #[error("Unknown checklist locale: '{0}'")]
    UnknownLocale(String),
}

/// The five fixed checklist heuristics, in reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CheckKey {
    /// Assistant states it is supportive AI, not a consultation, and does not prescribe.
    RoleDisclosure,
    /// Instruction to call emergency services, seek immediate care, not drive, go to hospital.
    UrgentAction,
    /// At least a "1." and a "2." line.
    NumberedSteps,
    /// Red-flag symptoms to watch for.
    WorseningSigns,
    /// Calm, supportive phrasing.
    ReassuringTone,
}

impl CheckKey {
    pub const ALL: [CheckKey; 5] = [
        CheckKey::RoleDisclosure,
        CheckKey::UrgentAction,
        CheckKey::NumberedSteps,
        CheckKey::WorseningSigns,
        CheckKey::ReassuringTone,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RoleDisclosure => "roleDisclosure",
            Self::UrgentAction => "urgentAction",
            Self::NumberedSteps => "numberedSteps",
            Self::WorseningSigns => "worseningSigns",
            Self::ReassuringTone => "reassuringTone",
        }
    }
}

impl fmt::Display for CheckKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of evaluating one reply.
///
/// Always holds exactly one entry per [`CheckKey`]; `approved` is derived
/// from those entries at construction and never set independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChecklistResult {
    checks: BTreeMap<CheckKey, bool>,
    approved: bool,
}

impl ChecklistResult {
    /// Builds a result by asking `check` about every key.
    pub fn from_fn(mut check: impl FnMut(CheckKey) -> bool) -> Self {
        let checks: BTreeMap<CheckKey, bool> =
            CheckKey::ALL.iter().map(|&key| (key, check(key))).collect();
        let approved = checks.values().filter(|&&v| v).count() >= PASS_THRESHOLD;
        Self { checks, approved }
    }

    pub fn approved(&self) -> bool {
        self.approved
    }

    pub fn passed(&self, key: CheckKey) -> bool {
        self.checks.get(&key).copied().unwrap_or(false)
    }

    /// Number of checks that passed.
    pub fn score(&self) -> usize {
        self.checks.values().filter(|&&v| v).count()
    }

    pub fn checks(&self) -> &BTreeMap<CheckKey, bool> {
        &self.checks
    }
}

/// Evaluator that scores reply text with one rule set.
#[derive(Debug, Clone)]
pub struct Checklist {
    rules: RuleSet,
}

impl Checklist {
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    /// Creates an evaluator with a built-in rule set (`pt-BR` or `en`).
    pub fn for_locale(locale: &str) -> Result<Self, RuleSetError> {
        RuleSet::for_locale(locale).map(Self::new)
    }

    /// Name of the active rule set.
    pub fn locale(&self) -> &str {
        self.rules.name()
    }

    /// Scores `text` against every rule. Absent matches simply fail that check.
    pub fn evaluate(&self, text: &str) -> ChecklistResult {
        let result = ChecklistResult::from_fn(|key| self.rules.check(key, text));
        debug!(
            "Checklist ({}): {}/{} passed, approved = {}",
            self.rules.name(),
            result.score(),
            CheckKey::ALL.len(),
            result.approved()
        );
        result
    }
}

/// Extracts the first fenced ```` ```json ```` block from a reply, if it parses.
pub fn reported_check(text: &str) -> Option<serde_json::Value> {
    let start = text.find("```json")? + "```json".len();
    let rest = &text[start..];
    let end = rest.find("```")?;
    serde_json::from_str(rest[..end].trim()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt() -> Checklist {
        Checklist::for_locale("pt-BR").unwrap()
    }

    fn en() -> Checklist {
        Checklist::for_locale("en").unwrap()
    }

    #[test]
    fn empty_text_fails_every_check() {
        for checklist in [pt(), en()] {
            let result = checklist.evaluate("");
            assert_eq!(result.checks().len(), 5);
            assert!(result.checks().values().all(|v| !v));
            assert!(!result.approved());
        }
    }

    #[test]
    fn four_of_five_is_approved() {
        let text = "Sou uma IA de apoio e não prescrevo medicamentos.\n\
                    Ligue agora para o serviço de emergência (192).\n\
                    1. Sente-se em local seguro\n\
                    2. Afrouxe as roupas\n\
                    Se houver falta de ar ou desmaio, avise imediatamente.";
        let result = pt().evaluate(text);

        assert!(result.passed(CheckKey::RoleDisclosure));
        assert!(result.passed(CheckKey::UrgentAction));
        assert!(result.passed(CheckKey::NumberedSteps));
        assert!(result.passed(CheckKey::WorseningSigns));
        assert!(!result.passed(CheckKey::ReassuringTone));
        assert_eq!(result.score(), 4);
        assert!(result.approved());
    }

    #[test]
    fn reassurance_and_disclosure_alone_are_not_enough() {
        let text = "Estou aqui com você. Sou uma IA de apoio, não substituo consulta.";
        let result = pt().evaluate(text);

        assert!(result.passed(CheckKey::RoleDisclosure));
        assert!(result.passed(CheckKey::ReassuringTone));
        assert_eq!(result.score(), 2);
        assert!(!result.approved());
    }

    #[test]
    fn all_five_in_english() {
        let text = "I'm here with you. I am a supportive AI and I do not prescribe medication.\n\
                    Call emergency services now and do not drive yourself.\n\
                    1. Sit down\n\
                    2) Loosen tight clothing\n\
                    Watch for shortness of breath or fainting.";
        let result = en().evaluate(text);
        assert_eq!(result.score(), 5);
        assert!(result.approved());
    }

    #[test]
    fn matching_ignores_case() {
        let result = pt().evaluate("ACALME-SE. VÁ AO HOSPITAL. SANGRAMENTO É SINAL DE ALERTA.");
        assert!(result.passed(CheckKey::ReassuringTone));
        assert!(result.passed(CheckKey::UrgentAction));
        assert!(result.passed(CheckKey::WorseningSigns));
    }

    #[test]
    fn numbered_steps_need_both_lines() {
        let checklist = pt();
        assert!(!checklist.evaluate("1. Respire fundo").passed(CheckKey::NumberedSteps));
        assert!(!checklist.evaluate("Faça isso: 1. beba água 2. descanse").passed(CheckKey::NumberedSteps));
        assert!(checklist.evaluate("1) beba água\n  2) descanse").passed(CheckKey::NumberedSteps));
    }

    #[test]
    fn approval_is_threshold_of_checks() {
        for mask in 0u8..32 {
            let result = ChecklistResult::from_fn(|key| {
                let idx = CheckKey::ALL.iter().position(|k| *k == key).unwrap();
                mask & (1 << idx) != 0
            });
            assert_eq!(result.checks().len(), 5);
            assert_eq!(result.approved(), mask.count_ones() >= 4, "mask {mask:05b}");
        }
    }

    #[test]
    fn result_serializes_with_camel_case_keys() {
        let result = pt().evaluate("");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "checks": {
                    "roleDisclosure": false,
                    "urgentAction": false,
                    "numberedSteps": false,
                    "worseningSigns": false,
                    "reassuringTone": false
                },
                "approved": false
            })
        );
    }

    #[test]
    fn reported_check_parses_fenced_json() {
        let text = "Resposta.\n```json\n{\"aprovado\": true}\n```\nFim.";
        assert_eq!(reported_check(text), Some(serde_json::json!({ "aprovado": true })));
        assert_eq!(reported_check("```json\n{not json}\n```"), None);
        assert_eq!(reported_check("sem bloco"), None);
    }

    #[test]
    fn unknown_locale_is_rejected() {
        assert!(matches!(
            Checklist::for_locale("xx"),
            Err(RuleSetError::UnknownLocale(l)) if l == "xx"
        ));
    }
}
