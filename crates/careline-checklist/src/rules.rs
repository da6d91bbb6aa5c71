//! Locale-specific rule sets for the triage checklist.

use regex::Regex;

use crate::{CheckKey, RuleSetError};

/// How a rule decides whether text passes.
#[derive(Debug, Clone)]
pub enum Matcher {
    /// Passes when the pattern matches anywhere.
    Any(Regex),
    /// Passes only when every pattern matches.
    All(Vec<Regex>),
}

impl Matcher {
    fn is_match(&self, text: &str) -> bool {
        match self {
            Matcher::Any(re) => re.is_match(text),
            Matcher::All(res) => res.iter().all(|re| re.is_match(text)),
        }
    }
}

/// A named predicate over reply text.
#[derive(Debug, Clone)]
pub struct Rule {
    pub key: CheckKey,
    pub matcher: Matcher,
}

impl Rule {
    /// Case-insensitive single-pattern rule.
    pub fn pattern(key: CheckKey, pattern: &str) -> Result<Self, RuleSetError> {
        Ok(Self { key, matcher: Matcher::Any(compile(key, pattern)?) })
    }

    /// Case-insensitive rule requiring every pattern to match.
    pub fn all_of(key: CheckKey, patterns: &[&str]) -> Result<Self, RuleSetError> {
        let compiled = patterns
            .iter()
            .map(|p| compile(key, p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { key, matcher: Matcher::All(compiled) })
    }

    pub fn matches(&self, text: &str) -> bool {
        self.matcher.is_match(text)
    }
}

fn compile(key: CheckKey, pattern: &str) -> Result<Regex, RuleSetError> {
    Regex::new(&format!("(?im){pattern}")).map_err(|source| RuleSetError::Pattern { key, source })
}

/// An ordered list of rules covering each [`CheckKey`] exactly once.
#[derive(Debug, Clone)]
pub struct RuleSet {
    name: String,
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Validates that `rules` covers every key exactly once.
    pub fn new(name: impl Into<String>, rules: Vec<Rule>) -> Result<Self, RuleSetError> {
        let name = name.into();
        for key in CheckKey::ALL {
            match rules.iter().filter(|r| r.key == key).count() {
                0 => return Err(RuleSetError::MissingKey { set: name, key }),
                1 => {}
                _ => return Err(RuleSetError::DuplicateKey { set: name, key }),
            }
        }
        Ok(Self { name, rules })
    }

    /// Resolves a built-in rule set by locale name.
    pub fn for_locale(locale: &str) -> Result<Self, RuleSetError> {
        match locale.to_ascii_lowercase().as_str() {
            "pt-br" | "pt_br" | "pt" => Self::pt_br(),
            "en" | "en-us" | "en_us" => Self::en(),
            _ => Err(RuleSetError::UnknownLocale(locale.to_string())),
        }
    }

    /// Brazilian Portuguese phrasing used by the triage assistants.
    pub fn pt_br() -> Result<Self, RuleSetError> {
        Self::new(
            "pt-BR",
            vec![
                Rule::pattern(
                    CheckKey::RoleDisclosure,
                    r"IA de apoio|não substituo consulta|não prescrevo",
                )?,
                Rule::pattern(
                    CheckKey::UrgentAction,
                    r"ligue.*emerg|procure.*imediat|não dirija|vá ao hospital",
                )?,
                Rule::all_of(CheckKey::NumberedSteps, &[r"^\s*1[.)]", r"^\s*2[.)]"])?,
                Rule::pattern(
                    CheckKey::WorseningSigns,
                    r"sinais.*(pior|vermelh|alarme)|falta de ar|desmaio|vômitos|sangramento|confusão",
                )?,
                Rule::pattern(
                    CheckKey::ReassuringTone,
                    r"estou aqui|sua segurança|vamos passo a passo|acalme-se",
                )?,
            ],
        )
    }

    pub fn en() -> Result<Self, RuleSetError> {
        Self::new(
            "en",
            vec![
                Rule::pattern(
                    CheckKey::RoleDisclosure,
                    r"supportive AI|not a substitute for .*consultation|(do not|don't|cannot|can't) prescribe",
                )?,
                Rule::pattern(
                    CheckKey::UrgentAction,
                    r"call .*emergenc|call 911|seek .*immediate|(do not|don't) drive|go to (the|a) hospital",
                )?,
                Rule::all_of(CheckKey::NumberedSteps, &[r"^\s*1[.)]", r"^\s*2[.)]"])?,
                Rule::pattern(
                    CheckKey::WorseningSigns,
                    r"signs.*(worse|red.flag|alarm)|shortness of breath|faint|vomit|bleeding|confusion",
                )?,
                Rule::pattern(
                    CheckKey::ReassuringTone,
                    r"i['’]?m here|i am here|your safety|step by step|stay calm",
                )?,
            ],
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Runs the rule for `key` against `text`.
    pub fn check(&self, key: CheckKey, text: &str) -> bool {
        self.rules
            .iter()
            .find(|r| r.key == key)
            .is_some_and(|r| r.matches(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_set_requires_every_key() {
        let rules = vec![Rule::pattern(CheckKey::RoleDisclosure, "x").unwrap()];
        assert!(matches!(
            RuleSet::new("partial", rules),
            Err(RuleSetError::MissingKey { key: CheckKey::UrgentAction, .. })
        ));
    }

    #[test]
    fn rule_set_rejects_duplicates() {
        let mut rules: Vec<Rule> = CheckKey::ALL
            .iter()
            .map(|&k| Rule::pattern(k, "x").unwrap())
            .collect();
        rules.push(Rule::pattern(CheckKey::ReassuringTone, "y").unwrap());
        assert!(matches!(
            RuleSet::new("dup", rules),
            Err(RuleSetError::DuplicateKey { key: CheckKey::ReassuringTone, .. })
        ));
    }

    #[test]
    fn invalid_pattern_reports_key() {
        let err = Rule::pattern(CheckKey::WorseningSigns, "(unclosed").unwrap_err();
        assert!(err.to_string().starts_with("Invalid pattern for 'worseningSigns'"));
    }

    #[test]
    fn locale_names_are_case_insensitive() {
        assert_eq!(RuleSet::for_locale("PT-BR").unwrap().name(), "pt-BR");
        assert_eq!(RuleSet::for_locale("En").unwrap().name(), "en");
    }

    #[test]
    fn custom_rule_set_swaps_in_without_touching_scoring() {
        let rules = CheckKey::ALL
            .iter()
            .map(|&k| Rule::pattern(k, "ok").unwrap())
            .collect();
        let checklist = crate::Checklist::new(RuleSet::new("always-ok", rules).unwrap());
        assert!(checklist.evaluate("OK").approved());
        assert!(!checklist.evaluate("nope").approved());
    }
}
