//! Intent router - classifies an utterance and extracts its argument
//!
//! Classification walks an ordered rule table. Triggers overlap, so the order
//! of `RULES` is the contract: the first matching rule wins and anything left
//! over is free-form.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Intent categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    /// "what is X?" or "define X"
    Definition,
    /// "list X" / "enlist X"
    Enumeration,
    /// "how to X?"
    Procedure,
    /// "what are/was/were X?"
    FactualWhat,
    /// "who is X?"
    FactualWho,
    /// Anything else
    FreeForm,
}

impl IntentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentKind::Definition => "definition",
            IntentKind::Enumeration => "enumeration",
            IntentKind::Procedure => "procedure",
            IntentKind::FactualWhat => "factual_what",
            IntentKind::FactualWho => "factual_who",
            IntentKind::FreeForm => "free_form",
        }
    }
}

impl fmt::Display for IntentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified utterance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    pub kind: IntentKind,
    /// Trimmed span after the trigger phrase (the whole utterance for free-form)
    pub argument: String,
}

/// How a rule treats a trailing question mark
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionMark {
    /// Must be present; stripped from the argument
    Required,
    /// Stripped when present
    Optional,
    /// Left as part of the argument
    Ignored,
}

/// One row of the classification table
#[derive(Debug, Clone, Copy)]
pub struct IntentRule {
    pub kind: IntentKind,
    /// Lowercase trigger prefixes, each ending in a space
    pub triggers: &'static [&'static str],
    pub question_mark: QuestionMark,
}

impl IntentRule {
    /// Argument span if the utterance matches this rule
    fn extract(&self, utterance: &str) -> Option<String> {
        let trigger = self
            .triggers
            .iter()
            .find(|trigger| starts_with_ignore_case(utterance, trigger))?;
        let rest = &utterance[trigger.len()..];

        let rest = match self.question_mark {
            QuestionMark::Required => rest.strip_suffix('?')?,
            QuestionMark::Optional => rest.strip_suffix('?').unwrap_or(rest),
            QuestionMark::Ignored => rest,
        };

        let argument = rest.trim();
        (!argument.is_empty()).then(|| argument.to_string())
    }
}

/// Classification order
pub const RULES: &[IntentRule] = &[
    IntentRule {
        kind: IntentKind::Definition,
        triggers: &["what is "],
        question_mark: QuestionMark::Required,
    },
    IntentRule {
        kind: IntentKind::FactualWho,
        triggers: &["who is "],
        question_mark: QuestionMark::Required,
    },
    IntentRule {
        kind: IntentKind::FactualWhat,
        triggers: &["what are ", "what was ", "what were "],
        question_mark: QuestionMark::Required,
    },
    IntentRule {
        kind: IntentKind::Enumeration,
        triggers: &["enlist ", "list "],
        question_mark: QuestionMark::Ignored,
    },
    IntentRule {
        kind: IntentKind::Procedure,
        triggers: &["how to "],
        question_mark: QuestionMark::Required,
    },
    IntentRule {
        kind: IntentKind::Definition,
        triggers: &["define "],
        question_mark: QuestionMark::Optional,
    },
];

/// Classifies utterances with a fixed rule table
#[derive(Debug, Clone, Copy)]
pub struct IntentRouter {
    rules: &'static [IntentRule],
}

impl IntentRouter {
    pub fn new() -> Self {
        Self { rules: RULES }
    }

    pub fn rules(&self) -> &'static [IntentRule] {
        self.rules
    }

    /// Classify an utterance. Never fails: free-form is the default.
    pub fn classify(&self, utterance: &str) -> Intent {
        let utterance = utterance.trim();

        self.rules
            .iter()
            .find_map(|rule| {
                rule.extract(utterance).map(|argument| Intent {
                    kind: rule.kind,
                    argument,
                })
            })
            .unwrap_or_else(|| Intent {
                kind: IntentKind::FreeForm,
                argument: utterance.to_string(),
            })
    }
}

impl Default for IntentRouter {
    fn default() -> Self {
        Self::new()
    }
}

/// ASCII case-insensitive prefix test that never slices inside a code point
fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.get(..prefix.len())
        .map_or(false, |head| head.eq_ignore_ascii_case(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(text: &str) -> Intent {
        IntentRouter::new().classify(text)
    }

    fn intent(kind: IntentKind, argument: &str) -> Intent {
        Intent {
            kind,
            argument: argument.to_string(),
        }
    }

    #[test]
    fn test_definition_any_case() {
        for text in ["what is Java?", "What is Java?", "WHAT IS Java?", "wHaT iS   Java  ?"] {
            assert_eq!(classify(text), intent(IntentKind::Definition, "Java"), "{}", text);
        }
    }

    #[test]
    fn test_who_is() {
        assert_eq!(classify("Who is Python?"), intent(IntentKind::FactualWho, "Python"));
    }

    #[test]
    fn test_what_are() {
        assert_eq!(
            classify("What are access modifiers?"),
            intent(IntentKind::FactualWhat, "access modifiers")
        );
    }

    #[test]
    fn test_enumeration_keeps_remainder() {
        assert_eq!(classify("enlist fruits"), intent(IntentKind::Enumeration, "fruits"));
        assert_eq!(
            classify("List Java keywords"),
            intent(IntentKind::Enumeration, "Java keywords")
        );
    }

    #[test]
    fn test_procedure() {
        assert_eq!(
            classify("How to compile a class?"),
            intent(IntentKind::Procedure, "compile a class")
        );
    }

    #[test]
    fn test_define_strips_optional_question_mark() {
        assert_eq!(classify("define polymorphism"), intent(IntentKind::Definition, "polymorphism"));
        assert_eq!(classify("Define polymorphism?"), intent(IntentKind::Definition, "polymorphism"));
    }

    #[test]
    fn test_missing_question_mark_falls_through() {
        assert_eq!(classify("what is Java"), intent(IntentKind::FreeForm, "what is Java"));
        assert_eq!(classify("how to compile"), intent(IntentKind::FreeForm, "how to compile"));
    }

    #[test]
    fn test_empty_argument_falls_through() {
        assert_eq!(classify("what is ?"), intent(IntentKind::FreeForm, "what is ?"));
        assert_eq!(classify("list "), intent(IntentKind::FreeForm, "list"));
    }

    #[test]
    fn test_free_form_is_trimmed_utterance() {
        assert_eq!(
            classify("  tell me about garbage collection "),
            intent(IntentKind::FreeForm, "tell me about garbage collection")
        );
    }

    #[test]
    fn test_non_ascii_input_does_not_panic() {
        assert_eq!(classify("wh€t is Java?").kind, IntentKind::FreeForm);
        assert_eq!(classify("é").kind, IntentKind::FreeForm);
    }

    #[test]
    fn test_rule_order() {
        let kinds: Vec<IntentKind> = IntentRouter::new().rules().iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![
                IntentKind::Definition,
                IntentKind::FactualWho,
                IntentKind::FactualWhat,
                IntentKind::Enumeration,
                IntentKind::Procedure,
                IntentKind::Definition,
            ]
        );
    }
}
