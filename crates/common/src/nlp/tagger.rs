//! Rule-based tagger
//!
//! Tokenizes like a statistical tagger (punctuation split off words) and
//! labels capitalised name runs, years and numerals.

use super::{Annotation, Entity, EntityExtractor, EntityLabel};
use crate::errors::ResolveError;
use async_trait::async_trait;

/// Punctuation split off the edges of a word
const EDGE_PUNCTUATION: &[char] = &[
    '?', '!', '.', ',', ';', ':', '"', '\'', '(', ')', '[', ']', '{', '}',
];

/// Capitalised words that never start a name
const FUNCTION_WORDS: &[&str] = &[
    "a", "about", "an", "and", "are", "can", "define", "describe", "do", "does",
    "enlist", "explain", "for", "how", "i", "in", "is", "list", "me", "of",
    "on", "or", "please", "tell", "the", "to", "was", "were", "what", "when",
    "where", "which", "who", "why",
];

/// Default extractor: deterministic rules, no model weights
#[derive(Debug, Clone)]
pub struct RuleTagger {
    max_input_chars: usize,
}

impl RuleTagger {
    pub fn new(max_input_chars: usize) -> Self {
        Self { max_input_chars }
    }

    /// Annotate synchronously
    pub fn tag(&self, text: &str) -> Result<Annotation, ResolveError> {
        self.validate(text)?;

        let tokens = tokenize(text);
        let entities = extract_entities(&tokens);

        Ok(Annotation { entities, tokens })
    }

    fn validate(&self, text: &str) -> Result<(), ResolveError> {
        let length = text.chars().count();
        if length > self.max_input_chars {
            return Err(ResolveError::Analysis {
                message: format!(
                    "input is {} characters, limit is {}",
                    length, self.max_input_chars
                ),
            });
        }

        if let Some(ch) = text.chars().find(|c| c.is_control() && !c.is_whitespace()) {
            return Err(ResolveError::Analysis {
                message: format!("input contains control character U+{:04X}", ch as u32),
            });
        }

        Ok(())
    }
}

impl Default for RuleTagger {
    fn default() -> Self {
        Self::new(2000)
    }
}

#[async_trait]
impl EntityExtractor for RuleTagger {
    async fn annotate(&self, text: &str) -> Result<Annotation, ResolveError> {
        self.tag(text)
    }

    fn model_name(&self) -> &str {
        "rule-tagger"
    }
}

/// Split on whitespace, then peel punctuation off both edges of each word
fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();

    for word in text.split_whitespace() {
        let core_start = word
            .char_indices()
            .find(|(_, c)| !EDGE_PUNCTUATION.contains(c))
            .map(|(i, _)| i)
            .unwrap_or(word.len());
        let core_end = word
            .char_indices()
            .rev()
            .find(|(_, c)| !EDGE_PUNCTUATION.contains(c))
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(core_start);

        tokens.extend(word[..core_start].chars().map(String::from));
        if core_start < core_end {
            tokens.push(word[core_start..core_end].to_string());
        }
        tokens.extend(word[core_end.max(core_start)..].chars().map(String::from));
    }

    tokens
}

fn extract_entities(tokens: &[String]) -> Vec<Entity> {
    let mut entities = Vec::new();
    let mut run: Vec<&str> = Vec::new();

    for token in tokens {
        if is_name_token(token) {
            run.push(token);
            continue;
        }

        flush_name(&mut run, &mut entities);

        if let Some(label) = numeric_label(token) {
            entities.push(Entity {
                text: token.clone(),
                label,
            });
        }
    }
    flush_name(&mut run, &mut entities);

    entities
}

fn flush_name(run: &mut Vec<&str>, entities: &mut Vec<Entity>) {
    if !run.is_empty() {
        entities.push(Entity {
            text: run.join(" "),
            label: EntityLabel::Name,
        });
        run.clear();
    }
}

fn is_name_token(token: &str) -> bool {
    let starts_upper = token.chars().next().map_or(false, char::is_uppercase);
    starts_upper
        && token.chars().any(char::is_alphabetic)
        && !FUNCTION_WORDS.contains(&token.to_lowercase().as_str())
}

fn numeric_label(token: &str) -> Option<EntityLabel> {
    if token.len() == 4 && token.chars().all(|c| c.is_ascii_digit()) {
        if let Ok(year) = token.parse::<u32>() {
            if (1000..=2100).contains(&year) {
                return Some(EntityLabel::Date);
            }
        }
    }

    let digits = token.replace(',', "");
    if token.chars().next().map_or(false, |c| c.is_ascii_digit()) && digits.parse::<f64>().is_ok() {
        return Some(EntityLabel::Cardinal);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(annotation: &Annotation) -> Vec<&str> {
        annotation.entities.iter().map(|e| e.text.as_str()).collect()
    }

    #[test]
    fn test_tokenize_splits_punctuation() {
        assert_eq!(tokenize("What is Java?"), vec!["What", "is", "Java", "?"]);
        assert_eq!(tokenize("(C++), ok!"), vec!["(", "C++", ")", ",", "ok", "!"]);
        assert_eq!(tokenize("?!"), vec!["?", "!"]);
    }

    #[test]
    fn test_question_words_are_not_entities() {
        let tagger = RuleTagger::default();
        let annotation = tagger.tag("What is Java?").unwrap();
        assert_eq!(texts(&annotation), vec!["Java"]);
        assert_eq!(annotation.entities[0].label, EntityLabel::Name);
    }

    #[test]
    fn test_multi_word_names() {
        let tagger = RuleTagger::default();
        let annotation = tagger.tag("Who is James Gosling at Sun Microsystems?").unwrap();
        assert_eq!(texts(&annotation), vec!["James Gosling", "Sun Microsystems"]);
    }

    #[test]
    fn test_numbers_and_dates() {
        let tagger = RuleTagger::default();
        let annotation = tagger.tag("released in 1995 with 8 primitives").unwrap();
        assert_eq!(
            annotation.entities,
            vec![
                Entity { text: "1995".into(), label: EntityLabel::Date },
                Entity { text: "8".into(), label: EntityLabel::Cardinal },
            ]
        );
    }

    #[test]
    fn test_lowercase_input_has_no_entities() {
        let tagger = RuleTagger::default();
        let annotation = tagger.tag("enlist fruits").unwrap();
        assert!(annotation.entities.is_empty());
        assert_eq!(annotation.tokens, vec!["enlist", "fruits"]);
    }

    #[test]
    fn test_deterministic() {
        let tagger = RuleTagger::default();
        let text = "How to install the JDK on Linux?";
        assert_eq!(tagger.tag(text).unwrap(), tagger.tag(text).unwrap());
    }

    #[test]
    fn test_rejects_control_characters() {
        let tagger = RuleTagger::default();
        let err = tagger.tag("What is \u{0}Java?").unwrap_err();
        assert!(matches!(err, ResolveError::Analysis { .. }));
        assert!(tagger.tag("line one\nline two\t").is_ok());
    }

    #[test]
    fn test_rejects_oversized_input() {
        let tagger = RuleTagger::new(10);
        let err = tagger.tag("this sentence is too long").unwrap_err();
        assert!(matches!(err, ResolveError::Analysis { .. }));
    }

    #[test]
    fn test_trait_annotate() {
        let tagger = RuleTagger::default();
        let extractor: &dyn EntityExtractor = &tagger;
        let annotation = tokio_test::block_on(extractor.annotate("Who is Python?")).unwrap();
        assert_eq!(texts(&annotation), vec!["Python"]);
        assert_eq!(extractor.model_name(), "rule-tagger");
    }
}
