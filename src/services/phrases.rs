use crate::config::PhraseEntry;

/// Canned responses keyed by a phrase that must appear in the utterance.
/// Matching is case-insensitive; the first configured match wins.
#[derive(Debug, Clone, Default)]
pub struct PhraseTable {
    entries: Vec<(String, String)>,
}

impl PhraseTable {
    pub fn new(entries: &[PhraseEntry]) -> Self {
        Self {
            entries: entries
                .iter()
                .filter(|e| !e.phrase.trim().is_empty())
                .map(|e| (e.phrase.trim().to_lowercase(), e.response.clone()))
                .collect(),
        }
    }

    pub fn lookup(&self, text: &str) -> Option<&str> {
        if text.trim().is_empty() {
            return None;
        }
        let text = text.to_lowercase();
        self.entries
            .iter()
            .find(|(phrase, _)| text.contains(phrase.as_str()))
            .map(|(_, response)| response.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
