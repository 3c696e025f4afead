//! Progressive-click selection of the words of a verse.
//!
//! The first click on a word selects it. Clicking the same word again
//! widens the selection to the whole verse (and back). Clicking another
//! word of the same verse turns the selection into a phrase spanning
//! both words.
use serde::{Deserialize, Serialize};

use crate::ai::AnalysisLevel;

/// Inclusive range of word indexes within a verse.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct WordRange {
    pub start: usize,
    pub end: usize,
}

impl WordRange {
    fn single(index: usize) -> Self {
        WordRange {
            start: index,
            end: index,
        }
    }

    fn is_single(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub verse_id: i32,
    pub range: WordRange,
    pub level: AnalysisLevel,
}

impl Selection {
    /// Selects a single word.
    pub fn word(verse_id: i32, index: usize) -> Self {
        Selection {
            verse_id,
            range: WordRange::single(index),
            level: AnalysisLevel::Word,
        }
    }

    /// Whether the word at `index` of `verse_id` is highlighted.
    pub fn contains(&self, verse_id: i32, index: usize) -> bool {
        self.verse_id == verse_id && (self.range.start..=self.range.end).contains(&index)
    }
}

/// What the reader currently has selected, if anything.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SelectionState {
    current: Option<Selection>,
}

impl SelectionState {
    pub fn new() -> Self {
        SelectionState::default()
    }

    pub fn current(&self) -> Option<&Selection> {
        self.current.as_ref()
    }

    /// Applies a click on word `index` of `verse_id` and returns the
    /// resulting selection.
    pub fn click(&mut self, verse_id: i32, index: usize) -> Selection {
        let next = match self.current {
            Some(sel) if sel.verse_id == verse_id => {
                if sel.range.is_single() && sel.range.start == index {
                    let level = match sel.level {
                        AnalysisLevel::Word => AnalysisLevel::Verse,
                        _ => AnalysisLevel::Word,
                    };
                    Selection { level, ..sel }
                } else {
                    Selection {
                        verse_id,
                        range: WordRange {
                            start: sel.range.start.min(index),
                            end: sel.range.end.max(index),
                        },
                        level: AnalysisLevel::Phrase,
                    }
                }
            }
            _ => Selection::word(verse_id, index),
        };

        self.current = Some(next);
        next
    }

    /// Replaces the selection, e.g. when restoring it from a link.
    pub fn set_manual(
        &mut self,
        verse_id: i32,
        start: usize,
        end: usize,
        level: AnalysisLevel,
    ) -> Selection {
        let selection = Selection {
            verse_id,
            range: WordRange {
                start: start.min(end),
                end: start.max(end),
            },
            level,
        };
        self.current = Some(selection);
        selection
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    /// Text to send for analysis given the selected verse's text.
    ///
    /// Returns `None` when nothing is selected.
    pub fn text_for_analysis(&self, verse_text: &str) -> Option<String> {
        self.current.map(|sel| selected_text(&sel, verse_text))
    }
}

/// The words of `verse_text` covered by `selection`, or the whole verse at
/// verse level. Ranges past the last word are clamped; a range starting
/// past it selects nothing.
pub fn selected_text(selection: &Selection, verse_text: &str) -> String {
    if selection.level == AnalysisLevel::Verse {
        return verse_text.to_string();
    }

    let words: Vec<&str> = verse_text.split_whitespace().collect();
    let start = selection.range.start;
    if start >= words.len() {
        return String::new();
    }
    let end = selection.range.end.min(words.len() - 1);

    words[start..=end].join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERSE: &str = "Porque Deus tanto amou o mundo que deu o seu Filho Unigênito";

    #[test]
    fn first_click_selects_word() {
        let mut state = SelectionState::new();
        let sel = state.click(7, 1);

        assert_eq!(sel, Selection::word(7, 1));
        assert_eq!(state.text_for_analysis(VERSE), Some("Deus".to_string()));
    }

    #[test]
    fn second_word_makes_phrase() {
        let mut state = SelectionState::new();
        state.click(7, 2);
        let sel = state.click(7, 5);

        assert_eq!(sel.range, WordRange { start: 2, end: 5 });
        assert_eq!(sel.level, AnalysisLevel::Phrase);
        assert_eq!(
            state.text_for_analysis(VERSE),
            Some("tanto amou o mundo".to_string())
        );

        // Clicking inside or before the phrase keeps extending it.
        let sel = state.click(7, 0);
        assert_eq!(sel.range, WordRange { start: 0, end: 5 });
        assert_eq!(sel.level, AnalysisLevel::Phrase);
    }

    #[test]
    fn same_word_toggles_verse() {
        let mut state = SelectionState::new();
        state.click(7, 3);

        let sel = state.click(7, 3);
        assert_eq!(sel.level, AnalysisLevel::Verse);
        assert_eq!(state.text_for_analysis(VERSE), Some(VERSE.to_string()));

        let sel = state.click(7, 3);
        assert_eq!(sel.level, AnalysisLevel::Word);
        assert_eq!(state.text_for_analysis(VERSE), Some("amou".to_string()));
    }

    #[test]
    fn other_verse_starts_over() {
        let mut state = SelectionState::new();
        state.click(7, 2);
        state.click(7, 5);

        let sel = state.click(8, 4);
        assert_eq!(sel, Selection::word(8, 4));
    }

    #[test]
    fn manual_selection_and_clear() {
        let mut state = SelectionState::new();
        let sel = state.set_manual(7, 4, 1, AnalysisLevel::Phrase);

        assert_eq!(sel.range, WordRange { start: 1, end: 4 });
        assert!(sel.contains(7, 3));
        assert!(!sel.contains(7, 5));
        assert!(!sel.contains(8, 3));

        state.clear();
        assert_eq!(state.current(), None);
        assert_eq!(state.text_for_analysis(VERSE), None);
    }

    #[test]
    fn range_is_clamped_to_verse() {
        let sel = Selection {
            verse_id: 1,
            range: WordRange { start: 1, end: 40 },
            level: AnalysisLevel::Phrase,
        };
        assert_eq!(selected_text(&sel, "Jesus chorou."), "chorou.");
        assert_eq!(selected_text(&sel, ""), "");
    }

    #[test]
    fn range_past_the_verse_is_empty() {
        let sel = Selection {
            verse_id: 1,
            range: WordRange { start: 40, end: 42 },
            level: AnalysisLevel::Phrase,
        };
        assert_eq!(selected_text(&sel, "Jesus chorou."), "");

        let mut state = SelectionState::new();
        state.set_manual(1, 40, 40, AnalysisLevel::Word);
        assert_eq!(state.text_for_analysis("Jesus chorou."), Some(String::new()));
    }
}
