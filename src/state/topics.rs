//! Table topics queue

use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicEntry {
    /// 1-based, assigned at insertion
    pub ordinal: u32,
    pub text: String,
    pub revealed: bool,
}

/// Listing row as shown to the room: the number, and the text once revealed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicSummary {
    pub ordinal: u32,
    pub revealed: bool,
    pub text: Option<String>,
}

impl From<&TopicEntry> for TopicSummary {
    fn from(entry: &TopicEntry) -> Self {
        Self {
            ordinal: entry.ordinal,
            revealed: entry.revealed,
            text: entry.revealed.then(|| entry.text.clone()),
        }
    }
}

/// Append-only list of topics plus the one currently on display
#[derive(Debug, Clone, Default)]
pub struct TopicList {
    topics: Vec<TopicEntry>,
    revealed_text: Option<String>,
}

impl TopicList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a topic. Blank text is ignored.
    pub fn add(&mut self, text: &str) -> Option<&TopicEntry> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let ordinal = self.topics.len() as u32 + 1;
        self.topics.push(TopicEntry {
            ordinal,
            text: text.to_string(),
            revealed: false,
        });
        self.topics.last()
    }

    /// Show the topic with the given ordinal
    pub fn reveal(&mut self, ordinal: u32) -> Option<&TopicEntry> {
        let index = (ordinal as usize).checked_sub(1)?;
        self.reveal_index(index)
    }

    /// Show a uniformly chosen topic. No-op on an empty list.
    pub fn pick_random<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<&TopicEntry> {
        if self.topics.is_empty() {
            return None;
        }
        let index = rng.gen_range(0..self.topics.len());
        self.reveal_index(index)
    }

    fn reveal_index(&mut self, index: usize) -> Option<&TopicEntry> {
        let entry = self.topics.get_mut(index)?;
        entry.revealed = true;
        self.revealed_text = Some(entry.text.clone());
        Some(&*entry)
    }

    pub fn revealed_text(&self) -> Option<&str> {
        self.revealed_text.as_deref()
    }

    pub fn summaries(&self) -> Vec<TopicSummary> {
        self.topics.iter().map(TopicSummary::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn ordinals_follow_insertion_order() {
        let mut topics = TopicList::new();
        assert_eq!(topics.add("First").map(|t| t.ordinal), Some(1));
        assert!(topics.add("  ").is_none());
        assert_eq!(topics.add(" Second ").map(|t| t.text.clone()), Some("Second".to_string()));
        let ordinals: Vec<_> = topics.summaries().iter().map(|s| s.ordinal).collect();
        assert_eq!(ordinals, vec![1, 2]);
    }

    #[test]
    fn reveal_sets_text_and_flag() {
        let mut topics = TopicList::new();
        topics.add("Favourite holiday");
        topics.add("Best advice");

        assert!(topics.reveal(0).is_none());
        assert!(topics.reveal(3).is_none());
        assert_eq!(topics.revealed_text(), None);

        topics.reveal(2);
        assert_eq!(topics.revealed_text(), Some("Best advice"));
        let summaries = topics.summaries();
        assert_eq!(summaries[0].text, None);
        assert_eq!(summaries[1].text.as_deref(), Some("Best advice"));
    }

    #[test]
    fn pick_on_empty_list_is_a_no_op() {
        let mut topics = TopicList::new();
        let mut rng = StdRng::seed_from_u64(7);
        assert!(topics.pick_random(&mut rng).is_none());
        assert_eq!(topics.revealed_text(), None);
    }

    #[test]
    fn pick_reveals_one_of_the_topics() {
        let mut topics = TopicList::new();
        topics.add("A");
        topics.add("B");
        topics.add("C");
        let mut rng = StdRng::seed_from_u64(42);
        let picked = topics.pick_random(&mut rng).map(|t| t.text.clone()).unwrap();
        assert!(["A", "B", "C"].contains(&picked.as_str()));
        assert_eq!(topics.revealed_text(), Some(picked.as_str()));
    }
}
