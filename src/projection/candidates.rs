//! Record-Element Candidate Scorer
//!
//! Pre-pass that picks which element path delimits records. While the
//! tree streams by, each open element counts its immediate child names;
//! when the element closes its repeating children are ranked:
//!
//! ```text
//! <library>                 library: book x12, name x1
//!   <name/>                   -> candidate [library, book] (12)
//!   <book>..</book> x12       -> 12 / 1 > 5, chosen
//! </library>
//! ```
//!
//! A candidate wins only if its count dominates the number of competing
//! candidates (`count / competitors > 5`, integer division). Otherwise it is
//! handed up to the parent, which ranks it against its own candidates.

use indexmap::IndexMap;

use crate::tree::{Leaf, TreeEvents};

/// Maximum distinct child names for an element to propose candidates
const MAX_CHILD_NAMES: usize = 5;
/// Maximum repeating children for an element to propose candidates
const MAX_IMMEDIATE_CANDIDATES: usize = 4;
/// Required ratio of count to competing candidates
const DOMINANCE_RATIO: usize = 5;

/// An element path considered as the record boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordElementCandidate {
    pub path: Vec<String>,
    pub count: usize,
}

/// Rank candidates by count, descending; ties keep first-observed order
pub fn sort_record_element_candidates(candidates: &mut [RecordElementCandidate]) {
    // sort_by_key is stable
    candidates.sort_by_key(|c| std::cmp::Reverse(c.count));
}

/// State of one open element
#[derive(Debug, Default)]
struct Frame {
    path: Vec<String>,
    /// Immediate child name counts, first-seen order
    child_names: IndexMap<String, usize>,
    descendants: Vec<RecordElementCandidate>,
}

impl Frame {
    fn count_child(&mut self, name: &str) {
        match self.child_names.get_mut(name) {
            Some(count) => *count += 1,
            None => {
                self.child_names.insert(name.to_string(), 1);
            }
        }
    }

    /// Decide what this element proposes to its parent
    fn resolve(mut self) -> Option<RecordElementCandidate> {
        let distinct = self.child_names.len();
        if distinct > 0 && distinct <= MAX_CHILD_NAMES {
            let mut immediate: Vec<RecordElementCandidate> = self
                .child_names
                .iter()
                .filter(|(_, count)| **count > 1)
                .map(|(name, count)| {
                    let mut path = self.path.clone();
                    path.push(name.clone());
                    RecordElementCandidate { path, count: *count }
                })
                .collect();

            if !immediate.is_empty() && immediate.len() <= MAX_IMMEDIATE_CANDIDATES {
                sort_record_element_candidates(&mut immediate);
                let competitors = immediate.len();
                let best = immediate.swap_remove(0);
                if best.count / competitors > DOMINANCE_RATIO {
                    return Some(best);
                }
                self.descendants.push(best);
            }
        }

        if !self.descendants.is_empty() {
            sort_record_element_candidates(&mut self.descendants);
            let competitors = self.descendants.len();
            let best = self.descendants.swap_remove(0);
            if best.count / competitors > DOMINANCE_RATIO {
                return Some(best);
            }
        }

        None
    }
}

/// Event consumer that detects the record path
#[derive(Debug)]
pub struct RecordElementScorer {
    stack: Vec<Frame>,
    detected: Option<RecordElementCandidate>,
    first_top_level: Option<String>,
}

impl Default for RecordElementScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordElementScorer {
    pub fn new() -> Self {
        Self {
            // Document level: not itself an element
            stack: vec![Frame::default()],
            detected: None,
            first_top_level: None,
        }
    }

    /// The detected record path, if a top-level element produced one
    pub fn record_path(&self) -> Option<&[String]> {
        self.detected.as_ref().map(|c| c.path.as_slice())
    }

    /// The winning candidate with its count
    pub fn candidate(&self) -> Option<&RecordElementCandidate> {
        self.detected.as_ref()
    }

    /// Path of the first top-level element, used when detection fails
    pub fn fallback_path(&self) -> Option<Vec<String>> {
        self.first_top_level.clone().map(|name| vec![name])
    }

    /// Consume the scorer, returning the detected path or the fallback
    pub fn into_record_path(self) -> Option<Vec<String>> {
        match self.detected {
            Some(candidate) => Some(candidate.path),
            None => self.first_top_level.map(|name| vec![name]),
        }
    }
}

impl TreeEvents for RecordElementScorer {
    fn enter_group(&mut self, local_name: &str) {
        let depth = self.stack.len();
        let Some(parent) = self.stack.last_mut() else {
            return;
        };
        parent.count_child(local_name);

        let mut path = parent.path.clone();
        path.push(local_name.to_string());
        if depth == 1 && self.first_top_level.is_none() {
            self.first_top_level = Some(local_name.to_string());
        }

        self.stack.push(Frame {
            path,
            ..Frame::default()
        });
    }

    fn leaf(&mut self, _local_name: Option<&str>, _value: Leaf<'_>) {}

    fn exit_group(&mut self) {
        // Never pop the document frame
        if self.stack.len() <= 1 {
            return;
        }
        let Some(frame) = self.stack.pop() else {
            return;
        };
        let proposal = frame.resolve();

        if self.stack.len() == 1 {
            // A top-level element finished: the first proposal wins
            if self.detected.is_none() {
                self.detected = proposal;
            }
        } else if let (Some(candidate), Some(parent)) = (proposal, self.stack.last_mut()) {
            parent.descendants.push(candidate);
        }
    }

    fn is_done(&self) -> bool {
        self.detected.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(path: &[&str], count: usize) -> RecordElementCandidate {
        RecordElementCandidate {
            path: path.iter().map(|s| s.to_string()).collect(),
            count,
        }
    }

    /// Drive the scorer with a compact description: `(name, children)`
    fn element(scorer: &mut RecordElementScorer, name: &str, children: &[(&str, usize)]) {
        scorer.enter_group(name);
        for (child, times) in children {
            for _ in 0..*times {
                scorer.enter_group(child);
                scorer.leaf(None, Leaf::Text("x"));
                scorer.exit_group();
            }
        }
        scorer.exit_group();
    }

    #[test]
    fn test_sort_is_stable_descending() {
        let mut list = vec![
            candidate(&["a"], 2),
            candidate(&["b"], 5),
            candidate(&["c"], 2),
            candidate(&["d"], 5),
        ];
        sort_record_element_candidates(&mut list);
        let order: Vec<_> = list.iter().map(|c| c.path[0].as_str()).collect();
        assert_eq!(order, vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn test_dominant_child_detected() {
        let mut scorer = RecordElementScorer::new();
        element(&mut scorer, "library", &[("name", 1), ("book", 12)]);

        assert_eq!(scorer.record_path(), Some(&["library".to_string(), "book".to_string()][..]));
        assert_eq!(scorer.candidate().map(|c| c.count), Some(12));
    }

    #[test]
    fn test_equal_counts_prefer_first_seen_child() {
        let mut scorer = RecordElementScorer::new();
        // 12 / 2 competitors > 5; "zeta" was seen before "alpha"
        element(&mut scorer, "root", &[("zeta", 12), ("alpha", 12)]);
        assert_eq!(
            scorer.candidate().map(|c| c.path.clone()),
            Some(vec!["root".to_string(), "zeta".to_string()])
        );
    }

    #[test]
    fn test_too_few_repetitions() {
        let mut scorer = RecordElementScorer::new();
        // 5 / 1 is not > 5
        element(&mut scorer, "root", &[("row", 5)]);

        assert!(scorer.record_path().is_none());
        assert_eq!(scorer.into_record_path(), Some(vec!["root".to_string()]));
    }

    #[test]
    fn test_non_dominant_immediate_gets_second_chance() {
        let mut scorer = RecordElementScorer::new();
        // 11 / 2 competitors is not > 5, but ranked again on its own
        // among descendants it wins (11 / 1)
        element(&mut scorer, "root", &[("a", 11), ("b", 3)]);
        assert_eq!(
            scorer.candidate().map(|c| c.path.clone()),
            Some(vec!["root".to_string(), "a".to_string()])
        );
    }

    #[test]
    fn test_competing_descendants_dilute() {
        let mut scorer = RecordElementScorer::new();
        scorer.enter_group("root");
        scorer.enter_group("x");
        scorer.exit_group();
        scorer.enter_group("x");
        scorer.exit_group();
        // s proposes [root, s, row] with 8 but is a descendant of root
        element(&mut scorer, "s", &[("row", 8)]);
        scorer.exit_group();

        // root ranks [root, s, row] (8) against [root, x] (2): 8 / 2 = 4
        assert!(scorer.record_path().is_none());
    }

    #[test]
    fn test_too_many_child_names() {
        let mut scorer = RecordElementScorer::new();
        element(
            &mut scorer,
            "root",
            &[("a", 20), ("b", 1), ("c", 1), ("d", 1), ("e", 1), ("f", 1)],
        );
        assert!(scorer.record_path().is_none());
    }

    #[test]
    fn test_nested_candidate_bubbles_up() {
        let mut scorer = RecordElementScorer::new();
        scorer.enter_group("feed");
        scorer.enter_group("meta");
        scorer.exit_group();
        // channel holds 7 items; item/tag repeats weakly
        scorer.enter_group("channel");
        for _ in 0..7 {
            scorer.enter_group("item");
            scorer.enter_group("tag");
            scorer.exit_group();
            scorer.exit_group();
        }
        scorer.exit_group();
        scorer.exit_group();

        // channel proposes [feed, channel, item] (7 / 1 > 5) directly
        assert_eq!(
            scorer.record_path(),
            Some(
                &[
                    "feed".to_string(),
                    "channel".to_string(),
                    "item".to_string()
                ][..]
            )
        );
    }

    #[test]
    fn test_no_dominant_candidate_anywhere() {
        let mut scorer = RecordElementScorer::new();
        scorer.enter_group("root");
        // each section's row candidate (4) is not dominant, so sections
        // propose nothing
        for _ in 0..2 {
            element(&mut scorer, "section", &[("row", 4)]);
        }
        scorer.exit_group();

        // root's own candidate [root, section] (2) does not dominate either
        assert!(scorer.record_path().is_none());
        assert_eq!(scorer.into_record_path(), Some(vec!["root".to_string()]));
    }

    #[test]
    fn test_empty_document() {
        let scorer = RecordElementScorer::new();
        assert!(scorer.record_path().is_none());
        assert_eq!(scorer.into_record_path(), None);
    }

    #[test]
    fn test_stops_after_detection() {
        let mut scorer = RecordElementScorer::new();
        assert!(!scorer.is_done());
        element(&mut scorer, "root", &[("r", 6)]);
        assert!(scorer.is_done());

        // A later top-level element cannot override the first detection
        element(&mut scorer, "other", &[("z", 50)]);
        assert_eq!(scorer.candidate().map(|c| c.count), Some(6));
    }
}
