//! Record Selector
//!
//! Follows the record path through the event stream and forwards the events
//! inside each record element to the projector. Everything outside a record
//! is dropped.

use crate::tree::{Leaf, TreeEvents};

use super::projector::Projector;

pub struct RecordSelector<'a> {
    projector: &'a mut Projector,
    path: &'a [String],
    /// Records this selector may still start
    remaining: Option<usize>,
    /// Number of open elements
    depth: usize,
    /// Leading path segments matched by the open elements
    matched: usize,
    /// Depth of the open record element
    record_depth: Option<usize>,
    started: usize,
}

impl<'a> RecordSelector<'a> {
    pub fn new(projector: &'a mut Projector, path: &'a [String], remaining: Option<usize>) -> Self {
        RecordSelector {
            projector,
            path,
            remaining,
            depth: 0,
            matched: 0,
            record_depth: None,
            started: 0,
        }
    }

    /// Records started so far
    pub fn started(&self) -> usize {
        self.started
    }

    pub fn limit_reached(&self) -> bool {
        self.remaining.is_some_and(|remaining| self.started >= remaining)
    }

    /// Whether an element or field at the current depth continues the match
    fn matches_next(&self, name: &str) -> bool {
        self.matched == self.depth && self.path.get(self.depth).is_some_and(|segment| segment == name)
    }
}

impl TreeEvents for RecordSelector<'_> {
    fn enter_group(&mut self, local_name: &str) {
        if self.record_depth.is_some() {
            self.depth += 1;
            self.projector.enter_group(local_name);
            return;
        }

        let is_match = self.matches_next(local_name);
        self.depth += 1;
        if !is_match {
            return;
        }
        self.matched += 1;

        if self.matched == self.path.len() && !self.limit_reached() {
            self.projector.begin_record();
            self.started += 1;
            self.record_depth = Some(self.depth);
            self.projector.enter_group(local_name);
        }
    }

    fn leaf(&mut self, local_name: Option<&str>, value: Leaf<'_>) {
        if self.record_depth.is_some() {
            self.projector.leaf(local_name, value);
            return;
        }

        // A scalar field named by the last segment is a record of its own
        let Some(name) = local_name else {
            return;
        };
        if self.depth + 1 == self.path.len() && self.matches_next(name) && !self.limit_reached() {
            self.projector.begin_record();
            self.started += 1;
            self.projector.leaf(Some(name), value);
            self.projector.end_record();
        }
    }

    fn exit_group(&mut self) {
        if let Some(record_depth) = self.record_depth {
            self.projector.exit_group();
            if self.depth == record_depth {
                self.projector.end_record();
                self.record_depth = None;
            }
        }
        self.depth = self.depth.saturating_sub(1);
        self.matched = self.matched.min(self.depth);
    }

    fn is_done(&self) -> bool {
        self.record_depth.is_none() && self.limit_reached()
    }
}
