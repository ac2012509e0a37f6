//! Vote records (§4.7).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ids::{AgentId, VoteId};

/// How a vote's winning option is decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoteKind {
    /// Most votes wins, ties broken by option declaration order.
    SimpleMajority,
    /// Winning option needs at least two-thirds of cast ballots.
    Supermajority,
    /// Every ballot must agree on the same option.
    Unanimous,
    /// Ballots carry a weight; highest total weight wins.
    Weighted,
}

/// Whether a vote is still accepting ballots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteStatus {
    Open,
    Finalized,
}

/// One ballot cast by an agent. Casting again before finalization replaces
/// the agent's prior ballot.
#[derive(Debug, Clone, Copy)]
pub struct Ballot {
    pub option: usize,
    pub weight: f64,
}

/// A vote in progress (or finalized).
#[derive(Debug, Clone)]
pub struct Vote {
    pub id: VoteId,
    pub question: String,
    pub kind: VoteKind,
    pub options: Vec<String>,
    pub ballots: HashMap<AgentId, Ballot>,
    pub status: VoteStatus,
    pub winner: Option<usize>,
    /// Optional epoch-millisecond deadline, `None` meaning no deadline.
    /// Informational only — this manager never auto-finalizes on expiry.
    pub deadline_ms: Option<i64>,
}

impl Vote {
    pub fn new(
        id: VoteId,
        question: impl Into<String>,
        kind: VoteKind,
        options: Vec<String>,
        deadline_ms: Option<i64>,
    ) -> Self {
        Self {
            id,
            question: question.into(),
            kind,
            options,
            ballots: HashMap::new(),
            status: VoteStatus::Open,
            winner: None,
            deadline_ms,
        }
    }

    /// Tally per option index, in declaration order.
    pub(super) fn counts(&self) -> Vec<usize> {
        let mut counts = vec![0usize; self.options.len()];
        for ballot in self.ballots.values() {
            if let Some(slot) = counts.get_mut(ballot.option) {
                *slot += 1;
            }
        }
        counts
    }

    /// Weight totals per option index, in declaration order.
    pub(super) fn weight_totals(&self) -> Vec<f64> {
        let mut totals = vec![0.0f64; self.options.len()];
        for ballot in self.ballots.values() {
            if let Some(slot) = totals.get_mut(ballot.option) {
                *slot += ballot.weight;
            }
        }
        totals
    }
}

/// Index of the largest value; ties go to the lowest index (option
/// declaration order), giving every vote kind a deterministic tie-break.
pub(super) fn argmax_f64(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, &value) in values.iter().enumerate() {
        if best.map(|(_, best_value)| value > best_value).unwrap_or(true) {
            best = Some((idx, value));
        }
    }
    best.map(|(idx, _)| idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argmax_f64_ties_favor_lowest_index() {
        assert_eq!(argmax_f64(&[1.5, 1.5]), Some(0));
        assert_eq!(argmax_f64(&[0.5, 2.5, 2.5]), Some(1));
    }
}
