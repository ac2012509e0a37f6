//! Consensus voting (§4.7).

mod vote;

pub use vote::{Ballot, Vote, VoteKind, VoteStatus};

// Layer 1: Standard library imports
use std::collections::HashMap;

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use crate::error::RuntimeError;
use crate::ids::{AgentId, VoteId};
use vote::argmax_f64;

/// Tracks every vote in flight.
pub struct ConsensusManager {
    votes: HashMap<VoteId, Vote>,
}

impl ConsensusManager {
    pub fn new() -> Self {
        Self {
            votes: HashMap::new(),
        }
    }

    /// Open a new vote over `options`, in the order given — that order is
    /// also the tie-break order. `deadline_ms` is stored but not enforced;
    /// nothing auto-finalizes a vote past its deadline.
    pub fn create_vote(
        &mut self,
        question: impl Into<String>,
        kind: VoteKind,
        options: Vec<String>,
        deadline_ms: Option<i64>,
    ) -> VoteId {
        let id = VoteId::new();
        self.votes.insert(id, Vote::new(id, question, kind, options, deadline_ms));
        id
    }

    /// Cast (or replace) `voter`'s ballot on an open vote.
    ///
    /// # Errors
    ///
    /// Returns `RuntimeError::NotFound` if the vote doesn't exist, and
    /// `RuntimeError::Policy` if it has already been finalized or
    /// `option` is out of range.
    pub fn cast_vote(
        &mut self,
        vote_id: VoteId,
        voter: AgentId,
        option: usize,
        weight: f64,
    ) -> Result<(), RuntimeError> {
        let vote = self
            .votes
            .get_mut(&vote_id)
            .ok_or_else(|| RuntimeError::vote_not_found(vote_id))?;

        if vote.status == VoteStatus::Finalized {
            return Err(RuntimeError::Policy(format!("vote {vote_id} already finalized")));
        }
        if option >= vote.options.len() {
            return Err(RuntimeError::Input(format!("option {option} out of range")));
        }

        vote.ballots.insert(voter, Ballot { option, weight });
        Ok(())
    }

    /// Finalize a vote, computing (and caching) its winner.
    ///
    /// Idempotent: calling this again after finalization returns the same
    /// cached winner without re-tallying.
    ///
    /// # Errors
    ///
    /// Returns `RuntimeError::NotFound` if the vote doesn't exist.
    pub fn finalize_vote(&mut self, vote_id: VoteId) -> Result<Option<usize>, RuntimeError> {
        let vote = self
            .votes
            .get_mut(&vote_id)
            .ok_or_else(|| RuntimeError::vote_not_found(vote_id))?;

        if vote.status == VoteStatus::Finalized {
            return Ok(vote.winner);
        }

        // §4.7: every kind but WEIGHTED tallies one vote per ballot; WEIGHTED
        // sums each ballot's declared weight. The tie-broken argmax over
        // that tally is always the "winner" — what differs per kind is the
        // share of the total the winner must clear to be declared.
        let totals = if vote.kind == VoteKind::Weighted {
            vote.weight_totals()
        } else {
            vote.counts().into_iter().map(|count| count as f64).collect()
        };
        let winner = argmax_f64(&totals);

        let winner = winner.filter(|&idx| {
            let total: f64 = totals.iter().sum();
            let share = if total > 0.0 { totals[idx] / total } else { 0.0 };
            match vote.kind {
                VoteKind::SimpleMajority => share > 0.5,
                VoteKind::Supermajority => share >= 0.66,
                VoteKind::Unanimous => share >= 1.0,
                VoteKind::Weighted => true,
            }
        });

        vote.status = VoteStatus::Finalized;
        vote.winner = winner;
        Ok(winner)
    }

    pub fn get(&self, vote_id: VoteId) -> Option<&Vote> {
        self.votes.get(&vote_id)
    }

    /// Whether `vote_id` has been finalized. `false` for an unknown id.
    pub fn is_finalized(&self, vote_id: VoteId) -> bool {
        self.votes
            .get(&vote_id)
            .is_some_and(|v| v.status == VoteStatus::Finalized)
    }

    /// Every tracked vote, open or finalized.
    pub fn get_all_votes(&self) -> Vec<&Vote> {
        self.votes.values().collect()
    }

    /// Number of votes still accepting ballots.
    pub fn open_count(&self) -> usize {
        self.votes.values().filter(|v| v.status == VoteStatus::Open).count()
    }
}

impl Default for ConsensusManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> Vec<String> {
        vec!["a".into(), "b".into(), "c".into()]
    }

    #[test]
    fn simple_majority_picks_most_votes() {
        let mut mgr = ConsensusManager::new();
        let id = mgr.create_vote("q", VoteKind::SimpleMajority, options(), None);
        mgr.cast_vote(id, AgentId::new(), 1, 1.0).unwrap();
        mgr.cast_vote(id, AgentId::new(), 1, 1.0).unwrap();
        mgr.cast_vote(id, AgentId::new(), 0, 1.0).unwrap();
        assert_eq!(mgr.finalize_vote(id).unwrap(), Some(1));
    }

    #[test]
    fn simple_majority_with_no_majority_share_is_undecided() {
        // A 1-1 split never clears the required >50% share, even though
        // `argmax` still has to pick one of the tied options internally.
        let mut mgr = ConsensusManager::new();
        let id = mgr.create_vote("q", VoteKind::SimpleMajority, options(), None);
        mgr.cast_vote(id, AgentId::new(), 2, 1.0).unwrap();
        mgr.cast_vote(id, AgentId::new(), 0, 1.0).unwrap();
        assert_eq!(mgr.finalize_vote(id).unwrap(), None);
    }

    #[test]
    fn supermajority_requires_66_percent_share() {
        let mut mgr = ConsensusManager::new();
        let id = mgr.create_vote("q", VoteKind::Supermajority, options(), None);
        mgr.cast_vote(id, AgentId::new(), 0, 1.0).unwrap();
        mgr.cast_vote(id, AgentId::new(), 0, 1.0).unwrap();
        mgr.cast_vote(id, AgentId::new(), 1, 1.0).unwrap();
        mgr.cast_vote(id, AgentId::new(), 1, 1.0).unwrap();
        assert_eq!(mgr.finalize_vote(id).unwrap(), None);

        let id2 = mgr.create_vote("q", VoteKind::Supermajority, options(), None);
        mgr.cast_vote(id2, AgentId::new(), 0, 1.0).unwrap();
        mgr.cast_vote(id2, AgentId::new(), 0, 1.0).unwrap();
        mgr.cast_vote(id2, AgentId::new(), 1, 1.0).unwrap();
        assert_eq!(mgr.finalize_vote(id2).unwrap(), Some(0));
    }

    #[test]
    fn unanimous_requires_full_agreement() {
        let mut mgr = ConsensusManager::new();
        let id = mgr.create_vote("q", VoteKind::Unanimous, options(), None);
        mgr.cast_vote(id, AgentId::new(), 0, 1.0).unwrap();
        mgr.cast_vote(id, AgentId::new(), 1, 1.0).unwrap();
        assert_eq!(mgr.finalize_vote(id).unwrap(), None);

        let id2 = mgr.create_vote("q", VoteKind::Unanimous, options(), None);
        mgr.cast_vote(id2, AgentId::new(), 2, 1.0).unwrap();
        mgr.cast_vote(id2, AgentId::new(), 2, 1.0).unwrap();
        assert_eq!(mgr.finalize_vote(id2).unwrap(), Some(2));
    }

    #[test]
    fn weighted_sums_weight_not_ballot_count() {
        let mut mgr = ConsensusManager::new();
        let id = mgr.create_vote("q", VoteKind::Weighted, options(), None);
        mgr.cast_vote(id, AgentId::new(), 0, 1.0).unwrap();
        mgr.cast_vote(id, AgentId::new(), 0, 1.0).unwrap();
        mgr.cast_vote(id, AgentId::new(), 1, 5.0).unwrap();
        assert_eq!(mgr.finalize_vote(id).unwrap(), Some(1));
    }

    #[test]
    fn finalize_is_idempotent() {
        let mut mgr = ConsensusManager::new();
        let id = mgr.create_vote("q", VoteKind::SimpleMajority, options(), None);
        mgr.cast_vote(id, AgentId::new(), 1, 1.0).unwrap();
        let first = mgr.finalize_vote(id).unwrap();
        mgr.cast_vote(id, AgentId::new(), 0, 1.0).unwrap_err();
        let second = mgr.finalize_vote(id).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn voting_on_unknown_vote_is_not_found() {
        let mut mgr = ConsensusManager::new();
        assert!(mgr.cast_vote(VoteId::new(), AgentId::new(), 0, 1.0).is_err());
    }
}
