use std::collections::BTreeSet;
use std::fmt::Debug;

use log::{debug, info};

use crate::choice::Choice;
use crate::config::*;
use crate::fptp::{interpret_tally, leader_of, tally_votes, trailer_of};
use crate::method::{CountMethod, Outcome};
use crate::tally::Tally;

type RoundId = usize;

// What to do with the ballots after a round.
#[derive(Eq, PartialEq, Debug, Clone)]
enum Step {
    /// This round is final.
    Decided,
    /// Remove this choice from every ballot.
    Eliminate(Choice),
    /// Keep only these choices on every ballot.
    KeepOnly(Vec<Choice>),
    /// Leave the ballots alone, the next round looks deeper into them.
    Widen,
}

/// Runs rounds until one of them is decided.
///
/// The ballots of the current round and the records of the previous rounds are
/// carried in this loop. The callback computes the record of a round and what
/// happens next.
fn run_rounds<R: Debug>(
    responses: &[Vec<Choice>],
    mut one_round: impl FnMut(RoundId, &[Vec<Choice>]) -> (R, Step),
) -> Vec<R> {
    let mut ballots: Vec<Vec<Choice>> = responses.to_vec();
    let mut residue: Vec<R> = Vec::new();
    loop {
        let round_id = residue.len() + 1;
        let (record, step) = one_round(round_id, &ballots);
        info!("Round {}: {:?}", round_id, record);
        residue.push(record);
        match step {
            Step::Decided => {
                info!("Round {}: final", round_id);
                return residue;
            }
            Step::Eliminate(loser) => {
                info!("Round {}: eliminating {}", round_id, loser);
                for b in ballots.iter_mut() {
                    b.retain(|c| *c != loser);
                }
            }
            Step::KeepOnly(keep) => {
                info!("Round {}: keeping only {:?}", round_id, keep);
                for b in ballots.iter_mut() {
                    b.retain(|c| keep.contains(c));
                }
            }
            Step::Widen => {}
        }
    }
}

/// The choices still present on at least one ballot.
fn continuing(ballots: &[Vec<Choice>]) -> BTreeSet<Choice> {
    ballots.iter().flatten().cloned().collect()
}

/// Tallies the first remaining choice of every ballot that is not exhausted.
/// Continuing choices without any first choice vote are listed with zero.
fn first_choices(ballots: &[Vec<Choice>]) -> Tally<u64> {
    let cont = continuing(ballots);
    tally_votes(
        ballots.iter().filter(|b| !b.is_empty()).map(|b| &b[..1]),
        cont.iter(),
    )
}

/// A choice wins a round when it has more than half of the ballots that are
/// not exhausted.
fn has_majority(tally: &Tally<u64>) -> bool {
    let half = tally.ballots() / 2;
    match tally.leader() {
        Some((_, votes)) => *votes > half,
        None => false,
    }
}

pub(crate) fn eliminated_between<S: Ord + Clone>(before: &Tally<S>, after: &Tally<S>) -> Vec<Choice> {
    before
        .choices()
        .filter(|c| after.get(c).is_none())
        .cloned()
        .collect()
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
enum Policy {
    InstantRunoff,
    Contingent,
    Bucklin,
}

/// The counting methods that run in rounds over ranked ballots, where each
/// round is a first past the post count.
///
/// A ballot is exhausted once none of its choices are still in the running.
/// Exhausted ballots do not count towards the majority.
///
/// - instant runoff: the choice with the fewest first choices is eliminated
///   after each round.
/// - contingent vote: if the first round is not decided, every choice but the
///   two leaders is eliminated at once. There are never more than two rounds.
/// - Bucklin: nothing is eliminated. Round N counts the top N preferences of
///   every ballot, until a choice is listed by more than half of the ballots or
///   the longest ballot has been fully counted.
///
/// The results are the tally of the final round, the residue the tallies of all
/// the rounds. The last entry of the residue is the result.
#[derive(Debug)]
pub struct MultiRoundExhaustible {
    policy: Policy,
    outcome: Outcome<Tally<u64>, Vec<Tally<u64>>>,
}

impl MultiRoundExhaustible {
    pub fn instant_runoff() -> MultiRoundExhaustible {
        MultiRoundExhaustible::with_policy(Policy::InstantRunoff)
    }

    pub fn contingent() -> MultiRoundExhaustible {
        MultiRoundExhaustible::with_policy(Policy::Contingent)
    }

    pub fn bucklin() -> MultiRoundExhaustible {
        MultiRoundExhaustible::with_policy(Policy::Bucklin)
    }

    fn with_policy(policy: Policy) -> MultiRoundExhaustible {
        MultiRoundExhaustible {
            policy,
            outcome: Outcome::default(),
        }
    }

    fn run(&self, responses: &[Vec<Choice>]) -> Vec<Tally<u64>> {
        match self.policy {
            Policy::InstantRunoff => run_rounds(responses, |_, ballots| {
                let tally = first_choices(ballots);
                let step = match tally.trailer() {
                    Some((loser, _)) if !has_majority(&tally) => Step::Eliminate(loser.clone()),
                    _ => Step::Decided,
                };
                (tally, step)
            }),
            Policy::Contingent => run_rounds(responses, |round_id, ballots| {
                let tally = first_choices(ballots);
                let step = if round_id == 1 && !has_majority(&tally) && tally.len() > 2 {
                    Step::KeepOnly(tally.top(2))
                } else {
                    Step::Decided
                };
                (tally, step)
            }),
            Policy::Bucklin => {
                let depth = responses.iter().map(|b| b.len()).max().unwrap_or(0).max(1);
                run_rounds(responses, |round_id, ballots| {
                    let cont = continuing(ballots);
                    let tally = tally_votes(
                        ballots
                            .iter()
                            .filter(|b| !b.is_empty())
                            .map(|b| &b[..round_id.min(b.len())]),
                        cont.iter(),
                    );
                    let step = if has_majority(&tally) || round_id >= depth {
                        Step::Decided
                    } else {
                        Step::Widen
                    };
                    (tally, step)
                })
            }
        }
    }
}

impl CountMethod for MultiRoundExhaustible {
    type Results = Tally<u64>;
    type Residue = Vec<Tally<u64>>;

    fn count(&mut self, responses: &[Vec<Choice>]) -> Result<(), CountError> {
        self.outcome.ensure_fresh()?;
        info!(
            "{:?}: counting {} responses",
            self.policy,
            responses.len()
        );
        let residue = self.run(responses);
        debug!("{:?}: {} rounds", self.policy, residue.len());
        // The loop always runs at least one round.
        let results = residue.last().cloned().unwrap_or_else(|| first_choices(&[]));
        self.outcome.set(results, residue);
        Ok(())
    }

    fn results(&self) -> Result<&Tally<u64>, CountError> {
        self.outcome.results()
    }

    fn residue(&self) -> Result<&Vec<Tally<u64>>, CountError> {
        self.outcome.residue()
    }

    fn leader(&self) -> Result<Choice, CountError> {
        leader_of(self.outcome.results()?)
    }

    fn trailer(&self) -> Result<Choice, CountError> {
        trailer_of(self.outcome.results()?)
    }

    fn interpret_result(&self) -> Result<String, CountError> {
        Ok(format!(
            "Final round:\n{}",
            interpret_tally(self.outcome.results()?)
        ))
    }

    fn interpret_residue(&self) -> Result<String, CountError> {
        let residue = self.outcome.residue()?;
        let mut interpretation = String::new();
        for (idx, round) in residue.iter().enumerate() {
            interpretation.push_str(&format!("Round {}:\n", idx + 1));
            interpretation.push_str(&interpret_tally(round));
            if let Some(next) = residue.get(idx + 1) {
                for c in eliminated_between(round, next) {
                    interpretation.push_str(&format!("{} eliminated\n", c));
                }
            }
        }
        Ok(interpretation)
    }

    fn is_ready(&self) -> Result<(), CountError> {
        self.outcome.ready()
    }
}

/// One round of Coombs' method: the first choices and the last choices.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CoombsRound {
    pub first: Tally<u64>,
    pub last: Tally<u64>,
}

/// Like instant runoff, except that the choice with the most last-place votes
/// is eliminated after each round. The winner is still decided by a majority of
/// first choices.
///
/// The results are the final round, the residue all the rounds.
#[derive(Debug, Default)]
pub struct CoombsMethod {
    outcome: Outcome<CoombsRound, Vec<CoombsRound>>,
}

impl CoombsMethod {
    pub fn new() -> CoombsMethod {
        CoombsMethod::default()
    }
}

/// The last remaining choice of every ballot, counted by reversing the ballots.
fn last_choices(ballots: &[Vec<Choice>]) -> Tally<u64> {
    let reversed: Vec<Vec<Choice>> = ballots
        .iter()
        .map(|b| b.iter().rev().cloned().collect())
        .collect();
    first_choices(&reversed)
}

fn interpret_coombs(round: &CoombsRound) -> String {
    format!(
        "Leaders:\n{}Trailers:\n{}",
        interpret_tally(&round.first),
        interpret_tally(&round.last)
    )
}

impl CountMethod for CoombsMethod {
    type Results = CoombsRound;
    type Residue = Vec<CoombsRound>;

    fn count(&mut self, responses: &[Vec<Choice>]) -> Result<(), CountError> {
        self.outcome.ensure_fresh()?;
        info!("Coombs: counting {} responses", responses.len());
        let residue = run_rounds(responses, |_, ballots| {
            let first = first_choices(ballots);
            let last = last_choices(ballots);
            let step = match last.leader() {
                Some((loser, _)) if !has_majority(&first) => Step::Eliminate(loser.clone()),
                _ => Step::Decided,
            };
            (CoombsRound { first, last }, step)
        });
        let results = match residue.last() {
            Some(r) => r.clone(),
            None => CoombsRound {
                first: first_choices(&[]),
                last: first_choices(&[]),
            },
        };
        self.outcome.set(results, residue);
        Ok(())
    }

    fn results(&self) -> Result<&CoombsRound, CountError> {
        self.outcome.results()
    }

    fn residue(&self) -> Result<&Vec<CoombsRound>, CountError> {
        self.outcome.residue()
    }

    fn leader(&self) -> Result<Choice, CountError> {
        leader_of(&self.outcome.results()?.first)
    }

    /// The choice with the most last-place votes.
    fn trailer(&self) -> Result<Choice, CountError> {
        leader_of(&self.outcome.results()?.last)
    }

    fn interpret_result(&self) -> Result<String, CountError> {
        Ok(format!(
            "Final round:\n{}",
            interpret_coombs(self.outcome.results()?)
        ))
    }

    fn interpret_residue(&self) -> Result<String, CountError> {
        let residue = self.outcome.residue()?;
        let mut interpretation = String::new();
        for (idx, round) in residue.iter().enumerate() {
            interpretation.push_str(&format!("Round {}:\n", idx + 1));
            interpretation.push_str(&interpret_coombs(round));
            if let Some(next) = residue.get(idx + 1) {
                for c in eliminated_between(&round.first, &next.first) {
                    interpretation.push_str(&format!("{} eliminated\n", c));
                }
            }
        }
        Ok(interpretation)
    }

    fn is_ready(&self) -> Result<(), CountError> {
        self.outcome.ready()
    }
}
