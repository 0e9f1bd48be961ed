use std::collections::{BTreeMap, BTreeSet};

use log::{debug, info, warn};
use snafu::ResultExt;

use crate::choice::Choice;
use crate::config::*;
use crate::fptp::trailer_of;
use crate::method::{CountMethod, Outcome};
use crate::redist::Redistributor;
use crate::tally::{Tally, TallyBuilder};

/// The Droop quota: the smallest number of votes that no more than `seats`
/// choices can reach at the same time. With one seat, this is a majority.
pub fn droop_quota(valid_ballots: u64, seats: u32) -> u64 {
    valid_ballots / (seats as u64 + 1) + 1
}

/// What happened at the end of a round.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum StvAction {
    /// The choice reached the quota. Its surplus was transferred.
    Elected(Choice),
    /// No choice reached the quota: the trailer was removed and its ballots
    /// transferred.
    Eliminated(Choice),
    /// No more continuing choices than open seats: all of them are elected.
    ElectedRemaining(Vec<Choice>),
}

/// The audit record of one round.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct StvRound {
    /// The size of the pile of every continuing choice, at the start of the round.
    pub piles: Tally<u64>,
    pub action: StvAction,
    /// The number of ballots moved to another pile during this round.
    pub transferred: u64,
    /// The number of exhausted ballots so far.
    pub exhausted: u64,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct StvResults {
    pub quota: u64,
    /// In order of election.
    pub elected: Vec<Choice>,
    /// The piles of the last round.
    pub piles: Tally<u64>,
}

/// Single transferable vote, for a number of seats, transferring whole ballots.
///
/// Every ballot sits on the pile of its first continuing choice. At each round:
/// - if there are no more continuing choices than open seats, they are all
///   elected;
/// - if the leader has reached the quota, it is elected and the ballots over
///   the quota are moved to their next continuing choice;
/// - otherwise the trailer is eliminated and its whole pile is moved.
///
/// Ballots leave a pile in the order given by the configured redistributor.
/// When a surplus is transferred, ballots without a next continuing choice stay
/// on the pile of the elected choice.
#[derive(Debug)]
pub struct SingleTransferableVote {
    seats: u32,
    redistributor: RedistributorKind,
    outcome: Outcome<StvResults, Vec<StvRound>>,
}

impl SingleTransferableVote {
    pub fn new(
        seats: u32,
        redistributor: RedistributorKind,
    ) -> Result<SingleTransferableVote, ConfigurationError> {
        snafu::ensure!(
            seats >= 1,
            InvalidParameterSnafu {
                message: "a transferable vote needs at least one seat"
            }
        );
        redistributor.validate()?;
        Ok(SingleTransferableVote {
            seats,
            redistributor,
            outcome: Outcome::default(),
        })
    }

    pub fn seats(&self) -> u32 {
        self.seats
    }
}

// The ballots during the count.
struct Piles {
    continuing: BTreeSet<Choice>,
    piles: BTreeMap<Choice, Vec<Vec<Choice>>>,
    exhausted: u64,
}

impl Piles {
    fn new(responses: &[Vec<Choice>]) -> Piles {
        let continuing: BTreeSet<Choice> = responses.iter().flatten().cloned().collect();
        let mut piles: BTreeMap<Choice, Vec<Vec<Choice>>> = BTreeMap::new();
        let mut exhausted = 0;
        for ballot in responses.iter() {
            match ballot.first() {
                Some(c) => piles.entry(c.clone()).or_default().push(ballot.clone()),
                None => exhausted += 1,
            }
        }
        Piles {
            continuing,
            piles,
            exhausted,
        }
    }

    /// The pile sizes of the continuing choices.
    fn tally(&self) -> Tally<u64> {
        let mut tb: TallyBuilder<u64> = TallyBuilder::new();
        for c in self.continuing.iter() {
            tb.seed(c);
            if let Some(pile) = self.piles.get(c) {
                tb.add(c, pile.len() as u64);
                for _ in pile.iter() {
                    tb.ballot_done();
                }
            }
        }
        tb.build()
    }

    fn next_preference(&self, ballot: &[Choice]) -> Option<Choice> {
        ballot.iter().find(|c| self.continuing.contains(*c)).cloned()
    }

    /// Removes the choice from the running and takes its pile.
    fn withdraw(&mut self, choice: &Choice) -> Vec<Vec<Choice>> {
        self.continuing.remove(choice);
        self.piles.remove(choice).unwrap_or_default()
    }

    /// Moves at most `limit` ballots to their next continuing choice, in the
    /// order of the redistributor. Returns the ballots that did not move and
    /// the number of ballots moved.
    fn transfer(
        &mut self,
        order: Redistributor<Vec<Choice>>,
        limit: usize,
    ) -> (Vec<Vec<Choice>>, u64) {
        let mut kept = Vec::new();
        let mut moved = 0;
        for ballot in order {
            if moved >= limit {
                kept.push(ballot);
                continue;
            }
            match self.next_preference(&ballot) {
                Some(next) => {
                    debug!("transfer {:?} to {}", ballot, next);
                    self.piles.entry(next).or_default().push(ballot);
                    moved += 1;
                }
                None => kept.push(ballot),
            }
        }
        (kept, moved as u64)
    }
}

impl SingleTransferableVote {
    fn run(
        &self,
        responses: &[Vec<Choice>],
    ) -> Result<(StvResults, Vec<StvRound>), CountError> {
        let quota = droop_quota(responses.len() as u64, self.seats);
        info!(
            "STV: {} seats, {} ballots, quota {}",
            self.seats,
            responses.len(),
            quota
        );
        let mut piles = Piles::new(responses);
        let mut elected: Vec<Choice> = Vec::new();
        let mut residue: Vec<StvRound> = Vec::new();
        let mut last = piles.tally();
        while elected.len() < self.seats as usize && !piles.continuing.is_empty() {
            let tally = piles.tally();
            let open = self.seats as usize - elected.len();
            let round_id = residue.len() + 1;
            info!("STV round {}: {:?}", round_id, tally);

            if piles.continuing.len() <= open {
                let rest: Vec<Choice> = tally.ranked().into_iter().map(|(c, _)| c.clone()).collect();
                info!("STV round {}: electing all of {:?}", round_id, rest);
                elected.extend(rest.iter().cloned());
                piles.continuing.clear();
                residue.push(StvRound {
                    piles: tally.clone(),
                    action: StvAction::ElectedRemaining(rest),
                    transferred: 0,
                    exhausted: piles.exhausted,
                });
                last = tally;
                break;
            }

            let (leader, votes) = match tally.leader() {
                Some((c, v)) => (c.clone(), *v),
                None => break,
            };
            let (action, transferred) = if votes >= quota {
                info!("STV round {}: {} elected with {} votes", round_id, leader, votes);
                let pile = piles.withdraw(&leader);
                let surplus = (votes - quota) as usize;
                elected.push(leader.clone());
                // Nothing to move: the pile stays whole and is never ordered.
                let (kept, moved) = if surplus == 0 || elected.len() == self.seats as usize {
                    debug!("STV round {}: no surplus to transfer", round_id);
                    (pile, 0)
                } else {
                    let order = Redistributor::new(self.redistributor, pile)
                        .context(RedistributionSnafu)?;
                    let (kept, moved) = piles.transfer(order, surplus);
                    if (moved as usize) < surplus {
                        debug!(
                            "STV round {}: only {} of {} surplus ballots transferable",
                            round_id, moved, surplus
                        );
                    }
                    (kept, moved)
                };
                piles.piles.insert(leader.clone(), kept);
                (StvAction::Elected(leader), moved)
            } else {
                let loser = trailer_of(&tally)?;
                info!("STV round {}: {} eliminated", round_id, loser);
                let pile = piles.withdraw(&loser);
                let (kept, moved) = if pile.is_empty() {
                    (pile, 0)
                } else {
                    let order = Redistributor::new(self.redistributor, pile)
                        .context(RedistributionSnafu)?;
                    piles.transfer(order, usize::MAX)
                };
                piles.exhausted += kept.len() as u64;
                (StvAction::Eliminated(loser), moved)
            };
            residue.push(StvRound {
                piles: tally.clone(),
                action,
                transferred,
                exhausted: piles.exhausted,
            });
            last = tally;
        }
        if elected.len() < self.seats as usize {
            warn!(
                "STV: only {} choices for {} seats",
                elected.len(),
                self.seats
            );
        }
        Ok((
            StvResults {
                quota,
                elected,
                piles: last,
            },
            residue,
        ))
    }
}

impl CountMethod for SingleTransferableVote {
    type Results = StvResults;
    type Residue = Vec<StvRound>;

    fn count(&mut self, responses: &[Vec<Choice>]) -> Result<(), CountError> {
        self.outcome.ensure_fresh()?;
        let (results, residue) = self.run(responses)?;
        self.outcome.set(results, residue);
        Ok(())
    }

    fn results(&self) -> Result<&StvResults, CountError> {
        self.outcome.results()
    }

    fn residue(&self) -> Result<&Vec<StvRound>, CountError> {
        self.outcome.residue()
    }

    /// The first choice elected.
    fn leader(&self) -> Result<Choice, CountError> {
        self.outcome
            .results()?
            .elected
            .first()
            .cloned()
            .ok_or(CountError::EmptyTally {})
    }

    /// The trailer of the last round.
    fn trailer(&self) -> Result<Choice, CountError> {
        trailer_of(&self.outcome.results()?.piles)
    }

    fn interpret_result(&self) -> Result<String, CountError> {
        let results = self.outcome.results()?;
        let mut interpretation = format!("Quota: {} votes\n", results.quota);
        for (idx, c) in results.elected.iter().enumerate() {
            interpretation.push_str(&format!("Seat {}: {}\n", idx + 1, c));
        }
        Ok(interpretation)
    }

    fn interpret_residue(&self) -> Result<String, CountError> {
        let mut interpretation = String::new();
        for (idx, round) in self.outcome.residue()?.iter().enumerate() {
            interpretation.push_str(&format!("Round {}:\n", idx + 1));
            for (c, n) in round.piles.iter() {
                interpretation.push_str(&format!("{} has {} votes\n", c, n));
            }
            let what = match &round.action {
                StvAction::Elected(c) => format!("{} elected", c),
                StvAction::Eliminated(c) => format!("{} eliminated", c),
                StvAction::ElectedRemaining(cs) => {
                    let names: Vec<String> = cs.iter().map(|c| c.to_string()).collect();
                    format!("{} elected", names.join(", "))
                }
            };
            interpretation.push_str(&format!(
                "{}, {} ballots transferred, {} exhausted\n",
                what, round.transferred, round.exhausted
            ));
        }
        Ok(interpretation)
    }

    fn is_ready(&self) -> Result<(), CountError> {
        self.outcome.ready()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::choice::ChoiceRegistry;
    use crate::testdata::*;

    #[test]
    fn quota() {
        assert_eq!(droop_quota(100, 1), 51);
        assert_eq!(droop_quota(101, 1), 51);
        assert_eq!(droop_quota(20, 3), 6);
        assert_eq!(droop_quota(0, 2), 1);
    }

    #[test]
    fn bad_configuration() {
        assert!(matches!(
            SingleTransferableVote::new(0, RedistributorKind::Identity),
            Err(ConfigurationError::InvalidParameter { .. })
        ));
        assert!(matches!(
            SingleTransferableVote::new(2, RedistributorKind::Meek),
            Err(ConfigurationError::Unsupported { .. })
        ));
        assert!(matches!(
            SingleTransferableVote::new(2, RedistributorKind::NthSubset(1)),
            Err(ConfigurationError::TrivialSubset { n: 1 })
        ));
    }

    #[test]
    fn food_election() {
        let food = Food::new();
        let mut cm = SingleTransferableVote::new(3, RedistributorKind::Identity).unwrap();
        cm.count(&food.stv_20()).unwrap();
        let res = cm.results().unwrap();
        assert_eq!(res.quota, 6);
        assert_eq!(
            res.elected,
            vec![
                food.chocolate.clone(),
                food.strawberries.clone(),
                food.oranges.clone()
            ]
        );
        let residue = cm.residue().unwrap();
        assert_eq!(residue[0].piles.get(&food.chocolate), Some(&12));
        assert_eq!(residue[0].action, StvAction::Elected(food.chocolate.clone()));
        assert_eq!(residue[0].transferred, 6);
        assert_eq!(residue[1].piles.get(&food.strawberries), Some(&7));
        assert_eq!(residue[1].piles.get(&food.chocolate), None);
        assert_eq!(residue[1].transferred, 0);
        assert_eq!(residue[2].action, StvAction::Eliminated(food.bonbons.clone()));
        assert_eq!(residue[3].action, StvAction::Eliminated(food.hamburgers.clone()));
        assert_eq!(residue[3].exhausted, 1);
        assert_eq!(residue[4].action, StvAction::Eliminated(food.pears.clone()));
        assert_eq!(residue[4].transferred, 2);
        assert_eq!(
            residue[5].action,
            StvAction::ElectedRemaining(vec![food.oranges.clone()])
        );
        assert_eq!(residue[5].piles.get(&food.oranges), Some(&6));
        assert_eq!(cm.leader().unwrap(), food.chocolate);
        let text = cm.interpret_result().unwrap();
        assert_eq!(
            text,
            "Quota: 6 votes\nSeat 1: Chocolate\nSeat 2: Strawberries\nSeat 3: Oranges\n"
        );
        assert!(cm
            .interpret_residue()
            .unwrap()
            .contains("Chocolate elected, 6 ballots transferred, 0 exhausted\n"));
    }

    #[test]
    fn transfer_order_matters() {
        let food = Food::new();
        let mut cm = SingleTransferableVote::new(3, RedistributorKind::Cincinnati).unwrap();
        cm.count(&food.stv_20()).unwrap();
        let residue = cm.residue().unwrap();
        // Every 11th of the 12 chocolate ballots: the bonbon ballots come first.
        assert_eq!(residue[1].piles.get(&food.strawberries), Some(&4));
        assert_eq!(residue[1].piles.get(&food.bonbons), Some(&3));
        assert_eq!(
            cm.results().unwrap().elected,
            vec![
                food.chocolate.clone(),
                food.oranges.clone(),
                food.strawberries.clone()
            ]
        );
        assert_eq!(residue.last().map(|r| r.exhausted), Some(4));
    }

    #[test]
    fn redistribution_fails_at_count_time() {
        let food = Food::new();
        // The chocolate pile has 12 ballots, not relatively prime with 3.
        let mut cm = SingleTransferableVote::new(3, RedistributorKind::NthSubset(3)).unwrap();
        assert_eq!(
            cm.count(&food.stv_20()),
            Err(CountError::Redistribution {
                source: ConfigurationError::NotCoprime { n: 3, len: 12 }
            })
        );
        assert_eq!(cm.is_ready(), Err(CountError::IncompleteCount {}));
    }

    #[test]
    fn exact_quota_needs_no_redistribution() {
        let mut reg = ChoiceRegistry::new();
        let a = reg.create("A");
        let b = reg.create("B");
        let ballots = vec![vec![a.clone()], vec![a.clone()], vec![a.clone()], vec![b]];
        // A has exactly the quota: its pile of 3 is never split in thirds.
        let mut cm = SingleTransferableVote::new(1, RedistributorKind::NthSubset(3)).unwrap();
        cm.count(&ballots).unwrap();
        assert_eq!(cm.results().unwrap().quota, 3);
        assert_eq!(cm.leader().unwrap(), a);
        assert_eq!(cm.residue().unwrap()[0].transferred, 0);
    }

    #[test]
    fn last_seat_keeps_its_surplus() {
        let mut reg = ChoiceRegistry::new();
        let a = reg.create("A");
        let b = reg.create("B");
        let mut ballots = vec![vec![a.clone(), b.clone()]; 4];
        ballots.push(vec![b.clone()]);
        // Quota 3, A has 4: one surplus ballot, but the only seat is filled.
        let mut cm = SingleTransferableVote::new(1, RedistributorKind::NthSubset(2)).unwrap();
        cm.count(&ballots).unwrap();
        let residue = cm.residue().unwrap();
        assert_eq!(residue.len(), 1);
        assert_eq!(residue[0].action, StvAction::Elected(a.clone()));
        assert_eq!(residue[0].transferred, 0);
        assert_eq!(cm.results().unwrap().elected, vec![a]);
    }

    #[test]
    fn single_seat_is_instant_runoff() {
        let tn = Tennessee::new();
        let mut cm = SingleTransferableVote::new(1, RedistributorKind::Identity).unwrap();
        cm.count(&tn.irv_100()).unwrap();
        let res = cm.results().unwrap();
        assert_eq!(res.quota, 51);
        assert_eq!(res.elected, vec![tn.knoxville.clone()]);
        assert_eq!(res.piles.get(&tn.knoxville), Some(&58));
        assert_eq!(cm.residue().unwrap().len(), 3);
    }

    #[test]
    fn random_order_still_elects() {
        let food = Food::new();
        let mut cm = SingleTransferableVote::new(3, RedistributorKind::HareRandom).unwrap();
        cm.count(&food.stv_20()).unwrap();
        let res = cm.results().unwrap();
        assert_eq!(res.elected.len(), 3);
        assert_eq!(res.elected[0], food.chocolate);
    }

    #[test]
    fn no_ballots() {
        let mut cm = SingleTransferableVote::new(2, RedistributorKind::Identity).unwrap();
        cm.count(&[]).unwrap();
        assert!(cm.results().unwrap().elected.is_empty());
        assert!(cm.residue().unwrap().is_empty());
        assert_eq!(cm.leader(), Err(CountError::EmptyTally {}));
    }
}
