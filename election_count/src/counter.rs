use log::info;

use crate::borda::{format_points, Borda, BordaVariant};
use crate::choice::Choice;
use crate::config::*;
use crate::fptp::FirstPastThePost;
use crate::method::CountMethod;
use crate::rounds::{eliminated_between, CoombsMethod, MultiRoundExhaustible};
use crate::stv::{SingleTransferableVote, StvAction};
use crate::tally::Tally;

/// Any counting method, selected at runtime from a [CountMethodKind].
///
/// The typed results and residue are reachable through the variants. The
/// methods on this type cover what every counting method has in common.
#[derive(Debug)]
pub enum Counter {
    FirstPastThePost(FirstPastThePost),
    Rounds(MultiRoundExhaustible),
    Coombs(CoombsMethod),
    Borda(Borda),
    SingleTransferableVote(SingleTransferableVote),
}

fn check_field_size(field_size: usize) -> Result<(), ConfigurationError> {
    snafu::ensure!(
        field_size >= 1,
        InvalidParameterSnafu {
            message: "the field size of a Borda count must be at least 1"
        }
    );
    Ok(())
}

fn stats_of<S: Ord + Clone>(
    round: u32,
    tally: &Tally<S>,
    render: impl Fn(&S) -> String,
) -> RoundStats {
    RoundStats {
        round,
        tally: tally
            .iter()
            .map(|(c, s)| (c.to_string(), render(s)))
            .collect(),
        elected: vec![],
        eliminated: vec![],
    }
}

fn names(choices: &[Choice]) -> Vec<String> {
    choices.iter().map(|c| c.to_string()).collect()
}

/// One entry per tally. Choices missing from the next tally were eliminated,
/// and the leader of the last tally is elected.
fn stats_of_rounds<S: Ord + Clone>(
    rounds: &[&Tally<S>],
    render: impl Fn(&S) -> String,
) -> Vec<RoundStats> {
    let mut res = Vec::new();
    for (idx, tally) in rounds.iter().enumerate() {
        let mut rs = stats_of(idx as u32 + 1, tally, &render);
        match rounds.get(idx + 1) {
            Some(next) => rs.eliminated = names(&eliminated_between(tally, next)),
            None => {
                rs.elected = tally
                    .leader()
                    .map(|(c, _)| vec![c.to_string()])
                    .unwrap_or_default()
            }
        }
        res.push(rs);
    }
    res
}

impl Counter {
    pub fn from_kind(kind: CountMethodKind) -> Result<Counter, ConfigurationError> {
        info!("counting with {}", kind.name());
        let counter = match kind {
            CountMethodKind::FirstPastThePost => {
                Counter::FirstPastThePost(FirstPastThePost::new())
            }
            CountMethodKind::InstantRunoffVoting => {
                Counter::Rounds(MultiRoundExhaustible::instant_runoff())
            }
            CountMethodKind::CoombsMethod => Counter::Coombs(CoombsMethod::new()),
            CountMethodKind::ContingentVote => Counter::Rounds(MultiRoundExhaustible::contingent()),
            CountMethodKind::Bucklin => Counter::Rounds(MultiRoundExhaustible::bucklin()),
            CountMethodKind::TraditionalBorda { field_size } => {
                check_field_size(field_size)?;
                Counter::Borda(Borda::new(BordaVariant::Traditional { field_size }))
            }
            CountMethodKind::NauruBorda => Counter::Borda(Borda::new(BordaVariant::Nauru)),
            CountMethodKind::KiribatiBorda { field_size } => {
                check_field_size(field_size)?;
                Counter::Borda(Borda::new(BordaVariant::Kiribati { field_size }))
            }
            CountMethodKind::ModifiedBorda => Counter::Borda(Borda::new(BordaVariant::Modified)),
            CountMethodKind::SingleTransferableVote {
                seats,
                redistributor,
            } => Counter::SingleTransferableVote(SingleTransferableVote::new(
                seats,
                redistributor,
            )?),
            CountMethodKind::Baldwin | CountMethodKind::Nanson => {
                return UnsupportedSnafu { name: kind.name() }.fail();
            }
        };
        Ok(counter)
    }

    pub fn count(&mut self, responses: &[Vec<Choice>]) -> Result<(), CountError> {
        match self {
            Counter::FirstPastThePost(cm) => cm.count(responses),
            Counter::Rounds(cm) => cm.count(responses),
            Counter::Coombs(cm) => cm.count(responses),
            Counter::Borda(cm) => cm.count(responses),
            Counter::SingleTransferableVote(cm) => cm.count(responses),
        }
    }

    pub fn leader(&self) -> Result<Choice, CountError> {
        match self {
            Counter::FirstPastThePost(cm) => cm.leader(),
            Counter::Rounds(cm) => cm.leader(),
            Counter::Coombs(cm) => cm.leader(),
            Counter::Borda(cm) => cm.leader(),
            Counter::SingleTransferableVote(cm) => cm.leader(),
        }
    }

    pub fn trailer(&self) -> Result<Choice, CountError> {
        match self {
            Counter::FirstPastThePost(cm) => cm.trailer(),
            Counter::Rounds(cm) => cm.trailer(),
            Counter::Coombs(cm) => cm.trailer(),
            Counter::Borda(cm) => cm.trailer(),
            Counter::SingleTransferableVote(cm) => cm.trailer(),
        }
    }

    pub fn interpret_result(&self) -> Result<String, CountError> {
        match self {
            Counter::FirstPastThePost(cm) => cm.interpret_result(),
            Counter::Rounds(cm) => cm.interpret_result(),
            Counter::Coombs(cm) => cm.interpret_result(),
            Counter::Borda(cm) => cm.interpret_result(),
            Counter::SingleTransferableVote(cm) => cm.interpret_result(),
        }
    }

    pub fn interpret_residue(&self) -> Result<String, CountError> {
        match self {
            Counter::FirstPastThePost(cm) => cm.interpret_residue(),
            Counter::Rounds(cm) => cm.interpret_residue(),
            Counter::Coombs(cm) => cm.interpret_residue(),
            Counter::Borda(cm) => cm.interpret_residue(),
            Counter::SingleTransferableVote(cm) => cm.interpret_residue(),
        }
    }

    pub fn is_ready(&self) -> Result<(), CountError> {
        match self {
            Counter::FirstPastThePost(cm) => cm.is_ready(),
            Counter::Rounds(cm) => cm.is_ready(),
            Counter::Coombs(cm) => cm.is_ready(),
            Counter::Borda(cm) => cm.is_ready(),
            Counter::SingleTransferableVote(cm) => cm.is_ready(),
        }
    }

    /// The choices that won: the elected choices of a transferable vote, the
    /// leader otherwise. Empty if nothing was counted.
    pub fn winners(&self) -> Result<Vec<Choice>, CountError> {
        match self {
            Counter::SingleTransferableVote(cm) => Ok(cm.results()?.elected.clone()),
            _ => match self.leader() {
                Ok(c) => Ok(vec![c]),
                Err(CountError::EmptyTally {}) => Ok(vec![]),
                Err(e) => Err(e),
            },
        }
    }

    /// A summary of every round, for reports.
    pub fn round_stats(&self) -> Result<Vec<RoundStats>, CountError> {
        let stats = match self {
            Counter::FirstPastThePost(cm) => {
                stats_of_rounds(&[cm.results()?], |v: &u64| v.to_string())
            }
            Counter::Rounds(cm) => {
                let rounds: Vec<&Tally<u64>> = cm.residue()?.iter().collect();
                stats_of_rounds(&rounds, |v: &u64| v.to_string())
            }
            Counter::Coombs(cm) => {
                let rounds: Vec<&Tally<u64>> = cm.residue()?.iter().map(|r| &r.first).collect();
                stats_of_rounds(&rounds, |v: &u64| v.to_string())
            }
            Counter::Borda(cm) => stats_of_rounds(&[cm.results()?], format_points),
            Counter::SingleTransferableVote(cm) => {
                let mut res = Vec::new();
                for (idx, round) in cm.residue()?.iter().enumerate() {
                    let mut rs = stats_of(idx as u32 + 1, &round.piles, |v: &u64| v.to_string());
                    match &round.action {
                        StvAction::Elected(c) => rs.elected = vec![c.to_string()],
                        StvAction::Eliminated(c) => rs.eliminated = vec![c.to_string()],
                        StvAction::ElectedRemaining(cs) => rs.elected = names(cs),
                    }
                    res.push(rs);
                }
                res
            }
        };
        Ok(stats)
    }
}
