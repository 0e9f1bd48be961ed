use log::{debug, info};

use crate::choice::Choice;
use crate::config::*;
use crate::method::{CountMethod, Outcome};
use crate::tally::{Tally, TallyBuilder};

/// Your basic horse race, usually paired with a choose-exactly or
/// choose-no-more-than response format.
///
/// Every choice listed in a response is one vote for that choice, so a
/// response may cast several votes at once. There is only ever one round.
///
/// The results are the number of votes per choice. The residue is the total
/// number of votes recorded.
#[derive(Debug, Default)]
pub struct FirstPastThePost {
    outcome: Outcome<Tally<u64>, u64>,
}

impl FirstPastThePost {
    pub fn new() -> FirstPastThePost {
        FirstPastThePost::default()
    }
}

/// Counts one vote for every choice of every response.
/// The seeded choices show up in the tally even if they received no vote.
pub(crate) fn tally_votes<'a>(
    responses: impl IntoIterator<Item = &'a [Choice]>,
    seeds: impl IntoIterator<Item = &'a Choice>,
) -> Tally<u64> {
    let mut tb: TallyBuilder<u64> = TallyBuilder::new();
    for c in seeds {
        tb.seed(c);
    }
    for response in responses {
        for c in response.iter() {
            tb.add(c, 1);
        }
        tb.ballot_done();
    }
    tb.build()
}

/// One line per choice, in registration order.
pub(crate) fn interpret_tally(tally: &Tally<u64>) -> String {
    let total = tally.total();
    let mut interpretation = String::new();
    for (choice, votes) in tally.iter() {
        let percentage = if total == 0 {
            0.0
        } else {
            100.0 * (*votes as f64) / (total as f64)
        };
        interpretation.push_str(&format!(
            "{} got {} of {} votes ({:.2}%)\n",
            choice, votes, total, percentage
        ));
    }
    interpretation
}

pub(crate) fn leader_of<S: Ord + Clone>(tally: &Tally<S>) -> Result<Choice, CountError> {
    tally
        .leader()
        .map(|(c, _)| c.clone())
        .ok_or(CountError::EmptyTally {})
}

pub(crate) fn trailer_of<S: Ord + Clone>(tally: &Tally<S>) -> Result<Choice, CountError> {
    tally
        .trailer()
        .map(|(c, _)| c.clone())
        .ok_or(CountError::EmptyTally {})
}

impl CountMethod for FirstPastThePost {
    type Results = Tally<u64>;
    type Residue = u64;

    fn count(&mut self, responses: &[Vec<Choice>]) -> Result<(), CountError> {
        self.outcome.ensure_fresh()?;
        info!("first past the post: counting {} responses", responses.len());
        let tally = tally_votes(responses.iter().map(|r| r.as_slice()), []);
        let total = tally.total();
        debug!("first past the post: tally {:?}", tally);
        self.outcome.set(tally, total);
        Ok(())
    }

    fn results(&self) -> Result<&Tally<u64>, CountError> {
        self.outcome.results()
    }

    fn residue(&self) -> Result<&u64, CountError> {
        self.outcome.residue()
    }

    fn leader(&self) -> Result<Choice, CountError> {
        leader_of(self.outcome.results()?)
    }

    fn trailer(&self) -> Result<Choice, CountError> {
        trailer_of(self.outcome.results()?)
    }

    fn interpret_result(&self) -> Result<String, CountError> {
        Ok(interpret_tally(self.outcome.results()?))
    }

    fn interpret_residue(&self) -> Result<String, CountError> {
        Ok(format!("{} total votes cast\n", self.outcome.residue()?))
    }

    fn is_ready(&self) -> Result<(), CountError> {
        self.outcome.ready()
    }
}
