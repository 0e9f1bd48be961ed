/*!
Validation of election responses and auditable counting methods.

A [Question] ties together the legal choices (the [Field]), the
[ResponseFormat] the responses must follow and the counting method. Resolving
a question sets aside the spoiled responses, counts the valid ones and
returns a [Counter] holding the results and the residue: the audit trail of
every intermediate round.

Counting is deterministic. Ties are broken by the order in which choices were
registered (see [Tally]), except for the random redistribution of a
transferable vote.

```
use election_count::*;

let mut reg = ChoiceRegistry::new();
let field = reg.field(&["Anna", "Bob", "Clara"]);
let anna = reg.lookup("Anna").unwrap().clone();
let bob = reg.lookup("Bob").unwrap().clone();

let question = Question::new(
    Some(field),
    ResponseFormat::RankInOrderOfPreference,
    CountMethodKind::InstantRunoffVoting,
)?;
let resolution = question.resolve(vec![
    Response::Ranking(vec![anna.clone(), bob.clone()]),
    Response::Ranking(vec![bob.clone()]),
    Response::Ranking(vec![bob.clone(), anna.clone()]),
    Response::Ranking(vec![bob.clone(), bob.clone()]),
])?;
assert_eq!(resolution.spoiled.len(), 1);
assert_eq!(resolution.counter.leader()?, bob);
print!("{}", resolution.counter.interpret_residue()?);
# Ok::<(), Box<dyn std::error::Error>>(())
```
*/

mod borda;
mod choice;
mod config;
mod counter;
mod format;
mod fptp;
mod method;
mod question;
mod redist;
mod rounds;
mod stv;
mod tally;

pub mod builder;
pub mod manual;

#[cfg(test)]
mod testdata;

pub use crate::borda::{Borda, BordaVariant, Points};
pub use crate::choice::{Choice, ChoiceId, ChoiceRegistry, Field};
pub use crate::config::*;
pub use crate::counter::Counter;
pub use crate::format::ResponseFormat;
pub use crate::fptp::FirstPastThePost;
pub use crate::method::CountMethod;
pub use crate::question::{Question, Resolution};
pub use crate::redist::{HareRandom, NthSubset, Redistributor, CINCINNATI_STEP};
pub use crate::rounds::{CoombsMethod, CoombsRound, MultiRoundExhaustible};
pub use crate::stv::{droop_quota, SingleTransferableVote, StvAction, StvResults, StvRound};
pub use crate::tally::Tally;
