use std::collections::BTreeMap;
use std::iter::Sum;
use std::ops::AddAssign;

use crate::choice::Choice;

/// The scores of the choices after one pass over the ballots.
///
/// Tallies are built once and never modified afterwards. The `ballots` field
/// records how many ballots contributed to this tally.
///
/// Ties are broken the same way everywhere: among equal scores, the choice
/// registered first leads, and the choice registered last trails.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Tally<S> {
    scores: BTreeMap<Choice, S>,
    ballots: u64,
}

impl<S> Tally<S>
where
    S: Ord + Clone,
{
    pub(crate) fn new(scores: BTreeMap<Choice, S>, ballots: u64) -> Tally<S> {
        Tally { scores, ballots }
    }

    pub fn get(&self, choice: &Choice) -> Option<&S> {
        self.scores.get(choice)
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// The number of ballots that contributed to this tally.
    pub fn ballots(&self) -> u64 {
        self.ballots
    }

    /// All the choices with their score, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&Choice, &S)> {
        self.scores.iter()
    }

    pub fn choices(&self) -> impl Iterator<Item = &Choice> {
        self.scores.keys()
    }

    /// All the choices, from the leader down to the trailer.
    pub fn ranked(&self) -> Vec<(&Choice, &S)> {
        let mut res: Vec<(&Choice, &S)> = self.scores.iter().collect();
        // Highest score first, then lowest identity first.
        res.sort_by(|(c1, s1), (c2, s2)| s2.cmp(s1).then_with(|| c1.cmp(c2)));
        res
    }

    /// The `n` leading choices.
    pub fn top(&self, n: usize) -> Vec<Choice> {
        self.ranked()
            .into_iter()
            .take(n)
            .map(|(c, _)| c.clone())
            .collect()
    }

    pub fn leader(&self) -> Option<(&Choice, &S)> {
        self.ranked().into_iter().next()
    }

    pub fn trailer(&self) -> Option<(&Choice, &S)> {
        self.ranked().into_iter().last()
    }
}

impl<S> Tally<S>
where
    S: Ord + Clone + Sum<S>,
{
    pub fn total(&self) -> S {
        self.scores.values().cloned().sum()
    }
}

/// Accumulates scores before freezing them into a [Tally].
#[derive(Debug, Default)]
pub(crate) struct TallyBuilder<S> {
    scores: BTreeMap<Choice, S>,
    ballots: u64,
}

impl<S> TallyBuilder<S>
where
    S: Ord + Clone + Default + AddAssign,
{
    pub(crate) fn new() -> TallyBuilder<S> {
        TallyBuilder {
            scores: BTreeMap::new(),
            ballots: 0,
        }
    }

    /// Makes sure the choice shows up in the tally, even without any score.
    pub(crate) fn seed(&mut self, choice: &Choice) {
        self.scores.entry(choice.clone()).or_default();
    }

    pub(crate) fn add(&mut self, choice: &Choice, score: S) {
        *self.scores.entry(choice.clone()).or_default() += score;
    }

    pub(crate) fn ballot_done(&mut self) {
        self.ballots += 1;
    }

    pub(crate) fn build(self) -> Tally<S> {
        Tally::new(self.scores, self.ballots)
    }
}
