use log::{debug, info};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{ToPrimitive, Zero};

use crate::choice::Choice;
use crate::config::*;
use crate::fptp::{leader_of, trailer_of};
use crate::method::{CountMethod, Outcome};
use crate::tally::{Tally, TallyBuilder};

/// Points, kept exact so that fractions add up without rounding.
pub type Points = BigRational;

/// How a position on a ballot turns into points.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum BordaVariant {
    /// The first choice gets `field_size - 1` points, the next one less, down to 0.
    Traditional { field_size: usize },
    /// The choice at position k (starting at 1) gets 1/k points.
    Nauru,
    /// The choice at position k (starting at 1) gets `field_size - k + 1` points.
    Kiribati { field_size: usize },
    /// The choice at position k (starting at 1) gets `m - k + 1` points, where
    /// m is the number of choices ranked by that ballot.
    Modified,
}

impl BordaVariant {
    /// The points of the choice at `position` (starting at 0) of a ballot
    /// that ranks `ranked` choices. Never negative.
    pub fn points(&self, position: usize, ranked: usize) -> Points {
        let whole = |n: usize| BigRational::from_integer(BigInt::from(n));
        match *self {
            BordaVariant::Traditional { field_size } => {
                whole(field_size.saturating_sub(position + 1))
            }
            BordaVariant::Nauru => {
                BigRational::new(BigInt::from(1u32), BigInt::from(position + 1))
            }
            BordaVariant::Kiribati { field_size } => whole(field_size.saturating_sub(position)),
            BordaVariant::Modified => whole(ranked.saturating_sub(position)),
        }
    }
}

/// Positional scoring over ranked ballots. There is a single pass: each ballot
/// is turned into points and the points are added up.
///
/// The results are the points per choice. The residue holds the single points
/// tally.
#[derive(Debug)]
pub struct Borda {
    variant: BordaVariant,
    outcome: Outcome<Tally<Points>, Vec<Tally<Points>>>,
}

impl Borda {
    pub fn new(variant: BordaVariant) -> Borda {
        Borda {
            variant,
            outcome: Outcome::default(),
        }
    }

    pub fn variant(&self) -> BordaVariant {
        self.variant
    }
}

/// Integers as integers, fractions as decimals.
pub(crate) fn format_points(points: &Points) -> String {
    if points.is_integer() {
        points.to_integer().to_string()
    } else {
        match points.to_f64() {
            Some(x) => format!("{:.6}", x),
            None => points.to_string(),
        }
    }
}

impl CountMethod for Borda {
    type Results = Tally<Points>;
    type Residue = Vec<Tally<Points>>;

    fn count(&mut self, responses: &[Vec<Choice>]) -> Result<(), CountError> {
        self.outcome.ensure_fresh()?;
        info!("{:?}: counting {} responses", self.variant, responses.len());
        let mut tb: TallyBuilder<Points> = TallyBuilder::new();
        for response in responses.iter() {
            for (position, c) in response.iter().enumerate() {
                let p = self.variant.points(position, response.len());
                debug!("{:?}: {} gets {}", self.variant, c, p);
                tb.add(c, p);
            }
            tb.ballot_done();
        }
        let tally = tb.build();
        debug!("{:?}: total points {}", self.variant, tally.total());
        self.outcome.set(tally.clone(), vec![tally]);
        Ok(())
    }

    fn results(&self) -> Result<&Tally<Points>, CountError> {
        self.outcome.results()
    }

    fn residue(&self) -> Result<&Vec<Tally<Points>>, CountError> {
        self.outcome.residue()
    }

    fn leader(&self) -> Result<Choice, CountError> {
        leader_of(self.outcome.results()?)
    }

    fn trailer(&self) -> Result<Choice, CountError> {
        trailer_of(self.outcome.results()?)
    }

    fn interpret_result(&self) -> Result<String, CountError> {
        let mut interpretation = String::new();
        for (c, p) in self.outcome.results()?.iter() {
            interpretation.push_str(&format!("{} got {} points\n", c, format_points(p)));
        }
        Ok(interpretation)
    }

    fn interpret_residue(&self) -> Result<String, CountError> {
        let results = self.outcome.results()?;
        let total = results.total();
        if total.is_zero() && results.is_empty() {
            return Ok("No points awarded\n".to_string());
        }
        Ok(format!(
            "{} points awarded over {} ballots\n",
            format_points(&total),
            results.ballots()
        ))
    }

    fn is_ready(&self) -> Result<(), CountError> {
        self.outcome.ready()
    }
}
