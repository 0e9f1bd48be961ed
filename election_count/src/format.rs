use std::collections::HashSet;
use std::hash::Hash;

use log::debug;
use snafu::ensure;

use crate::choice::{Choice, Field};
use crate::config::*;

/// The shape a voter's response must take for a question.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum ResponseFormat {
    /// Select exactly n choices, without ranking.
    ChooseExactly(usize),
    /// Select at most n choices, without ranking.
    ChooseNoMoreThan(usize),
    /// Rank any number of choices, most preferred first.
    RankInOrderOfPreference,
    /// Rank every choice of the field.
    RankAllInOrderOfPreference,
    /// Rank at most n choices.
    RankNoMoreThanInOrderOfPreference(usize),
    /// Rate choices on an integer scale from 0 to the maximum.
    Ratings(u32),
    /// Distribute at most this many points among the choices.
    Budget(u32),
    /// State preferences as (preferred, other) pairs.
    Pairwise,
    /// State a preference for every possible pair of the field.
    AllPossiblePairwise,
}

impl ResponseFormat {
    pub fn name(&self) -> String {
        match self {
            ResponseFormat::ChooseExactly(n) => format!("choose exactly {}", n),
            ResponseFormat::ChooseNoMoreThan(n) => format!("choose no more than {}", n),
            ResponseFormat::RankInOrderOfPreference => "rank in order of preference".to_string(),
            ResponseFormat::RankAllInOrderOfPreference => {
                "rank all in order of preference".to_string()
            }
            ResponseFormat::RankNoMoreThanInOrderOfPreference(n) => {
                format!("rank no more than {} in order of preference", n)
            }
            ResponseFormat::Ratings(m) => format!("ratings up to {}", m),
            ResponseFormat::Budget(b) => format!("budget of {}", b),
            ResponseFormat::Pairwise => "pairwise".to_string(),
            ResponseFormat::AllPossiblePairwise => "all possible pairwise".to_string(),
        }
    }

    /// The shape of [Response] expected by this format.
    pub fn shape(&self) -> &'static str {
        match self {
            ResponseFormat::ChooseExactly(_) | ResponseFormat::ChooseNoMoreThan(_) => "selection",
            ResponseFormat::RankInOrderOfPreference
            | ResponseFormat::RankAllInOrderOfPreference
            | ResponseFormat::RankNoMoreThanInOrderOfPreference(_) => "ranking",
            ResponseFormat::Ratings(_) | ResponseFormat::Budget(_) => "ratings",
            ResponseFormat::Pairwise | ResponseFormat::AllPossiblePairwise => "pairs",
        }
    }

    /// Checks one response against this format and the field of legal choices.
    ///
    /// When the field is absent, write-ins are permitted and the membership
    /// checks are skipped, as well as the checks that depend on the size of
    /// the field.
    pub fn validate(
        &self,
        response: &Response,
        field: Option<&Field>,
    ) -> Result<(), ResponseFormatError> {
        debug!("validate: {:?} against {}", response, self.name());
        match (self, response) {
            (ResponseFormat::ChooseExactly(n), Response::Selection(cs)) => {
                ensure!(
                    cs.len() == *n,
                    WrongNumberOfChoicesSnafu {
                        rule: format!("exactly {}", n),
                        found: cs.len()
                    }
                );
                detect_duplicates(cs)?;
                validate_choices(cs, field)
            }
            (ResponseFormat::ChooseNoMoreThan(n), Response::Selection(cs)) => {
                ensure!(
                    cs.len() <= *n,
                    WrongNumberOfChoicesSnafu {
                        rule: format!("no more than {}", n),
                        found: cs.len()
                    }
                );
                detect_duplicates(cs)?;
                validate_choices(cs, field)
            }
            (ResponseFormat::RankInOrderOfPreference, Response::Ranking(cs)) => {
                validate_ranking(cs, field)
            }
            (ResponseFormat::RankAllInOrderOfPreference, Response::Ranking(cs)) => {
                if let Some(f) = field {
                    ensure!(
                        cs.len() == f.len(),
                        WrongNumberOfChoicesSnafu {
                            rule: format!("all {}", f.len()),
                            found: cs.len()
                        }
                    );
                }
                validate_ranking(cs, field)
            }
            (ResponseFormat::RankNoMoreThanInOrderOfPreference(n), Response::Ranking(cs)) => {
                ensure!(
                    cs.len() <= *n,
                    WrongNumberOfChoicesSnafu {
                        rule: format!("no more than {}", n),
                        found: cs.len()
                    }
                );
                validate_ranking(cs, field)
            }
            (ResponseFormat::Ratings(maximum), Response::Ratings(rs)) => {
                validate_ratings(rs, *maximum, field)
            }
            (ResponseFormat::Budget(budget), Response::Ratings(rs)) => {
                // Every rating is checked on its own before the total.
                validate_ratings(rs, *budget, field)?;
                let spent: f64 = rs.iter().map(|(_, r)| *r).sum();
                ensure!(
                    spent <= *budget as f64,
                    OverBudgetSnafu {
                        spent,
                        budget: *budget
                    }
                );
                Ok(())
            }
            (ResponseFormat::Pairwise, Response::Pairs(ps)) => validate_pairs(ps, field),
            (ResponseFormat::AllPossiblePairwise, Response::Pairs(ps)) => {
                if let Some(f) = field {
                    let all_pairs = f.len() * f.len().saturating_sub(1) / 2;
                    ensure!(
                        ps.len() == all_pairs,
                        WrongNumberOfChoicesSnafu {
                            rule: format!("all {} pairs of", all_pairs),
                            found: ps.len()
                        }
                    );
                }
                validate_pairs(ps, field)
            }
            (_, r) => WrongShapeSnafu {
                expected: self.shape(),
                found: r.shape(),
            }
            .fail(),
        }
    }
}

fn validate_ranking(cs: &[Choice], field: Option<&Field>) -> Result<(), ResponseFormatError> {
    detect_duplicates(cs)?;
    validate_choices(cs, field)
}

// Ratings: legality of the values first, then the choices, then duplicates.
fn validate_ratings(
    rs: &[(Choice, f64)],
    maximum: u32,
    field: Option<&Field>,
) -> Result<(), ResponseFormatError> {
    for (choice, rating) in rs.iter() {
        let rating = *rating;
        ensure!(
            rating.is_finite() && rating.fract() == 0.0,
            NonIntegerRatingSnafu {
                choice: choice.clone(),
                rating
            }
        );
        ensure!(
            rating >= 0.0,
            NegativeRatingSnafu {
                choice: choice.clone(),
                rating
            }
        );
        ensure!(
            rating <= maximum as f64,
            OverMaximumRatingSnafu {
                choice: choice.clone(),
                rating,
                maximum
            }
        );
    }
    let choices: Vec<Choice> = rs.iter().map(|(c, _)| c.clone()).collect();
    validate_choices(&choices, field)?;
    detect_duplicates(&choices)
}

fn validate_pairs(
    ps: &[(Choice, Choice)],
    field: Option<&Field>,
) -> Result<(), ResponseFormatError> {
    for (higher, lower) in ps.iter() {
        ensure!(
            higher != lower,
            SelfPairSnafu {
                choice: higher.clone()
            }
        );
    }
    if let Some(f) = field {
        for (higher, lower) in ps.iter() {
            for c in [higher, lower] {
                ensure!(f.contains(c), InvalidChoiceSnafu { choice: c.clone() });
            }
        }
    }
    let mut seen: HashSet<(&Choice, &Choice)> = HashSet::new();
    for (higher, lower) in ps.iter() {
        ensure!(!seen.contains(&(higher, lower)), DuplicateChoiceSnafu {});
        ensure!(
            !seen.contains(&(lower, higher)),
            MakeUpYourMindSnafu {
                higher: higher.clone(),
                lower: lower.clone()
            }
        );
        seen.insert((higher, lower));
    }
    Ok(())
}

/// Compares the size of the response with the size of its de-duplicated version.
fn detect_duplicates<T: Eq + Hash>(items: &[T]) -> Result<(), ResponseFormatError> {
    let unique: HashSet<&T> = items.iter().collect();
    ensure!(unique.len() == items.len(), DuplicateChoiceSnafu {});
    Ok(())
}

fn validate_choices(cs: &[Choice], field: Option<&Field>) -> Result<(), ResponseFormatError> {
    if let Some(f) = field {
        for c in cs.iter() {
            ensure!(f.contains(c), InvalidChoiceSnafu { choice: c.clone() });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::choice::ChoiceRegistry;

    struct Setup {
        field: Field,
        reg: ChoiceRegistry,
    }

    fn setup() -> Setup {
        let mut reg = ChoiceRegistry::new();
        let field = reg.field(&["Chattanooga", "Knoxville", "Memphis", "Nashville"]);
        Setup { field, reg }
    }

    fn cs(s: &Setup, labels: &[&str]) -> Vec<Choice> {
        labels
            .iter()
            .map(|l| s.reg.lookup(l).unwrap().clone())
            .collect()
    }

    #[test]
    fn choose_exactly_wrong_number() {
        let s = setup();
        let rf = ResponseFormat::ChooseExactly(2);
        let too_many = Response::Selection(cs(&s, &["Chattanooga", "Knoxville", "Memphis"]));
        assert!(matches!(
            rf.validate(&too_many, Some(&s.field)),
            Err(ResponseFormatError::WrongNumberOfChoices { found: 3, .. })
        ));
        let too_few = Response::Selection(cs(&s, &["Chattanooga"]));
        assert!(matches!(
            rf.validate(&too_few, Some(&s.field)),
            Err(ResponseFormatError::WrongNumberOfChoices { .. })
        ));
        assert!(matches!(
            rf.validate(&Response::Selection(vec![]), Some(&s.field)),
            Err(ResponseFormatError::WrongNumberOfChoices { found: 0, .. })
        ));
    }

    #[test]
    fn choose_exactly_invalid_choice() {
        let mut s = setup();
        let outsider = s.reg.create("Memphis");
        let mut r = cs(&s, &["Knoxville"]);
        r.push(outsider.clone());
        let rf = ResponseFormat::ChooseExactly(2);
        assert_eq!(
            rf.validate(&Response::Selection(r.clone()), Some(&s.field)),
            Err(ResponseFormatError::InvalidChoice { choice: outsider })
        );
        // Write-ins are fine without a field.
        assert_eq!(rf.validate(&Response::Selection(r), None), Ok(()));
    }

    #[test]
    fn choose_no_more_than() {
        let s = setup();
        let rf = ResponseFormat::ChooseNoMoreThan(2);
        let r = Response::Selection(cs(&s, &["Chattanooga", "Knoxville", "Memphis"]));
        assert!(matches!(
            rf.validate(&r, Some(&s.field)),
            Err(ResponseFormatError::WrongNumberOfChoices { .. })
        ));
        let ok = Response::Selection(cs(&s, &["Memphis"]));
        assert_eq!(rf.validate(&ok, Some(&s.field)), Ok(()));
        let dup = Response::Selection(cs(&s, &["Memphis", "Memphis"]));
        assert_eq!(
            rf.validate(&dup, Some(&s.field)),
            Err(ResponseFormatError::DuplicateChoice {})
        );
    }

    #[test]
    fn rank_in_order() {
        let s = setup();
        let rf = ResponseFormat::RankInOrderOfPreference;
        let ok = Response::Ranking(cs(&s, &["Memphis", "Knoxville"]));
        assert_eq!(rf.validate(&ok, Some(&s.field)), Ok(()));
        let dup = Response::Ranking(cs(&s, &["Memphis", "Knoxville", "Memphis"]));
        assert_eq!(
            rf.validate(&dup, Some(&s.field)),
            Err(ResponseFormatError::DuplicateChoice {})
        );
        let wrong_shape = Response::Selection(cs(&s, &["Memphis"]));
        assert_eq!(
            rf.validate(&wrong_shape, Some(&s.field)),
            Err(ResponseFormatError::WrongShape {
                expected: "ranking",
                found: "selection"
            })
        );
    }

    #[test]
    fn rank_all_requires_full_field() {
        let s = setup();
        let rf = ResponseFormat::RankAllInOrderOfPreference;
        let short = Response::Ranking(cs(&s, &["Chattanooga", "Knoxville", "Memphis"]));
        assert!(matches!(
            rf.validate(&short, Some(&s.field)),
            Err(ResponseFormatError::WrongNumberOfChoices { found: 3, .. })
        ));
        let full = Response::Ranking(cs(
            &s,
            &["Nashville", "Chattanooga", "Knoxville", "Memphis"],
        ));
        assert_eq!(rf.validate(&full, Some(&s.field)), Ok(()));
        // No field: nothing to compare the size with.
        assert_eq!(rf.validate(&short, None), Ok(()));
    }

    #[test]
    fn rank_no_more_than() {
        let s = setup();
        let rf = ResponseFormat::RankNoMoreThanInOrderOfPreference(2);
        let r = Response::Ranking(cs(&s, &["Chattanooga", "Knoxville", "Memphis"]));
        assert!(matches!(
            rf.validate(&r, Some(&s.field)),
            Err(ResponseFormatError::WrongNumberOfChoices { .. })
        ));
        let ok = Response::Ranking(cs(&s, &["Knoxville", "Memphis"]));
        assert_eq!(rf.validate(&ok, Some(&s.field)), Ok(()));
    }

    #[test]
    fn ratings() {
        let s = setup();
        let m = cs(&s, &["Memphis"]).remove(0);
        let k = cs(&s, &["Knoxville"]).remove(0);
        let rf = ResponseFormat::Ratings(5);
        let ok = Response::Ratings(vec![(m.clone(), 5.0), (k.clone(), 0.0)]);
        assert_eq!(rf.validate(&ok, Some(&s.field)), Ok(()));
        assert!(matches!(
            rf.validate(&Response::Ratings(vec![(m.clone(), 2.5)]), Some(&s.field)),
            Err(ResponseFormatError::NonIntegerRating { .. })
        ));
        assert!(matches!(
            rf.validate(&Response::Ratings(vec![(m.clone(), -1.0)]), Some(&s.field)),
            Err(ResponseFormatError::NegativeRating { .. })
        ));
        assert!(matches!(
            rf.validate(&Response::Ratings(vec![(m.clone(), 6.0)]), Some(&s.field)),
            Err(ResponseFormatError::OverMaximumRating { maximum: 5, .. })
        ));
        assert_eq!(
            rf.validate(
                &Response::Ratings(vec![(m.clone(), 1.0), (m, 2.0)]),
                Some(&s.field)
            ),
            Err(ResponseFormatError::DuplicateChoice {})
        );
    }

    #[test]
    fn budget() {
        let s = setup();
        let m = cs(&s, &["Memphis"]).remove(0);
        let k = cs(&s, &["Knoxville"]).remove(0);
        let rf = ResponseFormat::Budget(10);
        let ok = Response::Ratings(vec![(m.clone(), 6.0), (k.clone(), 4.0)]);
        assert_eq!(rf.validate(&ok, Some(&s.field)), Ok(()));
        let over = Response::Ratings(vec![(m.clone(), 6.0), (k.clone(), 5.0)]);
        assert_eq!(
            rf.validate(&over, Some(&s.field)),
            Err(ResponseFormatError::OverBudget {
                spent: 11.0,
                budget: 10
            })
        );
        let nan = Response::Ratings(vec![(m.clone(), f64::NAN), (k.clone(), 4.0)]);
        assert!(matches!(
            rf.validate(&nan, Some(&s.field)),
            Err(ResponseFormatError::NonIntegerRating { .. })
        ));
        let negative = Response::Ratings(vec![(m.clone(), -5.0), (k, 12.0)]);
        assert_eq!(
            rf.validate(&negative, Some(&s.field)),
            Err(ResponseFormatError::NegativeRating {
                choice: m,
                rating: -5.0
            })
        );
    }

    #[test]
    fn pairwise() {
        let s = setup();
        let v = cs(&s, &["Chattanooga", "Knoxville", "Memphis"]);
        let (c, k, m) = (v[0].clone(), v[1].clone(), v[2].clone());
        let rf = ResponseFormat::Pairwise;
        let ok = Response::Pairs(vec![(c.clone(), k.clone()), (k.clone(), m.clone())]);
        assert_eq!(rf.validate(&ok, Some(&s.field)), Ok(()));
        assert_eq!(
            rf.validate(&Response::Pairs(vec![(c.clone(), c.clone())]), Some(&s.field)),
            Err(ResponseFormatError::SelfPair { choice: c.clone() })
        );
        let both_ways = Response::Pairs(vec![(c.clone(), k.clone()), (k.clone(), c.clone())]);
        assert_eq!(
            rf.validate(&both_ways, Some(&s.field)),
            Err(ResponseFormatError::MakeUpYourMind {
                higher: k.clone(),
                lower: c.clone()
            })
        );
        let twice = Response::Pairs(vec![(c.clone(), k.clone()), (c.clone(), k.clone())]);
        assert_eq!(
            rf.validate(&twice, Some(&s.field)),
            Err(ResponseFormatError::DuplicateChoice {})
        );
        // Validating the same response again does not remember earlier pairs.
        assert_eq!(rf.validate(&ok, Some(&s.field)), Ok(()));
    }

    #[test]
    fn all_possible_pairwise() {
        let s = setup();
        let v = cs(&s, &["Chattanooga", "Knoxville", "Memphis", "Nashville"]);
        let mut pairs: Vec<(Choice, Choice)> = Vec::new();
        for i in 0..v.len() {
            for j in (i + 1)..v.len() {
                pairs.push((v[i].clone(), v[j].clone()));
            }
        }
        assert_eq!(pairs.len(), 6);
        let rf = ResponseFormat::AllPossiblePairwise;
        assert_eq!(
            rf.validate(&Response::Pairs(pairs.clone()), Some(&s.field)),
            Ok(())
        );
        pairs.pop();
        assert!(matches!(
            rf.validate(&Response::Pairs(pairs), Some(&s.field)),
            Err(ResponseFormatError::WrongNumberOfChoices { found: 5, .. })
        ));
    }
}
