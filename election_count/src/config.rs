// ********* Input data structures ***********

use snafu::Snafu;

use crate::choice::Choice;

/// One voter's answer to a single question.
///
/// The shape depends on the response format of the question. Most of the time,
/// the ballot readers or the higher-level builder API produce these.
#[derive(PartialEq, Debug, Clone)]
pub enum Response {
    /// An unordered selection of choices.
    Selection(Vec<Choice>),
    /// Choices in order of preference, the most preferred first.
    Ranking(Vec<Choice>),
    /// Choices with a rating. The rating is kept as provided by the voter so
    /// that a non-integer rating can be reported as such.
    Ratings(Vec<(Choice, f64)>),
    /// Pairwise preferences, the preferred choice first.
    Pairs(Vec<(Choice, Choice)>),
}

impl Response {
    pub fn shape(&self) -> &'static str {
        match self {
            Response::Selection(_) => "selection",
            Response::Ranking(_) => "ranking",
            Response::Ratings(_) => "ratings",
            Response::Pairs(_) => "pairs",
        }
    }

    /// The choices of a selection or a ranking, in ballot order.
    /// Ratings and pairs do not reduce to a list of choices.
    pub fn choices(&self) -> Option<&[Choice]> {
        match self {
            Response::Selection(cs) | Response::Ranking(cs) => Some(cs.as_slice()),
            _ => None,
        }
    }
}

/// A response that failed validation for a question, with the reason.
/// Spoilage is scoped to one question: the same voter may have valid
/// responses to other questions.
#[derive(PartialEq, Debug, Clone)]
pub struct SpoiledBallot {
    pub response: Response,
    pub reason: ResponseFormatError,
}

// ********* Output data structures ***********

/// A display-oriented summary of one round of any counting method.
/// Scores are rendered as text so that fractional points survive as such.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RoundStats {
    pub round: u32,
    pub tally: Vec<(String, String)>,
    pub elected: Vec<String>,
    pub eliminated: Vec<String>,
}

// ******** Errors *********

/// Why a response does not match the format required by the question.
#[derive(PartialEq, Debug, Clone, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ResponseFormatError {
    #[snafu(display("expected a {expected} response, found a {found}"))]
    WrongShape {
        expected: &'static str,
        found: &'static str,
    },
    #[snafu(display("must choose {rule} choices, found {found}"))]
    WrongNumberOfChoices { rule: String, found: usize },
    #[snafu(display("{choice} is not a valid choice for this question"))]
    InvalidChoice { choice: Choice },
    #[snafu(display("duplicate choices are not allowed"))]
    DuplicateChoice {},
    #[snafu(display("rating {rating} for {choice} is not an integer"))]
    NonIntegerRating { choice: Choice, rating: f64 },
    #[snafu(display("rating {rating} for {choice} is negative"))]
    NegativeRating { choice: Choice, rating: f64 },
    #[snafu(display("rating {rating} for {choice} exceeds the maximum of {maximum}"))]
    OverMaximumRating {
        choice: Choice,
        rating: f64,
        maximum: u32,
    },
    #[snafu(display("spent {spent}, exceeding the budget of {budget}"))]
    OverBudget { spent: f64, budget: u32 },
    #[snafu(display("{choice} cannot be paired with itself"))]
    SelfPair { choice: Choice },
    #[snafu(display("{higher} over {lower} was stated both ways"))]
    MakeUpYourMind { higher: Choice, lower: Choice },
}

/// Errors from the counting methods.
#[derive(PartialEq, Debug, Clone, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CountError {
    #[snafu(display("the count has not been run yet"))]
    IncompleteCount {},
    #[snafu(display("the count already ran; use a fresh counting instance to recount"))]
    AlreadyCounted {},
    #[snafu(display("no choice received any vote"))]
    EmptyTally {},
    #[snafu(display("could not order ballots for transfer: {source}"))]
    Redistribution { source: ConfigurationError },
    #[snafu(display("cannot count: {source}"))]
    InvalidConfiguration { source: ConfigurationError },
}

/// Invalid parameters, reported when something is constructed.
#[derive(Eq, PartialEq, Debug, Clone, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ConfigurationError {
    #[snafu(display("every {n}th ballot: n must be at least 2"))]
    TrivialSubset { n: usize },
    #[snafu(display("every {n}th ballot of {len}: n and {len} must be relatively prime"))]
    NotCoprime { n: usize, len: usize },
    #[snafu(display("{name} is not implemented: its definition is still an open question"))]
    Unsupported { name: String },
    #[snafu(display("{method} cannot count {format} responses"))]
    IncompatibleFormat { format: String, method: String },
    #[snafu(display("invalid parameter: {message}"))]
    InvalidParameter { message: String },
}

// ********* Configuration **********

/// How ballots are ordered when a transferable vote moves them around.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum RedistributorKind {
    /// Original order.
    Identity,
    /// Every nth ballot, wrapping around.
    NthSubset(usize),
    /// Every 11th ballot.
    Cincinnati,
    /// Uniformly random order.
    HareRandom,
    // The following strategies are named but not defined precisely enough to
    // be implemented. Selecting them fails at construction.
    Gregory,
    Wright,
    Meek,
    Warren,
}

impl RedistributorKind {
    pub fn name(&self) -> &'static str {
        match self {
            RedistributorKind::Identity => "identity",
            RedistributorKind::NthSubset(_) => "nth subset",
            RedistributorKind::Cincinnati => "Cincinnati",
            RedistributorKind::HareRandom => "Hare random",
            RedistributorKind::Gregory => "Gregory",
            RedistributorKind::Wright => "Wright",
            RedistributorKind::Meek => "Meek",
            RedistributorKind::Warren => "Warren",
        }
    }

    /// Checks the parameters that do not depend on the ballots.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        match self {
            RedistributorKind::NthSubset(n) if *n < 2 => TrivialSubsetSnafu { n: *n }.fail(),
            RedistributorKind::Gregory
            | RedistributorKind::Wright
            | RedistributorKind::Meek
            | RedistributorKind::Warren => UnsupportedSnafu { name: self.name() }.fail(),
            _ => Ok(()),
        }
    }
}

/// The counting method of a question.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum CountMethodKind {
    FirstPastThePost,
    InstantRunoffVoting,
    CoombsMethod,
    ContingentVote,
    Bucklin,
    TraditionalBorda { field_size: usize },
    NauruBorda,
    KiribatiBorda { field_size: usize },
    ModifiedBorda,
    SingleTransferableVote {
        seats: u32,
        redistributor: RedistributorKind,
    },
    // Borda-elimination hybrids: the variant of Borda and the elimination
    // threshold are not pinned down. Selecting them fails at construction.
    Baldwin,
    Nanson,
}

impl CountMethodKind {
    pub fn name(&self) -> &'static str {
        match self {
            CountMethodKind::FirstPastThePost => "first past the post",
            CountMethodKind::InstantRunoffVoting => "instant runoff voting",
            CountMethodKind::CoombsMethod => "Coombs' method",
            CountMethodKind::ContingentVote => "contingent vote",
            CountMethodKind::Bucklin => "Bucklin",
            CountMethodKind::TraditionalBorda { .. } => "traditional Borda",
            CountMethodKind::NauruBorda => "Nauru Borda",
            CountMethodKind::KiribatiBorda { .. } => "Kiribati Borda",
            CountMethodKind::ModifiedBorda => "modified Borda",
            CountMethodKind::SingleTransferableVote { .. } => "single transferable vote",
            CountMethodKind::Baldwin => "Baldwin",
            CountMethodKind::Nanson => "Nanson",
        }
    }

    /// True if the method reads the responses as preference orders.
    /// First past the post counts every listed choice as a vote instead.
    pub fn is_ranked(&self) -> bool {
        !matches!(self, CountMethodKind::FirstPastThePost)
    }
}
