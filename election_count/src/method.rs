use crate::choice::Choice;
use crate::config::CountError;

/// The capabilities shared by all the counting methods.
///
/// A counting method is used once: `count` runs over all the valid responses to
/// a question, after which the results and the residue (the audit trail of the
/// intermediate steps) are available. Every accessor fails with
/// [CountError::IncompleteCount] before `count` has run.
///
/// All the ballots passed to `count` are processed. Nothing stops early because
/// a choice looks like it is leading: the caller may be one polling place among
/// many.
pub trait CountMethod {
    type Results;
    type Residue;

    fn count(&mut self, responses: &[Vec<Choice>]) -> Result<(), CountError>;

    fn results(&self) -> Result<&Self::Results, CountError>;

    fn residue(&self) -> Result<&Self::Residue, CountError>;

    /// The leading choice of the final result.
    fn leader(&self) -> Result<Choice, CountError>;

    /// The trailing choice of the final result.
    fn trailer(&self) -> Result<Choice, CountError>;

    /// A human-readable explanation of the result, ending with a newline.
    fn interpret_result(&self) -> Result<String, CountError>;

    /// A human-readable explanation of the residue, ending with a newline.
    fn interpret_residue(&self) -> Result<String, CountError>;

    /// Fails if the count has not been run yet.
    fn is_ready(&self) -> Result<(), CountError>;
}

/// Shared bookkeeping: the outcome of a count, which is absent until the count ran.
#[derive(Eq, PartialEq, Debug, Clone)]
pub(crate) struct Outcome<R, D> {
    inner: Option<(R, D)>,
}

impl<R, D> Default for Outcome<R, D> {
    fn default() -> Self {
        Outcome { inner: None }
    }
}

impl<R, D> Outcome<R, D> {
    pub(crate) fn ensure_fresh(&self) -> Result<(), CountError> {
        if self.inner.is_some() {
            return Err(CountError::AlreadyCounted {});
        }
        Ok(())
    }

    pub(crate) fn set(&mut self, results: R, residue: D) {
        self.inner = Some((results, residue));
    }

    pub(crate) fn ready(&self) -> Result<(), CountError> {
        self.get().map(|_| ())
    }

    pub(crate) fn get(&self) -> Result<(&R, &D), CountError> {
        match &self.inner {
            Some((r, d)) => Ok((r, d)),
            None => Err(CountError::IncompleteCount {}),
        }
    }

    pub(crate) fn results(&self) -> Result<&R, CountError> {
        self.get().map(|(r, _)| r)
    }

    pub(crate) fn residue(&self) -> Result<&D, CountError> {
        self.get().map(|(_, d)| d)
    }
}
