use log::debug;

use crate::choice::{Choice, ChoiceRegistry, Field};
use crate::config::*;
use crate::format::ResponseFormat;
use crate::question::{Question, Resolution};

/// A builder for adding responses given as labels.
///
/// Labels are turned into choices with a registry: the declared choices are
/// registered first, in order, so that they come first in tie-breaks. Other
/// labels are write-ins, registered in the order they are first seen.
///
/// ```
/// use election_count::builder::Builder;
/// use election_count::{CountMethodKind, ResponseFormat};
///
/// let mut builder = Builder::new(
///     ResponseFormat::RankInOrderOfPreference,
///     CountMethodKind::InstantRunoffVoting,
/// )?
/// .choices(&["Anna".to_string(), "Bob".to_string()])?;
///
/// builder.add_response_simple(&["Anna".to_string(), "Bob".to_string(), "".to_string()]);
/// builder.add_response(&["Bob".to_string()], 2);
///
/// let resolution = builder.resolve()?;
/// assert_eq!(resolution.counter.leader()?.label(), "Bob");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct Builder {
    registry: ChoiceRegistry,
    question: Question,
    responses: Vec<Response>,
}

impl Builder {
    pub fn new(format: ResponseFormat, method: CountMethodKind) -> Result<Builder, ConfigurationError> {
        Ok(Builder {
            registry: ChoiceRegistry::new(),
            question: Question::new(None, format, method)?,
            responses: Vec::new(),
        })
    }

    /// Declares the legal choices. Without them, any label is accepted.
    /// The responses added before are dropped.
    pub fn choices(mut self, labels: &[String]) -> Result<Builder, ConfigurationError> {
        self.registry = ChoiceRegistry::new();
        self.responses.clear();
        let mut declared: Vec<Choice> = Vec::new();
        for label in labels {
            snafu::ensure!(
                self.registry.lookup(label).is_none(),
                InvalidParameterSnafu {
                    message: format!("choice {:?} declared twice", label)
                }
            );
            declared.push(self.registry.intern(label));
        }
        self.question = Question::new(
            Some(Field::new(declared)),
            self.question.format(),
            self.question.method(),
        )?;
        Ok(self)
    }

    pub fn question(&self) -> &Question {
        &self.question
    }

    pub fn registry(&self) -> &ChoiceRegistry {
        &self.registry
    }

    /// Adds one response.
    pub fn add_response_simple(&mut self, labels: &[String]) {
        self.add_response(labels, 1)
    }

    /// Adds a response `count` times.
    ///
    /// labels: the choices of the voter, in order. Blank labels are skipped.
    /// The response is a ranking or a selection, following the format of the
    /// question.
    pub fn add_response(&mut self, labels: &[String], count: u32) {
        let choices: Vec<Choice> = labels
            .iter()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .map(|l| self.registry.intern(l))
            .collect();
        debug!("add_response: {:?} x{}", choices, count);
        let response = if self.question.format().shape() == "ranking" {
            Response::Ranking(choices)
        } else {
            Response::Selection(choices)
        };
        for _ in 0..count {
            self.responses.push(response.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    /// Validates and counts all the responses added so far.
    pub fn resolve(self) -> Result<Resolution, CountError> {
        self.question.resolve(self.responses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(ls: &[&str]) -> Vec<String> {
        ls.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn declared_choices_come_first() {
        let mut b = Builder::new(
            ResponseFormat::RankInOrderOfPreference,
            CountMethodKind::InstantRunoffVoting,
        )
        .unwrap()
        .choices(&labels(&["A", "B"]))
        .unwrap();
        b.add_response_simple(&labels(&["C", "A"]));
        let reg = b.registry();
        assert!(reg.lookup("A").unwrap().id() < reg.lookup("C").unwrap().id());
        // C is not declared: the response is spoiled.
        let resolution = b.resolve().unwrap();
        assert_eq!(resolution.spoiled.len(), 1);
        assert_eq!(resolution.valid, 0);
    }

    #[test]
    fn duplicate_declaration() {
        let res = Builder::new(
            ResponseFormat::ChooseExactly(1),
            CountMethodKind::FirstPastThePost,
        )
        .unwrap()
        .choices(&labels(&["A", "A"]));
        assert!(matches!(
            res,
            Err(ConfigurationError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn write_ins_and_counts() {
        let mut b = Builder::new(
            ResponseFormat::ChooseNoMoreThan(1),
            CountMethodKind::FirstPastThePost,
        )
        .unwrap();
        b.add_response(&labels(&["Zed"]), 3);
        b.add_response(&labels(&[" Amy ", ""]), 2);
        assert_eq!(b.len(), 5);
        let resolution = b.resolve().unwrap();
        assert_eq!(resolution.valid, 5);
        assert_eq!(resolution.counter.leader().unwrap().label(), "Zed");
    }
}
