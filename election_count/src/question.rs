use log::{debug, info, warn};
use snafu::ResultExt;

use crate::choice::{Choice, Field};
use crate::config::*;
use crate::counter::Counter;
use crate::format::ResponseFormat;

/// A question of an election: the legal choices, the format the responses
/// must follow and how they are counted.
#[derive(Debug, Clone)]
pub struct Question {
    field: Option<Field>,
    format: ResponseFormat,
    method: CountMethodKind,
}

/// The outcome of counting the responses to one question.
#[derive(Debug)]
pub struct Resolution {
    /// Already counted.
    pub counter: Counter,
    /// The responses that failed validation, in the order they were given.
    pub spoiled: Vec<SpoiledBallot>,
    /// The number of responses that were counted.
    pub valid: usize,
}

impl Question {
    /// Fails if the counting method cannot read the responses of this format,
    /// or if the counting method itself is not valid.
    ///
    /// First past the post counts selections. All the other methods count
    /// rankings. No method counts ratings or pairs.
    pub fn new(
        field: Option<Field>,
        format: ResponseFormat,
        method: CountMethodKind,
    ) -> Result<Question, ConfigurationError> {
        let expected = if method.is_ranked() {
            "ranking"
        } else {
            "selection"
        };
        snafu::ensure!(
            format.shape() == expected,
            IncompatibleFormatSnafu {
                format: format.name(),
                method: method.name(),
            }
        );
        // Constructs and drops a counter, to report its errors now.
        Counter::from_kind(method)?;
        Ok(Question {
            field,
            format,
            method,
        })
    }

    pub fn field(&self) -> Option<&Field> {
        self.field.as_ref()
    }

    pub fn format(&self) -> ResponseFormat {
        self.format
    }

    pub fn method(&self) -> CountMethodKind {
        self.method
    }

    pub fn validate(&self, response: &Response) -> Result<(), ResponseFormatError> {
        self.format.validate(response, self.field.as_ref())
    }

    /// Validates all the responses, sets aside the spoiled ones and counts the
    /// others.
    ///
    /// A spoiled response only affects this question. It never stops the
    /// validation of the other responses.
    pub fn resolve(
        &self,
        responses: impl IntoIterator<Item = Response>,
    ) -> Result<Resolution, CountError> {
        let mut spoiled: Vec<SpoiledBallot> = Vec::new();
        let mut valid: Vec<Vec<Choice>> = Vec::new();
        for (idx, response) in responses.into_iter().enumerate() {
            match self.validate(&response) {
                Ok(()) => {
                    if let Some(cs) = response.choices() {
                        valid.push(cs.to_vec());
                    }
                }
                Err(reason) => {
                    warn!("response {} spoiled: {}", idx, reason);
                    debug!("spoiled response {}: {:?}", idx, response);
                    spoiled.push(SpoiledBallot { response, reason });
                }
            }
        }
        info!(
            "{} valid responses, {} spoiled for {} / {}",
            valid.len(),
            spoiled.len(),
            self.format.name(),
            self.method.name()
        );
        let mut counter = Counter::from_kind(self.method).context(InvalidConfigurationSnafu)?;
        counter.count(&valid)?;
        Ok(Resolution {
            counter,
            spoiled,
            valid: valid.len(),
        })
    }
}
