use std::fs;

use election_count::{CountMethodKind, RedistributorKind, ResponseFormat};
use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;
use snafu::prelude::*;

use crate::efcount::*;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "contestName")]
    pub contest_name: String,
    #[serde(rename = "contestDate")]
    pub contest_date: Option<String>,
    #[serde(rename = "contestJurisdiction")]
    pub contest_jurisdiction: Option<String>,
    #[serde(rename = "contestOffice")]
    pub contest_office: Option<String>,
}

/// The description of the contest, as echoed in the summary.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub contest: String,
    pub date: Option<String>,
    pub jurisdiction: Option<String>,
    pub office: Option<String>,
    #[serde(rename = "responseFormat")]
    pub response_format: String,
    #[serde(rename = "countMethod")]
    pub count_method: String,
    pub quota: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FileSource {
    /// `csv` or `json`
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "firstVoteColumnIndex")]
    pub first_vote_column_index: Option<JSValue>,
    #[serde(rename = "firstVoteRowIndex")]
    pub first_vote_row_index: Option<JSValue>,
    #[serde(rename = "idColumnIndex")]
    pub id_column_index: Option<JSValue>,
    #[serde(rename = "countColumnIndex")]
    pub count_column_index: Option<JSValue>,
}

impl FileSource {
    pub fn new(provider: &str, file_path: &str) -> FileSource {
        FileSource {
            provider: provider.to_string(),
            file_path: file_path.to_string(),
            first_vote_column_index: None,
            first_vote_row_index: None,
            id_column_index: None,
            count_column_index: None,
        }
    }

    // All the indexes are written starting at 1, and returned starting at 0.

    pub fn first_vote_column_index(&self) -> EfResult<usize> {
        Ok(read_js_index(&self.first_vote_column_index)?.unwrap_or(0))
    }

    pub fn first_vote_row_index(&self) -> EfResult<usize> {
        Ok(read_js_index(&self.first_vote_row_index)?.unwrap_or(0))
    }

    pub fn id_column_index_int(&self) -> EfResult<Option<usize>> {
        read_js_index(&self.id_column_index)
    }

    pub fn count_column_index_int(&self) -> EfResult<Option<usize>> {
        read_js_index(&self.count_column_index)
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct QuestionConfig {
    /// The legal choices. Without them, write-ins are accepted.
    pub choices: Option<Vec<String>>,
    #[serde(rename = "responseFormat")]
    pub response_format: String,
    /// For the formats that limit the number of choices.
    #[serde(rename = "maxChoices")]
    pub max_choices: Option<u32>,
    /// The maximum rating, or the budget.
    #[serde(rename = "maxRating")]
    pub max_rating: Option<u32>,
    #[serde(rename = "countMethod")]
    pub count_method: String,
    /// For the Borda counts that need one. Defaults to the number of choices.
    #[serde(rename = "fieldSize")]
    pub field_size: Option<u32>,
    #[serde(rename = "numberOfSeats")]
    pub number_of_seats: Option<u32>,
    pub redistributor: Option<String>,
    #[serde(rename = "redistributorStep")]
    pub redistributor_step: Option<u32>,
}

impl QuestionConfig {
    /// Ranked ballots counted by instant runoff, any choice accepted.
    pub fn default_ranked() -> QuestionConfig {
        QuestionConfig {
            choices: None,
            response_format: "rankInOrderOfPreference".to_string(),
            max_choices: None,
            max_rating: None,
            count_method: "instantRunoffVoting".to_string(),
            field_size: None,
            number_of_seats: None,
            redistributor: None,
            redistributor_step: None,
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct EfConfig {
    #[serde(rename = "outputSettings")]
    pub output_settings: OutputSettings,
    pub question: QuestionConfig,
    #[serde(rename = "ballotSources")]
    pub ballot_sources: Vec<FileSource>,
}

pub fn read_config(path: &str) -> EfResult<EfConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})
}

fn required(x: Option<u32>, what: &str, name: &str) -> EfResult<usize> {
    match x {
        Some(n) => Ok(n as usize),
        None => whatever!("{} requires {}", name, what),
    }
}

pub fn validate_format(q: &QuestionConfig) -> EfResult<ResponseFormat> {
    let name = q.response_format.as_str();
    let res = match name {
        "chooseExactly" => ResponseFormat::ChooseExactly(required(q.max_choices, "maxChoices", name)?),
        "chooseNoMoreThan" => {
            ResponseFormat::ChooseNoMoreThan(required(q.max_choices, "maxChoices", name)?)
        }
        "rankInOrderOfPreference" => ResponseFormat::RankInOrderOfPreference,
        "rankAllInOrderOfPreference" => ResponseFormat::RankAllInOrderOfPreference,
        "rankNoMoreThanInOrderOfPreference" => ResponseFormat::RankNoMoreThanInOrderOfPreference(
            required(q.max_choices, "maxChoices", name)?,
        ),
        "ratings" => ResponseFormat::Ratings(required(q.max_rating, "maxRating", name)? as u32),
        "budget" => ResponseFormat::Budget(required(q.max_rating, "maxRating", name)? as u32),
        "pairwise" => ResponseFormat::Pairwise,
        "allPossiblePairwise" => ResponseFormat::AllPossiblePairwise,
        x => whatever!("unknown response format: {}", x),
    };
    Ok(res)
}

pub fn validate_redistributor(q: &QuestionConfig) -> EfResult<RedistributorKind> {
    let res = match q.redistributor.as_deref() {
        None | Some("identity") => RedistributorKind::Identity,
        Some("nthSubset") => RedistributorKind::NthSubset(required(
            q.redistributor_step,
            "redistributorStep",
            "nthSubset",
        )?),
        Some("cincinnati") => RedistributorKind::Cincinnati,
        Some("hareRandom") => RedistributorKind::HareRandom,
        Some("gregory") => RedistributorKind::Gregory,
        Some("wright") => RedistributorKind::Wright,
        Some("meek") => RedistributorKind::Meek,
        Some("warren") => RedistributorKind::Warren,
        Some(x) => whatever!("unknown redistributor: {}", x),
    };
    Ok(res)
}

pub fn validate_method(q: &QuestionConfig) -> EfResult<CountMethodKind> {
    let declared = q.choices.as_ref().map(|cs| cs.len() as u32);
    let field_size = |name: &str| required(q.field_size.or(declared), "fieldSize or choices", name);
    let res = match q.count_method.as_str() {
        "firstPastThePost" => CountMethodKind::FirstPastThePost,
        "instantRunoffVoting" => CountMethodKind::InstantRunoffVoting,
        "coombs" => CountMethodKind::CoombsMethod,
        "contingentVote" => CountMethodKind::ContingentVote,
        "bucklin" => CountMethodKind::Bucklin,
        "traditionalBorda" => CountMethodKind::TraditionalBorda {
            field_size: field_size("traditionalBorda")?,
        },
        "nauruBorda" => CountMethodKind::NauruBorda,
        "kiribatiBorda" => CountMethodKind::KiribatiBorda {
            field_size: field_size("kiribatiBorda")?,
        },
        "modifiedBorda" => CountMethodKind::ModifiedBorda,
        "singleTransferableVote" => CountMethodKind::SingleTransferableVote {
            seats: q.number_of_seats.unwrap_or(1),
            redistributor: validate_redistributor(q)?,
        },
        "baldwin" => CountMethodKind::Baldwin,
        "nanson" => CountMethodKind::Nanson,
        x => whatever!("unknown count method: {}", x),
    };
    Ok(res)
}

/// Reads a column or row index starting at 1, either as a number or as a
/// spreadsheet column name (A, B, ..., Z, AA, ...). Returns it starting at 0.
pub fn read_js_index(x: &Option<JSValue>) -> EfResult<Option<usize>> {
    let one_based: usize = match x {
        None => return Ok(None),
        Some(JSValue::Number(n)) => n
            .as_u64()
            .map(|x| x as usize)
            .context(ParsingJsonNumberSnafu {})?,
        Some(JSValue::String(s)) if !s.is_empty() && s.chars().all(|c| c.is_ascii_alphabetic()) => s
            .to_ascii_lowercase()
            .chars()
            .fold(0, |acc, c| acc * 26 + (c as usize - 'a' as usize + 1)),
        Some(JSValue::String(s)) => s
            .parse::<usize>()
            .ok()
            .context(ParsingJsonNumberSnafu {})?,
        _ => return None.context(ParsingJsonNumberSnafu {}),
    };
    one_based
        .checked_sub(1)
        .map(Some)
        .context(ParsingJsonNumberSnafu {})
}
