// Ballots written in JSON.

use std::fs;

use log::debug;
use serde::Deserialize;
use snafu::prelude::*;

use crate::efcount::{
    config_reader::FileSource,
    io_common::{make_default_id, ParsedBallot},
    *,
};

// Either a bare list of labels, or a ballot with an id and a count.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonBallot {
    Labels(Vec<String>),
    Full {
        id: Option<String>,
        count: Option<u64>,
        choices: Vec<String>,
    },
}

/// The file holds an array of ballots.
pub fn read_json_ballots(path: &str, _cfs: &FileSource) -> EfResult<Vec<ParsedBallot>> {
    let default_id = make_default_id(path);
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let ballots: Vec<JsonBallot> =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    let res: Vec<ParsedBallot> = ballots
        .into_iter()
        .enumerate()
        .map(|(idx, jb)| match jb {
            JsonBallot::Labels(choices) => ParsedBallot {
                id: Some(default_id(idx + 1)),
                count: None,
                choices,
            },
            JsonBallot::Full { id, count, choices } => ParsedBallot {
                id: id.or_else(|| Some(default_id(idx + 1))),
                count,
                choices,
            },
        })
        .collect();
    debug!("read_json_ballots: {} ballots from {}", res.len(), path);
    Ok(res)
}
