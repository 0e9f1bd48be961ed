use log::{debug, info, warn};

use election_count::builder::Builder;
use election_count::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::efcount::config_reader::*;
use crate::efcount::io_common::ParsedBallot;

pub mod config_reader;
pub mod io_common;
pub mod io_csv;
pub mod io_json;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum EfError {
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON: {source}"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Expected a positive index"))]
    ParsingJsonNumber {},
    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error parsing CSV line {lineno}"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display("CSV line {lineno} is too short"))]
    CsvLineTooShort { lineno: usize },
    #[snafu(display("CSV line {lineno}: {cell:?} is not a count"))]
    CsvBadCount { lineno: usize, cell: String },
    #[snafu(display("Ballot {id:?}: a count of {count} is too large"))]
    CountTooLarge { id: Option<String>, count: u64 },
    #[snafu(display("Invalid question: {source}"))]
    InvalidQuestion { source: ConfigurationError },
    #[snafu(display("Counting failed: {source}"))]
    Counting { source: CountError },
    #[snafu(display("Error writing {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type EfResult<T> = Result<T, EfError>;

fn round_stats_to_json(stats: &[RoundStats]) -> Vec<JSValue> {
    let mut l: Vec<JSValue> = Vec::new();
    for round_stat in stats.iter() {
        let mut tally: JSMap<String, JSValue> = JSMap::new();
        for (name, score) in round_stat.tally.iter() {
            tally.insert(name.clone(), json!(score));
        }
        let mut tally_results: Vec<JSValue> = Vec::new();
        for name in round_stat.elected.iter() {
            tally_results.push(json!({ "elected": name }));
        }
        for name in round_stat.eliminated.iter() {
            tally_results.push(json!({ "eliminated": name }));
        }
        l.push(json!({
            "round": round_stat.round,
            "tally": tally,
            "tallyResults": tally_results,
        }));
    }
    l
}

fn build_summary_js(
    config: &EfConfig,
    question: &Question,
    resolution: &Resolution,
) -> EfResult<JSValue> {
    let quota = match &resolution.counter {
        Counter::SingleTransferableVote(cm) => {
            Some(cm.results().context(CountingSnafu)?.quota.to_string())
        }
        _ => None,
    };
    let c = OutputConfig {
        contest: config.output_settings.contest_name.clone(),
        date: config.output_settings.contest_date.clone(),
        jurisdiction: config.output_settings.contest_jurisdiction.clone(),
        office: config.output_settings.contest_office.clone(),
        response_format: question.format().name(),
        count_method: question.method().name().to_string(),
        quota,
    };
    let stats = resolution.counter.round_stats().context(CountingSnafu)?;
    let winners: Vec<String> = resolution
        .counter
        .winners()
        .context(CountingSnafu)?
        .iter()
        .map(|c| c.to_string())
        .collect();
    Ok(json!({
        "config": c,
        "validResponses": resolution.valid,
        "spoiledResponses": resolution.spoiled.len(),
        "winners": winners,
        "results": round_stats_to_json(&stats)
    }))
}

fn describe_response(response: &Response) -> String {
    match response {
        Response::Selection(cs) | Response::Ranking(cs) => cs
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<String>>()
            .join(", "),
        Response::Ratings(rs) => rs
            .iter()
            .map(|(c, r)| format!("{}={}", c, r))
            .collect::<Vec<String>>()
            .join(", "),
        Response::Pairs(ps) => ps
            .iter()
            .map(|(h, l)| format!("{}>{}", h, l))
            .collect::<Vec<String>>()
            .join(", "),
    }
}

/// The text report printed by the tool.
fn build_report(config: &EfConfig, resolution: &Resolution) -> EfResult<String> {
    let counter = &resolution.counter;
    let mut report = format!("Contest: {}\n", config.output_settings.contest_name);
    report.push_str(&format!(
        "{} valid responses, {} spoiled\n",
        resolution.valid,
        resolution.spoiled.len()
    ));
    report.push_str("\nResult:\n");
    report.push_str(&counter.interpret_result().context(CountingSnafu)?);
    report.push_str("\nRounds:\n");
    report.push_str(&counter.interpret_residue().context(CountingSnafu)?);
    let winners: Vec<String> = counter
        .winners()
        .context(CountingSnafu)?
        .iter()
        .map(|c| c.to_string())
        .collect();
    report.push_str(&format!("\nWinners: {}\n", winners.join(", ")));
    if !resolution.spoiled.is_empty() {
        report.push_str("\nSpoiled responses:\n");
        for sb in resolution.spoiled.iter() {
            report.push_str(&format!(
                "[{}]: {}\n",
                describe_response(&sb.response),
                sb.reason
            ));
        }
    }
    Ok(report)
}

fn read_ballots(root_path: &Path, cfs: &FileSource) -> EfResult<Vec<ParsedBallot>> {
    let p: PathBuf = root_path.join(&cfs.file_path);
    let p2 = p.as_path().display().to_string();
    info!("Attempting to read ballot file {:?}", p2);
    match cfs.provider.as_str() {
        "csv" => io_csv::read_csv_ranking(&p2, cfs),
        "json" => io_json::read_json_ballots(&p2, cfs),
        x => whatever!("Provider not implemented {:?}", x),
    }
}

/// Runs one election.
///
/// config_path: the election description. Without it, the ballots of
/// `override_input_path` are counted by instant runoff.
/// check_summary_path: a reference report. The run fails if the report
/// differs from it.
/// override_out_path: where to write the JSON summary, or `stdout`.
///
/// Returns the text report, which is also printed.
pub fn run_election(
    config_path: Option<String>,
    check_summary_path: Option<String>,
    override_out_path: Option<String>,
    override_input_path: Option<String>,
    override_input_type: Option<String>,
) -> EfResult<String> {
    let (mut config, mut root_p): (EfConfig, PathBuf) = match config_path {
        Some(config_path) => {
            let config = read_config(&config_path)?;
            let root_p = Path::new(config_path.as_str())
                .parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_default();
            (config, root_p)
        }
        None => {
            let input = match override_input_path.clone() {
                Some(x) => x,
                None => whatever!("An input file is required when no configuration is given"),
            };
            let config = EfConfig {
                output_settings: OutputSettings {
                    contest_name: io_common::simplify_file_name(&input),
                    contest_date: None,
                    contest_jurisdiction: None,
                    contest_office: None,
                },
                question: QuestionConfig::default_ranked(),
                ballot_sources: vec![],
            };
            (config, PathBuf::new())
        }
    };
    if let Some(input) = override_input_path {
        let provider = override_input_type.unwrap_or_else(|| "csv".to_string());
        info!("Replacing the ballot sources with {} ({})", input, provider);
        config.ballot_sources = vec![FileSource::new(&provider, &input)];
        // Relative to the working directory, not to the configuration.
        root_p = PathBuf::new();
    }
    info!("config: {:?}", config);

    if config.ballot_sources.is_empty() {
        whatever!("No ballot sources in the configuration");
    }

    let format = validate_format(&config.question)?;
    let method = validate_method(&config.question)?;
    let mut builder = Builder::new(format, method).context(InvalidQuestionSnafu)?;
    if let Some(choices) = config.question.choices.as_ref() {
        builder = builder.choices(choices).context(InvalidQuestionSnafu)?;
    }

    for cfs in config.ballot_sources.iter() {
        for pb in read_ballots(&root_p, cfs)? {
            let count = pb.count.unwrap_or(1);
            if count == 0 {
                debug!("Skipping ballot {:?}: count of zero", pb.id);
                continue;
            }
            let repeat = u32::try_from(count)
                .ok()
                .context(CountTooLargeSnafu { id: pb.id.clone(), count })?;
            builder.add_response(&pb.choices, repeat);
        }
    }
    info!("{} responses read", builder.len());

    let question = builder.question().clone();
    let resolution = builder.resolve().context(CountingSnafu)?;

    let report = build_report(&config, &resolution)?;
    print!("{}", report);

    let summary = build_summary_js(&config, &question, &resolution)?;
    let pretty_js_stats = serde_json::to_string_pretty(&summary).context(ParsingJsonSnafu {})?;
    match override_out_path.as_deref() {
        Some("stdout") => println!("{}", pretty_js_stats),
        Some(path) => {
            info!("Writing summary to {}", path);
            fs::write(path, &pretty_js_stats).context(WritingOutputSnafu { path })?;
        }
        None => {}
    }

    // The reference report, if provided for comparison
    if let Some(summary_p) = check_summary_path {
        let reference =
            fs::read_to_string(summary_p.as_str()).context(OpeningJsonSnafu { path: summary_p })?;
        if reference != report {
            warn!("Found differences with the reference report");
            print_diff(reference.as_str(), report.as_str(), "\n");
            whatever!("Difference detected between the report and the reference report")
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, contents: &str) -> String {
        let p = dir.join(name);
        let mut f = fs::File::create(&p).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        p.display().to_string()
    }

    fn tennessee_csv() -> String {
        let mut s = String::from("id,count,r1,r2,r3,r4\n");
        s.push_str("m,42,Memphis,Nashville,Chattanooga,Knoxville\n");
        s.push_str("n,26,Nashville,Chattanooga,Knoxville,Memphis\n");
        s.push_str("c,15,Chattanooga,Knoxville,Nashville,Memphis\n");
        s.push_str("k,17,Knoxville,Chattanooga,Nashville,Memphis\n");
        s
    }

    fn tennessee_config(method: &str) -> String {
        json!({
            "outputSettings": { "contestName": "Capital of Tennessee" },
            "question": {
                "choices": ["Memphis", "Nashville", "Chattanooga", "Knoxville"],
                "responseFormat": "rankAllInOrderOfPreference",
                "countMethod": method
            },
            "ballotSources": [{
                "provider": "csv",
                "filePath": "tennessee.csv",
                "firstVoteRowIndex": 2,
                "idColumnIndex": 1,
                "countColumnIndex": 2,
                "firstVoteColumnIndex": 3
            }]
        })
        .to_string()
    }

    #[test]
    fn irv_from_config() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "tennessee.csv", &tennessee_csv());
        let config = write_file(
            dir.path(),
            "config.json",
            &tennessee_config("instantRunoffVoting"),
        );
        let out = dir.path().join("summary.json").display().to_string();
        let report = run_election(Some(config), None, Some(out.clone()), None, None).unwrap();
        assert!(report.starts_with("Contest: Capital of Tennessee\n100 valid responses, 0 spoiled\n"));
        assert!(report.contains("Knoxville got 58 of 100 votes (58.00%)\n"));
        assert!(report.contains("\nWinners: Knoxville\n"));

        let summary: JSValue =
            serde_json::from_str(&fs::read_to_string(out).unwrap()).unwrap();
        assert_eq!(summary["winners"], json!(["Knoxville"]));
        assert_eq!(summary["results"].as_array().unwrap().len(), 3);
        assert_eq!(summary["results"][0]["tally"]["Memphis"], json!("42"));
        assert_eq!(
            summary["results"][0]["tallyResults"],
            json!([{ "eliminated": "Chattanooga" }])
        );
        assert_eq!(summary["config"]["countMethod"], json!("instant runoff voting"));
    }

    #[test]
    fn reference_report() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "tennessee.csv", &tennessee_csv());
        let config = write_file(dir.path(), "config.json", &tennessee_config("coombs"));
        let report = run_election(Some(config.clone()), None, None, None, None).unwrap();
        assert!(report.contains("\nWinners: Nashville\n"));

        let good = write_file(dir.path(), "good.txt", &report);
        assert!(run_election(Some(config.clone()), Some(good), None, None, None).is_ok());

        let bad = write_file(dir.path(), "bad.txt", &report.replace("Nashville", "Memphis"));
        assert!(matches!(
            run_election(Some(config), Some(bad), None, None, None),
            Err(EfError::Whatever { .. })
        ));
    }

    #[test]
    fn json_input_without_config() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_file(
            dir.path(),
            "ballots.json",
            r#"[["A", "B"], ["B"], {"count": 2, "choices": ["B", "A"]}, ["A", "A"]]"#,
        );
        let report =
            run_election(None, None, None, Some(input), Some("json".to_string())).unwrap();
        assert!(report.starts_with("Contest: ballots.json\n4 valid responses, 1 spoiled\n"));
        // B has 3 of the 4 valid ballots.
        assert!(report.contains("\nWinners: B\n"));
        assert!(report.contains("\nSpoiled responses:\n[A, A]: duplicate choices are not allowed\n"));
    }

    #[test]
    fn oversized_count_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_file(
            dir.path(),
            "ballots.json",
            r#"[{"id": "big", "count": 4294967296, "choices": ["A"]}, ["B"]]"#,
        );
        assert!(matches!(
            run_election(None, None, None, Some(input), Some("json".to_string())),
            Err(EfError::CountTooLarge { count: 4294967296, .. })
        ));
    }

    #[test]
    fn stv_summary_has_quota() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "tennessee.csv", &tennessee_csv());
        let mut js: JSValue = serde_json::from_str(&tennessee_config("singleTransferableVote")).unwrap();
        js["question"]["numberOfSeats"] = json!(2);
        js["question"]["redistributor"] = json!("cincinnati");
        let config = write_file(dir.path(), "config.json", &js.to_string());
        let out = dir.path().join("summary.json").display().to_string();
        run_election(Some(config), None, Some(out.clone()), None, None).unwrap();
        let summary: JSValue =
            serde_json::from_str(&fs::read_to_string(out).unwrap()).unwrap();
        assert_eq!(summary["config"]["quota"], json!("34"));
        assert_eq!(summary["winners"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn invalid_questions() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "tennessee.csv", &tennessee_csv());
        let config = write_file(dir.path(), "config.json", &tennessee_config("nanson"));
        assert!(matches!(
            run_election(Some(config), None, None, None, None),
            Err(EfError::InvalidQuestion {
                source: ConfigurationError::Unsupported { .. }
            })
        ));
        let config = write_file(dir.path(), "config2.json", &tennessee_config("plurality"));
        assert!(run_election(Some(config), None, None, None, None).is_err());
        assert!(matches!(
            run_election(None, None, None, None, None),
            Err(EfError::Whatever { .. })
        ));
    }
}
