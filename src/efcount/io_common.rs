use std::path::Path;

/// A ballot as read from a source, before its labels become choices.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ParsedBallot {
    pub id: Option<String>,
    /// The number of identical ballots. Missing means one.
    pub count: Option<u64>,
    /// The labels, in the order written on the ballot. May contain blanks.
    pub choices: Vec<String>,
}

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string())
}

/// Ballot ids made of the file name and the position in the file.
pub fn make_default_id(path: &str) -> impl Fn(usize) -> String {
    let simplified_file_name = simplify_file_name(path);
    move |lineno| format!("{}-{:08}", simplified_file_name, lineno)
}
