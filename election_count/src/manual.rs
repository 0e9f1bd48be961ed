/*!

This is the long-form manual for `election_count` and `efcount`.

## Running an election

```bash
efcount --config election.json --out summary.json
```

`efcount` prints a text report: the result, every round, the winners and the
spoiled responses with the reason they were set aside. With `--out`, a JSON
summary is also written (`--out stdout` prints it). With `--reference`, the
printed report is compared with the given file and the run fails if they differ.

Without a configuration, `--input ballots.csv` counts ranked ballots by instant
runoff, accepting any label as a choice.

## Input formats

### csv

One ballot per row. Each column (in order) from the first vote column is a
choice. Blank cells are skipped.

```text
id,count,choice 1,choice 2,choice 3,choice 4
id1,20,A,B,C,D
id2,20,A,C,B,
```

The `id` and `count` columns are optional, and so is the header row.
See the [configuration section](#configuration) on controlling the optional rows and columns.

### json

An array of ballots. A ballot is either a list of labels or an object with the
labels under `choices` and optionally an `id` and a `count`.

```text
[
  ["A", "B"],
  {"id": "b2", "count": 20, "choices": ["B", "C"]}
]
```

## Configuration

```text
{
  "outputSettings": { "contestName": "Capital of Tennessee" },
  "question": {
    "choices": ["Memphis", "Nashville", "Chattanooga", "Knoxville"],
    "responseFormat": "rankAllInOrderOfPreference",
    "countMethod": "instantRunoffVoting"
  },
  "ballotSources": [
    { "provider": "csv", "filePath": "tennessee.csv", "firstVoteRowIndex": 2,
      "countColumnIndex": 2, "firstVoteColumnIndex": 3 }
  ]
}
```

`outputSettings`:
 - `contestName` (string): the name shown in the report.
 - `contestDate`, `contestJurisdiction`, `contestOffice` (string, optional): echoed in the summary.

`question`:
 - `choices` (array of strings, optional): the legal choices, in the order used to break ties.
   Without it, write-ins are accepted and registered in the order they are read.
 - `responseFormat`: `chooseExactly`, `chooseNoMoreThan` (with `maxChoices`),
   `rankInOrderOfPreference`, `rankAllInOrderOfPreference`,
   `rankNoMoreThanInOrderOfPreference` (with `maxChoices`).
   `ratings`, `budget` (with `maxRating`), `pairwise` and `allPossiblePairwise` are
   understood but no counting method reads them.
 - `countMethod`: `firstPastThePost` (selections only), `instantRunoffVoting`, `coombs`,
   `contingentVote`, `bucklin`, `traditionalBorda`, `kiribatiBorda` (with `fieldSize`,
   defaulting to the number of choices), `nauruBorda`, `modifiedBorda`,
   `singleTransferableVote` (with `numberOfSeats`, default 1, and `redistributor`).
 - `redistributor`: `identity` (default), `nthSubset` (with `redistributorStep`),
   `cincinnati`, `hareRandom`.

`ballotSources`, one entry per file:
 - `provider`: `csv` or `json`.
 - `filePath`: relative to the configuration file.
 - `firstVoteColumnIndex`, `firstVoteRowIndex`, `idColumnIndex`, `countColumnIndex`
   (number, numeric string or spreadsheet column name such as `C`, optional):
   positions starting at 1. Without a count column, every ballot counts once.

## Tie-breaks

Whenever two choices have the same score, the one registered first leads and
the one registered last trails. Declared choices are registered in the order
of `choices`, before any write-in.

## Not supported

The Gregory, Wright, Meek and Warren redistributions and the Baldwin and Nanson
methods are recognized and rejected: their exact definitions are still open.

 */
