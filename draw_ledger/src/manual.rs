/*!

This is the long-form manual for `draw_ledger` and `luckydraw`.

## Concepts

* **Participants**: a table loaded once from a file. Every row is one
  participant, every column a piece of information about them (name, email,
  ticket number...). Two rows with exactly the same values in every column are
  the same participant.
* **Draw**: one random selection of a fixed number of winners, identified by a
  name such as `Round A` or `Grand prize`. Within a draw, nobody wins twice.
* **Ledger**: the list of all the winners of the session, each tagged with the
  name of the draw that selected them. Draws that reuse a name are merged.
* **Exclude previous winners**: when turned on for a draw, every participant
  already in the ledger is removed from the pool before drawing.

If the pool is too small for the requested number of winners, the draw is
refused and nothing is recorded.

## Input formats

The following formats are supported:
* `csv` Comma Separated Values, with a header row
* `xlsx` Excel workbook: the first row of the worksheet is the header
* `gsheet` a Google Sheet shared publicly, given by its URL

### `csv`

The first record holds the column names. A cell is read as a number or a
boolean only if it is written exactly as `luckydraw` would write it back
(`42`, `2.5`, `true`). Everything else is kept as text: `007` stays `007`.
A leading apostrophe forces text: `'42` is the text `42`. Result files write
text that way whenever it would otherwise read back as a number or a boolean.

### `xlsx`

The first worksheet is used, unless `--excel-worksheet-name` is given.
Whole numbers are read as integers.

### `gsheet`

The URL must contain the sheet identifier and the `gid` of the tab, as in
`https://docs.google.com/spreadsheets/d/<id>/edit#gid=0`. The tab is
downloaded in CSV form.

## Outputs

Each export is available as CSV or XLSX. By default the format follows the
input: spreadsheets produce spreadsheets, everything else produces CSV.

* the latest draw: `<input name>_result.csv`, participant columns only;
* each draw: `<draw name>.csv`, with a leading `Draw` column;
* all the draws: `All Draws.csv`, sorted by draw name, with a leading `Draw`
  column.

Characters that are not allowed in file names (`< > : " / \ | ? *`) are
replaced by `_`.

## Command line

```bash
luckydraw -i members.xlsx -n 3 --name "Round A" --name "Round B" \
  --exclude-previous --out results/
```

draws 3 winners for `Round A`, then 3 other winners for `Round B`, and writes
the result files to `results/`.

## Draw plans

A draw plan describes a whole session in JSON and is passed with `--config`.

```json
{
  "outputSettings": {
    "outputDirectory": "results",
    "format": "xlsx",
    "exportEachDraw": true,
    "exportLedger": true,
    "exportLatest": false
  },
  "participantSources": [
    { "provider": "csv", "filePath": "members.csv" }
  ],
  "draws": [
    { "name": "Round A", "count": 3 },
    { "name": "Round B", "count": 3, "excludePrevious": true }
  ]
}
```

Paths are relative to the plan file. When several sources are listed, they
must all have the same columns and their rows are concatenated.

*/
