use std::io::{Read, Write};

use csv::StringRecord;

use prep_util::prettyprint_usize;

use crate::configuration::Mode;
use crate::error::{require_file, Error};

const FROM_COLUMN: &str = "geo_code1";
const TO_COLUMN: &str = "geo_code2";

/// Rewrites a trip table with `geo_code1`, `geo_code2`, and per-mode count columns into a
/// `from,to,count` table, taking `count` from the `mode` column. The header is checked before the
/// output file is created. Returns the number of rows.
pub fn convert_trip_table(input: &str, output: &str, mode: &Mode) -> Result<usize, Error> {
    require_file(input)?;
    let mut reader = csv::Reader::from_path(input).map_err(|err| csv_error(input, err))?;
    let columns = Columns::find(
        reader.headers().map_err(|err| csv_error(input, err))?,
        mode,
        input,
    )?;

    prep_io::create_parent_dir(output).map_err(|err| Error::io(output, err))?;
    let mut writer = csv::Writer::from_path(output).map_err(|err| csv_error(output, err))?;
    let num_rows = copy_rows(&mut reader, &mut writer, &columns, input, output)?;
    info!(
        "Wrote {} trip rows ({} counts) to {}",
        prettyprint_usize(num_rows),
        mode,
        output
    );
    Ok(num_rows)
}

/// Like `convert_trip_table`, but between any reader and writer. `input` and `output` only
/// describe errors.
pub fn convert_trips<R: Read, W: Write>(
    reader: R,
    writer: W,
    mode: &Mode,
    input: &str,
    output: &str,
) -> Result<usize, Error> {
    let mut reader = csv::Reader::from_reader(reader);
    let columns = Columns::find(
        reader.headers().map_err(|err| csv_error(input, err))?,
        mode,
        input,
    )?;
    let mut writer = csv::Writer::from_writer(writer);
    copy_rows(&mut reader, &mut writer, &columns, input, output)
}

/// Positions of the columns we copy
struct Columns {
    from: usize,
    to: usize,
    count: usize,
}

impl Columns {
    fn find(headers: &StringRecord, mode: &Mode, path: &str) -> Result<Columns, Error> {
        // A repeated column is ambiguous
        let position = |column: &str| {
            let mut matches = headers
                .iter()
                .enumerate()
                .filter(|(_, header)| *header == column)
                .map(|(idx, _)| idx);
            match (matches.next(), matches.next()) {
                (Some(idx), None) => Ok(idx),
                (None, _) => Err(Error::MissingColumn {
                    path: path.to_string(),
                    column: column.to_string(),
                }),
                (Some(_), Some(_)) => Err(Error::malformed(
                    path,
                    format!("more than one {:?} column", column),
                )),
            }
        };
        Ok(Columns {
            from: position(FROM_COLUMN)?,
            to: position(TO_COLUMN)?,
            count: position(mode.column())?,
        })
    }
}

fn copy_rows<R: Read, W: Write>(
    reader: &mut csv::Reader<R>,
    writer: &mut csv::Writer<W>,
    columns: &Columns,
    input: &str,
    output: &str,
) -> Result<usize, Error> {
    writer
        .write_record(["from", "to", "count"])
        .map_err(|err| csv_error(output, err))?;
    let mut num_rows = 0;
    for rec in reader.records() {
        let rec = rec.map_err(|err| csv_error(input, err))?;
        // Headers were checked and rows must all be the same length, so these are present
        let cells = [
            &rec[columns.from],
            &rec[columns.to],
            &rec[columns.count],
        ];
        writer
            .write_record(cells)
            .map_err(|err| csv_error(output, err))?;
        num_rows += 1;
    }
    writer
        .flush()
        .map_err(|err| Error::io(output, err))?;
    Ok(num_rows)
}

fn csv_error(path: &str, err: csv::Error) -> Error {
    if err.is_io_error() {
        match err.into_kind() {
            csv::ErrorKind::Io(source) => Error::io(path, source),
            kind => Error::malformed(path, format!("{:?}", kind)),
        }
    } else {
        Error::malformed(path, err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert(input: &str, mode: &str) -> Result<String, Error> {
        let mut out = Vec::new();
        convert_trips(input.as_bytes(), &mut out, &mode.parse().unwrap(), "in", "out")?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn pick_bicycle() {
        assert_eq!(
            convert("geo_code1,geo_code2,bicycle,car\nA,B,5,10\n", "bicycle").unwrap(),
            "from,to,count\nA,B,5\n"
        );
    }

    #[test]
    fn pick_other_modes() {
        let input = "\
all_modes,car,geo_code2,geo_code1,bicycle
30,20,Z2,Z1,1
7,0,Z3,Z1,2
";
        assert_eq!(
            convert(input, "car").unwrap(),
            "from,to,count\nZ1,Z2,20\nZ1,Z3,0\n"
        );
        assert_eq!(
            convert(input, "all_modes").unwrap(),
            "from,to,count\nZ1,Z2,30\nZ1,Z3,7\n"
        );
    }

    #[test]
    fn counts_pass_through_as_text() {
        assert_eq!(
            convert("geo_code1,geo_code2,bicycle\nA,B,0.5\nB,A,\n", "bicycle").unwrap(),
            "from,to,count\nA,B,0.5\nB,A,\n"
        );
    }

    #[test]
    fn row_count_and_order_preserved() {
        let mut input = String::from("geo_code1,geo_code2,bicycle\n");
        for i in 0..100 {
            input.push_str(&format!("O{},D{},{}\n", i, 99 - i, i * 3));
        }
        let output = convert(&input, "bicycle").unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 101);
        assert_eq!(lines[0], "from,to,count");
        assert_eq!(lines[1], "O0,D99,0");
        assert_eq!(lines[100], "O99,D0,297");
    }

    #[test]
    fn missing_mode_column() {
        let tmp = tempfile::tempdir().unwrap();
        let input = tmp.path().join("od_raw.csv").display().to_string();
        let output = tmp.path().join("od.csv").display().to_string();
        fs_err::write(&input, "geo_code1,geo_code2,bicycle,car\nA,B,5,10\n").unwrap();

        match convert_trip_table(&input, &output, &Mode::Other("walking".to_string())) {
            Err(Error::MissingColumn { column, .. }) => assert_eq!(column, "walking"),
            x => panic!("expected MissingColumn, got {:?}", x),
        }
        assert!(!prep_io::file_exists(&output));
    }

    #[test]
    fn missing_zone_column() {
        match convert("origin,geo_code2,bicycle\nA,B,5\n", "bicycle") {
            Err(Error::MissingColumn { column, .. }) => assert_eq!(column, "geo_code1"),
            x => panic!("expected MissingColumn, got {:?}", x),
        }
    }

    #[test]
    fn repeated_column() {
        match convert("geo_code1,geo_code2,bicycle,bicycle\nA,B,5,6\n", "bicycle") {
            Err(Error::MalformedInput { reason, .. }) => assert!(reason.contains("bicycle")),
            x => panic!("expected MalformedInput, got {:?}", x),
        }
        // Repeats of columns that aren't used don't matter
        assert_eq!(
            convert("geo_code1,geo_code2,car,car,bicycle\nA,B,1,2,5\n", "bicycle").unwrap(),
            "from,to,count\nA,B,5\n"
        );
    }

    #[test]
    fn ragged_row() {
        assert!(matches!(
            convert("geo_code1,geo_code2,bicycle\nA,B\n", "bicycle"),
            Err(Error::MalformedInput { .. })
        ));
    }

    #[test]
    fn through_files() {
        let tmp = tempfile::tempdir().unwrap();
        let input = tmp.path().join("od_raw.csv").display().to_string();
        let output = tmp.path().join("nested/od.csv").display().to_string();
        fs_err::write(&input, "geo_code1,geo_code2,bicycle\nA,B,5\nB,C,6\n").unwrap();

        assert_eq!(convert_trip_table(&input, &output, &Mode::Bicycle).unwrap(), 2);
        assert_eq!(
            fs_err::read_to_string(&output).unwrap(),
            "from,to,count\nA,B,5\nB,C,6\n"
        );
    }
}
