// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

use std::fs::File;
use std::path::Path;

use polars::prelude::*;

use crate::constant;
use crate::error::OvumError;

fn table_extension<P: AsRef<Path>>(path: P) -> Option<String> {
    path.as_ref()
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase())
}

/// Read a delimited table with a header row
///
/// The separator is chosen from the extension: `.csv` files are comma
/// separated, `.tsv` and `.txt` files are tab separated.
///
/// # Arguments
///
/// * `path` - Path to a csv, tsv or txt table
///
/// # Examples
///
/// ```no_run
/// use ovum_core::io::read_table;
///
/// let df = read_table("annotations.csv").unwrap();
/// ```
pub fn read_table<P: AsRef<Path>>(path: P) -> Result<DataFrame, OvumError> {
    let separator = match table_extension(&path).as_deref() {
        Some("csv") => b',',
        Some("tsv") | Some("txt") => b'\t',
        _ => {
            return Err(OvumError::TableReadError(format!(
                "Table must have one of the following extensions: {}",
                constant::SUPPORTED_TABLE_FORMATS.join(", ")
            )));
        }
    };

    if !path.as_ref().is_file() {
        return Err(OvumError::NoFileError(path.as_ref().display().to_string()));
    }

    CsvReadOptions::default()
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_separator(separator))
        .try_into_reader_with_file_path(Some(path.as_ref().to_path_buf()))
        .and_then(|reader| reader.finish())
        .map_err(|e| OvumError::TableReadError(format!("{}: {}", path.as_ref().display(), e)))
}

/// Extract a numeric column as nullable f64 values
///
/// # Arguments
///
/// * `df` - A DataFrame
/// * `name` - Column name
pub fn column_f64(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>, OvumError> {
    let series = df
        .column(name)
        .map_err(|_| OvumError::TableReadError(format!("Missing column '{}'", name)))?
        .as_materialized_series()
        .cast(&DataType::Float64)
        .map_err(|e| OvumError::TableReadError(e.to_string()))?;

    let values = series
        .f64()
        .map_err(|e| OvumError::TableReadError(e.to_string()))?;

    Ok(values.into_iter().collect())
}

/// Extract a column as nullable strings
///
/// # Arguments
///
/// * `df` - A DataFrame
/// * `name` - Column name
pub fn column_str(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>, OvumError> {
    let series = df
        .column(name)
        .map_err(|_| OvumError::TableReadError(format!("Missing column '{}'", name)))?
        .as_materialized_series()
        .cast(&DataType::String)
        .map_err(|e| OvumError::TableReadError(e.to_string()))?;

    let values = series
        .str()
        .map_err(|e| OvumError::TableReadError(e.to_string()))?;

    Ok(values.into_iter().map(|v| v.map(str::to_string)).collect())
}

/// Write a table to a CSV file
///
/// # Arguments
///
/// * `df` - A DataFrame
/// * `output` - A string containing the name of the output file
/// * `header` - A boolean indicating whether the output file should contain a header
///
/// # Examples
///
/// ```no_run
/// use polars::prelude::*;
/// use ovum_core::io::write_table_csv;
///
/// let column = vec![Column::new("ellipse_Jaccard".into(), [0.5, 0.7, 0.9])];
/// let mut df: DataFrame = DataFrame::new(column).unwrap();
///
/// write_table_csv(&mut df, "output.csv", true).unwrap()
/// ```
pub fn write_table_csv<P: AsRef<Path>>(
    df: &mut DataFrame,
    path: P,
    header: bool,
) -> Result<(), OvumError> {
    let mut output: File = File::create(&path).map_err(|_| {
        OvumError::TableWriteError(format!(
            "Failed to create CSV file: {}",
            path.as_ref().display()
        ))
    })?;

    CsvWriter::new(&mut output)
        .include_header(header)
        .finish(df)
        .map_err(|e| OvumError::TableWriteError(e.to_string()))
}

/// Write a table to a TSV file
///
/// # Arguments
///
/// * `df` - A DataFrame
/// * `output` - A string containing the name of the output file
/// * `header` - A boolean indicating whether the output file should contain a header
pub fn write_table_tsv<P: AsRef<Path>>(
    df: &mut DataFrame,
    path: P,
    header: bool,
) -> Result<(), OvumError> {
    let mut output: File = File::create(&path).map_err(|_| {
        OvumError::TableWriteError(format!(
            "Failed to create TSV file: {}",
            path.as_ref().display()
        ))
    })?;

    CsvWriter::new(&mut output)
        .include_header(header)
        .with_separator(b'\t')
        .finish(df)
        .map_err(|e| OvumError::TableWriteError(e.to_string()))
}

/// Write a table to a parquet file
///
/// # Arguments
///
/// * `df` - A DataFrame
/// * `output` - A string containing the name of the output file
pub fn write_table_pq<P: AsRef<Path>>(df: &mut DataFrame, path: P) -> Result<(), OvumError> {
    let mut output: File = File::create(&path).map_err(|_| {
        OvumError::TableWriteError(format!(
            "Failed to create parquet file: {}",
            path.as_ref().display()
        ))
    })?;

    ParquetWriter::new(&mut output)
        .finish(df)
        .map(|_| ())
        .map_err(|e| OvumError::TableWriteError(e.to_string()))
}

/// Write a DataFrame to disk with the format chosen by extension
///
/// # Arguments
///
/// * `df` - A DataFrame
/// * `output` - A string containing the name of the output file
///
/// # Examples
///
/// ```no_run
/// use polars::prelude::*;
/// use ovum_core::io::write_table;
///
/// let column = vec![Column::new("ellipse_Jaccard".into(), [0.5, 0.7, 0.9])];
/// let mut df: DataFrame = DataFrame::new(column).unwrap();
///
/// write_table(&mut df, "output.pq").unwrap()
/// ```
pub fn write_table<P: AsRef<Path>>(df: &mut DataFrame, path: P) -> Result<(), OvumError> {
    match table_extension(&path).as_deref() {
        Some("csv") => write_table_csv(df, path, true),
        Some("tsv") | Some("txt") => write_table_tsv(df, path, true),
        Some("parquet") | Some("pq") => write_table_pq(df, path),
        _ => Err(OvumError::TableWriteError(format!(
            "Provided table path has an invalid extension. Must be one of: {}.",
            constant::SUPPORTED_OUTPUT_TABLE_FORMATS.join(", ")
        ))),
    }
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn test_write_read_csv() {
        let path = std::env::temp_dir().join("ovum_test_write_read_table.csv");

        let columns = vec![
            Column::new("image_name".into(), ["a", "b"]),
            Column::new("ant_x".into(), [Some(1.0), None]),
        ];
        let mut df = DataFrame::new(columns).unwrap();
        write_table(&mut df, &path).unwrap();

        let table = read_table(&path).unwrap();
        assert_eq!(table.height(), 2);
        assert_eq!(column_f64(&table, "ant_x").unwrap(), vec![Some(1.0), None]);
        assert_eq!(
            column_str(&table, "image_name").unwrap(),
            vec![Some("a".to_string()), Some("b".to_string())]
        );
        assert!(column_f64(&table, "ant_y").is_err());

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_read_table_tab_separated() {
        let path = std::env::temp_dir().join("ovum_test_read_table_tab.tsv");
        std::fs::write(&path, "x\ty\n1\t2\n3\t4\n").unwrap();

        let table = read_table(&path).unwrap();
        assert_eq!(column_f64(&table, "y").unwrap(), vec![Some(2.0), Some(4.0)]);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_table_extension_errors() {
        assert!(read_table("annotations.json").is_err());
        assert!(read_table("missing_table.csv").is_err());

        let column = vec![Column::new("x".into(), [1.0])];
        let mut df = DataFrame::new(column).unwrap();
        assert!(write_table(&mut df, "output.json").is_err());
    }
}
