// Copyright (c) 2025, Tom Ouellette
// Licensed under the MIT License

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use colored::*;
use kdam::{Bar, tqdm};

use crate::error::OvumError;

/// A basic progress bar for tracking iterations
pub fn progress_bar(n: usize, desc: &str, verbose: bool) -> Bar {
    if !verbose {
        return tqdm!(disable = true);
    }

    tqdm!(
        total = n,
        force_refresh = false,
        desc = progress_timestamp(desc),
        bar_format =
            "{desc suffix=' '}[{percentage:.0}%] ({rate:.1}/s, eta: {remaining human=true})"
    )
}

fn timestamp() -> String {
    let time = chrono::Local::now();
    format!("{} | {}", time.format("%Y-%m-%d"), time.format("%H:%M:%S"))
}

/// A description prefixed with a colored timestamp and tool tag
pub fn progress_timestamp(desc: &str) -> String {
    format!(
        "{} {} {} {} {} {}",
        "[".bold(),
        timestamp(),
        "|".bold(),
        "ovum".truecolor(103, 194, 69).bold(),
        "]".bold(),
        desc,
    )
}

/// A description prefixed with an uncolored timestamp, used for log files
pub fn plain_timestamp(desc: &str) -> String {
    format!("[ {} | ovum ] {}", timestamp(), desc)
}

/// Print timestamped statements to console
pub fn progress_log(desc: &str, verbose: bool) {
    if !verbose {
        return;
    }

    println!("{}", progress_timestamp(desc));
}

/// Append a timestamped statement to a log file
///
/// # Arguments
///
/// * `path` - Log file, created if missing
/// * `desc` - Statement to record
pub fn append_log<P: AsRef<Path>>(path: P, desc: &str) -> Result<(), OvumError> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|err| OvumError::OtherError(format!("Failed to open log file: {}", err)))?;

    writeln!(file, "{}", plain_timestamp(desc))
        .map_err(|err| OvumError::OtherError(format!("Failed to write log file: {}", err)))
}

/// Format numbers to readable thousands format
///
/// # Examples
///
/// ```
/// use ovum_core::ut::track::thousands_format;
///
/// assert_eq!(thousands_format(12345), "12,345");
/// assert_eq!(thousands_format(1234), "1234");
/// ```
pub fn thousands_format<T>(number: T) -> String
where
    T: std::fmt::Display,
{
    let number = number.to_string();
    if number.len() <= 4 || !number.bytes().all(|b| b.is_ascii_digit()) {
        return number;
    }

    let digits: Vec<char> = number.chars().collect();
    digits
        .rchunks(3)
        .rev()
        .map(|chunk| chunk.iter().collect::<String>())
        .collect::<Vec<String>>()
        .join(",")
}

/// Render key/value pairs as an aligned two-column listing
///
/// # Examples
///
/// ```
/// use ovum_core::ut::track::format_listing;
///
/// let listing = format_listing(&[("padding", "25".to_string()), ("use_mask", "true".to_string())]);
/// assert_eq!(listing, "padding  : 25\nuse_mask : true");
/// ```
pub fn format_listing(pairs: &[(&str, String)]) -> String {
    let width = pairs.iter().map(|(key, _)| key.len()).max().unwrap_or(0);

    pairs
        .iter()
        .map(|(key, value)| format!("{:<width$} : {}", key, value, width = width))
        .collect::<Vec<String>>()
        .join("\n")
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn test_thousands_format() {
        assert_eq!(thousands_format(1_000_000), "1,000,000");
        assert_eq!(thousands_format(100), "100");
        assert_eq!(thousands_format(-12345), "-12345");
    }

    #[test]
    fn test_plain_timestamp() {
        let line = plain_timestamp("Matching eggs");
        assert!(line.starts_with("[ "));
        assert!(line.ends_with("| ovum ] Matching eggs"));
    }

    #[test]
    fn test_append_log() {
        let path = std::env::temp_dir().join("ovum_test_append_log.txt");
        let _ = std::fs::remove_file(&path);

        append_log(&path, "first").unwrap();
        append_log(&path, "second").unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("first"));
        assert!(lines[1].ends_with("second"));

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_format_listing_empty() {
        assert_eq!(format_listing(&[]), "");
    }
}
