// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;

use ovum_core::im::{OvumBuffer, OvumImage};
use ovum_core::io::{column_f64, column_str, read_table};

fn fresh_dir(name: &str) -> PathBuf {
    let root = std::env::temp_dir().join(name);
    let _ = std::fs::remove_dir_all(&root);
    std::fs::create_dir_all(&root).unwrap();
    root
}

fn write_match_fixtures(root: &Path) -> (PathBuf, PathBuf) {
    let annotations = root.join("annotations.csv");
    std::fs::write(
        &annotations,
        "image_name,ant_x,ant_y,post_x,post_y,lat_x,lat_y,stage\n\
         ovary_01,10,50,90,50,50,20,9\n\
         ovary_02,10,50,90,50,50,20,10\n\
         ovary_01,,50,90,50,50,20,8\n",
    )
    .unwrap();

    let candidates = root.join("candidates");
    std::fs::create_dir_all(&candidates).unwrap();
    std::fs::write(
        candidates.join("ovary_01.csv"),
        "x,y,a,b,theta\n150,150,10,10,0\n50,50,20,40,0\n",
    )
    .unwrap();

    (annotations, candidates)
}

#[test]
fn test_match_writes_table_and_errors() {
    let root = fresh_dir("ovum_cli_test_match");
    let (annotations, candidates) = write_match_fixtures(&root);
    let output = root.join("output");

    Command::cargo_bin("ovum")
        .unwrap()
        .arg("match")
        .arg("-a")
        .arg(&annotations)
        .arg("-c")
        .arg(&candidates)
        .arg("-o")
        .arg(&output)
        .arg("-t")
        .arg("2")
        .assert()
        .success();

    let table = read_table(output.join("matches.csv")).unwrap();
    assert_eq!(table.height(), 1);
    assert_eq!(column_str(&table, "image_name").unwrap(), vec![Some("ovary_01".to_string())]);
    assert_eq!(column_f64(&table, "stage").unwrap(), vec![Some(9.0)]);
    assert_eq!(column_f64(&table, "ellipse_a").unwrap(), vec![Some(40.0)]);
    assert_eq!(column_f64(&table, "ellipse_b").unwrap(), vec![Some(20.0)]);

    let jaccard = column_f64(&table, "ellipse_Jaccard").unwrap();
    assert!(jaccard[0].unwrap() > 0.4);

    let errors = std::fs::read_to_string(output.join("errors.tsv")).unwrap();
    assert!(errors.contains("ovary_02_row1\tMissingCandidatesError\t"));
    assert!(errors.contains("row2\tAnnotationError\t"));

    assert!(output.join("config.json").is_file());
    assert!(output.join("log.txt").is_file());

    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn test_match_rejects_invalid_threshold() {
    let root = fresh_dir("ovum_cli_test_match_threshold");
    let (annotations, candidates) = write_match_fixtures(&root);

    Command::cargo_bin("ovum")
        .unwrap()
        .arg("match")
        .arg("-a")
        .arg(&annotations)
        .arg("-c")
        .arg(&candidates)
        .arg("-o")
        .arg(root.join("output"))
        .arg("--overlap-threshold")
        .arg("1.5")
        .assert()
        .failure()
        .stderr(predicate::str::contains("[ovum::match] ERROR"));

    assert!(!root.join("output").exists());

    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn test_cut_writes_objects() {
    let root = fresh_dir("ovum_cli_test_cut");
    let images = root.join("images");
    let masks = root.join("masks");
    std::fs::create_dir_all(&images).unwrap();
    std::fs::create_dir_all(&masks).unwrap();

    OvumImage::U8(OvumBuffer::from_fn(31, 31, |row, col| (row + col) as u8))
        .save(images.join("ovary.png"))
        .unwrap();

    // A vertical bar and a square sharing one foreground value
    OvumImage::U8(OvumBuffer::from_fn(31, 31, |row, col| {
        let bar = col == 6 && (4..19).contains(&row);
        let square = (20..25).contains(&row) && (20..25).contains(&col);
        if bar || square { 1u8 } else { 0u8 }
    }))
    .save(masks.join("ovary.png"))
    .unwrap();

    let output = root.join("output");

    Command::cargo_bin("ovum")
        .unwrap()
        .arg("cut")
        .arg("-i")
        .arg(&images)
        .arg("-m")
        .arg(&masks)
        .arg("-o")
        .arg(&output)
        .arg("-p")
        .arg("2")
        .assert()
        .success();

    let counts = std::fs::read_to_string(output.join("object_counts.tsv")).unwrap();
    assert_eq!(counts, "image\tobjects\novary\t2\n");

    // The vertical bar is laid out horizontally
    let bar = OvumImage::open(output.join("images").join("ovary_1.png")).unwrap();
    assert_eq!(bar.shape(), (5, 19, 1));
    assert!(output.join("masks").join("ovary_2.png").is_file());

    let objects = read_table(output.join("objects.tsv")).unwrap();
    assert_eq!(objects.height(), 2);

    assert!(!output.join("errors.tsv").exists());

    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn test_cut_rejects_invalid_format() {
    Command::cargo_bin("ovum")
        .unwrap()
        .args(["cut", "-i", "images", "-o", "output", "-e", "json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid image_format json"));
}
