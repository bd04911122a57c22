use std::fs;
use std::path::PathBuf;

use crate::errors::ParserError;
use crate::format::{infer_column_data, parse_table, DelimitedFormat};
use crate::model::{Column, ColumnData, ColumnKind, Table};

fn fixture(path: &str) -> Vec<u8> {
    let base = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let full_path = base.join("tests/data").join(path);
    fs::read(&full_path)
        .unwrap_or_else(|err| panic!("failed to read fixture {}: {}", full_path.display(), err))
}

fn comma(index: &str) -> DelimitedFormat {
    DelimitedFormat::new(b',', index)
}

#[test]
fn parses_semicolon_sample_with_sentinel_as_missing() {
    let content = fixture("diabetic_sample.csv");
    let table = parse_table(&content, &DelimitedFormat::default()).expect("sample parse failed");

    assert_eq!(table.height(), 5);
    assert_eq!(table.index().name(), "encounter_id");
    assert_eq!(table.index().kind(), ColumnKind::Integer);
    assert!(!table.contains("encounter_id"));
    assert_eq!(
        table.column_names(),
        vec![
            "patient_nbr",
            "race",
            "gender",
            "age",
            "weight",
            "admission_type_id",
            "time_in_hospital",
            "A1Cresult",
            "readmitted",
        ]
    );

    let race = table.column("race").expect("race column missing");
    assert_eq!(race.kind(), ColumnKind::Text);
    assert_eq!(race.null_count(), 1);
    assert!(race.data().is_null(3));

    let weight = table.column("weight").expect("weight column missing");
    assert_eq!(weight.null_count(), 4);
    assert_eq!(weight.data().render(4).as_deref(), Some("[75-100)"));

    assert_eq!(
        table.column("admission_type_id").map(Column::kind),
        Some(ColumnKind::Integer)
    );
}

#[test]
fn sentinel_is_kept_verbatim_without_na_values() {
    let content = fixture("diabetic_sample.csv");
    let format = DelimitedFormat::new(b';', "encounter_id");
    let table = parse_table(&content, &format).expect("sample parse failed");

    let race = table.column("race").expect("race column missing");
    assert_eq!(race.null_count(), 0);
    assert_eq!(race.data().render(3).as_deref(), Some("?"));
}

#[test]
fn infers_float_when_any_value_has_a_fraction() {
    let data = infer_column_data(vec![Some("1".into()), None, Some("2.5".into())]);
    assert_eq!(data, ColumnData::Float(vec![Some(1.0), None, Some(2.5)]));
}

#[test]
fn mixed_tokens_stay_text() {
    let data = infer_column_data(vec![Some("250.83".into()), Some("V57".into())]);
    assert_eq!(data.kind(), ColumnKind::Text);
}

#[test]
fn all_missing_column_is_text() {
    let data = infer_column_data(vec![None, None]);
    assert_eq!(data, ColumnData::Text(vec![None, None]));
}

#[test]
fn missing_index_column_is_reported() {
    let err = parse_table(b"a,b\n1,2\n", &comma("encounter_id")).unwrap_err();
    assert!(matches!(err, ParserError::MissingIndexColumn { name } if name == "encounter_id"));
}

#[test]
fn ragged_rows_are_rejected_with_line_number() {
    let err = parse_table(b"id,a,b\n1,2,3\n2,3\n", &comma("id")).unwrap_err();
    match err {
        ParserError::RaggedRow {
            line_index,
            expected,
            found,
        } => {
            assert_eq!(line_index, 3);
            assert_eq!(expected, 3);
            assert_eq!(found, 2);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn blank_index_value_is_rejected() {
    let err = parse_table(b"id,a\n1,x\n,y\n", &comma("id")).unwrap_err();
    assert!(matches!(err, ParserError::MissingIndexValue { line_index: 3, .. }));
}

#[test]
fn duplicate_header_is_rejected() {
    let err = parse_table(b"id,a,a\n1,2,3\n", &comma("id")).unwrap_err();
    assert!(matches!(err, ParserError::DuplicateColumn { name } if name == "a"));
}

#[test]
fn empty_input_has_no_header() {
    let err = parse_table(b"", &comma("id")).unwrap_err();
    assert!(matches!(err, ParserError::MissingHeader));
}

#[test]
fn filter_rows_applies_mask_to_index_and_columns() {
    let table = parse_table(b"id,a\n1,x\n2,\n3,z\n", &comma("id")).expect("parse failed");
    let filtered = table.filter_rows(&[true, false, true]).expect("filter failed");

    assert_eq!(filtered.height(), 2);
    assert_eq!(
        filtered.index().data(),
        &ColumnData::Integer(vec![Some(1), Some(3)])
    );
    assert_eq!(filtered.column("a").map(Column::null_count), Some(0));
    assert!(table.filter_rows(&[true]).is_err());
}

#[test]
fn select_reorders_and_skips_unknown_names() {
    let table = parse_table(b"id,a,b,c\n1,x,2,y\n", &comma("id")).expect("parse failed");
    let selected = table.select(&["c", "missing", "a"]);
    assert_eq!(selected.column_names(), vec!["c", "a"]);
    assert_eq!(selected.height(), 1);
}

#[test]
fn table_new_rejects_length_mismatch() {
    let index = Column::new("id", ColumnData::Integer(vec![Some(1), Some(2)]));
    let short = Column::text("a", vec![Some("x")]);
    assert!(matches!(
        Table::new(index, vec![short]),
        Err(ParserError::Validation { .. })
    ));
}

#[test]
fn dataframe_export_puts_index_first() {
    let content = fixture("diabetic_sample.csv");
    let table = parse_table(&content, &DelimitedFormat::default()).expect("sample parse failed");
    let df = table.to_dataframe().expect("dataframe export failed");

    assert_eq!(df.height(), 5);
    assert_eq!(df.width(), table.width() + 1);
    let names: Vec<&str> = df.get_column_names().into_iter().map(|n| n.as_str()).collect();
    assert_eq!(names[0], "encounter_id");

    let race = df.column("race").expect("race column missing");
    assert_eq!(race.null_count(), 1);
    assert_eq!(race.str().unwrap().get(0), Some("Caucasian"));

    let ids = df.column("encounter_id").unwrap().i64().unwrap();
    assert_eq!(ids.get(1), Some(149190));
}
