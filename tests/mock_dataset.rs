use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use lupa_dataset::adapters::MockDataset;
use lupa_dataset::context::DatasetContext;
use lupa_dataset::types::{Data, Feature, FeatureRange, Shape, Value};
use lupa_dataset::DatasetError;

fn tmp_file(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("lupa-dataset-{name}-{nanos}.csv"))
}

const PEOPLE_JSON: &str = r#"[
    {"name": "Ada", "team": "core", "score": 98.5},
    {"name": "Grace", "team": "core", "score": 87.25},
    {"name": "Linus", "team": "kernel", "score": null}
]"#;

#[test]
fn json_rows_build_features_and_shape() {
    let mock = MockDataset::from_json_str(PEOPLE_JSON).unwrap();
    let ds = mock.dataset();

    assert_eq!(ds.shape, Shape::new(3, 3));
    assert_eq!(
        ds.feature("team"),
        Some(&Feature::Discrete {
            key: "team".to_string(),
            modalities: vec!["core".to_string(), "kernel".to_string()],
        })
    );
    assert_eq!(
        ds.feature("score").and_then(|f| f.range()),
        Some(&FeatureRange::Number(87.25, 98.5))
    );
    match &ds.data {
        Data::Materialized(rows) => assert_eq!(rows[2]["score"], Value::Null),
        Data::Deferred(_) => panic!("mock data should be materialized"),
    }
}

#[test]
fn json_with_null_first_value_fails() {
    let err = MockDataset::from_json_str(r#"[{"a": null}, {"a": 1}]"#).unwrap_err();
    assert!(matches!(err, DatasetError::EmptyHeader { column } if column == "a"));
}

#[test]
fn malformed_json_is_a_json_error() {
    let err = MockDataset::from_json_str("[{").unwrap_err();
    assert!(matches!(err, DatasetError::Json(_)));
}

#[test]
fn csv_rows_are_typed_per_field() {
    let data = "city,temp,note\nOslo,3.5,cold\nLima,19,warm\nOslo,-2,\n";
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(data.as_bytes());
    let mock = MockDataset::from_csv_reader(&mut rdr).unwrap();
    let ds = mock.dataset();

    assert_eq!(ds.shape, Shape::new(3, 3));
    assert_eq!(
        ds.feature("city").and_then(|f| f.modalities()),
        Some(["Oslo".to_string(), "Lima".to_string()].as_slice())
    );
    assert_eq!(
        ds.feature("temp").and_then(|f| f.range()),
        Some(&FeatureRange::Number(-2.0, 19.0))
    );
}

fn feature_keys(ds: &lupa_dataset::types::Dataset) -> Vec<&str> {
    ds.features.iter().map(Feature::key).collect()
}

#[test]
fn csv_features_follow_header_order() {
    let data = "zeta,alpha,mid\n1,a,2\n3,b,4\n";
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(data.as_bytes());
    let mock = MockDataset::from_csv_reader(&mut rdr).unwrap();
    assert_eq!(feature_keys(mock.dataset()), vec!["zeta", "alpha", "mid"]);
    assert_eq!(mock.dataset().shape, Shape::new(2, 3));
}

#[test]
fn json_features_follow_first_object_order() {
    let mock = MockDataset::from_json_reader(
        r#"[{"zeta": 1, "alpha": "a", "mid": 2}, {"mid": 3, "alpha": "b", "zeta": 4}]"#.as_bytes(),
    )
    .unwrap();
    assert_eq!(feature_keys(mock.dataset()), vec!["zeta", "alpha", "mid"]);
}

#[test]
fn csv_with_duplicate_headers_fails() {
    let data = "id,id\n1,2\n";
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(data.as_bytes());
    let err = MockDataset::from_csv_reader(&mut rdr).unwrap_err();
    assert!(matches!(err, DatasetError::DuplicateKey { key } if key == "id"));
}

#[test]
fn csv_with_blank_first_value_fails() {
    let data = "city,note\nOslo,\nLima,warm\n";
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(data.as_bytes());
    let err = MockDataset::from_csv_reader(&mut rdr).unwrap_err();
    assert!(matches!(err, DatasetError::EmptyHeader { column } if column == "note"));
}

#[test]
fn csv_path_loads_and_missing_path_is_a_csv_error() {
    let path = tmp_file("people");
    std::fs::write(&path, "id,name\n1,Ada\n2,Grace\n").unwrap();

    let ds = MockDataset::from_csv_path(&path).unwrap().into_dataset();
    assert_eq!(ds.shape, Shape::new(2, 2));
    assert_eq!(
        ds.feature("id").and_then(|f| f.range()),
        Some(&FeatureRange::Number(1.0, 2.0))
    );
    let _ = std::fs::remove_file(&path);

    let err = MockDataset::from_csv_path(tmp_file("missing")).unwrap_err();
    assert!(matches!(err, DatasetError::Csv(_)));
}

#[test]
fn consumers_read_mock_data_through_the_context() {
    let ds = MockDataset::from_json_str(PEOPLE_JSON)
        .unwrap()
        .into_dataset();

    let keys = DatasetContext::root()
        .render(&ds, |cx| {
            cx.use_features()
                .map(|fs| fs.iter().map(|f| f.key().to_string()).collect::<Vec<_>>())
        })
        .unwrap()
        .unwrap();
    assert_eq!(keys, vec!["name", "team", "score"]);
}

#[test]
fn rendering_a_dataset_inside_another_fails() {
    let outer = MockDataset::from_json_str(PEOPLE_JSON)
        .unwrap()
        .into_dataset();
    let inner = outer.clone();

    let nested = DatasetContext::root()
        .render(&outer, |cx| cx.render(&inner, |_| ()))
        .unwrap();
    assert!(matches!(nested, Err(DatasetError::NestedProvider)));
}
