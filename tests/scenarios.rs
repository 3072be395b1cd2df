//! End-to-end: survey file → trained artifact on disk → scoring

mod common;

use std::fs;
use std::sync::Arc;

use anton_scoring::logic::dataset::{
    load_raw_records, read_csv_rows, read_jsonl_rows, write_csv_rows, write_jsonl_rows,
    JsonlScoreSink, ScoreLogRecord,
};
use anton_scoring::logic::model::ConfidenceLevel;
use anton_scoring::{
    BatchMode, EngineError, FeatureEngineer, FeatureInput, FeatureVector, ModelArtifact,
    ModelTrainer, RawRecord, RiskBand, ScoringEngine,
};
use serde_json::json;
use tempfile::tempdir;

#[test]
fn train_from_file_save_and_score() {
    let dir = tempdir().unwrap();
    let survey_path = dir.path().join("survey.jsonl");
    let artifact_path = dir.path().join("model").join("anton.json");

    let mut lines: Vec<String> = common::survey()
        .iter()
        .map(|r| serde_json::to_string(r).unwrap())
        .collect();
    // two unusable rows: a blank income cell and an unknown employment code
    lines.push(r#"{"mobileowner":1,"pay_online":1,"pay_cash":0,"saved":1,"borrowed":1}"#.to_string());
    lines.push(
        serde_json::to_string(&RawRecord {
            emp_in: Some(9.0),
            ..common::survey()[3].clone()
        })
        .unwrap(),
    );
    fs::write(&survey_path, lines.join("\n")).unwrap();

    let records = load_raw_records(&survey_path).unwrap();
    assert_eq!(records.len(), 1026);

    let artifact = ModelTrainer::new(common::quick_config())
        .fit_records(&FeatureEngineer::default(), &records)
        .unwrap();
    assert_eq!(artifact.metrics.dropped_rows, 1);
    assert_eq!(artifact.metrics.unmapped_employment, 1);
    assert_eq!(artifact.metrics.train_rows + artifact.metrics.holdout_rows, 1025);
    artifact.save(&artifact_path).unwrap();

    let loaded = ModelArtifact::load(&artifact_path).unwrap();
    assert_eq!(loaded.checksum, artifact.checksum);

    let engine = ScoringEngine::with_artifact(Arc::new(loaded)).unwrap();
    let strong = engine
        .evaluate(&FeatureInput::Strict(FeatureVector::new(2.0, 3.0, 1.0, 0.75, 0.9)))
        .unwrap();
    assert_eq!(
        strong.reasons,
        vec![
            "High mobile activity",
            "Frequent financial transactions",
            "Upper income tier",
            "Stable employment",
        ]
    );
    assert_eq!(strong.band, engine.bander().band(strong.probability));
}

#[test]
fn identical_training_gives_identical_forest() {
    let a = common::train(common::quick_config());
    let b = common::train(common::quick_config());
    assert_eq!(a.checksum, b.checksum);
    assert_eq!(a.imputation, b.imputation);
    assert_eq!(a.forest(), b.forest());
}

#[test]
fn weak_profile_has_no_reasons() {
    let result = common::shared_engine()
        .evaluate(&FeatureInput::Strict(FeatureVector::new(0.0, 0.0, 0.0, 0.25, 0.2)))
        .unwrap();
    assert!(result.reasons.is_empty());
    assert_eq!(result.confidence.level, ConfidenceLevel::High);
}

#[test]
fn single_feature_profile_is_imputed() {
    let engine = common::shared_engine();
    let artifact = engine.scorer().artifact().unwrap();

    let partial = engine
        .evaluate(&FeatureInput::partial([("digital_score", 2.0)]))
        .unwrap();
    let full = engine
        .evaluate(&FeatureInput::Strict(FeatureVector::new(
            2.0,
            artifact.imputation.financial_activity,
            artifact.imputation.engagement,
            artifact.imputation.income_weight,
            artifact.imputation.employment_score,
        )))
        .unwrap();

    assert_eq!(partial.probability, full.probability);
    assert!(partial.confidence.fraction < full.confidence.fraction);
    assert_eq!(partial.confidence.level, ConfidenceLevel::Low);
    assert_eq!(partial.reasons, vec!["High mobile activity"]);
}

#[test]
fn partial_with_unknown_name_is_rejected() {
    let err = common::shared_engine()
        .evaluate(&FeatureInput::partial([("credit_limit", 1.0)]))
        .unwrap_err();
    assert!(matches!(err, EngineError::SchemaMismatch(_)));
}

#[test]
fn legacy_positional_list() {
    let engine = common::shared_engine();
    let short = FeatureInput::positional(&[2.0, 3.0, 1.0]);
    assert!(matches!(short, Err(EngineError::MissingFeature { .. })));

    let full = FeatureInput::positional(&[2.0, 3.0, 1.0, 0.75, 0.9]).unwrap();
    assert_eq!(engine.evaluate(&full).unwrap().confidence.supplied, 5);
}

#[test]
fn batch_file_round_trip_with_logging() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("applicants.jsonl");
    let output = dir.path().join("scored.jsonl");
    let logs = dir.path().join("logs");

    let rows: Vec<_> = [
        json!({"id": 1, "digital_score": 2, "financial_activity": 3, "engagement": 1,
               "income_weight": 0.75, "employment_score": 0.9}),
        json!({"id": 2, "digital_score": null, "income_weight": "0.25"}),
        json!({"id": 3, "region": "north"}),
    ]
    .iter()
    .map(|v| v.as_object().cloned().unwrap())
    .collect();
    write_jsonl_rows(&input, &rows).unwrap();

    let engine = common::shared_engine();
    let sink = JsonlScoreSink::new(logs).unwrap();
    let scored = engine
        .score_rows_logged(&read_jsonl_rows(&input).unwrap(), BatchMode::Adaptive, &sink)
        .unwrap();
    write_jsonl_rows(&output, &scored).unwrap();

    let back = read_jsonl_rows(&output).unwrap();
    assert_eq!(back.len(), 3);
    assert_eq!(back[2]["region"], "north");
    assert_eq!(back[1]["confidence"], "Low");
    for (i, row) in back.iter().enumerate() {
        assert_eq!(row["id"], i + 1);
        let band: RiskBand = row["risk_band"].as_str().unwrap().parse().unwrap();
        assert_eq!(band, engine.bander().band(row["anton_score"].as_f64().unwrap()));
    }

    let logged: Vec<ScoreLogRecord> = sink
        .log_files()
        .unwrap()
        .iter()
        .flat_map(|p| {
            fs::read_to_string(p)
                .unwrap()
                .lines()
                .map(|l| serde_json::from_str(l).unwrap())
                .collect::<Vec<_>>()
        })
        .collect();
    assert_eq!(logged.len(), 3);
    assert_eq!(logged[1].income_weight, Some(0.25));
    assert_eq!(logged[1].digital_score, None);
    assert_eq!(logged[2].supplied_count(), 0);
}

#[test]
fn strict_batch_names_the_row() {
    let rows: Vec<_> = [json!({"digital_score": 1})]
        .iter()
        .map(|v| v.as_object().cloned().unwrap())
        .collect();
    let err = common::shared_engine()
        .score_rows(&rows, BatchMode::Strict)
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::MissingFeature { ref feature, row: Some(0) } if feature == "financial_activity"
    ));
}

#[test]
fn csv_batch_keeps_columns_and_appends_scores() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("applicants.csv");
    let output = dir.path().join("scored.csv");
    fs::write(
        &input,
        "branch,digital_score,applicant,income_weight\nnairobi,2,a-1,0.75\nmombasa,,a-2,\n",
    )
    .unwrap();

    let table = read_csv_rows(&input).unwrap();
    let scored = common::shared_engine()
        .score_table(&table, BatchMode::Adaptive, None)
        .unwrap();
    write_csv_rows(&output, &scored).unwrap();

    let text = fs::read_to_string(&output).unwrap();
    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some("branch,digital_score,applicant,income_weight,anton_score,risk_band,explanation,confidence")
    );

    let reread = read_csv_rows(&output).unwrap();
    assert_eq!(reread.len(), 2);
    assert_eq!(reread.rows[0]["applicant"], "a-1");
    assert_eq!(reread.rows[0]["confidence"], "Low");
    assert_eq!(reread.rows[1]["explanation"], "");
    for row in &reread.rows {
        let p: f64 = row["anton_score"].as_str().unwrap().parse().unwrap();
        assert!((0.0..=1.0).contains(&p));
    }
}
