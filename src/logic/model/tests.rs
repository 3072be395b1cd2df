//! Training, artifact and scoring tests

use std::collections::BTreeMap;
use std::sync::Arc;

use super::artifact::ModelArtifact;
use super::config::{ImputationDefaults, ImputationStrategy, TrainerConfig};
use super::scorer::{Confidence, ConfidenceLevel, ConfidencePolicy, Scorer};
use super::trainer::ModelTrainer;
use crate::logic::error::EngineError;
use crate::logic::features::{FeatureInput, FeatureVector, FEATURE_LAYOUT};
use crate::logic::fixtures::{grid, trained};

fn quick_scorer() -> Scorer {
    Scorer::with_artifact(Arc::new(trained(TrainerConfig::quick()))).unwrap()
}

// ============================================================================
// TRAINER
// ============================================================================

#[test]
fn test_fit_records_schema_and_bounds() {
    let artifact = trained(TrainerConfig::quick());

    assert_eq!(artifact.forest().n_trees(), 15);
    assert_eq!(artifact.config.max_depth, 4);
    assert_eq!(artifact.metrics.train_rows + artifact.metrics.holdout_rows, 1280);
    assert_eq!(artifact.metrics.holdout_rows, 256);

    let columns = artifact.feature_columns();
    for (index, name) in FEATURE_LAYOUT.iter().enumerate() {
        assert_eq!(columns.get(*name), Some(&index));
    }
    assert!(artifact.validate().is_ok());
}

#[test]
fn test_default_forest_shape() {
    let artifact = trained(TrainerConfig::default());
    assert_eq!(artifact.forest().n_trees(), 100);
    assert_eq!(artifact.config.max_depth, 5);
    assert!(artifact.metrics.holdout_accuracy.unwrap() > 0.9);
}

#[test]
fn test_training_is_deterministic() {
    let a = trained(TrainerConfig::quick());
    let b = trained(TrainerConfig::quick());

    assert_eq!(a.forest(), b.forest());
    assert_eq!(a.checksum, b.checksum);
    assert_eq!(a.imputation, b.imputation);
    assert_ne!(a.id, b.id);
}

#[test]
fn test_median_imputation_from_training_partition() {
    let artifact = trained(TrainerConfig::quick());
    assert_eq!(artifact.imputation.financial_activity, 2.0);
    assert!((0.25..=1.0).contains(&artifact.imputation.income_weight));
}

#[test]
fn test_fixed_imputation_is_recorded() {
    let artifact = trained(TrainerConfig {
        imputation: ImputationStrategy::Fixed(ImputationDefaults::neutral()),
        ..TrainerConfig::quick()
    });
    assert_eq!(artifact.imputation, ImputationDefaults::neutral());
}

#[test]
fn test_fit_rejects_constant_column() {
    let (mut features, labels) = grid();
    for f in &mut features {
        f.engagement = 1.0;
    }

    let err = ModelTrainer::default().fit(&features, &labels).unwrap_err();
    match err {
        EngineError::InsufficientData(msg) => assert!(msg.contains("engagement")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_fit_rejects_too_few_rows() {
    let (features, labels) = grid();
    let err = ModelTrainer::default()
        .fit(&features[..10], &labels[..10])
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientData(_)));
}

#[test]
fn test_fit_rejects_bad_labels() {
    let (features, mut labels) = grid();
    labels[7] = 2.0;
    let err = ModelTrainer::default().fit(&features, &labels).unwrap_err();
    assert!(matches!(err, EngineError::InsufficientData(ref m) if m.contains("row 7")));
}

#[test]
fn test_fit_rejects_invalid_trainer_config() {
    let (features, labels) = grid();

    for config in [
        TrainerConfig { n_trees: 0, ..TrainerConfig::quick() },
        TrainerConfig { max_depth: 0, ..TrainerConfig::quick() },
        TrainerConfig { test_fraction: 1.5, ..TrainerConfig::quick() },
    ] {
        let err = ModelTrainer::new(config).fit(&features, &labels).unwrap_err();
        assert!(matches!(err, EngineError::Config(_)), "{err}");
    }
}

#[test]
fn test_fit_without_holdout() {
    let artifact = trained(TrainerConfig {
        test_fraction: 0.0,
        ..TrainerConfig::quick()
    });
    assert_eq!(artifact.metrics.train_rows, 1280);
    assert_eq!(artifact.metrics.holdout_rows, 0);
    assert!(artifact.metrics.holdout_accuracy.is_none());
}

#[test]
fn test_fit_rejects_single_class_and_length_mismatch() {
    let (features, labels) = grid();
    let trainer = ModelTrainer::default();

    let zeros = vec![0.0; features.len()];
    assert!(matches!(trainer.fit(&features, &zeros), Err(EngineError::InsufficientData(_))));
    assert!(matches!(
        trainer.fit(&features, &labels[1..]),
        Err(EngineError::InsufficientData(_))
    ));
}

// ============================================================================
// ARTIFACT
// ============================================================================

#[test]
fn test_artifact_save_load_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("models").join("anton.json");

    let original = trained(TrainerConfig::quick());
    original.save(&path).unwrap();
    let loaded = ModelArtifact::load(&path).unwrap();

    assert_eq!(loaded, original);
    let v = FeatureVector::new(2.0, 3.0, 1.0, 0.75, 0.9);
    assert_eq!(
        loaded.predict_proba(&v.as_array()).unwrap().to_bits(),
        original.predict_proba(&v.as_array()).unwrap().to_bits()
    );
}

#[test]
fn test_artifact_tampered_checksum_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("anton.json");

    let mut artifact = trained(TrainerConfig::quick());
    artifact.checksum = "00".repeat(32);
    artifact.save(&path).unwrap();

    let err = ModelArtifact::load(&path).unwrap_err();
    assert!(matches!(err, EngineError::SchemaMismatch(ref m) if m.contains("checksum")));
}

#[test]
fn test_artifact_tampered_imputation_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("anton.json");

    let mut artifact = trained(TrainerConfig::quick());
    artifact.imputation.income_weight += 0.25;
    artifact.save(&path).unwrap();

    let err = ModelArtifact::load(&path).unwrap_err();
    assert!(matches!(err, EngineError::SchemaMismatch(ref m) if m.contains("checksum")));
}

#[test]
fn test_artifact_reordered_layout_rejected() {
    let mut artifact = trained(TrainerConfig::quick());
    artifact.layout.feature_names.swap(3, 4);

    assert!(matches!(artifact.validate(), Err(EngineError::SchemaMismatch(_))));
    assert!(Scorer::with_artifact(Arc::new(artifact)).is_err());
}

// ============================================================================
// SCORER
// ============================================================================

#[test]
fn test_score_without_artifact() {
    let scorer = Scorer::new();
    let input = FeatureInput::Strict(FeatureVector::new(1.0, 1.0, 1.0, 0.5, 0.5));

    assert!(!scorer.is_loaded());
    assert!(matches!(scorer.score(&input), Err(EngineError::ModelNotLoaded)));
    assert!(matches!(
        scorer.score_partial(&BTreeMap::new()),
        Err(EngineError::ModelNotLoaded)
    ));
}

#[test]
fn test_score_is_deterministic() {
    let scorer = quick_scorer();
    let input = FeatureInput::Strict(FeatureVector::new(2.0, 3.0, 1.0, 0.75, 0.9));

    let first = scorer.score(&input).unwrap().probability;
    for _ in 0..10 {
        assert_eq!(scorer.score(&input).unwrap().probability.to_bits(), first.to_bits());
    }
}

#[test]
fn test_strict_scores_full_confidence() {
    let scorer = quick_scorer();
    let p = scorer
        .score_strict(&FeatureVector::new(2.0, 3.0, 1.0, 0.75, 0.9))
        .unwrap();

    assert_eq!(p.confidence, Confidence::full());
    assert_eq!(p.confidence.level, ConfidenceLevel::High);
    assert!(p.imputed.is_empty());
    assert!((0.0..=1.0).contains(&p.probability));
}

#[test]
fn test_strict_nan_is_missing_feature() {
    let scorer = quick_scorer();
    let v = FeatureVector::new(2.0, f64::NAN, 1.0, 0.75, 0.9);

    let err = scorer.score_strict(&v).unwrap_err();
    assert!(matches!(err, EngineError::MissingFeature { ref feature, .. } if feature == "financial_activity"));
    assert!(matches!(
        scorer.score(&FeatureInput::Strict(v)),
        Err(EngineError::MissingFeature { .. })
    ));
}

#[test]
fn test_predict_with_uses_given_artifact() {
    let scorer = Scorer::new();
    let artifact = Arc::new(trained(TrainerConfig::quick()));
    let observed = FeatureInput::partial([("digital_score", 2.0)])
        .observe(&artifact.layout)
        .unwrap();

    // nothing attached: the slot is never read
    let p = scorer.predict_with(&artifact, &observed).unwrap();
    assert_eq!(p.artifact_id, artifact.id);
    assert_eq!(p.confidence.supplied, 1);

    scorer.attach(artifact.clone()).unwrap();
    let attached = scorer.score_observed(&observed).unwrap();
    assert_eq!(attached.probability.to_bits(), p.probability.to_bits());
}

#[test]
fn test_partial_matches_strict_when_complete() {
    let scorer = quick_scorer();
    let v = FeatureVector::new(1.0, 4.0, 2.0, 0.5, 0.8);
    let mapping: BTreeMap<String, f64> = v.named_values().map(|(n, x)| (n.to_string(), x)).collect();

    let strict = scorer.score_strict(&v).unwrap();
    let partial = scorer.score_partial(&mapping).unwrap();
    assert_eq!(strict.probability.to_bits(), partial.probability.to_bits());
    assert_eq!(strict.confidence, partial.confidence);
}

#[test]
fn test_partial_imputes_missing_fields() {
    let scorer = quick_scorer();
    let artifact = scorer.artifact().unwrap();

    let only_digital = FeatureInput::partial([("digital_score", 2.0)]);
    let p = scorer.score(&only_digital).unwrap();

    assert_eq!(p.confidence.supplied, 1);
    assert_eq!(p.confidence.level, ConfidenceLevel::Low);
    assert_eq!(p.imputed.len(), 4);
    assert_eq!(p.effective.digital_score, 2.0);
    assert_eq!(p.effective.financial_activity, artifact.imputation.financial_activity);

    let imputed_vector = FeatureVector::new(
        2.0,
        artifact.imputation.financial_activity,
        artifact.imputation.engagement,
        artifact.imputation.income_weight,
        artifact.imputation.employment_score,
    );
    let full = scorer.score_strict(&imputed_vector).unwrap();
    assert_eq!(full.probability.to_bits(), p.probability.to_bits());
    assert!(p.confidence.fraction < full.confidence.fraction);
}

#[test]
fn test_partial_unknown_feature() {
    let scorer = quick_scorer();
    let err = scorer
        .score(&FeatureInput::partial([("digital_score", 1.0), ("credit_limit", 500.0)]))
        .unwrap_err();
    assert!(matches!(err, EngineError::SchemaMismatch(ref m) if m.contains("credit_limit")));
}

#[test]
fn test_confidence_levels() {
    let policy = ConfidencePolicy::default();
    let levels: Vec<ConfidenceLevel> = (0..=5)
        .map(|n| Confidence::from_supplied(n, &policy).level)
        .collect();
    assert_eq!(
        levels,
        vec![
            ConfidenceLevel::Low,
            ConfidenceLevel::Low,
            ConfidenceLevel::Low,
            ConfidenceLevel::Medium,
            ConfidenceLevel::Medium,
            ConfidenceLevel::High,
        ]
    );
    assert_eq!(Confidence::from_supplied(4, &policy).fraction, 0.8);
}

#[test]
fn test_confidence_monotonic_in_missingness() {
    let scorer = quick_scorer();
    let full = [
        ("digital_score", 2.0),
        ("financial_activity", 3.0),
        ("engagement", 1.0),
        ("income_weight", 0.75),
        ("employment_score", 0.9),
    ];

    let mut previous: Option<Confidence> = None;
    for keep in (0..=full.len()).rev() {
        let input = FeatureInput::partial(full[..keep].iter().copied());
        let confidence = scorer.score(&input).unwrap().confidence;
        if let Some(prev) = previous {
            assert!(confidence.fraction < prev.fraction);
            assert!(confidence.level <= prev.level);
        }
        previous = Some(confidence);
    }
}

#[test]
fn test_attach_swaps_artifact() {
    let scorer = Scorer::new();
    let first = Arc::new(trained(TrainerConfig::quick()));
    let second = Arc::new(trained(TrainerConfig {
        seed: 7,
        ..TrainerConfig::quick()
    }));

    assert!(scorer.attach(first.clone()).unwrap().is_none());
    let replaced = scorer.attach(second.clone()).unwrap().unwrap();
    assert_eq!(replaced.id, first.id);

    let p = scorer
        .score_strict(&FeatureVector::new(0.0, 0.0, 0.0, 0.25, 0.2))
        .unwrap();
    assert_eq!(p.artifact_id, second.id);

    assert!(scorer.detach().is_some());
    assert!(!scorer.is_loaded());
}

#[test]
fn test_scorer_shared_across_threads() {
    let scorer = Arc::new(quick_scorer());
    let v = FeatureVector::new(3.0, 4.0, 2.0, 1.0, 1.0);
    let expected = scorer.score_strict(&v).unwrap().probability;

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let scorer = Arc::clone(&scorer);
            std::thread::spawn(move || scorer.score_strict(&v).unwrap().probability)
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap().to_bits(), expected.to_bits());
    }
}
