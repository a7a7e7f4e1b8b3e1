//! Backend payloads to unified outcome records. No I/O, no defaults beyond
//! label normalization.

use shared::{
    domain::{BatchOutcome, BatchSummary, ClassificationOutcome, PredictionLabel, RowResult},
    protocol::{BatchResponse, ManualPredictionResponse, RowPayload, StellarRecord},
};

pub fn normalize_batch(payload: BatchResponse) -> ClassificationOutcome {
    let BatchResponse {
        summary,
        results,
        predictions,
    } = payload;

    let rows: Vec<RowResult> = results
        .or(predictions)
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(index, row)| normalize_row(index, row))
        .collect();

    let summary = summary.unwrap_or_else(|| derive_summary(&rows));
    ClassificationOutcome::Batch(BatchOutcome { summary, rows })
}

fn normalize_row(index: usize, row: RowPayload) -> RowResult {
    let row_number = row
        .row_number
        .filter(|n| *n > 0)
        .unwrap_or_else(|| u32::try_from(index + 1).unwrap_or(u32::MAX));
    let error = row.error.filter(|e| !e.trim().is_empty());
    let label = if error.is_some() {
        PredictionLabel::Unknown
    } else {
        row_label(row.prediction.as_deref(), row.is_exoplanet)
    };

    RowResult {
        row_number,
        label,
        error,
        probabilities: row.proba.unwrap_or_default(),
    }
}

fn row_label(prediction: Option<&str>, is_exoplanet: Option<bool>) -> PredictionLabel {
    match (prediction, is_exoplanet) {
        (Some(raw), _) => PredictionLabel::parse(raw).unwrap_or_default(),
        (None, Some(true)) => PredictionLabel::Confirmed,
        (None, Some(false)) => PredictionLabel::FalsePositive,
        (None, None) => PredictionLabel::Unknown,
    }
}

fn derive_summary(rows: &[RowResult]) -> BatchSummary {
    let total = rows.len() as u64;
    let errors = rows.iter().filter(|r| r.error.is_some()).count() as u64;
    let exoplanets = rows
        .iter()
        .filter(|r| r.label == PredictionLabel::Confirmed)
        .count() as u64;
    BatchSummary {
        total_rows_processed: total,
        exoplanets_found: exoplanets,
        errors,
        non_exoplanets: Some(total.saturating_sub(exoplanets + errors)),
    }
}

pub fn normalize_stellar(record: StellarRecord) -> ClassificationOutcome {
    ClassificationOutcome::Stellar(record)
}

pub fn normalize_manual(payload: ManualPredictionResponse) -> ClassificationOutcome {
    ClassificationOutcome::SinglePrediction {
        label: payload
            .prediction
            .as_deref()
            .map(|raw| PredictionLabel::parse(raw).unwrap_or_default()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn batch(value: serde_json::Value) -> BatchOutcome {
        let payload: BatchResponse = serde_json::from_value(value).expect("payload");
        match normalize_batch(payload) {
            ClassificationOutcome::Batch(outcome) => outcome,
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn keeps_row_order_and_defaults_unknown_labels() {
        let outcome = batch(json!({
            "summary": {"total_rows_processed": 3, "exoplanets_found": 1, "errors": 0},
            "results": [
                {"row_number": 3, "prediction": "CANDIDATE"},
                {"row_number": 1, "prediction": "SOMETHING ELSE"},
                {"row_number": 2}
            ]
        }));
        let numbers: Vec<_> = outcome.rows.iter().map(|r| r.row_number).collect();
        assert_eq!(numbers, vec![3, 1, 2]);
        assert_eq!(outcome.rows[0].label, PredictionLabel::Candidate);
        assert_eq!(outcome.rows[1].label, PredictionLabel::Unknown);
        assert_eq!(outcome.rows[2].label, PredictionLabel::Unknown);
        assert_eq!(outcome.summary.non_exoplanets, None);
    }

    #[test]
    fn maps_is_exoplanet_flag_when_prediction_missing() {
        let outcome = batch(json!({
            "summary": {"total_rows_processed": 2, "exoplanets_found": 1, "errors": 0, "non_exoplanets": 1},
            "results": [
                {"row_number": 1, "is_exoplanet": true},
                {"row_number": 2, "is_exoplanet": false}
            ]
        }));
        assert_eq!(outcome.rows[0].label, PredictionLabel::Confirmed);
        assert_eq!(outcome.rows[1].label, PredictionLabel::FalsePositive);
        assert_eq!(outcome.summary.non_exoplanets, Some(1));
    }

    #[test]
    fn row_errors_win_over_labels() {
        let outcome = batch(json!({
            "summary": {"total_rows_processed": 1, "exoplanets_found": 0, "errors": 1},
            "results": [{"row_number": 1, "prediction": "CONFIRMED", "error": "could not convert 'abc'"}]
        }));
        assert_eq!(outcome.rows[0].label, PredictionLabel::Unknown);
        assert_eq!(
            outcome.rows[0].error.as_deref(),
            Some("could not convert 'abc'")
        );
    }

    #[test]
    fn derives_summary_for_bare_prediction_lists() {
        let outcome = batch(json!({
            "predictions": [
                {"prediction": "CONFIRMED", "proba": [0.05, 0.15, 0.8]},
                {"prediction": "FALSE POSITIVE", "proba": [0.9, 0.05, 0.05]},
                {"error": "bad row"},
                {"prediction": "CANDIDATE"}
            ]
        }));
        let numbers: Vec<_> = outcome.rows.iter().map(|r| r.row_number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4]);
        assert_eq!(outcome.rows[0].probabilities, vec![0.05, 0.15, 0.8]);
        assert_eq!(
            outcome.summary,
            BatchSummary {
                total_rows_processed: 4,
                exoplanets_found: 1,
                errors: 1,
                non_exoplanets: Some(2),
            }
        );
    }

    #[test]
    fn manual_prediction_carries_only_the_label() {
        let outcome = normalize_manual(ManualPredictionResponse {
            prediction: Some("FALSE POSITIVE".into()),
            proba: Some(vec![0.7, 0.2, 0.1]),
        });
        assert_eq!(
            outcome,
            ClassificationOutcome::SinglePrediction {
                label: Some(PredictionLabel::FalsePositive)
            }
        );
        assert_eq!(
            normalize_manual(ManualPredictionResponse::default()),
            ClassificationOutcome::SinglePrediction { label: None }
        );
    }

    #[test]
    fn stellar_record_passes_through_untouched() {
        let record: StellarRecord =
            serde_json::from_value(json!({"name": "Kepler-186", "numberOfPlanets": "5"}))
                .expect("record");
        match normalize_stellar(record.clone()) {
            ClassificationOutcome::Stellar(out) => assert_eq!(out, record),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}
