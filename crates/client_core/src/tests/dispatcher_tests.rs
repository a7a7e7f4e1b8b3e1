use super::*;
use std::{
    fs,
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use axum::{
    extract::{Multipart, State},
    http::{header, StatusCode, Uri},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde_json::json;
use shared::domain::{ManualField, PredictionLabel};
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Debug, Clone)]
enum Captured {
    Upload {
        field: String,
        file_name: Option<String>,
        body: String,
    },
    Json {
        path: String,
        body: Value,
    },
}

#[derive(Clone)]
struct MockState {
    captured: Arc<Mutex<Vec<Captured>>>,
    status: StatusCode,
    body: Arc<String>,
}

impl MockState {
    fn reply(&self) -> impl IntoResponse {
        (
            self.status,
            [(header::CONTENT_TYPE, "application/json")],
            self.body.as_str().to_owned(),
        )
    }
}

async fn handle_upload(State(state): State<MockState>, mut multipart: Multipart) -> impl IntoResponse {
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let body = field.text().await.unwrap_or_default();
        state.captured.lock().await.push(Captured::Upload {
            field: name,
            file_name,
            body,
        });
    }
    state.reply()
}

async fn handle_json(
    State(state): State<MockState>,
    uri: Uri,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    state.captured.lock().await.push(Captured::Json {
        path: uri.path().to_string(),
        body,
    });
    state.reply()
}

async fn spawn_mock_service(
    status: StatusCode,
    body: impl Into<String>,
) -> std::io::Result<(String, Arc<Mutex<Vec<Captured>>>)> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let captured = Arc::new(Mutex::new(Vec::new()));
    let state = MockState {
        captured: captured.clone(),
        status,
        body: Arc::new(body.into()),
    };
    let app = Router::new()
        .route(BATCH_ENDPOINT, post(handle_upload))
        .route(STAR_INFO_ENDPOINT, post(handle_json))
        .route(PREDICT_SINGLE_ENDPOINT, post(handle_json))
        .with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}"), captured))
}

fn temp_path(name: &str) -> PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    std::env::temp_dir().join(format!("exoscope_dispatch_{suffix}_{name}"))
}

fn expect_failure(outcome: ClassificationOutcome) -> AnalysisError {
    match outcome {
        ClassificationOutcome::Failure(err) => err,
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn batch_upload_reports_malformed_row() {
    let body = json!({
        "summary": {"total_rows_processed": 3, "exoplanets_found": 1, "errors": 1, "non_exoplanets": 1},
        "results": [
            {"row_number": 1, "prediction": "CONFIRMED", "proba": [0.01, 0.09, 0.9]},
            {"row_number": 2, "error": "could not convert string to float: 'n/a'"},
            {"row_number": 3, "prediction": "FALSE POSITIVE"}
        ]
    });
    let (server_url, captured) = spawn_mock_service(StatusCode::OK, body.to_string())
        .await
        .expect("spawn server");
    let dispatcher = HttpDispatcher::new(server_url, temp_path("unused.csv"));

    let csv = "koi_period,koi_impact,koi_depth\n9.48,0.14,615\nn/a,0.2,100\n54.4,0.5,874\n";
    let outcome = dispatcher
        .dispatch(AnalysisRequest::Upload(UploadSource::File(DatasetFile::new(
            "three_rows.csv",
            csv.as_bytes().to_vec(),
        ))))
        .await;

    let batch = match outcome {
        ClassificationOutcome::Batch(batch) => batch,
        other => panic!("unexpected outcome: {other:?}"),
    };
    assert_eq!(batch.summary.total_rows_processed, 3);
    assert!(batch.rows[1].error.is_some());
    assert_eq!(batch.rows[0].label, PredictionLabel::Confirmed);
    assert_eq!(batch.rows[2].label, PredictionLabel::FalsePositive);
    assert!(batch.rows[0].error.is_none() && batch.rows[2].error.is_none());

    let captured = captured.lock().await;
    match captured.as_slice() {
        [Captured::Upload {
            field,
            file_name,
            body,
        }] => {
            assert_eq!(field, BATCH_FILE_FIELD);
            assert_eq!(file_name.as_deref(), Some("three_rows.csv"));
            assert_eq!(body, csv);
        }
        other => panic!("unexpected capture: {other:?}"),
    }
}

#[tokio::test]
async fn bundled_default_is_read_from_disk_and_uploaded() {
    let default_path = temp_path("default.csv");
    fs::write(&default_path, "koi_period,koi_impact,koi_depth\n75,0.7,23791\n").expect("write");
    let body = json!({
        "summary": {"total_rows_processed": 1, "exoplanets_found": 0, "errors": 0},
        "results": [{"row_number": 1, "prediction": "CANDIDATE"}]
    });
    let (server_url, captured) = spawn_mock_service(StatusCode::OK, body.to_string())
        .await
        .expect("spawn server");
    let dispatcher = HttpDispatcher::new(server_url, &default_path);

    let outcome = dispatcher
        .dispatch(AnalysisRequest::Upload(UploadSource::BundledDefault))
        .await;
    assert!(matches!(outcome, ClassificationOutcome::Batch(_)));

    let captured = captured.lock().await;
    match captured.as_slice() {
        [Captured::Upload { body, .. }] => assert!(body.contains("23791")),
        other => panic!("unexpected capture: {other:?}"),
    }
    fs::remove_file(default_path).expect("cleanup");
}

#[tokio::test]
async fn missing_default_dataset_fails_before_any_request() {
    let (server_url, captured) = spawn_mock_service(StatusCode::OK, "{}")
        .await
        .expect("spawn server");
    let dispatcher = HttpDispatcher::new(server_url, temp_path("absent.csv"));

    let err = expect_failure(
        dispatcher
            .dispatch(AnalysisRequest::Upload(UploadSource::BundledDefault))
            .await,
    );
    assert_eq!(err.kind, ErrorKind::Dataset);
    assert!(err.message.starts_with("Failed to load default dataset"));
    assert!(captured.lock().await.is_empty());
}

#[tokio::test]
async fn catalog_lookup_keeps_record_fields_verbatim() {
    let body = json!({
        "name": "Kepler-186",
        "imageUrl": "https://skyview.gsfc.nasa.gov/current/cgi/runquery.pl?Survey=DSS2+Red",
        "spectralType": null,
        "numberOfStars": "1",
        "numberOfPlanets": "5",
        "distance": "177.59 parsecs",
        "constellation": "Cygnus"
    });
    let (server_url, captured) = spawn_mock_service(StatusCode::OK, body.to_string())
        .await
        .expect("spawn server");
    let dispatcher = HttpDispatcher::new(format!("{server_url}/"), temp_path("unused.csv"));

    let outcome = dispatcher
        .dispatch(AnalysisRequest::CatalogLookup {
            identifier: "Kepler-186".into(),
        })
        .await;
    let record = match outcome {
        ClassificationOutcome::Stellar(record) => record,
        other => panic!("unexpected outcome: {other:?}"),
    };
    assert_eq!(record.number_of_planets, Some(Value::String("5".into())));
    assert_eq!(record.spectral_type, None);
    assert_eq!(record.star_radius, None);
    assert_eq!(record.constellation.as_deref(), Some("Cygnus"));

    let captured = captured.lock().await;
    match captured.as_slice() {
        [Captured::Json { path, body }] => {
            assert_eq!(path, STAR_INFO_ENDPOINT);
            assert_eq!(body, &json!({"star_name": "Kepler-186"}));
        }
        other => panic!("unexpected capture: {other:?}"),
    }
}

#[tokio::test]
async fn explicit_error_field_fails_despite_success_status() {
    let (server_url, _captured) = spawn_mock_service(
        StatusCode::OK,
        json!({"error": "Star not found in NASA's archive."}).to_string(),
    )
    .await
    .expect("spawn server");
    let dispatcher = HttpDispatcher::new(server_url, temp_path("unused.csv"));

    let err = expect_failure(
        dispatcher
            .dispatch(AnalysisRequest::CatalogLookup {
                identifier: "Nowhere-1".into(),
            })
            .await,
    );
    assert_eq!(err.kind, ErrorKind::Backend);
    assert_eq!(err.message, "Star not found in NASA's archive.");
}

#[tokio::test]
async fn error_status_surfaces_backend_detail() {
    let (server_url, _captured) = spawn_mock_service(
        StatusCode::BAD_REQUEST,
        json!({"detail": "Missing required columns: ['depth']"}).to_string(),
    )
    .await
    .expect("spawn server");
    let dispatcher = HttpDispatcher::new(server_url, temp_path("unused.csv"));

    let err = expect_failure(
        dispatcher
            .dispatch(AnalysisRequest::Upload(UploadSource::File(DatasetFile::new(
                "bad.csv",
                b"period,impact\n1,2\n".to_vec(),
            ))))
            .await,
    );
    assert_eq!(err.kind, ErrorKind::Backend);
    assert_eq!(err.message, "Missing required columns: ['depth']");
}

#[tokio::test]
async fn error_status_without_message_uses_generic_text() {
    let (server_url, _captured) = spawn_mock_service(StatusCode::INTERNAL_SERVER_ERROR, "oops")
        .await
        .expect("spawn server");
    let dispatcher = HttpDispatcher::new(server_url, temp_path("unused.csv"));

    let err = expect_failure(
        dispatcher
            .dispatch(AnalysisRequest::ManualEntry(ManualParameters::default()))
            .await,
    );
    assert_eq!(err.message, PREDICTION_FAILED);
}

#[tokio::test]
async fn manual_entry_posts_all_twelve_fields() {
    let (server_url, captured) = spawn_mock_service(
        StatusCode::OK,
        json!({"prediction": "CONFIRMED", "proba": [0.02, 0.08, 0.9]}).to_string(),
    )
    .await
    .expect("spawn server");
    let dispatcher = HttpDispatcher::new(server_url, temp_path("unused.csv"));

    let outcome = dispatcher
        .dispatch(AnalysisRequest::ManualEntry(ManualParameters::default()))
        .await;
    assert_eq!(
        outcome,
        ClassificationOutcome::SinglePrediction {
            label: Some(PredictionLabel::Confirmed)
        }
    );

    let captured = captured.lock().await;
    let body = match captured.as_slice() {
        [Captured::Json { path, body }] => {
            assert_eq!(path, PREDICT_SINGLE_ENDPOINT);
            body.clone()
        }
        other => panic!("unexpected capture: {other:?}"),
    };
    let object = body.as_object().expect("object body");
    assert_eq!(object.len(), ManualField::COUNT);
    for field in ManualField::ALL {
        assert!(object.contains_key(field.key()), "missing {}", field.key());
    }
    assert_eq!(object["koi_depth"].as_f64(), Some(23791.0));
}

#[tokio::test]
async fn success_status_with_non_json_body_is_a_decode_failure() {
    let (server_url, _captured) = spawn_mock_service(StatusCode::OK, "<html>proxy</html>")
        .await
        .expect("spawn server");
    let dispatcher = HttpDispatcher::new(server_url, temp_path("unused.csv"));

    let err = expect_failure(
        dispatcher
            .dispatch(AnalysisRequest::CatalogLookup {
                identifier: "Kepler-186".into(),
            })
            .await,
    );
    assert_eq!(err.kind, ErrorKind::Decode);
}

#[tokio::test]
async fn unreachable_service_is_a_network_failure() {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let dispatcher = HttpDispatcher::new(format!("http://{addr}"), temp_path("unused.csv"));
    let err = expect_failure(
        dispatcher
            .dispatch(AnalysisRequest::CatalogLookup {
                identifier: "Kepler-186".into(),
            })
            .await,
    );
    assert_eq!(err.kind, ErrorKind::Network);
    assert!(!err.message.is_empty());
}

#[test]
fn from_settings_rejects_invalid_backend_url() {
    let settings = Settings {
        backend_url: "localhost without scheme".into(),
        ..Settings::default()
    };
    assert!(matches!(
        HttpDispatcher::from_settings(&settings),
        Err(DispatchError::Config(_))
    ));
}

#[test]
fn from_settings_trims_trailing_slash() {
    let settings = Settings {
        backend_url: "http://127.0.0.1:8000/".into(),
        ..Settings::default()
    };
    let dispatcher = HttpDispatcher::from_settings(&settings).expect("dispatcher");
    assert_eq!(dispatcher.base_url(), "http://127.0.0.1:8000");
}
