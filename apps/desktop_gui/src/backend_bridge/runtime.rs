//! Runtime bridge between UI command queue and backend event intake.

use std::thread;

use client_core::{
    load_precomputed_results, ClassificationBackend, DatasetFile, HttpDispatcher, Settings,
};
use crossbeam_channel::{Receiver, Sender};

use crate::backend_bridge::commands::BackendCommand;
use crate::backend_bridge::star_image::fetch_star_image;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

pub fn launch(cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>, settings: Settings) {
    thread::spawn(move || {
        let _ = ui_tx.try_send(UiEvent::Info("Backend worker starting...".to_string()));
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            let dispatcher = match HttpDispatcher::from_settings(&settings) {
                Ok(dispatcher) => dispatcher,
                Err(err) => {
                    let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                        UiErrorContext::BackendStartup,
                        err.to_string(),
                    )));
                    tracing::error!("invalid backend configuration: {err}");
                    return;
                }
            };
            let image_http = match reqwest::Client::builder()
                .timeout(settings.request_timeout())
                .build()
            {
                Ok(client) => client,
                Err(err) => {
                    let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                        UiErrorContext::BackendStartup,
                        format!("failed to build image client: {err}"),
                    )));
                    tracing::error!("failed to build image http client: {err}");
                    return;
                }
            };
            tracing::info!(backend = dispatcher.base_url(), "backend worker ready");
            let _ = ui_tx.try_send(UiEvent::Info(format!(
                "Backend worker ready ({})",
                dispatcher.base_url()
            )));

            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    BackendCommand::Analyze {
                        generation,
                        request,
                    } => {
                        let outcome = dispatcher.dispatch(request).await;
                        let _ = ui_tx.send(UiEvent::AnalysisFinished {
                            generation,
                            outcome,
                        });
                    }
                    BackendCommand::ReadDataset { path } => {
                        let event = match DatasetFile::read(&path).await {
                            Ok(file) => UiEvent::DatasetRead(file),
                            Err(err) => UiEvent::Error(UiError::from_message(
                                UiErrorContext::DatasetRead,
                                err.to_string(),
                            )),
                        };
                        let _ = ui_tx.send(event);
                    }
                    BackendCommand::LoadDashboard { path } => {
                        let event = match load_precomputed_results(&path).await {
                            Ok(candidates) => UiEvent::DashboardLoaded(candidates),
                            Err(err) => UiEvent::Error(UiError::from_message(
                                UiErrorContext::Dashboard,
                                err.to_string(),
                            )),
                        };
                        let _ = ui_tx.send(event);
                    }
                    BackendCommand::FetchStarImage { url } => {
                        let event = match fetch_star_image(&image_http, &url).await {
                            Ok(image) => UiEvent::StarImageLoaded { url, image },
                            Err(reason) => {
                                tracing::warn!(url = %url, "star image unavailable: {reason}");
                                UiEvent::StarImageFailed { url, reason }
                            }
                        };
                        let _ = ui_tx.send(event);
                    }
                }
            }
            tracing::info!("backend worker stopped: command channel closed");
        });
    });
}
