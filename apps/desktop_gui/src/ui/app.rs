use std::{
    path::PathBuf,
    time::{Duration, Instant},
};

use client_core::{
    presenter::{
        disposition_tone, error_placement, label_tone, prediction_text, BatchView, ErrorPlacement,
        StellarView, Tone, FAILURE_TITLE,
    },
    selection::DETAIL_PLACEHOLDER,
    compute_geometry, AcquisitionController, CandidateSelector, DetailView, Settings,
    TransitInputs, FRAME_INTERVAL,
};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use egui::TextureHandle;
use serde::{Deserialize, Serialize};
use shared::domain::{AcquisitionMode, BatchOutcome, ClassificationOutcome, ManualField};
use shared::error::ValidationError;

use crate::backend_bridge::commands::BackendCommand;
use crate::backend_bridge::star_image::DecodedImage;
use crate::controller::events::{UiErrorContext, UiEvent};
use crate::controller::orchestration::dispatch_backend_command;
use crate::ui::transit::{paint_transit, tone_color};

pub const SETTINGS_STORAGE_KEY: &str = "exoscope_gui.state";
const IDLE_REPAINT: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AppView {
    #[default]
    Analysis,
    Dashboard,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedGuiState {
    pub view: AppView,
    pub mode: AcquisitionMode,
}

/// Sky-survey image for the stellar outcome, keyed by its URL.
enum StarImageState {
    Idle,
    Loading {
        url: String,
    },
    Ready {
        url: String,
        image: DecodedImage,
        texture: Option<TextureHandle>,
    },
    Failed {
        url: String,
        reason: String,
    },
}

impl StarImageState {
    fn is_loading(&self, expected: &str) -> bool {
        matches!(self, StarImageState::Loading { url } if url == expected)
    }
}

pub struct DesktopGuiApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    settings: Settings,
    view: AppView,
    analysis: AcquisitionController,
    dashboard: CandidateSelector,
    dashboard_requested: bool,
    dashboard_error: Option<String>,
    star_image: StarImageState,
    status: String,
}

impl DesktopGuiApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        settings: Settings,
        persisted: Option<PersistedGuiState>,
    ) -> Self {
        let mut app = Self {
            cmd_tx,
            ui_rx,
            settings,
            view: AppView::Analysis,
            analysis: AcquisitionController::new(),
            dashboard: CandidateSelector::new(),
            dashboard_requested: false,
            dashboard_error: None,
            star_image: StarImageState::Idle,
            status: String::new(),
        };
        if let Some(state) = persisted {
            app.analysis.switch_mode(state.mode);
            app.set_view(state.view);
        }
        app
    }

    fn set_status(&mut self, text: impl AsRef<str>) {
        self.status = format!(
            "[{}] {}",
            chrono::Local::now().format("%H:%M:%S"),
            text.as_ref()
        );
    }

    fn set_view(&mut self, view: AppView) {
        if self.view == view {
            return;
        }
        self.view = view;
        match view {
            AppView::Dashboard => {
                self.dashboard.mount();
                if !self.dashboard_requested {
                    self.request_dashboard();
                }
            }
            AppView::Analysis => self.dashboard.unmount(),
        }
    }

    fn request_dashboard(&mut self) {
        self.dashboard_error = None;
        self.dashboard_requested = dispatch_backend_command(
            &self.cmd_tx,
            BackendCommand::LoadDashboard {
                path: self.settings.precomputed_results_path.clone(),
            },
            &mut self.status,
        );
    }

    fn submit_analysis(&mut self) {
        match self.analysis.submit() {
            Ok(pending) => {
                let queued = dispatch_backend_command(
                    &self.cmd_tx,
                    BackendCommand::Analyze {
                        generation: pending.generation,
                        request: pending.request,
                    },
                    &mut self.status,
                );
                if !queued {
                    self.analysis.reset();
                }
            }
            Err(ValidationError::Busy) => self.set_status(ValidationError::Busy.to_string()),
            // Shown by the outcome pane.
            Err(_) => {}
        }
    }

    fn request_star_image(&mut self, url: Option<String>) {
        self.star_image = match url {
            Some(url) => {
                let queued = dispatch_backend_command(
                    &self.cmd_tx,
                    BackendCommand::FetchStarImage { url: url.clone() },
                    &mut self.status,
                );
                if queued {
                    StarImageState::Loading { url }
                } else {
                    StarImageState::Failed {
                        url,
                        reason: "backend unavailable".to_string(),
                    }
                }
            }
            None => StarImageState::Idle,
        };
    }

    fn pick_dataset(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV", &["csv"])
            .pick_file()
        {
            self.queue_dataset_read(path);
        }
    }

    fn queue_dataset_read(&mut self, path: PathBuf) {
        dispatch_backend_command(
            &self.cmd_tx,
            BackendCommand::ReadDataset { path },
            &mut self.status,
        );
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Info(message) => self.set_status(message),
                UiEvent::AnalysisFinished {
                    generation,
                    outcome,
                } => {
                    let failed = outcome.is_failure();
                    let image_url = star_image_url(&outcome);
                    if self.analysis.complete(generation, outcome) {
                        self.request_star_image(image_url);
                        self.set_status(if failed {
                            "Analysis failed"
                        } else {
                            "Analysis complete"
                        });
                    }
                }
                UiEvent::DatasetRead(file) => {
                    let name = file.file_name.clone();
                    self.analysis.attach_file(file);
                    self.set_status(format!("Attached {name}"));
                }
                UiEvent::DashboardLoaded(candidates) => {
                    let count = candidates.len();
                    self.dashboard.load(candidates);
                    if self.view != AppView::Dashboard {
                        self.dashboard.unmount();
                    }
                    self.set_status(format!("Loaded {count} candidates"));
                }
                UiEvent::StarImageLoaded { url, image } => {
                    if self.star_image.is_loading(&url) {
                        self.star_image = StarImageState::Ready {
                            url,
                            image,
                            texture: None,
                        };
                    }
                }
                UiEvent::StarImageFailed { url, reason } => {
                    if self.star_image.is_loading(&url) {
                        self.star_image = StarImageState::Failed { url, reason };
                    }
                }
                UiEvent::Error(err) => {
                    tracing::warn!(context = ?err.context(), "{}", err.message());
                    if err.context() == UiErrorContext::Dashboard {
                        self.dashboard_requested = false;
                        self.dashboard_error = Some(err.status_text());
                    }
                    self.set_status(err.status_text());
                }
            }
        }
    }

    fn show_top_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Exoscope");
                ui.separator();
                let mut requested = None;
                for (view, label) in [
                    (AppView::Analysis, "Analysis"),
                    (AppView::Dashboard, "Results Dashboard"),
                ] {
                    if ui.selectable_label(self.view == view, label).clicked() {
                        requested = Some(view);
                    }
                }
                if let Some(view) = requested {
                    self.set_view(view);
                }
            });
        });
    }

    fn show_status_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(&self.status).small());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(egui::RichText::new(&self.settings.backend_url).small().weak());
                });
            });
        });
    }

    fn show_analysis(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                for mode in AcquisitionMode::ALL {
                    if ui
                        .selectable_label(self.analysis.mode() == mode, mode.label())
                        .clicked()
                    {
                        self.analysis.switch_mode(mode);
                    }
                }
            });
            ui.separator();

            let mode = self.analysis.mode();
            if mode != AcquisitionMode::ManualEntry && self.show_outcome_pane(ui) {
                return;
            }

            egui::ScrollArea::vertical().show(ui, |ui| match mode {
                AcquisitionMode::Upload => self.show_upload_form(ui),
                AcquisitionMode::CatalogLookup => self.show_catalog_form(ui),
                AcquisitionMode::ManualEntry => self.show_manual_form(ui),
            });
        });
    }

    /// Loading, full-pane error, or result. Returns `true` when the pane was
    /// drawn in place of the form.
    fn show_outcome_pane(&mut self, ui: &mut egui::Ui) -> bool {
        if self.analysis.is_loading() {
            ui.vertical_centered(|ui| {
                ui.add_space(40.0);
                ui.spinner();
                ui.label("Contacting Deep Space Network...");
                ui.label(egui::RichText::new("The model is analyzing the stellar data.").weak());
            });
            return true;
        }

        if let Some(error) = self.analysis.error() {
            if error_placement(self.analysis.mode()) == ErrorPlacement::FullPane {
                let message = error.message.clone();
                ui.vertical_centered(|ui| {
                    ui.add_space(40.0);
                    ui.label(
                        egui::RichText::new(FAILURE_TITLE)
                            .size(20.0)
                            .color(tone_color(Tone::Negative)),
                    );
                    ui.label(message);
                    ui.add_space(12.0);
                    if ui.button("Back").clicked() {
                        self.analysis.reset();
                    }
                });
                return true;
            }
        }

        let mut back = false;
        let shown = match self.analysis.outcome() {
            Some(ClassificationOutcome::Batch(batch)) => {
                show_batch(ui, batch);
                true
            }
            Some(ClassificationOutcome::Stellar(record)) => {
                show_stellar(ui, &StellarView::from_record(record), &mut self.star_image);
                true
            }
            _ => false,
        };
        if shown {
            ui.add_space(12.0);
            back = ui.button("New analysis").clicked();
        }
        if back {
            self.analysis.reset();
        }
        shown
    }

    fn show_upload_form(&mut self, ui: &mut egui::Ui) {
        ui.heading("Upload Data File");
        ui.label("Upload a CSV with period, impact, and depth columns for batch analysis.");
        ui.add_space(8.0);

        let use_default = self.analysis.uses_bundled_default();
        if ui.radio(use_default, "Use Default Sample Data").clicked() {
            self.analysis.set_use_bundled_default(true);
        }
        if ui.radio(!use_default, "Upload Custom File").clicked() {
            self.analysis.set_use_bundled_default(false);
        }

        if !self.analysis.uses_bundled_default() {
            egui::Frame::group(ui.style()).show(ui, |ui| {
                ui.horizontal(|ui| {
                    if ui.button("Browse...").clicked() {
                        self.pick_dataset();
                    }
                    match self.analysis.attached_file() {
                        Some(file) => {
                            ui.label(format!("{} ({} bytes)", file.file_name, file.size_bytes()));
                            if ui.small_button("Remove").clicked() {
                                self.analysis.clear_attachment();
                            }
                        }
                        None => {
                            ui.label(egui::RichText::new("No file selected").weak());
                        }
                    }
                });
            });
        }

        ui.add_space(12.0);
        let enabled = !self.analysis.is_loading();
        if ui
            .add_enabled(enabled, egui::Button::new("Analyze File"))
            .clicked()
        {
            self.submit_analysis();
        }
    }

    fn show_catalog_form(&mut self, ui: &mut egui::Ui) {
        ui.heading("Search by Star ID");
        ui.label("Enter a catalog identifier such as Kepler-186.");
        ui.add_space(8.0);
        let response = ui.add(
            egui::TextEdit::singleline(self.analysis.identifier_mut())
                .hint_text("Star ID")
                .desired_width(280.0),
        );
        let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

        ui.add_space(12.0);
        let enabled = !self.analysis.is_loading();
        let clicked = ui
            .add_enabled(enabled, egui::Button::new("Analyze Star"))
            .clicked();
        if enabled && (clicked || submitted) {
            self.submit_analysis();
        }
    }

    fn show_manual_form(&mut self, ui: &mut egui::Ui) {
        ui.heading("Manual Entry");
        ui.label("Manually enter exoplanet parameters to get a prediction from the model.");
        ui.add_space(8.0);

        ui.horizontal_top(|ui| {
            egui::Grid::new("manual_fields")
                .num_columns(2)
                .striped(true)
                .show(ui, |ui| {
                    for field in ManualField::ALL {
                        ui.label(field.label());
                        ui.add(
                            egui::TextEdit::singleline(self.analysis.manual_text_mut(field))
                                .desired_width(120.0),
                        );
                        ui.end_row();
                    }
                });

            ui.add_space(16.0);
            let parameters = self.analysis.manual_parameters();
            let geometry = compute_geometry(TransitInputs::new(
                parameters.koi_period,
                parameters.koi_impact,
                parameters.koi_depth,
            ));
            ui.vertical(|ui| {
                ui.label(egui::RichText::new("Transit preview").weak());
                paint_transit(ui, &geometry, None);
            });
        });

        ui.add_space(12.0);
        ui.horizontal(|ui| {
            let loading = self.analysis.is_loading();
            if ui
                .add_enabled(!loading, egui::Button::new("Classify Data Point"))
                .clicked()
            {
                self.submit_analysis();
            }
            if ui.button("Reset fields").clicked() {
                self.analysis.reset_manual_fields();
            }
            if loading {
                ui.spinner();
            }
        });

        if let Some(error) = self.analysis.error() {
            ui.add_space(8.0);
            ui.colored_label(tone_color(Tone::Negative), &error.message);
        }

        if let Some(ClassificationOutcome::SinglePrediction { label }) = self.analysis.outcome() {
            let tone = label.map(label_tone).unwrap_or(Tone::Negative);
            ui.add_space(12.0);
            ui.vertical_centered(|ui| {
                ui.label(egui::RichText::new("Model Prediction:").weak());
                ui.label(
                    egui::RichText::new(prediction_text(*label))
                        .size(28.0)
                        .strong()
                        .color(tone_color(tone)),
                );
            });
        }
    }

    fn show_dashboard(&mut self, ctx: &egui::Context) {
        let mut clicked = None;
        let mut reload = false;
        egui::SidePanel::left("candidate_list")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading(results_heading(self.dashboard.len()));
                    reload = ui.small_button("Reload").clicked();
                });
                ui.separator();
                if let Some(error) = &self.dashboard_error {
                    ui.colored_label(tone_color(Tone::Negative), error);
                }
                egui::ScrollArea::vertical().show(ui, |ui| {
                    for entry in self.dashboard.entries() {
                        ui.horizontal(|ui| {
                            if ui.selectable_label(entry.selected, entry.name).clicked() {
                                clicked = Some(entry.index);
                            }
                            ui.colored_label(
                                tone_color(disposition_tone(entry.disposition)),
                                egui::RichText::new(entry.disposition.as_str()).small(),
                            );
                            ui.label(egui::RichText::new(format!("{:.2}", entry.score)).small());
                        });
                    }
                });
            });

        if reload {
            self.request_dashboard();
        }
        if let Some(index) = clicked {
            self.dashboard.select_index(index);
        }

        egui::CentralPanel::default().show(ctx, |ui| match self.dashboard.detail() {
            DetailView::Placeholder => {
                ui.centered_and_justified(|ui| {
                    ui.label(egui::RichText::new(DETAIL_PLACEHOLDER).size(18.0).weak());
                });
            }
            DetailView::Candidate(detail) => {
                ui.vertical_centered(|ui| {
                    ui.heading(&detail.candidate.name);
                });
                ui.add_space(8.0);
                let frame = self
                    .dashboard
                    .animation()
                    .and_then(|animation| animation.frame_at(Instant::now()));
                ui.horizontal_top(|ui| {
                    paint_transit(ui, &detail.geometry, frame);
                    ui.add_space(16.0);
                    ui.vertical(|ui| {
                        ui.label(format!("Status: {}", detail.status_text()));
                        ui.label(format!("Confidence Score: {}", detail.score_text()));
                        ui.label(format!("Orbital Period: {}", detail.period_text()));
                        ui.label(format!("Planet Radius: {}", detail.radius_text()));
                    });
                });
            }
        });
    }

    fn is_animating(&self) -> bool {
        self.view == AppView::Dashboard
            && self
                .dashboard
                .animation()
                .is_some_and(|animation| animation.is_running())
    }
}

fn show_batch(ui: &mut egui::Ui, batch: &BatchOutcome) {
    let view = BatchView::from_outcome(batch);
    ui.heading("Batch Analysis Complete");
    ui.add_space(8.0);
    ui.horizontal(|ui| {
        for (value, label, tone) in [
            (view.rows_processed, "Rows Processed", Tone::Muted),
            (view.exoplanets_found, "Exoplanets Found", Tone::Positive),
            (view.errors, "Errors", Tone::Negative),
        ] {
            egui::Frame::group(ui.style()).show(ui, |ui| {
                ui.vertical_centered(|ui| {
                    ui.label(
                        egui::RichText::new(value.to_string())
                            .size(22.0)
                            .strong()
                            .color(tone_color(tone)),
                    );
                    ui.label(egui::RichText::new(label).small());
                });
            });
        }
    });
    ui.add_space(8.0);
    egui::ScrollArea::vertical()
        .max_height(400.0)
        .show(ui, |ui| {
            for row in &view.rows {
                ui.horizontal(|ui| {
                    ui.label(
                        egui::RichText::new(format!("Row {}", row.row_number))
                            .monospace()
                            .weak(),
                    );
                    ui.colored_label(tone_color(row.tone), &row.text);
                });
            }
        });
}

fn results_heading(count: usize) -> String {
    format!("Analysis Results ({count})")
}

fn star_image_url(outcome: &ClassificationOutcome) -> Option<String> {
    match outcome {
        ClassificationOutcome::Stellar(record) => record
            .image_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_string),
        _ => None,
    }
}

fn show_stellar(ui: &mut egui::Ui, view: &StellarView, star_image: &mut StarImageState) {
    ui.vertical_centered(|ui| {
        ui.heading(&view.name);
        if let Some(url) = &view.image_url {
            show_star_image(ui, url.trim(), star_image);
        }
    });
    ui.add_space(8.0);
    for line in view.lines() {
        ui.label(line);
    }
}

/// Falls back to a plain link when the image is unavailable.
fn show_star_image(ui: &mut egui::Ui, url: &str, state: &mut StarImageState) {
    match state {
        StarImageState::Loading { url: pending } if pending.as_str() == url => {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Loading sky survey image...");
            });
        }
        StarImageState::Ready {
            url: ready,
            image,
            texture,
        } if ready.as_str() == url => {
            let texture = texture.get_or_insert_with(|| {
                let color_image =
                    egui::ColorImage::from_rgba_unmultiplied([image.width, image.height], &image.rgba);
                ui.ctx().load_texture(
                    format!("star_image:{url}"),
                    color_image,
                    egui::TextureOptions::LINEAR,
                )
            });
            ui.add(egui::Image::new(&*texture).max_size(egui::vec2(320.0, 320.0)));
        }
        StarImageState::Failed {
            url: failed,
            reason,
        } if failed.as_str() == url => {
            ui.colored_label(
                ui.visuals().error_fg_color,
                format!("Couldn't load sky survey image: {reason}"),
            );
            ui.hyperlink_to("Sky survey image", url);
        }
        _ => {
            ui.hyperlink_to("Sky survey image", url);
        }
    }
}

impl eframe::App for DesktopGuiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        self.show_top_bar(ctx);
        self.show_status_bar(ctx);
        match self.view {
            AppView::Analysis => self.show_analysis(ctx),
            AppView::Dashboard => self.show_dashboard(ctx),
        }

        if self.is_animating() {
            ctx.request_repaint_after(FRAME_INTERVAL);
        } else {
            ctx.request_repaint_after(IDLE_REPAINT);
        }
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        let state = PersistedGuiState {
            view: self.view,
            mode: self.analysis.mode(),
        };
        if let Ok(serialized) = serde_json::to_string(&state) {
            storage.set_string(SETTINGS_STORAGE_KEY, serialized);
        }
    }
}

#[cfg(test)]
mod tests {
    use crossbeam_channel::bounded;
    use shared::{
        domain::{Disposition, PlanetCandidate},
        protocol::StellarRecord,
    };

    use super::*;

    fn app_with_queue(
        capacity: usize,
    ) -> (DesktopGuiApp, Receiver<BackendCommand>, Sender<UiEvent>) {
        let (cmd_tx, cmd_rx) = bounded(capacity);
        let (ui_tx, ui_rx) = bounded(16);
        let app = DesktopGuiApp::new(cmd_tx, ui_rx, Settings::default(), None);
        (app, cmd_rx, ui_tx)
    }

    #[test]
    fn restores_persisted_mode() {
        let (cmd_tx, _cmd_rx) = bounded(4);
        let (_ui_tx, ui_rx) = bounded(4);
        let app = DesktopGuiApp::new(
            cmd_tx,
            ui_rx,
            Settings::default(),
            Some(PersistedGuiState {
                view: AppView::Analysis,
                mode: AcquisitionMode::ManualEntry,
            }),
        );
        assert_eq!(app.analysis.mode(), AcquisitionMode::ManualEntry);
    }

    #[test]
    fn submit_queues_analyze_command_and_applies_result() {
        let (mut app, cmd_rx, ui_tx) = app_with_queue(4);
        app.analysis.switch_mode(AcquisitionMode::CatalogLookup);
        app.submit_analysis();
        assert!(app.analysis.is_loading());

        let generation = match cmd_rx.try_recv().expect("queued command") {
            BackendCommand::Analyze { generation, .. } => generation,
            other => panic!("unexpected command: {}", other.name()),
        };
        ui_tx
            .send(UiEvent::AnalysisFinished {
                generation,
                outcome: ClassificationOutcome::Stellar(StellarRecord::default()),
            })
            .expect("send");
        app.process_ui_events();
        assert!(!app.analysis.is_loading());
        assert!(app.analysis.outcome().is_some());
    }

    fn take_generation(cmd_rx: &Receiver<BackendCommand>) -> shared::domain::RequestGeneration {
        match cmd_rx.try_recv().expect("queued command") {
            BackendCommand::Analyze { generation, .. } => generation,
            other => panic!("unexpected command: {}", other.name()),
        }
    }

    #[test]
    fn rejected_submit_leaves_status_line_alone() {
        let (mut app, cmd_rx, _ui_tx) = app_with_queue(4);
        app.analysis.switch_mode(AcquisitionMode::CatalogLookup);
        app.analysis.set_identifier("   ");
        app.submit_analysis();
        assert!(app.status.is_empty());
        assert!(app.analysis.error().is_some());
        assert!(cmd_rx.try_recv().is_err());
    }

    #[test]
    fn busy_submit_is_reported_on_the_status_line() {
        let (mut app, _cmd_rx, _ui_tx) = app_with_queue(4);
        app.submit_analysis();
        app.submit_analysis();
        assert!(app.status.ends_with("An analysis is already in progress."));
    }

    #[test]
    fn stellar_result_fetches_its_sky_image() {
        let (mut app, cmd_rx, ui_tx) = app_with_queue(4);
        app.analysis.switch_mode(AcquisitionMode::CatalogLookup);
        app.submit_analysis();
        let generation = take_generation(&cmd_rx);

        let url = "https://skyview.invalid/kepler-186.jpg";
        let record = StellarRecord {
            name: Some("Kepler-186".into()),
            image_url: Some(url.into()),
            ..StellarRecord::default()
        };
        ui_tx
            .send(UiEvent::AnalysisFinished {
                generation,
                outcome: ClassificationOutcome::Stellar(record),
            })
            .expect("send");
        app.process_ui_events();
        match cmd_rx.try_recv() {
            Ok(BackendCommand::FetchStarImage { url: requested }) => assert_eq!(requested, url),
            Ok(other) => panic!("unexpected command: {}", other.name()),
            Err(err) => panic!("no image fetch queued: {err}"),
        }
        assert!(app.star_image.is_loading(url));

        ui_tx
            .send(UiEvent::StarImageLoaded {
                url: "https://skyview.invalid/other.jpg".into(),
                image: DecodedImage {
                    width: 1,
                    height: 1,
                    rgba: vec![0, 0, 0, 255],
                },
            })
            .expect("send");
        ui_tx
            .send(UiEvent::StarImageFailed {
                url: url.into(),
                reason: "image host returned 404 Not Found".into(),
            })
            .expect("send");
        app.process_ui_events();
        assert!(matches!(
            &app.star_image,
            StarImageState::Failed { url: failed, .. } if failed == url
        ));
    }

    #[test]
    fn stellar_result_without_image_queues_nothing() {
        let (mut app, cmd_rx, ui_tx) = app_with_queue(4);
        app.analysis.switch_mode(AcquisitionMode::CatalogLookup);
        app.submit_analysis();
        let generation = take_generation(&cmd_rx);
        ui_tx
            .send(UiEvent::AnalysisFinished {
                generation,
                outcome: ClassificationOutcome::Stellar(StellarRecord::default()),
            })
            .expect("send");
        app.process_ui_events();
        assert!(cmd_rx.try_recv().is_err());
        assert!(matches!(app.star_image, StarImageState::Idle));
    }

    #[test]
    fn disconnected_backend_leaves_controller_idle() {
        let (mut app, cmd_rx, _ui_tx) = app_with_queue(4);
        drop(cmd_rx);
        app.submit_analysis();
        assert!(!app.analysis.is_loading());
        assert!(app.status.contains("disconnected"));
    }

    #[test]
    fn result_arriving_after_mode_switch_is_ignored() {
        let (mut app, cmd_rx, ui_tx) = app_with_queue(4);
        app.submit_analysis();
        let generation = match cmd_rx.try_recv().expect("queued command") {
            BackendCommand::Analyze { generation, .. } => generation,
            other => panic!("unexpected command: {}", other.name()),
        };
        app.analysis.switch_mode(AcquisitionMode::ManualEntry);
        ui_tx
            .send(UiEvent::AnalysisFinished {
                generation,
                outcome: ClassificationOutcome::SinglePrediction { label: None },
            })
            .expect("send");
        app.process_ui_events();
        assert!(app.analysis.outcome().is_none());
    }

    #[test]
    fn dashboard_loads_on_first_visit_and_stops_animation_when_hidden() {
        let (mut app, cmd_rx, ui_tx) = app_with_queue(4);
        app.set_view(AppView::Dashboard);
        assert!(matches!(
            cmd_rx.try_recv(),
            Ok(BackendCommand::LoadDashboard { .. })
        ));

        assert_eq!(results_heading(app.dashboard.len()), "Analysis Results (0)");
        ui_tx
            .send(UiEvent::DashboardLoaded(vec![PlanetCandidate {
                name: "Kepler-22 b".into(),
                disposition: Disposition::Confirmed,
                score: 1.0,
                orbital_period_days: 289.86,
                planet_radius_earth_radii: 2.38,
                impact_parameter: 0.38,
                transit_depth_ppm: 492.0,
            }]))
            .expect("send");
        app.process_ui_events();
        assert!(app.is_animating());
        assert_eq!(results_heading(app.dashboard.len()), "Analysis Results (1)");

        let flag = app.dashboard.animation().expect("animation").running_flag();
        app.set_view(AppView::Analysis);
        assert!(!flag.is_running());

        app.set_view(AppView::Dashboard);
        assert!(app.is_animating());
        assert!(cmd_rx.try_recv().is_err());
    }
}
