use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    compute_geometry,
    config::DEFAULT_CONFIG_FILE,
    load_precomputed_results, load_settings_from,
    presenter::{render_failure, render_geometry, render_outcome, render_single_result, SingleResultView},
    AcquisitionController, CandidateSelector, DatasetFile, DetailView, HttpDispatcher, StarColor,
    TransitInputs, INITIAL_CATALOG_IDENTIFIER,
};
use shared::domain::{AcquisitionMode, ClassificationOutcome, ManualField, SingleAnalysisResult};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "exoscope", about = "Exoplanet signal triage from the command line")]
struct Cli {
    /// Overrides the configured classification service URL.
    #[arg(long, global = true)]
    backend_url: Option<String>,
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classify every row of a CSV file, or of the bundled sample data.
    Upload {
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Look up host-star metadata by catalog identifier.
    Star {
        #[arg(default_value = INITIAL_CATALOG_IDENTIFIER)]
        identifier: String,
    },
    /// Classify one data point. Unset fields keep their initial values.
    Manual {
        #[arg(long = "field", value_name = "KEY=VALUE", value_parser = parse_field_assignment)]
        fields: Vec<(ManualField, String)>,
    },
    /// List the precomputed candidates and show one in detail.
    Dashboard {
        #[arg(long)]
        results: Option<PathBuf>,
        #[arg(long)]
        select: Option<String>,
    },
    /// Render a saved single-target analysis.
    ShowResult { path: PathBuf },
    /// Print the animation geometry for a set of transit parameters.
    Transit {
        #[arg(long)]
        period: Option<f64>,
        #[arg(long)]
        impact: Option<f64>,
        #[arg(long)]
        depth: Option<f64>,
        #[arg(long)]
        star_diameter: Option<f64>,
        #[arg(long)]
        star_color: Option<StarColor>,
    },
}

fn parse_field_assignment(raw: &str) -> Result<(ManualField, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let field = ManualField::from_key(key).ok_or_else(|| format!("unknown field '{key}'"))?;
    Ok((field, value.trim().to_string()))
}

async fn run_analysis(
    controller: &mut AcquisitionController,
    dispatcher: &HttpDispatcher,
) -> Result<()> {
    match controller.run(dispatcher).await {
        Ok(ClassificationOutcome::Failure(error)) => bail!("{}", render_failure(error)),
        Ok(outcome) => {
            print!("{}", render_outcome(outcome));
            Ok(())
        }
        Err(rejected) => bail!("{rejected}"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings_from(&cli.config);
    if let Some(url) = cli.backend_url {
        settings.backend_url = url;
    }

    match cli.command {
        Command::Upload { file } => {
            let dispatcher = HttpDispatcher::from_settings(&settings)?;
            let mut controller = AcquisitionController::new();
            if let Some(path) = file {
                let file = DatasetFile::read(&path)
                    .await
                    .with_context(|| format!("failed to attach {}", path.display()))?;
                controller.attach_file(file);
            }
            run_analysis(&mut controller, &dispatcher).await?;
        }
        Command::Star { identifier } => {
            let dispatcher = HttpDispatcher::from_settings(&settings)?;
            let mut controller = AcquisitionController::new();
            controller.switch_mode(AcquisitionMode::CatalogLookup);
            controller.set_identifier(identifier);
            run_analysis(&mut controller, &dispatcher).await?;
        }
        Command::Manual { fields } => {
            let dispatcher = HttpDispatcher::from_settings(&settings)?;
            let mut controller = AcquisitionController::new();
            controller.switch_mode(AcquisitionMode::ManualEntry);
            for (field, value) in fields {
                controller.set_manual_text(field, value);
            }
            run_analysis(&mut controller, &dispatcher).await?;
        }
        Command::Dashboard { results, select } => {
            let path = results.unwrap_or(settings.precomputed_results_path);
            let candidates = load_precomputed_results(&path).await?;
            let mut selector = CandidateSelector::new();
            selector.load(candidates);
            if let Some(name) = select {
                if !selector.select_name(&name) {
                    bail!("no candidate named '{name}' in {}", path.display());
                }
            }

            for entry in selector.entries() {
                let marker = if entry.selected { '>' } else { ' ' };
                println!(
                    "{marker} {:<24} {:<15} {}",
                    entry.name,
                    entry.disposition.as_str(),
                    entry.score
                );
            }
            println!();
            match selector.detail() {
                DetailView::Placeholder => println!("{}", client_core::selection::DETAIL_PLACEHOLDER),
                DetailView::Candidate(detail) => {
                    println!("{}", detail.candidate.name);
                    println!("  Status: {}", detail.status_text());
                    println!("  Confidence Score: {}", detail.score_text());
                    println!("  Orbital Period: {}", detail.period_text());
                    println!("  Planet Radius: {}", detail.radius_text());
                    println!("  Transit: {}", render_geometry(&detail.geometry));
                }
            }
            selector.unmount();
        }
        Command::ShowResult { path } => {
            let raw = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("failed to read {}", path.display()))?;
            let result: SingleAnalysisResult = serde_json::from_str(&raw)
                .with_context(|| format!("invalid analysis result in {}", path.display()))?;
            print!("{}", render_single_result(&SingleResultView::from_result(&result)));
        }
        Command::Transit {
            period,
            impact,
            depth,
            star_diameter,
            star_color,
        } => {
            let inputs = TransitInputs {
                orbital_period_days: period,
                impact_parameter: impact,
                transit_depth_ppm: depth,
                star_diameter_px: star_diameter,
                star_color,
            };
            let geometry = compute_geometry(inputs);
            info!(?inputs, "transit geometry computed");
            println!("{}", render_geometry(&geometry));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_assignment_accepts_bare_and_prefixed_keys() {
        assert_eq!(
            parse_field_assignment("koi_depth=23791"),
            Ok((ManualField::Depth, "23791".to_string()))
        );
        assert_eq!(
            parse_field_assignment("steff= 5778 "),
            Ok((ManualField::StellarTeff, "5778".to_string()))
        );
        assert!(parse_field_assignment("depth").is_err());
        assert!(parse_field_assignment("mass=1").is_err());
    }

    #[test]
    fn cli_parses_manual_fields() {
        let cli = Cli::try_parse_from([
            "exoscope",
            "--backend-url",
            "http://127.0.0.1:9000",
            "manual",
            "--field",
            "period=12.5",
            "--field",
            "koi_impact=abc",
        ])
        .expect("parse");
        match cli.command {
            Command::Manual { fields } => assert_eq!(fields.len(), 2),
            other => panic!("unexpected command: {other:?}"),
        }
        assert_eq!(cli.backend_url.as_deref(), Some("http://127.0.0.1:9000"));
    }
}
