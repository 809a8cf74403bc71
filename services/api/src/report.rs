use crate::infra::build_service;
use clap::Args;
use ecoscore::config::AppConfig;
use ecoscore::error::AppError;
use ecoscore::products::{ProductAssessment, ScoreSummary, ScoredProduct, DEFAULT_HISTORY_LIMIT};
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// JSON file holding a single product payload
    pub(crate) file: PathBuf,
    /// Score without appending a record to the store
    #[arg(long)]
    pub(crate) no_save: bool,
}

#[derive(Args, Debug)]
pub(crate) struct HistoryArgs {
    /// Number of records to list, newest first
    #[arg(long, default_value_t = DEFAULT_HISTORY_LIMIT)]
    pub(crate) limit: usize,
}

pub(crate) fn run_score(config: &AppConfig, args: ScoreArgs) -> Result<(), AppError> {
    let ScoreArgs { file, no_save } = args;
    let raw = std::fs::read_to_string(&file)?;
    let payload: serde_json::Value = serde_json::from_str(&raw)?;
    let service = build_service(config)?;
    let mut out = io::stdout().lock();

    if no_save {
        let submission = service.validate(&payload)?;
        let assessment = service.assess(&submission);
        render_assessment(&mut out, &submission.product_name, &assessment)?;
        return Ok(());
    }

    let record = service.score(&payload)?;
    render_record(&mut out, &record)?;
    Ok(())
}

pub(crate) fn run_history(config: &AppConfig, args: HistoryArgs) -> Result<(), AppError> {
    let service = build_service(config)?;
    let records = service.history(args.limit)?;
    render_history(&mut io::stdout().lock(), &records)?;
    Ok(())
}

pub(crate) fn run_summary(config: &AppConfig) -> Result<(), AppError> {
    let service = build_service(config)?;
    let summary = service.summary()?;
    render_summary(&mut io::stdout().lock(), &summary)?;
    Ok(())
}

fn render_assessment(
    out: &mut impl Write,
    product_name: &str,
    assessment: &ProductAssessment,
) -> io::Result<()> {
    writeln!(out, "Product: {product_name} (not saved)")?;
    writeln!(
        out,
        "Sustainability score: {:.1} ({})",
        assessment.score(),
        assessment.rating()
    )?;
    let components = &assessment.outcome.components;
    writeln!(
        out,
        "Components: gwp {:.1}, circularity {:.1}, cost {:.1}",
        components.gwp, components.circularity, components.cost
    )?;
    render_suggestions(out, &assessment.suggestions)
}

fn render_record(out: &mut impl Write, record: &ScoredProduct) -> io::Result<()> {
    writeln!(out, "Product: {} (record {})", record.product_name, record.id)?;
    writeln!(
        out,
        "Sustainability score: {:.1} ({})",
        record.score, record.rating
    )?;
    render_suggestions(out, &record.suggestions)
}

fn render_suggestions(out: &mut impl Write, suggestions: &[String]) -> io::Result<()> {
    if suggestions.is_empty() {
        return writeln!(out, "Suggestions: none");
    }
    writeln!(out, "Suggestions:")?;
    for suggestion in suggestions {
        writeln!(out, "- {suggestion}")?;
    }
    Ok(())
}

fn render_history(out: &mut impl Write, records: &[ScoredProduct]) -> io::Result<()> {
    if records.is_empty() {
        return writeln!(out, "No products scored yet");
    }

    writeln!(out, "Recent products ({})", records.len())?;
    for record in records {
        writeln!(
            out,
            "- #{} {}: {:.1} ({}) at {}",
            record.id,
            record.product_name,
            record.score,
            record.rating,
            record.created_at.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
    }
    Ok(())
}

fn render_summary(out: &mut impl Write, summary: &ScoreSummary) -> io::Result<()> {
    writeln!(out, "Products scored: {}", summary.total_products)?;
    writeln!(out, "Average score: {:.2}", summary.average_score)?;

    writeln!(out, "\nRating distribution")?;
    if summary.ratings.is_empty() {
        writeln!(out, "- none")?;
    }
    for (rating, count) in &summary.ratings {
        writeln!(out, "- {rating}: {count}")?;
    }

    writeln!(out, "\nTop issues")?;
    if summary.top_issues.is_empty() {
        writeln!(out, "- none")?;
    }
    for issue in &summary.top_issues {
        writeln!(out, "- {issue}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use ecoscore::config::{
        AppEnvironment, DashboardConfig, ServerConfig, StorageBackend, StorageConfig,
        TelemetryConfig,
    };
    use ecoscore::products::{ProductId, Rating, ScoringConfig};
    use std::collections::BTreeMap;

    fn rendered(render: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut buffer = Vec::new();
        render(&mut buffer).expect("render into memory");
        String::from_utf8(buffer).expect("utf8 output")
    }

    fn file_config(data_path: PathBuf) -> AppConfig {
        AppConfig {
            environment: AppEnvironment::Test,
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            telemetry: TelemetryConfig {
                log_level: "warn".to_string(),
            },
            storage: StorageConfig {
                backend: StorageBackend::File,
                data_path,
            },
            dashboard: DashboardConfig {
                static_dir: PathBuf::from("static"),
            },
            scoring: ScoringConfig::default(),
        }
    }

    fn write_payload(dir: &std::path::Path, body: &serde_json::Value) -> PathBuf {
        let path = dir.join("product.json");
        std::fs::write(&path, serde_json::to_vec(body).expect("serialize")).expect("write");
        path
    }

    fn bottle() -> serde_json::Value {
        serde_json::json!({
            "product_name": "Bottle",
            "materials": ["steel"],
            "transport": "sea",
            "packaging": "cardboard",
            "gwp": 5,
            "cost": 10,
            "circularity": 80,
        })
    }

    #[test]
    fn score_command_persists_unless_no_save() {
        let dir = tempfile::tempdir().expect("temp dir");
        let config = file_config(dir.path().join("products.jsonl"));
        let file = write_payload(dir.path(), &bottle());

        run_score(
            &config,
            ScoreArgs {
                file: file.clone(),
                no_save: true,
            },
        )
        .expect("dry run scores");
        let service = build_service(&config).expect("store opens");
        assert!(service.history(10).expect("history").is_empty());
        drop(service);

        run_score(
            &config,
            ScoreArgs {
                file,
                no_save: false,
            },
        )
        .expect("scores and saves");
        let service = build_service(&config).expect("store reopens");
        let records = service.history(10).expect("history");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].rating, Rating::A);
    }

    #[test]
    fn score_command_surfaces_validation_and_parse_failures() {
        let dir = tempfile::tempdir().expect("temp dir");
        let config = file_config(dir.path().join("products.jsonl"));

        let file = write_payload(dir.path(), &serde_json::json!({ "product_name": "Ghost" }));
        let err = run_score(
            &config,
            ScoreArgs {
                file,
                no_save: true,
            },
        )
        .expect_err("missing fields rejected");
        assert!(matches!(err, AppError::Validation(_)));

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{not json").expect("write");
        let err = run_score(
            &config,
            ScoreArgs {
                file: broken,
                no_save: true,
            },
        )
        .expect_err("bad json rejected");
        assert!(matches!(err, AppError::Payload(_)));

        let err = run_score(
            &config,
            ScoreArgs {
                file: dir.path().join("absent.json"),
                no_save: true,
            },
        )
        .expect_err("missing file rejected");
        assert!(matches!(err, AppError::Io(_)));
    }

    #[test]
    fn history_render_lists_newest_first_lines() {
        let record = ScoredProduct {
            id: ProductId(7),
            product_name: "Chair".to_string(),
            materials: vec!["wood".to_string()],
            weight_grams: None,
            transport: None,
            packaging: None,
            gwp: 3.0,
            cost: 40.0,
            circularity: 70.0,
            score: 74.0,
            rating: Rating::B,
            suggestions: Vec::new(),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap(),
        };
        let output = rendered(|out| render_history(out, &[record]));
        assert!(output.contains("Recent products (1)"));
        assert!(output.contains("- #7 Chair: 74.0 (B) at 2024-05-01 09:30:00 UTC"));
        assert_eq!(
            rendered(|out| render_history(out, &[])),
            "No products scored yet\n"
        );
    }

    #[test]
    fn summary_render_includes_distribution_and_issues() {
        let mut ratings = BTreeMap::new();
        ratings.insert("A".to_string(), 2);
        ratings.insert("C".to_string(), 1);
        let summary = ScoreSummary {
            total_products: 3,
            average_score: 71.333,
            ratings,
            top_issues: vec!["Plastic used".to_string()],
        };
        let output = rendered(|out| render_summary(out, &summary));
        assert!(output.contains("Products scored: 3"));
        assert!(output.contains("Average score: 71.33"));
        assert!(output.contains("- A: 2\n- C: 1"));
        assert!(output.contains("- Plastic used"));

        let empty = rendered(|out| render_summary(out, &ScoreSummary::empty()));
        assert!(empty.contains("Products scored: 0"));
        assert!(empty.contains("Top issues\n- none"));
    }
}
