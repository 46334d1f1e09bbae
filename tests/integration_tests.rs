use sales_dashboard::core::ConfigProvider;
use sales_dashboard::{
    DashboardEngine, DashboardError, DashboardPipeline, DashboardReport, LocalStorage, TomlConfig,
};
use std::io::Read;
use tempfile::TempDir;

fn config_for(output_path: &str, extra: &str) -> TomlConfig {
    let content = format!(
        r#"
[dashboard]
name = "integration"

[load]
output_path = "{}"
output_formats = ["json", "csv"]
{}
"#,
        output_path, extra
    );
    TomlConfig::from_toml_str(&content).unwrap()
}

type TomlEngine = DashboardEngine<DashboardPipeline<LocalStorage, TomlConfig>>;

fn engine_for(config: TomlConfig) -> TomlEngine {
    let storage = LocalStorage::new(config.output_path());
    DashboardEngine::new(DashboardPipeline::new(storage, config))
}

#[test]
fn test_end_to_end_embedded_dashboard_zip() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let mut engine = engine_for(config_for(&output_path, ""));
    let outcome = engine.run()?;

    assert!(outcome.output_path.ends_with("dashboard_output.zip"));
    let full_path = temp_dir.path().join("dashboard_output.zip");
    assert!(full_path.exists());

    let mut archive = zip::ZipArchive::new(std::fs::File::open(&full_path)?)?;
    let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            "bar.csv",
            "dashboard.json",
            "pareto.csv",
            "pie.csv",
            "reconciliation.csv",
            "regression.csv",
            "scatter.csv",
            "timeseries.csv",
        ]
    );

    let mut json = String::new();
    archive.by_name("dashboard.json")?.read_to_string(&mut json)?;
    let parsed: DashboardReport = serde_json::from_str(&json)?;
    assert_eq!(parsed.kpis.total, outcome.report.kpis.total);
    assert_eq!(parsed.equation, outcome.report.equation);
    assert_eq!(parsed.categories, vec!["제품 A", "제품 B", "제품 C"]);
    assert_eq!(parsed.pareto.threshold_index, Some(3));
    Ok(())
}

#[test]
fn test_loose_files_when_compression_disabled() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let output_path = temp_dir.path().to_str().unwrap().to_string();

    let config = config_for(&output_path, "\n[load.compression]\nenabled = false\n");
    let mut engine = engine_for(config);
    engine.run()?;

    assert!(temp_dir.path().join("dashboard.json").exists());
    assert!(temp_dir.path().join("pareto.csv").exists());
    assert!(!temp_dir.path().join("dashboard_output.zip").exists());
    Ok(())
}

#[test]
fn test_embedded_report_values() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let mut engine = engine_for(config_for(temp_dir.path().to_str().unwrap(), ""));
    let report = engine.build_report()?;

    // KPI cards
    assert_eq!(report.kpis.total, 12003.0);
    assert_eq!(report.kpis.max.period.label(), "2024-12");
    assert_eq!(report.kpis.max.total, 1150.0);
    assert_eq!(report.kpis.min.period.label(), "2024-01");
    assert_eq!(report.kpis.min.total, 885.0);
    assert!(report.bar.iter().all(|r| r.total <= report.kpis.max.total));
    assert!(report.bar.iter().all(|r| r.total >= report.kpis.min.total));

    // Product totals add up to the bar chart for every month
    assert!(report.reconciliation.all_balanced());
    assert_eq!(report.reconciliation.rows.len(), 12);

    // Pie slices are Q1 product totals
    let values: Vec<f64> = report.pie.iter().map(|s| s.value).collect();
    assert_eq!(values, vec![980.0, 908.0, 802.0]);
    let percent_sum: f64 = report.pie.iter().map(|s| s.percent).sum();
    assert!((percent_sum - 100.0).abs() < 1e-9);

    // Regression line passes through the centroid
    let n = report.scatter.len() as f64;
    let mean_x = report.scatter.iter().map(|p| p.x).sum::<f64>() / n;
    let mean_y = report.scatter.iter().map(|p| p.y).sum::<f64>() / n;
    assert!((report.regression.predict(mean_x) - mean_y).abs() < 1e-6);
    assert!(report.regression.slope > 0.0);
    assert!(report.equation.starts_with("y = "));

    // Pareto: descending, cumulative ends at 100, threshold at the fourth department
    let values: Vec<f64> = report.pareto.records.iter().map(|r| r.value).collect();
    assert!(values.windows(2).all(|w| w[0] >= w[1]));
    let last = report.pareto.records.last().unwrap();
    assert!((last.cumulative_percent - 100.0).abs() < 1e-9);
    assert_eq!(report.pareto.threshold_index, Some(3));
    assert_eq!(report.pareto.records[3].category, "영업부");
    assert_eq!(report.pareto.vital_few().len(), 4);
    Ok(())
}

#[test]
fn test_custom_threshold() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let config = config_for(
        temp_dir.path().to_str().unwrap(),
        "\n[analysis]\npareto_threshold = 50.0\n",
    );
    let report = engine_for(config).build_report()?;

    // 954 / 3122 = 30.6%, (954 + 923) / 3122 = 60.1%
    assert_eq!(report.pareto.threshold_index, Some(1));
    assert_eq!(report.pareto.threshold_percent, 50.0);
    Ok(())
}

#[test]
fn test_dry_run_writes_nothing() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let output_dir = temp_dir.path().join("out");
    let mut engine = engine_for(config_for(output_dir.to_str().unwrap(), ""));

    let tables = engine.dry_run()?;
    assert_eq!(tables.bar.len(), 12);
    assert_eq!(tables.pareto.len(), 5);
    assert!(!output_dir.join("dashboard_output.zip").exists());
    Ok(())
}

#[test]
fn test_missing_source_file_fails_run() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("nope.xlsx");
    let config = config_for(
        temp_dir.path().to_str().unwrap(),
        &format!(
            "\n[source]\ntype = \"file\"\npath = \"{}\"\n",
            missing.display()
        ),
    );

    let err = engine_for(config).run().unwrap_err();
    assert!(matches!(err, DashboardError::LoadError { .. }));
    assert!(!temp_dir.path().join("dashboard_output.zip").exists());
}
