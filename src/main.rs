use clap::Parser;
use sales_dashboard::core::report::format_amount;
use sales_dashboard::core::ConfigProvider;
use sales_dashboard::domain::model::TableKind;
use sales_dashboard::utils::error::DashboardError;
use sales_dashboard::utils::{logger, validation::Validate};
use sales_dashboard::{
    CliConfig, DashboardEngine, DashboardPipeline, DashboardReport, LocalStorage, TomlConfig,
};

fn main() {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting sales-dashboard");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let result = match cli.config.clone() {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            TomlConfig::from_file(&path).and_then(|mut config| {
                cli.apply_to(&mut config);
                let monitor = cli.monitor || config.monitoring_enabled();
                if config.verbose_logging() {
                    tracing::debug!("File config: {:?}", config);
                }
                run(config, cli.dry_run, monitor)
            })
        }
        None => run(cli.clone(), cli.dry_run, cli.monitor),
    };

    if let Err(e) = result {
        tracing::error!(
            "Dashboard build failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

        std::process::exit(e.severity().exit_code());
    }
}

fn run<C: ConfigProvider + Validate>(
    config: C,
    dry_run: bool,
    monitor: bool,
) -> Result<(), DashboardError> {
    config.validate()?;
    tracing::info!("Configuration validated");

    if monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    let schema = config.schema();
    let storage = LocalStorage::new(config.output_path());
    let pipeline = DashboardPipeline::new(storage, config);
    let mut engine = DashboardEngine::new_with_monitoring(pipeline, monitor);

    if dry_run {
        tracing::info!("🔍 DRY RUN MODE - nothing will be exported");
        let tables = engine.dry_run()?;
        println!("✅ All tables loaded");
        for kind in TableKind::ALL {
            println!(
                "  {:<12} {:<20} {} rows",
                kind.to_string(),
                schema.table_name(kind),
                tables.row_count(kind)
            );
        }
        return Ok(());
    }

    let outcome = engine.run()?;
    print_summary(&outcome.report);
    println!("📁 Output saved to: {}", outcome.output_path);
    Ok(())
}

fn print_summary(report: &DashboardReport) {
    let kpis = &report.kpis;
    println!("✅ Dashboard built");
    println!("  Total sales : {}", format_amount(kpis.total));
    println!(
        "  Best month  : {} ({})",
        kpis.max.period.label(),
        format_amount(kpis.max.total)
    );
    println!(
        "  Worst month : {} ({})",
        kpis.min.period.label(),
        format_amount(kpis.min.total)
    );
    println!("  Regression  : {}", report.equation);

    if let Some(record) = report.pareto.vital_few().last() {
        println!(
            "  Pareto      : {} categories reach {:.0}% (through {})",
            report.pareto.vital_few().len(),
            report.pareto.threshold_percent,
            record.category
        );
    }

    let mismatches = report.reconciliation.mismatches().count();
    if mismatches == 0 {
        println!("  Reconcile   : all periods balanced");
    } else {
        println!("  Reconcile   : {} period(s) do not balance", mismatches);
    }
}
