use crate::core::{DataTables, Pipeline};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// Result of a full run: the computed report and where it was exported.
#[derive(Debug, Clone)]
pub struct RunOutcome<R> {
    pub report: R,
    pub output_path: String,
}

pub struct DashboardEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> DashboardEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    /// Load, compute and export. Any failure aborts the run.
    pub fn run(&mut self) -> Result<RunOutcome<P::Report>> {
        tracing::info!("Starting dashboard build");
        self.monitor.log_stats("start");

        tracing::info!("Loading tables...");
        let tables = self.pipeline.extract()?;
        tracing::info!(
            "Loaded {} tables ({} rows)",
            tables.row_counts().len(),
            tables.row_counts().iter().map(|(_, rows)| rows).sum::<usize>()
        );
        self.monitor.log_stats("load");

        tracing::info!("Computing dashboard...");
        let report = self.pipeline.transform(tables)?;
        self.monitor.log_stats("compute");

        tracing::info!("Exporting dashboard...");
        let output_path = self.pipeline.load(&report)?;
        tracing::info!("Output saved to: {}", output_path);
        self.monitor.log_stats("export");
        self.monitor.log_final_stats();

        Ok(RunOutcome {
            report,
            output_path,
        })
    }

    /// Load and validate the tables without computing or exporting anything.
    pub fn dry_run(&mut self) -> Result<DataTables> {
        tracing::info!("Dry run: loading tables only");
        let tables = self.pipeline.extract()?;
        self.monitor.log_final_stats();
        Ok(tables)
    }

    /// Load and compute, returning the report instead of exporting it.
    pub fn build_report(&mut self) -> Result<P::Report> {
        let tables = self.pipeline.extract()?;
        self.monitor.log_stats("load");
        let report = self.pipeline.transform(tables)?;
        self.monitor.log_stats("compute");
        Ok(report)
    }
}
