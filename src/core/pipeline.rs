use crate::core::export;
use crate::core::provider::TabularDataProvider;
use crate::core::report::DashboardReport;
use crate::core::{ConfigProvider, DataTables, Pipeline, Storage};
use crate::utils::error::Result;

/// Extract the five tables, compute the report, export it through `Storage`.
pub struct DashboardPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    provider: TabularDataProvider,
}

impl<S: Storage, C: ConfigProvider> DashboardPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        let provider = TabularDataProvider::new(config.schema());
        Self {
            storage,
            config,
            provider,
        }
    }

    pub fn provider(&self) -> &TabularDataProvider {
        &self.provider
    }

    pub fn config(&self) -> &C {
        &self.config
    }
}

impl<S: Storage, C: ConfigProvider> Pipeline for DashboardPipeline<S, C> {
    type Report = DashboardReport;

    fn extract(&mut self) -> Result<DataTables> {
        let source = self.config.source();
        tracing::debug!("Loading tables from {}", source.display_name());
        self.provider.load(&source)
    }

    fn transform(&self, tables: DataTables) -> Result<DashboardReport> {
        DashboardReport::build(tables, self.config.pareto_threshold())
    }

    fn load(&self, report: &DashboardReport) -> Result<String> {
        let files = export::render(report, &self.config.output_formats())?;
        tracing::debug!("Rendered {} export files", files.len());

        match self.config.archive_name() {
            Some(archive) => {
                let zip_data = export::zip_files(&files)?;
                tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
                self.storage.write_file(&archive, &zip_data)?;
                Ok(self.storage.resolve(&archive))
            }
            None => {
                for file in &files {
                    self.storage.write_file(&file.name, &file.contents)?;
                }
                Ok(self.storage.resolve(""))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::pareto::DEFAULT_THRESHOLD_PERCENT;
    use crate::domain::ports::DataSource;
    use crate::domain::schema::TableSchema;
    use crate::utils::error::DashboardError;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::io::Read;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct MockStorage {
        files: Rc<RefCell<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            self.files.borrow().get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            self.get_file(path).ok_or_else(|| {
                DashboardError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            self.files
                .borrow_mut()
                .insert(path.to_string(), data.to_vec());
            Ok(())
        }

        fn resolve(&self, path: &str) -> String {
            format!("mock/{}", path)
        }
    }

    struct MockConfig {
        source: DataSource,
        formats: Vec<String>,
        archive: Option<String>,
    }

    impl MockConfig {
        fn embedded(archive: Option<&str>) -> Self {
            Self {
                source: DataSource::Embedded,
                formats: vec!["json".to_string(), "csv".to_string()],
                archive: archive.map(str::to_string),
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn source(&self) -> DataSource {
            self.source.clone()
        }

        fn output_path(&self) -> &str {
            "mock"
        }

        fn output_formats(&self) -> Vec<String> {
            self.formats.clone()
        }

        fn archive_name(&self) -> Option<String> {
            self.archive.clone()
        }

        fn schema(&self) -> TableSchema {
            TableSchema::default()
        }

        fn pareto_threshold(&self) -> f64 {
            DEFAULT_THRESHOLD_PERCENT
        }
    }

    #[test]
    fn test_extract_embedded() {
        let mut pipeline =
            DashboardPipeline::new(MockStorage::default(), MockConfig::embedded(None));
        let tables = pipeline.extract().unwrap();
        assert_eq!(tables.bar.len(), 12);

        pipeline.extract().unwrap();
        assert_eq!(pipeline.provider().cache().hits(), 1);
    }

    #[test]
    fn test_load_writes_zip_archive() {
        let storage = MockStorage::default();
        let mut pipeline = DashboardPipeline::new(
            storage.clone(),
            MockConfig::embedded(Some("dashboard_output.zip")),
        );

        let tables = pipeline.extract().unwrap();
        let report = pipeline.transform(tables).unwrap();
        let output = pipeline.load(&report).unwrap();

        assert_eq!(output, "mock/dashboard_output.zip");
        let zip_bytes = storage.get_file("dashboard_output.zip").unwrap();
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_bytes)).unwrap();
        assert_eq!(archive.len(), 8);

        let mut json = String::new();
        archive
            .by_name("dashboard.json")
            .unwrap()
            .read_to_string(&mut json)
            .unwrap();
        assert!(json.contains("\"threshold_index\": 3"));
    }

    #[test]
    fn test_load_writes_loose_files() {
        let storage = MockStorage::default();
        let mut pipeline =
            DashboardPipeline::new(storage.clone(), MockConfig::embedded(None));

        let tables = pipeline.extract().unwrap();
        let report = pipeline.transform(tables).unwrap();
        pipeline.load(&report).unwrap();

        assert!(storage.get_file("dashboard.json").is_some());
        assert!(storage.get_file("reconciliation.csv").is_some());
        assert!(storage.get_file("dashboard_output.zip").is_none());
    }
}
