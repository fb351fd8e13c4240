use super::{action_failed, now, repair_failed, status_text, validate_repair};
use crate::core::materials::preview_csv;
use crate::core::{PassportApi, Result, Storage};
use crate::domain::model::{
    CsvPreview, EncryptionStatus, NewPassport, NewRepairEntry, Passport, UploadOutcome,
};
use crate::utils::error::DppError;
use crate::utils::validation::{require_extension, require_input};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

const PREVIEW_ROWS: usize = 5;

#[derive(Debug, Clone)]
pub struct UploadReport {
    pub preview: CsvPreview,
    pub outcome: UploadOutcome,
}

/// 經濟營運者視圖：建立護照、附加材料 CSV、記錄維修
pub struct OperatorDashboard<B: PassportApi + ?Sized, S: Storage> {
    backend: Arc<B>,
    files: S,
    refresh_delay: Duration,
}

impl<B: PassportApi + ?Sized, S: Storage> OperatorDashboard<B, S> {
    pub fn new(backend: Arc<B>, files: S, refresh_delay: Duration) -> Self {
        Self {
            backend,
            files,
            refresh_delay,
        }
    }

    pub async fn list_passports(&self) -> Result<Vec<Passport>> {
        let passports = self
            .backend
            .list_passports()
            .await
            .map_err(action_failed("Failed to fetch passports"))?;
        tracing::debug!("Fetched {} passports", passports.len());
        Ok(passports)
    }

    pub async fn passport_detail(&self, id: &str) -> Result<Passport> {
        let id = require_input(id, "Please enter a passport ID")?;
        self.backend
            .passport_detail(id)
            .await
            .map_err(action_failed("Failed to fetch passport details"))
    }

    pub async fn create_passport(&self, form: &NewPassport) -> Result<Passport> {
        let passport = NewPassport {
            product_name: require_input(&form.product_name, "Please enter a product name")?
                .to_string(),
            manufacturer: form.manufacturer.trim().to_string(),
            serial_number: form.serial_number.trim().to_string(),
            manufacturing_date: Some(form.manufacturing_date.unwrap_or_else(now)),
            product_type: form.product_type.trim().to_string(),
            model_number: form.model_number.trim().to_string(),
        };

        let created = self
            .backend
            .create_passport(&passport)
            .await
            .map_err(action_failed("Failed to create passport"))?;
        tracing::info!("✅ Created passport #{} ({})", created.id, passport.product_name);
        Ok(created)
    }

    /// 新增維修紀錄後稍候，再重新讀取護照取得完整歷史
    pub async fn add_repair(&self, passport_id: i64, form: &NewRepairEntry) -> Result<Passport> {
        let repair = validate_repair(form)?;
        let saved = self
            .backend
            .add_repair(passport_id, &repair)
            .await
            .map_err(repair_failed)?;
        tracing::info!(
            "🔧 Repair {} logged on passport #{}",
            saved.id.map_or_else(|| "entry".to_string(), |id| format!("#{}", id)),
            passport_id
        );

        if !self.refresh_delay.is_zero() {
            tokio::time::sleep(self.refresh_delay).await;
        }
        let refreshed = self.passport_detail(&passport_id.to_string()).await?;
        tracing::debug!(
            "Passport #{} now has {} repair(s)",
            passport_id,
            refreshed.repair_history.len()
        );
        Ok(refreshed)
    }

    /// 讀取本地 CSV，先在本地解析預覽，再上傳
    pub async fn upload_csv(&self, passport_id: i64, path: &Path, encrypt: bool) -> Result<UploadReport> {
        require_extension(path, &["csv"])?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| DppError::validation("Please select a CSV file to upload"))?
            .to_string();

        let data = self.files.read_file(&path.to_string_lossy()).await?;
        let preview = preview_csv(&data, PREVIEW_ROWS)?;

        tracing::info!(
            "📤 Uploading {} ({} bytes, {} rows) to passport #{}",
            file_name,
            data.len(),
            preview.row_count,
            passport_id
        );
        let outcome = self
            .backend
            .upload_csv(passport_id, &file_name, data, encrypt)
            .await
            .map_err(|e| match e {
                DppError::ApiError { status, .. } => DppError::ActionError {
                    message: format!("Upload failed with status: {}", status),
                },
                DppError::HttpError(_) => DppError::ActionError {
                    message: "Network error occurred during upload".to_string(),
                },
                other => other,
            })?;

        if outcome.encryption_enabled {
            tracing::info!("🔒 File was encrypted during upload");
        }

        Ok(UploadReport { preview, outcome })
    }

    /// 下載附加的 CSV 到指定目錄，回傳寫入路徑
    pub async fn download_csv(&self, passport_id: i64, output_dir: &Path) -> Result<String> {
        let passport = self.passport_detail(&passport_id.to_string()).await?;
        let file_name = passport
            .csv_file_name
            .as_deref()
            .filter(|_| passport.has_csv_file())
            .and_then(|name| Path::new(name).file_name())
            .and_then(|name| name.to_str())
            .ok_or_else(|| DppError::validation("No CSV file attached to download"))?
            .to_string();

        let data = self
            .backend
            .download_csv(passport_id)
            .await
            .map_err(|e| match e {
                DppError::ApiError { status, .. } => DppError::ActionError {
                    message: format!("Failed to download file: {}", status_text(status)),
                },
                DppError::NotFound { .. } => DppError::ActionError {
                    message: format!("Failed to download file: {}", status_text(404)),
                },
                other => other,
            })?;
        let target = output_dir.join(&file_name);
        let written = self.files.write_file(&target.to_string_lossy(), &data).await?;

        tracing::info!("📥 Saved {} ({} bytes)", written, data.len());
        Ok(written)
    }

    pub async fn encryption_status(&self) -> Result<EncryptionStatus> {
        self.backend.encryption_status().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::LocalStorage;
    use crate::app::dashboards::tests::{passport, InMemoryPassports};
    use tempfile::TempDir;

    fn dashboard(store: Arc<InMemoryPassports>) -> OperatorDashboard<InMemoryPassports, LocalStorage> {
        OperatorDashboard::new(store, LocalStorage::new(""), Duration::ZERO)
    }

    #[tokio::test]
    async fn test_create_fills_manufacturing_date() {
        let store = Arc::new(InMemoryPassports::default());
        let operator = dashboard(store.clone());

        let created = operator
            .create_passport(&NewPassport {
                product_name: " Drill ".to_string(),
                manufacturer: "ACME".to_string(),
                serial_number: "SN-9".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(created.id, 1);
        assert_eq!(created.product_name.as_deref(), Some("Drill"));
        assert!(created.manufacturing_date.is_some());
    }

    #[tokio::test]
    async fn test_create_requires_product_name() {
        let operator = dashboard(Arc::new(InMemoryPassports::default()));
        let err = operator
            .create_passport(&NewPassport::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Please enter a product name");
    }

    #[tokio::test]
    async fn test_upload_then_download_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let csv_path = temp_dir.path().join("materials.csv");
        std::fs::write(&csv_path, "material,percent\nsteel,60\ncopper,40\n").unwrap();

        let store = Arc::new(InMemoryPassports::with(vec![passport(1, "Drill")]));
        let operator = dashboard(store.clone());

        let report = operator.upload_csv(1, &csv_path, true).await.unwrap();
        assert_eq!(report.preview.row_count, 2);
        assert!(report.outcome.encryption_enabled);
        assert_eq!(
            report.outcome.passport.csv_file_name.as_deref(),
            Some("materials.csv")
        );

        let out_dir = temp_dir.path().join("downloads");
        let written = operator.download_csv(1, &out_dir).await.unwrap();
        assert!(written.ends_with("materials.csv"));
        assert_eq!(
            std::fs::read_to_string(out_dir.join("materials.csv")).unwrap(),
            "material,percent\nsteel,60\ncopper,40\n"
        );
    }

    #[tokio::test]
    async fn test_upload_rejects_non_csv_before_reading() {
        let operator = dashboard(Arc::new(InMemoryPassports::with(vec![passport(1, "Drill")])));
        let err = operator
            .upload_csv(1, Path::new("/does/not/exist/materials.xlsx"), false)
            .await
            .unwrap_err();
        assert!(matches!(err, DppError::ValidationError { .. }));
    }

    #[tokio::test]
    async fn test_download_without_attachment() {
        let temp_dir = TempDir::new().unwrap();
        let operator = dashboard(Arc::new(InMemoryPassports::with(vec![passport(2, "Kettle")])));

        let err = operator.download_csv(2, temp_dir.path()).await.unwrap_err();
        assert_eq!(err.to_string(), "No CSV file attached to download");
    }

    #[tokio::test]
    async fn test_add_repair_refetches_passport() {
        let store = Arc::new(InMemoryPassports::with(vec![passport(1, "Drill")]));
        let operator = OperatorDashboard::new(store.clone(), LocalStorage::new(""), Duration::from_millis(5));

        let refreshed = operator
            .add_repair(
                1,
                &NewRepairEntry {
                    repair_date: None,
                    description: "Replaced cord".to_string(),
                    repair_type: "Replacement".to_string(),
                    technician: "Ana".to_string(),
                },
            )
            .await
            .unwrap();

        assert_eq!(refreshed.id, 1);
        assert_eq!(refreshed.repair_history.len(), 1);
        assert_eq!(*store.detail_calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_backend_failures_use_view_messages() {
        let operator = dashboard(Arc::new(InMemoryPassports::failing(500)));

        assert_eq!(
            operator.list_passports().await.unwrap_err().to_string(),
            "Failed to fetch passports"
        );
        assert_eq!(
            operator.passport_detail("1").await.unwrap_err().to_string(),
            "Failed to fetch passport details"
        );
        let err = operator
            .create_passport(&NewPassport {
                product_name: "Drill".to_string(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to create passport");
    }

    #[tokio::test]
    async fn test_missing_passport_uses_detail_message() {
        let operator = dashboard(Arc::new(InMemoryPassports::default()));
        assert_eq!(
            operator.passport_detail("9").await.unwrap_err().to_string(),
            "Failed to fetch passport details"
        );
    }

    #[tokio::test]
    async fn test_list_sorted() {
        let operator = dashboard(Arc::new(InMemoryPassports::with(vec![
            passport(2, "Kettle"),
            passport(1, "Drill"),
        ])));
        let all = operator.list_passports().await.unwrap();
        assert_eq!(all.iter().map(|p| p.id).collect::<Vec<_>>(), vec![1, 2]);
    }
}
