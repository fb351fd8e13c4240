use crate::domain::model::{
    DataTransfer, EncryptionStatus, NewPassport, NewRepairEntry, Passport, RepairEntry,
    TransferInitiation, UploadOutcome,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn base_url(&self) -> &str;
    fn request_timeout(&self) -> Option<Duration>;
    fn max_attempts(&self) -> u32;
    fn poll_interval(&self) -> Duration;
    fn refresh_delay(&self) -> Duration;
}

/// EDC 非同步傳輸端點
#[async_trait]
pub trait TransferApi: Send + Sync {
    async fn initiate_transfer(&self, product_id: &str) -> Result<TransferInitiation>;
    async fn transfers_by_reference(&self, reference_id: &str) -> Result<Vec<DataTransfer>>;
}

#[async_trait]
pub trait PassportApi: Send + Sync {
    async fn list_passports(&self) -> Result<Vec<Passport>>;
    async fn passport_detail(&self, id: &str) -> Result<Passport>;
    async fn passport_by_serial(&self, serial_number: &str) -> Result<Passport>;
    async fn create_passport(&self, passport: &NewPassport) -> Result<Passport>;
    /// 回傳後端儲存的維修紀錄，而非更新後的護照
    async fn add_repair(&self, passport_id: i64, repair: &NewRepairEntry) -> Result<RepairEntry>;
    async fn upload_csv(
        &self,
        passport_id: i64,
        file_name: &str,
        data: Vec<u8>,
        encrypt: bool,
    ) -> Result<UploadOutcome>;
    async fn download_csv(&self, passport_id: i64) -> Result<Vec<u8>>;
    async fn encryption_status(&self) -> Result<EncryptionStatus>;
}
