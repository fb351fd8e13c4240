use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// 數位產品護照（後端實體）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Passport {
    pub id: i64,
    pub product_name: Option<String>,
    pub manufacturer: Option<String>,
    pub serial_number: Option<String>,
    pub manufacturing_date: Option<NaiveDateTime>,
    pub product_type: Option<String>,
    pub model_number: Option<String>,
    pub csv_file_name: Option<String>,
    pub encrypted: bool,
    pub repair_history: Vec<RepairEntry>,
}

impl Passport {
    pub fn has_csv_file(&self) -> bool {
        self.csv_file_name
            .as_deref()
            .is_some_and(|name| !name.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RepairEntry {
    pub id: Option<i64>,
    pub repair_date: Option<NaiveDateTime>,
    pub description: Option<String>,
    pub repair_type: Option<String>,
    pub technician: Option<String>,
}

/// 建立護照表單
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPassport {
    pub product_name: String,
    pub manufacturer: String,
    pub serial_number: String,
    pub manufacturing_date: Option<NaiveDateTime>,
    pub product_type: String,
    pub model_number: String,
}

/// 維修紀錄表單，不帶 passport 參照
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRepairEntry {
    pub repair_date: Option<NaiveDateTime>,
    pub description: String,
    pub repair_type: String,
    pub technician: String,
}

/// EDC 連接器投遞的一筆資料
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DataTransfer {
    pub id: Option<i64>,
    pub transfer_id: Option<String>,
    pub transfer_time: Option<NaiveDateTime>,
    pub reference_id: Option<String>,
    pub json_data: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferInitiation {
    pub reference_id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadOutcome {
    pub passport: Passport,
    #[serde(default)]
    pub encryption_enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptionStatus {
    pub csv_encryption_enabled: bool,
}

/// 本地 CSV 材料檔預覽
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvPreview {
    pub headers: Vec<String>,
    pub row_count: usize,
    pub sample_rows: Vec<Vec<String>>,
}
