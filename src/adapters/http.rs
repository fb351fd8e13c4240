use crate::core::{ConfigProvider, PassportApi, TransferApi};
use crate::domain::model::{
    DataTransfer, EncryptionStatus, NewPassport, NewRepairEntry, Passport, RepairEntry,
    TransferInitiation, UploadOutcome,
};
use crate::utils::error::{DppError, Result};
use crate::utils::validation::validate_url;
use async_trait::async_trait;
use reqwest::{multipart, Client, Response, StatusCode};
use url::Url;

/// reqwest 實作的後端客戶端，所有端點皆在同一個 origin 下
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    pub fn new<C: ConfigProvider + ?Sized>(config: &C) -> Result<Self> {
        validate_url("backend.base_url", config.base_url())?;
        let base_url = Url::parse(config.base_url()).map_err(|e| DppError::ConfigError {
            message: format!("Invalid backend URL: {}", e),
        })?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| DppError::ConfigError {
                message: format!("Backend URL cannot be a base: {}", self.base_url),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn endpoint_with_query(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Url> {
        let mut url = self.endpoint(segments)?;
        url.query_pairs_mut().extend_pairs(query);
        Ok(url)
    }

    async fn ensure_success(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = if body.trim().is_empty() {
            status.canonical_reason().unwrap_or("request failed").to_string()
        } else {
            body
        };
        Err(DppError::ApiError {
            status: status.as_u16(),
            message,
        })
    }

    async fn fetch_passport(&self, url: Url, id: &str) -> Result<Passport> {
        tracing::debug!("GET {}", url);
        let response = self.client.get(url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(DppError::NotFound {
                resource: "Passport".to_string(),
                id: id.to_string(),
            });
        }

        let response = Self::ensure_success(response).await?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl TransferApi for HttpBackend {
    async fn initiate_transfer(&self, product_id: &str) -> Result<TransferInitiation> {
        let url = self.endpoint(&["api", "edc-transfer", "initiate-async", product_id])?;
        tracing::debug!("POST {}", url);

        let response = self.client.post(url).send().await.map_err(|e| {
            tracing::warn!("Transfer initiation request failed: {}", e);
            initiation_failed()
        })?;

        if !response.status().is_success() {
            tracing::warn!("Transfer initiation returned {}", response.status());
            return Err(initiation_failed());
        }

        response.json().await.map_err(|e| {
            tracing::warn!("Transfer initiation response unreadable: {}", e);
            initiation_failed()
        })
    }

    async fn transfers_by_reference(&self, reference_id: &str) -> Result<Vec<DataTransfer>> {
        let url = self.endpoint(&["api", "data-transfers", "by-reference", reference_id])?;
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DppError::StatusCheckError {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DppError::StatusCheckError {
                message: format!("Failed to check transfer status: {}", status.as_u16()),
            });
        }

        response
            .json()
            .await
            .map_err(|e| DppError::StatusCheckError {
                message: e.to_string(),
            })
    }
}

fn initiation_failed() -> DppError {
    DppError::TransferInitiationError {
        message: "Failed to initiate EDC transfer".to_string(),
    }
}

#[async_trait]
impl PassportApi for HttpBackend {
    async fn list_passports(&self) -> Result<Vec<Passport>> {
        let url = self.endpoint(&["api", "dpp"])?;
        tracing::debug!("GET {}", url);
        let response = Self::ensure_success(self.client.get(url).send().await?).await?;
        Ok(response.json().await?)
    }

    async fn passport_detail(&self, id: &str) -> Result<Passport> {
        let url = self.endpoint_with_query(&["api", "dpp", "detail"], &[("id", id)])?;
        self.fetch_passport(url, id).await
    }

    async fn passport_by_serial(&self, serial_number: &str) -> Result<Passport> {
        let url = self.endpoint_with_query(
            &["api", "dpp", "by-serial"],
            &[("serialNumber", serial_number)],
        )?;
        self.fetch_passport(url, serial_number).await
    }

    async fn create_passport(&self, passport: &NewPassport) -> Result<Passport> {
        let url = self.endpoint(&["api", "dpp"])?;
        tracing::debug!("POST {}", url);
        let response =
            Self::ensure_success(self.client.post(url).json(passport).send().await?).await?;
        Ok(response.json().await?)
    }

    async fn add_repair(&self, passport_id: i64, repair: &NewRepairEntry) -> Result<RepairEntry> {
        let id = passport_id.to_string();
        let url =
            self.endpoint_with_query(&["api", "dpp", "repairs"], &[("passportId", id.as_str())])?;
        tracing::debug!("POST {}", url);
        let response =
            Self::ensure_success(self.client.post(url).json(repair).send().await?).await?;
        Ok(response.json().await?)
    }

    async fn upload_csv(
        &self,
        passport_id: i64,
        file_name: &str,
        data: Vec<u8>,
        encrypt: bool,
    ) -> Result<UploadOutcome> {
        let id = passport_id.to_string();
        let url = self.endpoint_with_query(&["api", "dpp", "upload-csv"], &[("id", id.as_str())])?;
        tracing::debug!("POST {} ({} bytes, encrypt={})", url, data.len(), encrypt);

        let file_part = multipart::Part::bytes(data)
            .file_name(file_name.to_string())
            .mime_str("text/csv")?;
        let form = multipart::Form::new()
            .part("file", file_part)
            .text("encrypt", encrypt.to_string());

        let response =
            Self::ensure_success(self.client.post(url).multipart(form).send().await?).await?;
        Ok(response.json().await?)
    }

    async fn download_csv(&self, passport_id: i64) -> Result<Vec<u8>> {
        let id = passport_id.to_string();
        let url = self.endpoint_with_query(
            &["api", "dpp", "download-csv"],
            &[("passportId", id.as_str())],
        )?;
        tracing::debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(DppError::NotFound {
                resource: "CSV file for passport".to_string(),
                id,
            });
        }

        let response = Self::ensure_success(response).await?;
        Ok(response.bytes().await?.to_vec())
    }

    async fn encryption_status(&self) -> Result<EncryptionStatus> {
        let url = self.endpoint(&["api", "dpp", "encryption-status"])?;
        tracing::debug!("GET {}", url);
        let response = Self::ensure_success(self.client.get(url).send().await?).await?;
        Ok(response.json().await?)
    }
}
