use anyhow::Result;
use dpp_dashboard::app::render;
use dpp_dashboard::domain::model::{NewPassport, NewRepairEntry};
use dpp_dashboard::{
    CustomerDashboard, DashboardConfig, HttpBackend, LocalStorage, OperatorDashboard, PollPolicy,
    RepairShopDashboard,
};
use httpmock::prelude::*;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio_test::assert_err;

fn backend_for(server: &MockServer) -> Arc<HttpBackend> {
    let mut config = DashboardConfig::default();
    config.backend.base_url = server.base_url();
    Arc::new(HttpBackend::new(&config).unwrap())
}

#[tokio::test]
async fn test_customer_search_messages() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/dpp/detail").query_param("id", "404");
        then.status(404);
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/dpp/detail").query_param("id", "500");
        then.status(500).body("boom");
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/api/dpp/by-serial")
            .query_param("serialNumber", "SN-42");
        then.status(200)
            .json_body(json!({"id": 42, "productName": "Toaster", "serialNumber": "SN-42"}));
    });

    let customer = CustomerDashboard::new(backend_for(&server), PollPolicy::default());

    let err = assert_err!(customer.search_passport("404").await);
    assert_eq!(
        err.to_string(),
        "Product not found. Please check the ID and try again."
    );

    let err = assert_err!(customer.search_passport("500").await);
    assert_eq!(err.to_string(), "Failed to fetch product information");

    let err = assert_err!(customer.search_passport("   ").await);
    assert_eq!(err.to_string(), "Please enter a product ID");

    let found = customer.search_by_serial("SN-42").await.unwrap();
    assert_eq!(found.product_name.as_deref(), Some("Toaster"));
}

#[tokio::test]
async fn test_operator_create_and_list() -> Result<()> {
    let server = MockServer::start();
    let create = server.mock(|when, then| {
        when.method(POST)
            .path("/api/dpp")
            .json_body_partial(r#"{"productName": "Drill", "manufacturer": "ACME"}"#);
        then.status(200).json_body(json!({
            "id": 1, "productName": "Drill", "manufacturer": "ACME",
            "manufacturingDate": "2024-03-01T00:00:00", "repairHistory": []
        }));
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/dpp");
        then.status(200).json_body(json!([
            {"id": 1, "productName": "Drill", "manufacturer": "ACME", "serialNumber": "SN-1"}
        ]));
    });

    let temp_dir = TempDir::new()?;
    let operator = OperatorDashboard::new(
        backend_for(&server),
        LocalStorage::new(temp_dir.path().to_string_lossy()),
        Duration::ZERO,
    );

    let created = operator
        .create_passport(&NewPassport {
            product_name: "Drill".to_string(),
            manufacturer: "ACME".to_string(),
            serial_number: "SN-1".to_string(),
            ..Default::default()
        })
        .await?;
    create.assert();
    assert_eq!(created.id, 1);

    let table = render::passport_table(&operator.list_passports().await?);
    assert!(table.contains("Drill"));
    assert!(table.contains("SN-1"));
    Ok(())
}

#[tokio::test]
async fn test_operator_upload_and_download_csv() -> Result<()> {
    let server = MockServer::start();
    let upload = server.mock(|when, then| {
        when.method(POST)
            .path("/api/dpp/upload-csv")
            .query_param("id", "3")
            .body_contains("materials.csv")
            .body_contains("steel,60");
        then.status(200).json_body(json!({
            "passport": {"id": 3, "productName": "Drill", "csvFileName": "materials.csv", "encrypted": true},
            "encryptionEnabled": true
        }));
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/dpp/detail").query_param("id", "3");
        then.status(200).json_body(json!({
            "id": 3, "productName": "Drill", "csvFileName": "materials.csv", "encrypted": true
        }));
    });
    let download = server.mock(|when, then| {
        when.method(GET)
            .path("/api/dpp/download-csv")
            .query_param("passportId", "3");
        then.status(200).body("material,percent\nsteel,60\ncopper,40\n");
    });

    let temp_dir = TempDir::new()?;
    let csv_path = temp_dir.path().join("materials.csv");
    std::fs::write(&csv_path, "material,percent\nsteel,60\ncopper,40\n")?;

    let operator = OperatorDashboard::new(backend_for(&server), LocalStorage::new(""), Duration::ZERO);

    let report = operator.upload_csv(3, &csv_path, true).await?;
    upload.assert();
    assert_eq!(report.preview.headers, vec!["material", "percent"]);
    assert_eq!(report.preview.row_count, 2);
    assert!(report.outcome.encryption_enabled);

    let out_dir = temp_dir.path().join("downloads");
    let written = operator.download_csv(3, &out_dir).await?;
    download.assert();
    assert!(written.ends_with("materials.csv"));
    assert_eq!(
        std::fs::read_to_string(out_dir.join("materials.csv"))?,
        "material,percent\nsteel,60\ncopper,40\n"
    );
    Ok(())
}

/// 後端新增維修後回傳的是 RepairEntry，不是護照
fn saved_repair_body() -> serde_json::Value {
    json!({
        "id": 1, "repairDate": "2024-05-02T08:00:00",
        "description": "Replaced cord", "repairType": "Replacement", "technician": "Ana"
    })
}

fn replaced_cord() -> NewRepairEntry {
    NewRepairEntry {
        repair_date: None,
        description: "Replaced cord".to_string(),
        repair_type: "Replacement".to_string(),
        technician: "Ana".to_string(),
    }
}

#[tokio::test]
async fn test_operator_add_repair_shows_refreshed_history() -> Result<()> {
    let server = MockServer::start();
    let add = server.mock(|when, then| {
        when.method(POST)
            .path("/api/dpp/repairs")
            .query_param("passportId", "1");
        then.status(200).json_body(saved_repair_body());
    });
    let refresh = server.mock(|when, then| {
        when.method(GET).path("/api/dpp/detail").query_param("id", "1");
        then.status(200).json_body(json!({
            "id": 1,
            "productName": "Drill",
            "repairHistory": [saved_repair_body()]
        }));
    });

    let operator = OperatorDashboard::new(
        backend_for(&server),
        LocalStorage::new(""),
        Duration::from_millis(10),
    );
    let refreshed = operator.add_repair(1, &replaced_cord()).await?;

    add.assert();
    refresh.assert();
    assert_eq!(refreshed.id, 1);
    let history = render::repair_history(&refreshed.repair_history);
    assert!(history.contains("Repair history (1)"));
    assert!(history.contains("[Replacement] Replaced cord (technician: Ana)"));
    assert!(!history.contains("No repair history available."));
    Ok(())
}

#[tokio::test]
async fn test_operator_error_messages() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/dpp");
        then.status(500);
    });
    server.mock(|when, then| {
        when.method(POST).path("/api/dpp/repairs");
        then.status(503).body("down for maintenance");
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/dpp/download-csv");
        then.status(404);
    });
    server.mock(|when, then| {
        when.method(GET).path("/api/dpp/detail").query_param("id", "2");
        then.status(200)
            .json_body(json!({"id": 2, "csvFileName": "materials.csv"}));
    });

    let temp_dir = TempDir::new().unwrap();
    let operator = OperatorDashboard::new(backend_for(&server), LocalStorage::new(""), Duration::ZERO);

    let err = assert_err!(operator.list_passports().await);
    assert_eq!(err.to_string(), "Failed to fetch passports");

    let err = assert_err!(operator.add_repair(1, &replaced_cord()).await);
    assert_eq!(err.to_string(), "Failed to add repair entry: 503 Service Unavailable");

    let err = assert_err!(operator.download_csv(2, temp_dir.path()).await);
    assert_eq!(err.to_string(), "Failed to download file: 404 Not Found");
}

#[tokio::test]
async fn test_repair_shop_adds_entry_and_refreshes() -> Result<()> {
    let server = MockServer::start();
    let add = server.mock(|when, then| {
        when.method(POST)
            .path("/api/dpp/repairs")
            .query_param("passportId", "5")
            .json_body_partial(r#"{"technician": "Ana", "repairType": "Replacement"}"#);
        then.status(200).json_body(saved_repair_body());
    });
    let refresh = server.mock(|when, then| {
        when.method(GET).path("/api/dpp/detail").query_param("id", "5");
        then.status(200).json_body(json!({
            "id": 5,
            "productName": "Kettle",
            "repairHistory": [{
                "id": 1, "repairDate": "2024-05-02T08:00:00",
                "description": "Replaced cord", "repairType": "Replacement", "technician": "Ana"
            }]
        }));
    });

    let shop = RepairShopDashboard::new(backend_for(&server), Duration::from_millis(10));
    let refreshed = shop.add_repair("5", &replaced_cord()).await?;

    add.assert();
    refresh.assert();
    assert_eq!(refreshed.repair_history.len(), 1);
    assert!(render::passport_summary(&refreshed).contains("[Replacement] Replaced cord"));
    Ok(())
}

#[tokio::test]
async fn test_encryption_status() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/dpp/encryption-status");
        then.status(200).json_body(json!({"csvEncryptionEnabled": false}));
    });

    let operator = OperatorDashboard::new(backend_for(&server), LocalStorage::new(""), Duration::ZERO);
    assert!(!operator.encryption_status().await?.csv_encryption_enabled);
    Ok(())
}
