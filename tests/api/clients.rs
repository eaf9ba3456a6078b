use crate::helpers::spawn_app;
use drillreport::domain::{ShiftKind, ShiftTest};
use serde_json::json;

#[tokio::test]
async fn clients_can_be_registered_and_listed() {
    // Arrange
    let app = spawn_app().await;

    // Act
    let response = app
        .add_client(&json!({
            "name": "Northern Mining Corp",
            "contact_person": "N. Emo",
            "email": "nemo@northern-mining.example",
        }))
        .await;

    // Assert
    assert_eq!(201, response.status().as_u16());

    let response = app.get_clients().await;
    assert_eq!(200, response.status().as_u16());
    let clients: serde_json::Value = response.json().await.unwrap();
    let clients = clients.as_array().unwrap();
    assert_eq!(clients.len(), 1);
    assert_eq!(clients[0]["name"], "Northern Mining Corp");
}

#[tokio::test]
async fn duplicate_client_names_return_a_409() {
    let app = spawn_app().await;
    let body = json!({ "name": "Northern Mining Corp" });

    assert_eq!(201, app.add_client(&body).await.status().as_u16());
    assert_eq!(409, app.add_client(&body).await.status().as_u16());
}

#[tokio::test]
async fn blank_client_names_return_a_400() {
    let app = spawn_app().await;
    let response = app.add_client(&json!({ "name": "   " })).await;
    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn shifts_can_be_filtered_by_client() {
    // Arrange
    let app = spawn_app().await;
    let response = app.add_client(&json!({ "name": "Northern Mining Corp" })).await;
    let body: serde_json::Value = response.json().await.unwrap();
    let client_id = body["id"].as_str().unwrap().to_string();

    let with_client = ShiftTest::new()
        .with_date("2025-03-01")
        .with_rig("Rig-1")
        .with_kind(ShiftKind::Day)
        .with_client(client_id.parse().unwrap());
    app.add_shift_expect_id(&with_client).await;

    let without_client = ShiftTest::new()
        .with_date("2025-03-01")
        .with_rig("Rig-2")
        .with_kind(ShiftKind::Day);
    app.add_shift_expect_id(&without_client).await;

    // Act
    let response = app.query_shifts(format!("client_id={client_id}")).await;

    // Assert
    assert_eq!(200, response.status().as_u16());
    let shifts: serde_json::Value = response.json().await.unwrap();
    let shifts = shifts.as_array().unwrap();
    assert_eq!(shifts.len(), 1);
    assert_eq!(shifts[0]["rig"], "Rig-1");
}
