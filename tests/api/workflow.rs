use crate::helpers::spawn_app;
use drillreport::domain::{ShiftKind, ShiftTest};
use uuid::Uuid;

fn base_shift() -> ShiftTest {
    ShiftTest::new()
        .with_date("2025-03-01")
        .with_rig("Rig-7")
        .with_kind(ShiftKind::Day)
}

async fn status_and_lock(app: &crate::helpers::TestApp, shift_id: Uuid) -> (String, bool) {
    sqlx::query_as("SELECT status::text, is_locked FROM shifts WHERE id = $1")
        .bind(shift_id)
        .fetch_one(&app.db_pool)
        .await
        .expect("Failed to fetch data.")
}

#[tokio::test]
async fn the_happy_path_walks_draft_to_client_approved() {
    // Arrange
    let app = spawn_app().await;
    let shift_id = app.add_shift_expect_id(&base_shift()).await;
    assert_eq!(("draft".to_string(), false), status_and_lock(&app, shift_id).await);

    // Act + Assert, stage by stage.
    let response = app
        .workflow_action(shift_id, "submit", "A. Supervisor", "supervisor")
        .await;
    assert_eq!(200, response.status().as_u16());
    assert_eq!(("submitted".to_string(), false), status_and_lock(&app, shift_id).await);

    let response = app
        .workflow_action(shift_id, "approve", "M. Anager", "manager")
        .await;
    assert_eq!(200, response.status().as_u16());
    assert_eq!(
        ("manager_approved".to_string(), true),
        status_and_lock(&app, shift_id).await
    );

    let response = app
        .workflow_action(shift_id, "approve", "C. Lient", "client")
        .await;
    assert_eq!(200, response.status().as_u16());
    assert_eq!(
        ("client_approved".to_string(), true),
        status_and_lock(&app, shift_id).await
    );

    // Two decisions were recorded, in order.
    let response = app.get_approvals(shift_id).await;
    assert_eq!(200, response.status().as_u16());
    let approvals: serde_json::Value = response.json().await.unwrap();
    let approvals = approvals.as_array().unwrap();
    assert_eq!(approvals.len(), 2);
    assert_eq!(approvals[0]["role"], "manager");
    assert_eq!(approvals[0]["decision"], "approved");
    assert_eq!(approvals[1]["role"], "client");
    assert_eq!(approvals[1]["approver"], "C. Lient");
}

#[tokio::test]
async fn submit_requires_the_supervisor_role() {
    let app = spawn_app().await;
    let shift_id = app.add_shift_expect_id(&base_shift()).await;

    for role in ["manager", "client"] {
        let response = app
            .workflow_action(shift_id, "submit", "N. Otallowed", role)
            .await;
        assert_eq!(403, response.status().as_u16());
    }
    assert_eq!(("draft".to_string(), false), status_and_lock(&app, shift_id).await);
}

#[tokio::test]
async fn approving_a_draft_returns_a_409() {
    let app = spawn_app().await;
    let shift_id = app.add_shift_expect_id(&base_shift()).await;

    let response = app
        .workflow_action(shift_id, "approve", "M. Anager", "manager")
        .await;
    assert_eq!(409, response.status().as_u16());
}

#[tokio::test]
async fn a_submitted_shift_is_decided_by_the_manager_only() {
    let app = spawn_app().await;
    let shift_id = app.shift_at_status(&base_shift(), "submitted").await;

    for role in ["supervisor", "client"] {
        let response = app
            .workflow_action(shift_id, "approve", "N. Otallowed", role)
            .await;
        assert_eq!(403, response.status().as_u16());
    }
}

#[tokio::test]
async fn a_rejection_reopens_the_shift_and_records_the_comment() {
    // Arrange
    let app = spawn_app().await;
    let shift_id = app.shift_at_status(&base_shift(), "submitted").await;

    // Act
    let response = app
        .workflow_action_with_comment(
            shift_id,
            "reject",
            "M. Anager",
            "manager",
            "Missing the afternoon runs.",
        )
        .await;

    // Assert
    assert_eq!(200, response.status().as_u16());
    assert_eq!(
        ("manager_rejected".to_string(), false),
        status_and_lock(&app, shift_id).await
    );

    let (decision, comment): (String, Option<String>) =
        sqlx::query_as("SELECT decision::text, comment FROM approvals WHERE shift_id = $1")
            .bind(shift_id)
            .fetch_one(&app.db_pool)
            .await
            .expect("Failed to fetch data.");
    assert_eq!(decision, "rejected");
    assert_eq!(comment.as_deref(), Some("Missing the afternoon runs."));

    // The supervisor can resubmit after rework.
    let response = app
        .workflow_action(shift_id, "submit", "A. Supervisor", "supervisor")
        .await;
    assert_eq!(200, response.status().as_u16());
}

#[tokio::test]
async fn a_client_rejection_goes_back_to_the_supervisor() {
    let app = spawn_app().await;
    let shift_id = app.shift_at_status(&base_shift(), "manager_approved").await;

    let response = app
        .workflow_action(shift_id, "reject", "C. Lient", "client")
        .await;
    assert_eq!(200, response.status().as_u16());
    assert_eq!(
        ("client_rejected".to_string(), false),
        status_and_lock(&app, shift_id).await
    );

    let response = app
        .workflow_action(shift_id, "submit", "A. Supervisor", "supervisor")
        .await;
    assert_eq!(200, response.status().as_u16());
}

#[tokio::test]
async fn client_approval_is_terminal() {
    let app = spawn_app().await;
    let shift_id = app.shift_at_status(&base_shift(), "client_approved").await;

    for (action, actor, role) in [
        ("submit", "A. Supervisor", "supervisor"),
        ("approve", "M. Anager", "manager"),
        ("reject", "C. Lient", "client"),
    ] {
        let response = app.workflow_action(shift_id, action, actor, role).await;
        assert_eq!(409, response.status().as_u16());
    }
}

#[tokio::test]
async fn concurrent_decisions_commit_exactly_once() {
    // Arrange
    let app = spawn_app().await;
    let shift_id = app.shift_at_status(&base_shift(), "submitted").await;

    // Act: two managers race to decide the same shift.
    let (first, second) = tokio::join!(
        app.workflow_action(shift_id, "approve", "M. One", "manager"),
        app.workflow_action(shift_id, "reject", "M. Two", "manager"),
    );

    // Assert: one commits, the loser observes the advanced status.
    let mut statuses = [first.status().as_u16(), second.status().as_u16()];
    statuses.sort_unstable();
    assert_eq!(statuses, [200, 409]);

    let approval_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM approvals WHERE shift_id = $1")
            .bind(shift_id)
            .fetch_one(&app.db_pool)
            .await
            .expect("Failed to fetch data.");
    assert_eq!(approval_count, 1);
}

#[tokio::test]
async fn workflow_actions_on_unknown_shifts_return_a_404() {
    let app = spawn_app().await;
    let response = app
        .workflow_action(Uuid::new_v4(), "submit", "A. Supervisor", "supervisor")
        .await;
    assert_eq!(404, response.status().as_u16());
}
