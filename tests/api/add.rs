use crate::helpers::spawn_app;
use drillreport::domain::{
    BitSize, CasingKind, CasingTest, ProgressTest, ShiftKind, ShiftTest, SurveyKind, SurveyTest,
};
use fake::{Fake, Faker};

#[tokio::test]
async fn add_returns_a_201_for_valid_shift_data() {
    // Arrange
    let app = spawn_app().await;

    // Act
    for _ in 0..10 {
        let body: ShiftTest = Faker.fake();

        let shift_id = app.add_shift_expect_id(&body).await;

        let (status, is_locked, created_by): (String, bool, String) = sqlx::query_as(
            "SELECT status::text, is_locked, created_by FROM shifts WHERE id = $1",
        )
        .bind(shift_id)
        .fetch_one(&app.db_pool)
        .await
        .expect("Failed to fetch data.");

        assert_eq!(status, "draft");
        assert!(!is_locked);
        assert_eq!(created_by, "A. Supervisor");

        let progress_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM progress_entries WHERE shift_id = $1")
                .bind(shift_id)
                .fetch_one(&app.db_pool)
                .await
                .expect("Failed to fetch data.");
        assert_eq!(progress_count as usize, body.progress.len());
    }
}

#[tokio::test]
async fn add_computes_the_derived_progress_columns() {
    // Arrange
    let app = spawn_app().await;
    let body = ShiftTest::new()
        .with_date("2025-03-01")
        .with_rig("Rig-7")
        .with_kind(ShiftKind::Day)
        .with_progress(
            ProgressTest::new("BH-001", BitSize::HQ, 100.0, 112.0)
                .with_times("08:00:00", "12:00:00"),
        );

    // Act
    let shift_id = app.add_shift_expect_id(&body).await;

    // Assert
    let (meters, rate): (f64, Option<f64>) = sqlx::query_as(
        "SELECT meters_drilled, penetration_rate FROM progress_entries WHERE shift_id = $1",
    )
    .bind(shift_id)
    .fetch_one(&app.db_pool)
    .await
    .expect("Failed to fetch data.");
    assert_eq!(meters, 12.0);
    assert_eq!(rate, Some(3.0));
}

#[tokio::test]
async fn surveys_and_casings_are_stored_with_the_shift() {
    // Arrange
    let app = spawn_app().await;
    let body = ShiftTest::new()
        .with_date("2025-03-01")
        .with_rig("Rig-7")
        .with_kind(ShiftKind::Day)
        .with_survey(SurveyTest::new(SurveyKind::Gyro, 120.0, -60.0, 185.5))
        .with_survey(SurveyTest::new(SurveyKind::Camera, 90.0, -58.0, 184.0))
        .with_casing(CasingTest::new("4\"", CasingKind::Pvc, 2.5, 48.0));

    // Act
    let shift_id = app.add_shift_expect_id(&body).await;

    // Assert
    let survey_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM survey_entries WHERE shift_id = $1")
            .bind(shift_id)
            .fetch_one(&app.db_pool)
            .await
            .expect("Failed to fetch data.");
    assert_eq!(survey_count, 2);

    let (kind, length): (String, f64) = sqlx::query_as(
        "SELECT kind::text, length FROM casing_entries WHERE shift_id = $1",
    )
    .bind(shift_id)
    .fetch_one(&app.db_pool)
    .await
    .expect("Failed to fetch data.");
    assert_eq!(kind, "pvc");
    assert_eq!(length, 45.5);
}

#[tokio::test]
async fn invalid_survey_measurements_return_a_400_and_store_nothing() {
    // Arrange
    let app = spawn_app().await;
    let body = ShiftTest::new()
        .with_date("2025-03-01")
        .with_rig("Rig-7")
        .with_kind(ShiftKind::Day)
        .with_survey(SurveyTest::new(SurveyKind::Gyro, 120.0, -60.0, 360.0));

    // Act
    let response = app.add_shift(&body).await;

    // Assert
    assert_eq!(400, response.status().as_u16());
    let shift_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM shifts")
        .fetch_one(&app.db_pool)
        .await
        .expect("Failed to fetch data.");
    assert_eq!(shift_count, 0);
}

#[tokio::test]
async fn a_second_shift_for_the_same_date_rig_and_kind_returns_a_409() {
    // Arrange
    let app = spawn_app().await;
    let body = ShiftTest::new()
        .with_date("2025-03-01")
        .with_rig("Rig-7")
        .with_kind(ShiftKind::Day);
    app.add_shift_expect_id(&body).await;

    // Act
    let response = app.add_shift(&body).await;

    // Assert
    assert_eq!(409, response.status().as_u16());

    // The night half of the same period is still allowed.
    let night = ShiftTest::new()
        .with_date("2025-03-01")
        .with_rig("Rig-7")
        .with_kind(ShiftKind::Night)
        .with_times("19:00:00", "07:00:00");
    assert_eq!(201, app.add_shift(&night).await.status().as_u16());
}

#[tokio::test]
async fn invalid_progress_entries_return_a_400_and_store_nothing() {
    // Arrange
    let app = spawn_app().await;

    let test_cases = vec![
        (
            "end depth not beyond start depth",
            ProgressTest::new("BH-001", BitSize::HQ, 50.0, 50.0),
        ),
        (
            "zero duration run",
            ProgressTest::new("BH-001", BitSize::HQ, 50.0, 60.0)
                .with_times("08:00:00", "08:00:00"),
        ),
        (
            "negative core loss",
            ProgressTest::new("BH-001", BitSize::HQ, 50.0, 60.0).with_core(-1.0, 0.0),
        ),
    ];

    for (error_message, progress) in test_cases {
        let body = ShiftTest::new()
            .with_date("2025-03-01")
            .with_rig("Rig-7")
            .with_kind(ShiftKind::Day)
            .with_progress(progress);

        // Act
        let response = app.add_shift(&body).await;

        // Assert
        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 Bad Request when the payload had {}.",
            error_message
        );

        let shift_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM shifts")
            .fetch_one(&app.db_pool)
            .await
            .expect("Failed to fetch data.");
        assert_eq!(shift_count, 0);
    }
}

#[tokio::test]
async fn add_returns_a_400_when_data_is_missing() {
    // Arrange
    let app = spawn_app().await;

    let complete = ShiftTest::new()
        .with_date("2025-03-01")
        .with_rig("Rig-7")
        .with_kind(ShiftKind::Day);

    let test_cases = vec![
        ("date is missing", {
            let mut s = complete.clone();
            s.date = None;
            s
        }),
        ("rig is missing", {
            let mut s = complete.clone();
            s.rig = None;
            s
        }),
        ("kind is missing", {
            let mut s = complete.clone();
            s.kind = None;
            s
        }),
        ("supervisor is missing", {
            let mut s = complete.clone();
            s.supervisor = None;
            s
        }),
        ("start_time is missing", {
            let mut s = complete.clone();
            s.start_time = None;
            s
        }),
    ];

    for (error_message, invalid_body) in test_cases {
        // Act
        let response = app.add_shift(&invalid_body).await;

        // Assert
        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 Bad Request when the payload was {}.",
            error_message
        );
    }
}

#[tokio::test]
async fn only_a_supervisor_may_record_a_shift() {
    // Arrange
    let app = spawn_app().await;
    let body = ShiftTest::new()
        .with_date("2025-03-01")
        .with_rig("Rig-7")
        .with_kind(ShiftKind::Day);

    for role in ["manager", "client"] {
        let response = app.add_shift_as(&body, "N. Otallowed", role).await;
        assert_eq!(403, response.status().as_u16());
    }
}

#[tokio::test]
async fn requests_without_an_identity_return_a_401() {
    // Arrange
    let app = spawn_app().await;
    let body = ShiftTest::new()
        .with_date("2025-03-01")
        .with_rig("Rig-7")
        .with_kind(ShiftKind::Day);

    // Act: no x-actor / x-actor-role headers at all.
    let response = reqwest::Client::new()
        .post(format!("{}/shift", &app.address))
        .json(&body)
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(401, response.status().as_u16());

    // An unknown role is rejected the same way.
    let response = app.add_shift_as(&body, "D. Riller", "driller").await;
    assert_eq!(401, response.status().as_u16());
}
