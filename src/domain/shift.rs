//! Shift record types used for deserializing HTTP requests, serializing
//! responses and reading rows back from the database.

use super::{
    ActivityAdd, ActivityTest, CasingAdd, CasingTest, MaterialAdd, MaterialTest, ProgressAdd,
    ProgressTest, SurveyAdd, SurveyTest, ValidName,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use fake::{Dummy, Fake, Faker, StringFaker};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Workflow state of a shift. This is a closed enumeration backed by a
/// Postgres enum type, so an out-of-range value is rejected when a row or a
/// request is deserialized, never deep inside the workflow logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "shift_status", rename_all = "snake_case")]
pub enum ShiftStatus {
    Draft,
    Submitted,
    ManagerApproved,
    ManagerRejected,
    ClientApproved,
    ClientRejected,
}

impl fmt::Display for ShiftStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            ShiftStatus::Draft => "draft",
            ShiftStatus::Submitted => "submitted",
            ShiftStatus::ManagerApproved => "manager_approved",
            ShiftStatus::ManagerRejected => "manager_rejected",
            ShiftStatus::ClientApproved => "client_approved",
            ShiftStatus::ClientRejected => "client_rejected",
        };
        write!(f, "{s}")
    }
}

/// Day or night half of a 24-hour drilling period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "shift_kind", rename_all = "lowercase")]
pub enum ShiftKind {
    Day,
    Night,
}

impl ShiftKind {
    /// The companion kind on the same date and rig.
    pub fn opposite(&self) -> ShiftKind {
        match self {
            ShiftKind::Day => ShiftKind::Night,
            ShiftKind::Night => ShiftKind::Day,
        }
    }
}

impl fmt::Display for ShiftKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ShiftKind::Day => write!(f, "day"),
            ShiftKind::Night => write!(f, "night"),
        }
    }
}

/// A shift row as persisted. At most one row exists per
/// `(date, rig, kind)`, enforced by a unique constraint.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ShiftRecord {
    pub id: Uuid,
    #[sqlx(rename = "shift_date")]
    pub date: NaiveDate,
    pub rig: String,
    pub kind: ShiftKind,
    pub location: Option<String>,
    pub client_id: Option<Uuid>,
    pub supervisor: String,
    pub driller: Option<String>,
    pub helpers: Vec<String>,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub notes: Option<String>,
    pub status: ShiftStatus,
    pub is_locked: bool,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ShiftRecord {
    /// Number of non-blank crew name fields, used for man-hour totals.
    pub fn crew_size(&self) -> usize {
        let mut n = usize::from(!self.supervisor.trim().is_empty());
        if let Some(driller) = &self.driller {
            n += usize::from(!driller.trim().is_empty());
        }
        n += self.helpers.iter().filter(|h| !h.trim().is_empty()).count();
        n
    }
}

/// Payload for creating a shift together with its child entries.
#[derive(Debug, Clone, Deserialize)]
pub struct ShiftAdd {
    pub date: NaiveDate,
    pub rig: ValidName,
    pub kind: ShiftKind,
    pub location: Option<String>,
    pub client_id: Option<Uuid>,
    pub supervisor: ValidName,
    pub driller: Option<String>,
    #[serde(default)]
    pub helpers: Vec<String>,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub notes: Option<String>,
    #[serde(default)]
    pub progress: Vec<ProgressAdd>,
    #[serde(default)]
    pub activities: Vec<ActivityAdd>,
    #[serde(default)]
    pub materials: Vec<MaterialAdd>,
    #[serde(default)]
    pub surveys: Vec<SurveyAdd>,
    #[serde(default)]
    pub casings: Vec<CasingAdd>,
}

/// Payload for editing a shift. The identity fields (`date`, `rig`, `kind`)
/// are immutable; the child collections are replaced wholesale.
#[derive(Debug, Clone, Deserialize)]
pub struct ShiftUpdate {
    pub location: Option<String>,
    pub client_id: Option<Uuid>,
    pub supervisor: ValidName,
    pub driller: Option<String>,
    #[serde(default)]
    pub helpers: Vec<String>,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub notes: Option<String>,
    #[serde(default)]
    pub progress: Vec<ProgressAdd>,
    #[serde(default)]
    pub activities: Vec<ActivityAdd>,
    #[serde(default)]
    pub materials: Vec<MaterialAdd>,
    #[serde(default)]
    pub surveys: Vec<SurveyAdd>,
    #[serde(default)]
    pub casings: Vec<CasingAdd>,
}

#[doc(hidden)]
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct ShiftTest {
    pub date: Option<NaiveDate>,
    pub rig: Option<String>,
    pub kind: Option<ShiftKind>,
    pub location: Option<String>,
    pub client_id: Option<Uuid>,
    pub supervisor: Option<String>,
    pub driller: Option<String>,
    pub helpers: Vec<String>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub notes: Option<String>,
    pub progress: Vec<ProgressTest>,
    pub activities: Vec<ActivityTest>,
    pub materials: Vec<MaterialTest>,
    pub surveys: Vec<SurveyTest>,
    pub casings: Vec<CasingTest>,
}

impl ShiftTest {
    pub fn new() -> Self {
        ShiftTest {
            supervisor: Some("A. Supervisor".to_string()),
            start_time: NaiveTime::from_hms_opt(7, 0, 0),
            end_time: NaiveTime::from_hms_opt(19, 0, 0),
            ..ShiftTest::default()
        }
    }

    pub fn with_date<T: AsRef<str>>(mut self, date: T) -> Self {
        self.date = Some(
            NaiveDate::parse_from_str(date.as_ref(), "%Y-%m-%d").expect("invalid test date"),
        );
        self
    }

    pub fn with_rig<T: AsRef<str>>(mut self, rig: T) -> Self {
        self.rig = Some(rig.as_ref().to_string());
        self
    }

    pub fn with_kind(mut self, kind: ShiftKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_client(mut self, client_id: Uuid) -> Self {
        self.client_id = Some(client_id);
        self
    }

    pub fn with_supervisor<T: AsRef<str>>(mut self, supervisor: T) -> Self {
        self.supervisor = Some(supervisor.as_ref().to_string());
        self
    }

    pub fn with_crew<T: AsRef<str>>(mut self, driller: T, helpers: Vec<T>) -> Self {
        self.driller = Some(driller.as_ref().to_string());
        self.helpers = helpers.iter().map(|h| h.as_ref().to_string()).collect();
        self
    }

    pub fn with_times<T: AsRef<str>>(mut self, start: T, end: T) -> Self {
        self.start_time =
            Some(NaiveTime::parse_from_str(start.as_ref(), "%H:%M:%S").expect("invalid time"));
        self.end_time =
            Some(NaiveTime::parse_from_str(end.as_ref(), "%H:%M:%S").expect("invalid time"));
        self
    }

    pub fn with_progress(mut self, progress: ProgressTest) -> Self {
        self.progress.push(progress);
        self
    }

    pub fn with_activity(mut self, activity: ActivityTest) -> Self {
        self.activities.push(activity);
        self
    }

    pub fn with_material(mut self, material: MaterialTest) -> Self {
        self.materials.push(material);
        self
    }

    pub fn with_survey(mut self, survey: SurveyTest) -> Self {
        self.surveys.push(survey);
        self
    }

    pub fn with_casing(mut self, casing: CasingTest) -> Self {
        self.casings.push(casing);
        self
    }
}

impl Dummy<Faker> for ShiftTest {
    fn dummy_with_rng<R: Rng + ?Sized>(_: &Faker, rng: &mut R) -> ShiftTest {
        let fakename = || -> String {
            StringFaker::with(
                String::from("ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789-").into_bytes(),
                1..32,
            )
            .fake()
        };
        let day = rng.gen_range(1..=28);
        let month = rng.gen_range(1..=12);
        let kind = if rng.gen_bool(0.5) {
            ShiftKind::Day
        } else {
            ShiftKind::Night
        };
        let mut out = ShiftTest::new()
            .with_date(format!("2025-{month:02}-{day:02}"))
            .with_rig(fakename())
            .with_kind(kind)
            .with_supervisor(fakename())
            .with_crew(fakename(), vec![fakename(), fakename()]);
        out = match kind {
            ShiftKind::Day => out.with_times("07:00:00", "19:00:00"),
            ShiftKind::Night => out.with_times("19:00:00", "07:00:00"),
        };
        for _ in 0..rng.gen_range(1..4) {
            out = out.with_progress(Faker.fake_with_rng(rng));
        }
        out
    }
}

#[cfg(test)]
impl quickcheck::Arbitrary for ShiftTest {
    fn arbitrary(_g: &mut quickcheck::Gen) -> Self {
        Faker.fake()
    }
}
