use serde::Serialize;
use sqlx::{FromRow, Row, postgres::PgRow};
use time::OffsetDateTime;
use uuid::Uuid;

/// A closed set of string values, shared by the request schema (for parsing
/// and error messages) and the storage layer.
pub trait Enumerated: Sized + Copy + 'static {
    const VARIANTS: &'static [(&'static str, Self)];

    fn parse(s: &str) -> Option<Self> {
        Self::VARIANTS
            .iter()
            .find(|(name, _)| *name == s)
            .map(|(_, variant)| *variant)
    }

    fn expected() -> String {
        Self::VARIANTS
            .iter()
            .map(|(name, _)| *name)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::Type)]
#[sqlx(type_name = "gender", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Enumerated for Gender {
    const VARIANTS: &'static [(&'static str, Self)] =
        &[("male", Self::Male), ("female", Self::Female)];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::Type)]
#[sqlx(type_name = "blood_group")]
pub enum BloodGroup {
    #[sqlx(rename = "A+")]
    #[serde(rename = "A+")]
    APositive,
    #[sqlx(rename = "A-")]
    #[serde(rename = "A-")]
    ANegative,
    #[sqlx(rename = "B+")]
    #[serde(rename = "B+")]
    BPositive,
    #[sqlx(rename = "B-")]
    #[serde(rename = "B-")]
    BNegative,
    #[sqlx(rename = "AB+")]
    #[serde(rename = "AB+")]
    AbPositive,
    #[sqlx(rename = "AB-")]
    #[serde(rename = "AB-")]
    AbNegative,
    #[sqlx(rename = "O+")]
    #[serde(rename = "O+")]
    OPositive,
    #[sqlx(rename = "O-")]
    #[serde(rename = "O-")]
    ONegative,
}

impl Enumerated for BloodGroup {
    const VARIANTS: &'static [(&'static str, Self)] = &[
        ("A+", Self::APositive),
        ("A-", Self::ANegative),
        ("B+", Self::BPositive),
        ("B-", Self::BNegative),
        ("AB+", Self::AbPositive),
        ("AB-", Self::AbNegative),
        ("O+", Self::OPositive),
        ("O-", Self::ONegative),
    ];
}

/// Whether the student is currently enrolled (`active`) or suspended (`blocked`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::Type)]
#[sqlx(type_name = "student_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Active,
    Blocked,
}

impl Enumerated for Status {
    const VARIANTS: &'static [(&'static str, Self)] =
        &[("active", Self::Active), ("blocked", Self::Blocked)];
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserName {
    pub first_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    pub last_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Guardian {
    pub father_name: String,
    pub father_occupation: String,
    pub father_contact_no: String,
    pub mother_name: String,
    pub mother_occupation: String,
    pub mother_contact_no: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalGuardian {
    pub name: String,
    pub occupation: String,
    pub contact_no: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: Uuid,
    pub student_id: String,
    pub name: UserName,
    pub gender: Gender,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    pub email: String,
    pub contact_no: String,
    pub emergency_contact_no: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blood_group: Option<BloodGroup>,
    pub present_address: String,
    pub permanent_address: String,
    pub guardian: Guardian,
    pub local_guardian: LocalGuardian,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_img: Option<String>,
    pub is_active: Status,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// A validated student that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    pub student_id: String,
    pub name: UserName,
    pub gender: Gender,
    pub date_of_birth: Option<String>,
    pub email: String,
    pub contact_no: String,
    pub emergency_contact_no: String,
    pub blood_group: Option<BloodGroup>,
    pub present_address: String,
    pub permanent_address: String,
    pub guardian: Guardian,
    pub local_guardian: LocalGuardian,
    pub profile_img: Option<String>,
    pub is_active: Status,
}

/// A validated partial update. `None` leaves the stored value alone; nested
/// objects replace the stored one whole.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentPatch {
    pub student_id: Option<String>,
    pub name: Option<UserName>,
    pub gender: Option<Gender>,
    pub date_of_birth: Option<String>,
    pub email: Option<String>,
    pub contact_no: Option<String>,
    pub emergency_contact_no: Option<String>,
    pub blood_group: Option<BloodGroup>,
    pub present_address: Option<String>,
    pub permanent_address: Option<String>,
    pub guardian: Option<Guardian>,
    pub local_guardian: Option<LocalGuardian>,
    pub profile_img: Option<String>,
    pub is_active: Option<Status>,
}

/// Emails are compared and stored trimmed and lower-cased.
pub fn normalise_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl Student {
    pub fn from_new(id: Uuid, new: NewStudent, now: OffsetDateTime) -> Self {
        let NewStudent {
            student_id,
            name,
            gender,
            date_of_birth,
            email,
            contact_no,
            emergency_contact_no,
            blood_group,
            present_address,
            permanent_address,
            guardian,
            local_guardian,
            profile_img,
            is_active,
        } = new;

        Self {
            id,
            student_id,
            name,
            gender,
            date_of_birth,
            email,
            contact_no,
            emergency_contact_no,
            blood_group,
            present_address,
            permanent_address,
            guardian,
            local_guardian,
            profile_img,
            is_active,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, patch: StudentPatch, now: OffsetDateTime) {
        fn set<T>(slot: &mut T, value: Option<T>) {
            if let Some(value) = value {
                *slot = value;
            }
        }
        fn set_optional<T>(slot: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *slot = value;
            }
        }

        set(&mut self.student_id, patch.student_id);
        set(&mut self.name, patch.name);
        set(&mut self.gender, patch.gender);
        set_optional(&mut self.date_of_birth, patch.date_of_birth);
        set(&mut self.email, patch.email);
        set(&mut self.contact_no, patch.contact_no);
        set(&mut self.emergency_contact_no, patch.emergency_contact_no);
        set_optional(&mut self.blood_group, patch.blood_group);
        set(&mut self.present_address, patch.present_address);
        set(&mut self.permanent_address, patch.permanent_address);
        set(&mut self.guardian, patch.guardian);
        set(&mut self.local_guardian, patch.local_guardian);
        set_optional(&mut self.profile_img, patch.profile_img);
        set(&mut self.is_active, patch.is_active);
        self.updated_at = now;
    }
}

impl FromRow<'_, PgRow> for Student {
    fn from_row(row: &PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            student_id: row.try_get("student_id")?,
            name: UserName {
                first_name: row.try_get("first_name")?,
                middle_name: row.try_get("middle_name")?,
                last_name: row.try_get("last_name")?,
            },
            gender: row.try_get("gender")?,
            date_of_birth: row.try_get("date_of_birth")?,
            email: row.try_get("email")?,
            contact_no: row.try_get("contact_no")?,
            emergency_contact_no: row.try_get("emergency_contact_no")?,
            blood_group: row.try_get("blood_group")?,
            present_address: row.try_get("present_address")?,
            permanent_address: row.try_get("permanent_address")?,
            guardian: Guardian {
                father_name: row.try_get("father_name")?,
                father_occupation: row.try_get("father_occupation")?,
                father_contact_no: row.try_get("father_contact_no")?,
                mother_name: row.try_get("mother_name")?,
                mother_occupation: row.try_get("mother_occupation")?,
                mother_contact_no: row.try_get("mother_contact_no")?,
            },
            local_guardian: LocalGuardian {
                name: row.try_get("local_guardian_name")?,
                occupation: row.try_get("local_guardian_occupation")?,
                contact_no: row.try_get("local_guardian_contact_no")?,
                address: row.try_get("local_guardian_address")?,
            },
            profile_img: row.try_get("profile_img")?,
            is_active: row.try_get("is_active")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}
