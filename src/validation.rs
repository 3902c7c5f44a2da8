//! Request schema for students.
//!
//! The body is decoded by hand from a `serde_json::Value` so that a missing or
//! wrongly typed field comes back as a field error next to the others, not as
//! a decode failure that stops at the first problem. The create and update
//! schemas differ only in whether top-level fields are required; nested
//! objects must always be complete.

use crate::data::student::{
    BloodGroup, Enumerated, Gender, Guardian, LocalGuardian, NewStudent, Status, StudentPatch,
    UserName, normalise_email,
};
use email_address::EmailAddress;
use serde::Serialize;
use serde_json::{Map, Value};
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub path: String,
    pub message: String,
}

impl FieldError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }

    fn mismatch(path: impl Into<String>, expected: &str, found: &Value) -> Self {
        Self::new(path, format!("Expected {expected}, received {}", json_type(found)))
    }
}

const fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// One JSON object being picked apart. Type mismatches are recorded against
/// the field's path and the field is then treated as absent.
struct Fields<'e> {
    object: Map<String, Value>,
    prefix: &'static str,
    errors: &'e mut Vec<FieldError>,
}

impl Fields<'_> {
    fn path(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}.{key}", self.prefix)
        }
    }

    fn string(&mut self, key: &str) -> Option<String> {
        match self.object.remove(key)? {
            Value::Null => None,
            Value::String(value) => Some(value),
            other => {
                let path = self.path(key);
                self.errors.push(FieldError::mismatch(path, "string", &other));
                None
            }
        }
    }

    fn nested<T>(
        &mut self,
        key: &'static str,
        decode: impl FnOnce(&mut Fields<'_>) -> T,
    ) -> Option<T> {
        let object = match self.object.remove(key)? {
            Value::Null => return None,
            Value::Object(object) => object,
            other => {
                let path = self.path(key);
                self.errors.push(FieldError::mismatch(path, "object", &other));
                return None;
            }
        };

        let mut inner = Fields {
            object,
            prefix: key,
            errors: &mut *self.errors,
        };
        Some(decode(&mut inner))
    }
}

#[derive(Debug, Default, Validate)]
pub struct UserNamePayload {
    #[validate(
        required(message = "First name is required"),
        length(min = 1, message = "First name is required")
    )]
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    #[validate(
        required(message = "Last name is required"),
        length(min = 1, message = "Last name is required")
    )]
    pub last_name: Option<String>,
}

impl UserNamePayload {
    fn decode(fields: &mut Fields<'_>) -> Self {
        Self {
            first_name: fields.string("firstName"),
            middle_name: fields.string("middleName"),
            last_name: fields.string("lastName"),
        }
    }

    fn into_name(self) -> Option<UserName> {
        Some(UserName {
            first_name: self.first_name?,
            middle_name: self.middle_name,
            last_name: self.last_name?,
        })
    }
}

#[derive(Debug, Default, Validate)]
pub struct GuardianPayload {
    #[validate(
        required(message = "Father name is required"),
        length(min = 1, message = "Father name is required")
    )]
    pub father_name: Option<String>,
    #[validate(
        required(message = "Father occupation is required"),
        length(min = 1, message = "Father occupation is required")
    )]
    pub father_occupation: Option<String>,
    #[validate(
        required(message = "Father contact number is required"),
        length(min = 1, message = "Father contact number is required")
    )]
    pub father_contact_no: Option<String>,
    #[validate(
        required(message = "Mother name is required"),
        length(min = 1, message = "Mother name is required")
    )]
    pub mother_name: Option<String>,
    #[validate(
        required(message = "Mother occupation is required"),
        length(min = 1, message = "Mother occupation is required")
    )]
    pub mother_occupation: Option<String>,
    #[validate(
        required(message = "Mother contact number is required"),
        length(min = 1, message = "Mother contact number is required")
    )]
    pub mother_contact_no: Option<String>,
}

impl GuardianPayload {
    fn decode(fields: &mut Fields<'_>) -> Self {
        Self {
            father_name: fields.string("fatherName"),
            father_occupation: fields.string("fatherOccupation"),
            father_contact_no: fields.string("fatherContactNo"),
            mother_name: fields.string("motherName"),
            mother_occupation: fields.string("motherOccupation"),
            mother_contact_no: fields.string("motherContactNo"),
        }
    }

    fn into_guardian(self) -> Option<Guardian> {
        Some(Guardian {
            father_name: self.father_name?,
            father_occupation: self.father_occupation?,
            father_contact_no: self.father_contact_no?,
            mother_name: self.mother_name?,
            mother_occupation: self.mother_occupation?,
            mother_contact_no: self.mother_contact_no?,
        })
    }
}

#[derive(Debug, Default, Validate)]
pub struct LocalGuardianPayload {
    #[validate(
        required(message = "Local guardian name is required"),
        length(min = 1, message = "Local guardian name is required")
    )]
    pub name: Option<String>,
    #[validate(
        required(message = "Local guardian occupation is required"),
        length(min = 1, message = "Local guardian occupation is required")
    )]
    pub occupation: Option<String>,
    #[validate(
        required(message = "Local guardian contact number is required"),
        length(min = 1, message = "Local guardian contact number is required")
    )]
    pub contact_no: Option<String>,
    #[validate(
        required(message = "Local guardian address is required"),
        length(min = 1, message = "Local guardian address is required")
    )]
    pub address: Option<String>,
}

impl LocalGuardianPayload {
    fn decode(fields: &mut Fields<'_>) -> Self {
        Self {
            name: fields.string("name"),
            occupation: fields.string("occupation"),
            contact_no: fields.string("contactNo"),
            address: fields.string("address"),
        }
    }

    fn into_local_guardian(self) -> Option<LocalGuardian> {
        Some(LocalGuardian {
            name: self.name?,
            occupation: self.occupation?,
            contact_no: self.contact_no?,
            address: self.address?,
        })
    }
}

#[derive(Debug, Default, Validate)]
pub struct StudentPayload {
    #[validate(length(min = 1, message = "Student ID is required"))]
    pub student_id: Option<String>,
    #[validate(nested)]
    pub name: Option<UserNamePayload>,
    pub gender: Option<String>,
    pub date_of_birth: Option<String>,
    pub email: Option<String>,
    #[validate(length(min = 1, message = "Contact number is required"))]
    pub contact_no: Option<String>,
    #[validate(length(min = 1, message = "Emergency contact number is required"))]
    pub emergency_contact_no: Option<String>,
    pub blood_group: Option<String>,
    #[validate(length(min = 1, message = "Present address is required"))]
    pub present_address: Option<String>,
    #[validate(length(min = 1, message = "Permanent address is required"))]
    pub permanent_address: Option<String>,
    #[validate(nested)]
    pub guardian: Option<GuardianPayload>,
    #[validate(nested)]
    pub local_guardian: Option<LocalGuardianPayload>,
    pub profile_img: Option<String>,
    pub is_active: Option<String>,
    /// Fields that were present with the wrong JSON type.
    malformed: Vec<FieldError>,
}

impl StudentPayload {
    /// Takes the `student` object out of a request body.
    pub fn from_body(body: Value) -> Result<Self, Vec<FieldError>> {
        let mut body = match body {
            Value::Object(body) => body,
            other => return Err(vec![FieldError::mismatch("body", "object", &other)]),
        };
        let student = match body.remove("student") {
            None | Some(Value::Null) => return Err(vec![FieldError::new("student", "Required")]),
            Some(Value::Object(student)) => student,
            Some(other) => return Err(vec![FieldError::mismatch("student", "object", &other)]),
        };

        let mut malformed = Vec::new();
        let mut fields = Fields {
            object: student,
            prefix: "",
            errors: &mut malformed,
        };
        let payload = Self {
            student_id: fields.string("studentId"),
            name: fields.nested("name", UserNamePayload::decode),
            gender: fields.string("gender"),
            date_of_birth: fields.string("dateOfBirth"),
            email: fields.string("email"),
            contact_no: fields.string("contactNo"),
            emergency_contact_no: fields.string("emergencyContactNo"),
            blood_group: fields.string("bloodGroup"),
            present_address: fields.string("presentAddress"),
            permanent_address: fields.string("permanentAddress"),
            guardian: fields.nested("guardian", GuardianPayload::decode),
            local_guardian: fields.nested("localGuardian", LocalGuardianPayload::decode),
            profile_img: fields.string("profileImg"),
            is_active: fields.string("isActive"),
            malformed: Vec::new(),
        };

        Ok(Self {
            malformed,
            ..payload
        })
    }

    /// The create schema.
    pub fn into_new_student(self) -> Result<NewStudent, Vec<FieldError>> {
        let mut errors = self.field_errors();
        errors.extend(
            self.missing_required()
                .into_iter()
                .map(|path| FieldError::new(path, "Required")),
        );
        if !errors.is_empty() {
            return Err(sorted(errors));
        }

        self.assemble()
            .ok_or_else(|| vec![FieldError::new("student", "Incomplete student record")])
    }

    /// The partial schema used for updates.
    pub fn into_patch(self) -> Result<StudentPatch, Vec<FieldError>> {
        let errors = self.field_errors();
        if !errors.is_empty() {
            return Err(sorted(errors));
        }

        Ok(StudentPatch {
            student_id: self.student_id,
            name: self.name.and_then(UserNamePayload::into_name),
            gender: self.gender.as_deref().and_then(Gender::parse),
            date_of_birth: self.date_of_birth,
            email: self.email.as_deref().map(normalise_email),
            contact_no: self.contact_no,
            emergency_contact_no: self.emergency_contact_no,
            blood_group: self.blood_group.as_deref().and_then(BloodGroup::parse),
            present_address: self.present_address,
            permanent_address: self.permanent_address,
            guardian: self.guardian.and_then(GuardianPayload::into_guardian),
            local_guardian: self
                .local_guardian
                .and_then(LocalGuardianPayload::into_local_guardian),
            profile_img: self.profile_img,
            is_active: self.is_active.as_deref().and_then(Status::parse),
        })
    }

    /// Errors for the fields that are present.
    fn field_errors(&self) -> Vec<FieldError> {
        let mut errors = self.malformed.clone();
        if let Err(validation_errors) = self.validate() {
            flatten("", &validation_errors, &mut errors);
        }

        if let Some(email) = &self.email {
            if !EmailAddress::is_valid(email.trim()) {
                errors.push(FieldError::new("email", "Invalid email address"));
            }
        }
        check_enumerated::<Gender>(&mut errors, "gender", "Gender", self.gender.as_deref());
        check_enumerated::<BloodGroup>(
            &mut errors,
            "bloodGroup",
            "Blood group",
            self.blood_group.as_deref(),
        );
        check_enumerated::<Status>(&mut errors, "isActive", "Status", self.is_active.as_deref());

        errors
    }

    fn missing_required(&self) -> Vec<&'static str> {
        [
            ("studentId", self.student_id.is_none()),
            ("name", self.name.is_none()),
            ("gender", self.gender.is_none()),
            ("email", self.email.is_none()),
            ("contactNo", self.contact_no.is_none()),
            ("emergencyContactNo", self.emergency_contact_no.is_none()),
            ("presentAddress", self.present_address.is_none()),
            ("permanentAddress", self.permanent_address.is_none()),
            ("guardian", self.guardian.is_none()),
            ("localGuardian", self.local_guardian.is_none()),
            ("isActive", self.is_active.is_none()),
        ]
        .into_iter()
        .filter_map(|(path, missing)| missing.then_some(path))
        .collect()
    }

    fn assemble(self) -> Option<NewStudent> {
        let blood_group = match self.blood_group {
            Some(blood_group) => Some(BloodGroup::parse(&blood_group)?),
            None => None,
        };

        Some(NewStudent {
            student_id: self.student_id?,
            name: self.name?.into_name()?,
            gender: Gender::parse(&self.gender?)?,
            date_of_birth: self.date_of_birth,
            email: normalise_email(&self.email?),
            contact_no: self.contact_no?,
            emergency_contact_no: self.emergency_contact_no?,
            blood_group,
            present_address: self.present_address?,
            permanent_address: self.permanent_address?,
            guardian: self.guardian?.into_guardian()?,
            local_guardian: self.local_guardian?.into_local_guardian()?,
            profile_img: self.profile_img,
            is_active: Status::parse(&self.is_active?)?,
        })
    }
}

fn check_enumerated<E: Enumerated>(
    errors: &mut Vec<FieldError>,
    path: &'static str,
    label: &str,
    value: Option<&str>,
) {
    if let Some(value) = value {
        if E::parse(value).is_none() {
            errors.push(FieldError::new(
                path,
                format!("{label} must be one of: {}", E::expected()),
            ));
        }
    }
}

/// Sorts by path and keeps only the first error per path, so a type mismatch
/// isn't repeated as "Required".
fn sorted(mut errors: Vec<FieldError>) -> Vec<FieldError> {
    errors.sort_by(|a, b| a.path.cmp(&b.path));
    errors.dedup_by(|later, earlier| later.path == earlier.path);
    errors
}

fn flatten(prefix: &str, errors: &ValidationErrors, out: &mut Vec<FieldError>) {
    for (field, kind) in errors.errors() {
        let field = camel_case(field);
        let path = if prefix.is_empty() {
            field
        } else {
            format!("{prefix}.{field}")
        };

        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                out.extend(field_errors.iter().map(|error| {
                    let message = error
                        .message
                        .as_ref()
                        .map_or_else(|| error.code.to_string(), ToString::to_string);
                    FieldError::new(path.clone(), message)
                }));
            }
            ValidationErrorsKind::Struct(nested) => flatten(&path, nested, out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    flatten(&format!("{path}.{index}"), nested, out);
                }
            }
        }
    }
}

/// `emergency_contact_no` -> `emergencyContactNo`
fn camel_case(snake: &str) -> String {
    let mut out = String::with_capacity(snake.len());
    let mut upper_next = false;
    for c in snake.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}
