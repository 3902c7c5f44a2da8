use crate::{
    data::{
        StudentStore,
        student::{NewStudent, Student, StudentPatch},
    },
    error::{RollcallError, RollcallResult},
};
use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Keeps students in insertion order behind a lock, with the same uniqueness
/// rules as the `students` table.
#[derive(Debug, Default)]
pub struct MemoryStudentStore {
    students: RwLock<Vec<Student>>,
}

impl MemoryStudentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn ensure_unique<'a>(
    mut others: impl Iterator<Item = &'a Student>,
    student_id: Option<&str>,
    email: Option<&str>,
) -> RollcallResult<()> {
    match others.find(|other| {
        Some(other.student_id.as_str()) == student_id || Some(other.email.as_str()) == email
    }) {
        Some(other) if Some(other.student_id.as_str()) == student_id => {
            Err(RollcallError::DuplicateStudent { field: "studentId" })
        }
        Some(_) => Err(RollcallError::DuplicateStudent { field: "email" }),
        None => Ok(()),
    }
}

#[async_trait]
impl StudentStore for MemoryStudentStore {
    async fn insert(&self, to_be_added: NewStudent) -> RollcallResult<Student> {
        let mut students = self.students.write().await;
        ensure_unique(
            students.iter(),
            Some(to_be_added.student_id.as_str()),
            Some(to_be_added.email.as_str()),
        )?;

        let student = Student::from_new(Uuid::new_v4(), to_be_added, OffsetDateTime::now_utc());
        students.push(student.clone());
        Ok(student)
    }

    async fn get_all(&self) -> RollcallResult<Vec<Student>> {
        Ok(self.students.read().await.clone())
    }

    async fn get_by_student_id(&self, student_id: &str) -> RollcallResult<Option<Student>> {
        Ok(self
            .students
            .read()
            .await
            .iter()
            .find(|student| student.student_id == student_id)
            .cloned())
    }

    async fn update_by_student_id(
        &self,
        student_id: &str,
        patch: StudentPatch,
    ) -> RollcallResult<Option<Student>> {
        let mut students = self.students.write().await;
        let Some(index) = students.iter().position(|s| s.student_id == student_id) else {
            return Ok(None);
        };

        ensure_unique(
            students
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != index)
                .map(|(_, s)| s),
            patch.student_id.as_deref(),
            patch.email.as_deref(),
        )?;

        let student = &mut students[index];
        student.apply(patch, OffsetDateTime::now_utc());
        Ok(Some(student.clone()))
    }

    async fn remove_by_student_id(&self, student_id: &str) -> RollcallResult<Option<Student>> {
        let mut students = self.students.write().await;
        Ok(students
            .iter()
            .position(|s| s.student_id == student_id)
            .map(|index| students.remove(index)))
    }
}
