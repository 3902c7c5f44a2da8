use crate::{
    data::student::{NewStudent, Student, StudentPatch},
    error::RollcallResult,
};
use async_trait::async_trait;

pub mod memory;
pub mod postgres;
pub mod student;

/// One method per student operation. Lookups, updates and deletes key on the
/// human-facing `studentId`, not the storage id, and report an unknown id as
/// `Ok(None)`.
#[async_trait]
pub trait StudentStore: Send + Sync {
    async fn insert(&self, to_be_added: NewStudent) -> RollcallResult<Student>;
    async fn get_all(&self) -> RollcallResult<Vec<Student>>;
    async fn get_by_student_id(&self, student_id: &str) -> RollcallResult<Option<Student>>;
    async fn update_by_student_id(
        &self,
        student_id: &str,
        patch: StudentPatch,
    ) -> RollcallResult<Option<Student>>;
    async fn remove_by_student_id(&self, student_id: &str) -> RollcallResult<Option<Student>>;

    async fn close(&self) {}
}
