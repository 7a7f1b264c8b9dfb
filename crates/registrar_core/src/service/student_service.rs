//! Student use-case service.
//!
//! # Invariants
//! - A student always references an existing career.
//! - Students holding enrollments cannot be deleted.

use crate::model::catalog::CareerId;
use crate::model::period::PeriodId;
use crate::model::student::{Student, StudentDraft, StudentId, StudentWithCareer};
use crate::repo::student_repo::StudentRepository;
use crate::service::{ServiceError, ServiceResult};

pub struct StudentService<R: StudentRepository> {
    repo: R,
}

impl<R: StudentRepository> StudentService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn create(&self, draft: &StudentDraft) -> ServiceResult<Student> {
        let student = Student::from_draft(draft)?;
        self.ensure_career_exists(student.career_id)?;
        self.repo.create_student(&student)?;
        Ok(student)
    }

    pub fn get(&self, id: StudentId) -> ServiceResult<StudentWithCareer> {
        self.repo
            .get_student_with_career(id)?
            .ok_or(ServiceError::NotFound {
                entity: "student",
                id,
            })
    }

    pub fn list(&self) -> ServiceResult<Vec<Student>> {
        Ok(self.repo.list_students()?)
    }

    /// Replaces every mutable field of a student.
    pub fn update(&self, id: StudentId, draft: &StudentDraft) -> ServiceResult<Student> {
        let student = Student::with_id(id, draft)?;
        if self.repo.get_student(id)?.is_none() {
            return Err(ServiceError::NotFound {
                entity: "student",
                id,
            });
        }
        self.ensure_career_exists(student.career_id)?;
        self.repo.update_student(&student)?;
        Ok(student)
    }

    pub fn delete(&self, id: StudentId) -> ServiceResult<Student> {
        let student = self.get(id)?.student;
        self.repo
            .delete_student(id)
            .map_err(|err| ServiceError::from_delete("student", id, err))?;
        Ok(student)
    }

    /// Active students with their career, ordered by last name.
    pub fn list_active_with_career(&self) -> ServiceResult<Vec<StudentWithCareer>> {
        Ok(self.repo.list_active_with_career()?)
    }

    /// Active students of `career_id` enrolled in at least one subject of
    /// `period_id`, ordered by last name.
    pub fn list_active_by_career_and_period(
        &self,
        career_id: CareerId,
        period_id: PeriodId,
    ) -> ServiceResult<Vec<StudentWithCareer>> {
        Ok(self
            .repo
            .list_active_by_career_and_period(career_id, period_id)?)
    }

    fn ensure_career_exists(&self, career_id: CareerId) -> ServiceResult<()> {
        if self.repo.get_career(career_id)?.is_none() {
            return Err(ServiceError::ReferenceNotFound {
                entity: "career",
                id: career_id,
            });
        }
        Ok(())
    }
}
