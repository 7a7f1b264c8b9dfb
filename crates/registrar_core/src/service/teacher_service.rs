//! Teacher use-case service.
//!
//! # Invariants
//! - The complex filter is exactly
//!   `employment_type = FULL_TIME AND (teaches >= 1 subject OR is_active)`.

use crate::model::subject::SubjectId;
use crate::model::teacher::{
    EmploymentType, Teacher, TeacherDraft, TeacherId, TeacherProfile, TeacherWithLoad,
};
use crate::repo::teacher_repo::TeacherRepository;
use crate::repo::RepoError;
use crate::service::{ServiceError, ServiceResult};

pub struct TeacherService<R: TeacherRepository> {
    repo: R,
}

impl<R: TeacherRepository> TeacherService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn create(&self, draft: &TeacherDraft) -> ServiceResult<Teacher> {
        let teacher = Teacher::from_draft(draft)?;
        self.repo.create_teacher(&teacher)?;
        Ok(teacher)
    }

    /// Loads a teacher together with the subjects they teach.
    pub fn get(&self, id: TeacherId) -> ServiceResult<TeacherProfile> {
        let teacher = self.require_teacher(id)?;
        let subjects = self.repo.list_assigned_subjects(id)?;
        Ok(TeacherProfile { teacher, subjects })
    }

    pub fn list(&self) -> ServiceResult<Vec<TeacherWithLoad>> {
        Ok(self.repo.list_teachers()?)
    }

    pub fn update(&self, id: TeacherId, draft: &TeacherDraft) -> ServiceResult<Teacher> {
        let teacher = Teacher::with_id(id, draft)?;
        self.repo.update_teacher(&teacher)?;
        Ok(teacher)
    }

    /// Deletes a teacher; their subject assignments go with them.
    pub fn delete(&self, id: TeacherId) -> ServiceResult<Teacher> {
        let teacher = self.require_teacher(id)?;
        self.repo.delete_teacher(id)?;
        Ok(teacher)
    }

    pub fn assign_subject(&self, teacher_id: TeacherId, subject_id: SubjectId) -> ServiceResult<()> {
        self.require_teacher(teacher_id)?;
        if !self.repo.subject_exists(subject_id)? {
            return Err(ServiceError::ReferenceNotFound {
                entity: "subject",
                id: subject_id,
            });
        }
        self.repo
            .assign_subject(teacher_id, subject_id)
            .map_err(|err| match err {
                RepoError::UniqueViolation(_) => ServiceError::Duplicate(format!(
                    "teacher {teacher_id} already teaches subject {subject_id}"
                )),
                other => other.into(),
            })
    }

    /// Teachers assigned to more than one subject.
    pub fn list_teaching_multiple_subjects(&self) -> ServiceResult<Vec<TeacherWithLoad>> {
        Ok(self.repo.list_with_more_subjects_than(1)?)
    }

    /// Full-time teachers that teach at least one subject or are active.
    pub fn list_with_complex_filter(&self) -> ServiceResult<Vec<TeacherWithLoad>> {
        Ok(self
            .repo
            .list_by_employment_teaching_or_active(EmploymentType::FullTime)?)
    }

    fn require_teacher(&self, id: TeacherId) -> ServiceResult<Teacher> {
        self.repo.get_teacher(id)?.ok_or(ServiceError::NotFound {
            entity: "teacher",
            id,
        })
    }
}
