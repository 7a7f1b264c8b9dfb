//! Subject administration use-case service.
//!
//! # Invariants
//! - Subjects reference an existing career and cycle.
//! - Capacity changes preserve `available_quota == total_quota - enrolled`.

use crate::model::catalog::{CareerId, CycleId};
use crate::model::subject::{Subject, SubjectDetail, SubjectId};
use crate::model::validation::{normalize_required, ValidationError};
use crate::repo::subject_repo::SubjectRepository;
use crate::service::{ServiceError, ServiceResult};
use log::info;

pub struct SubjectService<R: SubjectRepository> {
    repo: R,
}

impl<R: SubjectRepository> SubjectService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a subject with every seat free.
    pub fn create(
        &self,
        name: &str,
        career_id: CareerId,
        cycle_id: CycleId,
        total_quota: i64,
    ) -> ServiceResult<Subject> {
        let subject = Subject::new(name, career_id, cycle_id, total_quota)?;
        if self.repo.get_career(career_id)?.is_none() {
            return Err(ServiceError::ReferenceNotFound {
                entity: "career",
                id: career_id,
            });
        }
        if self.repo.get_cycle(cycle_id)?.is_none() {
            return Err(ServiceError::ReferenceNotFound {
                entity: "cycle",
                id: cycle_id,
            });
        }
        self.repo.create_subject(&subject)?;
        Ok(subject)
    }

    pub fn get(&self, id: SubjectId) -> ServiceResult<SubjectDetail> {
        self.repo
            .get_subject_detail(id)?
            .ok_or(ServiceError::NotFound {
                entity: "subject",
                id,
            })
    }

    pub fn list(&self) -> ServiceResult<Vec<SubjectDetail>> {
        Ok(self.repo.list_subjects()?)
    }

    /// Subjects of one career in curriculum order.
    pub fn list_by_career(&self, career_id: CareerId) -> ServiceResult<Vec<SubjectDetail>> {
        if self.repo.get_career(career_id)?.is_none() {
            return Err(ServiceError::NotFound {
                entity: "career",
                id: career_id,
            });
        }
        Ok(self.repo.list_subjects_by_career(career_id)?)
    }

    pub fn rename(&self, id: SubjectId, name: &str) -> ServiceResult<Subject> {
        let name = normalize_required("subject name", name)?;
        self.repo.rename_subject(id, &name)?;
        self.require_subject(id)
    }

    /// Changes capacity, moving the free seats by the same amount.
    ///
    /// # Errors
    /// - `QuotaBelowEnrolled` when `new_total` is smaller than the number of
    ///   seats held by live enrollments at the time of the update.
    pub fn resize_quota(&self, id: SubjectId, new_total: i64) -> ServiceResult<Subject> {
        if new_total < 0 {
            return Err(ValidationError::QuotaOutOfRange {
                total: new_total,
                available: new_total,
            }
            .into());
        }
        let current = self.require_subject(id)?;
        if self.repo.resize_quota(id, new_total)? == 0 {
            let latest = self.require_subject(id)?;
            return Err(ServiceError::QuotaBelowEnrolled {
                subject_id: id,
                enrolled: latest.enrolled_count(),
                requested: new_total,
            });
        }
        let resized = self.require_subject(id)?;
        info!(
            "event=subject_resize module=subject status=ok subject_id={id} total_before={} total_after={} available_after={}",
            current.total_quota, resized.total_quota, resized.available_quota
        );
        Ok(resized)
    }

    pub fn delete(&self, id: SubjectId) -> ServiceResult<Subject> {
        let subject = self.require_subject(id)?;
        self.repo
            .delete_subject(id)
            .map_err(|err| ServiceError::from_delete("subject", id, err))?;
        Ok(subject)
    }

    fn require_subject(&self, id: SubjectId) -> ServiceResult<Subject> {
        self.repo.get_subject(id)?.ok_or(ServiceError::NotFound {
            entity: "subject",
            id,
        })
    }
}
