//! Academic period use-case service.

use crate::model::period::{AcademicPeriod, PeriodDraft, PeriodId};
use crate::repo::period_repo::PeriodRepository;
use crate::service::{ServiceError, ServiceResult};
use log::info;
use uuid::Uuid;

pub struct PeriodService<R: PeriodRepository> {
    repo: R,
}

impl<R: PeriodRepository> PeriodService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn create(&self, draft: &PeriodDraft) -> ServiceResult<AcademicPeriod> {
        let period = AcademicPeriod::with_id(Uuid::new_v4(), draft)?;
        self.repo.create_period(&period)?;
        Ok(period)
    }

    pub fn get(&self, id: PeriodId) -> ServiceResult<AcademicPeriod> {
        self.repo.get_period(id)?.ok_or(ServiceError::NotFound {
            entity: "academic period",
            id,
        })
    }

    pub fn list(&self) -> ServiceResult<Vec<AcademicPeriod>> {
        Ok(self.repo.list_periods()?)
    }

    /// Periods currently open for admission.
    pub fn list_active(&self) -> ServiceResult<Vec<AcademicPeriod>> {
        Ok(self.repo.list_active_periods()?)
    }

    /// Replaces name, dates and active flag.
    ///
    /// Closing a period does not touch existing enrollments; it only stops
    /// new admissions.
    pub fn update(&self, id: PeriodId, draft: &PeriodDraft) -> ServiceResult<AcademicPeriod> {
        let period = AcademicPeriod::with_id(id, draft)?;
        self.repo.update_period(&period)?;
        info!(
            "event=period_update module=period status=ok period_id={id} is_active={}",
            period.is_active
        );
        Ok(period)
    }

    pub fn delete(&self, id: PeriodId) -> ServiceResult<AcademicPeriod> {
        let period = self.get(id)?;
        self.repo
            .delete_period(id)
            .map_err(|err| ServiceError::from_delete("academic period", id, err))?;
        Ok(period)
    }
}
