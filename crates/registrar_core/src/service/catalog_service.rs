//! Career and cycle use-case service.

use crate::model::catalog::{Career, CareerId, Cycle, CycleId};
use crate::repo::catalog_repo::CatalogRepository;
use crate::service::{ServiceError, ServiceResult};

pub struct CatalogService<R: CatalogRepository> {
    repo: R,
}

impl<R: CatalogRepository> CatalogService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn create_career(&self, name: &str) -> ServiceResult<Career> {
        let career = Career::new(name)?;
        self.repo.create_career(&career)?;
        Ok(career)
    }

    pub fn get_career(&self, id: CareerId) -> ServiceResult<Career> {
        self.repo.get_career(id)?.ok_or(ServiceError::NotFound {
            entity: "career",
            id,
        })
    }

    pub fn list_careers(&self) -> ServiceResult<Vec<Career>> {
        Ok(self.repo.list_careers()?)
    }

    pub fn create_cycle(&self, name: &str, ordinal: i64) -> ServiceResult<Cycle> {
        let cycle = Cycle::new(name, ordinal)?;
        self.repo.create_cycle(&cycle)?;
        Ok(cycle)
    }

    pub fn get_cycle(&self, id: CycleId) -> ServiceResult<Cycle> {
        self.repo.get_cycle(id)?.ok_or(ServiceError::NotFound {
            entity: "cycle",
            id,
        })
    }

    pub fn list_cycles(&self) -> ServiceResult<Vec<Cycle>> {
        Ok(self.repo.list_cycles()?)
    }
}
