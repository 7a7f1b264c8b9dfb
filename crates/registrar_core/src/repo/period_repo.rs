//! Academic period repository contracts and SQLite implementation.

use super::row_mapping::{bool_to_int, parse_period_row, PERIOD_COLUMNS};
use super::{RepoError, RepoResult};
use crate::model::period::{AcademicPeriod, PeriodId};
use rusqlite::{params, Connection};

/// Repository interface for academic periods.
pub trait PeriodRepository {
    fn create_period(&self, period: &AcademicPeriod) -> RepoResult<PeriodId>;
    fn get_period(&self, id: PeriodId) -> RepoResult<Option<AcademicPeriod>>;
    /// All periods, most recent start first.
    fn list_periods(&self) -> RepoResult<Vec<AcademicPeriod>>;
    fn list_active_periods(&self) -> RepoResult<Vec<AcademicPeriod>>;
    fn update_period(&self, period: &AcademicPeriod) -> RepoResult<()>;
    fn delete_period(&self, id: PeriodId) -> RepoResult<()>;
}

/// SQLite-backed period repository.
pub struct SqlitePeriodRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePeriodRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn query_periods(&self, filter: &str) -> RepoResult<Vec<AcademicPeriod>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PERIOD_COLUMNS}
             FROM academic_periods pe
             {filter}
             ORDER BY pe.starts_at DESC, pe.id ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut periods = Vec::new();
        while let Some(row) = rows.next()? {
            periods.push(parse_period_row(row)?);
        }
        Ok(periods)
    }
}

impl PeriodRepository for SqlitePeriodRepository<'_> {
    fn create_period(&self, period: &AcademicPeriod) -> RepoResult<PeriodId> {
        period.validate()?;
        self.conn.execute(
            "INSERT INTO academic_periods (
                id,
                name,
                starts_at,
                ends_at,
                is_active
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                period.id.to_string(),
                period.name.as_str(),
                period.starts_at,
                period.ends_at,
                bool_to_int(period.is_active),
            ],
        )?;
        Ok(period.id)
    }

    fn get_period(&self, id: PeriodId) -> RepoResult<Option<AcademicPeriod>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PERIOD_COLUMNS} FROM academic_periods pe WHERE pe.id = ?1;"
        ))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_period_row(row)?));
        }
        Ok(None)
    }

    fn list_periods(&self) -> RepoResult<Vec<AcademicPeriod>> {
        self.query_periods("")
    }

    fn list_active_periods(&self) -> RepoResult<Vec<AcademicPeriod>> {
        self.query_periods("WHERE pe.is_active = 1")
    }

    fn update_period(&self, period: &AcademicPeriod) -> RepoResult<()> {
        period.validate()?;
        let changed = self.conn.execute(
            "UPDATE academic_periods
             SET name = ?2,
                 starts_at = ?3,
                 ends_at = ?4,
                 is_active = ?5
             WHERE id = ?1;",
            params![
                period.id.to_string(),
                period.name.as_str(),
                period.starts_at,
                period.ends_at,
                bool_to_int(period.is_active),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found("academic period", period.id));
        }
        Ok(())
    }

    fn delete_period(&self, id: PeriodId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM academic_periods WHERE id = ?1;",
            [id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found("academic period", id));
        }
        Ok(())
    }
}
