//! Career and cycle repository contracts and SQLite implementation.

use super::row_mapping::{parse_career_row, parse_cycle_row, CAREER_COLUMNS, CYCLE_COLUMNS};
use super::RepoResult;
use crate::model::catalog::{Career, CareerId, Cycle, CycleId};
use rusqlite::{params, Connection};

/// Repository interface for curriculum reference data.
pub trait CatalogRepository {
    fn create_career(&self, career: &Career) -> RepoResult<CareerId>;
    fn get_career(&self, id: CareerId) -> RepoResult<Option<Career>>;
    fn list_careers(&self) -> RepoResult<Vec<Career>>;
    fn create_cycle(&self, cycle: &Cycle) -> RepoResult<CycleId>;
    fn get_cycle(&self, id: CycleId) -> RepoResult<Option<Cycle>>;
    /// Cycles in curriculum order.
    fn list_cycles(&self) -> RepoResult<Vec<Cycle>>;
}

/// SQLite-backed catalog repository.
pub struct SqliteCatalogRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCatalogRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl CatalogRepository for SqliteCatalogRepository<'_> {
    fn create_career(&self, career: &Career) -> RepoResult<CareerId> {
        self.conn.execute(
            "INSERT INTO careers (id, name) VALUES (?1, ?2);",
            params![career.id.to_string(), career.name.as_str()],
        )?;
        Ok(career.id)
    }

    fn get_career(&self, id: CareerId) -> RepoResult<Option<Career>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {CAREER_COLUMNS} FROM careers ca WHERE ca.id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_career_row(row)?));
        }
        Ok(None)
    }

    fn list_careers(&self) -> RepoResult<Vec<Career>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CAREER_COLUMNS} FROM careers ca ORDER BY ca.name ASC, ca.id ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut careers = Vec::new();
        while let Some(row) = rows.next()? {
            careers.push(parse_career_row(row)?);
        }
        Ok(careers)
    }

    fn create_cycle(&self, cycle: &Cycle) -> RepoResult<CycleId> {
        self.conn.execute(
            "INSERT INTO cycles (id, name, ordinal) VALUES (?1, ?2, ?3);",
            params![cycle.id.to_string(), cycle.name.as_str(), cycle.ordinal],
        )?;
        Ok(cycle.id)
    }

    fn get_cycle(&self, id: CycleId) -> RepoResult<Option<Cycle>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {CYCLE_COLUMNS} FROM cycles cy WHERE cy.id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_cycle_row(row)?));
        }
        Ok(None)
    }

    fn list_cycles(&self) -> RepoResult<Vec<Cycle>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CYCLE_COLUMNS} FROM cycles cy ORDER BY cy.ordinal ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut cycles = Vec::new();
        while let Some(row) = rows.next()? {
            cycles.push(parse_cycle_row(row)?);
        }
        Ok(cycles)
    }
}
