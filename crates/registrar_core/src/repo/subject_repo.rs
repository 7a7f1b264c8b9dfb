//! Subject repository contracts and SQLite implementation.
//!
//! # Invariants
//! - New subjects are persisted with `available_quota = total_quota`.
//! - Capacity changes shift `available_quota` by the same delta in one
//!   conditional statement; `available_quota` is never assigned directly.

use super::row_mapping::{
    parse_career_row, parse_cycle_row, parse_subject_detail_row, parse_subject_row,
    CAREER_COLUMNS, CYCLE_COLUMNS, SUBJECT_COLUMNS,
};
use super::{RepoError, RepoResult};
use crate::model::catalog::{Career, CareerId, Cycle, CycleId};
use crate::model::subject::{Subject, SubjectDetail, SubjectId};
use rusqlite::{params, Connection};

const SUBJECT_DETAIL_FROM: &str = "FROM subjects sb
     INNER JOIN careers ca ON ca.id = sb.career_id
     INNER JOIN cycles cy ON cy.id = sb.cycle_id";

/// Repository interface for subject administration.
pub trait SubjectRepository {
    fn create_subject(&self, subject: &Subject) -> RepoResult<SubjectId>;
    fn get_subject(&self, id: SubjectId) -> RepoResult<Option<Subject>>;
    fn get_subject_detail(&self, id: SubjectId) -> RepoResult<Option<SubjectDetail>>;
    fn list_subjects(&self) -> RepoResult<Vec<SubjectDetail>>;
    fn list_subjects_by_career(&self, career_id: CareerId) -> RepoResult<Vec<SubjectDetail>>;
    fn rename_subject(&self, id: SubjectId, name: &str) -> RepoResult<()>;
    /// Sets `total_quota` and shifts `available_quota` by the same delta.
    ///
    /// Returns `0` when the subject is missing or when the new capacity is
    /// below the seats already held.
    fn resize_quota(&self, id: SubjectId, new_total: i64) -> RepoResult<usize>;
    fn delete_subject(&self, id: SubjectId) -> RepoResult<()>;
    fn get_career(&self, id: CareerId) -> RepoResult<Option<Career>>;
    fn get_cycle(&self, id: CycleId) -> RepoResult<Option<Cycle>>;
}

/// SQLite-backed subject repository.
pub struct SqliteSubjectRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSubjectRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn query_details(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> RepoResult<Vec<SubjectDetail>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_subject_detail_row(row)?);
        }
        Ok(items)
    }
}

impl SubjectRepository for SqliteSubjectRepository<'_> {
    fn create_subject(&self, subject: &Subject) -> RepoResult<SubjectId> {
        subject.validate()?;
        self.conn.execute(
            "INSERT INTO subjects (
                id,
                name,
                career_id,
                cycle_id,
                total_quota,
                available_quota
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?5);",
            params![
                subject.id.to_string(),
                subject.name.as_str(),
                subject.career_id.to_string(),
                subject.cycle_id.to_string(),
                subject.total_quota,
            ],
        )?;
        Ok(subject.id)
    }

    fn get_subject(&self, id: SubjectId) -> RepoResult<Option<Subject>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {SUBJECT_COLUMNS} FROM subjects sb WHERE sb.id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_subject_row(row)?));
        }
        Ok(None)
    }

    fn get_subject_detail(&self, id: SubjectId) -> RepoResult<Option<SubjectDetail>> {
        let sql = format!(
            "SELECT {SUBJECT_COLUMNS}, {CAREER_COLUMNS}, {CYCLE_COLUMNS}
             {SUBJECT_DETAIL_FROM}
             WHERE sb.id = ?1;"
        );
        Ok(self.query_details(&sql, [id.to_string()])?.into_iter().next())
    }

    fn list_subjects(&self) -> RepoResult<Vec<SubjectDetail>> {
        let sql = format!(
            "SELECT {SUBJECT_COLUMNS}, {CAREER_COLUMNS}, {CYCLE_COLUMNS}
             {SUBJECT_DETAIL_FROM}
             ORDER BY cy.ordinal ASC, sb.name ASC, sb.id ASC;"
        );
        self.query_details(&sql, [])
    }

    fn list_subjects_by_career(&self, career_id: CareerId) -> RepoResult<Vec<SubjectDetail>> {
        let sql = format!(
            "SELECT {SUBJECT_COLUMNS}, {CAREER_COLUMNS}, {CYCLE_COLUMNS}
             {SUBJECT_DETAIL_FROM}
             WHERE sb.career_id = ?1
             ORDER BY cy.ordinal ASC, sb.name ASC, sb.id ASC;"
        );
        self.query_details(&sql, [career_id.to_string()])
    }

    fn rename_subject(&self, id: SubjectId, name: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE subjects
             SET name = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![id.to_string(), name],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found("subject", id));
        }
        Ok(())
    }

    fn resize_quota(&self, id: SubjectId, new_total: i64) -> RepoResult<usize> {
        let changed = self.conn.execute(
            "UPDATE subjects
             SET available_quota = available_quota + (?2 - total_quota),
                 total_quota = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1
               AND available_quota + (?2 - total_quota) >= 0;",
            params![id.to_string(), new_total],
        )?;
        Ok(changed)
    }

    fn delete_subject(&self, id: SubjectId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM subjects WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::not_found("subject", id));
        }
        Ok(())
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
}
