//! Teacher repository contracts and SQLite implementation.
//!
//! # Invariants
//! - A teacher/subject pair is assigned at most once.
//! - Filtered listings are ordered by `last_name ASC, first_name ASC, id ASC`.

use super::row_mapping::{
    bool_to_int, parse_subject_row, parse_teacher_row, SUBJECT_COLUMNS, TEACHER_COLUMNS,
};
use super::{RepoError, RepoResult};
use crate::model::subject::{Subject, SubjectId};
use crate::model::teacher::{EmploymentType, Teacher, TeacherId, TeacherWithLoad};
use rusqlite::{params, Connection, OptionalExtension, Row};

/// Repository interface for teacher CRUD, assignments and filters.
pub trait TeacherRepository {
    fn create_teacher(&self, teacher: &Teacher) -> RepoResult<TeacherId>;
    fn get_teacher(&self, id: TeacherId) -> RepoResult<Option<Teacher>>;
    fn list_teachers(&self) -> RepoResult<Vec<TeacherWithLoad>>;
    fn update_teacher(&self, teacher: &Teacher) -> RepoResult<()>;
    fn delete_teacher(&self, id: TeacherId) -> RepoResult<()>;
    /// Records that `teacher_id` teaches `subject_id`.
    fn assign_subject(&self, teacher_id: TeacherId, subject_id: SubjectId) -> RepoResult<()>;
    fn list_assigned_subjects(&self, teacher_id: TeacherId) -> RepoResult<Vec<Subject>>;
    /// Teachers with strictly more than `min_subjects` assignments.
    fn list_with_more_subjects_than(&self, min_subjects: u32) -> RepoResult<Vec<TeacherWithLoad>>;
    /// Teachers of `employment_type` that teach at least one subject or are active.
    fn list_by_employment_teaching_or_active(
        &self,
        employment_type: EmploymentType,
    ) -> RepoResult<Vec<TeacherWithLoad>>;
    fn subject_exists(&self, id: SubjectId) -> RepoResult<bool>;
}

/// SQLite-backed teacher repository.
pub struct SqliteTeacherRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTeacherRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn query_loads(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> RepoResult<Vec<TeacherWithLoad>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_teacher_load_row(row)?);
        }
        Ok(items)
    }
}

fn load_select_sql(filter: &str, having: &str) -> String {
    format!(
        "SELECT {TEACHER_COLUMNS}, COUNT(sa.subject_id) AS total_subjects
         FROM teachers te
         LEFT JOIN subject_teachers sa ON sa.teacher_id = te.id
         {filter}
         GROUP BY te.id
         {having}
         ORDER BY te.last_name ASC, te.first_name ASC, te.id ASC;"
    )
}

impl TeacherRepository for SqliteTeacherRepository<'_> {
    fn create_teacher(&self, teacher: &Teacher) -> RepoResult<TeacherId> {
        self.conn.execute(
            "INSERT INTO teachers (
                id,
                first_name,
                last_name,
                email,
                employment_type,
                is_active
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                teacher.id.to_string(),
                teacher.first_name.as_str(),
                teacher.last_name.as_str(),
                teacher.email.as_str(),
                teacher.employment_type.as_db(),
                bool_to_int(teacher.is_active),
            ],
        )?;
        Ok(teacher.id)
    }

    fn get_teacher(&self, id: TeacherId) -> RepoResult<Option<Teacher>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {TEACHER_COLUMNS} FROM teachers te WHERE te.id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_teacher_row(row)?));
        }
        Ok(None)
    }

    fn list_teachers(&self) -> RepoResult<Vec<TeacherWithLoad>> {
        self.query_loads(&load_select_sql("", ""), [])
    }

    fn update_teacher(&self, teacher: &Teacher) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE teachers
             SET
                first_name = ?2,
                last_name = ?3,
                email = ?4,
                employment_type = ?5,
                is_active = ?6,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![
                teacher.id.to_string(),
                teacher.first_name.as_str(),
                teacher.last_name.as_str(),
                teacher.email.as_str(),
                teacher.employment_type.as_db(),
                bool_to_int(teacher.is_active),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found("teacher", teacher.id));
        }
        Ok(())
    }

    fn delete_teacher(&self, id: TeacherId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM teachers WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::not_found("teacher", id));
        }
        Ok(())
    }

    fn assign_subject(&self, teacher_id: TeacherId, subject_id: SubjectId) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO subject_teachers (teacher_id, subject_id) VALUES (?1, ?2);",
            params![teacher_id.to_string(), subject_id.to_string()],
        )?;
        Ok(())
    }

    fn list_assigned_subjects(&self, teacher_id: TeacherId) -> RepoResult<Vec<Subject>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {SUBJECT_COLUMNS}
             FROM subject_teachers sa
             INNER JOIN subjects sb ON sb.id = sa.subject_id
             WHERE sa.teacher_id = ?1
             ORDER BY sb.name ASC, sb.id ASC;"
        ))?;
        let mut rows = stmt.query([teacher_id.to_string()])?;
        let mut subjects = Vec::new();
        while let Some(row) = rows.next()? {
            subjects.push(parse_subject_row(row)?);
        }
        Ok(subjects)
    }

    fn list_with_more_subjects_than(&self, min_subjects: u32) -> RepoResult<Vec<TeacherWithLoad>> {
        self.query_loads(
            &load_select_sql("", "HAVING COUNT(sa.subject_id) > ?1"),
            [i64::from(min_subjects)],
        )
    }

    fn list_by_employment_teaching_or_active(
        &self,
        employment_type: EmploymentType,
    ) -> RepoResult<Vec<TeacherWithLoad>> {
        // `NOT (is_active = 0)` reduces to `is_active = 1`.
        self.query_loads(
            &load_select_sql(
                "WHERE te.employment_type = ?1",
                "HAVING COUNT(sa.subject_id) > 0 OR te.is_active = 1",
            ),
            [employment_type.as_db()],
        )
    }

    fn subject_exists(&self, id: SubjectId) -> RepoResult<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM subjects WHERE id = ?1;",
                [id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }
}

fn parse_teacher_load_row(row: &Row<'_>) -> RepoResult<TeacherWithLoad> {
    let total: i64 = row.get("total_subjects")?;
    let total_subjects = u32::try_from(total)
        .map_err(|_| RepoError::InvalidData(format!("subject count `{total}` out of range")))?;
    Ok(TeacherWithLoad {
        teacher: parse_teacher_row(row)?,
        total_subjects,
    })
}
