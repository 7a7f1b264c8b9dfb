//! Student repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Listings are deterministic: `last_name ASC, first_name ASC, id ASC`.
//! - Deleting a student with live enrollments is restricted by the schema.

use super::row_mapping::{
    bool_to_int, parse_career_row, parse_student_row, CAREER_COLUMNS, STUDENT_COLUMNS,
};
use super::{RepoError, RepoResult};
use crate::model::catalog::{Career, CareerId};
use crate::model::period::PeriodId;
use crate::model::student::{Student, StudentId, StudentWithCareer};
use rusqlite::{params, Connection, Row};

/// Repository interface for student CRUD and filtered listings.
pub trait StudentRepository {
    fn create_student(&self, student: &Student) -> RepoResult<StudentId>;
    fn get_student(&self, id: StudentId) -> RepoResult<Option<Student>>;
    fn get_student_with_career(&self, id: StudentId) -> RepoResult<Option<StudentWithCareer>>;
    fn list_students(&self) -> RepoResult<Vec<Student>>;
    fn update_student(&self, student: &Student) -> RepoResult<()>;
    fn delete_student(&self, id: StudentId) -> RepoResult<()>;
    /// Active students with their career.
    fn list_active_with_career(&self) -> RepoResult<Vec<StudentWithCareer>>;
    /// Active students of one career holding an enrollment in one period.
    fn list_active_by_career_and_period(
        &self,
        career_id: CareerId,
        period_id: PeriodId,
    ) -> RepoResult<Vec<StudentWithCareer>>;
    /// Loads a career for reference validation.
    fn get_career(&self, id: CareerId) -> RepoResult<Option<Career>>;
}

/// SQLite-backed student repository.
pub struct SqliteStudentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStudentRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn query_with_career(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> RepoResult<Vec<StudentWithCareer>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_student_with_career(row)?);
        }
        Ok(items)
    }
}

impl StudentRepository for SqliteStudentRepository<'_> {
    fn create_student(&self, student: &Student) -> RepoResult<StudentId> {
        self.conn.execute(
            "INSERT INTO students (
                id,
                first_name,
                last_name,
                email,
                phone,
                is_active,
                career_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                student.id.to_string(),
                student.first_name.as_str(),
                student.last_name.as_str(),
                student.email.as_str(),
                student.phone.as_deref(),
                bool_to_int(student.is_active),
                student.career_id.to_string(),
            ],
        )?;
        Ok(student.id)
    }

    fn get_student(&self, id: StudentId) -> RepoResult<Option<Student>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {STUDENT_COLUMNS} FROM students st WHERE st.id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_student_row(row)?));
        }
        Ok(None)
    }

    fn get_student_with_career(&self, id: StudentId) -> RepoResult<Option<StudentWithCareer>> {
        let sql = format!(
            "SELECT {STUDENT_COLUMNS}, {CAREER_COLUMNS}
             FROM students st
             INNER JOIN careers ca ON ca.id = st.career_id
             WHERE st.id = ?1;"
        );
        Ok(self
            .query_with_career(&sql, [id.to_string()])?
            .into_iter()
            .next())
    }

    fn list_students(&self) -> RepoResult<Vec<Student>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {STUDENT_COLUMNS}
             FROM students st
             ORDER BY st.last_name ASC, st.first_name ASC, st.id ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut students = Vec::new();
        while let Some(row) = rows.next()? {
            students.push(parse_student_row(row)?);
        }
        Ok(students)
    }

    fn update_student(&self, student: &Student) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE students
             SET
                first_name = ?2,
                last_name = ?3,
                email = ?4,
                phone = ?5,
                is_active = ?6,
                career_id = ?7,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![
                student.id.to_string(),
                student.first_name.as_str(),
                student.last_name.as_str(),
                student.email.as_str(),
                student.phone.as_deref(),
                bool_to_int(student.is_active),
                student.career_id.to_string(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found("student", student.id));
        }
        Ok(())
    }

    fn delete_student(&self, id: StudentId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM students WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::not_found("student", id));
        }
        Ok(())
    }

    fn list_active_with_career(&self) -> RepoResult<Vec<StudentWithCareer>> {
        let sql = format!(
            "SELECT {STUDENT_COLUMNS}, {CAREER_COLUMNS}
             FROM students st
             INNER JOIN careers ca ON ca.id = st.career_id
             WHERE st.is_active = 1
             ORDER BY st.last_name ASC, st.first_name ASC, st.id ASC;"
        );
        self.query_with_career(&sql, [])
    }

    fn list_active_by_career_and_period(
        &self,
        career_id: CareerId,
        period_id: PeriodId,
    ) -> RepoResult<Vec<StudentWithCareer>> {
        let sql = format!(
            "SELECT {STUDENT_COLUMNS}, {CAREER_COLUMNS}
             FROM students st
             INNER JOIN careers ca ON ca.id = st.career_id
             WHERE st.is_active = 1
               AND st.career_id = ?1
               AND EXISTS(
                 SELECT 1
                 FROM enrollments en
                 WHERE en.student_id = st.id
                   AND en.academic_period_id = ?2
               )
             ORDER BY st.last_name ASC, st.first_name ASC, st.id ASC;"
        );
        self.query_with_career(&sql, params![career_id.to_string(), period_id.to_string()])
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
}

fn parse_student_with_career(row: &Row<'_>) -> RepoResult<StudentWithCareer> {
    Ok(StudentWithCareer {
        student: parse_student_row(row)?,
        career: parse_career_row(row)?,
    })
}
