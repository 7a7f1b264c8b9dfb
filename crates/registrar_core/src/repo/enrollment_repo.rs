//! Enrollment store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide the point lookups, conditional seat updates, insert and delete
//!   primitives the admission engine composes.
//! - Group those primitives into all-or-nothing units of work.
//!
//! # Invariants
//! - `reserve_seat` is one conditional statement; it never reads the quota
//!   first and writes it afterwards.
//! - Units of work run under `BEGIN IMMEDIATE`, so writers against the same
//!   database are serialized and a failed unit leaves no partial effect.
//! - Read queries only observe committed state.

use super::row_mapping::{
    parse_enrollment_detail_row, parse_enrollment_row, parse_period_row, parse_student_row,
    parse_subject_row, CAREER_COLUMNS, CYCLE_COLUMNS, ENROLLMENT_COLUMNS, PERIOD_COLUMNS,
    STUDENT_COLUMNS, SUBJECT_COLUMNS,
};
use super::{RepoError, RepoResult};
use crate::model::enrollment::{
    Enrollment, EnrollmentDetail, EnrollmentId, EnrollmentKey, EnrollmentReportRow, NewEnrollment,
};
use crate::model::period::{AcademicPeriod, PeriodId};
use crate::model::student::{Student, StudentId};
use crate::model::subject::{Subject, SubjectId};
use log::{debug, warn};
use once_cell::sync::Lazy;
use rusqlite::{params, Connection, Transaction, TransactionBehavior};

static ENROLLMENT_DETAIL_SQL: Lazy<String> = Lazy::new(|| {
    format!(
        "SELECT {ENROLLMENT_COLUMNS},
            {STUDENT_COLUMNS},
            {SUBJECT_COLUMNS},
            {CAREER_COLUMNS},
            {CYCLE_COLUMNS},
            {PERIOD_COLUMNS}
         FROM enrollments en
         INNER JOIN students st ON st.id = en.student_id
         INNER JOIN subjects sb ON sb.id = en.subject_id
         INNER JOIN careers ca ON ca.id = sb.career_id
         INNER JOIN cycles cy ON cy.id = sb.cycle_id
         INNER JOIN academic_periods pe ON pe.id = en.academic_period_id"
    )
});

const ENROLLMENT_RETURNING: &str = "RETURNING
    id AS en_id,
    student_id AS en_student_id,
    subject_id AS en_subject_id,
    academic_period_id AS en_academic_period_id,
    enrolled_at AS en_enrolled_at";

/// Store operations consumed by the admission engine.
///
/// Implementations must make every method safe to call from inside a unit of
/// work started by [`AtomicEnrollmentStore::run_atomic`].
pub trait EnrollmentStore {
    fn get_student(&self, id: StudentId) -> RepoResult<Option<Student>>;
    fn get_subject(&self, id: SubjectId) -> RepoResult<Option<Subject>>;
    fn get_period(&self, id: PeriodId) -> RepoResult<Option<AcademicPeriod>>;
    /// Looks up an enrollment by its unique triple.
    fn find_enrollment(&self, key: &EnrollmentKey) -> RepoResult<Option<Enrollment>>;
    fn get_enrollment(&self, id: EnrollmentId) -> RepoResult<Option<Enrollment>>;
    /// Decrements `available_quota` by one only if it is positive.
    ///
    /// Returns the number of rows changed: `1` when a seat was taken, `0`
    /// when none was left (or the subject does not exist).
    fn reserve_seat(&self, subject_id: SubjectId) -> RepoResult<usize>;
    /// Increments `available_quota` by one only if it is below capacity.
    fn release_seat(&self, subject_id: SubjectId) -> RepoResult<usize>;
    /// Inserts one enrollment.
    ///
    /// # Errors
    /// - `RepoError::UniqueViolation` when the triple already exists.
    fn insert_enrollment(&self, new: &NewEnrollment) -> RepoResult<Enrollment>;
    /// Deletes one enrollment, returning the removed row.
    fn delete_enrollment(&self, id: EnrollmentId) -> RepoResult<Option<Enrollment>>;
    fn load_enrollment_detail(&self, id: EnrollmentId) -> RepoResult<Option<EnrollmentDetail>>;
    /// All enrollments ordered by `enrolled_at DESC`.
    fn list_enrollment_details(&self) -> RepoResult<Vec<EnrollmentDetail>>;
    /// One student's enrollments in one period, ordered by `enrolled_at DESC`.
    fn list_student_period_enrollments(
        &self,
        student_id: StudentId,
        period_id: PeriodId,
    ) -> RepoResult<Vec<EnrollmentDetail>>;
    /// Per-student enrollment counts, students with zero enrollments excluded.
    fn enrollment_report(&self) -> RepoResult<Vec<EnrollmentReportRow>>;
}

/// Store that can group [`EnrollmentStore`] calls into one transaction.
pub trait AtomicEnrollmentStore: EnrollmentStore {
    /// Runs `work` against a transaction-scoped view of the store.
    ///
    /// Commits when `work` returns `Ok`; rolls back every effect when it
    /// returns `Err`, when commit fails, or when it unwinds.
    fn run_atomic<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&dyn EnrollmentStore) -> Result<T, E>,
        E: From<RepoError>;
}

/// SQLite-backed enrollment store.
pub struct SqliteEnrollmentStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEnrollmentStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn query_details(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> RepoResult<Vec<EnrollmentDetail>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_enrollment_detail_row(row)?);
        }
        Ok(items)
    }
}

impl EnrollmentStore for SqliteEnrollmentStore<'_> {
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

    fn find_enrollment(&self, key: &EnrollmentKey) -> RepoResult<Option<Enrollment>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ENROLLMENT_COLUMNS}
             FROM enrollments en
             WHERE en.student_id = ?1
               AND en.subject_id = ?2
               AND en.academic_period_id = ?3;"
        ))?;
        let mut rows = stmt.query(params![
            key.student_id.to_string(),
            key.subject_id.to_string(),
            key.academic_period_id.to_string(),
        ])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_enrollment_row(row)?));
        }
        Ok(None)
    }

    fn get_enrollment(&self, id: EnrollmentId) -> RepoResult<Option<Enrollment>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM enrollments en WHERE en.id = ?1;"
        ))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_enrollment_row(row)?));
        }
        Ok(None)
    }

    fn reserve_seat(&self, subject_id: SubjectId) -> RepoResult<usize> {
        let changed = self.conn.execute(
            "UPDATE subjects
             SET available_quota = available_quota - 1,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1
               AND available_quota > 0;",
            [subject_id.to_string()],
        )?;
        Ok(changed)
    }

    fn release_seat(&self, subject_id: SubjectId) -> RepoResult<usize> {
        let changed = self.conn.execute(
            "UPDATE subjects
             SET available_quota = available_quota + 1,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1
               AND available_quota < total_quota;",
            [subject_id.to_string()],
        )?;
        Ok(changed)
    }

    fn insert_enrollment(&self, new: &NewEnrollment) -> RepoResult<Enrollment> {
        let mut stmt = self.conn.prepare(&format!(
            "INSERT INTO enrollments (
                id,
                student_id,
                subject_id,
                academic_period_id,
                enrolled_at
            ) VALUES (?1, ?2, ?3, ?4, COALESCE(?5, strftime('%s', 'now') * 1000))
            {ENROLLMENT_RETURNING};"
        ))?;
        let mut rows = stmt.query(params![
            new.id.to_string(),
            new.key.student_id.to_string(),
            new.key.subject_id.to_string(),
            new.key.academic_period_id.to_string(),
            new.enrolled_at,
        ])?;
        match rows.next()? {
            Some(row) => parse_enrollment_row(row),
            None => Err(RepoError::InvalidData(format!(
                "insert of enrollment {} returned no row",
                new.id
            ))),
        }
    }

    fn delete_enrollment(&self, id: EnrollmentId) -> RepoResult<Option<Enrollment>> {
        let mut stmt = self.conn.prepare(&format!(
            "DELETE FROM enrollments WHERE id = ?1 {ENROLLMENT_RETURNING};"
        ))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_enrollment_row(row)?));
        }
        Ok(None)
    }

    fn load_enrollment_detail(&self, id: EnrollmentId) -> RepoResult<Option<EnrollmentDetail>> {
        let sql = format!("{} WHERE en.id = ?1;", ENROLLMENT_DETAIL_SQL.as_str());
        Ok(self.query_details(&sql, [id.to_string()])?.into_iter().next())
    }

    fn list_enrollment_details(&self) -> RepoResult<Vec<EnrollmentDetail>> {
        let sql = format!(
            "{} ORDER BY en.enrolled_at DESC, en.id ASC;",
            ENROLLMENT_DETAIL_SQL.as_str()
        );
        self.query_details(&sql, [])
    }

    fn list_student_period_enrollments(
        &self,
        student_id: StudentId,
        period_id: PeriodId,
    ) -> RepoResult<Vec<EnrollmentDetail>> {
        let sql = format!(
            "{}
             WHERE en.student_id = ?1
               AND en.academic_period_id = ?2
             ORDER BY en.enrolled_at DESC, en.id ASC;",
            ENROLLMENT_DETAIL_SQL.as_str()
        );
        self.query_details(&sql, params![student_id.to_string(), period_id.to_string()])
    }

    fn enrollment_report(&self) -> RepoResult<Vec<EnrollmentReportRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                st.first_name || ' ' || st.last_name AS student_name,
                ca.name AS career_name,
                COUNT(en.id) AS total_subjects
             FROM students st
             INNER JOIN careers ca ON ca.id = st.career_id
             LEFT JOIN enrollments en ON en.student_id = st.id
             GROUP BY st.id, st.first_name, st.last_name, ca.name
             HAVING COUNT(en.id) > 0
             ORDER BY total_subjects DESC, student_name ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut report = Vec::new();
        while let Some(row) = rows.next()? {
            let total: i64 = row.get("total_subjects")?;
            let total_subjects = u32::try_from(total).map_err(|_| {
                RepoError::InvalidData(format!("enrollment count `{total}` out of range"))
            })?;
            report.push(EnrollmentReportRow {
                student_name: row.get("student_name")?,
                career_name: row.get("career_name")?,
                total_subjects,
            });
        }
        Ok(report)
    }
}

impl AtomicEnrollmentStore for SqliteEnrollmentStore<'_> {
    fn run_atomic<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&dyn EnrollmentStore) -> Result<T, E>,
        E: From<RepoError>,
    {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)
            .map_err(RepoError::from)?;
        let scope = SqliteEnrollmentStore::new(&tx);
        match work(&scope) {
            Ok(value) => {
                tx.commit().map_err(RepoError::from)?;
                Ok(value)
            }
            Err(err) => {
                match tx.rollback() {
                    Ok(()) => debug!("event=atomic_rollback module=enrollment_repo status=ok"),
                    Err(rollback_err) => warn!(
                        "event=atomic_rollback module=enrollment_repo status=error error={rollback_err}"
                    ),
                }
                Err(err)
            }
        }
    }
}
