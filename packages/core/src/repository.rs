//! Database repository for users, pending signups and medicines.
//!
//! All SQLite read/write logic lives here. [`Repository`] implements both
//! [`MedicineStore`] and [`AccountStore`], so the services only ever see the
//! traits.
//!
//! Timestamps are stored as RFC 3339 strings. A medicine's completion record
//! is stored as a JSON array of booleans and always rewritten whole, so
//! concurrent updates to one medicine are last-writer-wins.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::accounts::{AccountStore, NewPendingUser, NewUser, PendingUser, User};
use crate::medicine::store::StoreResult;
use crate::medicine::{Medicine, MedicineStore, NewMedicine, StoreError};

const MEDICINE_COLUMNS: &str = "id, user_id, name, dosage_type, dosage_amount, duration_weeks, \
     scheduled_time, start_date, completion_record";

/// Repository for reading and writing application data to SQLite.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn medicine_ids_for_user(&self, user_id: i64) -> StoreResult<Vec<i64>> {
        let rows = sqlx::query(
            "SELECT medicine_id FROM user_medicines WHERE user_id = ? ORDER BY id ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| row.try_get::<i64, _>("medicine_id").map_err(StoreError::from))
            .collect()
    }

    async fn user_from_row(&self, row: &SqliteRow) -> StoreResult<User> {
        let id: i64 = row.try_get("id")?;
        let global_pin: i64 = row.try_get("global_pin")?;
        let verified: i64 = row.try_get("verified")?;

        Ok(User {
            id,
            fullname: row.try_get("fullname")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            global_pin: global_pin as u32,
            verified: verified != 0,
            medicines: self.medicine_ids_for_user(id).await?,
        })
    }
}

fn parse_timestamp(raw: &str) -> StoreResult<DateTime<chrono::FixedOffset>> {
    DateTime::parse_from_rfc3339(raw)
        .map_err(|err| StoreError::Corrupt(format!("bad timestamp '{}': {}", raw, err)))
}

fn medicine_from_row(row: &SqliteRow) -> StoreResult<Medicine> {
    let start_date: String = row.try_get("start_date")?;
    let completion_record: String = row.try_get("completion_record")?;

    Ok(Medicine {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        name: row.try_get("name")?,
        dosage_type: row.try_get("dosage_type")?,
        dosage_amount: row.try_get("dosage_amount")?,
        duration_weeks: row.try_get("duration_weeks")?,
        scheduled_time: row.try_get("scheduled_time")?,
        start_date: parse_timestamp(&start_date)?,
        completion_record: serde_json::from_str(&completion_record)
            .map_err(|err| StoreError::Corrupt(format!("bad completion record: {}", err)))?,
    })
}

fn pending_from_row(row: &SqliteRow) -> StoreResult<PendingUser> {
    let otp: i64 = row.try_get("otp")?;
    let created_at: String = row.try_get("created_at")?;

    Ok(PendingUser {
        id: row.try_get("id")?,
        fullname: row.try_get("fullname")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        otp: otp as u32,
        created_at: parse_timestamp(&created_at)?.with_timezone(&Utc),
    })
}

fn encode_record(record: &[bool]) -> StoreResult<String> {
    serde_json::to_string(record)
        .map_err(|err| StoreError::Corrupt(format!("cannot encode completion record: {}", err)))
}

#[async_trait]
impl MedicineStore for Repository {
    async fn insert_medicine(&self, medicine: &NewMedicine) -> StoreResult<Medicine> {
        let result = sqlx::query(
            "INSERT INTO medicines
             (user_id, name, dosage_type, dosage_amount, duration_weeks, scheduled_time, start_date, completion_record)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(medicine.user_id)
        .bind(&medicine.name)
        .bind(&medicine.dosage_type)
        .bind(&medicine.dosage_amount)
        .bind(medicine.duration_weeks)
        .bind(&medicine.scheduled_time)
        .bind(medicine.start_date.to_rfc3339())
        .bind(encode_record(&medicine.completion_record)?)
        .execute(&self.pool)
        .await?;

        Ok(medicine.clone().into_medicine(result.last_insert_rowid()))
    }

    async fn find_medicine(&self, user_id: i64, medicine_id: i64) -> StoreResult<Option<Medicine>> {
        let sql = format!(
            "SELECT {} FROM medicines WHERE id = ? AND user_id = ?",
            MEDICINE_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(medicine_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(medicine_from_row).transpose()
    }

    async fn find_medicine_by_id(&self, medicine_id: i64) -> StoreResult<Option<Medicine>> {
        let sql = format!("SELECT {} FROM medicines WHERE id = ?", MEDICINE_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(medicine_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(medicine_from_row).transpose()
    }

    async fn update_completion_record(
        &self,
        medicine_id: i64,
        completion_record: &[bool],
    ) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE medicines SET completion_record = ? WHERE id = ?")
            .bind(encode_record(completion_record)?)
            .bind(medicine_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_medicines_for_user(&self, user_id: i64) -> StoreResult<Vec<Medicine>> {
        let sql = format!(
            "SELECT {} FROM medicines WHERE user_id = ? ORDER BY id ASC",
            MEDICINE_COLUMNS
        );
        let rows = sqlx::query(&sql).bind(user_id).fetch_all(&self.pool).await?;

        rows.iter().map(medicine_from_row).collect()
    }

    async fn list_user_ids_by_medicine_name(&self, name: &str) -> StoreResult<Vec<i64>> {
        let rows = sqlx::query("SELECT user_id FROM medicines WHERE name = ? ORDER BY id ASC")
            .bind(name)
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| row.try_get::<i64, _>("user_id").map_err(StoreError::from))
            .collect()
    }
}

#[async_trait]
impl AccountStore for Repository {
    async fn insert_user(&self, user: &NewUser) -> StoreResult<User> {
        let result = sqlx::query(
            "INSERT INTO users (fullname, email, password_hash, global_pin, verified)
             VALUES (?, ?, ?, ?, 1)",
        )
        .bind(&user.fullname)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.global_pin as i64)
        .execute(&self.pool)
        .await?;

        Ok(User {
            id: result.last_insert_rowid(),
            fullname: user.fullname.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            global_pin: user.global_pin,
            verified: true,
            medicines: Vec::new(),
        })
    }

    async fn find_user_by_id(&self, user_id: i64) -> StoreResult<Option<User>> {
        let row = sqlx::query(
            "SELECT id, fullname, email, password_hash, global_pin, verified FROM users WHERE id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.user_from_row(&row).await?)),
            None => Ok(None),
        }
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query(
            "SELECT id, fullname, email, password_hash, global_pin, verified FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.user_from_row(&row).await?)),
            None => Ok(None),
        }
    }

    async fn push_user_medicine(&self, user_id: i64, medicine_id: i64) -> StoreResult<bool> {
        let result = sqlx::query(
            "INSERT INTO user_medicines (user_id, medicine_id)
             SELECT u.id, m.id FROM users u, medicines m WHERE u.id = ? AND m.id = ?",
        )
        .bind(user_id)
        .bind(medicine_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn upsert_pending_user(&self, pending: &NewPendingUser) -> StoreResult<PendingUser> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM pending_users WHERE email = ?")
            .bind(&pending.email)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query(
            "INSERT INTO pending_users (fullname, email, password_hash, otp, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&pending.fullname)
        .bind(&pending.email)
        .bind(&pending.password_hash)
        .bind(pending.otp as i64)
        .bind(pending.created_at.to_rfc3339())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(PendingUser {
            id: result.last_insert_rowid(),
            fullname: pending.fullname.clone(),
            email: pending.email.clone(),
            password_hash: pending.password_hash.clone(),
            otp: pending.otp,
            created_at: pending.created_at,
        })
    }

    async fn find_pending_user(&self, pending_id: i64) -> StoreResult<Option<PendingUser>> {
        let row = sqlx::query(
            "SELECT id, fullname, email, password_hash, otp, created_at FROM pending_users WHERE id = ?",
        )
        .bind(pending_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(pending_from_row).transpose()
    }

    async fn delete_pending_user(&self, pending_id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM pending_users WHERE id = ?")
            .bind(pending_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Compares parsed instants rather than strings. Unparseable rows are
    /// treated as expired.
    async fn prune_pending_users(&self, cutoff: DateTime<Utc>) -> StoreResult<u64> {
        let rows = sqlx::query("SELECT id, created_at FROM pending_users")
            .fetch_all(&self.pool)
            .await?;

        let mut deleted = 0;
        for row in rows {
            let id: i64 = row.try_get("id")?;
            let created_at: String = row.try_get("created_at")?;
            let expired = parse_timestamp(&created_at)
                .map(|ts| ts.with_timezone(&Utc) < cutoff)
                .unwrap_or(true);

            if expired && self.delete_pending_user(id).await? {
                deleted += 1;
            }
        }

        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset, TimeZone};

    use crate::db::create_pool;

    async fn make_repo() -> Repository {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        Repository::new(pool)
    }

    fn make_medicine(user_id: i64, name: &str) -> NewMedicine {
        NewMedicine {
            user_id,
            name: name.to_string(),
            dosage_type: "tablet".to_string(),
            dosage_amount: "1".to_string(),
            duration_weeks: 1,
            scheduled_time: "08:30".to_string(),
            start_date: FixedOffset::east_opt(5 * 3600 + 1800)
                .unwrap()
                .with_ymd_and_hms(2024, 3, 10, 7, 0, 0)
                .unwrap(),
            completion_record: vec![false; 7],
        }
    }

    #[tokio::test]
    async fn insert_and_find_medicine_roundtrip() {
        let repo = make_repo().await;
        let inserted = repo.insert_medicine(&make_medicine(1, "Metformin")).await.unwrap();

        let found = repo.find_medicine(1, inserted.id).await.unwrap().unwrap();
        assert_eq!(found, inserted);
        assert_eq!(found.start_date.offset().local_minus_utc(), 5 * 3600 + 1800);
    }

    #[tokio::test]
    async fn find_medicine_checks_owner() {
        let repo = make_repo().await;
        let inserted = repo.insert_medicine(&make_medicine(1, "Metformin")).await.unwrap();

        assert!(repo.find_medicine(2, inserted.id).await.unwrap().is_none());
        assert!(repo.find_medicine_by_id(inserted.id).await.unwrap().is_some());
        assert!(repo.find_medicine_by_id(inserted.id + 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_completion_record_rewrites_whole_record() {
        let repo = make_repo().await;
        let inserted = repo.insert_medicine(&make_medicine(1, "Metformin")).await.unwrap();
        let record = vec![true, false, false, true, false, false, false];

        assert!(repo.update_completion_record(inserted.id, &record).await.unwrap());

        let found = repo.find_medicine_by_id(inserted.id).await.unwrap().unwrap();
        assert_eq!(found.completion_record, record);
    }

    #[tokio::test]
    async fn update_completion_record_returns_false_for_missing_id() {
        let repo = make_repo().await;
        assert!(!repo.update_completion_record(9999, &[true]).await.unwrap());
    }

    #[tokio::test]
    async fn list_queries_filter_and_order() {
        let repo = make_repo().await;
        repo.insert_medicine(&make_medicine(1, "Metformin")).await.unwrap();
        repo.insert_medicine(&make_medicine(2, "Metformin")).await.unwrap();
        repo.insert_medicine(&make_medicine(1, "Aspirin")).await.unwrap();

        let for_user = repo.list_medicines_for_user(1).await.unwrap();
        let names: Vec<&str> = for_user.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Metformin", "Aspirin"]);

        assert_eq!(repo.list_user_ids_by_medicine_name("Metformin").await.unwrap(), vec![1, 2]);
        assert!(repo.list_user_ids_by_medicine_name("Insulin").await.unwrap().is_empty());
        assert!(repo.list_medicines_for_user(3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn corrupt_completion_record_is_reported() {
        let repo = make_repo().await;
        let inserted = repo.insert_medicine(&make_medicine(1, "Metformin")).await.unwrap();
        sqlx::query("UPDATE medicines SET completion_record = 'oops' WHERE id = ?")
            .bind(inserted.id)
            .execute(repo.pool())
            .await
            .unwrap();

        let err = repo.find_medicine_by_id(inserted.id).await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(_)));
    }

    fn make_user(email: &str) -> NewUser {
        NewUser {
            fullname: "Ada Lovelace".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            global_pin: 4321,
        }
    }

    #[tokio::test]
    async fn insert_and_find_user() {
        let repo = make_repo().await;
        let user = repo.insert_user(&make_user("ada@example.com")).await.unwrap();

        let by_email = repo.find_user_by_email("ada@example.com").await.unwrap().unwrap();
        let by_id = repo.find_user_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(by_email, user);
        assert_eq!(by_id, user);
        assert!(repo.find_user_by_email("bob@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_user_email_is_rejected() {
        let repo = make_repo().await;
        repo.insert_user(&make_user("ada@example.com")).await.unwrap();
        assert!(repo.insert_user(&make_user("ada@example.com")).await.is_err());
    }

    #[tokio::test]
    async fn push_user_medicine_requires_user_and_medicine() {
        let repo = make_repo().await;
        let user = repo.insert_user(&make_user("ada@example.com")).await.unwrap();
        let first = repo.insert_medicine(&make_medicine(user.id, "Metformin")).await.unwrap();
        let second = repo.insert_medicine(&make_medicine(user.id, "Aspirin")).await.unwrap();

        assert!(repo.push_user_medicine(user.id, second.id).await.unwrap());
        assert!(repo.push_user_medicine(user.id, first.id).await.unwrap());
        assert!(!repo.push_user_medicine(user.id + 1, first.id).await.unwrap());
        assert!(!repo.push_user_medicine(user.id, second.id + 100).await.unwrap());

        let found = repo.find_user_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(found.medicines, vec![second.id, first.id]);
    }

    #[tokio::test]
    async fn dangling_medicine_link_is_rejected_by_schema() {
        let repo = make_repo().await;
        let user = repo.insert_user(&make_user("ada@example.com")).await.unwrap();

        let result = sqlx::query("INSERT INTO user_medicines (user_id, medicine_id) VALUES (?, ?)")
            .bind(user.id)
            .bind(9_999_i64)
            .execute(repo.pool())
            .await;

        assert!(result.is_err());
    }

    fn make_pending(email: &str, otp: u32, minutes_ago: i64) -> NewPendingUser {
        NewPendingUser {
            fullname: "Ada".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            otp,
            created_at: Utc::now() - Duration::minutes(minutes_ago),
        }
    }

    #[tokio::test]
    async fn upsert_pending_replaces_by_email() {
        let repo = make_repo().await;
        let first = repo.upsert_pending_user(&make_pending("a@x.io", 111_111, 0)).await.unwrap();
        let second = repo.upsert_pending_user(&make_pending("a@x.io", 222_222, 0)).await.unwrap();

        assert!(repo.find_pending_user(first.id).await.unwrap().is_none());
        let found = repo.find_pending_user(second.id).await.unwrap().unwrap();
        assert_eq!(found.otp, 222_222);
    }

    #[tokio::test]
    async fn delete_pending_user_reports_missing() {
        let repo = make_repo().await;
        let pending = repo.upsert_pending_user(&make_pending("a@x.io", 111_111, 0)).await.unwrap();

        assert!(repo.delete_pending_user(pending.id).await.unwrap());
        assert!(!repo.delete_pending_user(pending.id).await.unwrap());
    }

    #[tokio::test]
    async fn prune_pending_users_removes_old_rows() {
        let repo = make_repo().await;
        repo.upsert_pending_user(&make_pending("old@x.io", 1, 30)).await.unwrap();
        let fresh = repo.upsert_pending_user(&make_pending("new@x.io", 2, 1)).await.unwrap();

        let deleted = repo.prune_pending_users(Utc::now() - Duration::minutes(5)).await.unwrap();

        assert_eq!(deleted, 1);
        assert!(repo.find_pending_user(fresh.id).await.unwrap().is_some());
    }
}
