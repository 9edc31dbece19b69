use anyhow::Context;
use axum::async_trait;
use sqlx::PgPool;

use super::repo_types::{NewUser, User, UserHistory};

const USER_COLUMNS: &str = "id, name, email, password, province, city, district, sub_district, \
     address, date_of_birth, bank_account, points, role, created_at, updated_at";

/// Persistence for users and their history log.
///
/// Every method is a single statement; callers that read and then write do
/// so without a transaction.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, user: NewUser) -> anyhow::Result<User>;
    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    /// Overwrites the profile fields of an existing row with `user`'s values.
    async fn save(&self, user: &User) -> anyhow::Result<User>;
    async fn list(&self) -> anyhow::Result<Vec<User>>;
    /// All users ordered by points, highest first. Ties have no defined order.
    async fn ranking(&self) -> anyhow::Result<Vec<User>>;
    async fn delete(&self, id: i64) -> anyhow::Result<()>;
    async fn history_for(&self, user_id: i64) -> anyhow::Result<Vec<UserHistory>>;
    async fn add_history(&self, user_id: i64, address: &str, day: &str) -> anyhow::Result<UserHistory>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, user: NewUser) -> anyhow::Result<User> {
        let sql = format!(
            r#"
            INSERT INTO users (name, email, password, province, city, district, sub_district,
                               address, date_of_birth, bank_account, role)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, COALESCE($11, 'user'))
            RETURNING {USER_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, User>(&sql)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password)
            .bind(&user.province)
            .bind(&user.city)
            .bind(&user.district)
            .bind(&user.sub_district)
            .bind(&user.address)
            .bind(user.date_of_birth)
            .bind(&user.bank_account)
            .bind(&user.role)
            .fetch_one(&self.db)
            .await
            .context("insert user")?;
        Ok(row)
    }

    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .context("find user by id")?;
        Ok(row)
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1 ORDER BY id LIMIT 1");
        let row = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.db)
            .await
            .context("find user by email")?;
        Ok(row)
    }

    async fn save(&self, user: &User) -> anyhow::Result<User> {
        let sql = format!(
            r#"
            UPDATE users
               SET name = $2, province = $3, city = $4, district = $5,
                   sub_district = $6, address = $7, updated_at = now()
             WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, User>(&sql)
            .bind(user.id)
            .bind(&user.name)
            .bind(&user.province)
            .bind(&user.city)
            .bind(&user.district)
            .bind(&user.sub_district)
            .bind(&user.address)
            .fetch_one(&self.db)
            .await
            .context("update user")?;
        Ok(row)
    }

    async fn list(&self) -> anyhow::Result<Vec<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY id");
        let rows = sqlx::query_as::<_, User>(&sql)
            .fetch_all(&self.db)
            .await
            .context("list users")?;
        Ok(rows)
    }

    async fn ranking(&self) -> anyhow::Result<Vec<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY points DESC");
        let rows = sqlx::query_as::<_, User>(&sql)
            .fetch_all(&self.db)
            .await
            .context("rank users")?;
        Ok(rows)
    }

    async fn delete(&self, id: i64) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .context("delete user")?;
        Ok(())
    }

    async fn history_for(&self, user_id: i64) -> anyhow::Result<Vec<UserHistory>> {
        let rows = sqlx::query_as::<_, UserHistory>(
            r#"
            SELECT id, user_id, address, time, day
              FROM user_histories
             WHERE user_id = $1
             ORDER BY id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .context("list user history")?;
        Ok(rows)
    }

    async fn add_history(&self, user_id: i64, address: &str, day: &str) -> anyhow::Result<UserHistory> {
        let row = sqlx::query_as::<_, UserHistory>(
            r#"
            INSERT INTO user_histories (user_id, address, time, day)
            VALUES ($1, $2, now(), $3)
            RETURNING id, user_id, address, time, day
            "#,
        )
        .bind(user_id)
        .bind(address)
        .bind(day)
        .fetch_one(&self.db)
        .await
        .context("insert user history")?;
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn new_user(email: &str, bank: Option<&str>) -> NewUser {
        NewUser {
            name: "Ani".into(),
            email: email.into(),
            password: "hash".into(),
            province: "Bali".into(),
            date_of_birth: Some(date!(1999 - 02 - 03)),
            bank_account: bank.map(str::to_string),
            ..Default::default()
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn create_defaults_role_and_rejects_duplicate_bank_account(pool: PgPool) {
        let store = PgUserStore::new(pool);

        let user = store.create(new_user("a@x.com", Some("111"))).await.unwrap();
        assert_eq!(user.role, "user");
        assert_eq!(user.points, 0);
        assert_eq!(user.date_of_birth, Some(date!(1999 - 02 - 03)));

        let admin = store
            .create(NewUser {
                role: Some("admin".into()),
                ..new_user("admin@x.com", None)
            })
            .await
            .unwrap();
        assert_eq!(admin.role, "admin");
        assert_eq!(admin.bank_account, None);

        assert!(store.create(new_user("b@x.com", Some("111"))).await.is_err());
        assert!(store.create(new_user("a@x.com", Some("222"))).await.is_err());

        let found = store.find_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert!(store.find_by_email("nobody@x.com").await.unwrap().is_none());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn save_replaces_profile_fields_and_keeps_the_rest(pool: PgPool) {
        let store = PgUserStore::new(pool);
        let mut user = store.create(new_user("a@x.com", Some("111"))).await.unwrap();

        user.name = "Bob".into();
        user.province = String::new();
        let saved = store.save(&user).await.unwrap();

        assert_eq!(saved.name, "Bob");
        assert_eq!(saved.province, "");
        assert_eq!(saved.email, "a@x.com");
        assert_eq!(saved.bank_account.as_deref(), Some("111"));
        assert_eq!(saved.date_of_birth, Some(date!(1999 - 02 - 03)));
        assert!(saved.updated_at >= user.updated_at);

        let reloaded = store.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(reloaded.name, "Bob");
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn ranking_orders_by_points_descending(pool: PgPool) {
        let store = PgUserStore::new(pool.clone());
        for (email, bank, points) in [("a@x.com", "1", 5), ("b@x.com", "2", 40), ("c@x.com", "3", 12)] {
            let user = store.create(new_user(email, Some(bank))).await.unwrap();
            sqlx::query("UPDATE users SET points = $2 WHERE id = $1")
                .bind(user.id)
                .bind(points)
                .execute(&pool)
                .await
                .unwrap();
        }

        let points: Vec<i32> = store.ranking().await.unwrap().iter().map(|u| u.points).collect();
        assert_eq!(points, vec![40, 12, 5]);

        let emails: Vec<String> = store.list().await.unwrap().into_iter().map(|u| u.email).collect();
        assert_eq!(emails, vec!["a@x.com", "b@x.com", "c@x.com"]);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn history_is_scoped_to_existing_users(pool: PgPool) {
        let store = PgUserStore::new(pool);
        let a = store.create(new_user("a@x.com", Some("1"))).await.unwrap();
        let b = store.create(new_user("b@x.com", Some("2"))).await.unwrap();

        let first = store.add_history(a.id, "Jl. Sunset 1", "Monday").await.unwrap();
        store.add_history(a.id, "Jl. Sunset 2", "Tuesday").await.unwrap();
        store.add_history(b.id, "Jl. Kuta 9", "Monday").await.unwrap();
        assert_eq!(first.user_id, a.id);

        let history = store.history_for(a.id).await.unwrap();
        let days: Vec<&str> = history.iter().map(|h| h.day.as_str()).collect();
        assert_eq!(days, vec!["Monday", "Tuesday"]);

        assert!(store.history_for(9_999).await.unwrap().is_empty());
        assert!(store.add_history(9_999, "Nowhere", "Monday").await.is_err());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn delete_is_blocked_by_history(pool: PgPool) {
        let store = PgUserStore::new(pool);
        let kept = store.create(new_user("a@x.com", Some("1"))).await.unwrap();
        let gone = store.create(new_user("b@x.com", Some("2"))).await.unwrap();
        store.add_history(kept.id, "Jl. Sunset 1", "Monday").await.unwrap();

        assert!(store.delete(kept.id).await.is_err());
        assert!(store.find_by_id(kept.id).await.unwrap().is_some());

        store.delete(gone.id).await.unwrap();
        assert!(store.find_by_id(gone.id).await.unwrap().is_none());
    }
}
