use crate::db::postgres_service::PostgresService;
use crate::types::error::{is_unique_violation, AppError};
use crate::utils::password::hash_password;
use chrono::Utc;
use entity::user::{ActiveModel as UserActive, Entity as User};
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::{FirstName, LastName};
use fake::Fake;
use rand::{distributions::Alphanumeric, seq::SliceRandom, Rng};
use sea_orm::{EntityTrait, Set, TransactionTrait};
use serde::Serialize;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct FakeUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role_id: Option<i32>,
}

impl FakeUser {
    pub fn random<R: Rng + ?Sized>(rng: &mut R, role_id: Option<i32>) -> Self {
        FakeUser {
            first_name: FirstName().fake_with_rng(rng),
            last_name: LastName().fake_with_rng(rng),
            email: SafeEmail().fake_with_rng(rng),
            role_id,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FakeReport {
    pub inserted: usize,
    pub skipped: usize,
}

impl PostgresService {
    /// `count` random confirmed users, each with a random existing role.
    pub async fn generate_fake(&self, count: usize) -> Result<FakeReport, AppError> {
        let roles = self.list_roles().await?;
        let users: Vec<FakeUser> = {
            let mut rng = rand::thread_rng();
            (0..count)
                .map(|_| {
                    let role_id = roles.choose(&mut rng).map(|r| r.id);
                    FakeUser::random(&mut rng, role_id)
                })
                .collect()
        };
        self.insert_fake_users(users).await
    }

    /// Commits one user per transaction. A duplicate email rolls back only that
    /// user and counts as skipped; any other failure stops the batch.
    pub async fn insert_fake_users(&self, users: Vec<FakeUser>) -> Result<FakeReport, AppError> {
        // fake accounts never log in, one hash serves the whole batch
        let password: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(16)
            .map(char::from)
            .collect();
        let password_hash = hash_password(&password)
            .map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))?;

        let mut report = FakeReport::default();
        for user in users {
            let now = Utc::now();
            let email = user.email.clone();
            let txn = self.database_connection.begin().await?;

            let res = User::insert(UserActive {
                confirmed: Set(true),
                first_name: Set(user.first_name),
                last_name: Set(user.last_name),
                email: Set(user.email),
                password_hash: Set(Some(password_hash.clone())),
                role_id: Set(user.role_id),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            })
            .exec(&txn)
            .await;

            match res {
                Ok(_) => {
                    txn.commit().await?;
                    report.inserted += 1;
                }
                Err(err) if is_unique_violation(&err) => {
                    txn.rollback().await?;
                    debug!("Skipping fake user with duplicate email {email}");
                    report.skipped += 1;
                }
                Err(err) => {
                    txn.rollback().await?;
                    return Err(err.into());
                }
            }
        }

        info!("Fake data: {} inserted, {} skipped", report.inserted, report.skipped);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn random_users_look_real() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let u = FakeUser::random(&mut rng, Some(1));
            assert!(!u.first_name.is_empty());
            assert!(!u.last_name.is_empty());
            assert!(u.email.contains('@'));
            assert!(u.email.len() <= 64);
            assert_eq!(u.role_id, Some(1));
        }
    }

    #[test]
    fn same_seed_same_users() {
        let a = FakeUser::random(&mut StdRng::seed_from_u64(11), None);
        let b = FakeUser::random(&mut StdRng::seed_from_u64(11), None);
        assert_eq!((a.first_name, a.last_name, a.email), (b.first_name, b.last_name, b.email));
    }
}
