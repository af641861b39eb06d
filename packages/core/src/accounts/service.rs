//! Signup, OTP verification and login.

use std::sync::Arc;

use chrono::{Duration, Utc};
use rand::Rng;

use super::error::AccountError;
use super::password::{hash_password, verify_password};
use super::store::AccountStore;
use super::types::{NewPendingUser, NewUser, UserProfile};
use crate::notify::{self, Notification, SharedNotifier};

/// How long a signup waits for its OTP before it is discarded.
pub const PENDING_SIGNUP_TTL_MINUTES: i64 = 5;

pub type SharedAccountStore = Arc<dyn AccountStore + Send + Sync>;

#[derive(Clone)]
pub struct AccountService {
    store: SharedAccountStore,
    notifier: SharedNotifier,
    sender: Option<String>,
    hash_iterations: u32,
}

fn generate_otp() -> u32 {
    rand::thread_rng().gen_range(100_000..=999_999)
}

fn generate_global_pin() -> u32 {
    rand::thread_rng().gen_range(1_000..=9_999)
}

fn pending_ttl() -> Duration {
    Duration::minutes(PENDING_SIGNUP_TTL_MINUTES)
}

/// Run CPU-bound password work on the blocking pool.
async fn run_blocking<T, F>(work: F) -> Result<T, AccountError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|err| AccountError::internal(format!("password task failed: {}", err)))
}

impl AccountService {
    pub fn new(
        store: SharedAccountStore,
        notifier: SharedNotifier,
        sender: Option<String>,
        hash_iterations: u32,
    ) -> Self {
        Self {
            store,
            notifier,
            sender,
            hash_iterations,
        }
    }

    /// Start a signup: store a pending account and email its OTP.
    /// Returns the pending signup id the client verifies against.
    pub async fn sign_up(
        &self,
        fullname: &str,
        email: &str,
        password: &str,
    ) -> Result<i64, AccountError> {
        if self.store.find_user_by_email(email).await?.is_some() {
            return Err(AccountError::conflict("Email already exists"));
        }

        let otp = generate_otp();
        let password = password.to_string();
        let iterations = self.hash_iterations;
        let password_hash = run_blocking(move || hash_password(&password, iterations)).await?;

        let pending = self
            .store
            .upsert_pending_user(&NewPendingUser {
                fullname: fullname.to_string(),
                email: email.to_string(),
                password_hash,
                otp,
                created_at: Utc::now(),
            })
            .await?;

        notify::dispatch(
            self.notifier.clone(),
            Notification {
                from: self.sender.clone(),
                to: email.to_string(),
                subject: "Your OTP for signup".to_string(),
                text: format!("Your OTP is: {}", otp),
            },
        );

        tracing::info!(pending_id = pending.id, "Signup started, OTP dispatched");
        Ok(pending.id)
    }

    /// Confirm a pending signup. A wrong OTP discards the signup.
    pub async fn verify_otp(&self, pending_id: i64, otp: u32) -> Result<UserProfile, AccountError> {
        let pending = self
            .store
            .find_pending_user(pending_id)
            .await?
            .ok_or_else(|| AccountError::not_found("User not found"))?;

        if pending.created_at + pending_ttl() < Utc::now() {
            self.store.delete_pending_user(pending_id).await?;
            return Err(AccountError::not_found("User not found"));
        }

        if pending.otp != otp {
            self.store.delete_pending_user(pending_id).await?;
            tracing::warn!(pending_id, "OTP mismatch, pending signup discarded");
            return Err(AccountError::InvalidOtp);
        }

        if self.store.find_user_by_email(&pending.email).await?.is_some() {
            self.store.delete_pending_user(pending_id).await?;
            return Err(AccountError::conflict("Email already exists"));
        }

        let user = self
            .store
            .insert_user(&NewUser {
                fullname: pending.fullname,
                email: pending.email,
                password_hash: pending.password_hash,
                global_pin: generate_global_pin(),
            })
            .await?;
        self.store.delete_pending_user(pending_id).await?;

        tracing::info!(user_id = user.id, "User verified");
        Ok(user.into())
    }

    /// Check credentials and return the user id.
    pub async fn login(&self, email: &str, password: &str) -> Result<i64, AccountError> {
        let user = self
            .store
            .find_user_by_email(email)
            .await?
            .ok_or(AccountError::InvalidCredentials)?;

        let password = password.to_string();
        let encoded = user.password_hash.clone();
        if !run_blocking(move || verify_password(&password, &encoded)).await? {
            return Err(AccountError::InvalidCredentials);
        }

        Ok(user.id)
    }

    pub async fn user_details(&self, user_id: i64) -> Result<UserProfile, AccountError> {
        self.store
            .find_user_by_id(user_id)
            .await?
            .map(UserProfile::from)
            .ok_or_else(|| AccountError::not_found("User not found"))
    }

    /// Record `medicine_id` on the owner's medicine list.
    pub async fn link_medicine(&self, user_id: i64, medicine_id: i64) -> Result<(), AccountError> {
        if self.store.push_user_medicine(user_id, medicine_id).await? {
            Ok(())
        } else {
            Err(AccountError::not_found("User or medicine not found"))
        }
    }

    /// Drop pending signups older than the TTL. Returns the number removed.
    pub async fn prune_expired_signups(&self) -> Result<u64, AccountError> {
        Ok(self.store.prune_pending_users(Utc::now() - pending_ttl()).await?)
    }
}
