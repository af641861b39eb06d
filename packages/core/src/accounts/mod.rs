//! User accounts: OTP-confirmed signup, login and the per-user medicine list.

pub mod error;
pub mod password;
pub mod service;
pub mod store;
pub mod types;

pub use error::AccountError;
pub use service::{AccountService, SharedAccountStore, PENDING_SIGNUP_TTL_MINUTES};
pub use store::AccountStore;
pub use types::{NewPendingUser, NewUser, PendingUser, User, UserProfile};
