//! Domain core for the murmur microblog service.
//!
//! The engine owns the persistent user directory, the directed follow graph
//! and the status store. Every operation takes the acting user explicitly;
//! there is no ambient "current user" anywhere in this crate.

pub use error::EngineError;
pub use mailer::{LogMailer, Mailer};
pub use ops::{Engine, EngineBuilder, NewUser, SelfFollowPolicy, UserUpdate};
pub use statuses::Status;
pub use users::User;

mod error;
pub mod mailer;
mod ops;
pub mod password;

pub(crate) mod follows;
pub(crate) mod statuses;
pub(crate) mod users;

type ResultEngine<T> = Result<T, EngineError>;
