#![allow(unused_imports)]

//! Document models, one file per collection. Re-exported at `crate::db`.

pub mod booking;
pub mod error_log;
pub mod notification;
pub mod timestamp;
pub mod transaction;
pub mod user;

pub use self::booking::*;
pub use self::error_log::*;
pub use self::notification::*;
pub use self::timestamp::*;
pub use self::transaction::*;
pub use self::user::*;
