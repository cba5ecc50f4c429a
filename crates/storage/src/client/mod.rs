//! Client registry types and storage.
//!
//! A client is an application permitted to request tokens. Its
//! [`ClientDetails`] record is created by the registration process and read
//! through [`ClientDetailsStore`] whenever a token is issued or validated.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐       ┌──────────────┐       ┌──────────────┐
//! │ Registration │       │    Store     │       │  Resolver    │
//! │              │──────►│  (source of  │◄──────│ (cache-aside │
//! │ writes       │       │    truth)    │       │  reads)      │
//! └──────────────┘       └──────────────┘       └──────────────┘
//! ```

mod details;
mod store;

pub use details::{
    ClientDetails, DEFAULT_ACCESS_TOKEN_VALIDITY, DEFAULT_REFRESH_TOKEN_VALIDITY,
    DEFAULT_ROLES_CLAIM, SignatureAlgorithm, UnknownAlgorithm,
};
pub use store::{ClientDetailsStore, MemoryClientDetailsStore};
