//! Common types shared by stores and caches.

use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};

/// Name of a partition inside a [`RegionCache`](crate::RegionCache).
///
/// Entries in different regions never collide, even when they share a key.
/// Client details live in [`CacheRegion::CLIENT_DETAILS`] unless a service
/// configures another name.
///
/// # Examples
///
/// ```
/// use tokenauth_common_storage::CacheRegion;
///
/// let region = CacheRegion::from("jwt_client_details");
/// assert_eq!(region, CacheRegion::client_details());
/// assert_eq!(region.to_string(), "jwt_client_details");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheRegion(Arc<str>);

impl CacheRegion {
    /// Default region name for client details.
    pub const CLIENT_DETAILS: &'static str = "jwt_client_details";

    /// Creates a region with the given name.
    #[must_use]
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self(name.into())
    }

    /// Returns the default client details region.
    #[must_use]
    pub fn client_details() -> Self {
        Self::new(Self::CLIENT_DETAILS)
    }

    /// Returns the region name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CacheRegion {
    fn default() -> Self {
        Self::client_details()
    }
}

impl From<&str> for CacheRegion {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for CacheRegion {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for CacheRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
