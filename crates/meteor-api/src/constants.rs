//! Remote service endpoints and client defaults

use std::time::Duration;

/// Base of the account service hosting the meteor endpoints
pub const ACCOUNT_API_BASE: &str = "https://account.neos.com/v1";

/// Base of the public API hosting user search
pub const USERS_API_BASE: &str = "https://api.neos.com/api";

/// Identifying header value sent with every mine request.
/// The account service rejects claims from unrecognised clients.
pub const CLIENT_USER_AGENT: &str = "Neos/2022.1.28.1335";

/// Per-call timeout applied to both the list and the mine request
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
