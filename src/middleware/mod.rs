pub mod auth;
pub mod rate_limit;
pub mod response;
pub mod tenant_gate;
pub mod tenant_path;

pub use auth::token_auth_middleware;
pub use rate_limit::rate_limit_middleware;
pub use response::{ApiResponse, ApiResult};
pub use tenant_gate::tenant_gate_middleware;
pub use tenant_path::{strip_tenant_prefix, PathTenant};
