pub mod tenant;

pub use tenant::{tenant_show, tenant_update};
