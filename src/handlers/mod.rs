pub mod admin;
pub mod promotion;

pub use admin::admin_config;
pub use promotion::promotion_config;
