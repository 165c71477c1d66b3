pub mod admin_service;
pub mod duplicate_guard;
pub mod grand_draw;
pub mod inventory_guard;
pub mod order_service;
pub mod prize_selector;
pub mod scratch_reveal;

pub use admin_service::*;
pub use duplicate_guard::*;
pub use grand_draw::*;
pub use inventory_guard::*;
pub use order_service::*;
pub use prize_selector::*;
pub use scratch_reveal::*;
