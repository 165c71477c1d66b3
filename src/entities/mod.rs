pub mod prize_counts;
pub mod promo_orders;

pub use prize_counts as prize_count_entity;
pub use promo_orders as promo_order_entity;
