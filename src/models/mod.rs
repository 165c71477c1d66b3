pub mod catalog;
pub mod common;
pub mod order;
pub mod order_stage;
pub mod prize;

pub use catalog::*;
pub use common::*;
pub use order::*;
pub use order_stage::*;
pub use prize::*;
