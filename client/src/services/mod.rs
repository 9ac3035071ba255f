pub mod api;
pub mod date_utils;

pub use api::{EmbeddedApi, FinanceApi};
pub use date_utils::{Clock, FixedClock, SystemClock};
