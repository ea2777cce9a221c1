pub mod aggregator;
pub mod engine;
pub mod report;

pub use crate::domain::model::{HttpMethod, Outcome, RequestOutcome, StressPlan};
pub use crate::domain::ports::{ConfigProvider, RequestSender, Storage};
pub use crate::utils::error::Result;
