pub mod classify;
pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod range;
pub mod report;
pub mod session;
pub mod source;

pub use error::{AppError, Result};
pub use export::export_csv;
pub use range::{DateRange, QuickRangeToken, resolve};
pub use report::{ReportEngine, ReportQuery};
