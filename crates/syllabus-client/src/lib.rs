//! Client side of the syllabus analysis service
//!
//! - [`api`]: HTTP calls for uploads and the three analyses
//! - [`upload`]: PDF checks and the two-slot submission form
//! - [`view`]: report views that ignore results from superseded loads
//! - [`config`]: base URL and timeout from TOML and the environment

pub mod api;
pub mod config;
pub mod error;
pub mod upload;
pub mod view;

pub use api::{AnalysisClient, UploadReceipt};
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use upload::{ComparisonForm, FieldError, FieldErrors, UploadFile, UploadSlot};
pub use view::{LoadOutcome, LoadTicket, ReportView, ViewSnapshot};
