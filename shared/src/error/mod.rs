//! Error codes, `AppError` and the response envelope
//!
//! Codes are grouped by range: 0xxx general, 4xxx order, 5xxx payment,
//! 6xxx product, 7xxx table, 9xxx system.
//!
//! ```
//! use shared::error::{ApiResponse, AppError, ErrorCode};
//!
//! let err = AppError::with_message(ErrorCode::ProductUnavailable, "Product 12 is not available")
//!     .with_detail("product_id", 12);
//!
//! let response = ApiResponse::from(err);
//! assert_eq!(response.code, Some(6004));
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{ApiResponse, AppError, AppResult};
