//! Receipt rendering and print operations

pub mod builder;
pub mod renderer;
pub mod service;

pub use renderer::{ReceiptFormat, ReceiptRenderer};
pub use service::{BatchPrint, RenderedReceipt, print_and_complete, render_receipt};
