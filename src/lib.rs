//! Smart Clean: upload CSV & Excel files, clean them, chart them and convert
//! them to CSV, Excel or JSON.
//!
//! The [`data`] module holds the pipeline (decode, clean, summarize, encode);
//! [`session`] keeps the current table of every uploaded file.

pub mod data;
pub mod session;

pub use session::{process, FileId, LoadedFile, ProcessOutput, Session};
