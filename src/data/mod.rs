/// Data layer: core types, decoding, cleaning, charting and encoding.
///
/// Architecture:
/// ```text
///  .csv / .xlsx bytes
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  decode → Table (explicit type inference)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  clean    │  deduplicate / drop columns / fill missing, in place
///   └──────────┘
///        │
///        ├──────────────► summary   file info, bar + histogram projections
///        ▼
///   ┌──────────┐
///   │  export   │  Table → CSV / Excel / JSON buffer
///   └──────────┘
/// ```

pub mod clean;
pub mod error;
pub mod export;
pub mod loader;
pub mod model;
pub mod summary;

pub use clean::{Transform, TransformReport};
pub use error::PipelineError;
pub use export::{ExportBuffer, ExportFormat};
pub use loader::UploadRecord;
pub use model::{CellValue, Column, ColumnKind, Table};
pub use summary::ChartData;
