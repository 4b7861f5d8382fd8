/// Data layer: core types, loading, filtering, and export.
///
/// Architecture:
/// ```text
///    .csv
///      │
///      ▼
///  ┌──────────┐
///  │  loader   │  sniff column kinds → Table (with mtime cache)
///  └──────────┘
///      │
///      ▼
///  ┌──────────┐
///  │  Table    │  Vec<Column> of typed cells
///  └──────────┘
///      │
///      ▼
///  ┌──────────┐
///  │  filter   │  per-column masks + quick filter + projection → View
///  └──────────┘
///      │
///      ▼
///  ┌──────────┐
///  │  export   │  View → CSV download
///  └──────────┘
/// ```

pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod session;
