/// Spectral channel: raw instrument export → cleaned series.
///
/// Architecture:
/// ```text
///  .csv / .txt / .xlsx / .parquet / .json  (bytes)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  strict: decode, skip preamble, ≥2 columns → RawTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  clean    │  permissive: drop `//` rows, coerce, drop missing → SpectralSeries
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  export   │  SpectralSeries → delimited text (same layout the loader reads)
///   └──────────┘
/// ```

pub mod clean;
pub mod export;
pub mod loader;
pub mod model;
