/// Derived views over a canonical series.
///
/// Nothing here mutates a series or touches the network; every function is
/// a read-only computation over `IndexSeries` records.
///
/// Submodules:
/// - `phases`    — warm / neutral / cool classification and ENSO episodes.
/// - `staleness` — how far behind today the latest published month is.

pub mod phases;
pub mod staleness;
