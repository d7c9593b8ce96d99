use indexmap::IndexMap;

/// One parsed data row of the remote registration document.
///
/// Keys are the header cells exactly as they appear in the document, in
/// column order, so a serialized row lists its cells left to right. For
/// documents written by this system that means the field labels plus `Date`.
/// Older documents may carry keys or lower-cased labels instead; see the
/// lookup chain in the backend's CSV codec.
pub type CsvRow = IndexMap<String, String>;

/// Header cell holding the server-assigned submission timestamp.
pub const DATE_COLUMN: &str = "Date";
