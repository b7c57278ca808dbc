//! Constants used throughout the forms core crate.

/// Default directory for answer document storage when no explicit directory is configured.
pub const DEFAULT_DATA_DIR: &str = "form_data";

/// Directory name for answer documents under the data directory.
pub const DOCUMENTS_DIR_NAME: &str = "documents";

/// Filename of a persisted answer document inside its sharded directory.
pub const DOCUMENT_FILENAME: &str = "document.json";

/// Suffix of the scratch file written before an atomic rename.
pub const DOCUMENT_TEMP_SUFFIX: &str = "tmp";

/// Upper bound (inclusive, in days) of the "within 2 weeks" arrival and departure windows.
pub const STATUS_WINDOW_2_WEEKS_DAYS: i64 = 14;

/// Upper bound (inclusive, in days) of the "within 6 weeks" arrival window.
pub const STATUS_WINDOW_6_WEEKS_DAYS: i64 = 42;

/// Shown in transcripts for an owned field that has no answer on the current branch.
pub const NOT_PROVIDED: &str = "Not provided";

/// Maximum accepted length of a free-text answer, in characters.
pub const MAX_FREE_TEXT_CHARS: usize = 2_000;
