//! System-wide constants for the ClubBank allocation engine.

/// Resource kinds of the reference deployment, in vector order.
pub const DEFAULT_RESOURCE_KINDS: [&str; 3] = ["Stage", "Projector", "Sound"];

/// Scenario loaded into a fresh session unless configured otherwise.
pub const DEFAULT_SCENARIO: &str = "basic";

/// Prefix used to name clubs when the caller supplies no names.
pub const DEFAULT_CLUB_NAME_PREFIX: &str = "Club";

/// Upper bound on clubs in a single state. Keeps the O(n²·m) safety
/// check trivially cheap.
pub const MAX_CLUBS: usize = 256;

/// Upper bound on resource kinds in a single state.
pub const MAX_RESOURCE_KINDS: usize = 64;

/// Upper bound on installed units and declared maximums, per kind. A
/// request component above it exceeds every possible need.
pub const MAX_UNITS: u32 = 1_000_000_000;

/// Header row of the CSV audit export.
pub const CSV_HEADER: &str = "Timestamp,Club Name,Requested Resources,Decision,Message,Safe Sequence";

/// Separator between club names in a rendered safe sequence.
pub const SEQUENCE_SEPARATOR: &str = " -> ";

/// Separator between components of a rendered resource vector inside CSV.
pub const CSV_VECTOR_SEPARATOR: &str = "; ";

/// Filename prefix of CSV audit exports.
pub const EXPORT_FILENAME_PREFIX: &str = "allocation_logs_";

/// `chrono` format of the timestamp embedded in export filenames.
pub const EXPORT_FILENAME_TIME_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Default `tracing` filter directive for the binary.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "ClubBank";
