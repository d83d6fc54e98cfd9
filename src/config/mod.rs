pub mod exclusions;
pub mod patterns;
pub mod settings;

pub use exclusions::{detect_project_type, get_default_exclusions, ProjectType};
pub use patterns::{compile_location_pattern, compile_location_patterns, default_location_patterns};
pub use settings::{CheckSettings, SearchSettings, Settings, SETTINGS_FILE_NAME};
