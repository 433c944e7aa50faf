//! Application directories

use directories::ProjectDirs;

use crate::ServerError;

/// Settings file name inside the data directory
pub const SETTINGS_FILE: &str = "settings.json";

pub fn get_project_dirs() -> Result<ProjectDirs, ServerError> {
    ProjectDirs::from("org", "twocan", "racing").ok_or(ServerError::NoDataDirectory)
}
