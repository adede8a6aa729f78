//! Centralized validation and helper functions.

use std::path::Path;

use crate::core::profile::StrProfile;

/// Maximum number of profiles loaded from a single database file (DOS protection)
pub const MAX_PROFILES: usize = 5_000_000;

/// Maximum number of marker columns accepted for one profile
pub const MAX_MARKERS_PER_PROFILE: usize = 1_000;

/// Maximum kit number length
pub const MAX_KIT_NUMBER_LENGTH: usize = 64;

/// Input validation error types
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Empty kit number")]
    EmptyKitNumber,
    #[error("Kit number too long: exceeds {MAX_KIT_NUMBER_LENGTH} characters")]
    KitNumberTooLong,
    #[error("Kit number contains control characters")]
    InvalidKitNumber,
    #[error("Profile {0} has too many markers (maximum {MAX_MARKERS_PER_PROFILE})")]
    TooManyMarkers(String),
}

/// Check if adding another profile would exceed the maximum allowed.
///
/// Call this with the current count BEFORE adding a new profile.
/// Returns an error message if adding would exceed the limit, None if safe to add.
#[must_use]
pub fn check_profile_limit(count: usize) -> Option<String> {
    if count >= MAX_PROFILES {
        Some(format!(
            "Too many profiles: adding another would exceed maximum of {MAX_PROFILES}"
        ))
    } else {
        None
    }
}

/// Validate a kit number: non-empty, bounded, no control characters.
///
/// Kit numbers are case-sensitive and are not otherwise normalized.
///
/// # Errors
///
/// Returns the matching `ValidationError` for empty, over-long or
/// control-character kit numbers.
pub fn validate_kit_number(kit_number: &str) -> Result<(), ValidationError> {
    if kit_number.trim().is_empty() {
        return Err(ValidationError::EmptyKitNumber);
    }
    if kit_number.len() > MAX_KIT_NUMBER_LENGTH {
        return Err(ValidationError::KitNumberTooLong);
    }
    if kit_number.chars().any(char::is_control) {
        return Err(ValidationError::InvalidKitNumber);
    }
    Ok(())
}

/// Validate a profile handed to the engine from a file.
///
/// # Errors
///
/// Returns a `ValidationError` if the kit number is invalid or the profile
/// carries more markers than allowed.
pub fn validate_profile(profile: &StrProfile) -> Result<(), ValidationError> {
    validate_kit_number(&profile.kit_number)?;
    if profile.markers.len() > MAX_MARKERS_PER_PROFILE {
        return Err(ValidationError::TooManyMarkers(profile.kit_number.clone()));
    }
    Ok(())
}

/// Whether a path names a gzip-compressed file
#[must_use]
pub fn is_gzipped(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    path_str.ends_with(".gz") || path_str.ends_with(".bgz")
}
