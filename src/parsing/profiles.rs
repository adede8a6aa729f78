use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, Trim};
use flate2::read::GzDecoder;
use thiserror::Error;

use crate::core::profile::{is_present_value, StrProfile};
use crate::utils::validation::{
    check_profile_limit, is_gzipped, validate_profile, ValidationError, MAX_PROFILES,
};

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid delimited table: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid profile file: {0}")]
    InvalidFormat(String),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid profile: {0}")]
    InvalidProfile(#[from] ValidationError),

    #[error("Too many profiles: {0} exceeds maximum allowed")]
    TooManyProfiles(usize),
}

/// Supported layouts for a profile database
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ProfileFormat {
    /// JSON array of profiles
    Json,
    /// One JSON profile per line
    JsonLines,
    /// Comma-separated with a header row
    Csv,
    /// Tab-separated with a header row
    Tsv,
}

impl ProfileFormat {
    /// Detect the format from a file extension, looking through `.gz`
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_string_lossy().to_lowercase();
        let name = name
            .strip_suffix(".gz")
            .or_else(|| name.strip_suffix(".bgz"))
            .unwrap_or(&name);

        let ext = name.rsplit_once('.').map(|(_, ext)| ext)?;
        match ext {
            "json" => Some(Self::Json),
            "jsonl" | "ndjson" => Some(Self::JsonLines),
            "csv" => Some(Self::Csv),
            "tsv" | "txt" => Some(Self::Tsv),
            _ => None,
        }
    }
}

/// Load profiles from a file, detecting the format from its extension
///
/// # Errors
///
/// Returns `ParseError::UnsupportedFormat` for unknown extensions, or any
/// error from [`load_profiles_as`].
pub fn load_profiles(path: &Path) -> Result<Vec<StrProfile>, ParseError> {
    let format = ProfileFormat::from_path(path)
        .ok_or_else(|| ParseError::UnsupportedFormat(path.display().to_string()))?;
    load_profiles_as(path, format)
}

/// Load profiles from a (possibly gzip-compressed) file in a given format
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or a parse error if
/// the content is invalid.
pub fn load_profiles_as(path: &Path, format: ProfileFormat) -> Result<Vec<StrProfile>, ParseError> {
    let text = if is_gzipped(path) {
        let mut text = String::new();
        GzDecoder::new(std::fs::File::open(path)?).read_to_string(&mut text)?;
        text
    } else {
        std::fs::read_to_string(path)?
    };
    parse_profiles_text(&text, format)
}

/// Parse profiles from text
///
/// # Errors
///
/// Returns a `ParseError` if the text is malformed, a profile fails
/// validation, or the profile limit is exceeded.
pub fn parse_profiles_text(text: &str, format: ProfileFormat) -> Result<Vec<StrProfile>, ParseError> {
    let profiles = match format {
        ProfileFormat::Json => serde_json::from_str::<Vec<StrProfile>>(text)?,
        ProfileFormat::JsonLines => parse_json_lines(text)?,
        ProfileFormat::Csv => parse_delimited_text(text, b',')?,
        ProfileFormat::Tsv => parse_delimited_text(text, b'\t')?,
    };

    if profiles.len() > MAX_PROFILES {
        return Err(ParseError::TooManyProfiles(profiles.len()));
    }
    for profile in &profiles {
        validate_profile(profile)?;
    }

    Ok(profiles)
}

fn parse_json_lines(text: &str) -> Result<Vec<StrProfile>, ParseError> {
    let mut profiles = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if check_profile_limit(profiles.len()).is_some() {
            return Err(ParseError::TooManyProfiles(profiles.len()));
        }
        profiles.push(serde_json::from_str(line)?);
    }
    Ok(profiles)
}

/// Role of a column in a delimited profile table
#[derive(Debug, Clone, PartialEq, Eq)]
enum Column {
    KitNumber,
    Name,
    Country,
    Haplogroup,
    Marker(String),
}

impl Column {
    fn from_header(header: &str) -> Self {
        let normalized: String = header
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "kitnumber" | "kit" | "kitno" | "id" => Self::KitNumber,
            "name" | "paternalancestorname" => Self::Name,
            "country" => Self::Country,
            "haplogroup" | "haplo" => Self::Haplogroup,
            _ => Self::Marker(header.to_string()),
        }
    }
}

/// Parse a delimited table: one header row naming the kit, optional
/// descriptive columns and one column per marker.
///
/// Fields may be quoted, and quoted fields may contain the delimiter. Lines
/// starting with `#` are comments. Blank cells and placeholder calls are left
/// out of the marker map.
///
/// # Errors
///
/// Returns `ParseError::Csv` for malformed quoting, or
/// `ParseError::InvalidFormat` if there is no kit number column, a row has no
/// kit number, or no profiles are found.
pub fn parse_delimited_text(text: &str, delimiter: u8) -> Result<Vec<StrProfile>, ParseError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .comment(Some(b'#'))
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    if headers.iter().all(str::is_empty) {
        return Err(ParseError::InvalidFormat("No header row found".to_string()));
    }
    let columns: Vec<Column> = headers.iter().map(Column::from_header).collect();

    let kit_index = columns
        .iter()
        .position(|c| *c == Column::KitNumber)
        .ok_or_else(|| ParseError::InvalidFormat("No kit number column in header".to_string()))?;

    let mut profiles = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        // Line numbers from the reader are already 1-based
        let line_num = record.position().map_or(0, csv::Position::line);

        let kit = record.get(kit_index).unwrap_or_default();
        if kit.is_empty() {
            return Err(ParseError::InvalidFormat(format!(
                "Missing kit number on line {line_num}"
            )));
        }

        if check_profile_limit(profiles.len()).is_some() {
            return Err(ParseError::TooManyProfiles(profiles.len()));
        }

        let mut profile = StrProfile::new(kit);
        for (column, value) in columns.iter().zip(record.iter()) {
            if value.is_empty() {
                continue;
            }
            match column {
                Column::KitNumber => {}
                Column::Name => profile.name = Some(value.to_string()),
                Column::Country => profile.country = Some(value.to_string()),
                Column::Haplogroup => profile.haplogroup = Some(value.to_string()),
                Column::Marker(marker) => {
                    if is_present_value(value) {
                        profile.markers.insert(marker.clone(), value.to_string());
                    }
                }
            }
        }
        profiles.push(profile);
    }

    if profiles.is_empty() {
        return Err(ParseError::InvalidFormat(
            "No profiles found in file".to_string(),
        ));
    }

    Ok(profiles)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_csv_profiles() {
        let csv = r#"Kit Number,Name,Country,Haplogroup,DYS393,DYS390,DYS385
"123456",John Smith,Scotland,R-M269,13,24,11-14
IN87501,,Ireland,,13,0,11-15
"#;
        let profiles = parse_delimited_text(csv, b',').unwrap();
        assert_eq!(profiles.len(), 2);

        assert_eq!(profiles[0].kit_number, "123456");
        assert_eq!(profiles[0].name.as_deref(), Some("John Smith"));
        assert_eq!(profiles[0].haplogroup.as_deref(), Some("R-M269"));
        assert_eq!(profiles[0].markers["DYS385"], "11-14");

        assert!(profiles[1].name.is_none());
        assert!(profiles[1].haplogroup.is_none());
        assert!(!profiles[1].markers.contains_key("DYS390"));
        assert_eq!(profiles[1].markers.len(), 2);
    }

    #[test]
    fn test_parse_tsv_with_comments() {
        let tsv = "# exported profiles\nkit\tDYS393\tDYS19\nA1\t13\t14\nA2\t12\t\n";
        let profiles = parse_delimited_text(tsv, b'\t').unwrap();
        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[1].markers.len(), 1);
    }

    #[test]
    fn test_quoted_delimiter_stays_in_its_field() {
        let csv = "Kit Number,Name,Country,DYS393,DYS390\nK1,\"Smith, John\",Scotland,13,24\n";
        let profiles = parse_delimited_text(csv, b',').unwrap();
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].name.as_deref(), Some("Smith, John"));
        assert_eq!(profiles[0].country.as_deref(), Some("Scotland"));
        assert_eq!(profiles[0].markers["DYS393"], "13");
        assert_eq!(profiles[0].markers["DYS390"], "24");

        let tsv = "kit\tName\tDYS19\nK2\t\"O'Neill\tjr\"\t14\n";
        let profiles = parse_delimited_text(tsv, b'\t').unwrap();
        assert_eq!(profiles[0].name.as_deref(), Some("O'Neill\tjr"));
        assert_eq!(profiles[0].markers["DYS19"], "14");
    }

    #[test]
    fn test_short_rows_and_blank_lines() {
        let csv = "Kit,DYS393,DYS390,DYS19\n\nA1,13\n   \nA2,13,24,14\n";
        let profiles = parse_delimited_text(csv, b',').unwrap();
        let kits: Vec<_> = profiles.iter().map(|p| p.kit_number.as_str()).collect();
        assert_eq!(kits, ["A1", "A2"]);
        assert_eq!(profiles[0].markers.len(), 1);
        assert_eq!(profiles[1].markers.len(), 3);
    }

    #[test]
    fn test_delimited_requires_kit_column() {
        let err = parse_delimited_text("Name,DYS393\nX,13\n", b',').unwrap_err();
        assert!(matches!(err, ParseError::InvalidFormat(_)));

        let err = parse_delimited_text("Kit,DYS393\n,13\n", b',').unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_parse_json_and_json_lines() {
        let json = r#"[{"kitNumber":"A","markers":{"DYS393":"13"}},{"kitNumber":"B"}]"#;
        let profiles = parse_profiles_text(json, ProfileFormat::Json).unwrap();
        assert_eq!(profiles.len(), 2);

        let jsonl = "{\"kitNumber\":\"A\"}\n\n{\"kitNumber\":\"B\"}\n";
        let profiles = parse_profiles_text(jsonl, ProfileFormat::JsonLines).unwrap();
        assert_eq!(profiles[1].kit_number, "B");
    }

    #[test]
    fn test_invalid_kit_number_is_rejected() {
        let json = r#"[{"kitNumber":""}]"#;
        let err = parse_profiles_text(json, ProfileFormat::Json).unwrap_err();
        assert!(matches!(
            err,
            ParseError::InvalidProfile(ValidationError::EmptyKitNumber)
        ));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            ProfileFormat::from_path(Path::new("db.csv.gz")),
            Some(ProfileFormat::Csv)
        );
        assert_eq!(
            ProfileFormat::from_path(Path::new("db.ndjson")),
            Some(ProfileFormat::JsonLines)
        );
        assert_eq!(
            ProfileFormat::from_path(Path::new("/data/ystr.json")),
            Some(ProfileFormat::Json)
        );
        assert_eq!(ProfileFormat::from_path(Path::new("db.xlsx")), None);
        assert_eq!(ProfileFormat::from_path(Path::new("db")), None);
    }
}
