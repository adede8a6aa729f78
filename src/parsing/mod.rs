//! Loaders for candidate profile databases.
//!
//! [`profiles`] reads a database file into a `Vec<StrProfile>`:
//!
//! | Extension            | Layout                                  |
//! |----------------------|-----------------------------------------|
//! | `.json`              | JSON array of profiles                  |
//! | `.jsonl`, `.ndjson`  | one JSON profile per line               |
//! | `.csv`               | comma-separated, header row             |
//! | `.tsv`, `.txt`       | tab-separated, header row               |
//!
//! Any of these may be gzip-compressed (`.gz`).
//!
//! ## Example
//!
//! ```rust,no_run
//! use ystr_matcher::parsing::profiles::load_profiles;
//! use std::path::Path;
//!
//! let profiles = load_profiles(Path::new("ystr_database.csv.gz")).unwrap();
//! println!("{} profiles", profiles.len());
//! ```
//!
//! ## Delimited columns
//!
//! The kit number column (`Kit Number`, `kitNumber`, `kit` or `id`) is
//! required. `Name`, `Country` and `Haplogroup` are optional; every other
//! column is read as a marker.

pub mod profiles;
