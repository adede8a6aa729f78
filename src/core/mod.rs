//! Core data types for Y-STR matching.
//!
//! - [`StrProfile`](profile::StrProfile): a kit with its marker calls
//! - [`MarkerPanel`](panel::MarkerPanel): the fixed marker sets compared together
//! - [`PanelSize`](types::PanelSize), [`CalculationMode`](types::CalculationMode):
//!   search configuration enums
//!
//! ## Marker values
//!
//! | Value            | Meaning                                   |
//! |------------------|-------------------------------------------|
//! | `13`             | single-copy call                          |
//! | `17.2`           | microvariant call                         |
//! | `11-14`          | multi-copy locus, one allele per copy     |
//! | empty, `0`, `-`  | no call                                   |

pub mod panel;
pub mod profile;
pub mod types;
