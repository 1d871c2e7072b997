// lib.rs
//! # CASELINK
//!
//! A RUST-dominant record linkage library 🤝 designed to reconcile two misaligned tabular
//! datasets — legal "case" records keyed by long descriptive captions, and "finding" records
//! keyed by shorter titles — into a single joined table with a guaranteed 1:1 row
//! correspondence. 🚀
//!
//! The matching escalates through passes, each one a pure refinement over the previous pass's
//! leftovers: exact equality, directional substring containment with an auxiliary tie-breaker,
//! substring containment on normalized keys, and finally a positional join of the remainders
//! that is validated before it is trusted and fails loudly when it cannot be.
//!
//! ## `csv_utils`
//!
//! - **Purpose**: A toolkit for small in-memory CSV table management.
//! - **Features**:
//!   - **CsvBuilder**: A versatile builder for creating and manipulating CSV tables:
//!   - **Easy Initialization**: Start with a new table, load from a file, or pull from a
//!     publicly viewable raw CSV url.
//!   - **Custom Headers and Rows**: Set custom headers and add rows effortlessly.
//!   - **Data Manipulation**: Drop, retain and rename columns, cascade sort, trim cells,
//!     remove duplicate rows.
//!   - **Chainable Methods**: Combine multiple operations in a fluent and readable manner.
//!   - **Data Analysis Aids**: Count rows, print tables, print or collect unique values.
//!   - **Flexible Saving Options**: Save your table to a desired path.
//!
//! ## `linkage_utils`
//!
//! - **Purpose**: The record linker itself.
//! - **Features**:
//!   - `normalize`: total, idempotent canonicalization of identifying text (lowercase,
//!     transliterate diacritics, strip punctuation, remove the "llc" suffix).
//!   - `RecordLinker`: direct, fuzzy and normalized-fuzzy matching passes over explicit
//!     remainder pools, with every candidate recorded so the first-match tie-break stays
//!     auditable.
//!   - Positional reconciliation of equal-length remainders, validated pair by pair via the
//!     tie-breaker field or normalized-key similarity.
//!   - `LinkReport`: pass-by-pass accounting, serializable to JSON.
//!
//! ## `public_url_utils`
//!
//! - **Purpose**: Retrieve data from popular publicly available interfaces, such as a raw CSV
//!   file hosted at a public url.
//! - **Features**:
//!   - One-shot fetch of a publicly viewable raw CSV into headers and rows.
//!
//! ## License
//!
//! This project is licensed under the MIT License.

pub mod csv_utils;
pub mod linkage_utils;
pub mod public_url_utils;
