//! Unit tests for configuration loading and precedence.
//!
//! - `helpers`: shared layer builders
//! - `precedence`: layer precedence
//! - `field_resolution`: token, repository, and path accessors
//! - `loading`: loading from argument lists and the environment

mod helpers;
