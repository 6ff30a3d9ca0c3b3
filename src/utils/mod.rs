//! Shared utilities: tuning constants and URL helpers.

pub mod constants;
pub mod url_utils;

pub use constants::*;
pub use url_utils::{
    absolutize, clean_mailto_href, clean_tel_href, is_profile_path, same_origin, slugify,
};
