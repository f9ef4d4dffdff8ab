//! Per-run fixture data
//!
//! Every run appends a random suffix to generated names so that accounts and
//! categories never collide with those left behind by earlier runs.

use rand::Rng;
use serde::Serialize;

const SUFFIX_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
pub const SUFFIX_LEN: usize = 8;

/// Random lowercase base-36 suffix
pub fn random_suffix() -> String {
    let mut rng = rand::thread_rng();
    (0..SUFFIX_LEN)
        .map(|_| SUFFIX_ALPHABET[rng.gen_range(0..SUFFIX_ALPHABET.len())] as char)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Everything the category types suite generates up front
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuiteFixtures {
    pub suffix: String,
    pub credentials: Credentials,
    pub root_category_name: String,
    pub sub_category_name: String,
}

impl SuiteFixtures {
    pub fn generate(email_domain: &str) -> Self {
        Self::from_suffix(&random_suffix(), email_domain)
    }

    pub fn from_suffix(suffix: &str, email_domain: &str) -> Self {
        Self {
            suffix: suffix.to_string(),
            credentials: Credentials {
                email: format!("email+{}@{}", suffix, email_domain),
                password: format!("password+{}", suffix),
            },
            root_category_name: format!("category+{}", suffix),
            sub_category_name: format!("sub-category+{}", suffix),
        }
    }
}
