//! Config store key naming

use std::fmt;

/// Address of a rule collection in the config store
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfigKey {
    pub data_id: String,
    pub group_id: String,
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.group_id, self.data_id)
    }
}

/// Compose the key for an application's rules of one type.
///
/// `data_id` is the application name followed by the rule type suffix. No
/// validation happens here: an empty application name still yields a key.
pub fn compose_key(app_name: &str, suffix: &str, group_id: &str) -> ConfigKey {
    ConfigKey {
        data_id: format!("{}{}", app_name, suffix),
        group_id: group_id.to_string(),
    }
}
