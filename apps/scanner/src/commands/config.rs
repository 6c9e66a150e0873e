//! # Config Commands

use tracing::debug;

use crate::state::ConfigState;

/// Gets the current scanner configuration.
///
/// ## When Used
/// - Startup (benchmark for the progress ring label)
/// - Settings screen (database and export locations)
pub fn get_config(config: &ConfigState) -> ConfigState {
    debug!("get_config command");
    config.clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_config_serializes_camel_case() {
        let json = serde_json::to_value(get_config(&ConfigState::default())).unwrap();
        assert_eq!(json["benchmarkPoints"], 50);
        assert_eq!(json["savedBillsPageSize"], 20);
    }
}
