use tracing::debug;
use wildlink_types::{AvatarCatalog, DownloadSettingsResponse, GlobalSettings};

/// Server settings cached by content hash.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Settings {
    hash: String,
    global: Option<GlobalSettings>,
}

impl Settings {
    /// Hash of the cached settings, empty before the first download.
    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn global(&self) -> Option<&GlobalSettings> {
        self.global.as_ref()
    }

    /// Catalog used for avatar generation.
    pub fn avatar_catalog(&self) -> AvatarCatalog {
        self.global
            .as_ref()
            .map(|global| global.avatar_catalog)
            .unwrap_or_default()
    }

    /// Apply a settings download. The server omits the body when our hash is
    /// current. Returns true if the cache changed.
    pub(crate) fn update(&mut self, response: &DownloadSettingsResponse) -> bool {
        let Some(global) = &response.settings else {
            return false;
        };
        debug!(hash = %response.hash, "settings updated");
        self.hash = response.hash.clone();
        self.global = Some(global.clone());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_falls_back_to_default() {
        let settings = Settings::default();
        assert_eq!(settings.hash(), "");
        assert_eq!(settings.avatar_catalog(), AvatarCatalog::default());
    }

    #[test]
    fn test_update_requires_body() {
        let mut settings = Settings::default();
        let catalog = AvatarCatalog {
            skins: 1,
            ..Default::default()
        };
        assert!(settings.update(&DownloadSettingsResponse {
            hash: "v1".to_string(),
            settings: Some(GlobalSettings {
                minimum_client_version: "0.31.0".to_string(),
                avatar_catalog: catalog,
            }),
        }));
        assert!(!settings.update(&DownloadSettingsResponse {
            hash: "v1".to_string(),
            settings: None,
        }));
        assert_eq!(settings.hash(), "v1");
        assert_eq!(settings.avatar_catalog().skins, 1);
    }
}
