//! Site settings store - the owner-edited singleton document.

use super::error::VaultResult;
use super::models::{SiteSettings, TAGLINE_SLOTS};
use super::{Store, SITE_SETTINGS_KEY};

impl Store {
    /// The settings singleton, normalized for callers: `taglines` always has
    /// exactly [`TAGLINE_SLOTS`] entries (padded with empty strings or
    /// truncated), and the other sequences default to empty. A missing or
    /// unreadable document yields the same normalized empty shape.
    pub async fn get_site_settings(&self) -> SiteSettings {
        let mut settings: SiteSettings = self.load(SITE_SETTINGS_KEY).unwrap_or_default();
        settings.taglines.resize(TAGLINE_SLOTS, String::new());
        settings
    }

    /// Full replace of the singleton. Icon identifiers were validated at
    /// decode time; nothing else is normalized on the way in.
    pub async fn update_site_settings(&self, settings: &SiteSettings) -> VaultResult<()> {
        let _guard = self.lock();
        self.save(SITE_SETTINGS_KEY, settings)
    }
}
