//! Owner wizard: step sequencing over the active flow and URL sync.

pub mod navigation;
pub mod url;

pub use navigation::{ModeFlags, NavigationError, NavigationSnapshot, WizardSession};
pub use url::{
    property_info_from_url, url_for_step, PropertyUrlInfo, UrlError, WizardMode, WizardPaths,
};
