//! Process-wide form options.
//!
//! Forms read their reporting options from here rather than threading
//! [`FormSettings`] through every constructor. Call [`configure`] once at
//! startup with the loaded settings; until then the defaults apply.

use std::sync::{OnceLock, PoisonError, RwLock};

use formwork_core::settings::FormSettings;

fn global_form_settings() -> &'static RwLock<FormSettings> {
    static FORM_SETTINGS: OnceLock<RwLock<FormSettings>> = OnceLock::new();
    FORM_SETTINGS.get_or_init(|| RwLock::new(FormSettings::default()))
}

/// Replaces the process-wide form options.
pub fn configure(settings: &FormSettings) {
    let mut current = global_form_settings()
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    *current = settings.clone();
}

/// Returns a copy of the current form options.
pub fn current() -> FormSettings {
    global_form_settings()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// The error code filed on a parent form when an associated form is invalid.
pub fn association_error_code() -> String {
    current().association_error_code
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_until_configured() {
        // Other tests in this binary never reconfigure, so the default holds.
        assert_eq!(association_error_code(), "association_error");
        assert_eq!(current(), FormSettings::default());
    }
}
