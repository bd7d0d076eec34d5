use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LocationAuthorizationStatus {
    #[default]
    NotDetermined,
    Restricted,
    Denied,
    AuthorizedAlways,
    AuthorizedWhenInUse,
}

impl LocationAuthorizationStatus {
    /// Geofenced reminders are only armed under foreground ("when in use") access.
    pub fn permits_location_reminders(self) -> bool {
        self == LocationAuthorizationStatus::AuthorizedWhenInUse
    }
}

impl std::str::FromStr for LocationAuthorizationStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "not_determined" => Ok(Self::NotDetermined),
            "restricted" => Ok(Self::Restricted),
            "denied" => Ok(Self::Denied),
            "always" | "authorized_always" => Ok(Self::AuthorizedAlways),
            "when_in_use" | "authorized_when_in_use" => Ok(Self::AuthorizedWhenInUse),
            other => Err(anyhow::anyhow!("unknown location authorization `{other}`")),
        }
    }
}

/// Source of the app's current location authorization.
pub trait LocationAuthorization: Send + Sync {
    fn status(&self) -> LocationAuthorizationStatus;
}

/// Authorization held in memory and updated by whoever observes the platform's changes.
#[derive(Debug, Default)]
pub struct LocationPermission {
    status: RwLock<LocationAuthorizationStatus>,
}

impl LocationPermission {
    pub fn new(status: LocationAuthorizationStatus) -> Self {
        Self {
            status: RwLock::new(status),
        }
    }

    pub fn set(&self, status: LocationAuthorizationStatus) {
        *self.status.write() = status;
    }
}

impl LocationAuthorization for LocationPermission {
    fn status(&self) -> LocationAuthorizationStatus {
        *self.status.read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_when_in_use_permits_geofences() {
        use LocationAuthorizationStatus::*;
        for status in [NotDetermined, Restricted, Denied, AuthorizedAlways] {
            assert!(!status.permits_location_reminders(), "{status:?}");
        }
        assert!(AuthorizedWhenInUse.permits_location_reminders());
    }

    #[test]
    fn parses_env_style_values() {
        assert_eq!(
            "when-in-use".parse::<LocationAuthorizationStatus>().unwrap(),
            LocationAuthorizationStatus::AuthorizedWhenInUse
        );
        assert_eq!(
            " Denied ".parse::<LocationAuthorizationStatus>().unwrap(),
            LocationAuthorizationStatus::Denied
        );
        assert!("sometimes".parse::<LocationAuthorizationStatus>().is_err());
    }

    #[test]
    fn permission_can_change_at_runtime() {
        let permission = LocationPermission::default();
        assert_eq!(permission.status(), LocationAuthorizationStatus::NotDetermined);
        permission.set(LocationAuthorizationStatus::AuthorizedWhenInUse);
        assert!(permission.status().permits_location_reminders());
    }
}
