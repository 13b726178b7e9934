//! Explicit session context handed to surfaces at open time.
//!
//! The legacy web client kept three string flags in browser storage; [SessionFlags]
//! reads and writes that shape so existing stores can still be bridged.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const FLAG_AUTHENTICATED: &str = "isAuthenticated";
pub const FLAG_USER_TYPE: &str = "userType";
pub const FLAG_USER_NAME: &str = "userName";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    #[default]
    Rider,
    Driver,
    Admin,
}

impl UserType {
    pub fn as_str(self) -> &'static str {
        match self {
            UserType::Rider => "rider",
            UserType::Driver => "driver",
            UserType::Admin => "admin",
        }
    }

    fn default_display_name(self) -> &'static str {
        match self {
            UserType::Driver => "Driver User",
            UserType::Rider | UserType::Admin => "Guest User",
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rider" => Ok(UserType::Rider),
            "driver" => Ok(UserType::Driver),
            "admin" => Ok(UserType::Admin),
            _ => Err(()),
        }
    }
}

/// Flat key/value flags as stored by the legacy client.
pub type SessionFlags = HashMap<String, String>;

/// A logged-in user. Created at login, dropped at logout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_type: UserType,
    pub display_name: String,
}

impl Session {
    pub fn new(user_type: UserType, display_name: impl Into<String>) -> Self {
        Self {
            user_type,
            display_name: display_name.into(),
        }
    }

    /// The one-click demo driver account.
    pub fn driver_demo() -> Self {
        Self::new(UserType::Driver, "Driver Demo")
    }

    /// `None` unless the authenticated flag is exactly `"true"`. An unknown or
    /// missing user type is treated as a rider.
    pub fn from_flags(flags: &SessionFlags) -> Option<Self> {
        if flags.get(FLAG_AUTHENTICATED).map(String::as_str) != Some("true") {
            return None;
        }
        let user_type = flags
            .get(FLAG_USER_TYPE)
            .and_then(|raw| raw.parse::<UserType>().ok())
            .unwrap_or_default();
        let display_name = flags
            .get(FLAG_USER_NAME)
            .cloned()
            .unwrap_or_else(|| user_type.default_display_name().to_owned());
        Some(Self {
            user_type,
            display_name,
        })
    }

    pub fn to_flags(&self) -> SessionFlags {
        SessionFlags::from([
            (FLAG_AUTHENTICATED.to_owned(), "true".to_owned()),
            (FLAG_USER_TYPE.to_owned(), self.user_type.as_str().to_owned()),
            (FLAG_USER_NAME.to_owned(), self.display_name.clone()),
        ])
    }

    pub fn is_driver(&self) -> bool {
        self.user_type == UserType::Driver
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags(pairs: &[(&str, &str)]) -> SessionFlags {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn unauthenticated_flags_yield_no_session() {
        assert_eq!(Session::from_flags(&SessionFlags::new()), None);
        assert_eq!(
            Session::from_flags(&flags(&[(FLAG_AUTHENTICATED, "yes")])),
            None
        );
    }

    #[test]
    fn missing_fields_fall_back_to_rider_defaults() {
        let session = Session::from_flags(&flags(&[(FLAG_AUTHENTICATED, "true")])).expect("session");
        assert_eq!(session.user_type, UserType::Rider);
        assert_eq!(session.display_name, "Guest User");

        let session = Session::from_flags(&flags(&[
            (FLAG_AUTHENTICATED, "true"),
            (FLAG_USER_TYPE, "superuser"),
        ]))
        .expect("session");
        assert_eq!(session.user_type, UserType::Rider);
    }

    #[test]
    fn parsed_user_type_picks_the_default_name() {
        let driver = Session::from_flags(&flags(&[
            (FLAG_AUTHENTICATED, "true"),
            (FLAG_USER_TYPE, "driver"),
        ]))
        .expect("session");
        assert_eq!(driver.user_type, UserType::Driver);
        assert_eq!(driver.display_name, "Driver User");

        let admin = Session::from_flags(&flags(&[
            (FLAG_AUTHENTICATED, "true"),
            (FLAG_USER_TYPE, "admin"),
        ]))
        .expect("session");
        assert_eq!(admin.user_type, UserType::Admin);
        assert_eq!(admin.display_name, "Guest User");
    }

    #[test]
    fn driver_demo_survives_the_flag_store() {
        let demo = Session::driver_demo();
        let restored = Session::from_flags(&demo.to_flags()).expect("session");
        assert_eq!(restored, demo);
        assert!(restored.is_driver());
    }
}
