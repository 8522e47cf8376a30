//! Device groups — named bulk actions over every device of some kinds.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::device::DeviceKind;
use crate::error::NotFoundError;

/// A bulk on/off action applied to every matching device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceGroup {
    /// Switch every light on.
    LightsOn,
    /// Switch every light off.
    LightsOff,
    /// Lock every door and switch every camera on.
    MaximumSecurity,
    /// Switch every device off.
    AllOff,
}

impl DeviceGroup {
    pub const ALL: [Self; 4] = [
        Self::LightsOn,
        Self::LightsOff,
        Self::MaximumSecurity,
        Self::AllOff,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LightsOn => "lights_on",
            Self::LightsOff => "lights_off",
            Self::MaximumSecurity => "maximum_security",
            Self::AllOff => "all_off",
        }
    }

    /// Whether devices of `kind` are part of this group.
    #[must_use]
    pub const fn includes(self, kind: DeviceKind) -> bool {
        match self {
            Self::LightsOn | Self::LightsOff => kind.is_light(),
            Self::MaximumSecurity => matches!(kind, DeviceKind::DoorLock | DeviceKind::Camera),
            Self::AllOff => true,
        }
    }

    /// The status every member ends up with.
    #[must_use]
    pub const fn target_status(self) -> bool {
        matches!(self, Self::LightsOn | Self::MaximumSecurity)
    }
}

impl std::fmt::Display for DeviceGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceGroup {
    type Err = NotFoundError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|group| group.as_str() == s)
            .ok_or_else(|| NotFoundError {
                entity: "Group",
                id: s.to_string(),
            })
    }
}
