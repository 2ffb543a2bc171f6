use std::fmt;
use std::str::FromStr;

use semver::Version;

use crate::kernel::constants;

/// Version triple carried by the host and by every plugin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PluginVersion {
    pub major: u32,
    pub minor: u32,
    pub revision: u32,
}

impl PluginVersion {
    pub const fn new(major: u32, minor: u32, revision: u32) -> Self {
        Self { major, minor, revision }
    }

    /// The version of this host.
    pub const fn host() -> Self {
        Self::new(
            constants::HOST_VERSION_MAJOR,
            constants::HOST_VERSION_MINOR,
            constants::HOST_VERSION_REVISION,
        )
    }

    /// Whether a host at `host` may run a plugin at this version.
    ///
    /// A plugin built for a newer major, or the same major and a newer minor,
    /// is refused. Revisions never matter.
    pub fn is_supported_by(&self, host: &PluginVersion) -> bool {
        if self.major != host.major {
            return self.major < host.major;
        }
        self.minor <= host.minor
    }
}

impl fmt::Display for PluginVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.revision)
    }
}

impl FromStr for PluginVersion {
    type Err = semver::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Version::parse(s.trim()).map(Self::from)
    }
}

impl From<Version> for PluginVersion {
    fn from(version: Version) -> Self {
        // Components beyond u32 saturate; no real version gets there
        let clamp = |part: u64| u32::try_from(part).unwrap_or(u32::MAX);
        Self::new(clamp(version.major), clamp(version.minor), clamp(version.patch))
    }
}

impl From<PluginVersion> for Version {
    fn from(version: PluginVersion) -> Self {
        Version::new(version.major.into(), version.minor.into(), version.revision.into())
    }
}
