//! Host architecture and platform identifiers
//!
//! Cache entries are keyed by an architecture string. Two naming schemes are
//! in use on CI runners: the Go-style native names (`amd64`, `386`, `arm64`)
//! and the Node.js names reported by `os.arch()` / `os.platform()` (`x64`,
//! `x32`, `win32`). Existing caches may have been written with either, so the
//! scheme is explicit and configurable.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Naming scheme for architecture and platform identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchNaming {
    /// Node.js `os.arch()` / `os.platform()` names (x64, x32, win32)
    #[default]
    Node,
    /// Go-style native names (amd64, 386, windows)
    Native,
}

impl ArchNaming {
    /// Map a native architecture name into this scheme
    pub fn arch_name<'a>(&self, native: &'a str) -> &'a str {
        match self {
            Self::Native => native,
            Self::Node => match native {
                "386" => "x32",
                "amd64" => "x64",
                other => other,
            },
        }
    }

    /// Map a native platform name into this scheme
    pub fn platform_name<'a>(&self, native: &'a str) -> &'a str {
        match self {
            Self::Native => native,
            Self::Node => match native {
                "windows" => "win32",
                other => other,
            },
        }
    }
}

impl fmt::Display for ArchNaming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node => write!(f, "node"),
            Self::Native => write!(f, "native"),
        }
    }
}

impl FromStr for ArchNaming {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "node" | "js" | "javascript" => Ok(Self::Node),
            "native" => Ok(Self::Native),
            other => Err(format!(
                "unknown arch naming '{}'. Valid values: node, native",
                other
            )),
        }
    }
}

/// Native (Go-style) name of the host architecture
pub fn native_arch() -> &'static str {
    match std::env::consts::ARCH {
        "x86_64" => "amd64",
        "x86" => "386",
        "aarch64" => "arm64",
        "powerpc64" => "ppc64",
        "loongarch64" => "loong64",
        other => other,
    }
}

/// Native (Go-style) name of the host operating system
pub fn native_platform() -> &'static str {
    match std::env::consts::OS {
        "macos" => "darwin",
        other => other,
    }
}

/// Host architecture in the given naming scheme
pub fn host_arch(naming: ArchNaming) -> &'static str {
    naming.arch_name(native_arch())
}

/// Host platform in the given naming scheme
pub fn host_platform(naming: ArchNaming) -> &'static str {
    naming.platform_name(native_platform())
}
