//! Supported package ecosystems and the analysis variant each one uses.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::AnalysisError;

/// A package-manager domain with its own manifest format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ecosystem {
    Maven,
    Npm,
    Pypi,
    Golang,
}

/// How a lifecycle talks to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionStrategy {
    /// One synchronous analysis call returning the report.
    Direct,
    /// Submit a job, then poll until it completes.
    SubmitThenPoll,
}

/// Which project-data resolution the provider runs for an ecosystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectiveVariant {
    EffectivePom,
    EffectivePackage,
    EffectivePypi,
    EffectiveGolang,
}

impl Ecosystem {
    pub const ALL: [Ecosystem; 4] = [Self::Maven, Self::Npm, Self::Pypi, Self::Golang];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Maven => "maven",
            Self::Npm => "npm",
            Self::Pypi => "pypi",
            Self::Golang => "golang",
        }
    }

    /// Manifest file name that identifies a project of this ecosystem.
    pub fn manifest_file_name(&self) -> &'static str {
        match self {
            Self::Maven => "pom.xml",
            Self::Npm => "package.json",
            Self::Pypi => "requirements.txt",
            Self::Golang => "go.mod",
        }
    }

    pub fn variant(&self) -> EffectiveVariant {
        match self {
            Self::Maven => EffectiveVariant::EffectivePom,
            Self::Npm => EffectiveVariant::EffectivePackage,
            Self::Pypi => EffectiveVariant::EffectivePypi,
            Self::Golang => EffectiveVariant::EffectiveGolang,
        }
    }

    pub fn strategy(&self) -> SubmissionStrategy {
        match self {
            Self::Maven => SubmissionStrategy::Direct,
            Self::Npm | Self::Pypi | Self::Golang => SubmissionStrategy::SubmitThenPoll,
        }
    }
}

impl fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Ecosystem {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "maven" => Ok(Self::Maven),
            "npm" => Ok(Self::Npm),
            "pypi" => Ok(Self::Pypi),
            "golang" => Ok(Self::Golang),
            _ => Err(AnalysisError::InvalidEcosystem { tag: s.to_string() }),
        }
    }
}

impl EffectiveVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EffectivePom => "EffectivePom",
            Self::EffectivePackage => "EffectivePackage",
            Self::EffectivePypi => "EffectivePypi",
            Self::EffectiveGolang => "EffectiveGolang",
        }
    }
}

impl fmt::Display for EffectiveVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
