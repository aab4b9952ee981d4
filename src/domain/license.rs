//! Licenses attached to every published node.
//!
//! A single `License` value is built from configuration at startup and
//! handed to the builder; nodes carry their own copy.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// License identifiers understood by the publishing platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LicenseKind {
    #[serde(rename = "CC BY", alias = "cc_by")]
    CcBy,

    #[serde(rename = "CC BY-SA", alias = "cc_by_sa")]
    CcBySa,

    #[serde(rename = "CC BY-ND", alias = "cc_by_nd")]
    CcByNd,

    #[serde(rename = "CC BY-NC", alias = "cc_by_nc")]
    CcByNc,

    #[serde(rename = "CC BY-NC-SA", alias = "cc_by_nc_sa")]
    CcByNcSa,

    #[serde(rename = "CC BY-NC-ND", alias = "cc_by_nc_nd")]
    CcByNcNd,

    #[serde(rename = "All Rights Reserved", alias = "all_rights_reserved")]
    AllRightsReserved,

    #[serde(rename = "Public Domain", alias = "public_domain")]
    PublicDomain,

    #[serde(rename = "Special Permissions", alias = "special_permissions")]
    SpecialPermissions,
}

impl std::fmt::Display for LicenseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let id = match self {
            LicenseKind::CcBy => "CC BY",
            LicenseKind::CcBySa => "CC BY-SA",
            LicenseKind::CcByNd => "CC BY-ND",
            LicenseKind::CcByNc => "CC BY-NC",
            LicenseKind::CcByNcSa => "CC BY-NC-SA",
            LicenseKind::CcByNcNd => "CC BY-NC-ND",
            LicenseKind::AllRightsReserved => "All Rights Reserved",
            LicenseKind::PublicDomain => "Public Domain",
            LicenseKind::SpecialPermissions => "Special Permissions",
        };
        f.write_str(id)
    }
}

/// Reasons a license is rejected
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LicenseError {
    #[error("{0} license requires a copyright holder")]
    MissingCopyrightHolder(LicenseKind),

    #[error("Special Permissions license requires a description")]
    MissingDescription,
}

/// License applied to content nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    /// Platform license identifier
    pub kind: LicenseKind,

    /// Who holds the rights
    #[serde(default)]
    pub copyright_holder: String,

    /// Free-text terms (required for special permissions)
    #[serde(default)]
    pub description: String,
}

impl License {
    pub fn new(
        kind: LicenseKind,
        copyright_holder: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            copyright_holder: copyright_holder.into(),
            description: description.into(),
        }
    }

    /// Check the fields the platform requires for this kind of license
    pub fn validate(&self) -> Result<(), LicenseError> {
        if self.kind != LicenseKind::PublicDomain && self.copyright_holder.trim().is_empty() {
            return Err(LicenseError::MissingCopyrightHolder(self.kind));
        }
        if self.kind == LicenseKind::SpecialPermissions && self.description.trim().is_empty() {
            return Err(LicenseError::MissingDescription);
        }
        Ok(())
    }
}

impl Default for License {
    fn default() -> Self {
        Self::new(
            LicenseKind::SpecialPermissions,
            "AIEP",
            "Todos los derechos reservados",
        )
    }
}
