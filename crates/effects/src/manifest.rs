//! TOML manifest schema for on-disk effects.
//!
//! A manifest names the effect, points at its fragment body file, and lists
//! the optional uniforms the body consumes:
//!
//! ```toml
//! name = "swirl"
//! description = "rotates samples around the pointer"
//! fragment = "swirl.frag"
//! uniforms = ["time", "pointer"]
//! ```
//!
//! The fragment path is resolved relative to the manifest file, and
//! `validate` returns human-readable issues so loaders can surface
//! misconfigurations without panicking.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{EffectDescriptor, UniformUsage};

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse effect manifest: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid effect manifest: {0}")]
    Invalid(String),
}

/// Optional uniforms a manifest may declare for its fragment body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UniformName {
    Time,
    Pointer,
    PixelRatio,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EffectManifest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub fragment: PathBuf,
    #[serde(default)]
    pub uniforms: Vec<UniformName>,
}

impl EffectManifest {
    pub fn from_toml_str(input: &str) -> Result<Self, ManifestError> {
        let manifest: EffectManifest = toml::from_str(input)?;
        let issues = manifest.validate();
        if !issues.is_empty() {
            return Err(ManifestError::Invalid(issues.join("; ")));
        }
        Ok(manifest)
    }

    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if self.name.trim().is_empty() {
            issues.push("manifest must declare a non-empty name".to_string());
        }
        if self.fragment.as_os_str().is_empty() {
            issues.push("manifest must point at a fragment file".to_string());
        }
        issues
    }

    /// Reads the manifest at `path` and materialises its effect descriptor,
    /// loading the fragment body relative to the manifest's directory.
    pub fn load(path: &Path) -> Result<EffectDescriptor, ManifestError> {
        let raw = fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let manifest = Self::from_toml_str(&raw)?;

        let fragment_path = if manifest.fragment.is_absolute() {
            manifest.fragment.clone()
        } else {
            path.parent()
                .unwrap_or_else(|| Path::new("."))
                .join(&manifest.fragment)
        };
        let body = fs::read_to_string(&fragment_path).map_err(|source| ManifestError::Io {
            path: fragment_path.clone(),
            source,
        })?;

        Ok(EffectDescriptor::from_parts(
            manifest.name.clone(),
            body,
            manifest.uniform_usage(),
        ))
    }

    pub fn uniform_usage(&self) -> UniformUsage {
        let mut usage = UniformUsage::default();
        for uniform in &self.uniforms {
            match uniform {
                UniformName::Time => usage.time = true,
                UniformName::Pointer => usage.pointer = true,
                UniformName::PixelRatio => usage.pixel_ratio = true,
            }
        }
        usage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"
name = "swirl"
description = "rotates samples around the pointer"
fragment = "swirl.frag"
uniforms = ["time", "pointer"]
"#;

    #[test]
    fn parses_manifest_with_uniform_list() {
        let manifest = EffectManifest::from_toml_str(MANIFEST).unwrap();
        assert_eq!(manifest.name, "swirl");
        assert_eq!(manifest.fragment, PathBuf::from("swirl.frag"));
        let usage = manifest.uniform_usage();
        assert!(usage.time && usage.pointer && !usage.pixel_ratio);
    }

    #[test]
    fn empty_name_is_invalid() {
        let err = EffectManifest::from_toml_str(
            r#"
name = ""
fragment = "f.frag"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ManifestError::Invalid(_)));
    }

    #[test]
    fn unknown_uniform_name_fails_to_parse() {
        let err = EffectManifest::from_toml_str(
            r#"
name = "x"
fragment = "f.frag"
uniforms = ["date"]
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ManifestError::Parse(_)));
    }

    #[test]
    fn load_resolves_fragment_relative_to_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let manifest_path = dir.path().join("swirl.toml");
        fs::write(&manifest_path, MANIFEST).unwrap();
        fs::write(
            dir.path().join("swirl.frag"),
            "vec4 effect_color(vec2 uv) { return texture(u_image, uv + u_pointer / u_resolution * sin(u_time)); }\n",
        )
        .unwrap();

        let effect = EffectManifest::load(&manifest_path).unwrap();
        assert_eq!(effect.name(), "swirl");
        assert!(effect.validate().is_empty());
    }

    #[test]
    fn load_reports_missing_fragment_file() {
        let dir = tempfile::tempdir().unwrap();
        let manifest_path = dir.path().join("swirl.toml");
        fs::write(&manifest_path, MANIFEST).unwrap();

        let err = EffectManifest::load(&manifest_path).unwrap_err();
        assert!(matches!(err, ManifestError::Io { .. }));
    }
}
