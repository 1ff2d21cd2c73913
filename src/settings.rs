//! Versions and URL templates, with an optional TOML override file.
//!
//! ```toml
//! [prebuilt]
//! version = "0.0.0"
//! url = "https://woz.io/mayflower/{version}/toolchain/{host}/{triplet}.tar.xz"
//!
//! [crosstool]
//! version = "1.25.0"
//! url = "http://crosstool-ng.org/download/crosstool-ng/crosstool-ng-{version}.tar.xz"
//! ```
//!
//! Every key is optional; missing keys keep the built-in default.

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{Result, ToolchainError};

pub const CROSSTOOL_VERSION: &str = "1.25.0";
/// crosstool-ng also publishes `.tar.bz2`; the `.tar.xz` release is used so
/// the default unpacks in-process. A `.tar.bz2` override goes through the
/// host `tar`.
pub const CROSSTOOL_URL: &str =
    "http://crosstool-ng.org/download/crosstool-ng/crosstool-ng-{version}.tar.xz";
pub const PREBUILT_VERSION: &str = "0.0.0";
pub const PREBUILT_URL: &str =
    "https://woz.io/mayflower/{version}/toolchain/{host}/{triplet}.tar.xz";

/// File name looked up in the toolchain root when no `--config` is given.
pub const SETTINGS_FILENAME: &str = "toolchain.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub crosstool_version: String,
    pub crosstool_url: String,
    pub prebuilt_version: String,
    pub prebuilt_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            crosstool_version: CROSSTOOL_VERSION.to_string(),
            crosstool_url: CROSSTOOL_URL.to_string(),
            prebuilt_version: PREBUILT_VERSION.to_string(),
            prebuilt_url: PREBUILT_URL.to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsToml {
    prebuilt: Option<SourceToml>,
    crosstool: Option<SourceToml>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SourceToml {
    version: Option<String>,
    url: Option<String>,
}

impl Settings {
    /// Load settings from `path`, layering its values over the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| ToolchainError::Settings {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::parse(&text).map_err(|message| ToolchainError::Settings {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Load `path` if it exists, otherwise return the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.is_file() {
            log::debug!("loading toolchain settings from {}", path.display());
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    fn parse(text: &str) -> std::result::Result<Self, String> {
        let parsed: SettingsToml = toml::from_str(text).map_err(|e| e.to_string())?;
        let mut settings = Self::default();

        if let Some(prebuilt) = parsed.prebuilt {
            if let Some(version) = prebuilt.version {
                settings.prebuilt_version = version;
            }
            if let Some(url) = prebuilt.url {
                settings.prebuilt_url = url;
            }
        }
        if let Some(crosstool) = parsed.crosstool {
            if let Some(version) = crosstool.version {
                settings.crosstool_version = version;
            }
            if let Some(url) = crosstool.url {
                settings.crosstool_url = url;
            }
        }

        // Surface bad templates at load time rather than mid-run.
        validate_template(&settings.prebuilt_url, &["version", "host", "triplet"])
            .map_err(|e| e.to_string())?;
        validate_template(&settings.crosstool_url, &["version"]).map_err(|e| e.to_string())?;
        Ok(settings)
    }

    /// URL of the crosstool-ng source archive.
    pub fn crosstool_url(&self) -> Result<String> {
        render_template(
            &self.crosstool_url,
            &[("version", self.crosstool_version.as_str())],
        )
    }

    /// URL of a prebuilt toolchain archive for `triplet` on `host`.
    pub fn prebuilt_url(&self, host: &str, triplet: &str) -> Result<String> {
        render_template(
            &self.prebuilt_url,
            &[
                ("version", self.prebuilt_version.as_str()),
                ("host", host),
                ("triplet", triplet),
            ],
        )
    }

    /// Name of the directory the crosstool-ng archive extracts to.
    pub fn crosstool_dirname(&self) -> String {
        format!("crosstool-ng-{}", self.crosstool_version)
    }
}

fn validate_template(template: &str, names: &[&str]) -> Result<()> {
    let values: Vec<(&str, &str)> = names.iter().map(|name| (*name, "")).collect();
    render_template(template, &values).map(|_| ())
}

/// Substitute `{name}` placeholders. Unknown placeholders are an error;
/// `{{` and `}}` are literal braces.
pub fn render_template(template: &str, values: &[(&str, &str)]) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find(['{', '}']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if let Some(after) = tail.strip_prefix("{{") {
            out.push('{');
            rest = after;
            continue;
        }
        if let Some(after) = tail.strip_prefix("}}") {
            out.push('}');
            rest = after;
            continue;
        }
        if tail.starts_with('}') {
            return Err(ToolchainError::Template {
                template: template.to_string(),
                placeholder: String::new(),
            });
        }

        let Some(end) = tail.find('}') else {
            return Err(ToolchainError::Template {
                template: template.to_string(),
                placeholder: tail[1..].to_string(),
            });
        };
        let name = &tail[1..end];
        let Some((_, value)) = values.iter().find(|(key, _)| *key == name) else {
            return Err(ToolchainError::Template {
                template: template.to_string(),
                placeholder: name.to_string(),
            });
        };
        out.push_str(value);
        rest = &tail[end + 1..];
    }

    out.push_str(rest);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_urls() {
        let settings = Settings::default();
        assert_eq!(
            settings.crosstool_url().unwrap(),
            "http://crosstool-ng.org/download/crosstool-ng/crosstool-ng-1.25.0.tar.xz"
        );
        assert_eq!(
            settings
                .prebuilt_url("x86_64", "riscv64-linux-gnu")
                .unwrap(),
            "https://woz.io/mayflower/0.0.0/toolchain/x86_64/riscv64-linux-gnu.tar.xz"
        );
        assert_eq!(settings.crosstool_dirname(), "crosstool-ng-1.25.0");
    }

    #[test]
    fn test_render_template_rejects_unknown_placeholder() {
        let err = render_template("https://x/{versoin}.tar", &[("version", "1")]).unwrap_err();
        match err {
            ToolchainError::Template { placeholder, .. } => assert_eq!(placeholder, "versoin"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_render_template_escapes_and_unterminated() {
        assert_eq!(
            render_template("{{literal}}-{v}", &[("v", "1")]).unwrap(),
            "{literal}-1"
        );
        assert!(render_template("https://x/{version", &[("version", "1")]).is_err());
    }

    #[test]
    fn test_load_overrides_only_given_keys() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(SETTINGS_FILENAME);
        fs::write(
            &path,
            "[crosstool]\nversion = \"1.26.0\"\n\n[prebuilt]\nurl = \"file:///mirror/{triplet}-{host}-{version}.tar.zst\"\n",
        )
        .unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.crosstool_version, "1.26.0");
        assert_eq!(settings.crosstool_url, CROSSTOOL_URL);
        assert_eq!(settings.prebuilt_version, PREBUILT_VERSION);
        assert_eq!(
            settings.prebuilt_url("aarch64", "x86_64-linux-gnu").unwrap(),
            "file:///mirror/x86_64-linux-gnu-aarch64-0.0.0.tar.zst"
        );
    }

    #[test]
    fn test_load_rejects_unknown_fields_and_bad_templates() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(SETTINGS_FILENAME);

        fs::write(&path, "[crosstool]\nrevision = \"x\"\n").unwrap();
        assert!(matches!(
            Settings::load(&path),
            Err(ToolchainError::Settings { .. })
        ));

        fs::write(&path, "[crosstool]\nurl = \"http://x/{host}.tar.xz\"\n").unwrap();
        assert!(matches!(
            Settings::load(&path),
            Err(ToolchainError::Settings { .. })
        ));
    }

    #[test]
    fn test_load_or_default_without_file() {
        let tmp = TempDir::new().unwrap();
        let settings = Settings::load_or_default(&tmp.path().join("missing.toml")).unwrap();
        assert_eq!(settings, Settings::default());
    }
}
