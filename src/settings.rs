//! Persisted engine settings, including migration of the legacy
//! single-vault form.

use crate::error::Result;
use crate::vault::VaultConfig;
use serde::{Deserialize, Serialize};

/// How note deletion is carried out by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeleteMethod {
    #[serde(rename = "moveToTrash")]
    MoveToTrash,
    #[serde(rename = "deletePermanently")]
    DeletePermanently,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Pre-multi-vault root path. Read for migration, never written back.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vault_path: Option<String>,
    pub vault_list: Vec<VaultConfig>,
    #[serde(rename = "autoGenerateFrontmatter")]
    pub auto_generate_front_matter: bool,
    pub auto_reveal: bool,
    pub custom_resolver: bool,
    pub custom_graph: bool,
    pub delete_method: DeleteMethod,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            vault_path: None,
            vault_list: vec![VaultConfig {
                name: "root".to_string(),
                path: "/".to_string(),
            }],
            auto_generate_front_matter: true,
            auto_reveal: true,
            custom_resolver: false,
            custom_graph: false,
            delete_method: DeleteMethod::MoveToTrash,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Promote a legacy `vault_path` into a one-element vault list. The
    /// vault is named after the path's final component, falling back to
    /// `"root"` for the top-level path. Returns whether anything changed.
    pub fn migrate(&mut self) -> bool {
        let Some(path) = self.vault_path.take() else {
            return false;
        };
        let name = path
            .trim_matches('/')
            .rsplit('/')
            .next()
            .filter(|segment| !segment.is_empty())
            .unwrap_or("root");
        self.vault_list = vec![VaultConfig {
            name: name.to_string(),
            path,
        }];
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults() {
        let settings = Settings::default();
        assert_eq!(settings.vault_list.len(), 1);
        assert_eq!(settings.vault_list[0].name, "root");
        assert_eq!(settings.vault_list[0].path, "/");
        assert!(settings.auto_generate_front_matter);
        assert!(settings.auto_reveal);
        assert!(!settings.custom_resolver);
        assert!(!settings.custom_graph);
        assert_eq!(settings.delete_method, DeleteMethod::MoveToTrash);
    }

    #[test]
    fn empty_object_deserializes_to_defaults() {
        let settings = Settings::from_json("{}").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn field_names_are_stable() {
        let settings = Settings::from_json(
            r#"{
                "vaultList": [{ "name": "work", "path": "notes/work" }],
                "autoGenerateFrontmatter": false,
                "autoReveal": false,
                "customResolver": true,
                "customGraph": true,
                "deleteMethod": "deletePermanently"
            }"#,
        )
        .unwrap();
        assert_eq!(settings.vault_list[0].name, "work");
        assert!(!settings.auto_generate_front_matter);
        assert!(!settings.auto_reveal);
        assert!(settings.custom_resolver);
        assert!(settings.custom_graph);
        assert_eq!(settings.delete_method, DeleteMethod::DeletePermanently);

        let json = settings.to_json().unwrap();
        assert!(json.contains("\"autoGenerateFrontmatter\""));
        assert!(json.contains("\"deletePermanently\""));
        assert!(!json.contains("vaultPath"));
    }

    #[test]
    fn migrate_legacy_vault_path() {
        let mut settings = Settings::from_json(r#"{ "vaultPath": "notes/work" }"#).unwrap();
        assert!(settings.migrate());
        assert!(settings.vault_path.is_none());
        assert_eq!(
            settings.vault_list,
            vec![VaultConfig {
                name: "work".to_string(),
                path: "notes/work".to_string(),
            }]
        );
        // second migration is a no-op
        assert!(!settings.migrate());
    }

    #[test]
    fn migrate_top_level_path_names_vault_root() {
        let mut settings = Settings::default();
        settings.vault_path = Some("/".to_string());
        assert!(settings.migrate());
        assert_eq!(settings.vault_list[0].name, "root");
        assert_eq!(settings.vault_list[0].path, "/");
    }
}
