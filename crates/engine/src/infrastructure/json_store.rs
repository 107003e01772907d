//! JSON-file-backed rule and template storage.
//!
//! Layout under the data directory:
//! - `rules/*.json` - each file an array of rule records
//! - `templates/*.json` - each file one template
//!
//! Everything is loaded into memory on open. Saves update memory and rewrite
//! the owning file.

use std::fmt::Display;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use pathwise_domain::{FandomId, Rule, RuleId, RuleTemplate, TemplateId};
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;

use crate::infrastructure::ports::{RepoError, RuleRepo, TemplateRepo};

const RULES_DIR: &str = "rules";
const TEMPLATES_DIR: &str = "templates";

/// A loaded record and the file it is written back to.
struct Stored<T> {
    value: T,
    file: PathBuf,
}

pub struct JsonFileStore {
    root: PathBuf,
    rules: RwLock<Vec<Stored<Rule>>>,
    templates: RwLock<Vec<Stored<RuleTemplate>>>,
}

impl JsonFileStore {
    /// Load every rule and template under `root`. Missing directories are
    /// treated as empty.
    ///
    /// Records go through the same definition checks as a save, so a
    /// hand-edited file with an inconsistent rule or template fails the open.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, RepoError> {
        let root = root.into();

        let mut rules = Vec::new();
        for file in json_files(&root.join(RULES_DIR)).await? {
            let records: Vec<Rule> = read_json(&file).await?;
            for value in records {
                if let Err(problems) = value.validate_definition() {
                    return Err(invalid_record(&file, value.id(), &problems));
                }
                rules.push(Stored {
                    value,
                    file: file.clone(),
                });
            }
        }

        let mut templates = Vec::new();
        for file in json_files(&root.join(TEMPLATES_DIR)).await? {
            let value: RuleTemplate = read_json(&file).await?;
            if let Err(problems) = value.check_definition() {
                return Err(invalid_record(&file, value.id(), &problems));
            }
            templates.push(Stored { value, file });
        }

        tracing::debug!(
            root = %root.display(),
            rules = rules.len(),
            templates = templates.len(),
            "Loaded rule store"
        );

        Ok(Self {
            root,
            rules: RwLock::new(rules),
            templates: RwLock::new(templates),
        })
    }

    fn new_rule_file(&self, fandom_id: &FandomId) -> PathBuf {
        self.root
            .join(RULES_DIR)
            .join(format!("{}.json", file_stem(fandom_id.as_str())))
    }

    fn new_template_file(&self, id: &TemplateId) -> PathBuf {
        self.root
            .join(TEMPLATES_DIR)
            .join(format!("{}.json", file_stem(id.as_str())))
    }
}

#[async_trait]
impl RuleRepo for JsonFileStore {
    async fn get(&self, id: &RuleId) -> Result<Option<Rule>, RepoError> {
        let rules = self.rules.read().await;
        Ok(rules
            .iter()
            .find(|stored| stored.value.id() == id)
            .map(|stored| stored.value.clone()))
    }

    async fn list_for_fandom(&self, fandom_id: &FandomId) -> Result<Vec<Rule>, RepoError> {
        let rules = self.rules.read().await;
        Ok(rules
            .iter()
            .filter(|stored| stored.value.fandom_id() == fandom_id)
            .map(|stored| stored.value.clone())
            .collect())
    }

    async fn save(&self, rule: &Rule) -> Result<(), RepoError> {
        let mut rules = self.rules.write().await;
        let file = match rules.iter_mut().find(|stored| stored.value.id() == rule.id()) {
            Some(stored) => {
                stored.value = rule.clone();
                stored.file.clone()
            }
            None => {
                let file = self.new_rule_file(rule.fandom_id());
                rules.push(Stored {
                    value: rule.clone(),
                    file: file.clone(),
                });
                file
            }
        };

        let siblings: Vec<&Rule> = rules
            .iter()
            .filter(|stored| stored.file == file)
            .map(|stored| &stored.value)
            .collect();
        write_json(&file, &siblings).await
    }
}

#[async_trait]
impl TemplateRepo for JsonFileStore {
    async fn get(&self, id: &TemplateId) -> Result<Option<RuleTemplate>, RepoError> {
        let templates = self.templates.read().await;
        Ok(templates
            .iter()
            .find(|stored| stored.value.id() == id)
            .map(|stored| stored.value.clone()))
    }

    async fn save(&self, template: &RuleTemplate) -> Result<(), RepoError> {
        let mut templates = self.templates.write().await;
        let file = match templates
            .iter_mut()
            .find(|stored| stored.value.id() == template.id())
        {
            Some(stored) => {
                stored.value = template.clone();
                stored.file.clone()
            }
            None => {
                let file = self.new_template_file(template.id());
                templates.push(Stored {
                    value: template.clone(),
                    file: file.clone(),
                });
                file
            }
        };
        write_json(&file, template).await
    }

    async fn record_usage(&self, id: &TemplateId) -> Result<u64, RepoError> {
        let mut templates = self.templates.write().await;
        let stored = templates
            .iter_mut()
            .find(|stored| stored.value.id() == id)
            .ok_or_else(|| RepoError::not_found("Template", id))?;
        stored.value.record_usage();
        write_json(&stored.file, &stored.value).await?;
        Ok(stored.value.usage_count())
    }
}

// =============================================================================
// File helpers
// =============================================================================

/// `*.json` files in `dir`, sorted by name so load order is stable.
async fn json_files(dir: &Path) -> Result<Vec<PathBuf>, RepoError> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(RepoError::storage("read_dir", e)),
    };

    let mut files = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| RepoError::storage("read_dir", e))?
    {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

async fn read_json<T: DeserializeOwned>(file: &Path) -> Result<T, RepoError> {
    let raw = tokio::fs::read_to_string(file)
        .await
        .map_err(|e| RepoError::storage("read", e))?;
    serde_json::from_str(&raw)
        .map_err(|e| RepoError::serialization(format!("{}: {}", file.display(), e)))
}

fn invalid_record(file: &Path, id: &impl Display, problems: &[impl Display]) -> RepoError {
    let problems: Vec<String> = problems.iter().map(ToString::to_string).collect();
    tracing::error!(
        file = %file.display(),
        id = %id,
        problems = problems.len(),
        "Stored record fails its definition check"
    );
    RepoError::serialization(format!(
        "{}: '{}' is invalid: {}",
        file.display(),
        id,
        problems.join("; ")
    ))
}

/// Write through a temporary sibling so a crash never leaves half a file.
async fn write_json<T: serde::Serialize + ?Sized>(file: &Path, value: &T) -> Result<(), RepoError> {
    let body = serde_json::to_string_pretty(value).map_err(RepoError::serialization)?;
    if let Some(parent) = file.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| RepoError::storage("create_dir", e))?;
    }
    let staging = file.with_extension("json.tmp");
    tokio::fs::write(&staging, body)
        .await
        .map_err(|e| RepoError::storage("write", e))?;
    tokio::fs::rename(&staging, file)
        .await
        .map_err(|e| RepoError::storage("rename", e))
}

/// Ids are opaque strings; keep file names to a safe alphabet.
fn file_stem(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pathwise_domain::{Action, Condition, RuleName};
    use serde_json::json;

    fn rule(id: &str, fandom: &str) -> Rule {
        Rule::new(
            RuleId::new(id).unwrap(),
            RuleName::new(format!("Rule {}", id)).unwrap(),
            FandomId::new(fandom).unwrap(),
        )
        .with_condition(Condition::tag_exists("a"))
        .with_action(Action::error("x").unwrap())
    }

    fn template_json(id: &str) -> serde_json::Value {
        json!({
            "id": id,
            "name": "Forbid tag",
            "parameters": [{"name": "tag", "type": "string", "required": true}],
            "template_code": {
                "conditions": [{"type": "tag-exists", "target": "{{tag}}", "operator": "exists"}],
                "actions": [{"type": "validation-error", "message": "{{tag}} is not allowed"}],
            },
        })
    }

    mod loading {
        use super::*;

        #[tokio::test]
        async fn missing_directories_load_empty() {
            let dir = tempfile::tempdir().unwrap();
            let store = JsonFileStore::open(dir.path()).await.unwrap();
            let rules = store
                .list_for_fandom(&FandomId::new("hp").unwrap())
                .await
                .unwrap();
            assert!(rules.is_empty());
        }

        #[tokio::test]
        async fn rules_keep_file_order() {
            let dir = tempfile::tempdir().unwrap();
            let rules_dir = dir.path().join(RULES_DIR);
            std::fs::create_dir_all(&rules_dir).unwrap();
            std::fs::write(
                rules_dir.join("b.json"),
                serde_json::to_string(&[rule("b1", "hp"), rule("other", "lotr")]).unwrap(),
            )
            .unwrap();
            std::fs::write(
                rules_dir.join("a.json"),
                serde_json::to_string(&[rule("a1", "hp"), rule("a2", "hp")]).unwrap(),
            )
            .unwrap();
            std::fs::write(rules_dir.join("notes.txt"), "ignored").unwrap();

            let store = JsonFileStore::open(dir.path()).await.unwrap();
            let ids: Vec<String> = store
                .list_for_fandom(&FandomId::new("hp").unwrap())
                .await
                .unwrap()
                .iter()
                .map(|r| r.id().to_string())
                .collect();
            assert_eq!(ids, vec!["a1", "a2", "b1"]);
        }

        #[tokio::test]
        async fn unreadable_record_is_a_serialization_error() {
            let dir = tempfile::tempdir().unwrap();
            let rules_dir = dir.path().join(RULES_DIR);
            std::fs::create_dir_all(&rules_dir).unwrap();
            std::fs::write(rules_dir.join("bad.json"), r#"[{"id": "x"}]"#).unwrap();

            let result = JsonFileStore::open(dir.path()).await;
            assert!(matches!(result, Err(RepoError::Serialization(_))));
        }

        #[tokio::test]
        async fn inconsistent_template_file_is_refused() {
            let dir = tempfile::tempdir().unwrap();
            let templates_dir = dir.path().join(TEMPLATES_DIR);
            std::fs::create_dir_all(&templates_dir).unwrap();
            let mut record = template_json("tpl-edited");
            record["parameters"]
                .as_array_mut()
                .unwrap()
                .push(json!({"name": "unused", "type": "string"}));
            std::fs::write(templates_dir.join("tpl-edited.json"), record.to_string()).unwrap();

            let Err(RepoError::Serialization(message)) = JsonFileStore::open(dir.path()).await
            else {
                panic!("expected the open to fail");
            };
            assert!(message.contains("tpl-edited.json"), "{}", message);
            assert!(message.contains("'unused' is never referenced"), "{}", message);
        }

        #[tokio::test]
        async fn inconsistent_rule_file_is_refused() {
            let dir = tempfile::tempdir().unwrap();
            let rules_dir = dir.path().join(RULES_DIR);
            std::fs::create_dir_all(&rules_dir).unwrap();
            let zero_threshold = json!([{
                "id": "r-zero",
                "name": "Zero threshold",
                "fandomId": "hp",
                "weightThreshold": 0.0,
                "conditions": [{"type": "tag-exists", "target": "a", "operator": "exists"}],
                "actions": [{"type": "validation-error", "message": "x"}],
            }]);
            std::fs::write(rules_dir.join("hp.json"), zero_threshold.to_string()).unwrap();

            let Err(RepoError::Serialization(message)) = JsonFileStore::open(dir.path()).await
            else {
                panic!("expected the open to fail");
            };
            assert!(message.contains("r-zero"), "{}", message);
            assert!(message.contains("weight threshold"), "{}", message);
        }
    }

    mod saving {
        use super::*;

        #[tokio::test]
        async fn saved_rule_survives_reopen() {
            let dir = tempfile::tempdir().unwrap();
            let store = JsonFileStore::open(dir.path()).await.unwrap();
            RuleRepo::save(&store, &rule("r1", "hp")).await.unwrap();
            RuleRepo::save(&store, &rule("r1", "hp").with_priority(9))
                .await
                .unwrap();

            assert!(dir.path().join(RULES_DIR).join("hp.json").exists());

            let reopened = JsonFileStore::open(dir.path()).await.unwrap();
            let rules = reopened
                .list_for_fandom(&FandomId::new("hp").unwrap())
                .await
                .unwrap();
            assert_eq!(rules.len(), 1);
            assert_eq!(rules[0].priority(), 9);
        }

        #[tokio::test]
        async fn usage_is_recorded_on_disk() {
            let dir = tempfile::tempdir().unwrap();
            let store = JsonFileStore::open(dir.path()).await.unwrap();
            let template: RuleTemplate = serde_json::from_value(template_json("tpl/1")).unwrap();
            TemplateRepo::save(&store, &template).await.unwrap();

            let id = TemplateId::new("tpl/1").unwrap();
            assert_eq!(store.record_usage(&id).await.unwrap(), 1);
            assert_eq!(store.record_usage(&id).await.unwrap(), 2);
            assert!(dir.path().join(TEMPLATES_DIR).join("tpl_1.json").exists());

            let reopened = JsonFileStore::open(dir.path()).await.unwrap();
            let loaded = TemplateRepo::get(&reopened, &id).await.unwrap().unwrap();
            assert_eq!(loaded.usage_count(), 2);
        }

        #[tokio::test]
        async fn usage_of_unknown_template_is_not_found() {
            let dir = tempfile::tempdir().unwrap();
            let store = JsonFileStore::open(dir.path()).await.unwrap();
            let err = store
                .record_usage(&TemplateId::new("missing").unwrap())
                .await
                .unwrap_err();
            assert!(err.is_not_found());
        }
    }
}
