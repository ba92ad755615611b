// actions/mod.rs
mod dispatcher;
pub use dispatcher::{ActionDispatcher, ActionRunner, DispatchHandle, Invocation};

use crate::{config::ActionRecord, models::ActionView};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionKind {
    Script,
    Other(String),
}

impl ActionKind {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "script" => ActionKind::Script,
            other => ActionKind::Other(other.to_string()),
        }
    }

    pub fn type_name(&self) -> &str {
        match self {
            ActionKind::Script => "script",
            ActionKind::Other(name) => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionDevice {
    pub name: String,
    pub kind: ActionKind,
    /// Relative to the scripts directory.
    pub path: String,
}

impl ActionDevice {
    pub fn from_record(record: &ActionRecord) -> Self {
        Self {
            name: record.name.clone(),
            kind: ActionKind::parse(&record.kind),
            path: record.path.clone(),
        }
    }

    pub fn view(&self) -> ActionView {
        ActionView {
            name: self.name.clone(),
            kind: self.kind.type_name().to_string(),
            path: self.path.clone(),
        }
    }
}

#[derive(Debug, Default)]
pub struct ActionRegistry {
    actions: Vec<ActionDevice>,
}

impl ActionRegistry {
    pub fn from_records(records: &[ActionRecord]) -> Self {
        Self {
            actions: records.iter().map(ActionDevice::from_record).collect(),
        }
    }

    pub fn find(&self, name: &str) -> Option<&ActionDevice> {
        self.actions.iter().find(|action| action.name == name)
    }

    pub fn snapshot(&self) -> Vec<ActionView> {
        self.actions.iter().map(ActionDevice::view).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> ActionRegistry {
        ActionRegistry::from_records(&[
            ActionRecord {
                name: "run".into(),
                kind: "script".into(),
                path: "start.sh".into(),
            },
            ActionRecord {
                name: "Notify".into(),
                kind: "webhook".into(),
                path: "hook".into(),
            },
        ])
    }

    #[test]
    fn lookup_is_exact_and_case_sensitive() {
        let registry = registry();
        assert_eq!(registry.find("run").unwrap().kind, ActionKind::Script);
        assert!(registry.find("Run").is_none());
        assert!(registry.find("notify").is_none());
        assert_eq!(
            registry.find("Notify").unwrap().kind,
            ActionKind::Other("webhook".into())
        );
    }

    #[test]
    fn snapshot_keeps_catalog_order() {
        let names: Vec<_> = registry().snapshot().into_iter().map(|a| a.name).collect();
        assert_eq!(names, ["run", "Notify"]);
    }
}
