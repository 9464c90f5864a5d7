//! Namespace layout: every object of a namespace lives at
//! `{prefix}/{identifier}/{file}`.

use crate::identifier::Identifier;
use serde::Serialize;

/// Canonical object whose conditional creation reserves the namespace.
pub const MARKER_FILE: &str = ".namespace";

/// Kinds of default content written on first use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    Tasks,
    Ideas,
    Notes,
}

impl FileKind {
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Tasks => "tasks.json",
            Self::Ideas => "ideas.json",
            Self::Notes => "notes.json",
        }
    }

    pub fn from_file_name(name: &str) -> Option<Self> {
        DEFAULT_FILES
            .iter()
            .copied()
            .find(|kind| kind.file_name() == name)
    }
}

/// Ordered default file set. Order drives `files_created` reporting.
pub const DEFAULT_FILES: [FileKind; 3] = [FileKind::Tasks, FileKind::Ideas, FileKind::Notes];

/// Storage paths derived from one identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    identifier: Identifier,
    root: String,
}

impl Namespace {
    pub fn new(prefix: &str, identifier: Identifier) -> Self {
        let root = format!("{prefix}/{identifier}");
        Self { identifier, root }
    }

    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    pub fn marker_path(&self) -> String {
        self.path_of(MARKER_FILE)
    }

    pub fn file_path(&self, kind: FileKind) -> String {
        self.path_of(kind.file_name())
    }

    fn path_of(&self, file: &str) -> String {
        format!("{}/{file}", self.root)
    }
}
