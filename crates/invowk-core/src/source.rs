//! `SourceId` — identifies the logical container a command was
//! declared in (§3 `Source`, §4.1 qualified-name rule).

use std::cmp::Ordering;

pub const WORKSPACE_SOURCE: &str = "invowkfile";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceId {
    /// The workspace root `invowkfile.cue`. Always sorts first.
    Workspace,
    /// A `<id>.invowkmod` module, identified by its (possibly aliased)
    /// module id.
    Module(String),
}

impl SourceId {
    pub fn as_str(&self) -> &str {
        match self {
            SourceId::Workspace => WORKSPACE_SOURCE,
            SourceId::Module(id) => id,
        }
    }

    /// Normalize a user-supplied filter token: strips a leading `@`
    /// and the `.invowkmod` suffix, and recognizes `invowkfile(.cue)`
    /// as the workspace source (§4.2).
    pub fn normalize(raw: &str) -> SourceId {
        let stripped = raw.strip_prefix('@').unwrap_or(raw);
        let stripped = stripped
            .strip_suffix(".invowkmod")
            .unwrap_or(stripped);
        if stripped == WORKSPACE_SOURCE || stripped == "invowkfile.cue" {
            SourceId::Workspace
        } else {
            SourceId::Module(stripped.to_string())
        }
    }
}

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `invowkfile` always first; modules alphabetical thereafter (§3).
impl PartialOrd for SourceId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SourceId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SourceId::Workspace, SourceId::Workspace) => Ordering::Equal,
            (SourceId::Workspace, SourceId::Module(_)) => Ordering::Less,
            (SourceId::Module(_), SourceId::Workspace) => Ordering::Greater,
            (SourceId::Module(a), SourceId::Module(b)) => a.cmp(b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_at_and_suffix() {
        assert_eq!(SourceId::normalize("@mymod"), SourceId::Module("mymod".into()));
        assert_eq!(
            SourceId::normalize("mymod.invowkmod"),
            SourceId::Module("mymod".into())
        );
        assert_eq!(SourceId::normalize("@invowkfile"), SourceId::Workspace);
        assert_eq!(SourceId::normalize("invowkfile.cue"), SourceId::Workspace);
    }

    #[test]
    fn workspace_sorts_first() {
        let mut sources = vec![
            SourceId::Module("zeta".into()),
            SourceId::Workspace,
            SourceId::Module("alpha".into()),
        ];
        sources.sort();
        assert_eq!(
            sources,
            vec![
                SourceId::Workspace,
                SourceId::Module("alpha".into()),
                SourceId::Module("zeta".into())
            ]
        );
    }
}
