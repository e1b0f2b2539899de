//! Equality oracle: is a remote object already what the local description says?

use bookie_core::{exists_remotely, NameSet, RemoteRef};

use crate::ledger::RemoteObjectView;

/// The local content equality is decided on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalView<'a> {
    pub names: &'a NameSet,
    /// Compared only when present.
    pub season: Option<&'a NameSet>,
    /// Compared only when present.
    pub rules: Option<RemoteRef>,
    /// Ledger id of the local parent, if it exists remotely.
    pub parent: Option<RemoteRef>,
}

impl<'a> LocalView<'a> {
    pub fn new(names: &'a NameSet) -> Self {
        Self {
            names,
            season: None,
            rules: None,
            parent: None,
        }
    }
}

/// `true` iff `remote` (committed content or a pending update, whichever is
/// presented) carries the same content as `local`.
///
/// - names must match in both directions;
/// - season and rules are compared only if the local side has one;
/// - a remote parent that is absent or pending is not compared.
pub fn is_synchronized(local: &LocalView<'_>, remote: Option<&RemoteObjectView>) -> bool {
    let Some(remote) = remote else {
        return false;
    };
    let fields = remote.fields();

    if !local.names.matches(&fields.name) {
        return false;
    }
    if let Some(season) = local.season {
        if !fields.season.as_ref().is_some_and(|s| s.matches(season)) {
            return false;
        }
    }
    if let Some(rules) = local.rules {
        if fields.rules != Some(rules) {
            return false;
        }
    }
    if exists_remotely(fields.parent.as_ref()) && fields.parent != local.parent {
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::RemoteFields;

    fn names(en: &str) -> NameSet {
        NameSet::new().with("en", en)
    }

    fn fields(name: NameSet) -> RemoteFields {
        RemoteFields {
            id: RemoteRef::new(1, 22, 5),
            name,
            season: None,
            rules: None,
            parent: None,
        }
    }

    #[test]
    fn absent_remote_is_never_synchronized() {
        let local = names("Lions vs Bears");
        assert!(!is_synchronized(&LocalView::new(&local), None));
    }

    #[test]
    fn committed_and_pending_shapes_compare_the_same_way() {
        let local = names("Lions vs Bears");
        let view = LocalView::new(&local);
        let committed = RemoteObjectView::Committed(fields(names("Lions vs Bears")));
        let pending = RemoteObjectView::PendingUpdate(fields(names("Lions vs Bears")));
        assert!(is_synchronized(&view, Some(&committed)));
        assert!(is_synchronized(&view, Some(&pending)));
    }

    #[test]
    fn name_comparison_is_symmetric() {
        let small = names("Lions vs Bears");
        let large = names("Lions vs Bears").with("de", "Lions gegen Bears");
        let remote_large = RemoteObjectView::Committed(fields(large.clone()));
        let remote_small = RemoteObjectView::Committed(fields(small.clone()));
        assert!(!is_synchronized(&LocalView::new(&small), Some(&remote_large)));
        assert!(!is_synchronized(&LocalView::new(&large), Some(&remote_small)));
    }

    #[test]
    fn season_only_checked_when_supplied() {
        let local = names("Lions vs Bears");
        let season = NameSet::new().with("en", "2024");
        let remote = RemoteObjectView::Committed(RemoteFields {
            season: Some(NameSet::new().with("en", "2023")),
            ..fields(names("Lions vs Bears"))
        });
        assert!(is_synchronized(&LocalView::new(&local), Some(&remote)));

        let with_season = LocalView {
            season: Some(&season),
            ..LocalView::new(&local)
        };
        assert!(!is_synchronized(&with_season, Some(&remote)));
    }

    #[test]
    fn rules_only_checked_when_supplied() {
        let local = names("Moneyline");
        let remote = RemoteObjectView::Committed(RemoteFields {
            rules: Some(RemoteRef::new(1, 19, 3)),
            ..fields(names("Moneyline"))
        });
        assert!(is_synchronized(&LocalView::new(&local), Some(&remote)));

        let other_rules = LocalView {
            rules: Some(RemoteRef::new(1, 19, 4)),
            ..LocalView::new(&local)
        };
        assert!(!is_synchronized(&other_rules, Some(&remote)));
    }

    #[test]
    fn pending_remote_parent_is_vacuous() {
        let local = names("Lions vs Bears");
        let remote = RemoteObjectView::PendingUpdate(RemoteFields {
            parent: Some(RemoteRef::relative(0)),
            ..fields(names("Lions vs Bears"))
        });
        assert!(is_synchronized(&LocalView::new(&local), Some(&remote)));
    }

    #[test]
    fn real_remote_parent_must_match() {
        let local = names("Lions vs Bears");
        let remote = RemoteObjectView::Committed(RemoteFields {
            parent: Some(RemoteRef::new(1, 21, 0)),
            ..fields(names("Lions vs Bears"))
        });
        let same = LocalView {
            parent: Some(RemoteRef::new(1, 21, 0)),
            ..LocalView::new(&local)
        };
        let moved = LocalView {
            parent: Some(RemoteRef::new(1, 21, 1)),
            ..LocalView::new(&local)
        };
        assert!(is_synchronized(&same, Some(&remote)));
        assert!(!is_synchronized(&moved, Some(&remote)));
    }
}
