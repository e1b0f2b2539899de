//! Unified diff between the remote content of a stale object and what the
//! local description would propose, for `bookie diff`.

use serde::Serialize;
use similar::TextDiff;

use bookie_core::{Identifier, NameSet, RemoteRef};

use crate::batch::Payload;
use crate::ledger::RemoteObjectView;
use crate::pipeline::Drift;

/// A single object's drift, rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDiff {
    pub identifier: Identifier,
    pub id: RemoteRef,
    pub unified_diff: String,
}

/// The compared fields, in a shape both sides can be dumped to.
#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pending_update: Option<bool>,
    name: &'a NameSet,
    #[serde(skip_serializing_if = "Option::is_none")]
    season: Option<&'a NameSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rules_id: Option<RemoteRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent_id: Option<RemoteRef>,
}

impl<'a> Content<'a> {
    fn remote(view: &'a RemoteObjectView) -> Self {
        let fields = view.fields();
        Content {
            pending_update: view.is_pending_update().then_some(true),
            name: &fields.name,
            season: fields.season.as_ref(),
            rules_id: fields.rules,
            parent_id: fields.parent,
        }
    }

    fn local(drift: &'a Drift) -> Self {
        let (season, rules_id) = match &drift.local {
            Payload::Event { season, .. } => (season.as_ref(), None),
            Payload::BettingMarketGroup { rules_id, .. } => (None, *rules_id),
            _ => (None, None),
        };
        Content {
            pending_update: None,
            name: drift.local.name(),
            season,
            rules_id,
            parent_id: drift.local.parent(),
        }
    }
}

/// Render one drift as a unified diff, ledger side first.
///
/// A remote object the ledger no longer has diffs against empty content.
pub fn render_drift(drift: &Drift) -> Result<EntityDiff, serde_yaml::Error> {
    let remote = match &drift.remote {
        Some(view) => serde_yaml::to_string(&Content::remote(view))?,
        None => String::new(),
    };
    let local = serde_yaml::to_string(&Content::local(drift))?;

    let old_header = format!("ledger/{} ({})", drift.identifier, drift.id);
    let new_header = format!("local/{}", drift.identifier);
    let unified = TextDiff::from_lines(&remote, &local)
        .unified_diff()
        .header(&old_header, &new_header)
        .context_radius(3)
        .to_string();

    Ok(EntityDiff {
        identifier: drift.identifier.clone(),
        id: drift.id,
        unified_diff: unified,
    })
}

/// Render every drift of a pass, in walk order.
pub fn render_drifts(drifts: &[Drift]) -> Result<Vec<EntityDiff>, serde_yaml::Error> {
    drifts.iter().map(render_drift).collect()
}
