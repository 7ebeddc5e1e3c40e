use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::error::{DashboardError, Result};
use crate::match_history::PlayerId;

/// Tracked players and their display names. Loaded once at startup.
///
/// Players are listed by display name, not document order: `serde_json::Map`
/// does not keep key order without the `preserve_order` feature.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    // Ordered by display name, the order players are listed in the UI.
    players: Vec<(PlayerId, String)>,
    by_id: HashMap<PlayerId, usize>,
}

impl Roster {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut players: Vec<(PlayerId, String)> = Vec::new();
        for (id, name) in pairs {
            let id = PlayerId::new(id);
            if players.iter().any(|(existing, _)| *existing == id) {
                continue;
            }
            players.push((id, name.into()));
        }
        players.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
        let by_id = players
            .iter()
            .enumerate()
            .map(|(idx, (id, _))| (id.clone(), idx))
            .collect();
        Self { players, by_id }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|err| {
            DashboardError::config(format!("read roster {}: {err}", path.display()))
        })?;
        parse_roster_json(&raw)
            .map_err(|err| DashboardError::config(format!("roster {}: {err}", path.display())))
    }

    pub fn contains(&self, id: &PlayerId) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn display_name(&self, id: &PlayerId) -> Option<&str> {
        self.by_id
            .get(id)
            .and_then(|idx| self.players.get(*idx))
            .map(|(_, name)| name.as_str())
    }

    /// Display name, falling back to the raw account id.
    pub fn label_for<'a>(&'a self, id: &'a PlayerId) -> &'a str {
        self.display_name(id).unwrap_or(id.as_str())
    }

    pub fn players(&self) -> &[(PlayerId, String)] {
        &self.players
    }

    pub fn ids(&self) -> impl Iterator<Item = &PlayerId> {
        self.players.iter().map(|(id, _)| id)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

/// Parses a `{ "<account id>": "<display name>" }` document.
pub fn parse_roster_json(raw: &str) -> std::result::Result<Roster, String> {
    let value: Value = serde_json::from_str(raw).map_err(|err| format!("invalid json: {err}"))?;
    let Value::Object(map) = value else {
        return Err("expected an object mapping account ids to names".to_string());
    };
    if map.is_empty() {
        return Err("no tracked players".to_string());
    }

    let mut pairs = Vec::with_capacity(map.len());
    for (id, name) in map {
        let id = id.trim().to_string();
        if id.is_empty() {
            return Err("empty account id".to_string());
        }
        let name = match name {
            Value::String(s) if !s.trim().is_empty() => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            other => return Err(format!("invalid display name for {id}: {other}")),
        };
        pairs.push((id, name));
    }
    Ok(Roster::from_pairs(pairs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_orders_by_display_name() {
        let roster =
            parse_roster_json(r#"{"Steam|2|0": "Zed", "Epic|abc|0": "Alpha"}"#).unwrap();
        let names = roster
            .players()
            .iter()
            .map(|(_, name)| name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["Alpha", "Zed"]);
        assert!(roster.contains(&PlayerId::new("Steam|2|0")));
        assert_eq!(roster.display_name(&PlayerId::new("Epic|abc|0")), Some("Alpha"));
    }

    #[test]
    fn rejects_malformed_documents() {
        assert!(parse_roster_json("[]").is_err());
        assert!(parse_roster_json("{}").is_err());
        assert!(parse_roster_json(r#"{"a": null}"#).is_err());
        assert!(parse_roster_json(r#"{"a": "  "}"#).is_err());
        assert!(parse_roster_json("not json").is_err());
    }
}
