use std::collections::BTreeMap;

use crate::match_history::{MatchId, MatchTable, PlayerId};

/// Which tracked players appear in which match.
///
/// Derived from the canonical table only; rebuild it whenever the table is
/// reloaded. Within a match, players are listed in table row order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParticipationIndex {
    by_match: BTreeMap<MatchId, Vec<PlayerId>>,
}

impl ParticipationIndex {
    pub fn build(table: &MatchTable) -> Self {
        let mut by_match: BTreeMap<MatchId, Vec<PlayerId>> = BTreeMap::new();
        for row in table.rows() {
            let players = by_match.entry(row.match_id.clone()).or_default();
            // A player shows up once per match; guard against a stray duplicate anyway.
            if !players.contains(&row.player_id) {
                players.push(row.player_id.clone());
            }
        }
        Self { by_match }
    }

    pub fn players(&self, id: &MatchId) -> Option<&[PlayerId]> {
        self.by_match.get(id).map(Vec::as_slice)
    }

    pub fn contains(&self, id: &MatchId, player: &PlayerId) -> bool {
        self.players(id).is_some_and(|players| players.contains(player))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&MatchId, &[PlayerId])> {
        self.by_match.iter().map(|(id, players)| (id, players.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.by_match.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_match.is_empty()
    }
}
