//! Threat detection: cells where the attacker would create a dangerous shape.
//!
//! Threats are reported from the defender's point of view; playing on a
//! threat cell blocks it.

use super::board::{Board, Coord, Side};
use super::rule::RuleSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThreatKind {
    Five,
    OpenFour,
    FourThree,
    DoubleThree,
    Four,
    OpenThree,
}

impl ThreatKind {
    /// Lower is more urgent
    pub fn priority(self) -> u8 {
        match self {
            ThreatKind::Five => 1,
            ThreatKind::OpenFour => 2,
            ThreatKind::FourThree | ThreatKind::DoubleThree => 3,
            ThreatKind::Four => 4,
            ThreatKind::OpenThree => 5,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ThreatKind::Five => "five",
            ThreatKind::OpenFour => "open_four",
            ThreatKind::FourThree => "four_three",
            ThreatKind::DoubleThree => "double_three",
            ThreatKind::Four => "four",
            ThreatKind::OpenThree => "open_three",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Threat {
    pub coord: Coord,
    pub kind: ThreatKind,
}

impl Threat {
    pub fn priority(&self) -> u8 {
        self.kind.priority()
    }
}

/// Threats `attacker` could make on its next move, most urgent first.
///
/// Cells forbidden to a restricted attacker are never threats. Ties are
/// broken by board position so the order is deterministic.
pub fn detect_threats(board: &Board, rules: RuleSet, attacker: Side) -> Vec<Threat> {
    let mut threats: Vec<Threat> = board
        .empty_cells()
        .filter(|coord| rules.forbidden(board, *coord, attacker).is_none())
        .filter_map(|coord| classify(board, rules, coord, attacker).map(|kind| Threat { coord, kind }))
        .collect();
    threats.sort_by_key(|t| (t.priority(), t.coord));
    threats
}

fn classify(board: &Board, rules: RuleSet, coord: Coord, attacker: Side) -> Option<ThreatKind> {
    if rules.makes_five(board, coord, attacker) {
        return Some(ThreatKind::Five);
    }
    let shape = rules.shape(board, coord, attacker);
    // two fours cannot both be blocked, so they rank with an open four
    if shape.straight_fours > 0 || shape.fours >= 2 {
        Some(ThreatKind::OpenFour)
    } else if shape.fours == 1 && shape.threes >= 1 {
        Some(ThreatKind::FourThree)
    } else if shape.threes >= 2 {
        Some(ThreatKind::DoubleThree)
    } else if shape.fours == 1 {
        Some(ThreatKind::Four)
    } else if shape.threes == 1 {
        Some(ThreatKind::OpenThree)
    } else {
        None
    }
}
