//! Turns one-directional like edges into matches and "likes you" entries, and counts
//! how many events a viewer shares with each counterpart.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::models::{Event, LikeEdge};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatchReport {
    /// Counterparts with reciprocal likes.
    pub matches: Vec<String>,
    /// Counterparts who liked the viewer without being liked back.
    pub likes_you: Vec<String>,
    /// Every counterpart from either list, zero counts included.
    pub shared_events: HashMap<String, usize>,
}

/// Classifies every counterpart of `viewer_id`.
///
/// `sent` holds the viewer's outgoing edges and `received` the incoming ones; edges that
/// do not touch the viewer on the expected side are skipped. A counterpart is a match as
/// soon as an outgoing edge points back at it, so it never shows up in both lists.
pub fn classify(
    viewer_id: &str,
    sent: &[LikeEdge],
    received: &[LikeEdge],
    all_events: &[Event],
) -> MatchReport {
    let sent_targets: HashSet<&str> = sent
        .iter()
        .filter(|edge| edge.from == viewer_id)
        .map(|edge| edge.to.as_str())
        .collect();

    let mut report = MatchReport::default();
    let mut seen: HashSet<&str> = HashSet::new();

    for edge in received.iter().filter(|edge| edge.to == viewer_id) {
        let other = edge.from.as_str();
        if other.is_empty() || !seen.insert(other) {
            continue;
        }

        if sent_targets.contains(other) {
            report.matches.push(other.to_owned());
        } else {
            report.likes_you.push(other.to_owned());
        }
        report
            .shared_events
            .insert(other.to_owned(), shared_event_count(viewer_id, other, all_events));
    }

    report
}

/// Events both users attend.
pub fn shared_events<'a>(
    viewer_id: &'a str,
    other: &'a str,
    all_events: &'a [Event],
) -> impl Iterator<Item = &'a Event> + 'a {
    all_events
        .iter()
        .filter(move |event| event.is_attending(viewer_id) && event.is_attending(other))
}

pub fn shared_event_count(viewer_id: &str, other: &str, all_events: &[Event]) -> usize {
    shared_events(viewer_id, other, all_events).count()
}

/// Whether edges in both directions exist between `a` and `b`.
pub fn is_mutual(a: &str, b: &str, edges: &[LikeEdge]) -> bool {
    let liked = |from: &str, to: &str| edges.iter().any(|edge| edge.from == from && edge.to == to);
    liked(a, b) && liked(b, a)
}
