use crate::models::Event;

/// Category value that disables category filtering.
pub const ALL_CATEGORIES: &str = "All";

/// Whether `viewer` may see `event` at all.
pub fn can_view(viewer: Option<&str>, event: &Event) -> bool {
    if !event.is_private {
        return true;
    }
    match viewer {
        Some(viewer) => event.created_by == viewer || event.is_attending(viewer),
        None => false,
    }
}

/// The events `viewer` may see, optionally narrowed to one category, with the viewer's
/// joined events first. Ties keep their input order.
pub fn visible_events<'a>(
    viewer: Option<&str>,
    all_events: &'a [Event],
    category: Option<&str>,
) -> Vec<&'a Event> {
    let category = category.filter(|category| *category != ALL_CATEGORIES);

    let mut visible: Vec<&Event> = all_events
        .iter()
        .filter(|event| category.is_none_or(|category| event.category == category))
        .filter(|event| can_view(viewer, event))
        .collect();

    if let Some(viewer) = viewer {
        visible.sort_by_key(|event| !event.is_attending(viewer));
    }

    visible
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(
        id: &str,
        category: &str,
        created_by: &str,
        is_private: bool,
        attendees: &[&str],
    ) -> Event {
        Event {
            id: id.to_owned(),
            category: category.to_owned(),
            created_by: created_by.to_owned(),
            is_private,
            attendees: attendees.iter().map(|uid| uid.to_string()).collect(),
            ..Event::default()
        }
    }

    fn ids(events: &[&Event]) -> Vec<String> {
        events.iter().map(|event| event.id.clone()).collect()
    }

    #[test]
    fn private_event_only_for_creator_and_attendees() {
        let events = [event("p", "coffee", "U1", true, &["U1"])];

        assert_eq!(ids(&visible_events(Some("U1"), &events, None)), vec!["p"]);
        assert!(visible_events(Some("U2"), &events, None).is_empty());
        assert!(visible_events(None, &events, None).is_empty());
    }

    #[test]
    fn private_event_visible_to_invited_attendee() {
        let events = [event("p", "coffee", "U1", true, &["U1", "U3"])];
        assert_eq!(ids(&visible_events(Some("U3"), &events, None)), vec!["p"]);
        assert!(can_view(Some("U3"), &events[0]));
        assert!(!can_view(Some("U2"), &events[0]));
    }

    #[test]
    fn category_filter_and_all() {
        let events = [
            event("a", "coffee", "x", false, &[]),
            event("b", "hiking", "x", false, &[]),
            event("c", "coffee", "x", false, &[]),
        ];

        assert_eq!(ids(&visible_events(None, &events, Some("coffee"))), vec!["a", "c"]);
        assert_eq!(ids(&visible_events(None, &events, Some("All"))), vec!["a", "b", "c"]);
        assert!(visible_events(None, &events, Some("art")).is_empty());
    }

    #[test]
    fn joined_first_keeps_input_order_among_ties() {
        let events = [
            event("n1", "coffee", "x", false, &[]),
            event("j1", "coffee", "x", false, &["v"]),
            event("n2", "coffee", "x", false, &["w"]),
            event("j2", "coffee", "x", false, &["w", "v"]),
            event("n3", "coffee", "x", false, &[]),
        ];

        let out = visible_events(Some("v"), &events, None);
        assert_eq!(ids(&out), vec!["j1", "j2", "n1", "n2", "n3"]);
    }

    #[test]
    fn anonymous_viewer_keeps_input_order() {
        let events = [
            event("a", "coffee", "x", false, &["v"]),
            event("b", "coffee", "x", false, &[]),
        ];
        assert_eq!(ids(&visible_events(None, &events, None)), vec!["a", "b"]);
    }

    #[test]
    fn input_is_untouched_and_output_repeatable() {
        let events = vec![
            event("a", "coffee", "x", false, &[]),
            event("b", "coffee", "x", false, &["v"]),
        ];
        let before = events.clone();

        let first = ids(&visible_events(Some("v"), &events, None));
        let second = ids(&visible_events(Some("v"), &events, None));
        assert_eq!(first, second);
        assert_eq!(events, before);
    }
}
