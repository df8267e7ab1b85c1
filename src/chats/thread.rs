use std::cmp::{Ordering, Reverse};

use crate::models::ChatThread;

/// Web clients sort strings by UTF-16 code unit, and thread ids already in the store were
/// built that way.
fn utf16_cmp(a: &str, b: &str) -> Ordering {
    a.encode_utf16().cmp(b.encode_utf16())
}

/// The pair in canonical order.
pub fn participants<'a>(a: &'a str, b: &'a str) -> [&'a str; 2] {
    match utf16_cmp(a, b) {
        Ordering::Greater => [b, a],
        _ => [a, b],
    }
}

/// Canonical id of the conversation between `a` and `b`, whichever side asks.
pub fn thread_id(a: &str, b: &str) -> String {
    participants(a, b).join("_")
}

pub fn other_participant<'a>(thread: &'a ChatThread, self_id: &str) -> Option<&'a str> {
    if !thread.participants.iter().any(|participant| participant == self_id) {
        return None;
    }
    thread
        .participants
        .iter()
        .find(|participant| *participant != self_id)
        .map(String::as_str)
}

/// Threads `viewer` takes part in, most recently updated first. Threads that never got
/// a timestamp sort as if updated at the epoch.
pub fn chat_list<'a>(threads: &'a [ChatThread], viewer: &str) -> Vec<&'a ChatThread> {
    let mut list: Vec<&ChatThread> = threads
        .iter()
        .filter(|thread| thread.participants.iter().any(|participant| participant == viewer))
        .collect();
    list.sort_by_key(|thread| Reverse(thread.updated_at.unwrap_or(0)));
    list
}
