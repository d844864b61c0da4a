// ABOUTME: Free-text search over loaded memory entries

use agentboard_core::MemoryEntry;

/// Case-insensitive substring match across entity name, entity type, and observation.
///
/// A blank query matches everything.
pub fn filter_memories<'a>(entries: &'a [MemoryEntry], query: &str) -> Vec<&'a MemoryEntry> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return entries.iter().collect();
    }

    entries
        .iter()
        .filter(|entry| {
            [&entry.entity_name, &entry.entity_type, &entry.observation]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
        })
        .collect()
}
