use crate::api::MemoriesResponse;

/// Human-readable listing of what the assistant remembers.
pub fn format_memories(user_id: &str, memories: &MemoriesResponse) -> String {
    let items: Vec<&str> = memories
        .items
        .iter()
        .map(|item| item.memory.trim())
        .filter(|memory| !memory.is_empty())
        .collect();

    if items.is_empty() {
        return format!("No memories stored for {user_id} yet.");
    }

    let mut out = format!("What I remember about {user_id} ({}):", items.len());
    for memory in items {
        out.push_str("\n- ");
        out.push_str(memory);
    }
    out
}
