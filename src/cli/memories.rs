use std::error::Error;
use std::io::Write;

use crate::api::ChatBackend;
use crate::core::memories::format_memories;

pub async fn run_memories<B: ChatBackend + ?Sized>(
    backend: &B,
    user_id: &str,
    out: &mut impl Write,
) -> Result<(), Box<dyn Error>> {
    let reply = backend.memories(user_id).await?;
    if !reply.is_ok() {
        return Err(format!(
            "Server refused the memories request (HTTP {}): {}",
            reply.status.as_u16(),
            reply.raw
        )
        .into());
    }
    writeln!(out, "{}", format_memories(user_id, &reply.body))?;
    Ok(())
}
