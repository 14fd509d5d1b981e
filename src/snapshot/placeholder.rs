/// Deterministic stand-in holder set used when a snapshot is empty or failed.
///
/// Produces `Hldr001...xyz` through `Hldr{count:03}...xyz`.
pub fn placeholder_addresses(count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("Hldr{:03}...xyz", i)).collect()
}
