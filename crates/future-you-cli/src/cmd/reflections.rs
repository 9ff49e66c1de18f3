use crate::output::{print_json, print_table};
use future_you_core::store::ProfileStore;
use std::path::Path;

pub fn run(root: &Path, user_id: &str, json: bool) -> anyhow::Result<()> {
    let store = ProfileStore::open(root);
    let rt = tokio::runtime::Runtime::new()?;
    let entries = rt.block_on(store.list_reflections(user_id))?;

    if json {
        return print_json(&entries);
    }
    if entries.is_empty() {
        println!("No reflections saved for {user_id}.");
        return Ok(());
    }

    let rows = entries
        .iter()
        .map(|e| {
            vec![
                e.timestamp.format("%Y-%m-%d %H:%M").to_string(),
                truncate(&e.prompt, 48),
                truncate(&e.response, 60),
            ]
        })
        .collect();
    print_table(&["DATE", "PROMPT", "RESPONSE"], rows);
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    let flat = s.replace('\n', " ");
    if flat.chars().count() <= max {
        flat
    } else {
        let cut: String = flat.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}
