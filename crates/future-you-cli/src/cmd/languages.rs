use crate::output::{print_json, print_table};
use future_you_core::types::Language;

pub fn run(json: bool) -> anyhow::Result<()> {
    if json {
        let list: Vec<serde_json::Value> = Language::all()
            .iter()
            .map(|l| {
                serde_json::json!({
                    "code": l.code(),
                    "label": l.label(),
                    "native_label": l.native_label(),
                    "rtl": l.is_rtl(),
                })
            })
            .collect();
        return print_json(&list);
    }

    let rows = Language::all()
        .iter()
        .map(|l| {
            vec![
                l.code().to_string(),
                l.label().to_string(),
                l.native_label().to_string(),
                if l.is_rtl() { "rtl" } else { "" }.to_string(),
            ]
        })
        .collect();
    print_table(&["CODE", "LANGUAGE", "NATIVE", "DIR"], rows);
    Ok(())
}
