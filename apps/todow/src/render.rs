//! Text rendering of item listings

use comfy_table::{presets, Table};

use todow_core::Item;

/// Marker shown in the Done column for completed items
pub const DONE_MARK: &str = "\u{221A}";

/// Render items as a borderless `ID | Body | Done` table
pub fn items_table(items: &[Item]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::NOTHING);
    table.set_header(vec!["ID", "Body", "Done"]);

    for item in items {
        let done = if item.done { DONE_MARK } else { "" };
        table.add_row(vec![item.id.to_string(), item.body.clone(), done.to_string()]);
    }
    table
}
