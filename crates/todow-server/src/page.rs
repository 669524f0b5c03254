//! HTML page listing the collection

use std::sync::Arc;

use axum::{extract::State, response::Html};
use chrono::Local;

use todow_core::{Item, API_PATH};

use crate::error::ApiError;
use crate::AppState;

/// Display format for the creation time, e.g. `Mon 02.01.2006 15:04:05`
const CREATED_FORMAT: &str = "%a %d.%m.%Y %H:%M:%S";

/// Render the item table and the add form
///
/// A collection that was never written renders as an empty table.
pub async fn index(State(state): State<Arc<AppState>>) -> Result<Html<String>, ApiError> {
    let items = state
        .with_store(|store| store.load())
        .await?
        .unwrap_or_default();

    Ok(Html(render_page(&items)))
}

pub fn render_page(items: &[Item]) -> String {
    let rows: String = items.iter().map(render_row).collect();

    // Rows go in last so item text is never scanned for placeholders.
    PAGE_TEMPLATE
        .replace("{{api_path}}", API_PATH)
        .replace("{{rows}}", &rows)
}

fn render_row(item: &Item) -> String {
    format!(
        r#"
			<tr class="item" data-id="{id}">
				<td>{id}</td>
				<td>{body}</td>
				<td>{created}</td>
				<td>{done}</td>
				<td>
					<button class="complete-trigger">Complete</button>
					<button class="rm-trigger">Remove</button>
				</td>
			</tr>"#,
        id = item.id,
        body = escape_html(&item.body),
        created = item.created.with_timezone(&Local).format(CREATED_FORMAT),
        done = item.done,
    )
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
	<meta charset="UTF-8">
	<title>Todow</title>
	<style>
		td {
			padding: 4px 10px;
		}
	</style>
</head>
<body>
	Web todo list

	<h2>Items</h2>
	<table>
		<thead>
			<tr>
				<td>ID</td>
				<td>Body</td>
				<td>Created</td>
				<td>Done</td>
				<td></td>
			</tr>
		</thead>{{rows}}
	</table>

	<h2>Add</h2>
	<form action="{{api_path}}" method="POST">
		<input type="text" name="body" placeholder="Body">
		<button>Submit</button>
	</form>

	<script>
		var apiPath = "{{api_path}}";

		document.querySelectorAll(".item").forEach(function (item) {
			var id = item.getAttribute("data-id");

			item.querySelector(".rm-trigger").addEventListener("click", function () {
				if (confirm("Really remove item #" + id + "?")) {
					send("DELETE", id, function () { item.remove(); });
				}
			});

			item.querySelector(".complete-trigger").addEventListener("click", function () {
				send("PATCH", id, function () { location.reload(); });
			});
		});

		function send(method, id, onSuccess) {
			var xhr = new XMLHttpRequest();
			xhr.addEventListener("load", function () {
				if (xhr.status === 200) {
					onSuccess();
					return;
				}
				alert(method + " failed: " + xhr.responseText);
			});
			xhr.open(method, apiPath + id);
			xhr.send();
		}
	</script>
</body>
</html>
"#;
