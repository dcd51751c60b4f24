use serde_json::Value;
use yew::prelude::*;

const MAX_COLUMNS: usize = 6;

#[derive(Properties, PartialEq)]
pub struct RecordTableProps {
    pub rows: Vec<Value>,
}

/// Column names taken from the first row, `id` first.
pub fn columns(rows: &[Value]) -> Vec<String> {
    let Some(Value::Object(first)) = rows.first() else {
        return Vec::new();
    };
    let mut names: Vec<String> = first.keys().cloned().collect();
    if let Some(position) = names.iter().position(|name| name == "id") {
        let id = names.remove(position);
        names.insert(0, id);
    }
    names.truncate(MAX_COLUMNS);
    names
}

/// Text shown for one cell.
pub fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(Value::Bool(flag)) => if *flag { "Yes" } else { "No" }.to_string(),
        Some(Value::Number(number)) => number.to_string(),
        Some(Value::Array(items)) => format!("{} items", items.len()),
        Some(Value::Object(map)) => map
            .get("name")
            .and_then(Value::as_str)
            .map_or_else(|| "…".to_string(), str::to_string),
    }
}

#[function_component(RecordTable)]
pub fn record_table(props: &RecordTableProps) -> Html {
    let columns = columns(&props.rows);
    if props.rows.is_empty() {
        return html! { <p class="text-base-content/70">{"No records found."}</p> };
    }

    html! {
        <div class="overflow-x-auto">
            <table class="table table-zebra w-full">
                <thead>
                    <tr>
                        { for columns.iter().map(|name| html! { <th>{ name.replace('_', " ") }</th> }) }
                    </tr>
                </thead>
                <tbody>
                    { for props.rows.iter().map(|row| html! {
                        <tr>
                            { for columns.iter().map(|name| html! { <td>{ cell_text(row.get(name)) }</td> }) }
                        </tr>
                    }) }
                </tbody>
            </table>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_columns_put_id_first_and_cap() {
        let rows = vec![json!({
            "amount": 10, "customer": "Acme", "due": "2026-01-01", "id": 7,
            "status": "open", "tax": 1, "zone": "North"
        })];
        let names = columns(&rows);
        assert_eq!(names.len(), 6);
        assert_eq!(names[0], "id");
    }

    #[test]
    fn test_columns_of_empty_or_scalar_rows() {
        assert!(columns(&[]).is_empty());
        assert!(columns(&[json!(3)]).is_empty());
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(None), "");
        assert_eq!(cell_text(Some(&json!(null))), "");
        assert_eq!(cell_text(Some(&json!("paid"))), "paid");
        assert_eq!(cell_text(Some(&json!(true))), "Yes");
        assert_eq!(cell_text(Some(&json!(12.5))), "12.5");
        assert_eq!(cell_text(Some(&json!([1, 2]))), "2 items");
        assert_eq!(cell_text(Some(&json!({"name": "Fiber 100"}))), "Fiber 100");
        assert_eq!(cell_text(Some(&json!({"id": 3}))), "…");
    }
}
