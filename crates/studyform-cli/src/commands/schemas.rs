//! The `studyform schemas` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use studyform_core::model::FieldKind;
use studyform_core::schema::SchemaRegistry;

pub fn execute(instrument: Option<String>) -> Result<()> {
    let registry = SchemaRegistry::builtin();

    let Some(name) = instrument else {
        let mut table = Table::new();
        table.set_header(vec!["Schema", "Instrument", "Title", "Fields"]);
        for schema in registry.iter() {
            table.add_row(vec![
                Cell::new(&schema.name),
                Cell::new(schema.instrument),
                Cell::new(&schema.title),
                Cell::new(schema.fields.len()),
            ]);
        }
        println!("{table}");
        return Ok(());
    };

    let schema = registry.get(&name)?;
    println!("{} ({})", schema.title, schema.name);
    if let Some(description) = &schema.description {
        println!("{description}");
    }

    let mut table = Table::new();
    table.set_header(vec!["Field", "Type", "Values", "Comment", "Question"]);
    for field in &schema.fields {
        let (kind, values) = match &field.kind {
            FieldKind::Choice { options } => (
                "choice",
                options
                    .iter()
                    .map(|o| o.value.to_string())
                    .collect::<Vec<_>>()
                    .join(","),
            ),
            FieldKind::Text { .. } => ("text", String::new()),
            FieldKind::Scale { min, max, .. } => ("scale", format!("{min}..={max}")),
        };
        table.add_row(vec![
            Cell::new(&field.id),
            Cell::new(kind),
            Cell::new(values),
            Cell::new(if field.has_comment { "yes" } else { "" }),
            Cell::new(&field.question),
        ]);
    }
    println!("{table}");
    Ok(())
}
