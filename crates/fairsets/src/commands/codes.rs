use anyhow::{Context, Result};
use clap::Args;
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use fairsets_core::{CodeCatalog, CodeMapping};

#[derive(Args, Debug)]
pub struct CodesArgs {
    /// Only print this attribute
    attribute: Option<String>,
    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

pub fn handle_codes_command(args: CodesArgs) -> Result<()> {
    let catalog = CodeCatalog::diabetes();
    let mappings: Vec<&CodeMapping> = match &args.attribute {
        Some(attribute) => {
            let mapping = catalog.mapping(attribute).with_context(|| {
                let known: Vec<&str> = catalog.attributes().collect();
                format!(
                    "no code mapping for '{attribute}' (known: {})",
                    known.join(", ")
                )
            })?;
            vec![mapping]
        }
        None => catalog.mappings().iter().collect(),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&mappings)?);
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["attribute", "code", "description"]);
    for mapping in mappings {
        for (code, description) in mapping.codes {
            table.add_row(vec![
                mapping.attribute.to_string(),
                code.to_string(),
                description.to_string(),
            ]);
        }
    }
    println!("{table}");
    Ok(())
}
