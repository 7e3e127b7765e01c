//! Schema command implementation.

use crate::cli::SchemaArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use neurotab_extractor::PromptBuilder;

/// Execute the schema command.
pub fn execute_schema(args: SchemaArgs, config: &mut Config, formatter: &Formatter) -> Result<()> {
    if let Some(preset) = args.schema {
        config.schema.preset = preset;
        config.schema.file = None;
    }
    if let Some(file) = args.schema_file {
        config.schema.file = Some(file);
    }

    let schema = config.schema.resolve()?;
    if args.prompt {
        println!("{}", PromptBuilder::new(&schema).build());
    } else if args.toml {
        print!("{}", schema.to_toml()?);
    } else {
        println!("{}", formatter.format_schema(&schema)?);
    }

    Ok(())
}
