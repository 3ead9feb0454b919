use anyhow::Result;

use annolens::Config;

use super::input::{build_filters, load_set};
use crate::{FilterArgs, InputArgs};

pub fn cmd_filters(input: &InputArgs, filter_args: &FilterArgs, config: &Config) -> Result<()> {
    let set = load_set(input)?;
    let filters = build_filters(&set, filter_args, config)?;

    let width = set
        .classifiers()
        .iter()
        .chain(set.models())
        .map(String::len)
        .max()
        .unwrap_or(0);

    println!("Classifiers:");
    for (classifier, enabled) in filters.classifiers() {
        let count = set.iter().filter(|a| a.classifier == classifier).count();
        println!("  {} {classifier:<width$}  {count}", mark(enabled));
    }

    println!("Models:");
    if set.models().is_empty() {
        println!("  (none)");
    }
    for (model, enabled) in filters.models() {
        let count = set.iter().filter(|a| a.model_name() == Some(model)).count();
        println!("  {} {model:<width$}  {count}", mark(enabled));
    }

    Ok(())
}

fn mark(enabled: bool) -> &'static str {
    if enabled {
        "[x]"
    } else {
        "[ ]"
    }
}
