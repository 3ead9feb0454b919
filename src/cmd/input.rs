use anyhow::{Context, Result};

use annolens::annotate::{load_files, AnnotationSet, FilterState};
use annolens::Config;

use crate::{FilterArgs, InputArgs};

/// Load and merge the prediction and label files
pub fn load_set(input: &InputArgs) -> Result<AnnotationSet> {
    let set = load_files(&input.predictions, input.labels.as_deref()).with_context(|| {
        format!(
            "failed to load annotations from {}",
            input.predictions.display()
        )
    })?;

    if set.is_empty() {
        eprintln!("⚠️  No annotations in {}", input.predictions.display());
    }
    Ok(set)
}

/// Seed filters from the set, then apply the config file and the command line.
///
/// Unknown keys from the command line are an error; from the config file
/// they are only logged.
pub fn build_filters(set: &AnnotationSet, args: &FilterArgs, config: &Config) -> Result<FilterState> {
    let mut filters = FilterState::seed(set);
    apply_filters(&mut filters, args, config)?;
    Ok(filters)
}

pub fn apply_filters(filters: &mut FilterState, args: &FilterArgs, config: &Config) -> Result<()> {
    config.apply_filters(filters);

    for classifier in &args.disable_classifiers {
        filters.set_classifier(classifier, false)?;
    }
    for model in &args.disable_models {
        filters.set_model(model, false)?;
    }
    Ok(())
}

/// Print rendered output, ending with exactly one newline
pub fn print_rendered(output: &str) {
    if output.ends_with('\n') {
        print!("{output}");
    } else {
        println!("{output}");
    }
}
