use anyhow::Result;

use annolens::annotate::{
    bucket_for_seconds, Dimensions, Listing, ListingFormat, OverlayProjector, TimeIndex,
};
use annolens::Config;

use super::input::{build_filters, load_set, print_rendered};
use crate::{FilterArgs, InputArgs};

pub fn cmd_bucket(
    input: &InputArgs,
    filter_args: &FilterArgs,
    at: f64,
    overlay: Option<(Option<Dimensions>, Option<Dimensions>)>,
    format: ListingFormat,
    config: &Config,
) -> Result<()> {
    let set = load_set(input)?;
    let filters = build_filters(&set, filter_args, config)?;
    let index = TimeIndex::build(&set);

    let second = bucket_for_seconds(at);
    let bucket = index.bucket(second);
    let active = filters.active(bucket);

    eprintln!(
        "⏱️  Second {second}: {} of {} annotations active",
        active.len(),
        bucket.len()
    );

    let Some((native, displayed)) = overlay else {
        print_rendered(&Listing::render(&Listing::rows_for(&active), format)?);
        return Ok(());
    };

    let mut projector = OverlayProjector::new();
    projector.set_native(native);
    projector.set_displayed(displayed);

    match projector.project(second, &active) {
        Ok(frame) => {
            eprintln!(
                "🖼️  {} shapes, layer transform {}",
                frame.shapes.len(),
                frame.scale.to_css_transform()
            );
            println!("{}", serde_json::to_string_pretty(&frame)?);
        }
        Err(e) => eprintln!("⚠️  Overlay suppressed: {e}"),
    }

    Ok(())
}
