use anyhow::Result;

use annolens::annotate::{Listing, ListingFormat};
use annolens::Config;

use super::input::{build_filters, load_set, print_rendered};
use crate::{FilterArgs, InputArgs};

pub fn cmd_list(
    input: &InputArgs,
    filter_args: &FilterArgs,
    format: ListingFormat,
    config: &Config,
) -> Result<()> {
    let set = load_set(input)?;
    let filters = build_filters(&set, filter_args, config)?;

    let rows = Listing::rows(&set, &filters);
    print_rendered(&Listing::render(&rows, format)?);

    eprintln!("📋 {} of {} annotations shown", rows.len(), set.len());
    Ok(())
}
