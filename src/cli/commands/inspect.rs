//! Inspect command - describe the state space and decode indices

use anyhow::{Context, Result};
use clap::Parser;

use crate::{
    cli::output::{format_number, print_kv, print_section, print_subsection},
    grappling::{STANDARD_STATE_COUNT, StateSpace},
};

#[derive(Parser, Debug)]
#[command(about = "Describe the grappling state space")]
pub struct InspectArgs {
    /// Decode this state index into its variable values
    #[arg(long)]
    pub index: Option<usize>,

    /// State count the variable domains must multiply out to
    #[arg(long, default_value_t = STANDARD_STATE_COUNT)]
    pub expected: usize,
}

pub fn execute(args: InspectArgs) -> Result<()> {
    let space = StateSpace::standard_with_expected(args.expected)
        .context("state space does not match the expected size")?;

    print_section("State Space");
    for variable in space.variables() {
        print_kv(variable.name(), &format!("{:?}", variable.domain()));
    }
    print_kv("States", &format_number(space.size()));
    print_kv("Table entries", &format_number(space.size() * space.size()));

    if let Some(raw) = args.index {
        let index = space.check_index(raw)?;
        let values = space.decode(index)?;

        print_subsection(&format!("State {index}"));
        for (variable, value) in space.variables().iter().zip(&values) {
            print_kv(variable.name(), &value.to_string());
        }
    }

    Ok(())
}
