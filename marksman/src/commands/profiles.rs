// marksman/src/commands/profiles.rs
//! Implements `marksman profiles list`.

use std::io::{self, Write};

use anyhow::Result;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};

use marksman_core::{list_available_profiles, ProfileSummary};

use crate::cli::ProfilesCommand;

pub fn run_profiles_command(cmd: ProfilesCommand) -> Result<()> {
    match cmd {
        ProfilesCommand::List => {
            let profiles = list_available_profiles();
            let mut out = io::stdout().lock();
            writeln!(out, "{}", profiles_table(&profiles))?;
        }
    }
    Ok(())
}

pub fn profiles_table(profiles: &[ProfileSummary]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Profile", "Version", "Source", "Description"]);

    for profile in profiles {
        let source = match &profile.path {
            Some(path) => path.display().to_string(),
            None => "built-in".to_string(),
        };
        table.add_row(vec![
            profile.profile_name.clone(),
            profile.version.clone(),
            source,
            profile.description.clone().unwrap_or_default(),
        ]);
    }
    table
}
