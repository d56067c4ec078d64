//! Import command handler

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use tracing::debug;

use annotator_core::prepare::MAX_LABELS;
use annotator_core::{parse_file_async, Config, ImportPlan, StoreHandle};

use crate::output::Output;
use crate::prompt::{confirm, prompt_optional, resolve_column};

/// Choices given on the command line; missing ones are prompted for
pub struct ImportArgs {
    pub file: PathBuf,
    pub primary: Option<String>,
    pub secondary: Vec<String>,
    pub labels: Vec<String>,
    pub yes: bool,
}

/// Import a file, configure display and labels, and replace the session
pub async fn run(
    handle: &StoreHandle,
    config: &Config,
    args: ImportArgs,
    output: &Output,
) -> Result<()> {
    let imported = parse_file_async(args.file.clone())
        .await
        .with_context(|| format!("Failed to import {}", args.file.display()))?;

    if handle.call(|store| store.has_session()).await? && !args.yes {
        if !output.should_prompt() {
            bail!("Data from a previous import is available. Pass --yes to replace it.");
        }
        println!("Data available: a previous import is still stored.");
        if !confirm("Replace it with this file?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let mut plan = ImportPlan::from_file(imported, config.display_mode);
    let names: Vec<String> = plan.columns().iter().map(|c| c.name.clone()).collect();

    choose_primary(&mut plan, &names, args.primary, output)?;
    choose_secondary(&mut plan, &names, args.secondary, output)?;
    choose_labels(&mut plan, args.labels, output)?;

    plan.validate()?;

    let labels: Vec<String> = plan
        .labels()
        .iter()
        .filter(|l| l.is_named())
        .map(|l| l.name.trim().to_string())
        .collect();
    let file = plan.file().cloned().context("No file loaded")?;

    handle
        .call(move |store| plan.commit(store))
        .await
        .context("Failed to save import")?;

    output.success(&format!(
        "Imported {} document(s) from {}",
        file.documents.len(),
        file.metadata.name
    ));
    output.print_import(&file, &labels);
    Ok(())
}

fn choose_primary(
    plan: &mut ImportPlan,
    names: &[String],
    primary: Option<String>,
    output: &Output,
) -> Result<()> {
    let input = match primary {
        Some(p) => Some(p),
        None if output.should_prompt() => {
            print_column_choices(names);
            prompt_optional("Select the primary column to display")?
        }
        None => None,
    };

    if let Some(input) = input {
        let name = resolve_column(&input, names)
            .with_context(|| format!("Unknown column '{}'", input))?;
        plan.select_primary(name)?;
    }
    Ok(())
}

fn choose_secondary(
    plan: &mut ImportPlan,
    names: &[String],
    secondary: Vec<String>,
    output: &Output,
) -> Result<()> {
    let inputs = if !secondary.is_empty() {
        secondary
    } else if output.should_prompt() && plan.mode().allows_secondary() {
        prompt_optional("Select other columns to display (comma separated, blank for none)")?
            .map(|line| line.split(',').map(|s| s.trim().to_string()).collect())
            .unwrap_or_default()
    } else {
        Vec::new()
    };

    for input in inputs.iter().filter(|s| !s.is_empty()) {
        let name = resolve_column(input, names)
            .with_context(|| format!("Unknown column '{}'", input))?;
        if plan.primary().is_some_and(|c| c.name == name) {
            debug!(column = name, "Skipping primary column as secondary");
            continue;
        }
        plan.toggle_secondary(name)?;
    }
    Ok(())
}

fn choose_labels(plan: &mut ImportPlan, labels: Vec<String>, output: &Output) -> Result<()> {
    if !labels.is_empty() {
        for label in &labels {
            plan.add_named_label(label)?;
        }
        return Ok(());
    }

    if !output.should_prompt() {
        return Ok(());
    }

    println!("Provide at least 2 classification labels eg. True, False etc.");
    while plan.labels().len() < MAX_LABELS {
        let prompt = format!("Label {} (blank to finish)", plan.labels().len() + 1);
        match prompt_optional(&prompt)? {
            Some(name) => {
                plan.add_named_label(&name)?;
            }
            None => break,
        }
    }
    Ok(())
}

fn print_column_choices(names: &[String]) {
    println!("Columns:");
    for (i, name) in names.iter().enumerate() {
        println!("{:>3}. {}", i + 1, name);
    }
}
