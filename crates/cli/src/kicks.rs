//! Subcommand implementations for the reference host.

use std::sync::Arc;

use kick_core::{
    HostServices, KickRegistry, NoNetwork, RoleSet, SelectionItem, Theme,
};

use crate::args::{InvokeArgs, ListArgs, VerifyArgs};
use crate::config::{load_config, HostConfig};
use crate::manifest::ManifestResolver;
use crate::output::{print_error, print_info, print_success};

fn build_registry(config: &HostConfig) -> KickRegistry {
    let theme = Theme::named(config.theme.as_deref().unwrap_or("dark"));
    KickRegistry::new(
        Box::new(ManifestResolver),
        HostServices::new(theme, Arc::new(NoNetwork)),
    )
}

fn actor_roles(flag: &[String], config: &HostConfig) -> RoleSet {
    if flag.is_empty() {
        config.roles.clone()
    } else {
        flag.iter().cloned().collect()
    }
}

/// Loads every source, reporting failures without aborting: a broken bundle
/// must not take down the rest of the session.
fn load_sources(registry: &mut KickRegistry, sources: &[String]) {
    for source in sources {
        match registry.load_source(source) {
            Ok(count) => print_info("load", &format!("{source}: {count} kick(s)")),
            Err(err) => print_error("load", &err.to_string()),
        }
    }
}

fn gather_sources(config: &HostConfig, extra: &[String]) -> Vec<String> {
    let mut sources = config.sources.clone();
    sources.extend(extra.iter().cloned());
    sources
}

pub fn run_list(args: ListArgs) -> anyhow::Result<()> {
    let config = load_config()?;
    let sources = gather_sources(&config, &args.sources);
    if sources.is_empty() {
        print_info("list", "no bundle sources configured");
        return Ok(());
    }
    let mut registry = build_registry(&config);
    load_sources(&mut registry, &sources);

    let roles = actor_roles(&args.roles, &config);
    println!("{:<20} {:>8}  {:<28} ROLES", "ID", "POS", "NAME");
    for descriptor in registry.visible_to(&roles) {
        if !config.enabled(&descriptor.id) {
            continue;
        }
        let role_column = if descriptor.required_roles.is_empty() {
            "-".to_string()
        } else {
            descriptor.required_roles.to_string()
        };
        println!(
            "{:<20} {:>8}  {:<28} {}",
            descriptor.id, descriptor.position, descriptor.name, role_column
        );
    }
    Ok(())
}

pub fn run_verify(args: VerifyArgs) -> anyhow::Result<()> {
    match kick_core::load(&ManifestResolver, &args.source) {
        Ok(descriptors) => {
            print_success(
                "verify",
                &format!("{}: {} kick(s)", args.source, descriptors.len()),
            );
            for descriptor in &descriptors {
                println!(
                    "  {} '{}' at position {}",
                    descriptor.id, descriptor.name, descriptor.position
                );
            }
            Ok(())
        }
        Err(err) => {
            print_error("verify", &err.to_string());
            Err(err.into())
        }
    }
}

pub fn run_invoke(args: InvokeArgs) -> anyhow::Result<()> {
    let config = load_config()?;
    if !config.enabled(&args.kick) {
        anyhow::bail!("kick '{}' is disabled by configuration", args.kick);
    }
    let sources = gather_sources(&config, &args.sources);
    let mut registry = build_registry(&config);
    load_sources(&mut registry, &sources);

    let roles = actor_roles(&args.roles, &config);
    let Some(instance) = registry.mount(&args.kick, &roles) else {
        anyhow::bail!("kick '{}' not found or not visible to the actor", args.kick);
    };

    let selection: Vec<SelectionItem> = args
        .items
        .iter()
        .cloned()
        .map(SelectionItem::new)
        .collect();
    match instance.dispatch(&selection) {
        Ok(()) => {
            print_success(
                "invoke",
                &format!(
                    "kick '{}' executed on {} item(s)",
                    args.kick,
                    selection.len()
                ),
            );
            Ok(())
        }
        Err(err) => {
            print_error("invoke", &err.to_string());
            Err(err.into())
        }
    }
}
