/// Event Linter — validates event content against authoring rules.
///
/// Usage: event_linter <events_file> [--world <world_file>]

use std::collections::HashSet;
use std::path::Path;
use std::process;

use straits_engine::core::template::{Template, PLACEHOLDERS};
use straits_engine::schema::event::{EventPools, EventTemplate, PoolName};
use straits_engine::schema::world::WorldRegistry;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        println!("Usage: event_linter <events_file> [--world <world_file>]");
        process::exit(0);
    }

    let events_path = Path::new(&args[1]);
    let mut world_path = None;

    let mut i = 2;
    while i < args.len() {
        if args[i] == "--world" && i + 1 < args.len() {
            i += 1;
            world_path = Some(args[i].clone());
        }
        i += 1;
    }

    let events = match EventPools::load(events_path) {
        Ok(events) => events,
        Err(e) => {
            eprintln!("ERROR: Failed to load events: {}", e);
            process::exit(1);
        }
    };

    let world = match world_path {
        Some(ref path) => match WorldRegistry::load(Path::new(path)) {
            Ok(world) => Some(world),
            Err(e) => {
                eprintln!("ERROR: Failed to load world: {}", e);
                process::exit(1);
            }
        },
        None => None,
    };

    println!("Loaded {} events", events.len());

    let (errors, warnings) = lint_events(&events, world.as_ref());

    println!("\n=== Event Lint Report ===\n");

    if errors.is_empty() && warnings.is_empty() {
        println!("All checks passed!");
    }

    for warning in &warnings {
        println!("WARNING: {}", warning);
    }

    for error in &errors {
        println!("ERROR: {}", error);
    }

    println!(
        "\nSummary: {} errors, {} warnings",
        errors.len(),
        warnings.len()
    );

    if errors.is_empty() {
        process::exit(0);
    } else {
        process::exit(1);
    }
}

fn lint_events(events: &EventPools, world: Option<&WorldRegistry>) -> (Vec<String>, Vec<String>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    for pool in PoolName::ALL {
        let mut seen_ids = HashSet::new();

        for event in events.pool(pool) {
            if !seen_ids.insert(event.id.as_str()) {
                errors.push(format!("Duplicate event id '{}' in {}", event.id, pool));
            }

            if event.options.is_empty() {
                errors.push(format!("Event '{}' in {} has no options", event.id, pool));
            }

            for text in event_texts(event) {
                check_template(&event.id, pool, text, &mut errors);
            }

            if pool.is_ambient() && event.when.is_some() {
                warnings.push(format!(
                    "Event '{}' in {} has a trigger, which ambient pools ignore",
                    event.id, pool
                ));
            }

            if !pool.is_ambient() && event.when.is_none() {
                warnings.push(format!(
                    "Special event '{}' has no trigger and will fire at every landfall",
                    event.id
                ));
            }

            for (role, variant) in &event.variants {
                for key in variant.options.keys() {
                    if !event.options.contains_key(key) {
                        warnings.push(format!(
                            "Event '{}' variant for {} adds option '{}' missing from the base",
                            event.id, role, key
                        ));
                    }
                }
            }

            if let (Some(world), Some(when)) = (world, &event.when) {
                for name in &when.location {
                    if !world.is_known_place(name) {
                        warnings.push(format!(
                            "Event '{}' triggers at '{}', which is not in the world data",
                            event.id, name
                        ));
                    }
                }
            }
        }
    }

    if let Some(world) = world {
        for master in &world.data().harbor_masters {
            if !world.major_ports().iter().any(|port| port.name == master.port) {
                warnings.push(format!(
                    "Harbor master '{}' serves '{}', which is not a major port",
                    master.name, master.port
                ));
            }
        }
    }

    (errors, warnings)
}

/// Every templated string an event can show, including variant overrides.
fn event_texts(event: &EventTemplate) -> Vec<&str> {
    let mut texts = vec![event.description.as_str()];
    texts.extend(event.options.values().map(|option| option.text.as_str()));
    for variant in event.variants.values() {
        texts.extend(variant.description.as_deref());
        texts.extend(
            variant
                .options
                .values()
                .filter_map(|patch| patch.text.as_deref()),
        );
    }
    texts
}

fn check_template(event_id: &str, pool: PoolName, text: &str, errors: &mut Vec<String>) {
    let template = match Template::parse(text) {
        Ok(template) => template,
        Err(e) => {
            errors.push(format!(
                "Event '{}' in {} has malformed text ({}): {:?}",
                event_id, pool, e, text
            ));
            return;
        }
    };
    for name in template.placeholders() {
        let known = PLACEHOLDERS.contains(&name)
            || matches!(name, "currentPort" | "harbormasterName" | "harborFee");
        if !known {
            errors.push(format!(
                "Event '{}' in {} uses unknown placeholder '{{{}}}'",
                event_id, pool, name
            ));
        }
    }
}
