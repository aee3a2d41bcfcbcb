use anyhow::{Context, Result};
use clap::Parser;
use heap_navigator::cli::{Cli, Commands, OutputFormat};
use heap_navigator::config::{init_logging, resolve_excludes_path, resolve_snapshot_path};
use heap_navigator::dump;
use heap_navigator::excludes::ExcludedFields;
use heap_navigator::memory::MemoryHeap;
use heap_navigator::model::{Instance, ObjectId, format_id};
use heap_navigator::navigator::HeapNavigator;
use heap_navigator::report::{
    Listing, ObjectView, RenderedValue, RootPath, RootView, SnapshotSummary,
};
use serde::Serialize;
use std::fmt::Display;
use tracing::debug;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let snapshot_path = resolve_snapshot_path(&cli)?;
    let snapshot = dump::load(&snapshot_path)?;
    debug!(path = %snapshot.path.display(), digest = %snapshot.digest, "loaded snapshot");

    let path = snapshot.path.to_string_lossy().to_string();
    let digest = snapshot.digest;
    let mut navigator = HeapNavigator::new(snapshot.heap);

    let mut excluded_fields = None;
    if let Some(excludes_path) = resolve_excludes_path(&cli)? {
        let excludes = ExcludedFields::load(&excludes_path)?;
        excluded_fields = Some(excludes.len());
        navigator.set_reachable_excludes(Box::new(excludes));
    }

    let format = cli.format;
    match cli.command {
        Commands::Summary => {
            let heap = navigator.heap();
            let summary = SnapshotSummary {
                path,
                digest,
                classes: heap.class_count(),
                instances: heap.instance_count(),
                roots: heap.root_count(),
                weak_reference_class: navigator.weak_reference_class().map(|c| c.name.clone()),
                referent_field_index: navigator.referent_field_index(),
                reachable_excludes: excluded_fields,
            };
            write_output(&summary, format)?;
        }
        Commands::Class { descriptor } => {
            let class = navigator
                .resolve_class(&descriptor)
                .with_context(|| format!("Class not found: {descriptor}"))?;
            write_output(&ObjectView::of(&navigator, class.into()), format)?;
        }
        Commands::Instance { id } => {
            let object = navigator
                .find_object(id)
                .with_context(|| format!("Object not found: {}", format_id(id)))?;
            write_output(&ObjectView::of(&navigator, object), format)?;
        }
        Commands::Root { id } => {
            let instance = find_instance(&navigator, id)?;
            write_output(&RootPath::of(&navigator, instance), format)?;
        }
        Commands::Classes { pattern } => match pattern {
            Some(pattern) => {
                let names: Vec<String> = navigator
                    .class_names(&pattern)
                    .with_context(|| format!("Invalid class name pattern: {pattern}"))?
                    .map(str::to_string)
                    .collect();
                write_output(&Listing(names), format)?;
            }
            None => {
                let classes = navigator
                    .classes()
                    .map(|c| ObjectView::of(&navigator, c.into()))
                    .collect();
                write_output(&Listing(classes), format)?;
            }
        },
        Commands::Instances {
            descriptor,
            subclasses,
            limit,
        } => {
            let class = navigator
                .resolve_class(&descriptor)
                .with_context(|| format!("Class not found: {descriptor}"))?;
            let instances = navigator
                .instances_of(class, subclasses)
                .take(limit.unwrap_or(usize::MAX))
                .map(|i| ObjectView::instance(&navigator, i))
                .collect();
            write_output(&Listing(instances), format)?;
        }
        Commands::Referrers { id, weak } => {
            let target = navigator
                .find_object(id)
                .with_context(|| format!("Object not found: {}", format_id(id)))?;
            let referrers = navigator
                .referrers(target, weak)
                .map(|o| ObjectView::of(&navigator, o))
                .collect();
            write_output(&Listing(referrers), format)?;
        }
        Commands::Referees { id, weak } => {
            let source = navigator
                .find_object(id)
                .with_context(|| format!("Object not found: {}", format_id(id)))?;
            let referees = navigator
                .referees(source, weak)
                .map(|o| ObjectView::of(&navigator, o))
                .collect();
            write_output(&Listing(referees), format)?;
        }
        Commands::Finalizers => {
            let pending = navigator
                .finalizer_objects()
                .map(|i| ObjectView::instance(&navigator, i))
                .collect();
            write_output(&Listing(pending), format)?;
        }
        Commands::Roots { objects } => {
            if objects {
                let objects = navigator
                    .root_objects()
                    .into_iter()
                    .map(|o| ObjectView::of(&navigator, o))
                    .collect();
                write_output(&Listing(objects), format)?;
            } else {
                let roots = navigator
                    .roots()
                    .map(|r| RootView::of(&navigator, r))
                    .collect();
                write_output(&Listing(roots), format)?;
            }
        }
        Commands::Render { id } => {
            let instance = find_instance(&navigator, id)?;
            let rendered = RenderedValue {
                id: format_id(id),
                value: navigator.render(Some(instance)),
            };
            write_output(&rendered, format)?;
        }
    }

    Ok(())
}

fn find_instance(
    navigator: &HeapNavigator<MemoryHeap>,
    id: ObjectId,
) -> Result<&Instance> {
    navigator
        .find_instance(id)
        .with_context(|| format!("Instance not found: {}", format_id(id)))
}

fn write_output<T: Serialize + Display>(value: &T, format: OutputFormat) -> Result<()> {
    let content = match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)?,
        OutputFormat::Text => value.to_string(),
    };
    print!("{content}");
    if !content.ends_with('\n') {
        println!();
    }
    Ok(())
}
