//! Command execution against a loaded `ContentManager`.

use crate::error::CliError;
use crate::Command;
use janio_core::{
    AppConfig, Category, CategoryId, ContentManager, Item, ItemDraft, ItemId, ItemKind,
    ItemStore, Mutation, NoticeKind, ToastQueue,
};
use log::info;
use serde_json::{json, Value};
use std::process::ExitCode;

type Manager<'q, S> = ContentManager<S, &'q ToastQueue>;

/// Loads the catalog, runs `command` and reports raised notices.
pub(crate) fn execute<S: ItemStore>(
    store: S,
    config: &AppConfig,
    command: Command,
    json: bool,
) -> Result<ExitCode, CliError> {
    let toasts = ToastQueue::new();
    let mut manager = ContentManager::new(store, &toasts, &config.manager_config());
    manager.reload();

    let result = run_command(&mut manager, command, json);
    let failed = report_toasts(&toasts);
    result?;

    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn run_command<S: ItemStore>(
    manager: &mut Manager<'_, S>,
    command: Command,
    json: bool,
) -> Result<(), CliError> {
    match command {
        Command::Categories => {
            let categories = manager.categories().to_vec();
            if json {
                let rows: Vec<Value> = categories.iter().map(category_json).collect();
                print_json(&Value::Array(rows))?;
            } else {
                for category in &categories {
                    let marker = if category.is_task_like() { "  [tasks]" } else { "" };
                    println!("{:<18} {}{marker}", category.id, category.name);
                }
            }
        }
        Command::List { category } => {
            let categories: Vec<Category> = match category {
                Some(id) => manager
                    .categories()
                    .iter()
                    .copied()
                    .filter(|category| category.id == id)
                    .collect(),
                None => manager.categories().to_vec(),
            };
            if json {
                let mut listing = serde_json::Map::new();
                for category in &categories {
                    let items = serde_json::to_value(manager.sorted_items(category.id))
                        .map_err(CliError::Output)?;
                    listing.insert(category.id.to_string(), items);
                }
                print_json(&Value::Object(listing))?;
            } else {
                for category in &categories {
                    let items = manager.sorted_items(category.id);
                    println!("# {} ({})", category.name, items.len());
                    for item in &items {
                        println!("{}", item_line(item));
                    }
                }
            }
        }
        Command::Add {
            category,
            title,
            description,
            due,
            id,
        } => {
            let draft = ItemDraft {
                id,
                title,
                description,
                order: None,
                due_date: due,
            };
            let item = manager.create_item(category, draft)?;
            info!(
                "event=cli_command module=cli status=ok command=add category={} item_id={}",
                category, item.id
            );
            print_item(&item, json)?;
        }
        Command::Edit {
            category,
            id,
            title,
            description,
            due,
            order,
        } => {
            let mut item = find_item(manager, category, &id)?;
            if let Some(title) = title {
                item.title = title;
            }
            if let Some(description) = description {
                item.description = description;
            }
            if let Some(order) = order {
                item.order = order;
            }
            if let (Some(due), ItemKind::Task { due_date }) = (due, &mut item.kind) {
                *due_date = due;
            }
            let saved = manager.update_item(item, Some(category))?;
            info!(
                "event=cli_command module=cli status=ok command=edit category={} item_id={}",
                category, saved.id
            );
            print_item(&saved, json)?;
        }
        Command::Delete { category, id } => {
            let item_id = ItemId::parse(id)?;
            manager.delete_item(&item_id, Some(category))?;
            if json {
                print_json(&json!({ "deleted": item_id, "category": category }))?;
            } else {
                println!("deleted {item_id}");
            }
        }
        Command::Move {
            category,
            id,
            position,
        } => {
            if position == 0 {
                return Err(CliError::InvalidPosition(position));
            }
            let item = find_item(manager, category, &id)?;
            manager.move_item(&item.id, position - 1, Some(category))?;
            let items = manager.sorted_items(category);
            if json {
                print_json(&serde_json::to_value(&items).map_err(CliError::Output)?)?;
            } else {
                for item in &items {
                    println!("{}", item_line(item));
                }
            }
        }
        Command::Apply { payload } => {
            let value: Value = serde_json::from_str(&payload).map_err(CliError::Payload)?;
            let mutation = Mutation::from_json(&value)?;
            manager.store().apply_mutation(&mutation)?;
            info!(
                "event=cli_command module=cli status=ok command=apply action={} category={}",
                mutation.action(),
                mutation.category()
            );
            if json {
                print_json(&mutation.to_json())?;
            } else {
                println!("applied {} to {}", mutation.action(), mutation.category());
            }
        }
    }
    Ok(())
}

fn find_item<S: ItemStore>(
    manager: &Manager<'_, S>,
    category: CategoryId,
    id: &str,
) -> Result<Item, CliError> {
    manager
        .items(category)
        .iter()
        .find(|item| item.id.as_str() == id)
        .cloned()
        .ok_or_else(|| CliError::UnknownItem {
            category,
            id: id.to_string(),
        })
}

/// Prints queued notices to stderr; true when any was an error.
fn report_toasts(toasts: &ToastQueue) -> bool {
    let mut failed = false;
    for toast in toasts.drain() {
        let notice = toast.notice;
        failed |= notice.kind == NoticeKind::Error;
        match notice.description {
            Some(description) => {
                eprintln!("{}: {} {description}", notice.kind.as_str(), notice.title)
            }
            None => eprintln!("{}: {}", notice.kind.as_str(), notice.title),
        }
    }
    failed
}

fn category_json(category: &Category) -> Value {
    json!({
        "id": category.id,
        "name": category.name,
        "taskLike": category.is_task_like(),
    })
}

fn item_line(item: &Item) -> String {
    match item.due_date() {
        Some(due) if !due.is_empty() => {
            format!("{:>3}. {} (due {due}) [{}]", item.order, item.title, item.id)
        }
        _ => format!("{:>3}. {} [{}]", item.order, item.title, item.id),
    }
}

fn print_item(item: &Item, json: bool) -> Result<(), CliError> {
    if json {
        print_json(&serde_json::to_value(item).map_err(CliError::Output)?)
    } else {
        println!("{}", item_line(item));
        Ok(())
    }
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let text = serde_json::to_string_pretty(value).map_err(CliError::Output)?;
    println!("{text}");
    Ok(())
}
