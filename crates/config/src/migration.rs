use super::errors::ConfigError;
use std::path::Path;
use std::sync::Arc;
use toml_edit::{DocumentMut, Item, Table, Value};

type Result<T> = std::result::Result<T, ConfigError>;

/// Migrates config file to latest format if needed
pub async fn migrate_config_if_needed<P: AsRef<Path>>(
    path: P,
    events: Option<&Arc<bucketsync_events::EventBus>>,
) -> Result<()> {
    let content = tokio::fs::read_to_string(path.as_ref()).await?;
    let mut doc = content.parse::<DocumentMut>()?;

    let added_fields = migrate_document(&mut doc)?;

    // Only write if we added fields
    if !added_fields.is_empty() {
        tokio::fs::write(path.as_ref(), doc.to_string()).await?;

        if let Some(event_bus) = events {
            event_bus.emit(bucketsync_events::AppEvent::ConfigMigrated {
                added_fields: added_fields.clone(),
            });
        }
    }

    Ok(())
}

fn migrate_document(doc: &mut DocumentMut) -> Result<Vec<String>> {
    let mut added_fields = Vec::new();

    migrate_bucket_section(doc, &mut added_fields)?;
    migrate_sync_section(doc, &mut added_fields)?;
    migrate_storage_section(doc, &mut added_fields)?;

    Ok(added_fields)
}

fn migrate_bucket_section(
    doc: &mut DocumentMut,
    added_fields: &mut Vec<String>,
) -> Result<()> {
    let bucket = ensure_table(doc.as_table_mut(), "bucket", "bucket", added_fields)?;
    ensure_field(bucket, "bucket.name", Value::from("bucketsync-test"), added_fields);
    ensure_field(bucket, "bucket.region", Value::from("eu-central-1"), added_fields);
    ensure_field(bucket, "bucket.public_read", Value::from(true), added_fields);
    Ok(())
}

fn migrate_sync_section(
    doc: &mut DocumentMut,
    added_fields: &mut Vec<String>,
) -> Result<()> {
    let sync = ensure_table(doc.as_table_mut(), "sync", "sync", added_fields)?;
    ensure_field(sync, "sync.source_dir", Value::from("files"), added_fields);
    ensure_field(sync, "sync.download_dir", Value::from("."), added_fields);
    ensure_field(sync, "sync.list_mode", Value::from("all"), added_fields);
    Ok(())
}

fn migrate_storage_section(
    doc: &mut DocumentMut,
    added_fields: &mut Vec<String>,
) -> Result<()> {
    let storage = ensure_table(doc.as_table_mut(), "storage", "storage", added_fields)?;
    ensure_field(storage, "storage.backend", Value::from("s3"), added_fields);

    let s3 = ensure_table(storage, "s3", "storage.s3", added_fields)?;
    ensure_field(s3, "storage.s3.endpoint_url", Value::from(""), added_fields);
    ensure_field(s3, "storage.s3.access_key_id", Value::from(""), added_fields);
    ensure_field(s3, "storage.s3.secret_access_key", Value::from(""), added_fields);
    ensure_field(s3, "storage.s3.force_path_style", Value::from(false), added_fields);

    let local = ensure_table(storage, "local", "storage.local", added_fields)?;
    ensure_field(local, "storage.local.root", Value::from("bucketsync-local"), added_fields);
    ensure_field(local, "storage.local.owner", Value::from("local"), added_fields);
    ensure_field(local, "storage.local.page_size", Value::from(1000), added_fields);

    Ok(())
}

fn ensure_table<'a>(
    parent: &'a mut Table,
    key: &str,
    label: &str,
    added_fields: &mut Vec<String>,
) -> Result<&'a mut Table> {
    if !parent.contains_key(key) {
        let mut table = Table::new();
        table.set_implicit(true);
        parent.insert(key, Item::Table(table));
        added_fields.push(label.to_string());
    }

    parent[key]
        .as_table_mut()
        .ok_or_else(|| ConfigError::MigrationError(format!("[{}] is not a table", label)))
}

fn ensure_field(
    table: &mut Table,
    label: &str,
    default_value: Value,
    added_fields: &mut Vec<String>,
) {
    let key = label.rsplit('.').next().unwrap_or(label);
    if !table.contains_key(key) {
        table[key] = Item::Value(default_value);
        added_fields.push(label.to_string());
    }
}
