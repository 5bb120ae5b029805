//! Handlers for the record mutation and listing commands.

use crate::args::{AddArgs, DeleteArgs, EditArgs, ListArgs};
use crate::commands::Out;
use crate::model::{parse_date, MatchFields, Record};
use crate::{Error, Store};
use anyhow::Result;
use tracing::debug;

/// Adds a record built from the command-line arguments.
pub fn add(store: &mut Store, args: &AddArgs) -> Result<Out<Record>> {
    let record = Record {
        date: args.date().to_string(),
        amount: args.amount(),
        category: args.category().to_string(),
        description: args.description().to_string(),
        recurring: args.recurring(),
    };
    let id = store.add(args.kind(), record.clone())?;
    debug!("added {} record {id}", args.kind());
    Ok(Out::new(
        format!(
            "Added {} record: {} {} in {}",
            args.kind(),
            record.date,
            record.amount,
            record.category
        ),
        record,
    ))
}

/// Edits the record matching the given fields, keeping the old value for
/// every field without a replacement.
pub fn edit(store: &mut Store, args: &EditArgs) -> Result<Out<Record>> {
    let criteria = MatchFields::new(
        args.date(),
        args.amount(),
        args.category(),
        args.description(),
    );
    let entry = store.find(args.kind(), &criteria).ok_or_else(|| {
        Error::NotFound(format!("no matching {} record to edit", args.kind()))
    })?;
    let id = entry.id();
    let old = entry.record().clone();

    let new_record = Record {
        date: args
            .new_date()
            .map(str::to_string)
            .unwrap_or_else(|| old.date.clone()),
        amount: args.new_amount().unwrap_or(old.amount),
        category: args
            .new_category()
            .map(str::to_string)
            .unwrap_or_else(|| old.category.clone()),
        description: args
            .new_description()
            .map(str::to_string)
            .unwrap_or_else(|| old.description.clone()),
        recurring: args.new_recurring().unwrap_or(old.recurring),
    };
    store.edit_by_id(args.kind(), id, new_record.clone())?;
    debug!("edited {} record {id}", args.kind());
    Ok(Out::new(
        format!(
            "Edited {} record: {} {} in {}",
            args.kind(),
            new_record.date,
            new_record.amount,
            new_record.category
        ),
        new_record,
    ))
}

/// Deletes the record matching the given fields.
pub fn delete(store: &mut Store, args: &DeleteArgs) -> Result<Out<Record>> {
    let criteria = MatchFields::new(
        args.date(),
        args.amount(),
        args.category(),
        args.description(),
    );
    let removed = store.delete(args.kind(), &criteria)?;
    Ok(Out::new(
        format!(
            "Deleted {} record: {} {} in {}",
            args.kind(),
            removed.date,
            removed.amount,
            removed.category
        ),
        removed,
    ))
}

/// Lists records of one kind, newest first, optionally restricted to an
/// inclusive date range. Both bounds are required when either is given.
pub fn list(store: &Store, args: &ListArgs) -> Result<Out<Vec<Record>>> {
    let mut records: Vec<Record> = match (args.start(), args.end()) {
        (Some(start), Some(end)) => store
            .query_by_date_range(args.kind(), parse_date(start)?, parse_date(end)?)?
            .into_iter()
            .cloned()
            .collect(),
        (None, None) => store.records(args.kind()).cloned().collect(),
        _ => {
            return Err(Error::Validation(
                "--start and --end must be given together".to_string(),
            )
            .into())
        }
    };
    // The canonical date format sorts correctly as a string.
    records.sort_by(|a, b| b.date.cmp(&a.date));

    if records.is_empty() {
        return Ok(Out::new(format!("No {} records found.", args.kind()), records));
    }
    let mut message = format!("{} {} record(s):", records.len(), args.kind());
    for record in &records {
        message.push_str(&format!(
            "\n{} {} {} {}{}",
            record.date,
            record.amount,
            record.category,
            record.description,
            if record.recurring { " (recurring)" } else { "" }
        ));
    }
    Ok(Out::new(message, records))
}
