use super::{parse_tags, Notebook};
use memos::{Memo, MemoDate};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::io::{self, Write};

/// Field values given on the command line for `new` and `edit`
#[derive(Debug, Default)]
pub struct MemoFields {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<String>,
    pub date: Option<String>,
}

fn apply_fields(notebook: &mut Notebook, id: &str, fields: MemoFields) -> Result<(), String> {
    let store = &mut notebook.store;
    let fail = |e: memos::MemoError| format!("Failed to update [{}]: {}", id, e);

    if let Some(date) = fields.date {
        let date = MemoDate::parse(&date).map_err(|e| e.to_string())?;
        store.set_date(id, date).map_err(fail)?;
    }
    if let Some(title) = fields.title {
        store.set_title(id, title).map_err(fail)?;
    }
    if let Some(content) = fields.content {
        store.set_content(id, content).map_err(fail)?;
    }
    if let Some(tags) = fields.tags {
        store.set_tags(id, parse_tags(&tags)).map_err(fail)?;
    }
    Ok(())
}

/// Run the new command
pub fn run_new(file: Option<&str>, fields: MemoFields) -> Result<(), String> {
    let mut notebook = Notebook::open(file)?;

    // Validate before creating so a bad date leaves no empty memo behind.
    if let Some(date) = fields.date.as_deref() {
        MemoDate::parse(date).map_err(|e| e.to_string())?;
    }

    let title = fields
        .title
        .clone()
        .unwrap_or_else(|| notebook.store.default_title().to_string());

    let id = notebook.store.create_memo();
    apply_fields(&mut notebook, &id, fields)?;
    notebook.save()?;

    println!("Created [{}] {}", id, title);
    Ok(())
}

/// Run the edit command
pub fn run_edit(file: Option<&str>, id: &str, fields: MemoFields) -> Result<(), String> {
    let mut notebook = Notebook::open(file)?;

    if !notebook.store.contains(id) {
        return Err(format!("Memo not found: {}", id));
    }

    apply_fields(&mut notebook, id, fields)?;
    notebook.save()?;

    println!("Updated [{}]", id);
    Ok(())
}

/// Run the rm command
pub fn run_rm(file: Option<&str>, id: &str, force: bool) -> Result<(), String> {
    let mut notebook = Notebook::open(file)?;

    let memo = notebook
        .store
        .get(id)
        .ok_or_else(|| format!("Memo not found: {}", id))?;

    if !force {
        println!("Delete [{}] {}", id, memo.title());

        print!("Confirm? [y/N] ");
        io::stdout().flush().map_err(|e| e.to_string())?;

        let mut input = String::new();
        io::stdin()
            .read_line(&mut input)
            .map_err(|e| e.to_string())?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Cancelled.");
            return Ok(());
        }
    }

    notebook.store.delete_memo(id);
    notebook.save()?;
    println!("Deleted [{}]", id);

    Ok(())
}

/// Run the show command
pub fn run_show(file: Option<&str>, id: &str) -> Result<(), String> {
    let notebook = Notebook::open(file)?;
    let memo = notebook
        .store
        .get(id)
        .ok_or_else(|| format!("Memo not found: {}", id))?;

    println!("[{}] {}", id, memo.title());
    println!("    date: {}", memo.date());
    if !memo.tags().is_empty() {
        println!("    tags: {}", memo.joined_tags(", "));
    }
    println!();
    println!("{}", memo.content());

    Ok(())
}

#[derive(Serialize)]
struct Row<'a> {
    id: &'a str,
    #[serde(flatten)]
    memo: &'a Memo,
}

/// Listing order for `list`
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SortKey {
    Title,
    Date,
}

/// Filters and ordering for the list command
#[derive(Debug, Default)]
pub struct ListOptions {
    pub from: Option<String>,
    pub to: Option<String>,
    pub tags: Vec<String>,
    pub sort: Option<SortKey>,
    pub reverse: bool,
    pub json: bool,
}

/// Run the list command
pub fn run_list(file: Option<&str>, opts: ListOptions) -> Result<(), String> {
    let notebook = Notebook::open(file)?;
    let store = &notebook.store;

    // Unset bounds fall back to the full range of the notebook.
    let bounds = store.date_bounds();
    let from = match opts.from.as_deref() {
        Some(d) => MemoDate::parse(d).map_err(|e| e.to_string())?.to_string(),
        None => bounds.min,
    };
    let to = match opts.to.as_deref() {
        Some(d) => MemoDate::parse(d).map_err(|e| e.to_string())?.to_string(),
        None => bounds.max,
    };

    let mut selected: HashSet<String> = store.filter_by_date(&from, &to).into_iter().collect();
    if !opts.tags.is_empty() {
        let tags: Vec<&str> = opts.tags.iter().map(String::as_str).collect();
        let tagged: HashSet<String> = store.filter_by_tags(&tags).into_iter().collect();
        selected.retain(|id| tagged.contains(id));
    }

    let reverse = opts.reverse;
    let ordered = match opts.sort {
        Some(SortKey::Title) => store.ids_sorted_by(|a, b| {
            let ord = collate(a.title(), b.title());
            if reverse { ord.reverse() } else { ord }
        }),
        Some(SortKey::Date) => store.ids_sorted_by(|a, b| {
            let ord = a.date().cmp(b.date());
            if reverse { ord.reverse() } else { ord }
        }),
        None if reverse => store.ids().into_iter().rev().collect(),
        None => store.ids(),
    };

    let rows: Vec<Row> = ordered
        .iter()
        .filter(|id| selected.contains(*id))
        .filter_map(|id| store.get(id).map(|memo| Row { id, memo }))
        .collect();

    if opts.json {
        let json = serde_json::to_string_pretty(&rows)
            .map_err(|e| format!("Failed to serialize: {}", e))?;
        println!("{}", json);
        return Ok(());
    }

    if rows.is_empty() {
        println!("No memos.");
        return Ok(());
    }

    for row in rows {
        print_memo(row.id, row.memo);
    }

    Ok(())
}

/// Title order for listings: case-insensitive first, then exact bytes so
/// the result is total.
fn collate(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Run the tags command
pub fn run_tags(file: Option<&str>) -> Result<(), String> {
    let notebook = Notebook::open(file)?;
    let tags = notebook.store.tag_counts();

    if tags.is_empty() {
        println!("No tags yet.");
        return Ok(());
    }

    println!("Tags:\n");
    for (tag, count) in tags {
        println!("  {:20} ({})", tag, count);
    }

    Ok(())
}

/// Run the range command
pub fn run_range(file: Option<&str>) -> Result<(), String> {
    let notebook = Notebook::open(file)?;
    let bounds = notebook.store.date_bounds();

    if notebook.store.is_empty() {
        println!("No memos.");
    } else {
        println!("{} - {}", bounds.min, bounds.max);
    }

    Ok(())
}

/// Run the search command
pub fn run_search(file: Option<&str>, query: &str, case_sensitive: bool) -> Result<(), String> {
    let notebook = Notebook::open(file)?;
    let case_sensitive = case_sensitive || notebook.config.case_sensitive();
    let hits = notebook.store.search(query, case_sensitive);

    if hits.is_empty() {
        println!("No matches.");
        return Ok(());
    }

    // Hits arrive grouped by memo, titles first.
    let mut current: Option<(&str, bool)> = None;
    let mut spans: Vec<(usize, usize)> = Vec::new();
    for hit in &hits {
        let key = (hit.id.as_str(), hit.in_title);
        if current.is_some() && current != Some(key) {
            print_hits(&notebook, current, &spans);
            spans.clear();
        }
        current = Some(key);
        spans.push((hit.start, hit.end));
    }
    print_hits(&notebook, current, &spans);

    println!("\n{} match(es)", hits.len());
    Ok(())
}

fn print_hits(notebook: &Notebook, key: Option<(&str, bool)>, spans: &[(usize, usize)]) {
    let Some((id, in_title)) = key else {
        return;
    };
    let Some(memo) = notebook.store.get(id) else {
        return;
    };

    let (label, text) = if in_title {
        ("title", memo.title())
    } else {
        ("content", memo.content())
    };
    println!("[{}] {}: {}", id, label, highlight(text, spans).replace('\n', " "));
}

/// Wrap each `(start, end)` character span of `text` in brackets
fn highlight(text: &str, spans: &[(usize, usize)]) -> String {
    let mut out = String::with_capacity(text.len() + spans.len() * 2);
    for (i, c) in text.chars().enumerate() {
        if spans.iter().any(|&(start, _)| start == i) {
            out.push('[');
        }
        out.push(c);
        if spans.iter().any(|&(_, end)| end == i + 1) {
            out.push(']');
        }
    }
    out
}

/// Run the import command
pub fn run_import(file: Option<&str>, source: &str) -> Result<(), String> {
    let mut notebook = Notebook::open(file)?;

    let ids = notebook
        .store
        .import(source)
        .map_err(|e| format!("Failed to import {}: {}", source, e))?;
    notebook.save()?;

    match (ids.first(), ids.last()) {
        (Some(first), Some(last)) => {
            println!("Imported {} memo(s) as [{}]..[{}]", ids.len(), first, last)
        }
        _ => println!("Nothing to import."),
    }
    Ok(())
}

/// Run the export command
pub fn run_export(file: Option<&str>, out: &str, ids: &[String]) -> Result<(), String> {
    let notebook = Notebook::open(file)?;
    let ids: Vec<&str> = ids.iter().map(String::as_str).collect();

    for id in &ids {
        if !notebook.store.contains(id) {
            eprintln!("Skipping unknown memo [{}]", id);
        }
    }

    notebook
        .store
        .export(out, Some(ids.as_slice()))
        .map_err(|e| format!("Failed to export: {}", e))?;

    println!("Exported to {}", out);
    Ok(())
}

fn print_memo(id: &str, m: &Memo) {
    println!("[{}] {}  {}", id, m.date(), m.title());

    if !m.tags().is_empty() {
        println!("    tags: {}", m.joined_tags(", "));
    }

    // Truncate content for display
    let preview: String = m.content().chars().take(200).collect();
    let preview = if m.content().chars().count() > 200 {
        format!("{}...", preview)
    } else {
        preview
    };
    let preview = preview.replace('\n', " ");
    if !preview.is_empty() {
        println!("    {}", preview);
    }
    println!();
}
