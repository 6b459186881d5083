use std::io::{self, Write};

use anyhow::{Context, Result};
use blocknotes::config::LOG_VAR;
use blocknotes::search::extract_text;
use blocknotes::utils::{
    ensure_database_directory, format_tag_list, format_timestamp, parse_tags, preview,
};
use blocknotes::{
    Config, Database, EmptyMatch, Note, NoteId, NoteService, TagId, TagSort, search,
};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

const PREVIEW_CHARS: usize = 72;

/// blocknotes - rich-text notes with tag filtering and fuzzy search
#[derive(Parser)]
#[command(name = "blocknotes")]
#[command(about = "Rich-text notes with tag filters and fuzzy search")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Add a new note with optional tags
    Add(AddCommand),
    /// List all notes, newest first
    List(ListCommand),
    /// Show a single note
    Show(ShowCommand),
    /// Change a note's title or content
    Edit(EditCommand),
    /// Delete a note
    Delete(DeleteCommand),
    /// Replace a note's tags
    Tag(TagCommand),
    /// List all tags with usage counts
    Tags,
    /// Rename or recolor a tag
    TagEdit(TagEditCommand),
    /// Delete a tag and its links
    TagDelete(TagDeleteCommand),
    /// Search notes by text and tags
    Search(SearchCommand),
    /// Show or set the tag ordering
    Sort(SortCommand),
    /// Open the interactive browser
    Tui,
}

#[derive(Parser)]
struct AddCommand {
    /// Title of the note
    #[arg(value_name = "TITLE")]
    title: String,

    /// Note content: a rich-text JSON document or plain text
    #[arg(short, long, value_name = "CONTENT")]
    content: Option<String>,

    /// Comma-separated tags to apply to the note
    #[arg(short, long, value_name = "TAGS")]
    tags: Option<String>,
}

#[derive(Parser)]
struct ListCommand {
    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Parser)]
struct ShowCommand {
    #[arg(value_name = "ID")]
    id: i64,
}

#[derive(Parser)]
struct EditCommand {
    #[arg(value_name = "ID")]
    id: i64,

    /// New title
    #[arg(long, value_name = "TITLE")]
    title: Option<String>,

    /// New content
    #[arg(short, long, value_name = "CONTENT")]
    content: Option<String>,
}

#[derive(Parser)]
struct DeleteCommand {
    #[arg(value_name = "ID")]
    id: i64,
}

#[derive(Parser)]
struct TagCommand {
    /// Note to tag
    #[arg(value_name = "ID")]
    id: i64,

    /// Comma-separated tag names; an empty string removes all tags
    #[arg(value_name = "TAGS")]
    tags: String,
}

#[derive(Parser)]
struct TagEditCommand {
    #[arg(value_name = "ID")]
    id: i64,

    /// New name
    #[arg(short, long, value_name = "NAME")]
    name: Option<String>,

    /// New color
    #[arg(long, value_name = "COLOR", conflicts_with = "no_color")]
    color: Option<String>,

    /// Remove the tag's color
    #[arg(long)]
    no_color: bool,
}

#[derive(Parser)]
struct TagDeleteCommand {
    #[arg(value_name = "ID")]
    id: i64,
}

#[derive(Parser)]
struct SearchCommand {
    /// Fuzzy text query; empty matches every note
    #[arg(value_name = "QUERY", default_value = "")]
    query: String,

    /// Only notes carrying this tag (repeatable, all must match)
    #[arg(short, long = "tag", value_name = "TAG")]
    tags: Vec<String>,

    /// Facet ordering: count or name (defaults to the stored setting)
    #[arg(long, value_name = "SORT")]
    sort: Option<TagSort>,

    /// Show every tag-filtered note when the query matches nothing
    #[arg(long)]
    fallback_all: bool,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Parser)]
struct SortCommand {
    /// New ordering: count or name
    #[arg(value_name = "SORT")]
    sort: Option<TagSort>,
}

fn main() {
    let cli = Cli::parse();

    let dotenv = blocknotes::config::load_dotenv();
    init_logging(matches!(cli.command, Commands::Tui));
    if let Some(path) = &dotenv {
        tracing::debug!(path = %path.display(), "loaded .env file");
    }

    let result = Config::from_env()
        .context("Invalid configuration")
        .and_then(|config| run(&cli.command, &config));

    if let Err(e) = result {
        // Determine exit code based on error type
        let exit_code = if is_user_error(&e) { 1 } else { 2 };
        eprintln!("Error: {e:#}");
        std::process::exit(exit_code);
    }
}

/// Installs the stderr log subscriber.
///
/// The filter comes from `BLOCKNOTES_LOG`, then `RUST_LOG`, then `warn`.
/// The TUI owns the terminal, so it logs nothing unless a filter is set.
fn init_logging(interactive: bool) {
    let directive = std::env::var(LOG_VAR)
        .ok()
        .or_else(|| std::env::var("RUST_LOG").ok())
        .filter(|d| !d.trim().is_empty());

    let filter = match directive {
        Some(d) => EnvFilter::try_new(d).unwrap_or_else(|_| EnvFilter::new("warn")),
        None if interactive => EnvFilter::new("off"),
        None => EnvFilter::new("warn"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Determines if an error is a user error (vs internal error).
///
/// User errors are validation failures anywhere in the context chain.
/// Internal errors include database failures and I/O errors.
fn is_user_error(error: &anyhow::Error) -> bool {
    error.chain().any(|cause| {
        cause
            .downcast_ref::<blocknotes::Error>()
            .is_some_and(blocknotes::Error::is_validation)
    })
}

/// Builds the validation error reported for bad ids and names.
fn invalid(field: &str, message: impl Into<String>) -> blocknotes::Error {
    blocknotes::Error::validation(field, message)
}

fn run(command: &Commands, config: &Config) -> Result<()> {
    if let Commands::Tui = command {
        return blocknotes::tui::run(config);
    }

    let service = open_service(config)?;
    let mut out = io::stdout().lock();
    execute(command, &service, config, &mut out)
}

fn open_service(config: &Config) -> Result<NoteService> {
    let db_path = config
        .database_path()
        .context("Failed to get database path")?;
    ensure_database_directory(&db_path)?;
    let db = Database::open(&db_path).context("Failed to open database")?;
    Ok(NoteService::new(db))
}

/// Executes a non-interactive command against `service`.
///
/// Separated from `run` so tests can use in-memory databases and capture output.
fn execute(
    command: &Commands,
    service: &NoteService,
    config: &Config,
    out: &mut impl Write,
) -> Result<()> {
    match command {
        Commands::Add(cmd) => execute_add(service, cmd, out),
        Commands::List(cmd) => execute_list(service, cmd, out),
        Commands::Show(cmd) => execute_show(service, NoteId::new(cmd.id), out),
        Commands::Edit(cmd) => execute_edit(service, cmd, out),
        Commands::Delete(cmd) => {
            service
                .delete_note(NoteId::new(cmd.id))
                .context("Failed to delete note")?;
            writeln!(out, "Note deleted (id: {})", cmd.id)?;
            Ok(())
        }
        Commands::Tag(cmd) => execute_tag(service, cmd, out),
        Commands::Tags => execute_tags(service, out),
        Commands::TagEdit(cmd) => execute_tag_edit(service, cmd, out),
        Commands::TagDelete(cmd) => {
            service
                .delete_tag(TagId::new(cmd.id))
                .context("Failed to delete tag")?;
            writeln!(out, "Tag deleted (id: {})", cmd.id)?;
            Ok(())
        }
        Commands::Search(cmd) => execute_search(service, cmd, config, out),
        Commands::Sort(cmd) => execute_sort(service, cmd, out),
        Commands::Tui => anyhow::bail!("the tui command needs a terminal"),
    }
}

fn execute_add(service: &NoteService, cmd: &AddCommand, out: &mut impl Write) -> Result<()> {
    let note = service
        .create_note(&cmd.title, cmd.content.as_deref())
        .context("Failed to create note")?;

    let names = cmd.tags.as_deref().map(parse_tags).unwrap_or_default();
    if !names.is_empty() {
        let desired = service.resolve_tag_names(&names)?;
        service
            .save_tags(note.id(), &desired)
            .context("Failed to tag note")?;
    }

    write!(out, "Note created (id: {})", note.id())?;
    if !names.is_empty() {
        write!(out, " with tags: {}", names.join(", "))?;
    }
    writeln!(out)?;
    Ok(())
}

fn execute_list(service: &NoteService, cmd: &ListCommand, out: &mut impl Write) -> Result<()> {
    let notes = service.list_notes().context("Failed to list notes")?;

    if cmd.json {
        writeln!(out, "{}", serde_json::to_string_pretty(&notes)?)?;
        return Ok(());
    }
    if notes.is_empty() {
        writeln!(out, "No notes found.")?;
        return Ok(());
    }
    write_notes(&notes, out)
}

fn write_notes(notes: &[Note], out: &mut impl Write) -> Result<()> {
    for note in notes {
        writeln!(
            out,
            "[{}] {} ({})",
            note.id(),
            note.title(),
            format_timestamp(note.created_at())
        )?;
        let text = preview(note, PREVIEW_CHARS);
        if !text.is_empty() {
            writeln!(out, "    {text}")?;
        }
        if !note.tags().is_empty() {
            writeln!(out, "    {}", format_tag_list(note))?;
        }
    }
    Ok(())
}

fn execute_show(service: &NoteService, id: NoteId, out: &mut impl Write) -> Result<()> {
    let note = service
        .get_note(id)
        .context("Failed to load note")?
        .ok_or_else(|| invalid("note_id", format!("note {id} does not exist")))?;

    writeln!(out, "{}", note.title())?;
    writeln!(out, "id:      {}", note.id())?;
    writeln!(out, "created: {}", format_timestamp(note.created_at()))?;
    writeln!(out, "updated: {}", format_timestamp(note.updated_at()))?;
    if !note.tags().is_empty() {
        writeln!(out, "tags:    {}", format_tag_list(&note))?;
    }
    writeln!(out)?;
    writeln!(out, "{}", extract_text(note.content()))?;
    Ok(())
}

fn execute_edit(service: &NoteService, cmd: &EditCommand, out: &mut impl Write) -> Result<()> {
    if cmd.title.is_none() && cmd.content.is_none() {
        return Err(invalid("edit", "nothing to change; pass --title or --content").into());
    }

    let id = NoteId::new(cmd.id);
    let current = service
        .get_note(id)
        .context("Failed to load note")?
        .ok_or_else(|| invalid("note_id", format!("note {id} does not exist")))?;

    let title = cmd.title.as_deref().unwrap_or(current.title());
    let content = cmd.content.as_deref().unwrap_or(current.content());
    let note = service
        .update_note(id, title, content)
        .context("Failed to update note")?;

    writeln!(out, "Note updated (id: {}): {}", note.id(), note.title())?;
    Ok(())
}

fn execute_tag(service: &NoteService, cmd: &TagCommand, out: &mut impl Write) -> Result<()> {
    let id = NoteId::new(cmd.id);
    let desired = service.resolve_tag_names(&parse_tags(&cmd.tags))?;
    let report = service
        .save_tags(id, &desired)
        .context("Failed to save tags")?;

    if report.is_noop() {
        writeln!(out, "Tags unchanged for note {id}")?;
    } else {
        writeln!(
            out,
            "Tags saved for note {id}: {} created, {} linked, {} unlinked",
            report.created.len(),
            report.linked.len(),
            report.unlinked.len()
        )?;
    }
    Ok(())
}

fn execute_tags(service: &NoteService, out: &mut impl Write) -> Result<()> {
    let facets = service.tag_counts().context("Failed to count tags")?;
    if facets.is_empty() {
        writeln!(out, "No tags.")?;
        return Ok(());
    }
    for facet in &facets {
        writeln!(
            out,
            "[{}] {} ({})",
            facet.tag.id(),
            facet.tag.name(),
            facet.count
        )?;
    }
    Ok(())
}

fn execute_tag_edit(
    service: &NoteService,
    cmd: &TagEditCommand,
    out: &mut impl Write,
) -> Result<()> {
    let id = TagId::new(cmd.id);
    let current = service
        .get_tag(id)
        .context("Failed to load tag")?
        .ok_or_else(|| invalid("tag_id", format!("tag {id} does not exist")))?;

    let name = cmd.name.as_deref().unwrap_or(current.name());
    let color = if cmd.no_color {
        None
    } else {
        cmd.color.as_deref().or(current.color())
    };
    let tag = service
        .update_tag(id, name, color)
        .context("Failed to update tag")?;

    writeln!(out, "Tag updated (id: {}): {}", tag.id(), tag.name())?;
    Ok(())
}

fn execute_search(
    service: &NoteService,
    cmd: &SearchCommand,
    config: &Config,
    out: &mut impl Write,
) -> Result<()> {
    let mut active = Vec::with_capacity(cmd.tags.len());
    for name in &cmd.tags {
        let tag = service
            .find_tag_by_name(name)?
            .ok_or_else(|| invalid("tag", format!("unknown tag '{name}'")))?;
        active.push(tag.id());
    }

    let sort = match cmd.sort {
        Some(sort) => sort,
        None => service.tag_sort()?,
    };
    let mut options = config.search;
    if cmd.fallback_all {
        options.on_empty_match = EmptyMatch::AllNotes;
    }

    let notes = service.list_notes().context("Failed to load notes")?;
    let tags = service.list_tags().context("Failed to load tags")?;
    let result = search(&notes, &tags, &cmd.query, &active, sort, &options);

    if cmd.json {
        writeln!(out, "{}", serde_json::to_string_pretty(&result)?)?;
        return Ok(());
    }

    if result.notes.is_empty() {
        writeln!(out, "No notes match.")?;
    } else {
        write_notes(&result.notes, out)?;
    }
    if !result.facets.is_empty() {
        writeln!(out)?;
        writeln!(out, "Tags ({sort}):")?;
        for facet in &result.facets {
            writeln!(out, "  {} ({})", facet.tag.name(), facet.count)?;
        }
    }
    Ok(())
}

fn execute_sort(service: &NoteService, cmd: &SortCommand, out: &mut impl Write) -> Result<()> {
    match cmd.sort {
        Some(sort) => {
            service
                .set_tag_sort(sort)
                .context("Failed to save tag sort")?;
            writeln!(out, "Tag sort set to {sort}")?;
        }
        None => writeln!(out, "{}", service.tag_sort()?)?,
    }
    Ok(())
}
