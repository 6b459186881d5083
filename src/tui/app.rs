use crate::models::{Facet, Note, NoteId, Tag, TagId, TagSort};
use crate::search::{SearchOptions, search};

/// Application state for the TUI.
///
/// Holds the full note and tag collections as loaded from the database and
/// the current filter state (query, active tags, facet ordering). The visible
/// notes and the tag facets are derived: every filter change re-runs
/// [`search`] over the full collections.
#[derive(Debug, Clone)]
pub struct App {
    /// All loaded notes, newest first.
    all_notes: Vec<Note>,
    /// All known tags.
    all_tags: Vec<Tag>,
    /// Notes passing the current filters.
    notes: Vec<Note>,
    /// Tags of the visible notes with their counts.
    facets: Vec<Facet>,
    /// Tags every visible note must carry.
    active_tags: Vec<TagId>,
    search_input: String,
    sort: TagSort,
    /// Set when `sort` changed and has not been persisted yet.
    sort_dirty: bool,
    options: SearchOptions,
    /// Currently focused panel
    focus: Focus,
    /// Selected index into `notes`
    selected_index: Option<usize>,
    /// Cursor into `facets`
    tag_cursor: Option<usize>,
    /// Scroll offset for detail view
    detail_scroll: u16,
}

/// Panel focus state for keyboard navigation.
///
/// Determines which panel receives keyboard input and how keys are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// Search input is focused (typing edits the query)
    SearchInput,
    /// Tag sidebar is focused (j/k move, Space toggles a filter)
    TagList,
    /// Note list panel is focused (j/k navigation)
    NoteList,
    /// Detail view panel is focused (j/k scrolling)
    DetailView,
}

impl App {
    /// Creates a new App with default search options.
    ///
    /// # Examples
    ///
    /// ```
    /// use blocknotes::tui::{App, Focus};
    ///
    /// let app = App::new();
    /// assert!(app.notes().is_empty());
    /// assert_eq!(app.selected_index(), None);
    /// assert_eq!(app.focus(), Focus::SearchInput);
    /// ```
    pub fn new() -> Self {
        Self::with_options(SearchOptions::default())
    }

    pub fn with_options(options: SearchOptions) -> Self {
        Self {
            all_notes: Vec::new(),
            all_tags: Vec::new(),
            notes: Vec::new(),
            facets: Vec::new(),
            active_tags: Vec::new(),
            search_input: String::new(),
            sort: TagSort::default(),
            sort_dirty: false,
            options,
            focus: Focus::SearchInput,
            selected_index: None,
            tag_cursor: None,
            detail_scroll: 0,
        }
    }

    /// Returns the currently displayed (filtered) notes.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Returns all loaded notes (unfiltered).
    pub fn all_notes(&self) -> &[Note] {
        &self.all_notes
    }

    /// Returns the tag facets for the displayed notes.
    pub fn facets(&self) -> &[Facet] {
        &self.facets
    }

    pub fn active_tags(&self) -> &[TagId] {
        &self.active_tags
    }

    pub fn is_active(&self, id: TagId) -> bool {
        self.active_tags.contains(&id)
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected_index
    }

    pub fn tag_cursor(&self) -> Option<usize> {
        self.tag_cursor
    }

    pub fn search_input(&self) -> &str {
        &self.search_input
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn sort(&self) -> TagSort {
        self.sort
    }

    /// Replaces the loaded collections and re-runs the current filters.
    ///
    /// Active tags that no longer exist are dropped.
    pub fn set_collection(&mut self, notes: Vec<Note>, tags: Vec<Tag>, sort: TagSort) {
        self.all_notes = notes;
        self.all_tags = tags;
        self.sort = sort;
        self.sort_dirty = false;
        let known: Vec<TagId> = self.all_tags.iter().map(Tag::id).collect();
        self.active_tags.retain(|id| known.contains(id));
        self.refresh();
    }

    /// Recomputes visible notes and facets from the full collections.
    ///
    /// The selected note stays selected while it is still visible.
    pub fn refresh(&mut self) {
        let selected_id = self.selected_note().map(Note::id);

        let result = search(
            &self.all_notes,
            &self.all_tags,
            &self.search_input,
            &self.active_tags,
            self.sort,
            &self.options,
        );
        self.notes = result.notes;
        self.facets = result.facets;

        self.selected_index = selected_id.and_then(|id| self.position_of(id));
        if self.selected_index.is_none() {
            self.detail_scroll = 0;
        }
        self.tag_cursor = match self.tag_cursor {
            _ if self.facets.is_empty() => None,
            Some(i) => Some(i.min(self.facets.len() - 1)),
            None => None,
        };
    }

    fn position_of(&self, id: NoteId) -> Option<usize> {
        self.notes.iter().position(|n| n.id() == id)
    }

    /// Returns the currently selected note, if any.
    pub fn selected_note(&self) -> Option<&Note> {
        self.selected_index.and_then(|i| self.notes.get(i))
    }

    /// Returns the facet under the tag cursor, if any.
    pub fn facet_under_cursor(&self) -> Option<&Facet> {
        self.tag_cursor.and_then(|i| self.facets.get(i))
    }

    /// Cycles focus to the next panel in Tab order.
    ///
    /// Order: `SearchInput` -> `TagList` -> `NoteList` -> `DetailView` -> `SearchInput`
    ///
    /// # Examples
    ///
    /// ```
    /// use blocknotes::tui::{App, Focus};
    ///
    /// let mut app = App::new();
    /// app.next_focus();
    /// assert_eq!(app.focus(), Focus::TagList);
    /// app.next_focus();
    /// assert_eq!(app.focus(), Focus::NoteList);
    /// app.next_focus();
    /// assert_eq!(app.focus(), Focus::DetailView);
    /// app.next_focus();
    /// assert_eq!(app.focus(), Focus::SearchInput);
    /// ```
    pub fn next_focus(&mut self) {
        self.set_focus(match self.focus {
            Focus::SearchInput => Focus::TagList,
            Focus::TagList => Focus::NoteList,
            Focus::NoteList => Focus::DetailView,
            Focus::DetailView => Focus::SearchInput,
        });
    }

    /// Cycles focus to the previous panel in reverse Tab order.
    pub fn prev_focus(&mut self) {
        self.set_focus(match self.focus {
            Focus::SearchInput => Focus::DetailView,
            Focus::TagList => Focus::SearchInput,
            Focus::NoteList => Focus::TagList,
            Focus::DetailView => Focus::NoteList,
        });
    }

    /// Moves focus to `focus`, placing a cursor in lists that have none.
    pub fn set_focus(&mut self, focus: Focus) {
        self.focus = focus;
        match focus {
            Focus::NoteList if self.selected_index.is_none() && !self.notes.is_empty() => {
                self.selected_index = Some(0);
            }
            Focus::TagList if self.tag_cursor.is_none() && !self.facets.is_empty() => {
                self.tag_cursor = Some(0);
            }
            _ => {}
        }
    }

    /// Moves selection down in the notes list, wrapping at the end.
    ///
    /// # Examples
    ///
    /// ```
    /// use blocknotes::tui::App;
    /// use blocknotes::{NoteBuilder, NoteId, TagSort};
    ///
    /// let mut app = App::new();
    /// let notes = vec![
    ///     NoteBuilder::new().id(NoteId::new(1)).title("Note 1").build(),
    ///     NoteBuilder::new().id(NoteId::new(2)).title("Note 2").build(),
    /// ];
    /// app.set_collection(notes, Vec::new(), TagSort::Count);
    ///
    /// app.select_next();
    /// assert_eq!(app.selected_index(), Some(0));
    /// app.select_next();
    /// assert_eq!(app.selected_index(), Some(1));
    /// app.select_next(); // Wraps to beginning
    /// assert_eq!(app.selected_index(), Some(0));
    /// ```
    pub fn select_next(&mut self) {
        self.selected_index = step_forward(self.selected_index, self.notes.len());
        self.detail_scroll = 0;
    }

    /// Moves selection up in the notes list, wrapping at the beginning.
    pub fn select_previous(&mut self) {
        self.selected_index = step_backward(self.selected_index, self.notes.len());
        self.detail_scroll = 0;
    }

    pub fn tag_cursor_next(&mut self) {
        self.tag_cursor = step_forward(self.tag_cursor, self.facets.len());
    }

    pub fn tag_cursor_previous(&mut self) {
        self.tag_cursor = step_backward(self.tag_cursor, self.facets.len());
    }

    /// Toggles the tag under the cursor as a filter.
    ///
    /// The cursor follows the toggled tag, since facets are re-sorted.
    pub fn toggle_tag_under_cursor(&mut self) {
        let Some(id) = self.facet_under_cursor().map(|f| f.tag.id()) else {
            return;
        };
        if let Some(pos) = self.active_tags.iter().position(|&a| a == id) {
            self.active_tags.remove(pos);
        } else {
            self.active_tags.push(id);
        }
        self.refresh();
        self.tag_cursor = self
            .facets
            .iter()
            .position(|f| f.tag.id() == id)
            .or(self.tag_cursor);
    }

    /// Drops every active tag filter.
    pub fn clear_active_tags(&mut self) {
        if !self.active_tags.is_empty() {
            self.active_tags.clear();
            self.refresh();
        }
    }

    /// Switches facet ordering and marks it for persisting.
    pub fn toggle_sort(&mut self) {
        self.sort = self.sort.toggled();
        self.sort_dirty = true;
        self.refresh();
    }

    /// Returns the new ordering once after it changed.
    pub fn take_sort_change(&mut self) -> Option<TagSort> {
        std::mem::take(&mut self.sort_dirty).then_some(self.sort)
    }

    /// Adds a character to the query and re-runs the search.
    pub fn push_search_char(&mut self, c: char) {
        self.search_input.push(c);
        self.refresh();
    }

    /// Removes the last character of the query and re-runs the search.
    pub fn pop_search_char(&mut self) {
        if self.search_input.pop().is_some() {
            self.refresh();
        }
    }

    pub fn clear_search(&mut self) {
        if !self.search_input.is_empty() {
            self.search_input.clear();
            self.refresh();
        }
    }

    pub fn detail_scroll(&self) -> u16 {
        self.detail_scroll
    }

    pub fn scroll_detail_down(&mut self, amount: u16) {
        self.detail_scroll = self.detail_scroll.saturating_add(amount);
    }

    pub fn scroll_detail_up(&mut self, amount: u16) {
        self.detail_scroll = self.detail_scroll.saturating_sub(amount);
    }

    /// Clears the selection (Esc key behavior).
    pub fn clear_selection(&mut self) {
        self.selected_index = None;
        self.detail_scroll = 0;
    }

    /// Returns focus to `SearchInput` (Esc key behavior).
    pub fn reset_focus(&mut self) {
        self.focus = Focus::SearchInput;
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

fn step_forward(current: Option<usize>, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(match current {
        Some(i) if i + 1 < len => i + 1,
        _ => 0,
    })
}

fn step_backward(current: Option<usize>, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(match current {
        Some(i) if i > 0 && i < len => i - 1,
        _ => len - 1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NoteBuilder;

    fn tag(id: i64, name: &str) -> Tag {
        Tag::new(TagId::new(id), name)
    }

    fn app_with_notes() -> App {
        let work = tag(5, "work");
        let home = tag(6, "home");
        let notes = vec![
            NoteBuilder::new()
                .id(NoteId::new(3))
                .title("Garden plan")
                .tags(vec![home.clone()])
                .build(),
            NoteBuilder::new()
                .id(NoteId::new(2))
                .title("Project plan")
                .tags(vec![work.clone()])
                .build(),
            NoteBuilder::new()
                .id(NoteId::new(1))
                .title("Grocery list")
                .build(),
        ];
        let mut app = App::new();
        app.set_collection(notes, vec![work, home], TagSort::Count);
        app
    }

    fn visible_ids(app: &App) -> Vec<i64> {
        app.notes().iter().map(|n| n.id().get()).collect()
    }

    #[test]
    fn app_initializes_with_default_state() {
        let app = App::new();
        assert!(app.notes().is_empty());
        assert!(app.facets().is_empty());
        assert_eq!(app.search_input(), "");
        assert_eq!(app.sort(), TagSort::Count);
        assert_eq!(app.focus(), Focus::SearchInput);
    }

    #[test]
    fn set_collection_shows_everything() {
        let app = app_with_notes();
        assert_eq!(visible_ids(&app), vec![3, 2, 1]);
        assert_eq!(app.facets().len(), 2);
    }

    #[test]
    fn typing_reruns_search_on_every_keystroke() {
        let mut app = app_with_notes();

        for c in "plan".chars() {
            app.push_search_char(c);
        }
        assert_eq!(visible_ids(&app), vec![3, 2]);

        app.push_search_char('x');
        app.push_search_char('y');
        app.push_search_char('z');
        assert!(app.notes().is_empty());

        app.clear_search();
        assert_eq!(visible_ids(&app), vec![3, 2, 1]);
    }

    #[test]
    fn backspace_widens_results() {
        let mut app = app_with_notes();
        for c in "grocery".chars() {
            app.push_search_char(c);
        }
        assert_eq!(visible_ids(&app), vec![1]);

        for _ in 0.."grocery".len() {
            app.pop_search_char();
        }
        assert_eq!(visible_ids(&app), vec![3, 2, 1]);
    }

    #[test]
    fn toggling_a_tag_filters_and_untoggling_restores() {
        let mut app = app_with_notes();
        app.set_focus(Focus::TagList);
        let id = app.facet_under_cursor().unwrap().tag.id();

        app.toggle_tag_under_cursor();
        assert!(app.is_active(id));
        assert!(app.notes().iter().all(|n| n.has_tag(id)));
        assert_eq!(app.facets().len(), 1);

        app.toggle_tag_under_cursor();
        assert!(!app.is_active(id));
        assert_eq!(visible_ids(&app), vec![3, 2, 1]);
    }

    #[test]
    fn clear_active_tags_restores_all_notes() {
        let mut app = app_with_notes();
        app.set_focus(Focus::TagList);
        app.toggle_tag_under_cursor();
        assert_eq!(app.notes().len(), 1);

        app.clear_active_tags();

        assert!(app.active_tags().is_empty());
        assert_eq!(app.notes().len(), 3);
    }

    #[test]
    fn toggle_sort_reorders_facets_and_is_reported_once() {
        let mut app = app_with_notes();
        // Equal counts: both orders are by name
        let names = |app: &App| -> Vec<String> {
            app.facets().iter().map(|f| f.tag.name().to_string()).collect()
        };
        assert_eq!(names(&app), vec!["home", "work"]);

        app.toggle_sort();

        assert_eq!(app.sort(), TagSort::Name);
        assert_eq!(app.take_sort_change(), Some(TagSort::Name));
        assert_eq!(app.take_sort_change(), None);
    }

    #[test]
    fn selection_follows_note_across_refresh() {
        let mut app = app_with_notes();
        app.select_next();
        app.select_next();
        assert_eq!(app.selected_note().unwrap().id(), NoteId::new(2));

        for c in "plan".chars() {
            app.push_search_char(c);
        }
        assert_eq!(app.selected_note().unwrap().id(), NoteId::new(2));

        app.push_search_char('q');
        app.push_search_char('q');
        app.push_search_char('q');
        assert_eq!(app.selected_index(), None);
    }

    #[test]
    fn navigation_wraps_both_ways() {
        let mut app = app_with_notes();

        app.select_previous();
        assert_eq!(app.selected_index(), Some(2));
        app.select_next();
        assert_eq!(app.selected_index(), Some(0));
    }

    #[test]
    fn navigation_on_empty_list_selects_nothing() {
        let mut app = App::new();
        app.select_next();
        assert_eq!(app.selected_index(), None);
        app.tag_cursor_next();
        assert_eq!(app.tag_cursor(), None);
    }

    #[test]
    fn focusing_lists_places_cursor() {
        let mut app = app_with_notes();

        app.next_focus();
        assert_eq!(app.focus(), Focus::TagList);
        assert_eq!(app.tag_cursor(), Some(0));

        app.next_focus();
        assert_eq!(app.focus(), Focus::NoteList);
        assert_eq!(app.selected_index(), Some(0));
    }

    #[test]
    fn reload_drops_active_tags_that_no_longer_exist() {
        let mut app = app_with_notes();
        app.set_focus(Focus::TagList);
        app.toggle_tag_under_cursor();
        assert_eq!(app.active_tags().len(), 1);

        let notes = app.all_notes().to_vec();
        app.set_collection(notes, Vec::new(), TagSort::Count);

        assert!(app.active_tags().is_empty());
        assert_eq!(app.notes().len(), 3);
    }

    #[test]
    fn detail_scroll_saturates() {
        let mut app = App::new();
        app.scroll_detail_up(3);
        assert_eq!(app.detail_scroll(), 0);
        app.scroll_detail_down(2);
        assert_eq!(app.detail_scroll(), 2);
    }
}
