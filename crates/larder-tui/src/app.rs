// TUI application state and event handling
use larder_core::expiry::ExpiryReport;
use larder_core::theme::Theme;
use larder_store::{Category, CategoryFilter, FoodItem, ItemDraft, ItemQuery, SortKey, Statistics};
use ratatui::widgets::TableState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,        // Navigating the item table
    Searching,     // Typing in the search box
    Form,          // Filling the add/edit form
    ConfirmDelete, // Waiting for y/n on a delete
}

/// Form field positions, top to bottom.
pub const FIELD_NAME: usize = 0;
pub const FIELD_CATEGORY: usize = 1;
pub const FIELD_EXPIRY: usize = 2;
pub const FIELD_NOTES: usize = 3;
pub const FORM_FIELDS: usize = 4;

/// The add/edit form. Text fields are typed into directly; the category
/// field cycles through the closed set instead.
#[derive(Debug, Clone)]
pub struct ItemForm {
    /// `None` while adding; the target row id while editing.
    pub editing_id: Option<i64>,
    pub name: String,
    pub category: Category,
    pub expiry_date: String,
    pub notes: String,
    pub cursor: usize,
}

impl ItemForm {
    pub fn blank() -> Self {
        Self {
            editing_id: None,
            name: String::new(),
            category: Category::Other,
            expiry_date: String::new(),
            notes: String::new(),
            cursor: FIELD_NAME,
        }
    }

    pub fn from_item(item: &FoodItem) -> Self {
        Self {
            editing_id: Some(item.id),
            name: item.name.clone(),
            category: item.category,
            expiry_date: item.expiry_date.clone(),
            notes: item.notes.clone(),
            cursor: FIELD_NAME,
        }
    }

    pub fn draft(&self) -> ItemDraft {
        ItemDraft {
            name: self.name.clone(),
            category: self.category,
            expiry_date: self.expiry_date.clone(),
            notes: self.notes.clone(),
        }
    }

    pub fn field_label(index: usize) -> &'static str {
        match index {
            FIELD_NAME => "Food Name",
            FIELD_CATEGORY => "Category",
            FIELD_EXPIRY => "Expiry Date (YYYY-MM-DD)",
            FIELD_NOTES => "Notes",
            _ => "",
        }
    }

    pub fn field_value(&self, index: usize) -> String {
        match index {
            FIELD_NAME => self.name.clone(),
            FIELD_CATEGORY => self.category.label().to_string(),
            FIELD_EXPIRY => self.expiry_date.clone(),
            FIELD_NOTES => self.notes.clone(),
            _ => String::new(),
        }
    }

    pub fn next_field(&mut self) {
        self.cursor = (self.cursor + 1) % FORM_FIELDS;
    }

    pub fn previous_field(&mut self) {
        self.cursor = (self.cursor + FORM_FIELDS - 1) % FORM_FIELDS;
    }

    pub fn cycle_category(&mut self) {
        let position = Category::ALL
            .iter()
            .position(|c| *c == self.category)
            .unwrap_or(0);
        self.category = Category::ALL[(position + 1) % Category::ALL.len()];
    }

    pub fn push_char(&mut self, c: char) {
        match self.cursor {
            FIELD_NAME => self.name.push(c),
            FIELD_EXPIRY => self.expiry_date.push(c),
            FIELD_NOTES => self.notes.push(c),
            _ => {} // category cycles, no free text
        }
    }

    pub fn backspace(&mut self) {
        match self.cursor {
            FIELD_NAME => {
                self.name.pop();
            }
            FIELD_EXPIRY => {
                self.expiry_date.pop();
            }
            FIELD_NOTES => {
                self.notes.pop();
            }
            _ => {}
        }
    }
}

pub struct App {
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub search_input: String,
    pub category_filter: CategoryFilter,
    pub sort_key: SortKey,
    pub items: Vec<FoodItem>,
    pub table_state: TableState,
    pub status_message: Option<String>,
    pub error_message: Option<String>,
    pub form: ItemForm,
    pub pending_delete: Option<FoodItem>,
    pub stats: Option<Statistics>,
    pub expiry_report: Option<ExpiryReport>,
    pub theme: Theme,
}

impl App {
    pub fn new(theme: Theme) -> Self {
        let mut table_state = TableState::default();
        table_state.select(Some(0));

        Self {
            should_quit: false,
            input_mode: InputMode::Normal,
            search_input: String::new(),
            category_filter: CategoryFilter::All,
            sort_key: SortKey::ExpiryDate,
            items: Vec::new(),
            table_state,
            status_message: None,
            error_message: None,
            form: ItemForm::blank(),
            pending_delete: None,
            stats: None,
            expiry_report: None,
            theme,
        }
    }

    /// The current listing specification, ready for the store.
    pub fn query(&self) -> ItemQuery {
        ItemQuery {
            search: self.search_input.clone(),
            category: self.category_filter,
            sort: self.sort_key,
        }
    }

    pub fn set_items(&mut self, items: Vec<FoodItem>) {
        let selected = self.table_state.selected().unwrap_or(0);
        self.items = items;
        if self.items.is_empty() {
            self.table_state.select(None);
        } else {
            self.table_state
                .select(Some(selected.min(self.items.len() - 1)));
        }
    }

    pub fn selected_item(&self) -> Option<&FoodItem> {
        self.table_state
            .selected()
            .and_then(|index| self.items.get(index))
    }

    pub fn next_item(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let next = self
            .table_state
            .selected()
            .map(|i| (i + 1).min(self.items.len() - 1))
            .unwrap_or(0);
        self.table_state.select(Some(next));
    }

    pub fn previous_item(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let previous = self
            .table_state
            .selected()
            .map(|i| i.saturating_sub(1))
            .unwrap_or(0);
        self.table_state.select(Some(previous));
    }

    pub fn enter_normal_mode(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    pub fn enter_search_mode(&mut self) {
        self.clear_messages();
        self.input_mode = InputMode::Searching;
    }

    pub fn cycle_category_filter(&mut self) {
        self.category_filter = self.category_filter.cycle();
    }

    pub fn cycle_sort(&mut self) {
        self.sort_key = self.sort_key.cycle();
    }

    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggle();
    }

    pub fn open_add_form(&mut self) {
        self.clear_messages();
        self.form = ItemForm::blank();
        self.input_mode = InputMode::Form;
    }

    /// Opens the form pre-filled from the selected row; no-op without a
    /// selection (the status line says so).
    pub fn open_edit_form(&mut self) {
        self.clear_messages();
        match self.selected_item() {
            Some(item) => {
                self.form = ItemForm::from_item(item);
                self.input_mode = InputMode::Form;
            }
            None => self.set_error("Please select an item to edit"),
        }
    }

    pub fn close_form(&mut self) {
        self.form = ItemForm::blank();
        self.input_mode = InputMode::Normal;
    }

    pub fn request_delete(&mut self) {
        self.clear_messages();
        match self.selected_item() {
            Some(item) => {
                self.pending_delete = Some(item.clone());
                self.input_mode = InputMode::ConfirmDelete;
            }
            None => self.set_error("Please select an item to delete"),
        }
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
        self.input_mode = InputMode::Normal;
    }

    pub fn close_popups(&mut self) {
        self.stats = None;
        self.expiry_report = None;
        self.clear_messages();
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.error_message = None;
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error_message = Some(message.into());
        self.status_message = None;
    }

    pub fn clear_messages(&mut self) {
        self.status_message = None;
        self.error_message = None;
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }
}
