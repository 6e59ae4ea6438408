use crate::config::ColorConfig;
use crate::controller::DirectoryViewController;
use crate::model::FetchState;
use crate::navigation::{blob_url, entry_path, parent_path};
use crate::search::build_search_url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Search,
    Entries,
}

/// One selectable row of the listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryRow {
    pub name: String,
    pub path: String,
    pub is_dir: bool,
}

/// Terminal page state around the controller.
pub struct App {
    pub controller: DirectoryViewController,
    pub focus: Focus,
    pub selected_entry: usize,
    pub status_message: String,
    pub should_quit: bool,
    pub endpoint: String,
    /// Shown next to the header at the repository root.
    pub repo_description: Option<String>,
    pub colors: ColorConfig,
}

impl App {
    pub fn new(controller: DirectoryViewController, endpoint: impl Into<String>, colors: ColorConfig) -> Self {
        Self {
            controller,
            focus: Focus::Search,
            selected_entry: 0,
            status_message: "Ready".to_string(),
            should_quit: false,
            endpoint: endpoint.into(),
            repo_description: None,
            colors,
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.repo_description = description.filter(|d| !d.trim().is_empty());
        self
    }

    /// Directories first, then files, in backend order.
    pub fn entries(&self) -> Vec<EntryRow> {
        let Some(listing) = self.controller.state().listing.loaded() else {
            return Vec::new();
        };
        let parent = &self.controller.parameters().file_path;

        let dirs = listing.directories.iter().map(|e| EntryRow {
            name: e.name.clone(),
            path: entry_path(parent, &e.name),
            is_dir: true,
        });
        let files = listing.files.iter().map(|e| EntryRow {
            name: e.name.clone(),
            path: entry_path(parent, &e.name),
            is_dir: false,
        });
        dirs.chain(files).collect()
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Search => Focus::Entries,
            Focus::Entries => Focus::Search,
        };
    }

    pub fn select_previous(&mut self) -> bool {
        if self.selected_entry > 0 {
            self.selected_entry -= 1;
            true
        } else {
            false
        }
    }

    pub fn select_next(&mut self) -> bool {
        let count = self.entries().len();
        if self.selected_entry + 1 < count {
            self.selected_entry += 1;
            true
        } else {
            false
        }
    }

    /// Enter the selected directory, or show the selected file's URL.
    pub fn open_selected(&mut self) -> bool {
        let Some(row) = self.entries().into_iter().nth(self.selected_entry) else {
            return false;
        };

        if row.is_dir {
            self.navigate_to(row.path)
        } else {
            let params = self.controller.parameters();
            self.status_message = format!(
                "{}{}",
                self.endpoint.trim_end_matches('/'),
                blob_url(&params.repo_path, params.rev.as_deref(), &row.path)
            );
            true
        }
    }

    pub fn navigate_to_parent(&mut self) -> bool {
        let current = &self.controller.parameters().file_path;
        if current.is_empty() {
            self.status_message = "Already at repository root".to_string();
            return false;
        }
        let parent = parent_path(current);
        self.navigate_to(parent)
    }

    pub fn navigate_to(&mut self, file_path: String) -> bool {
        let next = self.controller.parameters().at_path(file_path);
        let issued = self.controller.on_parameters_changed(next);
        if issued {
            self.selected_entry = 0;
            let path = &self.controller.parameters().file_path;
            self.status_message = if path.is_empty() {
                "Loading repository root...".to_string()
            } else {
                format!("Loading {}...", path)
            };
        }
        issued
    }

    pub fn push_query_char(&mut self, c: char) {
        let mut query = self.controller.state().search_query.clone();
        query.push(c);
        self.controller.on_search_query_text_changed(query);
    }

    pub fn pop_query_char(&mut self) {
        let mut query = self.controller.state().search_query.clone();
        if query.pop().is_some() {
            self.controller.on_search_query_text_changed(query);
        }
    }

    pub fn submit_search(&mut self) {
        let request = self.controller.on_search_submit();
        self.status_message = build_search_url(&self.endpoint, &request.query, request.scope);
    }

    /// Pull finished fetches into the page. Returns true if anything changed.
    pub fn sync_results(&mut self) -> bool {
        let changed = self.controller.try_apply_ready() > 0;
        if changed {
            let count = self.entries().len();
            if self.selected_entry >= count {
                self.selected_entry = count.saturating_sub(1);
            }
            if let FetchState::Loaded(listing) = &self.controller.state().listing {
                self.status_message = format!("{} entries", listing.len());
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{listing, mount_static};

    #[tokio::test]
    async fn test_entries_list_directories_before_files() {
        let mut app = mount_static("src", listing(&["app"], &["lib.rs", "main.rs"]));
        app.controller.settle().await;

        let rows = app.entries();
        assert_eq!(rows.len(), 3);
        assert!(rows[0].is_dir);
        assert_eq!(rows[0].path, "src/app");
        assert_eq!(rows[2].path, "src/main.rs");
    }

    #[tokio::test]
    async fn test_selection_stays_in_bounds() {
        let mut app = mount_static("", listing(&["a"], &["b"]));
        app.controller.settle().await;

        assert!(!app.select_previous());
        assert!(app.select_next());
        assert!(!app.select_next());
        assert_eq!(app.selected_entry, 1);
    }

    #[tokio::test]
    async fn test_open_directory_navigates() {
        let mut app = mount_static("", listing(&["cmd"], &[]));
        app.controller.settle().await;

        assert!(app.open_selected());
        assert_eq!(app.controller.parameters().file_path, "cmd");
        assert!(app.controller.state().listing.is_loading());
    }

    #[tokio::test]
    async fn test_open_file_shows_blob_url() {
        let mut app = mount_static("", listing(&[], &["README.md"]));
        app.controller.settle().await;

        assert!(app.open_selected());
        assert_eq!(app.controller.parameters().file_path, "");
        assert_eq!(
            app.status_message,
            "https://code.example.com/github.com/a/b/-/blob/README.md"
        );
    }

    #[tokio::test]
    async fn test_parent_navigation() {
        let mut app = mount_static("src/app", listing(&[], &[]));
        assert!(app.navigate_to_parent());
        assert_eq!(app.controller.parameters().file_path, "src");
        assert!(app.navigate_to_parent());
        assert!(!app.navigate_to_parent());
        assert_eq!(app.status_message, "Already at repository root");
    }

    #[tokio::test]
    async fn test_query_editing() {
        let mut app = mount_static("", listing(&[], &[]));
        app.push_query_char('f');
        app.push_query_char('n');
        app.pop_query_char();
        assert_eq!(app.controller.state().search_query, "f");
    }

    #[tokio::test]
    async fn test_sync_results_reports_entry_count() {
        let mut app = mount_static("", listing(&["a", "b"], &["c"]));
        while !app.controller.state().listing.is_settled() {
            tokio::task::yield_now().await;
            app.sync_results();
        }
        assert_eq!(app.status_message, "3 entries");
    }
}
