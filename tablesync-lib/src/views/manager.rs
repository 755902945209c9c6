//! Ordered view list with a locked default view.

use log::debug;

use crate::error::ViewError;
use crate::query::Filters;

use super::View;

/// Maintains the ordered list of views and the active index.
///
/// Index 0 is always the built-in "All" view with no filters; it cannot be
/// renamed, duplicated, updated or deleted. All operations are local; remote
/// persistence is layered on top by the table.
///
/// # Example
///
/// ```
/// use tablesync_lib::query::Filters;
/// use tablesync_lib::views::ViewManager;
///
/// let mut views = ViewManager::new(Vec::new());
/// let index = views.create("Open", Filters::new().with("status", "open"), "");
/// assert_eq!(index, 1);
/// assert_eq!(views.selected(), 1);
///
/// views.delete(1).unwrap();
/// assert_eq!(views.selected(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct ViewManager {
    views: Vec<View>,
    selected: usize,
}

impl ViewManager {
    /// Creates a manager with "All" followed by the given presets.
    pub fn new(presets: Vec<View>) -> Self {
        let mut views = Vec::with_capacity(presets.len() + 1);
        views.push(View::all());
        views.extend(presets);
        Self { views, selected: 0 }
    }

    /// Returns all views, "All" first.
    pub fn views(&self) -> &[View] {
        &self.views
    }

    /// Returns the view at an index.
    pub fn get(&self, index: usize) -> Option<&View> {
        self.views.get(index)
    }

    /// Returns the number of views, including "All".
    pub fn len(&self) -> usize {
        self.views.len()
    }

    /// Always `false`: the "All" view is always present.
    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Returns the active view index.
    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Returns the active view.
    pub fn active(&self) -> &View {
        &self.views[self.selected]
    }

    /// Makes a view active and returns it so its snapshot can be applied.
    pub fn select(&mut self, index: usize) -> Result<&View, ViewError> {
        self.check_index(index)?;
        self.selected = index;
        Ok(&self.views[index])
    }

    /// Appends a view built from the current filters and query and selects it.
    pub fn create(&mut self, name: impl Into<String>, filters: Filters, query_value: &str) -> usize {
        let view = View::from_state(name, &filters, query_value);
        debug!("Creating view {:?}", view.name);
        self.views.push(view);
        self.selected = self.views.len() - 1;
        self.selected
    }

    /// Renames a view.
    pub fn rename(&mut self, index: usize, name: impl Into<String>) -> Result<&View, ViewError> {
        self.check_mutable(index)?;
        let view = &mut self.views[index];
        view.name = name.into();
        Ok(view)
    }

    /// Appends a copy of a view (without its id) and selects it.
    pub fn duplicate(&mut self, index: usize) -> Result<usize, ViewError> {
        self.check_index(index)?;
        if index == 0 {
            return Err(ViewError::Locked);
        }
        let source = &self.views[index];
        let copy = View::new(format!("{} copy", source.name), source.filters.clone());
        self.views.push(copy);
        self.selected = self.views.len() - 1;
        Ok(self.selected)
    }

    /// Replaces a view's snapshot with the given filters and query.
    pub fn update(&mut self, index: usize, filters: &Filters, query_value: &str) -> Result<&View, ViewError> {
        self.check_mutable(index)?;
        let view = &mut self.views[index];
        view.filters = super::snapshot(filters, query_value);
        Ok(view)
    }

    /// Removes a view and returns it.
    ///
    /// Deleting the active view selects "All"; deleting a view before the
    /// active one keeps the same view active.
    pub fn delete(&mut self, index: usize) -> Result<View, ViewError> {
        self.check_mutable(index)?;
        let removed = self.views.remove(index);
        if self.selected == index {
            self.selected = 0;
        } else if self.selected > index {
            self.selected -= 1;
        }
        Ok(removed)
    }

    /// Records the identifier assigned by a views endpoint.
    pub fn set_id(&mut self, index: usize, id: impl Into<String>) {
        if index == 0 {
            return;
        }
        if let Some(view) = self.views.get_mut(index) {
            view.id = Some(id.into());
        }
    }

    /// Replaces every view after "All" with views loaded from an endpoint.
    ///
    /// Resets the selection to "All" if the active index no longer exists.
    pub fn replace_remote(&mut self, views: Vec<View>) {
        self.views.truncate(1);
        self.views.extend(views);
        if self.selected >= self.views.len() {
            self.selected = 0;
        }
    }

    fn check_index(&self, index: usize) -> Result<(), ViewError> {
        if index < self.views.len() {
            Ok(())
        } else {
            Err(ViewError::OutOfRange {
                index,
                len: self.views.len(),
            })
        }
    }

    fn check_mutable(&self, index: usize) -> Result<(), ViewError> {
        self.check_index(index)?;
        if index == 0 || !self.views[index].allow_actions {
            return Err(ViewError::Locked);
        }
        Ok(())
    }
}

impl Default for ViewManager {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
