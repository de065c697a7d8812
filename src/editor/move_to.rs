use crate::editor::keys::KeyInput;
use crate::models::Page;

#[derive(Clone, Debug, Default, PartialEq)]
pub enum PageList {
    #[default]
    Loading,
    Ready(Vec<Page>),
    Failed(String),
}

#[derive(Clone, Debug, PartialEq)]
pub enum PickerOutcome {
    Ignored,
    Handled,
    Picked { block_id: String, page_id: String },
    Closed,
}

/// Modal listing the other pages a block can be moved to.
///
/// The page list arrives asynchronously; until then the picker is in the
/// loading state. A list that arrives after the picker closed is ignored.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MoveToPicker {
    block_id: Option<String>,
    current_page_id: String,
    pages: PageList,
    filter: String,
    selected: usize,
    /// Bumped on every open so stale list responses can be told apart.
    request_id: u64,
}

impl MoveToPicker {
    /// Open for `block_id`; returns the request id the list response must carry.
    pub fn open(&mut self, block_id: &str, current_page_id: &str) -> u64 {
        self.block_id = Some(block_id.to_string());
        self.current_page_id = current_page_id.to_string();
        self.pages = PageList::Loading;
        self.filter.clear();
        self.selected = 0;
        self.request_id += 1;
        self.request_id
    }

    pub fn close(&mut self) {
        self.block_id = None;
        self.filter.clear();
        self.selected = 0;
    }

    pub fn is_open(&self) -> bool {
        self.block_id.is_some()
    }

    pub fn block_id(&self) -> Option<&str> {
        self.block_id.as_deref()
    }

    pub fn pages(&self) -> &PageList {
        &self.pages
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn set_pages(&mut self, request_id: u64, result: Result<Vec<Page>, String>) -> bool {
        if !self.is_open() || request_id != self.request_id {
            return false;
        }
        self.pages = match result {
            Ok(pages) => PageList::Ready(pages),
            Err(e) => PageList::Failed(e),
        };
        self.selected = 0;
        true
    }

    pub fn set_filter(&mut self, q: &str) {
        self.filter = q.to_string();
        self.selected = 0;
    }

    /// Pages other than the current one that match the filter.
    pub fn visible(&self) -> Vec<Page> {
        let PageList::Ready(pages) = &self.pages else {
            return vec![];
        };
        let q = self.filter.trim().to_lowercase();
        pages
            .iter()
            .filter(|p| p.id != self.current_page_id)
            .filter(|p| q.is_empty() || p.title.to_lowercase().contains(&q))
            .cloned()
            .collect()
    }

    pub fn hover(&mut self, idx: usize) {
        if idx < self.visible().len() {
            self.selected = idx;
        }
    }

    pub fn pick(&mut self, page_id: &str) -> PickerOutcome {
        let Some(block_id) = self.block_id.clone() else {
            return PickerOutcome::Ignored;
        };
        if !self.visible().iter().any(|p| p.id == page_id) {
            return PickerOutcome::Handled;
        }
        self.close();
        PickerOutcome::Picked {
            block_id,
            page_id: page_id.to_string(),
        }
    }

    pub fn handle_key(&mut self, k: &KeyInput) -> PickerOutcome {
        if !self.is_open() {
            return PickerOutcome::Ignored;
        }
        let n = self.visible().len();
        match k.key.as_str() {
            "ArrowDown" if n > 0 => {
                self.selected = (self.selected + 1) % n;
                PickerOutcome::Handled
            }
            "ArrowUp" if n > 0 => {
                self.selected = (self.selected + n - 1) % n;
                PickerOutcome::Handled
            }
            "Enter" => match self.visible().get(self.selected).map(|p| p.id.clone()) {
                Some(id) => self.pick(&id),
                None => PickerOutcome::Handled,
            },
            "Escape" => {
                self.close();
                PickerOutcome::Closed
            }
            _ => PickerOutcome::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn page(id: &str, title: &str) -> Page {
        Page {
            id: id.to_string(),
            title: title.to_string(),
            icon: None,
        }
    }

    fn pages() -> Vec<Page> {
        vec![
            page("p1", "Current"),
            page("p2", "Invoices"),
            page("p3", "Inventory"),
            page("p4", "Payroll"),
        ]
    }

    #[test]
    fn test_loading_until_pages_arrive() {
        let mut m = MoveToPicker::default();
        let req = m.open("b1", "p1");
        assert_eq!(m.pages(), &PageList::Loading);
        assert!(m.visible().is_empty());
        assert!(m.set_pages(req, Ok(pages())));
        assert_eq!(m.visible().len(), 3);
    }

    #[test]
    fn test_excludes_current_and_filters() {
        let mut m = MoveToPicker::default();
        let req = m.open("b1", "p1");
        m.set_pages(req, Ok(pages()));
        m.set_filter("inv");
        let ids = m.visible().into_iter().map(|p| p.id).collect::<Vec<_>>();
        assert_eq!(ids, vec!["p2", "p3"]);
    }

    #[test]
    fn test_stale_response_ignored() {
        let mut m = MoveToPicker::default();
        let old = m.open("b1", "p1");
        m.close();
        let new = m.open("b2", "p1");
        assert!(!m.set_pages(old, Ok(pages())));
        assert_eq!(m.pages(), &PageList::Loading);
        assert!(m.set_pages(new, Err("boom".to_string())));
        assert_eq!(m.pages(), &PageList::Failed("boom".to_string()));
    }

    #[test]
    fn test_enter_picks_and_closes() {
        let mut m = MoveToPicker::default();
        let req = m.open("b1", "p1");
        m.set_pages(req, Ok(pages()));
        m.handle_key(&KeyInput::plain("ArrowDown"));
        assert_eq!(
            m.handle_key(&KeyInput::plain("Enter")),
            PickerOutcome::Picked {
                block_id: "b1".to_string(),
                page_id: "p3".to_string()
            }
        );
        assert!(!m.is_open());
    }

    #[test]
    fn test_cannot_pick_current_page() {
        let mut m = MoveToPicker::default();
        let req = m.open("b1", "p1");
        m.set_pages(req, Ok(pages()));
        assert_eq!(m.pick("p1"), PickerOutcome::Handled);
        assert!(m.is_open());
    }
}
