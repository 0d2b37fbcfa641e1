use thiserror::Error;
use tracing::{info, warn};

use crate::canvas::CanvasSnapshot;
use crate::host::EditorHost;
use crate::page::PageCollection;

/// 切換結果。 / Result of an activation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchOutcome {
    /// The canvas now shows the target; `previous` was deactivated.
    Switched { previous: Option<String> },
    AlreadyCurrent,
    /// No editor or canvas is attached.
    Unavailable,
    Disabled,
    Missing,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SwitchError {
    #[error("a page switch is already in progress")]
    InProgress,
}

/// Moves the live canvas between pages while keeping a single current page.
/// 在頁面間切換畫布內容，並維持唯一的目前頁面。
#[derive(Debug, Default)]
pub struct ActivePageSwitcher {
    in_progress: bool,
}

impl ActivePageSwitcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_switching(&self) -> bool {
        self.in_progress
    }

    /// 啟用目標頁面。 / Activates `target`.
    ///
    /// The outgoing page receives the canvas state before the incoming page's
    /// content and stylesheet replace it.
    pub fn activate(
        &mut self,
        pages: &mut PageCollection,
        current: &mut Option<String>,
        host: Option<&mut dyn EditorHost>,
        target: &str,
    ) -> Result<SwitchOutcome, SwitchError> {
        if self.in_progress {
            warn!(page = target, "refusing re-entrant page switch");
            return Err(SwitchError::InProgress);
        }
        let Some(page) = pages.get(target) else {
            return Ok(SwitchOutcome::Missing);
        };
        if page.disable {
            return Ok(SwitchOutcome::Disabled);
        }
        if current.as_deref() == Some(target) {
            return Ok(SwitchOutcome::AlreadyCurrent);
        }
        let Some(host) = host else {
            warn!(page = target, "no editor attached; page switch skipped");
            return Ok(SwitchOutcome::Unavailable);
        };

        self.in_progress = true;
        let outcome = switch_canvas(pages, current, host, target);
        self.in_progress = false;
        Ok(outcome)
    }

    /// 刪除前保存畫布狀態。 / Persists canvas state into `target` before it is deleted.
    ///
    /// Only the current page is written; deleting any other page never reads the
    /// canvas. Returns whether a snapshot was taken.
    pub fn persist_before_delete(
        &self,
        pages: &mut PageCollection,
        current: &mut Option<String>,
        host: Option<&mut dyn EditorHost>,
        target: &str,
    ) -> bool {
        if current.as_deref() != Some(target) {
            return false;
        }
        *current = None;
        let Some(page) = pages.get_mut(target) else {
            return false;
        };
        page.is_current_page = false;
        let Some(canvas) = host.and_then(|host| host.canvas()) else {
            return false;
        };
        let snapshot = CanvasSnapshot::capture(canvas);
        page.content = snapshot.html;
        page.css = snapshot.css;
        true
    }

    #[cfg(test)]
    fn lock(&mut self) {
        self.in_progress = true;
    }
}

fn switch_canvas(
    pages: &mut PageCollection,
    current: &mut Option<String>,
    host: &mut dyn EditorHost,
    target: &str,
) -> SwitchOutcome {
    let Some(canvas) = host.canvas() else {
        warn!(page = target, "editor has no canvas; page switch skipped");
        return SwitchOutcome::Unavailable;
    };

    let previous = current.take();
    if let Some(prev) = previous.as_deref().and_then(|id| pages.get_mut(id)) {
        let snapshot = CanvasSnapshot::capture(canvas);
        prev.content = snapshot.html;
        prev.css = snapshot.css;
    }
    for page in pages.iter_mut() {
        page.is_current_page = page.id == target;
    }

    if let Some(page) = pages.get(target) {
        canvas.set_components(&page.content);
        canvas.set_style(&page.css);
    }
    canvas.refresh();
    *current = Some(target.to_string());

    info!(page = target, previous = ?previous, "switched current page");
    SwitchOutcome::Switched { previous }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{Canvas, CanvasElement, StyleRule};
    use crate::host::EditorEvent;
    use crate::page::PageEntity;

    #[derive(Default)]
    struct Stage {
        html: String,
        css: String,
        loads: Vec<(String, String)>,
        refreshes: usize,
    }

    impl Canvas for Stage {
        fn html(&self) -> String {
            self.html.clone()
        }
        fn style_rules(&self) -> Vec<StyleRule> {
            if self.css.is_empty() {
                Vec::new()
            } else {
                vec![StyleRule::new("body", self.css.clone())]
            }
        }
        fn set_components(&mut self, markup: &str) {
            self.html = markup.to_string();
        }
        fn set_style(&mut self, css: &str) {
            self.loads.push((self.html.clone(), css.to_string()));
        }
        fn refresh(&mut self) {
            self.refreshes += 1;
        }
        fn body(&self) -> Option<CanvasElement> {
            None
        }
        fn placer(&self) -> Option<CanvasElement> {
            None
        }
        fn frame(&self) -> Option<CanvasElement> {
            None
        }
    }

    #[derive(Default)]
    struct Editor {
        stage: Stage,
    }

    impl EditorHost for Editor {
        fn trigger(&mut self, _event: &EditorEvent<'_>) {}
        fn canvas(&mut self) -> Option<&mut dyn Canvas> {
            Some(&mut self.stage)
        }
    }

    fn pages() -> PageCollection {
        let mut pages = PageCollection::new();
        let mut home = PageEntity::new("home");
        home.content = "<h1>Home</h1>".into();
        pages.push(home);
        let mut about = PageEntity::new("about");
        about.content = "<p>About</p>".into();
        pages.push(about);
        pages
    }

    #[test]
    fn switching_saves_outgoing_page() {
        let mut pages = pages();
        let mut current = None;
        let mut editor = Editor::default();
        let mut switcher = ActivePageSwitcher::new();

        let outcome = switcher
            .activate(&mut pages, &mut current, Some(&mut editor), "home")
            .unwrap();
        assert_eq!(outcome, SwitchOutcome::Switched { previous: None });

        editor.stage.html = "<h1>Edited</h1>".into();
        editor.stage.css = "margin:0;".into();
        let outcome = switcher
            .activate(&mut pages, &mut current, Some(&mut editor), "about")
            .unwrap();
        assert_eq!(
            outcome,
            SwitchOutcome::Switched {
                previous: Some("home".into())
            }
        );

        let home = pages.get("home").unwrap();
        assert_eq!(home.content, "<h1>Edited</h1>");
        assert_eq!(home.css, "body{margin:0;}");
        assert!(!home.is_current_page);
        assert!(pages.get("about").unwrap().is_current_page);
        assert_eq!(editor.stage.html, "<p>About</p>");
        assert_eq!(editor.stage.refreshes, 2);
        assert_eq!(current.as_deref(), Some("about"));
    }

    #[test]
    fn same_target_leaves_canvas_alone() {
        let mut pages = pages();
        let mut current = None;
        let mut editor = Editor::default();
        let mut switcher = ActivePageSwitcher::new();
        switcher
            .activate(&mut pages, &mut current, Some(&mut editor), "home")
            .unwrap();
        editor.stage.html = "<h1>Unsaved</h1>".into();

        let outcome = switcher
            .activate(&mut pages, &mut current, Some(&mut editor), "home")
            .unwrap();
        assert_eq!(outcome, SwitchOutcome::AlreadyCurrent);
        assert_eq!(editor.stage.html, "<h1>Unsaved</h1>");
        assert_eq!(editor.stage.refreshes, 1);
    }

    #[test]
    fn without_host_nothing_changes() {
        let mut pages = pages();
        let mut current = None;
        let mut switcher = ActivePageSwitcher::new();
        let outcome = switcher
            .activate(&mut pages, &mut current, None, "home")
            .unwrap();
        assert_eq!(outcome, SwitchOutcome::Unavailable);
        assert!(current.is_none());
        assert!(pages.iter().all(|page| !page.is_current_page));
    }

    #[test]
    fn reentrant_switch_is_refused() {
        let mut pages = pages();
        let mut current = None;
        let mut switcher = ActivePageSwitcher::new();
        switcher.lock();
        let err = switcher
            .activate(&mut pages, &mut current, None, "home")
            .unwrap_err();
        assert_eq!(err, SwitchError::InProgress);
    }

    #[test]
    fn delete_persists_only_current_page() {
        let mut pages = pages();
        let mut current = None;
        let mut editor = Editor::default();
        let mut switcher = ActivePageSwitcher::new();
        switcher
            .activate(&mut pages, &mut current, Some(&mut editor), "home")
            .unwrap();
        editor.stage.html = "<h1>Draft</h1>".into();

        assert!(!switcher.persist_before_delete(
            &mut pages,
            &mut current,
            Some(&mut editor),
            "about"
        ));
        assert_eq!(pages.get("about").unwrap().content, "<p>About</p>");
        assert_eq!(current.as_deref(), Some("home"));

        assert!(switcher.persist_before_delete(
            &mut pages,
            &mut current,
            Some(&mut editor),
            "home"
        ));
        let home = pages.get("home").unwrap();
        assert_eq!(home.content, "<h1>Draft</h1>");
        assert!(!home.is_current_page);
        assert!(current.is_none());
    }
}
