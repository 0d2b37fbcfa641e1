use std::borrow::Cow;

use indextree::NodeId;
use pagemanager_settings::{PageManagerConfig, RenderOptions};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::dom::Dom;
use crate::host::{EditorEvent, EditorHost};
use crate::list_view::{PageListView, ViewAction};
use crate::page::{CategorySet, PageCollection, PageEntity, PageOptions};
use crate::sorter::{DragEvent, DroppedModel, Sorter};
use crate::switcher::{ActivePageSwitcher, SwitchError, SwitchOutcome};

const GENERATED_LABEL: &str = "New page";

/// 頁面登錄檔錯誤。 / Errors produced by the page registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PageError {
    #[error("page `{0}` already exists")]
    DuplicateId(String),
    #[error("the page list has not been rendered yet")]
    NotRendered,
    #[error("the page registry has been destroyed")]
    Destroyed,
    #[error("a page switch is already in progress")]
    SwitchInProgress,
}

impl From<SwitchError> for PageError {
    fn from(value: SwitchError) -> Self {
        match value {
            SwitchError::InProgress => PageError::SwitchInProgress,
        }
    }
}

/// Owns the page collections, the category set and the primary list view.
/// 管理頁面集合、分類集合與主要清單視圖。
///
/// `master` holds the pages; `visible` mirrors its ids in the same order and is
/// the render source. Every mutation entry point updates both in the same call.
pub struct PageRegistry {
    config: PageManagerConfig,
    editor: Option<Box<dyn EditorHost>>,
    master: PageCollection,
    visible: Vec<String>,
    categories: CategorySet,
    view: Option<PageListView>,
    current: Option<String>,
    switcher: ActivePageSwitcher,
    next_generated: usize,
    destroyed: bool,
}

impl PageRegistry {
    /// 以設定與（選用的）編輯器建立登錄檔。 / Creates the registry for one editor instance.
    pub fn init(mut config: PageManagerConfig, editor: Option<Box<dyn EditorHost>>) -> Self {
        config.sanitize();
        info!(
            prefix = %config.p_style_prefix,
            seeds = config.blocks.len(),
            attached = editor.is_some(),
            "page manager initialised"
        );
        Self {
            config,
            editor,
            master: PageCollection::new(),
            visible: Vec::new(),
            categories: CategorySet::new(),
            view: None,
            current: None,
            switcher: ActivePageSwitcher::new(),
            next_generated: 0,
            destroyed: false,
        }
    }

    /// 不依附編輯器的登錄檔，只提供清單與 CRUD。 / Registry without an editor; listing and CRUD only.
    pub fn standalone(config: PageManagerConfig) -> Self {
        Self::init(config, None)
    }

    pub fn config(&self) -> &PageManagerConfig {
        &self.config
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    fn ensure_alive(&self) -> Result<(), PageError> {
        if self.destroyed {
            Err(PageError::Destroyed)
        } else {
            Ok(())
        }
    }

    /// 登錄檔為空時載入預設頁面。 / Seeds the configured pages when the registry is empty.
    ///
    /// Returns how many pages were added. Seeds with an id already taken are
    /// skipped.
    pub fn on_load(&mut self) -> Result<usize, PageError> {
        self.ensure_alive()?;
        if !self.master.is_empty() {
            return Ok(0);
        }
        let mut added = 0;
        for seed in self.config.blocks.clone() {
            match self.insert(PageEntity::from(seed)) {
                Ok(_) => added += 1,
                Err(PageError::DuplicateId(id)) => {
                    warn!(page = %id, "skipping duplicate seed page");
                }
                Err(err) => return Err(err),
            }
        }
        debug!(added, "seed pages loaded");
        Ok(added)
    }

    /// 若設定了 `append_to`，渲染並掛載容器。 / Renders and mounts the container when `append_to` is set.
    ///
    /// Returns whether the host accepted the markup.
    pub fn post_render(&mut self) -> Result<bool, PageError> {
        self.ensure_alive()?;
        let Some(target) = self.config.append_to.clone() else {
            return Ok(false);
        };
        let markup = self.render(None, RenderOptions::default())?.html();
        let Some(editor) = self.editor.as_mut() else {
            warn!(target = %target, "no editor attached; container not mounted");
            return Ok(false);
        };
        let mounted = editor.mount(&target, &markup);
        if !mounted {
            warn!(target = %target, "mount target not found");
        }
        Ok(mounted)
    }

    /// 新增頁面；`id` 會合併進 `options`。 / Adds a page built from `options` with `id` merged in.
    pub fn add(&mut self, id: impl Into<String>, options: PageOptions) -> Result<&PageEntity, PageError> {
        self.insert(options.into_entity(id))
    }

    /// 以產生的 id 新增空白頁面。 / Adds a blank page with a generated `page-N` id.
    pub fn add_generated(&mut self) -> Result<&PageEntity, PageError> {
        self.ensure_alive()?;
        let id = loop {
            self.next_generated += 1;
            let candidate = format!("page-{}", self.next_generated);
            if !self.master.contains(&candidate) {
                break candidate;
            }
        };
        self.add(id, PageOptions::new().label(GENERATED_LABEL))
    }

    /// 插入完整的頁面實體。 / Inserts a fully built entity.
    ///
    /// A page flagged `is_current_page` goes through the switch protocol once it
    /// is in the collections, so the canvas is saved into the outgoing page and
    /// loaded from the new one. Without a canvas only the flag is kept and
    /// `current` stays unset until an explicit `activate`.
    pub fn insert(&mut self, mut page: PageEntity) -> Result<&PageEntity, PageError> {
        self.ensure_alive()?;
        if self.master.contains(&page.id) {
            return Err(PageError::DuplicateId(page.id));
        }
        if let Some(category) = page.resolved_category() {
            self.categories.add(category);
        }
        let make_current = std::mem::take(&mut page.is_current_page);
        let id = page.id.clone();
        let index = self.master.len();

        self.visible.push(id.clone());
        let page = self.master.push(page);
        if let Some(view) = self.view.as_mut() {
            view.add(page, &mut self.categories);
        }
        emit(&mut self.editor, EditorEvent::PageAdded(page));
        debug!(page = %id, total = self.visible.len(), "page added");

        if make_current {
            self.claim_current(&id)?;
        }
        Ok(&self.master[index])
    }

    fn claim_current(&mut self, id: &str) -> Result<(), PageError> {
        match self.activate(id)? {
            SwitchOutcome::Unavailable => {
                let mut touched = Vec::new();
                for page in self.master.iter_mut() {
                    let flagged = page.id == id;
                    if page.is_current_page != flagged {
                        page.is_current_page = flagged;
                        touched.push(page.id.clone());
                    }
                }
                self.current = None;
                if let Some(view) = self.view.as_mut() {
                    for page in touched.iter().filter_map(|id| self.master.get(id)) {
                        view.refresh(page);
                    }
                }
                debug!(page = %id, "current flag recorded without a canvas");
            }
            outcome => debug!(page = %id, ?outcome, "page added as current"),
        }
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&PageEntity> {
        self.master.get(id)
    }

    pub fn get_all(&self) -> &PageCollection {
        &self.master
    }

    /// 依 `visible` 順序列出頁面。 / Pages in `visible` order.
    pub fn get_all_visible(&self) -> Vec<&PageEntity> {
        self.visible
            .iter()
            .filter_map(|id| self.master.get(id))
            .collect()
    }

    pub fn visible_ids(&self) -> &[String] {
        &self.visible
    }

    /// 移除頁面；不存在時回傳 `None`。 / Removes a page, returning `None` when absent.
    pub fn remove(&mut self, id: &str) -> Result<Option<PageEntity>, PageError> {
        self.ensure_alive()?;
        let Some(page) = self.master.remove(id) else {
            return Ok(None);
        };
        self.visible.retain(|existing| existing != id);
        if self.current.as_deref() == Some(id) {
            self.current = None;
        }
        if let Some(view) = self.view.as_mut() {
            view.remove_page(id);
        }
        emit(&mut self.editor, EditorEvent::PageRemoved(&page));
        debug!(page = %id, total = self.visible.len(), "page removed");
        Ok(Some(page))
    }

    pub fn get_categories(&self) -> &CategorySet {
        &self.categories
    }

    /// 主要清單的根節點所在的樹。 / Tree holding the primary list; fails before the first render.
    pub fn get_container(&self) -> Result<&Dom, PageError> {
        self.ensure_alive()?;
        match &self.view {
            Some(view) if view.is_rendered() => Ok(view.dom()),
            _ => Err(PageError::NotRendered),
        }
    }

    /// 渲染頁面清單。 / Renders the page list.
    ///
    /// `pages` selects ids to show (unknown ids are skipped); `None` renders every
    /// visible page. With `external` (from `options`, else from the config) a
    /// detached tree is returned and the primary view is untouched; otherwise the
    /// primary view is built once and only reset on later calls.
    pub fn render(
        &mut self,
        pages: Option<&[&str]>,
        options: RenderOptions,
    ) -> Result<Cow<'_, Dom>, PageError> {
        self.ensure_alive()?;
        let selected: Vec<&PageEntity> = match pages {
            Some(ids) => ids.iter().filter_map(|id| self.master.get(id)).collect(),
            None => self
                .visible
                .iter()
                .filter_map(|id| self.master.get(id))
                .collect(),
        };

        let merged = self.config.merged(&options);
        if merged.external {
            let mut view = PageListView::new(merged);
            view.render(&selected, &mut self.categories);
            debug!(pages = selected.len(), "external page list rendered");
            return Ok(Cow::Owned(view.into_dom()));
        }

        let view = self
            .view
            .get_or_insert_with(|| PageListView::new(self.config.clone()));
        view.update_config(&options);
        if view.is_rendered() {
            view.reset(&selected, &mut self.categories);
        } else {
            view.render(&selected, &mut self.categories);
        }
        Ok(Cow::Borrowed(view.dom()))
    }

    /// 淺層合併渲染選項。 / Shallow-merges render options for subsequent renders.
    pub fn update_config(&mut self, options: &RenderOptions) {
        self.config.merge(options);
        if let Some(view) = self.view.as_mut() {
            view.update_config(options);
        }
    }

    pub fn current_page(&self) -> Option<&PageEntity> {
        self.current.as_deref().and_then(|id| self.master.get(id))
    }

    pub fn current_page_id(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// 將畫布切換到指定頁面。 / Switches the canvas to `id`.
    pub fn activate(&mut self, id: &str) -> Result<SwitchOutcome, PageError> {
        self.ensure_alive()?;
        let outcome = self.switcher.activate(
            &mut self.master,
            &mut self.current,
            host_of(&mut self.editor),
            id,
        )?;
        if let SwitchOutcome::Switched { previous } = &outcome {
            if let Some(view) = self.view.as_mut() {
                for touched in previous.iter().map(String::as_str).chain([id]) {
                    if let Some(page) = self.master.get(touched) {
                        view.refresh(page);
                    }
                }
            }
            if let Some(page) = self.master.get(id) {
                emit(&mut self.editor, EditorEvent::PageSelected(page));
            }
        }
        Ok(outcome)
    }

    /// 刪除頁面；目前頁面會先保存畫布狀態。 / Deletes a page, saving the canvas into it first when it is current.
    pub fn delete_page(&mut self, id: &str) -> Result<Option<PageEntity>, PageError> {
        self.ensure_alive()?;
        let persisted = self.switcher.persist_before_delete(
            &mut self.master,
            &mut self.current,
            host_of(&mut self.editor),
            id,
        );
        if persisted {
            debug!(page = %id, "canvas state saved before delete");
        }
        self.remove(id)
    }

    /// 處理主要清單上的點擊。 / Routes a click on a node of the primary tree.
    ///
    /// Returns the action that was carried out; clicks outside any affordance and
    /// clicks on disabled pages yield `None`.
    pub fn dispatch_click(&mut self, node: NodeId) -> Result<Option<ViewAction>, PageError> {
        self.ensure_alive()?;
        let view = match self.view.as_mut() {
            Some(view) if view.is_rendered() => view,
            _ => return Err(PageError::NotRendered),
        };
        let Some(action) = view.resolve_action(node) else {
            return Ok(None);
        };
        match &action {
            ViewAction::ToggleCategory(id) => {
                view.toggle_category(id);
            }
            ViewAction::Activate(id) | ViewAction::Delete(id)
                if self.master.get(id).map_or(true, |page| page.disable) =>
            {
                return Ok(None);
            }
            ViewAction::Activate(id) => {
                self.activate(id)?;
            }
            ViewAction::Delete(id) => {
                self.delete_page(id)?;
            }
            ViewAction::AddPage => {
                self.add_generated()?;
            }
        }
        Ok(Some(action))
    }

    /// 取得拖曳排序控制器。 / The drag-sort controller, built on first use.
    pub fn sorter(&mut self) -> Option<&mut (dyn Sorter + 'static)> {
        let view = self.view.as_mut()?;
        let host = host_of(&mut self.editor)?;
        view.drag_sort_mut().sorter(host)
    }

    pub fn on_drag_start(&mut self, event: &DragEvent) {
        if let (Some(view), Some(host)) = (self.view.as_mut(), host_of(&mut self.editor)) {
            view.drag_sort_mut().on_start(host, event);
        }
    }

    pub fn on_drag_move(&mut self, event: &DragEvent) {
        if let (Some(view), Some(host)) = (self.view.as_ref(), host_of(&mut self.editor)) {
            view.drag_sort().on_move(host, event);
        }
    }

    pub fn on_drop(&mut self, model: Option<&mut DroppedModel>) {
        if let (Some(view), Some(host)) = (self.view.as_ref(), host_of(&mut self.editor)) {
            view.drag_sort().on_drop(host, model);
        }
    }

    /// 清空所有集合並釋放視圖；可重複呼叫。 / Clears every collection and releases the view; safe to repeat.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.master.clear();
        self.visible.clear();
        self.categories.clear();
        self.view = None;
        self.current = None;
        self.editor = None;
        self.destroyed = true;
        info!("page manager destroyed");
    }
}

fn host_of(editor: &mut Option<Box<dyn EditorHost>>) -> Option<&mut dyn EditorHost> {
    match editor {
        Some(editor) => {
            let host: &mut dyn EditorHost = editor.as_mut();
            Some(host)
        }
        None => None,
    }
}

fn emit(editor: &mut Option<Box<dyn EditorHost>>, event: EditorEvent<'_>) {
    if let Some(editor) = editor.as_mut() {
        editor.trigger(&event);
    }
}
