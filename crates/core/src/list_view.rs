use std::collections::HashMap;

use indextree::NodeId;
use pagemanager_settings::{PageManagerConfig, RenderOptions};
use tracing::debug;

use crate::category_view::{CategoryGroupView, CATEGORY_ID_ATTR};
use crate::dom::Dom;
use crate::item_view::{PageItemView, PAGE_ID_ATTR};
use crate::page::{CategorySet, PageEntity};
use crate::sorter::DragSort;

/// 點擊清單後解析出的動作。 / Action resolved from a click inside the rendered list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewAction {
    Activate(String),
    Delete(String),
    AddPage,
    ToggleCategory(String),
}

/// Categorized list of page items rendered from an ordered collection.
/// 由頁面集合渲染出的分類清單。
///
/// The view keeps the ids of its backing collection; page data is always passed
/// in by the owner, so detached views never reach back into the registry.
pub struct PageListView {
    dom: Dom,
    config: PageManagerConfig,
    collection: Vec<String>,
    categories_el: Option<NodeId>,
    bucket_el: Option<NodeId>,
    rendered_categories: HashMap<String, CategoryGroupView>,
    items: HashMap<String, PageItemView>,
    rendered: bool,
    drag_sort: DragSort,
}

impl PageListView {
    pub fn new(config: PageManagerConfig) -> Self {
        let drag_sort = DragSort::new(config.p_style_prefix.clone());
        Self {
            dom: Dom::new("div"),
            config,
            collection: Vec::new(),
            categories_el: None,
            bucket_el: None,
            rendered_categories: HashMap::new(),
            items: HashMap::new(),
            rendered: false,
            drag_sort,
        }
    }

    pub fn config(&self) -> &PageManagerConfig {
        &self.config
    }

    fn prefix(&self) -> &str {
        &self.config.p_style_prefix
    }

    /// 淺層合併渲染選項，供後續渲染使用。 / Shallow-merges options used by subsequent renders.
    pub fn update_config(&mut self, options: &RenderOptions) {
        self.config.merge(options);
    }

    pub fn is_rendered(&self) -> bool {
        self.rendered
    }

    pub fn collection(&self) -> &[String] {
        &self.collection
    }

    pub fn dom(&self) -> &Dom {
        &self.dom
    }

    pub fn into_dom(self) -> Dom {
        self.dom
    }

    pub fn drag_sort(&self) -> &DragSort {
        &self.drag_sort
    }

    pub fn drag_sort_mut(&mut self) -> &mut DragSort {
        &mut self.drag_sort
    }

    /// 完整渲染：重建外框並依序加入每個頁面。 / Full render: rebuilds the frame, then adds every page in order.
    pub fn render(&mut self, pages: &[&PageEntity], categories: &mut CategorySet) {
        let prefix = self.prefix().to_string();
        let root = self.dom.root();
        self.dom.clear_children(root);
        self.rendered_categories.clear();
        self.items.clear();

        let categories_el = self
            .dom
            .append_element(root, "div", &format!("{prefix}page-categories"));
        let no_cat = self
            .dom
            .append_element(root, "div", &format!("{prefix}pages-no-cat"));
        let add_btn = self.dom.append_element(
            no_cat,
            "div",
            &format!("{prefix}add-page-btn {prefix}four-color-h"),
        );
        let icon = self.dom.append_element(
            add_btn,
            "span",
            &format!("{prefix}add-page-btn-icon fa fa-plus"),
        );
        self.dom.set_attr(icon, "title", "Add Page");
        let add_label = self.dom.create_text("Add Page...");
        self.dom.append(add_btn, add_label);
        let bucket = self
            .dom
            .append_element(no_cat, "div", &format!("{prefix}pages-c"));
        self.dom.set_attr(
            root,
            "class",
            format!("{prefix}pages-cs {prefix}one-bg {prefix}two-color"),
        );

        self.categories_el = Some(categories_el);
        self.bucket_el = Some(bucket);
        self.rendered = true;
        self.collection = pages.iter().map(|page| page.id.clone()).collect();
        for page in pages {
            self.attach(page, categories);
        }
        debug!(pages = pages.len(), "page list rendered");
    }

    /// 重設底層集合；已渲染時只重新填入項目。 / Resets the backing collection, repopulating items if already rendered.
    pub fn reset(&mut self, pages: &[&PageEntity], categories: &mut CategorySet) {
        self.collection = pages.iter().map(|page| page.id.clone()).collect();
        if !self.rendered {
            return;
        }
        for (_, item) in self.items.drain() {
            self.dom.remove(item.node());
        }
        for (_, group) in self.rendered_categories.drain() {
            self.dom.remove(group.node());
        }
        for page in pages {
            self.attach(page, categories);
        }
        debug!(pages = pages.len(), "page list reset");
    }

    /// 增量加入單一頁面。 / Incrementally adds one page to the collection and the tree.
    pub fn add(&mut self, page: &PageEntity, categories: &mut CategorySet) {
        if !self.collection.iter().any(|id| id == &page.id) {
            self.collection.push(page.id.clone());
        }
        if self.rendered {
            self.attach(page, categories);
        }
    }

    fn attach(&mut self, page: &PageEntity, categories: &mut CategorySet) {
        let prefix = self.prefix().to_string();
        if let Some(previous) = self.items.remove(&page.id) {
            self.dom.remove(previous.node());
        }
        let item = PageItemView::new(&mut self.dom, page, &prefix);
        let node = item.node();
        self.items.insert(page.id.clone(), item);

        let category = if self.config.ignore_categories {
            None
        } else {
            page.resolved_category()
        };

        match (category, self.categories_el) {
            (Some(category), Some(categories_el)) => {
                let category = categories.add(category).clone();
                if !self.rendered_categories.contains_key(&category.id) {
                    debug!(category = %category.id, "category group created");
                    let group = CategoryGroupView::new(&mut self.dom, category.clone(), &prefix);
                    self.dom.append(categories_el, group.node());
                    self.rendered_categories.insert(category.id.clone(), group);
                }
                if let Some(group) = self.rendered_categories.get(&category.id) {
                    group.append(&mut self.dom, node);
                }
            }
            _ => {
                if let Some(bucket) = self.bucket_el {
                    self.dom.append(bucket, node);
                }
            }
        }
    }

    /// 移除頁面項目。 / Removes the page's item from the tree and the collection.
    pub fn remove_page(&mut self, id: &str) -> bool {
        self.collection.retain(|existing| existing != id);
        match self.items.remove(id) {
            Some(item) => {
                self.dom.remove(item.node());
                true
            }
            None => false,
        }
    }

    /// 重新渲染單一項目。 / Re-renders the item bound to `page`, if present.
    pub fn refresh(&mut self, page: &PageEntity) -> bool {
        match self.items.get(&page.id) {
            Some(item) => {
                item.render(&mut self.dom, page);
                true
            }
            None => false,
        }
    }

    pub fn toggle_category(&mut self, id: &str) -> Option<bool> {
        let group = self.rendered_categories.get_mut(id)?;
        Some(group.toggle(&mut self.dom))
    }

    /// 將點擊目標對應到動作。 / Maps a click target to the action it requests.
    pub fn resolve_action(&self, target: NodeId) -> Option<ViewAction> {
        let prefix = self.prefix();
        let item_class = format!("{prefix}page");
        let page_id = |node: NodeId| {
            self.dom
                .closest(node, &item_class)
                .and_then(|item| self.dom.attr(item, PAGE_ID_ATTR))
                .map(str::to_string)
        };

        if self
            .dom
            .closest(target, &format!("{prefix}page-delete"))
            .is_some()
        {
            return page_id(target).map(ViewAction::Delete);
        }
        if self
            .dom
            .closest(target, &format!("{prefix}add-page-btn"))
            .is_some()
        {
            return Some(ViewAction::AddPage);
        }
        if let Some(title) = self.dom.closest(target, &format!("{prefix}title")) {
            return self
                .dom
                .attr(title, CATEGORY_ID_ATTR)
                .map(|id| ViewAction::ToggleCategory(id.to_string()));
        }
        page_id(target).map(ViewAction::Activate)
    }

    pub fn item_node(&self, page_id: &str) -> Option<NodeId> {
        self.items.get(page_id).map(PageItemView::node)
    }

    pub fn category_group(&self, id: &str) -> Option<&CategoryGroupView> {
        self.rendered_categories.get(id)
    }

    /// 依畫面順序列出分類 id。 / Category ids in rendered order.
    pub fn category_ids(&self) -> Vec<String> {
        let Some(categories_el) = self.categories_el else {
            return Vec::new();
        };
        self.dom
            .children(categories_el)
            .into_iter()
            .filter_map(|node| self.dom.attr(node, CATEGORY_ID_ATTR).map(str::to_string))
            .collect()
    }

    pub fn page_ids_in_category(&self, id: &str) -> Vec<String> {
        self.rendered_categories
            .get(id)
            .map(|group| self.page_ids_under(group.items_node()))
            .unwrap_or_default()
    }

    pub fn uncategorized_page_ids(&self) -> Vec<String> {
        self.bucket_el
            .map(|bucket| self.page_ids_under(bucket))
            .unwrap_or_default()
    }

    fn page_ids_under(&self, node: NodeId) -> Vec<String> {
        self.dom
            .children(node)
            .into_iter()
            .filter_map(|child| self.dom.attr(child, PAGE_ID_ATTR).map(str::to_string))
            .collect()
    }

    /// 已渲染的項目節點數。 / Number of item nodes in the tree.
    pub fn item_count(&self) -> usize {
        self.dom
            .find_by_class(self.dom.root(), &format!("{}page", self.prefix()))
            .len()
    }
}
