use indextree::NodeId;

use crate::dom::Dom;
use crate::page::CategoryEntity;

/// 分類 id 所在的資料屬性。 / Attribute carrying the category id.
pub const CATEGORY_ID_ATTR: &str = "data-category-id";

/// 分類標題容器，承載頁面項目。 / Titled container hosting the items of one category.
#[derive(Debug, Clone)]
pub struct CategoryGroupView {
    category: CategoryEntity,
    prefix: String,
    node: NodeId,
    caret: NodeId,
    items: NodeId,
    open: bool,
}

impl CategoryGroupView {
    pub fn new(dom: &mut Dom, category: CategoryEntity, prefix: &str) -> Self {
        let node = dom.create_element("div");
        dom.set_attr(node, "class", format!("{prefix}page-category {prefix}open"));
        dom.set_attr(node, CATEGORY_ID_ATTR, category.id.as_str());

        let title = dom.append_element(node, "div", &format!("{prefix}title"));
        dom.set_attr(title, CATEGORY_ID_ATTR, category.id.as_str());
        let caret = dom.append_element(title, "i", &format!("{prefix}caret-icon fa fa-caret-down"));
        let label = dom.create_text(category.label.as_str());
        dom.append(title, label);

        let items = dom.append_element(node, "div", &format!("{prefix}pages-c"));

        Self {
            category,
            prefix: prefix.to_string(),
            node,
            caret,
            items,
            open: true,
        }
    }

    pub fn category(&self) -> &CategoryEntity {
        &self.category
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    /// 放置頁面項目的容器。 / Element receiving the page items.
    pub fn items_node(&self) -> NodeId {
        self.items
    }

    pub fn append(&self, dom: &mut Dom, item: NodeId) {
        dom.append(self.items, item);
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn set_open(&mut self, dom: &mut Dom, open: bool) {
        self.open = open;
        let open_class = format!("{}open", self.prefix);
        if open {
            dom.add_class(self.node, &open_class);
            dom.remove_class(self.caret, "fa-caret-right");
            dom.add_class(self.caret, "fa-caret-down");
            dom.remove_attr(self.items, "style");
        } else {
            dom.remove_class(self.node, &open_class);
            dom.remove_class(self.caret, "fa-caret-down");
            dom.add_class(self.caret, "fa-caret-right");
            dom.set_attr(self.items, "style", "display: none");
        }
    }

    /// 切換展開狀態並回傳新狀態。 / Flips the open state and returns it.
    pub fn toggle(&mut self, dom: &mut Dom) -> bool {
        let next = !self.open;
        self.set_open(dom, next);
        next
    }
}
