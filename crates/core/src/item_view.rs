use indextree::NodeId;

use crate::dom::Dom;
use crate::page::{PageEntity, RenderContext};

/// 頁面 id 所在的資料屬性。 / Attribute carrying the page id on the item element.
pub const PAGE_ID_ATTR: &str = "data-page-id";

/// Renders one page as an interactive list item.
/// 將單一頁面渲染為可互動的清單項目。
#[derive(Debug, Clone)]
pub struct PageItemView {
    page_id: String,
    node: NodeId,
    prefix: String,
}

impl PageItemView {
    /// 建立尚未掛載的項目節點並完成渲染。 / Creates the detached item element and renders it.
    pub fn new(dom: &mut Dom, page: &PageEntity, prefix: &str) -> Self {
        let node = dom.create_element("div");
        let view = Self {
            page_id: page.id.clone(),
            node,
            prefix: prefix.to_string(),
        };
        view.render(dom, page);
        view
    }

    pub fn page_id(&self) -> &str {
        &self.page_id
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn class_name(&self) -> String {
        format!("{}page", self.prefix)
    }

    pub fn delete_class(&self) -> String {
        format!("{}-delete", self.class_name())
    }

    /// 依頁面狀態重新產生項目內容。 / Rebuilds the item from the page's current state.
    pub fn render(&self, dom: &mut Dom, page: &PageEntity) {
        let node = self.node;
        let ppfx = self.prefix.as_str();
        let class_name = self.class_name();

        dom.clear_children(node);
        dom.clear_attrs(node);
        for (name, value) in &page.attributes {
            if name != "class" {
                dom.set_attr(node, name, value.as_str());
            }
        }

        let extra = page.attributes.get("class").map_or("", String::as_str);
        let state = if page.disable {
            format!("{class_name}--disable")
        } else {
            format!("{ppfx}four-color-h")
        };
        let mut classes = format!("{extra} {class_name} {ppfx}one-bg {state}");
        if page.is_current_page {
            classes.push_str(&format!(" {class_name}--current"));
        }
        let classes = classes.split_whitespace().collect::<Vec<_>>().join(" ");
        dom.set_attr(node, "class", classes);
        dom.set_attr(node, PAGE_ID_ATTR, page.id.as_str());
        dom.set_attr(node, "title", page.display_label());

        if let Some(media) = &page.media {
            let holder = dom.append_element(node, "div", &format!("{class_name}__media"));
            let markup = dom.create_markup(media.as_str());
            dom.append(holder, markup);
        }
        let label = dom.append_element(node, "div", &format!("{class_name}-label"));
        let text = dom.create_text(page.display_label());
        dom.append(label, text);
        let delete = dom.append_element(node, "span", &format!("{} fa fa-trash", self.delete_class()));
        dom.set_attr(delete, "title", "Delete page");

        if let Some(renderer) = &page.render {
            let markup = dom.inner_html(node);
            let context = RenderContext {
                markup: &markup,
                page,
                class_name: &class_name,
                prefix: ppfx,
            };
            if let Some(replacement) = renderer.call(&context) {
                dom.clear_children(node);
                let custom = dom.create_markup(replacement);
                dom.append(node, custom);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{PageOptions, PageRenderer};

    fn mount(page: &PageEntity) -> (Dom, PageItemView) {
        let mut dom = Dom::new("div");
        let view = PageItemView::new(&mut dom, page, "gjs-");
        let root = dom.root();
        dom.append(root, view.node());
        (dom, view)
    }

    #[test]
    fn renders_label_media_and_delete_affordance() {
        let page = PageOptions::new()
            .label("Home")
            .media("<svg></svg>")
            .attribute("class", "landing")
            .attribute("data-kind", "root")
            .into_entity("home");
        let (dom, view) = mount(&page);
        let node = view.node();

        assert_eq!(
            dom.attr(node, "class"),
            Some("landing gjs-page gjs-one-bg gjs-four-color-h")
        );
        assert_eq!(dom.attr(node, "data-kind"), Some("root"));
        assert_eq!(dom.attr(node, PAGE_ID_ATTR), Some("home"));
        assert_eq!(dom.attr(node, "title"), Some("Home"));
        assert!(dom.first_by_class(node, "gjs-page__media").is_some());
        assert!(dom.first_by_class(node, "gjs-page-delete").is_some());
        assert_eq!(dom.text_content(node), "Home");
    }

    #[test]
    fn state_classes_follow_page_flags() {
        let mut page = PageOptions::new().label("About").disabled(true).into_entity("about");
        let (mut dom, view) = mount(&page);
        assert!(dom.has_class(view.node(), "gjs-page--disable"));
        assert!(!dom.has_class(view.node(), "gjs-four-color-h"));

        page.disable = false;
        page.is_current_page = true;
        view.render(&mut dom, &page);
        assert!(dom.has_class(view.node(), "gjs-page--current"));
        assert!(dom.has_class(view.node(), "gjs-four-color-h"));
        assert_eq!(dom.find_by_class(dom.root(), "gjs-page-label").len(), 1);
    }

    #[test]
    fn custom_renderer_replaces_markup() {
        let page = PageOptions::new()
            .label("Blog")
            .renderer(PageRenderer::new(|ctx| {
                assert!(ctx.markup.contains("gjs-page-label"));
                Some(format!("<b class=\"{}-custom\">{}</b>", ctx.class_name, ctx.page.label))
            }))
            .into_entity("blog");
        let (dom, view) = mount(&page);
        assert_eq!(
            dom.inner_html(view.node()),
            "<b class=\"gjs-page-custom\">Blog</b>"
        );
        assert_eq!(dom.attr(view.node(), PAGE_ID_ATTR), Some("blog"));
    }

    #[test]
    fn renderer_returning_none_keeps_default() {
        let page = PageOptions::new()
            .label("Docs")
            .renderer(PageRenderer::new(|_| None))
            .into_entity("docs");
        let (dom, view) = mount(&page);
        assert_eq!(dom.text_content(view.node()), "Docs");
    }
}
