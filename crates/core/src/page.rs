use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use pagemanager_settings::{CategorySeed, PageSeed};

/// 自訂渲染函式的輸入。 / Input handed to a page's custom renderer.
#[derive(Debug)]
pub struct RenderContext<'a> {
    /// Default markup generated for the item, before any override.
    pub markup: &'a str,
    pub page: &'a PageEntity,
    pub class_name: &'a str,
    pub prefix: &'a str,
}

type RenderFn = dyn Fn(&RenderContext<'_>) -> Option<String>;

/// 頁面的自訂渲染能力。 / Optional capability that overrides the generated item markup.
#[derive(Clone)]
pub struct PageRenderer(Rc<RenderFn>);

impl PageRenderer {
    pub fn new<F>(render: F) -> Self
    where
        F: Fn(&RenderContext<'_>) -> Option<String> + 'static,
    {
        Self(Rc::new(render))
    }

    pub fn call(&self, context: &RenderContext<'_>) -> Option<String> {
        (self.0)(context)
    }
}

impl fmt::Debug for PageRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PageRenderer(..)")
    }
}

/// 分類參照：字串或帶標籤的物件。 / Raw category reference as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryRef {
    Name(String),
    Labeled { id: Option<String>, label: String },
}

impl CategoryRef {
    /// 正規化為分類實體；空白名稱視為無分類。 / Normalizes into a category; blank references resolve to none.
    pub fn resolve(&self) -> Option<CategoryEntity> {
        match self {
            CategoryRef::Name(name) => {
                if name.trim().is_empty() {
                    return None;
                }
                Some(CategoryEntity::new(name.clone(), name.clone()))
            }
            CategoryRef::Labeled { id, label } => {
                let id = id
                    .as_deref()
                    .filter(|id| !id.trim().is_empty())
                    .unwrap_or(label.as_str());
                if id.trim().is_empty() {
                    return None;
                }
                Some(CategoryEntity::new(id, label.clone()))
            }
        }
    }
}

impl From<&str> for CategoryRef {
    fn from(value: &str) -> Self {
        CategoryRef::Name(value.to_string())
    }
}

impl From<String> for CategoryRef {
    fn from(value: String) -> Self {
        CategoryRef::Name(value)
    }
}

impl From<CategoryEntity> for CategoryRef {
    fn from(value: CategoryEntity) -> Self {
        CategoryRef::Labeled {
            id: Some(value.id),
            label: value.label,
        }
    }
}

impl From<CategorySeed> for CategoryRef {
    fn from(value: CategorySeed) -> Self {
        match value {
            CategorySeed::Name(name) => CategoryRef::Name(name),
            CategorySeed::Labeled { id, label } => CategoryRef::Labeled { id, label },
        }
    }
}

/// 分類實體。 / A category label that groups pages in the rendered list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryEntity {
    pub id: String,
    pub label: String,
}

impl CategoryEntity {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// 以 id 去重的分類集合（保留首次出現順序）。 / Categories deduplicated by id, in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct CategorySet {
    entries: Vec<CategoryEntity>,
}

impl CategorySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 加入分類；id 已存在時回傳既有實體。 / Adds a category, returning the existing entity on id collision.
    pub fn add(&mut self, category: CategoryEntity) -> &CategoryEntity {
        let index = match self.entries.iter().position(|c| c.id == category.id) {
            Some(index) => index,
            None => {
                self.entries.push(category);
                self.entries.len() - 1
            }
        };
        &self.entries[index]
    }

    pub fn get(&self, id: &str) -> Option<&CategoryEntity> {
        self.entries.iter().find(|category| category.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CategoryEntity> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// 單一頁面的資料。 / Data record for one page.
#[derive(Debug, Clone, Default)]
pub struct PageEntity {
    pub id: String,
    pub label: String,
    pub content: String,
    pub css: String,
    pub attributes: BTreeMap<String, String>,
    pub category: Option<CategoryRef>,
    pub is_current_page: bool,
    pub media: Option<String>,
    pub disable: bool,
    pub render: Option<PageRenderer>,
}

impl PageEntity {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// 顯示用標籤；未設定時退回 id。 / Display label, falling back to the id.
    pub fn display_label(&self) -> &str {
        if self.label.trim().is_empty() {
            &self.id
        } else {
            &self.label
        }
    }

    /// 已正規化的分類（若有）。 / The resolved category, if any.
    pub fn resolved_category(&self) -> Option<CategoryEntity> {
        self.category.as_ref().and_then(CategoryRef::resolve)
    }
}

impl From<PageSeed> for PageEntity {
    fn from(seed: PageSeed) -> Self {
        Self {
            id: seed.id,
            label: seed.label,
            content: seed.content,
            css: seed.css,
            attributes: seed.attributes,
            category: seed.category.map(CategoryRef::from),
            is_current_page: seed.is_current_page,
            media: seed.media,
            disable: seed.disable,
            render: None,
        }
    }
}

/// `add(id, options)` 的選項。 / Options merged with an id by `PageRegistry::add`.
#[derive(Debug, Clone, Default)]
pub struct PageOptions {
    entity: PageEntity,
}

impl PageOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.entity.label = label.into();
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.entity.content = content.into();
        self
    }

    pub fn css(mut self, css: impl Into<String>) -> Self {
        self.entity.css = css.into();
        self
    }

    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.entity.attributes.insert(name.into(), value.into());
        self
    }

    pub fn category(mut self, category: impl Into<CategoryRef>) -> Self {
        self.entity.category = Some(category.into());
        self
    }

    pub fn current(mut self, current: bool) -> Self {
        self.entity.is_current_page = current;
        self
    }

    pub fn media(mut self, media: impl Into<String>) -> Self {
        self.entity.media = Some(media.into());
        self
    }

    pub fn disabled(mut self, disable: bool) -> Self {
        self.entity.disable = disable;
        self
    }

    pub fn renderer(mut self, renderer: PageRenderer) -> Self {
        self.entity.render = Some(renderer);
        self
    }

    /// 與 id 合併成頁面實體。 / Merges the id into the options, producing the entity.
    pub fn into_entity(self, id: impl Into<String>) -> PageEntity {
        let mut entity = self.entity;
        entity.id = id.into();
        entity
    }
}

/// 依插入順序排列、以 id 查詢的頁面集合。 / Ordered page collection with id lookups.
#[derive(Debug, Clone, Default)]
pub struct PageCollection {
    pages: Vec<PageEntity>,
}

impl PageCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.pages.iter().position(|page| page.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&PageEntity> {
        self.pages.iter().find(|page| page.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut PageEntity> {
        self.pages.iter_mut().find(|page| page.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PageEntity> {
        self.pages.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut PageEntity> {
        self.pages.iter_mut()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.pages.iter().map(|page| page.id.as_str())
    }

    pub(crate) fn push(&mut self, page: PageEntity) -> &PageEntity {
        self.pages.push(page);
        &self.pages[self.pages.len() - 1]
    }

    pub(crate) fn remove(&mut self, id: &str) -> Option<PageEntity> {
        let index = self.position(id)?;
        Some(self.pages.remove(index))
    }

    pub(crate) fn clear(&mut self) {
        self.pages.clear();
    }
}

impl std::ops::Index<usize> for PageCollection {
    type Output = PageEntity;

    fn index(&self, index: usize) -> &PageEntity {
        &self.pages[index]
    }
}
