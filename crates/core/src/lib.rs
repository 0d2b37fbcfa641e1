//! Page registry, list rendering and canvas switching for the page manager.
//! 頁面管理器核心：登錄檔、清單渲染與畫布切換。

pub mod canvas;
pub mod category_view;
pub mod dom;
pub mod host;
pub mod item_view;
pub mod list_view;
pub mod mount;
pub mod page;
pub mod registry;
pub mod sorter;
pub mod switcher;

pub use canvas::{Canvas, CanvasElement, CanvasSnapshot, StyleRule};
pub use category_view::{CategoryGroupView, CATEGORY_ID_ATTR};
pub use dom::{Dom, DomNode, NodeKind};
pub use host::{EditorEvent, EditorHost};
pub use item_view::{PageItemView, PAGE_ID_ATTR};
pub use list_view::{PageListView, ViewAction};
pub use mount::{MountError, OpenPageManager, Panel, PanelHost, VIEWS_CONTAINER};
pub use page::{
    CategoryEntity, CategoryRef, CategorySet, PageCollection, PageEntity, PageOptions,
    PageRenderer, RenderContext,
};
pub use registry::{PageError, PageRegistry};
pub use sorter::{DragEvent, DragSort, DroppedModel, Sorter, SorterConfig};
pub use switcher::{ActivePageSwitcher, SwitchError, SwitchOutcome};

pub use indextree::NodeId;
pub use pagemanager_settings::{PageManagerConfig, RenderOptions};
