use crate::canvas::Canvas;
use crate::page::PageEntity;
use crate::sorter::{DragEvent, DroppedModel, Sorter, SorterConfig};

/// 發送至編輯器事件匯流排的通知。 / Notifications emitted on the editor-wide event bus.
#[derive(Debug, Clone, Copy)]
pub enum EditorEvent<'a> {
    PageAdded(&'a PageEntity),
    PageRemoved(&'a PageEntity),
    /// Emitted once a switch has loaded the page into the canvas.
    PageSelected(&'a PageEntity),
    BlockDragStart(&'a DragEvent),
    BlockDragMove(&'a DragEvent),
    BlockDragStop(&'a DroppedModel),
    ComponentActive(&'a DroppedModel),
}

impl EditorEvent<'_> {
    /// 事件在匯流排上的名稱。 / Event name as seen on the bus.
    pub fn name(&self) -> &'static str {
        match self {
            EditorEvent::PageAdded(_) => "pagemanager:add",
            EditorEvent::PageRemoved(_) => "pagemanager:remove",
            EditorEvent::PageSelected(_) => "pagemanager:select",
            EditorEvent::BlockDragStart(_) => "block:drag:start",
            EditorEvent::BlockDragMove(_) => "block:drag:move",
            EditorEvent::BlockDragStop(_) => "block:drag:stop",
            EditorEvent::ComponentActive(_) => "component:active",
        }
    }
}

/// The surrounding editor as seen by the page manager: event bus plus access to
/// the canvas and utility collaborators.
/// 頁面管理器所見的編輯器：事件匯流排與畫布、工具協作者。
pub trait EditorHost {
    fn trigger(&mut self, event: &EditorEvent<'_>);

    /// `None` disables page switching.
    fn canvas(&mut self) -> Option<&mut dyn Canvas> {
        None
    }

    /// Builds the drag-sort controller; hosts without one disable drag reorder.
    fn create_sorter(&mut self, _config: SorterConfig) -> Option<Box<dyn Sorter>> {
        None
    }

    fn stop_default(&mut self) {}

    fn run_default(&mut self) {}

    /// 將容器掛載到選擇器目標。 / Mounts rendered markup into `target`; returns whether it was found.
    fn mount(&mut self, _target: &str, _markup: &str) -> bool {
        false
    }
}
