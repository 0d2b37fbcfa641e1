use tracing::{debug, warn};

use crate::canvas::CanvasElement;
use crate::host::{EditorEvent, EditorHost};

/// 拖曳事件內容。 / Payload of a drag start/move notification.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DragEvent {
    /// Id of the dragged source, when known.
    pub source: Option<String>,
    pub x: i32,
    pub y: i32,
}

/// 放下的元件模型。 / The model dropped onto the canvas at the end of a sort.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DroppedModel {
    pub id: String,
    /// Requests an "active" notification right after the drop.
    pub active_on_render: bool,
}

/// 排序控制器的建構參數。 / Construction parameters handed to the host's sorter utility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SorterConfig {
    pub container: CanvasElement,
    pub placer: CanvasElement,
    pub frame: Option<CanvasElement>,
    pub container_sel: String,
    pub item_sel: String,
    pub pfx: String,
    pub direction: char,
    pub wmargin: u32,
    pub nested: bool,
    pub canvas_relative: bool,
}

/// 主機提供的排序控制器。 / Sort controller supplied by the host's utility collaborator.
pub trait Sorter {
    /// Begins sorting with `source` as the dragged item.
    fn start_sort(&mut self, source: &str);
}

/// Lazily built drag-sort integration bound to the canvas body and placeholder.
/// 延遲建立、綁定畫布的拖曳排序整合。
pub struct DragSort {
    prefix: String,
    built: bool,
    sorter: Option<Box<dyn Sorter>>,
}

impl DragSort {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            built: false,
            sorter: None,
        }
    }

    pub fn is_built(&self) -> bool {
        self.built
    }

    /// 取得（必要時建立）排序控制器。 / Returns the sort controller, building it on first use.
    ///
    /// Yields `None` when the host lacks a canvas body, a placeholder or sorter
    /// support; a later call retries.
    pub fn sorter(&mut self, host: &mut dyn EditorHost) -> Option<&mut (dyn Sorter + 'static)> {
        if !self.built {
            let config = self.sorter_config(host)?;
            let Some(sorter) = host.create_sorter(config) else {
                warn!("editor host does not provide a sorter; drag reorder unavailable");
                return None;
            };
            debug!("drag-sort controller built");
            self.sorter = Some(sorter);
            self.built = true;
        }
        self.sorter.as_deref_mut()
    }

    fn sorter_config(&self, host: &mut dyn EditorHost) -> Option<SorterConfig> {
        let Some(canvas) = host.canvas() else {
            warn!("no canvas attached; drag reorder unavailable");
            return None;
        };
        let container = canvas.body()?;
        let placer = canvas.placer()?;
        Some(SorterConfig {
            container,
            placer,
            frame: canvas.frame(),
            container_sel: "*".into(),
            item_sel: "*".into(),
            pfx: self.prefix.clone(),
            direction: 'a',
            wmargin: 1,
            nested: true,
            canvas_relative: true,
        })
    }

    /// 開始拖曳：交給排序控制器並通知編輯器。 / Starts a drag: hands the source to the sorter and notifies the editor.
    ///
    /// Drags without a known source only produce the notification.
    pub fn on_start(&mut self, host: &mut dyn EditorHost, event: &DragEvent) {
        host.stop_default();
        host.trigger(&EditorEvent::BlockDragStart(event));
        if let Some(source) = event.source.as_deref() {
            if let Some(sorter) = self.sorter(host) {
                sorter.start_sort(source);
            }
        }
    }

    pub fn on_move(&self, host: &mut dyn EditorHost, event: &DragEvent) {
        host.trigger(&EditorEvent::BlockDragMove(event));
    }

    pub fn on_drop(&self, host: &mut dyn EditorHost, model: Option<&mut DroppedModel>) {
        host.run_default();
        let Some(model) = model else {
            return;
        };
        if model.active_on_render {
            host.trigger(&EditorEvent::ComponentActive(model));
            model.active_on_render = false;
        }
        host.trigger(&EditorEvent::BlockDragStop(model));
    }
}
