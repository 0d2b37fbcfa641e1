use pagemanager_settings::RenderOptions;
use thiserror::Error;
use tracing::debug;

use crate::dom::Dom;
use crate::registry::{PageError, PageRegistry};

/// 放置頁面清單的面板 id。 / Id of the panel that receives the page list.
pub const VIEWS_CONTAINER: &str = "views-container";

/// 面板：可設定屬性並觸發事件。 / A panel of the editor UI.
pub trait Panel {
    fn set(&mut self, key: &str, value: String);
    fn trigger(&mut self, event: &str);
}

/// 面板系統協作者。 / The editor's panel system.
pub trait PanelHost {
    fn panel_mut(&mut self, id: &str) -> Option<&mut dyn Panel>;
    fn add_panel(&mut self, id: &str) -> &mut dyn Panel;
}

#[derive(Debug, Error)]
pub enum MountError {
    #[error(transparent)]
    Page(#[from] PageError),
    #[error("panel `{0}` is unavailable")]
    PanelUnavailable(String),
}

/// 開啟頁面管理器的命令：把清單掛進檢視面板。 / Command that mounts the page list into the views panel.
#[derive(Debug, Default)]
pub struct OpenPageManager {
    wrapper: Option<Dom>,
}

impl OpenPageManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// 目前掛載的包裝容器。 / The wrapper handed to the panel, once run.
    pub fn wrapper(&self) -> Option<&Dom> {
        self.wrapper.as_ref()
    }

    pub fn run(&mut self, registry: &mut PageRegistry, panels: &mut dyn PanelHost) -> Result<(), MountError> {
        let container = registry.render(None, RenderOptions::default())?;
        let mut wrapper = Dom::new("div");
        let root = wrapper.root();
        wrapper.append_copy(root, &container, container.root());
        drop(container);

        push_content(panels, wrapper.html())?;
        debug!(pages = registry.get_all().len(), "page manager mounted");
        self.wrapper = Some(wrapper);
        Ok(())
    }

    /// 隱藏包裝容器。 / Hides the wrapper; a no-op before `run`.
    pub fn stop(&mut self, panels: &mut dyn PanelHost) -> Result<(), MountError> {
        let Some(wrapper) = self.wrapper.as_mut() else {
            return Ok(());
        };
        let root = wrapper.root();
        wrapper.set_attr(root, "style", "display: none");
        push_content(panels, wrapper.html())
    }
}

fn push_content(panels: &mut dyn PanelHost, markup: String) -> Result<(), MountError> {
    if panels.panel_mut(VIEWS_CONTAINER).is_none() {
        panels.add_panel(VIEWS_CONTAINER);
    }
    let Some(panel) = panels.panel_mut(VIEWS_CONTAINER) else {
        return Err(MountError::PanelUnavailable(VIEWS_CONTAINER.to_string()));
    };
    panel.set("appendContent", markup);
    panel.trigger("change:appendContent");
    Ok(())
}
