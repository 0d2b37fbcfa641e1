use std::fmt;

/// 畫布擁有之元素的不透明參照。 / Opaque handle onto an element owned by the canvas.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanvasElement(String);

impl CanvasElement {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// 一條可轉為 CSS 字串的樣式規則。 / One style rule held by the canvas, printable as CSS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRule {
    pub selectors: String,
    pub style: String,
    pub media: Option<String>,
}

impl StyleRule {
    pub fn new(selectors: impl Into<String>, style: impl Into<String>) -> Self {
        Self {
            selectors: selectors.into(),
            style: style.into(),
            media: None,
        }
    }

    pub fn with_media(mut self, media: impl Into<String>) -> Self {
        self.media = Some(media.into());
        self
    }
}

impl fmt::Display for StyleRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.media {
            Some(media) => write!(f, "@media {media}{{{}{{{}}}}}", self.selectors, self.style),
            None => write!(f, "{}{{{}}}", self.selectors, self.style),
        }
    }
}

/// The live canvas holding the markup and stylesheet currently being edited.
/// 正在編輯中的即時畫布。
pub trait Canvas {
    fn html(&self) -> String;
    fn style_rules(&self) -> Vec<StyleRule>;
    fn set_components(&mut self, markup: &str);
    fn set_style(&mut self, css: &str);
    fn refresh(&mut self);
    fn body(&self) -> Option<CanvasElement>;
    fn placer(&self) -> Option<CanvasElement>;
    fn frame(&self) -> Option<CanvasElement>;
}

/// 畫布內容快照。 / Markup and stylesheet captured from the canvas.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CanvasSnapshot {
    pub html: String,
    pub css: String,
}

impl CanvasSnapshot {
    pub fn capture(canvas: &dyn Canvas) -> Self {
        let css = canvas
            .style_rules()
            .iter()
            .map(ToString::to_string)
            .collect::<String>();
        Self {
            html: canvas.html(),
            css,
        }
    }
}
