use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use cssparser::{ParseError, Parser as CssParser, ParserInput, Token};
use pagemanager_core::{
    Canvas, CanvasElement, EditorEvent, EditorHost, PageRegistry, RenderOptions, StyleRule,
    SwitchOutcome,
};
use pagemanager_settings::PageManagerConfig;
use serde_json::json;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "pagemanager-cli",
    about = "Inspect page manager configurations",
    author,
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 渲染頁面清單並輸出 HTML。 / Render the page list and print its HTML.
    Render(RenderArgs),
    /// 列出設定中的頁面。 / List the seeded pages.
    List(ListArgs),
}

#[derive(Args)]
struct RenderArgs {
    /// 設定檔（JSON）。 / Configuration file (JSON).
    #[arg(long, value_name = "FILE")]
    config: PathBuf,

    /// 產生獨立的清單樹。 / Render a detached tree.
    #[arg(long)]
    external: bool,

    /// 不依分類分組。 / Do not group pages by category.
    #[arg(long)]
    ignore_categories: bool,

    /// 僅渲染指定頁面（可重複）。 / Only render these pages (repeatable).
    #[arg(long = "page", value_name = "ID")]
    pages: Vec<String>,

    /// 依序啟用頁面（可重複）。 / Activate pages in order before rendering (repeatable).
    #[arg(long, value_name = "ID")]
    activate: Vec<String>,
}

#[derive(Args)]
struct ListArgs {
    /// 設定檔（JSON）。 / Configuration file (JSON).
    #[arg(long, value_name = "FILE")]
    config: PathBuf,

    /// 以 JSON 輸出。 / Emit JSON instead of tab-separated lines.
    #[arg(long)]
    json: bool,
}

fn main() {
    init_tracing();
    if let Err(err) = run() {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> Result<()> {
    let Cli { command } = Cli::parse();
    match command {
        Commands::Render(args) => execute_render(args),
        Commands::List(args) => execute_list(args),
    }
}

fn load_registry(path: &Path) -> Result<PageRegistry> {
    let config = PageManagerConfig::load(path)
        .with_context(|| format!("failed to load configuration from {}", path.display()))?;
    let mut registry = PageRegistry::init(config, Some(Box::new(MemoryEditor::default())));
    let seeded = registry.on_load().context("failed to seed pages")?;
    debug!(seeded, "pages seeded");
    Ok(registry)
}

fn execute_render(args: RenderArgs) -> Result<()> {
    let mut registry = load_registry(&args.config)?;

    for id in &args.activate {
        match registry.activate(id)? {
            SwitchOutcome::Missing => bail!("unknown page `{id}`"),
            SwitchOutcome::Disabled => bail!("page `{id}` is disabled"),
            outcome => debug!(page = %id, ?outcome, "activation"),
        }
    }

    let options = RenderOptions {
        external: args.external.then_some(true),
        ignore_categories: args.ignore_categories.then_some(true),
    };
    let selection: Vec<&str> = args.pages.iter().map(String::as_str).collect();
    let pages = (!selection.is_empty()).then_some(selection.as_slice());
    let dom = registry.render(pages, options)?;
    println!("{}", dom.html());
    Ok(())
}

fn execute_list(args: ListArgs) -> Result<()> {
    let registry = load_registry(&args.config)?;
    let pages = registry.get_all_visible();

    if args.json {
        let entries: Vec<_> = pages
            .iter()
            .map(|page| {
                json!({
                    "id": page.id,
                    "label": page.display_label(),
                    "category": page.resolved_category().map(|category| category.id),
                    "current": page.is_current_page,
                    "disabled": page.disable,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    for page in pages {
        let category = page
            .resolved_category()
            .map(|category| category.id)
            .unwrap_or_default();
        println!("{}\t{}\t{}", page.id, page.display_label(), category);
    }
    Ok(())
}

/// 記憶體中的畫布，供命令列切換頁面使用。 / In-memory canvas backing page switches on the command line.
#[derive(Default)]
struct MemoryCanvas {
    html: String,
    rules: Vec<StyleRule>,
}

impl Canvas for MemoryCanvas {
    fn html(&self) -> String {
        self.html.clone()
    }

    fn style_rules(&self) -> Vec<StyleRule> {
        self.rules.clone()
    }

    fn set_components(&mut self, markup: &str) {
        self.html = markup.to_string();
    }

    fn set_style(&mut self, css: &str) {
        self.rules = parse_rules(css);
    }

    fn refresh(&mut self) {}

    fn body(&self) -> Option<CanvasElement> {
        Some(CanvasElement::new("body"))
    }

    fn placer(&self) -> Option<CanvasElement> {
        None
    }

    fn frame(&self) -> Option<CanvasElement> {
        None
    }
}

#[derive(Default)]
struct MemoryEditor {
    canvas: MemoryCanvas,
}

impl EditorHost for MemoryEditor {
    fn trigger(&mut self, event: &EditorEvent<'_>) {
        debug!(event = event.name(), "editor event");
    }

    fn canvas(&mut self) -> Option<&mut dyn Canvas> {
        Some(&mut self.canvas)
    }
}

/// 將樣式表拆成規則；`@media` 內的規則帶上媒體條件。 / Splits a stylesheet into rules, tagging rules nested in `@media`.
///
/// Block bodies are kept verbatim, so strings, escapes and other block at-rules
/// such as `@supports` survive a round trip. Statement at-rules like `@import`
/// have no rule form and are dropped.
fn parse_rules(css: &str) -> Vec<StyleRule> {
    let mut input = ParserInput::new(css);
    let mut parser = CssParser::new(&mut input);
    collect_rules(&mut parser)
}

fn collect_rules<'i>(parser: &mut CssParser<'i, '_>) -> Vec<StyleRule> {
    let mut rules = Vec::new();
    loop {
        parser.skip_whitespace();
        if parser.is_exhausted() {
            return rules;
        }

        let start = parser.position();
        let prelude = loop {
            let before = parser.position();
            match parser.next_including_whitespace() {
                Ok(Token::CurlyBracketBlock) => {
                    break Some(parser.slice(start..before).trim().to_string());
                }
                Ok(Token::Semicolon) => break None,
                Ok(_) => {}
                Err(_) => return rules,
            }
        };
        let Some(prelude) = prelude else {
            warn!(statement = parser.slice_from(start).trim(), "dropping statement at-rule");
            continue;
        };

        if let Some(media) = prelude.strip_prefix("@media") {
            let media = media.trim().to_string();
            let nested = parser
                .parse_nested_block(|block| Ok::<_, ParseError<'i, ()>>(collect_rules(block)));
            if let Ok(nested) = nested {
                rules.extend(nested.into_iter().map(|rule| rule.with_media(media.clone())));
            }
            continue;
        }

        let body = parser.parse_nested_block(|block| {
            let body_start = block.position();
            while block.next_including_whitespace().is_ok() {}
            Ok::<_, ParseError<'i, ()>>(block.slice_from(body_start).trim().to_string())
        });
        if let Ok(body) = body {
            rules.push(StyleRule::new(prelude, body));
        }
    }
}
