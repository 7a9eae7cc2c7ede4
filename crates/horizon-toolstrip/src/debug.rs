//! Text dumps of strip and item trees.
//!
//! ```ignore
//! use horizon_toolstrip::debug::StripTreeDebug;
//!
//! let debug = StripTreeDebug::new();
//! println!("{}", debug.format_all(&registry));
//! ```
//!
//! Drop-downs are printed beneath the item that opens them:
//!
//! ```text
//! menu (MenuStrip)
//! ├── &File
//! │   └── [DropDownMenu]
//! │       └── Save  Ctrl+S
//! └── &Edit
//! ```

use std::fmt::{self, Write as _};

use crate::item::ItemId;
use crate::registry::ToolStripRegistry;
use crate::strip::StripId;

/// Branch drawing characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    Ascii,
    #[default]
    Unicode,
}

/// What to include in a dump.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    pub style: TreeStyle,
    /// Print strip and item handles.
    pub show_ids: bool,
    /// Print item shortcuts.
    pub show_shortcuts: bool,
    /// Deepest drop-down level printed, `None` for all.
    pub max_depth: Option<usize>,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_ids: false,
            show_shortcuts: true,
            max_depth: None,
        }
    }
}

impl TreeFormatOptions {
    /// Everything, including handles.
    pub fn detailed() -> Self {
        Self {
            show_ids: true,
            ..Default::default()
        }
    }
}

/// Formats strip trees for logs and test failures.
#[derive(Debug, Clone, Default)]
pub struct StripTreeDebug {
    options: TreeFormatOptions,
}

impl StripTreeDebug {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self { options }
    }

    /// Every live strip that is not some item's drop-down.
    pub fn format_all(&self, reg: &ToolStripRegistry) -> String {
        let roots: Vec<StripId> = reg
            .live_strips()
            .filter(|id| reg.strip(*id).is_some_and(|s| s.owner_item().is_none()))
            .collect();
        let mut output = format!("Strip Tree ({} strips):\n", reg.strip_count());
        if roots.is_empty() {
            output.push_str("  (empty)\n");
        }
        for root in roots {
            output.push_str(&self.format_strip(reg, root));
        }
        output
    }

    /// One strip and everything that drops from it.
    pub fn format_strip(&self, reg: &ToolStripRegistry, strip: StripId) -> String {
        Tree {
            options: &self.options,
            reg,
            root: strip,
        }
        .to_string()
    }
}

struct Tree<'a> {
    options: &'a TreeFormatOptions,
    reg: &'a ToolStripRegistry,
    root: StripId,
}

impl Tree<'_> {
    fn connectors(&self) -> (&'static str, &'static str, &'static str) {
        match self.options.style {
            TreeStyle::Ascii => ("+-- ", "`-- ", "|   "),
            TreeStyle::Unicode => ("\u{251c}\u{2500}\u{2500} ", "\u{2514}\u{2500}\u{2500} ", "\u{2502}   "),
        }
    }

    fn write_items(
        &self,
        f: &mut fmt::Formatter<'_>,
        strip: StripId,
        prefix: &str,
        depth: usize,
    ) -> fmt::Result {
        let (tee, corner, bar) = self.connectors();
        let items = self.reg.items(strip);
        for (i, item) in items.iter().enumerate() {
            let last = i + 1 == items.len();
            f.write_str(prefix)?;
            f.write_str(if last { corner } else { tee })?;
            self.write_item(f, *item)?;
            let child_prefix = format!("{prefix}{}", if last { "    " } else { bar });
            if let Some(drop_down) = self.reg.drop_down_of(*item)
                && self.options.max_depth.is_none_or(|max| depth < max)
            {
                match self.reg.strip(drop_down) {
                    Some(s) => write!(f, "{child_prefix}{corner}[{:?}]", s.kind())?,
                    None => write!(f, "{child_prefix}{corner}[stale]")?,
                }
                if self.options.show_ids {
                    write!(f, " {drop_down:?}")?;
                }
                f.write_char('\n')?;
                self.write_items(f, drop_down, &format!("{child_prefix}    "), depth + 1)?;
            }
        }
        Ok(())
    }

    fn write_item(&self, f: &mut fmt::Formatter<'_>, item: ItemId) -> fmt::Result {
        let Some(it) = self.reg.item(item) else {
            return writeln!(f, "(stale)");
        };
        f.write_str(if it.text().is_empty() { "(no text)" } else { it.text() })?;
        if self.options.show_shortcuts
            && let Some(keys) = it.shortcut()
        {
            write!(f, "  {keys}")?;
        }
        if self.options.show_ids {
            write!(f, " {item:?}")?;
        }
        if it.is_selected() {
            f.write_str(" *")?;
        }
        f.write_char('\n')
    }
}

impl fmt::Display for Tree<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(strip) = self.reg.strip(self.root) else {
            return writeln!(f, "(disposed)");
        };
        let name = if strip.name().is_empty() { "(unnamed)" } else { strip.name() };
        write!(f, "{name} ({:?})", strip.kind())?;
        if self.options.show_ids {
            write!(f, " {:?}", self.root)?;
        }
        if strip.is_disposed() {
            f.write_str(" disposed")?;
        }
        f.write_char('\n')?;
        self.write_items(f, self.root, "", 0)
    }
}
