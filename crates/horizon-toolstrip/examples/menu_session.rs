//! Horizon Toolstrip Menu Session Example
//!
//! Drives one scripted session through a simulated UI thread:
//! - MDI child menu merged into the main menu bar
//! - Shortcuts arriving as winit key events
//! - A drop-down opened and dismissed by a click outside
//!
//! Run with: RUST_LOG=horizon_toolstrip=debug cargo run -p horizon-toolstrip --example menu_session

use horizon_toolstrip::debug::{StripTreeDebug, TreeFormatOptions, TreeStyle};
use horizon_toolstrip::keys::{from_winit_key, from_winit_modifiers};
use horizon_toolstrip::{
    Key, Keys, MergeAction, StripKind, ToolStrip, ToolStripItem, ToolStripManager,
};
use horizon_toolstrip_core::{Message, Point, Rect, ThreadMessageLoop};
use tracing_subscriber::EnvFilter;
use winit::keyboard::{Key as WinitKey, ModifiersState};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut host = ThreadMessageLoop::new();
    let windows = host.windows_mut();
    let main_form = windows.create_form(None, "main", Rect::new(0, 0, 800, 600), true);
    let main_bar = windows.create_child(main_form, "main-menu", Rect::new(0, 0, 800, 24))?;
    let doc = windows.create_form(Some(main_form), "doc", Rect::new(0, 24, 500, 400), false);
    let doc_bar = windows.create_child(doc, "doc-menu", Rect::new(0, 0, 500, 24))?;
    let doc_text = windows.create_child(doc, "doc-text", Rect::new(0, 24, 500, 376))?;
    let file_popup = windows.create_popup("file", Rect::new(0, 24, 160, 120));
    windows.set_active_mdi_child(main_form, Some(doc))?;
    host.set_active_window(Some(main_form));
    host.set_focused_window(Some(doc_text));

    let mut manager = ToolStripManager::new();
    let reg = manager.registry_mut();
    let main_menu = reg.register(ToolStrip::new(StripKind::MenuStrip, main_bar).with_name("main"));
    let file_menu = reg.register(ToolStrip::new(StripKind::DropDownMenu, file_popup));
    let file = reg.create_item(ToolStripItem::new("&File"));
    reg.add_item(main_menu, file)?;
    reg.attach_drop_down(file, file_menu)?;
    let exit = reg.create_item(ToolStripItem::new("E&xit").with_shortcut(Keys::alt(Key::F4)));
    reg.add_item(file_menu, exit)?;
    let help = reg.create_item(ToolStripItem::new("&Help"));
    reg.add_item(main_menu, help)?;

    let doc_menu = reg.register(ToolStrip::new(StripKind::MenuStrip, doc_bar));
    let format = reg.create_item(
        ToolStripItem::new("F&ormat")
            .with_merge_action(MergeAction::Insert)
            .with_merge_index(1),
    );
    reg.add_item(doc_menu, format)?;
    let bold = reg.create_item(ToolStripItem::new("&Bold").with_shortcut(Keys::ctrl(Key::B)));
    reg.add_item(doc_menu, bold)?;
    if let Some(item) = reg.item(bold) {
        item.triggered.connect(|_| println!("-> Bold"));
    }

    manager.merge(doc_menu, main_menu)?;
    let debug = StripTreeDebug::with_options(TreeFormatOptions {
        style: TreeStyle::Unicode,
        ..Default::default()
    });
    println!("{}", debug.format_all(manager.registry()));

    // Ctrl+B typed into the document, as winit reports it.
    let key = from_winit_key(&WinitKey::Character("b".into()));
    let keys = Keys {
        key,
        modifiers: from_winit_modifiers(ModifiersState::CONTROL),
    };
    let handled = manager.process_cmd_key(&host, &Message::key_down(doc_text), keys);
    println!("{keys} handled: {handled}");

    manager.show_drop_down(&mut host, file_menu)?;
    println!("menu mode after opening File: {}", manager.in_menu_mode());
    host.post(Message::button_down(doc_text, Point::new(300, 200)));
    host.pump(&mut manager)?;
    println!("menu mode after clicking the document: {}", manager.in_menu_mode());

    manager.revert_merge(main_menu)?;
    println!("{}", debug.format_all(manager.registry()));
    Ok(())
}
