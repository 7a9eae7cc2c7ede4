//! Integration tests for menu merging and revert.

use horizon_toolstrip::{
    ItemId, MergeAction, StripId, StripKind, ToolStrip, ToolStripError, ToolStripItem,
    ToolStripManager, ToolStripRegistry, UndoAction,
};
use horizon_toolstrip_core::{Rect, WindowTree};

struct Fixture {
    windows: WindowTree,
    manager: ToolStripManager,
    main: StripId,
    child: StripId,
    file: ItemId,
    edit: ItemId,
    help: ItemId,
}

fn setup() -> Fixture {
    let mut windows = WindowTree::new();
    let form = windows.create_form(None, "main", Rect::new(0, 0, 800, 600), true);
    let main_bar = windows
        .create_child(form, "main-menu", Rect::new(0, 0, 800, 24))
        .unwrap();
    let doc = windows.create_form(Some(form), "doc", Rect::new(0, 24, 400, 300), false);
    let child_bar = windows
        .create_child(doc, "doc-menu", Rect::new(0, 0, 400, 24))
        .unwrap();

    let mut manager = ToolStripManager::new();
    let reg = manager.registry_mut();
    let main = reg.register(ToolStrip::new(StripKind::MenuStrip, main_bar).with_name("main"));
    let child = reg.register(ToolStrip::new(StripKind::MenuStrip, child_bar).with_name("doc"));
    let file = add(reg, main, ToolStripItem::new("&File"));
    let edit = add(reg, main, ToolStripItem::new("Edit"));
    let help = add(reg, main, ToolStripItem::new("Help"));

    Fixture {
        windows,
        manager,
        main,
        child,
        file,
        edit,
        help,
    }
}

fn add(reg: &mut ToolStripRegistry, strip: StripId, item: ToolStripItem) -> ItemId {
    let id = reg.create_item(item);
    reg.add_item(strip, id).unwrap();
    id
}

fn texts(reg: &ToolStripRegistry, strip: StripId) -> Vec<String> {
    reg.items(strip)
        .iter()
        .map(|i| reg.item(*i).unwrap().text().to_string())
        .collect()
}

#[test]
fn test_merge_then_revert_restores_both_strips() {
    let mut f = setup();
    let reg = f.manager.registry_mut();
    let tools = add(reg, f.child, ToolStripItem::new("Tools"));
    let replacement = add(
        reg,
        f.child,
        ToolStripItem::new("EDIT").with_merge_action(MergeAction::Replace),
    );
    let extra = add(
        reg,
        f.child,
        ToolStripItem::new("Extra")
            .with_merge_action(MergeAction::Insert)
            .with_merge_index(1),
    );

    assert!(f.manager.merge(f.child, f.main).unwrap());
    let reg = f.manager.registry();
    assert_eq!(texts(reg, f.main), ["&File", "Extra", "EDIT", "Help", "Tools"]);
    assert!(reg.items(f.child).is_empty());
    assert_eq!(reg.item(f.edit).unwrap().owner(), None);

    let history = reg.strip(f.main).unwrap().merge_history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].source(), f.child);
    let actions: Vec<UndoAction> = history[0].items().iter().map(|s| s.action).collect();
    assert_eq!(
        actions,
        [UndoAction::Remove, UndoAction::Insert, UndoAction::Remove, UndoAction::Remove]
    );

    assert!(f.manager.revert_merge(f.main).unwrap());
    let reg = f.manager.registry();
    assert_eq!(reg.items(f.main), &[f.file, f.edit, f.help]);
    assert_eq!(reg.items(f.child), &[tools, replacement, extra]);
    assert!(reg.strip(f.main).unwrap().merge_history().is_empty());
}

#[test]
fn test_remove_action_leaves_source_item_in_place() {
    let mut f = setup();
    let reg = f.manager.registry_mut();
    let remover = add(
        reg,
        f.child,
        ToolStripItem::new("help").with_merge_action(MergeAction::Remove),
    );

    assert!(f.manager.merge(f.child, f.main).unwrap());
    let reg = f.manager.registry();
    assert_eq!(reg.items(f.main), &[f.file, f.edit]);
    assert_eq!(reg.items(f.child), &[remover]);

    f.manager.revert_merge(f.main).unwrap();
    assert_eq!(f.manager.registry().items(f.main), &[f.file, f.edit, f.help]);
}

#[test]
fn test_match_only_merges_submenus() {
    let mut f = setup();
    let main_popup = f.windows.create_popup("file-dd", Rect::new(0, 24, 120, 80));
    let child_popup = f.windows.create_popup("doc-file-dd", Rect::new(0, 48, 120, 80));

    let reg = f.manager.registry_mut();
    let main_dd = reg.register(ToolStrip::new(StripKind::DropDownMenu, main_popup));
    let open = add(reg, main_dd, ToolStripItem::new("Open"));
    reg.attach_drop_down(f.file, main_dd).unwrap();

    let child_file = add(
        reg,
        f.child,
        ToolStripItem::new("&file").with_merge_action(MergeAction::MatchOnly),
    );
    let child_dd = reg.register(ToolStrip::new(StripKind::DropDownMenu, child_popup));
    let close = add(reg, child_dd, ToolStripItem::new("Close"));
    reg.attach_drop_down(child_file, child_dd).unwrap();

    assert!(f.manager.merge(f.child, f.main).unwrap());
    let reg = f.manager.registry();
    assert_eq!(reg.items(f.main), &[f.file, f.edit, f.help]);
    assert_eq!(reg.items(main_dd), &[open, close]);
    assert_eq!(reg.items(f.child), &[child_file]);

    f.manager.revert_merge(f.main).unwrap();
    let reg = f.manager.registry();
    assert_eq!(reg.items(main_dd), &[open]);
    assert_eq!(reg.items(child_dd), &[close]);
}

#[test]
fn test_match_only_without_target_submenu_does_nothing() {
    let mut f = setup();
    let child_popup = f.windows.create_popup("doc-file-dd", Rect::new(0, 48, 120, 80));
    let reg = f.manager.registry_mut();
    let child_file = add(
        reg,
        f.child,
        ToolStripItem::new("&File").with_merge_action(MergeAction::MatchOnly),
    );
    let child_dd = reg.register(ToolStrip::new(StripKind::DropDownMenu, child_popup));
    add(reg, child_dd, ToolStripItem::new("Close"));
    reg.attach_drop_down(child_file, child_dd).unwrap();

    assert!(!f.manager.merge(f.child, f.main).unwrap());
    assert!(f.manager.registry().strip(f.main).unwrap().merge_history().is_empty());
}

#[test]
fn test_revert_from_reapplies_later_merges() {
    let mut f = setup();
    let third_window = f.windows.create_top_level("third", Rect::new(0, 0, 100, 24));
    let reg = f.manager.registry_mut();
    let third = reg.register(ToolStrip::new(StripKind::MenuStrip, third_window));
    let a = add(reg, f.child, ToolStripItem::new("A"));
    let b = add(reg, third, ToolStripItem::new("B"));

    assert!(f.manager.merge(f.child, f.main).unwrap());
    assert!(f.manager.merge(third, f.main).unwrap());
    assert_eq!(texts(f.manager.registry(), f.main), ["&File", "Edit", "Help", "A", "B"]);

    assert!(f.manager.revert_merge_from(f.main, f.child).unwrap());
    let reg = f.manager.registry();
    assert_eq!(reg.items(f.main), &[f.file, f.edit, f.help, b]);
    assert_eq!(reg.items(f.child), &[a]);
    assert!(reg.items(third).is_empty());
    let history = reg.strip(f.main).unwrap().merge_history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].source(), third);

    // Already reverted.
    assert!(!f.manager.revert_merge_from(f.main, f.child).unwrap());
}

#[test]
fn test_revert_merge_undoes_every_source() {
    let mut f = setup();
    let third_window = f.windows.create_top_level("third", Rect::new(0, 0, 100, 24));
    let reg = f.manager.registry_mut();
    let third = reg.register(ToolStrip::new(StripKind::MenuStrip, third_window));
    let a = add(reg, f.child, ToolStripItem::new("A"));
    let b = add(
        reg,
        third,
        ToolStripItem::new("B")
            .with_merge_action(MergeAction::Insert)
            .with_merge_index(0),
    );

    f.manager.merge(f.child, f.main).unwrap();
    f.manager.merge(third, f.main).unwrap();
    assert_eq!(texts(f.manager.registry(), f.main), ["B", "&File", "Edit", "Help", "A"]);

    assert!(f.manager.revert_merge(f.main).unwrap());
    let reg = f.manager.registry();
    assert_eq!(reg.items(f.main), &[f.file, f.edit, f.help]);
    assert_eq!(reg.items(f.child), &[a]);
    assert_eq!(reg.items(third), &[b]);
}

#[test]
fn test_revert_of_unmerged_source_is_false() {
    let mut f = setup();
    add(f.manager.registry_mut(), f.child, ToolStripItem::new("A"));
    assert!(!f.manager.revert_merge_from(f.main, f.child).unwrap());
    assert!(!f.manager.revert_merge(f.main).unwrap());
}

#[test]
fn test_identical_source_and_target() {
    let mut f = setup();
    assert!(matches!(
        f.manager.merge(f.main, f.main),
        Err(ToolStripError::MergeTargetIdenticalToSource)
    ));
    assert!(matches!(
        f.manager.revert_merge_from(f.main, f.main),
        Err(ToolStripError::MergeTargetIdenticalToSource)
    ));
}

#[test]
fn test_disallowed_merge_is_refused() {
    let mut f = setup();
    add(f.manager.registry_mut(), f.child, ToolStripItem::new("A"));
    f.manager
        .registry_mut()
        .strip_mut(f.main)
        .unwrap()
        .set_allow_merge(false);
    assert!(!f.manager.merge(f.child, f.main).unwrap());
    assert_eq!(f.manager.registry().item_count(f.child), 1);
}

#[test]
fn test_pinned_merges_survive_revert_merge() {
    let mut f = setup();
    let pinned_window = f.windows.create_top_level("window-list", Rect::new(0, 0, 100, 24));
    let reg = f.manager.registry_mut();
    let pinned = reg.register(
        ToolStrip::new(StripKind::MenuStrip, pinned_window).with_pinned_during_bulk_revert(true),
    );
    let window_item = add(reg, pinned, ToolStripItem::new("Window"));
    add(reg, f.child, ToolStripItem::new("A"));

    assert!(f.manager.merge(pinned, f.main).unwrap());
    assert!(f.manager.merge(f.child, f.main).unwrap());

    assert!(f.manager.revert_merge(f.main).unwrap());
    let reg = f.manager.registry();
    assert_eq!(reg.items(f.main), &[f.file, f.edit, f.help, window_item]);
    assert_eq!(reg.item_count(f.child), 1);
    assert_eq!(reg.strip(f.main).unwrap().merge_history().len(), 1);

    assert!(f.manager.revert_all_merges(f.main).unwrap());
    let reg = f.manager.registry();
    assert_eq!(reg.items(f.main), &[f.file, f.edit, f.help]);
    assert_eq!(reg.items(pinned), &[window_item]);
    assert!(reg.strip(f.main).unwrap().merge_history().is_empty());
}

#[test]
fn test_merge_by_name() {
    let mut f = setup();
    add(f.manager.registry_mut(), f.child, ToolStripItem::new("A"));
    assert!(!f.manager.merge_by_name(f.child, "missing").unwrap());
    assert!(f.manager.merge_by_name(f.child, "main").unwrap());
    assert!(f.manager.revert_merge_by_name("main").unwrap());
    assert!(!f.manager.revert_merge_by_name("missing").unwrap());
    assert_eq!(f.manager.registry().item_count(f.child), 1);
}

#[test]
fn test_find_tool_strips_in_form() {
    let mut f = setup();
    let form = f.windows.find_form(f.manager.registry().strip(f.main).unwrap().window()).unwrap();
    let tools_window = f
        .windows
        .create_child(form, "tools", Rect::new(0, 24, 800, 24))
        .unwrap();
    let status_window = f
        .windows
        .create_child(form, "status", Rect::new(0, 576, 800, 24))
        .unwrap();
    let reg = f.manager.registry_mut();
    let tools = reg.register(ToolStrip::new(StripKind::ToolStrip, tools_window).with_name("doc"));
    reg.register(
        ToolStrip::new(StripKind::StatusStrip, status_window).with_allow_merge(false),
    );

    // Menu strips sort ahead of plain tool strips.
    assert_eq!(f.manager.find_mergeable_tool_strips(&f.windows, form), [f.main, tools]);

    // "doc" exists on the child form too; the main form's strip wins there.
    assert_eq!(f.manager.find_tool_strip_in_form(&f.windows, form, "doc"), Some(tools));
    assert_eq!(f.manager.find_tool_strip("doc"), Some(f.child));
}
