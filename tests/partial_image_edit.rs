mod common;

use common::{BLUE, NamedEdit, RED, WHITE, document_with_layer, layer_pixels, new_history, paint};
use image::{Rgba, RgbaImage};
use paint_history::event::{RecordedMessages, UserMessage};
use paint_history::{
    Document, Edit, FadeableEdit, HistoryConfig, HistoryService, Layer, LayerId, PartialImageEdit,
    PixelRect, UndoManager,
};

#[test]
fn test_undo_and_redo_restore_the_exact_pixels() {
    let (doc, layer) = document_with_layer(10, 10);
    let mut history = new_history();
    let before = layer_pixels(&doc, layer);

    assert!(paint(&mut history, &doc, layer, PixelRect::new(2, 2, 4, 4), RED, "Brush"));
    let after = layer_pixels(&doc, layer);
    assert_ne!(before, after);

    assert!(history.undo_named("Brush"));
    assert_eq!(layer_pixels(&doc, layer), before);

    assert!(history.redo_named("Brush"));
    assert_eq!(layer_pixels(&doc, layer), after);

    assert!(history.undo());
    assert_eq!(layer_pixels(&doc, layer), before);
}

#[test]
fn test_only_the_region_is_captured() {
    let (doc, layer) = document_with_layer(10, 10);
    let mut history = new_history();
    paint(&mut history, &doc, layer, PixelRect::new(2, 3, 4, 5), RED, "Brush");

    let edit = history.last_edit().unwrap();
    assert_eq!(edit.memory_size(), 4 * 5 * 4);
    assert_eq!(history.debug_info().memory_size, 4 * 5 * 4);

    // the after pixels are only captured by the first undo
    history.undo();
    assert_eq!(history.manager().memory_size(), 2 * 4 * 5 * 4);
}

#[test]
fn test_region_outside_the_layer_adds_nothing() {
    let (doc, layer) = document_with_layer(10, 10);
    let mut history = new_history();
    let original = layer_pixels(&doc, layer);

    let added = history.add_tool_area(PixelRect::new(20, 20, 5, 5), &original, &doc, layer, true, "Brush");

    assert!(!added);
    history.assert_num_edits_is(0);
    assert!(!doc.read().is_dirty());
}

#[test]
fn test_degenerate_region_adds_nothing() {
    let (doc, layer) = document_with_layer(10, 10);
    let original = layer_pixels(&doc, layer);
    let edit = PartialImageEdit::create("Brush", PixelRect::new(2, 2, 0, 3), &original, &doc, layer, true);
    assert!(edit.is_none());
}

#[test]
fn test_region_is_clipped_to_the_layer() {
    let (doc, layer) = document_with_layer(10, 10);
    let original = layer_pixels(&doc, layer);
    let edit = PartialImageEdit::create("Brush", PixelRect::new(-3, 8, 6, 6), &original, &doc, layer, true).unwrap();
    assert_eq!(edit.region(), PixelRect::new(0, 8, 3, 2));
    assert_eq!(edit.before_image().unwrap().dimensions(), (3, 2));
}

#[test]
fn test_canvas_rect_is_translated_by_the_layer_offset() {
    let mut doc = Document::new("moved.png");
    let layer = doc.add_layer(Layer::new_raster("moved", RgbaImage::from_pixel(10, 10, WHITE)).with_offset(3, 4));
    let doc = doc.into_ref();
    let original = layer_pixels(&doc, layer);

    let edit = PartialImageEdit::create("Brush", PixelRect::new(3, 4, 2, 2), &original, &doc, layer, false).unwrap();
    assert_eq!(edit.region(), PixelRect::new(0, 0, 2, 2));

    let edit = PartialImageEdit::create("Brush", PixelRect::new(3, 4, 2, 2), &original, &doc, layer, true).unwrap();
    assert_eq!(edit.region(), PixelRect::new(3, 4, 2, 2));
}

#[test]
fn test_fade_is_offered_only_for_the_current_result() {
    let (doc, layer) = document_with_layer(10, 10);
    let other = doc.write().add_layer(Layer::new_raster("other", RgbaImage::new(10, 10)));
    let mut history = new_history();
    paint(&mut history, &doc, layer, PixelRect::new(0, 0, 5, 5), RED, "Brush");

    assert!(history.can_fade(layer));
    assert!(!history.can_fade(other));
    // "other" became the active layer when it was added
    assert!(!history.can_fade_active(&doc.read()));
    doc.write().set_active_layer(layer);
    assert!(history.can_fade_active(&doc.read()));

    history.undo();
    assert!(!history.can_fade(layer));
    assert!(!history.fade_previous_edit(layer, 0.5));

    history.redo();
    assert!(history.can_fade(layer));
    assert_eq!(history.debug_info().fade_layer, Some(layer));
}

#[test]
fn test_fade_needs_a_fadeable_last_edit() {
    let (doc, layer) = document_with_layer(10, 10);
    let mut history = new_history();
    paint(&mut history, &doc, layer, PixelRect::new(0, 0, 5, 5), RED, "Brush");
    history.add_edit(NamedEdit::boxed("Rename", &doc));

    assert!(!history.can_fade(layer));
    assert!(history.previous_edit_for_fade(layer).is_none());
}

#[test]
fn test_fade_blends_toward_the_original() {
    let (doc, layer) = document_with_layer(10, 10);
    let mut history = new_history();
    let rect = PixelRect::new(1, 1, 3, 3);
    paint(&mut history, &doc, layer, rect, RED, "Brush");

    assert!(history.fade_previous_edit(layer, 0.5));
    assert_eq!(*layer_pixels(&doc, layer).get_pixel(2, 2), Rgba([255, 128, 128, 255]));
    // outside the region nothing changes
    assert_eq!(*layer_pixels(&doc, layer).get_pixel(5, 5), WHITE);

    // fading again starts from the full effect
    assert!(history.fade_previous_edit(layer, 1.0));
    assert_eq!(*layer_pixels(&doc, layer).get_pixel(2, 2), RED);
    assert!(history.fade_previous_edit(layer, 0.0));
    assert_eq!(*layer_pixels(&doc, layer).get_pixel(2, 2), WHITE);

    // a fade is not an edit of its own
    history.assert_num_edits_is(1);
    history.undo_named("Brush");
    assert_eq!(*layer_pixels(&doc, layer).get_pixel(2, 2), WHITE);
}

#[test]
fn test_redo_brings_back_the_faded_result() {
    let (doc, layer) = document_with_layer(10, 10);
    let mut history = new_history();
    paint(&mut history, &doc, layer, PixelRect::new(1, 1, 3, 3), RED, "Brush");
    assert!(history.fade_previous_edit(layer, 0.5));
    let faded = layer_pixels(&doc, layer);

    history.undo_named("Brush");
    assert_eq!(*layer_pixels(&doc, layer).get_pixel(2, 2), WHITE);
    history.redo_named("Brush");
    assert_eq!(layer_pixels(&doc, layer), faded);

    // fading again still starts from the full effect
    assert!(history.fade_previous_edit(layer, 1.0));
    assert_eq!(*layer_pixels(&doc, layer).get_pixel(2, 2), RED);
}

#[test]
fn test_unknown_layer_adds_nothing() {
    let (doc, layer) = document_with_layer(10, 10);
    let original = layer_pixels(&doc, layer);
    let mut history = new_history();
    let unknown = LayerId::new();

    for relative_to_image in [true, false] {
        let added = history.add_tool_area(
            PixelRect::new(0, 0, 4, 4),
            &original,
            &doc,
            unknown,
            relative_to_image,
            "Brush",
        );
        assert!(!added);
    }
    history.assert_num_edits_is(0);
}

#[test]
fn test_fading_directly() {
    let (doc, layer) = document_with_layer(4, 4);
    let original = layer_pixels(&doc, layer);
    doc.write()
        .write_region(layer, PixelRect::new(0, 0, 4, 4), &RgbaImage::from_pixel(4, 4, BLUE));
    let mut edit = PartialImageEdit::create("Fill", PixelRect::new(0, 0, 4, 4), &original, &doc, layer, true).unwrap();

    assert!(edit.is_fadeable());
    assert_eq!(edit.fading_layer(), layer);
    edit.fade(2.0).unwrap();
    assert_eq!(*layer_pixels(&doc, layer).get_pixel(0, 0), BLUE);

    edit.undo().unwrap();
    assert!(edit.fade(0.5).is_err());
}

#[test]
fn test_snapshots_over_budget_are_released() {
    let (doc, layer) = document_with_layer(10, 10);
    let messages = RecordedMessages::new();
    let mut history = HistoryService::new(HistoryConfig::for_tests().with_snapshot_memory_budget(0))
        .with_messages(Box::new(messages.clone()));

    paint(&mut history, &doc, layer, PixelRect::new(0, 0, 4, 4), RED, "First");
    paint(&mut history, &doc, layer, PixelRect::new(4, 4, 4, 4), BLUE, "Second");

    let info = history.debug_info();
    assert_eq!(info.edits[0].memory_size, 0);
    assert_eq!(info.edits[1].memory_size, 4 * 4 * 4);

    assert!(history.undo_named("Second"));
    assert!(!history.undo());
    assert!(matches!(messages.messages().as_slice(), [UserMessage::Info { .. }]));
    history.assert_edit_to_be_undone_name_is("First");
}

#[test]
fn test_released_edit_is_no_longer_fadeable() {
    let (doc, layer) = document_with_layer(10, 10);
    let original = layer_pixels(&doc, layer);
    let rect = PixelRect::new(0, 0, 4, 4);
    let mut manager = UndoManager::new(3);
    manager.add_edit(Box::new(
        PartialImageEdit::create("Brush", rect, &original, &doc, layer, true).unwrap(),
    ));

    // the newest edit is never trimmed
    assert_eq!(manager.trim_snapshot_memory(0), 0);

    let edit = manager.last_edit_mut().unwrap();
    assert_eq!(edit.release_snapshots(), 64);
    assert!(!edit.as_fadeable().unwrap().is_fadeable());
    assert!(manager.undo().is_err());
    assert_eq!(manager.cursor(), 1);
}
