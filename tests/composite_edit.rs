mod common;

use common::{NamedEdit, RED, document_with_layer, init_logging, layer_pixels, new_history};
use image::RgbaImage;
use paint_history::consistency::{self, ConsistencyError};
use paint_history::edit::{IsolateEdit, MoveLayerEdit, RenameLayerEdit};
use paint_history::{
    CompositeEdit, DocumentRef, Edit, HistoryConfig, HistoryService, Layer, PartialImageEdit, PixelRect,
    UndoManager,
};

#[test]
fn test_empty_composite_is_rejected() {
    let (doc, _) = document_with_layer(4, 4);
    assert!(CompositeEdit::new("Nothing", &doc, Vec::new()).is_none());
}

#[test]
fn test_composite_is_one_step() {
    let (doc, layer) = document_with_layer(8, 8);
    let mut history = new_history();
    let original = layer_pixels(&doc, layer);

    let mut children: Vec<Box<dyn Edit>> = Vec::new();
    doc.write()
        .write_region(layer, PixelRect::new(0, 0, 2, 2), &RgbaImage::from_pixel(2, 2, RED));
    children.push(Box::new(
        PartialImageEdit::create("Left", PixelRect::new(0, 0, 2, 2), &original, &doc, layer, true).unwrap(),
    ));
    children.push(Box::new(MoveLayerEdit::apply(&doc, layer, 5, 0).unwrap()));
    children.push(Box::new(RenameLayerEdit::apply(&doc, layer, "moved").unwrap()));
    let composite = CompositeEdit::new("Paint and Move", &doc, children).unwrap();
    assert_eq!(composite.len(), 3);
    assert!(!composite.can_repeat());
    assert_eq!(composite.memory_size(), 2 * 2 * 4);
    history.add_edit(Box::new(composite));

    history.undo_named("Paint and Move");
    {
        let doc = doc.read();
        let target = doc.layer(layer).unwrap();
        assert_eq!(target.name, "background");
        assert_eq!(target.offset(), (0, 0));
    }
    assert_eq!(layer_pixels(&doc, layer), original);

    history.redo_named("Paint and Move");
    let doc = doc.read();
    let target = doc.layer(layer).unwrap();
    assert_eq!(target.name, "moved");
    assert_eq!(target.offset(), (5, 0));
    assert_eq!(*target.pixels().unwrap().get_pixel(1, 1), RED);
}

#[test]
fn test_undo_runs_in_reverse_order() {
    let (doc, layer) = document_with_layer(4, 4);
    let children: Vec<Box<dyn Edit>> = vec![
        Box::new(RenameLayerEdit::apply(&doc, layer, "first").unwrap()),
        Box::new(RenameLayerEdit::apply(&doc, layer, "second").unwrap()),
    ];
    let mut composite = CompositeEdit::new("Renames", &doc, children).unwrap();

    composite.undo().unwrap();
    assert_eq!(doc.read().layer(layer).unwrap().name, "background");

    composite.redo().unwrap();
    assert_eq!(doc.read().layer(layer).unwrap().name, "second");
}

#[test]
fn test_failing_child_stops_without_rollback() {
    let (doc, _) = document_with_layer(4, 4);
    let children: Vec<Box<dyn Edit>> = vec![
        NamedEdit::boxed("first", &doc),
        Box::new(NamedEdit::new("second", &doc).failing_undo()),
        NamedEdit::boxed("third", &doc),
    ];
    let mut manager = UndoManager::new(3);
    manager.add_edit(Box::new(CompositeEdit::new("Batch", &doc, children).unwrap()));

    let err = manager.undo().unwrap_err();
    assert!(err.is_undo());
    assert_eq!(manager.cursor(), 1);

    let composite = manager.last_edit().unwrap();
    let states: Vec<bool> = composite
        .sub_edits()
        .iter()
        .map(|child| child.core().is_done())
        .collect();
    // "third" was undone before "second" refused
    assert_eq!(states, vec![true, true, false]);

    assert_eq!(
        consistency::check_manager(&manager),
        Err(ConsistencyError::DoneEditUndone {
            name: "third".to_string()
        })
    );
}

fn half_undone_batch(config: HistoryConfig) -> (HistoryService, DocumentRef) {
    init_logging();
    let (doc, _) = document_with_layer(4, 4);
    let children: Vec<Box<dyn Edit>> = vec![
        NamedEdit::boxed("first", &doc),
        Box::new(NamedEdit::new("second", &doc).failing_undo()),
        NamedEdit::boxed("third", &doc),
    ];
    let mut history = HistoryService::new(config);
    history.add_edit(Box::new(CompositeEdit::new("Batch", &doc, children).unwrap()));
    assert!(!history.undo());
    (history, doc)
}

#[test]
#[should_panic(expected = "Consistency check failed")]
fn test_adding_after_a_half_undone_batch_panics() {
    let (mut history, doc) = half_undone_batch(HistoryConfig::for_tests());
    history.add_edit(NamedEdit::boxed("Next", &doc));
}

#[test]
fn test_disabled_consistency_checks_do_not_panic() {
    let config = HistoryConfig {
        consistency_checks: false,
        ..HistoryConfig::for_tests()
    };
    let (mut history, doc) = half_undone_batch(config);
    history.add_edit(NamedEdit::boxed("Next", &doc));
    assert_eq!(history.edit_names(), vec!["Batch", "Next"]);
}

#[test]
fn test_isolate_restores_visibility() {
    let (doc, bottom) = document_with_layer(4, 4);
    let top = doc.write().add_layer(Layer::new_raster("top", RgbaImage::new(4, 4)));
    doc.write().layer_mut(top).unwrap().visible = false;
    let mut history = new_history();

    let edit = IsolateEdit::apply(&doc, top).unwrap();
    assert_eq!(doc.read().layer_visibilities(), vec![false, true]);
    history.add_edit(Box::new(edit));
    assert!(!history.can_repeat_operation());

    history.undo_named("Isolate");
    assert_eq!(doc.read().layer_visibilities(), vec![true, false]);

    history.redo_named("Isolate");
    assert_eq!(doc.read().layer_visibilities(), vec![false, true]);
    assert!(doc.read().layer(bottom).is_some());
}

#[test]
fn test_noop_layer_edits_are_not_created() {
    let (doc, layer) = document_with_layer(4, 4);
    assert!(MoveLayerEdit::apply(&doc, layer, 0, 0).is_none());
    assert!(RenameLayerEdit::apply(&doc, layer, "background").is_none());

    let adjustment = doc.write().add_layer(Layer::new_adjustment("levels", "Levels"));
    assert!(MoveLayerEdit::apply(&doc, adjustment, 1, 1).is_none());
}
