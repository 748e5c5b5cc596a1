#![no_main]

use dockyard_core::Rect;
use dockyard_layout::Model;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    // Loading either fails or yields a valid model.
    let Ok(mut model) = Model::from_json(text) else {
        return;
    };
    model.validate().expect("loaded model must be valid");

    // Serialization is a fixed point after the first load.
    let first = model.to_value().expect("serialize");
    let reloaded = Model::from_value(first.clone()).expect("reload own output");
    assert_eq!(reloaded.to_value().expect("serialize"), first);

    // Layout never panics, whatever the document says.
    let _ = model.update_layout(Rect::new(0.0, 0.0, 1024.0, 768.0));
    for node in model.nodes() {
        let path = model.path_of(node.id()).expect("reachable node has a path");
        assert_eq!(model.node_by_path(&path).map(|n| n.id()), Some(node.id()));
    }
});
