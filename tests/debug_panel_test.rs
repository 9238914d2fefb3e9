use matcap_scene::{
    data_structures::material::{MatcapId, MatcapMaterial},
    debug_panel::{DebugPanel, capped_input},
};

fn run_frame(panel: &mut DebugPanel) {
    let ctx = egui::Context::default();
    let _ = ctx.run(egui::RawInput::default(), |ctx| panel.ui(ctx));
}

#[test]
fn starts_without_a_matcap_control() {
    let mut panel = DebugPanel::new();
    assert!(!panel.axes_visible());
    assert_eq!(panel.matcap_choices(), 0);
    assert_eq!(panel.selected_matcap(), None);
    assert!(panel.select_matcap(0).is_err());
}

#[test]
fn selecting_a_matcap_updates_the_shared_material() {
    let material = MatcapMaterial::new(MatcapId::new(7)).shared();
    let mut panel = DebugPanel::new();
    panel.bind_matcap(material.clone(), 8);

    panel.select_matcap(2).expect("matcap 3 is offered");
    assert_eq!(material.borrow().matcap(), MatcapId::new(2));
    assert_eq!(panel.selected_matcap(), Some(MatcapId::new(2)));

    assert!(panel.select_matcap(8).is_err());
    assert_eq!(material.borrow().matcap(), MatcapId::new(2));
}

#[test]
fn matcap_labels_count_from_one() {
    assert_eq!(MatcapId::new(0).label(), "1");
    assert_eq!(MatcapId::new(7).label(), "8");
    assert_eq!(MatcapId::from_number(8), Some(MatcapId::new(7)));
    assert_eq!(MatcapId::from_number(0), None);
}

#[test]
fn axes_toggle_round_trips() {
    let mut panel = DebugPanel::new();
    panel.set_axes_visible(true);
    assert!(panel.axes_visible());
    panel.set_axes_visible(false);
    assert!(!panel.axes_visible());
}

#[test]
fn drawing_the_collapsed_panel_changes_nothing() {
    let material = MatcapMaterial::new(MatcapId::new(7)).shared();
    let mut panel = DebugPanel::new();
    run_frame(&mut panel);

    panel.bind_matcap(material.clone(), 8);
    for _ in 0..3 {
        run_frame(&mut panel);
    }
    assert!(!panel.axes_visible());
    assert_eq!(material.borrow().matcap(), MatcapId::new(7));
}

#[test]
fn panel_is_rasterised_at_the_capped_ratio() {
    let mut raw_input = egui::RawInput {
        screen_rect: Some(egui::Rect::from_min_size(
            egui::Pos2::ZERO,
            egui::vec2(800.0, 600.0),
        )),
        ..Default::default()
    };
    raw_input
        .viewports
        .entry(raw_input.viewport_id)
        .or_default()
        .native_pixels_per_point = Some(3.0);

    let mut panel = DebugPanel::new();
    let ctx = egui::Context::default();
    let output = ctx.run(capped_input(raw_input, 2.0), |ctx| panel.ui(ctx));

    assert_eq!(output.pixels_per_point, 2.0);
    assert_eq!(ctx.pixels_per_point(), 2.0);
}
