// Browser smoke test for the exported host functions.
#![cfg(target_arch = "wasm32")]

use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn start_before_detector_ready_is_rejected() {
    let noop = js_sys::Function::new_no_args("");
    open_wide::web::init_game(noop.clone(), noop, Some("off".into()));
    open_wide::web::show_view("battle").unwrap();
    assert!(open_wide::web::start_game().is_err());
    assert_eq!(open_wide::web::current_phase().as_deref(), Some("idle"));

    open_wide::web::detector_ready().unwrap();
    open_wide::web::start_game().unwrap();
    assert_eq!(open_wide::web::current_phase().as_deref(), Some("countdown"));
    assert!(open_wide::web::show_view("nowhere").is_err());
}
